#![deny(warnings)]

//! Viability scoring for the active book format.

use niche_core::{FormatType, GlobalData};
use niche_econ::{EbookResults, PaperbackResults};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Highest total a campaign below 10 clicks per sale can reach.
pub const LOW_CLICKS_CAP: u32 = 40;

/// Figures of the format currently being evaluated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveMetrics {
    /// Format these figures belong to.
    pub format: FormatType,
    pub max_clicks_per_sale: u64,
    /// BACOS in percent.
    pub margin_pct: Decimal,
    /// Earnings per sale.
    pub royalty: Decimal,
    pub list_price: Option<Decimal>,
    /// Recommended minimum price, when the format has one.
    pub min_price: Option<Decimal>,
}

impl ActiveMetrics {
    pub fn from_ebook(e: &EbookResults) -> Self {
        Self {
            format: FormatType::Ebook,
            max_clicks_per_sale: e.max_clicks_per_sale,
            margin_pct: e.acos_margin * Decimal::ONE_HUNDRED,
            royalty: e.royalty,
            list_price: Some(e.list_price),
            min_price: None,
        }
    }

    pub fn from_paperback(p: &PaperbackResults) -> Self {
        Self {
            format: FormatType::Paperback,
            max_clicks_per_sale: p.max_clicks_per_sale,
            margin_pct: p.bacos_margin * Decimal::ONE_HUNDRED,
            royalty: p.royalty,
            list_price: Some(p.list_price),
            min_price: p.min_price(),
        }
    }
}

/// Pick the results of the selected format, if any were computed.
pub fn active_metrics(
    global: &GlobalData,
    ebook: Option<&EbookResults>,
    paperback: Option<&PaperbackResults>,
) -> Option<ActiveMetrics> {
    match global.selected_format? {
        FormatType::Ebook => ebook.map(ActiveMetrics::from_ebook),
        FormatType::Paperback => paperback.map(ActiveMetrics::from_paperback),
    }
}

/// Overall verdict on a pricing configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViabilityStatus {
    Excellent,
    Viable,
    NotRecommended,
}

impl ViabilityStatus {
    /// 80 and up is excellent, 50 and up viable.
    pub fn from_score(total: u32) -> Self {
        if total >= 80 {
            ViabilityStatus::Excellent
        } else if total >= 50 {
            ViabilityStatus::Viable
        } else {
            ViabilityStatus::NotRecommended
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViabilityStatus::Excellent => "Excellent",
            ViabilityStatus::Viable => "Viable",
            ViabilityStatus::NotRecommended => "Not recommended",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            ViabilityStatus::Excellent => "🟢",
            ViabilityStatus::Viable => "🟡",
            ViabilityStatus::NotRecommended => "🔴",
        }
    }

    /// CSS color used by the presentation layer.
    pub fn color(self) -> &'static str {
        match self {
            ViabilityStatus::Excellent => "#16a34a",
            ViabilityStatus::Viable => "#ca8a04",
            ViabilityStatus::NotRecommended => "#dc2626",
        }
    }
}

/// Weighted 0–100 viability score and its components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// 0, 30 or 50.
    pub clicks_score: u32,
    /// 0, 15 or 30.
    pub bacos_score: u32,
    /// 0, 10 or 20.
    pub price_vs_min_score: u32,
    /// Sum of the components, held at the cap for low click counts.
    pub total_score: u32,
    /// Set whenever clicks per sale are below 10, so the total is held at or
    /// under [`LOW_CLICKS_CAP`] even if it was already lower.
    pub clicks_capped: bool,
    pub status: ViabilityStatus,
    /// [`ViabilityStatus::label`] of `status`.
    pub status_label: String,
    /// [`ViabilityStatus::emoji`] of `status`.
    pub status_emoji: String,
    /// [`ViabilityStatus::color`] of `status`.
    pub status_color: String,
}

fn clicks_score(clicks: u64) -> u32 {
    match clicks {
        13.. => 50,
        10..=12 => 30,
        _ => 0,
    }
}

fn bacos_score(margin_pct: Decimal) -> u32 {
    if margin_pct >= Decimal::new(40, 0) {
        30
    } else if margin_pct >= Decimal::new(30, 0) {
        15
    } else {
        0
    }
}

fn price_vs_min_score(price: Option<Decimal>, min: Option<Decimal>) -> u32 {
    match (price, min) {
        (Some(p), Some(m)) if p > m => 20,
        (Some(p), Some(m)) if (p - m).abs() < Decimal::new(1, 2) => 10,
        (Some(_), Some(_)) => 0,
        // Without a minimum the price is assumed acceptable.
        (Some(_), None) => 20,
        (None, _) => 0,
    }
}

/// Score the active format. `None` while no format results are available.
///
/// Fewer than 10 clicks per sale caps the total at 40 whatever the other
/// components add up to.
pub fn score(active: Option<&ActiveMetrics>) -> Option<ScoreBreakdown> {
    let m = active?;
    let clicks = clicks_score(m.max_clicks_per_sale);
    let bacos = bacos_score(m.margin_pct);
    let price = price_vs_min_score(m.list_price, m.min_price);
    let mut total = clicks + bacos + price;
    let clicks_capped = m.max_clicks_per_sale < 10;
    if clicks_capped {
        total = total.min(LOW_CLICKS_CAP);
    }
    let status = ViabilityStatus::from_score(total);
    debug!(format = ?m.format, total, ?status, "viability scored");

    Some(ScoreBreakdown {
        clicks_score: clicks,
        bacos_score: bacos,
        price_vs_min_score: price,
        total_score: total,
        clicks_capped,
        status,
        status_label: status.label().to_string(),
        status_emoji: status.emoji().to_string(),
        status_color: status.color().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn metrics(clicks: u64, margin: i64, price: Option<i64>, min: Option<i64>) -> ActiveMetrics {
        ActiveMetrics {
            format: FormatType::Paperback,
            max_clicks_per_sale: clicks,
            margin_pct: Decimal::new(margin, 0),
            royalty: Decimal::new(5, 0),
            list_price: price.map(|c| Decimal::new(c, 2)),
            min_price: min.map(|c| Decimal::new(c, 2)),
        }
    }

    #[test]
    fn none_without_results() {
        assert!(score(None).is_none());
    }

    #[test]
    fn full_marks_are_excellent() {
        let s = score(Some(&metrics(15, 45, Some(1299), Some(649)))).unwrap();
        assert_eq!(s.clicks_score, 50);
        assert_eq!(s.bacos_score, 30);
        assert_eq!(s.price_vs_min_score, 20);
        assert_eq!(s.total_score, 100);
        assert!(!s.clicks_capped);
        assert_eq!(s.status, ViabilityStatus::Excellent);
        assert_eq!(s.status_label, "Excellent");
    }

    #[test]
    fn nine_clicks_caps_at_forty() {
        let s = score(Some(&metrics(9, 45, Some(1299), Some(649)))).unwrap();
        assert_eq!(s.clicks_score, 0);
        assert_eq!(s.bacos_score + s.price_vs_min_score, 50);
        assert_eq!(s.total_score, 40);
        assert!(s.clicks_capped);
        assert_eq!(s.status, ViabilityStatus::NotRecommended);
    }

    #[test]
    fn low_clicks_flagged_even_below_cap() {
        let s = score(Some(&metrics(5, 10, Some(100), None))).unwrap();
        assert_eq!(s.total_score, 20);
        assert!(s.clicks_capped);
    }

    #[test]
    fn price_at_minimum_earns_ten() {
        let s = score(Some(&metrics(11, 35, Some(649), Some(649)))).unwrap();
        assert_eq!(s.price_vs_min_score, 10);
        assert_eq!(s.total_score, 30 + 15 + 10);
        assert_eq!(s.status, ViabilityStatus::Viable);
    }

    #[test]
    fn price_below_minimum_earns_nothing() {
        let s = score(Some(&metrics(11, 20, Some(599), Some(649)))).unwrap();
        assert_eq!(s.price_vs_min_score, 0);
        assert_eq!(s.total_score, 30);
    }

    #[test]
    fn unknown_minimum_is_acceptable() {
        let s = score(Some(&metrics(13, 40, Some(499), None))).unwrap();
        assert_eq!(s.price_vs_min_score, 20);
        assert_eq!(s.total_score, 100);
        let s = score(Some(&metrics(13, 40, None, None))).unwrap();
        assert_eq!(s.price_vs_min_score, 0);
    }

    #[test]
    fn threshold_edges() {
        assert_eq!(clicks_score(12), 30);
        assert_eq!(clicks_score(13), 50);
        assert_eq!(clicks_score(10), 30);
        assert_eq!(bacos_score(Decimal::new(2999, 2)), 0);
        assert_eq!(bacos_score(Decimal::new(30, 0)), 15);
        assert_eq!(ViabilityStatus::from_score(79), ViabilityStatus::Viable);
        assert_eq!(ViabilityStatus::from_score(80), ViabilityStatus::Excellent);
        assert_eq!(ViabilityStatus::from_score(49), ViabilityStatus::NotRecommended);
    }

    #[test]
    fn active_follows_selected_format() {
        let g = GlobalData {
            selected_format: None,
            ..Default::default()
        };
        assert!(active_metrics(&g, None, None).is_none());
        let g = GlobalData {
            selected_format: Some(FormatType::Ebook),
            ..Default::default()
        };
        assert!(active_metrics(&g, None, None).is_none());
    }

    #[test]
    fn breakdown_serializes_status_kebab_case() {
        let s = score(Some(&metrics(5, 10, Some(100), None))).unwrap();
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["status"], "not-recommended");
        let back: ScoreBreakdown = serde_json::from_value(json).unwrap();
        assert_eq!(back, s);
    }

    proptest! {
        #[test]
        fn low_clicks_never_exceed_cap(clicks in 0u64..10,
                                       margin in 0i64..100,
                                       price in proptest::option::of(0i64..5000),
                                       min in proptest::option::of(0i64..5000)) {
            let s = score(Some(&metrics(clicks, margin, price, min))).unwrap();
            prop_assert!(s.total_score <= LOW_CLICKS_CAP);
            prop_assert!(s.clicks_capped);
        }

        #[test]
        fn total_is_bounded(clicks in 0u64..100, margin in 0i64..100) {
            let s = score(Some(&metrics(clicks, margin, Some(1000), Some(900)))).unwrap();
            prop_assert!(s.total_score <= 100);
        }
    }
}
