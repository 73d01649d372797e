#![deny(warnings)]

//! Royalty and advertising economics for ebook and printed editions.
//!
//! This crate provides pure engines for:
//! - Ebook royalty, ACOS margin and breakeven clicks
//! - Printed edition royalty, BACOS margin, breakeven clicks and minimum price
//! - Campaign positioning against a competitor's daily sales
//!
//! Every engine returns `None` while its required inputs are incomplete, or
//! when a figure falls outside the range `Decimal` can represent.

use niche_core::{
    calculate_printing_cost, Assumptions, Diagnosis, EbookData, EbookRoyaltyRate, FormatType,
    GlobalData, Marketplace, PaperbackData,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Clicks per sale at which a campaign sits exactly on the warning line.
pub const CLICKS_WARNING_LINE: u64 = 10;

/// Derived ebook figures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EbookResults {
    pub list_price: Decimal,
    /// VAT rate in percent; zero outside ES.
    pub vat_pct: Decimal,
    /// VAT amount contained in the list price.
    pub vat: Decimal,
    /// Price net of VAT.
    pub net_price: Decimal,
    /// Per-MB delivery fee, charged on the 70% plan only.
    pub delivery_cost: Decimal,
    /// Earnings per sale.
    pub royalty: Decimal,
    /// Royalty over list price; the breakeven ACOS.
    pub acos_margin: Decimal,
    /// Click-to-sale rate at which ad spend equals royalty.
    pub breakeven_conversion_rate: Decimal,
    /// Whole clicks one sale's royalty pays for.
    pub max_clicks_per_sale: u64,
    pub diagnosis: Diagnosis,
    /// One-line explanation of `diagnosis`.
    pub diagnosis_message: String,
}

/// Derived printed edition figures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperbackResults {
    pub list_price: Decimal,
    /// Royalty rate as a fraction (0.50 or 0.60).
    pub royalty_rate: Decimal,
    /// Printing cost per copy.
    pub printing_cost: Decimal,
    /// VAT rate in percent; zero without a VAT storefront.
    pub vat_pct: Decimal,
    pub price_ex_vat: Decimal,
    /// `price_ex_vat * royalty_rate - printing_cost`.
    pub royalty: Decimal,
    /// Royalty over gross list price.
    pub bacos_margin: Decimal,
    /// Click-to-sale rate at which ad spend equals royalty.
    pub breakeven_conversion_rate: Decimal,
    /// Whole clicks one sale's royalty pays for.
    pub max_clicks_per_sale: u64,
    /// Target margin fraction actually applied.
    pub target_margin: Decimal,
    /// Lowest price meeting the target margin; zero when unattainable.
    pub min_target_price: Decimal,
    /// Why no minimum price exists, when the target exceeds the royalty rate.
    pub min_price_error: Option<String>,
    pub diagnosis: Diagnosis,
    /// One-line explanation of `diagnosis`.
    pub diagnosis_message: String,
}

impl PaperbackResults {
    /// Minimum price when one exists.
    pub fn min_price(&self) -> Option<Decimal> {
        match self.min_price_error {
            Some(_) => None,
            None => Some(self.min_target_price),
        }
    }
}

/// Campaign sizing against a competitor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositioningResults {
    /// Clicks per day needed to match the competitor's sales.
    pub daily_clicks: Decimal,
    /// `daily_clicks` rounded up for display.
    pub daily_clicks_rounded: u64,
    /// `daily_clicks * cpc`.
    pub daily_investment: Decimal,
    /// Advisory messages; empty when the campaign looks sound.
    pub warnings: Vec<String>,
}

/// `num / den`, zero for a zero denominator. `None` on overflow.
fn ratio(num: Decimal, den: Decimal) -> Option<Decimal> {
    if den.is_zero() {
        return Some(Decimal::ZERO);
    }
    num.checked_div(den)
}

/// Percent form of a fraction, saturating for display.
fn percent(fraction: Decimal) -> Decimal {
    fraction
        .checked_mul(Decimal::ONE_HUNDRED)
        .unwrap_or(Decimal::MAX)
}

/// Breakeven conversion rate and the whole number of clicks a sale can pay for.
///
/// Clicks are `floor(royalty / cpc)` so whole ratios stay exact.
fn breakeven(cpc: Decimal, royalty: Decimal) -> Option<(Decimal, u64)> {
    if royalty <= Decimal::ZERO || cpc <= Decimal::ZERO {
        return Some((Decimal::ZERO, 0));
    }
    let rate = ratio(cpc, royalty)?;
    let clicks = royalty
        .checked_div(cpc)
        .and_then(|c| c.floor().to_u64())
        .unwrap_or(u64::MAX);
    Some((rate, clicks))
}

fn ebook_diagnosis(clicks: u64) -> (Diagnosis, String) {
    if clicks < CLICKS_WARNING_LINE {
        (
            Diagnosis::Bad,
            format!("Only {clicks} clicks per sale: advertising will lose money"),
        )
    } else if clicks == CLICKS_WARNING_LINE {
        (
            Diagnosis::Warning,
            "Exactly 10 clicks per sale: no room for a bad conversion day".to_string(),
        )
    } else {
        (
            Diagnosis::Good,
            format!("{clicks} clicks per sale: healthy room for advertising"),
        )
    }
}

/// Ebook engine using default assumptions.
pub fn ebook_results(global: &GlobalData, ebook: &EbookData) -> Option<EbookResults> {
    ebook_results_with(&Assumptions::default(), global, ebook)
}

/// Ebook royalty, margin, breakeven and diagnosis.
///
/// Returns `None` unless marketplace, list price and CPC are all present.
pub fn ebook_results_with(
    a: &Assumptions,
    global: &GlobalData,
    ebook: &EbookData,
) -> Option<EbookResults> {
    let marketplace = global.marketplace?;
    let list_price = ebook.list_price?;
    let cpc = global.cpc?;

    let vat_pct = match marketplace {
        Marketplace::ES if ebook.audiovisual => a.ebook_audiovisual_vat_pct,
        Marketplace::ES => a.ebook_vat_pct,
        Marketplace::COM => Decimal::ZERO,
    };
    let vat = list_price.checked_mul(vat_pct)? / Decimal::ONE_HUNDRED;
    let net_price = if marketplace.has_vat() {
        list_price - vat
    } else {
        list_price
    };
    let delivery_cost = match (ebook.royalty_rate, ebook.file_size_mb) {
        (EbookRoyaltyRate::Seventy, Some(mb)) => {
            mb.ceil().checked_mul(a.ebook_delivery_cost_per_mb)?
        }
        _ => Decimal::ZERO,
    };
    let royalty = (ebook.royalty_rate.percent() / Decimal::ONE_HUNDRED)
        .checked_mul(net_price - delivery_cost)?;
    let acos_margin = ratio(royalty, list_price)?;
    let (breakeven_conversion_rate, max_clicks_per_sale) = breakeven(cpc, royalty)?;
    let (diagnosis, diagnosis_message) = ebook_diagnosis(max_clicks_per_sale);
    debug!(%royalty, max_clicks_per_sale, ?diagnosis, "ebook recomputed");

    Some(EbookResults {
        list_price,
        vat_pct,
        vat,
        net_price,
        delivery_cost,
        royalty,
        acos_margin,
        breakeven_conversion_rate,
        max_clicks_per_sale,
        diagnosis,
        diagnosis_message,
    })
}

fn paperback_diagnosis(bacos_pct: Decimal, clicks: u64) -> (Diagnosis, String) {
    if bacos_pct < Decimal::new(30, 0) || clicks < CLICKS_WARNING_LINE {
        (
            Diagnosis::Bad,
            format!(
                "BACOS {}% with {clicks} clicks per sale: not enough margin to advertise",
                bacos_pct.round_dp(1)
            ),
        )
    } else if bacos_pct <= Decimal::new(40, 0) || clicks == CLICKS_WARNING_LINE {
        (
            Diagnosis::Warning,
            format!(
                "BACOS {}% with {clicks} clicks per sale: tight, watch the campaign closely",
                bacos_pct.round_dp(1)
            ),
        )
    } else {
        (
            Diagnosis::Good,
            format!(
                "BACOS {}% with {clicks} clicks per sale: room to scale advertising",
                bacos_pct.round_dp(1)
            ),
        )
    }
}

/// Printed edition engine using default assumptions.
pub fn paperback_results(global: &GlobalData, paperback: &PaperbackData) -> Option<PaperbackResults> {
    paperback_results_with(&Assumptions::default(), global, paperback)
}

/// Printed edition royalty, BACOS, breakeven, minimum price and diagnosis.
///
/// Returns `None` when interior, size, list price, pages or CPC is missing, or
/// when the printing configuration is invalid. A missing marketplace is
/// treated as one without VAT.
pub fn paperback_results_with(
    a: &Assumptions,
    global: &GlobalData,
    paperback: &PaperbackData,
) -> Option<PaperbackResults> {
    let list_price = paperback.list_price?;
    let cpc = global.cpc?;
    let printing = calculate_printing_cost(paperback.interior, paperback.size, paperback.pages);
    if !printing.is_valid {
        return None;
    }

    let royalty_rate = if list_price < a.paperback_royalty_break {
        a.paperback_low_royalty
    } else {
        a.paperback_high_royalty
    };
    let printing_cost = printing.total_cost;
    let has_vat = global.marketplace.map_or(false, Marketplace::has_vat);
    let vat_pct = if has_vat {
        a.paperback_vat_pct
    } else {
        Decimal::ZERO
    };
    let price_ex_vat = if has_vat {
        ratio(list_price, Decimal::ONE + vat_pct / Decimal::ONE_HUNDRED)?
    } else {
        list_price
    };
    let royalty = price_ex_vat.checked_mul(royalty_rate)? - printing_cost;
    let bacos_margin = ratio(royalty, list_price)?;
    let (breakeven_conversion_rate, max_clicks_per_sale) = breakeven(cpc, royalty)?;

    // An empty or zero target falls back to the default.
    let target_margin = match global.target_margin_pct {
        Some(pct) if !pct.is_zero() => pct / Decimal::ONE_HUNDRED,
        _ => a.default_target_margin,
    };
    let (min_target_price, min_price_error) = if royalty_rate > target_margin {
        let cents = ratio(printing_cost, royalty_rate - target_margin)?
            .checked_mul(Decimal::ONE_HUNDRED)?;
        (cents.ceil() / Decimal::ONE_HUNDRED - Decimal::new(1, 2), None)
    } else {
        (
            Decimal::ZERO,
            Some(format!(
                "A {}% target margin is not reachable with a {}% royalty rate",
                percent(target_margin).normalize(),
                percent(royalty_rate).normalize()
            )),
        )
    };

    let (diagnosis, diagnosis_message) =
        paperback_diagnosis(percent(bacos_margin), max_clicks_per_sale);
    debug!(%royalty, %printing_cost, max_clicks_per_sale, ?diagnosis, "paperback recomputed");

    Some(PaperbackResults {
        list_price,
        royalty_rate,
        printing_cost,
        vat_pct,
        price_ex_vat,
        royalty,
        bacos_margin,
        breakeven_conversion_rate,
        max_clicks_per_sale,
        target_margin,
        min_target_price,
        min_price_error,
        diagnosis,
        diagnosis_message,
    })
}

/// Positioning engine using default assumptions.
pub fn positioning(
    global: &GlobalData,
    ebook: Option<&EbookResults>,
    paperback: Option<&PaperbackResults>,
) -> Option<PositioningResults> {
    positioning_with(&Assumptions::default(), global, ebook, paperback)
}

/// Daily clicks and spend needed to match a competitor, with advisory warnings.
///
/// Returns `None` unless CPC and competitor daily sales are present.
pub fn positioning_with(
    a: &Assumptions,
    global: &GlobalData,
    ebook: Option<&EbookResults>,
    paperback: Option<&PaperbackResults>,
) -> Option<PositioningResults> {
    let cpc = global.cpc?;
    let sales = global.competitor_daily_sales?;

    let daily_clicks = ratio(sales, a.reference_conversion_rate)?;
    let daily_clicks_rounded = daily_clicks.ceil().to_u64().unwrap_or(u64::MAX);
    let daily_investment = daily_clicks.checked_mul(cpc)?;

    let mut warnings = Vec::new();
    let rates = [
        (FormatType::Ebook, ebook.map(|e| e.breakeven_conversion_rate)),
        (
            FormatType::Paperback,
            paperback.map(|p| p.breakeven_conversion_rate),
        ),
    ];
    for (format, rate) in rates {
        if let Some(rate) = rate.filter(|r| *r > a.reference_conversion_rate) {
            warnings.push(format!(
                "{} needs a {}% conversion rate to break even, above the {}% reference",
                format.label(),
                percent(rate).round_dp(1),
                percent(a.reference_conversion_rate).normalize()
            ));
        }
    }

    let royalties: Vec<Decimal> = ebook
        .map(|e| e.royalty)
        .into_iter()
        .chain(paperback.map(|p| p.royalty))
        .collect();
    if !royalties.is_empty() {
        let total = royalties
            .iter()
            .try_fold(Decimal::ZERO, |acc, r| acc.checked_add(*r))?;
        let avg_royalty = total / Decimal::from(royalties.len());
        let earned = avg_royalty.checked_mul(sales)?;
        let ceiling = earned.checked_mul(a.spend_warning_ratio)?;
        if daily_investment > ceiling {
            warnings.push(format!(
                "Daily spend of {} is disproportionate to the {} earned from {} daily sales",
                daily_investment.round_dp(2),
                earned.round_dp(2),
                sales.normalize()
            ));
        }
    }
    debug!(%daily_investment, warnings = warnings.len(), "positioning recomputed");

    Some(PositioningResults {
        daily_clicks,
        daily_clicks_rounded,
        daily_investment,
        warnings,
    })
}
