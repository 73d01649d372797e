//! Comparative views over saved niches.

use niche_core::{FormatType, Marketplace};
use niche_score::ViabilityStatus;
use persistence::{best_niche, SavedNiche};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Column order of the tabular export.
pub const EXPORT_COLUMNS: [&str; 11] = [
    "Name",
    "Marketplace",
    "Format",
    "PVP",
    "CPC",
    "Sales/day",
    "MaxClicks",
    "BACOS",
    "Investment",
    "Score",
    "Status",
];

/// Ordering of the comparison table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    /// Highest score first; ties keep save order.
    #[default]
    Score,
    /// Case-insensitive name.
    Name,
    /// Most recently updated first.
    Updated,
}

/// Filter and ordering for the comparison table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankQuery {
    /// Case-insensitive substring of the name.
    pub search: Option<String>,
    /// Only niches with this verdict.
    pub status: Option<ViabilityStatus>,
    /// Only niches scored for this format.
    pub format: Option<FormatType>,
    /// Only niches targeting this storefront.
    pub marketplace: Option<Marketplace>,
    pub sort: SortKey,
}

impl RankQuery {
    fn matches(&self, n: &SavedNiche) -> bool {
        if let Some(q) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            if !n.name.to_lowercase().contains(&q.to_lowercase()) {
                return false;
            }
        }
        let status = n.snapshot.score.as_ref().map(|s| s.status);
        if self.status.is_some() && self.status != status {
            return false;
        }
        if self.format.is_some() && self.format != n.snapshot.global.selected_format {
            return false;
        }
        if self.marketplace.is_some() && self.marketplace != n.snapshot.global.marketplace {
            return false;
        }
        true
    }
}

/// Highest scoring niche; the first saved wins ties.
pub fn best(niches: &[SavedNiche]) -> Option<&SavedNiche> {
    best_niche(niches)
}

/// Niches matching `query`, in the requested order.
pub fn rank<'a>(niches: &'a [SavedNiche], query: &RankQuery) -> Vec<&'a SavedNiche> {
    let mut out: Vec<&SavedNiche> = niches.iter().filter(|n| query.matches(n)).collect();
    match query.sort {
        SortKey::Score => {
            out.sort_by(|a, b| b.snapshot.total_score().cmp(&a.snapshot.total_score()))
        }
        SortKey::Name => out.sort_by_key(|n| n.name.to_lowercase()),
        SortKey::Updated => out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at)),
    }
    out
}

/// Raw values behind one export line, in [`EXPORT_COLUMNS`] order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Niche name as saved.
    pub name: String,
    /// Storefront the scenario targets.
    pub marketplace: Option<Marketplace>,
    /// Format the score was computed for.
    pub format: Option<FormatType>,
    /// List price of the active format (PVP).
    pub list_price: Option<Decimal>,
    /// Cost per click.
    pub cpc: Option<Decimal>,
    /// Competitor's daily sales used for positioning.
    pub competitor_daily_sales: Option<Decimal>,
    /// Breakeven clicks per sale of the active format.
    pub max_clicks_per_sale: Option<u64>,
    /// BACOS of the active format, in percent.
    pub bacos: Option<Decimal>,
    /// Daily ad spend needed to match the competitor.
    pub daily_investment: Option<Decimal>,
    /// Total viability score, 0 to 100.
    pub score: Option<u32>,
    /// Verdict derived from `score`.
    pub status: Option<ViabilityStatus>,
}

/// Flatten a saved niche's current snapshot into one export line.
pub fn export_row(n: &SavedNiche) -> ExportRow {
    let s = &n.snapshot;
    ExportRow {
        name: n.name.clone(),
        marketplace: s.global.marketplace,
        format: s.global.selected_format,
        list_price: s.list_price,
        cpc: s.global.cpc,
        competitor_daily_sales: s.global.competitor_daily_sales,
        max_clicks_per_sale: s.max_clicks_per_sale,
        bacos: s.bacos,
        daily_investment: s.daily_investment,
        score: s.score.as_ref().map(|b| b.total_score),
        status: s.score.as_ref().map(|b| b.status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use niche_core::GlobalData;
    use niche_score::ScoreBreakdown;
    use persistence::{MemoryStore, NicheSnapshot, NicheStore};

    fn snap(total: Option<u32>, format: FormatType, market: Marketplace) -> NicheSnapshot {
        NicheSnapshot {
            global: GlobalData {
                marketplace: Some(market),
                selected_format: Some(format),
                cpc: Some(Decimal::new(30, 2)),
                ..Default::default()
            },
            list_price: Some(Decimal::new(999, 2)),
            score: total.map(|t| {
                let status = ViabilityStatus::from_score(t);
                ScoreBreakdown {
                    clicks_score: 0,
                    bacos_score: 0,
                    price_vs_min_score: 0,
                    total_score: t,
                    clicks_capped: false,
                    status,
                    status_label: status.label().into(),
                    status_emoji: status.emoji().into(),
                    status_color: status.color().into(),
                }
            }),
            ..Default::default()
        }
    }

    fn sample() -> Vec<SavedNiche> {
        let mut store = NicheStore::load(MemoryStore::new());
        store.save("Sudoku", snap(Some(55), FormatType::Paperback, Marketplace::ES));
        store.save("alphabet", snap(Some(85), FormatType::Ebook, Marketplace::COM));
        store.save("Recipes", snap(None, FormatType::Paperback, Marketplace::COM));
        store.save("Mandalas", snap(Some(85), FormatType::Paperback, Marketplace::ES));
        store.list().to_vec()
    }

    #[test]
    fn best_breaks_ties_by_save_order() {
        let niches = sample();
        assert_eq!(best(&niches).unwrap().name, "alphabet");
        assert!(best(&[]).is_none());
    }

    #[test]
    fn score_sort_is_stable() {
        let niches = sample();
        let names: Vec<&str> = rank(&niches, &RankQuery::default())
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(names, ["alphabet", "Mandalas", "Sudoku", "Recipes"]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let niches = sample();
        let q = RankQuery {
            sort: SortKey::Name,
            ..Default::default()
        };
        let names: Vec<&str> = rank(&niches, &q).iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, ["alphabet", "Mandalas", "Recipes", "Sudoku"]);
    }

    #[test]
    fn filters_combine() {
        let niches = sample();
        let q = RankQuery {
            format: Some(FormatType::Paperback),
            marketplace: Some(Marketplace::ES),
            ..Default::default()
        };
        assert_eq!(rank(&niches, &q).len(), 2);
        let q = RankQuery {
            status: Some(ViabilityStatus::Excellent),
            search: Some("  MAND ".into()),
            ..Default::default()
        };
        let hits = rank(&niches, &q);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Mandalas");
    }

    #[test]
    fn export_row_follows_snapshot() {
        let niches = sample();
        let row = export_row(&niches[0]);
        assert_eq!(row.name, "Sudoku");
        assert_eq!(row.marketplace, Some(Marketplace::ES));
        assert_eq!(row.format, Some(FormatType::Paperback));
        assert_eq!(row.cpc, Some(Decimal::new(30, 2)));
        assert_eq!(row.score, Some(55));
        assert_eq!(row.status, Some(ViabilityStatus::Viable));
        let row = export_row(&niches[2]);
        assert_eq!(row.score, None);
        assert_eq!(row.status, None);
        assert_eq!(EXPORT_COLUMNS.len(), 11);
    }
}
