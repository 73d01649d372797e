//! Static printing cost table for printed editions.

use crate::{BookSize, InteriorType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Page count below which standard color interiors cannot be printed.
const COLOR_STANDARD_MAX_REJECTED_PAGES: u32 = 72;

/// One row of the printing cost table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintingCostTier {
    pub interior: InteriorType,
    pub size: BookSize,
    /// Inclusive upper bound on pages; `None` means unbounded.
    pub page_threshold: Option<u32>,
    /// Flat cost per copy.
    pub fixed_cost: Decimal,
    /// Added once per page.
    pub per_page_cost: Decimal,
}

/// Result of a printing cost lookup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintingCost {
    /// Fixed cost of the matched tier.
    pub fixed_cost: Decimal,
    /// Per-page cost of the matched tier.
    pub per_page_cost: Decimal,
    /// `pages * per_page_cost + fixed_cost`; zero when invalid.
    pub total_cost: Decimal,
    /// False when inputs are missing or the configuration cannot be printed.
    pub is_valid: bool,
    /// Set when the configuration is invalid for a reason worth telling the user.
    pub error: Option<String>,
}

impl PrintingCost {
    fn invalid(error: Option<String>) -> Self {
        Self {
            fixed_cost: Decimal::ZERO,
            per_page_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            is_valid: false,
            error,
        }
    }
}

// (interior, size, threshold, fixed cost in cents, per-page cost in thousandths)
const TABLE: [(InteriorType, BookSize, Option<u32>, i64, i64); 10] = [
    (InteriorType::BN, BookSize::Small, Some(108), 205, 0),
    (InteriorType::BN, BookSize::Small, None, 75, 12),
    (InteriorType::BN, BookSize::Large, Some(108), 248, 0),
    (InteriorType::BN, BookSize::Large, None, 75, 16),
    (InteriorType::ColorPremium, BookSize::Small, Some(40), 303, 0),
    (InteriorType::ColorPremium, BookSize::Small, None, 75, 53),
    (InteriorType::ColorPremium, BookSize::Large, Some(40), 363, 0),
    (InteriorType::ColorPremium, BookSize::Large, None, 75, 72),
    (InteriorType::ColorStandard, BookSize::Small, None, 75, 24),
    (InteriorType::ColorStandard, BookSize::Large, None, 75, 35),
];

/// All tiers of the printing cost table, in table order.
pub fn printing_tiers() -> Vec<PrintingCostTier> {
    TABLE
        .iter()
        .map(|&(interior, size, page_threshold, fixed, per_page)| PrintingCostTier {
            interior,
            size,
            page_threshold,
            fixed_cost: Decimal::new(fixed, 2),
            per_page_cost: Decimal::new(per_page, 3),
        })
        .collect()
}

/// Minimum printable page count for an interior.
pub fn min_pages(interior: InteriorType) -> u32 {
    match interior {
        InteriorType::ColorStandard => COLOR_STANDARD_MAX_REJECTED_PAGES + 1,
        InteriorType::BN | InteriorType::ColorPremium => 24,
    }
}

/// Raise a page count to the interior's minimum.
pub fn clamp_pages(interior: InteriorType, pages: u32) -> u32 {
    pages.max(min_pages(interior))
}

/// Look up the printing cost for an interior, trim size and page count.
///
/// Missing inputs or a zero page count yield an invalid result without an
/// error message. Standard color with 72 pages or fewer is rejected with a
/// message. Otherwise the tier with the smallest threshold covering `pages`
/// applies and `total = pages * per_page + fixed`.
pub fn calculate_printing_cost(
    interior: Option<InteriorType>,
    size: Option<BookSize>,
    pages: Option<u32>,
) -> PrintingCost {
    let (interior, size, pages) = match (interior, size, pages) {
        (Some(i), Some(s), Some(p)) if p > 0 => (i, s, p),
        _ => return PrintingCost::invalid(None),
    };
    if interior == InteriorType::ColorStandard && pages <= COLOR_STANDARD_MAX_REJECTED_PAGES {
        return PrintingCost::invalid(Some(format!(
            "Standard color interiors require at least {} pages",
            min_pages(interior)
        )));
    }

    let mut tiers: Vec<PrintingCostTier> = printing_tiers()
        .into_iter()
        .filter(|t| t.interior == interior && t.size == size)
        .collect();
    // Unbounded tiers sort last.
    tiers.sort_by_key(|t| t.page_threshold.unwrap_or(u32::MAX));
    let Some(tier) = tiers
        .into_iter()
        .find(|t| t.page_threshold.map_or(true, |max| pages <= max))
    else {
        return PrintingCost::invalid(Some(format!(
            "no printing tier covers {pages} pages"
        )));
    };
    debug!(?interior, ?size, pages, threshold = ?tier.page_threshold, "printing tier selected");

    PrintingCost {
        fixed_cost: tier.fixed_cost,
        per_page_cost: tier.per_page_cost,
        total_cost: Decimal::from(pages) * tier.per_page_cost + tier.fixed_cost,
        is_valid: true,
        error: None,
    }
}
