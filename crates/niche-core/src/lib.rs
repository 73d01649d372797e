#![deny(warnings)]

//! Core domain models and invariants for the niche pricing calculator.
//!
//! This crate defines the serializable input types shared by every engine,
//! the static printing cost table, and validation helpers that callers run
//! before committing user input.

mod config;
mod printing;

pub use config::Assumptions;
pub use printing::{
    calculate_printing_cost, clamp_pages, min_pages, printing_tiers, PrintingCost,
    PrintingCostTier,
};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marketplace storefront the book is listed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Marketplace {
    /// Spanish storefront, prices include VAT.
    ES,
    /// US storefront, no VAT.
    COM,
}

impl Marketplace {
    /// Storefront code as shown to users.
    pub fn code(self) -> &'static str {
        match self {
            Marketplace::ES => "ES",
            Marketplace::COM => "COM",
        }
    }

    /// Static currency symbol for the storefront.
    pub fn currency_symbol(self) -> &'static str {
        match self {
            Marketplace::ES => "€",
            Marketplace::COM => "$",
        }
    }

    /// Whether list prices on this storefront carry VAT.
    pub fn has_vat(self) -> bool {
        matches!(self, Marketplace::ES)
    }
}

/// Book format under evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatType {
    /// Digital edition.
    Ebook,
    /// Printed edition (paperback or hardcover presentation).
    Paperback,
}

impl FormatType {
    /// Human readable name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            FormatType::Ebook => "Ebook",
            FormatType::Paperback => "Paperback",
        }
    }
}

/// Interior print quality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InteriorType {
    /// Black and white.
    BN,
    /// Premium color.
    ColorPremium,
    /// Standard color.
    ColorStandard,
}

/// Trim size bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookSize {
    /// Standard trims; cheaper per page.
    Small,
    /// Large trims.
    Large,
}

/// Display-only binding label for printed editions. Costs are identical.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BindingLabel {
    #[default]
    Paperback,
    /// Shown as hardcover; priced like a paperback.
    Hardcover,
}

/// Ebook royalty plan offered by the marketplace.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EbookRoyaltyRate {
    /// 70% plan, charges a delivery fee per MB.
    #[default]
    #[serde(rename = "70")]
    Seventy,
    /// 35% plan, no delivery fee.
    #[serde(rename = "35")]
    ThirtyFive,
}

impl EbookRoyaltyRate {
    /// Rate expressed in percent (70 or 35).
    pub fn percent(self) -> Decimal {
        match self {
            EbookRoyaltyRate::Seventy => Decimal::new(70, 0),
            EbookRoyaltyRate::ThirtyFive => Decimal::new(35, 0),
        }
    }
}

/// Inputs shared by every engine.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlobalData {
    /// Storefront; decides VAT and the currency shown.
    pub marketplace: Option<Marketplace>,
    /// Target margin in percent (0–100).
    pub target_margin_pct: Option<Decimal>,
    /// Estimated cost per advertising click (>= 0).
    pub cpc: Option<Decimal>,
    /// Daily sales of the competitor being benchmarked (>= 0).
    pub competitor_daily_sales: Option<Decimal>,
    /// Format that drives scoring and saved metrics.
    pub selected_format: Option<FormatType>,
}

/// Ebook-specific inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EbookData {
    /// List price (PVP), VAT included where applicable.
    pub list_price: Option<Decimal>,
    /// Royalty plan; 70% unless chosen otherwise.
    pub royalty_rate: EbookRoyaltyRate,
    /// File size in MB, drives the delivery fee on the 70% plan.
    pub file_size_mb: Option<Decimal>,
    /// Audiovisual content is taxed at 21% instead of 4% in ES.
    pub audiovisual: bool,
}

/// Printed edition inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaperbackData {
    /// Interior print quality.
    pub interior: Option<InteriorType>,
    /// Trim size bucket.
    pub size: Option<BookSize>,
    /// List price (PVP), VAT included where applicable.
    pub list_price: Option<Decimal>,
    /// Page count; color standard needs more than 72.
    pub pages: Option<u32>,
    /// Cosmetic binding label.
    #[serde(default)]
    pub binding: BindingLabel,
}

/// Diagnosis level attached to per-format results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Diagnosis {
    /// Healthy room for advertising.
    Good,
    /// Viable but tight.
    Warning,
    /// Advertising loses money.
    Bad,
}

/// Validation errors for user-entered values.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Price, cost, sales or size must be non-negative.
    #[error("{0} must not be negative")]
    Negative(&'static str),
    /// Target margin must be within [0, 100].
    #[error("target margin must be within [0,100], got {0}")]
    MarginOutOfRange(Decimal),
    /// Page count is below the interior's minimum.
    #[error("{interior:?} interiors need at least {min} pages, got {pages}")]
    TooFewPages {
        interior: InteriorType,
        min: u32,
        pages: u32,
    },
    /// Scenario names must contain something other than whitespace.
    #[error("scenario name must not be empty")]
    EmptyName,
    /// Assumption value outside its accepted range.
    #[error("invalid assumption: {0}")]
    InvalidAssumption(&'static str),
}

fn non_negative(value: Option<Decimal>, field: &'static str) -> Result<(), ValidationError> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(ValidationError::Negative(field)),
        _ => Ok(()),
    }
}

/// Validate shared inputs. Missing values are accepted.
pub fn validate_global(g: &GlobalData) -> Result<(), ValidationError> {
    if let Some(m) = g.target_margin_pct {
        if m < Decimal::ZERO || m > Decimal::ONE_HUNDRED {
            return Err(ValidationError::MarginOutOfRange(m));
        }
    }
    non_negative(g.cpc, "cpc")?;
    non_negative(g.competitor_daily_sales, "competitor daily sales")?;
    Ok(())
}

/// Validate ebook inputs.
pub fn validate_ebook(e: &EbookData) -> Result<(), ValidationError> {
    non_negative(e.list_price, "list price")?;
    non_negative(e.file_size_mb, "file size")?;
    Ok(())
}

/// Validate printed edition inputs, including the interior page minimum.
pub fn validate_paperback(p: &PaperbackData) -> Result<(), ValidationError> {
    non_negative(p.list_price, "list price")?;
    if let (Some(interior), Some(pages)) = (p.interior, p.pages) {
        let min = min_pages(interior);
        if pages < min {
            return Err(ValidationError::TooFewPages {
                interior,
                min,
                pages,
            });
        }
    }
    Ok(())
}

/// Validate a scenario name before it is handed to the store.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }
    Ok(())
}
