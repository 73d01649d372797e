//! Tunable business constants used by the engines.

use crate::ValidationError;
use anyhow::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Business assumptions consumed by the royalty, positioning and scoring engines.
///
/// `Default` yields the marketplace's published figures. Partial YAML files
/// fall back to those defaults field by field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Assumptions {
    /// Ebook delivery fee per started MB on the 70% plan.
    pub ebook_delivery_cost_per_mb: Decimal,
    /// ES VAT percent for regular ebooks.
    pub ebook_vat_pct: Decimal,
    /// ES VAT percent for ebooks with audiovisual content.
    pub ebook_audiovisual_vat_pct: Decimal,
    /// ES VAT percent for printed editions.
    pub paperback_vat_pct: Decimal,
    /// Prices strictly below this earn the low printed royalty rate.
    pub paperback_royalty_break: Decimal,
    pub paperback_low_royalty: Decimal,
    pub paperback_high_royalty: Decimal,
    /// Target margin (fraction) used when none is entered.
    pub default_target_margin: Decimal,
    /// Click-to-sale rate assumed when sizing a campaign against a competitor.
    pub reference_conversion_rate: Decimal,
    /// Spend above `ratio * avg royalty * competitor sales` is flagged.
    pub spend_warning_ratio: Decimal,
}

impl Default for Assumptions {
    fn default() -> Self {
        Self {
            ebook_delivery_cost_per_mb: Decimal::new(12, 2),
            ebook_vat_pct: Decimal::new(4, 0),
            ebook_audiovisual_vat_pct: Decimal::new(21, 0),
            paperback_vat_pct: Decimal::new(4, 0),
            paperback_royalty_break: Decimal::new(999, 2),
            paperback_low_royalty: Decimal::new(50, 2),
            paperback_high_royalty: Decimal::new(60, 2),
            default_target_margin: Decimal::new(30, 2),
            reference_conversion_rate: Decimal::new(10, 2),
            spend_warning_ratio: Decimal::new(5, 1),
        }
    }
}

impl Assumptions {
    /// Parse assumptions from YAML and validate them.
    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let a: Assumptions = serde_yaml::from_str(text).context("parsing assumptions yaml")?;
        a.validate()?;
        Ok(a)
    }

    /// Read and parse an assumptions file.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading assumptions from {}", path.display()))?;
        Self::from_yaml_str(&text)
    }

    /// Check ranges: rates are fractions in (0, 1], fees and VAT non-negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fraction = |v: Decimal| v > Decimal::ZERO && v <= Decimal::ONE;
        if self.ebook_delivery_cost_per_mb < Decimal::ZERO {
            return Err(ValidationError::InvalidAssumption("ebook_delivery_cost_per_mb"));
        }
        for (v, name) in [
            (self.ebook_vat_pct, "ebook_vat_pct"),
            (self.ebook_audiovisual_vat_pct, "ebook_audiovisual_vat_pct"),
            (self.paperback_vat_pct, "paperback_vat_pct"),
        ] {
            if v < Decimal::ZERO || v >= Decimal::ONE_HUNDRED {
                return Err(ValidationError::InvalidAssumption(name));
            }
        }
        if self.paperback_royalty_break <= Decimal::ZERO {
            return Err(ValidationError::InvalidAssumption("paperback_royalty_break"));
        }
        for (v, name) in [
            (self.paperback_low_royalty, "paperback_low_royalty"),
            (self.paperback_high_royalty, "paperback_high_royalty"),
            (self.reference_conversion_rate, "reference_conversion_rate"),
        ] {
            if !fraction(v) {
                return Err(ValidationError::InvalidAssumption(name));
            }
        }
        if self.default_target_margin < Decimal::ZERO || self.default_target_margin >= Decimal::ONE
        {
            return Err(ValidationError::InvalidAssumption("default_target_margin"));
        }
        if self.spend_warning_ratio < Decimal::ZERO {
            return Err(ValidationError::InvalidAssumption("spend_warning_ratio"));
        }
        Ok(())
    }
}
