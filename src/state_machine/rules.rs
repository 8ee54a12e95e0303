//! Per-financing-category rule table
//!
//! Everything that derives legal downstream options from earlier answers
//! lives here, so that forward transitions and back-navigation regenerate
//! menus from the same predicates instead of caching them.

use super::state::{AmountCode, AmountSelection, FinancingType};

/// Amounts at or above this value (in currency units) force the
/// firm-only applicant menu and the post-submission advisory.
pub const LARGE_AMOUNT: f64 = 10_000_000_000.0;

/// Minimum manual amount for Islamic financing (USD).
pub const ISLAMIC_MINIMUM: f64 = 300_000.0;

/// Minimum manual amount for large credit (UZS).
pub const LARGE_CREDIT_MINIMUM: f64 = 300_000_000.0;

/// Predefined amount codes legal for a financing category.
pub fn amount_codes(financing: FinancingType) -> &'static [AmountCode] {
    match financing {
        FinancingType::Islamic => &[AmountCode::IslamicFrom300K],
        FinancingType::Cash => &[AmountCode::CashUpTo300M, AmountCode::CashForeign],
        FinancingType::LargeCredit => &[AmountCode::WorkingCapitalUpTo10B, AmountCode::Above10B],
    }
}

/// Minimum threshold carried into `AmountManualInput`.
///
/// Cash credit has no fixed floor; the value must merely be strictly
/// positive, which `validate_manual` enforces separately.
pub fn manual_minimum(financing: FinancingType) -> f64 {
    match financing {
        FinancingType::Islamic => ISLAMIC_MINIMUM,
        FinancingType::Cash => 0.0,
        FinancingType::LargeCredit => LARGE_CREDIT_MINIMUM,
    }
}

/// Why a parsed manual amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRejection {
    /// Below the category's fixed minimum.
    BelowMinimum,
    /// Cash amounts must be strictly positive.
    NotPositive,
}

/// Validate a parsed manual amount against the threshold in effect.
pub fn validate_manual(
    financing: FinancingType,
    min_amount: f64,
    value: f64,
) -> Result<(), AmountRejection> {
    match financing {
        FinancingType::Cash => {
            if value <= 0.0 {
                Err(AmountRejection::NotPositive)
            } else {
                Ok(())
            }
        }
        FinancingType::Islamic | FinancingType::LargeCredit => {
            if value < min_amount {
                Err(AmountRejection::BelowMinimum)
            } else {
                Ok(())
            }
        }
    }
}

/// Parse a typed amount, accepting a comma as the decimal separator.
pub fn parse_manual_amount(text: &str) -> Option<f64> {
    let normalized = text.trim().replace(',', ".");
    let value: f64 = normalized.parse().ok()?;
    // `f64::from_str` accepts "inf" and "NaN" spellings.
    value.is_finite().then_some(value)
}

/// Whether the recorded amount qualifies as large.
pub fn amount_is_large(amount: &AmountSelection) -> bool {
    match amount {
        AmountSelection::Code { code } => {
            matches!(code, AmountCode::WorkingCapitalUpTo10B | AmountCode::Above10B)
        }
        AmountSelection::Manual { value } => *value >= LARGE_AMOUNT,
    }
}

/// Whether only the firm applicant option may be offered.
///
/// Recomputed wherever the applicant menu is (re)generated, so that
/// back-navigation shows exactly the menu the forward path showed.
pub fn restricted_applicants(financing: FinancingType, amount: Option<&AmountSelection>) -> bool {
    matches!(financing, FinancingType::Islamic | FinancingType::LargeCredit)
        || amount.is_some_and(amount_is_large)
}

/// Whether the completed application triggers the large-amount advisory.
pub fn advisory_applies(amount: &AmountSelection) -> bool {
    amount_is_large(amount)
}
