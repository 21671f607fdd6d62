use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use thiserror::Error;

pub const MIN_YEARS_OF_SERVICE: u32 = 1;
pub const MAX_YEARS_OF_SERVICE: u32 = 100;
pub const MAX_SEVERANCE_PAY: u64 = 1_000_000_000_000;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TaxError {
    #[error("Invalid argument. {reason}")]
    InvalidArgument { reason: String },
}

impl TaxError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        TaxError::InvalidArgument {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TaxError>;

/// Request record for one severance pay calculation.
///
/// Built only through [`super::validate_input`] or after [`super::check_ranges`];
/// the engine assumes every field is already in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct SeverancePayTaxInput {
    #[serde(deserialize_with = "whole_number")]
    pub years_of_service: u32,
    pub is_disability: bool,
    pub is_officer: bool,
    #[serde(deserialize_with = "whole_number")]
    pub severance_pay: u64,
}

/// Reads a JSON number by value, so `6`, `6.0` and `6e0` are all `6`.
fn whole_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let number = serde_json::Number::deserialize(deserializer)?;
    number
        .as_u64()
        .or_else(|| {
            number
                .as_f64()
                .filter(|v| v.fract() == 0.0 && *v >= 0.0)
                .map(|v| v as u64)
        })
        .and_then(|v| T::try_from(v).ok())
        .ok_or_else(|| {
            D::Error::custom(format!("expected a non-negative whole number, got {number}"))
        })
}

/// Every intermediate amount of the pipeline, all in yen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    pub retirement_income_deduction: u64,
    pub taxable_retirement_income: u64,
    pub income_tax_base: u64,
    pub tax: u64,
}

/// One row of the progressive table. `rate_permille` is the marginal rate in
/// thousandths so that `lower_bound`-aligned amounts multiply exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxBracket {
    pub lower_bound: u64,
    pub rate_permille: u64,
    pub subtraction: u64,
}
