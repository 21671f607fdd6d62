use serde::Deserialize;
use serde_json::Value;

use super::types::{
    MAX_SEVERANCE_PAY, MAX_YEARS_OF_SERVICE, MIN_YEARS_OF_SERVICE, Result, SeverancePayTaxInput,
    TaxError,
};

/// Turns an untyped payload into a [`SeverancePayTaxInput`].
///
/// The whole record is checked at once: the payload must be an object with exactly
/// the four camelCase keys, booleans for the flags, whole JSON numbers for the
/// amounts (`6.0` counts as `6`), and every value in range.
/// Any violation yields a single [`TaxError::InvalidArgument`].
pub fn validate_input(raw: &Value) -> Result<SeverancePayTaxInput> {
    // serde would otherwise accept a positional array for a struct
    if !raw.is_object() {
        return Err(TaxError::invalid("payload must be a JSON object"));
    }

    let input = SeverancePayTaxInput::deserialize(raw)
        .map_err(|e| TaxError::invalid(e.to_string()))?;
    check_ranges(&input)?;
    Ok(input)
}

pub fn check_ranges(input: &SeverancePayTaxInput) -> Result<()> {
    if !(MIN_YEARS_OF_SERVICE..=MAX_YEARS_OF_SERVICE).contains(&input.years_of_service) {
        return Err(TaxError::invalid(format!(
            "yearsOfService must be between {MIN_YEARS_OF_SERVICE} and {MAX_YEARS_OF_SERVICE}"
        )));
    }

    if input.severance_pay > MAX_SEVERANCE_PAY {
        return Err(TaxError::invalid(format!(
            "severancePay must be between 0 and {MAX_SEVERANCE_PAY}"
        )));
    }

    Ok(())
}
