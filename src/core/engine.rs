use serde_json::Value;

use super::types::{Result, SeverancePayTaxInput, TaxBracket, TaxBreakdown};
use super::validate::validate_input;

const ROUNDING_UNIT: u64 = 1_000;

const FIRST_YEAR_DEDUCTION: u64 = 800_000;
const SHORT_SERVICE_DEDUCTION_PER_YEAR: u64 = 400_000;
const LONG_SERVICE_THRESHOLD_YEARS: u32 = 20;
const LONG_SERVICE_BASE_DEDUCTION: u64 = 8_000_000;
const LONG_SERVICE_DEDUCTION_PER_YEAR: u64 = 700_000;
const DISABILITY_DEDUCTION: u64 = 1_000_000;

const HALVING_SERVICE_YEARS: u32 = 6;
const SHORT_SERVICE_HALF_RELIEF_CAP: u64 = 3_000_000;

// 102.1% of the base tax, i.e. income tax plus the reconstruction surtax.
const SURTAX_NUMERATOR: u64 = 1_021;
const SURTAX_DENOMINATOR: u64 = 1_000;

/// Progressive table for taxable retirement income, ascending by lower bound.
/// Amounts below the first bound are not taxed.
pub const INCOME_TAX_BRACKETS: [TaxBracket; 7] = [
    TaxBracket {
        lower_bound: 1_000,
        rate_permille: 50,
        subtraction: 0,
    },
    TaxBracket {
        lower_bound: 1_950_000,
        rate_permille: 100,
        subtraction: 97_500,
    },
    TaxBracket {
        lower_bound: 3_300_000,
        rate_permille: 200,
        subtraction: 427_500,
    },
    TaxBracket {
        lower_bound: 6_950_000,
        rate_permille: 230,
        subtraction: 636_000,
    },
    TaxBracket {
        lower_bound: 9_000_000,
        rate_permille: 330,
        subtraction: 1_536_000,
    },
    TaxBracket {
        lower_bound: 18_000_000,
        rate_permille: 400,
        subtraction: 2_796_000,
    },
    TaxBracket {
        lower_bound: 40_000_000,
        rate_permille: 450,
        subtraction: 4_796_000,
    },
];

/// Validates `raw` and returns the yen amount to withhold from the payment.
pub fn compute_severance_pay_withholding_tax(raw: &Value) -> Result<u64> {
    let input = validate_input(raw)?;
    Ok(compute_breakdown(&input).tax)
}

pub fn compute_breakdown(input: &SeverancePayTaxInput) -> TaxBreakdown {
    let deduction = retirement_income_deduction(input.years_of_service, input.is_disability);
    let taxable = taxable_retirement_income(
        input.years_of_service,
        input.severance_pay,
        deduction,
        input.is_officer,
    );
    let base = income_tax_base(taxable);

    TaxBreakdown {
        retirement_income_deduction: deduction,
        taxable_retirement_income: taxable,
        income_tax_base: base,
        tax: tax_withheld(base),
    }
}

pub fn retirement_income_deduction(years_of_service: u32, is_disability: bool) -> u64 {
    let years = u64::from(years_of_service);
    let base = if years_of_service == 1 {
        FIRST_YEAR_DEDUCTION
    } else if years_of_service < LONG_SERVICE_THRESHOLD_YEARS {
        SHORT_SERVICE_DEDUCTION_PER_YEAR * years
    } else {
        let extra_years = years - u64::from(LONG_SERVICE_THRESHOLD_YEARS);
        LONG_SERVICE_BASE_DEDUCTION + LONG_SERVICE_DEDUCTION_PER_YEAR * extra_years
    };

    if is_disability {
        base + DISABILITY_DEDUCTION
    } else {
        base
    }
}

/// Taxable base after the deduction, rounded down to the nearest 1,000 yen.
///
/// Six or more years of service always get the 50% relief. Officers with five years
/// or fewer get none. Other employees with five years or fewer get the relief only
/// on the first 3,000,000 yen of the excess.
pub fn taxable_retirement_income(
    years_of_service: u32,
    severance_pay: u64,
    deduction: u64,
    is_officer: bool,
) -> u64 {
    let excess = severance_pay.saturating_sub(deduction);

    if years_of_service >= HALVING_SERVICE_YEARS {
        return round_down(excess / 2);
    }

    if is_officer {
        return round_down(excess);
    }

    if excess > SHORT_SERVICE_HALF_RELIEF_CAP {
        return SHORT_SERVICE_HALF_RELIEF_CAP / 2
            + round_down(excess - SHORT_SERVICE_HALF_RELIEF_CAP);
    }

    round_down(excess / 2)
}

/// Base income tax before the surtax.
///
/// The input is floored to 1,000 yen first. Every rate is a whole number of
/// thousandths, so the product is exact and no sub-yen remainder is dropped here.
pub fn income_tax_base(taxable_retirement_income: u64) -> u64 {
    let taxable = round_down(taxable_retirement_income);

    INCOME_TAX_BRACKETS
        .iter()
        .rev()
        .find(|bracket| taxable >= bracket.lower_bound)
        .map(|bracket| {
            (taxable / ROUNDING_UNIT * bracket.rate_permille).saturating_sub(bracket.subtraction)
        })
        .unwrap_or(0)
}

/// Applies the 2.1% surtax and floors to whole yen.
///
/// Split on the denominator so the product cannot overflow before the division.
/// Saturates at `u64::MAX` for bases above roughly 1.8e19 yen.
pub fn tax_withheld(income_tax_base: u64) -> u64 {
    let whole = (income_tax_base / SURTAX_DENOMINATOR).saturating_mul(SURTAX_NUMERATOR);
    let remainder = income_tax_base % SURTAX_DENOMINATOR * SURTAX_NUMERATOR / SURTAX_DENOMINATOR;
    whole.saturating_add(remainder)
}

fn round_down(amount: u64) -> u64 {
    amount / ROUNDING_UNIT * ROUNDING_UNIT
}
