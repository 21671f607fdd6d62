mod engine;
mod types;
mod validate;

pub use engine::{
    INCOME_TAX_BRACKETS, compute_breakdown, compute_severance_pay_withholding_tax,
    income_tax_base, retirement_income_deduction, tax_withheld, taxable_retirement_income,
};
pub use types::{
    MAX_SEVERANCE_PAY, MAX_YEARS_OF_SERVICE, MIN_YEARS_OF_SERVICE, Result,
    SeverancePayTaxInput, TaxBracket, TaxBreakdown, TaxError,
};
pub use validate::{check_ranges, validate_input};
