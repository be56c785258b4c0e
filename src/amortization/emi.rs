use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};

/// Fixed monthly installment (EMI) that retires `principal` in
/// `tenure_months` payments at `annual_rate`.
///
/// `EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r = rate / 12 / 100`.
/// An exactly zero rate divides the principal evenly instead. The result is
/// unrounded; callers round to currency precision when materializing.
///
/// Valid terms are a precondition (`principal > 0`, `tenure_months >= 1`,
/// `rate >= 0`); [`crate::LoanTerms`] enforces them.
pub fn compute_installment(principal: Money, annual_rate: Rate, tenure_months: u32) -> Decimal {
    debug_assert!(tenure_months > 0, "tenure must be at least one month");

    let p = principal.as_decimal();
    let n = Decimal::from(tenure_months);
    let r = annual_rate.monthly_rate();

    if r.is_zero() {
        return p / n;
    }

    match compound_factor(r, tenure_months) {
        // (1 + r) rounded to one at decimal precision
        Some(factor) if factor <= Decimal::ONE => p / n,
        Some(factor) => p * r * (factor / (factor - Decimal::ONE)),
        // factor beyond decimal range: f / (f - 1) is one at every representable digit
        None => p * r,
    }
}

/// total interest paid over the tenure, unrounded
pub fn total_interest(principal: Money, annual_rate: Rate, tenure_months: u32) -> Decimal {
    compute_installment(principal, annual_rate, tenure_months) * Decimal::from(tenure_months)
        - principal.as_decimal()
}

/// (1 + r)^n, or None if it overflows
pub(crate) fn compound_factor(monthly_rate: Decimal, months: u32) -> Option<Decimal> {
    let base = Decimal::ONE + monthly_rate;
    let mut factor = Decimal::ONE;
    for _ in 0..months {
        factor = factor.checked_mul(base)?;
    }
    Some(factor)
}
