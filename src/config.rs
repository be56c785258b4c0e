use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::{calendar, emi};
use crate::decimal::{Money, Rate};
use crate::errors::{Result, TrackerError};
use crate::types::{RoundingPolicy, SubscriptionCategory};

/// latest day of month accepted for due and billing days; valid in every month
pub const MAX_DUE_DAY: u32 = 28;

/// longest accepted tenure, 100 years
pub const MAX_TENURE_MONTHS: u32 = 1200;

/// largest accepted `(1 + r)^n`; beyond it the principal part of early
/// installments falls below decimal precision and the schedule stops
/// retiring the loan
pub const MAX_COMPOUND_FACTOR: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// validated loan terms
///
/// Construction goes through [`LoanTerms::new`] (or deserialization, which
/// runs the same checks), so every value of this type satisfies:
/// principal > 0, rate >= 0, tenure in 1..=1200, due day in 1..=28,
/// `(1 + r)^n` at most [`MAX_COMPOUND_FACTOR`], and every due date of the
/// schedule is a representable calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLoanTerms")]
pub struct LoanTerms {
    principal: Money,
    annual_rate: Rate,
    tenure_months: u32,
    start_date: NaiveDate,
    due_day: u32,
}

#[derive(Deserialize)]
struct RawLoanTerms {
    principal: Money,
    annual_rate: Rate,
    tenure_months: u32,
    start_date: NaiveDate,
    due_day: u32,
}

impl TryFrom<RawLoanTerms> for LoanTerms {
    type Error = TrackerError;

    fn try_from(raw: RawLoanTerms) -> Result<Self> {
        LoanTerms::new(
            raw.principal,
            raw.annual_rate,
            raw.tenure_months,
            raw.start_date,
            raw.due_day,
        )
    }
}

impl LoanTerms {
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        tenure_months: u32,
        start_date: NaiveDate,
        due_day: u32,
    ) -> Result<Self> {
        if !principal.is_positive() {
            return Err(TrackerError::InvalidTerms {
                message: format!("principal must be positive, got {}", principal),
            });
        }

        if annual_rate.is_negative() {
            return Err(TrackerError::InvalidTerms {
                message: format!("interest rate must not be negative, got {}", annual_rate),
            });
        }

        if !(1..=MAX_TENURE_MONTHS).contains(&tenure_months) {
            return Err(TrackerError::InvalidTerms {
                message: format!(
                    "tenure must be between 1 and {} months, got {}",
                    MAX_TENURE_MONTHS, tenure_months
                ),
            });
        }

        if !annual_rate.is_zero() {
            let factor = emi::compound_factor(annual_rate.monthly_rate(), tenure_months);
            if factor.map_or(true, |f| f > MAX_COMPOUND_FACTOR) {
                return Err(TrackerError::InvalidTerms {
                    message: format!(
                        "{} over {} months compounds beyond the supported range",
                        annual_rate, tenure_months
                    ),
                });
            }
        }

        if !(1..=MAX_DUE_DAY).contains(&due_day) {
            return Err(TrackerError::InvalidTerms {
                message: format!("due day must be between 1 and {}, got {}", MAX_DUE_DAY, due_day),
            });
        }

        // the last installment bounds every earlier one
        let last_period = calendar::period_at(start_date, tenure_months - 1)?;
        calendar::due_date(last_period, due_day)?;

        Ok(Self {
            principal,
            annual_rate,
            tenure_months,
            start_date,
            due_day,
        })
    }

    pub fn principal(&self) -> Money {
        self.principal
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    pub fn tenure_months(&self) -> u32 {
        self.tenure_months
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn due_day(&self) -> u32 {
        self.due_day
    }

    pub fn is_interest_free(&self) -> bool {
        self.annual_rate.is_zero()
    }
}

/// loan creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanConfig {
    pub name: String,
    pub lender_name: String,
    pub principal: Money,
    pub annual_rate: Rate,
    pub tenure_months: u32,
    pub start_date: NaiveDate,
    pub due_day: u32,
    /// canonical emi recorded on the loan instead of the computed one
    #[serde(default)]
    pub emi_override: Option<Money>,
    #[serde(default)]
    pub rounding_policy: RoundingPolicy,
}

impl LoanConfig {
    pub fn new(
        name: impl Into<String>,
        lender_name: impl Into<String>,
        principal: Money,
        annual_rate: Rate,
        tenure_months: u32,
        start_date: NaiveDate,
        due_day: u32,
    ) -> Self {
        Self {
            name: name.into(),
            lender_name: lender_name.into(),
            principal,
            annual_rate,
            tenure_months,
            start_date,
            due_day,
            emi_override: None,
            rounding_policy: RoundingPolicy::PerEntry,
        }
    }

    /// home loan preset: 20 years, due on the 5th
    pub fn home_loan(
        lender_name: impl Into<String>,
        principal: Money,
        annual_rate: Rate,
        start_date: NaiveDate,
    ) -> Self {
        Self::new("Home Loan", lender_name, principal, annual_rate, 240, start_date, 5)
    }

    /// interest-free consumer loan, typically a no-cost emi purchase
    pub fn no_cost_emi(
        name: impl Into<String>,
        lender_name: impl Into<String>,
        principal: Money,
        tenure_months: u32,
        start_date: NaiveDate,
        due_day: u32,
    ) -> Self {
        Self::new(name, lender_name, principal, Rate::ZERO, tenure_months, start_date, due_day)
    }

    pub fn with_emi_override(mut self, emi: Money) -> Self {
        self.emi_override = Some(emi);
        self
    }

    pub fn with_rounding_policy(mut self, policy: RoundingPolicy) -> Self {
        self.rounding_policy = policy;
        self
    }

    /// parse a creation request from json
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| TrackerError::InvalidConfiguration {
            message: format!("malformed loan request: {}", e),
        })
    }

    /// validate the request and extract the loan terms
    pub fn validate(&self) -> Result<LoanTerms> {
        if self.name.trim().is_empty() {
            return Err(TrackerError::InvalidConfiguration {
                message: "loan name is required".to_string(),
            });
        }

        if self.lender_name.trim().is_empty() {
            return Err(TrackerError::InvalidConfiguration {
                message: "lender name is required".to_string(),
            });
        }

        if let Some(emi) = self.emi_override {
            if !emi.is_positive() {
                return Err(TrackerError::InvalidConfiguration {
                    message: format!("emi override must be positive, got {}", emi),
                });
            }
        }

        LoanTerms::new(
            self.principal,
            self.annual_rate,
            self.tenure_months,
            self.start_date,
            self.due_day,
        )
    }
}

/// subscription creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    pub name: String,
    pub amount: Money,
    pub billing_day: u32,
    pub category: SubscriptionCategory,
    pub card_name: String,
}

impl SubscriptionConfig {
    pub fn new(
        name: impl Into<String>,
        amount: Money,
        billing_day: u32,
        category: SubscriptionCategory,
        card_name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            amount,
            billing_day,
            category,
            card_name: card_name.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(TrackerError::InvalidConfiguration {
                message: "subscription name is required".to_string(),
            });
        }

        if self.card_name.trim().is_empty() {
            return Err(TrackerError::InvalidConfiguration {
                message: "credit card is required".to_string(),
            });
        }

        if !self.amount.is_positive() {
            return Err(TrackerError::InvalidConfiguration {
                message: format!("subscription amount must be positive, got {}", self.amount),
            });
        }

        if !(1..=MAX_DUE_DAY).contains(&self.billing_day) {
            return Err(TrackerError::InvalidConfiguration {
                message: format!(
                    "billing day must be between 1 and {}, got {}",
                    MAX_DUE_DAY, self.billing_day
                ),
            });
        }

        Ok(())
    }
}
