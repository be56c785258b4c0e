use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::calendar;
use super::emi::compute_installment;
use crate::config::LoanTerms;
use crate::decimal::Money;
use crate::errors::Result;
use crate::types::{Period, RoundingPolicy};

/// one installment of an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationEntry {
    /// 0-based installment index
    pub period_index: u32,
    pub period_month: u32,
    pub period_year: i32,
    pub due_date: NaiveDate,
    pub installment_amount: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub balance_after: Money,
}

impl AmortizationEntry {
    pub fn period(&self) -> Period {
        Period::new(self.period_year, self.period_month)
    }
}

/// full schedule for a set of loan terms, earliest installment first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub terms: LoanTerms,
    pub rounding_policy: RoundingPolicy,
    /// the fixed emi, rounded to cents
    pub installment: Money,
    pub entries: Vec<AmortizationEntry>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// generate with per-entry rounding
    pub fn generate(terms: &LoanTerms) -> Result<Self> {
        Self::generate_with_policy(terms, RoundingPolicy::PerEntry)
    }

    pub fn generate_with_policy(terms: &LoanTerms, policy: RoundingPolicy) -> Result<Self> {
        let emi =
            compute_installment(terms.principal(), terms.annual_rate(), terms.tenure_months());
        let mut entries = build_entries(terms, emi)?;

        if policy == RoundingPolicy::CarryForward {
            carry_forward_drift(terms.principal(), &mut entries);
        }

        let total_interest: Money = entries.iter().map(|e| e.interest_portion).sum();
        let total_principal: Money = entries.iter().map(|e| e.principal_portion).sum();
        let total_payment: Money = entries.iter().map(|e| e.installment_amount).sum();

        Ok(Self {
            terms: terms.clone(),
            rounding_policy: policy,
            installment: Money::from_decimal(emi),
            entries,
            total_interest,
            total_principal,
            total_payment,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// entry by 0-based installment index
    pub fn get(&self, index: u32) -> Option<&AmortizationEntry> {
        self.entries.get(index as usize)
    }

    pub fn first(&self) -> Option<&AmortizationEntry> {
        self.entries.first()
    }

    pub fn last(&self) -> Option<&AmortizationEntry> {
        self.entries.last()
    }

    /// installment falling in a calendar month
    pub fn entry_for(&self, period: Period) -> Option<&AmortizationEntry> {
        self.entries.iter().find(|e| e.period() == period)
    }

    /// balance outstanding once `paid` installments are settled
    pub fn balance_after_installments(&self, paid: u32) -> Money {
        match paid {
            0 => self.terms.principal(),
            n => self
                .get(n - 1)
                .map(|e| e.balance_after)
                .unwrap_or(Money::ZERO),
        }
    }

    /// sum of principal parts minus the principal; zero under carry-forward
    pub fn principal_drift(&self) -> Money {
        self.total_principal - self.terms.principal()
    }
}

/// generate the schedule for `terms` with per-entry rounding
pub fn generate_schedule(terms: &LoanTerms) -> Result<AmortizationSchedule> {
    AmortizationSchedule::generate(terms)
}

fn build_entries(terms: &LoanTerms, emi: Decimal) -> Result<Vec<AmortizationEntry>> {
    let monthly_rate = terms.annual_rate().monthly_rate();
    let mut balance = terms.principal().as_decimal();
    let mut entries = Vec::with_capacity(terms.tenure_months() as usize);

    for i in 0..terms.tenure_months() {
        let period = calendar::period_at(terms.start_date(), i)?;
        let due_date = calendar::due_date(period, terms.due_day())?;

        let interest = balance * monthly_rate;
        let principal_portion = emi - interest;
        balance = (balance - principal_portion).max(Decimal::ZERO);

        entries.push(AmortizationEntry {
            period_index: i,
            period_month: period.month,
            period_year: period.year,
            due_date,
            installment_amount: Money::from_decimal(emi),
            principal_portion: Money::from_decimal(principal_portion),
            interest_portion: Money::from_decimal(interest),
            balance_after: Money::from_decimal(balance),
        });
    }

    Ok(entries)
}

/// fold the accumulated rounding drift into the last installment
fn carry_forward_drift(principal: Money, entries: &mut [AmortizationEntry]) {
    let allocated: Money = entries.iter().map(|e| e.principal_portion).sum();
    let drift = allocated - principal;

    if let Some(last) = entries.last_mut() {
        last.principal_portion -= drift;
        last.installment_amount = last.principal_portion + last.interest_portion;
        last.balance_after = Money::ZERO;
    }
}
