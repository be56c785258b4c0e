use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::{AmortizationEntry, AmortizationSchedule};
use crate::config::{LoanConfig, LoanTerms};
use crate::decimal::Money;
use crate::errors::{Result, TrackerError};
use crate::events::{Event, EventStore};
use crate::types::{LoanId, LoanStatus, PaymentId, PaymentStatus, Period};

/// scheduled installment owned by a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmiPayment {
    pub id: PaymentId,
    pub loan_id: LoanId,
    pub period_index: u32,
    pub month: u32,
    pub year: i32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub principal_part: Money,
    pub interest_part: Money,
    pub status: PaymentStatus,
    pub paid_date: Option<DateTime<Utc>>,
}

impl EmiPayment {
    fn from_entry(loan_id: LoanId, entry: &AmortizationEntry) -> Self {
        Self {
            id: Uuid::new_v4(),
            loan_id,
            period_index: entry.period_index,
            month: entry.period_month,
            year: entry.period_year,
            due_date: entry.due_date,
            amount: entry.installment_amount,
            principal_part: entry.principal_portion,
            interest_part: entry.interest_portion,
            status: PaymentStatus::Upcoming,
            paid_date: None,
        }
    }

    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }
}

/// loan record with its installments
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub name: String,
    pub lender_name: String,
    pub terms: LoanTerms,
    /// canonical emi shown for the loan, rounded to cents
    pub emi_amount: Money,
    pub remaining_balance: Money,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub payments: Vec<EmiPayment>,
}

impl Loan {
    /// Validate the request, generate the schedule and create the loan with
    /// one `Upcoming` installment per schedule entry.
    ///
    /// Nothing is emitted unless the whole loan is built.
    pub fn create(
        config: LoanConfig,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Self> {
        let terms = config.validate()?;
        let schedule = AmortizationSchedule::generate_with_policy(&terms, config.rounding_policy)?;
        let now = time_provider.now();

        let id = Uuid::new_v4();
        let payments: Vec<EmiPayment> = schedule
            .entries
            .iter()
            .map(|entry| EmiPayment::from_entry(id, entry))
            .collect();

        let (first_due_date, last_due_date) = match (payments.first(), payments.last()) {
            (Some(first), Some(last)) => (first.due_date, last.due_date),
            _ => {
                return Err(TrackerError::InvalidTerms {
                    message: "schedule has no installments".to_string(),
                })
            }
        };

        let loan = Self {
            id,
            name: config.name,
            lender_name: config.lender_name,
            emi_amount: config.emi_override.unwrap_or(schedule.installment),
            remaining_balance: terms.principal(),
            terms,
            status: LoanStatus::Active,
            created_at: now,
            payments,
        };

        tracing::info!(
            loan_id = %loan.id,
            principal = %loan.terms.principal(),
            emi = %loan.emi_amount,
            tenure_months = loan.terms.tenure_months(),
            "loan created"
        );

        events.emit(Event::LoanCreated {
            loan_id: loan.id,
            principal: loan.terms.principal(),
            emi_amount: loan.emi_amount,
            tenure_months: loan.terms.tenure_months(),
            timestamp: now,
        });

        events.emit(Event::ScheduleGenerated {
            loan_id: loan.id,
            installments: schedule.len() as u32,
            total_interest: schedule.total_interest,
            first_due_date,
            last_due_date,
        });

        Ok(loan)
    }

    /// Move an installment to `status`, keeping the remaining balance and
    /// the loan status consistent.
    ///
    /// Paying the last unpaid installment closes the loan; moving a paid
    /// installment back to unpaid restores its principal and reopens the loan.
    pub fn update_payment_status(
        &mut self,
        payment_id: PaymentId,
        status: PaymentStatus,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<EmiPayment> {
        if self.status == LoanStatus::Defaulted {
            return Err(TrackerError::LoanNotActive { status: self.status });
        }

        let now = time_provider.now();
        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or(TrackerError::PaymentNotFound { id: payment_id })?;

        let old_status = payment.status;
        payment.status = status;
        payment.paid_date = if status.is_paid() { Some(now) } else { None };
        let updated = payment.clone();

        self.remaining_balance = self.outstanding_principal();

        if self.unpaid_count() == 0 {
            self.remaining_balance = Money::ZERO;
            if self.status != LoanStatus::Closed {
                self.status = LoanStatus::Closed;
                events.emit(Event::LoanClosed {
                    loan_id: self.id,
                    timestamp: now,
                });
            }
        } else if self.status == LoanStatus::Closed {
            self.status = LoanStatus::Active;
            events.emit(Event::LoanReopened {
                loan_id: self.id,
                remaining_balance: self.remaining_balance,
                timestamp: now,
            });
        }

        tracing::debug!(
            loan_id = %self.id,
            payment_id = %payment_id,
            ?old_status,
            new_status = ?status,
            remaining = %self.remaining_balance,
            "emi payment status changed"
        );

        events.emit(Event::EmiPaymentStatusChanged {
            loan_id: self.id,
            payment_id,
            old_status,
            new_status: status,
            remaining_balance: self.remaining_balance,
            timestamp: now,
        });

        Ok(updated)
    }

    /// mark the loan as defaulted; installments are frozen afterwards
    pub fn mark_defaulted(&mut self, time_provider: &SafeTimeProvider, events: &mut EventStore) {
        if self.status == LoanStatus::Defaulted {
            return;
        }

        let old_status = self.status;
        self.status = LoanStatus::Defaulted;

        tracing::warn!(loan_id = %self.id, "loan marked as defaulted");

        events.emit(Event::LoanStatusChanged {
            loan_id: self.id,
            old_status,
            new_status: LoanStatus::Defaulted,
            timestamp: time_provider.now(),
        });
    }

    /// principal less every paid principal part, floored at zero
    fn outstanding_principal(&self) -> Money {
        let repaid: Money = self
            .payments
            .iter()
            .filter(|p| p.status.is_paid())
            .map(|p| p.principal_part)
            .sum();
        (self.terms.principal() - repaid).max(Money::ZERO)
    }

    pub fn payment(&self, payment_id: PaymentId) -> Option<&EmiPayment> {
        self.payments.iter().find(|p| p.id == payment_id)
    }

    /// installments falling in a calendar month
    pub fn payments_for(&self, period: Period) -> impl Iterator<Item = &EmiPayment> {
        self.payments.iter().filter(move |p| p.period() == period)
    }

    /// earliest installment not yet paid
    pub fn next_due_payment(&self) -> Option<&EmiPayment> {
        self.payments
            .iter()
            .filter(|p| !p.status.is_paid())
            .min_by_key(|p| p.due_date)
    }

    pub fn paid_count(&self) -> usize {
        self.payments.iter().filter(|p| p.status.is_paid()).count()
    }

    pub fn unpaid_count(&self) -> usize {
        self.payments.len() - self.paid_count()
    }

    pub fn total_paid(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.status.is_paid())
            .map(|p| p.amount)
            .sum()
    }

    pub fn is_closed(&self) -> bool {
        self.status == LoanStatus::Closed
    }

    /// get json representation of current state
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("JSON error: {}", e))
    }

    /// short alias for json output
    pub fn json(&self) -> String {
        self.to_json_pretty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::types::RoundingPolicy;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
        ))
    }

    fn phone_config() -> LoanConfig {
        LoanConfig::no_cost_emi(
            "Phone",
            "Bajaj Finserv",
            Money::from_major(12_000),
            12,
            NaiveDate::from_ymd_opt(2025, 1, 10).unwrap(),
            10,
        )
    }

    #[test]
    fn test_create_loan_with_upcoming_installments() {
        let time = time();
        let mut events = EventStore::new();

        let loan = Loan::create(phone_config(), &time, &mut events).unwrap();

        assert_eq!(loan.payments.len(), 12);
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.remaining_balance, Money::from_major(12_000));
        assert_eq!(loan.emi_amount, Money::from_major(1_000));
        assert_eq!(loan.created_at, time.now());
        assert!(loan
            .payments
            .iter()
            .all(|p| p.status == PaymentStatus::Upcoming && p.loan_id == loan.id));

        let events = events.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::LoanCreated { tenure_months: 12, .. }));
        match &events[1] {
            Event::ScheduleGenerated {
                installments,
                first_due_date,
                last_due_date,
                ..
            } => {
                assert_eq!(*installments, 12);
                assert_eq!(*first_due_date, NaiveDate::from_ymd_opt(2025, 1, 10).unwrap());
                assert_eq!(*last_due_date, NaiveDate::from_ymd_opt(2025, 12, 10).unwrap());
            }
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_invalid_request_creates_nothing() {
        let mut events = EventStore::new();
        let mut config = phone_config();
        config.due_day = 31;

        let result = Loan::create(config, &time(), &mut events);

        assert!(matches!(result, Err(TrackerError::InvalidTerms { .. })));
        assert!(events.is_empty());
    }

    #[test]
    fn test_emi_override_is_recorded_but_schedule_uses_formula() {
        let mut events = EventStore::new();
        let config = LoanConfig::new(
            "Bike",
            "TVS Credit",
            Money::from_major(100_000),
            Rate::from_percentage(12),
            12,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            3,
        )
        .with_emi_override(Money::from_major(9_000));

        let loan = Loan::create(config, &time(), &mut events).unwrap();

        assert_eq!(loan.emi_amount, Money::from_major(9_000));
        assert_eq!(loan.payments[0].amount, Money::from_str_exact("8884.88").unwrap());
    }

    #[test]
    fn test_paying_reduces_balance_and_reverting_restores_it() {
        let time = time();
        let mut events = EventStore::new();
        let mut loan = Loan::create(phone_config(), &time, &mut events).unwrap();
        events.clear();

        let first = loan.payments[0].id;
        let paid = loan
            .update_payment_status(first, PaymentStatus::Paid, &time, &mut events)
            .unwrap();

        assert_eq!(paid.status, PaymentStatus::Paid);
        assert_eq!(paid.paid_date, Some(time.now()));
        assert_eq!(loan.remaining_balance, Money::from_major(11_000));
        assert_eq!(loan.next_due_payment().unwrap().period_index, 1);

        let reverted = loan
            .update_payment_status(first, PaymentStatus::Upcoming, &time, &mut events)
            .unwrap();

        assert_eq!(reverted.paid_date, None);
        assert_eq!(loan.remaining_balance, Money::from_major(12_000));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn test_missed_payment_keeps_balance() {
        let time = time();
        let mut events = EventStore::new();
        let mut loan = Loan::create(phone_config(), &time, &mut events).unwrap();

        let second = loan.payments[1].id;
        loan.update_payment_status(second, PaymentStatus::Missed, &time, &mut events)
            .unwrap();

        assert_eq!(loan.payment(second).unwrap().status, PaymentStatus::Missed);
        assert_eq!(loan.remaining_balance, Money::from_major(12_000));
        assert_eq!(loan.unpaid_count(), 12);
    }

    #[test]
    fn test_paying_everything_closes_and_revert_reopens() {
        let time = time();
        let mut events = EventStore::new();
        let config = LoanConfig::new(
            "Laptop",
            "HDFC",
            Money::from_major(10_000),
            Rate::ZERO,
            3,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            1,
        );
        let mut loan = Loan::create(config, &time, &mut events).unwrap();
        events.clear();

        let ids: Vec<PaymentId> = loan.payments.iter().map(|p| p.id).collect();
        for id in &ids {
            loan.update_payment_status(*id, PaymentStatus::Paid, &time, &mut events)
                .unwrap();
        }

        // per-entry rounding leaves a cent of principal which closing clears
        assert!(loan.is_closed());
        assert_eq!(loan.remaining_balance, Money::ZERO);
        assert_eq!(loan.total_paid(), Money::from_str_exact("9999.99").unwrap());
        assert!(loan.next_due_payment().is_none());
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::LoanClosed { .. })));

        loan.update_payment_status(ids[2], PaymentStatus::Upcoming, &time, &mut events)
            .unwrap();

        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.remaining_balance, Money::from_str_exact("3333.34").unwrap());
        assert!(matches!(
            events.events().last(),
            Some(Event::EmiPaymentStatusChanged { .. })
        ));
        assert!(events
            .events()
            .iter()
            .any(|e| matches!(e, Event::LoanReopened { .. })));
    }

    #[test]
    fn test_carry_forward_loan_repays_exact_principal() {
        let time = time();
        let mut events = EventStore::new();
        let config = LoanConfig::new(
            "Laptop",
            "HDFC",
            Money::from_major(10_000),
            Rate::ZERO,
            3,
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            1,
        )
        .with_rounding_policy(RoundingPolicy::CarryForward);
        let loan = Loan::create(config, &time, &mut events).unwrap();

        let total: Money = loan.payments.iter().map(|p| p.principal_part).sum();
        assert_eq!(total, Money::from_major(10_000));
    }

    #[test]
    fn test_unknown_payment_and_defaulted_loan() {
        let time = time();
        let mut events = EventStore::new();
        let mut loan = Loan::create(phone_config(), &time, &mut events).unwrap();

        let missing = Uuid::new_v4();
        assert_eq!(
            loan.update_payment_status(missing, PaymentStatus::Paid, &time, &mut events)
                .unwrap_err(),
            TrackerError::PaymentNotFound { id: missing }
        );

        loan.mark_defaulted(&time, &mut events);
        let first = loan.payments[0].id;
        assert!(matches!(
            loan.update_payment_status(first, PaymentStatus::Paid, &time, &mut events),
            Err(TrackerError::LoanNotActive {
                status: LoanStatus::Defaulted
            })
        ));
    }

    #[test]
    fn test_payments_for_period_and_json() {
        let mut events = EventStore::new();
        let config = LoanConfig::home_loan(
            "SBI",
            Money::from_major(500_000),
            Rate::from_percent(dec!(8.5)),
            NaiveDate::from_ymd_opt(2025, 1, 5).unwrap(),
        );
        let loan = Loan::create(config, &time(), &mut events).unwrap();

        let march: Vec<&EmiPayment> = loan.payments_for(Period::new(2025, 3)).collect();
        assert_eq!(march.len(), 1);
        assert_eq!(march[0].due_date, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());

        let json = loan.json();
        assert!(json.contains("\"lender_name\": \"SBI\""));
        assert!(json.contains("\"UPCOMING\""));

        let restored: Loan = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.payments, loan.payments);
        assert_eq!(restored.terms, loan.terms);
    }
}
