use chrono::{DateTime, NaiveDate, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::calendar;
use crate::config::SubscriptionConfig;
use crate::decimal::Money;
use crate::errors::{Result, TrackerError};
use crate::events::{Event, EventStore};
use crate::types::{PaymentId, PaymentStatus, Period, SubscriptionCategory, SubscriptionId};

/// recurring charge billed to a credit card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub name: String,
    pub amount: Money,
    pub billing_day: u32,
    pub category: SubscriptionCategory,
    pub card_name: String,
    pub is_active: bool,
}

impl Subscription {
    pub fn new(config: SubscriptionConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            id: Uuid::new_v4(),
            name: config.name,
            amount: config.amount,
            billing_day: config.billing_day,
            category: config.category,
            card_name: config.card_name,
            is_active: true,
        })
    }
}

/// one month's charge of a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPayment {
    pub id: PaymentId,
    pub subscription_id: SubscriptionId,
    pub month: u32,
    pub year: i32,
    pub due_date: NaiveDate,
    pub amount: Money,
    pub status: PaymentStatus,
    pub paid_date: Option<DateTime<Utc>>,
}

impl SubscriptionPayment {
    pub fn period(&self) -> Period {
        Period::new(self.year, self.month)
    }
}

/// subscriptions and their monthly payments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubscriptionLedger {
    subscriptions: Vec<Subscription>,
    payments: Vec<SubscriptionPayment>,
}

impl SubscriptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, config: SubscriptionConfig) -> Result<SubscriptionId> {
        let subscription = Subscription::new(config)?;
        let id = subscription.id;

        tracing::info!(subscription_id = %id, name = %subscription.name, "subscription added");

        self.subscriptions.push(subscription);
        Ok(id)
    }

    pub fn subscription(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subscriptions.iter().find(|s| s.id == id)
    }

    pub fn subscriptions(&self) -> &[Subscription] {
        &self.subscriptions
    }

    pub fn payments(&self) -> &[SubscriptionPayment] {
        &self.payments
    }

    /// stop generating payments; past payments are kept
    pub fn deactivate(&mut self, id: SubscriptionId) -> Result<()> {
        let subscription = self
            .subscriptions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(TrackerError::SubscriptionNotFound { id })?;
        subscription.is_active = false;
        Ok(())
    }

    /// Create an `Upcoming` payment for every active subscription that has
    /// none in `period`. Returns how many were created; running it again for
    /// the same period creates nothing.
    pub fn ensure_monthly_payments(
        &mut self,
        period: Period,
        events: &mut EventStore,
    ) -> Result<usize> {
        let period = calendar::period(period.year, period.month)?;
        let mut created = Vec::new();

        for subscription in self.subscriptions.iter().filter(|s| s.is_active) {
            let exists = self
                .payments
                .iter()
                .any(|p| p.subscription_id == subscription.id && p.period() == period);
            if exists {
                continue;
            }

            created.push(SubscriptionPayment {
                id: Uuid::new_v4(),
                subscription_id: subscription.id,
                month: period.month,
                year: period.year,
                due_date: calendar::due_date(period, subscription.billing_day)?,
                amount: subscription.amount,
                status: PaymentStatus::Upcoming,
                paid_date: None,
            });
        }

        for payment in &created {
            events.emit(Event::SubscriptionPaymentCreated {
                subscription_id: payment.subscription_id,
                payment_id: payment.id,
                amount: payment.amount,
                due_date: payment.due_date,
            });
        }

        let count = created.len();
        if count > 0 {
            tracing::debug!(
                year = period.year,
                month = period.month,
                count,
                "subscription payments created"
            );
        }
        self.payments.extend(created);

        Ok(count)
    }

    /// payments falling in a calendar month, earliest due first
    pub fn payments_for(&self, period: Period) -> Vec<&SubscriptionPayment> {
        let mut payments: Vec<&SubscriptionPayment> =
            self.payments.iter().filter(|p| p.period() == period).collect();
        payments.sort_by_key(|p| p.due_date);
        payments
    }

    pub fn update_payment_status(
        &mut self,
        payment_id: PaymentId,
        status: PaymentStatus,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<SubscriptionPayment> {
        let now = time_provider.now();
        let payment = self
            .payments
            .iter_mut()
            .find(|p| p.id == payment_id)
            .ok_or(TrackerError::PaymentNotFound { id: payment_id })?;

        let old_status = payment.status;
        payment.status = status;
        payment.paid_date = if status.is_paid() { Some(now) } else { None };

        events.emit(Event::SubscriptionPaymentStatusChanged {
            subscription_id: payment.subscription_id,
            payment_id,
            old_status,
            new_status: status,
            timestamp: now,
        });

        Ok(payment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn ledger() -> (SubscriptionLedger, SubscriptionId, SubscriptionId) {
        let mut ledger = SubscriptionLedger::new();
        let music = ledger
            .add(SubscriptionConfig::new(
                "Music",
                Money::from_major(119),
                20,
                SubscriptionCategory::Personal,
                "Amazon Pay ICICI",
            ))
            .unwrap();
        let ide = ledger
            .add(SubscriptionConfig::new(
                "IDE",
                Money::from_major(890),
                3,
                SubscriptionCategory::Work,
                "HDFC Regalia",
            ))
            .unwrap();
        (ledger, music, ide)
    }

    #[test]
    fn test_ensure_monthly_payments_is_idempotent() {
        let (mut ledger, _, _) = ledger();
        let mut events = EventStore::new();
        let period = Period::new(2025, 2);

        assert_eq!(ledger.ensure_monthly_payments(period, &mut events).unwrap(), 2);
        assert_eq!(ledger.ensure_monthly_payments(period, &mut events).unwrap(), 0);
        assert_eq!(ledger.payments().len(), 2);
        assert_eq!(events.len(), 2);

        let due: Vec<NaiveDate> = ledger.payments_for(period).iter().map(|p| p.due_date).collect();
        assert_eq!(
            due,
            vec![
                NaiveDate::from_ymd_opt(2025, 2, 3).unwrap(),
                NaiveDate::from_ymd_opt(2025, 2, 20).unwrap(),
            ]
        );
    }

    #[test]
    fn test_inactive_subscriptions_are_skipped() {
        let (mut ledger, music, _) = ledger();
        let mut events = EventStore::new();

        ledger.deactivate(music).unwrap();
        assert_eq!(ledger.ensure_monthly_payments(Period::new(2025, 3), &mut events).unwrap(), 1);
        assert!(!ledger.subscription(music).unwrap().is_active);

        let missing = Uuid::new_v4();
        assert_eq!(
            ledger.deactivate(missing),
            Err(TrackerError::SubscriptionNotFound { id: missing })
        );
    }

    #[test]
    fn test_invalid_month_rejected() {
        let (mut ledger, _, _) = ledger();
        let mut events = EventStore::new();

        assert!(matches!(
            ledger.ensure_monthly_payments(Period::new(2025, 13), &mut events),
            Err(TrackerError::InvalidDate { .. })
        ));
        assert!(ledger.payments().is_empty());
    }

    #[test]
    fn test_update_payment_status() {
        let (mut ledger, _, ide) = ledger();
        let mut events = EventStore::new();
        let time = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2025, 4, 3, 12, 0, 0).unwrap(),
        ));

        ledger.ensure_monthly_payments(Period::new(2025, 4), &mut events).unwrap();
        let payment_id = ledger
            .payments()
            .iter()
            .find(|p| p.subscription_id == ide)
            .unwrap()
            .id;

        let paid = ledger
            .update_payment_status(payment_id, PaymentStatus::Paid, &time, &mut events)
            .unwrap();
        assert_eq!(paid.paid_date, Some(time.now()));

        let missed = ledger
            .update_payment_status(payment_id, PaymentStatus::Missed, &time, &mut events)
            .unwrap();
        assert_eq!(missed.paid_date, None);
        assert_eq!(missed.status, PaymentStatus::Missed);

        assert!(ledger
            .update_payment_status(Uuid::new_v4(), PaymentStatus::Paid, &time, &mut events)
            .is_err());
    }
}
