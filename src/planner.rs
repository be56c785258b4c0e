use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::amortization::calendar;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::EventStore;
use crate::loan::Loan;
use crate::subscriptions::SubscriptionLedger;
use crate::types::{PaymentStatus, Period};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalendarItemKind {
    Emi,
    Subscription,
}

/// a single dated obligation in the month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarItem {
    pub payment_id: Uuid,
    pub kind: CalendarItemKind,
    pub name: String,
    pub subtitle: String,
    pub amount: Money,
    pub due_date: NaiveDate,
    pub day: u32,
    pub status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanSummary {
    pub total_income: Money,
    pub total_emis: Money,
    pub total_subscriptions: Money,
    /// income left after obligations; negative when over-committed
    pub discretionary_remaining: Money,
}

/// monthly planner view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyPlan {
    pub period: Period,
    pub summary: PlanSummary,
    pub calendar_items: Vec<CalendarItem>,
}

impl MonthlyPlan {
    /// Build the plan for `period`, materializing the month's subscription
    /// payments first.
    pub fn build(
        period: Period,
        income: Money,
        loans: &[Loan],
        subscriptions: &mut SubscriptionLedger,
        events: &mut EventStore,
    ) -> Result<Self> {
        let period = calendar::period(period.year, period.month)?;
        subscriptions.ensure_monthly_payments(period, events)?;

        let mut emi_items: Vec<CalendarItem> = loans
            .iter()
            .flat_map(|loan| {
                loan.payments_for(period).map(move |p| CalendarItem {
                    payment_id: p.id,
                    kind: CalendarItemKind::Emi,
                    name: loan.name.clone(),
                    subtitle: loan.lender_name.clone(),
                    amount: p.amount,
                    due_date: p.due_date,
                    day: p.due_date.day(),
                    status: p.status,
                })
            })
            .collect();
        emi_items.sort_by_key(|item| item.due_date);

        let subscription_items: Vec<CalendarItem> = subscriptions
            .payments_for(period)
            .into_iter()
            .filter_map(|p| {
                subscriptions.subscription(p.subscription_id).map(|s| CalendarItem {
                    payment_id: p.id,
                    kind: CalendarItemKind::Subscription,
                    name: s.name.clone(),
                    subtitle: format!("{} ({})", s.card_name, s.category),
                    amount: p.amount,
                    due_date: p.due_date,
                    day: p.due_date.day(),
                    status: p.status,
                })
            })
            .collect();

        let total_emis: Money = emi_items.iter().map(|i| i.amount).sum();
        let total_subscriptions: Money = subscription_items.iter().map(|i| i.amount).sum();

        // stable: emis stay ahead of subscriptions on the same day
        let mut calendar_items = emi_items;
        calendar_items.extend(subscription_items);
        calendar_items.sort_by_key(|item| item.day);

        Ok(Self {
            period,
            summary: PlanSummary {
                total_income: income,
                total_emis,
                total_subscriptions,
                discretionary_remaining: income - total_emis - total_subscriptions,
            },
            calendar_items,
        })
    }

    /// items due on a given day of the month
    pub fn items_on(&self, day: u32) -> impl Iterator<Item = &CalendarItem> {
        self.calendar_items.iter().filter(move |i| i.day == day)
    }

    /// total of items not yet paid
    pub fn outstanding(&self) -> Money {
        self.calendar_items
            .iter()
            .filter(|i| !i.status.is_paid())
            .map(|i| i.amount)
            .sum()
    }
}
