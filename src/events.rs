use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, LoanStatus, PaymentId, PaymentStatus, SubscriptionId};

/// all events emitted by the ledgers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // loan lifecycle events
    LoanCreated {
        loan_id: LoanId,
        principal: Money,
        emi_amount: Money,
        tenure_months: u32,
        timestamp: DateTime<Utc>,
    },
    ScheduleGenerated {
        loan_id: LoanId,
        installments: u32,
        total_interest: Money,
        first_due_date: NaiveDate,
        last_due_date: NaiveDate,
    },
    LoanClosed {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanReopened {
        loan_id: LoanId,
        remaining_balance: Money,
        timestamp: DateTime<Utc>,
    },
    LoanStatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },

    // payment events
    EmiPaymentStatusChanged {
        loan_id: LoanId,
        payment_id: PaymentId,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
        remaining_balance: Money,
        timestamp: DateTime<Utc>,
    },
    SubscriptionPaymentCreated {
        subscription_id: SubscriptionId,
        payment_id: PaymentId,
        amount: Money,
        due_date: NaiveDate,
    },
    SubscriptionPaymentStatusChanged {
        subscription_id: SubscriptionId,
        payment_id: PaymentId,
        old_status: PaymentStatus,
        new_status: PaymentStatus,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
