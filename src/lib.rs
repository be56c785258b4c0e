pub mod amortization;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod planner;
pub mod subscriptions;
pub mod types;

// re-export key types
pub use amortization::{
    compute_installment, generate_schedule, total_interest, AmortizationEntry,
    AmortizationSchedule,
};
pub use config::{LoanConfig, LoanTerms, SubscriptionConfig};
pub use decimal::{Money, Rate};
pub use errors::{Result, TrackerError};
pub use events::{Event, EventStore};
pub use loan::{EmiPayment, Loan};
pub use planner::{CalendarItem, CalendarItemKind, MonthlyPlan, PlanSummary};
pub use subscriptions::{Subscription, SubscriptionLedger, SubscriptionPayment};
pub use types::{
    LoanId, LoanStatus, PaymentId, PaymentStatus, Period, RoundingPolicy, SubscriptionCategory,
    SubscriptionId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
