//! loan amortization engine: emi calculation and schedule generation

pub mod calendar;
pub mod emi;
pub mod schedule;

pub use emi::{compute_installment, total_interest};
pub use schedule::{generate_schedule, AmortizationEntry, AmortizationSchedule};
