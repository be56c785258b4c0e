use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for an emi or subscription payment
pub type PaymentId = Uuid;

/// unique identifier for a subscription
pub type SubscriptionId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// installments outstanding
    Active,
    /// every installment paid
    Closed,
    /// marked as defaulted by the owner
    Defaulted,
}

/// payment status of a scheduled installment or subscription charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Upcoming,
    Paid,
    Missed,
}

impl PaymentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, PaymentStatus::Paid)
    }
}

/// subscription category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionCategory {
    Work,
    Personal,
}

impl fmt::Display for SubscriptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubscriptionCategory::Work => write!(f, "WORK"),
            SubscriptionCategory::Personal => write!(f, "PERSONAL"),
        }
    }
}

/// rounding policy applied when materializing schedule entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RoundingPolicy {
    /// round every entry independently; principal parts may drift from the
    /// principal by up to one cent per installment
    #[default]
    PerEntry,
    /// round every entry, then fold the accumulated drift into the final
    /// installment so principal parts sum to the principal exactly
    CarryForward,
}

/// calendar period (month in 1..=12)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Period {
    pub year: i32,
    pub month: u32,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_uppercase() {
        let json = serde_json::to_string(&PaymentStatus::Upcoming).unwrap();
        assert_eq!(json, "\"UPCOMING\"");

        let status: LoanStatus = serde_json::from_str("\"CLOSED\"").unwrap();
        assert_eq!(status, LoanStatus::Closed);
    }

    #[test]
    fn test_period_ordering() {
        assert!(Period::new(2025, 12) < Period::new(2026, 1));
        assert!(Period::new(2025, 2) > Period::new(2025, 1));
    }
}
