use thiserror::Error;
use uuid::Uuid;

use crate::types::LoanStatus;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackerError {
    #[error("invalid loan terms: {message}")]
    InvalidTerms {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: Uuid,
    },

    #[error("subscription not found: {id}")]
    SubscriptionNotFound {
        id: Uuid,
    },

    #[error("loan not active: current status is {status:?}")]
    LoanNotActive {
        status: LoanStatus,
    },
}

pub type Result<T> = std::result::Result<T, TrackerError>;
