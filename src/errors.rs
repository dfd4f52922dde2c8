use thiserror::Error;

use crate::domain::entities::receipt::{Receipt, ReceiptStatus};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced while obtaining or validating the app receipt.
#[derive(Debug, Error)]
pub enum ReceiptError {
    #[error("no receipt data available on device")]
    NoReceiptData,
    #[error("no data received from the receipt validation service")]
    NoRemoteData,
    #[error("failed to encode receipt validation request body")]
    RequestBodyEncode(#[source] serde_json::Error),
    #[error("network error while fetching or validating the receipt")]
    Network(#[source] BoxError),
    #[error("failed to decode receipt validation response")]
    JsonDecode { payload: Option<String> },
    #[error("receipt is invalid (status: {status:?})")]
    ReceiptInvalid {
        receipt: Receipt,
        status: ReceiptStatus,
    },
}

/// Error reported by the payment queue for a failed payment or restore.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("unknown error: {0}")]
    Unknown(String),
    #[error("client is not allowed to issue the request")]
    ClientInvalid,
    #[error("user cancelled the payment")]
    PaymentCancelled,
    #[error("purchase identifier was invalid")]
    PaymentInvalid,
    #[error("device is not allowed to make the payment")]
    PaymentNotAllowed,
    #[error("product is not available in the current storefront")]
    StoreProductNotAvailable,
    #[error("cloud service permission denied")]
    CloudServicePermissionDenied,
    #[error("cloud service network connection failed")]
    CloudServiceNetworkConnectionFailed,
    #[error("user has revoked cloud service access")]
    CloudServiceRevoked,
    /// Raised locally when a payment is started for a product that already
    /// has one pending.
    #[error("a payment for this product is already in progress")]
    PaymentInProgress,
}

impl PaymentError {
    /// Substituted when the queue marks a transaction as failed without
    /// attaching an error.
    pub fn unknown() -> Self {
        PaymentError::Unknown("Unknown error".to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {key} has invalid value {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
