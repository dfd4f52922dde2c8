use std::fmt;

use chrono::{DateTime, Utc};
use strum::Display;

use crate::errors::PaymentError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum TransactionState {
    /// The payment is being processed by the store. Never final.
    Purchasing,
    Purchased,
    Failed,
    /// A previously completed purchase replayed by a restore request.
    Restored,
    /// Awaiting an external action (e.g. parental approval).
    Deferred,
}

/// A payment transaction as reported by the purchase queue.
///
/// Transactions are owned by the queue. This crate only reads them, and asks
/// the queue to finish them through
/// [`PaymentQueue::finish_transaction`](crate::domain::repositories::payment_queue::PaymentQueue::finish_transaction).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub product_id: String,
    pub quantity: u32,
    /// Assigned by the store once the transaction leaves the purchasing
    /// state.
    pub transaction_id: Option<String>,
    pub transaction_date: Option<DateTime<Utc>>,
    pub state: TransactionState,
    pub error: Option<PaymentError>,
    /// For restored transactions, the transaction being restored.
    pub original: Option<Box<Transaction>>,
}

impl Transaction {
    pub fn new(product_id: impl Into<String>, state: TransactionState) -> Self {
        Self {
            product_id: product_id.into(),
            quantity: 1,
            transaction_id: None,
            transaction_date: None,
            state,
            error: None,
            original: None,
        }
    }

    pub fn with_id(mut self, transaction_id: impl Into<String>) -> Self {
        self.transaction_id = Some(transaction_id.into());
        self
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_date(mut self, transaction_date: DateTime<Utc>) -> Self {
        self.transaction_date = Some(transaction_date);
        self
    }

    pub fn with_error(mut self, error: PaymentError) -> Self {
        self.error = Some(error);
        self
    }

    pub fn with_original(mut self, original: Transaction) -> Self {
        self.original = Some(Box::new(original));
        self
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "productId: {}, transactionId: {}, state: {}, date: {}",
            self.product_id,
            self.transaction_id.as_deref().unwrap_or("null"),
            self.state,
            self.transaction_date
                .map(|d| d.to_rfc3339())
                .unwrap_or_else(|| "null".to_string()),
        )
    }
}
