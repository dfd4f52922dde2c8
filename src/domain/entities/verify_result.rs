use chrono::{DateTime, Duration, Utc};

use super::receipt::ReceiptItem;

/// Result for consumable and non-consumable products.
#[derive(Debug, Clone, PartialEq)]
pub enum VerifyPurchaseResult {
    Purchased { item: ReceiptItem },
    NotPurchased,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VerifySubscriptionResult {
    /// `items` holds every matching record, newest expiry first.
    Purchased {
        expiry_date: DateTime<Utc>,
        items: Vec<ReceiptItem>,
    },
    Expired {
        expiry_date: DateTime<Utc>,
        items: Vec<ReceiptItem>,
    },
    NotPurchased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionType {
    AutoRenewable,
    /// Non-renewing subscriptions have no expiry in the receipt, so the
    /// validity period has to be supplied.
    NonRenewing { valid_duration: Duration },
}
