use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;
use serde_with::{formats::Flexible, serde_as, DefaultOnError, DisplayFromStr, TimestampMilliSeconds};

use crate::domain::entities::receipt::ReceiptItem;

/// One record of the `in_app` or `latest_receipt_info` list of a decoded
/// receipt.
///
/// https://developer.apple.com/documentation/appstorereceipts/responsebody/receipt/in_app
///
/// Numbers and dates are string-encoded on the wire. Required fields that are
/// missing or malformed make the whole record unparsable; malformed optional
/// fields are read as absent.
#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct ReceiptItemModel {
    /// The unique identifier of the product purchased.
    pub(crate) product_id: String,
    /// The number of consumable products purchased.
    #[serde_as(as = "DisplayFromStr")]
    pub(crate) quantity: i64,
    /// A unique identifier for a transaction such as a purchase, restore, or
    /// renewal.
    pub(crate) transaction_id: String,
    /// The transaction identifier of the original purchase.
    pub(crate) original_transaction_id: String,
    /// The time the App Store charged the user's account for a purchased or
    /// restored product, or for a renewal after a lapse, in milliseconds.
    #[serde_as(as = "TimestampMilliSeconds<String, Flexible>")]
    pub(crate) purchase_date_ms: DateTime<Utc>,
    /// The time of the original purchase, in milliseconds.
    #[serde_as(as = "TimestampMilliSeconds<String, Flexible>")]
    pub(crate) original_purchase_date_ms: DateTime<Utc>,
    /// A unique identifier for purchase events across devices, including
    /// subscription-renewal events.
    #[serde_as(as = "DefaultOnError")]
    #[serde(default)]
    pub(crate) web_order_line_item_id: Option<String>,
    /// The time a subscription expires or when it will renew, in
    /// milliseconds.
    #[serde_as(as = "DefaultOnError<Option<TimestampMilliSeconds<String, Flexible>>>")]
    #[serde(default)]
    pub(crate) expires_date_ms: Option<DateTime<Utc>>,
    /// The time Apple customer support canceled a transaction, in
    /// milliseconds.
    #[serde_as(as = "DefaultOnError<Option<TimestampMilliSeconds<String, Flexible>>>")]
    #[serde(default)]
    pub(crate) cancellation_date_ms: Option<DateTime<Utc>>,
    /// Whether the subscription is in the free trial period ("true" or
    /// "false").
    #[serde_as(as = "DefaultOnError<Option<DisplayFromStr>>")]
    #[serde(default)]
    pub(crate) is_trial_period: Option<bool>,
}

impl From<ReceiptItemModel> for ReceiptItem {
    fn from(m: ReceiptItemModel) -> Self {
        ReceiptItem {
            product_id: m.product_id,
            quantity: m.quantity,
            transaction_id: m.transaction_id,
            original_transaction_id: m.original_transaction_id,
            purchase_date: m.purchase_date_ms,
            original_purchase_date: m.original_purchase_date_ms,
            web_order_line_item_id: m.web_order_line_item_id,
            subscription_expiration_date: m.expires_date_ms,
            cancellation_date: m.cancellation_date_ms,
            is_trial_period: m.is_trial_period.unwrap_or(false),
        }
    }
}

/// Parses a raw receipt record. Unparsable records are logged and yield
/// `None`.
pub(crate) fn parse_receipt_item(record: &Value) -> Option<ReceiptItem> {
    match ReceiptItemModel::deserialize(record) {
        Ok(m) => Some(m.into()),
        Err(e) => {
            tracing::warn!(error = %e, %record, "could not parse receipt item; skipping");
            None
        }
    }
}

/// Whether the record was cancelled by Apple customer support. Either
/// cancellation field counts, whatever its value.
pub(crate) fn is_cancelled(record: &Value) -> bool {
    ["cancellation_date", "cancellation_date_ms"]
        .iter()
        .any(|key| record.get(key).is_some_and(|v| !v.is_null()))
}
