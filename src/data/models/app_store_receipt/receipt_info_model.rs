use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_with::{formats::Flexible, serde_as, DefaultOnError, TimestampMilliSeconds};

/// The `receipt` object of a decoded receipt. Only the fields read outside of
/// the purchase records are modelled.
///
/// https://developer.apple.com/documentation/appstorereceipts/responsebody/receipt
#[serde_as]
#[derive(Debug, Deserialize)]
pub(crate) struct ReceiptInfoModel {
    /// The time the request to the verifyReceipt endpoint was processed, in
    /// milliseconds.
    #[serde_as(as = "DefaultOnError<Option<TimestampMilliSeconds<String, Flexible>>>")]
    #[serde(default)]
    pub(crate) request_date_ms: Option<DateTime<Utc>>,
}
