use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::data::models::app_store_receipt::receipt_info_model::ReceiptInfoModel;

/// Decoded app receipt, as returned by a receipt validator.
///
/// The receipt is kept as the raw key/value tree so that fields this crate
/// does not interpret stay available to the application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Receipt(Map<String, Value>);

impl Receipt {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// In-app purchase records, found under `receipt.in_app`.
    pub fn in_app(&self) -> &[Value] {
        self.0
            .get("receipt")
            .and_then(|r| r.get("in_app"))
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Renewal history for auto-renewable subscriptions, found under the
    /// top-level `latest_receipt_info`.
    pub fn latest_receipt_info(&self) -> &[Value] {
        self.0
            .get("latest_receipt_info")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Time the validation request was served, from
    /// `receipt.request_date_ms`.
    pub fn request_date(&self) -> Option<DateTime<Utc>> {
        let info = self.0.get("receipt")?;
        ReceiptInfoModel::deserialize(info).ok()?.request_date_ms
    }
}

impl From<Map<String, Value>> for Receipt {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// One in-app purchase record of a receipt.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptItem {
    pub product_id: String,
    pub quantity: i64,
    pub transaction_id: String,
    /// Identical to `transaction_id` unless this record restores an earlier
    /// transaction. Shared by every renewal of an auto-renewable
    /// subscription.
    pub original_transaction_id: String,
    pub purchase_date: DateTime<Utc>,
    /// For auto-renewable subscriptions, the start of the subscription even
    /// after renewals.
    pub original_purchase_date: DateTime<Utc>,
    pub web_order_line_item_id: Option<String>,
    pub subscription_expiration_date: Option<DateTime<Utc>>,
    /// Set when Apple customer support cancelled the transaction. A cancelled
    /// record is treated as if the purchase never happened.
    pub cancellation_date: Option<DateTime<Utc>>,
    pub is_trial_period: bool,
}

/// Status codes returned by the App Store `verifyReceipt` endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ReceiptStatus {
    /// The status could not be decoded.
    Unknown = -2,
    /// The response carried no status.
    NoStatus = -1,
    Valid = 0,
    /// The App Store could not read the JSON object provided.
    JsonNotReadable = 21000,
    /// The receipt-data property was malformed or missing.
    MalformedOrMissingData = 21002,
    ReceiptCouldNotBeAuthenticated = 21003,
    /// The shared secret does not match the one on file for the account.
    SecretNotMatching = 21004,
    ReceiptServerUnavailable = 21005,
    /// Valid receipt whose subscription has expired. The decoded receipt is
    /// still part of the response.
    SubscriptionExpired = 21006,
    /// Sandbox receipt sent to the production environment.
    TestReceipt = 21007,
    /// Production receipt sent to the sandbox environment.
    ProductionEnvironment = 21008,
}

impl ReceiptStatus {
    pub fn is_valid(&self) -> bool {
        *self == ReceiptStatus::Valid
    }

    pub(crate) fn from_response_value(status: Option<&Value>) -> Self {
        match status {
            Some(status) => ReceiptStatus::deserialize(status).unwrap_or(ReceiptStatus::Unknown),
            None => ReceiptStatus::NoStatus,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn receipt(value: Value) -> Receipt {
        match value {
            Value::Object(map) => Receipt::new(map),
            _ => panic!("receipt fixture must be an object"),
        }
    }

    #[test]
    fn missing_lists_are_empty() {
        let receipt = receipt(json!({ "status": 0 }));
        assert!(receipt.in_app().is_empty());
        assert!(receipt.latest_receipt_info().is_empty());
        assert_eq!(receipt.request_date(), None);
    }

    #[test]
    fn reads_nested_in_app_and_request_date() {
        let receipt = receipt(json!({
            "receipt": {
                "request_date_ms": "1500000000000",
                "in_app": [{ "product_id": "p1" }, { "product_id": "p2" }],
            },
            "latest_receipt_info": [{ "product_id": "sub1" }],
        }));
        assert_eq!(receipt.in_app().len(), 2);
        assert_eq!(receipt.latest_receipt_info().len(), 1);
        assert_eq!(
            receipt.request_date(),
            DateTime::from_timestamp_millis(1_500_000_000_000)
        );
    }

    #[test]
    fn unparsable_request_date_is_absent() {
        let receipt = receipt(json!({ "receipt": { "request_date_ms": "yesterday" } }));
        assert_eq!(receipt.request_date(), None);
    }

    #[test]
    fn status_codes_decode() {
        assert_eq!(
            ReceiptStatus::from_response_value(Some(&json!(21007))),
            ReceiptStatus::TestReceipt
        );
        assert_eq!(
            ReceiptStatus::from_response_value(Some(&json!(12345))),
            ReceiptStatus::Unknown
        );
        assert_eq!(
            ReceiptStatus::from_response_value(None),
            ReceiptStatus::NoStatus
        );
        assert!(ReceiptStatus::from_response_value(Some(&json!(0))).is_valid());
    }
}
