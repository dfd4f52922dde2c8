use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::BoxError;

/// Asks the store to fetch a fresh app receipt onto the device.
#[async_trait]
pub trait ReceiptRefresher: Send + Sync {
    async fn refresh(&self, receipt_properties: Option<&Map<String, Value>>)
        -> Result<(), BoxError>;
}
