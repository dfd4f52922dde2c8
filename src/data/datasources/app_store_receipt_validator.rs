use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use tracing::debug;

use crate::{
    config::ReceiptValidatorConfig,
    data::models::app_store_receipt::verify_receipt_request_model::VerifyReceiptRequestModel,
    domain::{
        entities::receipt::{Receipt, ReceiptStatus},
        repositories::receipt_validator::ReceiptValidator,
    },
    errors::ReceiptError,
};

/// Validates receipts with the App Store verifyReceipt endpoint:
/// https://developer.apple.com/documentation/appstorereceipts/verifyreceipt
///
/// Apple recommends validating receipts from your own server rather than
/// from the device. Implement [`ReceiptValidator`] for your server to do so.
pub struct AppleReceiptValidator {
    config: ReceiptValidatorConfig,
    client: reqwest::Client,
}

#[async_trait]
impl ReceiptValidator for AppleReceiptValidator {
    async fn validate(
        &self,
        receipt: &str,
        shared_secret: Option<&str>,
    ) -> Result<Receipt, ReceiptError> {
        let body = serde_json::to_vec(&VerifyReceiptRequestModel {
            receipt_data: receipt,
            password: shared_secret.or(self.config.shared_secret.as_deref()),
            exclude_old_transactions: self.config.exclude_old_transactions,
        })
        .map_err(ReceiptError::RequestBodyEncode)?;

        // As per Apple's documentation, always try the production endpoint
        // first, and only retry against the sandbox if production reports a
        // sandbox receipt.
        match self.callout(&self.config.production_url, &body).await {
            Err(ReceiptError::ReceiptInvalid {
                status: ReceiptStatus::TestReceipt,
                ..
            }) => {
                debug!("sandbox receipt sent to production; retrying against sandbox");
                self.callout(&self.config.sandbox_url, &body).await
            }
            result => result,
        }
    }
}

impl AppleReceiptValidator {
    pub fn new(config: ReceiptValidatorConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    async fn callout(&self, url: &str, body: &[u8]) -> Result<Receipt, ReceiptError> {
        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await
            .map_err(|e| ReceiptError::Network(Box::new(e)))?;

        if !response.status().is_success() {
            return Err(ReceiptError::Network(
                format!("verifyReceipt returned with {} status code", response.status()).into(),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ReceiptError::Network(Box::new(e)))?;
        receipt_from_response_body(&bytes)
    }
}

/// Maps a verifyReceipt response body to a receipt, or to the error
/// describing why it is unusable.
pub(crate) fn receipt_from_response_body(body: &[u8]) -> Result<Receipt, ReceiptError> {
    if body.is_empty() {
        return Err(ReceiptError::NoRemoteData);
    }
    let fields: Map<String, Value> =
        serde_json::from_slice(body).map_err(|_| ReceiptError::JsonDecode {
            payload: String::from_utf8(body.to_vec()).ok(),
        })?;

    let status = ReceiptStatus::from_response_value(fields.get("status"));
    let receipt = Receipt::new(fields);
    if status.is_valid() {
        Ok(receipt)
    } else {
        Err(ReceiptError::ReceiptInvalid { receipt, status })
    }
}
