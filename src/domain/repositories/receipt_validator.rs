use async_trait::async_trait;

use crate::{domain::entities::receipt::Receipt, errors::ReceiptError};

/// Turns an encoded app receipt into a decoded [`Receipt`]. Implement this to
/// validate receipts through your own server.
#[async_trait]
pub trait ReceiptValidator: Send + Sync {
    /// receipt:
    ///   The Base64-encoded receipt data.
    ///
    /// shared_secret:
    ///   The app's shared secret (a hexadecimal string). Only used for
    ///   receipts that contain auto-renewable subscriptions.
    async fn validate(
        &self,
        receipt: &str,
        shared_secret: Option<&str>,
    ) -> Result<Receipt, ReceiptError>;
}
