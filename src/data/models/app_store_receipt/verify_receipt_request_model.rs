use serde::Serialize;

/// Request body for the App Store verifyReceipt endpoint.
///
/// https://developer.apple.com/documentation/appstorereceipts/requestbody
#[derive(Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub(crate) struct VerifyReceiptRequestModel<'a> {
    /// The Base64-encoded receipt data.
    pub(crate) receipt_data: &'a str,
    /// The app's shared secret. Only required for receipts containing
    /// auto-renewable subscriptions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) password: Option<&'a str>,
    /// Only return the latest renewal transaction for any subscriptions.
    pub(crate) exclude_old_transactions: bool,
}
