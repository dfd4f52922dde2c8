use crate::{
    constants::{
        APP_STORE_EXCLUDE_OLD_TRANSACTIONS_ENV, APP_STORE_PRODUCTION_VERIFY_RECEIPT_URL,
        APP_STORE_SANDBOX_VERIFY_RECEIPT_URL,
    },
    errors::ConfigError,
    secrets::{PurchaseKitSecretsConfig, APP_STORE_SHARED_SECRET},
};

/// Settings for [`AppleReceiptValidator`](crate::data::datasources::app_store_receipt_validator::AppleReceiptValidator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptValidatorConfig {
    /// The app's shared secret. Only needed for auto-renewable
    /// subscriptions.
    pub shared_secret: Option<String>,
    pub exclude_old_transactions: bool,
    pub production_url: String,
    pub sandbox_url: String,
}

impl Default for ReceiptValidatorConfig {
    fn default() -> Self {
        Self {
            shared_secret: None,
            exclude_old_transactions: false,
            production_url: APP_STORE_PRODUCTION_VERIFY_RECEIPT_URL.to_string(),
            sandbox_url: APP_STORE_SANDBOX_VERIFY_RECEIPT_URL.to_string(),
        }
    }
}

impl ReceiptValidatorConfig {
    /// Reads `APP_STORE_SHARED_SECRET` and
    /// `APP_STORE_EXCLUDE_OLD_TRANSACTIONS` from the environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_secrets(|secret| match secret {
            PurchaseKitSecretsConfig::AppStoreSharedSecret => {
                std::env::var(APP_STORE_SHARED_SECRET).ok()
            }
        })
    }

    /// Takes the shared secret from a secrets store, and the remaining
    /// settings from the environment.
    pub fn from_secrets(
        secret: impl Fn(&PurchaseKitSecretsConfig) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::from_sources(secret, |key| std::env::var(key).ok())
    }

    fn from_sources(
        secret: impl Fn(&PurchaseKitSecretsConfig) -> Option<String>,
        env: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let shared_secret =
            secret(&PurchaseKitSecretsConfig::AppStoreSharedSecret).filter(|s| !s.is_empty());
        let exclude_old_transactions = match env(APP_STORE_EXCLUDE_OLD_TRANSACTIONS_ENV) {
            None => false,
            Some(value) => value.parse().map_err(|_| ConfigError::InvalidValue {
                key: APP_STORE_EXCLUDE_OLD_TRANSACTIONS_ENV,
                value,
            })?,
        };
        Ok(Self {
            shared_secret,
            exclude_old_transactions,
            ..Self::default()
        })
    }
}
