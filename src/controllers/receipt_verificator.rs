use std::{
    path::PathBuf,
    sync::atomic::{AtomicBool, Ordering},
};

use base64::{prelude::BASE64_STANDARD, Engine as _};
use tracing::{debug, warn};

use crate::{
    domain::{
        entities::receipt::Receipt,
        repositories::{receipt_refresher::ReceiptRefresher, receipt_validator::ReceiptValidator},
    },
    errors::{BoxError, ReceiptError},
};

/// Loads the app receipt from disk, refreshing it through the store when it
/// is missing, and hands it to a validator.
pub(crate) struct InAppReceiptVerificator<F: ReceiptRefresher> {
    app_store_receipt_path: PathBuf,
    receipt_refresher: F,
    /// Set while a refresh is outstanding. Only one is expected at a time;
    /// overlapping verifications are the caller's responsibility.
    refresh_in_flight: AtomicBool,
}

impl<F: ReceiptRefresher> InAppReceiptVerificator<F> {
    pub(crate) fn new(app_store_receipt_path: PathBuf, receipt_refresher: F) -> Self {
        Self {
            app_store_receipt_path,
            receipt_refresher,
            refresh_in_flight: AtomicBool::new(false),
        }
    }

    pub(crate) async fn app_store_receipt_data(&self) -> Option<Vec<u8>> {
        tokio::fs::read(&self.app_store_receipt_path).await.ok()
    }

    /// Validates the local receipt, refreshing it first if it is missing or
    /// `force_refresh` is set.
    pub(crate) async fn verify_receipt<V: ReceiptValidator + ?Sized>(
        &self,
        validator: &V,
        shared_secret: Option<&str>,
        force_refresh: bool,
    ) -> Result<Receipt, ReceiptError> {
        if !force_refresh {
            if let Some(receipt_data) = self.app_store_receipt_data().await {
                return verify(&receipt_data, validator, shared_secret).await;
            }
        }

        self.refresh().await.map_err(ReceiptError::Network)?;
        let receipt_data = self
            .app_store_receipt_data()
            .await
            .ok_or(ReceiptError::NoReceiptData)?;
        verify(&receipt_data, validator, shared_secret).await
    }

    async fn refresh(&self) -> Result<(), BoxError> {
        if self.refresh_in_flight.swap(true, Ordering::SeqCst) {
            warn!("receipt refresh started while another is in flight");
        }
        let _in_flight = RefreshInFlight(&self.refresh_in_flight);
        debug!(path = %self.app_store_receipt_path.display(), "refreshing app receipt");
        self.receipt_refresher.refresh(None).await
    }
}

struct RefreshInFlight<'a>(&'a AtomicBool);

impl Drop for RefreshInFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

async fn verify<V: ReceiptValidator + ?Sized>(
    receipt_data: &[u8],
    validator: &V,
    shared_secret: Option<&str>,
) -> Result<Receipt, ReceiptError> {
    let encoded = BASE64_STANDARD.encode(receipt_data);
    validator.validate(&encoded, shared_secret).await
}
