use std::{path::PathBuf, sync::Arc};

use chrono::{DateTime, Utc};

use crate::{
    controllers::{
        payment_queue_controller::PaymentQueueController,
        products_info_controller::ProductsInfoController,
        receipt_verificator::InAppReceiptVerificator,
    },
    domain::{
        entities::{
            product::{Product, RetrieveResults},
            purchase::{
                CompleteTransactions, Payment, Purchase, RestorePurchases, RestoreResults,
                TransactionResult,
            },
            receipt::Receipt,
            transaction::Transaction,
            verify_result::{SubscriptionType, VerifyPurchaseResult, VerifySubscriptionResult},
        },
        repositories::{
            payment_queue::PaymentQueue, products_request::ProductsRequest,
            receipt_refresher::ReceiptRefresher, receipt_validator::ReceiptValidator,
        },
        services::entitlement_evaluator,
    },
    errors::{PaymentError, ReceiptError},
};

pub struct PurchaseKit<P: ProductsRequest, F: ReceiptRefresher> {
    payment_queue_controller: Arc<PaymentQueueController>,
    products_info_controller: ProductsInfoController<P>,
    receipt_verificator: InAppReceiptVerificator<F>,
}

impl<P: ProductsRequest, F: ReceiptRefresher> PurchaseKit<P, F> {
    /// Registers with `payment_queue` immediately. Call
    /// [`complete_transactions`](Self::complete_transactions) right after
    /// construction so that transactions left over from a previous launch
    /// are handled.
    pub fn new(
        payment_queue: Arc<dyn PaymentQueue>,
        products_request: P,
        receipt_refresher: F,
        app_store_receipt_path: PathBuf,
    ) -> Self {
        Self {
            payment_queue_controller: PaymentQueueController::new(payment_queue),
            products_info_controller: ProductsInfoController::new(products_request),
            receipt_verificator: InAppReceiptVerificator::new(
                app_store_receipt_path,
                receipt_refresher,
            ),
        }
    }

    pub async fn retrieve_products_info(
        &self,
        product_ids: impl IntoIterator<Item = String>,
    ) -> RetrieveResults {
        self.products_info_controller
            .retrieve_products_info(product_ids)
            .await
    }

    /// Looks up the product, then starts a payment for it. Lookup failures
    /// are reported through `callback`.
    pub async fn purchase_product(
        &self,
        product_id: &str,
        quantity: u32,
        atomically: bool,
        application_username: &str,
        callback: impl FnOnce(TransactionResult) + Send + 'static,
    ) {
        let results = self
            .retrieve_products_info([product_id.to_string()])
            .await;
        if let Some(error) = &results.error {
            callback(TransactionResult::Failed(PaymentError::Unknown(
                error.to_string(),
            )));
            return;
        }
        match results.product(product_id) {
            Some(product) => self.purchase(
                product.clone(),
                quantity,
                atomically,
                application_username,
                callback,
            ),
            None => callback(TransactionResult::Failed(
                PaymentError::StoreProductNotAvailable,
            )),
        }
    }

    pub fn purchase(
        &self,
        product: Product,
        quantity: u32,
        atomically: bool,
        application_username: &str,
        callback: impl FnOnce(TransactionResult) + Send + 'static,
    ) {
        self.payment_queue_controller.start_payment(Payment {
            product,
            quantity,
            atomically,
            application_username: application_username.to_string(),
            callback: Box::new(callback),
        });
    }

    /// Ignored while another restore is in flight.
    pub fn restore_purchases(
        &self,
        atomically: bool,
        application_username: Option<&str>,
        callback: impl FnOnce(RestoreResults) + Send + 'static,
    ) {
        self.payment_queue_controller
            .restore_purchases(RestorePurchases {
                atomically,
                application_username: application_username.map(str::to_string),
                callback: Box::new(move |results| callback(RestoreResults::from(results))),
            });
    }

    /// Installs the handler for transactions no payment or restore claimed.
    /// Only the first call has an effect.
    pub fn complete_transactions(
        &self,
        atomically: bool,
        callback: impl Fn(Vec<Purchase>) + Send + Sync + 'static,
    ) {
        self.payment_queue_controller
            .complete_transactions(CompleteTransactions {
                atomically,
                callback: Arc::new(callback),
            });
    }

    /// Finishes a transaction delivered with `needs_finish_transaction` set.
    pub fn finish_transaction(&self, transaction: &Transaction) {
        self.payment_queue_controller.finish_transaction(transaction);
    }

    pub async fn verify_receipt<V: ReceiptValidator + ?Sized>(
        &self,
        validator: &V,
        shared_secret: Option<&str>,
        force_refresh: bool,
    ) -> Result<Receipt, ReceiptError> {
        self.receipt_verificator
            .verify_receipt(validator, shared_secret, force_refresh)
            .await
    }

    pub fn verify_purchase(product_id: &str, receipt: &Receipt) -> VerifyPurchaseResult {
        entitlement_evaluator::verify_purchase(product_id, receipt)
    }

    pub fn verify_subscription(
        subscription_type: SubscriptionType,
        product_id: &str,
        receipt: &Receipt,
        valid_until: DateTime<Utc>,
    ) -> VerifySubscriptionResult {
        entitlement_evaluator::verify_subscription(
            subscription_type,
            product_id,
            receipt,
            valid_until,
        )
    }

    /// [`verify_subscription`](Self::verify_subscription) as of now.
    pub fn verify_subscription_now(
        subscription_type: SubscriptionType,
        product_id: &str,
        receipt: &Receipt,
    ) -> VerifySubscriptionResult {
        Self::verify_subscription(subscription_type, product_id, receipt, Utc::now())
    }
}
