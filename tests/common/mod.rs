#![allow(dead_code)]

use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, Weak},
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fractic_purchase_kit::{
    domain::{
        entities::{
            product::{PriceInfo, Product},
            receipt::Receipt,
            transaction::Transaction,
        },
        repositories::{
            payment_queue::{PaymentQueue, TransactionObserver},
            products_request::{ProductsRequest, ProductsResponse},
            receipt_refresher::ReceiptRefresher,
        },
    },
    errors::{BoxError, PaymentError},
    util::PurchaseKit,
};
use serde_json::{json, Map, Value};

/// In-memory payment queue recording every call made to it. Updates are
/// pushed to the registered observers by the test.
#[derive(Default)]
pub struct FakePaymentQueue {
    observers: Mutex<Vec<Weak<dyn TransactionObserver>>>,
    enqueued: Mutex<Vec<String>>,
    restores: Mutex<usize>,
    finished: Mutex<Vec<Transaction>>,
}

impl FakePaymentQueue {
    pub fn update(&self, transactions: Vec<Transaction>) {
        for observer in self.live_observers() {
            observer.on_transactions_updated(transactions.clone());
        }
    }

    pub fn restore_finished(&self) {
        for observer in self.live_observers() {
            observer.on_restore_finished();
        }
    }

    pub fn restore_failed(&self, error: PaymentError) {
        for observer in self.live_observers() {
            observer.on_restore_failed(error.clone());
        }
    }

    pub fn enqueued(&self) -> Vec<String> {
        self.enqueued.lock().unwrap().clone()
    }

    pub fn restores(&self) -> usize {
        *self.restores.lock().unwrap()
    }

    pub fn finished_ids(&self) -> Vec<String> {
        self.finished
            .lock()
            .unwrap()
            .iter()
            .filter_map(|t| t.transaction_id.clone())
            .collect()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.lock().unwrap().len()
    }

    // Snapshot first so observers can call back into the queue.
    fn live_observers(&self) -> Vec<Arc<dyn TransactionObserver>> {
        self.observers
            .lock()
            .unwrap()
            .iter()
            .filter_map(Weak::upgrade)
            .collect()
    }
}

impl PaymentQueue for FakePaymentQueue {
    fn add_observer(&self, observer: Weak<dyn TransactionObserver>) {
        self.observers.lock().unwrap().push(observer);
    }

    fn remove_observer(&self, observer: &Weak<dyn TransactionObserver>) {
        self.observers
            .lock()
            .unwrap()
            .retain(|o| !Weak::ptr_eq(o, observer));
    }

    fn enqueue_payment(&self, product_id: &str, _quantity: u32, _application_username: &str) {
        self.enqueued.lock().unwrap().push(product_id.to_string());
    }

    fn restore_completed_transactions(&self, _application_username: Option<&str>) {
        *self.restores.lock().unwrap() += 1;
    }

    fn finish_transaction(&self, transaction: &Transaction) {
        self.finished.lock().unwrap().push(transaction.clone());
    }
}

/// Store catalog answering from a fixed list of known product ids.
pub struct StaticProductsRequest {
    pub known_product_ids: Vec<String>,
}

#[async_trait]
impl ProductsRequest for StaticProductsRequest {
    async fn request_products(
        &self,
        product_ids: &BTreeSet<String>,
    ) -> Result<ProductsResponse, BoxError> {
        let (known, unknown): (Vec<&String>, Vec<&String>) = product_ids
            .iter()
            .partition(|id| self.known_product_ids.contains(id));
        Ok(ProductsResponse {
            products: known.into_iter().map(|id| product(id)).collect(),
            invalid_product_identifiers: unknown.into_iter().cloned().collect(),
        })
    }
}

pub struct NoopReceiptRefresher;

#[async_trait]
impl ReceiptRefresher for NoopReceiptRefresher {
    async fn refresh(
        &self,
        _receipt_properties: Option<&Map<String, Value>>,
    ) -> Result<(), BoxError> {
        Ok(())
    }
}

pub type TestKit = PurchaseKit<StaticProductsRequest, NoopReceiptRefresher>;

pub fn purchase_kit(known_product_ids: &[&str]) -> (Arc<FakePaymentQueue>, TestKit) {
    let queue = Arc::new(FakePaymentQueue::default());
    let kit = PurchaseKit::new(
        queue.clone(),
        StaticProductsRequest {
            known_product_ids: known_product_ids.iter().map(|s| s.to_string()).collect(),
        },
        NoopReceiptRefresher,
        std::env::temp_dir().join("fractic-purchase-kit-missing-receipt"),
    );
    (queue, kit)
}

pub fn product(product_id: &str) -> Product {
    Product {
        product_id: product_id.to_string(),
        localized_title: product_id.to_string(),
        localized_description: String::new(),
        price_info: PriceInfo {
            price_micros: 1_990_000,
            currency_iso_4217: "USD".to_string(),
        },
    }
}

/// Collects values handed to a callback.
pub fn sink<T: Send + 'static>() -> (Arc<Mutex<Vec<T>>>, impl Fn(T) + Send + Sync + 'static) {
    let values = Arc::new(Mutex::new(Vec::new()));
    let pushed = values.clone();
    (values, move |value| pushed.lock().unwrap().push(value))
}

pub fn receipt(value: Value) -> Receipt {
    let Value::Object(map) = value else {
        panic!("receipt fixture must be an object");
    };
    Receipt::new(map)
}

pub fn millis(date: DateTime<Utc>) -> String {
    date.timestamp_millis().to_string()
}

pub fn in_app_record(product_id: &str, transaction_id: &str, purchased_at: DateTime<Utc>) -> Value {
    json!({
        "product_id": product_id,
        "quantity": "1",
        "transaction_id": transaction_id,
        "original_transaction_id": transaction_id,
        "purchase_date_ms": millis(purchased_at),
        "original_purchase_date_ms": millis(purchased_at),
    })
}
