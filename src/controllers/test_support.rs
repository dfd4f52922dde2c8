use std::sync::{Arc, Mutex, Weak};

use crate::domain::{
    entities::{
        product::{PriceInfo, Product},
        purchase::{Payment, TransactionResult},
        transaction::Transaction,
    },
    repositories::payment_queue::{PaymentQueue, TransactionObserver},
};

use super::transaction_controller::{Delivery, TransactionController};

#[derive(Default)]
pub(crate) struct RecordingQueue {
    finished: Mutex<Vec<Transaction>>,
    enqueued: Mutex<Vec<String>>,
    restores: Mutex<Vec<Option<String>>>,
    observers: Mutex<Vec<Weak<dyn TransactionObserver>>>,
}

impl RecordingQueue {
    pub(crate) fn finished(&self) -> Vec<Transaction> {
        self.finished.lock().unwrap().clone()
    }

    pub(crate) fn enqueued(&self) -> Vec<String> {
        self.enqueued.lock().unwrap().clone()
    }

    pub(crate) fn restores(&self) -> Vec<Option<String>> {
        self.restores.lock().unwrap().clone()
    }

    pub(crate) fn observer_count(&self) -> usize {
        self.observers.lock().unwrap().len()
    }
}

impl PaymentQueue for RecordingQueue {
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

    fn restore_completed_transactions(&self, application_username: Option<&str>) {
        self.restores
            .lock()
            .unwrap()
            .push(application_username.map(str::to_string));
    }

    fn finish_transaction(&self, transaction: &Transaction) {
        self.finished.lock().unwrap().push(transaction.clone());
    }
}

pub(crate) fn product(product_id: &str) -> Product {
    Product {
        product_id: product_id.to_string(),
        localized_title: product_id.to_string(),
        localized_description: String::new(),
        price_info: PriceInfo {
            price_micros: 990_000,
            currency_iso_4217: "USD".to_string(),
        },
    }
}

pub(crate) fn payment(
    product_id: &str,
    atomically: bool,
    results: Arc<Mutex<Vec<TransactionResult>>>,
) -> Payment {
    Payment {
        product: product(product_id),
        quantity: 1,
        atomically,
        application_username: String::new(),
        callback: Box::new(move |result| results.lock().unwrap().push(result)),
    }
}

/// Runs one stage and then its deliveries.
pub(crate) fn run(
    controller: &mut dyn TransactionController,
    transactions: Vec<Transaction>,
    queue: &RecordingQueue,
) -> Vec<Transaction> {
    let mut deliveries: Vec<Delivery> = Vec::new();
    let unhandled = controller.process_transactions(transactions, queue, &mut deliveries);
    deliveries.into_iter().for_each(|d| d());
    unhandled
}
