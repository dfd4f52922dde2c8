use std::sync::Weak;

use crate::{domain::entities::transaction::Transaction, errors::PaymentError};

/// The store's payment queue.
///
/// Implementations deliver updates to registered observers serially and in
/// order, and must not call back into an observer from inside one of the
/// methods below.
pub trait PaymentQueue: Send + Sync {
    /// Registers an observer. The queue only keeps a weak reference; the
    /// observer unregisters itself when dropped.
    fn add_observer(&self, observer: Weak<dyn TransactionObserver>);

    fn remove_observer(&self, observer: &Weak<dyn TransactionObserver>);

    fn enqueue_payment(&self, product_id: &str, quantity: u32, application_username: &str);

    fn restore_completed_transactions(&self, application_username: Option<&str>);

    /// Removes the transaction from the queue. The store keeps redelivering a
    /// transaction until it is finished.
    fn finish_transaction(&self, transaction: &Transaction);
}

/// Receives transaction updates from a [`PaymentQueue`].
pub trait TransactionObserver: Send + Sync {
    fn on_transactions_updated(&self, transactions: Vec<Transaction>);

    /// Sent once when a restore request fails.
    fn on_restore_failed(&self, error: PaymentError);

    /// Sent once after all restored transactions of a successful restore
    /// request have been delivered.
    fn on_restore_finished(&self);
}
