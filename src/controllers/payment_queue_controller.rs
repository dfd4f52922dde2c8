use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, warn};

use crate::{
    domain::{
        entities::{
            purchase::{CompleteTransactions, Payment, RestorePurchases, TransactionResult},
            transaction::{Transaction, TransactionState},
        },
        repositories::payment_queue::{PaymentQueue, TransactionObserver},
    },
    errors::PaymentError,
};

use super::{
    complete_transactions_controller::CompleteTransactionsController,
    payments_controller::PaymentsController,
    restore_purchases_controller::RestorePurchasesController,
    transaction_controller::{Delivery, TransactionController},
};

#[derive(Default)]
struct ControllerState {
    payments: PaymentsController,
    restore_purchases: RestorePurchasesController,
    complete_transactions: CompleteTransactionsController,
}

/// Observes the payment queue and routes every transaction update to exactly
/// one of its stages.
///
/// Transactions are offered, in order, to:
/// 1. pending payments (purchased and failed transactions of a product with a
///    pending payment),
/// 2. the restore request in flight (restored transactions),
/// 3. the complete-transactions handler (anything not purchasing).
///
/// Restore requests skip ahead of payments in the store's queue and the store
/// rejects concurrent restores, so at most one restore is tracked. Failed
/// transactions only ever belong to payments. Without a complete-transactions
/// handler, transactions left over from a previous launch would be attributed
/// to whatever payment or restore comes next.
///
/// Callbacks run on the thread delivering the update, after all stages have
/// processed the batch and the state lock is released.
pub(crate) struct PaymentQueueController {
    payment_queue: Arc<dyn PaymentQueue>,
    state: Mutex<ControllerState>,
    /// Handle under which this controller is registered with the queue.
    observer: Weak<dyn TransactionObserver>,
}

impl PaymentQueueController {
    pub(crate) fn new(payment_queue: Arc<dyn PaymentQueue>) -> Arc<Self> {
        let controller = Arc::new_cyclic(|this: &Weak<Self>| {
            let observer: Weak<dyn TransactionObserver> = this.clone();
            Self {
                payment_queue: payment_queue.clone(),
                state: Mutex::default(),
                observer,
            }
        });
        payment_queue.add_observer(controller.observer.clone());
        controller
    }

    pub(crate) fn start_payment(&self, payment: Payment) {
        let product_id = payment.product_id().to_string();
        let quantity = payment.quantity;
        let application_username = payment.application_username.clone();

        let appended = self.lock_state().payments.append(payment);
        if let Err(payment) = appended {
            warn!(%product_id, "payment already in progress for product; rejecting");
            (payment.callback)(TransactionResult::Failed(PaymentError::PaymentInProgress));
            return;
        }
        self.payment_queue
            .enqueue_payment(&product_id, quantity, &application_username);
    }

    pub(crate) fn restore_purchases(&self, restore_purchases: RestorePurchases) {
        let application_username = restore_purchases.application_username.clone();
        let began = self.lock_state().restore_purchases.begin(restore_purchases);
        if !began {
            debug!("restore already in progress; ignoring request");
            return;
        }
        self.payment_queue
            .restore_completed_transactions(application_username.as_deref());
    }

    pub(crate) fn complete_transactions(&self, complete_transactions: CompleteTransactions) {
        self.lock_state()
            .complete_transactions
            .register(complete_transactions);
    }

    pub(crate) fn finish_transaction(&self, transaction: &Transaction) {
        self.payment_queue.finish_transaction(transaction);
    }

    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TransactionObserver for PaymentQueueController {
    fn on_transactions_updated(&self, transactions: Vec<Transaction>) {
        let mut deliveries = Vec::new();
        let unhandled_transactions = {
            let mut state = self.lock_state();
            let payment_queue = self.payment_queue.as_ref();
            let unhandled =
                state
                    .payments
                    .process_transactions(transactions, payment_queue, &mut deliveries);
            let unhandled = state.restore_purchases.process_transactions(
                unhandled,
                payment_queue,
                &mut deliveries,
            );
            state
                .complete_transactions
                .process_transactions(unhandled, payment_queue, &mut deliveries)
        };

        // Left in the queue on purpose: finishing a transaction nobody
        // claimed would lose it.
        let unhandled_transactions: Vec<String> = unhandled_transactions
            .iter()
            .filter(|t| t.state != TransactionState::Purchasing)
            .map(Transaction::to_string)
            .collect();
        if !unhandled_transactions.is_empty() {
            warn!(
                count = unhandled_transactions.len(),
                "unhandled transactions:\n{}",
                unhandled_transactions.join("\n")
            );
        }

        deliver(deliveries);
    }

    fn on_restore_failed(&self, error: PaymentError) {
        let mut deliveries = Vec::new();
        self.lock_state()
            .restore_purchases
            .restore_completed_transactions_failed(error, &mut deliveries);
        deliver(deliveries);
    }

    fn on_restore_finished(&self) {
        let mut deliveries = Vec::new();
        self.lock_state()
            .restore_purchases
            .restore_completed_transactions_finished(&mut deliveries);
        deliver(deliveries);
    }
}

impl Drop for PaymentQueueController {
    fn drop(&mut self) {
        self.payment_queue.remove_observer(&self.observer);
    }
}

fn deliver(deliveries: Vec<Delivery>) {
    for delivery in deliveries {
        delivery();
    }
}
