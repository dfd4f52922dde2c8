use std::mem;

use tracing::debug;

use crate::{
    domain::{
        entities::{
            purchase::{Purchase, RestorePurchases, TransactionResult},
            transaction::{Transaction, TransactionState},
        },
        repositories::payment_queue::PaymentQueue,
    },
    errors::PaymentError,
};

use super::transaction_controller::{Delivery, TransactionController};

/// Collects restored transactions for the one restore request in flight.
#[derive(Default)]
pub(crate) struct RestorePurchasesController {
    restore_purchases: Option<RestorePurchases>,
    restored_purchases: Vec<TransactionResult>,
}

impl RestorePurchasesController {
    pub(crate) fn is_restoring(&self) -> bool {
        self.restore_purchases.is_some()
    }

    /// Returns false, dropping the request, if a restore is already in
    /// flight.
    pub(crate) fn begin(&mut self, restore_purchases: RestorePurchases) -> bool {
        if self.is_restoring() {
            return false;
        }
        self.restore_purchases = Some(restore_purchases);
        true
    }

    pub(crate) fn restore_completed_transactions_failed(
        &mut self,
        error: PaymentError,
        deliveries: &mut Vec<Delivery>,
    ) {
        let Some(restore_purchases) = self.restore_purchases.take() else {
            debug!(%error, "restore callback already called; ignoring failure");
            return;
        };
        let mut results = mem::take(&mut self.restored_purchases);
        results.push(TransactionResult::Failed(error));
        let callback = restore_purchases.callback;
        deliveries.push(Box::new(move || callback(results)));
    }

    pub(crate) fn restore_completed_transactions_finished(&mut self, deliveries: &mut Vec<Delivery>) {
        let Some(restore_purchases) = self.restore_purchases.take() else {
            debug!("restore callback already called; ignoring finish");
            return;
        };
        let results = mem::take(&mut self.restored_purchases);
        let callback = restore_purchases.callback;
        deliveries.push(Box::new(move || callback(results)));
    }
}

impl TransactionController for RestorePurchasesController {
    fn process_transactions(
        &mut self,
        transactions: Vec<Transaction>,
        payment_queue: &dyn PaymentQueue,
        _deliveries: &mut Vec<Delivery>,
    ) -> Vec<Transaction> {
        let Some(restore_purchases) = &self.restore_purchases else {
            return transactions;
        };
        let atomically = restore_purchases.atomically;

        let mut unhandled_transactions = Vec::new();
        for transaction in transactions {
            if transaction.state != TransactionState::Restored {
                unhandled_transactions.push(transaction);
                continue;
            }
            let purchase = Purchase::from_transaction(&transaction, atomically);
            if atomically {
                payment_queue.finish_transaction(&transaction);
            }
            self.restored_purchases
                .push(TransactionResult::Restored(purchase));
        }
        unhandled_transactions
    }
}
