use tracing::{debug, warn};

use crate::domain::{
    entities::{
        purchase::{CompleteTransactions, Purchase},
        transaction::{Transaction, TransactionState},
    },
    repositories::payment_queue::PaymentQueue,
};

use super::transaction_controller::{Delivery, TransactionController};

/// Catch-all for transactions no other stage claimed.
#[derive(Default)]
pub(crate) struct CompleteTransactionsController {
    complete_transactions: Option<CompleteTransactions>,
}

impl CompleteTransactionsController {
    /// Only the first registration is kept.
    pub(crate) fn register(&mut self, complete_transactions: CompleteTransactions) -> bool {
        if self.complete_transactions.is_some() {
            warn!("complete_transactions should only be called once when the app launches; ignoring this call");
            return false;
        }
        self.complete_transactions = Some(complete_transactions);
        true
    }
}

impl TransactionController for CompleteTransactionsController {
    fn process_transactions(
        &mut self,
        transactions: Vec<Transaction>,
        payment_queue: &dyn PaymentQueue,
        deliveries: &mut Vec<Delivery>,
    ) -> Vec<Transaction> {
        let Some(complete_transactions) = &self.complete_transactions else {
            if !transactions.is_empty() {
                warn!("complete_transactions should be called once when the app launches; pending transactions will not be completed");
            }
            return transactions;
        };

        let mut unhandled_transactions = Vec::new();
        let mut purchases = Vec::new();
        for transaction in transactions {
            if transaction.state == TransactionState::Purchasing {
                unhandled_transactions.push(transaction);
                continue;
            }
            debug!(
                product_id = %transaction.product_id,
                state = %transaction.state,
                "completing transaction"
            );
            purchases.push(Purchase::from_transaction(
                &transaction,
                complete_transactions.atomically,
            ));
            if complete_transactions.atomically {
                payment_queue.finish_transaction(&transaction);
            }
        }

        if !purchases.is_empty() {
            let callback = complete_transactions.callback.clone();
            deliveries.push(Box::new(move || callback(purchases)));
        }
        unhandled_transactions
    }
}
