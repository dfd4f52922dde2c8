use tracing::{debug, warn};

use crate::{
    domain::{
        entities::{
            purchase::{Payment, PurchaseDetails, TransactionResult},
            transaction::{Transaction, TransactionState},
        },
        repositories::payment_queue::PaymentQueue,
    },
    errors::PaymentError,
};

use super::transaction_controller::{Delivery, TransactionController};

/// Tracks payments started by the application until their transaction is
/// purchased or failed.
#[derive(Default)]
pub(crate) struct PaymentsController {
    payments: Vec<Payment>,
}

impl PaymentsController {
    pub(crate) fn has_payment(&self, product_id: &str) -> bool {
        self.find_payment_index(product_id).is_some()
    }

    /// Hands the payment back if one for the same product is still pending.
    pub(crate) fn append(&mut self, payment: Payment) -> Result<(), Payment> {
        if self.has_payment(payment.product_id()) {
            return Err(payment);
        }
        self.payments.push(payment);
        Ok(())
    }

    fn find_payment_index(&self, product_id: &str) -> Option<usize> {
        self.payments.iter().position(|p| p.product_id() == product_id)
    }

    /// Returns the transaction back if it was not claimed.
    fn process_transaction(
        &mut self,
        transaction: Transaction,
        payment_queue: &dyn PaymentQueue,
        deliveries: &mut Vec<Delivery>,
    ) -> Option<Transaction> {
        let Some(index) = self.find_payment_index(&transaction.product_id) else {
            return Some(transaction);
        };

        match transaction.state {
            TransactionState::Purchased => {
                let payment = self.payments.remove(index);
                debug!(
                    product_id = %transaction.product_id,
                    atomically = payment.atomically,
                    "payment purchased"
                );
                if payment.atomically {
                    payment_queue.finish_transaction(&transaction);
                }
                let details = PurchaseDetails {
                    product_id: transaction.product_id.clone(),
                    quantity: transaction.quantity,
                    product: payment.product,
                    transaction,
                    needs_finish_transaction: !payment.atomically,
                };
                let callback = payment.callback;
                deliveries.push(Box::new(move || {
                    callback(TransactionResult::Purchased(details))
                }));
                None
            }
            TransactionState::Failed => {
                let payment = self.payments.remove(index);
                let error = transaction
                    .error
                    .clone()
                    .unwrap_or_else(PaymentError::unknown);
                debug!(product_id = %transaction.product_id, %error, "payment failed");
                // Failed transactions are always finished, otherwise they
                // stay in the queue.
                payment_queue.finish_transaction(&transaction);
                let callback = payment.callback;
                deliveries.push(Box::new(move || callback(TransactionResult::Failed(error))));
                None
            }
            TransactionState::Restored => {
                warn!(
                    product_id = %transaction.product_id,
                    "unexpected restored transaction for pending payment"
                );
                Some(transaction)
            }
            TransactionState::Purchasing | TransactionState::Deferred => Some(transaction),
        }
    }
}

impl TransactionController for PaymentsController {
    fn process_transactions(
        &mut self,
        transactions: Vec<Transaction>,
        payment_queue: &dyn PaymentQueue,
        deliveries: &mut Vec<Delivery>,
    ) -> Vec<Transaction> {
        transactions
            .into_iter()
            .filter_map(|t| self.process_transaction(t, payment_queue, deliveries))
            .collect()
    }
}
