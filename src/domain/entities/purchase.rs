use std::{fmt, sync::Arc};

use crate::errors::PaymentError;

use super::{product::Product, transaction::Transaction};

pub type TransactionCallback = Box<dyn FnOnce(TransactionResult) + Send>;
pub type RestoreCallback = Box<dyn FnOnce(Vec<TransactionResult>) + Send>;
pub type CompleteTransactionsCallback = Arc<dyn Fn(Vec<Purchase>) + Send + Sync>;

/// A purchased or restored product, as delivered to the application.
#[derive(Debug, Clone, PartialEq)]
pub struct Purchase {
    pub product_id: String,
    pub quantity: u32,
    pub transaction: Transaction,
    pub original_transaction: Option<Transaction>,
    /// When true, content should be delivered and then the transaction
    /// finished with `PurchaseKit::finish_transaction`.
    pub needs_finish_transaction: bool,
}

impl Purchase {
    pub(crate) fn from_transaction(transaction: &Transaction, atomically: bool) -> Self {
        Self {
            product_id: transaction.product_id.clone(),
            quantity: transaction.quantity,
            transaction: transaction.clone(),
            original_transaction: transaction.original.as_deref().cloned(),
            needs_finish_transaction: !atomically,
        }
    }
}

/// Outcome of a successful payment started by the application.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseDetails {
    pub product_id: String,
    pub quantity: u32,
    pub product: Product,
    pub transaction: Transaction,
    pub needs_finish_transaction: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransactionResult {
    Purchased(PurchaseDetails),
    Restored(Purchase),
    Failed(PaymentError),
}

/// A payment intent awaiting its transaction on the queue.
pub struct Payment {
    pub product: Product,
    pub quantity: u32,
    /// Finish the transaction as soon as it is purchased.
    pub atomically: bool,
    pub application_username: String,
    pub callback: TransactionCallback,
}

impl Payment {
    pub fn product_id(&self) -> &str {
        &self.product.product_id
    }
}

impl fmt::Debug for Payment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payment")
            .field("product_id", &self.product.product_id)
            .field("quantity", &self.quantity)
            .field("atomically", &self.atomically)
            .finish_non_exhaustive()
    }
}

/// A request to restore all previously completed purchases.
pub struct RestorePurchases {
    pub atomically: bool,
    pub application_username: Option<String>,
    pub callback: RestoreCallback,
}

impl fmt::Debug for RestorePurchases {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestorePurchases")
            .field("atomically", &self.atomically)
            .field("application_username", &self.application_username)
            .finish_non_exhaustive()
    }
}

/// Catch-all handler for transactions nobody else claimed, typically ones
/// left pending while the application was not running.
#[derive(Clone)]
pub struct CompleteTransactions {
    pub atomically: bool,
    pub callback: CompleteTransactionsCallback,
}

impl fmt::Debug for CompleteTransactions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompleteTransactions")
            .field("atomically", &self.atomically)
            .finish_non_exhaustive()
    }
}

/// Restore outcomes split by kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreResults {
    pub restored_purchases: Vec<Purchase>,
    pub restore_failed_purchases: Vec<PaymentError>,
}

impl From<Vec<TransactionResult>> for RestoreResults {
    fn from(results: Vec<TransactionResult>) -> Self {
        let mut restore_results = RestoreResults::default();
        for result in results {
            match result {
                TransactionResult::Restored(purchase) => {
                    restore_results.restored_purchases.push(purchase)
                }
                TransactionResult::Failed(error) => {
                    restore_results.restore_failed_purchases.push(error)
                }
                TransactionResult::Purchased(details) => {
                    tracing::warn!(
                        product_id = %details.product_id,
                        "purchased result delivered to a restore request; ignoring"
                    );
                }
            }
        }
        restore_results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::transaction::TransactionState;

    #[test]
    fn purchase_copies_original_transaction() {
        let original = Transaction::new("p1", TransactionState::Purchased).with_id("1");
        let restored = Transaction::new("p1", TransactionState::Restored)
            .with_id("2")
            .with_quantity(3)
            .with_original(original.clone());

        let purchase = Purchase::from_transaction(&restored, false);

        assert_eq!(purchase.quantity, 3);
        assert_eq!(purchase.original_transaction, Some(original));
        assert!(purchase.needs_finish_transaction);
    }

    #[test]
    fn restore_results_split_outcomes() {
        let purchase = Purchase::from_transaction(
            &Transaction::new("p1", TransactionState::Restored),
            true,
        );
        let results = RestoreResults::from(vec![
            TransactionResult::Restored(purchase.clone()),
            TransactionResult::Failed(PaymentError::PaymentCancelled),
        ]);
        assert_eq!(results.restored_purchases, vec![purchase]);
        assert_eq!(
            results.restore_failed_purchases,
            vec![PaymentError::PaymentCancelled]
        );
    }
}
