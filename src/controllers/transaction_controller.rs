use crate::domain::{entities::transaction::Transaction, repositories::payment_queue::PaymentQueue};

/// A callback invocation deferred until the controller state is unlocked.
pub(crate) type Delivery = Box<dyn FnOnce() + Send>;

/// One stage of the transaction pipeline.
pub(crate) trait TransactionController {
    /// Claims the transactions this stage is responsible for and returns the
    /// rest, in their original order.
    ///
    /// Result callbacks are pushed onto `deliveries` instead of being invoked.
    fn process_transactions(
        &mut self,
        transactions: Vec<Transaction>,
        payment_queue: &dyn PaymentQueue,
        deliveries: &mut Vec<Delivery>,
    ) -> Vec<Transaction>;
}
