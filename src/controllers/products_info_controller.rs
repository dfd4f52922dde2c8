use std::{
    collections::{BTreeSet, HashMap},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::oneshot;
use tracing::debug;

use crate::{
    domain::{
        entities::product::RetrieveResults, repositories::products_request::ProductsRequest,
    },
    errors::BoxError,
};

/// Product ids normalized into an ordered set, so that requests for the same
/// ids in any order share one key.
type ProductIdsKey = BTreeSet<String>;

type InflightQueries = HashMap<ProductIdsKey, Vec<oneshot::Sender<RetrieveResults>>>;

/// Looks up product metadata, sharing one store request between concurrent
/// lookups of the same product ids.
pub(crate) struct ProductsInfoController<R: ProductsRequest> {
    products_request: R,
    inflight_queries: Arc<Mutex<InflightQueries>>,
}

impl<R: ProductsRequest> ProductsInfoController<R> {
    pub(crate) fn new(products_request: R) -> Self {
        Self {
            products_request,
            inflight_queries: Arc::default(),
        }
    }

    pub(crate) async fn retrieve_products_info(
        &self,
        product_ids: impl IntoIterator<Item = String>,
    ) -> RetrieveResults {
        let key: ProductIdsKey = product_ids.into_iter().collect();

        let waiter = {
            let mut inflight = lock(&self.inflight_queries);
            match inflight.get_mut(&key) {
                Some(waiters) => {
                    let (sender, receiver) = oneshot::channel();
                    waiters.push(sender);
                    Some(receiver)
                }
                None => {
                    inflight.insert(key.clone(), Vec::new());
                    None
                }
            }
        };
        if let Some(receiver) = waiter {
            debug!(product_ids = ?key, "joining in-flight products request");
            return receiver.await.unwrap_or_else(|_| RetrieveResults {
                error: Some(Arc::new(BoxError::from("products request was abandoned"))),
                ..RetrieveResults::default()
            });
        }

        let query = InflightQuery {
            inflight_queries: &self.inflight_queries,
            key: &key,
        };
        let results = match self.products_request.request_products(&key).await {
            Ok(response) => {
                debug!(
                    requested = key.len(),
                    retrieved = response.products.len(),
                    invalid = response.invalid_product_identifiers.len(),
                    "products request finished"
                );
                RetrieveResults {
                    invalid_product_ids: response.invalid_product_identifiers.into_iter().collect(),
                    retrieved_products: response.products,
                    error: None,
                }
            }
            Err(e) => {
                debug!(error = %e, "products request failed");
                RetrieveResults {
                    error: Some(Arc::new(e)),
                    ..RetrieveResults::default()
                }
            }
        };

        for waiter in query.complete() {
            let _ = waiter.send(results.clone());
        }
        results
    }
}

/// Removes the in-flight entry when the leading request completes or is
/// dropped. Waiters of a dropped request see their channel close.
struct InflightQuery<'a> {
    inflight_queries: &'a Mutex<InflightQueries>,
    key: &'a ProductIdsKey,
}

impl InflightQuery<'_> {
    fn complete(self) -> Vec<oneshot::Sender<RetrieveResults>> {
        // Bound first: the guard must be released before `self` drops.
        let waiters = lock(self.inflight_queries)
            .remove(self.key)
            .unwrap_or_default();
        waiters
    }
}

impl Drop for InflightQuery<'_> {
    fn drop(&mut self) {
        lock(self.inflight_queries).remove(self.key);
    }
}

fn lock(inflight_queries: &Mutex<InflightQueries>) -> MutexGuard<'_, InflightQueries> {
    inflight_queries
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}
