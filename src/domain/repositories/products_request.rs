use std::collections::BTreeSet;

use async_trait::async_trait;

use crate::{domain::entities::product::Product, errors::BoxError};

#[derive(Debug, Clone, Default)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
    pub invalid_product_identifiers: Vec<String>,
}

/// Looks up product metadata in the store.
#[async_trait]
pub trait ProductsRequest: Send + Sync {
    async fn request_products(
        &self,
        product_ids: &BTreeSet<String>,
    ) -> Result<ProductsResponse, BoxError>;
}
