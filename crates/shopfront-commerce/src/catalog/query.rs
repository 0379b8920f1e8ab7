//! Product listing contract and an in-memory implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{ProductRecord, StockStatus};
use crate::error::CommerceError;
use crate::ids::{CategoryId, ProductId};

/// Page size used when a query does not set one.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Filters for a product listing request.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProductQuery {
    pub category: Option<CategoryId>,
    pub stock_status: Option<StockStatus>,
    /// Free text matched against product names.
    pub search: Option<String>,
    /// Opaque cursor returned by the previous page.
    pub cursor: Option<String>,
    /// Page size; `0` means [`DEFAULT_PAGE_SIZE`].
    pub limit: usize,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_stock_status(mut self, status: StockStatus) -> Self {
        self.stock_status = Some(status);
        self
    }

    /// Set the search text. Blank text clears the filter.
    pub fn with_search(mut self, q: impl Into<String>) -> Self {
        let q = q.into();
        self.search = if q.trim().is_empty() { None } else { Some(q) };
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn page_size(&self) -> usize {
        if self.limit == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            self.limit.min(100)
        }
    }

    fn matches(&self, record: &ProductRecord) -> bool {
        if let Some(ref category) = self.category {
            if record.category.as_ref() != Some(category) {
                return false;
            }
        }
        if let Some(status) = self.stock_status {
            if record.stock_status.unwrap_or_default() != status {
                return false;
            }
        }
        if let Some(ref q) = self.search {
            if !record.name.to_lowercase().contains(&q.trim().to_lowercase()) {
                return false;
            }
        }
        true
    }
}

/// One page of a product listing.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProductPage {
    pub products: Vec<ProductRecord>,
    /// Cursor for the next page, `None` on the last page.
    pub next_cursor: Option<String>,
}

/// The product lookup/listing API.
#[async_trait]
pub trait ProductCatalog: Send + Sync {
    /// List products matching `query`.
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, CommerceError>;

    /// Fetch one product.
    async fn get_product(&self, id: &ProductId) -> Result<ProductRecord, CommerceError>;
}

/// A fixed, in-memory catalog.
///
/// Cursors are stringified offsets into the filtered listing.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    products: Vec<ProductRecord>,
}

impl StaticCatalog {
    pub fn new(products: Vec<ProductRecord>) -> Self {
        Self { products }
    }

    /// Load a catalog from a JSON array of product records.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, CommerceError> {
        Ok(Self::new(serde_json::from_slice(bytes)?))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

#[async_trait]
impl ProductCatalog for StaticCatalog {
    async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage, CommerceError> {
        let offset = match query.cursor.as_deref() {
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| CommerceError::InvalidProduct(format!("bad cursor: {}", c)))?,
            None => 0,
        };
        let size = query.page_size();

        let matching: Vec<&ProductRecord> =
            self.products.iter().filter(|p| query.matches(p)).collect();
        let products: Vec<ProductRecord> = matching
            .iter()
            .skip(offset)
            .take(size)
            .map(|p| (*p).clone())
            .collect();
        let next = offset + products.len();
        let next_cursor = (next < matching.len()).then(|| next.to_string());

        Ok(ProductPage {
            products,
            next_cursor,
        })
    }

    async fn get_product(&self, id: &ProductId) -> Result<ProductRecord, CommerceError> {
        self.products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| CommerceError::ProductNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, name: &str, category: &str, status: StockStatus) -> ProductRecord {
        ProductRecord {
            id: ProductId::new(id),
            name: name.to_string(),
            price: 100_000,
            image: None,
            category: Some(CategoryId::new(category)),
            stock_status: Some(status),
            rating: None,
            inventory: None,
        }
    }

    fn catalog() -> StaticCatalog {
        StaticCatalog::new(vec![
            record("p-1", "Oak Chair", "chairs", StockStatus::InStock),
            record("p-2", "Walnut Chair", "chairs", StockStatus::PreOrder),
            record("p-3", "Oak Table", "tables", StockStatus::InStock),
            record("p-4", "Floor Lamp", "lighting", StockStatus::InStock),
        ])
    }

    #[tokio::test]
    async fn test_filter_by_category_and_stock() {
        let query = ProductQuery::new()
            .with_category("chairs")
            .with_stock_status(StockStatus::PreOrder);
        let page = catalog().list_products(&query).await.unwrap();
        assert_eq!(page.products.len(), 1);
        assert_eq!(page.products[0].id.as_str(), "p-2");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let query = ProductQuery::new().with_search("OAK");
        let page = catalog().list_products(&query).await.unwrap();
        let ids: Vec<&str> = page.products.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["p-1", "p-3"]);
    }

    #[tokio::test]
    async fn test_pagination_cursor() {
        let catalog = catalog();
        let first = catalog
            .list_products(&ProductQuery::new().with_limit(3))
            .await
            .unwrap();
        assert_eq!(first.products.len(), 3);
        assert_eq!(first.next_cursor.as_deref(), Some("3"));

        let second = catalog
            .list_products(&ProductQuery::new().with_limit(3).with_cursor("3"))
            .await
            .unwrap();
        assert_eq!(second.products.len(), 1);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let result = catalog().get_product(&ProductId::new("nope")).await;
        assert!(matches!(result, Err(CommerceError::ProductNotFound(_))));
    }
}
