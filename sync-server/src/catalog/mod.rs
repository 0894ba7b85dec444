//! Product catalog collaborator
//!
//! Resolves a CRM product reference (storefront product id or SKU) to a
//! purchasable product. Price resolution beyond "the catalog price unless
//! the invoice line overrides it" is out of scope for the sync engine.

use dashmap::DashMap;
use rust_decimal::Decimal;

/// A resolvable catalog product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub sku: Option<String>,
    pub name: String,
    /// Unit price in currency units
    pub price: Decimal,
    /// Fulfillment-side product reference, copied onto order lines
    pub fulfillment_product_id: Option<String>,
}

/// Narrow lookup interface onto the catalog
pub trait ProductCatalog: Send + Sync {
    /// Resolve by product id first, then by SKU
    fn find(&self, reference: &str) -> Option<Product>;
}

/// In-memory catalog with a SKU secondary index
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    by_id: DashMap<String, Product>,
    /// sku -> product id
    sku_index: DashMap<String, String>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, product: Product) {
        if let Some(sku) = &product.sku {
            self.sku_index.insert(sku.clone(), product.id.clone());
        }
        self.by_id.insert(product.id.clone(), product);
    }
}

impl ProductCatalog for MemoryCatalog {
    fn find(&self, reference: &str) -> Option<Product> {
        if reference.is_empty() {
            return None;
        }
        if let Some(product) = self.by_id.get(reference) {
            return Some(product.clone());
        }
        let id = self.sku_index.get(reference)?;
        self.by_id.get(id.value()).map(|p| p.clone())
    }
}
