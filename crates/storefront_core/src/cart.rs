use shared::domain::{CartSummaryRow, Product, ProductId};

use crate::catalog::Catalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added { entries: usize },
    UnknownProduct,
}

/// Ordered bag of selected products. Duplicates are separate entries.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    entries: Vec<Product>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the catalog product with `id`. Ids missing from the catalog leave the cart untouched.
    pub fn add(&mut self, catalog: &Catalog, id: &ProductId) -> AddOutcome {
        match catalog.get(id) {
            Some(product) => {
                self.entries.push(product.clone());
                AddOutcome::Added {
                    entries: self.entries.len(),
                }
            }
            None => AddOutcome::UnknownProduct,
        }
    }

    pub fn entries(&self) -> &[Product] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rows grouped by product name, in order of first insertion.
    pub fn summary(&self) -> Vec<CartSummaryRow> {
        let mut rows: Vec<CartSummaryRow> = Vec::new();
        for product in &self.entries {
            match rows.iter_mut().find(|row| row.name == product.name) {
                Some(row) => row.count += 1,
                None => rows.push(CartSummaryRow {
                    name: product.name.clone(),
                    count: 1,
                }),
            }
        }
        rows
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
#[path = "tests/cart_tests.rs"]
mod tests;
