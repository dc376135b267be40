use std::{collections::HashSet, fs, path::Path};

use serde::Deserialize;
use shared::domain::{Product, ProductId};

use crate::error::CatalogError;

/// Read-only product list, fixed after construction.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Product>,
}

impl Catalog {
    pub fn new(products: Vec<Product>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::with_capacity(products.len());
        for (position, product) in products.iter().enumerate() {
            if product.id.as_str().trim().is_empty() {
                return Err(CatalogError::BlankId { position });
            }
            if !seen.insert(product.id.clone()) {
                return Err(CatalogError::DuplicateId(product.id.clone()));
            }
        }

        Ok(Self { products })
    }

    /// The four demo products the storefront ships with.
    pub fn builtin() -> Self {
        Self {
            products: vec![
                demo_product(
                    "G001",
                    "AAMI Level 2 Isolation Gown",
                    "$12.50",
                    "Fluid-resistant, non-sterile gown for low-risk situations. Made in USA.",
                    "gown",
                ),
                demo_product(
                    "M002",
                    "NIOSH N95 Respirator Mask",
                    "$2.80",
                    "Filters at least 95% of airborne particles. Comfortable and secure fit.",
                    "mask",
                ),
                demo_product(
                    "L003",
                    "Nitrile Examination Gloves",
                    "$0.45 / pair",
                    "Latex-free, powder-free gloves with excellent tactile sensitivity.",
                    "gloves",
                ),
                demo_product(
                    "S004",
                    "Disposable Face Shield",
                    "$5.00",
                    "Full-face protection against splashes and sprays. Anti-fog and optically clear.",
                    "shield",
                ),
            ],
        }
    }

    /// Parses a product feed made of `[[products]]` tables.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::new(file.products)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|product| &product.id == id)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn demo_product(id: &str, name: &str, price: &str, description: &str, seed: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        price: price.to_string(),
        description: description.to_string(),
        image: format!("https://picsum.photos/seed/{seed}/400/400"),
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
