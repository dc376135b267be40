use std::path::PathBuf;

use shared::domain::ProductId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog file '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog contains no products")]
    Empty,
    #[error("product at position {position} has a blank id")]
    BlankId { position: usize },
    #[error("duplicate product id '{0}'")]
    DuplicateId(ProductId),
}

#[derive(Debug, Error)]
pub enum InquiryError {
    #[error("inquiry backend unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum JustificationError {
    #[error("cart is empty")]
    EmptyCart,
    #[error("justification backend failed: {0}")]
    Backend(String),
}

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("contact sink failed: {0}")]
    Sink(String),
}
