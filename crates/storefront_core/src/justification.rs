use std::sync::Arc;

use serde::Serialize;
use shared::domain::{BuyerContext, Product};
use tracing::info;
use uuid::Uuid;

use crate::error::JustificationError;

pub const EMPTY_CART_MESSAGE: &str =
    "Your cart is empty. Add items before generating a justification.";

#[derive(Debug, Clone, Serialize)]
pub struct JustificationRequest {
    pub items: Vec<Product>,
    pub buyer: BuyerContext,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JustificationReceipt {
    pub request_id: Uuid,
    pub item_count: usize,
}

impl JustificationReceipt {
    pub fn confirmation(&self) -> String {
        format!(
            "Justification generation initiated for {} item(s).",
            self.item_count
        )
    }
}

/// Produces purchase justification documents for a cart.
pub trait JustificationBackend: Send + Sync {
    fn generate(
        &self,
        request: &JustificationRequest,
    ) -> Result<JustificationReceipt, JustificationError>;
}

/// Records the request in the log and acknowledges it; no document is produced.
#[derive(Debug, Clone, Default)]
pub struct LoggingJustificationBackend;

impl JustificationBackend for LoggingJustificationBackend {
    fn generate(
        &self,
        request: &JustificationRequest,
    ) -> Result<JustificationReceipt, JustificationError> {
        let receipt = JustificationReceipt {
            request_id: Uuid::new_v4(),
            item_count: request.items.len(),
        };
        let item_ids: Vec<&str> = request.items.iter().map(|p| p.id.as_str()).collect();
        info!(
            request_id = %receipt.request_id,
            buyer_user_id = %request.buyer.user_id,
            buyer_department = %request.buyer.department,
            items = ?item_ids,
            "justification requested"
        );
        Ok(receipt)
    }
}

/// Validates the cart before handing it to a backend.
#[derive(Clone)]
pub struct JustificationService {
    backend: Arc<dyn JustificationBackend>,
}

impl JustificationService {
    pub fn new(backend: Arc<dyn JustificationBackend>) -> Self {
        Self { backend }
    }

    pub fn generate(
        &self,
        cart: &[Product],
        buyer: &BuyerContext,
    ) -> Result<JustificationReceipt, JustificationError> {
        if cart.is_empty() {
            return Err(JustificationError::EmptyCart);
        }
        self.backend.generate(&JustificationRequest {
            items: cart.to_vec(),
            buyer: buyer.clone(),
        })
    }
}

impl Default for JustificationService {
    fn default() -> Self {
        Self::new(Arc::new(LoggingJustificationBackend))
    }
}

#[cfg(test)]
#[path = "tests/justification_tests.rs"]
mod tests;
