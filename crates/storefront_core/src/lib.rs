//! Catalog, cart and procurement-inquiry interaction model for the storefront.

pub mod cart;
pub mod catalog;
pub mod contact;
pub mod controller;
pub mod error;
pub mod inquiry;
pub mod justification;
pub mod render;
pub mod state;
pub mod transcript;

pub use catalog::Catalog;
pub use controller::{ControllerOptions, InteractionController};
