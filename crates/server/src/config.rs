use std::{collections::HashMap, fs, path::PathBuf, time::Duration};

use anyhow::Context;
use shared::domain::BuyerContext;
use storefront_core::{Catalog, ControllerOptions};

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub catalog_path: Option<PathBuf>,
    pub inquiry_delay_ms: u64,
    pub buyer_user_id: String,
    pub buyer_department: String,
    pub clear_cart_after_justification: bool,
    pub max_body_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let buyer = BuyerContext::default();
        Self {
            server_bind: "127.0.0.1:8080".into(),
            catalog_path: None,
            inquiry_delay_ms: 1500,
            buyer_user_id: buyer.user_id,
            buyer_department: buyer.department,
            clear_cart_after_justification: false,
            max_body_bytes: 64 * 1024,
        }
    }
}

impl Settings {
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            buyer: BuyerContext {
                user_id: self.buyer_user_id.clone(),
                department: self.buyer_department.clone(),
            },
            inquiry_delay: Duration::from_millis(self.inquiry_delay_ms),
            clear_cart_after_justification: self.clear_cart_after_justification,
        }
    }

    pub fn load_catalog(&self) -> anyhow::Result<Catalog> {
        match &self.catalog_path {
            Some(path) => Catalog::load(path)
                .with_context(|| format!("failed to load catalog from '{}'", path.display())),
            None => Ok(Catalog::builtin()),
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("storefront.toml") {
        apply_file_overrides(&mut settings, &raw);
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

/// Applies a flat `key = "value"` TOML document. Malformed files are ignored.
pub fn apply_file_overrides(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!("ignoring storefront.toml: expected flat string keys");
        return;
    };

    if let Some(v) = file_cfg.get("bind_addr") {
        settings.server_bind = v.clone();
    }
    if let Some(v) = file_cfg.get("catalog_path") {
        settings.catalog_path = Some(PathBuf::from(v));
    }
    if let Some(v) = file_cfg.get("inquiry_delay_ms").and_then(|v| v.parse::<u64>().ok()) {
        settings.inquiry_delay_ms = v;
    }
    if let Some(v) = file_cfg.get("buyer_user_id") {
        settings.buyer_user_id = v.clone();
    }
    if let Some(v) = file_cfg.get("buyer_department") {
        settings.buyer_department = v.clone();
    }
    if let Some(v) = file_cfg
        .get("clear_cart_after_justification")
        .and_then(|v| v.parse::<bool>().ok())
    {
        settings.clear_cart_after_justification = v;
    }
    if let Some(v) = file_cfg.get("max_body_bytes").and_then(|v| v.parse::<usize>().ok()) {
        settings.max_body_bytes = v;
    }
}

pub fn apply_env_overrides(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("STOREFRONT_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = env("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = env("APP__CATALOG_PATH") {
        settings.catalog_path = Some(PathBuf::from(v));
    }

    if let Some(v) = env("APP__INQUIRY_DELAY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.inquiry_delay_ms = parsed;
        }
    }

    if let Some(v) = env("APP__BUYER_USER_ID") {
        settings.buyer_user_id = v;
    }
    if let Some(v) = env("APP__BUYER_DEPARTMENT") {
        settings.buyer_department = v;
    }

    if let Some(v) = env("APP__CLEAR_CART_AFTER_JUSTIFICATION") {
        if let Ok(parsed) = v.parse::<bool>() {
            settings.clear_cart_after_justification = parsed;
        }
    }

    if let Some(v) = env("APP__MAX_BODY_BYTES") {
        if let Ok(parsed) = v.parse::<usize>() {
            settings.max_body_bytes = parsed;
        }
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
