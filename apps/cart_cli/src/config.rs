use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context};
use cart_core::catalog::DEFAULT_CATALOG_URL;
use shared::domain::DEFAULT_CURRENCY_SYMBOL;
use storage::DEFAULT_CART_KEY;
use url::Url;

pub const SETTINGS_FILE: &str = "cart.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub catalog_url: String,
    pub database_url: String,
    pub storage_key: String,
    pub currency_symbol: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.into(),
            database_url: "sqlite://./data/cart.db".into(),
            storage_key: DEFAULT_CART_KEY.into(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.into(),
        }
    }
}

/// Defaults, then `cart.toml`, then environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(Path::new(SETTINGS_FILE)) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        return;
    };
    if let Some(v) = file_cfg.get("catalog_url") {
        settings.catalog_url = v.clone();
    }
    if let Some(v) = file_cfg.get("database_url") {
        settings.database_url = v.clone();
    }
    if let Some(v) = file_cfg.get("storage_key") {
        settings.storage_key = v.clone();
    }
    if let Some(v) = file_cfg.get("currency_symbol") {
        settings.currency_symbol = v.clone();
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("CATALOG_URL") {
        settings.catalog_url = v;
    }
    if let Some(v) = lookup("APP__CATALOG_URL") {
        settings.catalog_url = v;
    }

    if let Some(v) = lookup("DATABASE_URL") {
        settings.database_url = v;
    }
    if let Some(v) = lookup("APP__DATABASE_URL") {
        settings.database_url = v;
    }

    if let Some(v) = lookup("APP__STORAGE_KEY") {
        settings.storage_key = v;
    }
    if let Some(v) = lookup("APP__CURRENCY_SYMBOL") {
        settings.currency_symbol = v;
    }
}

pub fn validate_catalog_url(raw: &str) -> anyhow::Result<Url> {
    let url = Url::parse(raw.trim()).with_context(|| format!("invalid catalog url '{raw}'"))?;
    if !matches!(url.scheme(), "http" | "https") {
        bail!("catalog url '{raw}' must use http or https");
    }
    Ok(url)
}

pub fn normalize_database_url(raw_database_url: &str) -> String {
    let raw_database_url = raw_database_url.trim();

    if raw_database_url.is_empty() {
        return Settings::default().database_url;
    }

    if raw_database_url.starts_with("sqlite::memory:")
        || raw_database_url.starts_with("sqlite://")
        || raw_database_url.contains("://")
    {
        return raw_database_url.to_string();
    }

    if let Some(path) = raw_database_url.strip_prefix("sqlite:") {
        let path = path.replace('\\', "/");
        return format!("sqlite:{path}");
    }

    format!("sqlite://{}", raw_database_url.replace('\\', "/"))
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
