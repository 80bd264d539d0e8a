use serde::Deserialize;
use std::collections::HashSet;

use crate::error::AppError;
use storefront_shared::DEFAULT_KEY_PREFIX;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub redis_url: String,
    pub key_prefix: String,
    /// Comma-separated list of privileged user ids.
    pub admin_ids: String,
    pub seed_sample_data: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000)?
            .set_default("redis_url", "redis://127.0.0.1:6379")?
            .set_default("key_prefix", DEFAULT_KEY_PREFIX)?
            .set_default("admin_ids", "")?
            .set_default("seed_sample_data", true)?
            .add_source(config::Environment::default())
            .build()?;

        config.try_deserialize()
    }

    pub fn admin_allowlist(&self) -> Result<AdminAllowlist, AppError> {
        AdminAllowlist::parse(&self.admin_ids)
    }
}

/// Set of user ids allowed into the admin panel.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowlist {
    ids: HashSet<i64>,
}

impl AdminAllowlist {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let mut ids = HashSet::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let id = part.parse::<i64>().map_err(|_| {
                AppError::Config(config::ConfigError::Message(format!(
                    "invalid admin id `{}`",
                    part
                )))
            })?;
            ids.insert(id);
        }
        Ok(Self { ids })
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.ids.contains(&user_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
