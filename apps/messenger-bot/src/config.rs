use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use mcb_core::{DEFAULT_GRAPH_BASE, DEFAULT_GRAPH_VERSION};
use mcb_idempotency::IdempotencyConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0:3000";

#[derive(Clone)]
pub struct BotConfig {
    pub addr: SocketAddr,
    pub verify_token: String,
    pub access_token: String,
    pub graph_base: String,
    pub graph_version: String,
    /// Messages sent by this page are never answered.
    pub page_id: Option<String>,
    pub dedup: IdempotencyConfig,
    pub keywords_file: Option<PathBuf>,
    pub cargo_seed_file: Option<PathBuf>,
    pub typing_indicator: bool,
    pub setup_profile: bool,
}

impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("addr", &self.addr)
            .field("verify_token", &"***")
            .field("access_token", &"***")
            .field("graph_base", &self.graph_base)
            .field("graph_version", &self.graph_version)
            .field("page_id", &self.page_id)
            .field("dedup", &self.dedup)
            .field("keywords_file", &self.keywords_file)
            .field("cargo_seed_file", &self.cargo_seed_file)
            .field("typing_indicator", &self.typing_indicator)
            .field("setup_profile", &self.setup_profile)
            .finish()
    }
}

impl BotConfig {
    /// Defaults for everything except the two secrets.
    pub fn new(verify_token: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            verify_token: verify_token.into(),
            access_token: access_token.into(),
            graph_base: DEFAULT_GRAPH_BASE.to_string(),
            graph_version: DEFAULT_GRAPH_VERSION.to_string(),
            page_id: None,
            dedup: IdempotencyConfig::default(),
            keywords_file: None,
            cargo_seed_file: None,
            typing_indicator: false,
            setup_profile: false,
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(verify_token) = get("WEBHOOK_VERIFY_TOKEN") else {
            bail!("WEBHOOK_VERIFY_TOKEN must be set");
        };
        let Some(access_token) = get("FACEBOOK_ACCESS_TOKEN") else {
            bail!("FACEBOOK_ACCESS_TOKEN must be set");
        };

        let mut cfg = Self::new(verify_token, access_token);
        let bind = get("BIND").unwrap_or_else(|| DEFAULT_BIND.into());
        cfg.addr = bind
            .parse()
            .with_context(|| format!("invalid BIND address {bind:?}"))?;
        if let Some(base) = get("GRAPH_API_BASE") {
            cfg.graph_base = base;
        }
        if let Some(version) = get("GRAPH_API_VERSION") {
            cfg.graph_version = version;
        }
        cfg.page_id = get("PAGE_ID");
        cfg.dedup = IdempotencyConfig::from_lookup(&lookup);
        cfg.keywords_file = get("KEYWORDS_FILE").map(PathBuf::from);
        cfg.cargo_seed_file = get("CARGO_SEED_FILE").map(PathBuf::from);
        cfg.typing_indicator = flag(get("MESSENGER_TYPING_INDICATOR"));
        cfg.setup_profile = flag(get("MESSENGER_SETUP_PROFILE"));
        Ok(cfg)
    }
}

fn flag(value: Option<String>) -> bool {
    value.is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
