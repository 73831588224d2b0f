use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            worker_threads: None,
            max_body_bytes: default_max_body_bytes(),
            log_format: default_log_format(),
        }
    }
}

/// Where and how the resource collection is persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_path")]
    pub path: String,
    /// Reject unparseable ids and report updates of missing ids.
    /// `false` keeps the lenient "succeed without effect" behaviour.
    #[serde(default = "default_true")]
    pub strict: bool,
    /// Seed an empty collection when the file is absent at startup.
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
    /// Upper bound per store operation in milliseconds; 0 disables it.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            strict: true,
            create_if_missing: true,
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 3000 }
fn default_max_body_bytes() -> usize { 1024 * 1024 }
fn default_log_format() -> String { "compact".into() }
fn default_path() -> String { "data.json".into() }
fn default_true() -> bool { true }
fn default_op_timeout_ms() -> u64 { 5000 }

/// Load from `$CONFIG_PATH` (or `config.toml`). A missing file yields defaults.
pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    if !std::path::Path::new(&path).exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.apply_env(|key| std::env::var(key).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Apply environment overrides. The lookup is injected so tests do not
    /// have to mutate process-wide state.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("SERVER_PORT must be an integer in 1..=65535, got {port:?}"))?;
        }
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS") {
            self.server.worker_threads = threads.trim().parse().ok();
        }
        if let Some(path) = lookup("DATA_FILE") {
            self.storage.path = path;
        }
        if let Some(strict) = lookup("STORE_STRICT") {
            self.storage.strict = parse_bool(&strict)
                .ok_or_else(|| anyhow!("STORE_STRICT must be true/false, got {strict:?}"))?;
        }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.worker_threads == Some(0) {
            self.worker_threads = None;
        }
        if self.max_body_bytes == 0 {
            return Err(anyhow!("server.max_body_bytes must be positive"));
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(anyhow!("storage.path must not be empty"));
        }
        Ok(())
    }

    pub fn op_timeout(&self) -> Option<std::time::Duration> {
        (self.op_timeout_ms > 0).then(|| std::time::Duration::from_millis(self.op_timeout_ms))
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
