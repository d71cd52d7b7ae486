use std::net::SocketAddr;
use std::path::PathBuf;

/// Process settings, read once from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub models_dir: PathBuf,
    pub static_dir: PathBuf,
    pub log_features: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let host = get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = get("PORT").and_then(|s| s.parse().ok()).unwrap_or(8000);
        let models_dir = get("MODELS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(resolve_models_dir);
        let static_dir = get("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static"));
        let log_features = get("LOG_FEATURES").as_deref() == Some("1");

        Self {
            host,
            port,
            models_dir,
            static_dir,
            log_features,
        }
    }

    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.host, self.port);
        addr.parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {addr}: {e}"))
    }
}

/// `models/` under the working directory wins over `models/` beside the binary.
fn resolve_models_dir() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("models")));

    first_existing_dir(std::iter::once(PathBuf::from("models")).chain(beside_exe))
        .unwrap_or_else(|| PathBuf::from("models"))
}

fn first_existing_dir(candidates: impl IntoIterator<Item = PathBuf>) -> Option<PathBuf> {
    candidates.into_iter().find(|dir| dir.is_dir())
}
