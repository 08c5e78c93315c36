//! Gateway settings read from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use yotc_store::StoreConfig;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:3456";
const DEFAULT_BLOB_DIR: &str = "./blobs";
const DEFAULT_PUBLIC_BLOB_URL: &str = "http://127.0.0.1:3456/blobs";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A setting that is present but unusable.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid { var: &'static str, value: String, reason: String },
}

/// Runtime configuration for the gateway binary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct GatewayConfig {
    /// `YOTC_LISTEN_ADDR`
    pub listen_addr: SocketAddr,
    /// `YOTC_DATA_FILE`; unset keeps documents in memory only.
    pub data_file: Option<PathBuf>,
    /// `YOTC_BLOB_DIR`
    pub blob_dir: PathBuf,
    /// `YOTC_PUBLIC_BLOB_URL`
    pub public_blob_url: String,
    /// `YOTC_MAX_UPLOAD_BYTES`
    pub max_upload_bytes: usize,
}

impl GatewayConfig {
    /// Reads the `YOTC_*` environment variables, applying defaults for
    /// unset ones.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for values that do not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] for values that do not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let listen_raw = get("YOTC_LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned());
        let listen_addr = listen_raw.parse::<SocketAddr>().map_err(|e| ConfigError::Invalid {
            var: "YOTC_LISTEN_ADDR",
            value: listen_raw.clone(),
            reason: e.to_string(),
        })?;

        let max_upload_bytes = match get("YOTC_MAX_UPLOAD_BYTES") {
            None => DEFAULT_MAX_UPLOAD_BYTES,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        var: "YOTC_MAX_UPLOAD_BYTES",
                        value: raw,
                        reason: "must be greater than zero".to_owned(),
                    })
                }
                Ok(n) => n,
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        var: "YOTC_MAX_UPLOAD_BYTES",
                        value: raw,
                        reason: e.to_string(),
                    })
                }
            },
        };

        let public_blob_url = get("YOTC_PUBLIC_BLOB_URL").unwrap_or_else(|| DEFAULT_PUBLIC_BLOB_URL.to_owned());
        if !(public_blob_url.starts_with("http://") || public_blob_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "YOTC_PUBLIC_BLOB_URL",
                value: public_blob_url,
                reason: "must be an http(s) URL".to_owned(),
            });
        }

        Ok(Self {
            listen_addr,
            data_file: get("YOTC_DATA_FILE").map(PathBuf::from),
            blob_dir: PathBuf::from(get("YOTC_BLOB_DIR").unwrap_or_else(|| DEFAULT_BLOB_DIR.to_owned())),
            public_blob_url,
            max_upload_bytes,
        })
    }

    /// Storage settings for [`yotc_store::Clubhouse::open`].
    #[must_use]
    pub fn store_config(&self) -> StoreConfig {
        let config = StoreConfig::new(self.blob_dir.clone(), self.public_blob_url.clone());
        match &self.data_file {
            Some(path) => config.with_data_file(path.clone()),
            None => config,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3456)),
            data_file: None,
            blob_dir: PathBuf::from(DEFAULT_BLOB_DIR),
            public_blob_url: DEFAULT_PUBLIC_BLOB_URL.to_owned(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}
