//! REST runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the
//! application state. Request handlers never read environment variables, which
//! keeps behaviour consistent across multi-threaded runtimes and test
//! harnesses.

use std::path::PathBuf;

/// Configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address the REST server listens on.
    pub listen_addr: String,
    /// Path of the JSON snapshot file.
    pub data_file: PathBuf,
}

impl AppConfig {
    /// Resolves configuration from the environment.
    ///
    /// # Environment Variables
    /// - `PMS_REST_ADDR`: listen address (default: "0.0.0.0:3000")
    /// - `PMS_DATA_FILE`: snapshot file path (default: "patients.json")
    pub fn from_env() -> Self {
        let listen_addr =
            std::env::var("PMS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
        let data_file = std::env::var("PMS_DATA_FILE")
            .unwrap_or_else(|_| "patients.json".into())
            .into();
        Self {
            listen_addr,
            data_file,
        }
    }
}
