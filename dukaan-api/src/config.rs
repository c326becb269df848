//! dukaan-api specific configuration
//!
//! Settings resolve in priority order: command line, environment, TOML
//! config file, compiled default. Root folder resolution is shared with the
//! rest of the workspace.

use clap::Parser;
use dukaan_common::config::{ensure_root_folder, load_settings_file, resolve_root_folder};
use dukaan_common::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::resolver::ProviderEndpoint;

/// Default HTTP listen port
const DEFAULT_PORT: u16 = 3000;

/// Default identity service verification endpoint
const DEFAULT_IDENTITY_URL: &str = "http://127.0.0.1:9099/verify";

/// Default per-provider request ceiling
const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5000;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "dukaan-api", about = "Dukaan retail management backend")]
pub struct Cli {
    /// Root folder holding dukaan.db
    #[arg(long, env = "DUKAAN_ROOT_FOLDER")]
    pub root_folder: Option<String>,

    /// HTTP listen port
    #[arg(long, env = "DUKAAN_PORT")]
    pub port: Option<u16>,

    /// Identity service verification endpoint
    #[arg(long, env = "DUKAAN_IDENTITY_URL")]
    pub identity_url: Option<String>,
}

/// Optional keys read from the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    port: Option<u16>,
    identity_url: Option<String>,
    provider_timeout_ms: Option<u64>,
    providers: Option<Vec<ProviderEndpoint>>,
}

/// Resolved backend configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub root_folder: PathBuf,
    pub db_path: PathBuf,
    pub port: u16,
    pub identity_url: String,
    /// External product sources in chain priority order
    pub providers: Vec<ProviderEndpoint>,
    pub provider_timeout: Duration,
}

impl Config {
    /// Resolve configuration from CLI arguments, environment, config file
    /// and defaults
    pub fn load(cli: &Cli) -> Result<Config> {
        let file_settings: FileSettings = load_settings_file()
            .ok()
            .and_then(|value| value.try_into().ok())
            .unwrap_or_default();

        let root_folder = resolve_root_folder(cli.root_folder.as_deref(), "DUKAAN_ROOT_FOLDER")?;
        let db_path = ensure_root_folder(&root_folder)?;

        let port = cli.port.or(file_settings.port).unwrap_or(DEFAULT_PORT);

        let identity_url = cli
            .identity_url
            .clone()
            .or(file_settings.identity_url)
            .unwrap_or_else(|| DEFAULT_IDENTITY_URL.to_string());

        let providers = file_settings
            .providers
            .filter(|providers| !providers.is_empty())
            .unwrap_or_else(ProviderEndpoint::open_databases);

        let provider_timeout = Duration::from_millis(
            file_settings
                .provider_timeout_ms
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_MS),
        );

        Ok(Config {
            root_folder,
            db_path,
            port,
            identity_url,
            providers,
            provider_timeout,
        })
    }
}
