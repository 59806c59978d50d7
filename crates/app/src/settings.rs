//! Handles settings for the application.
//!
//! Sources, later ones overriding earlier ones:
//!
//! 1. built-in defaults
//! 2. an optional TOML file, `config/bankbridge.toml` unless `--config` says
//!    otherwise
//! 3. `BANKBRIDGE__<SECTION>__<KEY>` environment variables
//!
//! See `config/bankbridge.example.toml` for the available keys.
use clap::{Parser, Subcommand, ValueEnum};
use config::{Config, ConfigError, Environment, File, Source};
use providers::{DWOLLA_SANDBOX_URL, DwollaConfig, PlaidConfig};
use reqwest::Url;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config/bankbridge.toml";
const ENV_PREFIX: &str = "BANKBRIDGE";

#[derive(Debug, Parser)]
#[command(name = "bankbridge", version)]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long)]
    pub config: Option<String>,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run schema migrations against the configured database and exit.
    Migrate {
        #[arg(value_enum, default_value = "up")]
        action: MigrateAction,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum MigrateAction {
    Up,
    Down,
    Fresh,
    Status,
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Database {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: Option<String>,
}

impl Database {
    /// Connection URL. User and password are percent-encoded.
    pub fn url(&self) -> Result<Url, ConfigError> {
        let invalid = |field: &str| ConfigError::Message(format!("invalid database {field}"));

        let mut url = Url::parse(&format!("postgres://{}", self.host)).map_err(|err| {
            ConfigError::Message(format!("invalid database host {}: {err}", self.host))
        })?;
        url.set_port(Some(self.port)).map_err(|()| invalid("port"))?;
        url.set_username(&self.user).map_err(|()| invalid("user"))?;
        url.set_password(Some(&self.password)).map_err(|()| invalid("password"))?;
        url.set_path(&self.name);
        if let Some(ssl_mode) = self.ssl_mode.as_deref().filter(|mode| !mode.is_empty()) {
            url.query_pairs_mut().append_pair("sslmode", ssl_mode);
        }
        Ok(url)
    }
}

#[derive(Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub database: Database,
    pub plaid: PlaidConfig,
    pub dwolla: DwollaConfig,
}

impl Settings {
    pub fn new(args: &Args) -> Result<Self, ConfigError> {
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);

        Self::build(
            File::with_name(path).required(args.config.is_some()),
            Environment::with_prefix(ENV_PREFIX).separator("__"),
        )
    }

    fn build(
        file: impl Source + Send + Sync + 'static,
        env: Environment,
    ) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.bind", "127.0.0.1")?
            .set_default("server.port", 8090)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.name", "bankbridge")?
            .set_default("database.user", "postgres")?
            .set_default("plaid.environment", "sandbox")?
            .set_default("dwolla.base_url", DWOLLA_SANDBOX_URL)?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()
    }
}
