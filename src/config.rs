use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, bail};

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub http_address: String,
    pub max_connections: u32,
    pub default_page_size: i64,
    pub text_search_config: String,
    pub static_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Config> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup, so it can be exercised
    /// without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Config> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = match lookup("DATABASE_URL") {
            Some(url) => url,
            // Credentials and database name may hold URL delimiters.
            None => format!(
                "postgres://{}:{}@{}:{}/{}",
                urlencoding::encode(&var("POSTGRES_USER", "postgres")),
                urlencoding::encode(&var("POSTGRES_PASSWORD", "postgres")),
                var("POSTGRES_HOST", "127.0.0.1"),
                parse::<u16>("POSTGRES_PORT", &var("POSTGRES_PORT", "5432"))?,
                urlencoding::encode(&var("POSTGRES_DB", "comment_tree")),
            ),
        };

        let default_page_size = parse::<i64>("DEFAULT_PAGE_SIZE", &var("DEFAULT_PAGE_SIZE", "10"))?;
        if default_page_size <= 0 {
            bail!("DEFAULT_PAGE_SIZE must be positive, got {default_page_size}");
        }

        let text_search_config = var("TEXT_SEARCH_CONFIG", "russian");
        if text_search_config.is_empty()
            || !text_search_config
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            bail!("TEXT_SEARCH_CONFIG must be a plain identifier, got {text_search_config:?}");
        }

        Ok(Config {
            database_url,
            http_address: var("HTTP_ADDRESS", "0.0.0.0:8080"),
            max_connections: parse("DB_MAX_CONNECTIONS", &var("DB_MAX_CONNECTIONS", "10"))?,
            default_page_size,
            text_search_config,
            static_dir: PathBuf::from(var("STATIC_DIR", "static")),
        })
    }
}

fn parse<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse()
        .with_context(|| format!("{key} has an invalid value {value:?}"))
}
