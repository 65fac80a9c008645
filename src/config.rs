//! Process configuration, read from `BOOKSHELF_*` environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `BOOKSHELF_ADDR` | `127.0.0.1:3000` | listen address |
//! | `BOOKSHELF_DB` | `db.json` | database file |
//! | `BOOKSHELF_COLLECTION` | `books` | collection key inside the file |
//! | `BOOKSHELF_FLUSH` | `immediate` | `immediate`, `manual` or `async:<millis>` |
//! | `BOOKSHELF_PRETTY` | `false` | indent the file |
//! | `BOOKSHELF_MISSING_IDS` | `strict` | `strict` or `lenient` |

use crate::error::{Error, Result};
use crate::flush::FlushPolicy;
use crate::http::MissingIdPolicy;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Everything `main` needs to wire the server together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the HTTP server binds to.
    pub addr: SocketAddr,
    /// Database file.
    pub db_path: PathBuf,
    /// Collection served under `/books`.
    pub collection: String,
    /// When writes hit the disk.
    pub policy: FlushPolicy,
    /// Indent the database file.
    pub pretty: bool,
    /// How update/delete treat unknown ids.
    pub missing_ids: MissingIdPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            db_path: PathBuf::from("db.json"),
            collection: "books".into(),
            policy: FlushPolicy::Immediate,
            pretty: false,
            missing_ids: MissingIdPolicy::Strict,
        }
    }
}

impl Config {
    /// Read the process environment. Unset variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(addr) = lookup("BOOKSHELF_ADDR") {
            config.addr = addr
                .parse()
                .map_err(|_| Error::Config(format!("BOOKSHELF_ADDR: `{addr}` is not a socket address")))?;
        }
        if let Some(path) = lookup("BOOKSHELF_DB") {
            config.db_path = PathBuf::from(path);
        }
        if let Some(name) = lookup("BOOKSHELF_COLLECTION") {
            config.collection = name;
        }
        if let Some(policy) = lookup("BOOKSHELF_FLUSH") {
            config.policy = parse_policy(&policy)?;
        }
        if let Some(pretty) = lookup("BOOKSHELF_PRETTY") {
            config.pretty = parse_bool("BOOKSHELF_PRETTY", &pretty)?;
        }
        if let Some(mode) = lookup("BOOKSHELF_MISSING_IDS") {
            config.missing_ids = match mode.trim().to_ascii_lowercase().as_str() {
                "strict" => MissingIdPolicy::Strict,
                "lenient" => MissingIdPolicy::Lenient,
                _ => {
                    return Err(Error::Config(format!(
                        "BOOKSHELF_MISSING_IDS: expected `strict` or `lenient`, got `{mode}`"
                    )))
                }
            };
        }

        Ok(config)
    }
}

fn parse_policy(raw: &str) -> Result<FlushPolicy> {
    let value = raw.trim().to_ascii_lowercase();
    match value.as_str() {
        "immediate" => return Ok(FlushPolicy::Immediate),
        "manual" => return Ok(FlushPolicy::Manual),
        _ => {}
    }
    let millis = value
        .strip_prefix("async:")
        .and_then(|ms| ms.parse::<u64>().ok())
        .filter(|ms| *ms > 0)
        .ok_or_else(|| {
            Error::Config(format!(
                "BOOKSHELF_FLUSH: expected `immediate`, `manual` or `async:<millis>`, got `{raw}`"
            ))
        })?;
    Ok(FlushPolicy::Async(Duration::from_millis(millis)))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(Error::Config(format!("{key}: `{raw}` is not a boolean"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(config_from(&[]).unwrap(), Config::default());
    }

    #[test]
    fn every_variable_is_read() {
        let config = config_from(&[
            ("BOOKSHELF_ADDR", "0.0.0.0:8080"),
            ("BOOKSHELF_DB", "/tmp/shelf.json"),
            ("BOOKSHELF_COLLECTION", "novels"),
            ("BOOKSHELF_FLUSH", "async:250"),
            ("BOOKSHELF_PRETTY", "yes"),
            ("BOOKSHELF_MISSING_IDS", "Lenient"),
        ])
        .unwrap();
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.db_path, PathBuf::from("/tmp/shelf.json"));
        assert_eq!(config.collection, "novels");
        assert_eq!(config.policy, FlushPolicy::Async(Duration::from_millis(250)));
        assert!(config.pretty);
        assert_eq!(config.missing_ids, MissingIdPolicy::Lenient);
    }

    #[test]
    fn manual_policy() {
        let config = config_from(&[("BOOKSHELF_FLUSH", "manual")]).unwrap();
        assert_eq!(config.policy, FlushPolicy::Manual);
    }

    #[test]
    fn bad_values_are_config_errors() {
        for (key, value) in [
            ("BOOKSHELF_ADDR", "localhost"),
            ("BOOKSHELF_FLUSH", "sometimes"),
            ("BOOKSHELF_FLUSH", "async:0"),
            ("BOOKSHELF_FLUSH", "async:soon"),
            ("BOOKSHELF_PRETTY", "maybe"),
            ("BOOKSHELF_MISSING_IDS", "loose"),
        ] {
            let err = config_from(&[(key, value)]).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{key}={value} gave {err:?}");
        }
    }
}
