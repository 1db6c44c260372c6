use crate::error::{AdapterError, Result};
use std::env::var;
use std::str::FromStr;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

/// Name of the env var holding the name of the registered service to dispatch to.
pub const SERVICE_ENV: &str = "service";

/// Optional env var with the default tracing level, e.g. `debug`. `RUST_LOG` takes precedence.
pub const TRACING_LEVEL_ENV: &str = "ENVELOPE_LAMBDA_TRACING_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// E.g. `hello`. Must match a name in the service registry.
    pub service: String,
    /// Default level for this crate when `RUST_LOG` is not set
    pub tracing_level: tracing::Level,
}

impl Config {
    /// Creates a new Config instance from the process environment.
    /// Fails if `service` is missing or empty.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| var(name).ok())
    }

    /// Same as `from_env`, but reads values through `lookup` so tests don't have to touch the environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service = match lookup(SERVICE_ENV) {
            Some(v) if !v.trim().is_empty() => v.trim().to_owned(),
            _ => {
                return Err(AdapterError::Configuration(format!(
                    "Service not defined in lambda environment. Set `{SERVICE_ENV}` env var."
                )))
            }
        };

        let tracing_level = match lookup(TRACING_LEVEL_ENV) {
            None => tracing::Level::INFO,
            Some(v) => tracing::Level::from_str(&v).map_err(|_| {
                AdapterError::Configuration(format!(
                    "Invalid tracing level in {TRACING_LEVEL_ENV}: {v}. Use trace, debug, info, warn or error"
                ))
            })?,
        };

        Ok(Self { service, tracing_level })
    }
}

/// Initializes the tracing from RUST_LOG env var if present or uses `tracing_level` for this crate.
/// CloudWatch adds its own timestamps and does not render colors.
pub fn init_tracing(tracing_level: tracing::Level) {
    let default_directive = Directive::from_str(&format!("envelope_lambda={tracing_level}"))
        .unwrap_or_else(|_| LevelFilter::INFO.into());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(default_directive)
                .from_env_lossy(),
        )
        .with_ansi(false)
        .without_time()
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn reads_service_and_level() {
        let config = Config::from_lookup(lookup_from(&[("service", "hello"), (TRACING_LEVEL_ENV, "debug")])).unwrap();
        assert_eq!(config.service, "hello");
        assert_eq!(config.tracing_level, tracing::Level::DEBUG);
    }

    #[test]
    fn level_defaults_to_info() {
        let config = Config::from_lookup(lookup_from(&[("service", "hello")])).unwrap();
        assert_eq!(config.tracing_level, tracing::Level::INFO);
    }

    #[test]
    fn missing_or_empty_service_is_fatal() {
        assert!(matches!(
            Config::from_lookup(lookup_from(&[])),
            Err(AdapterError::Configuration(_))
        ));
        assert!(matches!(
            Config::from_lookup(lookup_from(&[("service", "  ")])),
            Err(AdapterError::Configuration(_))
        ));
    }

    #[test]
    fn invalid_level_is_rejected() {
        let res = Config::from_lookup(lookup_from(&[("service", "hello"), (TRACING_LEVEL_ENV, "loud")]));
        assert!(matches!(res, Err(AdapterError::Configuration(_))));
    }
}
