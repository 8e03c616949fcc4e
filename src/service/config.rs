use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};

use crate::audit::{AuditBackend, MemoryLog, RestSink};
use crate::telemetry::recorder::DEFAULT_CAPACITY as DEFAULT_TELEMETRY_CAPACITY;

pub const DEFAULT_BIND: &str = "127.0.0.1:8787";
pub const DEFAULT_AUDIT_CAPACITY: usize = 10_000;
pub const DEFAULT_AUDIT_TIMEOUT_MS: u64 = 2_000;
const AUDIT_TIMEOUT_RANGE_MS: std::ops::RangeInclusive<u64> = 100..=30_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditConfig {
    Memory {
        capacity: usize,
    },
    Rest {
        url: String,
        api_key: Option<String>,
        timeout: Duration,
    },
}

impl AuditConfig {
    pub fn build(&self) -> Result<AuditBackend> {
        Ok(match self {
            AuditConfig::Memory { capacity } => AuditBackend::Memory(MemoryLog::new(*capacity)),
            AuditConfig::Rest {
                url,
                api_key,
                timeout,
            } => AuditBackend::Rest(
                RestSink::new(url.clone(), api_key.clone(), *timeout)
                    .context("building audit REST client")?,
            ),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub audit: AuditConfig,
    pub telemetry_capacity: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8787)),
            audit: AuditConfig::Memory {
                capacity: DEFAULT_AUDIT_CAPACITY,
            },
            telemetry_capacity: DEFAULT_TELEMETRY_CAPACITY,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_raw = var("COCKPIT_HTTP_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind: SocketAddr = bind_raw
            .parse()
            .with_context(|| format!("COCKPIT_HTTP_BIND={bind_raw:?} is not a socket address"))?;

        let backend = var("COCKPIT_AUDIT_BACKEND")
            .unwrap_or_else(|| "memory".to_string())
            .to_ascii_lowercase();
        let audit = match backend.as_str() {
            "memory" => AuditConfig::Memory {
                capacity: parse_or(&var, "COCKPIT_AUDIT_CAPACITY", DEFAULT_AUDIT_CAPACITY)?,
            },
            "rest" => {
                let url = var("COCKPIT_AUDIT_URL").ok_or_else(|| {
                    anyhow!("COCKPIT_AUDIT_URL is required when COCKPIT_AUDIT_BACKEND=rest")
                })?;
                let timeout_ms: u64 =
                    parse_or(&var, "COCKPIT_AUDIT_TIMEOUT_MS", DEFAULT_AUDIT_TIMEOUT_MS)?;
                AuditConfig::Rest {
                    url,
                    api_key: var("COCKPIT_AUDIT_API_KEY"),
                    timeout: Duration::from_millis(timeout_ms.clamp(
                        *AUDIT_TIMEOUT_RANGE_MS.start(),
                        *AUDIT_TIMEOUT_RANGE_MS.end(),
                    )),
                }
            }
            other => bail!("COCKPIT_AUDIT_BACKEND={other:?}: expected `memory` or `rest`"),
        };

        let telemetry_capacity: usize =
            parse_or(&var, "COCKPIT_TELEMETRY_CAPACITY", DEFAULT_TELEMETRY_CAPACITY)?;
        if telemetry_capacity == 0 {
            bail!("COCKPIT_TELEMETRY_CAPACITY must be at least 1");
        }

        Ok(Self {
            bind,
            audit,
            telemetry_capacity,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{key}={raw:?} is not a valid value")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ServiceConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServiceConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]).unwrap(), ServiceConfig::default());
    }

    #[test]
    fn rest_timeout_is_clamped() {
        let cfg = config(&[
            ("COCKPIT_AUDIT_BACKEND", "rest"),
            ("COCKPIT_AUDIT_URL", "http://db.local/rest/v1"),
            ("COCKPIT_AUDIT_TIMEOUT_MS", "5"),
        ])
        .unwrap();
        match cfg.audit {
            AuditConfig::Rest { timeout, api_key, .. } => {
                assert_eq!(timeout, Duration::from_millis(100));
                assert_eq!(api_key, None);
            }
            other => panic!("unexpected audit config {other:?}"),
        }
    }

    #[test]
    fn rest_without_url_is_an_error() {
        let err = config(&[("COCKPIT_AUDIT_BACKEND", "rest")]).unwrap_err();
        assert!(err.to_string().contains("COCKPIT_AUDIT_URL"));
    }

    #[test]
    fn bad_values_name_the_variable() {
        let err = config(&[("COCKPIT_AUDIT_CAPACITY", "lots")]).unwrap_err();
        assert!(err.to_string().contains("COCKPIT_AUDIT_CAPACITY"));
        assert!(config(&[("COCKPIT_AUDIT_BACKEND", "sqlite")]).is_err());
        assert!(config(&[("COCKPIT_HTTP_BIND", "nowhere")]).is_err());
    }
}
