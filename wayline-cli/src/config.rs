//! Environment-provided runtime configuration.

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use wayline::{Interval, parse_local_timestamp};

use crate::transport::address::{Recipient, parse_recipient_list};

/// Session storage handed to the bridge when `SESSION_PATH` is unset.
pub const DEFAULT_SESSION_PATH: &str = "./session";
/// Bridge executable looked up on `PATH` when `BRIDGE_CMD` is unset.
pub const DEFAULT_BRIDGE_CMD: &str = "wayline-bridge";

/// Runtime configuration resolved once at startup.
///
/// Every field is immutable afterwards; invalid or missing values are fatal
/// before any scheduling begins.
#[derive(Clone, Debug)]
pub struct Config {
    pub interval: Interval,
    pub recipients: Vec<Recipient>,
    pub session_path: PathBuf,
    pub font_path: Option<PathBuf>,
    pub bridge_cmd: String,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Resolve configuration through a variable lookup.
    pub fn from_vars(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let start = get("START_TIME").context("START_TIME is not set")?;
        let end = get("END_TIME").context("END_TIME is not set")?;
        let interval = Interval::new(parse_local_timestamp(&start)?, parse_local_timestamp(&end)?)?;

        let numbers = get("PHONE_NUMBERS")
            .or_else(|| get("PHONE_NUMBER"))
            .context("PHONE_NUMBERS or PHONE_NUMBER is not set")?;
        let recipients = parse_recipient_list(&numbers)?;
        if recipients.is_empty() {
            bail!("recipient list is empty; set PHONE_NUMBERS=+905551234567,+905559876543");
        }

        Ok(Self {
            interval,
            recipients,
            session_path: get("SESSION_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH)),
            font_path: get("FONT_PATH").map(PathBuf::from),
            bridge_cmd: get("BRIDGE_CMD").unwrap_or_else(|| DEFAULT_BRIDGE_CMD.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let map = vars(pairs);
        Config::from_vars(|k| map.get(k).cloned())
    }

    const BASE: &[(&str, &str)] = &[
        ("START_TIME", "2024-01-01T10:00"),
        ("END_TIME", "2024-01-01T12:00"),
        ("PHONE_NUMBERS", "+90 555 111 22 33"),
    ];

    #[test]
    fn resolves_with_defaults() {
        let config = from(BASE).unwrap();
        assert_eq!(config.session_path, PathBuf::from("./session"));
        assert_eq!(config.bridge_cmd, "wayline-bridge");
        assert_eq!(config.font_path, None);
        assert_eq!(config.recipients.len(), 1);
    }

    #[test]
    fn missing_interval_bounds_are_fatal() {
        assert!(from(&[("END_TIME", "2024-01-01T12:00")]).is_err());
        assert!(
            from(&[
                ("START_TIME", "2024-01-01T12:00"),
                ("END_TIME", "2024-01-01T10:00"),
                ("PHONE_NUMBERS", "+905551112233"),
            ])
            .is_err()
        );
    }

    #[test]
    fn recipient_list_must_be_non_empty() {
        assert!(
            from(&[
                ("START_TIME", "2024-01-01T10:00"),
                ("END_TIME", "2024-01-01T12:00"),
                ("PHONE_NUMBERS", " , ,"),
            ])
            .is_err()
        );
        assert!(
            from(&[
                ("START_TIME", "2024-01-01T10:00"),
                ("END_TIME", "2024-01-01T12:00"),
            ])
            .is_err()
        );
    }

    #[test]
    fn single_number_fallback_applies() {
        let mut pairs = BASE.to_vec();
        pairs.retain(|(k, _)| *k != "PHONE_NUMBERS");
        pairs.push(("PHONE_NUMBER", "+90 555 444 55 66"));
        let config = from(&pairs).unwrap();
        assert_eq!(config.recipients[0].address(), "905554445566@c.us");
    }

    #[test]
    fn overrides_take_effect() {
        let mut pairs = BASE.to_vec();
        pairs.push(("SESSION_PATH", "/var/lib/wayline/session"));
        pairs.push(("BRIDGE_CMD", "node bridge/index.js"));
        pairs.push(("FONT_PATH", "/usr/share/fonts/TTF/DejaVuSans.ttf"));
        let config = from(&pairs).unwrap();
        assert_eq!(config.session_path, PathBuf::from("/var/lib/wayline/session"));
        assert_eq!(config.bridge_cmd, "node bridge/index.js");
        assert!(config.font_path.is_some());
    }
}
