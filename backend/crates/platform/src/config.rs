//! Environment configuration helpers
//!
//! Startup reads every setting through [`Env`], which is either the real
//! process environment or a fixed map (tests).

use std::collections::HashMap;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

/// Source of configuration variables
#[derive(Debug, Clone, Default)]
pub enum Env {
    #[default]
    Process,
    Fixed(HashMap<String, String>),
}

impl Env {
    pub fn process() -> Self {
        Env::Process
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Env::Fixed(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match self {
            Env::Process => std::env::var(name).ok(),
            Env::Fixed(map) => map.get(name).cloned(),
        }
    }

    /// Trimmed value, `None` when unset or blank
    pub fn optional(&self, name: &str) -> Option<String> {
        self.lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn required(&self, name: &str) -> Result<String, ConfigError> {
        self.optional(name)
            .ok_or_else(|| ConfigError::Missing(name.to_string()))
    }

    pub fn or_default(&self, name: &str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    /// Parse the variable, falling back to `default` when unset
    pub fn parse_or<T>(&self, name: &str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.optional(name) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Comma-separated list, empty entries dropped
    pub fn list(&self, name: &str) -> Vec<String> {
        self.optional(name)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env() -> Env {
        Env::from_pairs([
            ("PRESENT", " value "),
            ("BLANK", "   "),
            ("PORT", "9090"),
            ("BAD_PORT", "ninety"),
            ("ORIGINS", "http://a.test, ,http://b.test"),
        ])
    }

    #[test]
    fn test_required() {
        assert_eq!(env().required("PRESENT"), Ok("value".to_string()));
        assert_eq!(
            env().required("BLANK"),
            Err(ConfigError::Missing("BLANK".to_string()))
        );
        assert!(env().required("ABSENT").is_err());
    }

    #[test]
    fn test_or_default() {
        assert_eq!(env().or_default("ABSENT", "fallback"), "fallback");
        assert_eq!(env().or_default("PRESENT", "fallback"), "value");
    }

    #[test]
    fn test_parse_or() {
        assert_eq!(env().parse_or::<u16>("PORT", 8080), Ok(9090));
        assert_eq!(env().parse_or::<u16>("ABSENT", 8080), Ok(8080));

        let err = env().parse_or::<u16>("BAD_PORT", 8080).unwrap_err();
        assert!(err.to_string().starts_with("BAD_PORT is invalid"));
    }

    #[test]
    fn test_list() {
        assert_eq!(
            env().list("ORIGINS"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert!(env().list("ABSENT").is_empty());
    }
}
