use crate::ast::Evaluator;
use crate::error::ConfigError;
use log::debug;
use std::str::FromStr;
use std::time::Duration;

pub const PARSE_CACHE_SIZE_VAR: &str = "FORMULIX_PARSE_CACHE_SIZE";
pub const LOCK_DELAY_MS_VAR: &str = "FORMULIX_LOCK_DELAY_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Parsed formulas kept by the evaluator; zero disables the cache.
    pub parse_cache_size: usize,
    /// Simulated round trip of a lock toggle.
    pub lock_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parse_cache_size: 100,
            lock_delay: Duration::from_millis(2000),
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `FORMULIX_PARSE_CACHE_SIZE` and `FORMULIX_LOCK_DELAY_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(size) = parse_var(&lookup, PARSE_CACHE_SIZE_VAR)? {
            config.parse_cache_size = size;
        }
        if let Some(millis) = parse_var(&lookup, LOCK_DELAY_MS_VAR)? {
            config.lock_delay = Duration::from_millis(millis);
        }

        debug!("Engine config: {:?}", config);
        Ok(config)
    }

    pub fn evaluator(&self) -> Evaluator {
        Evaluator::new(self.parse_cache_size)
    }
}

fn parse_var<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&'static str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&'static str, &str)]) -> Result<EngineConfig, ConfigError> {
        let vars: HashMap<&str, String> = vars
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        EngineConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn test_defaults_without_overrides() {
        assert_eq!(config_from(&[]).unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            (PARSE_CACHE_SIZE_VAR, "0"),
            (LOCK_DELAY_MS_VAR, " 250 "),
        ])
        .unwrap();
        assert_eq!(config.parse_cache_size, 0);
        assert_eq!(config.lock_delay, Duration::from_millis(250));
        assert_eq!(config.evaluator().cached_formulas(), 0);
    }

    #[test]
    fn test_invalid_value_is_reported() {
        assert_eq!(
            config_from(&[(LOCK_DELAY_MS_VAR, "soon")]),
            Err(ConfigError::InvalidValue {
                var: LOCK_DELAY_MS_VAR,
                value: "soon".to_string()
            })
        );
    }

    #[test]
    fn test_out_of_range_values_are_reported() {
        let too_big = "99999999999999999999999";
        for var in [PARSE_CACHE_SIZE_VAR, LOCK_DELAY_MS_VAR] {
            assert_eq!(
                config_from(&[(var, too_big)]),
                Err(ConfigError::InvalidValue {
                    var,
                    value: too_big.to_string()
                })
            );
        }
        assert!(config_from(&[(PARSE_CACHE_SIZE_VAR, "-1")]).is_err());
    }
}
