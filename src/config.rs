//! Environment-driven configuration for random value generation.

use std::collections::HashMap;

use tracing::warn;

/// Fixed seed for the shared generator, for reproducible runs.
pub const SEED_ENV_VAR: &str = "MOCK_VALUES_SEED";
/// Length of generated strings.
pub const STRING_LENGTH_ENV_VAR: &str = "MOCK_VALUES_STRING_LENGTH";

pub const DEFAULT_STRING_LENGTH: usize = 8;

/// Settings for a [`ValueGenerator`](crate::generator::ValueGenerator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// `None` seeds from system entropy.
    pub seed: Option<u64>,
    pub string_length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            string_length: DEFAULT_STRING_LENGTH,
        }
    }
}

impl GeneratorConfig {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        let env: HashMap<String, String> = std::env::vars().collect();
        Self::from_env_map(&env)
    }

    /// Read settings from a provided env map.
    ///
    /// Values that fail to parse are ignored with a warning and the default applies.
    pub fn from_env_map(env: &HashMap<String, String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = env.get(SEED_ENV_VAR) {
            match raw.trim().parse::<u64>() {
                Ok(seed) => config.seed = Some(seed),
                Err(e) => warn!(var = SEED_ENV_VAR, value = %raw, error = %e, "ignoring invalid generator seed"),
            }
        }

        if let Some(raw) = env.get(STRING_LENGTH_ENV_VAR) {
            match raw.trim().parse::<usize>() {
                Ok(0) => warn!(var = STRING_LENGTH_ENV_VAR, "ignoring zero string length"),
                Ok(length) => config.string_length = length,
                Err(e) => warn!(var = STRING_LENGTH_ENV_VAR, value = %raw, error = %e, "ignoring invalid string length"),
            }
        }

        config
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_string_length(mut self, length: usize) -> Self {
        self.string_length = length;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = GeneratorConfig::from_env_map(&HashMap::new());
        assert_eq!(config, GeneratorConfig::default());
        assert_eq!(config.seed, None);
        assert_eq!(config.string_length, 8);
    }

    #[test]
    fn test_reads_seed() {
        let config = GeneratorConfig::from_env_map(&make_env(&[("MOCK_VALUES_SEED", "42")]));
        assert_eq!(config.seed, Some(42));
    }

    #[test]
    fn test_trims_whitespace() {
        let config = GeneratorConfig::from_env_map(&make_env(&[("MOCK_VALUES_SEED", " 7 ")]));
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_invalid_seed_ignored() {
        let config = GeneratorConfig::from_env_map(&make_env(&[("MOCK_VALUES_SEED", "not-a-number")]));
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_reads_string_length() {
        let config = GeneratorConfig::from_env_map(&make_env(&[("MOCK_VALUES_STRING_LENGTH", "12")]));
        assert_eq!(config.string_length, 12);
    }

    #[test]
    fn test_zero_string_length_ignored() {
        let config = GeneratorConfig::from_env_map(&make_env(&[("MOCK_VALUES_STRING_LENGTH", "0")]));
        assert_eq!(config.string_length, DEFAULT_STRING_LENGTH);
    }

    #[test]
    fn test_unrelated_vars_ignored() {
        let config = GeneratorConfig::from_env_map(&make_env(&[("SEED", "1"), ("PATH", "/usr/bin")]));
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = GeneratorConfig::default().with_seed(3).with_string_length(4);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.string_length, 4);
    }
}
