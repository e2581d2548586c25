//! Deterministic pseudo-random values for computed attributes.
//!
//! A process-wide generator is used unless the caller passes its own. The
//! shared one is built lazily from [`GeneratorConfig::from_env`] and can be
//! swapped out by test harnesses with [`set_global_generator`].

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::GeneratorConfig;
use crate::value::{Type, Value};

const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

static GLOBAL_GENERATOR: Mutex<Option<ValueGenerator>> = Mutex::new(None);

/// Source of generated leaf values.
#[derive(Debug, Clone)]
pub struct ValueGenerator {
    rng: StdRng,
    string_length: usize,
}

impl ValueGenerator {
    /// Generator producing the same sequence for the same seed.
    pub fn seeded(seed: u64) -> Self {
        Self::from_config(&GeneratorConfig::default().with_seed(seed))
    }

    pub fn from_entropy() -> Self {
        Self::from_config(&GeneratorConfig::default())
    }

    pub fn from_config(config: &GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            string_length: config.string_length.max(1),
        }
    }

    /// Random lowercase alphanumeric string of the configured length.
    pub fn random_string(&mut self) -> String {
        (0..self.string_length)
            .map(|_| CHARSET[self.rng.gen_range(0..CHARSET.len())] as char)
            .collect()
    }

    /// Known value of type `ty`.
    ///
    /// Strings are random; numbers are zero and bools false. Collections are
    /// empty and objects are generated attribute by attribute. `dynamic` has no
    /// generation strategy and yields null.
    pub fn generate(&mut self, ty: &Type) -> Value {
        match ty {
            Type::String => Value::String(self.random_string()),
            Type::Number => Value::Number(0.0),
            Type::Bool => Value::Bool(false),
            Type::List(element_type) => Value::list_empty((**element_type).clone()),
            Type::Set(element_type) => Value::set_empty((**element_type).clone()),
            Type::Map(element_type) => Value::map_of((**element_type).clone(), BTreeMap::new()),
            Type::Object(attribute_types) => {
                let mut attributes = IndexMap::with_capacity(attribute_types.len());
                for (name, attribute_type) in attribute_types {
                    attributes.insert(name.clone(), self.generate(attribute_type));
                }
                Value::Object(attributes)
            }
            Type::Dynamic => Value::Null(Type::Dynamic),
        }
    }
}

/// Replace the shared generator, e.g. with a seeded one for a test run.
pub fn set_global_generator(generator: ValueGenerator) {
    let mut guard = GLOBAL_GENERATOR.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = Some(generator);
}

/// Drop the shared generator; the next use rebuilds it from the environment.
pub fn reset_global_generator() {
    let mut guard = GLOBAL_GENERATOR.lock().unwrap_or_else(PoisonError::into_inner);
    *guard = None;
}

/// Run `f` with exclusive access to the shared generator.
pub fn with_global_generator<R>(f: impl FnOnce(&mut ValueGenerator) -> R) -> R {
    let mut guard = GLOBAL_GENERATOR.lock().unwrap_or_else(PoisonError::into_inner);
    let generator = guard.get_or_insert_with(|| {
        let config = GeneratorConfig::from_env();
        debug!(seeded = config.seed.is_some(), "initializing shared value generator");
        ValueGenerator::from_config(&config)
    });
    f(generator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_is_deterministic() {
        let mut a = ValueGenerator::seeded(0);
        let mut b = ValueGenerator::seeded(0);
        for _ in 0..5 {
            assert_eq!(a.random_string(), b.random_string());
        }
    }

    #[test]
    fn test_string_shape() {
        let mut generator = ValueGenerator::seeded(1);
        let s = generator.random_string();
        assert_eq!(s.len(), 8);
        assert!(s.bytes().all(|b| CHARSET.contains(&b)));
    }

    #[test]
    fn test_configured_string_length() {
        let config = GeneratorConfig::default().with_seed(1).with_string_length(16);
        let mut generator = ValueGenerator::from_config(&config);
        assert_eq!(generator.random_string().len(), 16);
    }

    #[test]
    fn test_successive_strings_differ() {
        let mut generator = ValueGenerator::seeded(0);
        assert_ne!(generator.random_string(), generator.random_string());
    }

    #[test]
    fn test_primitive_strategies() {
        let mut generator = ValueGenerator::seeded(0);
        assert!(matches!(generator.generate(&Type::String), Value::String(_)));
        assert_eq!(generator.generate(&Type::Number), Value::number(0.0));
        assert_eq!(generator.generate(&Type::Bool), Value::bool(false));
    }

    #[test]
    fn test_collections_are_empty() {
        let mut generator = ValueGenerator::seeded(0);
        assert_eq!(generator.generate(&Type::list(Type::String)), Value::list_empty(Type::String));
        assert_eq!(generator.generate(&Type::set(Type::Number)), Value::set_empty(Type::Number));
        assert_eq!(generator.generate(&Type::map(Type::Bool)), Value::map_empty(Type::Bool));
    }

    #[test]
    fn test_object_generated_per_attribute() {
        let mut generator = ValueGenerator::seeded(0);
        let mut expected = ValueGenerator::seeded(0);
        let ty = Type::object([("id", Type::String), ("count", Type::Number)]);
        assert_eq!(
            generator.generate(&ty),
            Value::object([
                ("id", Value::String(expected.random_string())),
                ("count", Value::number(0.0)),
            ])
        );
    }

    #[test]
    fn test_dynamic_has_no_strategy() {
        let mut generator = ValueGenerator::seeded(0);
        assert_eq!(generator.generate(&Type::Dynamic), Value::null(Type::Dynamic));
    }

    #[test]
    fn test_global_generator_is_replaceable() {
        set_global_generator(ValueGenerator::seeded(9));
        let drawn = with_global_generator(|g| g.random_string());
        assert_eq!(drawn, ValueGenerator::seeded(9).random_string());
    }
}
