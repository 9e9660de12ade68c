//! Run-scoped engine configuration.
//!
//! Features are typed keys with a documented default. Reading an unset key
//! yields its default; text values coming from the command line are parsed
//! according to the key's declared type.
//!
//! | Key | Type | Default |
//! |-----|------|---------|
//! | `default-namespace` | string | `anonymous` |
//! | `enum-style` | `native` \| `constants` | `native` |
//! | `ignore-missing-types` | bool | `false` |
//! | `simple-plain-types` | bool | `false` |

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// How string schemas with an `enum` keyword are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumStyle {
    /// A Java `enum` with one constant per value.
    Native,
    /// A class holding one `static final String` constant per value.
    Constants,
}

impl EnumStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            EnumStyle::Native => "native",
            EnumStyle::Constants => "constants",
        }
    }
}

impl FromStr for EnumStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "native" | "enum" => Ok(EnumStyle::Native),
            "constants" | "class" => Ok(EnumStyle::Constants),
            other => Err(format!("unknown enum style '{other}' (expected native or constants)")),
        }
    }
}

impl fmt::Display for EnumStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored feature value.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Bool(bool),
    Text(String),
    EnumStyle(EnumStyle),
}

impl FeatureValue {
    fn type_name(&self) -> &'static str {
        match self {
            FeatureValue::Bool(_) => bool::TYPE_NAME,
            FeatureValue::Text(_) => String::TYPE_NAME,
            FeatureValue::EnumStyle(_) => EnumStyle::TYPE_NAME,
        }
    }
}

/// Types that can be stored as a feature value.
pub trait FeatureType: Sized {
    const TYPE_NAME: &'static str;

    fn into_value(self) -> FeatureValue;
    fn from_value(value: &FeatureValue) -> Option<Self>;
    fn parse(text: &str) -> std::result::Result<Self, String>;
}

impl FeatureType for bool {
    const TYPE_NAME: &'static str = "bool";

    fn into_value(self) -> FeatureValue {
        FeatureValue::Bool(self)
    }

    fn from_value(value: &FeatureValue) -> Option<Self> {
        match value {
            FeatureValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        match text {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            other => Err(format!("'{other}' is not a boolean")),
        }
    }
}

impl FeatureType for String {
    const TYPE_NAME: &'static str = "string";

    fn into_value(self) -> FeatureValue {
        FeatureValue::Text(self)
    }

    fn from_value(value: &FeatureValue) -> Option<Self> {
        match value {
            FeatureValue::Text(s) => Some(s.clone()),
            _ => None,
        }
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        Ok(text.to_string())
    }
}

impl FeatureType for EnumStyle {
    const TYPE_NAME: &'static str = "enum-style";

    fn into_value(self) -> FeatureValue {
        FeatureValue::EnumStyle(self)
    }

    fn from_value(value: &FeatureValue) -> Option<Self> {
        match value {
            FeatureValue::EnumStyle(style) => Some(*style),
            _ => None,
        }
    }

    fn parse(text: &str) -> std::result::Result<Self, String> {
        text.parse()
    }
}

/// A typed configuration key with a default.
#[derive(Debug, Clone, Copy)]
pub struct Feature<T> {
    key: &'static str,
    default: fn() -> T,
}

impl<T> Feature<T> {
    pub const fn new(key: &'static str, default: fn() -> T) -> Self {
        Self { key, default }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn default_value(&self) -> T {
        (self.default)()
    }
}

fn default_namespace() -> String {
    "anonymous".to_string()
}

fn default_enum_style() -> EnumStyle {
    EnumStyle::Native
}

fn disabled() -> bool {
    false
}

/// Namespace for types whose location has no mapping.
pub const DEFAULT_NAMESPACE: Feature<String> = Feature::new("default-namespace", default_namespace);

/// Emission style for string enumerations.
pub const ENUM_STYLE: Feature<EnumStyle> = Feature::new("enum-style", default_enum_style);

/// Substitute the mapped type when generating a location fails.
pub const IGNORE_MISSING_TYPES: Feature<bool> = Feature::new("ignore-missing-types", disabled);

/// Map every string schema to `String`, ignoring `enum` constraints.
pub const SIMPLE_PLAIN_TYPES: Feature<bool> = Feature::new("simple-plain-types", disabled);

/// The set of feature values for one generation run.
#[derive(Debug, Clone, Default)]
pub struct Features {
    values: BTreeMap<&'static str, FeatureValue>,
}

impl Features {
    /// Read a feature, falling back to its default.
    ///
    /// # Panics
    ///
    /// Panics if the stored value has a different type than `feature` declares,
    /// which only happens when two `Feature` constants share a key.
    pub fn get<T: FeatureType>(&self, feature: &Feature<T>) -> T {
        match self.values.get(feature.key) {
            None => feature.default_value(),
            Some(value) => T::from_value(value).unwrap_or_else(|| {
                panic!(
                    "feature '{}' holds a {} value, expected {}",
                    feature.key,
                    value.type_name(),
                    T::TYPE_NAME
                )
            }),
        }
    }

    /// Set a feature, returning the previously effective value.
    pub fn set<T: FeatureType>(&mut self, feature: &Feature<T>, value: T) -> T {
        let previous = self.get(feature);
        self.values.insert(feature.key, value.into_value());
        previous
    }

    /// Set a feature by key from text, parsing by the key's declared type.
    pub fn set_raw(&mut self, key: &str, text: &str) -> Result<()> {
        if key == DEFAULT_NAMESPACE.key {
            self.set_parsed(&DEFAULT_NAMESPACE, text)
        } else if key == ENUM_STYLE.key {
            self.set_parsed(&ENUM_STYLE, text)
        } else if key == IGNORE_MISSING_TYPES.key {
            self.set_parsed(&IGNORE_MISSING_TYPES, text)
        } else if key == SIMPLE_PLAIN_TYPES.key {
            self.set_parsed(&SIMPLE_PLAIN_TYPES, text)
        } else {
            Err(Error::Config(format!("unknown feature '{key}'")))
        }
    }

    fn set_parsed<T: FeatureType>(&mut self, feature: &Feature<T>, text: &str) -> Result<()> {
        let value = T::parse(text)
            .map_err(|e| Error::Config(format!("feature '{}': {e}", feature.key)))?;
        self.set(feature, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_features_return_defaults() {
        let features = Features::default();
        assert_eq!(features.get(&DEFAULT_NAMESPACE), "anonymous");
        assert_eq!(features.get(&ENUM_STYLE), EnumStyle::Native);
        assert!(!features.get(&IGNORE_MISSING_TYPES));
        assert!(!features.get(&SIMPLE_PLAIN_TYPES));
    }

    #[test]
    fn set_returns_previous_value() {
        let mut features = Features::default();
        let previous = features.set(&DEFAULT_NAMESPACE, "com.example.generated".to_string());
        assert_eq!(previous, "anonymous");
        assert_eq!(features.get(&DEFAULT_NAMESPACE), "com.example.generated");
    }

    #[test]
    fn set_raw_parses_by_declared_type() {
        let mut features = Features::default();
        features.set_raw("ignore-missing-types", "true").unwrap();
        features.set_raw("enum-style", "constants").unwrap();
        assert!(features.get(&IGNORE_MISSING_TYPES));
        assert_eq!(features.get(&ENUM_STYLE), EnumStyle::Constants);
    }

    #[test]
    fn set_raw_rejects_bad_values_and_keys() {
        let mut features = Features::default();
        let err = features.set_raw("ignore-missing-types", "maybe").unwrap_err();
        assert!(err.to_string().contains("ignore-missing-types"));
        assert!(features.set_raw("enum-style", "bitflags").is_err());
        assert!(features.set_raw("no-such-feature", "1").is_err());
    }

    #[test]
    #[should_panic(expected = "expected bool")]
    fn mistyped_key_fails_fast() {
        const CLASHING: Feature<bool> = Feature::new("default-namespace", disabled);
        let mut features = Features::default();
        features.set(&DEFAULT_NAMESPACE, "pkg".to_string());
        features.get(&CLASHING);
    }
}
