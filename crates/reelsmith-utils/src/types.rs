use serde::{Deserialize, Serialize};

/// Class of generative model a run targets.
///
/// The class, not a concrete model id, is what the budget allocator keys on.
/// Backends resolve a class to a provider-specific model name from configuration.
///
/// # Example
///
/// ```rust
/// use reelsmith_utils::types::ModelClass;
/// use std::str::FromStr;
///
/// assert_eq!(ModelClass::from_str("high-quality").unwrap(), ModelClass::HighQuality);
/// assert_eq!(ModelClass::Fast.to_string(), "fast");
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ModelClass {
    /// Cheaper, faster model with a larger output ceiling.
    Fast,
    /// Slower model used for the richest output.
    #[default]
    HighQuality,
}

/// Kind of work a single generation call performs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskKind {
    General,
    Content,
    Visual,
    Code,
}

/// Complexity scalar applied on top of the task sizing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Complexity {
    Simple,
    #[default]
    Normal,
    Complex,
}

impl Complexity {
    /// Multiplier applied to a task-sized ceiling.
    #[must_use]
    pub const fn scalar(self) -> f64 {
        match self {
            Self::Simple => 0.7,
            Self::Normal => 1.0,
            Self::Complex => 1.3,
        }
    }
}

/// Source of a configuration value.
///
/// Indicates where a value originated in the precedence chain:
/// CLI > environment > config file > programmatic > built-in default.
///
/// Serializes to lowercase strings: `"cli"`, `"env"`, `"config"`, `"programmatic"`, `"default"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value read from a `REELSMITH_*` environment variable.
    Env,
    /// Value loaded from configuration file.
    Config,
    /// Value provided through `Config::builder()`.
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_model_class_round_trips_through_strings() {
        for class in [ModelClass::Fast, ModelClass::HighQuality] {
            let parsed = ModelClass::from_str(&class.to_string()).unwrap();
            assert_eq!(parsed, class);
        }
        assert!(ModelClass::from_str("medium").is_err());
    }

    #[test]
    fn test_model_class_serde_uses_kebab_case() {
        let json = serde_json::to_string(&ModelClass::HighQuality).unwrap();
        assert_eq!(json, r#""high-quality""#);
    }

    #[test]
    fn test_complexity_scalars() {
        assert_eq!(Complexity::Simple.scalar(), 0.7);
        assert_eq!(Complexity::Normal.scalar(), 1.0);
        assert_eq!(Complexity::Complex.scalar(), 1.3);
        assert_eq!(Complexity::default(), Complexity::Normal);
    }

    #[test]
    fn test_config_source_serialization() {
        assert_eq!(serde_json::to_string(&ConfigSource::Env).unwrap(), r#""env""#);
        assert_eq!(ConfigSource::Programmatic.to_string(), "programmatic");
    }
}
