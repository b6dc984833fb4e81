//! Recovery of usable values from generator text.
//!
//! [`parse_structured`] turns decorated or damaged JSON into a value through a
//! fixed recovery ladder. [`extract_source`] pulls a renderable scene module
//! out of a code-stage answer.

mod repair;
mod source;
mod structured;

pub use reelsmith_utils::error::ParseError;
pub use repair::{first_balanced_object, quote_bare_keys, strip_fences, structural_repair};
pub use source::{ExtractionError, extract_source, looks_like_scene};
pub use structured::{Recovery, SNIPPET_RADIUS, parse_record, parse_structured, parse_with_recovery};

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::{Map, Value};

    fn proptest_config() -> ProptestConfig {
        let cases = std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(64);
        ProptestConfig {
            cases,
            ..ProptestConfig::default()
        }
    }

    fn leaf() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-zA-Z0-9 ,:{}]{0,12}".prop_map(Value::from),
        ]
    }

    fn object(min_keys: usize) -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-z_]{1,8}", leaf(), min_keys..6)
            .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>()))
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn prop_fenced_equals_unwrapped(value in object(0), label in "(json|JSON|)") {
            let text = serde_json::to_string_pretty(&value).unwrap();
            let fenced = format!("```{label}\n{text}\n```");
            prop_assert_eq!(parse_structured(&fenced).unwrap(), parse_structured(&text).unwrap());
        }

        #[test]
        fn prop_trailing_comma_before_brace_is_ignored(value in object(1)) {
            let text = serde_json::to_string(&value).unwrap();
            let with_comma = format!("{},}}", &text[..text.len() - 1]);
            prop_assert_eq!(parse_structured(&with_comma).unwrap(), value);
        }

        #[test]
        fn prop_truncated_string_ends_at_truncation_point(prefix in "[a-zA-Z0-9.,:{}\\[\\]]{0,40}") {
            let raw = format!("{{\"title\": \"{prefix}");
            let value = parse_structured(&raw).unwrap();
            prop_assert_eq!(value["title"].as_str(), Some(prefix.as_str()));
        }
    }
}
