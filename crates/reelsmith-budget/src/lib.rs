//! Resource budgets for reelsmith runs.
//!
//! - [`allocate`] sizes one generation call from model class, duration, task
//!   and complexity.
//! - [`DurationProfile`] and [`StageRequirements`] turn the requested minutes
//!   into pacing targets and validation thresholds.
//! - [`fit_prompt`] keeps a prompt inside the ceiling it will be sent with.

mod allocator;
mod fit;
mod profile;

pub use allocator::{Budget, ModelLimits, SKELETON_BUDGET, TaskFactor, allocate};
pub use fit::{estimate_tokens, fit_prompt};
pub use profile::{
    DurationBucket, DurationProfile, MIN_SECTION_CHARS, SecondsRange, StageRequirements,
    max_iterations,
};

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use reelsmith_utils::types::{Complexity, ModelClass, TaskKind};

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

    fn model() -> impl Strategy<Value = ModelClass> {
        prop_oneof![Just(ModelClass::Fast), Just(ModelClass::HighQuality)]
    }

    fn task() -> impl Strategy<Value = TaskKind> {
        prop_oneof![
            Just(TaskKind::General),
            Just(TaskKind::Content),
            Just(TaskKind::Visual),
            Just(TaskKind::Code),
        ]
    }

    fn complexity() -> impl Strategy<Value = Complexity> {
        prop_oneof![
            Just(Complexity::Simple),
            Just(Complexity::Normal),
            Just(Complexity::Complex),
        ]
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn prop_allocation_is_monotonic_in_duration(
            model in model(),
            task in task(),
            complexity in complexity(),
            minutes in 1u32..120,
            extra in 0u32..60,
        ) {
            let shorter = allocate(model, minutes, task, complexity);
            let longer = allocate(model, minutes + extra, task, complexity);
            prop_assert!(shorter <= longer);
        }

        #[test]
        fn prop_allocation_stays_within_model_bounds(
            model in model(),
            task in task(),
            complexity in complexity(),
            minutes in 0u32..10_000,
        ) {
            let limits = ModelLimits::for_class(model);
            let ceiling = allocate(model, minutes, task, complexity);
            prop_assert!(ceiling >= limits.min);
            prop_assert!(ceiling <= limits.max);
        }

        #[test]
        fn prop_allocation_is_deterministic(
            model in model(),
            task in task(),
            complexity in complexity(),
            minutes in 0u32..500,
        ) {
            prop_assert_eq!(
                allocate(model, minutes, task, complexity),
                allocate(model, minutes, task, complexity)
            );
        }
    }
}
