//! Token ceilings for single generation calls.
//!
//! `allocate` is pure: the same `(model, minutes, task, complexity)` always
//! yields the same ceiling, and for a fixed model/task/complexity the ceiling
//! never shrinks as the duration grows.

use serde::Serialize;
use tracing::debug;

use reelsmith_utils::types::{Complexity, ModelClass, TaskKind};

/// Fixed ceiling for the structure-only skeleton call of the fast path.
pub const SKELETON_BUDGET: u32 = 1500;

/// Output-size bounds of one model class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLimits {
    pub default: u32,
    pub min: u32,
    pub max: u32,
}

impl ModelLimits {
    #[must_use]
    pub const fn for_class(class: ModelClass) -> Self {
        match class {
            ModelClass::HighQuality => Self {
                default: 32_000,
                min: 2_000,
                max: 32_000,
            },
            ModelClass::Fast => Self {
                default: 32_000,
                min: 1_500,
                max: 64_000,
            },
        }
    }
}

/// How a task scales with duration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskFactor {
    /// Multiplier on the model default.
    pub base: f64,
    /// Tokens added per minute of target duration.
    pub per_minute: u32,
}

impl TaskFactor {
    #[must_use]
    pub const fn for_task(task: TaskKind) -> Self {
        match task {
            TaskKind::General => Self {
                base: 1.0,
                per_minute: 0,
            },
            TaskKind::Content => Self {
                base: 1.0,
                per_minute: 1_000,
            },
            TaskKind::Visual => Self {
                base: 1.0,
                per_minute: 800,
            },
            TaskKind::Code => Self {
                base: 1.0,
                per_minute: 2_000,
            },
        }
    }
}

/// Size ceiling for one generation call.
///
/// # Example
///
/// ```rust
/// use reelsmith_budget::allocate;
/// use reelsmith_utils::types::{Complexity, ModelClass, TaskKind};
///
/// // 32000 + 2000 * 3, clamped to the fast model's 64000 ceiling
/// assert_eq!(allocate(ModelClass::Fast, 3, TaskKind::Code, Complexity::Normal), 38_000);
/// // High-quality tops out at 32000
/// assert_eq!(allocate(ModelClass::HighQuality, 3, TaskKind::Code, Complexity::Normal), 32_000);
/// ```
#[must_use]
pub fn allocate(model: ModelClass, minutes: u32, task: TaskKind, complexity: Complexity) -> u32 {
    let limits = ModelLimits::for_class(model);
    let factor = TaskFactor::for_task(task);

    let sized = (f64::from(limits.default) * factor.base
        + f64::from(factor.per_minute) * f64::from(minutes))
    .floor();
    let scaled = (sized * complexity.scalar()).floor();
    let ceiling = scaled.clamp(f64::from(limits.min), f64::from(limits.max)) as u32;

    debug!(
        model = %model,
        minutes,
        task = %task,
        complexity = %complexity,
        ceiling,
        "Allocated token budget"
    );

    ceiling
}

/// A ceiling together with the inputs it was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Budget {
    pub ceiling: u32,
    pub model: ModelClass,
    pub minutes: u32,
    pub task: TaskKind,
    pub complexity: Complexity,
}

impl Budget {
    #[must_use]
    pub fn new(model: ModelClass, minutes: u32, task: TaskKind, complexity: Complexity) -> Self {
        Self {
            ceiling: allocate(model, minutes, task, complexity),
            model,
            minutes,
            task,
            complexity,
        }
    }

    /// The fixed skeleton budget, recorded against the code task.
    #[must_use]
    pub const fn skeleton(model: ModelClass, minutes: u32) -> Self {
        Self {
            ceiling: SKELETON_BUDGET,
            model,
            minutes,
            task: TaskKind::Code,
            complexity: Complexity::Simple,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_task_is_model_default() {
        assert_eq!(
            allocate(ModelClass::Fast, 10, TaskKind::General, Complexity::Normal),
            32_000
        );
        assert_eq!(
            allocate(ModelClass::HighQuality, 10, TaskKind::General, Complexity::Normal),
            32_000
        );
    }

    #[test]
    fn test_per_minute_terms() {
        let fast = ModelClass::Fast;
        assert_eq!(allocate(fast, 1, TaskKind::Content, Complexity::Normal), 33_000);
        assert_eq!(allocate(fast, 5, TaskKind::Visual, Complexity::Normal), 36_000);
        assert_eq!(allocate(fast, 10, TaskKind::Code, Complexity::Normal), 52_000);
    }

    #[test]
    fn test_complexity_scalar_and_clamp() {
        // floor(33000 * 0.7) = 23100
        assert_eq!(
            allocate(ModelClass::Fast, 1, TaskKind::Content, Complexity::Simple),
            23_100
        );
        // 52000 * 1.3 = 67600 clamps to 64000
        assert_eq!(
            allocate(ModelClass::Fast, 10, TaskKind::Code, Complexity::Complex),
            64_000
        );
        // High quality clamps above at 32000
        assert_eq!(
            allocate(ModelClass::HighQuality, 1, TaskKind::Content, Complexity::Complex),
            32_000
        );
    }

    #[test]
    fn test_budget_records_inputs() {
        let budget = Budget::new(ModelClass::Fast, 2, TaskKind::Code, Complexity::Normal);
        assert_eq!(budget.ceiling, 36_000);
        assert_eq!(budget.minutes, 2);
        assert_eq!(budget.task, TaskKind::Code);

        let skeleton = Budget::skeleton(ModelClass::HighQuality, 2);
        assert_eq!(skeleton.ceiling, SKELETON_BUDGET);
    }
}
