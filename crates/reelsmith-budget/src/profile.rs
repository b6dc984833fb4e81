//! Duration-derived thresholds.
//!
//! Every table here is keyed by the same five buckets of target minutes:
//! `<= 1`, `<= 3`, `<= 5`, `<= 10` and longer. Each bucket is defined, so no
//! duration falls through to a default that contradicts the request.

use serde::Serialize;

/// Minimum characters of body text per content section, in every bucket.
pub const MIN_SECTION_CHARS: usize = 300;

/// Duration bucket of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationBucket {
    UpToOne,
    UpToThree,
    UpToFive,
    UpToTen,
    Longer,
}

impl DurationBucket {
    #[must_use]
    pub const fn for_minutes(minutes: u32) -> Self {
        match minutes {
            0..=1 => Self::UpToOne,
            2..=3 => Self::UpToThree,
            4..=5 => Self::UpToFive,
            6..=10 => Self::UpToTen,
            _ => Self::Longer,
        }
    }
}

/// Inclusive range of seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SecondsRange {
    pub min: f64,
    pub max: f64,
}

impl SecondsRange {
    const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl std::fmt::Display for SecondsRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Per-run pacing and density targets derived from the requested minutes.
///
/// Built once at run start and shared read-only by prompts and validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationProfile {
    pub minutes: u32,
    pub bucket: DurationBucket,
    pub min_total_secs: f64,
    pub min_sections: usize,
    pub min_animations_per_section: usize,
    pub min_total_animations: usize,
    pub min_section_chars: usize,
    pub hook_secs: SecondsRange,
    pub section_secs: SecondsRange,
    pub summary_secs: SecondsRange,
    pub transition_secs: f64,
    pub animations_per_minute: u32,
    pub style: &'static str,
    pub complexity: &'static str,
    pub detail_level: &'static str,
    pub pacing: &'static str,
}

impl DurationProfile {
    /// Profile for a target length in whole minutes.
    ///
    /// The section minimum is capped at `floor(min_total_secs / min_sections)` so
    /// the minimum sections always fit into the requested total.
    #[must_use]
    pub fn for_minutes(minutes: u32) -> Self {
        let minutes = minutes.max(1);
        let bucket = DurationBucket::for_minutes(minutes);
        let per_minute_total = 55.0 * f64::from(minutes);

        let (
            min_total_secs,
            min_sections,
            min_animations_per_section,
            min_total_animations,
            hook_secs,
            section_secs,
            summary_secs,
            transition_secs,
            animations_per_minute,
        ) = match bucket {
            DurationBucket::UpToOne => (
                50.0,
                2,
                1,
                3,
                SecondsRange::new(5.0, 10.0),
                SecondsRange::new(20.0, 30.0),
                SecondsRange::new(5.0, 10.0),
                1.0,
                3,
            ),
            DurationBucket::UpToThree => (
                per_minute_total,
                3,
                3,
                10,
                SecondsRange::new(10.0, 15.0),
                SecondsRange::new(30.0, 45.0),
                SecondsRange::new(10.0, 20.0),
                1.5,
                8,
            ),
            DurationBucket::UpToFive => (
                per_minute_total,
                4,
                4,
                20,
                SecondsRange::new(15.0, 20.0),
                SecondsRange::new(45.0, 60.0),
                SecondsRange::new(20.0, 30.0),
                2.0,
                10,
            ),
            DurationBucket::UpToTen => (
                per_minute_total,
                6,
                5,
                35,
                SecondsRange::new(20.0, 30.0),
                SecondsRange::new(60.0, 90.0),
                SecondsRange::new(30.0, 45.0),
                2.5,
                12,
            ),
            DurationBucket::Longer => (
                per_minute_total,
                8,
                6,
                50,
                SecondsRange::new(30.0, 45.0),
                SecondsRange::new(90.0, 120.0),
                SecondsRange::new(45.0, 60.0),
                3.0,
                15,
            ),
        };

        let (style, complexity, detail_level, pacing) = labels(bucket);

        let section_cap = (min_total_secs / min_sections as f64).floor();
        let section_secs = SecondsRange::new(
            section_secs.min.min(section_cap),
            section_secs.max,
        );

        Self {
            minutes,
            bucket,
            min_total_secs,
            min_sections,
            min_animations_per_section,
            min_total_animations,
            min_section_chars: MIN_SECTION_CHARS,
            hook_secs,
            section_secs,
            summary_secs,
            transition_secs,
            animations_per_minute,
            style,
            complexity,
            detail_level,
            pacing,
        }
    }

    /// Animations the whole video should carry at this pace.
    #[must_use]
    pub const fn target_animations(&self) -> u32 {
        self.minutes.saturating_mul(self.animations_per_minute)
    }

    #[must_use]
    pub const fn duration_secs(&self) -> u32 {
        self.minutes.saturating_mul(60)
    }
}

const fn labels(bucket: DurationBucket) -> (&'static str, &'static str, &'static str, &'static str) {
    match bucket {
        DurationBucket::UpToOne => (
            "concise and focused",
            "simple",
            "essential points only",
            "quick and direct",
        ),
        DurationBucket::UpToThree => (
            "clear and engaging",
            "moderate",
            "main concepts with examples",
            "steady and clear",
        ),
        DurationBucket::UpToFive => (
            "comprehensive and educational",
            "detailed",
            "thorough explanations with multiple examples",
            "measured with time for understanding",
        ),
        DurationBucket::UpToTen => (
            "in-depth and exploratory",
            "comprehensive",
            "deep dive with nuanced explanations",
            "deliberate with pauses for reflection",
        ),
        DurationBucket::Longer => (
            "masterclass-level depth",
            "expert",
            "exhaustive coverage with advanced topics",
            "varied with multiple arcs",
        ),
    }
}

/// Counts inlined into stage prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StageRequirements {
    pub scenes: u32,
    pub animations: u32,
    pub concepts: u32,
    pub examples: u32,
    pub visuals: u32,
    pub duration_secs: u32,
}

impl StageRequirements {
    #[must_use]
    pub const fn for_minutes(minutes: u32) -> Self {
        let (scenes, animations, concepts, examples, visuals) =
            match DurationBucket::for_minutes(minutes) {
                DurationBucket::UpToOne => (2, 5, 1, 1, 3),
                DurationBucket::UpToThree => (3, 15, 2, 2, 8),
                DurationBucket::UpToFive => (5, 25, 3, 3, 15),
                DurationBucket::UpToTen => (8, 40, 5, 5, 25),
                DurationBucket::Longer => (12, 60, 8, 8, 40),
            };
        Self {
            scenes,
            animations,
            concepts,
            examples,
            visuals,
            duration_secs: minutes.saturating_mul(60),
        }
    }
}

/// Refinement iterations allowed for a target length.
///
/// ```rust
/// use reelsmith_budget::max_iterations;
///
/// assert_eq!(max_iterations(2), 1);
/// assert_eq!(max_iterations(12), 3);
/// ```
#[must_use]
pub const fn max_iterations(minutes: u32) -> u32 {
    match minutes {
        0..=3 => 1,
        4..=10 => 2,
        _ => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(DurationBucket::for_minutes(1), DurationBucket::UpToOne);
        assert_eq!(DurationBucket::for_minutes(3), DurationBucket::UpToThree);
        assert_eq!(DurationBucket::for_minutes(4), DurationBucket::UpToFive);
        assert_eq!(DurationBucket::for_minutes(10), DurationBucket::UpToTen);
        assert_eq!(DurationBucket::for_minutes(11), DurationBucket::Longer);
    }

    #[test]
    fn test_one_minute_profile() {
        let profile = DurationProfile::for_minutes(1);
        assert_eq!(profile.min_sections, 2);
        assert_eq!(profile.min_total_secs, 50.0);
        assert_eq!(profile.min_animations_per_section, 1);
        assert_eq!(profile.style, "concise and focused");
        assert_eq!(profile.section_secs.min, 20.0);
        assert_eq!(profile.target_animations(), 3);
    }

    #[test]
    fn test_total_scales_with_minutes_above_one() {
        assert_eq!(DurationProfile::for_minutes(3).min_total_secs, 165.0);
        assert_eq!(DurationProfile::for_minutes(7).min_total_secs, 385.0);
    }

    #[test]
    fn test_section_minimum_fits_total_in_every_bucket() {
        for minutes in 1..=60 {
            let profile = DurationProfile::for_minutes(minutes);
            assert!(
                profile.section_secs.min * profile.min_sections as f64 <= profile.min_total_secs,
                "minutes={minutes}"
            );
            assert!(profile.section_secs.min >= 0.0);
            assert!(profile.hook_secs.min <= profile.hook_secs.max);
        }
    }

    #[test]
    fn test_section_minimum_is_capped_for_eleven_minutes() {
        // 8 sections of 90 s would overrun 605 s
        let profile = DurationProfile::for_minutes(11);
        assert_eq!(profile.section_secs.min, 75.0);
        assert_eq!(profile.section_secs.max, 120.0);
    }

    #[test]
    fn test_requirement_tables() {
        let one = StageRequirements::for_minutes(1);
        assert_eq!((one.scenes, one.animations, one.visuals), (2, 5, 3));
        let twelve = StageRequirements::for_minutes(12);
        assert_eq!((twelve.scenes, twelve.concepts), (12, 8));
        assert_eq!(twelve.duration_secs, 720);
    }

    #[test]
    fn test_oversized_durations_saturate() {
        let profile = DurationProfile::for_minutes(u32::MAX);
        assert_eq!(profile.bucket, DurationBucket::Longer);
        assert_eq!(profile.duration_secs(), u32::MAX);
        assert_eq!(profile.target_animations(), u32::MAX);
        assert_eq!(StageRequirements::for_minutes(u32::MAX).duration_secs, u32::MAX);
    }

    #[test]
    fn test_iteration_budget() {
        assert_eq!(max_iterations(1), 1);
        assert_eq!(max_iterations(3), 1);
        assert_eq!(max_iterations(4), 2);
        assert_eq!(max_iterations(10), 2);
        assert_eq!(max_iterations(11), 3);
    }
}
