//! Plan command implementation
//!
//! Handles `reelsmith plan`: everything a run would be sized with, computed
//! locally without any provider call.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::Config;
use crate::budget::{DurationProfile, StageRequirements, max_iterations};
use crate::model::StageKind;
use crate::orchestrator::{STAGE_ORDER, stage_budget, stage_temperature};
use crate::utils::types::ModelClass;

/// Budget and sampling settings of one stage call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StagePlan {
    pub stage: StageKind,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Only short runs call the skeleton stage, concurrently with the visual plan.
    pub fast_path_only: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanReport {
    pub minutes: u32,
    pub model_class: ModelClass,
    pub max_iterations: u32,
    pub fast_path: bool,
    pub profile: DurationProfile,
    pub requirements: StageRequirements,
    pub stages: Vec<StagePlan>,
}

/// Plan for the configured duration and model class.
#[must_use]
pub fn build_plan(config: &Config) -> PlanReport {
    let minutes = config.duration_minutes().max(1);
    let model_class = config.model_class();
    let fast_path = minutes <= config.fast_path_max_minutes();

    let stages = STAGE_ORDER
        .iter()
        .map(|&stage| StagePlan {
            stage,
            max_tokens: stage_budget(stage, model_class, minutes).ceiling,
            temperature: stage_temperature(stage),
            fast_path_only: stage == StageKind::CodeSkeleton,
        })
        .collect();

    PlanReport {
        minutes,
        model_class,
        max_iterations: max_iterations(minutes),
        fast_path,
        profile: DurationProfile::for_minutes(minutes),
        requirements: StageRequirements::for_minutes(minutes),
        stages,
    }
}

/// Execute the plan command
pub fn execute_plan_command(json: bool, config: &Config) -> Result<()> {
    let plan = build_plan(config);

    if json {
        let rendered = serde_json::to_string_pretty(&plan).context("Failed to serialize plan")?;
        println!("{rendered}");
        return Ok(());
    }

    let profile = &plan.profile;
    let req = &plan.requirements;
    println!(
        "Plan for a {}-minute video (model class: {})",
        plan.minutes, plan.model_class
    );
    println!("  Iterations:     {}", plan.max_iterations);
    println!(
        "  Fast path:      {}",
        if plan.fast_path { "yes" } else { "no" }
    );
    println!();
    println!("Quality thresholds:");
    println!("  Total duration: >= {:.0}s", profile.min_total_secs);
    println!(
        "  Sections:       >= {} (>= {} chars each)",
        profile.min_sections, profile.min_section_chars
    );
    println!(
        "  Animations:     >= {} per scene, >= {} total",
        profile.min_animations_per_section, profile.min_total_animations
    );
    println!(
        "  Pacing:         hook {}, sections {}, summary {}",
        profile.hook_secs, profile.section_secs, profile.summary_secs
    );
    println!("  Style:          {} ({})", profile.style, profile.pacing);
    println!();
    println!("Prompt requirements:");
    println!(
        "  {} scenes, {} animations, {} concepts, {} examples, {} visuals, {}s",
        req.scenes, req.animations, req.concepts, req.examples, req.visuals, req.duration_secs
    );
    println!();
    println!("Stage budgets:");
    for stage in &plan.stages {
        let note = match (stage.fast_path_only, plan.fast_path) {
            (true, true) => " (parallel with visual_plan)",
            (true, false) => " (skipped)",
            _ => "",
        };
        println!(
            "  {:<14} max_tokens {:>6}  temperature {:.1}{note}",
            stage.stage.as_str(),
            stage.max_tokens,
            stage.temperature
        );
    }

    Ok(())
}
