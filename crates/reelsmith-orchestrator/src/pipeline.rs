//! The Content → Visual-Plan → Code pipeline.
//!
//! A failing content gate restarts the iteration with a refinement directive.
//! Once code exists it is returned; the combined report after the Code stage
//! only decides between best-effort return and [`PipelineError::QualityShortfall`].

use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{Instrument, info, warn};

use reelsmith_budget::{
    Budget, DurationProfile, StageRequirements, fit_prompt, max_iterations,
};
use reelsmith_config::Config;
use reelsmith_llm::{GenerationBackend, LlmInvocation, RetryPolicy, StructuredCallError};
use reelsmith_model::{
    CodeArtifact, ContentRecord, GenerationRequest, StageKind, StageResult, VisualPlan, new_run_id,
};
use reelsmith_utils::error::{ParseError, PipelineError};
use reelsmith_utils::logging::{log_stage_complete, log_stage_error, log_stage_start, stage_span};
use reelsmith_utils::types::{Complexity, ModelClass, TaskKind};
use reelsmith_validation::{QualityValidator, ValidationReport};

use crate::normalize::{normalize_content, parse_code, parse_content, parse_visual_plan};
use crate::progress::ProgressReporter;
use crate::prompts;
use crate::state::PipelineState;

/// Stages in the order a sequential iteration calls them.
pub const STAGE_ORDER: [StageKind; 4] = [
    StageKind::Content,
    StageKind::VisualPlan,
    StageKind::CodeSkeleton,
    StageKind::Code,
];

/// Sampling temperature of each stage call.
#[must_use]
pub const fn stage_temperature(stage: StageKind) -> f32 {
    match stage {
        StageKind::Content => 0.8,
        StageKind::VisualPlan | StageKind::CodeSkeleton => 0.7,
        StageKind::Code => 0.3,
    }
}

/// Token budget of each stage call. The skeleton uses its fixed budget.
#[must_use]
pub fn stage_budget(stage: StageKind, model: ModelClass, minutes: u32) -> Budget {
    let task = match stage {
        StageKind::Content => TaskKind::Content,
        StageKind::VisualPlan => TaskKind::Visual,
        StageKind::CodeSkeleton => return Budget::skeleton(model, minutes),
        StageKind::Code => TaskKind::Code,
    };
    Budget::new(model, minutes, task, Complexity::default())
}

/// Progress reported when a Content call starts, on every iteration.
pub const CONTENT_PROGRESS: f64 = 0.2;

/// Progress reported when visual planning (and, on the fast path, the
/// skeleton) starts.
pub const GENERATION_PROGRESS: f64 = 0.4;

/// Progress reported when the final Code call starts.
pub const CODE_PROGRESS: f64 = 0.6;

/// Longest request, in minutes, that may take the parallel fast path.
pub const DEFAULT_FAST_PATH_MAX_MINUTES: u32 = 5;

/// What a successful run hands back.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    pub run_id: String,
    pub code: CodeArtifact,
    pub content: ContentRecord,
    pub visual_plan: VisualPlan,
    /// Combined report of the final pass. May be invalid in best-effort mode.
    pub report: ValidationReport,
    /// Iterations started, including the one that produced the code.
    pub iterations: u32,
    pub fast_path: bool,
}

/// Runs one request's pipeline to completion or failure.
pub struct Orchestrator {
    backend: Arc<dyn GenerationBackend>,
    retry: RetryPolicy,
    best_effort: bool,
    fast_path_max_minutes: u32,
}

impl Orchestrator {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            retry: RetryPolicy::default(),
            best_effort: true,
            fast_path_max_minutes: DEFAULT_FAST_PATH_MAX_MINUTES,
        }
    }

    /// Orchestrator over `backend` with retry and pipeline settings from `config`.
    #[must_use]
    pub fn from_config(backend: Arc<dyn GenerationBackend>, config: &Config) -> Self {
        Self::new(backend)
            .with_retry(RetryPolicy::from_config(config))
            .with_best_effort(config.best_effort())
            .with_fast_path_max_minutes(config.fast_path_max_minutes())
    }

    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// `false` turns a failing final report into [`PipelineError::QualityShortfall`].
    #[must_use]
    pub const fn with_best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        self
    }

    #[must_use]
    pub const fn with_fast_path_max_minutes(mut self, minutes: u32) -> Self {
        self.fast_path_max_minutes = minutes;
        self
    }

    /// Run the pipeline for `request`.
    ///
    /// # Errors
    ///
    /// - [`PipelineError::Generation`] / [`PipelineError::Parse`] when a stage
    ///   call fails after its retries
    /// - [`PipelineError::NoArtifact`] when every iteration failed the content gate
    /// - [`PipelineError::QualityShortfall`] when best-effort is off and the
    ///   final combined report is invalid
    pub async fn run(
        &self,
        request: &GenerationRequest,
        progress: &ProgressReporter,
    ) -> Result<PipelineOutput, PipelineError> {
        let run = Run::new(request);
        let mut state = PipelineState::new(new_run_id(request.topic()));
        let max_iterations = max_iterations(run.minutes);
        let mut last_issues = Vec::new();

        info!(
            run_id = %state.run_id,
            minutes = run.minutes,
            max_iterations,
            model_class = %request.model_class(),
            "Starting pipeline"
        );

        while state.iteration < max_iterations {
            let iteration = state.iteration;

            progress.report(
                StageKind::Content.as_str(),
                &format!("Generating content (iteration {})", iteration + 1),
                CONTENT_PROGRESS,
            );
            let mut content = self.content_stage(&run, &state).await?;
            let gate = run.validator.validate_content(&content);
            if gate.valid {
                normalize_content(
                    &mut content,
                    f64::from(run.profile.duration_secs()),
                    run.minutes,
                );
            }
            state.record(StageResult::Content {
                record: content.clone(),
                iteration,
            });

            if !gate.valid {
                warn!(
                    run_id = %state.run_id,
                    iteration,
                    issues = gate.issues.len(),
                    "Content below quality thresholds, refining"
                );
                state
                    .directives
                    .push(prompts::refinement_directive(&gate, &content, &run.profile));
                last_issues.clone_from(&gate.issues);
                state.last_report = Some(gate);
                state.advance();
                continue;
            }

            let fast_path = run.minutes <= self.fast_path_max_minutes && iteration == 0;
            let mut plan = if fast_path {
                progress.report(
                    "parallel_generation",
                    "Designing visuals and code structure in parallel",
                    GENERATION_PROGRESS,
                );
                let (plan, skeleton) = tokio::try_join!(
                    self.visual_stage(&run, &state, &content),
                    self.skeleton_stage(&run, &state, &content),
                )?;
                state.skeleton = Some(skeleton);
                plan
            } else {
                progress.report(
                    StageKind::VisualPlan.as_str(),
                    "Designing visual plan",
                    GENERATION_PROGRESS,
                );
                self.visual_stage(&run, &state, &content).await?
            };
            if let Some(skeleton) = &state.skeleton {
                plan.initial_structure = Some(skeleton.clone());
            }
            state.record(StageResult::VisualPlan {
                record: plan.clone(),
                iteration,
            });

            progress.report(StageKind::Code.as_str(), "Generating animation code", CODE_PROGRESS);
            let code = self.code_stage(&run, &state, &content, &plan).await?;
            state.record(StageResult::Code {
                record: code.clone(),
                iteration,
            });

            let report = run.validator.validate_all(&content, &plan, &code);
            if report.valid {
                info!(run_id = %state.run_id, iteration, "Final validation passed");
            } else {
                warn!(
                    run_id = %state.run_id,
                    iteration,
                    issues = ?report.issue_messages(),
                    "Final validation failed"
                );
                if !self.best_effort {
                    return Err(PipelineError::QualityShortfall {
                        issues: report.issues,
                    });
                }
            }

            return Ok(PipelineOutput {
                run_id: state.run_id,
                code,
                content,
                visual_plan: plan,
                report,
                iterations: iteration + 1,
                fast_path,
            });
        }

        warn!(run_id = %state.run_id, max_iterations, "Iterations exhausted without code");
        Err(PipelineError::NoArtifact {
            iterations: max_iterations,
            last_issues,
        })
    }

    async fn content_stage(
        &self,
        run: &Run<'_>,
        state: &PipelineState,
    ) -> Result<ContentRecord, PipelineError> {
        let prompt = prompts::content_prompt(
            &run.brief,
            run.request.context(),
            &run.profile,
            &run.requirements,
            state.current_directive(),
        );
        let inv = run
            .invocation(StageKind::Content, &prompt)
            .with_system(prompts::content_system(&run.profile))
            .with_schema_hint(prompts::CONTENT_SCHEMA);

        self.call(state, &inv, true, parse_content).await
    }

    async fn visual_stage(
        &self,
        run: &Run<'_>,
        state: &PipelineState,
        content: &ContentRecord,
    ) -> Result<VisualPlan, PipelineError> {
        let prompt = prompts::visual_prompt(&run.brief, content, &run.profile, &run.requirements);
        let inv = run
            .invocation(StageKind::VisualPlan, &prompt)
            .with_system(prompts::visual_system(&run.profile))
            .with_schema_hint(prompts::VISUAL_SCHEMA);

        self.call(state, &inv, true, parse_visual_plan).await
    }

    async fn skeleton_stage(
        &self,
        run: &Run<'_>,
        state: &PipelineState,
        content: &ContentRecord,
    ) -> Result<String, PipelineError> {
        let prompt = prompts::skeleton_prompt(&run.brief, content);
        let inv = run
            .invocation(StageKind::CodeSkeleton, &prompt)
            .with_system(prompts::SKELETON_SYSTEM);

        self.call(state, &inv, false, |raw| Ok(raw.trim().to_string()))
            .await
    }

    async fn code_stage(
        &self,
        run: &Run<'_>,
        state: &PipelineState,
        content: &ContentRecord,
        plan: &VisualPlan,
    ) -> Result<CodeArtifact, PipelineError> {
        let prompt = prompts::code_prompt(
            &run.brief,
            run.request.context(),
            content,
            plan,
            &run.profile,
            &run.requirements,
        );
        let inv = run
            .invocation(StageKind::Code, &prompt)
            .with_system(prompts::code_system(&run.profile));

        self.call(state, &inv, false, parse_code).await
    }

    /// One stage call with retries, logging and error mapping.
    async fn call<T, F>(
        &self,
        state: &PipelineState,
        inv: &LlmInvocation,
        structured: bool,
        parse: F,
    ) -> Result<T, PipelineError>
    where
        T: Send,
        F: Fn(&str) -> Result<T, ParseError> + Sync,
    {
        let stage = inv.stage.as_str();
        let span = stage_span(&state.run_id, stage, state.iteration);
        let started = Instant::now();

        async {
            log_stage_start(&state.run_id, stage, state.iteration);
            let result = if structured {
                self.retry
                    .generate_structured(self.backend.as_ref(), inv, parse)
                    .await
            } else {
                self.retry
                    .generate_checked(self.backend.as_ref(), inv, parse)
                    .await
            };

            let elapsed = started.elapsed().as_millis();
            match result {
                Ok(value) => {
                    log_stage_complete(&state.run_id, stage, elapsed);
                    Ok(value)
                }
                Err(err) => {
                    log_stage_error(&state.run_id, stage, &err.to_string(), elapsed);
                    Err(stage_error(stage, err))
                }
            }
        }
        .instrument(span)
        .await
    }
}

fn stage_error(stage: &str, err: StructuredCallError) -> PipelineError {
    match err {
        StructuredCallError::Llm(source) => PipelineError::Generation {
            stage: stage.to_string(),
            source,
        },
        StructuredCallError::Parse(source) => PipelineError::Parse {
            stage: stage.to_string(),
            source,
        },
    }
}

/// Values fixed for the whole run.
struct Run<'a> {
    request: &'a GenerationRequest,
    minutes: u32,
    profile: DurationProfile,
    requirements: StageRequirements,
    validator: QualityValidator,
    brief: String,
}

impl<'a> Run<'a> {
    fn new(request: &'a GenerationRequest) -> Self {
        let minutes = request.duration_minutes();
        let profile = DurationProfile::for_minutes(minutes);
        Self {
            request,
            minutes,
            requirements: StageRequirements::for_minutes(minutes),
            validator: QualityValidator::new(profile.clone()),
            brief: prompts::meta_prompt(request.topic(), &profile),
            profile,
        }
    }

    /// Invocation sized by the allocator, with the prompt fitted to the ceiling.
    fn invocation(&self, stage: StageKind, prompt: &str) -> LlmInvocation {
        let budget = stage_budget(stage, self.request.model_class(), self.minutes);
        LlmInvocation::new(
            stage.as_str(),
            self.request.model_class(),
            fit_prompt(prompt, budget.ceiling),
        )
        .with_temperature(stage_temperature(stage))
        .with_max_tokens(budget.ceiling)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, SCENE_CODE, passing_backend};
    use crate::progress::{ChannelProgress, ProgressEvent};
    use reelsmith_llm::{LlmError, ScriptedBackend};
    use reelsmith_utils::error::QualityIssue;
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn orchestrator(backend: Arc<ScriptedBackend>) -> Orchestrator {
        Orchestrator::new(backend).with_retry(RetryPolicy::new(2, Duration::ZERO))
    }

    fn request(minutes: u32) -> GenerationRequest {
        GenerationRequest::from_minutes("Show how derivatives work", ModelClass::Fast, minutes)
            .unwrap()
    }

    fn stages(backend: &ScriptedBackend) -> Vec<String> {
        backend.calls().into_iter().map(|c| c.stage).collect()
    }

    #[tokio::test]
    async fn test_one_minute_run_passes_on_first_iteration() {
        let backend = Arc::new(passing_backend(1).with_latency(Duration::from_millis(20)));
        let output = orchestrator(backend.clone())
            .run(&request(1), &ProgressReporter::null())
            .await
            .unwrap();

        assert_eq!(output.iterations, 1);
        assert!(output.fast_path);
        assert_eq!(output.content.sections.len(), 2);
        assert!(output.report.valid, "{:?}", output.report.issue_messages());
        assert!(output.code.source.contains("class DerivativeScene(Scene)"));
        assert_eq!(
            output.visual_plan.initial_structure.as_deref(),
            Some(fixtures::SKELETON)
        );
        assert_eq!(backend.max_in_flight(), 2);

        let code_call = &backend.calls_for("code")[0];
        assert!(code_call.prompt.contains("Start from this structure:"));
    }

    #[tokio::test]
    async fn test_stage_temperatures_and_budgets() {
        let backend = Arc::new(passing_backend(1));
        orchestrator(backend.clone())
            .run(&request(1), &ProgressReporter::null())
            .await
            .unwrap();

        let call = |stage: &str| backend.calls_for(stage).remove(0);
        assert_eq!(call("content").temperature, 0.8);
        assert!(call("content").structured);
        assert_eq!(call("visual_plan").temperature, 0.7);
        assert_eq!(call("code").temperature, 0.3);
        assert!(!call("code").structured);

        let skeleton = call("code_skeleton");
        assert_eq!(skeleton.max_tokens, 1500);
        assert_eq!(skeleton.system, prompts::SKELETON_SYSTEM);
        assert_eq!(
            call("code").max_tokens,
            Budget::new(ModelClass::Fast, 1, TaskKind::Code, Complexity::Normal).ceiling
        );
    }

    #[test]
    fn test_stage_budget_table() {
        let ceilings: Vec<u32> = STAGE_ORDER
            .iter()
            .map(|stage| stage_budget(*stage, ModelClass::HighQuality, 12).ceiling)
            .collect();
        assert_eq!(ceilings[2], 1500);
        assert!(ceilings.iter().all(|c| *c > 0));
        assert_eq!(
            stage_budget(StageKind::VisualPlan, ModelClass::Fast, 3).task,
            TaskKind::Visual
        );
        assert_eq!(stage_temperature(StageKind::CodeSkeleton), 0.7);
    }

    #[tokio::test]
    async fn test_long_runs_are_sequential() {
        let backend = Arc::new(passing_backend(12).with_latency(Duration::from_millis(5)));
        let output = orchestrator(backend.clone())
            .run(&request(12), &ProgressReporter::null())
            .await
            .unwrap();

        assert!(!output.fast_path);
        assert_eq!(stages(&backend), vec!["content", "visual_plan", "code"]);
        assert_eq!(backend.max_in_flight(), 1);
        assert!(output.visual_plan.initial_structure.is_none());
    }

    #[tokio::test]
    async fn test_short_run_cannot_refine() {
        let backend = Arc::new(passing_backend(2));
        backend.push_text("content", fixtures::thin_content());

        let err = orchestrator(backend.clone())
            .run(&request(2), &ProgressReporter::null())
            .await
            .unwrap_err();

        match err {
            PipelineError::NoArtifact {
                iterations,
                last_issues,
            } => {
                assert_eq!(iterations, 1);
                assert!(!last_issues.is_empty());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stages(&backend), vec!["content"]);
    }

    #[tokio::test]
    async fn test_failed_gate_refines_with_previous_issues() {
        let backend = Arc::new(passing_backend(12));
        backend.push_text("content", fixtures::thin_content());

        let output = orchestrator(backend.clone())
            .run(&request(12), &ProgressReporter::null())
            .await
            .unwrap();

        assert_eq!(output.iterations, 2);
        let contents = backend.calls_for("content");
        assert_eq!(contents.len(), 2);
        assert!(!contents[0].prompt.contains("Previous content was too brief"));
        assert!(contents[1].prompt.contains("Previous content was too brief"));
        assert!(contents[1].prompt.contains("Previous content sections: 1"));
        assert!(contents[1].prompt.contains("at least 720 seconds"));
        assert!(contents[1].prompt.contains("Only 1 sections, need at least 8"));
    }

    fn short_content(minutes: u32, secs_per_section: f64) -> String {
        let profile = DurationProfile::for_minutes(minutes);
        fixtures::content_json(
            profile.min_sections,
            secs_per_section,
            profile.min_section_chars + 20,
        )
    }

    #[tokio::test]
    async fn test_under_duration_content_refines_with_declared_seconds() {
        let profile = DurationProfile::for_minutes(12);
        let backend = Arc::new(passing_backend(12));
        backend.push_text("content", short_content(12, 10.0));

        let output = orchestrator(backend.clone())
            .run(&request(12), &ProgressReporter::null())
            .await
            .unwrap();

        assert_eq!(output.iterations, 2);
        let declared = 10 * profile.min_sections;
        let retry = &backend.calls_for("content")[1].prompt;
        assert!(retry.contains(&format!("Previous total duration: {declared} seconds")));
        assert!(retry.contains(&format!(
            "Duration {declared}s is below minimum {}s",
            profile.min_total_secs
        )));
        assert!(!retry.contains("sections, need at least"));
    }

    #[tokio::test]
    async fn test_under_duration_short_run_has_no_artifact() {
        let backend = Arc::new(passing_backend(3));
        backend.push_text("content", short_content(3, 20.0));

        let err = orchestrator(backend.clone())
            .run(&request(3), &ProgressReporter::null())
            .await
            .unwrap_err();

        match err {
            PipelineError::NoArtifact { last_issues, .. } => {
                assert_eq!(last_issues.len(), 1);
                assert!(matches!(
                    last_issues[0],
                    QualityIssue::DurationBelowMinimum { .. }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stages(&backend), vec!["content"]);
    }

    #[tokio::test]
    async fn test_content_passing_the_gate_is_normalised() {
        // 2 x 26s clears the 50s minimum but sits under the 54s tolerance floor.
        let chars = DurationProfile::for_minutes(1).min_section_chars + 20;
        let backend = Arc::new(
            passing_backend(1).with_repeat("content", fixtures::content_json(2, 26.0, chars)),
        );
        let output = orchestrator(backend)
            .run(&request(1), &ProgressReporter::null())
            .await
            .unwrap();

        let total = output.content.total_duration.unwrap();
        assert!((54.0..=66.0).contains(&total), "total {total}");
        assert_eq!(total, output.content.section_duration_sum());
    }

    #[tokio::test]
    async fn test_oversized_request_runs_to_a_pipeline_error() {
        let backend = Arc::new(
            ScriptedBackend::new().with_repeat("content", fixtures::thin_content()),
        );
        let request = GenerationRequest::new("topic", ModelClass::Fast, u32::MAX).unwrap();

        let err = orchestrator(backend.clone())
            .run(&request, &ProgressReporter::null())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::NoArtifact { iterations: 3, .. }));
        assert_eq!(backend.calls_for("content").len(), 3);
    }

    #[tokio::test]
    async fn test_refinement_after_first_iteration_skips_fast_path() {
        let backend = Arc::new(passing_backend(5));
        backend.push_text("content", fixtures::thin_content());

        let output = orchestrator(backend.clone())
            .run(&request(5), &ProgressReporter::null())
            .await
            .unwrap();

        assert_eq!(output.iterations, 2);
        assert!(!output.fast_path);
        assert!(backend.calls_for("code_skeleton").is_empty());
    }

    #[tokio::test]
    async fn test_weak_code_is_returned_in_best_effort_mode() {
        let weak = "```python\nclass A(Scene):\n    def construct(self):\n        pass\n```";
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_repeat("content", fixtures::passing_content(1))
                .with_repeat("visual_plan", fixtures::passing_visual_plan(1))
                .with_repeat("code_skeleton", fixtures::SKELETON)
                .with_repeat("code", weak),
        );

        let output = orchestrator(backend.clone())
            .run(&request(1), &ProgressReporter::null())
            .await
            .unwrap();
        assert!(!output.report.valid);
        assert!(output.code.source.contains("class A(Scene)"));

        let strict = orchestrator(backend)
            .with_best_effort(false)
            .run(&request(1), &ProgressReporter::null())
            .await
            .unwrap_err();
        assert!(matches!(strict, PipelineError::QualityShortfall { ref issues } if !issues.is_empty()));
    }

    #[tokio::test]
    async fn test_skeleton_failure_fails_the_run() {
        let backend = Arc::new(
            ScriptedBackend::new()
                .with_repeat("content", fixtures::passing_content(1))
                .with_repeat("visual_plan", fixtures::passing_visual_plan(1))
                .with_repeat("code", SCENE_CODE)
                .with_error("code_skeleton", LlmError::ProviderAuth("bad key".to_string())),
        );

        let err = orchestrator(backend.clone())
            .run(&request(1), &ProgressReporter::null())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Generation { ref stage, .. } if stage == "code_skeleton"));
        assert!(backend.calls_for("code").is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_content_surfaces_parse_error() {
        let backend = Arc::new(ScriptedBackend::new().with_repeat("content", "no json here"));
        let err = orchestrator(backend.clone())
            .run(&request(1), &ProgressReporter::null())
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Parse { ref stage, .. } if stage == "content"));
        assert_eq!(backend.calls_for("content").len(), 2);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_across_refinement() {
        let backend = Arc::new(passing_backend(12));
        backend.push_text("content", fixtures::thin_content());
        let (tx, mut rx) = mpsc::unbounded_channel();
        let progress = ProgressReporter::new(Arc::new(ChannelProgress::new(tx)));

        orchestrator(backend).run(&request(12), &progress).await.unwrap();

        let events: Vec<ProgressEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        let stages: Vec<_> = events.iter().map(|e| e.stage.as_str()).collect();
        assert_eq!(stages, vec!["content", "content", "visual_plan", "code"]);
        assert!(events.windows(2).all(|w| w[0].progress <= w[1].progress));
        assert_eq!(events.last().map(|e| e.progress), Some(CODE_PROGRESS));
    }

    #[tokio::test]
    async fn test_context_reaches_content_and_code_prompts() {
        let backend = Arc::new(passing_backend(1));
        let request = request(1).with_context("Previous conversation:\nuser: keep it visual");
        orchestrator(backend.clone())
            .run(&request, &ProgressReporter::null())
            .await
            .unwrap();

        assert!(backend.calls_for("content")[0].prompt.contains("keep it visual"));
        assert!(backend.calls_for("code")[0].prompt.contains("keep it visual"));
    }
}
