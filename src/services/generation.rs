use crate::{
    core::{
        completion::CompletionRequest,
        planner::Planner,
        steps::PipelineStep,
    },
    error::{PlannerError, Result},
    schemas::validate_plan_for_request,
    services::{
        budget::recalculate_total_budget,
        fallback::synthesize_fallback,
        normalizer::normalize_response,
        prompt::{budget_variants, build_itinerary_prompt, select_variant, BudgetVariant, SYSTEM_INSTRUCTION},
    },
    types::{
        itinerary::ItineraryPlan,
        result::{GenerationResult, PlanSource, PlanVariant, PlanVariants},
        trip::TripRequest,
    },
};
use std::time::Instant;
use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const LOG_TARGET: &str = "trip_planner::pipeline";

/// Internal state of one generation run
enum PipelineState {
    Attempting,
    Validating(String),
    Retrying(PlannerError),
    Succeeded(ItineraryPlan),
    Exhausted(PlannerError),
    Cancelled,
}

/// Bookkeeping carried across states
struct RunState<'a> {
    request: &'a TripRequest,
    variant: &'static BudgetVariant,
    started: Instant,
    attempt: usize,
    temperature: f64,
    steps: Vec<PipelineStep>,
}

impl RunState<'_> {
    fn finish(self, plan: ItineraryPlan, source: PlanSource) -> GenerationResult {
        GenerationResult {
            plan,
            source,
            variant: self.variant.name.to_string(),
            attempts: self.attempt,
            final_temperature: self.temperature,
            steps: self.steps,
            duration: self.started.elapsed(),
        }
    }

    fn fallback(self) -> GenerationResult {
        let plan = synthesize_fallback(self.request);
        self.finish(plan, PlanSource::Fallback)
    }
}

impl Planner {
    /// Generate a plan for the first variant of the request's budget level.
    pub async fn generate(&self, request: &TripRequest) -> Result<GenerationResult> {
        self.generate_variant(request, None).await
    }

    /// Generate a plan for a named budget variant; unknown names use the level's first variant.
    pub async fn generate_variant(
        &self,
        request: &TripRequest,
        variant: Option<&str>,
    ) -> Result<GenerationResult> {
        self.generate_with_cancel(request, variant, &CancellationToken::new())
            .await
    }

    /// Run the attempt/validate/retry state machine.
    ///
    /// Returns `Err` only for an invalid request or a configuration problem.
    /// Every other failure ends in the synthesized fallback plan, including
    /// cancellation through `cancel`.
    pub async fn generate_with_cancel(
        &self,
        request: &TripRequest,
        variant: Option<&str>,
        cancel: &CancellationToken,
    ) -> Result<GenerationResult> {
        request.validate()?;
        let config = self.config();
        config.validate()?;

        let variant = select_variant(request.budget, variant);
        let prompt = build_itinerary_prompt(request, variant);
        let deadline = Instant::now() + config.total_timeout;

        let mut run = RunState {
            request,
            variant,
            started: Instant::now(),
            attempt: 1,
            temperature: config.temperature_for_attempt(1),
            steps: Vec::new(),
        };
        let mut state = PipelineState::Attempting;

        info!(
            target: LOG_TARGET,
            title = %request.title,
            budget = request.budget.as_str(),
            variant = variant.name,
            days = request.total_days(),
            "starting itinerary generation"
        );

        loop {
            state = match state {
                PipelineState::Attempting => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        PipelineState::Exhausted(PlannerError::CompletionTimeout(
                            "overall deadline elapsed before the attempt started".to_string(),
                        ))
                    } else {
                        let attempt_timeout = config.attempt_timeout.min(remaining);
                        run.steps.push(PipelineStep::Attempting {
                            attempt: run.attempt,
                            temperature: run.temperature,
                        });
                        debug!(
                            target: LOG_TARGET,
                            attempt = run.attempt,
                            temperature = run.temperature,
                            timeout_ms = attempt_timeout.as_millis() as u64,
                            "requesting completion"
                        );

                        let completion = CompletionRequest {
                            system: SYSTEM_INSTRUCTION.to_string(),
                            prompt: prompt.clone(),
                            model: config.model.clone(),
                            temperature: run.temperature,
                            max_tokens: config.max_tokens,
                            json_mode: config.json_mode,
                        };

                        let outcome = tokio::select! {
                            biased;
                            _ = cancel.cancelled() => None,
                            outcome = timeout(attempt_timeout, self.backend().complete(&completion)) => Some(outcome),
                        };

                        match outcome {
                            None => PipelineState::Cancelled,
                            Some(Err(_elapsed)) => {
                                PipelineState::Retrying(PlannerError::CompletionTimeout(format!(
                                    "no response within {}ms",
                                    attempt_timeout.as_millis()
                                )))
                            }
                            Some(Ok(Err(PlannerError::Config(message)))) => {
                                return Err(PlannerError::Config(message));
                            }
                            Some(Ok(Err(err))) => PipelineState::Retrying(err),
                            Some(Ok(Ok(raw))) => {
                                let normalized = normalize_response(&raw);
                                if normalized.is_empty() {
                                    PipelineState::Retrying(PlannerError::Completion(
                                        "model returned an empty response".to_string(),
                                    ))
                                } else {
                                    PipelineState::Validating(normalized)
                                }
                            }
                        }
                    }
                }
                PipelineState::Validating(normalized) => {
                    run.steps.push(PipelineStep::Validating {
                        attempt: run.attempt,
                        chars: normalized.chars().count(),
                    });

                    match validate_plan_for_request(&normalized, config.validation, request) {
                        Ok(plan) => PipelineState::Succeeded(plan),
                        Err(err) => PipelineState::Retrying(err),
                    }
                }
                PipelineState::Retrying(err) => {
                    warn!(
                        target: LOG_TARGET,
                        attempt = run.attempt,
                        error_code = err.error_code(),
                        error = %err,
                        "attempt rejected"
                    );

                    let backoff = config.backoff_before(run.attempt + 1);
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if run.attempt >= config.max_attempts || remaining <= backoff {
                        PipelineState::Exhausted(err)
                    } else {
                        run.steps.push(PipelineStep::Retrying {
                            attempt: run.attempt,
                            error_code: err.error_code().to_string(),
                            reason: err.to_string(),
                        });

                        let cancelled = tokio::select! {
                            biased;
                            _ = cancel.cancelled() => true,
                            _ = sleep(backoff) => false,
                        };

                        if cancelled {
                            PipelineState::Cancelled
                        } else {
                            run.attempt += 1;
                            run.temperature = config.temperature_for_attempt(run.attempt);
                            PipelineState::Attempting
                        }
                    }
                }
                PipelineState::Succeeded(mut plan) => {
                    let total = recalculate_total_budget(&mut plan);

                    run.steps.push(PipelineStep::Succeeded {
                        attempt: run.attempt,
                        days: plan.day_count(),
                    });
                    info!(
                        target: LOG_TARGET,
                        attempt = run.attempt,
                        days = plan.day_count(),
                        total_budget = total,
                        "itinerary accepted"
                    );
                    return Ok(run.finish(plan, PlanSource::Generated));
                }
                PipelineState::Exhausted(err) => {
                    run.steps.push(PipelineStep::Exhausted {
                        attempts: run.attempt,
                        error_code: Some(err.error_code().to_string()),
                        reason: err.to_string(),
                    });
                    warn!(
                        target: LOG_TARGET,
                        attempts = run.attempt,
                        error_code = err.error_code(),
                        "attempts exhausted, using fallback itinerary"
                    );
                    return Ok(run.fallback());
                }
                PipelineState::Cancelled => {
                    run.steps.push(PipelineStep::Cancelled {
                        attempt: run.attempt,
                    });
                    info!(
                        target: LOG_TARGET,
                        attempt = run.attempt,
                        "generation cancelled, using fallback itinerary"
                    );
                    return Ok(run.fallback());
                }
            };
        }
    }

    /// Generate one plan per variant of the request's budget level, one after another.
    pub async fn generate_all_variants(
        &self,
        request: &TripRequest,
        cancel: &CancellationToken,
    ) -> Result<PlanVariants> {
        let mut variants = Vec::new();

        for variant in budget_variants(request.budget) {
            let result = self
                .generate_with_cancel(request, Some(variant.name), cancel)
                .await?;
            debug!(
                target: LOG_TARGET,
                variant = variant.name,
                fallback = result.is_fallback(),
                "variant finished"
            );
            variants.push(PlanVariant {
                name: result.variant,
                plan: result.plan,
            });
        }

        Ok(PlanVariants { variants })
    }
}
