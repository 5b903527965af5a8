//! Ordered fallback across models with per-attempt deadlines.

use greenlight_core::{ChatMessage, GenerateRequest, GenerateResponse, ToolDefinition};
use greenlight_error::{ErrorCode, ModelError, ModelErrorKind};
use greenlight_interface::ModelDriver;
use std::time::Duration;
use tracing::{info, warn};

/// One entry in a fallback chain: a model name and its call deadline.
#[derive(Debug, Clone)]
pub struct ModelAttempt {
    /// Provider-side model identifier.
    pub model: String,
    /// Hard deadline for this attempt.
    pub timeout: Duration,
}

impl ModelAttempt {
    /// Pair a model with its deadline.
    pub fn new(model: impl Into<String>, timeout: Duration) -> Self {
        Self {
            model: model.into(),
            timeout,
        }
    }
}

/// Everything about a call except which model runs it.
///
/// The chain stamps each attempt's model name into the request, so one set
/// of params drives every model in the ladder.
#[derive(Debug, Clone, Default)]
pub struct CallParams {
    /// System instruction, if any.
    pub system: Option<String>,
    /// The user prompt.
    pub user: String,
    /// Output token budget.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Tools offered to the model.
    pub tools: Option<Vec<ToolDefinition>>,
    /// Tool selection: `"auto"` or a tool name.
    pub tool_choice: Option<String>,
}

impl CallParams {
    fn to_request(&self, model: &str) -> Result<GenerateRequest, ModelError> {
        let mut messages = Vec::new();
        if let Some(system) = &self.system {
            messages.push(ChatMessage::system(system));
        }
        messages.push(ChatMessage::user(&self.user));

        GenerateRequest::builder()
            .model(model.to_string())
            .messages(messages)
            .max_tokens(self.max_tokens)
            .temperature(self.temperature)
            .tools(self.tools.clone())
            .tool_choice(self.tool_choice.clone())
            .build()
            .map_err(|e| ModelError::new(ModelErrorKind::RequestBuild(e.to_string())))
    }
}

/// What went wrong on one exhausted attempt.
#[derive(Debug, Clone)]
pub struct AttemptRecord {
    /// The model that failed.
    pub model: String,
    /// Failure classification.
    pub code: ErrorCode,
    /// Wall time spent on the attempt.
    pub elapsed_ms: u64,
}

/// A successful chain run plus the trail of failed attempts before it.
#[derive(Debug)]
pub struct ChainSuccess<T> {
    /// The accepted value.
    pub value: T,
    /// The model that produced it.
    pub model: String,
    /// Attempts that failed before this one succeeded.
    pub failures: Vec<AttemptRecord>,
}

/// An ordered list of model attempts consumed front to back.
#[derive(Debug, Clone, Default)]
pub struct FallbackChain {
    attempts: Vec<ModelAttempt>,
}

impl FallbackChain {
    /// Build a chain from an ordered attempt list.
    pub fn new(attempts: Vec<ModelAttempt>) -> Self {
        Self { attempts }
    }

    /// The models in this chain, in attempt order.
    pub fn attempts(&self) -> &[ModelAttempt] {
        &self.attempts
    }

    /// Walk the chain until one attempt produces an accepted value.
    ///
    /// Each attempt invokes the driver under its own deadline, then passes
    /// the raw response through `accept`, which parses and validates it into
    /// the caller's value. A rejection from `accept` counts the same as a
    /// transport failure: the chain moves to the next model. Caller-level
    /// failures (rate limiting, quota exhaustion) abort the whole chain,
    /// since every remaining model would hit the same wall.
    pub async fn run<T, F>(
        &self,
        driver: &dyn ModelDriver,
        params: &CallParams,
        accept: F,
    ) -> Result<ChainSuccess<T>, ModelError>
    where
        F: Fn(&str, GenerateResponse) -> Result<T, ModelError>,
    {
        if self.attempts.is_empty() {
            return Err(ModelError::new(ModelErrorKind::EmptyChain));
        }

        let mut failures = Vec::new();
        let mut last_err = None;

        for attempt in &self.attempts {
            let req = params.to_request(&attempt.model)?;
            let started = tokio::time::Instant::now();

            let result = crate::invoke(driver, &req, attempt.timeout)
                .await
                .and_then(|response| accept(&attempt.model, response));

            match result {
                Ok(value) => {
                    info!(
                        model = %attempt.model,
                        failures = failures.len(),
                        "fallback chain accepted a response"
                    );
                    return Ok(ChainSuccess {
                        value,
                        model: attempt.model.clone(),
                        failures,
                    });
                }
                Err(err) if err.is_chain_fatal() => {
                    warn!(model = %attempt.model, code = %err.code(), "aborting fallback chain");
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        model = %attempt.model,
                        code = %err.code(),
                        "attempt failed, advancing to next model"
                    );
                    failures.push(AttemptRecord {
                        model: attempt.model.clone(),
                        code: err.code(),
                        elapsed_ms: started.elapsed().as_millis() as u64,
                    });
                    last_err = Some(err);
                }
            }
        }

        // attempts is non-empty, so at least one error was recorded
        Err(last_err.unwrap_or_else(|| ModelError::new(ModelErrorKind::EmptyChain)))
    }
}
