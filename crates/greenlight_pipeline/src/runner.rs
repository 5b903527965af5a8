//! One stage of generation work, end to end.

use crate::merge::{mark_stage_done, merge_payload};
use crate::stage::StageId;
use crate::validate::validate;
use chrono::Utc;
use greenlight_core::GenerateResponse;
use greenlight_error::{ModelError, ModelErrorKind};
use greenlight_interface::{GenerationRecord, ModelDriver};
use greenlight_models::{CallParams, FallbackChain};
use greenlight_parse::recover_response;
use serde_json::Value as JsonValue;
use std::sync::Arc;
use tracing::{info, instrument};

const STAGE_MAX_TOKENS: u32 = 4096;
const STAGE_TEMPERATURE: f32 = 0.7;

/// The persisted effect of one completed stage.
#[derive(Debug)]
pub struct StageOutput {
    /// Payload after the additive merge
    pub payload: JsonValue,
    /// Completion ledger with this stage marked done
    pub completion_map: JsonValue,
    /// The stage's declared progress end value
    pub progress: i32,
    /// Whether the accepted parse needed a repair strategy
    pub degraded: bool,
    /// The model whose response was accepted
    pub model: String,
}

/// Runs one stage: prompt, fallback chain, recovery parse, structural
/// validation, merge.
///
/// This is the first layer allowed to fail loudly; everything below it
/// (parser, chain) absorbs its own failures.
pub struct StageRunner {
    driver: Arc<dyn ModelDriver>,
    chain: FallbackChain,
}

impl StageRunner {
    /// Pair an injected driver with a fallback chain.
    pub fn new(driver: Arc<dyn ModelDriver>, chain: FallbackChain) -> Self {
        Self { driver, chain }
    }

    /// Execute `stage` against the record's current payload.
    ///
    /// A parse or validation rejection advances the chain to its next model
    /// instead of failing the stage outright, surfacing as `PARSE_ERROR` or
    /// `VALIDATION_ERROR` only once every model has been rejected. The record
    /// itself is not written here; the orchestrator persists the returned
    /// output.
    #[instrument(skip(self, record), fields(record_id = %record.id, stage = %stage))]
    pub async fn run_stage(
        &self,
        record: &GenerationRecord,
        stage: StageId,
    ) -> Result<StageOutput, ModelError> {
        let params = CallParams {
            system: Some(stage.system_prompt().to_string()),
            user: stage.user_prompt(&record.payload, record.source_text.as_deref()),
            max_tokens: Some(STAGE_MAX_TOKENS),
            temperature: Some(STAGE_TEMPERATURE),
            tools: stage.tool_definition().map(|tool| vec![tool]),
            tool_choice: stage.tool_name().map(str::to_string),
        };

        let success = self
            .chain
            .run(self.driver.as_ref(), &params, |model, response| {
                accept_stage_response(stage, model, response)
            })
            .await?;

        let (value, degraded) = success.value;
        info!(
            model = %success.model,
            degraded,
            failed_attempts = success.failures.len(),
            "stage accepted a recovered value"
        );

        Ok(StageOutput {
            payload: merge_payload(&record.payload, &value),
            completion_map: mark_stage_done(&record.stage_completion_map, stage.as_str(), Utc::now()),
            progress: stage.progress_end(),
            degraded,
            model: success.model,
        })
    }
}

/// Parse and structurally validate one model response for a stage.
fn accept_stage_response(
    stage: StageId,
    model: &str,
    response: GenerateResponse,
) -> Result<(JsonValue, bool), ModelError> {
    let outcome = recover_response(&response, stage.tool_name(), stage.as_str());

    let Some(value) = outcome.value else {
        return Err(ModelError::new(ModelErrorKind::ParseFailed {
            model: model.to_string(),
            message: format!(
                "unrecoverable output [{}]: {}",
                outcome.fingerprint,
                outcome.warnings.join("; ")
            ),
        }));
    };

    if let Err(problems) = validate(stage, &value) {
        return Err(ModelError::new(ModelErrorKind::ValidationFailed {
            model: model.to_string(),
            message: problems.join("; "),
        }));
    }

    Ok((value, outcome.degraded))
}
