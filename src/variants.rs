//! Sequential fan-out of hinted prompts for the batch operations.
//!
//! Failed variants are dropped from `results`; the HTTP response only carries
//! successes. The reasons are kept in `failures` for logging.
use crate::gemini::{GeneratedImage, GenerationRequest, ImageGenerator};
use crate::operation::{BatchMode, Operation};
use crate::prompt::composer::PromptComposer;
use crate::utils::encode::EncodedAsset;

pub const MAX_VARIANTS: usize = 3;

/// How many upstream calls a batch makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantPlan {
    count: usize,
}

impl VariantPlan {
    /// Clamp a caller-supplied count into `1..=3`; `None` means 3.
    pub fn from_requested(requested: Option<i64>) -> Self {
        let count = requested
            .unwrap_or(MAX_VARIANTS as i64)
            .clamp(1, MAX_VARIANTS as i64) as usize;
        VariantPlan { count }
    }

    pub fn for_mode(mode: BatchMode, requested: Option<i64>) -> Self {
        match mode {
            BatchMode::Requested => Self::from_requested(requested),
            BatchMode::Fixed(n) => Self::from_requested(Some(n)),
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantFailure {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutcome {
    /// Successes in the order their variants were attempted.
    pub results: Vec<GeneratedImage>,
    pub failures: Vec<VariantFailure>,
}

pub struct VariantOrchestrator<'a> {
    generator: &'a dyn ImageGenerator,
    composer: &'a PromptComposer,
}

impl<'a> VariantOrchestrator<'a> {
    pub fn new(generator: &'a dyn ImageGenerator, composer: &'a PromptComposer) -> Self {
        VariantOrchestrator { generator, composer }
    }

    pub async fn generate_batch(
        &self,
        api_key: &str,
        op: Operation,
        user_text: Option<&str>,
        images: &[EncodedAsset],
        plan: VariantPlan,
    ) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        for index in 0..plan.count() {
            let request = GenerationRequest {
                api_key: api_key.to_string(),
                prompt: self.composer.compose(op, user_text, Some(index)),
                images: images.to_vec(),
            };
            match self.generator.generate(request).await {
                Ok(image) => outcome.results.push(image),
                Err(failure) => {
                    tracing::warn!(operation = %op, variant = index, reason = %failure, "Variant failed, skipping");
                    outcome.failures.push(VariantFailure { index, reason: failure.reason() });
                }
            }
        }
        tracing::info!(
            operation = %op,
            planned = plan.count(),
            succeeded = outcome.results.len(),
            "Batch finished"
        );
        outcome
    }
}
