//! Shared execution path for every operation.
//!
//! One generic single-shot path and one generic batch path, both driven by
//! the operation's `InputSchema`: validate, compose, call, shape.
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::OperationError;
use crate::gemini::{GeneratedImage, GenerationRequest, ImageGenerator};
use crate::operation::Operation;
use crate::prompt::composer::PromptComposer;
use crate::utils::encode::EncodedAsset;
use crate::variants::{BatchOutcome, VariantOrchestrator, VariantPlan};

/// Already-parsed inputs for one operation call.
#[derive(Debug, Clone, Default)]
pub struct OperationInput {
    pub api_key: Option<String>,
    pub prompt: Option<String>,
    pub variations: Option<i64>,
    /// Uploaded assets keyed by form field name, in upload order.
    pub files: HashMap<String, Vec<EncodedAsset>>,
}

impl OperationInput {
    pub fn new(api_key: impl Into<String>) -> Self {
        OperationInput { api_key: Some(api_key.into()), ..Default::default() }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_variations(mut self, variations: i64) -> Self {
        self.variations = Some(variations);
        self
    }

    pub fn add_file(&mut self, field: impl Into<String>, asset: EncodedAsset) {
        self.files.entry(field.into()).or_default().push(asset);
    }

    pub fn with_file(mut self, field: impl Into<String>, asset: EncodedAsset) -> Self {
        self.add_file(field, asset);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutput {
    Single(GeneratedImage),
    Batch(BatchOutcome),
}

#[derive(Clone)]
pub struct ImageService {
    generator: Arc<dyn ImageGenerator>,
    composer: Arc<PromptComposer>,
    max_merge_files: usize,
}

impl ImageService {
    pub fn new(generator: Arc<dyn ImageGenerator>, composer: PromptComposer, max_merge_files: usize) -> Self {
        ImageService { generator, composer: Arc::new(composer), max_merge_files }
    }

    pub async fn run(&self, op: Operation, mut input: OperationInput) -> Result<OperationOutput, OperationError> {
        let schema = op.schema();

        let api_key = non_blank(input.api_key.take()).ok_or(OperationError::MissingApiKey)?;
        let prompt = non_blank(input.prompt.take());
        if schema.prompt_required && prompt.is_none() {
            return Err(OperationError::MissingPrompt);
        }
        let images = self.collect_images(op, &mut input)?;
        if !self.composer.supports(op) {
            return Err(OperationError::Unsupported(op.key().to_string()));
        }

        match schema.batch {
            Some(mode) => {
                let plan = VariantPlan::for_mode(mode, input.variations);
                let outcome = VariantOrchestrator::new(self.generator.as_ref(), &self.composer)
                    .generate_batch(&api_key, op, prompt.as_deref(), &images, plan)
                    .await;
                Ok(OperationOutput::Batch(outcome))
            }
            None => {
                let request = GenerationRequest {
                    api_key,
                    prompt: self.composer.compose(op, prompt.as_deref(), None),
                    images,
                };
                let image = self.generator.generate(request).await?;
                Ok(OperationOutput::Single(image))
            }
        }
    }

    /// Required single-file fields first, in schema order, then the capped
    /// repeated field.
    fn collect_images(&self, op: Operation, input: &mut OperationInput) -> Result<Vec<EncodedAsset>, OperationError> {
        let schema = op.schema();
        let mut images = Vec::new();
        for &field in schema.file_fields {
            let asset = input
                .files
                .get_mut(field)
                .filter(|assets| !assets.is_empty())
                .map(|assets| assets.remove(0))
                .ok_or(OperationError::MissingFile(field))?;
            images.push(asset);
        }
        if let Some(field) = schema.multi_file_field {
            let assets = input.files.remove(field).unwrap_or_default();
            if assets.is_empty() {
                return Err(OperationError::MissingFile(field));
            }
            if assets.len() > self.max_merge_files {
                tracing::info!(
                    operation = %op,
                    received = assets.len(),
                    kept = self.max_merge_files,
                    "Dropping uploads beyond the file limit"
                );
            }
            images.extend(assets.into_iter().take(self.max_merge_files));
        }
        Ok(images)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
