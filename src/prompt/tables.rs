//! Canned instruction and hint tables.
//!
//! Read-only reference data, built once and handed to the composer.
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::AppError;
use crate::operation::Operation;

/// Which canned instruction to use when an operation has several.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionSelection {
    First,
    Random,
}

impl FromStr for InstructionSelection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(InstructionSelection::First),
            "random" => Ok(InstructionSelection::Random),
            other => Err(AppError::Config(format!(
                "unknown prompt selection '{}', expected 'first' or 'random'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct OperationPrompts {
    pub instructions: Vec<String>,
    pub hints: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PromptTables {
    entries: HashMap<Operation, OperationPrompts>,
}

impl PromptTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry<I, H>(mut self, op: Operation, instructions: I, hints: H) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
        H: IntoIterator,
        H::Item: Into<String>,
    {
        self.entries.insert(
            op,
            OperationPrompts {
                instructions: instructions.into_iter().map(Into::into).collect(),
                hints: hints.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Instructions for `op`; empty when the operation has no entry.
    pub fn instructions(&self, op: Operation) -> &[String] {
        self.entries.get(&op).map(|e| e.instructions.as_slice()).unwrap_or(&[])
    }

    pub fn hints(&self, op: Operation) -> &[String] {
        self.entries.get(&op).map(|e| e.hints.as_slice()).unwrap_or(&[])
    }

    pub fn contains(&self, op: Operation) -> bool {
        !self.instructions(op).is_empty()
    }

    /// The service's built-in tables.
    pub fn builtin() -> Self {
        PromptTables::new()
            .with_entry(
                Operation::Generate,
                ["SYSTEM: Generate a high-quality image based on the appended user prompt. Maintain clarity, coherent lighting, clean composition, and omit all textual overlays or watermarks."],
                Vec::<String>::new(),
            )
            .with_entry(
                Operation::Edit,
                ["SYSTEM: Apply non-destructive visual transformations guided by the appended user prompt while preserving subject identity, proportions, and core composition. Avoid artifacts, over-saturation, or unintended style drift."],
                Vec::<String>::new(),
            )
            .with_entry(
                Operation::VirtualTryOn,
                ["SYSTEM: Perform realistic virtual try-on by blending the product image onto the person image. Maintain anatomical correctness, natural fabric behavior, consistent lighting, and seamless color integration. No distortions or added accessories."],
                Vec::<String>::new(),
            )
            .with_entry(
                Operation::CreateAds,
                ["SYSTEM: Produce professional advertisement imagery combining the model and product. Each generation should feel like a distinct ad concept while keeping the product clearly legible, composition balanced, and free of textual elements or logos."],
                ["lifestyle angle", "dramatic lighting", "portrait social feed style"],
            )
            .with_entry(
                Operation::MergeImages,
                ["SYSTEM: Merge all provided images into a single coherent output guided by the user prompt. Unify perspective, color temperature, exposure, and shadow logic; remove redundancies; avoid frames, borders, or extraneous artifacts."],
                Vec::<String>::new(),
            )
            .with_entry(
                Operation::GenerateScenes,
                ["SYSTEM: Generate extended or reinterpreted scene outputs derived from the uploaded image and optional user prompt. Preserve spatial coherence, plausible lighting, and material consistency while allowing creative environmental variation."],
                ["wide cinematic extension", "dawn atmosphere", "midday clarity"],
            )
            .with_entry(
                Operation::RestoreOldImage,
                ["SYSTEM: Restore the uploaded aged or damaged image. Remove scratches, noise, stains, and fading while preserving authentic detail, texture, and historical integrity. No stylistic modernization beyond faithful clarity recovery."],
                Vec::<String>::new(),
            )
    }
}
