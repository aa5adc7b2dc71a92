//! The catalogue of supported operations and their input schemas.
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Generate,
    Edit,
    VirtualTryOn,
    CreateAds,
    MergeImages,
    GenerateScenes,
    RestoreOldImage,
}

/// How many variants a batch operation produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchMode {
    /// Caller may request 1..=3 variants, clamped; defaults to 3.
    Requested,
    /// Always produce the given count; any requested value is ignored.
    Fixed(i64),
}

/// Required and optional inputs for one operation.
#[derive(Debug, Clone, Copy)]
pub struct InputSchema {
    pub prompt_required: bool,
    /// Single-file fields, in the order their images are sent upstream.
    pub file_fields: &'static [&'static str],
    /// A repeated file field accepting at least one upload.
    pub multi_file_field: Option<&'static str>,
    pub batch: Option<BatchMode>,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Generate,
        Operation::Edit,
        Operation::VirtualTryOn,
        Operation::CreateAds,
        Operation::MergeImages,
        Operation::GenerateScenes,
        Operation::RestoreOldImage,
    ];

    /// Stable key used by the prompt tables.
    pub fn key(self) -> &'static str {
        match self {
            Operation::Generate => "generate_image",
            Operation::Edit => "edit_image",
            Operation::VirtualTryOn => "virtual_try_on",
            Operation::CreateAds => "create_ads",
            Operation::MergeImages => "merge_images",
            Operation::GenerateScenes => "generate_scenes",
            Operation::RestoreOldImage => "restore_old_image",
        }
    }

    pub fn route(self) -> &'static str {
        match self {
            Operation::Generate => "/generate",
            Operation::Edit => "/edit",
            Operation::VirtualTryOn => "/virtual_try_on",
            Operation::CreateAds => "/create_ads",
            Operation::MergeImages => "/merge_images",
            Operation::GenerateScenes => "/generate_scenes",
            Operation::RestoreOldImage => "/restore_old_image",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Operation::Generate => "Generate images from text",
            Operation::Edit => "Edit existing images",
            Operation::VirtualTryOn => "Virtual try-on",
            Operation::CreateAds => "Create advertisements",
            Operation::MergeImages => "Merge multiple images",
            Operation::GenerateScenes => "Generate scene variations",
            Operation::RestoreOldImage => "Restore old images",
        }
    }

    pub fn schema(self) -> InputSchema {
        let single = |prompt_required: bool, file_fields: &'static [&'static str]| InputSchema {
            prompt_required,
            file_fields,
            multi_file_field: None,
            batch: None,
        };
        match self {
            Operation::Generate => single(true, &[]),
            Operation::Edit => single(true, &["file"]),
            Operation::VirtualTryOn => single(false, &["product", "person"]),
            Operation::RestoreOldImage => single(false, &["file"]),
            Operation::MergeImages => InputSchema {
                prompt_required: false,
                file_fields: &[],
                multi_file_field: Some("files"),
                batch: None,
            },
            Operation::CreateAds => InputSchema {
                prompt_required: false,
                file_fields: &["model", "product"],
                multi_file_field: None,
                batch: Some(BatchMode::Requested),
            },
            Operation::GenerateScenes => InputSchema {
                prompt_required: false,
                file_fields: &["scene"],
                multi_file_field: None,
                batch: Some(BatchMode::Fixed(3)),
            },
        }
    }

    pub fn is_batch(self) -> bool {
        self.schema().batch.is_some()
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Operation {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().trim_start_matches('/');
        Operation::ALL
            .into_iter()
            .find(|op| op.key() == wanted || op.route().trim_start_matches('/') == wanted)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown operation: {}", s)))
    }
}
