//! Builds the text instruction sent alongside any images.
//!
//! Layout: `<instruction>[ Variation <n>: <hint>.][ User: <text>]`, trimmed.
use rand::Rng;

use crate::operation::Operation;
use crate::prompt::tables::{InstructionSelection, PromptTables};

#[derive(Debug, Clone)]
pub struct PromptComposer {
    tables: PromptTables,
    selection: InstructionSelection,
}

impl PromptComposer {
    pub fn new(tables: PromptTables, selection: InstructionSelection) -> Self {
        PromptComposer { tables, selection }
    }

    pub fn tables(&self) -> &PromptTables {
        &self.tables
    }

    /// Whether `op` has any canned instruction. Callers reject operations
    /// without one before composing.
    pub fn supports(&self, op: Operation) -> bool {
        self.tables.contains(op)
    }

    pub fn compose(&self, op: Operation, user_text: Option<&str>, variant: Option<usize>) -> String {
        let mut out = self.pick_instruction(op).unwrap_or_default().to_string();

        if let Some(index) = variant {
            let hints = self.tables.hints(op);
            if !hints.is_empty() {
                let hint = &hints[index % hints.len()];
                out.push_str(&format!(" Variation {}: {}.", index + 1, hint));
            }
        }

        if let Some(text) = user_text.map(str::trim).filter(|t| !t.is_empty()) {
            out.push_str(" User: ");
            out.push_str(text);
        }

        out.trim().to_string()
    }

    fn pick_instruction(&self, op: Operation) -> Option<&str> {
        let candidates = self.tables.instructions(op);
        let chosen = match self.selection {
            InstructionSelection::First => candidates.first(),
            InstructionSelection::Random if candidates.is_empty() => None,
            InstructionSelection::Random => {
                candidates.get(rand::thread_rng().gen_range(0..candidates.len()))
            }
        };
        chosen.map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> PromptComposer {
        PromptComposer::new(PromptTables::builtin(), InstructionSelection::First)
    }

    #[test]
    fn generate_starts_with_instruction_and_ends_with_user_text() {
        let c = composer();
        let system = &c.tables().instructions(Operation::Generate)[0];
        let prompt = c.compose(Operation::Generate, Some("  a red fox in snow \n"), None);
        assert!(prompt.starts_with(system.as_str()));
        assert!(prompt.ends_with("a red fox in snow"));
        assert_eq!(prompt, prompt.trim());
    }

    #[test]
    fn user_text_is_labelled() {
        let prompt = composer().compose(Operation::Edit, Some("make it blue"), None);
        assert!(prompt.ends_with(" User: make it blue"));
    }

    #[test]
    fn blank_user_text_is_omitted() {
        let c = composer();
        let bare = c.compose(Operation::RestoreOldImage, None, None);
        assert_eq!(c.compose(Operation::RestoreOldImage, Some("   "), None), bare);
        assert!(!bare.contains("User:"));
    }

    #[test]
    fn variant_hints_cycle_through_table() {
        let c = composer();
        let first = c.compose(Operation::CreateAds, None, Some(0));
        assert!(first.ends_with("Variation 1: lifestyle angle."));
        let third = c.compose(Operation::CreateAds, Some("summer"), Some(2));
        assert!(third.contains("Variation 3: portrait social feed style."));
        assert!(third.ends_with("User: summer"));
        let wrapped = c.compose(Operation::GenerateScenes, None, Some(4));
        assert!(wrapped.ends_with("Variation 5: dawn atmosphere."));
    }

    #[test]
    fn variant_on_operation_without_hints_adds_nothing() {
        let c = composer();
        assert_eq!(
            c.compose(Operation::Edit, Some("x"), Some(1)),
            c.compose(Operation::Edit, Some("x"), None)
        );
    }

    #[test]
    fn random_selection_stays_within_candidates() {
        let tables = PromptTables::new().with_entry(
            Operation::Generate,
            ["alpha", "beta", "gamma"],
            Vec::<String>::new(),
        );
        let c = PromptComposer::new(tables, InstructionSelection::Random);
        for _ in 0..20 {
            let p = c.compose(Operation::Generate, None, None);
            assert!(["alpha", "beta", "gamma"].contains(&p.as_str()));
        }
    }

    #[test]
    fn missing_operation_yields_only_user_text() {
        let c = PromptComposer::new(PromptTables::new(), InstructionSelection::First);
        assert!(!c.supports(Operation::Generate));
        assert_eq!(c.compose(Operation::Generate, Some("hi"), None), "User: hi");
    }
}
