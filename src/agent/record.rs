use crate::api::AgentPatch;

/// Number of suggested prompt slots every agent carries.
pub const PROMPT_SLOTS: usize = 3;

/// Embeddings states meaning documents are still being indexed.
const PROCESSING_STATES: [&str; 2] = ["I", "A"];

/// Exactly three prompt slots; empty strings mark unused slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestedPrompts([String; PROMPT_SLOTS]);

impl SuggestedPrompts {
    /// Pads or truncates `prompts` to the slot count.
    pub fn from_list<S: AsRef<str>>(prompts: &[S]) -> Self {
        let mut slots: [String; PROMPT_SLOTS] = Default::default();
        for (slot, prompt) in slots.iter_mut().zip(prompts) {
            *slot = prompt.as_ref().to_string();
        }
        Self(slots)
    }

    pub fn slots(&self) -> &[String; PROMPT_SLOTS] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Writes `value` into slot `index`, then drops blank slots from `index`
    /// onward so the remaining prompts close the gap.
    ///
    /// Returns false and leaves the prompts untouched for an out-of-range index.
    pub fn set(&mut self, index: usize, value: &str) -> bool {
        if index >= PROMPT_SLOTS {
            return false;
        }
        let mut updated = self.0.clone();
        updated[index] = value.to_string();
        let kept: Vec<String> = updated
            .into_iter()
            .enumerate()
            .filter(|(i, prompt)| *i < index || !prompt.trim().is_empty())
            .map(|(_, prompt)| prompt)
            .collect();
        *self = Self::from_list(&kept);
        true
    }

    /// Trimmed, non-empty prompts in slot order, as sent to the backend.
    pub fn submitted(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|prompt| prompt.trim())
            .filter(|prompt| !prompt.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// One agent as the console knows it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AgentRecord {
    pub name: String,
    pub instructions: String,
    pub welcome_message: String,
    pub suggested_prompts: SuggestedPrompts,
    pub files: Vec<String>,
    pub status: Option<String>,
    pub embeddings_status: Option<String>,
}

impl AgentRecord {
    pub fn from_patch(patch: AgentPatch) -> Self {
        let mut record = Self::default();
        record.apply(patch);
        record
    }

    /// Merges every field present in `patch`. Duplicate file names collapse
    /// to their first occurrence.
    pub fn apply(&mut self, patch: AgentPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(instructions) = patch.instructions {
            self.instructions = instructions;
        }
        if let Some(welcome_message) = patch.welcome_message {
            self.welcome_message = welcome_message;
        }
        if let Some(prompts) = patch.suggested_prompts {
            self.suggested_prompts = SuggestedPrompts::from_list(&prompts);
        }
        if let Some(files) = patch.files {
            self.files.clear();
            for file in files {
                if !self.files.contains(&file) {
                    self.files.push(file);
                }
            }
        }
        if patch.status.is_some() {
            self.status = patch.status;
        }
        if patch.embeddings_status.is_some() {
            self.embeddings_status = patch.embeddings_status;
        }
    }

    /// True while the backend is still indexing this agent's documents.
    pub fn is_processing(&self) -> bool {
        is_processing(self.embeddings_status.as_deref())
    }
}

pub fn is_processing(embeddings_status: Option<&str>) -> bool {
    embeddings_status.is_some_and(|status| PROCESSING_STATES.contains(&status))
}

/// Keeps only the characters allowed in agent names, lowercasing letters.
pub fn sanitize_name(input: &str) -> String {
    input
        .chars()
        .map(|ch| ch.to_ascii_lowercase())
        .filter(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || *ch == '-')
        .collect()
}

pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompts(values: [&str; 3]) -> SuggestedPrompts {
        SuggestedPrompts::from_list(&values)
    }

    #[test]
    fn lists_are_padded_and_truncated() {
        assert_eq!(SuggestedPrompts::from_list(&["a"]), prompts(["a", "", ""]));
        assert_eq!(
            SuggestedPrompts::from_list(&["a", "b", "c", "d"]),
            prompts(["a", "b", "c"])
        );
    }

    #[test]
    fn clearing_a_slot_pulls_later_prompts_forward() {
        let mut p = prompts(["a", "b", "c"]);
        assert!(p.set(0, ""));
        assert_eq!(p, prompts(["b", "c", ""]));
    }

    #[test]
    fn earlier_blank_slots_are_kept() {
        let mut p = prompts(["", "", ""]);
        assert!(p.set(2, "third"));
        assert_eq!(p, prompts(["", "", "third"]));
        assert!(p.set(1, "second"));
        assert_eq!(p, prompts(["", "second", "third"]));
    }

    #[test]
    fn whitespace_counts_as_blank() {
        let mut p = prompts(["a", "b", "c"]);
        p.set(1, "   ");
        assert_eq!(p, prompts(["a", "c", ""]));
    }

    #[test]
    fn out_of_range_slot_is_rejected() {
        let mut p = prompts(["a", "b", "c"]);
        assert!(!p.set(3, "x"));
        assert_eq!(p, prompts(["a", "b", "c"]));
    }

    #[test]
    fn every_edit_keeps_three_slots() {
        let mut p = SuggestedPrompts::default();
        for (i, value) in ["x", "", "y", " ", "z", ""].iter().enumerate() {
            p.set(i % 3, value);
            assert_eq!(p.slots().len(), PROMPT_SLOTS);
        }
    }

    #[test]
    fn submitted_prompts_skip_blanks() {
        assert_eq!(prompts([" a ", "", "c"]).submitted(), vec!["a", "c"]);
    }

    #[test]
    fn create_response_only_sets_the_name() {
        let mut record = AgentRecord {
            instructions: String::from("be nice"),
            ..AgentRecord::default()
        };
        record.apply(AgentPatch {
            name: Some(String::from("support-bot")),
            ..AgentPatch::default()
        });
        assert_eq!(record.name, "support-bot");
        assert_eq!(record.instructions, "be nice");
    }

    #[test]
    fn file_listing_replaces_and_dedupes() {
        let mut record = AgentRecord {
            files: vec![String::from("old.pdf")],
            ..AgentRecord::default()
        };
        record.apply(AgentPatch {
            files: Some(vec![
                String::from("a.pdf"),
                String::from("b.txt"),
                String::from("a.pdf"),
            ]),
            embeddings_status: Some(String::from("I")),
            ..AgentPatch::default()
        });
        assert_eq!(record.files, vec!["a.pdf", "b.txt"]);
        assert!(record.is_processing());
    }

    #[test]
    fn processing_states() {
        assert!(is_processing(Some("A")));
        assert!(is_processing(Some("I")));
        assert!(!is_processing(Some("C")));
        assert!(!is_processing(None));
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_name("Support Bot_2!"), "supportbot2");
        assert_eq!(sanitize_name("my-agent"), "my-agent");
        assert!(is_valid_name("support-bot"));
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("Support"));
    }
}
