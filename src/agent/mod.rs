//! Agent records and the screens that manage them.

/// `record`: the typed agent snapshot, prompt slots and name rules.
pub mod record;

/// `staging`: document additions and deletions collected before a save.
pub mod staging;

/// `editor`: the view/edit workflow for one agent.
pub mod editor;

/// `list`: the agent overview, including deletion.
pub mod list;

pub use editor::{AgentEditor, CancelOutcome, EditorError, Facet, InfoField, Mode, SaveOutcome, Tab};
pub use list::AgentList;
pub use record::{AgentRecord, SuggestedPrompts};
pub use staging::{FileStaging, StageReport};
