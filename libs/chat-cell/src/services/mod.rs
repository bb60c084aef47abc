pub mod assistant;
pub mod conversation;
pub mod history;
pub mod triage;

pub use assistant::AssistantService;
pub use conversation::parse_contents;
pub use history::ChatHistoryService;
pub use triage::{severity_label, triage, TriageAccumulator};
