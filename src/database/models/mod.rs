pub mod tool;

pub use tool::{normalize_tags, NewTool, Tool, ToolChanges, ToolValidationError};
