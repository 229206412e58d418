//! Tool system for the agent loop
//!
//! Tools are registered once in a `ToolRegistry` and dispatched by name when
//! the model asks for them. Handler failures are values: the loop turns them
//! into error payloads for the model instead of aborting.

mod confirm;
mod error;
mod registry;
mod traits;

pub mod builtin;

pub use confirm::{Confirm, ConfirmationPolicy, ConfirmationRequest, FixedConfirm, TerminalConfirm, is_affirmative};
pub use error::ToolError;
pub use registry::ToolRegistry;
pub use traits::{FnTool, HandlerFn, Tool};
