//! Consumer-facing hook surface: `beforeAgentStart`,
//! `beforeToolCall`, `toolResultPersist`. Each hook fails open — an
//! unhandled panic inside a handler is caught, logged at error level, and
//! the no-op allow/empty result is returned. This is the workspace's only
//! non-negotiable reliability contract.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod hooks;
pub mod session;
pub mod types;

pub use hooks::Host;
pub use session::SeenSessions;
pub use types::{
    BeforeAgentStartContext, BeforeAgentStartResult, BeforeToolCallContext, BeforeToolCallMetadata,
    BeforeToolCallResult, PersistedMessage, ToolResultPersistContext, ToolResultPersistResult,
};
