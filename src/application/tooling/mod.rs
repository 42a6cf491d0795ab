//! Tool-provider side of the loop: the MCP stdio transport, the per-session
//! tool catalogue and the dispatcher that calls into it.

pub mod dispatcher;
pub mod error;
pub mod interface;
pub mod process;
pub mod registry;

pub use dispatcher::{ToolDispatcher, canonicalize};
pub use error::{ToolError, ToolInvokeError};
pub use interface::{ServerToolInfo, ToolProvider};
pub use process::McpProcess;
pub use registry::ToolRegistry;
