//! Gramscope
//!
//! Instagram analytics tools exposed to AI assistants via the Model Context
//! Protocol. A single platform session is opened lazily on the first tool
//! call and shared by every call after it.

pub mod analytics;
pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod mcp;
pub mod platform;
pub mod session;
pub mod tools;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, ConfigError};
pub use dispatch::{Dispatcher, ToolInvocationRequest};
pub use mcp::GramscopeMcpServer;
pub use platform::{Credentials, InstagramClient, PlatformClient, PlatformError};
pub use session::{AuthError, SessionManager};
pub use tools::{HandlerContext, ToolError};
