//! Tool handlers.
//!
//! Every tool implements [`TypedTool`] with its own argument struct. The
//! blanket [`ToolHandler`] impl decodes the untyped argument bag into that
//! struct once, at the boundary, so handlers only ever see typed input.

mod comments;
mod demographics;
mod followers;
mod leads;
mod report;

pub use comments::{AnalyzePostComments, AnalyzePostCommentsArgs};
pub use demographics::{ExtractDemographics, ExtractDemographicsArgs};
pub use followers::{FetchFollowers, FetchFollowersArgs};
pub use leads::{IdentifyLeads, IdentifyLeadsArgs};
pub use report::{SendDms, SendDmsArgs};

use crate::analytics::{AnalyticsProvider, AnalyticsResult};
use crate::catalog::{ToolKind, MAX_BATCH};
use crate::session::AuthError;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// Untyped argument bag as received from the protocol.
pub type JsonObject = Map<String, Value>;

/// Outcome of one tool invocation: a JSON payload or a failure.
pub type ToolResult = Result<Value, ToolError>;

/// Default bound on a single analytics provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Per-call failures. Only [`ToolError::UnknownTool`] is a protocol-level
/// error; everything else is reported as tool content with the error flag set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ToolError {
    #[error("Authentication failed: {0}")]
    Authentication(#[from] AuthError),
    #[error("unknown tool: {0}")]
    UnknownTool(String),
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("Invalid account usernames: {}", .0.join(", "))]
    InvalidAccounts(Vec<String>),
    #[error("Invalid date for {field}: '{value}' (expected YYYY-MM-DD)")]
    InvalidDate { field: &'static str, value: String },
    #[error("Analytics request failed: {0}")]
    Upstream(String),
}

impl ToolError {
    pub fn is_protocol_error(&self) -> bool {
        matches!(self, ToolError::UnknownTool(_))
    }

    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ToolError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Object-safe capability shared by every handler.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn call(&self, args: JsonObject) -> ToolResult;
}

/// A handler with a strongly typed argument struct.
#[async_trait]
pub trait TypedTool: Send + Sync {
    /// Decoded from the call arguments; its schema is the tool's input schema.
    type Args: DeserializeOwned + JsonSchema + Send;

    async fn run(&self, args: Self::Args) -> ToolResult;
}

#[async_trait]
impl<T: TypedTool> ToolHandler for T {
    async fn call(&self, args: JsonObject) -> ToolResult {
        let typed: T::Args = serde_json::from_value(Value::Object(args))
            .map_err(|e| ToolError::InvalidArguments(e.to_string()))?;
        self.run(typed).await
    }
}

/// What every handler needs: the analytics backend and its time budget.
#[derive(Clone)]
pub struct HandlerContext {
    pub analytics: Arc<dyn AnalyticsProvider>,
    pub provider_timeout: Duration,
}

impl HandlerContext {
    pub fn new(analytics: Arc<dyn AnalyticsProvider>) -> Self {
        Self {
            analytics,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
        }
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Await a provider call within the time budget.
    pub(crate) async fn provider<T>(
        &self,
        call: impl std::future::Future<Output = AnalyticsResult<T>> + Send,
    ) -> Result<T, ToolError> {
        match tokio::time::timeout(self.provider_timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(ToolError::Upstream(e.to_string())),
            Err(_) => Err(ToolError::Upstream(format!(
                "analytics request timed out after {:?}",
                self.provider_timeout
            ))),
        }
    }
}

/// Build the handler for a tool kind.
pub fn handler_for(kind: ToolKind, ctx: &HandlerContext) -> Arc<dyn ToolHandler> {
    match kind {
        ToolKind::AnalyzePostComments => Arc::new(AnalyzePostComments::new(ctx.clone())),
        ToolKind::FetchFollowers => Arc::new(FetchFollowers::new(ctx.clone())),
        ToolKind::ExtractDemographics => Arc::new(ExtractDemographics::new(ctx.clone())),
        ToolKind::IdentifyLeads => Arc::new(IdentifyLeads::new(ctx.clone())),
        ToolKind::SendDms => Arc::new(SendDms::new(ctx.clone())),
    }
}

/// Reject blank required strings, returning the trimmed value.
pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<String, ToolError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ToolError::validation(field, "must not be empty"))
    } else {
        Ok(trimmed.to_string())
    }
}

/// Check a batch size parameter is within `1..=MAX_BATCH`.
pub(crate) fn check_batch(field: &'static str, value: u32) -> Result<(), ToolError> {
    if value == 0 || value > MAX_BATCH {
        return Err(ToolError::validation(
            field,
            format!("must be between 1 and {}, got {}", MAX_BATCH, value),
        ));
    }
    Ok(())
}
