//! Tool dispatch: authenticate, resolve the tool by name, run its handler.
//!
//! The name → handler map is built once from the catalog. The dispatcher
//! never rewrites a handler's payload; it only adds the failures that happen
//! before a handler runs (authentication, unknown tool).

use crate::catalog::{self, CatalogError, ToolDescriptor};
use crate::platform::PlatformClient;
use crate::session::SessionManager;
use crate::tools::{self, HandlerContext, JsonObject, ToolError, ToolHandler, ToolResult};
use std::collections::HashMap;
use std::sync::Arc;

/// One tool call as received from the caller.
#[derive(Debug, Clone)]
pub struct ToolInvocationRequest {
    pub tool_name: String,
    pub arguments: JsonObject,
}

impl ToolInvocationRequest {
    pub fn new(tool_name: impl Into<String>, arguments: JsonObject) -> Self {
        Self {
            tool_name: tool_name.into(),
            arguments,
        }
    }
}

/// Routes invocations to handlers behind an authenticated session.
pub struct Dispatcher<P: PlatformClient> {
    session: Arc<SessionManager<P>>,
    handlers: HashMap<&'static str, Arc<dyn ToolHandler>>,
}

impl<P: PlatformClient> Dispatcher<P> {
    /// Build the handler map from the catalog.
    pub fn new(session: Arc<SessionManager<P>>, ctx: HandlerContext) -> Result<Self, CatalogError> {
        let descriptors = catalog::list_tools();
        catalog::check_unique(descriptors)?;
        let handlers = descriptors
            .iter()
            .map(|d| (d.name, tools::handler_for(d.kind, &ctx)))
            .collect();
        Ok(Self { session, handlers })
    }

    /// Replace the handler for a catalog tool.
    ///
    /// Names outside the catalog are ignored: the catalog is the only source
    /// of advertised tools.
    pub fn with_handler(mut self, name: &str, handler: Arc<dyn ToolHandler>) -> Self {
        if let Some(d) = catalog::find(name) {
            self.handlers.insert(d.name, handler);
        }
        self
    }

    pub fn list_tools(&self) -> &'static [ToolDescriptor] {
        catalog::list_tools()
    }

    pub fn session(&self) -> &SessionManager<P> {
        &self.session
    }

    /// Run one invocation. Every failure comes back as `Err`, never a panic.
    pub async fn invoke(&self, request: ToolInvocationRequest) -> ToolResult {
        if let Err(e) = self.session.ensure_authenticated().await {
            log::error!(
                target: "error",
                "Not running '{}': authentication failed: {}",
                request.tool_name,
                e
            );
            return Err(ToolError::Authentication(e));
        }

        let Some(handler) = self.handlers.get(request.tool_name.as_str()) else {
            log::warn!(target: "tool", "Unknown tool requested: '{}'", request.tool_name);
            return Err(ToolError::UnknownTool(request.tool_name));
        };

        log::info!(target: "tool", "Running '{}'", request.tool_name);
        let result = handler.call(request.arguments).await;
        match &result {
            Ok(_) => log::info!(target: "tool", "'{}' completed", request.tool_name),
            Err(e) => log::warn!(target: "tool", "'{}' failed: {}", request.tool_name, e),
        }
        result
    }
}
