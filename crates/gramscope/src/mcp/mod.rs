//! MCP (Model Context Protocol) server for AI agent integration.
//!
//! Exposes the gramscope tool catalog to any MCP client over stdio.
//! `tools/list` renders the catalog; `tools/call` goes through the
//! [`Dispatcher`], and per-call failures come back as tool content with
//! `isError` set. Only unknown tool names are protocol errors.

use crate::catalog::ToolDescriptor;
use crate::dispatch::{Dispatcher, ToolInvocationRequest};
use crate::platform::PlatformClient;
use crate::tools::ToolError;
use rmcp::model::*;
use rmcp::service::RequestContext;
use rmcp::{RoleServer, ServerHandler, ServiceExt};
use std::sync::Arc;

/// Gramscope MCP server, generic over the platform client.
pub struct GramscopeMcpServer<P: PlatformClient> {
    dispatcher: Arc<Dispatcher<P>>,
}

impl<P: PlatformClient> Clone for GramscopeMcpServer<P> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<P: PlatformClient> GramscopeMcpServer<P> {
    pub fn new(dispatcher: Arc<Dispatcher<P>>) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher<P> {
        &self.dispatcher
    }
}

/// Render a catalog descriptor as an MCP tool definition.
pub fn to_mcp_tool(descriptor: &ToolDescriptor) -> Tool {
    Tool::new(
        descriptor.name,
        descriptor.description,
        descriptor.input_schema.clone(),
    )
}

/// Map a dispatcher outcome onto the MCP wire.
pub fn to_call_result(
    result: Result<serde_json::Value, ToolError>,
) -> Result<CallToolResult, rmcp::ErrorData> {
    match result {
        Ok(payload) => Ok(CallToolResult::success(vec![Content::text(
            serde_json::to_string_pretty(&payload).unwrap_or_else(|_| payload.to_string()),
        )])),
        Err(e) if e.is_protocol_error() => Err(rmcp::ErrorData::new(
            ErrorCode::METHOD_NOT_FOUND,
            e.to_string(),
            None,
        )),
        Err(e) => Ok(CallToolResult::error(vec![Content::text(e.to_string())])),
    }
}

// ── ServerHandler implementation ──────────────────────────────────

impl<P: PlatformClient> ServerHandler for GramscopeMcpServer<P> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Gramscope Instagram analytics. Available tools:\n\
                 analyze_post_comments — sentiment, themes, keywords and leads of a post\n\
                 fetch_followers — compare accounts on follower and engagement metrics\n\
                 extract_demographics — audience breakdown of an account or post\n\
                 identify_leads — ranked potential customers with matched keywords\n\
                 send_dms — engagement report for an account over a date range"
                    .into(),
            ),
            ..Default::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, rmcp::ErrorData>> + Send + '_ {
        async move {
            let tools = self.dispatcher.list_tools().iter().map(to_mcp_tool).collect();
            Ok(ListToolsResult::with_all_items(tools))
        }
    }

    fn call_tool(
        &self,
        request: CallToolRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> impl std::future::Future<Output = Result<CallToolResult, rmcp::ErrorData>> + Send + '_ {
        async move {
            let invocation = ToolInvocationRequest::new(
                request.name.to_string(),
                request.arguments.unwrap_or_default(),
            );
            to_call_result(self.dispatcher.invoke(invocation).await)
        }
    }
}

/// Serve MCP over stdin/stdout until the client disconnects or Ctrl+C.
///
/// On interrupt the running service is cancelled, which closes the transport
/// before this function returns.
pub async fn run_stdio<P: PlatformClient>(
    server: GramscopeMcpServer<P>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let running = server.serve(rmcp::transport::stdio()).await?;
    log::info!(target: "setup", "MCP server ready on stdio");

    let cancel = running.cancellation_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::info!(target: "setup", "Received Ctrl+C, closing transport...");
            cancel.cancel();
        }
    });

    let reason = running.waiting().await?;
    interrupt.abort();
    log::info!(target: "setup", "MCP server stopped ({:?})", reason);
    Ok(())
}
