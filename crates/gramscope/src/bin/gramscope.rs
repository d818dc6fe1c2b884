//! Gramscope MCP Server - Entry Point
//!
//! Runs the MCP server over stdio for integration with AI assistants.

use anyhow::Result;
use argh::FromArgs;
use gramscope::analytics::SampleAnalytics;
use gramscope::mcp::{self, GramscopeMcpServer};
use gramscope::{Config, Dispatcher, HandlerContext, InstagramClient, SessionManager};
use std::sync::Arc;

/// Gramscope - Instagram analytics tools for AI assistants
#[derive(FromArgs)]
struct Args {
    /// print version information and exit
    #[argh(switch)]
    version: bool,

    /// login timeout in seconds (overrides GRAMSCOPE_LOGIN_TIMEOUT_SECS)
    #[argh(option)]
    login_timeout: Option<u64>,

    /// analytics provider timeout in seconds (overrides GRAMSCOPE_PROVIDER_TIMEOUT_SECS)
    #[argh(option)]
    provider_timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Args = argh::from_env();

    if args.version {
        println!("gramscope {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Initialize logging to stderr (stdout is used for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::from_env().and_then(|mut config| {
        config.override_timeouts(args.login_timeout, args.provider_timeout)?;
        Ok(config)
    });
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            log::error!(target: "setup", "Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    log::info!(target: "setup", "Starting Gramscope MCP server");
    log::info!(target: "setup", "Account: {}", config.credentials.username);
    log::info!(target: "setup", "Platform API: {}", config.api_url);

    let client = InstagramClient::new(config.api_url.clone())?;
    let session = Arc::new(
        SessionManager::new(client, config.credentials).with_login_timeout(config.login_timeout),
    );
    let ctx = HandlerContext::new(Arc::new(SampleAnalytics))
        .with_provider_timeout(config.provider_timeout);
    let dispatcher = Arc::new(Dispatcher::new(session, ctx)?);
    log::info!(
        target: "setup",
        "Registered {} tools",
        dispatcher.list_tools().len()
    );

    mcp::run_stdio(GramscopeMcpServer::new(dispatcher))
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}
