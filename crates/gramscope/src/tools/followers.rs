use super::{HandlerContext, ToolError, ToolResult, TypedTool};
use crate::analytics::Metric;
use crate::validation;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

fn all_metrics() -> Vec<Metric> {
    Metric::ALL.to_vec()
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FetchFollowersArgs {
    /// Account handles to compare (without '@')
    pub accounts: Vec<String>,
    /// Metrics to compare; all metrics when omitted
    #[serde(default = "all_metrics")]
    pub metrics: Vec<Metric>,
}

/// `fetch_followers`: side-by-side comparison of several accounts.
pub struct FetchFollowers {
    ctx: HandlerContext,
}

impl FetchFollowers {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl TypedTool for FetchFollowers {
    type Args = FetchFollowersArgs;

    async fn run(&self, args: Self::Args) -> ToolResult {
        if args.accounts.is_empty() {
            return Err(ToolError::validation(
                "accounts",
                "at least one account is required",
            ));
        }
        let invalid = validation::invalid_usernames(&args.accounts);
        if !invalid.is_empty() {
            return Err(ToolError::InvalidAccounts(invalid));
        }

        let mut metrics = if args.metrics.is_empty() {
            all_metrics()
        } else {
            args.metrics
        };
        metrics.sort();
        metrics.dedup();

        let comparison = self
            .ctx
            .provider(self.ctx.analytics.compare_accounts(&args.accounts, &metrics))
            .await?;

        let metric_names: Vec<&str> = metrics.iter().map(|m| m.name()).collect();
        Ok(json!({
            "metrics": metric_names,
            "accounts": comparison.accounts,
            "insights": comparison.insights,
        }))
    }
}
