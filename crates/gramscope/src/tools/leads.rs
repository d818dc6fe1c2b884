use super::{require_non_blank, HandlerContext, ToolError, ToolResult, TypedTool};
use crate::analytics::LeadCriteria;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyLeadsArgs {
    /// Instagram account handle (e.g. "brand_x") or post URL
    pub account_or_post_url: String,
    /// Lead qualification criteria; omitted fields take their defaults
    #[serde(default)]
    pub criteria: LeadCriteria,
}

/// `identify_leads`: ranked candidates matching the lead criteria.
pub struct IdentifyLeads {
    ctx: HandlerContext,
}

impl IdentifyLeads {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl TypedTool for IdentifyLeads {
    type Args = IdentifyLeadsArgs;

    async fn run(&self, args: Self::Args) -> ToolResult {
        let target = require_non_blank("accountOrPostUrl", &args.account_or_post_url)?;
        let mut criteria = args.criteria;
        criteria.keywords.retain(|k| !k.trim().is_empty());
        if criteria.keywords.iter().any(|k| k.len() > 64) {
            return Err(ToolError::validation(
                "criteria.keywords",
                "keywords must be at most 64 characters",
            ));
        }

        let leads = self
            .ctx
            .provider(self.ctx.analytics.find_leads(&target, &criteria))
            .await?;

        Ok(json!({
            "target": target,
            "criteria": criteria,
            "totalLeads": leads.len(),
            "leads": leads,
        }))
    }
}
