use super::{check_batch, require_non_blank, HandlerContext, ToolResult, TypedTool};
use crate::catalog::DEFAULT_SAMPLE_SIZE;
use crate::validation;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

fn default_sample_size() -> u32 {
    DEFAULT_SAMPLE_SIZE
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtractDemographicsArgs {
    /// Instagram account handle (e.g. "brand_x") or post URL
    pub account_or_post_url: String,
    /// Number of followers or commenters to sample
    #[serde(default = "default_sample_size")]
    #[schemars(range(min = 1, max = 1000))]
    pub sample_size: u32,
}

/// `extract_demographics`: audience breakdown of an account or post.
pub struct ExtractDemographics {
    ctx: HandlerContext,
}

impl ExtractDemographics {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl TypedTool for ExtractDemographics {
    type Args = ExtractDemographicsArgs;

    async fn run(&self, args: Self::Args) -> ToolResult {
        let target = require_non_blank("accountOrPostUrl", &args.account_or_post_url)?;
        check_batch("sampleSize", args.sample_size)?;
        let target_type = if validation::is_valid_post_url(&target) {
            "post"
        } else {
            "account"
        };

        let demographics = self
            .ctx
            .provider(self.ctx.analytics.demographics(&target, args.sample_size))
            .await?;

        Ok(json!({
            "target": target,
            "targetType": target_type,
            "sampleSize": args.sample_size,
            "ageGroups": demographics.age_groups,
            "gender": demographics.gender,
            "topLocations": demographics.top_locations,
            "interests": demographics.interests,
            "insights": demographics.insights,
        }))
    }
}
