use super::{check_batch, HandlerContext, ToolError, ToolResult, TypedTool};
use crate::catalog::DEFAULT_MAX_COMMENTS;
use crate::validation;
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

fn default_max_comments() -> u32 {
    DEFAULT_MAX_COMMENTS
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzePostCommentsArgs {
    /// Post URL, e.g. https://www.instagram.com/p/ABC123/
    pub post_url: String,
    /// Maximum number of comments to analyze
    #[serde(default = "default_max_comments")]
    #[schemars(range(min = 1, max = 1000))]
    pub max_comments: u32,
}

/// `analyze_post_comments`: sentiment, themes, keywords and leads of a post.
pub struct AnalyzePostComments {
    ctx: HandlerContext,
}

impl AnalyzePostComments {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl TypedTool for AnalyzePostComments {
    type Args = AnalyzePostCommentsArgs;

    async fn run(&self, args: Self::Args) -> ToolResult {
        let post_url = args.post_url.as_str();
        validation::validate_post_url(post_url).map_err(|e| ToolError::validation("postUrl", e))?;
        check_batch("maxComments", args.max_comments)?;

        let post_id = validation::extract_post_id(post_url);
        let analysis = self
            .ctx
            .provider(self.ctx.analytics.comment_analysis(&post_id, args.max_comments))
            .await?;

        Ok(json!({
            "postId": post_id,
            "postUrl": post_url,
            "commentsAnalyzed": analysis.comments_analyzed,
            "sentiment": analysis.sentiment,
            "themes": analysis.themes,
            "keywords": analysis.keywords,
            "potentialLeads": analysis.potential_leads,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::ToolHandler;
    use super::*;

    #[tokio::test]
    async fn test_analyze_valid_post() {
        let tool = AnalyzePostComments::new(sample_ctx());
        let out = tool
            .call(args(json!({ "postUrl": "https://www.instagram.com/p/ABC_123-x/" })))
            .await
            .unwrap();
        assert_eq!(out["postId"], "ABC_123-x");
        assert!(out["commentsAnalyzed"].as_u64().unwrap() <= 100);
        assert!(out["sentiment"]["positive"].is_number());
        assert!(out["themes"].is_array());
        assert!(out["keywords"].is_array());
        assert!(out["potentialLeads"].is_array());
    }

    #[tokio::test]
    async fn test_analyze_respects_max_comments() {
        let tool = AnalyzePostComments::new(sample_ctx());
        let out = tool
            .call(args(json!({
                "postUrl": "https://instagram.com/p/xyz",
                "maxComments": 5
            })))
            .await
            .unwrap();
        assert_eq!(out["commentsAnalyzed"], 5);
    }

    #[tokio::test]
    async fn test_analyze_rejects_profile_url() {
        let tool = AnalyzePostComments::new(sample_ctx());
        let err = tool
            .call(args(json!({ "postUrl": "https://www.instagram.com/brand_x/" })))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation { field: "postUrl", .. }));
    }

    #[tokio::test]
    async fn test_analyze_rejects_padded_url() {
        let tool = AnalyzePostComments::new(sample_ctx());
        let err = tool
            .call(args(json!({ "postUrl": "  https://instagram.com/p/abc/  " })))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation { field: "postUrl", .. }));
    }

    #[tokio::test]
    async fn test_analyze_rejects_zero_max_comments() {
        let tool = AnalyzePostComments::new(sample_ctx());
        let err = tool
            .call(args(json!({
                "postUrl": "https://instagram.com/p/xyz",
                "maxComments": 0
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Validation { field: "maxComments", .. }));
    }
}
