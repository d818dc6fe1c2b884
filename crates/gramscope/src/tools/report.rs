use super::{HandlerContext, ToolError, ToolResult, TypedTool};
use crate::catalog::DEFAULT_REPORT_DAYS;
use crate::validation;
use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendDmsArgs {
    /// Account handle (without '@')
    pub account: String,
    /// Start date (YYYY-MM-DD); defaults to 30 days before the end date
    #[serde(default)]
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD); defaults to today
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Parse `YYYY-MM-DD`, or take the date part of an RFC 3339 timestamp.
fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, ToolError> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
        .map_err(|_| ToolError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Resolve the report period. End defaults to `today`, start to 30 days
/// before the end.
fn resolve_period(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), ToolError> {
    let end = match end {
        Some(v) => parse_date("endDate", v)?,
        None => today,
    };
    let start = match start {
        Some(v) => parse_date("startDate", v)?,
        None => end
            .checked_sub_signed(Duration::days(DEFAULT_REPORT_DAYS))
            .ok_or_else(|| ToolError::InvalidDate {
                field: "endDate",
                value: end.to_string(),
            })?,
    };
    if start > end {
        return Err(ToolError::validation(
            "startDate",
            format!("{} is after endDate {}", start, end),
        ));
    }
    Ok((start, end))
}

/// `send_dms`: engagement report for an account over a period.
pub struct SendDms {
    ctx: HandlerContext,
}

impl SendDms {
    pub fn new(ctx: HandlerContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl TypedTool for SendDms {
    type Args = SendDmsArgs;

    async fn run(&self, args: Self::Args) -> ToolResult {
        let account = args.account.as_str();
        validation::validate_username(account).map_err(|e| ToolError::validation("account", e))?;
        let (start, end) = resolve_period(
            args.start_date.as_deref(),
            args.end_date.as_deref(),
            Utc::now().date_naive(),
        )?;

        let report = self
            .ctx
            .provider(self.ctx.analytics.account_report(account, start, end))
            .await?;

        Ok(json!({
            "account": account,
            "period": {
                "start": start.to_string(),
                "end": end.to_string(),
                "days": (end - start).num_days(),
            },
            "summary": report.summary,
            "posts": report.posts,
            "growth": report.growth,
            "recommendations": report.recommendations,
        }))
    }
}
