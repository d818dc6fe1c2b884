//! Static tool catalog.
//!
//! The five tools advertised to MCP clients, in a fixed order. Descriptors
//! are built once per process. Each input schema is derived from the typed
//! argument struct the tool decodes its calls into.

use crate::tools::{
    AnalyzePostCommentsArgs, ExtractDemographicsArgs, FetchFollowersArgs, IdentifyLeadsArgs,
    SendDmsArgs,
};
use schemars::generate::SchemaSettings;
use schemars::JsonSchema;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

/// Default number of comments analysed per post.
pub const DEFAULT_MAX_COMMENTS: u32 = 100;

/// Default audience sample size for demographics.
pub const DEFAULT_SAMPLE_SIZE: u32 = 50;

/// Default lead criteria.
pub const DEFAULT_MIN_COMMENTS: u32 = 2;
pub const DEFAULT_MIN_FOLLOWERS: u64 = 1000;
pub const DEFAULT_LEAD_KEYWORDS: [&str; 3] = ["interested", "buy", "price"];

/// Default report length when no start date is given.
pub const DEFAULT_REPORT_DAYS: i64 = 30;

/// Upper bound for `maxComments` and `sampleSize`.
pub const MAX_BATCH: u32 = 1000;

/// Account metrics that can be compared; the default is all of them.
pub const KNOWN_METRICS: [&str; 4] = ["followers", "engagement", "growth", "posting_frequency"];

/// Closed set of tools. Handler construction matches on this exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    AnalyzePostComments,
    FetchFollowers,
    ExtractDemographics,
    IdentifyLeads,
    SendDms,
}

impl ToolKind {
    pub const ALL: [ToolKind; 5] = [
        ToolKind::AnalyzePostComments,
        ToolKind::FetchFollowers,
        ToolKind::ExtractDemographics,
        ToolKind::IdentifyLeads,
        ToolKind::SendDms,
    ];

    /// Stable wire name of the tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::AnalyzePostComments => "analyze_post_comments",
            ToolKind::FetchFollowers => "fetch_followers",
            ToolKind::ExtractDemographics => "extract_demographics",
            ToolKind::IdentifyLeads => "identify_leads",
            ToolKind::SendDms => "send_dms",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Render a typed argument struct as a tool input schema.
///
/// Subschemas are inlined so clients see one self-contained object.
pub fn input_schema_for<T: JsonSchema>() -> Map<String, Value> {
    let mut settings = SchemaSettings::draft07();
    settings.inline_subschemas = true;
    let schema = settings.into_generator().into_root_schema_for::<T>();
    let mut object = match serde_json::to_value(schema) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    object.remove("$schema");
    object.remove("title");
    object
}

/// Immutable description of one tool.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub kind: ToolKind,
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Arc<Map<String, Value>>,
}

impl ToolDescriptor {
    fn new<A: JsonSchema>(kind: ToolKind, description: &'static str) -> Self {
        Self {
            kind,
            name: kind.name(),
            description,
            input_schema: Arc::new(input_schema_for::<A>()),
        }
    }

    /// Names listed under `required` in the input schema.
    pub fn required_params(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Catalog configuration defects, detected at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate tool name in catalog: {0}")]
    DuplicateTool(&'static str),
}

/// Fail if two descriptors share a name.
pub fn check_unique(descriptors: &[ToolDescriptor]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for d in descriptors {
        if !seen.insert(d.name) {
            return Err(CatalogError::DuplicateTool(d.name));
        }
    }
    Ok(())
}

static CATALOG: LazyLock<Vec<ToolDescriptor>> = LazyLock::new(build_catalog);

/// All tool descriptors, in advertised order.
pub fn list_tools() -> &'static [ToolDescriptor] {
    &CATALOG
}

/// Find a descriptor by tool name.
pub fn find(name: &str) -> Option<&'static ToolDescriptor> {
    CATALOG.iter().find(|d| d.name == name)
}

fn build_catalog() -> Vec<ToolDescriptor> {
    vec![
        ToolDescriptor::new::<AnalyzePostCommentsArgs>(
            ToolKind::AnalyzePostComments,
            "Analyze the comments of an Instagram post: sentiment breakdown, recurring themes, \
             top keywords, and commenters who look like potential leads.",
        ),
        ToolDescriptor::new::<FetchFollowersArgs>(
            ToolKind::FetchFollowers,
            "Compare several Instagram accounts side by side on follower and engagement metrics, \
             with derived insights.",
        ),
        ToolDescriptor::new::<ExtractDemographicsArgs>(
            ToolKind::ExtractDemographics,
            "Estimate audience demographics (age, gender, location, interests) for an account \
             or the commenters of a post.",
        ),
        ToolDescriptor::new::<IdentifyLeadsArgs>(
            ToolKind::IdentifyLeads,
            "Identify potential leads among the followers or commenters of an account or post, \
             ranked by score with the keywords each lead matched.",
        ),
        ToolDescriptor::new::<SendDmsArgs>(
            ToolKind::SendDms,
            "Generate an engagement report for an account over a date range: period summary, \
             per-post performance, growth, and recommendations.",
        ),
    ]
}
