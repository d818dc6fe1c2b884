//! Pluggable analytics backend behind the tool handlers.
//!
//! Handlers validate arguments and shape results; the numbers come from an
//! [`AnalyticsProvider`]. [`SampleAnalytics`] is the bundled placeholder: it
//! produces deterministic sample data derived from its inputs and performs no
//! network access. A real provider (sentiment model, follower crawler, ...)
//! implements the same trait.

use crate::catalog::{DEFAULT_LEAD_KEYWORDS, DEFAULT_MIN_COMMENTS, DEFAULT_MIN_FOLLOWERS};
use async_trait::async_trait;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type AnalyticsResult<T> = Result<T, AnalyticsError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnalyticsError {
    #[error("analytics backend unavailable: {0}")]
    Unavailable(String),
    #[error("upstream request failed: {0}")]
    Upstream(String),
}

/// Comparable account metric.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Followers,
    Engagement,
    Growth,
    PostingFrequency,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Followers,
        Metric::Engagement,
        Metric::Growth,
        Metric::PostingFrequency,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Followers => "followers",
            Metric::Engagement => "engagement",
            Metric::Growth => "growth",
            Metric::PostingFrequency => "posting_frequency",
        }
    }
}

// ── Result types ─────────────────────────────────────────────────────────

/// Percentages, summing to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Theme {
    pub name: String,
    pub mentions: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAnalysis {
    pub comments_analyzed: u32,
    pub sentiment: SentimentBreakdown,
    pub themes: Vec<Theme>,
    pub keywords: Vec<KeywordCount>,
    pub potential_leads: Vec<String>,
}

/// One row of an account comparison; only the requested metrics are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountMetrics {
    pub username: String,
    #[serde(flatten)]
    pub metrics: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountComparison {
    pub accounts: Vec<AccountMetrics>,
    pub insights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Demographics {
    pub age_groups: Vec<Share>,
    pub gender: Vec<Share>,
    pub top_locations: Vec<Share>,
    pub interests: Vec<Share>,
    pub insights: Vec<String>,
}

/// Lead qualification criteria. Missing fields take the catalog defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct LeadCriteria {
    /// Minimum number of comments by the user
    pub min_comments: u32,
    /// Minimum follower count of the user
    pub min_followers: u64,
    /// Keywords that signal purchase intent
    pub keywords: Vec<String>,
}

impl Default for LeadCriteria {
    fn default() -> Self {
        Self {
            min_comments: DEFAULT_MIN_COMMENTS,
            min_followers: DEFAULT_MIN_FOLLOWERS,
            keywords: DEFAULT_LEAD_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadCandidate {
    pub username: String,
    pub followers: u64,
    pub comment_count: u32,
    pub matched_keywords: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportSummary {
    pub total_posts: u32,
    pub total_likes: u64,
    pub total_comments: u64,
    pub avg_engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPerformance {
    pub post_id: String,
    pub posted_on: String,
    pub likes: u64,
    pub comments: u64,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthStats {
    pub followers_start: u64,
    pub followers_end: u64,
    pub net_change: i64,
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountReport {
    pub summary: ReportSummary,
    pub posts: Vec<PostPerformance>,
    pub growth: GrowthStats,
    pub recommendations: Vec<String>,
}

// ── Provider trait ───────────────────────────────────────────────────────

/// Analytics capability used by the tool handlers.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    async fn comment_analysis(
        &self,
        post_id: &str,
        max_comments: u32,
    ) -> AnalyticsResult<CommentAnalysis>;

    async fn compare_accounts(
        &self,
        accounts: &[String],
        metrics: &[Metric],
    ) -> AnalyticsResult<AccountComparison>;

    async fn demographics(&self, target: &str, sample_size: u32)
        -> AnalyticsResult<Demographics>;

    /// Candidates meeting `criteria`, ranked by descending score.
    async fn find_leads(
        &self,
        target: &str,
        criteria: &LeadCriteria,
    ) -> AnalyticsResult<Vec<LeadCandidate>>;

    async fn account_report(
        &self,
        account: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalyticsResult<AccountReport>;
}

// ── SampleAnalytics ──────────────────────────────────────────────────────

/// Deterministic placeholder provider.
#[derive(Debug, Default, Clone)]
pub struct SampleAnalytics;

/// FNV-1a, so sample numbers are stable across runs and platforms.
fn seed(input: &str) -> u64 {
    input.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn share(label: &str, percent: f64) -> Share {
    Share {
        label: label.to_string(),
        percent,
    }
}

/// Sample commenter pool: (username, followers, comments, comment text).
const SAMPLE_COMMENTERS: [(&str, u64, u32, &str); 6] = [
    ("style.hunter", 15_400, 6, "love this! what's the price? interested"),
    ("daily_deals_22", 3_200, 4, "where can I buy this? price please"),
    ("maria.creates", 48_000, 3, "so interested in a collab, DM me"),
    ("quiet_lurker", 240, 5, "want to buy, interested"),
    ("tom_fitlife", 8_900, 2, "nice shot"),
    ("urban.nomad", 1_150, 7, "how much? I'd buy two, price?"),
];

#[async_trait]
impl AnalyticsProvider for SampleAnalytics {
    async fn comment_analysis(
        &self,
        post_id: &str,
        max_comments: u32,
    ) -> AnalyticsResult<CommentAnalysis> {
        let s = seed(post_id);
        let positive = 55.0 + (s % 25) as f64;
        let negative = 5.0 + (s / 25 % 10) as f64;
        let analyzed = max_comments.min(40 + (s % 200) as u32);
        Ok(CommentAnalysis {
            comments_analyzed: analyzed,
            sentiment: SentimentBreakdown {
                positive,
                neutral: 100.0 - positive - negative,
                negative,
            },
            themes: ["product quality", "pricing", "shipping", "design"]
                .iter()
                .enumerate()
                .map(|(i, name)| Theme {
                    name: name.to_string(),
                    mentions: analyzed / (i as u32 + 2),
                })
                .collect(),
            keywords: ["love", "price", "buy", "color"]
                .iter()
                .enumerate()
                .map(|(i, keyword)| KeywordCount {
                    keyword: keyword.to_string(),
                    count: analyzed / (i as u32 + 3),
                })
                .collect(),
            potential_leads: SAMPLE_COMMENTERS
                .iter()
                .filter(|(_, _, _, text)| text.contains("price") || text.contains("buy"))
                .map(|(name, ..)| name.to_string())
                .collect(),
        })
    }

    async fn compare_accounts(
        &self,
        accounts: &[String],
        metrics: &[Metric],
    ) -> AnalyticsResult<AccountComparison> {
        let rows: Vec<AccountMetrics> = accounts
            .iter()
            .map(|account| {
                let s = seed(account);
                let values = metrics
                    .iter()
                    .map(|m| {
                        let value = match m {
                            Metric::Followers => (1_000 + s % 250_000) as f64,
                            Metric::Engagement => round1(1.0 + (s % 70) as f64 / 10.0),
                            Metric::Growth => round1((s % 120) as f64 / 10.0 - 2.0),
                            Metric::PostingFrequency => round1(1.0 + (s % 14) as f64 / 2.0),
                        };
                        (m.name().to_string(), value)
                    })
                    .collect();
                AccountMetrics {
                    username: account.clone(),
                    metrics: values,
                }
            })
            .collect();

        let mut insights = Vec::new();
        for metric in metrics {
            let best = rows.iter().max_by(|a, b| {
                let av = a.metrics.get(metric.name()).copied().unwrap_or_default();
                let bv = b.metrics.get(metric.name()).copied().unwrap_or_default();
                av.total_cmp(&bv)
            });
            if let (Some(best), true) = (best, rows.len() > 1) {
                insights.push(format!(
                    "{} leads on {} ({})",
                    best.username,
                    metric.name().replace('_', " "),
                    best.metrics.get(metric.name()).copied().unwrap_or_default()
                ));
            }
        }
        if insights.is_empty() {
            insights.push("Add more accounts to get comparative insights".to_string());
        }

        Ok(AccountComparison {
            accounts: rows,
            insights,
        })
    }

    async fn demographics(
        &self,
        target: &str,
        sample_size: u32,
    ) -> AnalyticsResult<Demographics> {
        let s = seed(target);
        let young = 30.0 + (s % 15) as f64;
        let female = 45.0 + (s % 20) as f64;
        Ok(Demographics {
            age_groups: vec![
                share("18-24", young),
                share("25-34", 35.0),
                share("35-44", round1(100.0 - young - 35.0 - 10.0)),
                share("45+", 10.0),
            ],
            gender: vec![share("female", female), share("male", 100.0 - female)],
            top_locations: vec![
                share("United States", 38.0),
                share("United Kingdom", 14.0),
                share("Brazil", 9.0),
            ],
            interests: vec![
                share("fashion", 42.0),
                share("travel", 27.0),
                share("fitness", 18.0),
            ],
            insights: vec![
                format!("Sample of {} profiles analyzed for {}", sample_size, target),
                format!(
                    "Audience skews {} (18-34 make up {:.0}%)",
                    if young + 35.0 > 60.0 { "young" } else { "mixed" },
                    young + 35.0
                ),
            ],
        })
    }

    async fn find_leads(
        &self,
        _target: &str,
        criteria: &LeadCriteria,
    ) -> AnalyticsResult<Vec<LeadCandidate>> {
        let keywords: Vec<String> = criteria.keywords.iter().map(|k| k.to_lowercase()).collect();
        let mut leads: Vec<LeadCandidate> = SAMPLE_COMMENTERS
            .iter()
            .filter(|(_, followers, comments, _)| {
                *comments >= criteria.min_comments && *followers >= criteria.min_followers
            })
            .filter_map(|(name, followers, comments, text)| {
                let text = text.to_lowercase();
                let matched: Vec<String> = keywords
                    .iter()
                    .filter(|k| text.contains(k.as_str()))
                    .cloned()
                    .collect();
                if !keywords.is_empty() && matched.is_empty() {
                    return None;
                }
                let score = round1(
                    matched.len() as f64 * 10.0
                        + f64::from((*comments).min(10)) * 2.0
                        + ((*followers as f64) / 1000.0).min(20.0),
                );
                Some(LeadCandidate {
                    username: name.to_string(),
                    followers: *followers,
                    comment_count: *comments,
                    matched_keywords: matched,
                    score,
                })
            })
            .collect();
        leads.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.username.cmp(&b.username))
        });
        Ok(leads)
    }

    async fn account_report(
        &self,
        account: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AnalyticsResult<AccountReport> {
        let s = seed(account);
        let days = (end - start).num_days();
        let post_count = (days / 7 + 1).clamp(1, 8);
        let posts: Vec<PostPerformance> = (0..post_count)
            .map(|i| {
                let date = end - chrono::Duration::days(i * 7);
                let likes = 200 + (s.rotate_left(i as u32 * 7) % 1800);
                let comments = likes / 20;
                PostPerformance {
                    post_id: format!("{}_{}", account, date.format("%Y%m%d")),
                    posted_on: date.to_string(),
                    likes,
                    comments,
                    engagement_rate: round1((likes + comments) as f64 / 100.0),
                }
            })
            .collect();

        let total_likes: u64 = posts.iter().map(|p| p.likes).sum();
        let total_comments: u64 = posts.iter().map(|p| p.comments).sum();
        let avg_engagement_rate =
            round1(posts.iter().map(|p| p.engagement_rate).sum::<f64>() / posts.len() as f64);
        let followers_start = 5_000 + s % 50_000;
        let followers_end = followers_start + (days.max(0) as u64) * (s % 40);
        let net_change = followers_end as i64 - followers_start as i64;

        let mut recommendations = vec![
            "Post consistently at the times your audience is most active".to_string(),
            "Reply to comments within the first hour to lift engagement".to_string(),
        ];
        if avg_engagement_rate < 5.0 {
            recommendations.push("Test more video content; engagement is below 5%".to_string());
        }

        Ok(AccountReport {
            summary: ReportSummary {
                total_posts: posts.len() as u32,
                total_likes,
                total_comments,
                avg_engagement_rate,
            },
            posts,
            growth: GrowthStats {
                followers_start,
                followers_end,
                net_change,
                growth_rate: round1(net_change as f64 * 100.0 / followers_start as f64),
            },
            recommendations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names_match_catalog() {
        let names: Vec<&str> = Metric::ALL.iter().map(|m| m.name()).collect();
        assert_eq!(names, crate::catalog::KNOWN_METRICS);
        let parsed: Metric = serde_json::from_str("\"posting_frequency\"").unwrap();
        assert_eq!(parsed, Metric::PostingFrequency);
        assert!(serde_json::from_str::<Metric>("\"likes\"").is_err());
    }

    #[test]
    fn test_lead_criteria_partial_defaults() {
        let c: LeadCriteria = serde_json::from_str(r#"{"minFollowers": 10}"#).unwrap();
        assert_eq!(c.min_followers, 10);
        assert_eq!(c.min_comments, 2);
        assert_eq!(c.keywords, vec!["interested", "buy", "price"]);
    }

    #[tokio::test]
    async fn test_sample_comment_sentiment_sums_to_100() {
        let a = SampleAnalytics.comment_analysis("ABC123", 100).await.unwrap();
        let total = a.sentiment.positive + a.sentiment.neutral + a.sentiment.negative;
        assert!((total - 100.0).abs() < 1e-9);
        assert!(a.comments_analyzed <= 100);
        let b = SampleAnalytics.comment_analysis("ABC123", 100).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_sample_compare_only_requested_metrics() {
        let accounts = vec!["brand_x".to_string(), "brand_y".to_string()];
        let c = SampleAnalytics
            .compare_accounts(&accounts, &[Metric::Followers])
            .await
            .unwrap();
        assert_eq!(c.accounts.len(), 2);
        for row in &c.accounts {
            assert_eq!(row.metrics.keys().collect::<Vec<_>>(), vec!["followers"]);
        }
        assert_eq!(c.insights.len(), 1);
    }

    #[tokio::test]
    async fn test_sample_leads_respect_criteria_and_rank() {
        let leads = SampleAnalytics
            .find_leads("brand_x", &LeadCriteria::default())
            .await
            .unwrap();
        assert!(!leads.is_empty());
        for lead in &leads {
            assert!(lead.comment_count >= 2);
            assert!(lead.followers >= 1000);
            assert!(!lead.matched_keywords.is_empty());
        }
        assert!(leads.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!leads.iter().any(|l| l.username == "quiet_lurker"));
    }

    #[tokio::test]
    async fn test_sample_report_posts_within_period() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
        let r = SampleAnalytics.account_report("brand_x", start, end).await.unwrap();
        assert_eq!(r.summary.total_posts as usize, r.posts.len());
        for post in &r.posts {
            let d = NaiveDate::parse_from_str(&post.posted_on, "%Y-%m-%d").unwrap();
            assert!(d >= start && d <= end);
        }
        assert_eq!(
            r.growth.net_change,
            r.growth.followers_end as i64 - r.growth.followers_start as i64
        );
    }
}
