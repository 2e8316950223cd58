//! ML prediction log and training queries.

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use super::QueryParams;

/// Default page size for ML logs.
pub const DEFAULT_ML_LOG_LIMIT: u32 = 50;

/// Which prediction logs to return, by how feedback was recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    /// Every log row.
    #[default]
    All,
    /// Rows where a lead gave an explicit reason.
    Explicit,
    /// Rows accepted without comment.
    Implicit,
}

impl FeedbackType {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackType::All => "all",
            FeedbackType::Explicit => "explicit",
            FeedbackType::Implicit => "implicit",
        }
    }
}

/// Whether the ML and LLM priority predictions agree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PriorityPair {
    /// No filtering.
    #[default]
    All,
    /// Predictions agree.
    Match,
    /// Predictions disagree.
    Mismatch,
}

impl PriorityPair {
    /// Wire value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityPair::All => "all",
            PriorityPair::Match => "match",
            PriorityPair::Mismatch => "mismatch",
        }
    }
}

/// Query for `GET /ml/logs`.
///
/// A single `ticket_id` wins over a `ticket_from`/`ticket_to` range: when
/// it is set the range is not sent at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MlLogQuery {
    /// Page size.
    pub limit: u32,
    /// Rows to skip.
    pub offset: u32,
    /// Exact ticket.
    pub ticket_id: Option<i64>,
    /// Lowest ticket id of the range.
    pub ticket_from: Option<i64>,
    /// Highest ticket id of the range.
    pub ticket_to: Option<i64>,
    /// Feedback filter.
    pub feedback_type: FeedbackType,
    /// Priority agreement filter.
    pub priority_pair: PriorityPair,
}

impl Default for MlLogQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_ML_LOG_LIMIT,
            offset: 0,
            ticket_id: None,
            ticket_from: None,
            ticket_to: None,
            feedback_type: FeedbackType::All,
            priority_pair: PriorityPair::All,
        }
    }
}

impl MlLogQuery {
    /// Creates a query with the defaults (50 rows from the start, no filters).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Sets the number of rows to skip.
    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Restricts to one ticket.
    pub fn with_ticket_id(mut self, ticket_id: i64) -> Self {
        self.ticket_id = Some(ticket_id);
        self
    }

    /// Restricts to a ticket id range. Either bound may be open.
    pub fn with_ticket_range(mut self, from: Option<i64>, to: Option<i64>) -> Self {
        self.ticket_from = from;
        self.ticket_to = to;
        self
    }

    /// Sets the feedback filter.
    pub fn with_feedback_type(mut self, feedback_type: FeedbackType) -> Self {
        self.feedback_type = feedback_type;
        self
    }

    /// Sets the priority agreement filter.
    pub fn with_priority_pair(mut self, priority_pair: PriorityPair) -> Self {
        self.priority_pair = priority_pair;
        self
    }

    /// Builds the query parameters.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push("limit", self.limit)
            .push("offset", self.offset)
            .push("feedback_type", self.feedback_type.as_str())
            .push("priority_pair", self.priority_pair.as_str());

        match self.ticket_id {
            Some(ticket_id) => {
                params.push("ticket_id", ticket_id);
            }
            None => {
                params
                    .push_opt("ticket_from", self.ticket_from)
                    .push_opt("ticket_to", self.ticket_to);
            }
        }

        params
    }
}

/// Query for `GET /ml/training/jobs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainingJobQuery {
    /// Maximum number of jobs.
    pub limit: Option<u32>,
    /// Job status, e.g. `RUNNING`, `COMPLETED`, `FAILED`.
    pub status: Option<String>,
}

impl TrainingJobQuery {
    /// Creates an unfiltered query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of jobs.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filters by job status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Builds the query parameters, omitting unset filters.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_opt("limit", self.limit)
            .push_opt("status", self.status.as_deref());
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ml_log_defaults() {
        assert_eq!(
            MlLogQuery::new().to_query().to_query_string(),
            "limit=50&offset=0&feedback_type=all&priority_pair=all"
        );
    }

    #[test]
    fn test_ticket_id_suppresses_range() {
        let query = MlLogQuery::new()
            .with_ticket_range(Some(10), Some(20))
            .with_ticket_id(15)
            .to_query();
        assert_eq!(query.get("ticket_id"), Some("15"));
        assert!(!query.contains("ticket_from"));
        assert!(!query.contains("ticket_to"));
    }

    #[test]
    fn test_range_without_ticket_id() {
        let query = MlLogQuery::new()
            .with_ticket_range(Some(100), None)
            .with_feedback_type(FeedbackType::Explicit)
            .with_priority_pair(PriorityPair::Mismatch)
            .to_query();
        assert_eq!(
            query.to_query_string(),
            "limit=50&offset=0&feedback_type=explicit&priority_pair=mismatch&ticket_from=100"
        );
    }

    #[test]
    fn test_training_jobs_omit_absent_filters() {
        assert!(TrainingJobQuery::new().to_query().is_empty());
        assert_eq!(
            TrainingJobQuery::new()
                .with_limit(5)
                .with_status("FAILED")
                .to_query()
                .to_query_string(),
            "limit=5&status=FAILED"
        );
    }

    #[test]
    fn test_enums_deserialize_lowercase() {
        let feedback: FeedbackType = serde_json::from_str("\"implicit\"").unwrap();
        assert_eq!(feedback, FeedbackType::Implicit);
        let pair: PriorityPair = serde_json::from_str("\"match\"").unwrap();
        assert_eq!(pair, PriorityPair::Match);
    }
}
