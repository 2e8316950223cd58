//! Tool input parameter structs for MCP tools.
//!
//! This module defines the input types for each MCP tool, with
//! JSON Schema derivation for MCP tool discovery.
//!
//! # Input Sanitization
//!
//! All input structs implement `sanitize()` which trims whitespace
//! from string fields. This should be called before processing input.

use rmcp::schemars::{self, JsonSchema};
use serde::Deserialize;

use crate::models::{FeedbackType, MlLogQuery, PriorityPair, TicketFilters, TrainingJobQuery};

/// Helper function to trim an optional string.
fn trim_option(s: &Option<String>) -> Option<String> {
    s.as_ref().map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

/// Input parameters for the login tool.
#[derive(Clone, Deserialize, JsonSchema)]
pub struct LoginInput {
    /// Account e-mail address.
    pub email: String,

    /// Account password.
    pub password: String,
}

impl std::fmt::Debug for LoginInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginInput")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl LoginInput {
    /// Trims the e-mail address. The password is taken exactly as given.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            email: self.email.trim().to_string(),
            password: self.password,
        }
    }
}

/// Input parameters for the list_tickets tool.
///
/// All fields are optional - use them to filter the results.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTicketsInput {
    /// Filter by status: NEW, TRIAGE, IN_PROGRESS, RESOLVED, CLOSED.
    #[serde(default)]
    pub status: Option<String>,

    /// Filter by priority: P1, P2, P3.
    #[serde(default)]
    pub priority: Option<String>,

    /// Filter by category (e.g., "Hardware", "Network", "Access").
    #[serde(default)]
    pub category: Option<String>,

    /// Filter by department ID.
    #[serde(default)]
    pub department_id: Option<i64>,

    /// Filter by assigned agent ID.
    #[serde(default)]
    pub assignee_id: Option<i64>,

    /// Filter by ticket author ID.
    #[serde(default)]
    pub creator_id: Option<i64>,

    /// If true, only tickets waiting for triage; if false, only tickets that are not.
    #[serde(default)]
    pub triage_required: Option<bool>,
}

impl ListTicketsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            status: trim_option(&self.status),
            priority: trim_option(&self.priority),
            category: trim_option(&self.category),
            ..self
        }
    }

    /// Converts the input into ticket filters.
    pub fn to_filters(&self) -> TicketFilters {
        TicketFilters::new()
            .with("status", self.status.as_deref())
            .with("priority", self.priority.as_deref())
            .with("category", self.category.as_deref())
            .with("department_id", self.department_id)
            .with("assignee_id", self.assignee_id)
            .with("creator_id", self.creator_id)
            .with("triage_required", self.triage_required)
    }
}

/// Input parameters for tools that act on a single ticket.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TicketIdInput {
    /// The ticket ID.
    pub ticket_id: String,
}

impl TicketIdInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
        }
    }
}

/// Input parameters for the update_ticket_status tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct UpdateStatusInput {
    /// The ticket ID.
    pub ticket_id: String,

    /// Target status: NEW, TRIAGE, IN_PROGRESS, RESOLVED, CLOSED.
    pub status: String,
}

impl UpdateStatusInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
            status: self.status.trim().to_string(),
        }
    }
}

/// Input parameters for the assign_ticket tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct AssignTicketInput {
    /// The ticket ID.
    pub ticket_id: String,

    /// ID of the agent to assign. Omit to unassign.
    #[serde(default)]
    pub assignee_id: Option<i64>,
}

impl AssignTicketInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
            assignee_id: self.assignee_id,
        }
    }
}

/// Input parameters for the resolve_triage tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ResolveTriageInput {
    /// The ticket ID.
    pub ticket_id: String,

    /// Final priority: P1, P2 or P3.
    pub priority_final: String,

    /// Final category (e.g., "Network").
    pub category_final: String,

    /// Why the final priority differs from the suggested one.
    #[serde(default)]
    pub reason: Option<String>,
}

impl ResolveTriageInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            ticket_id: self.ticket_id.trim().to_string(),
            priority_final: self.priority_final.trim().to_string(),
            category_final: self.category_final.trim().to_string(),
            reason: trim_option(&self.reason),
        }
    }
}

/// Input parameters for the list_ml_logs tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListMlLogsInput {
    /// Maximum number of log rows (default: 50).
    #[serde(default)]
    pub limit: Option<u32>,

    /// Number of rows to skip (default: 0).
    #[serde(default)]
    pub offset: Option<u32>,

    /// Only logs for this ticket. Overrides ticket_from/ticket_to.
    #[serde(default)]
    pub ticket_id: Option<i64>,

    /// Lowest ticket ID of a range.
    #[serde(default)]
    pub ticket_from: Option<i64>,

    /// Highest ticket ID of a range.
    #[serde(default)]
    pub ticket_to: Option<i64>,

    /// Feedback filter: all, explicit or implicit (default: all).
    #[serde(default)]
    pub feedback_type: Option<FeedbackType>,

    /// ML vs LLM priority filter: all, match or mismatch (default: all).
    #[serde(default)]
    pub priority_pair: Option<PriorityPair>,
}

impl ListMlLogsInput {
    /// Converts the input into an ML log query, filling in defaults.
    pub fn to_query(&self) -> MlLogQuery {
        let defaults = MlLogQuery::default();
        MlLogQuery {
            limit: self.limit.unwrap_or(defaults.limit),
            offset: self.offset.unwrap_or(defaults.offset),
            ticket_id: self.ticket_id,
            ticket_from: self.ticket_from,
            ticket_to: self.ticket_to,
            feedback_type: self.feedback_type.unwrap_or_default(),
            priority_pair: self.priority_pair.unwrap_or_default(),
        }
    }
}

/// Input parameters for the trigger_training tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TriggerTrainingInput {
    /// Retrain even if there is not enough new feedback.
    #[serde(default)]
    pub force: Option<bool>,
}

/// Input parameters for the list_models tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListModelsInput {
    /// Maximum number of model versions to return.
    #[serde(default)]
    pub limit: Option<u32>,
}

/// Input parameters for the activate_model tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ModelVersionInput {
    /// The model version string.
    pub version: String,
}

impl ModelVersionInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            version: self.version.trim().to_string(),
        }
    }
}

/// Input parameters for the list_training_jobs tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ListTrainingJobsInput {
    /// Maximum number of jobs to return.
    #[serde(default)]
    pub limit: Option<u32>,

    /// Filter by job status: RUNNING, COMPLETED, FAILED.
    #[serde(default)]
    pub status: Option<String>,
}

impl ListTrainingJobsInput {
    /// Sanitizes input by trimming whitespace from all string fields.
    #[must_use]
    pub fn sanitize(self) -> Self {
        Self {
            limit: self.limit,
            status: trim_option(&self.status),
        }
    }

    /// Converts the input into a training job query.
    pub fn to_query(&self) -> TrainingJobQuery {
        TrainingJobQuery {
            limit: self.limit,
            status: self.status.clone(),
        }
    }
}

/// Input parameters for the get_training_job tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct TrainingJobIdInput {
    /// The training job ID.
    pub job_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_option() {
        assert_eq!(trim_option(&Some("  NEW ".to_string())), Some("NEW".to_string()));
        assert_eq!(trim_option(&Some("   ".to_string())), None);
        assert_eq!(trim_option(&None), None);
    }

    #[test]
    fn test_list_tickets_blank_filters_are_dropped() {
        let input: ListTicketsInput = serde_json::from_str(
            r#"{"status": "  ", "priority": " P1 ", "department_id": 2}"#,
        )
        .unwrap();
        let filters = input.sanitize().to_filters();
        assert_eq!(
            filters.to_query().to_query_string(),
            "priority=P1&department_id=2"
        );
    }

    #[test]
    fn test_login_input_keeps_password_whitespace() {
        let input = LoginInput {
            email: " lead@desk.io ".to_string(),
            password: " pass ".to_string(),
        }
        .sanitize();
        assert_eq!(input.email, "lead@desk.io");
        assert_eq!(input.password, " pass ");
    }

    #[test]
    fn test_ml_logs_input_defaults() {
        let input: ListMlLogsInput = serde_json::from_str("{}").unwrap();
        assert_eq!(input.to_query(), MlLogQuery::default());
    }

    #[test]
    fn test_ml_logs_input_parses_enums() {
        let input: ListMlLogsInput =
            serde_json::from_str(r#"{"feedback_type": "explicit", "priority_pair": "mismatch"}"#)
                .unwrap();
        let query = input.to_query();
        assert_eq!(query.feedback_type, FeedbackType::Explicit);
        assert_eq!(query.priority_pair, PriorityPair::Mismatch);
    }

    #[test]
    fn test_resolve_triage_blank_reason_dropped() {
        let input = ResolveTriageInput {
            ticket_id: " 7 ".to_string(),
            priority_final: "P2".to_string(),
            category_final: "Network".to_string(),
            reason: Some("  ".to_string()),
        }
        .sanitize();
        assert_eq!(input.ticket_id, "7");
        assert_eq!(input.reason, None);
    }
}
