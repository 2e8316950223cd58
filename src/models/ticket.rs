//! Ticket filters and payloads.
//!
//! The client does not check statuses, priorities or categories against
//! any list of legal values; the backend decides what is valid.

use serde::Serialize;

use super::QueryParams;

/// Filters for listing tickets.
///
/// An ordered mapping from query parameter name to an optional value.
/// Entries without a value are left out of the query string entirely.
///
/// # Example
///
/// ```ignore
/// let filters = TicketFilters::new()
///     .with_status("TRIAGE")
///     .with_department_id(3)
///     .with("assignee_id", None::<i64>);
/// let tickets = client.get_tickets(&filters).await?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct TicketFilters {
    entries: Vec<(String, Option<String>)>,
}

impl TicketFilters {
    /// Creates an empty filter set (lists every visible ticket).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an arbitrary filter. `None` values are kept but never sent.
    pub fn with<V: ToString>(mut self, name: impl Into<String>, value: Option<V>) -> Self {
        self.entries
            .push((name.into(), value.map(|v| v.to_string())));
        self
    }

    /// Filters by status (e.g. `NEW`, `TRIAGE`, `IN_PROGRESS`).
    pub fn with_status(self, status: impl Into<String>) -> Self {
        self.with("status", Some(status.into()))
    }

    /// Filters by priority (e.g. `P1`).
    pub fn with_priority(self, priority: impl Into<String>) -> Self {
        self.with("priority", Some(priority.into()))
    }

    /// Filters by category (e.g. `Network`).
    pub fn with_category(self, category: impl Into<String>) -> Self {
        self.with("category", Some(category.into()))
    }

    /// Filters by department.
    pub fn with_department_id(self, department_id: i64) -> Self {
        self.with("department_id", Some(department_id))
    }

    /// Filters by assignee.
    pub fn with_assignee_id(self, assignee_id: i64) -> Self {
        self.with("assignee_id", Some(assignee_id))
    }

    /// Filters by ticket author.
    pub fn with_creator_id(self, creator_id: i64) -> Self {
        self.with("creator_id", Some(creator_id))
    }

    /// Restricts to tickets that do (or do not) need triage.
    pub fn with_triage_required(self, required: bool) -> Self {
        self.with("triage_required", Some(required))
    }

    /// Builds the query parameters, dropping absent values.
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        for (name, value) in &self.entries {
            params.push_opt(name.as_str(), value.as_deref());
        }
        params
    }
}

impl<K, V> FromIterator<(K, Option<V>)> for TicketFilters
where
    K: Into<String>,
    V: ToString,
{
    fn from_iter<I: IntoIterator<Item = (K, Option<V>)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(TicketFilters::new(), |filters, (name, value)| {
                filters.with(name, value)
            })
    }
}

/// Body for `PATCH /tickets/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    /// Target status.
    pub status: String,
}

/// Body for `PATCH /tickets/{id}/assign`.
#[derive(Debug, Clone, Serialize)]
pub struct AssignTicket {
    /// The agent to assign; `None` is sent as `null` to unassign.
    pub assignee_id: Option<i64>,
}

/// Body for `PATCH /tickets/{id}/triage/resolve`.
#[derive(Debug, Clone, Serialize)]
pub struct TriageResolution {
    /// Final priority decided by the lead.
    pub priority_final: String,

    /// Final category decided by the lead.
    pub category_final: String,

    /// Why the priority differs from the suggestion. Omitted when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_change_reason: Option<String>,
}

impl TriageResolution {
    /// Creates a resolution without a change reason.
    pub fn new(priority_final: impl Into<String>, category_final: impl Into<String>) -> Self {
        Self {
            priority_final: priority_final.into(),
            category_final: category_final.into(),
            priority_change_reason: None,
        }
    }

    /// Attaches a change reason. Empty reasons are treated as none.
    pub fn with_reason(mut self, reason: Option<&str>) -> Self {
        self.priority_change_reason = reason.filter(|r| !r.is_empty()).map(str::to_string);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filters_drop_absent_values() {
        let filters = TicketFilters::new()
            .with_status("NEW")
            .with("priority", None::<String>)
            .with_department_id(4);
        let query = filters.to_query();
        assert_eq!(query.to_query_string(), "status=NEW&department_id=4");
        assert!(!query.contains("priority"));
    }

    #[test]
    fn test_empty_filters_yield_empty_query() {
        let filters = TicketFilters::new().with("status", None::<&str>);
        assert!(filters.to_query().is_empty());
    }

    #[test]
    fn test_filters_from_mapping() {
        let filters: TicketFilters = vec![
            ("category", Some("Access Rights")),
            ("assignee_id", None),
        ]
        .into_iter()
        .collect();
        assert_eq!(filters.to_query().to_query_string(), "category=Access+Rights");
    }

    #[test]
    fn test_triage_required_flag() {
        let filters = TicketFilters::new().with_triage_required(true);
        assert_eq!(filters.to_query().get("triage_required"), Some("true"));
    }

    #[test]
    fn test_triage_resolution_without_reason() {
        let body = serde_json::to_value(TriageResolution::new("P2", "Network")).unwrap();
        assert_eq!(body, json!({"priority_final": "P2", "category_final": "Network"}));
    }

    #[test]
    fn test_triage_resolution_with_reason() {
        let body = serde_json::to_value(
            TriageResolution::new("P1", "Network").with_reason(Some("whole floor offline")),
        )
        .unwrap();
        assert_eq!(
            body,
            json!({
                "priority_final": "P1",
                "category_final": "Network",
                "priority_change_reason": "whole floor offline"
            })
        );
    }

    #[test]
    fn test_triage_resolution_empty_reason_omitted() {
        let body =
            serde_json::to_value(TriageResolution::new("P3", "Other").with_reason(Some(""))).unwrap();
        assert!(body.get("priority_change_reason").is_none());
    }

    #[test]
    fn test_assign_serializes_null_for_unassign() {
        let body = serde_json::to_value(AssignTicket { assignee_id: None }).unwrap();
        assert_eq!(body, json!({"assignee_id": null}));
    }
}
