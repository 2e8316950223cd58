//! MCP server implementation for desklink.
//!
//! This module defines the `DeskServer` struct that implements the MCP
//! `ServerHandler` trait, exposing the desk client's operations as tools.

use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ServerHandler,
};
use serde_json::Value;

use crate::desk_client::DeskClient;
use crate::error::DeskError;
use crate::tools::{
    AssignTicketInput, ListMlLogsInput, ListModelsInput, ListTicketsInput, ListTrainingJobsInput,
    LoginInput, ModelVersionInput, ResolveTriageInput, TicketIdInput, TrainingJobIdInput,
    TriggerTrainingInput, UpdateStatusInput,
};

/// The desklink MCP server.
///
/// This server exposes service desk operations as MCP tools.
#[derive(Clone)]
pub struct DeskServer {
    /// Desk client for API operations.
    client: DeskClient,
    /// Tool router for MCP tool dispatch.
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DeskServer {
    /// Creates a new server instance.
    ///
    /// # Arguments
    ///
    /// * `client` - The desk client for API operations
    pub fn new(client: DeskClient) -> Self {
        Self {
            client,
            tool_router: Self::tool_router(),
        }
    }

    /// A simple ping tool to verify the server is running.
    #[tool(description = "Test connectivity to the desklink MCP server. Returns 'pong' if the server is running correctly.")]
    fn ping(&self) -> String {
        tracing::debug!("ping tool called");
        "pong".to_string()
    }

    // ========================================================================
    // Session tools
    // ========================================================================

    /// Log in and keep the session for later tool calls.
    #[tool(description = "Log in to the service desk with e-mail and password. The session is kept for all later tool calls.")]
    async fn login(&self, Parameters(input): Parameters<LoginInput>) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(email = %input.email, "login tool called");

        self.client
            .login(&input.email, &input.password)
            .await
            .map_err(|e| failure("log in", &e))?;

        Ok(format!("Logged in as {}.", input.email))
    }

    /// Forget the stored session.
    #[tool(description = "Log out. Forgets the stored session; no request is sent to the service desk.")]
    async fn logout(&self) -> Result<String, String> {
        tracing::debug!("logout tool called");
        self.client.logout().map_err(|e| failure("log out", &e))?;
        Ok("Logged out.".to_string())
    }

    /// Show the logged-in user's profile.
    #[tool(description = "Show the profile of the logged-in user, including role and department.")]
    async fn whoami(&self) -> Result<String, String> {
        tracing::debug!("whoami tool called");
        if !self.client.is_authenticated() {
            return Ok("Not logged in. Use the login tool first.".to_string());
        }
        let me = self
            .client
            .get_me()
            .await
            .map_err(|e| failure("get the current user", &e))?;
        Ok(format_json(&me))
    }

    // ========================================================================
    // Ticket tools
    // ========================================================================

    /// List tickets with optional filters.
    #[tool(description = "List service desk tickets. Can filter by status, priority, category, department, assignee, author, or triage state.")]
    async fn list_tickets(
        &self,
        Parameters(input): Parameters<ListTicketsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "list_tickets tool called");

        let tickets = self
            .client
            .get_tickets(&input.to_filters())
            .await
            .map_err(|e| failure("list tickets", &e))?;

        Ok(format_list(&tickets, "ticket"))
    }

    /// Get full details of a single ticket.
    #[tool(description = "Get full details of a single ticket, including ML suggestions and triage state.")]
    async fn get_ticket(
        &self,
        Parameters(input): Parameters<TicketIdInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "get_ticket tool called");

        let ticket = self
            .client
            .get_ticket(&input.ticket_id)
            .await
            .map_err(|e| failure(&format!("get ticket {}", input.ticket_id), &e))?;

        Ok(format_json(&ticket))
    }

    /// Change a ticket's status.
    #[tool(description = "Change a ticket's status (NEW, TRIAGE, IN_PROGRESS, RESOLVED, CLOSED). The service desk decides which transitions are allowed.")]
    async fn update_ticket_status(
        &self,
        Parameters(input): Parameters<UpdateStatusInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, status = %input.status, "update_ticket_status tool called");

        let ticket = self
            .client
            .update_ticket_status(&input.ticket_id, &input.status)
            .await
            .map_err(|e| failure(&format!("update ticket {}", input.ticket_id), &e))?;

        Ok(format_json(&ticket))
    }

    /// Claim a ticket for the logged-in agent.
    #[tool(description = "Claim a ticket for the logged-in agent.")]
    async fn claim_ticket(
        &self,
        Parameters(input): Parameters<TicketIdInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "claim_ticket tool called");

        let ticket = self
            .client
            .claim_ticket(&input.ticket_id)
            .await
            .map_err(|e| failure(&format!("claim ticket {}", input.ticket_id), &e))?;

        Ok(format_json(&ticket))
    }

    /// Assign a ticket to an agent.
    #[tool(description = "Assign a ticket to an agent by user ID, or unassign it by omitting assignee_id. Requires a lead or admin session.")]
    async fn assign_ticket(
        &self,
        Parameters(input): Parameters<AssignTicketInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, assignee_id = ?input.assignee_id, "assign_ticket tool called");

        let ticket = self
            .client
            .assign_ticket(&input.ticket_id, input.assignee_id)
            .await
            .map_err(|e| failure(&format!("assign ticket {}", input.ticket_id), &e))?;

        Ok(format_json(&ticket))
    }

    /// Resolve triage for a ticket.
    #[tool(description = "Resolve triage for a ticket by setting the final priority and category, with an optional reason for changing the suggested priority.")]
    async fn resolve_triage(
        &self,
        Parameters(input): Parameters<ResolveTriageInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(ticket_id = %input.ticket_id, "resolve_triage tool called");

        let ticket = self
            .client
            .resolve_triage(
                &input.ticket_id,
                &input.priority_final,
                &input.category_final,
                input.reason.as_deref(),
            )
            .await
            .map_err(|e| failure(&format!("resolve triage for ticket {}", input.ticket_id), &e))?;

        Ok(format_json(&ticket))
    }

    /// List departments.
    #[tool(description = "List departments. Use the IDs to filter tickets by department.")]
    async fn list_departments(&self) -> Result<String, String> {
        tracing::debug!("list_departments tool called");

        let departments = self
            .client
            .get_departments()
            .await
            .map_err(|e| failure("list departments", &e))?;

        Ok(format_list(&departments, "department"))
    }

    // ========================================================================
    // ML tools
    // ========================================================================

    /// List ML prediction logs.
    #[tool(description = "List ML prediction logs. Filter by a single ticket or a ticket ID range, feedback type, and whether ML and LLM priorities agree.")]
    async fn list_ml_logs(
        &self,
        Parameters(input): Parameters<ListMlLogsInput>,
    ) -> Result<String, String> {
        tracing::debug!(?input, "list_ml_logs tool called");

        let logs = self
            .client
            .get_ml_logs(&input.to_query())
            .await
            .map_err(|e| failure("list ML logs", &e))?;

        Ok(format_list(&logs, "log entry"))
    }

    /// Show whether a retrain is due.
    #[tool(description = "Show the ML training status: whether a retrain is due and how much new feedback has accumulated.")]
    async fn training_status(&self) -> Result<String, String> {
        tracing::debug!("training_status tool called");

        let status = self
            .client
            .get_training_status()
            .await
            .map_err(|e| failure("get training status", &e))?;

        Ok(format_json(&status))
    }

    /// Start a training run.
    #[tool(description = "Start ML model training. Set force to retrain even without enough new feedback. Requires an admin session.")]
    async fn trigger_training(
        &self,
        Parameters(input): Parameters<TriggerTrainingInput>,
    ) -> Result<String, String> {
        let force = input.force.unwrap_or(false);
        tracing::debug!(force, "trigger_training tool called");

        let result = self
            .client
            .trigger_training(force)
            .await
            .map_err(|e| failure("trigger training", &e))?;

        Ok(format_json(&result))
    }

    /// List model versions.
    #[tool(description = "List trained ML model versions with their metrics.")]
    async fn list_models(
        &self,
        Parameters(input): Parameters<ListModelsInput>,
    ) -> Result<String, String> {
        tracing::debug!(?input, "list_models tool called");

        let models = self
            .client
            .get_models(input.limit)
            .await
            .map_err(|e| failure("list models", &e))?;

        Ok(format_list(&models, "model"))
    }

    /// Activate a model version.
    #[tool(description = "Make a trained model version the active one used for ticket classification. Requires an admin session.")]
    async fn activate_model(
        &self,
        Parameters(input): Parameters<ModelVersionInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(version = %input.version, "activate_model tool called");

        let result = self
            .client
            .activate_model(&input.version)
            .await
            .map_err(|e| failure(&format!("activate model {}", input.version), &e))?;

        Ok(format_json(&result))
    }

    /// List training jobs.
    #[tool(description = "List ML training jobs, newest first. Can filter by status (RUNNING, COMPLETED, FAILED).")]
    async fn list_training_jobs(
        &self,
        Parameters(input): Parameters<ListTrainingJobsInput>,
    ) -> Result<String, String> {
        let input = input.sanitize();
        tracing::debug!(?input, "list_training_jobs tool called");

        let jobs = self
            .client
            .get_training_jobs(&input.to_query())
            .await
            .map_err(|e| failure("list training jobs", &e))?;

        Ok(format_list(&jobs, "training job"))
    }

    /// Get one training job.
    #[tool(description = "Get details of a single ML training job.")]
    async fn get_training_job(
        &self,
        Parameters(input): Parameters<TrainingJobIdInput>,
    ) -> Result<String, String> {
        tracing::debug!(job_id = input.job_id, "get_training_job tool called");

        let job = self
            .client
            .get_training_job(input.job_id)
            .await
            .map_err(|e| failure(&format!("get training job {}", input.job_id), &e))?;

        Ok(format_json(&job))
    }
}

#[tool_handler]
impl ServerHandler for DeskServer {
    /// Returns server information for the MCP initialize handshake.
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "desklink provides access to the service desk. \
                 Log in first with login. Use list_tickets and get_ticket to find work, \
                 claim_ticket, update_ticket_status, assign_ticket and resolve_triage to act on it, \
                 and list_departments for department IDs. ML tools: list_ml_logs, training_status, \
                 trigger_training, list_models, activate_model, list_training_jobs, get_training_job."
                    .into(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

// ============================================================================
// Response formatting helpers
// ============================================================================

/// Logs a failed operation and renders it for the tool caller.
fn failure(action: &str, error: &DeskError) -> String {
    tracing::error!(error = %error, action = action, "Tool call failed");
    match error.status() {
        Some(status) => format!("Failed to {}: {} (HTTP {})", action, error.message(), status.as_u16()),
        None => format!("Failed to {}: {}", action, error.message()),
    }
}

/// Pretty-prints a JSON value.
fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Pretty-prints a JSON list with a count header.
fn format_list(value: &Value, noun: &str) -> String {
    match value.as_array() {
        Some(items) if items.is_empty() => format!("No {}s found.", noun),
        Some(items) => format!("Found {} {}(s):\n\n{}", items.len(), noun, format_json(value)),
        None => format_json(value),
    }
}
