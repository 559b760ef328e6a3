//! Application configuration for the Flowline server.

use serde::Deserialize;

use crate::engine::EngineOptions;

/// Application configuration loaded from environment variables.
///
/// Environment variables are prefixed with `FLOWLINE_`:
/// - `FLOWLINE_HOST`: Server bind address (default: "0.0.0.0")
/// - `FLOWLINE_PORT`: Server port (default: 8084)
/// - `FLOWLINE_DEBUG`: Enable debug mode (default: false)
/// - `FLOWLINE_SERVER_NAME`: Server name for identification
/// - `FLOWLINE_WORKFLOW_DIR`: Serve workflow definitions from a directory
///   instead of Postgres (development mode)
/// - `FLOWLINE_COMPLETION_URL`: Text-completion gateway endpoint
/// - `FLOWLINE_EMAIL_WEBHOOK_URL` / `FLOWLINE_SLACK_WEBHOOK_URL` /
///   `FLOWLINE_SMS_WEBHOOK_URL`: Notification channel webhooks
/// - `FLOWLINE_ENFORCE_STEP_TIMEOUTS`: Enforce per-step timeouts (default: false)
/// - `FLOWLINE_DEPENDENCY_ORDER`: Schedule steps in dependency order (default: false)
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Enable debug mode
    #[serde(default)]
    pub debug: bool,

    /// Server name for identification
    #[serde(default = "default_server_name")]
    pub server_name: String,

    /// Directory of workflow definition files (development mode)
    #[serde(default)]
    pub workflow_dir: Option<String>,

    /// Text-completion gateway endpoint
    #[serde(default)]
    pub completion_url: Option<String>,

    /// Email channel webhook
    #[serde(default)]
    pub email_webhook_url: Option<String>,

    /// Slack channel webhook
    #[serde(default)]
    pub slack_webhook_url: Option<String>,

    /// SMS channel webhook
    #[serde(default)]
    pub sms_webhook_url: Option<String>,

    /// Enforce per-step timeouts as cancellation deadlines
    #[serde(default)]
    pub enforce_step_timeouts: bool,

    /// Schedule steps in dependency order instead of declaration order
    #[serde(default)]
    pub dependency_order: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8084
}

fn default_server_name() -> String {
    "flowline-server".to_string()
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables are prefixed with `FLOWLINE_`.
    pub fn from_env() -> Result<Self, envy::Error> {
        envy::prefixed("FLOWLINE_").from_env::<AppConfig>()
    }

    /// Get the server bind address as a string suitable for `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Engine options derived from this configuration.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            enforce_timeouts: self.enforce_step_timeouts,
            dependency_order: self.dependency_order,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            debug: false,
            server_name: default_server_name(),
            workflow_dir: None,
            completion_url: None,
            email_webhook_url: None,
            slack_webhook_url: None,
            sms_webhook_url: None,
            enforce_step_timeouts: false,
            dependency_order: false,
        }
    }
}
