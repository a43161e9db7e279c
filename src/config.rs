use anyhow::Result;
use tracing::{error, info};

/// Relation id that marks a database entry as a snippet page.
pub const SNIPPET_RELATION_ID: &str = "27645c06-3330-80d7-b46d-d88b0dda1ab8";

/// Fixed property names of the shared database schema.
pub const TITLE_PROPERTY: &str = "Name";
pub const AREA_PROPERTY: &str = "Area/Resource";
pub const WHO_PROPERTY: &str = "Who";
pub const DATE_PROPERTY: &str = "날짜";

/// Compiled-in collaborator name to email table, in definition order.
/// Reconciliation appends a fallback result for each of these users.
pub const USER_EMAILS: &[(&str, &str)] = &[
    ("뚜뚜", "ocean1229@gachon.ac.kr"),
    ("양털", "k0278kim@gachon.ac.kr"),
    ("도다리", "rimx2@gachon.ac.kr"),
];

/// Looks up the email for a collaborator name in the static table.
pub fn email_for(name: &str) -> Option<&'static str> {
    USER_EMAILS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, email)| *email)
}

/// What the tree walker does when fetching children of a block fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailurePolicy {
    /// Treat the subtree as empty and keep walking.
    FailOpen,
    /// Propagate the error and abort the walk.
    FailClosed,
}

/// Tree walker limits and failure policy.
#[derive(Debug, Clone)]
pub struct WalkConfig {
    pub policy: FetchFailurePolicy,
    pub max_depth: usize,
}

impl Default for WalkConfig {
    fn default() -> Self {
        WalkConfig {
            policy: FetchFailurePolicy::FailOpen,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

const DEFAULT_MAX_DEPTH: usize = 16;

/// Process-wide configuration, constructed once at startup and passed by
/// reference into every component.
#[derive(Debug, Clone)]
pub struct Config {
    /// Notion integration token (`Authorization: Bearer ...`).
    pub notion_token: String,
    /// Id of the shared Notion database.
    pub notion_database_id: String,
    /// Token the n8n webhook expects as `api_id`.
    pub snippet_token: String,
    /// Shared secret checked against the `Api-Key` request header.
    pub api_key: String,
    pub walk: WalkConfig,
}

impl Config {
    /// Reads required secrets and optional walker tuning from the
    /// environment. Call `dotenvy::dotenv()` first if a `.env` file
    /// should be honoured.
    pub fn from_env() -> Result<Self> {
        let notion_token = require_var("NOTION_TOKEN")?;
        let notion_database_id = require_var("NOTION_DATABASE_ID")?;
        let snippet_token = require_var("SNIPPET_TOKEN")?;
        let api_key = require_var("API_KEY")?;

        let policy = match std::env::var("WALK_FAIL_CLOSED") {
            Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => {
                FetchFailurePolicy::FailClosed
            }
            _ => FetchFailurePolicy::FailOpen,
        };

        let max_depth = match std::env::var("WALK_MAX_DEPTH") {
            Ok(v) => match v.parse::<usize>() {
                Ok(depth) => depth,
                Err(e) => {
                    error!(error = ?e, value = %v, "WALK_MAX_DEPTH must be an integer");
                    return Err(anyhow::anyhow!("WALK_MAX_DEPTH must be an integer: {e}"));
                }
            },
            Err(_) => DEFAULT_MAX_DEPTH,
        };

        info!(
            database_id = %notion_database_id,
            ?policy,
            max_depth,
            "Config loaded from environment"
        );

        Ok(Config {
            notion_token,
            notion_database_id,
            snippet_token,
            api_key,
            walk: WalkConfig { policy, max_depth },
        })
    }
}

fn require_var(name: &str) -> Result<String> {
    match std::env::var(name) {
        Ok(value) => Ok(value),
        Err(e) => {
            error!(var = name, "Required environment variable not set");
            Err(anyhow::anyhow!("{name} environment variable not set: {e}"))
        }
    }
}
