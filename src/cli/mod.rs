use crate::render::ViewMode;
use chrono::NaiveDate;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the front-end server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:3000")]
    pub server_addr: String,

    /// Upstream planning backend that `/api/*` requests are forwarded to.
    #[arg(long, env = "BACKEND_URL", default_value = "http://localhost:8000")]
    pub backend_url: String,

    /// Optional path to the TLS certificate file (PEM format). Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format). Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,

    // --- Client Args ---
    /// Backend base URL the client calls directly. When unset, requests go
    /// through the front-end at --origin.
    #[arg(long, env = "DIRECT_BACKEND_URL")]
    pub direct_backend_url: Option<String>,

    /// Origin of the front-end server used for same-origin requests.
    #[arg(long, env = "ORIGIN", default_value = "http://127.0.0.1:3000")]
    pub origin: String,

    /// Submit a single destination to the demo planner and print the plan.
    #[arg(short = 'q', long)]
    pub query: Option<String>,

    /// Start an interactive chat session against the planning backend.
    #[arg(long, default_value = "false")]
    pub chat: bool,

    /// First day of the trip (YYYY-MM-DD).
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Last day of the trip (YYYY-MM-DD).
    #[arg(long)]
    pub end_date: Option<NaiveDate>,

    /// Which part of a chat answer to list (ideas, timeline).
    #[arg(long, default_value = "timeline")]
    pub view: ViewMode,

    /// Write the last result to the saved-plan store before exiting.
    #[arg(long, default_value = "false")]
    pub save_plan: bool,

    /// Restore the saved plan before the session starts.
    #[arg(long, default_value = "false")]
    pub load_plan: bool,

    /// Location of the client-local saved-plan store.
    #[arg(long, env = "SAVED_PLAN_PATH", default_value = "riff_saved_plan.json")]
    pub saved_plan_path: String,
}

impl Args {
    pub fn is_client(&self) -> bool {
        self.query.is_some() || self.chat
    }

    pub fn tls_paths(&self) -> Option<(&str, &str)> {
        if !self.enable_tls {
            return None;
        }
        match (&self.tls_cert_path, &self.tls_key_path) {
            (Some(cert), Some(key)) => Some((cert.as_str(), key.as_str())),
            _ => None,
        }
    }
}
