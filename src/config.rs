use std::env;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Database connection URL
    /// Format: sqlite://PATH?mode=rwc
    pub database_url: String,

    /// Base URL of the mailbox gateway used for inbox sync
    pub mail_api_url: String,

    /// Bearer token for the mailbox gateway
    pub mail_api_token: String,

    /// API key for the AI completion service
    pub openai_api_key: String,

    /// Base URL of the AI completion service
    pub openai_base_url: String,

    /// Completion model used for email field extraction
    pub openai_model: String,

    /// Base URL of the calendar service
    pub calendar_api_url: String,

    /// Bearer token for the calendar service
    pub calendar_api_token: String,

    /// Target calendar id
    pub calendar_id: String,

    /// Time zone attached to pushed calendar entries
    pub calendar_time_zone: String,

    /// Address and port the HTTP server binds to
    pub host: String,
    pub port: u16,

    /// Maximum payload size for all requests (in bytes)
    /// Default: 10MB (10 * 1024 * 1024)
    pub max_payload_size: usize,

    /// Maximum number of pooled database connections
    pub max_db_connections: u32,

    /// Directory for rotating log files
    pub log_dir: String,

    /// Interval for the background inbox sync worker, in seconds.
    /// 0 disables the worker; the /api/sync-emails endpoint still works.
    pub inbox_sync_interval_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Required environment variables:
    /// - DATABASE_URL: SQLite connection string
    /// - MAIL_API_URL / MAIL_API_TOKEN: mailbox gateway credentials
    /// - OPENAI_API_KEY: completion service key
    /// - CALENDAR_API_TOKEN: calendar service credentials
    ///
    /// Everything else is optional and falls back to a sensible default.
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if it exists
        dotenv::dotenv().ok();

        let database_url = require("DATABASE_URL")?;
        let mail_api_url = require("MAIL_API_URL")?;
        let mail_api_token = require("MAIL_API_TOKEN")?;
        let openai_api_key = require("OPENAI_API_KEY")?;
        let calendar_api_token = require("CALENDAR_API_TOKEN")?;

        let openai_base_url = env::var("OPENAI_BASE_URL")
            .unwrap_or_else(|_| "https://api.openai.com".to_string());
        let openai_model =
            env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo-instruct".to_string());
        let calendar_api_url = env::var("CALENDAR_API_URL")
            .unwrap_or_else(|_| "https://www.googleapis.com/calendar/v3".to_string());
        let calendar_id = env::var("CALENDAR_ID").unwrap_or_else(|_| "primary".to_string());
        let calendar_time_zone =
            env::var("CALENDAR_TIME_ZONE").unwrap_or_else(|_| "UTC".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        // Parse MAX_PAYLOAD_SIZE with default fallback
        let max_payload_size = env::var("MAX_PAYLOAD_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10 * 1024 * 1024); // Default: 10MB

        let max_db_connections = env::var("MAX_DB_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());

        let inbox_sync_interval_secs = env::var("INBOX_SYNC_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);

        Ok(Config {
            database_url,
            mail_api_url,
            mail_api_token,
            openai_api_key,
            openai_base_url,
            openai_model,
            calendar_api_url,
            calendar_api_token,
            calendar_id,
            calendar_time_zone,
            host,
            port,
            max_payload_size,
            max_db_connections,
            log_dir,
            inbox_sync_interval_secs,
        })
    }
}

fn require(name: &str) -> Result<String, String> {
    env::var(name).map_err(|_| format!("{} must be set in .env file or environment", name))
}
