//! Service configuration.

use std::time::Duration;

/// Default success probability of the demo payment simulator.
pub const DEFAULT_SIMULATION_SUCCESS_RATE: f64 = 0.8;

/// Default delay before the simulator resolves a payment.
pub const DEFAULT_SIMULATION_DELAY_MS: u64 = 3000;

/// Default lifetime of an admin session token (8 hours).
pub const DEFAULT_ADMIN_TOKEN_TTL_SECONDS: u64 = 8 * 60 * 60;

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Path to `RocksDB` data directory (default: "/data/fusionpay").
    pub data_dir: String,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Emails allowed to sign in as admin, lowercased.
    pub admin_emails: Vec<String>,

    /// HMAC secret for admin session tokens. Admin login is unavailable without it.
    pub admin_token_secret: Option<String>,

    /// Admin session lifetime in seconds.
    pub admin_token_ttl_seconds: u64,

    /// Admin account created at startup if missing.
    pub admin_bootstrap_email: Option<String>,

    /// Password for the bootstrap admin account.
    pub admin_bootstrap_password: Option<String>,

    /// Shared secret for payment webhook signatures (optional).
    pub webhook_secret: Option<String>,

    /// Demo payment simulator settings.
    pub simulation: SimulationConfig,
}

/// Demo payment simulator settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationConfig {
    /// Whether `POST /api/payment/process` schedules a simulated resolution.
    pub enabled: bool,

    /// Probability in `[0, 1]` that a simulated payment succeeds.
    pub success_rate: f64,

    /// Delay before the simulated resolution.
    pub delay_ms: u64,
}

impl SimulationConfig {
    /// The configured delay as a `Duration`.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            success_rate: DEFAULT_SIMULATION_SUCCESS_RATE,
            delay_ms: DEFAULT_SIMULATION_DELAY_MS,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".into()),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "/data/fusionpay".into()),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(1024 * 1024), // 1MB
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS").unwrap_or(30),
            admin_emails: parse_email_list(&std::env::var("ADMIN_EMAILS").unwrap_or_default()),
            admin_token_secret: env_non_empty("ADMIN_TOKEN_SECRET"),
            admin_token_ttl_seconds: env_parse("ADMIN_TOKEN_TTL_SECONDS")
                .unwrap_or(DEFAULT_ADMIN_TOKEN_TTL_SECONDS),
            admin_bootstrap_email: env_non_empty("ADMIN_BOOTSTRAP_EMAIL"),
            admin_bootstrap_password: env_non_empty("ADMIN_BOOTSTRAP_PASSWORD"),
            webhook_secret: env_non_empty("PAYMENT_WEBHOOK_SECRET"),
            simulation: SimulationConfig {
                enabled: env_parse("SIMULATION_ENABLED").unwrap_or(true),
                success_rate: sanitize_rate(
                    env_parse("SIMULATION_SUCCESS_RATE").unwrap_or(DEFAULT_SIMULATION_SUCCESS_RATE),
                ),
                delay_ms: env_parse("SIMULATION_DELAY_MS").unwrap_or(DEFAULT_SIMULATION_DELAY_MS),
            },
        }
    }

    /// Whether `email` is on the admin allow-list (case-insensitive).
    #[must_use]
    pub fn is_admin_email(&self, email: &str) -> bool {
        let email = email.trim().to_ascii_lowercase();
        self.admin_emails.iter().any(|allowed| *allowed == email)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

/// Split a comma separated list of emails, dropping blanks.
#[must_use]
pub fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Clamp a success rate into `[0, 1]`, falling back to the default for NaN.
#[must_use]
pub fn sanitize_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        tracing::warn!("SIMULATION_SUCCESS_RATE is not a number, using default");
        DEFAULT_SIMULATION_SUCCESS_RATE
    } else {
        rate.clamp(0.0, 1.0)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            data_dir: "/data/fusionpay".into(),
            cors_origins: vec!["*".into()],
            max_body_bytes: 1024 * 1024,
            request_timeout_seconds: 30,
            admin_emails: Vec::new(),
            admin_token_secret: None,
            admin_token_ttl_seconds: DEFAULT_ADMIN_TOKEN_TTL_SECONDS,
            admin_bootstrap_email: None,
            admin_bootstrap_password: None,
            webhook_secret: None,
            simulation: SimulationConfig::default(),
        }
    }
}
