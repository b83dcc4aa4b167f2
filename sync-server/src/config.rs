//! Configuration module for environment variable parsing.
//!
//! Everything is read once at startup into [`Config`] and passed down from
//! there; handlers never touch the environment themselves.

use std::env;
use tracing::warn;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the web server to listen on
    pub port: u16,

    /// Svix signing secret for Clerk webhooks (`whsec_...`)
    pub signing_secret: Option<String>,

    /// Maximum skew in seconds between `svix-timestamp` and now
    pub signature_tolerance_secs: u64,

    /// Clerk backend API secret key, used for metadata updates
    pub clerk_secret_key: Option<String>,

    /// Base URL of the Clerk backend API
    pub clerk_api_url: String,

    /// PEM-encoded public key for offline session token verification
    pub clerk_jwt_key: Option<String>,

    /// Optional list of allowed `azp` values on session tokens
    pub authorized_parties: Option<Vec<String>>,

    /// Where unauthenticated page requests are redirected
    pub sign_in_url: String,

    /// Route patterns reachable without a session (overrides the built-in list)
    pub public_routes: Option<Vec<String>>,

    /// Route patterns the gate never inspects (overrides the built-in list)
    pub ignored_routes: Option<Vec<String>>,

    /// HTTP request timeout in milliseconds for outbound calls
    pub request_timeout_ms: u64,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Config {
            port: parse_number("PORT", 8080),

            signing_secret: non_blank("SIGNING_SECRET"),

            signature_tolerance_secs: parse_number("WEBHOOK_TOLERANCE_SECS", 300),

            clerk_secret_key: non_blank("CLERK_SECRET_KEY"),

            clerk_api_url: env::var("CLERK_API_URL")
                .unwrap_or_else(|_| "https://api.clerk.com/v1".to_string()),

            clerk_jwt_key: non_blank("CLERK_JWT_KEY"),

            authorized_parties: parse_csv("CLERK_AUTHORIZED_PARTIES"),

            sign_in_url: env::var("CLERK_SIGN_IN_URL").unwrap_or_else(|_| "/sign-in".to_string()),

            public_routes: parse_csv("PUBLIC_ROUTES"),

            ignored_routes: parse_csv("IGNORED_ROUTES"),

            request_timeout_ms: parse_number("REQUEST_TIMEOUT_MS", 8000),

            max_body_bytes: parse_number("MAX_BODY_BYTES", 1024 * 1024),
        }
    }
}

/// Read a variable, treating unset and whitespace-only values alike.
fn non_blank(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid number, using default");
            default
        }
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(name: &str) -> Option<Vec<String>> {
    env::var(name).ok().map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
