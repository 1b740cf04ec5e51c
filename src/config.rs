use anyhow::Context;
use std::env;
use std::net::IpAddr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl_minutes: u64,
    pub sweep_interval_minutes: u32,
    pub max_sessions: usize,
    /// Adds `Secure` to the session cookie. Enable behind a TLS terminating proxy.
    pub secure_cookie: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: IpAddr,
    pub flight_offers_url: String,
    pub max_offers: u32,
    pub request_timeout_secs: u64,
    pub session: SessionConfig,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Config {
            port: env_or("KING_AIRLINES_PORT", "18480")
                .parse()
                .context("KING_AIRLINES_PORT must be a port number")?,
            host: env_or("KING_AIRLINES_HOST", "0.0.0.0")
                .parse()
                .context("KING_AIRLINES_HOST must be an IP address")?,
            flight_offers_url: env_or(
                "KING_AIRLINES_FLIGHT_OFFERS_URL",
                "https://localhost:7238/api/GetFlightOffers/GetFlightOffers",
            ),
            max_offers: env_or("KING_AIRLINES_MAX_OFFERS", "3")
                .parse()
                .context("KING_AIRLINES_MAX_OFFERS must be a positive integer")?,
            request_timeout_secs: env_or("KING_AIRLINES_REQUEST_TIMEOUT_SECS", "30")
                .parse()
                .context("KING_AIRLINES_REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            session: SessionConfig {
                ttl_minutes: env_or("KING_AIRLINES_SESSION_TTL_MINUTES", "60")
                    .parse()
                    .context("KING_AIRLINES_SESSION_TTL_MINUTES must be a number of minutes")?,
                sweep_interval_minutes: env_or("KING_AIRLINES_SESSION_SWEEP_INTERVAL_MINUTES", "5")
                    .parse()
                    .context(
                        "KING_AIRLINES_SESSION_SWEEP_INTERVAL_MINUTES must be a number of minutes",
                    )?,
                max_sessions: env_or("KING_AIRLINES_MAX_SESSIONS", "10000")
                    .parse()
                    .context("KING_AIRLINES_MAX_SESSIONS must be a positive integer")?,
                secure_cookie: env_or("KING_AIRLINES_SECURE_COOKIE", "false")
                    .parse()
                    .context("KING_AIRLINES_SECURE_COOKIE must be true or false")?,
            },
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session.ttl_minutes * 60)
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
