use anyhow::Context;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::deadline::{NotifierRegistry, UserReminder};
use crate::task::TaskRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub notifiers: NotifierRegistry,
    pub reminder_tx: broadcast::Sender<UserReminder>,
    pub task_repository: TaskRepository,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub host: String,
    pub port: u16,
    /// Six-field cron expression (seconds first) for the deadline poller.
    pub deadline_check_cron: String,
    pub reminder_channel_capacity: usize,
    /// Sessions with no open stream are dropped after this many idle minutes.
    pub session_idle_minutes: i64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            jwt_secret: std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .context("PORT must be a number")?,
            deadline_check_cron: std::env::var("DEADLINE_CHECK_CRON")
                .unwrap_or_else(|_| "0 * * * * *".to_string()),
            reminder_channel_capacity: parse_channel_capacity(
                &std::env::var("REMINDER_CHANNEL_CAPACITY").unwrap_or_else(|_| "100".to_string()),
            )?,
            session_idle_minutes: parse_idle_minutes(
                &std::env::var("SESSION_IDLE_MINUTES").unwrap_or_else(|_| "30".to_string()),
            )?,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `broadcast::channel` panics on zero capacity, so zero is rejected here.
fn parse_channel_capacity(raw: &str) -> anyhow::Result<usize> {
    let capacity: usize = raw
        .trim()
        .parse()
        .context("REMINDER_CHANNEL_CAPACITY must be a number")?;
    anyhow::ensure!(capacity > 0, "REMINDER_CHANNEL_CAPACITY must be greater than zero");
    Ok(capacity)
}

fn parse_idle_minutes(raw: &str) -> anyhow::Result<i64> {
    let minutes: i64 = raw
        .trim()
        .parse()
        .context("SESSION_IDLE_MINUTES must be a number")?;
    anyhow::ensure!(minutes > 0, "SESSION_IDLE_MINUTES must be greater than zero");
    Ok(minutes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_capacity_accepts_positive() {
        assert_eq!(parse_channel_capacity("100").unwrap(), 100);
        assert_eq!(parse_channel_capacity(" 1 ").unwrap(), 1);
    }

    #[test]
    fn test_channel_capacity_rejects_zero() {
        let err = parse_channel_capacity("0").unwrap_err();
        assert!(err.to_string().contains("greater than zero"));
    }

    #[test]
    fn test_channel_capacity_rejects_garbage() {
        let err = parse_channel_capacity("lots").unwrap_err();
        assert_eq!(err.to_string(), "REMINDER_CHANNEL_CAPACITY must be a number");
    }

    #[test]
    fn test_idle_minutes_rejects_zero() {
        assert_eq!(parse_idle_minutes("30").unwrap(), 30);
        assert!(parse_idle_minutes("0").is_err());
        assert!(parse_idle_minutes("-5").is_err());
    }
}
