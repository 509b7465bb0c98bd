//! Platform hooks the router calls back into.

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use super::notify::Notification;

/// Lifecycle and display capabilities of the hosting platform.
#[async_trait]
pub trait WorkerHost: Send + Sync {
    /// Activate the freshly installed worker without waiting for old
    /// clients to close.
    async fn skip_waiting(&self) -> Result<()>;

    /// Take control of every open client immediately.
    async fn claim_clients(&self) -> Result<()>;

    /// Display a notification. Resolves once it is shown.
    async fn show_notification(&self, notification: &Notification) -> Result<()>;
}

/// Host for the command-line runner: lifecycle hooks are logged, and
/// notifications are printed to stdout.
#[derive(Debug, Default)]
pub struct ConsoleHost;

#[async_trait]
impl WorkerHost for ConsoleHost {
    async fn skip_waiting(&self) -> Result<()> {
        info!("Skipping wait, activating immediately");
        Ok(())
    }

    async fn claim_clients(&self) -> Result<()> {
        info!("Claiming open clients");
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<()> {
        println!("[{}] {}", notification.title, notification.options.body);
        println!("{}", serde_json::to_string_pretty(&notification.options)?);
        Ok(())
    }
}
