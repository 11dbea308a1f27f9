//! Outbound notifications.
//!
//! Delivery is best-effort: services call [`deliver`] after their transaction
//! has committed, and a failed send is logged, never returned to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
  WithdrawalApproved,
  WithdrawalRejected,
  ReferralCommission,
}

#[derive(Debug, Clone, Serialize)]
pub struct Notification {
  pub recipient: i64,
  pub kind: NotificationKind,
  pub template: &'static str,
  pub data: json::Value,
}

#[async_trait]
pub trait Notifier: Send + Sync {
  async fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}

pub async fn deliver(notifier: &dyn Notifier, notification: Notification) {
  if let Err(err) = notifier.send(&notification).await {
    warn!(
      "Failed to deliver {:?} to actor {}: {err:#}",
      notification.kind, notification.recipient
    );
  }
}

/// Writes notifications to the log only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
  async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
    info!(
      recipient = notification.recipient,
      template = notification.template,
      "notification {:?}: {}",
      notification.kind,
      notification.data
    );
    Ok(())
  }
}

/// POSTs every notification as JSON to a fixed URL.
pub struct WebhookNotifier {
  client: Client,
  url: String,
}

impl WebhookNotifier {
  pub fn new(url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self { client, url: url.into() })
  }
}

#[async_trait]
impl Notifier for WebhookNotifier {
  async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
    self
      .client
      .post(&self.url)
      .json(notification)
      .send()
      .await?
      .error_for_status()?;

    debug!("Delivered {:?} to {}", notification.kind, self.url);
    Ok(())
  }
}
