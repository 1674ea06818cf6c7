pub mod smtp;
pub mod template;

pub use smtp::{SmtpNotifier, SmtpSettings};

use crate::error::NotifyError;
use async_trait::async_trait;

/// Delivers a rendered notification
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), NotifyError>;
}
