use async_trait::async_trait;
use github_notifier_shared::api::{NotificationDto, rest::GitHubClient};

use crate::AppError;

pub type NotificationRecord = NotificationDto;

/// Anything that can produce the current notification list for a credential.
#[async_trait]
pub trait NotificationSource: Send + Sync {
    async fn fetch(&self, credential: &str) -> Result<Vec<NotificationRecord>, AppError>;
}

#[async_trait]
impl NotificationSource for GitHubClient {
    async fn fetch(&self, credential: &str) -> Result<Vec<NotificationRecord>, AppError> {
        Ok(self.notifications(credential).await?)
    }
}
