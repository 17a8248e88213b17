use anyhow::{Context, Result};

use crate::api::ApiClient;
use crate::feed::KnownStatus;

pub struct ActionDispatcher<'a> {
    api: &'a ApiClient,
}

impl<'a> ActionDispatcher<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    pub fn set_status(
        &self,
        notification_id: u64,
        status: KnownStatus,
        message: Option<String>,
    ) -> Result<()> {
        self.api
            .update_status(notification_id, &status.to_string(), message)
            .with_context(|| format!("updating status of notification {notification_id}"))
    }

    pub fn delete_notification(&self, notification_id: u64) -> Result<()> {
        self.api
            .delete_notification(notification_id)
            .with_context(|| format!("deleting notification {notification_id}"))
    }

    pub fn delete_user(&self, email: &str) -> Result<()> {
        self.api
            .delete_user(email)
            .with_context(|| format!("deleting user {email}"))
    }
}
