use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::config::ApiOptions;
use crate::feed::KnownStatus;

pub mod types;

pub use types::{
    AnalyticsReport, ApiUser, DeleteUserRequest, NotificationsResponse, RawNotification,
    StatusUpdateRequest, UserSummary, UsersResponse,
};

/// Errors from the backend boundary. Everything above this layer wraps them
/// in `anyhow` with call-site context.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("could not decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unknown status name: {0}")]
    UnknownStatus(String),
    #[error("{0} was not found")]
    NotFound(String),
}

/// Blocking client for the safety-service REST backend.
pub struct ApiClient {
    http: Client,
    base: String,
}

impl ApiClient {
    pub fn new(options: &ApiOptions) -> Result<Self> {
        let http = Client::builder()
            .timeout(options.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            http,
            base: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    /// `GET /api/notifications/` — the full feed, newest data wins.
    pub fn fetch_notifications(&self) -> Result<Vec<RawNotification>, ApiError> {
        let url = format!("{}/api/notifications/", self.base);
        let body: NotificationsResponse = self.get_json(&url)?;
        debug!(count = body.notifications.len(), "fetched notifications");
        Ok(body.notifications)
    }

    /// `PUT /api/notifications/status`. The status name is resolved to its
    /// wire id locally; an unrecognized name never reaches the backend.
    pub fn update_status(
        &self,
        notification_id: u64,
        status_name: &str,
        message: Option<String>,
    ) -> Result<(), ApiError> {
        let status = KnownStatus::from_name(status_name)
            .ok_or_else(|| ApiError::UnknownStatus(status_name.to_string()))?;
        let url = format!("{}/api/notifications/status", self.base);
        let request = StatusUpdateRequest {
            notification_id,
            status_id: status.id(),
            message,
        };
        let response = self
            .http
            .put(&url)
            .json(&request)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        self.expect_success(&url, response.status())?;
        debug!(notification_id, status = %status, "updated notification status");
        Ok(())
    }

    /// `DELETE /api/notifications/delete/{id}`.
    pub fn delete_notification(&self, notification_id: u64) -> Result<(), ApiError> {
        let url = format!("{}/api/notifications/delete/{notification_id}", self.base);
        let response = self
            .http
            .delete(&url)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!(
                "notification {notification_id}"
            )));
        }
        self.expect_success(&url, response.status())?;
        debug!(notification_id, "deleted notification");
        Ok(())
    }

    /// `GET /api/users`.
    pub fn fetch_users(&self) -> Result<Vec<ApiUser>, ApiError> {
        let url = format!("{}/api/users", self.base);
        let body: UsersResponse = self.get_json(&url)?;
        debug!(count = body.users.len(), "fetched users");
        Ok(body.users)
    }

    /// `DELETE /api/users/delete` keyed by email, matching the backend route.
    pub fn delete_user(&self, email: &str) -> Result<(), ApiError> {
        let url = format!("{}/api/users/delete", self.base);
        let request = DeleteUserRequest {
            email: email.to_string(),
        };
        let response = self
            .http
            .delete(&url)
            .json(&request)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.clone(),
                source,
            })?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("user {email}")));
        }
        self.expect_success(&url, response.status())?;
        debug!(email, "deleted user");
        Ok(())
    }

    /// `GET /api/analytics`.
    pub fn fetch_analytics(&self) -> Result<AnalyticsReport, ApiError> {
        let url = format!("{}/api/analytics", self.base);
        self.get_json(&url)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|source| ApiError::Transport {
                url: url.to_string(),
                source,
            })?;
        self.expect_success(url, response.status())?;
        response.json().map_err(|source| ApiError::Decode {
            url: url.to_string(),
            source,
        })
    }

    fn expect_success(&self, url: &str, status: StatusCode) -> Result<(), ApiError> {
        if status.is_success() {
            Ok(())
        } else {
            Err(ApiError::Status {
                url: url.to_string(),
                status,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use mockito::Matcher;
    use serde_json::json;

    fn client(server: &mockito::Server) -> ApiClient {
        let options = ApiOptions {
            base_url: server.url(),
            timeout_secs: 5,
        };
        ApiClient::new(&options).expect("client builds")
    }

    fn notification_payload() -> serde_json::Value {
        json!({
            "notifications": [{
                "notification_id": 41,
                "fromUserId": 7,
                "emergencyTypeId": 2,
                "statusId": 1,
                "createdAt": "2024-03-15T12:00:00Z",
                "updatedAt": "2024-03-15T12:05:00Z",
                "user": {"id": 7, "fullName": "Thandi Nkosi"},
                "status": {"id": 1, "name": "Pending"},
                "emergencyType": {"id": 2, "name": "Fire", "description": "Fire reported"}
            }]
        })
    }

    #[test]
    fn fetch_notifications_decodes_the_envelope() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/api/notifications/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(notification_payload().to_string())
            .create();

        let fetched = client(&server).fetch_notifications().expect("fetches");
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].notification_id, 41);
        mock.assert();
    }

    #[test]
    fn non_success_status_becomes_a_status_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/notifications/")
            .with_status(500)
            .create();

        let err = client(&server).fetch_notifications().unwrap_err();
        assert_matches!(err, ApiError::Status { status, .. } if status.as_u16() == 500);
    }

    #[test]
    fn malformed_body_becomes_a_decode_error() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/notifications/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{\"notifications\": \"nope\"}")
            .create();

        let err = client(&server).fetch_notifications().unwrap_err();
        assert_matches!(err, ApiError::Decode { .. });
    }

    #[test]
    fn update_status_sends_the_resolved_id_and_message() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/api/notifications/status")
            .match_body(Matcher::Json(json!({
                "notificationId": 41,
                "statusId": 3,
                "message": "crew dispatched"
            })))
            .with_status(200)
            .create();

        client(&server)
            .update_status(41, "resolved", Some("crew dispatched".into()))
            .expect("updates");
        mock.assert();
    }

    #[test]
    fn update_status_rejects_unknown_names_without_a_request() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("PUT", "/api/notifications/status")
            .expect(0)
            .create();

        let err = client(&server)
            .update_status(41, "escalated", None)
            .unwrap_err();
        assert_matches!(err, ApiError::UnknownStatus(name) if name == "escalated");
        mock.assert();
    }

    #[test]
    fn delete_notification_maps_404_to_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("DELETE", "/api/notifications/delete/9")
            .with_status(404)
            .create();

        let err = client(&server).delete_notification(9).unwrap_err();
        assert_matches!(err, ApiError::NotFound(what) if what.contains('9'));
    }

    #[test]
    fn delete_user_sends_the_email_in_the_body() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("DELETE", "/api/users/delete")
            .match_body(Matcher::Json(json!({"email": "lerato@example.com"})))
            .with_status(200)
            .create();

        client(&server)
            .delete_user("lerato@example.com")
            .expect("deletes");
        mock.assert();
    }

    #[test]
    fn fetch_analytics_decodes_the_report() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/analytics")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "totalNotifications": 4,
                    "statusCounts": {"pending": 3, "resolved": 1},
                    "resolutionStats": {"resolved": 1, "unresolved": 3}
                })
                .to_string(),
            )
            .create();

        let report = client(&server).fetch_analytics().expect("fetches");
        assert_eq!(report.total_notifications, 4);
        assert_eq!(report.status_counts["pending"], 3);
    }
}
