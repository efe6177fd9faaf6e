//! Per-request business notifications and the JSON response envelope.
//!
//! Handlers create a [`Notifications`] value, pass it by `&mut` into the
//! services they call, and finish with [`ApiResponse::from_outcome`]: if any
//! message was recorded the client gets
//! `400 {"success": false, "errors": [...]}`, otherwise
//! `200 {"success": true, "data": ...}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Accumulator of business-rule failure messages for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notifications {
    messages: Vec<String>,
}

impl Notifications {
    /// Create an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure message.
    pub fn notify(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(%message, "business rule rejected request");
        self.messages.push(message);
    }

    /// Whether any failure was recorded.
    #[must_use]
    pub fn has_any(&self) -> bool {
        !self.messages.is_empty()
    }

    /// The recorded messages, in order.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Consume the accumulator and return its messages.
    #[must_use]
    pub fn into_messages(self) -> Vec<String> {
        self.messages
    }
}

impl<S: Into<String>> Extend<S> for Notifications {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for message in iter {
            self.notify(message);
        }
    }
}

/// Response envelope returned by every mutating endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse<T> {
    /// `200 {"success": true, "data": ...}`
    Success(T),
    /// `400 {"success": false, "errors": [...]}`
    Failure(Vec<String>),
}

impl<T> ApiResponse<T> {
    /// Success when nothing was notified, otherwise a failure carrying the messages.
    pub fn from_outcome(data: T, notifications: Notifications) -> Self {
        if notifications.has_any() {
            Self::Failure(notifications.into_messages())
        } else {
            Self::Success(data)
        }
    }

    /// A failure with the recorded messages.
    #[must_use]
    pub fn failure(notifications: Notifications) -> Self {
        Self::Failure(notifications.into_messages())
    }
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<&'a [String]>,
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match &self {
            Self::Success(data) => (
                StatusCode::OK,
                Json(Envelope {
                    success: true,
                    data: Some(data),
                    errors: None,
                }),
            )
                .into_response(),
            Self::Failure(errors) => (
                StatusCode::BAD_REQUEST,
                Json(Envelope::<T> {
                    success: false,
                    data: None,
                    errors: Some(errors),
                }),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use serde_json::{Value, json};

    use super::*;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn success_envelope() {
        let response = ApiResponse::from_outcome(json!({"nome": "x"}), Notifications::new())
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"success": true, "data": {"nome": "x"}})
        );
    }

    #[tokio::test]
    async fn failure_envelope_keeps_message_order() {
        let mut notifications = Notifications::new();
        notifications.notify("first");
        notifications.extend(["second"]);

        let response = ApiResponse::from_outcome(json!({}), notifications).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"success": false, "errors": ["first", "second"]})
        );
    }
}
