//! Mock drawing provider for testing
//!
//! This module provides a scripted provider that replays queued responses
//! and records every request it receives.

use crate::error::Result;
use crate::provider::DrawingProvider;
use crate::request::{DrawingRequest, DrawingResponse};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Model name reported by the mock
const MOCK_MODEL: &str = "mock-1";

/// A mock provider that returns queued responses or a default empty turn.
#[derive(Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<DrawingResponse>>>>,
    requests: Arc<Mutex<Vec<DrawingRequest>>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a new mock provider.
    #[must_use]
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock that answers with the given raw texts in order.
    #[must_use]
    pub fn with_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for text in texts {
            mock.add_response(DrawingResponse::text(text).with_model(MOCK_MODEL));
        }
        mock
    }

    /// Add a response to the queue.
    pub fn add_response(&self, response: DrawingResponse) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Ok(response));
    }

    /// Add a failure to the queue.
    pub fn add_error(&self, error: crate::Error) {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Err(error));
    }

    /// Requests received so far, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<DrawingRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received so far.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait::async_trait]
impl DrawingProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        MOCK_MODEL
    }

    async fn send_drawing_request(&self, request: &DrawingRequest) -> Result<DrawingResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let mut responses = self.responses.lock().unwrap_or_else(|e| e.into_inner());
        match responses.pop_front() {
            Some(resp) => resp,
            // Default behavior if queue empty
            None => Ok(DrawingResponse::text("mock response").with_model(MOCK_MODEL)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[tokio::test]
    async fn test_replays_queue_in_order() {
        let mock = MockProvider::with_texts(["first", "second"]);
        let req = DrawingRequest::default();

        let a = mock.send_drawing_request(&req).await.unwrap();
        let b = mock.send_drawing_request(&req).await.unwrap();
        assert_eq!(a.raw_text, "first");
        assert_eq!(b.raw_text, "second");
        assert_eq!(a.model, "mock-1");
    }

    #[tokio::test]
    async fn test_default_when_empty() {
        let mock = MockProvider::new();
        let resp = mock
            .send_drawing_request(&DrawingRequest::default())
            .await
            .unwrap();
        assert_eq!(resp.raw_text, "mock response");
    }

    #[tokio::test]
    async fn test_scripted_error() {
        let mock = MockProvider::new();
        mock.add_error(Error::RateLimit);
        let result = mock.send_drawing_request(&DrawingRequest::default()).await;
        assert!(matches!(result, Err(Error::RateLimit)));
    }

    #[test]
    fn test_records_requests() {
        let mock = MockProvider::new();
        let shared = mock.clone();
        let req = DrawingRequest {
            iteration: 4,
            ..DrawingRequest::default()
        };

        tokio_test::block_on(shared.send_drawing_request(&req)).unwrap();

        assert_eq!(mock.request_count(), 1);
        assert_eq!(mock.requests()[0].iteration, 4);
        assert_eq!(mock.name(), "mock");
    }
}
