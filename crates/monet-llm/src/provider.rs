//! Drawing provider trait definition
//!
//! This module defines the capability every generation backend implements.

use crate::error::Result;
use crate::request::{DrawingRequest, DrawingResponse};

/// Trait for drawing providers
#[async_trait::async_trait]
pub trait DrawingProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Send one drawing turn and return the model's answer
    async fn send_drawing_request(&self, request: &DrawingRequest) -> Result<DrawingResponse>;
}
