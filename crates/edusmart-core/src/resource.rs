//! Generic read port used by scoped fetches.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Issues a GET against an arbitrary backend endpoint.
#[async_trait]
pub trait ResourceReader: Send + Sync {
    /// Reads `endpoint` with the given query parameters and returns the raw
    /// JSON body.
    async fn get_json(&self, endpoint: &str, query: &[(&'static str, String)]) -> Result<Value>;
}
