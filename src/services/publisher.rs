//! Trait for posting the weekly chart to a social network.

use crate::error::Result;

/// Posts an image with a status text and an accessibility description.
///
/// Implementations upload `image`, attach `alt_text` to it when non-empty,
/// create the post and return its public permalink.
#[async_trait::async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(&self, image: &[u8], status: &str, alt_text: &str) -> Result<String>;
}
