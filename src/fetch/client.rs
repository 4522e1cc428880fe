use async_trait::async_trait;
use reqwest::{Request, Response};

/// Executes a prepared request. Implemented by the plain client, by signing
/// decorators such as [`OAuth1`](super::auth::OAuth1), and by test doubles.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, req: Request) -> reqwest::Result<Response>;
}
