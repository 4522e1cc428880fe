//! Shared test doubles for unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`http`]: [`ScriptedHttpClient`], an [`HttpClient`](crate::fetch::HttpClient)
//!   that replays canned responses and records every request it sees.
//! - [`publisher`]: [`RecordingPublisher`], a [`Publisher`](crate::services::publisher::Publisher)
//!   that records what it was asked to publish.

pub mod http;
pub mod publisher;

pub use self::http::{RecordedRequest, ScriptedHttpClient};
pub use self::publisher::{PublishedPost, RecordingPublisher};
