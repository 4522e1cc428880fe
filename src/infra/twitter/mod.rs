//! Twitter-backed [`Publisher`](crate::services::publisher::Publisher).

mod client;

pub use client::{MEDIA_METADATA_URL, MEDIA_UPLOAD_URL, STATUS_UPDATE_URL, TwitterClient};
