use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::services::publisher::Publisher;

/// One call to [`RecordingPublisher::publish`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub image: Vec<u8>,
    pub status: String,
    pub alt_text: String,
}

/// Records every post and answers with a fixed permalink, or fails every
/// call when built with [`RecordingPublisher::failing`].
#[derive(Debug)]
pub struct RecordingPublisher {
    permalink: String,
    fail_with: Option<String>,
    posts: Mutex<Vec<PublishedPost>>,
}

impl RecordingPublisher {
    pub fn new(permalink: impl Into<String>) -> Self {
        Self {
            permalink: permalink.into(),
            fail_with: None,
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            permalink: String::new(),
            fail_with: Some(message.into()),
            posts: Mutex::new(Vec::new()),
        }
    }

    pub fn posts(&self) -> Vec<PublishedPost> {
        self.posts.lock().unwrap().clone()
    }
}

impl Default for RecordingPublisher {
    fn default() -> Self {
        Self::new("https://twitter.com/test/status/1")
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, image: &[u8], status: &str, alt_text: &str) -> Result<String> {
        self.posts.lock().unwrap().push(PublishedPost {
            image: image.to_vec(),
            status: status.to_string(),
            alt_text: alt_text.to_string(),
        });

        match &self.fail_with {
            Some(message) => Err(Error::post(message.clone())),
            None => Ok(self.permalink.clone()),
        }
    }
}
