use async_trait::async_trait;
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::config::TwitterCredentials;
use crate::error::{Error, Result};
use crate::fetch::auth::OAuth1;
use crate::fetch::{BasicClient, HttpClient};
use crate::services::publisher::Publisher;

pub const MEDIA_UPLOAD_URL: &str = "https://upload.twitter.com/1.1/media/upload.json";
pub const MEDIA_METADATA_URL: &str = "https://upload.twitter.com/1.1/media/metadata/create.json";
pub const STATUS_UPDATE_URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

#[derive(Deserialize)]
struct MediaUpload {
    media_id: u64,
}

#[derive(Serialize)]
struct MediaMetadata<'a> {
    media_id: String,
    alt_text: AltText<'a>,
}

#[derive(Serialize)]
struct AltText<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct Tweet {
    id_str: String,
    user: TweetUser,
}

#[derive(Deserialize)]
struct TweetUser {
    screen_name: String,
}

impl Tweet {
    fn permalink(&self) -> String {
        format!(
            "https://twitter.com/{}/status/{}",
            self.user.screen_name, self.id_str
        )
    }
}

/// Which posting step a request belongs to. Decides the error variant.
#[derive(Debug, Clone, Copy)]
enum Step {
    Upload,
    Post,
}

impl Step {
    fn rejected(self, message: String, status: u16) -> Error {
        match self {
            Step::Upload => Error::upload_status(message, status),
            Step::Post => Error::post_status(message, status),
        }
    }

    fn failed(self, message: String, source: impl std::error::Error + Send + Sync + 'static) -> Error {
        match self {
            Step::Upload => Error::upload_with_source(message, source),
            Step::Post => Error::post_with_source(message, source),
        }
    }
}

/// Twitter API v1.1 client: media upload, alt text and status update.
///
/// Every request goes through `http`, which is expected to sign it (see
/// [`TwitterClient::from_credentials`]).
pub struct TwitterClient<C> {
    http: C,
    builder: reqwest::Client,
}

impl TwitterClient<OAuth1<BasicClient>> {
    pub fn from_credentials(credentials: &TwitterCredentials) -> Self {
        Self::new(OAuth1::new(BasicClient::new(), credentials.clone()))
    }
}

impl<C: HttpClient> TwitterClient<C> {
    pub fn new(http: C) -> Self {
        Self {
            http,
            builder: reqwest::Client::new(),
        }
    }

    pub fn http(&self) -> &C {
        &self.http
    }

    /// Uploads a PNG and returns its media id.
    #[instrument(skip_all, fields(bytes = image.len()))]
    pub async fn upload_media(&self, image: &[u8]) -> Result<u64> {
        let media = Part::bytes(image.to_vec()).file_name("graph.png");
        let form = Form::new().part("media", media);
        let req = self
            .builder
            .post(MEDIA_UPLOAD_URL)
            .multipart(form)
            .build()
            .map_err(|e| Step::Upload.failed("building media upload".to_string(), e))?;

        let body = self.send(req, Step::Upload, "media upload").await?;
        let upload: MediaUpload = serde_json::from_slice(&body)
            .map_err(|e| Step::Upload.failed("decoding media upload response".to_string(), e))?;

        debug!(media_id = upload.media_id, "Uploaded media");
        Ok(upload.media_id)
    }

    #[instrument(skip(self, alt_text))]
    pub async fn attach_alt_text(&self, media_id: u64, alt_text: &str) -> Result<()> {
        let metadata = MediaMetadata {
            media_id: media_id.to_string(),
            alt_text: AltText { text: alt_text },
        };
        let req = self
            .builder
            .post(MEDIA_METADATA_URL)
            .json(&metadata)
            .build()
            .map_err(|e| Step::Upload.failed("building alt text request".to_string(), e))?;

        self.send(req, Step::Upload, "alt text").await?;
        debug!("Attached alt text");
        Ok(())
    }

    /// Posts `status` with the uploaded media and returns the permalink.
    #[instrument(skip(self, status))]
    pub async fn create_status(&self, status: &str, media_id: u64) -> Result<String> {
        let media_ids = media_id.to_string();
        let req = self
            .builder
            .post(STATUS_UPDATE_URL)
            .form(&[("status", status), ("media_ids", media_ids.as_str())])
            .build()
            .map_err(|e| Step::Post.failed("building status update".to_string(), e))?;

        let body = self.send(req, Step::Post, "status update").await?;
        let tweet: Tweet = serde_json::from_slice(&body)
            .map_err(|e| Step::Post.failed("decoding status update response".to_string(), e))?;

        Ok(tweet.permalink())
    }

    async fn send(&self, req: reqwest::Request, step: Step, what: &str) -> Result<Bytes> {
        let resp = self
            .http
            .execute(req)
            .await
            .map_err(|e| step.failed(format!("{what} request failed"), e))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| step.failed(format!("reading {what} response"), e))?;

        if !status.is_success() {
            return Err(step.rejected(
                format!(
                    "{what} returned status {status}: {}",
                    String::from_utf8_lossy(&body)
                ),
                status.as_u16(),
            ));
        }
        Ok(body)
    }
}

#[async_trait]
impl<C: HttpClient> Publisher for TwitterClient<C> {
    async fn publish(&self, image: &[u8], status: &str, alt_text: &str) -> Result<String> {
        let media_id = self.upload_media(image).await?;
        if !alt_text.is_empty() {
            self.attach_alt_text(media_id, alt_text).await?;
        }
        let permalink = self.create_status(status, media_id).await?;

        info!(%permalink, "Posted status");
        Ok(permalink)
    }
}
