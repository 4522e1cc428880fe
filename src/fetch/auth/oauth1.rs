use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use sha1::Sha1;
use url::Url;

use crate::config::TwitterCredentials;
use crate::fetch::client::HttpClient;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters pass through; everything else is encoded.
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An [`HttpClient`] wrapper that signs each request with OAuth 1.0a
/// (HMAC-SHA1) user-context credentials.
///
/// Query parameters and url-encoded form bodies are part of the signature.
/// Multipart and JSON bodies are not, as RFC 5849 prescribes.
pub struct OAuth1<C> {
    pub inner: C,
    credentials: TwitterCredentials,
}

impl<C> OAuth1<C> {
    pub fn new(inner: C, credentials: TwitterCredentials) -> Self {
        Self { inner, credentials }
    }

    /// Builds the `Authorization` header value for a request.
    ///
    /// `body_params` are the decoded form fields of the request body, if any.
    pub fn authorization(
        &self,
        method: &str,
        url: &Url,
        body_params: &[(String, String)],
        nonce: &str,
        timestamp: i64,
    ) -> String {
        let timestamp = timestamp.to_string();
        let mut oauth_params = vec![
            ("oauth_consumer_key", self.credentials.consumer_key.as_str()),
            ("oauth_nonce", nonce),
            ("oauth_signature_method", "HMAC-SHA1"),
            ("oauth_timestamp", timestamp.as_str()),
            ("oauth_token", self.credentials.access_token.as_str()),
            ("oauth_version", "1.0"),
        ];

        let mut all_params: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .chain(body_params.iter().cloned())
            .chain(
                oauth_params
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string())),
            )
            .collect();

        let base = signature_base(method, url, &mut all_params);
        let signature = self.sign(&base);
        oauth_params.push(("oauth_signature", signature.as_str()));
        oauth_params.sort_unstable();

        let fields: Vec<String> = oauth_params
            .iter()
            .map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v)))
            .collect();
        format!("OAuth {}", fields.join(", "))
    }

    fn sign(&self, base: &str) -> String {
        let key = format!(
            "{}&{}",
            encode(&self.credentials.consumer_secret),
            encode(&self.credentials.access_secret)
        );
        let mut mac =
            HmacSha1::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
        mac.update(base.as_bytes());
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for OAuth1<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        let body_params = form_params(&req);
        let header = self.authorization(
            req.method().as_str(),
            req.url(),
            &body_params,
            &nonce(),
            chrono::Utc::now().timestamp(),
        );
        req.headers_mut().insert(
            AUTHORIZATION,
            HeaderValue::from_str(&header).expect("OAuth header is percent-encoded ASCII"),
        );
        self.inner.execute(req).await
    }
}

/// `METHOD&encoded-base-url&encoded-sorted-params`.
fn signature_base(method: &str, url: &Url, params: &mut [(String, String)]) -> String {
    for (k, v) in params.iter_mut() {
        *k = encode(k);
        *v = encode(v);
    }
    params.sort_unstable();

    let param_string = params
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    format!(
        "{}&{}&{}",
        method.to_ascii_uppercase(),
        encode(&base_url(url)),
        encode(&param_string)
    )
}

/// Scheme, host, non-default port and path; no query or fragment.
fn base_url(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}://{}:{}{}", url.scheme(), host, port, url.path()),
        None => format!("{}://{}{}", url.scheme(), host, url.path()),
    }
}

fn form_params(req: &reqwest::Request) -> Vec<(String, String)> {
    let is_form = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with(FORM_CONTENT_TYPE));
    if !is_form {
        return Vec::new();
    }

    req.body()
        .and_then(|b| b.as_bytes())
        .map(|bytes| url::form_urlencoded::parse(bytes).into_owned().collect())
        .unwrap_or_default()
}

fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

fn nonce() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::ScriptedHttpClient;

    // Worked example from the Twitter API "Creating a signature" guide.
    fn doc_credentials() -> TwitterCredentials {
        TwitterCredentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".to_string(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".to_string(),
            access_token: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".to_string(),
            access_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".to_string(),
        }
    }

    #[test]
    fn test_signature_matches_documented_example() {
        let signer = OAuth1::new((), doc_credentials());
        let url =
            Url::parse("https://api.twitter.com/1.1/statuses/update.json?include_entities=true")
                .unwrap();
        let body = vec![(
            "status".to_string(),
            "Hello Ladies + Gentlemen, a signed OAuth request!".to_string(),
        )];

        let header = signer.authorization(
            "POST",
            &url,
            &body,
            "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg",
            1318622958,
        );

        assert!(header.starts_with("OAuth "));
        assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""));
        assert!(header.contains("oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(header.contains("oauth_timestamp=\"1318622958\""));
        assert!(header.contains("oauth_version=\"1.0\""));
        assert!(!header.contains("status="));
    }

    #[test]
    fn test_encode_leaves_unreserved_characters() {
        assert_eq!(encode("Az09-._~"), "Az09-._~");
        assert_eq!(encode("a b+c&d=e"), "a%20b%2Bc%26d%3De");
        assert_eq!(encode("☃"), "%E2%98%83");
    }

    #[test]
    fn test_base_url_drops_query_and_default_port() {
        let url = Url::parse("HTTPS://Upload.Twitter.com:443/1.1/media/upload.json?x=1").unwrap();
        assert_eq!(
            base_url(&url),
            "https://upload.twitter.com/1.1/media/upload.json"
        );

        let url = Url::parse("http://localhost:8080/path").unwrap();
        assert_eq!(base_url(&url), "http://localhost:8080/path");
    }

    #[test]
    fn test_nonce_is_alphanumeric() {
        let n = nonce();
        assert_eq!(n.len(), 32);
        assert!(n.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(n, nonce());
    }

    #[tokio::test]
    async fn test_execute_adds_authorization_header() {
        let client = OAuth1::new(ScriptedHttpClient::new().respond(200, "{}"), doc_credentials());
        let req = reqwest::Client::new()
            .post("https://api.twitter.com/1.1/statuses/update.json")
            .form(&[("status", "hello"), ("media_ids", "42")])
            .build()
            .unwrap();

        let resp = client.execute(req).await.unwrap();
        assert!(resp.status().is_success());

        let requests = client.inner.requests();
        assert_eq!(requests.len(), 1);
        let auth = requests[0].header("authorization").unwrap();
        assert!(auth.starts_with("OAuth oauth_consumer_key=\"xvz1evFS4wEEPTGEFPHBog\""));
        assert!(auth.contains("oauth_signature=\""));
        assert_eq!(
            requests[0].body.as_deref(),
            Some(b"status=hello&media_ids=42".as_slice())
        );
    }

    #[test]
    fn test_form_params_only_for_url_encoded_bodies() {
        let form = reqwest::Client::new()
            .post("https://example.test/")
            .form(&[("status", "a b")])
            .build()
            .unwrap();
        assert_eq!(
            form_params(&form),
            vec![("status".to_string(), "a b".to_string())]
        );

        let json = reqwest::Client::new()
            .post("https://example.test/")
            .json(&serde_json::json!({ "status": "a b" }))
            .build()
            .unwrap();
        assert!(form_params(&json).is_empty());
    }
}
