//! Request-signing decorators for [`HttpClient`](super::HttpClient).

mod oauth1;

pub use oauth1::OAuth1;
