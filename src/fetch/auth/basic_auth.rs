use crate::fetch::client::HttpClient;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::header::{AUTHORIZATION, HeaderValue};

/// An [`HttpClient`] wrapper that sends HTTP Basic credentials with every
/// request.
pub struct BasicAuth<C> {
    inner: C,
    header: HeaderValue,
}

impl<C> BasicAuth<C> {
    pub fn new(inner: C, username: &str, password: &str) -> anyhow::Result<Self> {
        let token = STANDARD.encode(format!("{username}:{password}"));
        let mut header = HeaderValue::from_str(&format!("Basic {token}"))?;
        header.set_sensitive(true);
        Ok(Self { inner, header })
    }
}

#[async_trait]
impl<C: HttpClient> HttpClient for BasicAuth<C> {
    async fn execute(&self, mut req: reqwest::Request) -> reqwest::Result<reqwest::Response> {
        req.headers_mut().insert(AUTHORIZATION, self.header.clone());
        self.inner.execute(req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encodes_basic_credentials() {
        let client = BasicAuth::new((), "admin", "secret").unwrap();
        assert_eq!(client.header.to_str().unwrap(), "Basic YWRtaW46c2VjcmV0");
        assert!(client.header.is_sensitive());
    }

    #[test]
    fn test_empty_credentials_still_encode() {
        let client = BasicAuth::new((), "", "").unwrap();
        assert_eq!(client.header.to_str().unwrap(), "Basic Og==");
    }
}
