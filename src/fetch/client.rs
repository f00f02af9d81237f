use async_trait::async_trait;
use reqwest::{Request, Response};

/// Sends a prepared request.
///
/// Credential wrappers such as [`BasicAuth`](crate::fetch::auth::BasicAuth)
/// implement this over an inner client, so a Traccar client can be composed
/// as `BasicAuth<BasicClient>` and handed to [`fetch_json`](crate::fetch::fetch_json).
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn execute(&self, request: Request) -> reqwest::Result<Response>;
}
