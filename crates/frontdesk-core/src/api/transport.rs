//! Authorized transport shared by every backend resource.
//!
//! The credential-attach and 401-handling policy lives here once;
//! [`Resource`] handles only add their path segment.

use std::fmt::Display;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{header, Client, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use super::ApiError;
use crate::auth::SessionStore;
use crate::config::Config;
use crate::navigation::{Navigation, Navigator, LOGIN_ROUTE};

/// Whether the request stage attaches the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Credentials {
    Session,
    Anonymous,
}

/// HTTP pipeline that reads the session on every call.
/// Clone is cheap - reqwest::Client and the session store are shared handles.
#[derive(Clone)]
pub struct AuthorizedTransport {
    client: Client,
    base_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl AuthorizedTransport {
    pub fn new(
        config: &Config,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        // The cookie store carries session cookies for backends that never
        // hand out a bearer credential.
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .cookie_store(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            session,
            navigator,
        })
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Handle for one backend resource, e.g. `"hotel"` or `"reservation"`.
    pub fn resource<T>(&self, path: &str) -> Resource<T> {
        Resource {
            transport: self.clone(),
            path: path.trim_matches('/').to_string(),
            _marker: PhantomData,
        }
    }

    fn url(&self, resource: &str, path: &str) -> String {
        let path = path.trim_start_matches('/');
        if path.is_empty() {
            format!("{}/{}", self.base_url, resource)
        } else {
            format!("{}/{}/{}", self.base_url, resource, path)
        }
    }

    /// Request stage: attach the credential held by the session right now.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let Some(credential) = self.session.credential() else {
            return request;
        };
        match header::HeaderValue::from_str(&format!("Bearer {}", credential)) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.header(header::AUTHORIZATION, value)
            }
            Err(_) => {
                warn!("Stored credential is not a valid header value, omitting it");
                request
            }
        }
    }

    /// Response stage: pass successes through, turn failures into
    /// [`ApiError`]s, and end the session when the server rejects its
    /// credential. The error is always returned to the caller.
    async fn check_response(&self, response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let error = ApiError::from_status(status, &body);

        if error.is_auth_rejected() {
            warn!(url = %url, "Credential rejected by server, forcing logout");
            self.session.logout();
            self.navigator.navigate(Navigation::Reload(LOGIN_ROUTE.to_string()));
        } else {
            debug!(url = %url, status = %status, "Request failed");
        }

        Err(error)
    }

    async fn dispatch<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: String,
        body: Option<&B>,
        credentials: Credentials,
    ) -> Result<Response, ApiError> {
        let mut request = self.client.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        if credentials == Credentials::Session {
            request = self.authorize(request);
        }

        debug!(method = %method, url = %url, "Sending request");
        let response = request.send().await?;
        self.check_response(response).await
    }
}

async fn read_json<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    let url = response.url().to_string();
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| {
        ApiError::InvalidResponse(format!("Failed to parse response from {}: {}", url, e))
    })
}

/// One backend resource reached through the shared transport.
pub struct Resource<T> {
    transport: AuthorizedTransport,
    path: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            path: self.path.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Resource<T> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub async fn list(&self) -> Result<Vec<T>, ApiError> {
        self.get_path("").await
    }

    pub async fn get(&self, id: impl Display) -> Result<T, ApiError> {
        self.get_path(&id.to_string()).await
    }

    pub async fn create<B: Serialize + ?Sized>(&self, body: &B) -> Result<T, ApiError> {
        let response = self.execute(Method::POST, "", Some(body)).await?;
        read_json(response).await
    }

    pub async fn update<B: Serialize + ?Sized>(
        &self,
        id: impl Display,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .execute(Method::PUT, &id.to_string(), Some(body))
            .await?;
        read_json(response).await
    }

    pub async fn delete(&self, id: impl Display) -> Result<(), ApiError> {
        self.execute::<()>(Method::DELETE, &id.to_string(), None)
            .await
            .map(|_| ())
    }

    /// GET a sub-path of the resource, e.g. `last-reservations`.
    pub async fn get_path<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        let response = self.execute::<()>(Method::GET, path, None).await?;
        read_json(response).await
    }

    /// Send a request with the session credential and return the raw response.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.transport.url(&self.path, path);
        self.transport
            .dispatch(method, url, body, Credentials::Session)
            .await
    }

    /// Like [`Resource::execute`] but never attaches a credential; used for
    /// endpoints that establish a session.
    pub async fn execute_anonymous<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, ApiError> {
        let url = self.transport.url(&self.path, path);
        self.transport
            .dispatch(method, url, body, Credentials::Anonymous)
            .await
    }
}
