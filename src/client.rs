// Copyright 2021 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Low-level HTTP client with authentication.

use std::collections::HashMap;
use std::convert::TryFrom;
use std::sync::Arc;
use std::time::Duration;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Error as HttpError;
use log::trace;
use reqwest::{Client as HttpClient, Method, RequestBuilder as HttpRequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use static_assertions::{assert_eq_size, assert_impl_all};

use super::services::VersionedService;
use super::{ApiVersion, AuthType, EndpointOpts, Error, NoAuth};

/// HTTP client with authentication.
///
/// Uses `Arc` internally and should be reused when possible by cloning it.
#[derive(Debug, Clone)]
pub struct Client {
    client: HttpClient,
    auth: Arc<dyn AuthType>,
}

assert_eq_size!(Client, Option<Client>);
assert_impl_all!(Client: Send, Sync);

impl Client {
    /// Create a new client.
    pub fn new<Auth: AuthType + 'static>(client: HttpClient, auth_type: Auth) -> Client {
        Client {
            client,
            auth: Arc::new(auth_type),
        }
    }

    /// Create a client that sends no credentials and knows no endpoints.
    ///
    /// Useful for version discovery and for pagination over known URLs.
    pub fn new_without_auth() -> Client {
        Client::new(HttpClient::new(), NoAuth::new_without_endpoint())
    }

    /// Get a reference to the authentication type in use.
    #[inline]
    pub fn auth_type(&self) -> &dyn AuthType {
        self.auth.as_ref()
    }

    /// Get a reference to the inner HTTP client.
    #[inline]
    pub fn inner(&self) -> &HttpClient {
        &self.client
    }

    /// Resolve an endpoint using the authentication type.
    ///
    /// Version discovery (if required) goes through this client.
    #[inline]
    pub async fn get_endpoint(&self, opts: &EndpointOpts) -> Result<Url, Error> {
        self.auth.get_endpoint(self, opts).await
    }

    /// Update the authentication.
    ///
    /// # Warning
    ///
    /// Authentication will also be updated for clones of this client, since they share the same
    /// authentication object.
    #[inline]
    pub async fn refresh(&self) -> Result<(), Error> {
        self.auth.refresh(&self.client).await
    }

    /// Set a new authentication for this client.
    #[inline]
    pub fn set_auth_type<Auth: AuthType + 'static>(&mut self, auth_type: Auth) {
        self.auth = Arc::new(auth_type);
    }

    /// Set a new internal client implementation.
    #[inline]
    pub fn set_inner(&mut self, client: HttpClient) {
        self.client = client;
    }

    /// Start an authenticated request.
    #[inline]
    pub fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.request_service((), method, url)
    }

    /// Start an authenticated request for a service.
    ///
    /// If the service supports microversions, the builder can set the API version header.
    pub fn request_service<S>(&self, service: S, method: Method, url: Url) -> RequestBuilder<S> {
        RequestBuilder {
            inner: self.client.request(method, url),
            client: self.clone(),
            service,
        }
    }
}

impl From<Client> for HttpClient {
    fn from(value: Client) -> HttpClient {
        value.client
    }
}

/// A request builder with error handling.
///
/// If the type parameter `S` is a service, additional functionality is available.
#[derive(Debug)]
#[must_use = "preparing a request is not enough to run it"]
pub struct RequestBuilder<S = ()> {
    inner: HttpRequestBuilder,
    client: Client,
    service: S,
}

#[derive(Debug, Deserialize)]
struct Message {
    message: Option<String>,
    faultstring: Option<String>,
    title: Option<String>,
    // Ironic legacy format: JSON inside JSON
    error_message: Option<String>,
}

impl Message {
    fn convert(self, recursive: bool) -> Option<String> {
        if let Some(value) = self.message.or(self.faultstring).or(self.title) {
            Some(value)
        } else if recursive {
            self.error_message.and_then(|json| {
                serde_json::from_str::<Message>(&json)
                    .ok()
                    .and_then(|msg| msg.convert(false))
            })
        } else {
            None
        }
    }
}

impl From<Message> for Option<String> {
    fn from(value: Message) -> Option<String> {
        value.convert(true)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorResponse {
    Map(HashMap<String, Message>),
    Message(Message),
}

fn extract_message(text: String) -> String {
    serde_json::from_str::<ErrorResponse>(&text)
        .ok()
        .and_then(|body| match body {
            ErrorResponse::Map(map) => map.into_iter().next().and_then(|(_k, v)| v.into()),
            ErrorResponse::Message(msg) => msg.into(),
        })
        .unwrap_or(text)
}

/// Check for OpenStack errors in the response.
pub async fn check(response: Response) -> Result<Response, Error> {
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let message = extract_message(response.text().await?);
        trace!("HTTP request returned {}; error: {}", status, message);
        Err(Error::new(status.into(), message).with_status(status))
    } else {
        trace!(
            "HTTP request to {} returned {}",
            response.url(),
            response.status()
        );
        Ok(response)
    }
}

impl<S> RequestBuilder<S> {
    /// Add a header to the request.
    pub fn header<K, V>(self, key: K, value: V) -> RequestBuilder<S>
    where
        HeaderName: TryFrom<K>,
        <HeaderName as TryFrom<K>>::Error: Into<HttpError>,
        HeaderValue: TryFrom<V>,
        <HeaderValue as TryFrom<V>>::Error: Into<HttpError>,
    {
        RequestBuilder {
            inner: self.inner.header(key, value),
            ..self
        }
    }

    /// Add headers to a request.
    pub fn headers(self, headers: HeaderMap) -> RequestBuilder<S> {
        RequestBuilder {
            inner: self.inner.headers(headers),
            ..self
        }
    }

    /// Add a JSON body to the request.
    pub fn json<T: Serialize + ?Sized>(self, json: &T) -> RequestBuilder<S> {
        RequestBuilder {
            inner: self.inner.json(json),
            ..self
        }
    }

    /// Send a query with the request.
    pub fn query<T: Serialize + ?Sized>(self, query: &T) -> RequestBuilder<S> {
        RequestBuilder {
            inner: self.inner.query(query),
            ..self
        }
    }

    /// Override the timeout for the request.
    pub fn timeout(self, timeout: Duration) -> RequestBuilder<S> {
        RequestBuilder {
            inner: self.inner.timeout(timeout),
            ..self
        }
    }

    /// Send the request and receive JSON in response.
    pub async fn fetch_json<T>(self) -> Result<T, Error>
    where
        T: DeserializeOwned + Send,
    {
        self.send().await?.json::<T>().await.map_err(Error::from)
    }

    /// Send the request and check for errors.
    pub async fn send(self) -> Result<Response, Error> {
        check(self.send_unchecked().await?).await
    }

    /// Send the request without checking for HTTP and OpenStack errors.
    pub async fn send_unchecked(self) -> Result<Response, Error> {
        let req = self
            .client
            .auth
            .authenticate(&self.client.client, self.inner)
            .await?
            .build()?;
        trace!("Sending HTTP {} request to {}", req.method(), req.url());
        self.client.client.execute(req).await.map_err(Error::from)
    }
}

impl<S> RequestBuilder<S>
where
    S: VersionedService,
{
    /// Add an API version to this request.
    pub fn api_version<A: Into<ApiVersion>>(self, version: A) -> RequestBuilder<S> {
        let (name, value) = self.service.get_version_header(version.into());
        RequestBuilder {
            inner: self.inner.header(name, value),
            ..self
        }
    }

    /// Set the API version on the request.
    pub fn set_api_version<A: Into<ApiVersion>>(&mut self, version: A) {
        take_mut::take(self, |rb| rb.api_version(version));
    }
}

#[cfg(test)]
mod test_request_builder {
    use http::Method;
    use mockito::Server;
    use reqwest::Url;

    use crate::{services, Client, ErrorKind};

    #[test]
    fn test_api_version() {
        let rb = Client::new_without_auth()
            .request_service(
                services::BAREMETAL,
                Method::GET,
                Url::parse("http://127.0.0.1").unwrap(),
            )
            .api_version((1, 42));
        let req = rb.inner.build().unwrap();
        let hdr = req.headers().get("x-openstack-ironic-api-version").unwrap();
        assert_eq!(hdr.to_str().unwrap(), "1.42");
    }

    #[test]
    fn test_set_api_version() {
        let mut rb = Client::new_without_auth().request_service(
            services::COMPUTE,
            Method::GET,
            Url::parse("http://127.0.0.1").unwrap(),
        );
        rb.set_api_version((2, 53));
        let req = rb.inner.build().unwrap();
        let hdr = req.headers().get("openstack-api-version").unwrap();
        assert_eq!(hdr.to_str().unwrap(), "compute 2.53");
    }

    #[tokio::test]
    async fn test_send_error() {
        let mut server = Server::new_async().await;
        let _ = server
            .mock("GET", "/servers")
            .with_status(409)
            .with_body(r#"{"conflictingRequest": {"message": "Busy", "code": 409}}"#)
            .create_async()
            .await;
        let url = Url::parse(&format!("{}/servers", server.url())).unwrap();
        let err = Client::new_without_auth()
            .request(Method::GET, url)
            .send()
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.status(), Some(http::StatusCode::CONFLICT));
        assert_eq!(err.message(), Some("Busy"));
    }

    #[tokio::test]
    async fn test_fetch_json() {
        let mut server = Server::new_async().await;
        let _ = server
            .mock("GET", "/answer")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"answer": 42}"#)
            .create_async()
            .await;
        let url = Url::parse(&format!("{}/answer", server.url())).unwrap();
        let value: serde_json::Value = Client::new_without_auth()
            .request(Method::GET, url)
            .fetch_json()
            .await
            .unwrap();
        assert_eq!(value["answer"], 42);
    }
}
