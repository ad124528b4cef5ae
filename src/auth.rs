// Copyright 2019 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Base code for authentication.

use std::fmt::Debug;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Client, RequestBuilder, Url};
use static_assertions::{assert_impl_all, assert_obj_safe};

use super::discovery::VersionDiscovery;
use super::{Catalog, EndpointOpts, Error, ErrorKind};

const TOKEN_HEADER: &str = "x-auth-token";

/// Trait for an authentication type.
///
/// An authentication type is expected to be able to:
///
/// 1. add credentials to requests,
/// 2. get an endpoint URL for the given service type.
///
/// Acquiring and renewing credentials is up to the implementation.
#[async_trait]
pub trait AuthType: Debug + Sync + Send {
    /// Authenticate a request.
    async fn authenticate(
        &self,
        client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, Error>;

    /// Get a URL for the requested service.
    ///
    /// `discovery` is used when the options require a major version.
    async fn get_endpoint(
        &self,
        discovery: &dyn VersionDiscovery,
        opts: &EndpointOpts,
    ) -> Result<Url, Error>;

    /// Service catalog (if any).
    fn catalog(&self) -> Option<&Catalog> {
        None
    }

    /// Refresh the authentication (renew the token, etc).
    async fn refresh(&self, _client: &Client) -> Result<(), Error> {
        Ok(())
    }
}

assert_obj_safe!(AuthType);

/// Authentication type that provides no authentication.
///
/// This type always uses a pre-defined endpoint and sends no authentication information:
/// ```rust
/// let auth = osroute::NoAuth::new("https://cloud.local/baremetal")
///     .expect("Invalid auth URL");
/// let client = osroute::Client::new(reqwest::Client::new(), auth);
/// ```
#[derive(Clone, Debug)]
pub struct NoAuth {
    endpoint: Option<Url>,
}

assert_impl_all!(NoAuth: Send, Sync);

impl NoAuth {
    /// Create a new fake authentication method using a fixed endpoint.
    ///
    /// This endpoint will be returned in response to all `get_endpoint` calls
    /// of the [AuthType](trait.AuthType.html) trait.
    #[inline]
    pub fn new<U>(endpoint: U) -> Result<NoAuth, Error>
    where
        U: AsRef<str>,
    {
        let endpoint = Url::parse(endpoint.as_ref())
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;
        Ok(NoAuth {
            endpoint: Some(endpoint),
        })
    }

    /// Create a new fake authentication method without an endpoint.
    ///
    /// All calls to `get_endpoint` will fail. This option is only useful with endpoint overrides
    /// or with known URLs.
    #[inline]
    pub fn new_without_endpoint() -> NoAuth {
        NoAuth { endpoint: None }
    }
}

#[async_trait]
impl AuthType for NoAuth {
    async fn authenticate(
        &self,
        _client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, Error> {
        Ok(request)
    }

    /// Get a predefined endpoint for all service types.
    async fn get_endpoint(
        &self,
        _discovery: &dyn VersionDiscovery,
        opts: &EndpointOpts,
    ) -> Result<Url, Error> {
        let _ = opts.availability()?;
        self.endpoint.clone().ok_or_else(|| {
            Error::new(
                ErrorKind::EndpointNotFound,
                format!(
                    "None authentication without an endpoint, use an override for {}",
                    opts.types.join(" or ")
                ),
            )
        })
    }
}

/// Authentication with a pre-issued token and the service catalog returned with it.
///
/// ```rust
/// let catalog: osroute::Catalog = serde_json::from_str(r#"{"catalog": []}"#)
///     .expect("invalid catalog");
/// let auth = osroute::TokenAuth::new("gAAAAABf...", catalog).expect("invalid token");
/// assert!(auth.catalog().is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct TokenAuth {
    token: HeaderValue,
    catalog: Catalog,
}

assert_impl_all!(TokenAuth: Send, Sync);

impl TokenAuth {
    /// Create a token authentication.
    pub fn new<S: AsRef<str>>(token: S, catalog: Catalog) -> Result<TokenAuth, Error> {
        let mut token = HeaderValue::from_str(token.as_ref())
            .map_err(|e| Error::new(ErrorKind::InvalidInput, format!("Invalid token: {}", e)))?;
        token.set_sensitive(true);
        Ok(TokenAuth { token, catalog })
    }

    /// Create a token authentication from the body of an Identity token response.
    ///
    /// Accepts both the v3 (`{"token": {"catalog": [...]}}`) and the v2
    /// (`{"access": {"serviceCatalog": [...]}}`) formats.
    pub fn from_token_body<S: AsRef<str>>(token: S, body: &str) -> Result<TokenAuth, Error> {
        let catalog = serde_json::from_str(body).map_err(|e| {
            Error::new(
                ErrorKind::InvalidResponse,
                format!("Cannot decode service catalog: {}", e),
            )
        })?;
        TokenAuth::new(token, catalog)
    }

    /// Service catalog.
    #[inline]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

#[async_trait]
impl AuthType for TokenAuth {
    async fn authenticate(
        &self,
        _client: &Client,
        request: RequestBuilder,
    ) -> Result<RequestBuilder, Error> {
        Ok(request.header(TOKEN_HEADER, self.token.clone()))
    }

    async fn get_endpoint(
        &self,
        discovery: &dyn VersionDiscovery,
        opts: &EndpointOpts,
    ) -> Result<Url, Error> {
        self.catalog.resolve(opts, discovery).await
    }

    fn catalog(&self) -> Option<&Catalog> {
        Some(&self.catalog)
    }
}
