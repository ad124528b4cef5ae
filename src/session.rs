// Copyright 2019 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Session structure definition.

use std::sync::Arc;

use log::{debug, trace};
use reqwest::{Client as HttpClient, Url};
use static_assertions::assert_impl_all;

use super::cache::EndpointCache;
use super::discovery::{get_service_versions, SupportedMicroversions};
use super::page::{LinkedPage, MarkerPage, MarkerResource, Page, Resource, SinglePage};
use super::services::ServiceType;
use super::url;
use super::{ApiVersion, AuthType, Client, EndpointDefaults, Error, ErrorKind, Pager};

/// An OpenStack API session.
///
/// The session object serves as a wrapper around a [client](client/struct.Client.html),
/// caching resolved endpoints and supported microversions per service.
///
/// # Note
///
/// All clones of one session share the same authentication and endpoint cache. Use
/// [with_defaults](#method.with_defaults) to detach a session.
#[derive(Debug, Clone)]
pub struct Session {
    client: Client,
    defaults: EndpointDefaults,
    cache: Arc<EndpointCache>,
}

assert_impl_all!(Session: Send, Sync);

impl Session {
    /// Create a new session with a given authentication plugin.
    ///
    /// The resulting session will use the default endpoint interface (public).
    pub fn new<Auth: AuthType + 'static>(auth_type: Auth) -> Session {
        Session::new_with_client(HttpClient::new(), auth_type)
    }

    /// Create a new session with a given authentication plugin and an HTTP client.
    pub fn new_with_client<Auth: AuthType + 'static>(
        client: HttpClient,
        auth_type: Auth,
    ) -> Session {
        Session::from_client(Client::new(client, auth_type))
    }

    /// Create a new session from an existing client.
    pub fn from_client(client: Client) -> Session {
        Session {
            client,
            defaults: EndpointDefaults::default(),
            cache: Arc::new(EndpointCache::new()),
        }
    }

    /// Get a reference to the client.
    #[inline]
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Get a reference to the authentication type in use.
    #[inline]
    pub fn auth_type(&self) -> &dyn AuthType {
        self.client.auth_type()
    }

    /// Endpoint defaults in use.
    #[inline]
    pub fn defaults(&self) -> &EndpointDefaults {
        &self.defaults
    }

    /// Set new endpoint defaults.
    ///
    /// This call clears the cached service information for this `Session`.
    /// It does not, however, affect clones of this `Session`.
    pub fn set_defaults(&mut self, defaults: EndpointDefaults) {
        self.defaults = defaults;
        self.cache = Arc::new(EndpointCache::new());
    }

    /// Convert this session into one using the given endpoint defaults.
    #[inline]
    pub fn with_defaults(mut self, defaults: EndpointDefaults) -> Session {
        self.set_defaults(defaults);
        self
    }

    /// Update the authentication and purge cached endpoint information.
    ///
    /// # Warning
    ///
    /// Authentication and cache will also be updated for clones of this `Session`, since they
    /// share the same authentication object and cache.
    pub async fn refresh(&self) -> Result<(), Error> {
        self.cache.clear().await;
        self.client.refresh().await
    }

    /// Get the endpoint of the given service.
    ///
    /// Endpoint overrides are used as they are, otherwise the endpoint is resolved using
    /// the authentication type. The result is cached.
    pub async fn get_endpoint<Srv: ServiceType>(&self, service: Srv) -> Result<Url, Error> {
        let catalog_type = service.catalog_type();
        self.cache
            .endpoint(catalog_type, || async {
                let opts = self.defaults.apply(service.endpoint_opts());
                let endpoint = match self.defaults.get_override(&opts) {
                    Some(found) => {
                        debug!("Using override {} for service {}", found, catalog_type);
                        found.clone()
                    }
                    None => self.client.get_endpoint(&opts).await?,
                };
                if endpoint.cannot_be_a_base() || !endpoint.has_host() {
                    return Err(Error::new(
                        ErrorKind::InvalidResponse,
                        format!(
                            "Invalid URL {} received for service {}",
                            endpoint, catalog_type
                        ),
                    ));
                }
                let endpoint = url::normalize(endpoint);
                debug!("Resolved endpoint {} for service {}", endpoint, catalog_type);
                Ok(endpoint)
            })
            .await
    }

    /// Construct a URL for the given service from the path.
    pub async fn get_endpoint_path<Srv, I>(&self, service: Srv, path: I) -> Result<Url, Error>
    where
        Srv: ServiceType,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let endpoint = self.get_endpoint(service).await?;
        Ok(url::extend(endpoint, path))
    }

    /// Get the range of microversions supported by the service.
    ///
    /// Returns `None` if the service does not support version discovery or does not advertise
    /// microversions. The result is cached.
    ///
    /// ```rust,no_run
    /// # async fn example() -> Result<(), osroute::Error> {
    /// let session = osroute::Session::new(osroute::NoAuth::new("http://nova.local/v2.1")?);
    /// match session
    ///     .supported_microversions(osroute::services::COMPUTE)
    ///     .await?
    /// {
    ///     Some(range) => println!("The compute service supports versions {}", range),
    ///     None => println!("The compute service does not support microversioning"),
    /// }
    /// # Ok(()) }
    /// # #[tokio::main]
    /// # async fn main() { example().await.unwrap(); }
    /// ```
    pub async fn supported_microversions<Srv: ServiceType>(
        &self,
        service: Srv,
    ) -> Result<Option<SupportedMicroversions>, Error> {
        let catalog_type = service.catalog_type();
        if !service.version_discovery_supported() {
            debug!("Service {} does not support version discovery", catalog_type);
            return Ok(None);
        }

        let endpoint = self.get_endpoint(&service).await?;
        self.cache
            .microversions(catalog_type, || async {
                let base = url::base_versioned_endpoint(&endpoint);
                match get_service_versions(&self.client, &base).await {
                    Ok(range) => Ok(Some(range)),
                    Err(e) if e.kind() == ErrorKind::MicroversionsNotAdvertised => {
                        debug!("Service {} does not advertise microversions", catalog_type);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            })
            .await
    }

    /// Make sure the service supports the microversion.
    ///
    /// The version is given in the `X.Y` form and is returned parsed on success.
    ///
    /// The check is [SupportedMicroversions::contains], an inclusive comparison of whole
    /// versions. It differs from [SupportedMicroversions::is_supported] for ranges spanning
    /// several major versions: with `1.5` to `2.3` advertised, `1.9` is accepted here while
    /// `is_supported` compares the minor component against `5..3` and rejects it.
    pub async fn require_microversion<Srv: ServiceType>(
        &self,
        service: Srv,
        version: &str,
    ) -> Result<ApiVersion, Error> {
        let requested = ApiVersion::parse_microversion(version)?;
        let catalog_type = service.catalog_type();
        match self.supported_microversions(service).await? {
            Some(range) if range.contains(requested) => {
                trace!("Service {} supports {}", catalog_type, requested);
                Ok(requested)
            }
            Some(range) => Err(Error::new(
                ErrorKind::MicroversionUnsupported,
                format!(
                    "Service {} supports versions {}, {} was requested",
                    catalog_type, range, requested
                ),
            )),
            None => Err(Error::new(
                ErrorKind::MicroversionsNotAdvertised,
                format!("Service {} does not support microversions", catalog_type),
            )),
        }
    }

    /// Pick the highest API version supported by the service.
    ///
    /// Returns `None` if none of the requested versions are available.
    ///
    /// ```rust,no_run
    /// # async fn example() -> Result<(), osroute::Error> {
    /// let session = osroute::Session::new(osroute::NoAuth::new("http://nova.local/v2.1")?);
    /// let candidates = vec![osroute::ApiVersion(2, 1), osroute::ApiVersion(2, 53)];
    /// if let Some(version) = session
    ///     .pick_api_version(osroute::services::COMPUTE, candidates)
    ///     .await?
    /// {
    ///     println!("Using version {}", version);
    /// } else {
    ///     println!("Using the base version");
    /// }
    /// # Ok(()) }
    /// # #[tokio::main]
    /// # async fn main() { example().await.unwrap(); }
    /// ```
    pub async fn pick_api_version<Srv, I>(
        &self,
        service: Srv,
        versions: I,
    ) -> Result<Option<ApiVersion>, Error>
    where
        Srv: ServiceType,
        I: IntoIterator<Item = ApiVersion>,
    {
        let mut versions = versions.into_iter().peekable();
        if versions.peek().is_none() {
            return Ok(None);
        }

        Ok(self
            .supported_microversions(service)
            .await?
            .and_then(|range| versions.filter(|item| range.contains(*item)).max()))
    }

    async fn pager<P, Srv, I>(&self, service: Srv, path: I) -> Result<Pager<P>, Error>
    where
        P: Page,
        Srv: ServiceType,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let url = self.get_endpoint_path(service, path).await?;
        Ok(Pager::new(self.client.clone(), url))
    }

    /// Create a pager for a collection returned in one response.
    ///
    /// Use [Pager::with_query](struct.Pager.html#method.with_query) to add a query.
    pub async fn single_pager<T, Srv, I>(
        &self,
        service: Srv,
        path: I,
    ) -> Result<Pager<SinglePage<T>>, Error>
    where
        T: Resource,
        Srv: ServiceType,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.pager(service, path).await
    }

    /// Create a pager for a collection with `next` links.
    pub async fn linked_pager<T, Srv, I>(
        &self,
        service: Srv,
        path: I,
    ) -> Result<Pager<LinkedPage<T>>, Error>
    where
        T: Resource,
        Srv: ServiceType,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.pager(service, path).await
    }

    /// Create a pager for a collection paginated with markers.
    pub async fn marker_pager<T, Srv, I>(
        &self,
        service: Srv,
        path: I,
    ) -> Result<Pager<MarkerPage<T>>, Error>
    where
        T: MarkerResource,
        Srv: ServiceType,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        self.pager(service, path).await
    }
}
