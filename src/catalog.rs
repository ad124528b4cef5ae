// Copyright 2017 Dmitry Tantsur <divius.inside@gmail.com>
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

//! Service catalog and endpoint resolution.

use log::{debug, error, trace};
use reqwest::Url;
use serde::{Deserialize, Deserializer};
use static_assertions::assert_impl_all;

use super::common::empty_as_default;
use super::discovery::VersionDiscovery;
use super::url;
use super::{Availability, EndpointOpts, Error, ErrorKind};

/// Service type that never supports version discovery.
const OBJECT_STORE: &str = "object-store";

/// An endpoint from the Identity v2 catalog.
///
/// All three interfaces are part of the same record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct V2Endpoint {
    /// Region of the endpoint.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub region: String,
    /// Public URL.
    #[serde(rename = "publicURL", default, deserialize_with = "empty_as_default")]
    pub public_url: String,
    /// Internal URL.
    #[serde(
        rename = "internalURL",
        default,
        deserialize_with = "empty_as_default"
    )]
    pub internal_url: String,
    /// Administrator URL.
    #[serde(rename = "adminURL", default, deserialize_with = "empty_as_default")]
    pub admin_url: String,
    /// Tenant (project) the endpoint belongs to.
    #[serde(default)]
    pub tenant_id: Option<String>,
    /// Version marker.
    #[serde(rename = "versionId", default)]
    pub version_id: Option<String>,
    /// Version information URL.
    #[serde(default)]
    pub version_info: Option<String>,
    /// Version list URL.
    #[serde(default)]
    pub version_list: Option<String>,
}

/// An endpoint from the Identity v3 catalog.
///
/// Each interface is a separate record.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct V3Endpoint {
    /// Endpoint ID.
    #[serde(default)]
    pub id: String,
    /// Region name. Endpoints without a region report `null`.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub region: String,
    /// Region ID.
    #[serde(default, deserialize_with = "empty_as_default")]
    pub region_id: String,
    /// Interface: `public`, `internal` or `admin`.
    pub interface: String,
    /// Endpoint URL.
    pub url: String,
}

/// An endpoint in the service catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    /// Identity v2 shape.
    V2(V2Endpoint),
    /// Identity v3 shape.
    V3(V3Endpoint),
}

/// A service in the service catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Service type, e.g. `compute`.
    pub service_type: String,
    /// Service name, e.g. `nova`.
    pub name: String,
    /// Endpoints of this service.
    pub endpoints: Vec<Endpoint>,
}

/// Service catalog as returned by the Identity service.
///
/// Read-only after construction and can be shared between threads.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

assert_impl_all!(Catalog: Send, Sync);

impl Endpoint {
    /// Region of the endpoint.
    pub fn region(&self) -> &str {
        match self {
            Endpoint::V2(endp) => &endp.region,
            Endpoint::V3(endp) => &endp.region,
        }
    }

    /// Whether the endpoint belongs to the region.
    ///
    /// Identity v3 endpoints also match by region ID.
    pub fn matches_region(&self, region: &str) -> bool {
        match self {
            Endpoint::V2(endp) => endp.region == region,
            Endpoint::V3(endp) => endp.region == region || endp.region_id == region,
        }
    }

    /// URL for the provided availability (if any).
    pub fn url(&self, availability: Availability) -> Option<&str> {
        let result = match self {
            Endpoint::V2(endp) => match availability {
                Availability::Public => &endp.public_url,
                Availability::Internal => &endp.internal_url,
                Availability::Admin => &endp.admin_url,
            },
            Endpoint::V3(endp) if availability == endp.interface => &endp.url,
            Endpoint::V3(_) => return None,
        };

        if result.is_empty() {
            None
        } else {
            Some(result)
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry<E> {
    #[serde(rename = "type")]
    service_type: String,
    #[serde(default, deserialize_with = "empty_as_default")]
    name: String,
    #[serde(default)]
    endpoints: Vec<E>,
}

#[derive(Debug, Deserialize)]
struct V3Token {
    catalog: Vec<RawEntry<V3Endpoint>>,
}

#[derive(Debug, Deserialize)]
struct V2Access {
    #[serde(rename = "serviceCatalog")]
    service_catalog: Vec<RawEntry<V2Endpoint>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogRoot {
    V3Token { token: V3Token },
    V3(V3Token),
    V2Access { access: V2Access },
    V2(V2Access),
}

impl<E> RawEntry<E> {
    fn convert(self, f: fn(E) -> Endpoint) -> CatalogEntry {
        CatalogEntry {
            service_type: self.service_type,
            name: self.name,
            endpoints: self.endpoints.into_iter().map(f).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for Catalog {
    /// Deserialize a v3 token (`{"token": {"catalog": [...]}}` or `{"catalog": [...]}`)
    /// or a v2 access (`{"access": {"serviceCatalog": [...]}}` or `{"serviceCatalog": [...]}`).
    fn deserialize<D>(deserializer: D) -> Result<Catalog, D::Error>
    where
        D: Deserializer<'de>,
    {
        let (v3, v2) = match CatalogRoot::deserialize(deserializer)? {
            CatalogRoot::V3Token { token } | CatalogRoot::V3(token) => (token.catalog, Vec::new()),
            CatalogRoot::V2Access { access } | CatalogRoot::V2(access) => {
                (Vec::new(), access.service_catalog)
            }
        };

        let entries = v3
            .into_iter()
            .map(|x| x.convert(Endpoint::V3))
            .chain(v2.into_iter().map(|x| x.convert(Endpoint::V2)))
            .collect();
        Ok(Catalog { entries })
    }
}

fn parse_url(value: &str, entry: &CatalogEntry, availability: Availability) -> Result<Url, Error> {
    match Url::parse(value) {
        Ok(url) if !url.cannot_be_a_base() => Ok(url::normalize(url)),
        Ok(_) => Err(Error::new(
            ErrorKind::InvalidResponse,
            format!("URL {} for {} cannot be used as a base", value, entry.service_type),
        )),
        Err(e) => {
            error!(
                "Invalid URL {} received from service catalog for service '{}', \
                 availability '{}': {}",
                value, entry.service_type, availability, e
            );
            Err(Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid URL {} for {} - {}", value, entry.service_type, e),
            ))
        }
    }
}

impl Catalog {
    /// Create a catalog from its entries.
    #[inline]
    pub fn new(entries: Vec<CatalogEntry>) -> Catalog {
        Catalog { entries }
    }

    /// Entries of the catalog.
    #[inline]
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Whether the catalog has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All endpoints matching the type, name, region and availability, in catalog order.
    ///
    /// The availability is validated before the catalog is scanned. The version constraint is
    /// not taken into account.
    pub fn candidates<'c>(
        &'c self,
        opts: &'c EndpointOpts,
    ) -> Result<impl Iterator<Item = (&'c CatalogEntry, &'c str)> + 'c, Error> {
        let availability = opts.availability()?;
        Ok(self
            .entries
            .iter()
            .filter(move |entry| {
                opts.matches_type(&entry.service_type) && opts.matches_name(&entry.name)
            })
            .flat_map(move |entry| {
                entry
                    .endpoints
                    .iter()
                    .filter(move |endp| match opts.region {
                        Some(ref region) => endp.matches_region(region),
                        None => true,
                    })
                    .filter_map(move |endp| endp.url(availability))
                    .map(move |url| (entry, url))
            }))
    }

    /// Find the first endpoint matching the options, ignoring the version constraint.
    ///
    /// Never performs any I/O.
    pub fn find_endpoint(&self, opts: &EndpointOpts) -> Result<Url, Error> {
        let availability = opts.availability()?;
        match self.candidates(opts)?.next() {
            Some((entry, value)) => {
                let url = parse_url(value, entry, availability)?;
                debug!("Found {} for {:?}", url, opts);
                Ok(url)
            }
            None => Err(Error::new_endpoint_not_found(opts.types.join(" or "))),
        }
    }

    /// Resolve an endpoint URL.
    ///
    /// The first endpoint in catalog order that matches the options wins. If `opts.version` is
    /// not zero, the version document of each candidate is fetched through `discovery` until
    /// one with a compatible major version is found (object storage is always accepted).
    ///
    /// ```rust
    /// # async fn example() -> Result<(), osroute::Error> {
    /// let catalog: osroute::Catalog = serde_json::from_str(r#"{"catalog": [
    ///     {"type": "compute", "name": "nova", "endpoints": [
    ///         {"region": "RegionOne", "interface": "public", "url": "https://nova.example/"}
    ///     ]}
    /// ]}"#).expect("invalid catalog");
    /// let client = osroute::Client::new_without_auth();
    /// let opts = osroute::EndpointOpts::new("compute").with_region("RegionOne");
    /// let url = catalog.resolve(&opts, &client).await?;
    /// assert_eq!(url.as_str(), "https://nova.example/");
    /// # Ok(()) }
    /// # #[tokio::main]
    /// # async fn main() { example().await.unwrap(); }
    /// ```
    pub async fn resolve<D>(&self, opts: &EndpointOpts, discovery: &D) -> Result<Url, Error>
    where
        D: VersionDiscovery + ?Sized,
    {
        let availability = opts.availability()?;
        if opts.version == 0 {
            return self.find_endpoint(opts);
        }

        for (entry, value) in self.candidates(opts)? {
            let url = parse_url(value, entry, availability)?;
            if entry.service_type == OBJECT_STORE {
                debug!("Accepting {} without version discovery", url);
                return Ok(url);
            }

            let base = url::base_versioned_endpoint(&url);
            let supported = discovery.service_versions(&base).await?;
            if supported.minimum.0 == 0 || supported.minimum.0 == opts.version {
                debug!(
                    "Found {} for {:?}, supported versions {}",
                    url, opts, supported
                );
                return Ok(url);
            }

            trace!(
                "Skipping {} for {}: versions {} do not match major version {}",
                url,
                entry.service_type,
                supported,
                opts.version
            );
        }

        Err(Error::new_endpoint_not_found(opts.types.join(" or ")))
    }
}

#[cfg(test)]
pub mod test {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use maplit::hashmap;
    use reqwest::Url;

    use super::{Catalog, CatalogEntry, Endpoint, V2Endpoint, V3Endpoint};
    use crate::discovery::{SupportedMicroversions, VersionDiscovery};
    use crate::{ApiVersion, Availability, EndpointOpts, Error, ErrorKind};

    fn v2(region: &str, public: &str, internal: &str, admin: &str) -> Endpoint {
        Endpoint::V2(V2Endpoint {
            region: region.into(),
            public_url: public.into(),
            internal_url: internal.into(),
            admin_url: admin.into(),
            ..V2Endpoint::default()
        })
    }

    fn v3(region: &str, region_id: &str, interface: &str, url: &str) -> Endpoint {
        Endpoint::V3(V3Endpoint {
            id: "1".into(),
            region: region.into(),
            region_id: region_id.into(),
            interface: interface.into(),
            url: url.into(),
        })
    }

    fn entry(service_type: &str, name: &str, endpoints: Vec<Endpoint>) -> CatalogEntry {
        CatalogEntry {
            service_type: service_type.into(),
            name: name.into(),
            endpoints,
        }
    }

    fn catalog2() -> Catalog {
        Catalog::new(vec![
            entry(
                "same",
                "same",
                vec![
                    v2(
                        "same",
                        "https://public.correct.com/",
                        "https://internal.correct.com/",
                        "https://admin.correct.com/",
                    ),
                    v2("different", "https://badregion.com/", "", ""),
                ],
            ),
            entry(
                "same",
                "different",
                vec![
                    v2("same", "https://badname.com/", "", ""),
                    v2("different", "https://badname.com/+badregion", "", ""),
                ],
            ),
            entry(
                "different",
                "different",
                vec![
                    v2("same", "https://badtype.com/+badname", "", ""),
                    v2("different", "https://badtype.com/+badregion+badname", "", ""),
                ],
            ),
        ])
    }

    pub fn catalog3() -> Catalog {
        Catalog::new(vec![
            entry(
                "same",
                "same",
                vec![
                    v3("same", "", "public", "https://public.correct.com/"),
                    v3("same", "", "admin", "https://admin.correct.com/"),
                    v3("same", "", "internal", "https://internal.correct.com/"),
                    v3("different", "", "public", "https://badregion.com/"),
                ],
            ),
            entry(
                "same",
                "different",
                vec![
                    v3("same", "", "public", "https://badname.com/"),
                    v3("different", "", "public", "https://badname.com/+badregion"),
                ],
            ),
            entry(
                "different",
                "different",
                vec![
                    v3("same", "", "public", "https://badtype.com/+badname"),
                    v3("different", "", "public", "https://badtype.com/+badregion+badname"),
                ],
            ),
            entry(
                "someother",
                "someother",
                vec![
                    v3("someother", "", "public", "https://public.correct.com/"),
                    v3("", "someother", "admin", "https://admin.correct.com/"),
                    v3("", "someother", "internal", "https://internal.correct.com/"),
                ],
            ),
        ])
    }

    /// Version discovery from a fixed map, counting requests.
    #[derive(Debug, Default)]
    pub struct FakeDiscovery {
        pub versions: HashMap<String, SupportedMicroversions>,
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl VersionDiscovery for FakeDiscovery {
        async fn service_versions(&self, endpoint: &Url) -> Result<SupportedMicroversions, Error> {
            let _ = self.calls.fetch_add(1, Ordering::SeqCst);
            self.versions
                .get(endpoint.as_str())
                .cloned()
                .ok_or_else(|| Error::new(ErrorKind::ResourceNotFound, endpoint.as_str()))
        }
    }

    fn supported(min: (u16, u16), max: (u16, u16)) -> SupportedMicroversions {
        SupportedMicroversions {
            minimum: ApiVersion(min.0, min.1),
            maximum: ApiVersion(max.0, max.1),
        }
    }

    fn expected_urls() -> HashMap<Availability, &'static str> {
        hashmap! {
            Availability::Public => "https://public.correct.com/",
            Availability::Admin => "https://admin.correct.com/",
            Availability::Internal => "https://internal.correct.com/",
        }
    }

    #[test]
    fn test_v2_endpoint_exact() {
        for (availability, expected) in expected_urls() {
            let opts = EndpointOpts::new("same")
                .with_name("same")
                .with_region("same")
                .with_availability(availability);
            let url = catalog2().find_endpoint(&opts).unwrap();
            assert_eq!(url.as_str(), expected);
        }
    }

    #[test]
    fn test_v3_endpoint_exact() {
        for (availability, expected) in expected_urls() {
            let opts = EndpointOpts::new("same")
                .with_name("same")
                .with_region("same")
                .with_availability(availability);
            let url = catalog3().find_endpoint(&opts).unwrap();
            assert_eq!(url.as_str(), expected);
        }
    }

    #[test]
    fn test_v3_endpoint_with_region_id() {
        for (availability, expected) in expected_urls() {
            let opts = EndpointOpts::new("someother")
                .with_name("someother")
                .with_region("someother")
                .with_availability(availability);
            let url = catalog3().find_endpoint(&opts).unwrap();
            assert_eq!(url.as_str(), expected);
        }
    }

    #[test]
    fn test_endpoint_none() {
        for cat in &[catalog2(), catalog3()] {
            let err = cat
                .find_endpoint(&EndpointOpts::new("nope"))
                .err()
                .unwrap();
            assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
        }
    }

    #[test]
    fn test_endpoint_first_match_wins() {
        for cat in &[catalog2(), catalog3()] {
            let opts = EndpointOpts::new("same").with_region("same");
            let url = cat.find_endpoint(&opts).unwrap();
            assert_eq!(url.as_str(), "https://public.correct.com/");
        }
    }

    #[test]
    fn test_endpoint_first_match_duplicates() {
        let cat = Catalog::new(vec![entry(
            "compute",
            "nova",
            vec![
                v2("same", "https://a.example/", "", ""),
                v2("same", "https://b.example/", "", ""),
            ],
        )]);
        let opts = EndpointOpts::new("compute").with_region("same");
        for _ in 0..3 {
            let url = cat.find_endpoint(&opts).unwrap();
            assert_eq!(url.as_str(), "https://a.example/");
        }
    }

    #[test]
    fn test_endpoint_bad_availability() {
        for cat in &[catalog2(), catalog3(), Catalog::default()] {
            let opts = EndpointOpts::new("same")
                .with_name("same")
                .with_region("same")
                .with_availability("wat");
            let err = cat.find_endpoint(&opts).err().unwrap();
            assert_eq!(err.kind(), ErrorKind::InvalidAvailability);
            assert_eq!(
                err.to_string(),
                "Unexpected availability in endpoint query: wat"
            );
        }
    }

    #[tokio::test]
    async fn test_resolve_bad_availability_empty_catalog() {
        let discovery = FakeDiscovery::default();
        let opts = EndpointOpts::new("compute")
            .with_availability("bogus")
            .with_version(2);
        let err = Catalog::default()
            .resolve(&opts, &discovery)
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidAvailability);
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_v2_missing_interface_is_skipped() {
        let cat = Catalog::new(vec![entry(
            "compute",
            "nova",
            vec![
                v2("RegionOne", "https://public.one/", "", ""),
                v2("RegionTwo", "https://public.two/", "https://internal.two/", ""),
            ],
        )]);
        let opts = EndpointOpts::new("compute").with_availability("internal");
        let url = cat.find_endpoint(&opts).unwrap();
        assert_eq!(url.as_str(), "https://internal.two/");
    }

    #[test]
    fn test_endpoint_alternative_types() {
        let cat = Catalog::new(vec![
            entry(
                "volumev2",
                "cinderv2",
                vec![v3("RegionOne", "", "public", "https://cinder.example/v2/abcd")],
            ),
            entry(
                "volumev3",
                "cinderv3",
                vec![v3("RegionOne", "", "public", "https://cinder.example/v3/abcd")],
            ),
        ]);
        let opts = EndpointOpts::new("block-storage").with_types(vec!["volumev3", "volumev2"]);
        // Catalog order wins over the order of types.
        let url = cat.find_endpoint(&opts).unwrap();
        assert_eq!(url.as_str(), "https://cinder.example/v2/abcd/");
    }

    #[test]
    fn test_invalid_url() {
        let cat = Catalog::new(vec![entry(
            "compute",
            "nova",
            vec![v3("RegionOne", "", "public", "not a URL")],
        )]);
        let err = cat
            .find_endpoint(&EndpointOpts::new("compute"))
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_resolve_scenario() {
        let cat: Catalog = serde_json::from_str(
            r#"{"catalog": [{"type": "compute", "name": "nova", "endpoints": [
                {"region": "RegionOne", "interface": "public", "url": "https://nova.example/"}
            ]}]}"#,
        )
        .unwrap();
        let discovery = FakeDiscovery::default();
        let opts = EndpointOpts::new("compute")
            .with_region("RegionOne")
            .with_availability("public");
        let url = cat.resolve(&opts, &discovery).await.unwrap();
        assert_eq!(url.as_str(), "https://nova.example/");
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_with_version() {
        let cat = Catalog::new(vec![
            entry(
                "block-storage",
                "cinder",
                vec![v3("RegionOne", "", "public", "https://cinder.example/v2/abcd")],
            ),
            entry(
                "block-storage",
                "cinder",
                vec![v3("RegionOne", "", "public", "https://cinder.example/v3/abcd")],
            ),
        ]);
        let discovery = FakeDiscovery {
            versions: hashmap! {
                "https://cinder.example/v2/".to_string() => supported((2, 0), (2, 0)),
                "https://cinder.example/v3/".to_string() => supported((3, 0), (3, 70)),
            },
            ..FakeDiscovery::default()
        };

        let opts = EndpointOpts::new("block-storage").with_version(3);
        let url = cat.resolve(&opts, &discovery).await.unwrap();
        assert_eq!(url.as_str(), "https://cinder.example/v3/abcd/");
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 2);

        let opts = EndpointOpts::new("block-storage").with_version(2);
        let url = cat.resolve(&opts, &discovery).await.unwrap();
        assert_eq!(url.as_str(), "https://cinder.example/v2/abcd/");

        let opts = EndpointOpts::new("block-storage").with_version(4);
        let err = cat.resolve(&opts, &discovery).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }

    #[tokio::test]
    async fn test_resolve_object_store_skips_discovery() {
        let cat = Catalog::new(vec![entry(
            "object-store",
            "swift",
            vec![v3("RegionOne", "", "public", "https://swift.example/v1/AUTH_abcd")],
        )]);
        let discovery = FakeDiscovery::default();
        let opts = EndpointOpts::new("object-store").with_version(1);
        let url = cat.resolve(&opts, &discovery).await.unwrap();
        assert_eq!(url.as_str(), "https://swift.example/v1/AUTH_abcd/");
        assert_eq!(discovery.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_resolve_discovery_error_propagates() {
        let cat = Catalog::new(vec![entry(
            "compute",
            "nova",
            vec![v3("RegionOne", "", "public", "https://nova.example/v2.1/")],
        )]);
        let discovery = FakeDiscovery::default();
        let opts = EndpointOpts::new("compute").with_version(2);
        let err = cat.resolve(&opts, &discovery).await.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    }

    #[test]
    fn test_parse_v3_token() {
        let cat: Catalog = serde_json::from_str(
            r#"{"token": {"expires_at": "2026-01-01T00:00:00Z", "catalog": [
                {"type": "identity", "name": "keystone", "id": "1", "endpoints": [
                    {"id": "a", "interface": "public", "region": "RegionOne",
                     "region_id": "RegionOne", "url": "https://keystone.example/identity"},
                    {"id": "b", "interface": "internal", "region": "RegionOne",
                     "region_id": "RegionOne", "url": "http://10.0.0.1/identity"}
                ]},
                {"type": "compute", "name": "nova", "endpoints": []}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(cat.entries().len(), 2);
        assert_eq!(cat.entries()[0].service_type, "identity");
        assert_eq!(cat.entries()[0].name, "keystone");
        match cat.entries()[0].endpoints[1] {
            Endpoint::V3(ref endp) => {
                assert_eq!(endp.interface, "internal");
                assert_eq!(endp.region_id, "RegionOne");
            }
            ref other => panic!("Unexpected {:?}", other),
        }
        let opts = EndpointOpts::new("identity").with_availability("internal");
        assert_eq!(
            cat.find_endpoint(&opts).unwrap().as_str(),
            "http://10.0.0.1/identity/"
        );
    }

    #[tokio::test]
    async fn test_parse_v3_token_null_region() {
        let cat: Catalog = serde_json::from_str(
            r#"{"token": {"catalog": [{"type": "compute", "name": "nova", "endpoints": [
                {"id": "a", "interface": "public", "region": null, "region_id": null,
                 "url": "https://nova.example/v2.1"}
            ]}]}}"#,
        )
        .unwrap();
        let endp = &cat.entries()[0].endpoints[0];
        assert_eq!(endp.region(), "");
        assert!(!endp.matches_region("RegionOne"));

        let discovery = FakeDiscovery::default();
        let url = cat
            .resolve(&EndpointOpts::new("compute"), &discovery)
            .await
            .unwrap();
        assert_eq!(url.as_str(), "https://nova.example/v2.1/");

        let err = cat
            .resolve(
                &EndpointOpts::new("compute").with_region("RegionOne"),
                &discovery,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }

    #[test]
    fn test_parse_v2_access_null_fields() {
        let cat: Catalog = serde_json::from_str(
            r#"{"serviceCatalog": [{"type": "volumev3", "name": null, "endpoints": [
                {"region": null, "publicURL": "https://cinder.example/v3",
                 "internalURL": null, "adminURL": ""}
            ]}]}"#,
        )
        .unwrap();
        assert_eq!(cat.entries()[0].name, "");
        let endp = &cat.entries()[0].endpoints[0];
        assert_eq!(endp.region(), "");
        assert_eq!(endp.url(Availability::Internal), None);
        assert_eq!(endp.url(Availability::Admin), None);
        assert_eq!(
            cat.find_endpoint(&EndpointOpts::new("volumev3"))
                .unwrap()
                .as_str(),
            "https://cinder.example/v3/"
        );
    }

    #[test]
    fn test_parse_v2_access() {
        let cat: Catalog = serde_json::from_str(
            r#"{"access": {"serviceCatalog": [
                {"type": "compute", "name": "nova", "endpoints": [
                    {"region": "RegionOne", "tenantId": "abcd",
                     "publicURL": "https://nova.example/v2/abcd",
                     "internalURL": "http://10.0.0.1/v2/abcd",
                     "adminURL": "http://10.0.0.2/v2/abcd",
                     "versionId": "2", "versionInfo": "https://nova.example/v2",
                     "versionList": "https://nova.example/"}
                ]}
            ]}}"#,
        )
        .unwrap();
        match cat.entries()[0].endpoints[0] {
            Endpoint::V2(ref endp) => {
                assert_eq!(endp.tenant_id.as_deref(), Some("abcd"));
                assert_eq!(endp.version_id.as_deref(), Some("2"));
                assert_eq!(endp.version_list.as_deref(), Some("https://nova.example/"));
            }
            ref other => panic!("Unexpected {:?}", other),
        }
        let opts = EndpointOpts::new("compute").with_availability("admin");
        assert_eq!(
            cat.find_endpoint(&opts).unwrap().as_str(),
            "http://10.0.0.2/v2/abcd/"
        );
    }

    #[test]
    fn test_parse_invalid_catalog() {
        assert!(serde_json::from_str::<Catalog>(r#"{"catalog": 42}"#).is_err());
        assert!(serde_json::from_str::<Catalog>(
            r#"{"catalog": [{"type": "compute", "endpoints": [{"region": "x"}]}]}"#
        )
        .is_err());
        assert!(serde_json::from_str::<Catalog>(r#"{"something": []}"#).is_err());
    }
}
