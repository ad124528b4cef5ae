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

//! Version discovery and microversion negotiation.

use std::fmt;

use async_trait::async_trait;
use log::{debug, trace, warn};
use reqwest::{Method, StatusCode, Url};
use serde::Deserialize;
use static_assertions::assert_obj_safe;

use super::common::{empty_as_default, find_link, Link, VersionStatus};
use super::url;
use super::{ApiVersion, Client, Error, ErrorKind};

/// A version entry of a version discovery document.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Version {
    /// Version ID, e.g. `v2.1`.
    #[serde(default)]
    pub id: String,
    /// Version status.
    #[serde(default)]
    pub status: VersionStatus,
    /// Maximum supported microversion (if any).
    #[serde(deserialize_with = "empty_as_default", default)]
    pub version: Option<String>,
    /// Minimum supported microversion (if any).
    #[serde(deserialize_with = "empty_as_default", default)]
    pub min_version: Option<String>,
    /// Links, including the `self` link.
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
enum VersionList {
    // Identity service
    Values { values: Vec<Version> },
    Plain(Vec<Version>),
}

/// A version discovery document.
///
/// Either `{"version": {...}}` or `{"versions": [...]}` (`{"versions": {"values": [...]}}` for
/// the Identity service).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VersionDocument {
    #[serde(default)]
    version: Option<Version>,
    #[serde(default)]
    versions: Option<VersionList>,
}

/// Range of supported microversions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SupportedMicroversions {
    /// Minimum supported microversion.
    pub minimum: ApiVersion,
    /// Maximum supported microversion.
    pub maximum: ApiVersion,
}

/// A major version recognized by the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct VersionCandidate {
    /// Version ID, matched as a substring of the IDs in the discovery document.
    pub id: String,
    /// Priority, higher is better.
    pub priority: i32,
    /// Endpoint suffix that identifies this version without a discovery request.
    pub suffix: String,
}

/// Source of the supported microversions of an endpoint.
///
/// Implemented by [Client](struct.Client.html), which fetches the version discovery document.
#[async_trait]
pub trait VersionDiscovery: Send + Sync {
    /// Get supported microversions of the base endpoint.
    async fn service_versions(&self, endpoint: &Url) -> Result<SupportedMicroversions, Error>;
}

assert_obj_safe!(VersionDiscovery);

impl VersionList {
    fn into_vec(self) -> Vec<Version> {
        match self {
            VersionList::Values { values } => values,
            VersionList::Plain(values) => values,
        }
    }
}

impl VersionDocument {
    /// All versions in the document.
    pub fn into_versions(self) -> Vec<Version> {
        match (self.versions, self.version) {
            (Some(list), _) => list.into_vec(),
            (None, Some(version)) => vec![version],
            (None, None) => Vec::new(),
        }
    }

    /// Supported microversions of an unversioned endpoint.
    ///
    /// Exactly one version may be listed.
    pub fn into_microversions(self) -> Result<SupportedMicroversions, Error> {
        let list = self.versions.map(VersionList::into_vec).unwrap_or_default();
        let version = if list.is_empty() {
            self.version.unwrap_or_default()
        } else if list.len() > 1 {
            let ids: Vec<_> = list.into_iter().map(|v| v.id).collect();
            return Err(Error::new(
                ErrorKind::MultiVersionUnversionedEndpoint,
                format!("found versions {}", ids.join(", ")),
            ));
        } else {
            list.into_iter().next().unwrap_or_default()
        };

        if version.min_version.is_none() && version.version.is_none() {
            return Err(Error::new(
                ErrorKind::MicroversionsNotAdvertised,
                format!("version {} has no microversion range", version.id),
            ));
        }

        Ok(SupportedMicroversions {
            minimum: ApiVersion::parse_microversion(version.min_version.as_deref().unwrap_or(""))?,
            maximum: ApiVersion::parse_microversion(version.version.as_deref().unwrap_or(""))?,
        })
    }
}

impl fmt::Display for SupportedMicroversions {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} - {}", self.minimum, self.maximum)
    }
}

impl SupportedMicroversions {
    /// Create a new range.
    #[inline]
    pub fn new<A1: Into<ApiVersion>, A2: Into<ApiVersion>>(
        minimum: A1,
        maximum: A2,
    ) -> SupportedMicroversions {
        SupportedMicroversions {
            minimum: minimum.into(),
            maximum: maximum.into(),
        }
    }

    /// Check a microversion string against the range.
    ///
    /// The major component must be within the range, then the minor component is compared with
    /// the minor bounds of the range regardless of which major version it belongs to. The result
    /// is only precise when the range does not span several major versions; use
    /// [contains](#method.contains) for a lexicographic check.
    ///
    /// ```rust
    /// let supported = osroute::SupportedMicroversions::new((2, 1), (2, 90));
    /// assert!(supported.is_supported("2.53").unwrap());
    /// assert!(!supported.is_supported("3.0").unwrap());
    /// assert!(supported.is_supported("latest").is_err());
    /// ```
    pub fn is_supported(&self, version: &str) -> Result<bool, Error> {
        let requested = ApiVersion::parse_microversion(version)?;
        if requested.0 < self.minimum.0 || requested.0 > self.maximum.0 {
            return Ok(false);
        }

        if self.minimum.0 != self.maximum.0 {
            warn!(
                "Range {} spans several major versions, the minor component of {} \
                 is checked against {}..{} only",
                self,
                requested,
                self.minimum.1,
                self.maximum.1
            );
        }

        Ok(requested.1 >= self.minimum.1 && requested.1 <= self.maximum.1)
    }

    /// Whether the version is within the range (inclusive).
    #[inline]
    pub fn contains(&self, version: ApiVersion) -> bool {
        self.minimum <= version && version <= self.maximum
    }
}

impl VersionCandidate {
    /// Create a new candidate.
    pub fn new<S1, S2>(id: S1, priority: i32, suffix: S2) -> VersionCandidate
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        VersionCandidate {
            id: id.into(),
            priority,
            suffix: suffix.into(),
        }
    }
}

#[async_trait]
impl VersionDiscovery for Client {
    async fn service_versions(&self, endpoint: &Url) -> Result<SupportedMicroversions, Error> {
        get_service_versions(self, endpoint).await
    }
}

/// Fetch a version discovery document.
///
/// HTTP 200 and 300 are accepted.
pub async fn fetch_version_document(client: &Client, endpoint: &Url) -> Result<VersionDocument, Error> {
    debug!("Fetching version discovery document from {}", endpoint);
    let response = client
        .request(Method::GET, endpoint.clone())
        .send()
        .await?;
    let status = response.status();
    if status != StatusCode::OK && status != StatusCode::MULTIPLE_CHOICES {
        return Err(Error::new(
            ErrorKind::InvalidResponse,
            format!("Unexpected status {} from {}", status, endpoint),
        )
        .with_status(status));
    }

    let document = response.json::<VersionDocument>().await?;
    trace!("Received version document {:?} from {}", document, endpoint);
    Ok(document)
}

/// Get supported microversions of a base (unversioned) endpoint.
pub async fn get_service_versions(
    client: &Client,
    endpoint: &Url,
) -> Result<SupportedMicroversions, Error> {
    let result = fetch_version_document(client, endpoint)
        .await?
        .into_microversions()?;
    debug!("Endpoint {} supports microversions {}", endpoint, result);
    Ok(result)
}

fn self_link(version: &Version, base: &Url) -> Option<Url> {
    find_link(&version.links, "self")
        .and_then(|link| match link.resolve(base) {
            Ok(href) => href,
            Err(e) => {
                warn!("Invalid self link {:?} of version {}: {}", link, version.id, e);
                None
            }
        })
        .map(url::normalize)
}

/// Choose the best version among the caller-recognized candidates.
///
/// If `endpoint` is provided and ends with the suffix of a candidate, that candidate is returned
/// without fetching anything. Otherwise the discovery document at `base` is fetched: a version
/// whose self link equals `endpoint` wins, then the highest priority among the stable versions.
///
/// Returns the candidate and the normalized endpoint for it.
pub async fn choose_version<'c>(
    client: &Client,
    base: &Url,
    endpoint: Option<&Url>,
    candidates: &'c [VersionCandidate],
) -> Result<(&'c VersionCandidate, Url), Error> {
    let endpoint = endpoint.cloned().map(url::normalize);

    if let Some(ref endpoint) = endpoint {
        for candidate in candidates {
            if !candidate.suffix.is_empty() && endpoint.as_str().ends_with(&candidate.suffix) {
                debug!(
                    "Endpoint {} matches version {} by suffix",
                    endpoint, candidate.id
                );
                return Ok((candidate, endpoint.clone()));
            }
        }
    }

    let versions = fetch_version_document(client, base).await?.into_versions();

    let mut highest: Option<(&'c VersionCandidate, &Version, Option<Url>)> = None;
    for version in &versions {
        let href = self_link(version, base);
        for candidate in candidates.iter().filter(|c| version.id.contains(&c.id)) {
            if href.is_some() && href == endpoint {
                debug!("Version {} matches endpoint {:?}", version.id, endpoint);
                return Ok((candidate, href.unwrap_or_else(|| base.clone())));
            }

            if !version.status.is_explicitly_stable() {
                trace!("Skipping version {} with status {:?}", version.id, version.status);
                continue;
            }

            match highest {
                Some((current, _, _)) if current.priority >= candidate.priority => {}
                _ => highest = Some((candidate, version, href.clone())),
            }
        }
    }

    match highest {
        Some((candidate, _, Some(href))) => {
            debug!("Chose version {} at {}", candidate.id, href);
            Ok((candidate, href))
        }
        Some((_, version, None)) => Err(Error::new(
            ErrorKind::InvalidResponse,
            format!("Endpoint missing in version {} response from {}", version.id, base),
        )),
        None => Err(Error::new(
            ErrorKind::IncompatibleApiVersion,
            format!("No supported version available from endpoint {}", base),
        )),
    }
}
