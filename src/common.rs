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

//! Reusable JSON structures and protocol bits.

use reqwest::Url;
use serde::de::{DeserializeOwned, Error as DeserError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A link to a resource.
///
/// Links appear both in version discovery documents and in paginated collections
/// (as `<collection>_links`).
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct Link {
    /// Resource URL.
    ///
    /// `None` if the server returned `null` or an empty string.
    #[serde(deserialize_with = "empty_as_default", default)]
    pub href: Option<String>,
    /// Relationship between the referencing and the referenced object.
    pub rel: String,
}

impl Link {
    /// Resolve the link against a base URL.
    ///
    /// Relative links are joined to `base`. Returns `Ok(None)` for an empty link.
    pub fn resolve(&self, base: &Url) -> Result<Option<Url>, url::ParseError> {
        match self.href {
            Some(ref href) => base.join(href).map(Some),
            None => Ok(None),
        }
    }
}

/// Find a link with the given relationship.
#[inline]
pub fn find_link<'l>(links: &'l [Link], rel: &str) -> Option<&'l Link> {
    links.iter().find(|x| x.rel == rel)
}

/// Status of a major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VersionStatus {
    /// The current version.
    Current,
    /// Supported version (that is not current).
    Supported,
    /// Deprecated version.
    Deprecated,
    /// Unknown version status.
    #[default]
    Unknown,
}

impl VersionStatus {
    /// If the version is considered stable.
    ///
    /// We assume that unknown statuses are also stable.
    #[inline]
    pub fn is_stable(&self) -> bool {
        !matches!(self, VersionStatus::Deprecated)
    }

    /// If the version has one of the explicitly stable statuses.
    ///
    /// Used when choosing between several versions: unknown statuses do not qualify.
    #[inline]
    pub fn is_explicitly_stable(&self) -> bool {
        matches!(self, VersionStatus::Current | VersionStatus::Supported)
    }
}

impl<T> From<T> for VersionStatus
where
    T: Into<String>,
{
    fn from(value: T) -> VersionStatus {
        match value.into().to_uppercase().as_ref() {
            "CURRENT" => VersionStatus::Current,
            "SUPPORTED" | "STABLE" => VersionStatus::Supported,
            "DEPRECATED" => VersionStatus::Deprecated,
            _ => VersionStatus::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for VersionStatus {
    fn deserialize<D>(deserializer: D) -> Result<VersionStatus, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<String> = Deserialize::deserialize(deserializer)?;
        Ok(value.map(VersionStatus::from).unwrap_or_default())
    }
}

/// Deserialize a value where empty string is replaced by `Default` value.
pub fn empty_as_default<'de, D, T>(des: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(des)?;
    match value {
        Value::String(ref s) if s.is_empty() => Ok(T::default()),
        Value::Null => Ok(T::default()),
        _ => serde_json::from_value(value).map_err(D::Error::custom),
    }
}
