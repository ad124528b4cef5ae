// Copyright 2020 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Endpoint options for looking up endpoints in the service catalog.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Error, ErrorKind};

/// Endpoint availability (also known as interface): public, internal or admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Availability {
    /// Public interface (used by default).
    #[default]
    Public,
    /// Internal interface.
    Internal,
    /// Administrator interface.
    Admin,
}

/// Options for looking up an endpoint.
///
/// Constructed per lookup and consumed by [Catalog::resolve](struct.Catalog.html#method.resolve):
///
/// ```rust
/// let opts = osroute::EndpointOpts::new("block-storage")
///     .with_types(vec!["volumev3", "volumev2"])
///     .with_region("RegionOne")
///     .with_availability(osroute::Availability::Internal);
/// assert_eq!(opts.types, vec!["block-storage", "volumev3", "volumev2"]);
/// assert_eq!(opts.availability().unwrap(), osroute::Availability::Internal);
/// ```
///
/// The availability is kept as provided (it often comes from configuration) and is validated
/// before the catalog is scanned.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct EndpointOpts {
    /// Acceptable service types, in the order of preference.
    pub types: Vec<String>,
    /// Service name (any name if `None`).
    pub name: Option<String>,
    /// Cloud region (any region if `None`).
    pub region: Option<String>,
    /// Requested availability, must be one of `public`, `internal` or `admin`.
    pub availability: String,
    /// Required major API version, `0` means any version.
    pub version: u16,
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(match self {
            Availability::Public => "public",
            Availability::Internal => "internal",
            Availability::Admin => "admin",
        })
    }
}

impl From<Availability> for String {
    fn from(value: Availability) -> String {
        value.to_string()
    }
}

impl<T> PartialEq<T> for Availability
where
    T: AsRef<str>,
{
    fn eq(&self, other: &T) -> bool {
        if let Ok(converted) = Availability::from_str(other.as_ref()) {
            *self == converted
        } else {
            false
        }
    }
}

impl FromStr for Availability {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" | "publicURL" => Ok(Availability::Public),
            "internal" | "internalURL" => Ok(Availability::Internal),
            "admin" | "adminURL" => Ok(Availability::Admin),
            other => Err(Error::new(ErrorKind::InvalidAvailability, other)),
        }
    }
}

impl Serialize for Availability {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Availability {
    fn deserialize<D>(deserializer: D) -> Result<Availability, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Availability::from_str(&value).map_err(serde::de::Error::custom)
    }
}

impl Default for EndpointOpts {
    fn default() -> EndpointOpts {
        EndpointOpts {
            types: Vec::new(),
            name: None,
            region: None,
            availability: Availability::Public.into(),
            version: 0,
        }
    }
}

impl EndpointOpts {
    /// Create options for a service type with the public availability.
    pub fn new<S: Into<String>>(service_type: S) -> EndpointOpts {
        EndpointOpts {
            types: vec![service_type.into()],
            ..EndpointOpts::default()
        }
    }

    /// Parsed availability.
    ///
    /// Fails with `InvalidAvailability` if the value is not recognized.
    #[inline]
    pub fn availability(&self) -> Result<Availability, Error> {
        Availability::from_str(&self.availability)
    }

    /// Whether the service type is acceptable.
    #[inline]
    pub fn matches_type(&self, service_type: &str) -> bool {
        self.types.iter().any(|x| x == service_type)
    }

    /// Whether the service name is acceptable.
    #[inline]
    pub fn matches_name(&self, name: &str) -> bool {
        match self.name {
            Some(ref expected) => expected == name,
            None => true,
        }
    }

    /// Add alternative service types.
    ///
    /// Duplicates are ignored.
    pub fn add_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for item in types {
            let item = item.into();
            if !self.types.contains(&item) {
                self.types.push(item);
            }
        }
    }

    /// Set availability.
    ///
    /// Hint: accepts both strings and [Availability](enum.Availability.html).
    #[inline]
    pub fn set_availability<T: Into<String>>(&mut self, value: T) {
        self.availability = value.into();
    }

    /// Set service name.
    #[inline]
    pub fn set_name<T: Into<String>>(&mut self, value: T) {
        self.name = Some(value.into());
    }

    /// Set region.
    #[inline]
    pub fn set_region<T: Into<String>>(&mut self, value: T) {
        self.region = Some(value.into());
    }

    /// Set the required major version.
    #[inline]
    pub fn set_version(&mut self, value: u16) {
        self.version = value;
    }

    /// Add alternative service types.
    #[inline]
    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.add_types(types);
        self
    }

    /// Add availability.
    #[inline]
    pub fn with_availability<T: Into<String>>(mut self, value: T) -> Self {
        self.set_availability(value);
        self
    }

    /// Add a service name.
    #[inline]
    pub fn with_name<T: Into<String>>(mut self, value: T) -> Self {
        self.set_name(value);
        self
    }

    /// Add a region.
    #[inline]
    pub fn with_region<T: Into<String>>(mut self, value: T) -> Self {
        self.set_region(value);
        self
    }

    /// Add the required major version.
    #[inline]
    pub fn with_version(mut self, value: u16) -> Self {
        self.set_version(value);
        self
    }
}
