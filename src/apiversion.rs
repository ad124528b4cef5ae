// Copyright 2018 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! ApiVersion implementation.

use std::fmt;
use std::str::FromStr;

use reqwest::header::HeaderValue;
use serde::de::{Error as DeserError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Error, ErrorKind};

/// API version (major, minor).
///
/// Used both for major API versions (`v2.1`, `v3`) and for microversions (`2.53`).
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ApiVersion(pub u16, pub u16);

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}

/// Parse a decimal component without sign or leading zeros.
fn parse_component(component: &str, kind: ErrorKind, message: &str) -> Result<u16, Error> {
    let canonical = !component.is_empty()
        && component.bytes().all(|b| b.is_ascii_digit())
        && (component.len() == 1 || !component.starts_with('0'));
    if !canonical {
        return Err(Error::new(kind, format!("{}: {:?}", message, component)));
    }
    component
        .parse()
        .map_err(|_| Error::new(kind, format!("{}: {:?}", message, component)))
}

impl ApiVersion {
    /// Parse a microversion in the strict `X.Y` format.
    ///
    /// Unlike the `FromStr` implementation, neither a `v` prefix nor a missing minor component
    /// is accepted, and the special value `latest` is rejected.
    ///
    /// ```rust
    /// let version = osroute::ApiVersion::parse_microversion("2.53").unwrap();
    /// assert_eq!(version, osroute::ApiVersion(2, 53));
    /// assert!(osroute::ApiVersion::parse_microversion("latest").is_err());
    /// ```
    pub fn parse_microversion(s: &str) -> Result<ApiVersion, Error> {
        let mut parts = s.split('.');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(major), Some(minor), None) => Ok(ApiVersion(
                parse_component(
                    major,
                    ErrorKind::MicroversionParse,
                    "Major microversion component is not a number",
                )?,
                parse_component(
                    minor,
                    ErrorKind::MicroversionParse,
                    "Minor microversion component is not a number",
                )?,
            )),
            _ => Err(Error::new(
                ErrorKind::MicroversionParse,
                format!("invalid microversion format: {:?}", s),
            )),
        }
    }
}

impl From<(u16, u16)> for ApiVersion {
    fn from(value: (u16, u16)) -> ApiVersion {
        ApiVersion(value.0, value.1)
    }
}

impl From<ApiVersion> for HeaderValue {
    fn from(value: ApiVersion) -> HeaderValue {
        HeaderValue::from_str(&value.to_string()).expect("X.Y is always a valid header value")
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<ApiVersion, Error> {
        let version_part = s.strip_prefix('v').unwrap_or(s);
        let parts: Vec<&str> = version_part.split('.').collect();

        if parts.is_empty() || parts.len() > 2 {
            let msg = format!("Invalid API version: expected X.Y or X, got {}", s);
            return Err(Error::new(ErrorKind::InvalidResponse, msg));
        }

        let major = parse_component(
            parts[0],
            ErrorKind::InvalidResponse,
            "First version component is not a number",
        )?;

        let minor = if parts.len() == 2 {
            parse_component(
                parts[1],
                ErrorKind::InvalidResponse,
                "Second version component is not a number",
            )?
        } else {
            0
        };

        Ok(ApiVersion(major, minor))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct ApiVersionVisitor;

impl<'de> Visitor<'de> for ApiVersionVisitor {
    type Value = ApiVersion;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string in format X.Y or X")
    }

    fn visit_str<E>(self, value: &str) -> ::std::result::Result<ApiVersion, E>
    where
        E: DeserError,
    {
        ApiVersion::from_str(value).map_err(DeserError::custom)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D>(deserializer: D) -> ::std::result::Result<ApiVersion, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ApiVersionVisitor)
    }
}
