// Copyright 2018-2020 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Endpoint defaults and overrides, including loading from `OS_` environment variables.

use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use log::debug;
use reqwest::Url;
use serde::{Deserialize, Serialize};

use super::{Availability, EndpointOpts, Error, ErrorKind};

const OVERRIDE_PREFIX: &str = "OS_";
const OVERRIDE_SUFFIX: &str = "_ENDPOINT_OVERRIDE";

/// Defaults applied to every endpoint lookup.
///
/// Can be embedded into a larger configuration:
///
/// ```rust
/// let defaults: osroute::EndpointDefaults = serde_json::from_str(
///     r#"{"region": "RegionOne", "interface": "internal"}"#,
/// ).expect("invalid defaults");
/// assert_eq!(defaults.interface, osroute::Availability::Internal);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointDefaults {
    /// Cloud region (any region if `None`).
    pub region: Option<String>,
    /// Endpoint interface.
    pub interface: Availability,
    /// Fixed endpoints by service type, bypassing the service catalog.
    pub overrides: HashMap<String, Url>,
}

fn service_from_variable(name: &str) -> Option<String> {
    name.strip_prefix(OVERRIDE_PREFIX)
        .and_then(|rest| rest.strip_suffix(OVERRIDE_SUFFIX))
        .filter(|service| !service.is_empty())
        .map(|service| service.to_lowercase().replace('_', "-"))
}

fn parse_override(service: &str, value: &str) -> Result<Url, Error> {
    Url::parse(value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Invalid endpoint override for {}: {}", service, e),
        )
    })
}

impl EndpointDefaults {
    /// Load defaults from the process environment.
    ///
    /// Reads `OS_REGION_NAME`, `OS_INTERFACE` and `OS_<SERVICE>_ENDPOINT_OVERRIDE`, where
    /// `<SERVICE>` is an upper-case service type with dashes replaced by underscores
    /// (e.g. `OS_BLOCK_STORAGE_ENDPOINT_OVERRIDE`).
    pub fn from_env() -> Result<EndpointDefaults, Error> {
        EndpointDefaults::from_vars(env::vars())
    }

    /// Load defaults from a list of variables.
    pub fn from_vars<I, K, V>(vars: I) -> Result<EndpointDefaults, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: HashMap<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut result = EndpointDefaults::from_lookup(|name| vars.get(name).cloned())?;
        for (name, value) in &vars {
            if let Some(service) = service_from_variable(name) {
                let url = parse_override(&service, value)?;
                debug!("Using endpoint override {} for {}", url, service);
                let _ = result.overrides.insert(service, url);
            }
        }
        Ok(result)
    }

    /// Load the region and the interface using a lookup function.
    ///
    /// Overrides cannot be discovered this way since their names are not known in advance.
    pub fn from_lookup<F>(lookup: F) -> Result<EndpointDefaults, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let interface = match lookup("OS_INTERFACE") {
            Some(value) if !value.is_empty() => Availability::from_str(&value)?,
            _ => Availability::default(),
        };
        Ok(EndpointDefaults {
            region: lookup("OS_REGION_NAME").filter(|value| !value.is_empty()),
            interface,
            overrides: HashMap::new(),
        })
    }

    /// Add an endpoint override.
    pub fn with_override<S: Into<String>>(mut self, service_type: S, url: Url) -> Self {
        let _ = self.overrides.insert(service_type.into(), url);
        self
    }

    /// Set the region.
    pub fn with_region<S: Into<String>>(mut self, region: S) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the interface.
    pub fn with_interface(mut self, interface: Availability) -> Self {
        self.interface = interface;
        self
    }

    /// Find an override for any of the service types.
    pub fn get_override(&self, opts: &EndpointOpts) -> Option<&Url> {
        opts.types.iter().find_map(|t| self.overrides.get(t))
    }

    /// Apply the region and the interface to the options.
    ///
    /// An explicitly set region is kept.
    pub fn apply(&self, mut opts: EndpointOpts) -> EndpointOpts {
        if opts.region.is_none() {
            opts.region = self.region.clone();
        }
        opts.set_availability(self.interface);
        opts
    }
}

#[cfg(test)]
pub mod test {
    use maplit::hashmap;
    use reqwest::Url;

    use super::EndpointDefaults;
    use crate::{Availability, EndpointOpts, ErrorKind};

    #[test]
    fn test_empty() {
        let defaults = EndpointDefaults::from_vars(Vec::<(String, String)>::new()).unwrap();
        assert_eq!(defaults, EndpointDefaults::default());
        assert_eq!(defaults.interface, Availability::Public);
    }

    #[test]
    fn test_region_and_interface() {
        let env = hashmap! {
            "OS_REGION_NAME" => "RegionTwo",
            "OS_INTERFACE" => "internal",
            "OS_USERNAME" => "admin",
        };
        let defaults = EndpointDefaults::from_vars(env).unwrap();
        assert_eq!(defaults.region.as_deref(), Some("RegionTwo"));
        assert_eq!(defaults.interface, Availability::Internal);
        assert!(defaults.overrides.is_empty());
    }

    #[test]
    fn test_invalid_interface() {
        let env = hashmap! { "OS_INTERFACE" => "private" };
        let err = EndpointDefaults::from_vars(env).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidAvailability);
    }

    #[test]
    fn test_overrides() {
        let env = hashmap! {
            "OS_BLOCK_STORAGE_ENDPOINT_OVERRIDE" => "http://cinder.local/v3",
            "OS_COMPUTE_ENDPOINT_OVERRIDE" => "http://nova.local/v2.1",
            "OS__ENDPOINT_OVERRIDE" => "http://nowhere",
        };
        let defaults = EndpointDefaults::from_vars(env).unwrap();
        assert_eq!(defaults.overrides.len(), 2);
        assert_eq!(
            defaults.overrides["block-storage"].as_str(),
            "http://cinder.local/v3"
        );

        let opts = EndpointOpts::new("volumev3").with_types(vec!["block-storage"]);
        assert_eq!(
            defaults.get_override(&opts).unwrap().as_str(),
            "http://cinder.local/v3"
        );
        assert!(defaults.get_override(&EndpointOpts::new("image")).is_none());
    }

    #[test]
    fn test_invalid_override() {
        let env = hashmap! { "OS_IMAGE_ENDPOINT_OVERRIDE" => "not a url" };
        let err = EndpointDefaults::from_vars(env).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_lookup() {
        let defaults = EndpointDefaults::from_lookup(|name| match name {
            "OS_REGION_NAME" => Some(String::new()),
            "OS_INTERFACE" => Some("adminURL".into()),
            _ => None,
        })
        .unwrap();
        assert!(defaults.region.is_none());
        assert_eq!(defaults.interface, Availability::Admin);
    }

    #[test]
    fn test_apply() {
        let defaults = EndpointDefaults::default()
            .with_region("RegionOne")
            .with_interface(Availability::Internal)
            .with_override("image", Url::parse("http://glance.local").unwrap());
        let opts = defaults.apply(EndpointOpts::new("compute"));
        assert_eq!(opts.region.as_deref(), Some("RegionOne"));
        assert_eq!(opts.availability().unwrap(), Availability::Internal);

        let opts = defaults.apply(EndpointOpts::new("compute").with_region("RegionTwo"));
        assert_eq!(opts.region.as_deref(), Some("RegionTwo"));
    }

    #[test]
    fn test_deserialize() {
        let defaults: EndpointDefaults = serde_json::from_str(
            r#"{"interface": "admin", "overrides": {"compute": "http://nova.local/"}}"#,
        )
        .unwrap();
        assert!(defaults.region.is_none());
        assert_eq!(defaults.interface, Availability::Admin);
        assert_eq!(defaults.overrides["compute"].as_str(), "http://nova.local/");
    }
}
