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

//! OpenStack service types.

use reqwest::header::{HeaderName, HeaderValue};

use super::{ApiVersion, EndpointOpts};

/// Trait representing a service type.
pub trait ServiceType {
    /// Service type to pass to the catalog.
    fn catalog_type(&self) -> &'static str;

    /// Alternative service types, tried after the primary one.
    fn catalog_aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Required major version, `0` means any.
    fn major_version(&self) -> u16 {
        0
    }

    /// Whether this service supports version discovery at all.
    fn version_discovery_supported(&self) -> bool {
        true
    }

    /// Endpoint options for looking up this service.
    fn endpoint_opts(&self) -> EndpointOpts {
        let version = if self.version_discovery_supported() {
            self.major_version()
        } else {
            0
        };
        EndpointOpts::new(self.catalog_type())
            .with_types(self.catalog_aliases().iter().copied())
            .with_version(version)
    }
}

/// A service that supports microversions.
pub trait VersionedService: ServiceType {
    /// Return a header to set for the given API version.
    fn get_version_header(&self, version: ApiVersion) -> (HeaderName, HeaderValue);
}

/// A generic service.
#[derive(Copy, Clone, Debug)]
pub struct GenericService {
    catalog_type: &'static str,
    aliases: &'static [&'static str],
    major_version: u16,
    version_discovery: bool,
}

/// How a service expects the microversion to be passed.
#[derive(Copy, Clone, Debug)]
enum VersionHeader {
    /// `OpenStack-API-Version: <service> X.Y`.
    Standard(&'static str),
    /// A service-specific header with just `X.Y`.
    Legacy(&'static str),
}

/// A service that supports microversions.
#[derive(Copy, Clone, Debug)]
pub struct MicroversionedService {
    inner: GenericService,
    header: VersionHeader,
}

impl GenericService {
    /// Create a new generic service.
    pub const fn new(catalog_type: &'static str) -> GenericService {
        GenericService {
            catalog_type,
            aliases: &[],
            major_version: 0,
            version_discovery: true,
        }
    }

    /// Add alternative service types.
    pub const fn with_aliases(self, aliases: &'static [&'static str]) -> GenericService {
        GenericService { aliases, ..self }
    }

    /// Require a major version.
    pub const fn with_major_version(self, major_version: u16) -> GenericService {
        GenericService {
            major_version,
            ..self
        }
    }

    /// Disable version discovery.
    pub const fn without_version_discovery(self) -> GenericService {
        GenericService {
            version_discovery: false,
            ..self
        }
    }
}

impl ServiceType for GenericService {
    fn catalog_type(&self) -> &'static str {
        self.catalog_type
    }

    fn catalog_aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    fn major_version(&self) -> u16 {
        self.major_version
    }

    fn version_discovery_supported(&self) -> bool {
        self.version_discovery
    }
}

impl MicroversionedService {
    /// A service using the `OpenStack-API-Version` header with the given service name.
    pub const fn new(inner: GenericService, header_service: &'static str) -> MicroversionedService {
        MicroversionedService {
            inner,
            header: VersionHeader::Standard(header_service),
        }
    }

    /// A service using its own header for the microversion.
    pub const fn new_legacy(
        inner: GenericService,
        header_name: &'static str,
    ) -> MicroversionedService {
        MicroversionedService {
            inner,
            header: VersionHeader::Legacy(header_name),
        }
    }
}

impl ServiceType for MicroversionedService {
    fn catalog_type(&self) -> &'static str {
        self.inner.catalog_type()
    }

    fn catalog_aliases(&self) -> &'static [&'static str] {
        self.inner.catalog_aliases()
    }

    fn major_version(&self) -> u16 {
        self.inner.major_version()
    }

    fn version_discovery_supported(&self) -> bool {
        self.inner.version_discovery_supported()
    }
}

impl VersionedService for MicroversionedService {
    fn get_version_header(&self, version: ApiVersion) -> (HeaderName, HeaderValue) {
        match self.header {
            VersionHeader::Standard(service) => (
                HeaderName::from_static("openstack-api-version"),
                HeaderValue::from_str(&format!("{} {}", service, version))
                    .unwrap_or_else(|_| HeaderValue::from(version)),
            ),
            VersionHeader::Legacy(name) => (HeaderName::from_static(name), version.into()),
        }
    }
}

impl<T: ServiceType + ?Sized> ServiceType for &T {
    fn catalog_type(&self) -> &'static str {
        (**self).catalog_type()
    }

    fn catalog_aliases(&self) -> &'static [&'static str] {
        (**self).catalog_aliases()
    }

    fn major_version(&self) -> u16 {
        (**self).major_version()
    }

    fn version_discovery_supported(&self) -> bool {
        (**self).version_discovery_supported()
    }
}

impl<T: VersionedService + ?Sized> VersionedService for &T {
    fn get_version_header(&self, version: ApiVersion) -> (HeaderName, HeaderValue) {
        (**self).get_version_header(version)
    }
}

/// Bare Metal service.
pub const BAREMETAL: MicroversionedService = MicroversionedService::new_legacy(
    GenericService::new("baremetal").with_major_version(1),
    "x-openstack-ironic-api-version",
);

/// Block Storage service (v3).
pub const BLOCK_STORAGE: MicroversionedService = MicroversionedService::new(
    GenericService::new("block-storage")
        .with_aliases(&["volumev3", "volumev2", "volume"])
        .with_major_version(3),
    "volume",
);

/// Compute service.
pub const COMPUTE: MicroversionedService =
    MicroversionedService::new(GenericService::new("compute").with_major_version(2), "compute");

/// Identity service.
pub const IDENTITY: GenericService = GenericService::new("identity");

/// Image service.
pub const IMAGE: GenericService = GenericService::new("image");

/// Network service.
pub const NETWORK: GenericService = GenericService::new("network");

/// Object Storage service.
pub const OBJECT_STORAGE: GenericService =
    GenericService::new("object-store").without_version_discovery();

/// Placement service.
pub const PLACEMENT: MicroversionedService =
    MicroversionedService::new(GenericService::new("placement").with_major_version(1), "placement");
