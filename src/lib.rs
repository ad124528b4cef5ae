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

//! OpenStack request routing: endpoint resolution, microversion negotiation and pagination.
//!
//! The [Catalog](struct.Catalog.html) resolves service endpoints, the
//! [discovery](discovery/index.html) module negotiates major versions and microversions, and
//! the [Pager](struct.Pager.html) walks paginated collections. A [Session](struct.Session.html)
//! ties them together and caches the results.
//!
//! ```rust,no_run
//! use osroute::services::COMPUTE;
//! use osroute::Resource;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize, Resource)]
//! struct Server {
//!     #[resource_id]
//!     id: String,
//!     name: String,
//! }
//!
//! # async fn example() -> Result<(), osroute::Error> {
//! let catalog = std::fs::read_to_string("token.json").expect("cannot read the token body");
//! let auth = osroute::TokenAuth::from_token_body("gAAAAABf...", &catalog)?;
//! let session = osroute::Session::new(auth)
//!     .with_defaults(osroute::EndpointDefaults::from_env()?);
//!
//! let version = session.require_microversion(COMPUTE, "2.53").await?;
//! let (name, value) = osroute::services::VersionedService::get_version_header(&COMPUTE, version);
//! let mut headers = reqwest::header::HeaderMap::new();
//! let _ = headers.insert(name, value);
//!
//! let servers = session
//!     .marker_pager::<Server, _, _>(COMPUTE, &["servers"])
//!     .await?
//!     .with_headers(headers)
//!     .with_query(&[("limit", 50)])?
//!     .all_pages()
//!     .await?;
//! for server in servers {
//!     println!("{} {}", server.id, server.name);
//! }
//! # Ok(()) }
//! # #[tokio::main]
//! # async fn main() { example().await.unwrap(); }
//! ```

#![crate_name = "osroute"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    dead_code,
    improper_ctypes,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_doc_comments,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    unused_results,
    while_true
)]
#![allow(
    clippy::new_ret_no_self,
    clippy::should_implement_trait,
    clippy::wrong_self_convention
)]

mod apiversion;
mod auth;
mod cache;
mod catalog;
pub mod client;
mod common;
mod config;
pub mod discovery;
mod endpointopts;
mod error;
mod page;
mod pager;
mod query;
pub mod services;
mod session;
#[cfg(feature = "stream")]
mod stream;
mod url;

pub use crate::apiversion::ApiVersion;
pub use crate::auth::{AuthType, NoAuth, TokenAuth};
pub use crate::catalog::{Catalog, CatalogEntry, Endpoint, V2Endpoint, V3Endpoint};
pub use crate::client::Client;
pub use crate::common::{Link, VersionStatus};
pub use crate::config::EndpointDefaults;
pub use crate::discovery::{
    choose_version, get_service_versions, SupportedMicroversions, VersionCandidate,
    VersionDiscovery,
};
pub use crate::endpointopts::{Availability, EndpointOpts};
pub use crate::error::{Error, ErrorKind};
pub use crate::page::{
    LinkedPage, MarkerPage, MarkerResource, Next, Page, RawPage, Resource, SinglePage,
};
pub use crate::pager::Pager;
pub use crate::query::{Query, QueryItem};
pub use crate::session::Session;
pub use osroute_derive::{QueryItem, Resource};
pub use tokio_util::sync::CancellationToken;
