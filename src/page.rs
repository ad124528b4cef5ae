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

//! Pages of paginated collections.
//!
//! Three pagination styles are supported:
//!
//! * [SinglePage](struct.SinglePage.html): the whole collection arrives in one response,
//! * [LinkedPage](struct.LinkedPage.html): the response has a `<collection>_links` array with
//!   a `next` link,
//! * [MarkerPage](struct.MarkerPage.html): the ID of the last item is the marker for the next
//!   request.

use std::fmt;

use http::header::HeaderMap;
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use super::common::{find_link, Link};
use super::Error;

/// A single resource of a collection.
///
/// This trait can normally be derived. The collection name defaults to the plural snake-case
/// name of the structure and can be changed with `#[collection_name = "resources"]`.
pub trait Resource: DeserializeOwned {
    /// Name of the field with the collection, e.g. `servers` for Compute servers.
    fn collection_name() -> &'static str;
}

/// A resource that can be used with marker pagination.
///
/// When deriving, add a `#[resource_id]` attribute to the field that serves as a marker.
pub trait MarkerResource: Resource {
    /// Type of an ID.
    type Id: fmt::Display;

    /// Retrieve a copy of the ID.
    fn resource_id(&self) -> Self::Id;
}

/// A fetched response before decoding.
#[derive(Clone, Debug)]
pub struct RawPage {
    /// URL that produced the response.
    pub url: Url,
    /// HTTP status.
    pub status: StatusCode,
    /// HTTP headers.
    pub headers: HeaderMap,
    /// Decoded JSON body, `Null` for an empty response.
    pub body: Value,
}

/// Where the next page is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Next {
    /// No more pages.
    End,
    /// Absolute URL of the next page.
    Url(Url),
    /// Marker to append to the initial URL.
    Marker(String),
}

/// A page of results.
pub trait Page: Sized {
    /// Type of items.
    type Item;

    /// Decode a page from a raw response.
    fn from_raw(raw: RawPage) -> Result<Self, Error>;

    /// Raw response.
    fn raw(&self) -> &RawPage;

    /// Decoded items.
    fn items(&self) -> &[Self::Item];

    /// Convert into decoded items.
    fn into_items(self) -> Vec<Self::Item>;

    /// Location of the next page.
    fn next_locator(&self) -> Next;

    /// Whether the page has no items.
    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

/// A page with the whole collection.
#[derive(Clone, Debug)]
pub struct SinglePage<T> {
    raw: RawPage,
    items: Vec<T>,
}

/// A page with a `<collection>_links` array.
#[derive(Clone, Debug)]
pub struct LinkedPage<T> {
    raw: RawPage,
    items: Vec<T>,
    links: Vec<Link>,
    next: Option<Url>,
}

/// A page that computes the next marker from its last item.
#[derive(Clone, Debug)]
pub struct MarkerPage<T> {
    raw: RawPage,
    items: Vec<T>,
}

impl RawPage {
    /// Create a raw page.
    pub fn new(url: Url, status: StatusCode, headers: HeaderMap, body: Value) -> RawPage {
        RawPage {
            url,
            status,
            headers,
            body,
        }
    }

    fn field(&self, name: &str) -> Result<Option<&Value>, Error> {
        match self.body {
            Value::Null => Ok(None),
            Value::Object(ref map) => Ok(map.get(name).filter(|v| !v.is_null())),
            ref other => Err(Error::new_page_decode(
                &self.url,
                format!("expected a JSON object, got {}", other),
            )),
        }
    }

    /// Decode the collection items.
    ///
    /// An empty body results in no items.
    pub fn decode_items<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>, Error> {
        match self.field(collection)? {
            Some(value) => {
                Vec::<T>::deserialize(value).map_err(|e| Error::new_page_decode(&self.url, e))
            }
            None if self.body.is_null() => Ok(Vec::new()),
            None => Err(Error::new_page_decode(
                &self.url,
                format!("missing field `{}`", collection),
            )),
        }
    }

    /// Decode the `<collection>_links` array.
    ///
    /// A missing array results in no links, a malformed one is an error.
    pub fn decode_links(&self, collection: &str) -> Result<Vec<Link>, Error> {
        let name = format!("{}_links", collection);
        match self.field(&name)? {
            Some(value) => {
                Vec::<Link>::deserialize(value).map_err(|e| Error::new_page_decode(&self.url, e))
            }
            None => Ok(Vec::new()),
        }
    }
}

impl<T: Resource> Page for SinglePage<T> {
    type Item = T;

    fn from_raw(raw: RawPage) -> Result<Self, Error> {
        let items = raw.decode_items(T::collection_name())?;
        Ok(SinglePage { raw, items })
    }

    fn raw(&self) -> &RawPage {
        &self.raw
    }

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }

    fn next_locator(&self) -> Next {
        Next::End
    }
}

impl<T> LinkedPage<T> {
    /// All links of the page.
    #[inline]
    pub fn links(&self) -> &[Link] {
        &self.links
    }
}

impl<T: Resource> Page for LinkedPage<T> {
    type Item = T;

    fn from_raw(raw: RawPage) -> Result<Self, Error> {
        let collection = T::collection_name();
        let items = raw.decode_items(collection)?;
        let links = raw.decode_links(collection)?;
        let next = match find_link(&links, "next") {
            Some(link) => link
                .resolve(&raw.url)
                .map_err(|e| Error::new_page_decode(&raw.url, e))?,
            None => None,
        };
        Ok(LinkedPage {
            raw,
            items,
            links,
            next,
        })
    }

    fn raw(&self) -> &RawPage {
        &self.raw
    }

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }

    fn next_locator(&self) -> Next {
        match self.next {
            Some(ref url) => Next::Url(url.clone()),
            None => Next::End,
        }
    }
}

impl<T: MarkerResource> Page for MarkerPage<T> {
    type Item = T;

    fn from_raw(raw: RawPage) -> Result<Self, Error> {
        let items = raw.decode_items(T::collection_name())?;
        Ok(MarkerPage { raw, items })
    }

    fn raw(&self) -> &RawPage {
        &self.raw
    }

    fn items(&self) -> &[T] {
        &self.items
    }

    fn into_items(self) -> Vec<T> {
        self.items
    }

    fn next_locator(&self) -> Next {
        match self.items.last() {
            Some(item) => Next::Marker(item.resource_id().to_string()),
            None => Next::End,
        }
    }
}
