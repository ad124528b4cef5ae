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

//! Driver for paginated collections.

use std::fmt;
use std::marker::PhantomData;

#[cfg(feature = "stream")]
use futures::Stream;
use http::header::HeaderMap;
use log::{debug, trace};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use super::page::{Next, Page, RawPage};
use super::url;
use super::{Client, Error, ErrorKind};

/// A driver that fetches pages of a collection one by one.
///
/// The pager owns the location of the next page, so it cannot be shared between concurrent
/// traversals. Create one pager per traversal instead.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), osroute::Error> {
/// use osroute::{LinkedPage, Pager, Resource};
/// use serde::Deserialize;
///
/// #[derive(Debug, Deserialize, Resource)]
/// struct Server {
///     id: String,
///     name: String,
/// }
///
/// let client = osroute::Client::new_without_auth();
/// let url = reqwest::Url::parse("https://nova.example/v2.1/servers?limit=10").unwrap();
/// let mut pager: Pager<LinkedPage<Server>> = Pager::new(client, url);
/// pager
///     .each_page(|page| {
///         println!("Got {} servers", osroute::Page::items(page).len());
///         Ok(true)
///     })
///     .await?;
/// # Ok(()) }
/// # #[tokio::main]
/// # async fn main() { example().await.unwrap(); }
/// ```
pub struct Pager<P> {
    client: Client,
    initial: Url,
    current: Option<Url>,
    headers: HeaderMap,
    cancellation: Option<CancellationToken>,
    _page: PhantomData<fn() -> P>,
}

impl<P> fmt::Debug for Pager<P> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Pager")
            .field("initial", &self.initial.as_str())
            .field("current", &self.current.as_ref().map(Url::as_str))
            .field("cancellable", &self.cancellation.is_some())
            .finish()
    }
}

impl<P: Page> Pager<P> {
    /// Create a pager starting with the given URL.
    pub fn new(client: Client, url: Url) -> Pager<P> {
        Pager {
            client,
            current: Some(url.clone()),
            initial: url,
            headers: HeaderMap::new(),
            cancellation: None,
            _page: PhantomData,
        }
    }

    /// Send additional headers with each request (e.g. a microversion header).
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Add query parameters to the initial URL.
    ///
    /// Existing parameters are kept.
    pub fn with_query<Q: Serialize + ?Sized>(mut self, query: &Q) -> Result<Self, Error> {
        let encoded = serde_urlencoded::to_string(query)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))?;
        if !encoded.is_empty() {
            let combined = match self.initial.query() {
                Some(existing) if !existing.is_empty() => format!("{}&{}", existing, encoded),
                _ => encoded,
            };
            self.initial.set_query(Some(&combined));
        }
        self.reset();
        Ok(self)
    }

    /// Abort the traversal once the token is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The URL of the first page.
    #[inline]
    pub fn initial_url(&self) -> &Url {
        &self.initial
    }

    /// Restart from the first page.
    #[inline]
    pub fn reset(&mut self) {
        self.current = Some(self.initial.clone());
    }

    fn cancelled(&self, url: &Url) -> Error {
        debug!("Pagination cancelled before fetching {}", url);
        Error::new(ErrorKind::Cancelled, format!("pagination of {}", self.initial))
    }

    async fn fetch(&self, url: Url) -> Result<RawPage, Error> {
        trace!("Fetching page {}", url);
        let response = self
            .client
            .request(Method::GET, url.clone())
            .headers(self.headers.clone())
            .send()
            .await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;
        let body = if status == StatusCode::NO_CONTENT
            || bytes.iter().all(|b| b.is_ascii_whitespace())
        {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).map_err(|e| Error::new_page_decode(&url, e))?
        };
        Ok(RawPage::new(url, status, headers, body))
    }

    /// Fetch the next page.
    ///
    /// Returns `None` when the collection is exhausted. After an error the traversal is over
    /// until [reset](#method.reset) is called.
    pub async fn next_page(&mut self) -> Result<Option<P>, Error> {
        let url = match self.current.take() {
            Some(url) => url,
            None => return Ok(None),
        };

        let raw = match self.cancellation {
            Some(ref token) => {
                if token.is_cancelled() {
                    return Err(self.cancelled(&url));
                }

                tokio::select! {
                    biased;
                    _ = token.cancelled() => Err(self.cancelled(&url)),
                    result = self.fetch(url.clone()) => result,
                }?
            }
            None => self.fetch(url.clone()).await?,
        };

        let page = P::from_raw(raw)?;
        self.current = if page.is_empty() {
            trace!("Page {} is empty, stopping", url);
            None
        } else {
            match page.next_locator() {
                Next::End => None,
                Next::Url(next) => Some(next),
                Next::Marker(marker) => Some(url::with_marker(&self.initial, &marker)),
            }
        };

        debug!(
            "Fetched page {} with {} item(s), next: {:?}",
            url,
            page.items().len(),
            self.current.as_ref().map(Url::as_str)
        );
        Ok(Some(page))
    }

    /// Visit pages starting with the first one.
    ///
    /// Stops when the collection is exhausted, when `visit` returns `false` or an error.
    /// The next page is only fetched after `visit` returns.
    pub async fn each_page<F>(&mut self, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&P) -> Result<bool, Error>,
    {
        self.reset();
        while let Some(page) = self.next_page().await? {
            if !visit(&page)? {
                debug!("Stopping pagination of {} on request", self.initial);
                break;
            }
        }
        Ok(())
    }

    /// Fetch all items starting with the first page.
    pub async fn all_pages(&mut self) -> Result<Vec<P::Item>, Error> {
        self.reset();
        let mut result = Vec::new();
        while let Some(page) = self.next_page().await? {
            result.extend(page.into_items());
        }
        Ok(result)
    }

    /// Convert into a stream of items.
    ///
    /// Pages are fetched lazily, continuing from the current position.
    #[cfg(feature = "stream")]
    pub fn into_stream(self) -> impl Stream<Item = Result<P::Item, Error>> {
        super::stream::items(self)
    }

    /// Convert into a stream of pages.
    #[cfg(feature = "stream")]
    pub fn into_page_stream(self) -> impl Stream<Item = Result<P, Error>> {
        super::stream::pages(self)
    }
}
