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

//! Streams over paginated collections.

use async_stream::try_stream;
use futures::stream::Stream;
use log::trace;

use super::page::Page;
use super::pager::Pager;
use super::Error;

/// Stream of pages, continuing from the pager's current position.
pub(crate) fn pages<P: Page>(mut pager: Pager<P>) -> impl Stream<Item = Result<P, Error>> {
    try_stream! {
        while let Some(page) = pager.next_page().await? {
            yield page;
        }
        trace!("Collection {} exhausted", pager.initial_url());
    }
}

/// Stream of items of all pages.
///
/// A page is only fetched once all items of the previous one are consumed.
pub(crate) fn items<P: Page>(mut pager: Pager<P>) -> impl Stream<Item = Result<P::Item, Error>> {
    try_stream! {
        while let Some(page) = pager.next_page().await? {
            for item in page.into_items() {
                yield item;
            }
        }
    }
}
