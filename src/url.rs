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

//! Handy primitives for working with URLs.

use reqwest::Url;

/// Query parameter used for marker-based pagination.
pub const MARKER: &str = "marker";

/// Make sure the URL path ends with a slash.
#[inline]
pub fn normalize(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

/// Append path segments to the URL.
#[inline]
#[allow(unused_results)]
pub fn extend<I>(mut url: Url, segments: I) -> Url
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

fn is_version_segment(segment: &str) -> bool {
    match segment.strip_prefix('v') {
        Some(rest) => {
            !rest.is_empty()
                && rest.split('.').all(|x| !x.is_empty() && x.chars().all(|c| c.is_ascii_digit()))
        }
        None => false,
    }
}

/// Reduce an endpoint to its base versioned endpoint.
///
/// The query and the fragment are removed. If the path contains a version segment (e.g. `v2.1`),
/// everything after it is removed, and the result always ends with a slash. Otherwise only the
/// query and the fragment are stripped.
pub fn base_versioned_endpoint(url: &Url) -> Url {
    let mut result = url.clone();
    result.set_query(None);
    result.set_fragment(None);

    let version_index = url
        .path_segments()
        .and_then(|mut segments| segments.position(is_version_segment));
    if let Some(index) = version_index {
        let kept: Vec<String> = url
            .path_segments()
            .into_iter()
            .flatten()
            .take(index + 1)
            .map(String::from)
            .collect();
        result.set_path(&format!("/{}/", kept.join("/")));
    }

    result
}

/// Build a URL for the next page in marker pagination.
///
/// All query parameters of `url` are preserved except for a previous marker, which is replaced.
pub fn with_marker(url: &Url, marker: &str) -> Url {
    let mut result = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != MARKER)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    {
        let mut query = result.query_pairs_mut();
        let _ = query.clear();
        for (key, value) in &pairs {
            let _ = query.append_pair(key, value);
        }
        let _ = query.append_pair(MARKER, marker);
    }
    result
}
