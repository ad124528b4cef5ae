// Copyright 2023 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! List filters for paginated collections.

use std::borrow::Cow;
use std::ops::{Deref, DerefMut};

use serde::ser::{Error as SerError, SerializeSeq};
use serde::{Serialize, Serializer};

use super::{Error, ErrorKind};

/// A single filter of a collection listing, e.g. `status=ACTIVE`.
pub trait QueryItem {
    /// The query parameter name and its value.
    fn query_item(&self) -> Result<(&str, Cow<str>), Error>;
}

/// Filters of a collection listing.
///
/// Items are encoded in their order, a parameter may be repeated. Pass a query to
/// [Pager::with_query](struct.Pager.html#method.with_query) to filter every page of a
/// traversal. A `marker` item sets the starting point of marker pagination, the following
/// pages replace it.
///
/// ```rust
/// use osroute::{Query, QueryItem};
///
/// #[derive(Debug, QueryItem)]
/// enum ServerFilter {
///     Status(String),
///     Limit(u32),
///     #[query_item = "changes-since"]
///     ChangesSince(String),
/// }
///
/// let query = Query::default()
///     .with(ServerFilter::Status("ACTIVE".into()))
///     .with(ServerFilter::ChangesSince("2026-01-01T00:00:00Z".into()))
///     .with(ServerFilter::Limit(100));
/// assert_eq!(
///     query.encode().unwrap(),
///     "status=ACTIVE&changes-since=2026-01-01T00%3A00%3A00Z&limit=100"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T>(pub Vec<T>);

impl<T> Default for Query<T> {
    fn default() -> Query<T> {
        Query(Vec::new())
    }
}

impl<T> Query<T> {
    /// Add a filter.
    #[inline]
    pub fn with(mut self, item: T) -> Self {
        self.0.push(item);
        self
    }
}

impl<T: QueryItem> Query<T> {
    /// Encode as a URL query string.
    ///
    /// Errors from [QueryItem::query_item] are returned unchanged.
    pub fn encode(&self) -> Result<String, Error> {
        let pairs = self
            .0
            .iter()
            .map(|filter| filter.query_item())
            .collect::<Result<Vec<_>, _>>()?;
        serde_urlencoded::to_string(pairs)
            .map_err(|e| Error::new(ErrorKind::InvalidInput, e.to_string()))
    }
}

impl<T> From<Vec<T>> for Query<T> {
    fn from(value: Vec<T>) -> Query<T> {
        Query(value)
    }
}

impl<T> FromIterator<T> for Query<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Query<T> {
        Query(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for Query<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<T> Deref for Query<T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.0
    }
}

impl<T> DerefMut for Query<T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.0
    }
}

impl<T> Serialize for Query<T>
where
    T: QueryItem,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.len()))?;
        for filter in &self.0 {
            let pair = filter.query_item().map_err(SerError::custom)?;
            seq.serialize_element(&pair)?;
        }
        seq.end()
    }
}

#[cfg(test)]
pub mod test {
    use std::borrow::Cow;

    use super::{Query, QueryItem};
    use crate::{Error, ErrorKind};

    #[derive(Debug, Clone)]
    pub enum VolumeFilter {
        Status(String),
        Limit(u32),
        Marker(String),
    }

    impl QueryItem for VolumeFilter {
        fn query_item(&self) -> Result<(&str, Cow<str>), Error> {
            Ok(match self {
                VolumeFilter::Status(s) => ("status", Cow::Borrowed(s)),
                VolumeFilter::Limit(0) => {
                    return Err(Error::new(ErrorKind::InvalidInput, "limit must be positive"))
                }
                VolumeFilter::Limit(n) => ("limit", Cow::Owned(n.to_string())),
                VolumeFilter::Marker(s) => ("marker", Cow::Borrowed(s)),
            })
        }
    }

    #[test]
    fn test_encode_repeated() {
        let query = Query::default()
            .with(VolumeFilter::Status("available".into()))
            .with(VolumeFilter::Status("in-use".into()))
            .with(VolumeFilter::Limit(10));
        assert_eq!(
            query.encode().unwrap(),
            "status=available&status=in-use&limit=10"
        );
    }

    #[test]
    fn test_encode_escapes() {
        let query: Query<_> = vec![VolumeFilter::Marker("a b&c".into())].into();
        assert_eq!(query.encode().unwrap(), "marker=a+b%26c");
    }

    #[test]
    fn test_encode_empty() {
        let query: Query<VolumeFilter> = Query::default();
        assert_eq!(query.encode().unwrap(), "");
    }

    #[test]
    fn test_encode_item_error() {
        let query: Query<_> = vec![VolumeFilter::Status("x".into()), VolumeFilter::Limit(0)]
            .into_iter()
            .collect();
        let err = query.encode().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(serde_urlencoded::to_string(&query).is_err());
    }

    #[test]
    fn test_serialize_matches_encode() {
        let mut query = Query::default().with(VolumeFilter::Limit(5));
        query.extend(vec![VolumeFilter::Status("error".into())]);
        assert_eq!(query.len(), 2);
        assert_eq!(
            serde_urlencoded::to_string(&query).unwrap(),
            query.encode().unwrap()
        );
    }
}
