// Copyright 2021 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Internal service information cache.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;

use log::{debug, trace};
use reqwest::Url;
use tokio::sync::RwLock;

use crate::discovery::SupportedMicroversions;
use crate::Error;

/// Cached information about services, keyed by catalog type.
#[derive(Debug, Default)]
pub struct EndpointCache {
    endpoints: RwLock<HashMap<&'static str, Url>>,
    microversions: RwLock<HashMap<&'static str, Option<SupportedMicroversions>>>,
}

async fn get_or_fetch<K, V, F, Fut>(
    lock: &RwLock<HashMap<K, V>>,
    key: K,
    fetch: F,
) -> Result<V, Error>
where
    K: Eq + Hash + Copy + Display,
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, Error>>,
{
    if let Some(value) = lock.read().await.get(&key) {
        trace!("Using cached information for service {}", key);
        return Ok(value.clone());
    }

    debug!("No cached information for service {}, fetching", key);

    let mut guard = lock.write().await;
    // Additional check in case another task has filled the cache while we were waiting for
    // the write lock.
    if let Some(value) = guard.get(&key) {
        return Ok(value.clone());
    }

    let value = fetch().await?;
    let _ = guard.insert(key, value.clone());
    Ok(value)
}

impl EndpointCache {
    /// Create a new empty cache.
    #[inline]
    pub fn new() -> Self {
        EndpointCache::default()
    }

    /// Get a cached endpoint or fetch it.
    ///
    /// Failures are not cached.
    pub async fn endpoint<F, Fut>(&self, service_type: &'static str, fetch: F) -> Result<Url, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Url, Error>>,
    {
        get_or_fetch(&self.endpoints, service_type, fetch).await
    }

    /// Get cached microversions or fetch them.
    ///
    /// `None` means that the service does not advertise microversions.
    pub async fn microversions<F, Fut>(
        &self,
        service_type: &'static str,
        fetch: F,
    ) -> Result<Option<SupportedMicroversions>, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Option<SupportedMicroversions>, Error>>,
    {
        get_or_fetch(&self.microversions, service_type, fetch).await
    }

    /// Clear the cache.
    pub async fn clear(&self) {
        self.endpoints.write().await.clear();
        self.microversions.write().await.clear();
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use reqwest::Url;

    use super::EndpointCache;
    use crate::{Error, ErrorKind, SupportedMicroversions};

    #[tokio::test]
    async fn test_endpoint_cached() {
        let cache = EndpointCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let url = cache
                .endpoint("compute", || async {
                    let _ = calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Url::parse("http://nova.local/v2.1/").unwrap())
                })
                .await
                .unwrap();
            assert_eq!(url.as_str(), "http://nova.local/v2.1/");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.clear().await;
        let _ = cache
            .endpoint("compute", || async {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                Ok(Url::parse("http://nova.local/v2.1/").unwrap())
            })
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_not_cached() {
        let cache = EndpointCache::new();
        let err = cache
            .endpoint("compute", || async {
                Err(Error::new(ErrorKind::EndpointNotFound, "compute"))
            })
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);

        let url = cache
            .endpoint("compute", || async {
                Ok(Url::parse("http://nova.local/").unwrap())
            })
            .await
            .unwrap();
        assert_eq!(url.as_str(), "http://nova.local/");
    }

    #[tokio::test]
    async fn test_microversions_concurrent() {
        let cache = Arc::new(EndpointCache::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let tasks: Vec<_> = (0..4)
            .map(|_| {
                let cache = cache.clone();
                let calls = calls.clone();
                tokio::spawn(async move {
                    cache
                        .microversions("baremetal", || async move {
                            let _ = calls.fetch_add(1, Ordering::SeqCst);
                            Ok(Some(SupportedMicroversions::new((1, 1), (1, 87))))
                        })
                        .await
                })
            })
            .collect();
        for task in tasks {
            let result = task.await.unwrap().unwrap().unwrap();
            assert_eq!(result.maximum, crate::ApiVersion(1, 87));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
