//! In-memory range-fetch backend

use bytes::Bytes;
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::{Error, RangeRead, Result};

/// Archive held entirely in memory
///
/// Exists for tests, fixtures and small embedded archives. Every served
/// range is recorded, so tests can assert how often (and for which byte
/// ranges) a reader actually hit the store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    data: Bytes,
    requests: Arc<Mutex<Vec<(u64, u64)>>>,
}

impl MemoryStore {
    /// Create a store over the given archive bytes
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Every `(offset, length)` range served so far, in order
    pub fn requests(&self) -> Vec<(u64, u64)> {
        self.requests.lock().unwrap_or_else(std::sync::PoisonError::into_inner).clone()
    }

    /// Number of ranges served so far
    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap_or_else(std::sync::PoisonError::into_inner).len()
    }
}

impl RangeRead for MemoryStore {
    fn read_range(
        &self,
        offset: u64,
        length: u64,
    ) -> impl Future<Output = Result<Bytes>> + Send {
        let data = self.data.clone();
        let requests = Arc::clone(&self.requests);

        async move {
            requests
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push((offset, length));

            let size = data.len() as u64;
            if offset.checked_add(length).is_none_or(|end| end > size) {
                return Err(Error::RangeOutOfBounds {
                    offset,
                    length,
                    size,
                });
            }

            Ok(data.slice(offset as usize..(offset + length) as usize))
        }
    }
}
