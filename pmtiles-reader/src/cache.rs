//! Directory node cache with single-flight fetch deduplication
//!
//! Directory nodes are immutable once fetched, so the cache never updates
//! an entry: a node is either resolved (shared `Arc<Directory>`) or has one
//! in-flight load that every interested lookup awaits through a shared
//! future. The shared handle lives in the map itself, which is what makes
//! cancellation safe: if every current waiter is dropped, the next lookup
//! for the same node picks the load back up instead of finding a wedged
//! pending marker.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::trace;

use pmtiles_format::Directory;

use crate::{Error, Result};

/// Cache key: the byte range of a compressed directory node
///
/// The root directory is keyed by its own header-declared range; leaf
/// nodes by their absolute position in the archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DirKey {
    /// Absolute byte offset of the compressed node
    pub offset: u64,
    /// Byte length of the compressed node
    pub length: u64,
}

type LoadOutput = std::result::Result<Arc<Directory>, Arc<Error>>;
type SharedLoad = Shared<BoxFuture<'static, LoadOutput>>;

struct Resident {
    directory: Arc<Directory>,
    last_used: u64,
}

struct InFlight {
    id: u64,
    load: SharedLoad,
}

struct State {
    resolved: HashMap<DirKey, Resident>,
    in_flight: HashMap<DirKey, InFlight>,
    tick: u64,
}

/// Cache of decoded directory nodes keyed by byte range
pub struct DirectoryCache {
    state: Mutex<State>,
    capacity: Option<usize>,
}

impl DirectoryCache {
    /// Create a cache; `capacity` bounds the number of resolved nodes
    /// kept, evicting least-recently-used ones, `None` keeps everything
    /// for the life of the reader
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            state: Mutex::new(State {
                resolved: HashMap::new(),
                in_flight: HashMap::new(),
                tick: 0,
            }),
            capacity,
        }
    }

    /// Number of resolved directories currently cached
    pub fn len(&self) -> usize {
        self.state.lock().resolved.len()
    }

    /// Whether no resolved directories are cached
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached directory for `key`, or run `load` to fetch it
    ///
    /// Single-flight: if a load for `key` is already in flight, this call
    /// awaits it instead of starting another; at most one `load` future
    /// runs per key at a time. On success the directory is cached and
    /// shared. On failure every waiter gets [`Error::Load`] with the same
    /// cause, the pending marker is cleared, and a later call may retry.
    pub async fn get_or_load<F>(&self, key: DirKey, load: F) -> Result<Arc<Directory>>
    where
        F: Future<Output = Result<Directory>> + Send + 'static,
    {
        let (shared, id) = {
            let mut state = self.state.lock();

            state.tick += 1;
            let tick = state.tick;
            if let Some(resident) = state.resolved.get_mut(&key) {
                trace!("directory cache hit at {}+{}", key.offset, key.length);
                resident.last_used = tick;
                return Ok(Arc::clone(&resident.directory));
            }

            if let Some(pending) = state.in_flight.get(&key) {
                trace!("joining in-flight load at {}+{}", key.offset, key.length);
                (pending.load.clone(), pending.id)
            } else {
                trace!("directory cache miss at {}+{}", key.offset, key.length);
                let shared: SharedLoad = load
                    .map(|result| result.map(Arc::new).map_err(Arc::new))
                    .boxed()
                    .shared();
                state.in_flight.insert(
                    key,
                    InFlight {
                        id: tick,
                        load: shared.clone(),
                    },
                );
                (shared, tick)
            }
        };

        let outcome = shared.await;

        let mut state = self.state.lock();
        // First waiter back retires the pending marker; `id` guards
        // against retiring a newer load started after a failure
        if state.in_flight.get(&key).is_some_and(|p| p.id == id) {
            state.in_flight.remove(&key);
            if let Ok(directory) = &outcome {
                state.tick += 1;
                let tick = state.tick;
                state.resolved.insert(
                    key,
                    Resident {
                        directory: Arc::clone(directory),
                        last_used: tick,
                    },
                );
                self.evict_over_capacity(&mut state);
            }
        }
        drop(state);

        outcome.map_err(Error::Load)
    }

    fn evict_over_capacity(&self, state: &mut State) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while state.resolved.len() > capacity {
            let Some(oldest) = state
                .resolved
                .iter()
                .min_by_key(|(_, resident)| resident.last_used)
                .map(|(key, _)| *key)
            else {
                break;
            };
            trace!(
                "evicting directory at {}+{} over capacity {capacity}",
                oldest.offset, oldest.length
            );
            state.resolved.remove(&oldest);
        }
    }
}
