//! Local filesystem range-fetch backend

use bytes::Bytes;
use std::future::Future;
use std::io::SeekFrom;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::trace;

use crate::{Error, RangeRead, Result};

/// Local archive read with `tokio::fs`
///
/// Opens the file per request, so concurrent reads never contend on a
/// shared seek position.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The archive path this store reads from
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RangeRead for FileStore {
    fn read_range(
        &self,
        offset: u64,
        length: u64,
    ) -> impl Future<Output = Result<Bytes>> + Send {
        let path = self.path.clone();

        async move {
            trace!("reading {length} bytes at {offset} from {}", path.display());

            let mut file = File::open(&path).await?;
            let size = file.metadata().await?.len();
            if offset.checked_add(length).is_none_or(|end| end > size) {
                return Err(Error::RangeOutOfBounds {
                    offset,
                    length,
                    size,
                });
            }

            file.seek(SeekFrom::Start(offset)).await?;
            let mut buf = vec![0u8; length as usize];
            file.read_exact(&mut buf).await?;

            Ok(Bytes::from(buf))
        }
    }
}
