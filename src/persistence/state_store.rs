use std::io::Read;
use std::path::{Path, PathBuf};

use compio::fs;
use snafu::{OptionExt, ResultExt, Snafu, ensure};
use tracing::{debug, info};

use crate::filesystem::FileSystem;
use crate::persistence::snapshot::{Snapshot, SnapshotError};

/// Marks a file as a memshell state file; the digit tracks the container layout.
const MAGIC: &[u8; 4] = b"MSH1";
const COMPRESSION_LEVEL: i32 = 3;
/// Upper bound on the decompressed snapshot.
const MAX_STATE_BYTES: usize = 64 * 1024 * 1024;

fn bincode_config() -> impl bincode::config::Config {
    bincode::config::standard().with_limit::<MAX_STATE_BYTES>()
}

/// Persists a whole [`FileSystem`] in a single file between sessions.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and restores the saved tree, including its current directory.
    pub async fn load(&self) -> Result<FileSystem, StateStoreError> {
        debug!("Reading state file {}", self.path.display());
        let bytes = fs::read(&self.path).await.context(ReadSnafu {
            path: self.path.clone(),
        })?;
        debug!("Read {} bytes of saved state", bytes.len());

        let fs = decode(&bytes)?;
        info!("Loaded file system with {} nodes", fs.node_count());
        Ok(fs)
    }

    pub async fn save(&self, filesystem: &FileSystem) -> Result<(), StateStoreError> {
        let bytes = encode(filesystem)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.context(WriteSnafu {
                path: parent.to_path_buf(),
            })?;
        }

        let written = bytes.len();
        fs::write(&self.path, bytes).await.0.context(WriteSnafu {
            path: self.path.clone(),
        })?;
        info!(
            "Saved {} nodes ({} bytes) to {}",
            filesystem.node_count(),
            written,
            self.path.display()
        );
        Ok(())
    }
}

pub fn encode(filesystem: &FileSystem) -> Result<Vec<u8>, StateStoreError> {
    let snapshot = Snapshot::from(filesystem);
    let raw = bincode::encode_to_vec(&snapshot, bincode_config()).context(EncodeSnafu)?;
    let compressed = zstd::encode_all(raw.as_slice(), COMPRESSION_LEVEL).context(CompressSnafu)?;

    let mut bytes = Vec::with_capacity(MAGIC.len() + compressed.len());
    bytes.extend_from_slice(MAGIC);
    bytes.extend_from_slice(&compressed);
    Ok(bytes)
}

pub fn decode(bytes: &[u8]) -> Result<FileSystem, StateStoreError> {
    let payload = bytes
        .strip_prefix(MAGIC.as_slice())
        .context(UnrecognizedFormatSnafu)?;

    let raw = decompress(payload, MAX_STATE_BYTES)?;
    let (snapshot, _): (Snapshot, usize) =
        bincode::decode_from_slice(&raw, bincode_config()).context(DecodeSnafu)?;

    FileSystem::try_from(snapshot).context(InvalidSnapshotSnafu)
}

fn decompress(payload: &[u8], limit: usize) -> Result<Vec<u8>, StateStoreError> {
    let decoder = zstd::stream::read::Decoder::new(payload).context(DecompressSnafu)?;
    let mut raw = Vec::new();
    decoder
        .take(limit as u64 + 1)
        .read_to_end(&mut raw)
        .context(DecompressSnafu)?;
    ensure!(raw.len() <= limit, TooLargeSnafu { limit });
    Ok(raw)
}

#[derive(Debug, Snafu)]
pub enum StateStoreError {
    #[snafu(display("Failed to read state file {}", path.display()))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write state file {}", path.display()))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("State file was not written by this program"))]
    UnrecognizedFormat,
    #[snafu(display("Failed to compress state"))]
    CompressError { source: std::io::Error },
    #[snafu(display("State file is corrupted"))]
    DecompressError { source: std::io::Error },
    #[snafu(display("State file expands beyond {limit} bytes"))]
    TooLarge { limit: usize },
    #[snafu(display("Failed to encode state"))]
    EncodeError {
        source: bincode::error::EncodeError,
    },
    #[snafu(display("State file data is out of date or corrupted"))]
    DecodeError {
        source: bincode::error::DecodeError,
    },
    #[snafu(display("State file describes an invalid tree: {source}"))]
    InvalidSnapshot { source: SnapshotError },
}
