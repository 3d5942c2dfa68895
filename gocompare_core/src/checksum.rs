use gocompare_common::{
    ComparisonOutcome, Digest, HashAlgorithm, RelativePath, UnreadableSide, DEFAULT_BUFFER_SIZE,
};
use sha2::Digest as _;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// A file that could not be read to completion. Never leaves this module:
/// [`ChecksumComparator::compare`] turns it into an `Unreadable` outcome.
#[derive(Error, Debug)]
#[error("{}: {source}", .path.display())]
struct FileUnreadableError {
    path: PathBuf,
    source: io::Error,
}

enum ContentHasher {
    Blake3(Box<blake3::Hasher>),
    Sha256(sha2::Sha256),
    Md5(md5::Md5),
}

impl ContentHasher {
    fn new(algorithm: HashAlgorithm) -> Self {
        match algorithm {
            HashAlgorithm::Blake3 => ContentHasher::Blake3(Box::new(blake3::Hasher::new())),
            HashAlgorithm::Sha256 => ContentHasher::Sha256(sha2::Sha256::new()),
            HashAlgorithm::Md5 => ContentHasher::Md5(md5::Md5::new()),
        }
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            ContentHasher::Blake3(hasher) => {
                hasher.update(data);
            }
            ContentHasher::Sha256(hasher) => hasher.update(data),
            ContentHasher::Md5(hasher) => hasher.update(data),
        }
    }

    fn finalize(self) -> Digest {
        match self {
            ContentHasher::Blake3(hasher) => {
                Digest::new(HashAlgorithm::Blake3, hasher.finalize().as_bytes().to_vec())
            }
            ContentHasher::Sha256(hasher) => {
                Digest::new(HashAlgorithm::Sha256, hasher.finalize().to_vec())
            }
            ContentHasher::Md5(hasher) => {
                Digest::new(HashAlgorithm::Md5, hasher.finalize().to_vec())
            }
        }
    }
}

/// Computes content digests and classifies a common path
#[derive(Debug, Clone, Copy)]
pub struct ChecksumComparator {
    algorithm: HashAlgorithm,
    buffer_size: usize,
}

impl Default for ChecksumComparator {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl ChecksumComparator {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Switch the hash, keeping the configured buffer size
    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Stream `reader` to the end through the configured hash
    pub fn digest_reader<R: Read>(&self, mut reader: R) -> io::Result<Digest> {
        let mut hasher = ContentHasher::new(self.algorithm);
        let mut buffer = vec![0; self.buffer_size];

        loop {
            let n = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            hasher.update(&buffer[..n]);
        }

        Ok(hasher.finalize())
    }

    /// Digest of the file at `path`
    pub fn digest_file(&self, path: &Path) -> io::Result<Digest> {
        // The handle is closed when `file` drops, on every return path
        let file = File::open(path)?;
        self.digest_reader(file)
    }

    fn digest_side(&self, root: &Path, path: &RelativePath) -> Result<Digest, FileUnreadableError> {
        let full = path.to_native(root);
        self.digest_file(&full)
            .map_err(|source| FileUnreadableError { path: full, source })
    }

    /// Classify `path` by digesting it under both roots.
    ///
    /// Never fails: read errors on either side become `Unreadable`.
    pub fn compare(
        &self,
        source_root: &Path,
        target_root: &Path,
        path: &RelativePath,
    ) -> ComparisonOutcome {
        let source = self.digest_side(source_root, path);
        let target = self.digest_side(target_root, path);

        let outcome = match (source, target) {
            (Ok(source), Ok(target)) => {
                if source == target {
                    ComparisonOutcome::Match
                } else {
                    ComparisonOutcome::Mismatch { source, target }
                }
            }
            (Err(e), Ok(_)) => unreadable(UnreadableSide::Source, e.to_string()),
            (Ok(_), Err(e)) => unreadable(UnreadableSide::Target, e.to_string()),
            (Err(s), Err(t)) => unreadable(UnreadableSide::Both, format!("{}; {}", s, t)),
        };

        match &outcome {
            ComparisonOutcome::Unreadable { side, reason } => {
                warn!("Unable to read {} ({}): {}", path, side, reason)
            }
            other => debug!("{}: {}", path, other.label()),
        }

        outcome
    }
}

fn unreadable(side: UnreadableSide, reason: String) -> ComparisonOutcome {
    ComparisonOutcome::Unreadable { side, reason }
}
