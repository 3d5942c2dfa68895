use crate::GoCompareError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Location of a file relative to the root of its tree.
///
/// Components are always joined with `/`, so the same file yields the same
/// value on every platform. Two trees hold "the same file" iff their
/// relative paths are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RelativePath(String);

impl RelativePath {
    /// Build a relative path from a `/`-separated string.
    pub fn new(value: impl Into<String>) -> Result<Self, GoCompareError> {
        let value = value.into();
        if value.starts_with('/') {
            return Err(GoCompareError::InvalidPath(format!("absolute path: {}", value)));
        }
        if value.is_empty() {
            return Err(GoCompareError::InvalidPath("empty path".to_string()));
        }
        if value.split('/').any(|part| part.is_empty() || part == "." || part == "..") {
            return Err(GoCompareError::InvalidPath(value));
        }
        Ok(Self(value))
    }

    /// Build a relative path from a native path that has already had its
    /// root stripped.
    pub fn from_path(path: &Path) -> Result<Self, GoCompareError> {
        let mut parts = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => {
                    let part = part.to_str().ok_or_else(|| {
                        GoCompareError::InvalidPath(format!(
                            "non UTF-8 path: {}",
                            path.display()
                        ))
                    })?;
                    parts.push(part);
                }
                Component::CurDir => {}
                _ => {
                    return Err(GoCompareError::InvalidPath(path.display().to_string()));
                }
            }
        }
        Self::new(parts.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve this path against a tree root.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for part in self.0.split('/') {
            path.push(part);
        }
        path
    }
}

impl fmt::Display for RelativePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RelativePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RelativePath {
    type Error = GoCompareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<RelativePath> for String {
    fn from(path: RelativePath) -> Self {
        path.0
    }
}

/// Snapshot of the files found under one tree root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet(HashSet<RelativePath>);

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: RelativePath) -> bool {
        self.0.insert(path)
    }

    pub fn contains(&self, path: &RelativePath) -> bool {
        self.0.contains(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RelativePath> {
        self.0.iter()
    }
}

impl FromIterator<RelativePath> for FileSet {
    fn from_iter<I: IntoIterator<Item = RelativePath>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for FileSet {
    type Item = RelativePath;
    type IntoIter = std::collections::hash_set::IntoIter<RelativePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// The two trees being compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

/// Content hashing algorithm applied to both trees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Blake3,
    Sha256,
    /// Same digests as `md5sum`, for checking against existing MD5 listings
    Md5,
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Blake3 => f.write_str("blake3"),
            HashAlgorithm::Sha256 => f.write_str("sha256"),
            HashAlgorithm::Md5 => f.write_str("md5"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = GoCompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blake3" => Ok(HashAlgorithm::Blake3),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "md5" => Ok(HashAlgorithm::Md5),
            other => Err(GoCompareError::Config(format!("Unknown hash algorithm: {}", other))),
        }
    }
}

/// Ordering applied to path listings in results and reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Raw byte-wise ordering
    #[default]
    Default,
    /// Case-folded ordering, the way file managers list names
    Locale,
    /// Digit runs compared as integers ("file-2" before "file-10")
    Natural,
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortOrder::Default => f.write_str("default"),
            SortOrder::Locale => f.write_str("locale"),
            SortOrder::Natural => f.write_str("natural"),
        }
    }
}

impl FromStr for SortOrder {
    type Err = GoCompareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(SortOrder::Default),
            "locale" => Ok(SortOrder::Locale),
            "natural" => Ok(SortOrder::Natural),
            other => Err(GoCompareError::Config(format!("Unknown sort order: {}", other))),
        }
    }
}

/// Content digest of a single file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Digest {
    pub algorithm: HashAlgorithm,
    #[serde(with = "hex_bytes")]
    pub bytes: Vec<u8>,
}

impl Digest {
    pub fn new(algorithm: HashAlgorithm, bytes: Vec<u8>) -> Self {
        Self { algorithm, bytes }
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

/// Which side of a comparison could not be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnreadableSide {
    Source,
    Target,
    Both,
    Unknown,
}

impl fmt::Display for UnreadableSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnreadableSide::Source => f.write_str("source"),
            UnreadableSide::Target => f.write_str("target"),
            UnreadableSide::Both => f.write_str("both"),
            UnreadableSide::Unknown => f.write_str("unknown"),
        }
    }
}

/// Terminal result for one file present in both trees
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ComparisonOutcome {
    /// Both digests are bitwise equal
    Match,
    /// Contents differ; both digests are kept for the report
    Mismatch { source: Digest, target: Digest },
    /// One or both files could not be read to completion
    Unreadable { side: UnreadableSide, reason: String },
}

impl ComparisonOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, ComparisonOutcome::Match)
    }

    /// Report tag for this outcome
    pub fn label(&self) -> &'static str {
        match self {
            ComparisonOutcome::Match => "OK",
            ComparisonOutcome::Mismatch { .. } => "FAILED",
            ComparisonOutcome::Unreadable { .. } => "UNREADABLE",
        }
    }
}

/// A common path together with its outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileComparison {
    pub path: RelativePath,
    pub outcome: ComparisonOutcome,
}

/// Disjoint, sorted split of two file sets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Partition {
    pub only_in_source: Vec<RelativePath>,
    pub only_in_target: Vec<RelativePath>,
    pub common: Vec<RelativePath>,
}

/// Everything one comparison run produced. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub sort_order: SortOrder,
    pub algorithm: HashAlgorithm,
    pub partition: Partition,
    pub outcomes: Vec<FileComparison>,
    pub started: DateTime<Local>,
    pub finished: DateTime<Local>,
}

impl ComparisonResult {
    /// Common files whose digests matched
    pub fn passed(&self) -> usize {
        self.outcomes.iter().filter(|c| c.outcome.is_match()).count()
    }

    /// Common files whose digests differed
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|c| matches!(c.outcome, ComparisonOutcome::Mismatch { .. }))
            .count()
    }

    /// Common files that could not be read
    pub fn unreadable(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|c| matches!(c.outcome, ComparisonOutcome::Unreadable { .. }))
            .count()
    }

    /// Files present on one side only
    pub fn extra(&self) -> usize {
        self.partition.only_in_source.len() + self.partition.only_in_target.len()
    }

    /// Overall pass/fail: no extra files and every common file matched.
    pub fn is_success(&self) -> bool {
        self.extra() == 0 && self.failed() == 0 && self.unreadable() == 0
    }

    pub fn elapsed(&self) -> Duration {
        (self.finished - self.started).to_std().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_path_rejects_invalid() {
        assert!(RelativePath::new("").is_err());
        assert!(RelativePath::new("/etc/passwd").is_err());
        assert!(RelativePath::new("a/../b").is_err());
        assert!(RelativePath::new("a//b").is_err());
        assert!(RelativePath::new("a/b.txt").is_ok());
    }

    #[test]
    fn test_relative_path_from_native() {
        let native: PathBuf = ["sub", "dir", "file.txt"].iter().collect();
        let rel = RelativePath::from_path(&native).unwrap();
        assert_eq!(rel.as_str(), "sub/dir/file.txt");

        let root = Path::new("root");
        assert_eq!(rel.to_native(root), root.join("sub").join("dir").join("file.txt"));
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!("natural".parse::<SortOrder>().unwrap(), SortOrder::Natural);
        assert_eq!("LOCALE".parse::<SortOrder>().unwrap(), SortOrder::Locale);
        assert!("random".parse::<SortOrder>().is_err());
    }

    #[test]
    fn test_hash_algorithm_parse() {
        for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256, HashAlgorithm::Md5] {
            assert_eq!(algorithm.to_string().parse::<HashAlgorithm>().unwrap(), algorithm);
        }
        assert_eq!("MD5".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Md5);
        assert_eq!("SHA-256".parse::<HashAlgorithm>().unwrap(), HashAlgorithm::Sha256);
        assert!("crc32".parse::<HashAlgorithm>().is_err());
    }

    fn result_with(partition: Partition, outcomes: Vec<FileComparison>) -> ComparisonResult {
        let now = Local::now();
        ComparisonResult {
            source_root: PathBuf::from("from"),
            target_root: PathBuf::from("to"),
            sort_order: SortOrder::Default,
            algorithm: HashAlgorithm::Blake3,
            partition,
            outcomes,
            started: now,
            finished: now,
        }
    }

    #[test]
    fn test_result_counts_and_success() {
        let a = RelativePath::new("a.txt").unwrap();
        let b = RelativePath::new("b.txt").unwrap();
        let c = RelativePath::new("c.txt").unwrap();
        let partition = Partition {
            only_in_source: vec![],
            only_in_target: vec![],
            common: vec![a.clone(), b.clone(), c.clone()],
        };
        let outcomes = vec![
            FileComparison { path: a, outcome: ComparisonOutcome::Match },
            FileComparison {
                path: b,
                outcome: ComparisonOutcome::Mismatch {
                    source: Digest::new(HashAlgorithm::Blake3, vec![1]),
                    target: Digest::new(HashAlgorithm::Blake3, vec![2]),
                },
            },
            FileComparison {
                path: c,
                outcome: ComparisonOutcome::Unreadable {
                    side: UnreadableSide::Target,
                    reason: "gone".to_string(),
                },
            },
        ];
        let result = result_with(partition, outcomes);
        assert_eq!(result.passed(), 1);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.unreadable(), 1);
        assert_eq!(result.extra(), 0);
        assert!(!result.is_success());
    }

    #[test]
    fn test_extra_files_fail_overall() {
        let partition = Partition {
            only_in_source: vec![RelativePath::new("b.txt").unwrap()],
            only_in_target: vec![],
            common: vec![],
        };
        let result = result_with(partition, vec![]);
        assert_eq!(result.extra(), 1);
        assert!(!result.is_success());
        assert!(result_with(Partition::default(), vec![]).is_success());
    }

    #[test]
    fn test_digest_hex() {
        let digest = Digest::new(HashAlgorithm::Sha256, vec![0xab, 0xcd, 0x01]);
        assert_eq!(digest.to_hex(), "abcd01");
        assert_eq!(digest.to_string(), "abcd01");
    }
}
