//! Orderings used to sort path listings.
//!
//! A policy only supplies a comparison; paths are never rewritten to sort
//! them. Every policy falls back to byte order on ties so the result is a
//! total order and sorting stays deterministic.

use gocompare_common::{RelativePath, SortOrder};
use icu_collator::options::CollatorOptions;
use icu_collator::{Collator, CollatorBorrowed};
use icu_locale_core::Locale;
use std::cmp::Ordering;
use std::env;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Total ordering over relative paths
pub trait OrderingPolicy: Send + Sync {
    fn compare(&self, a: &RelativePath, b: &RelativePath) -> Ordering;

    fn sort(&self, paths: &mut [RelativePath]) {
        paths.sort_by(|a, b| self.compare(a, b));
    }
}

/// Plain byte-wise ordering
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultOrder;

impl OrderingPolicy for DefaultOrder {
    fn compare(&self, a: &RelativePath, b: &RelativePath) -> Ordering {
        a.as_str().cmp(b.as_str())
    }
}

/// Collation of the process locale.
///
/// The locale comes from `LC_ALL`, `LC_COLLATE` or `LANG`, first non-empty
/// wins. `C`, `POSIX`, an unset locale or one ICU cannot load collate by
/// bytes, which is what the C library does for them.
pub struct LocaleOrder {
    name: String,
    collator: Option<CollatorBorrowed<'static>>,
}

impl LocaleOrder {
    /// Collation for a POSIX locale name such as `de_DE.UTF-8`
    pub fn new(name: &str) -> Self {
        let collator = posix_to_bcp47(name).and_then(|tag| match tag.parse::<Locale>() {
            Ok(locale) => match Collator::try_new(locale.into(), CollatorOptions::default()) {
                Ok(collator) => Some(collator),
                Err(e) => {
                    warn!("No collation data for locale {:?}, using byte order: {}", name, e);
                    None
                }
            },
            Err(e) => {
                warn!("Unrecognised locale {:?}, using byte order: {}", name, e);
                None
            }
        });

        Self {
            name: name.to_string(),
            collator,
        }
    }

    /// Collation of the locale named by the environment
    pub fn from_env() -> Self {
        let name = ["LC_ALL", "LC_COLLATE", "LANG"]
            .iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.is_empty())
            .unwrap_or_else(|| "C".to_string());
        debug!("Collating paths for locale {:?}", name);
        Self::new(&name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether paths are collated by locale rules rather than bytes
    pub fn is_collating(&self) -> bool {
        self.collator.is_some()
    }
}

impl fmt::Debug for LocaleOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocaleOrder")
            .field("name", &self.name)
            .field("collating", &self.is_collating())
            .finish()
    }
}

impl OrderingPolicy for LocaleOrder {
    fn compare(&self, a: &RelativePath, b: &RelativePath) -> Ordering {
        let ord = match &self.collator {
            Some(collator) => collator.compare(a.as_str(), b.as_str()),
            None => Ordering::Equal,
        };
        ord.then_with(|| a.as_str().cmp(b.as_str()))
    }
}

/// `en_US.UTF-8@euro` to `en-US`; `None` for the byte-order locales
fn posix_to_bcp47(name: &str) -> Option<String> {
    let base = name.split(['.', '@']).next().unwrap_or_default();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

/// Ordering that compares embedded digit runs by numeric value
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalOrder;

impl OrderingPolicy for NaturalOrder {
    fn compare(&self, a: &RelativePath, b: &RelativePath) -> Ordering {
        natural_cmp(a.as_str(), b.as_str()).then_with(|| a.as_str().cmp(b.as_str()))
    }
}

static DEFAULT_ORDER: DefaultOrder = DefaultOrder;
static LOCALE_ORDER: OnceLock<LocaleOrder> = OnceLock::new();
static NATURAL_ORDER: NaturalOrder = NaturalOrder;

/// Policy selected by a configured sort order.
///
/// The locale is read from the environment the first time `Locale` is
/// requested.
pub fn policy_for(order: SortOrder) -> &'static dyn OrderingPolicy {
    match order {
        SortOrder::Default => &DEFAULT_ORDER,
        SortOrder::Locale => LOCALE_ORDER.get_or_init(LocaleOrder::from_env),
        SortOrder::Natural => &NATURAL_ORDER,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Chunk<'a> {
    Text(&'a str),
    Number(&'a str),
}

/// Split into alternating text and digit runs, always starting with a
/// (possibly empty) text run so chunks at the same index share a kind.
fn chunks(s: &str) -> Vec<Chunk<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits = false;

    for (idx, ch) in s.char_indices() {
        let is_digit = ch.is_ascii_digit();
        if is_digit != in_digits {
            let run = &s[start..idx];
            out.push(if in_digits { Chunk::Number(run) } else { Chunk::Text(run) });
            start = idx;
            in_digits = is_digit;
        }
    }

    let run = &s[start..];
    out.push(if in_digits { Chunk::Number(run) } else { Chunk::Text(run) });
    out
}

/// Compare two digit runs by value without parsing, so arbitrarily long
/// runs never overflow.
fn numeric_cmp(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

fn natural_cmp(a: &str, b: &str) -> Ordering {
    let left = chunks(a);
    let right = chunks(b);

    for (x, y) in left.iter().zip(right.iter()) {
        let ord = match (x, y) {
            (Chunk::Number(x), Chunk::Number(y)) => numeric_cmp(x, y),
            (Chunk::Text(x), Chunk::Text(y)) => x.cmp(y),
            (Chunk::Text(_), Chunk::Number(_)) => Ordering::Greater,
            (Chunk::Number(_), Chunk::Text(_)) => Ordering::Less,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}
