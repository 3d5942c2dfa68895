use crate::checksum::ChecksumComparator;
use crate::ordering::policy_for;
use crate::reconcile::reconcile;
use crate::scanner::FileEnumerator;
use chrono::Local;
use gocompare_common::{
    AppConfig, ComparisonResult, FileComparison, GoCompareError, HashAlgorithm, NoProgress, Phase,
    ProgressEvent, ProgressSink, Side, SortOrder,
};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info};

/// Comparison engine for checking two directory trees against each other.
///
/// Each call to [`run`](Self::run) owns everything it builds, so one engine
/// can serve several comparisons, including concurrent ones.
#[derive(Debug, Clone)]
pub struct ComparisonEngine {
    enumerator: FileEnumerator,
    checksum: ChecksumComparator,
    sort_order: SortOrder,
    report_every: Option<usize>,
}

impl Default for ComparisonEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComparisonEngine {
    pub fn new() -> Self {
        Self {
            enumerator: FileEnumerator::new(),
            checksum: ChecksumComparator::default(),
            sort_order: SortOrder::default(),
            report_every: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new()
            .with_sort_order(config.sort_order)
            .with_algorithm(config.hash_algorithm)
            .with_buffer_size(config.buffer_size)
            .with_report_every(config.report_every)
    }

    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn with_algorithm(mut self, algorithm: HashAlgorithm) -> Self {
        self.checksum = self.checksum.with_algorithm(algorithm);
        self
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.checksum = self.checksum.with_buffer_size(buffer_size);
        self
    }

    /// Emit progress every `n` files instead of every ~1% of the common set
    pub fn with_report_every(mut self, n: Option<usize>) -> Self {
        self.report_every = n.map(|n| n.max(1));
        self
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// Files between progress events for a common set of `total` paths
    pub fn progress_interval(&self, total: usize) -> usize {
        self.report_every.unwrap_or((total / 100).max(1))
    }

    /// Compare `source_root` against `target_root`
    pub fn run(
        &self,
        source_root: &Path,
        target_root: &Path,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<ComparisonResult, GoCompareError> {
        self.run_with_cancel(source_root, target_root, progress, None)
    }

    /// Compare two trees, with cancellation.
    ///
    /// Both roots are validated before any work starts. The cancel flag is
    /// checked between files; a cancelled run produces no result.
    pub fn run_with_cancel(
        &self,
        source_root: &Path,
        target_root: &Path,
        progress: Option<&dyn ProgressSink>,
        cancel: Option<&AtomicBool>,
    ) -> Result<ComparisonResult, GoCompareError> {
        let sink = progress.unwrap_or(&NoProgress);

        FileEnumerator::check_root(source_root)?;
        FileEnumerator::check_root(target_root)?;

        let started = Local::now();
        info!("Comparing {:?} against {:?}", source_root, target_root);

        sink.on_event(&ProgressEvent::phase(Phase::Enumerating(Side::Source)));
        let source_files = self.enumerator.enumerate_with_cancel(source_root, cancel)?;
        info!("Found {} files in source", source_files.len());

        sink.on_event(&ProgressEvent::phase(Phase::Enumerating(Side::Target)));
        let target_files = self.enumerator.enumerate_with_cancel(target_root, cancel)?;
        info!("Found {} files in target", target_files.len());

        sink.on_event(&ProgressEvent::phase(Phase::Reconciling));
        let partition = reconcile(&source_files, &target_files, policy_for(self.sort_order));

        let total = partition.common.len();
        let interval = self.progress_interval(total);
        debug!("Checking {} common files, reporting every {}", total, interval);

        let mut outcomes = Vec::with_capacity(total);
        for (index, path) in partition.common.iter().enumerate() {
            if cancel.map_or(false, |flag| flag.load(Ordering::Relaxed)) {
                info!("Comparison cancelled after {} of {} files", index, total);
                return Err(GoCompareError::Cancelled);
            }

            let outcome = self.checksum.compare(source_root, target_root, path);
            outcomes.push(FileComparison {
                path: path.clone(),
                outcome,
            });

            let processed = index + 1;
            if processed % interval == 0 || processed == total {
                sink.on_event(&ProgressEvent::examining(processed, total, path.clone()));
            }
        }

        let finished = Local::now();
        sink.on_event(&ProgressEvent {
            processed: total,
            total,
            current_path: None,
            phase: Phase::Finished,
        });

        let result = ComparisonResult {
            source_root: source_root.to_path_buf(),
            target_root: target_root.to_path_buf(),
            sort_order: self.sort_order,
            algorithm: self.checksum.algorithm(),
            partition,
            outcomes,
            started,
            finished,
        };

        info!(
            "Comparison complete: {}/{} OK, {} failed, {} unreadable, {} extra",
            result.passed(),
            total,
            result.failed(),
            result.unreadable(),
            result.extra()
        );

        Ok(result)
    }
}
