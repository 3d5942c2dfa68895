pub mod checksum;
pub mod comparison;
pub mod ordering;
pub mod reconcile;
pub mod report;
pub mod scanner;
pub mod worker;

pub use checksum::ChecksumComparator;
pub use comparison::ComparisonEngine;
pub use ordering::{policy_for, DefaultOrder, LocaleOrder, NaturalOrder, OrderingPolicy};
pub use reconcile::reconcile;
pub use report::{format_elapsed, format_json, format_text, summary_line, write_report};
pub use scanner::FileEnumerator;
pub use worker::{ComparisonWorker, WorkerMessage};
