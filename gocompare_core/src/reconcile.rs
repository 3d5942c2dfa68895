use crate::ordering::OrderingPolicy;
use gocompare_common::{FileSet, Partition};
use tracing::debug;

/// Split two file sets into source-only, target-only and common paths,
/// each sorted by `policy`.
pub fn reconcile(source: &FileSet, target: &FileSet, policy: &dyn OrderingPolicy) -> Partition {
    let mut only_in_source = Vec::new();
    let mut common = Vec::new();

    for path in source.iter() {
        if target.contains(path) {
            common.push(path.clone());
        } else {
            only_in_source.push(path.clone());
        }
    }

    let mut only_in_target: Vec<_> = target
        .iter()
        .filter(|path| !source.contains(path))
        .cloned()
        .collect();

    policy.sort(&mut only_in_source);
    policy.sort(&mut only_in_target);
    policy.sort(&mut common);

    debug!(
        "Reconciled: {} only in source, {} only in target, {} common",
        only_in_source.len(),
        only_in_target.len(),
        common.len()
    );

    Partition {
        only_in_source,
        only_in_target,
        common,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ordering::policy_for;
    use gocompare_common::{RelativePath, SortOrder};
    use std::collections::HashSet;

    fn set(names: &[&str]) -> FileSet {
        names.iter().map(|n| RelativePath::new(*n).unwrap()).collect()
    }

    fn names(paths: &[RelativePath]) -> Vec<&str> {
        paths.iter().map(|p| p.as_str()).collect()
    }

    #[test]
    fn test_reconcile_basic() {
        let source = set(&["a.txt", "b.txt"]);
        let target = set(&["a.txt", "c.txt"]);

        let partition = reconcile(&source, &target, policy_for(SortOrder::Default));
        assert_eq!(names(&partition.only_in_source), vec!["b.txt"]);
        assert_eq!(names(&partition.only_in_target), vec!["c.txt"]);
        assert_eq!(names(&partition.common), vec!["a.txt"]);
    }

    #[test]
    fn test_reconcile_matches_set_algebra() {
        let source = set(&["x/1", "x/2", "y", "z/10", "z/9", "shared"]);
        let target = set(&["x/2", "shared", "z/9", "w", "v/v"]);

        let partition = reconcile(&source, &target, policy_for(SortOrder::Natural));

        let src: HashSet<_> = source.iter().cloned().collect();
        let tgt: HashSet<_> = target.iter().cloned().collect();
        let common: HashSet<_> = partition.common.iter().cloned().collect();
        let only_src: HashSet<_> = partition.only_in_source.iter().cloned().collect();
        let only_tgt: HashSet<_> = partition.only_in_target.iter().cloned().collect();

        assert_eq!(common, &src & &tgt);
        assert_eq!(only_src, &src - &tgt);
        assert_eq!(only_tgt, &tgt - &src);
        assert!(only_src.is_disjoint(&only_tgt));
        assert!(only_src.is_disjoint(&common));
        assert!(only_tgt.is_disjoint(&common));
        assert_eq!(partition.common.len(), common.len());
    }

    #[test]
    fn test_reconcile_sorted_by_policy() {
        let source = set(&["f10", "f2", "f1"]);
        let target = set(&["f10", "f2", "f1"]);

        let natural = reconcile(&source, &target, policy_for(SortOrder::Natural));
        assert_eq!(names(&natural.common), vec!["f1", "f2", "f10"]);

        let default = reconcile(&source, &target, policy_for(SortOrder::Default));
        assert_eq!(names(&default.common), vec!["f1", "f10", "f2"]);
    }

    #[test]
    fn test_reconcile_empty() {
        let partition = reconcile(&FileSet::new(), &FileSet::new(), policy_for(SortOrder::Default));
        assert_eq!(partition, Partition::default());
    }
}
