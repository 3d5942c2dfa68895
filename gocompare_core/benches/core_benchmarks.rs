use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gocompare_common::{FileSet, HashAlgorithm, RelativePath, SortOrder};
use gocompare_core::{policy_for, reconcile, ChecksumComparator, ComparisonEngine, FileEnumerator};
use std::fs;
use std::io::Write as IoWrite;
use std::path::Path;
use tempfile::TempDir;

// Helper to create test directory structure
fn create_test_tree(root: &Path, depth: usize, files_per_dir: usize, file_size: usize) {
    if depth == 0 {
        return;
    }

    for i in 0..files_per_dir {
        let file_path = root.join(format!("file_{}.txt", i));
        let mut file = fs::File::create(&file_path).unwrap();
        let content = vec![b'x'; file_size];
        file.write_all(&content).unwrap();
    }

    if depth > 1 {
        for i in 0..3 {
            let dir_path = root.join(format!("subdir_{}", i));
            fs::create_dir(&dir_path).unwrap();
            create_test_tree(&dir_path, depth - 1, files_per_dir, file_size);
        }
    }
}

fn create_file_set(count: usize, offset: usize) -> FileSet {
    (offset..offset + count)
        .map(|i| RelativePath::new(format!("dir_{}/file_{}.txt", i % 10, i)).unwrap())
        .collect()
}

fn bench_enumerate(c: &mut Criterion) {
    c.bench_function("enumerate_tree_130_files", |b| {
        let temp = TempDir::new().unwrap();
        create_test_tree(temp.path(), 3, 10, 1024);
        let enumerator = FileEnumerator::new();

        b.iter(|| {
            let files = enumerator.enumerate(black_box(temp.path())).unwrap();
            black_box(files);
        });
    });
}

fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");

    for size in [100, 1000, 10000].iter() {
        let source = create_file_set(*size, 0);
        let target = create_file_set(*size, size / 10);

        for order in [SortOrder::Default, SortOrder::Natural] {
            group.bench_with_input(
                BenchmarkId::new(order.to_string(), size),
                size,
                |b, _| {
                    b.iter(|| {
                        let partition = reconcile(
                            black_box(&source),
                            black_box(&target),
                            policy_for(order),
                        );
                        black_box(partition);
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest_1mb");
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("large.bin");
    fs::write(&path, vec![0u8; 1024 * 1024]).unwrap();

    for algorithm in [HashAlgorithm::Blake3, HashAlgorithm::Sha256, HashAlgorithm::Md5] {
        let comparator = ChecksumComparator::new(algorithm);
        group.bench_function(algorithm.to_string(), |b| {
            b.iter(|| {
                let digest = comparator.digest_file(black_box(&path)).unwrap();
                black_box(digest);
            });
        });
    }

    group.finish();
}

fn bench_full_run(c: &mut Criterion) {
    c.bench_function("run_identical_trees_40_files", |b| {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("source");
        let target = temp.path().join("target");
        fs::create_dir(&source).unwrap();
        fs::create_dir(&target).unwrap();
        create_test_tree(&source, 2, 10, 4096);
        create_test_tree(&target, 2, 10, 4096);
        let engine = ComparisonEngine::new();

        b.iter(|| {
            let result = engine.run(black_box(&source), black_box(&target), None).unwrap();
            black_box(result);
        });
    });
}

criterion_group!(benches, bench_enumerate, bench_reconcile, bench_digest, bench_full_run);
criterion_main!(benches);
