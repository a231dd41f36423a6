use criterion::{criterion_group, criterion_main, Criterion};
use lockweave_schema::{Channel, LockMeta, LockedDependency, Lockfile, Manager, Platform};

const PLATFORMS: [&str; 3] = ["linux-64", "osx-arm64", "win-64"];

/// A layered environment: package `n` depends on up to three packages from
/// the layer below, plus a pip tail depending on the conda layer.
fn synthetic_packages(per_platform: usize, python: &str) -> Vec<LockedDependency> {
    let mut packages = Vec::with_capacity(per_platform * PLATFORMS.len());
    for platform in PLATFORMS {
        for i in 0..per_platform {
            let (manager, name) = if i % 5 == 4 {
                (Manager::Pip, format!("py-pkg-{i:04}"))
            } else {
                (Manager::Conda, format!("pkg-{i:04}"))
            };
            let mut dep = LockedDependency::new(name, python, manager, platform)
                .with_md5(format!("{i:032x}"));
            for back in 1..=3 {
                if let Some(j) = i.checked_sub(back * 7) {
                    let target = if j % 5 == 4 && manager == Manager::Pip {
                        format!("py-pkg-{j:04}")
                    } else {
                        format!("pkg-{j:04}")
                    };
                    dep = dep.with_dependency(target, "*");
                }
            }
            packages.push(dep);
        }
    }
    packages.reverse();
    packages
}

fn synthetic_lockfile(per_platform: usize, python: &str, platforms: &[&str]) -> Lockfile {
    Lockfile::new(
        synthetic_packages(per_platform, python),
        LockMeta {
            channels: vec![Channel::new("conda-forge")],
            platforms: platforms.iter().map(|p| Platform::from(*p)).collect(),
            ..LockMeta::default()
        },
    )
}

fn bench_reorder(c: &mut Criterion) {
    c.bench_function("reorder_3x500", |b| {
        b.iter_with_setup(
            || synthetic_packages(500, "3.12"),
            |packages| {
                lockweave_core::reorder(packages).unwrap();
            },
        );
    });
}

fn bench_merge_partial(c: &mut Criterion) {
    let ours = synthetic_lockfile(500, "3.12", &["osx-arm64"]);
    let theirs = synthetic_lockfile(500, "3.11", &PLATFORMS);
    c.bench_function("merge_3x500_one_platform", |b| {
        b.iter(|| {
            lockweave_core::merge(&ours, Some(&theirs)).unwrap();
        });
    });
}

fn bench_fingerprint(c: &mut Criterion) {
    let lock = lockweave_core::merge(&synthetic_lockfile(500, "3.12", &PLATFORMS), None).unwrap();
    c.bench_function("fingerprint_3x500", |b| {
        b.iter(|| {
            lock.fingerprint().unwrap();
        });
    });
}

criterion_group!(
    benches,
    bench_reorder,
    bench_merge_partial,
    bench_fingerprint
);
criterion_main!(benches);
