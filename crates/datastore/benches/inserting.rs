use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use slides_datastore::users::*;
use slides_datastore::{extract, open_connection, DbSettings, FetchStrategy, LoadStrategy, Loader};

fn open_with_table(path: &std::path::Path) -> rusqlite::Connection {
    let conn = open_connection(&DbSettings::at_path(path.join("database.sqlite"))).unwrap();
    create_users_table(&conn).unwrap();
    conn
}

pub fn load_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("inserting");
    group.sample_size(10);
    for size in [100usize, 1000, 5000] {
        group.throughput(Throughput::Elements(size as u64));
        for strategy in LoadStrategy::ALL {
            group.bench_with_input(BenchmarkId::new(strategy.name(), size), &size, |b, size| {
                let tdir = tempfile::TempDir::new().expect("Should create");
                let mut conn = open_with_table(tdir.path());
                let loader = Loader::new(500).unwrap();
                let mapping = new_user_mapping().unwrap();
                let rows = fake_new_users(*size, 0).collect::<Vec<_>>();

                b.iter(|| {
                    loader
                        .load_with(strategy, &mut conn, rows.iter().cloned(), &mapping)
                        .unwrap();
                    truncate_users_table(&conn).unwrap();
                });
            });
        }
    }
    group.finish();
}

pub fn extract_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("extracting");
    group.sample_size(10);
    let size = 5000usize;
    let tdir = tempfile::TempDir::new().expect("Should create");
    let mut conn = open_with_table(tdir.path());
    Loader::new(500)
        .unwrap()
        .load(&mut conn, fake_new_users(size, 0), &new_user_mapping().unwrap())
        .unwrap();
    let mapping = stored_user_mapping().unwrap();

    group.throughput(Throughput::Elements(size as u64));
    for strategy in FetchStrategy::ALL {
        group.bench_function(strategy.name(), |b| {
            b.iter(|| {
                extract(&conn, &mapping, strategy, 500, |items| {
                    let mut count = 0usize;
                    for i in items {
                        i?;
                        count += 1;
                    }
                    Ok(count)
                })
                .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, load_benchmarks, extract_benchmarks);
criterion_main!(benches);
