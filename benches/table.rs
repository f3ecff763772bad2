use criterion::{Criterion, black_box, criterion_group, criterion_main};

use nn_hashtable::encoding::string_norm;
use nn_hashtable::{DenseNetwork, NnHashTable, TableBuilder};

const KEYS: [&str; 10] = [
    "012",
    "ABC",
    "XwdYZ",
    "a longer key value",
    "gddog",
    "emu",
    "xyz",
    "asd",
    "4fw",
    "sb7",
];

fn word_table() -> NnHashTable<usize> {
    for seed in 0..8 {
        let mut table = TableBuilder::new(20, 10)
            .unwrap()
            .build_with_seed(seed)
            .unwrap();
        if KEYS
            .iter()
            .enumerate()
            .all(|(i, key)| table.put(key, i).is_ok())
        {
            return table;
        }
    }
    panic!("word table failed to converge");
}

fn predict_bench(c: &mut Criterion) {
    let net = DenseNetwork::new_with_seed(&[20, 64, 10], 0).unwrap();
    let input = string_norm("a longer key value", 20, 0, 128).unwrap();

    c.bench_function("predict_20_64_10", |b| {
        b.iter(|| {
            let out = net.predict(black_box(&input)).unwrap();
            black_box(out);
        })
    });
}

fn get_bench(c: &mut Criterion) {
    let table = word_table();

    c.bench_function("get_word_key", |b| {
        b.iter(|| {
            let value = table.get(black_box("gddog")).unwrap();
            black_box(value);
        })
    });
}

fn put_overwrite_bench(c: &mut Criterion) {
    let mut table = word_table();

    c.bench_function("put_overwrite_word_key", |b| {
        b.iter(|| table.put(black_box("gddog"), black_box(4)).unwrap())
    });
}

fn retrain_bench(c: &mut Criterion) {
    let mut table = word_table();

    let mut group = c.benchmark_group("retrain");
    group.sample_size(10);
    group.bench_function("retrain_10_word_keys", |b| {
        b.iter(|| table.retrain().unwrap())
    });
    group.finish();
}

criterion_group!(
    benches,
    predict_bench,
    get_bench,
    put_overwrite_bench,
    retrain_bench
);
criterion_main!(benches);
