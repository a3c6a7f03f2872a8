//! Benchmarks for delorean-wal encoding and replication

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use delorean_wal::write_buffer::WriteBufferBatchView;
use delorean_wal::{
    unwrap, wrap, Entry, Point, Row, TableWriteBatch, WriteBufferBatch, WriteBufferEntry,
};

fn sample_batch(rows: usize) -> WriteBufferBatch {
    let rows = (0..rows)
        .map(|i| {
            Row::default()
                .with_tag("host", format!("server{:02}", i % 16))
                .with("usage", i as f64 * 0.01)
                .with("time", i as i64)
        })
        .collect();

    WriteBufferBatch::new(vec![WriteBufferEntry::new(
        "2020-01-01",
        vec![TableWriteBatch::new("cpu", rows)],
    )])
}

fn codec_benchmarks(c: &mut Criterion) {
    let batch = sample_batch(1000);
    let payload = batch.encode();

    let mut group = c.benchmark_group("write_buffer");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("encode_batch", |b| b.iter(|| black_box(&batch).encode()));

    group.bench_function("decode_batch", |b| {
        b.iter(|| WriteBufferBatch::decode(black_box(&payload)).unwrap())
    });

    group.bench_function("view_partition_keys", |b| {
        b.iter(|| {
            let view = WriteBufferBatchView::parse(black_box(&payload)).unwrap();
            view.entries().map(|e| e.unwrap().partition_key().len()).sum::<usize>()
        })
    });

    group.finish();

    let write = wrap(1, 1, payload.clone());

    let mut group = c.benchmark_group("replication");
    group.throughput(Throughput::Bytes(payload.len() as u64));

    group.bench_function("wrap", |b| b.iter(|| wrap(1, 1, black_box(payload.clone()))));
    group.bench_function("unwrap", |b| b.iter(|| unwrap(black_box(&write)).unwrap()));

    group.finish();

    let points: Vec<Point> = (0..1000)
        .map(|i| Point::new("cpu,host=a usage", i, i as f64))
        .collect();
    let entry = Entry::write(points);

    c.bench_function("wal_encode_write", |b| {
        b.iter(|| black_box(&entry).encode())
    });
}

criterion_group!(benches, codec_benchmarks);
criterion_main!(benches);
