use std::io::Cursor;

use criterion::{criterion_group, criterion_main, Criterion};

use pointzip::las::{GpsTime, Point10};
use pointzip::packers::Packable;
use pointzip::{
    ItemSchemaBuilder, ItemType, RecordCompressor, SequentialPointRecordCompressor,
};

struct RawPointsData {
    point_size: usize,
    points_data: Vec<u8>,
}

impl RawPointsData {
    fn cycling_iterator(&self) -> std::iter::Cycle<std::slice::ChunksExact<u8>> {
        self.points_data.chunks_exact(self.point_size).cycle()
    }
}

/// A flight-line-like stream: smooth coordinates, slowly changing
/// attributes, regularly spaced time stamps.
fn synthetic_points(n: i32, with_time: bool) -> RawPointsData {
    let point_size = if with_time { 28 } else { 20 };
    let mut points_data = Vec::with_capacity(n as usize * point_size);
    let mut buf = [0u8; 28];
    for i in 0..n {
        let point = Point10 {
            x: i * 93 + (i % 5),
            y: 500_000 + i * 3,
            z: 20_000 + (i % 100),
            intensity: (1000 + i % 512) as u16,
            return_number: 1,
            number_of_returns_of_given_pulse: 1,
            classification: 2,
            point_source_id: 42,
            ..Default::default()
        };
        point.pack_into(&mut buf[..20]);
        if with_time {
            GpsTime::from(100_000.0 + f64::from(i) * 0.0005).pack_into(&mut buf[20..28]);
        }
        points_data.extend_from_slice(&buf[..point_size]);
    }
    RawPointsData {
        point_size,
        points_data,
    }
}

fn point10_record_compression_benchmark(c: &mut Criterion) {
    for version in [1u16, 2u16] {
        let raw_points_data = synthetic_points(10_000, false);
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Point10, version)
            .build();

        let mut record_compressor =
            SequentialPointRecordCompressor::new(Cursor::new(Vec::<u8>::new()));
        record_compressor.set_fields_from(&schema).unwrap();

        c.bench_function(&format!("point10_v{}_compression", version), move |b| {
            let mut raw_pts_iter = raw_points_data.cycling_iterator();
            b.iter(|| record_compressor.compress_next(raw_pts_iter.next().unwrap()));
        });
    }
}

fn point10_time_record_compression_benchmark(c: &mut Criterion) {
    for version in [1u16, 2u16] {
        let raw_points_data = synthetic_points(10_000, true);
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Point10, version)
            .versioned_item(ItemType::GpsTime, version)
            .build();

        let mut record_compressor =
            SequentialPointRecordCompressor::new(Cursor::new(Vec::<u8>::new()));
        record_compressor.set_fields_from(&schema).unwrap();

        c.bench_function(&format!("point10_time_v{}_compression", version), move |b| {
            let mut raw_pts_iter = raw_points_data.cycling_iterator();
            b.iter(|| record_compressor.compress_next(raw_pts_iter.next().unwrap()));
        });
    }
}

criterion_group!(
    point_formats,
    point10_record_compression_benchmark,
    point10_time_record_compression_benchmark
);
criterion_main!(point_formats);
