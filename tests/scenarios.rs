use std::io::Cursor;

use pointzip::las::{GpsTime, Point10, Rgb};
use pointzip::packers::Packable;
use pointzip::{
    ItemSchemaBuilder, ItemType, RecordCompressor, RecordDecompressor,
    SequentialPointRecordCompressor, SequentialPointRecordDecompressor,
};

/// Compresses the records, checks they decompress bit-exactly, and
/// returns the compressed stream.
fn roundtrip(schema: &[pointzip::ItemSpec], records: &[Vec<u8>]) -> Vec<u8> {
    let mut compressor = SequentialPointRecordCompressor::new(Cursor::new(Vec::<u8>::new()));
    compressor.set_fields_from(schema).unwrap();
    for record in records {
        compressor.compress_next(record).unwrap();
    }
    compressor.done().unwrap();
    let compressed = compressor.into_stream().into_inner();

    let mut decompressor =
        SequentialPointRecordDecompressor::new(Cursor::new(compressed.clone()));
    decompressor.set_fields_from(schema).unwrap();
    let mut buf = vec![0u8; decompressor.record_size()];
    for (i, record) in records.iter().enumerate() {
        decompressor.decompress_next(&mut buf).unwrap();
        assert_eq!(&buf, record, "record {} did not roundtrip", i);
    }
    compressed
}

fn packed_point10(point: &Point10) -> Vec<u8> {
    let mut buf = vec![0u8; Point10::SIZE];
    point.pack_into(&mut buf);
    buf
}

#[test]
fn scenario_constant_stream() {
    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::Point10, 1)
        .build();

    let point = Point10 {
        x: 10000,
        y: 20000,
        z: 300,
        intensity: 5,
        return_number: 1,
        number_of_returns_of_given_pulse: 2,
        scan_direction_flag: false,
        edge_of_flight_line: false,
        classification: 2,
        scan_angle_rank: 0,
        user_data: 0,
        point_source_id: 1,
    };
    let record = packed_point10(&point);
    let records: Vec<Vec<u8>> = (0..100).map(|_| record.clone()).collect();

    let compressed = roundtrip(&schema, &records);

    // the first point sits raw at the head of the stream
    assert_eq!(&compressed[..Point10::SIZE], record.as_slice());
    // 99 identical points cost next to nothing compared to the
    // 2000 bytes they occupy raw
    assert!(
        compressed.len() <= 200,
        "constant stream compressed to {} bytes",
        compressed.len()
    );
}

#[test]
fn scenario_monotone_x() {
    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::Point10, 1)
        .build();

    let records: Vec<Vec<u8>> = (0..1000)
        .map(|i| {
            packed_point10(&Point10 {
                x: i * 100,
                y: 0,
                z: 0,
                intensity: 40,
                classification: 3,
                point_source_id: 7,
                ..Default::default()
            })
        })
        .collect();

    let compressed = roundtrip(&schema, &records);

    // after warm-up every x diff matches the median exactly
    assert!(
        compressed.len() < 2000,
        "monotone stream compressed to {} bytes",
        compressed.len()
    );
}

#[test]
fn scenario_gps_time_steps() {
    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::Point10, 1)
        .versioned_item(ItemType::GpsTime, 1)
        .build();

    let records: Vec<Vec<u8>> = (0..1000)
        .map(|i| {
            let mut buf = vec![0u8; Point10::SIZE + 8];
            Point10 {
                x: i * 25,
                y: i * 25,
                z: 100,
                ..Default::default()
            }
            .pack_into(&mut buf[..Point10::SIZE]);
            GpsTime::from(1e9 + f64::from(i) * 0.001).pack_into(&mut buf[Point10::SIZE..]);
            buf
        })
        .collect();

    let compressed = roundtrip(&schema, &records);
    // regular pulse spacing keeps the time stamps cheap
    assert!(
        compressed.len() < 10_000,
        "gps stream compressed to {} bytes",
        compressed.len()
    );
}

#[test]
fn scenario_rgb_flicker() {
    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::Rgb12, 1)
        .build();

    // every odd point flips only the low byte of the red channel, every
    // even point repeats its predecessor
    let records: Vec<Vec<u8>> = (0..1000)
        .map(|i| {
            let mut buf = vec![0u8; Rgb::SIZE];
            Rgb {
                red: if ((i + 1) / 2) % 2 == 0 { 0x1210 } else { 0x1233 },
                green: 0x0A0A,
                blue: 0x0B0B,
            }
            .pack_into(&mut buf);
            buf
        })
        .collect();

    let compressed = roundtrip(&schema, &records);
    assert!(
        compressed.len() < 3000,
        "flickering rgb compressed to {} bytes",
        compressed.len()
    );
}

#[test]
fn scenario_random_extra_bytes() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::Byte(3), 1)
        .build();

    let mut rng = StdRng::seed_from_u64(0xACE);
    let records: Vec<Vec<u8>> = (0..3333)
        .map(|_| (0..3).map(|_| rng.gen::<u8>()).collect())
        .collect();

    roundtrip(&schema, &records);
}

#[test]
fn scenario_huge_gps_jumps() {
    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::GpsTime, 1)
        .build();

    // consecutive stamps whose bit patterns differ by 2^40: the 32-bit
    // difference path cannot represent that, every stamp is stored raw
    let records: Vec<Vec<u8>> = (0..100)
        .map(|i| {
            let mut buf = vec![0u8; 8];
            GpsTime {
                value: 0x3FF0_0000_0000_0000 + (i64::from(i) << 40),
            }
            .pack_into(&mut buf);
            buf
        })
        .collect();

    let compressed = roundtrip(&schema, &records);
    // raw 64-bit stamps do not compress
    assert!(
        compressed.len() > 99 * 8,
        "raw gps stamps compressed to {} bytes",
        compressed.len()
    );
}
