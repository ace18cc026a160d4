use std::io::Cursor;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use pointzip::las::{GpsTime, Point10, Rgb, Wavepacket};
use pointzip::packers::Packable;
use pointzip::{
    ItemSchemaBuilder, ItemType, PointzipError, RecordCompressor, RecordDecompressor,
    SequentialPointRecordCompressor, SequentialPointRecordDecompressor,
};

fn compress(schema: &[pointzip::ItemSpec], records: &[Vec<u8>]) -> Vec<u8> {
    let mut compressor = SequentialPointRecordCompressor::new(Cursor::new(Vec::<u8>::new()));
    compressor.set_fields_from(schema).unwrap();
    for record in records {
        compressor.compress_next(record).unwrap();
    }
    compressor.done().unwrap();
    compressor.into_stream().into_inner()
}

fn roundtrip(schema: &[pointzip::ItemSpec], records: &[Vec<u8>]) {
    let compressed = compress(schema, records);

    let mut decompressor = SequentialPointRecordDecompressor::new(Cursor::new(compressed));
    decompressor.set_fields_from(schema).unwrap();
    let mut buf = vec![0u8; decompressor.record_size()];
    for (i, record) in records.iter().enumerate() {
        decompressor.decompress_next(&mut buf).unwrap();
        assert_eq!(&buf, record, "record {} did not roundtrip", i);
    }
}

fn synthetic_point10(i: i32) -> Vec<u8> {
    let mut buf = vec![0u8; Point10::SIZE];
    Point10 {
        x: i,
        y: i + 1000,
        z: i + 10000,
        intensity: (i % (1 << 16)) as u16,
        return_number: ((i >> 3) & 0x7) as u8,
        number_of_returns_of_given_pulse: (i & 0x7) as u8,
        scan_direction_flag: (i & 1) != 0,
        edge_of_flight_line: ((i + 1) & 1) != 0,
        classification: (i % 256) as u8,
        scan_angle_rank: (i % 128) as i8,
        user_data: ((i >> 4) % 256) as u8,
        point_source_id: (i * 30 % (1 << 16)) as u16,
    }
    .pack_into(&mut buf);
    buf
}

fn synthetic_gps_times() -> Vec<Vec<u8>> {
    let mut values = Vec::new();
    // regular spacing
    for i in 0..2000 {
        values.push(GpsTime::from(123_456.0 + f64::from(i) * 0.5));
    }
    // repeated stamps
    for _ in 0..50 {
        values.push(*values.last().unwrap());
    }
    // two interleaved sequences far apart
    for i in 0..500 {
        values.push(GpsTime::from(1e9 + f64::from(i) * 0.01));
        values.push(GpsTime::from(5e8 + f64::from(i) * 0.02));
    }
    // dropouts and bursts
    for i in 0..500 {
        let burst = f64::from(i / 10) * 90.0;
        values.push(GpsTime::from(2e9 + burst + f64::from(i % 10) * 0.001));
    }
    // zigzag, the stamps keep moving backwards
    for i in 0..200 {
        let sign = if i % 2 == 0 { 1.0 } else { -1.0 };
        values.push(GpsTime::from(3e9 + sign * f64::from(i) * 0.01));
    }
    values
        .into_iter()
        .map(|t| {
            let mut buf = vec![0u8; 8];
            t.pack_into(&mut buf);
            buf
        })
        .collect()
}

fn synthetic_rgbs() -> Vec<Vec<u8>> {
    let mut rng = StdRng::seed_from_u64(0xB0B);
    let mut colors = Vec::new();
    // gray ramp
    for i in 0..500u16 {
        let v = i.wrapping_mul(131);
        colors.push(Rgb {
            red: v,
            green: v,
            blue: v,
        });
    }
    // smooth colored gradient
    for i in 0..1000u16 {
        colors.push(Rgb {
            red: 1000 + i,
            green: 2000 + i / 2,
            blue: 30000 - i,
        });
    }
    // noise
    for _ in 0..500 {
        colors.push(Rgb {
            red: rng.gen(),
            green: rng.gen(),
            blue: rng.gen(),
        });
    }
    colors
        .into_iter()
        .map(|c| {
            let mut buf = vec![0u8; Rgb::SIZE];
            c.pack_into(&mut buf);
            buf
        })
        .collect()
}

fn synthetic_wavepackets() -> Vec<Vec<u8>> {
    let mut records = Vec::new();
    let mut offset = 1024u64;
    for i in 0..2000u32 {
        let packet_size = 256 + (i % 7) * 64;
        let wavepacket = Wavepacket {
            descriptor_index: (i % 4) as u8,
            offset,
            packet_size,
            return_point: 1.5 + i as f32,
            dx: 0.001,
            dy: -0.002,
            dz: 0.999,
        };
        let mut buf = vec![0u8; Wavepacket::SIZE];
        wavepacket.pack_into(&mut buf);
        records.push(buf);

        if i % 501 == 500 {
            // jump farther than 32 bits can express
            offset += 1u64 << 40;
        } else {
            offset += u64::from(packet_size);
        }
    }
    records
}

#[test]
fn point10_roundtrips_in_both_versions() {
    let records: Vec<Vec<u8>> = (0..5000).map(synthetic_point10).collect();
    for version in [1, 2] {
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Point10, version)
            .build();
        roundtrip(&schema, &records);
    }
}

#[test]
fn gps_time_roundtrips_in_both_versions() {
    let records = synthetic_gps_times();
    for version in [1, 2] {
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::GpsTime, version)
            .build();
        roundtrip(&schema, &records);
    }
}

#[test]
fn rgb_roundtrips_in_both_versions() {
    let records = synthetic_rgbs();
    for version in [1, 2] {
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Rgb12, version)
            .build();
        roundtrip(&schema, &records);
    }
}

#[test]
fn wavepacket_roundtrips_in_both_versions() {
    let records = synthetic_wavepackets();
    for version in [1, 2] {
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Wavepacket13, version)
            .build();
        roundtrip(&schema, &records);
    }
}

#[test]
fn extra_bytes_roundtrip_in_both_versions() {
    let mut rng = StdRng::seed_from_u64(77);
    let records: Vec<Vec<u8>> = (0..2000)
        .map(|i| {
            (0..16)
                .map(|j| {
                    if j < 8 {
                        // slowly drifting bytes
                        ((i / 4 + j) % 256) as u8
                    } else {
                        rng.gen::<u8>()
                    }
                })
                .collect()
        })
        .collect();

    for version in [1, 2] {
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Byte(16), version)
            .build();
        roundtrip(&schema, &records);
    }
}

#[test]
fn mixed_schema_roundtrips_in_both_versions() {
    let gps_times = synthetic_gps_times();
    let rgbs = synthetic_rgbs();
    let records: Vec<Vec<u8>> = (0..2000usize)
        .map(|i| {
            let mut record = synthetic_point10(i as i32);
            record.extend_from_slice(&gps_times[i % gps_times.len()]);
            record.extend_from_slice(&rgbs[i % rgbs.len()]);
            record.extend_from_slice(&[(i % 256) as u8, (i % 3) as u8, 0xAB, (i % 31) as u8]);
            record
        })
        .collect();

    for version in [1, 2] {
        let schema = ItemSchemaBuilder::new()
            .versioned_item(ItemType::Point10, version)
            .versioned_item(ItemType::GpsTime, version)
            .versioned_item(ItemType::Rgb12, version)
            .versioned_item(ItemType::Byte(4), version)
            .build();
        roundtrip(&schema, &records);
    }
}

#[test]
fn first_record_is_stored_raw() {
    let schema = ItemSchemaBuilder::new()
        .item(ItemType::Point10)
        .item(ItemType::GpsTime)
        .build();

    let records: Vec<Vec<u8>> = (0..10)
        .map(|i| {
            let mut record = synthetic_point10(i);
            let mut time = vec![0u8; 8];
            GpsTime::from(f64::from(i)).pack_into(&mut time);
            record.extend_from_slice(&time);
            record
        })
        .collect();

    let compressed = compress(&schema, &records);
    assert_eq!(&compressed[..28], records[0].as_slice());
}

#[test]
fn compression_is_deterministic() {
    let schema = ItemSchemaBuilder::new().item(ItemType::Point10).build();
    let records: Vec<Vec<u8>> = (0..3000).map(synthetic_point10).collect();

    let first = compress(&schema, &records);
    let second = compress(&schema, &records);
    assert_eq!(first, second);
}

#[test]
fn zero_sized_byte_item_is_rejected() {
    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::Byte(0), 1)
        .build();

    let mut compressor = SequentialPointRecordCompressor::new(Cursor::new(Vec::<u8>::new()));
    assert!(matches!(
        compressor.set_fields_from(&schema),
        Err(PointzipError::UnsupportedByteItemSize)
    ));
}

#[test]
fn unsupported_version_is_rejected() {
    let schema = ItemSchemaBuilder::new()
        .versioned_item(ItemType::Point10, 3)
        .build();

    let mut decompressor =
        SequentialPointRecordDecompressor::new(Cursor::new(Vec::<u8>::new()));
    assert!(matches!(
        decompressor.set_fields_from(&schema),
        Err(PointzipError::UnsupportedItemVersion(ItemType::Point10, 3))
    ));
}

#[test]
fn truncated_stream_reports_an_io_error() {
    let schema = ItemSchemaBuilder::new().item(ItemType::Point10).build();
    let records: Vec<Vec<u8>> = (0..100).map(synthetic_point10).collect();

    let compressed = compress(&schema, &records);
    let truncated = compressed[..Point10::SIZE + 2].to_vec();

    let mut decompressor = SequentialPointRecordDecompressor::new(Cursor::new(truncated));
    decompressor.set_fields_from(&schema).unwrap();
    let mut buf = vec![0u8; Point10::SIZE];

    // the raw first record is still there, the arithmetic stream is not
    let result = (0..100).try_for_each(|_| decompressor.decompress_next(&mut buf));
    assert!(result.is_err());
}
