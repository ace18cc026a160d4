use std::io::Cursor;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::compressors::IntegerCompressorBuilder;
use crate::decoders::ArithmeticDecoder;
use crate::decompressors::IntegerDecompressorBuilder;
use crate::encoders::ArithmeticEncoder;
use crate::models::{BitModel, DecodeSymbolModel, EncodeSymbolModel};

fn encoder_into_decoder(
    encoder: ArithmeticEncoder<Cursor<Vec<u8>>>,
) -> ArithmeticDecoder<Cursor<Vec<u8>>> {
    let mut stream = encoder.into_inner();
    stream.set_position(0);
    let mut decoder = ArithmeticDecoder::new(stream);
    decoder.read_init_bytes().unwrap();
    decoder
}

#[test]
fn done_with_nothing_encoded_is_five_bytes() {
    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    encoder.done().unwrap();
    assert_eq!(encoder.into_inner().into_inner(), vec![0u8; 5]);
}

#[test]
fn write_bits_read_bits_identity() {
    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut expected = Vec::new();
    for bits in 1..=32u32 {
        let values = [
            0u32,
            1,
            (1u64 << bits).wrapping_sub(1) as u32,
            (1u64 << bits).wrapping_sub(1) as u32 / 2,
        ];
        for &v in &values {
            let v = if bits == 32 { v } else { v & ((1 << bits) - 1) };
            encoder.write_bits(bits, v).unwrap();
            expected.push((bits, v));
        }
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    for (bits, v) in expected {
        assert_eq!(decoder.read_bits(bits).unwrap(), v, "bits: {}", bits);
    }
}

#[test]
fn write_int_read_int_identity() {
    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let ints = [0u32, 1, 0xDEAD_BEEF, u32::MAX];
    let longs = [0u64, 42, 1 << 40, u64::MAX];
    for &v in &ints {
        encoder.write_int(v).unwrap();
    }
    for &v in &longs {
        encoder.write_int64(v).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    for &v in &ints {
        assert_eq!(decoder.read_int().unwrap(), v);
    }
    for &v in &longs {
        assert_eq!(decoder.read_int_64().unwrap(), v);
    }
}

#[test]
fn bit_model_symmetry() {
    let mut rng = StdRng::seed_from_u64(7);
    let bits: Vec<u32> = (0..4096).map(|_| rng.gen_range(0..10) / 9).collect();

    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut model = BitModel::new();
    for &bit in &bits {
        encoder.encode_bit(&mut model, bit).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    let mut model = BitModel::new();
    for &bit in &bits {
        assert_eq!(decoder.decode_bit(&mut model).unwrap(), bit);
    }
}

#[test]
fn symbol_coding_roundtrip_and_model_lockstep() {
    // skewed symbols in a 33-symbol alphabet, like the magnitude models
    let mut rng = StdRng::seed_from_u64(1234);
    let symbols: Vec<u32> = (0..8192)
        .map(|_| match rng.gen_range(0..100) {
            0..=79 => rng.gen_range(0..3),
            80..=94 => rng.gen_range(3..10),
            _ => rng.gen_range(10..33),
        })
        .collect();

    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut enc_model = EncodeSymbolModel::new(33);
    for &sym in &symbols {
        encoder.encode_symbol(&mut enc_model, sym).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    let mut dec_model = DecodeSymbolModel::new(33);
    for &sym in &symbols {
        assert_eq!(decoder.decode_symbol(&mut dec_model).unwrap(), sym);
    }

    // both sides must have driven their counters identically
    assert_eq!(enc_model.counter_state(), dec_model.counter_state());
}

#[test]
fn small_alphabet_symbol_coding_roundtrip() {
    // alphabets of 16 symbols or less decode without a lookup table
    let mut rng = StdRng::seed_from_u64(99);
    let symbols: Vec<u32> = (0..4096).map(|_| rng.gen_range(0..3)).collect();

    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut enc_model = EncodeSymbolModel::new(3);
    for &sym in &symbols {
        encoder.encode_symbol(&mut enc_model, sym).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    let mut dec_model = DecodeSymbolModel::new(3);
    for &sym in &symbols {
        assert_eq!(decoder.decode_symbol(&mut dec_model).unwrap(), sym);
    }
    assert_eq!(enc_model.counter_state(), dec_model.counter_state());
}

#[test]
fn encoding_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(4242);
    let symbols: Vec<u32> = (0..2048).map(|_| rng.gen_range(0..64)).collect();

    let mut streams = Vec::new();
    for _ in 0..2 {
        let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
        let mut model = EncodeSymbolModel::new(64);
        for &sym in &symbols {
            encoder.encode_symbol(&mut model, sym).unwrap();
        }
        encoder.done().unwrap();
        streams.push(encoder.into_inner().into_inner());
    }
    assert_eq!(streams[0], streams[1]);
}

/// Magnitude class the corrector coding assigns to `corr`.
fn expected_k(corr: i32) -> u32 {
    let mut c1 = if corr <= 0 {
        corr.wrapping_neg()
    } else {
        corr - 1
    } as u32;
    let mut k = 0;
    while c1 != 0 {
        c1 >>= 1;
        k += 1;
    }
    k
}

#[test]
fn integer_compressor_roundtrip_8_bits() {
    let cases: Vec<(i32, i32)> = vec![
        (0, 0),
        (0, 255),
        (255, 0),
        (127, 128),
        (10, 11),
        (200, 72),
    ];

    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut ic = IntegerCompressorBuilder::new()
        .bits(8)
        .contexts(2)
        .build_initialized();
    for &(pred, real) in &cases {
        ic.compress(&mut encoder, pred, real, 1).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    let mut idc = IntegerDecompressorBuilder::new()
        .bits(8)
        .contexts(2)
        .build_initialized();
    for &(pred, real) in &cases {
        assert_eq!(idc.decompress(&mut decoder, pred, 1).unwrap(), real);
    }
}

#[test]
fn integer_compressor_roundtrip_32_bits() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let mut cases: Vec<(i32, i32)> = (0..4096)
        .map(|_| {
            let pred = rng.gen::<i32>();
            // mostly small deviations, sometimes huge ones
            let real = if rng.gen_bool(0.9) {
                pred.wrapping_add(rng.gen_range(-1000..1000))
            } else {
                rng.gen::<i32>()
            };
            (pred, real)
        })
        .collect();
    cases.push((i32::MIN, i32::MAX));
    cases.push((i32::MAX, i32::MIN));
    cases.push((0, i32::MIN));

    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut ic = IntegerCompressorBuilder::new().bits(32).build_initialized();
    for &(pred, real) in &cases {
        ic.compress(&mut encoder, pred, real, 0).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    let mut idc = IntegerDecompressorBuilder::new().bits(32).build_initialized();
    for &(pred, real) in &cases {
        assert_eq!(idc.decompress(&mut decoder, pred, 0).unwrap(), real);
    }
}

#[test]
fn integer_compressor_exposes_magnitude_class() {
    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut ic = IntegerCompressorBuilder::new().bits(32).build_initialized();

    // in full 32-bit mode the corrector is exactly real - pred
    let cases: [(i32, i32); 5] = [(0, 0), (0, 1), (100, 92), (92, 100), (0, -65536)];
    for &(pred, real) in &cases {
        ic.compress(&mut encoder, pred, real, 0).unwrap();
        assert_eq!(ic.k(), expected_k(real.wrapping_sub(pred)));
    }
    encoder.done().unwrap();
}

#[test]
fn integer_compressor_16_bit_wraparound() {
    // values folded modulo 2^16 still land on the right side
    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut ic = IntegerCompressorBuilder::new().bits(16).build_initialized();
    let cases: [(i32, i32); 3] = [(65535, 0), (0, 65535), (40000, 20000)];
    for &(pred, real) in &cases {
        ic.compress(&mut encoder, pred, real, 0).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    let mut idc = IntegerDecompressorBuilder::new().bits(16).build_initialized();
    for &(pred, real) in &cases {
        assert_eq!(idc.decompress(&mut decoder, pred, 0).unwrap(), real);
    }
}

#[test]
fn carry_heavy_stream_roundtrips() {
    // long runs of the most probable symbol drive the interval towards
    // its upper end and exercise the carry and follow-byte paths
    let mut symbols = Vec::new();
    let mut rng = StdRng::seed_from_u64(31415);
    for _ in 0..64 {
        symbols.extend(std::iter::repeat(255u32).take(rng.gen_range(50..200)));
        symbols.push(rng.gen_range(0..255));
    }

    let mut encoder = ArithmeticEncoder::new(Cursor::new(Vec::<u8>::new()));
    let mut enc_model = EncodeSymbolModel::new(256);
    for &sym in &symbols {
        encoder.encode_symbol(&mut enc_model, sym).unwrap();
    }
    encoder.done().unwrap();

    let mut decoder = encoder_into_decoder(encoder);
    let mut dec_model = DecodeSymbolModel::new(256);
    for &sym in &symbols {
        assert_eq!(decoder.decode_symbol(&mut dec_model).unwrap(), sym);
    }
}
