/*
===============================================================================

  CONTENTS:
    Integer decompressor

  PROGRAMMERS:

    martin.isenburg@rapidlasso.com  -  http://rapidlasso.com
    uday.karan@gmail.com - Hobu, Inc.

  COPYRIGHT:

    (c) 2007-2014, martin isenburg, rapidlasso - tools to catch reality
    (c) 2014, Uday Verma, Hobu, Inc.

    This is free software; you can redistribute and/or modify it under the
    terms of the GNU Lesser General Licence as published by the Free Software
    Foundation. See the COPYING file for more information.

    This software is distributed WITHOUT ANY WARRANTY and without even the
    implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.

===============================================================================
*/

use std::io::Read;

use crate::compressors::{
    corrector_interval, DEFAULT_BITS, DEFAULT_BITS_HIGH, DEFAULT_CONTEXTS, DEFAULT_RANGE,
};
use crate::decoders::ArithmeticDecoder;
use crate::models::{BitModel, DecodeSymbolModel};

pub const DEFAULT_DECOMPRESS_CONTEXTS: u32 = 0;

/// Residual (prediction-corrector) codec, decoding side.
///
/// Must be configured exactly like the [`IntegerCompressor`] that wrote
/// the stream.
///
/// [`IntegerCompressor`]: crate::compressors::IntegerCompressor
#[derive(Debug)]
pub struct IntegerDecompressor {
    k: u32,

    contexts: u32,
    bits_high: u32,

    corr_bits: u32,
    corr_range: u32,

    m_bits: Vec<DecodeSymbolModel>,
    m_corrector_0: BitModel,
    m_corrector: Vec<DecodeSymbolModel>,
}

impl IntegerDecompressor {
    pub fn new(bits: u32, contexts: u32, bits_high: u32, range: u32) -> Self {
        let (corr_bits, corr_range, _corr_min, _corr_max) = corrector_interval(bits, range);
        Self {
            k: 0,
            contexts,
            bits_high,
            corr_bits,
            corr_range,
            m_bits: vec![],
            m_corrector_0: BitModel::new(),
            m_corrector: vec![],
        }
    }

    /// Magnitude class of the last decompressed corrector.
    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn init(&mut self) {
        if self.m_bits.is_empty() {
            for _ in 0..self.contexts {
                self.m_bits.push(DecodeSymbolModel::new(self.corr_bits + 1));
            }
            for i in 1..=self.corr_bits {
                let symbols = if i <= self.bits_high {
                    1u32 << i
                } else {
                    1u32 << self.bits_high
                };
                self.m_corrector.push(DecodeSymbolModel::new(symbols));
            }
        }
    }

    pub fn decompress<R: Read>(
        &mut self,
        decoder: &mut ArithmeticDecoder<R>,
        pred: i32,
        context: u32,
    ) -> std::io::Result<i32> {
        let corr = self.read_corrector(decoder, context)?;
        let mut real = pred.wrapping_add(corr);
        // fold the result back into [0, corr_range)
        if real < 0 {
            real = real.wrapping_add(self.corr_range as i32);
        } else if self.corr_range != 0 && (real as u32) >= self.corr_range {
            real = real.wrapping_sub(self.corr_range as i32);
        }
        Ok(real)
    }

    fn read_corrector<R: Read>(
        &mut self,
        decoder: &mut ArithmeticDecoder<R>,
        context: u32,
    ) -> std::io::Result<i32> {
        // decode the magnitude class, then the exact location within it
        self.k = decoder.decode_symbol(&mut self.m_bits[context as usize])?;

        let mut c: i32;
        if self.k != 0 {
            if self.k < 32 {
                if self.k <= self.bits_high {
                    c = decoder.decode_symbol(&mut self.m_corrector[(self.k - 1) as usize])?
                        as i32;
                } else {
                    // high bits through the model, low bits raw
                    let k1 = self.k - self.bits_high;
                    c = decoder.decode_symbol(&mut self.m_corrector[(self.k - 1) as usize])?
                        as i32;
                    let c1 = decoder.read_bits(k1)?;
                    c = (c << k1) | c1 as i32;
                }

                // translate c back into its interval
                if c >= (1u32 << (self.k - 1)) as i32 {
                    // c is in [2^(k-1), 2^k - 1], translate back to
                    // [2^(k-1) + 1, 2^k]
                    c += 1;
                } else {
                    // c is in [0, 2^(k-1) - 1], translate back to
                    // [-(2^k - 1), -2^(k-1)]
                    c -= ((1u32 << self.k) - 1) as i32;
                }
            } else {
                c = i32::MIN;
            }
        } else {
            // c is 0 or 1
            c = decoder.decode_bit(&mut self.m_corrector_0)? as i32;
        }

        Ok(c)
    }
}

pub struct IntegerDecompressorBuilder {
    bits: u32,
    contexts: u32,
    bits_high: u32,
    range: u32,
}

impl Default for IntegerDecompressorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerDecompressorBuilder {
    pub fn new() -> Self {
        Self {
            bits: DEFAULT_BITS,
            contexts: DEFAULT_CONTEXTS,
            bits_high: DEFAULT_BITS_HIGH,
            range: DEFAULT_RANGE,
        }
    }

    pub fn bits(&mut self, bits: u32) -> &mut Self {
        self.bits = bits;
        self
    }

    pub fn contexts(&mut self, contexts: u32) -> &mut Self {
        self.contexts = contexts;
        self
    }

    pub fn build(&self) -> IntegerDecompressor {
        IntegerDecompressor::new(self.bits, self.contexts, self.bits_high, self.range)
    }

    pub fn build_initialized(&self) -> IntegerDecompressor {
        let mut idc = self.build();
        idc.init();
        idc
    }
}
