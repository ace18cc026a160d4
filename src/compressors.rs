/*
===============================================================================

  CONTENTS:
    Integer compressor

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

use std::io::Write;

use crate::encoders::ArithmeticEncoder;
use crate::models::{BitModel, EncodeSymbolModel};

pub const DEFAULT_BITS: u32 = 16;
pub const DEFAULT_CONTEXTS: u32 = 1;
pub const DEFAULT_BITS_HIGH: u32 = 8;
pub const DEFAULT_RANGE: u32 = 0;
pub const DEFAULT_COMPRESS_CONTEXTS: u32 = 0;

/// Derives the corrector interval from the `(bits, range)` configuration.
///
/// Returns `(corr_bits, corr_range, corr_min, corr_max)`. A `corr_range`
/// of 0 stands for the full 32-bit range with wraparound semantics.
pub(crate) fn corrector_interval(bits: u32, mut range: u32) -> (u32, u32, i32, i32) {
    if range != 0 {
        let mut corr_bits = 0u32;
        let corr_range = range;
        while range != 0 {
            range >>= 1;
            corr_bits += 1;
        }
        if corr_range == (1u32 << (corr_bits - 1)) {
            corr_bits -= 1;
        }
        let corr_min = -((corr_range / 2) as i32);
        let corr_max = corr_min + (corr_range - 1) as i32;
        (corr_bits, corr_range, corr_min, corr_max)
    } else if bits >= 1 && bits < 32 {
        let corr_range = 1u32 << bits;
        let corr_min = -((corr_range / 2) as i32);
        let corr_max = corr_min + (corr_range - 1) as i32;
        (bits, corr_range, corr_min, corr_max)
    } else {
        (32, 0, i32::MIN, i32::MAX)
    }
}

/// Residual (prediction-corrector) codec, encoding side.
///
/// Encodes `actual - prediction` folded into the configured interval: the
/// magnitude class `k` goes through one of `contexts` symbol models, the
/// position within the class through a per-`k` value model (raw bits above
/// `bits_high`).
#[derive(Debug)]
pub struct IntegerCompressor {
    k: u32,

    contexts: u32,
    bits_high: u32,

    corr_bits: u32,
    corr_range: u32,
    corr_min: i32,
    corr_max: i32,

    m_bits: Vec<EncodeSymbolModel>,
    m_corrector_0: BitModel,
    m_corrector: Vec<EncodeSymbolModel>,
}

impl IntegerCompressor {
    pub fn new(bits: u32, contexts: u32, bits_high: u32, range: u32) -> Self {
        let (corr_bits, corr_range, corr_min, corr_max) = corrector_interval(bits, range);
        Self {
            k: 0,
            contexts,
            bits_high,
            corr_bits,
            corr_range,
            corr_min,
            corr_max,
            m_bits: vec![],
            m_corrector_0: BitModel::new(),
            m_corrector: vec![],
        }
    }

    /// Magnitude class of the last compressed corrector.
    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn init(&mut self) {
        if self.m_bits.is_empty() {
            for _ in 0..self.contexts {
                self.m_bits.push(EncodeSymbolModel::new(self.corr_bits + 1));
            }
            for i in 1..=self.corr_bits {
                let symbols = if i <= self.bits_high {
                    1u32 << i
                } else {
                    1u32 << self.bits_high
                };
                self.m_corrector.push(EncodeSymbolModel::new(symbols));
            }
        }
    }

    pub fn compress<W: Write>(
        &mut self,
        encoder: &mut ArithmeticEncoder<W>,
        pred: i32,
        real: i32,
        context: u32,
    ) -> std::io::Result<()> {
        // the corrector is in [-(corr_range - 1), +(corr_range - 1)],
        // fold it into [corr_min, corr_max]
        let mut corr = real.wrapping_sub(pred);
        if corr < self.corr_min {
            corr = corr.wrapping_add(self.corr_range as i32);
        } else if corr > self.corr_max {
            corr = corr.wrapping_sub(self.corr_range as i32);
        }
        self.write_corrector(encoder, corr, context)
    }

    fn write_corrector<W: Write>(
        &mut self,
        encoder: &mut ArithmeticEncoder<W>,
        mut c: i32,
        context: u32,
    ) -> std::io::Result<()> {
        // find the tightest interval [-(2^k - 1), +(2^k)] containing c,
        // by checking the absolute value of c (adjusted for c == 2^k)
        self.k = 0;
        let mut c1 = if c <= 0 { c.wrapping_neg() } else { c - 1 } as u32;
        while c1 != 0 {
            c1 >>= 1;
            self.k += 1;
        }

        encoder.encode_symbol(&mut self.m_bits[context as usize], self.k)?;

        if self.k != 0 {
            debug_assert!(c != 0 && c != 1);
            if self.k < 32 {
                // translate c into the k-bit interval [0, 2^k - 1]
                if c >= 0 {
                    c -= 1;
                } else {
                    c += ((1u32 << self.k) - 1) as i32;
                }

                if self.k <= self.bits_high {
                    // small k, code the interval in one step
                    encoder
                        .encode_symbol(&mut self.m_corrector[(self.k - 1) as usize], c as u32)?;
                } else {
                    // larger k, code the high bits through the model and
                    // store the low bits raw
                    let k1 = self.k - self.bits_high;
                    let c1 = (c & ((1u32 << k1) - 1) as i32) as u32;
                    c >>= k1;
                    encoder
                        .encode_symbol(&mut self.m_corrector[(self.k - 1) as usize], c as u32)?;
                    encoder.write_bits(k1, c1)?;
                }
            }
        } else {
            // c is 0 or 1
            debug_assert!(c == 0 || c == 1);
            encoder.encode_bit(&mut self.m_corrector_0, c as u32)?;
        }
        Ok(())
    }
}

pub struct IntegerCompressorBuilder {
    bits: u32,
    contexts: u32,
    bits_high: u32,
    range: u32,
}

impl Default for IntegerCompressorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IntegerCompressorBuilder {
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

    pub fn build(&self) -> IntegerCompressor {
        IntegerCompressor::new(self.bits, self.contexts, self.bits_high, self.range)
    }

    pub fn build_initialized(&self) -> IntegerCompressor {
        let mut ic = self.build();
        ic.init();
        ic
    }
}
