/*
===============================================================================

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

//! Range decoder: consumes the byte stream the [`ArithmeticEncoder`]
//! produces and drives the matching decode-side models.
//!
//! [`ArithmeticEncoder`]: crate::encoders::ArithmeticEncoder

use byteorder::ReadBytesExt;
use std::io::Read;

use crate::models;
use crate::models::DM_LENGTH_SHIFT;

/// Initial interval length.
pub const AC_MAX_LENGTH: u32 = 0xFFFF_FFFF;
/// Renormalization bound: bytes are shifted in/out while the interval
/// length is below this.
pub const AC_TOP_VALUE: u32 = 1 << 24;
/// Precision window for the adaptive models: scaled totals stay below
/// this bound so interval divisions never truncate to zero.
pub const AC_BOTTOM_VALUE: u32 = 1 << 16;

pub struct ArithmeticDecoder<R: Read> {
    in_stream: R,
    value: u32,
    length: u32,
}

impl<R: Read> ArithmeticDecoder<R> {
    pub fn new(in_stream: R) -> Self {
        Self {
            in_stream,
            value: 0,
            length: AC_MAX_LENGTH,
        }
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.length = AC_MAX_LENGTH;
    }

    /// Primes the value register from the stream.
    ///
    /// Five bytes are consumed, mirroring the five bytes the encoder's
    /// flush emits: a leading zero byte, then the four value bytes.
    pub fn read_init_bytes(&mut self) -> std::io::Result<()> {
        let mut v = [0u8; 5];
        self.in_stream.read_exact(&mut v)?;
        self.value = u32::from(v[1]) << 24
            | u32::from(v[2]) << 16
            | u32::from(v[3]) << 8
            | u32::from(v[4]);
        Ok(())
    }

    pub fn decode_bit(&mut self, model: &mut models::BitModel) -> std::io::Result<u32> {
        // product length x p0
        let x = model.bit_0_prob * (self.length >> models::BM_LENGTH_SHIFT);

        let sym = self.value >= x;
        if !sym {
            self.length = x;
            model.bit_0_count += 1;
        } else {
            self.value -= x;
            self.length -= x;
        }

        if self.length < AC_TOP_VALUE {
            self.renorm_dec_interval()?;
        }
        model.bits_until_update -= 1;
        if model.bits_until_update == 0 {
            model.update();
        }
        Ok(sym as u32)
    }

    pub fn decode_symbol(
        &mut self,
        model: &mut models::DecodeSymbolModel,
    ) -> std::io::Result<u32> {
        let mut sym;
        let mut n;
        let mut x;
        let mut y = self.length;

        if !model.decoder_table.is_empty() {
            // initial decision based on the lookup table, then bisection
            self.length >>= DM_LENGTH_SHIFT;
            let dv = self.value / self.length;
            let t = dv >> model.table_shift;

            sym = model.decoder_table[t as usize];
            n = model.decoder_table[t as usize + 1] + 1;

            while n > sym + 1 {
                let k = (sym + n) >> 1;
                if model.distribution[k as usize] > dv {
                    n = k;
                } else {
                    sym = k;
                }
            }
            x = model.distribution[sym as usize] * self.length;
            if sym != model.last_symbol {
                y = model.distribution[sym as usize + 1] * self.length;
            }
        } else {
            // small alphabet, plain bisection
            x = 0;
            sym = 0;
            self.length >>= DM_LENGTH_SHIFT;
            n = model.symbols;
            let mut k = n >> 1;

            loop {
                let z = self.length * model.distribution[k as usize];
                if z > self.value {
                    n = k;
                    y = z;
                } else {
                    sym = k;
                    x = z;
                }
                k = (sym + n) >> 1;
                if k == sym {
                    break;
                }
            }
        }

        self.value -= x;
        self.length = y - x;

        if self.length < AC_TOP_VALUE {
            self.renorm_dec_interval()?;
        }
        model.note_symbol(sym);
        Ok(sym)
    }

    pub fn read_bits(&mut self, mut bits: u32) -> std::io::Result<u32> {
        debug_assert!(bits > 0 && bits <= 32);
        if bits > 19 {
            let lower = u32::from(self.read_short()?);
            bits -= 16;
            let upper = self.read_bits(bits)? << 16;
            Ok(upper | lower)
        } else {
            self.length >>= bits;
            let sym = self.value / self.length;
            self.value -= self.length * sym;

            if self.length < AC_TOP_VALUE {
                self.renorm_dec_interval()?;
            }
            Ok(sym)
        }
    }

    fn read_short(&mut self) -> std::io::Result<u16> {
        self.length >>= 16;
        let sym = self.value / self.length;
        self.value -= self.length * sym;

        if self.length < AC_TOP_VALUE {
            self.renorm_dec_interval()?;
        }
        debug_assert!(sym < (1 << 16));
        Ok(sym as u16)
    }

    pub fn read_int(&mut self) -> std::io::Result<u32> {
        let lower = self.read_short()?;
        let upper = self.read_short()?;
        Ok(u32::from(upper) << 16 | u32::from(lower))
    }

    pub fn read_int_64(&mut self) -> std::io::Result<u64> {
        let lower = u64::from(self.read_int()?);
        let upper = u64::from(self.read_int()?);
        Ok(upper << 32 | lower)
    }

    fn renorm_dec_interval(&mut self) -> std::io::Result<()> {
        loop {
            self.value = (self.value << 8) | u32::from(self.in_stream.read_u8()?);
            self.length <<= 8;
            if self.length >= AC_TOP_VALUE {
                break;
            }
        }
        Ok(())
    }

    pub fn in_stream(&mut self) -> &mut R {
        &mut self.in_stream
    }

    pub fn into_stream(self) -> R {
        self.in_stream
    }
}
