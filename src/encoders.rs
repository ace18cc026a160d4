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

//! Range encoder with 32-bit interval arithmetic.
//!
//! The interval base lives in the low 32 bits of `low`; an addition that
//! wraps leaves a carry in bit 32 which renormalization folds into the
//! byte stream. Bytes are not final the moment they are shifted out of
//! the base: the most recent one is cached, and a run of `0xFF` bytes
//! behind it is only counted, so that a later carry can still turn the
//! cached byte into `cache + 1` and the run into `0x00`s.

use byteorder::WriteBytesExt;
use std::io::Write;

use crate::decoders::{AC_MAX_LENGTH, AC_TOP_VALUE};
use crate::models;
use crate::models::DM_LENGTH_SHIFT;

pub struct ArithmeticEncoder<W: Write> {
    out_stream: W,
    low: u64,
    length: u32,
    cache: u8,
    follow_count: u64,
}

impl<W: Write> ArithmeticEncoder<W> {
    pub fn new(out_stream: W) -> Self {
        Self {
            out_stream,
            low: 0,
            length: AC_MAX_LENGTH,
            cache: 0,
            follow_count: 0,
        }
    }

    pub fn reset(&mut self) {
        self.low = 0;
        self.length = AC_MAX_LENGTH;
        self.cache = 0;
        self.follow_count = 0;
    }

    /// Terminates the interval: settles the cached byte and the pending
    /// follow run, then writes the four bytes of the interval base.
    ///
    /// With no follow run pending this is exactly five bytes past the
    /// last data byte, which is also exactly what the decoder start-up
    /// plus its renormalizations will consume.
    pub fn done(&mut self) -> std::io::Result<()> {
        let carry = (self.low >> 32) as u8;
        self.out_stream.write_u8(self.cache.wrapping_add(carry))?;
        while self.follow_count > 0 {
            self.out_stream.write_u8(0xFFu8.wrapping_add(carry))?;
            self.follow_count -= 1;
        }

        let base = self.low as u32;
        self.out_stream.write_u8((base >> 24) as u8)?;
        self.out_stream.write_u8((base >> 16) as u8)?;
        self.out_stream.write_u8((base >> 8) as u8)?;
        self.out_stream.write_u8(base as u8)?;
        Ok(())
    }

    pub fn encode_bit(
        &mut self,
        model: &mut models::BitModel,
        sym: u32,
    ) -> std::io::Result<()> {
        debug_assert!(sym <= 1);
        // product length x p0
        let x = model.bit_0_prob * (self.length >> models::BM_LENGTH_SHIFT);

        if sym == 0 {
            self.length = x;
            model.bit_0_count += 1;
        } else {
            self.low += u64::from(x);
            self.length -= x;
        }

        if self.length < AC_TOP_VALUE {
            self.renorm_enc_interval()?;
        }
        model.bits_until_update -= 1;
        if model.bits_until_update == 0 {
            model.update();
        }
        Ok(())
    }

    pub fn encode_symbol(
        &mut self,
        model: &mut models::EncodeSymbolModel,
        sym: u32,
    ) -> std::io::Result<()> {
        debug_assert!(sym <= model.last_symbol);

        let x;
        if sym == model.last_symbol {
            // the last symbol's window runs to the end of the interval
            x = model.distribution[sym as usize] * (self.length >> DM_LENGTH_SHIFT);
            self.low += u64::from(x);
            self.length -= x;
        } else {
            self.length >>= DM_LENGTH_SHIFT;
            x = model.distribution[sym as usize] * self.length;
            self.low += u64::from(x);
            self.length = model.distribution[(sym + 1) as usize] * self.length - x;
        }

        if self.length < AC_TOP_VALUE {
            self.renorm_enc_interval()?;
        }
        model.note_symbol(sym);
        Ok(())
    }

    pub fn write_bits(&mut self, mut bits: u32, mut sym: u32) -> std::io::Result<()> {
        debug_assert!(bits > 0 && bits <= 32);
        debug_assert!(bits == 32 || sym < (1u32 << bits));

        if bits > 19 {
            self.write_short((sym & 0xFFFF) as u16)?;
            sym >>= 16;
            bits -= 16;
        }

        self.length >>= bits;
        self.low += u64::from(sym) * u64::from(self.length);

        if self.length < AC_TOP_VALUE {
            self.renorm_enc_interval()?;
        }
        Ok(())
    }

    fn write_short(&mut self, sym: u16) -> std::io::Result<()> {
        self.length >>= 16;
        self.low += u64::from(sym) * u64::from(self.length);

        if self.length < AC_TOP_VALUE {
            self.renorm_enc_interval()?;
        }
        Ok(())
    }

    pub fn write_int(&mut self, sym: u32) -> std::io::Result<()> {
        self.write_short((sym & 0xFFFF) as u16)?;
        self.write_short((sym >> 16) as u16)
    }

    pub fn write_int64(&mut self, sym: u64) -> std::io::Result<()> {
        self.write_int((sym & 0xFFFF_FFFF) as u32)?;
        self.write_int((sym >> 32) as u32)
    }

    fn renorm_enc_interval(&mut self) -> std::io::Result<()> {
        loop {
            self.shift_low()?;
            self.length <<= 8;
            if self.length >= AC_TOP_VALUE {
                break;
            }
        }
        Ok(())
    }

    fn shift_low(&mut self) -> std::io::Result<()> {
        let low32 = self.low as u32;
        if low32 < 0xFF00_0000 || self.low > u64::from(u32::MAX) {
            // the shifted byte is settled, or a carry makes it so
            let carry = (self.low >> 32) as u8;
            self.out_stream.write_u8(self.cache.wrapping_add(carry))?;
            while self.follow_count > 0 {
                self.out_stream.write_u8(0xFFu8.wrapping_add(carry))?;
                self.follow_count -= 1;
            }
            self.cache = (low32 >> 24) as u8;
        } else {
            // a 0xFF byte may still be bumped by a later carry
            self.follow_count += 1;
        }
        self.low = u64::from(low32 << 8);
        Ok(())
    }

    pub fn out_stream(&mut self) -> &mut W {
        &mut self.out_stream
    }

    pub fn get_ref(&self) -> &W {
        &self.out_stream
    }

    pub fn into_inner(self) -> W {
        self.out_stream
    }
}
