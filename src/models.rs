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

//! Adaptive probability models driven by the arithmetic coder.
//!
//! Symbol models exist in two flavours: [`EncodeSymbolModel`] carries only
//! the scaled cumulative distribution, [`DecodeSymbolModel`] additionally
//! maintains the lookup table that seeds the decoder's bisection search.
//! Encoder and decoder must instantiate the matching flavour with the same
//! alphabet size, otherwise their model state diverges and the stream is
//! garbage; making them distinct types keeps the mix-up from compiling.

// bits of precision kept for the scaled cumulative frequencies
pub(crate) const DM_LENGTH_SHIFT: u32 = 15;
// counts are halved when the total reaches this; together with the
// shift above, scaled totals stay below the coder's BOTTOM bound
pub(crate) const DM_MAX_COUNT: u32 = 1 << DM_LENGTH_SHIFT;

pub(crate) const BM_LENGTH_SHIFT: u32 = 13;
pub(crate) const BM_MAX_COUNT: u32 = 1 << BM_LENGTH_SHIFT;

const _: () = assert!(DM_MAX_COUNT <= crate::decoders::AC_BOTTOM_VALUE);

/// Frequency bookkeeping shared by both symbol model flavours.
#[derive(Debug, Clone)]
struct AdaptiveCounts {
    symbols: u32,
    counts: Vec<u32>,
    total_count: u32,
    update_cycle: u32,
    symbols_until_update: u32,
}

impl AdaptiveCounts {
    fn new(symbols: u32) -> Self {
        assert!(
            (2u32..=(1 << 11)).contains(&symbols),
            "Invalid number of symbols"
        );
        Self {
            symbols,
            counts: vec![1u32; symbols as usize],
            total_count: 0,
            update_cycle: symbols,
            symbols_until_update: 0,
        }
    }

    /// Count one occurrence of `sym`; true when the cumulative
    /// distribution is due for a rebuild.
    fn record(&mut self, sym: u32) -> bool {
        self.counts[sym as usize] += 1;
        self.symbols_until_update -= 1;
        self.symbols_until_update == 0
    }

    /// Fold the pending increments into the total, halving all counts
    /// once the total outgrows the precision window.
    fn accumulate(&mut self) {
        self.total_count += self.update_cycle;
        if self.total_count > DM_MAX_COUNT {
            self.total_count = 0;
            for count in &mut self.counts {
                *count = (*count + 1) >> 1;
                self.total_count += *count;
            }
        }
    }

    /// Rebuilds become rarer as the model matures.
    fn schedule_next_update(&mut self) {
        self.update_cycle = (5 * self.update_cycle) >> 2;
        let max_cycle = (self.symbols + 6) << 3;
        if self.update_cycle > max_cycle {
            self.update_cycle = max_cycle;
        }
        self.symbols_until_update = self.update_cycle;
    }

    /// The first rebuild comes early, while the counts are still fresh.
    fn restart_cadence(&mut self) {
        self.update_cycle = (self.symbols + 6) >> 1;
        self.symbols_until_update = self.update_cycle;
    }
}

/// Adaptive symbol model for the encoding side.
#[derive(Debug, Clone)]
pub struct EncodeSymbolModel {
    counts: AdaptiveCounts,
    pub(crate) distribution: Vec<u32>,
    pub(crate) last_symbol: u32,
}

impl EncodeSymbolModel {
    pub fn new(symbols: u32) -> Self {
        let counts = AdaptiveCounts::new(symbols);
        let mut model = Self {
            counts,
            distribution: vec![0u32; symbols as usize],
            last_symbol: symbols - 1,
        };
        model.update();
        model.counts.restart_cadence();
        model
    }

    pub(crate) fn note_symbol(&mut self, sym: u32) {
        if self.counts.record(sym) {
            self.update();
        }
    }

    fn update(&mut self) {
        self.counts.accumulate();

        // compute the scaled cumulative distribution
        let scale = 0x8000_0000u32 / self.counts.total_count;
        let mut sum = 0u32;
        for (distribution, count) in self.distribution.iter_mut().zip(&self.counts.counts) {
            *distribution = (scale * sum) >> (31 - DM_LENGTH_SHIFT);
            sum += *count;
        }

        self.counts.schedule_next_update();
    }

    #[cfg(test)]
    pub(crate) fn counter_state(&self) -> (&[u32], u32) {
        (&self.counts.counts, self.counts.total_count)
    }
}

/// Adaptive symbol model for the decoding side.
///
/// Over 16 symbols, a lookup table maps the top bits of the decoded
/// cumulative value to a starting interval for the bisection search.
#[derive(Debug, Clone)]
pub struct DecodeSymbolModel {
    counts: AdaptiveCounts,
    pub(crate) distribution: Vec<u32>,
    pub(crate) decoder_table: Vec<u32>,
    pub(crate) last_symbol: u32,
    pub(crate) symbols: u32,
    pub(crate) table_shift: u32,
    table_size: u32,
}

impl DecodeSymbolModel {
    pub fn new(symbols: u32) -> Self {
        let counts = AdaptiveCounts::new(symbols);

        let (table_size, table_shift) = if symbols > 16 {
            let mut table_bits = 3u32;
            while symbols > (1u32 << (table_bits + 2)) {
                table_bits += 1;
            }
            (1u32 << table_bits, DM_LENGTH_SHIFT - table_bits)
        } else {
            (0, 0)
        };

        let decoder_table = if table_size != 0 {
            vec![0u32; (table_size + 2) as usize]
        } else {
            Vec::new()
        };

        let mut model = Self {
            counts,
            distribution: vec![0u32; symbols as usize],
            decoder_table,
            last_symbol: symbols - 1,
            symbols,
            table_shift,
            table_size,
        };
        model.update();
        model.counts.restart_cadence();
        model
    }

    pub(crate) fn note_symbol(&mut self, sym: u32) {
        if self.counts.record(sym) {
            self.update();
        }
    }

    fn update(&mut self) {
        self.counts.accumulate();

        // compute the scaled cumulative distribution, and the decoder
        // table when the alphabet is large enough to warrant one
        let scale = 0x8000_0000u32 / self.counts.total_count;
        let mut sum = 0u32;

        if self.decoder_table.is_empty() {
            for (distribution, count) in self.distribution.iter_mut().zip(&self.counts.counts) {
                *distribution = (scale * sum) >> (31 - DM_LENGTH_SHIFT);
                sum += *count;
            }
        } else {
            let mut s = 0usize;
            for k in 0..self.symbols as usize {
                self.distribution[k] = (scale * sum) >> (31 - DM_LENGTH_SHIFT);
                sum += self.counts.counts[k];

                let w = (self.distribution[k] >> self.table_shift) as usize;
                while s < w {
                    s += 1;
                    self.decoder_table[s] = (k - 1) as u32;
                }
            }
            self.decoder_table[0] = 0;
            while s <= self.table_size as usize {
                s += 1;
                self.decoder_table[s] = self.symbols - 1;
            }
        }

        self.counts.schedule_next_update();
    }

    #[cfg(test)]
    pub(crate) fn counter_state(&self) -> (&[u32], u32) {
        (&self.counts.counts, self.counts.total_count)
    }
}

/// Adaptive model for a single binary decision.
///
/// Cheaper than a 2-symbol [`EncodeSymbolModel`]: only the probability of
/// the zero bit is tracked, at 13 bits of precision.
#[derive(Debug, Clone)]
pub struct BitModel {
    pub(crate) bit_0_count: u32,
    pub(crate) bit_count: u32,
    pub(crate) bit_0_prob: u32,
    pub(crate) bits_until_update: u32,
    update_cycle: u32,
}

impl BitModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn update(&mut self) {
        // halve counts when the threshold is reached
        self.bit_count += self.update_cycle;
        if self.bit_count > BM_MAX_COUNT {
            self.bit_count = (self.bit_count + 1) >> 1;
            self.bit_0_count = (self.bit_0_count + 1) >> 1;
            if self.bit_0_count == self.bit_count {
                self.bit_count += 1;
            }
        }

        // compute the scaled zero-bit probability
        let scale = 0x8000_0000u32 / self.bit_count;
        self.bit_0_prob = (self.bit_0_count * scale) >> (31 - BM_LENGTH_SHIFT);

        self.update_cycle = (5 * self.update_cycle) >> 2;
        if self.update_cycle > 64 {
            self.update_cycle = 64;
        }
        self.bits_until_update = self.update_cycle;
    }
}

impl Default for BitModel {
    fn default() -> Self {
        // equiprobable start, frequent early updates
        Self {
            bit_0_count: 1,
            bit_count: 2,
            bit_0_prob: 1u32 << (BM_LENGTH_SHIFT - 1),
            bits_until_update: 4,
            update_cycle: 4,
        }
    }
}
