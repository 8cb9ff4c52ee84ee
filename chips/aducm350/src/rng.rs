// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Random bit generator.
//!
//! The generator accumulates ring-oscillator jitter over a programmable
//! sample window (a 12-bit reload scaled by a 4-bit prescaler) and
//! raises RNGRDY when a 16-bit sample is available. An optional
//! oscillator counter exposes the raw entropy-source count for health
//! checks.

use crate::utilities::cells::OptionalCell;
use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    RngRegisters {
        (0x00 => ctl: ReadWrite<u16, CTL::Register>),
        (0x02 => _reserved0),
        (0x04 => len: ReadWrite<u16, LEN::Register>),
        (0x06 => _reserved1),
        (0x08 => stat: ReadWrite<u16, STAT::Register>),
        (0x0a => _reserved2),
        (0x0c => data: ReadOnly<u16>),
        (0x0e => _reserved3),
        /// Oscillator count, low 16 bits
        (0x10 => cntl: ReadOnly<u16>),
        (0x12 => _reserved4),
        /// Oscillator count, high 4 bits
        (0x14 => cnth: ReadOnly<u16>),
        (0x16 => @END),
    }
}

register_bitfields![u16,
    CTL [
        EN OFFSET(0) NUMBITS(1) [],
        /// Timer-gated sampling instead of free running
        TMRMODE OFFSET(1) NUMBITS(1) [],
        /// Count oscillator cycles during the sample window
        CNTEN OFFSET(2) NUMBITS(1) []
    ],
    LEN [
        /// Sample window reload value
        RELOAD OFFSET(0) NUMBITS(12) [],
        /// Window prescaler, scales the reload by 2^n
        PRESCALE OFFSET(12) NUMBITS(4) []
    ],
    STAT [
        /// Sample ready, write-one-to-clear
        RNGRDY OFFSET(0) NUMBITS(1) []
    ]
];

const RNG_BASE: StaticRef<RngRegisters> =
    unsafe { StaticRef::new(0x4000_6000 as *const RngRegisters) };

pub const MAX_SAMPLE_RELOAD: u16 = 0xfff;
pub const MAX_SAMPLE_PRESCALE: u16 = 0xf;

fn check_sample_length(reload: u16, prescale: u16) -> Result<(), crate::ErrorCode> {
    if reload > MAX_SAMPLE_RELOAD || prescale > MAX_SAMPLE_PRESCALE {
        return Err(crate::ErrorCode::INVAL);
    }
    Ok(())
}

pub trait RngClient {
    /// A 16-bit sample became available.
    fn random_ready(&self, sample: u16);
}

pub struct Rng<'a> {
    registers: StaticRef<RngRegisters>,
    client: OptionalCell<&'a dyn RngClient>,
}

impl<'a> Rng<'a> {
    pub const fn new() -> Rng<'a> {
        Rng {
            registers: RNG_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn RngClient) {
        self.client.set(client);
    }

    pub fn enable(&self) {
        self.registers.ctl.modify(CTL::TMRMODE::SET + CTL::EN::SET);
    }

    pub fn disable(&self) {
        self.registers.ctl.modify(CTL::EN::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.registers.ctl.is_set(CTL::EN)
    }

    /// Length of the accumulation window: `reload` counts scaled by
    /// `2^prescale`.
    pub fn set_sample_length(&self, reload: u16, prescale: u16) -> Result<(), crate::ErrorCode> {
        check_sample_length(reload, prescale)?;
        self.registers
            .len
            .write(LEN::RELOAD.val(reload) + LEN::PRESCALE.val(prescale));
        Ok(())
    }

    pub fn set_oscillator_counter(&self, enable: bool) {
        self.registers.ctl.modify(if enable {
            CTL::CNTEN::SET
        } else {
            CTL::CNTEN::CLEAR
        });
    }

    pub fn is_ready(&self) -> bool {
        self.registers.stat.is_set(STAT::RNGRDY)
    }

    /// Consume the pending sample. The ready flag is cleared so the next
    /// window starts accumulating.
    pub fn read_sample(&self) -> Result<u16, crate::ErrorCode> {
        if !self.is_ready() {
            return Err(crate::ErrorCode::BUSY);
        }
        let sample = self.registers.data.get();
        self.registers.stat.write(STAT::RNGRDY::SET);
        Ok(sample)
    }

    /// The 20-bit oscillator count behind the pending sample. Only
    /// meaningful while a sample is ready and the counter is enabled.
    pub fn oscillator_count(&self) -> Result<u32, crate::ErrorCode> {
        if !self.registers.ctl.is_set(CTL::CNTEN) || !self.is_ready() {
            return Err(crate::ErrorCode::INVAL);
        }
        let low = u32::from(self.registers.cntl.get());
        let high = u32::from(self.registers.cnth.get() & 0xf);
        Ok((high << 16) | low)
    }

    pub fn handle_interrupt(&self) {
        if self.is_ready() {
            let sample = self.registers.data.get();
            self.registers.stat.write(STAT::RNGRDY::SET);
            self.client.map(|client| client.random_ready(sample));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::check_sample_length;
    use crate::ErrorCode;

    #[test]
    fn sample_length_limits() {
        // The window fields are 12 and 4 bits wide.
        assert!(check_sample_length(0, 0).is_ok());
        assert!(check_sample_length(0xfff, 0xf).is_ok());
        assert_eq!(check_sample_length(0x1000, 0), Err(ErrorCode::INVAL));
        assert_eq!(check_sample_length(0, 0x10), Err(ErrorCode::INVAL));
    }
}
