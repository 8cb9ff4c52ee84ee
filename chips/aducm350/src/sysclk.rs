// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! System clock control: root clock mux, bus dividers and peripheral
//! clock gates.
//!
//! The 16-bit clock control MMRs sit on 4-byte strides. Gating a
//! peripheral clock stops the PCLK supply of that block only; the
//! register map of the block stays accessible.

use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    SysclkRegisters {
        /// Root clock mux and clock-out select.
        (0x00 => clkcon0: ReadWrite<u16, CLKCON0::Register>),
        (0x02 => _reserved0),
        /// HCLK and PCLK dividers.
        (0x04 => clkcon1: ReadWrite<u16, CLKCON1::Register>),
        (0x06 => _reserved1),
        /// System PLL control.
        (0x0c => clkcon3: ReadWrite<u16, CLKCON3::Register>),
        (0x0e => _reserved2),
        /// USB PLL control.
        (0x10 => clkcon4: ReadWrite<u16, CLKCON4::Register>),
        (0x12 => _reserved3),
        /// Peripheral clock gates. A set bit stops the clock.
        (0x14 => clkcon5: ReadWrite<u16, CLKCON5::Register>),
        (0x16 => _reserved4),
        /// PLL and crystal oscillator status.
        (0x18 => clkstat0: ReadOnly<u16, CLKSTAT0::Register>),
        (0x1a => @END),
    }
}

register_bitfields![u16,
    CLKCON0 [
        /// Root clock source select
        CLKMUX OFFSET(0) NUMBITS(2) [
            Hfosc = 0,
            Spll = 1,
            Lfxtal = 2,
            External = 3
        ],
        /// GPIO clock-out select
        CLKOUT OFFSET(2) NUMBITS(4) []
    ],
    CLKCON1 [
        /// HCLK divider, divide-by-2^n
        CDHCLK OFFSET(0) NUMBITS(3) [],
        /// PCLK divider, divide-by-2^n
        CDPCLK OFFSET(8) NUMBITS(3) []
    ],
    CLKCON3 [
        /// System PLL N divider
        SPLLNSEL OFFSET(0) NUMBITS(5) [],
        /// Divide PLL output by two
        SPLLDIV2 OFFSET(8) NUMBITS(1) [],
        /// System PLL enable
        SPLLEN OFFSET(9) NUMBITS(1) [],
        /// Lock/unlock event interrupt enable
        SPLLIE OFFSET(10) NUMBITS(1) [],
        /// Multiply reference by two before the N divider
        SPLLMUL2 OFFSET(11) NUMBITS(1) []
    ],
    CLKCON4 [
        /// USB PLL N divider
        UPLLNSEL OFFSET(0) NUMBITS(5) [],
        UPLLDIV2 OFFSET(8) NUMBITS(1) [],
        /// USB PLL enable
        UPLLEN OFFSET(9) NUMBITS(1) [],
        UPLLIE OFFSET(10) NUMBITS(1) [],
        UPLLMUL2 OFFSET(11) NUMBITS(1) []
    ],
    CLKCON5 [
        /// SPI0 clock user control, 1 = clock off
        UCLKSPI0OFF OFFSET(0) NUMBITS(1) [],
        UCLKSPI1OFF OFFSET(1) NUMBITS(1) [],
        UCLKSPIHOFF OFFSET(2) NUMBITS(1) [],
        UCLKUARTOFF OFFSET(3) NUMBITS(1) [],
        UCLKI2COFF OFFSET(4) NUMBITS(1) [],
        UCLKI2SOFF OFFSET(5) NUMBITS(1) [],
        UCLKPDIOFF OFFSET(6) NUMBITS(1) []
    ],
    CLKSTAT0 [
        /// System PLL locked
        SPLLSTATUS OFFSET(0) NUMBITS(1) [],
        /// System PLL unlock event since last read
        SPLLUNLOCK OFFSET(1) NUMBITS(1) [],
        /// USB PLL locked
        UPLLSTATUS OFFSET(8) NUMBITS(1) [],
        UPLLUNLOCK OFFSET(9) NUMBITS(1) []
    ]
];

const SYSCLK_BASE: StaticRef<SysclkRegisters> =
    unsafe { StaticRef::new(0x4002_8000 as *const SysclkRegisters) };

/// Peripheral clocks that can be gated off when their block is unused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clock {
    Spi0,
    Spi1,
    Spih,
    Uart,
    I2c,
    I2s,
    Pdi,
}

impl Clock {
    fn gate_mask(self) -> u16 {
        match self {
            Clock::Spi0 => 1 << 0,
            Clock::Spi1 => 1 << 1,
            Clock::Spih => 1 << 2,
            Clock::Uart => 1 << 3,
            Clock::I2c => 1 << 4,
            Clock::I2s => 1 << 5,
            Clock::Pdi => 1 << 6,
        }
    }
}

/// Root clock sources selectable through CLKCON0.CLKMUX.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RootClockSource {
    Hfosc,
    Spll,
    Lfxtal,
    External,
}

pub struct Sysclk {
    registers: StaticRef<SysclkRegisters>,
}

impl Sysclk {
    pub const fn new() -> Sysclk {
        Sysclk {
            registers: SYSCLK_BASE,
        }
    }

    /// Ungate a peripheral clock. The gate bits are active-low enables, so
    /// enabling clears the corresponding off bit.
    pub fn enable_clock(&self, clock: Clock) {
        let con5 = self.registers.clkcon5.get();
        self.registers.clkcon5.set(con5 & !clock.gate_mask());
    }

    pub fn disable_clock(&self, clock: Clock) {
        let con5 = self.registers.clkcon5.get();
        self.registers.clkcon5.set(con5 | clock.gate_mask());
    }

    pub fn is_enabled(&self, clock: Clock) -> bool {
        self.registers.clkcon5.get() & clock.gate_mask() == 0
    }

    pub fn set_root_clock(&self, source: RootClockSource) {
        let mux = match source {
            RootClockSource::Hfosc => CLKCON0::CLKMUX::Hfosc,
            RootClockSource::Spll => CLKCON0::CLKMUX::Spll,
            RootClockSource::Lfxtal => CLKCON0::CLKMUX::Lfxtal,
            RootClockSource::External => CLKCON0::CLKMUX::External,
        };
        self.registers.clkcon0.modify(mux);
    }

    /// HCLK runs at the root clock divided by `2^exp`, `exp` in `0..=7`.
    pub fn set_hclk_divider(&self, exp: u16) -> Result<(), crate::ErrorCode> {
        if exp > 7 {
            return Err(crate::ErrorCode::INVAL);
        }
        self.registers.clkcon1.modify(CLKCON1::CDHCLK.val(exp));
        Ok(())
    }

    /// PCLK runs at the root clock divided by `2^exp`, `exp` in `0..=7`.
    pub fn set_pclk_divider(&self, exp: u16) -> Result<(), crate::ErrorCode> {
        if exp > 7 {
            return Err(crate::ErrorCode::INVAL);
        }
        self.registers.clkcon1.modify(CLKCON1::CDPCLK.val(exp));
        Ok(())
    }

    pub fn spll_locked(&self) -> bool {
        self.registers.clkstat0.is_set(CLKSTAT0::SPLLSTATUS)
    }

    pub fn usb_pll_locked(&self) -> bool {
        self.registers.clkstat0.is_set(CLKSTAT0::UPLLSTATUS)
    }

    pub fn enable_usb_pll(&self) {
        self.registers.clkcon4.modify(CLKCON4::UPLLEN::SET);
    }

    pub fn disable_usb_pll(&self) {
        self.registers.clkcon4.modify(CLKCON4::UPLLEN::CLEAR);
    }
}
