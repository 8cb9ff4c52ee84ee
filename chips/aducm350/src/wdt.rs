// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Watchdog timer (T3).
//!
//! A 16-bit down counter clocked from LFOSC. On timeout it either
//! resets the part or raises an interrupt, selected by T3CON.IRQ. The
//! kick is a keyed write of 0xCCCC to T3CLRI. Writes to LD, CLRI and
//! CON synchronize into the watchdog clock domain; a write issued while
//! the matching T3STA sync bit is still set is ignored by the hardware,
//! so each of those writes waits for its bit to clear first.

use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    WdtRegisters {
        (0x00 => t3ld: ReadWrite<u16>),
        (0x02 => _reserved0),
        (0x04 => t3val: ReadOnly<u16>),
        (0x06 => _reserved1),
        (0x08 => t3con: ReadWrite<u16, T3CON::Register>),
        (0x0a => _reserved2),
        /// Kick register; only the key value 0xCCCC restarts the count
        (0x0c => t3clri: WriteOnly<u16>),
        (0x0e => _reserved3),
        (0x10 => t3rcr: ReadWrite<u16>),
        (0x12 => _reserved4),
        /// Count value readable across the clock domain
        (0x14 => t3vala: ReadOnly<u16>),
        (0x16 => _reserved5),
        (0x18 => t3sta: ReadOnly<u16, T3STA::Register>),
        (0x1a => @END),
    }
}

register_bitfields![u16,
    T3CON [
        /// Timeout raises an interrupt instead of resetting the part
        IRQ OFFSET(1) NUMBITS(1) [],
        PRE OFFSET(2) NUMBITS(2) [
            Div1 = 0,
            Div16 = 1,
            Div256 = 2,
            Div4096 = 3
        ],
        ENABLE OFFSET(5) NUMBITS(1) [],
        /// Periodic (reload) instead of free running
        MOD OFFSET(6) NUMBITS(1) []
    ],
    T3STA [
        /// A T3CLRI write is still synchronizing
        CLRI OFFSET(0) NUMBITS(1) [],
        /// A T3LD write is still synchronizing
        LD OFFSET(1) NUMBITS(1) [],
        /// A T3CON write is still synchronizing
        CON OFFSET(2) NUMBITS(1) [],
        /// Control writes are locked out (watchdog armed)
        LOCK OFFSET(3) NUMBITS(1) []
    ]
];

const WDT_BASE: StaticRef<WdtRegisters> =
    unsafe { StaticRef::new(0x4000_2580 as *const WdtRegisters) };

/// T3CLRI value that restarts the watchdog count. Any other value is a
/// watchdog violation.
const KICK_KEY: u16 = 0xcccc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WdtPrescaler {
    Div1,
    Div16,
    Div256,
    Div4096,
}

pub struct Wdt {
    registers: StaticRef<WdtRegisters>,
}

impl Wdt {
    pub const fn new() -> Wdt {
        Wdt {
            registers: WDT_BASE,
        }
    }

    fn wait_con_sync(&self) {
        while self.registers.t3sta.is_set(T3STA::CON) {}
    }

    /// Once armed with LOCK set further control writes are ignored until
    /// reset; callers check this before attempting reconfiguration.
    pub fn is_locked(&self) -> bool {
        self.registers.t3sta.is_set(T3STA::LOCK)
    }

    pub fn start(&self, load: u16, prescaler: WdtPrescaler) -> Result<(), crate::ErrorCode> {
        if self.is_locked() {
            return Err(crate::ErrorCode::ALREADY);
        }
        while self.registers.t3sta.is_set(T3STA::LD) {}
        self.registers.t3ld.set(load);
        self.wait_con_sync();
        let pre = match prescaler {
            WdtPrescaler::Div1 => T3CON::PRE::Div1,
            WdtPrescaler::Div16 => T3CON::PRE::Div16,
            WdtPrescaler::Div256 => T3CON::PRE::Div256,
            WdtPrescaler::Div4096 => T3CON::PRE::Div4096,
        };
        self.registers.t3con.modify(T3CON::ENABLE::SET + pre);
        Ok(())
    }

    pub fn stop(&self) -> Result<(), crate::ErrorCode> {
        if self.is_locked() {
            return Err(crate::ErrorCode::ALREADY);
        }
        self.wait_con_sync();
        self.registers.t3con.modify(T3CON::ENABLE::CLEAR);
        Ok(())
    }

    /// Timeout behavior: interrupt when `interrupt` is set, reset
    /// otherwise.
    pub fn set_interrupt_mode(&self, interrupt: bool) -> Result<(), crate::ErrorCode> {
        if self.is_locked() {
            return Err(crate::ErrorCode::ALREADY);
        }
        self.wait_con_sync();
        self.registers.t3con.modify(if interrupt {
            T3CON::IRQ::SET
        } else {
            T3CON::IRQ::CLEAR
        });
        Ok(())
    }

    /// Restart the count before it reaches zero.
    pub fn kick(&self) {
        while self.registers.t3sta.is_set(T3STA::CLRI) {}
        self.registers.t3clri.set(KICK_KEY);
    }

    pub fn value(&self) -> u16 {
        self.registers.t3vala.get()
    }
}
