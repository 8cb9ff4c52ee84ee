// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Wakeup timer (T2).
//!
//! A 32-bit counter that keeps running in hibernation, exposed through
//! two 16-bit halves, with four compare fields A through D. Field A can
//! auto-advance by a 12-bit interval every time it matches, giving a
//! periodic wakeup without reprogramming.

use crate::utilities::cells::OptionalCell;
use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    WutRegisters {
        /// Counter low half
        (0x00 => t2val0: ReadOnly<u16>),
        (0x02 => _reserved0),
        /// Counter high half
        (0x04 => t2val1: ReadOnly<u16>),
        (0x06 => _reserved1),
        (0x08 => t2con: ReadWrite<u16, T2CON::Register>),
        (0x0a => _reserved2),
        /// 12-bit interval added to compare field A on each match
        (0x0c => t2inc: ReadWrite<u16>),
        (0x0e => _reserved3),
        (0x10 => wufb0: ReadWrite<u16>),
        (0x12 => _reserved4),
        (0x14 => wufb1: ReadWrite<u16>),
        (0x16 => _reserved5),
        (0x18 => wufc0: ReadWrite<u16>),
        (0x1a => _reserved6),
        (0x1c => wufc1: ReadWrite<u16>),
        (0x1e => _reserved7),
        (0x20 => wufd0: ReadWrite<u16>),
        (0x22 => _reserved8),
        (0x24 => wufd1: ReadWrite<u16>),
        (0x26 => _reserved9),
        (0x28 => t2ien: ReadWrite<u16, INT::Register>),
        (0x2a => _reserved10),
        (0x2c => t2sta: ReadOnly<u16, INT::Register>),
        (0x2e => _reserved11),
        (0x30 => t2clri: WriteOnly<u16, INT::Register>),
        (0x32 => _reserved12),
        /// Counter low half latched when FREEZE is set
        (0x34 => wutval_low: ReadOnly<u16>),
        (0x36 => _reserved13),
        (0x38 => wutval_high: ReadOnly<u16>),
        (0x3a => _reserved14),
        (0x3c => wufa0: ReadWrite<u16>),
        (0x3e => _reserved15),
        (0x40 => wufa1: ReadWrite<u16>),
        (0x42 => @END),
    }
}

register_bitfields![u16,
    T2CON [
        PRE OFFSET(0) NUMBITS(2) [
            Div1 = 0,
            Div16 = 1,
            Div256 = 2,
            Div32768 = 3
        ],
        /// Reading T2VAL0 latches T2VAL1 until it is read
        FREEZE OFFSET(3) NUMBITS(1) [],
        /// Periodic mode: count to field D then restart
        MOD OFFSET(6) NUMBITS(1) [],
        ENABLE OFFSET(7) NUMBITS(1) [],
        /// Allow timer events to wake the part
        WUEN OFFSET(8) NUMBITS(1) [],
        CLK OFFSET(9) NUMBITS(2) [
            Pclk = 0,
            Lfxtal = 1,
            Lfosc = 2,
            ExternalClock = 3
        ],
        /// Stop the field A auto-increment
        STOPINC OFFSET(11) NUMBITS(1) []
    ],
    INT [
        WUFA OFFSET(0) NUMBITS(1) [],
        WUFB OFFSET(1) NUMBITS(1) [],
        WUFC OFFSET(2) NUMBITS(1) [],
        WUFD OFFSET(3) NUMBITS(1) [],
        ROLL OFFSET(4) NUMBITS(1) []
    ]
];

const WUT_BASE: StaticRef<WutRegisters> =
    unsafe { StaticRef::new(0x4000_2500 as *const WutRegisters) };

/// Compare fields of the wakeup timer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompareField {
    A,
    B,
    C,
    D,
}

pub trait WutClient {
    /// Compare field `field` matched the counter.
    fn comparator(&self, field: CompareField);
    /// The 32-bit counter rolled over.
    fn rollover(&self);
}

/// Combine the two 16-bit counter halves into the 32-bit count.
fn combine(high: u16, low: u16) -> u32 {
    (u32::from(high) << 16) | u32::from(low)
}

pub struct Wut<'a> {
    registers: StaticRef<WutRegisters>,
    client: OptionalCell<&'a dyn WutClient>,
}

impl<'a> Wut<'a> {
    pub const fn new() -> Wut<'a> {
        Wut {
            registers: WUT_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn WutClient) {
        self.client.set(client);
    }

    pub fn enable(&self) {
        self.registers.t2con.modify(T2CON::ENABLE::SET);
    }

    pub fn disable(&self) {
        self.registers.t2con.modify(T2CON::ENABLE::CLEAR);
    }

    pub fn set_wakeup_enable(&self, enable: bool) {
        self.registers.t2con.modify(if enable {
            T2CON::WUEN::SET
        } else {
            T2CON::WUEN::CLEAR
        });
    }

    pub fn set_periodic(&self, periodic: bool) {
        self.registers.t2con.modify(if periodic {
            T2CON::MOD::SET
        } else {
            T2CON::MOD::CLEAR
        });
    }

    pub fn set_freeze(&self, freeze: bool) {
        self.registers.t2con.modify(if freeze {
            T2CON::FREEZE::SET
        } else {
            T2CON::FREEZE::CLEAR
        });
    }

    pub fn set_stop_increment(&self, stop: bool) {
        self.registers.t2con.modify(if stop {
            T2CON::STOPINC::SET
        } else {
            T2CON::STOPINC::CLEAR
        });
    }

    pub fn set_prescaler(&self, prescaler: crate::gpt::Prescaler) {
        let pre = match prescaler {
            crate::gpt::Prescaler::Div1 => T2CON::PRE::Div1,
            crate::gpt::Prescaler::Div16 => T2CON::PRE::Div16,
            crate::gpt::Prescaler::Div256 => T2CON::PRE::Div256,
            crate::gpt::Prescaler::Div32768 => T2CON::PRE::Div32768,
        };
        self.registers.t2con.modify(pre);
    }

    /// Read the free-running 32-bit count. The two halves cannot be read
    /// atomically, so the high half is read on both sides of the low half
    /// until it is stable.
    pub fn value(&self) -> u32 {
        loop {
            let high = self.registers.t2val1.get();
            let low = self.registers.t2val0.get();
            if self.registers.t2val1.get() == high {
                return combine(high, low);
            }
        }
    }

    pub fn set_comparator(&self, field: CompareField, value: u32) {
        let low = value as u16;
        let high = (value >> 16) as u16;
        match field {
            CompareField::A => {
                self.registers.wufa0.set(low);
                self.registers.wufa1.set(high);
            }
            CompareField::B => {
                self.registers.wufb0.set(low);
                self.registers.wufb1.set(high);
            }
            CompareField::C => {
                self.registers.wufc0.set(low);
                self.registers.wufc1.set(high);
            }
            CompareField::D => {
                self.registers.wufd0.set(low);
                self.registers.wufd1.set(high);
            }
        }
    }

    /// Interval added to compare field A each time it matches. 12 bits.
    pub fn set_interval_increment(&self, interval: u16) -> Result<(), crate::ErrorCode> {
        if interval > 0xfff {
            return Err(crate::ErrorCode::INVAL);
        }
        self.registers.t2inc.set(interval);
        Ok(())
    }

    pub fn enable_interrupt(&self, field: CompareField) {
        self.registers.t2ien.modify(match field {
            CompareField::A => INT::WUFA::SET,
            CompareField::B => INT::WUFB::SET,
            CompareField::C => INT::WUFC::SET,
            CompareField::D => INT::WUFD::SET,
        });
    }

    pub fn disable_interrupt(&self, field: CompareField) {
        self.registers.t2ien.modify(match field {
            CompareField::A => INT::WUFA::CLEAR,
            CompareField::B => INT::WUFB::CLEAR,
            CompareField::C => INT::WUFC::CLEAR,
            CompareField::D => INT::WUFD::CLEAR,
        });
    }

    pub fn enable_rollover_interrupt(&self) {
        self.registers.t2ien.modify(INT::ROLL::SET);
    }

    pub fn disable_rollover_interrupt(&self) {
        self.registers.t2ien.modify(INT::ROLL::CLEAR);
    }

    pub fn handle_interrupt(&self) {
        let sta = self.registers.t2sta.extract();
        if sta.is_set(INT::WUFA) {
            self.registers.t2clri.write(INT::WUFA::SET);
            self.client.map(|client| client.comparator(CompareField::A));
        }
        if sta.is_set(INT::WUFB) {
            self.registers.t2clri.write(INT::WUFB::SET);
            self.client.map(|client| client.comparator(CompareField::B));
        }
        if sta.is_set(INT::WUFC) {
            self.registers.t2clri.write(INT::WUFC::SET);
            self.client.map(|client| client.comparator(CompareField::C));
        }
        if sta.is_set(INT::WUFD) {
            self.registers.t2clri.write(INT::WUFD::SET);
            self.client.map(|client| client.comparator(CompareField::D));
        }
        if sta.is_set(INT::ROLL) {
            self.registers.t2clri.write(INT::ROLL::SET);
            self.client.map(|client| client.rollover());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::combine;

    #[test]
    fn split_counter_combines() {
        assert_eq!(combine(0x0000, 0x0000), 0);
        assert_eq!(combine(0x0001, 0x0000), 0x0001_0000);
        assert_eq!(combine(0xffff, 0xffff), 0xffff_ffff);
        assert_eq!(combine(0x1234, 0xabcd), 0x1234_abcd);
    }
}
