// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! General purpose timers GPT0, GPT1 and GPT2.
//!
//! 16-bit up/down counters with a four-step prescaler, four clock
//! sources, free-running and periodic modes, event capture and a PWM
//! output with programmable match value.
//!
//! The timer runs in its own clock domain. Control writes are
//! synchronized across the domain boundary and are lost if issued while
//! a previous write is still in flight, so every control mutation here
//! first waits for STA.BUSY to clear.

use crate::utilities::cells::OptionalCell;
use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    GptRegisters {
        /// 16-bit load value
        (0x00 => ld: ReadWrite<u16>),
        (0x02 => _reserved0),
        /// Current count
        (0x04 => val: ReadOnly<u16>),
        (0x06 => _reserved1),
        (0x08 => con: ReadWrite<u16, CON::Register>),
        (0x0a => _reserved2),
        /// Interrupt clear
        (0x0c => clri: WriteOnly<u16, CLRI::Register>),
        (0x0e => _reserved3),
        /// Captured count at the selected event
        (0x10 => cap: ReadOnly<u16>),
        (0x12 => _reserved4),
        /// Asynchronous load value (reads back across clock domains)
        (0x14 => ald: ReadWrite<u16>),
        (0x16 => _reserved5),
        (0x18 => aval: ReadOnly<u16>),
        (0x1a => _reserved6),
        (0x1c => sta: ReadOnly<u16, STA::Register>),
        (0x1e => _reserved7),
        /// PWM control
        (0x20 => pcon: ReadWrite<u16, PCON::Register>),
        (0x22 => _reserved8),
        /// PWM match value
        (0x24 => pmat: ReadWrite<u16>),
        (0x26 => @END),
    }
}

register_bitfields![u16,
    CON [
        PRE OFFSET(0) NUMBITS(2) [
            Div1 = 0,
            Div16 = 1,
            Div256 = 2,
            Div32768 = 3
        ],
        /// Count up instead of down
        UP OFFSET(2) NUMBITS(1) [],
        /// Periodic (reload from LD) instead of free running
        MOD OFFSET(3) NUMBITS(1) [],
        ENABLE OFFSET(4) NUMBITS(1) [],
        CLK OFFSET(5) NUMBITS(2) [
            Pclk = 0,
            Hfosc = 1,
            Lfosc = 2,
            Lfxtal = 3
        ],
        /// Reload the counter when the timeout interrupt is cleared
        RLD OFFSET(7) NUMBITS(1) [],
        /// Capture event select
        EVENT OFFSET(8) NUMBITS(5) [],
        EVENTEN OFFSET(13) NUMBITS(1) []
    ],
    CLRI [
        TMOUT OFFSET(0) NUMBITS(1) [],
        CAP OFFSET(1) NUMBITS(1) []
    ],
    STA [
        /// Timeout occurred
        TMOUT OFFSET(0) NUMBITS(1) [],
        /// Capture event occurred
        CAP OFFSET(1) NUMBITS(1) [],
        /// A control write is still synchronizing into the timer domain
        BUSY OFFSET(6) NUMBITS(1) [],
        /// CLRI/LD writes have reached the timer domain
        PDOK OFFSET(7) NUMBITS(1) []
    ],
    PCON [
        /// Toggle the PWM output at the match value
        MATCH OFFSET(0) NUMBITS(1) [],
        /// PWM idles high
        IDLE_HIGH OFFSET(1) NUMBITS(1) []
    ]
];

const GPT0_BASE: StaticRef<GptRegisters> =
    unsafe { StaticRef::new(0x4000_0000 as *const GptRegisters) };
const GPT1_BASE: StaticRef<GptRegisters> =
    unsafe { StaticRef::new(0x4000_0400 as *const GptRegisters) };
const GPT2_BASE: StaticRef<GptRegisters> =
    unsafe { StaticRef::new(0x4000_0800 as *const GptRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prescaler {
    Div1,
    Div16,
    Div256,
    Div32768,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClockSource {
    Pclk,
    Hfosc,
    Lfosc,
    Lfxtal,
}

pub trait GptClient {
    /// The counter wrapped (free running) or hit its reload point
    /// (periodic).
    fn timeout(&self);
    /// The selected capture event fired; `count` is the latched counter
    /// value.
    fn capture(&self, count: u16);
}

pub struct Gpt<'a> {
    registers: StaticRef<GptRegisters>,
    client: OptionalCell<&'a dyn GptClient>,
}

impl<'a> Gpt<'a> {
    pub const fn new_gpt0() -> Gpt<'a> {
        Gpt {
            registers: GPT0_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub const fn new_gpt1() -> Gpt<'a> {
        Gpt {
            registers: GPT1_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub const fn new_gpt2() -> Gpt<'a> {
        Gpt {
            registers: GPT2_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn GptClient) {
        self.client.set(client);
    }

    /// Control writes issued while a previous one is synchronizing into
    /// the timer clock domain are silently dropped by the hardware.
    fn wait_sync(&self) {
        while self.registers.sta.is_set(STA::BUSY) {}
    }

    pub fn enable(&self) {
        self.wait_sync();
        self.registers.con.modify(CON::ENABLE::SET);
    }

    pub fn disable(&self) {
        self.wait_sync();
        self.registers.con.modify(CON::ENABLE::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.registers.con.is_set(CON::ENABLE)
    }

    pub fn set_load(&self, value: u16) {
        self.wait_sync();
        self.registers.ld.set(value);
    }

    pub fn value(&self) -> u16 {
        self.registers.val.get()
    }

    pub fn set_prescaler(&self, prescaler: Prescaler) {
        self.wait_sync();
        let pre = match prescaler {
            Prescaler::Div1 => CON::PRE::Div1,
            Prescaler::Div16 => CON::PRE::Div16,
            Prescaler::Div256 => CON::PRE::Div256,
            Prescaler::Div32768 => CON::PRE::Div32768,
        };
        self.registers.con.modify(pre);
    }

    pub fn set_clock_source(&self, source: ClockSource) {
        self.wait_sync();
        let clk = match source {
            ClockSource::Pclk => CON::CLK::Pclk,
            ClockSource::Hfosc => CON::CLK::Hfosc,
            ClockSource::Lfosc => CON::CLK::Lfosc,
            ClockSource::Lfxtal => CON::CLK::Lfxtal,
        };
        self.registers.con.modify(clk);
    }

    pub fn set_count_up(&self, up: bool) {
        self.wait_sync();
        self.registers
            .con
            .modify(if up { CON::UP::SET } else { CON::UP::CLEAR });
    }

    /// Periodic mode reloads from LD at timeout; free running wraps
    /// through the full 16-bit range.
    pub fn set_periodic(&self, periodic: bool) {
        self.wait_sync();
        self.registers.con.modify(if periodic {
            CON::MOD::SET
        } else {
            CON::MOD::CLEAR
        });
    }

    pub fn set_reload_on_clear(&self, reload: bool) {
        self.wait_sync();
        self.registers.con.modify(if reload {
            CON::RLD::SET
        } else {
            CON::RLD::CLEAR
        });
    }

    /// Latch the counter into CAP when system event `event` (an
    /// interrupt position below 32) fires.
    pub fn enable_event_capture(&self, event: u16) -> Result<(), crate::ErrorCode> {
        if event > 31 {
            return Err(crate::ErrorCode::INVAL);
        }
        self.wait_sync();
        self.registers
            .con
            .modify(CON::EVENT.val(event) + CON::EVENTEN::SET);
        Ok(())
    }

    pub fn disable_event_capture(&self) {
        self.wait_sync();
        self.registers.con.modify(CON::EVENTEN::CLEAR);
    }

    pub fn captured_value(&self) -> u16 {
        self.registers.cap.get()
    }

    pub fn set_pwm_match(&self, match_value: u16, idle_high: bool) {
        self.wait_sync();
        self.registers.pmat.set(match_value);
        self.registers.pcon.write(
            PCON::MATCH::SET
                + if idle_high {
                    PCON::IDLE_HIGH::SET
                } else {
                    PCON::IDLE_HIGH::CLEAR
                },
        );
    }

    pub fn disable_pwm(&self) {
        self.wait_sync();
        self.registers.pcon.set(0);
    }

    pub fn handle_interrupt(&self) {
        let sta = self.registers.sta.extract();
        if sta.is_set(STA::TMOUT) {
            self.registers.clri.write(CLRI::TMOUT::SET);
            self.client.map(|client| client.timeout());
        }
        if sta.is_set(STA::CAP) {
            let count = self.registers.cap.get();
            self.registers.clri.write(CLRI::CAP::SET);
            self.client.map(|client| client.capture(count));
        }
    }
}
