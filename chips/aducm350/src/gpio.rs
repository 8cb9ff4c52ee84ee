// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! General purpose I/O.
//!
//! Five ports of up to 16 pins each. Every pin carries a 2-bit function
//! select in GPCON; function 0 is plain GPIO on most pins. Pin interrupts
//! are routed to one of two NVIC lines (group A or B), with a shared
//! per-pin polarity select.

use crate::utilities::cells::OptionalCell;
use crate::utilities::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite, WriteOnly};
use tock_registers::register_structs;

register_structs! {
    GpioRegisters {
        /// Pin function select, two bits per pin
        (0x00 => gpcon: ReadWrite<u32>),
        (0x04 => gpoen: ReadWrite<u16>),
        (0x06 => _reserved0),
        (0x08 => gppe: ReadWrite<u16>),
        (0x0a => _reserved1),
        (0x0c => gpien: ReadWrite<u16>),
        (0x0e => _reserved2),
        (0x10 => gpin: ReadOnly<u16>),
        (0x12 => _reserved3),
        (0x14 => gpout: ReadWrite<u16>),
        (0x16 => _reserved4),
        (0x18 => gpset: WriteOnly<u16>),
        (0x1a => _reserved5),
        (0x1c => gpclr: WriteOnly<u16>),
        (0x1e => _reserved6),
        (0x20 => gptgl: WriteOnly<u16>),
        (0x22 => _reserved7),
        (0x24 => gppol: ReadWrite<u16>),
        (0x26 => _reserved8),
        (0x28 => gpiena: ReadWrite<u16>),
        (0x2a => _reserved9),
        (0x2c => gpienb: ReadWrite<u16>),
        (0x2e => _reserved10),
        /// Interrupt status, write-one-to-clear
        (0x30 => gpint: ReadWrite<u16>),
        (0x32 => @END),
    }
}

const GPIO_BASES: [StaticRef<GpioRegisters>; 5] = unsafe {
    [
        StaticRef::new(0x4002_0000 as *const GpioRegisters),
        StaticRef::new(0x4002_0040 as *const GpioRegisters),
        StaticRef::new(0x4002_0080 as *const GpioRegisters),
        StaticRef::new(0x4002_00c0 as *const GpioRegisters),
        StaticRef::new(0x4002_0100 as *const GpioRegisters),
    ]
};

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PortId {
    P0 = 0,
    P1 = 1,
    P2 = 2,
    P3 = 3,
    P4 = 4,
}

/// Pin position within a port.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pin {
    Pin00 = 0,
    Pin01 = 1,
    Pin02 = 2,
    Pin03 = 3,
    Pin04 = 4,
    Pin05 = 5,
    Pin06 = 6,
    Pin07 = 7,
    Pin08 = 8,
    Pin09 = 9,
    Pin10 = 10,
    Pin11 = 11,
    Pin12 = 12,
    Pin13 = 13,
    Pin14 = 14,
    Pin15 = 15,
}

impl Pin {
    fn mask(self) -> u16 {
        1 << (self as u16)
    }
}

/// GPCON function select for one pin.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinFunction {
    F0 = 0,
    F1 = 1,
    F2 = 2,
    F3 = 3,
}

/// The NVIC line a pin interrupt is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InterruptGroup {
    A,
    B,
}

pub trait PinClient {
    /// A pin interrupt fired on this port.
    fn fired(&self, pin: Pin);
}

pub struct Port<'a> {
    registers: StaticRef<GpioRegisters>,
    client: OptionalCell<&'a dyn PinClient>,
}

impl<'a> Port<'a> {
    pub const fn new(port: PortId) -> Port<'a> {
        Port {
            registers: GPIO_BASES[port as usize],
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn PinClient) {
        self.client.set(client);
    }

    pub fn set_pin_function(&self, pin: Pin, function: PinFunction) {
        let shift = 2 * (pin as u32);
        let con = self.registers.gpcon.get();
        self.registers
            .gpcon
            .set((con & !(0b11 << shift)) | ((function as u32) << shift));
    }

    pub fn enable_output(&self, pin: Pin) {
        let oen = self.registers.gpoen.get();
        self.registers.gpoen.set(oen | pin.mask());
    }

    pub fn disable_output(&self, pin: Pin) {
        let oen = self.registers.gpoen.get();
        self.registers.gpoen.set(oen & !pin.mask());
    }

    /// Connect the pin to the input path. Unconnected inputs read zero.
    pub fn enable_input(&self, pin: Pin) {
        let ien = self.registers.gpien.get();
        self.registers.gpien.set(ien | pin.mask());
    }

    pub fn disable_input(&self, pin: Pin) {
        let ien = self.registers.gpien.get();
        self.registers.gpien.set(ien & !pin.mask());
    }

    /// The pull resistor direction follows the output driver type set in
    /// hardware; this only switches the resistor on.
    pub fn enable_pull(&self, pin: Pin) {
        let pe = self.registers.gppe.get();
        self.registers.gppe.set(pe | pin.mask());
    }

    pub fn disable_pull(&self, pin: Pin) {
        let pe = self.registers.gppe.get();
        self.registers.gppe.set(pe & !pin.mask());
    }

    pub fn set(&self, pin: Pin) {
        self.registers.gpset.set(pin.mask());
    }

    pub fn clear(&self, pin: Pin) {
        self.registers.gpclr.set(pin.mask());
    }

    pub fn toggle(&self, pin: Pin) {
        self.registers.gptgl.set(pin.mask());
    }

    pub fn read(&self, pin: Pin) -> bool {
        self.registers.gpin.get() & pin.mask() != 0
    }

    pub fn is_output_set(&self, pin: Pin) -> bool {
        self.registers.gpout.get() & pin.mask() != 0
    }

    /// Interrupt on the rising edge when `rising` is set, falling edge
    /// otherwise.
    pub fn set_interrupt_polarity(&self, pin: Pin, rising: bool) {
        let pol = self.registers.gppol.get();
        if rising {
            self.registers.gppol.set(pol | pin.mask());
        } else {
            self.registers.gppol.set(pol & !pin.mask());
        }
    }

    pub fn enable_interrupt(&self, pin: Pin, group: InterruptGroup) {
        match group {
            InterruptGroup::A => {
                let ena = self.registers.gpiena.get();
                self.registers.gpiena.set(ena | pin.mask());
            }
            InterruptGroup::B => {
                let enb = self.registers.gpienb.get();
                self.registers.gpienb.set(enb | pin.mask());
            }
        }
    }

    pub fn disable_interrupt(&self, pin: Pin) {
        let ena = self.registers.gpiena.get();
        self.registers.gpiena.set(ena & !pin.mask());
        let enb = self.registers.gpienb.get();
        self.registers.gpienb.set(enb & !pin.mask());
    }

    pub fn handle_interrupt(&self) {
        let fired = self.registers.gpint.get();
        // Write-one-to-clear before dispatching so a new edge during the
        // callback is not lost.
        self.registers.gpint.set(fired);
        for pin in 0..16u16 {
            if fired & (1 << pin) != 0 {
                // Pin indices 0..16 always map to a variant.
                let pin = match pin {
                    0 => Pin::Pin00,
                    1 => Pin::Pin01,
                    2 => Pin::Pin02,
                    3 => Pin::Pin03,
                    4 => Pin::Pin04,
                    5 => Pin::Pin05,
                    6 => Pin::Pin06,
                    7 => Pin::Pin07,
                    8 => Pin::Pin08,
                    9 => Pin::Pin09,
                    10 => Pin::Pin10,
                    11 => Pin::Pin11,
                    12 => Pin::Pin12,
                    13 => Pin::Pin13,
                    14 => Pin::Pin14,
                    _ => Pin::Pin15,
                };
                self.client.map(|client| client.fired(pin));
            }
        }
    }
}
