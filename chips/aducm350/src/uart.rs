// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! 16550-style UART.
//!
//! The baud rate comes from a 16-bit integer divider plus a fractional
//! divider (M + N/2048) so standard rates are reachable from the 16 MHz
//! core clock. The UART clock gate lives in [`crate::sysclk`].

use core::cell::Cell;

use crate::utilities::cells::{OptionalCell, TakeCell};
use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{Aliased, ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    UartRegisters {
        /// Receive buffer (read) / transmit holding (write)
        (0x00 => rx_tx: Aliased<u16>),
        (0x02 => _reserved0),
        (0x04 => ien: ReadWrite<u16, IEN::Register>),
        (0x06 => _reserved1),
        (0x08 => iir: ReadOnly<u16, IIR::Register>),
        (0x0a => _reserved2),
        (0x0c => lcr: ReadWrite<u16, LCR::Register>),
        (0x0e => _reserved3),
        (0x10 => mcr: ReadWrite<u16, MCR::Register>),
        (0x12 => _reserved4),
        (0x14 => lsr: ReadOnly<u16, LSR::Register>),
        (0x16 => _reserved5),
        (0x18 => msr: ReadOnly<u16>),
        (0x1a => _reserved6),
        /// Scratch byte, no hardware function
        (0x1c => scr: ReadWrite<u16>),
        (0x1e => _reserved7),
        (0x24 => fbr: ReadWrite<u16, FBR::Register>),
        (0x26 => _reserved8),
        (0x28 => div: ReadWrite<u16>),
        (0x2a => _reserved9),
        (0x30 => con: ReadWrite<u8, CON::Register>),
        (0x31 => @END),
    }
}

register_bitfields![u16,
    IEN [
        /// Receive buffer full interrupt enable
        ERBFI OFFSET(0) NUMBITS(1) [],
        /// Transmit buffer empty interrupt enable
        ETBEI OFFSET(1) NUMBITS(1) [],
        /// Line status interrupt enable
        ELSI OFFSET(2) NUMBITS(1) [],
        /// Modem status interrupt enable
        EDSSI OFFSET(3) NUMBITS(1) [],
        /// DMA requests for transmit
        EDMAT OFFSET(4) NUMBITS(1) [],
        /// DMA requests for receive
        EDMAR OFFSET(5) NUMBITS(1) []
    ],
    IIR [
        /// Clear when an interrupt is pending
        NIRQ OFFSET(0) NUMBITS(1) [],
        STA OFFSET(1) NUMBITS(2) [
            ModemStatus = 0,
            TransmitEmpty = 1,
            ReceiveFull = 2,
            LineStatus = 3
        ]
    ],
    LCR [
        WLS OFFSET(0) NUMBITS(2) [
            Bits5 = 0,
            Bits6 = 1,
            Bits7 = 2,
            Bits8 = 3
        ],
        /// Extra stop bit(s)
        STOP OFFSET(2) NUMBITS(1) [],
        PEN OFFSET(3) NUMBITS(1) [],
        /// Even parity select
        EPS OFFSET(4) NUMBITS(1) [],
        /// Stick parity
        SP OFFSET(5) NUMBITS(1) [],
        /// Force break on the TX line
        BRK OFFSET(6) NUMBITS(1) []
    ],
    MCR [
        DTR OFFSET(0) NUMBITS(1) [],
        RTS OFFSET(1) NUMBITS(1) [],
        OUT1 OFFSET(2) NUMBITS(1) [],
        OUT2 OFFSET(3) NUMBITS(1) [],
        LOOPBACK OFFSET(4) NUMBITS(1) []
    ],
    LSR [
        /// Data ready
        DR OFFSET(0) NUMBITS(1) [],
        /// Overrun error
        OE OFFSET(1) NUMBITS(1) [],
        /// Parity error
        PE OFFSET(2) NUMBITS(1) [],
        /// Framing error
        FE OFFSET(3) NUMBITS(1) [],
        /// Break indicator
        BI OFFSET(4) NUMBITS(1) [],
        /// Transmit holding register empty
        THRE OFFSET(5) NUMBITS(1) [],
        /// Transmitter fully idle
        TEMT OFFSET(6) NUMBITS(1) []
    ],
    FBR [
        /// Fractional divider N, baud = clock / (M + N/2048) / (16 DIV)
        DIVN OFFSET(0) NUMBITS(11) [],
        /// Fractional divider M, 1..=3
        DIVM OFFSET(11) NUMBITS(2) [],
        /// Fractional baud generator enable
        FBEN OFFSET(15) NUMBITS(1) []
    ]
];

register_bitfields![u8,
    CON [
        /// Gate the UART internal clock off
        DISABLE OFFSET(0) NUMBITS(1) []
    ]
];

const UART_BASE: StaticRef<UartRegisters> =
    unsafe { StaticRef::new(0x4000_5000 as *const UartRegisters) };

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordLength {
    Bits5,
    Bits6,
    Bits7,
    Bits8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UartParams {
    pub word_length: WordLength,
    pub two_stop_bits: bool,
    pub parity: Parity,
    /// 16-bit integer baud divider, nonzero
    pub divider: u16,
    /// Fractional divider M (1..=3) and N (0..=2047)
    pub frac_m: u16,
    pub frac_n: u16,
}

pub trait UartClient {
    /// An interrupt-driven transmit finished; the buffer comes back.
    fn transmit_complete(&self, buffer: &'static mut [u8], len: usize);
    /// A byte arrived.
    fn received(&self, byte: u8);
    /// A line error (overrun, parity, framing or break) was flagged.
    fn line_error(&self);
}

pub struct Uart<'a> {
    registers: StaticRef<UartRegisters>,
    client: OptionalCell<&'a dyn UartClient>,
    tx_buffer: TakeCell<'static, [u8]>,
    tx_position: Cell<usize>,
    tx_len: Cell<usize>,
}

impl<'a> Uart<'a> {
    pub const fn new() -> Uart<'a> {
        Uart {
            registers: UART_BASE,
            client: OptionalCell::empty(),
            tx_buffer: TakeCell::empty(),
            tx_position: Cell::new(0),
            tx_len: Cell::new(0),
        }
    }

    pub fn set_client(&self, client: &'a dyn UartClient) {
        self.client.set(client);
    }

    pub fn configure(&self, params: UartParams) -> Result<(), crate::ErrorCode> {
        if params.divider == 0 || params.frac_m == 0 || params.frac_m > 3 || params.frac_n > 2047 {
            return Err(crate::ErrorCode::INVAL);
        }

        self.registers.con.modify(CON::DISABLE::CLEAR);

        let wls = match params.word_length {
            WordLength::Bits5 => LCR::WLS::Bits5,
            WordLength::Bits6 => LCR::WLS::Bits6,
            WordLength::Bits7 => LCR::WLS::Bits7,
            WordLength::Bits8 => LCR::WLS::Bits8,
        };
        let parity = match params.parity {
            Parity::None => LCR::PEN::CLEAR + LCR::EPS::CLEAR,
            Parity::Odd => LCR::PEN::SET + LCR::EPS::CLEAR,
            Parity::Even => LCR::PEN::SET + LCR::EPS::SET,
        };
        let stop = if params.two_stop_bits {
            LCR::STOP::SET
        } else {
            LCR::STOP::CLEAR
        };
        self.registers.lcr.write(wls + parity + stop);

        self.registers.div.set(params.divider);
        self.registers.fbr.write(
            FBR::FBEN::SET + FBR::DIVM.val(params.frac_m) + FBR::DIVN.val(params.frac_n),
        );
        Ok(())
    }

    pub fn enable_receive_interrupt(&self) {
        self.registers.ien.modify(IEN::ERBFI::SET);
    }

    pub fn disable_receive_interrupt(&self) {
        self.registers.ien.modify(IEN::ERBFI::CLEAR);
    }

    pub fn enable_transmit_interrupt(&self) {
        self.registers.ien.modify(IEN::ETBEI::SET);
    }

    pub fn disable_transmit_interrupt(&self) {
        self.registers.ien.modify(IEN::ETBEI::CLEAR);
    }

    /// Write one byte, spinning until the holding register drains.
    pub fn transmit_byte_blocking(&self, byte: u8) {
        while !self.registers.lsr.is_set(LSR::THRE) {}
        self.registers.rx_tx.set(byte as u16);
    }

    /// Send `len` bytes of `buffer` interrupt-driven. The buffer comes
    /// back through [`UartClient::transmit_complete`].
    pub fn transmit_buffer(
        &self,
        buffer: &'static mut [u8],
        len: usize,
    ) -> Result<(), (crate::ErrorCode, &'static mut [u8])> {
        if len == 0 || len > buffer.len() {
            return Err((crate::ErrorCode::SIZE, buffer));
        }
        if self.tx_buffer.is_some() {
            return Err((crate::ErrorCode::BUSY, buffer));
        }
        // Prime the holding register; the rest drains from the
        // transmit-empty interrupt.
        self.registers.rx_tx.set(buffer[0] as u16);
        self.tx_position.set(1);
        self.tx_len.set(len);
        self.tx_buffer.put(Some(buffer));
        self.enable_transmit_interrupt();
        Ok(())
    }

    fn continue_transmit(&self) {
        let position = self.tx_position.get();
        if position < self.tx_len.get() {
            self.tx_buffer.map(|buffer| {
                self.registers.rx_tx.set(buffer[position] as u16);
            });
            self.tx_position.set(position + 1);
        } else if let Some(buffer) = self.tx_buffer.take() {
            self.disable_transmit_interrupt();
            let len = self.tx_len.get();
            self.client.map(|client| client.transmit_complete(buffer, len));
        }
    }

    /// Fetch a received byte if one is waiting.
    pub fn receive_byte(&self) -> Result<u8, crate::ErrorCode> {
        if self.registers.lsr.is_set(LSR::DR) {
            Ok(self.registers.rx_tx.get() as u8)
        } else {
            Err(crate::ErrorCode::BUSY)
        }
    }

    pub fn transmitter_empty(&self) -> bool {
        self.registers.lsr.is_set(LSR::TEMT)
    }

    pub fn has_line_error(&self) -> bool {
        let lsr = self.registers.lsr.extract();
        lsr.is_set(LSR::OE) || lsr.is_set(LSR::PE) || lsr.is_set(LSR::FE) || lsr.is_set(LSR::BI)
    }

    pub fn handle_interrupt(&self) {
        let iir = self.registers.iir.extract();
        if iir.is_set(IIR::NIRQ) {
            return;
        }
        match iir.read_as_enum(IIR::STA) {
            Some(IIR::STA::Value::ReceiveFull) => {
                // Reading RX clears the interrupt.
                let byte = self.registers.rx_tx.get() as u8;
                self.client.map(|client| client.received(byte));
            }
            Some(IIR::STA::Value::TransmitEmpty) => {
                self.continue_transmit();
            }
            Some(IIR::STA::Value::LineStatus) => {
                // Reading LSR clears the flags.
                let _ = self.registers.lsr.get();
                self.client.map(|client| client.line_error());
            }
            Some(IIR::STA::Value::ModemStatus) => {
                let _ = self.registers.msr.get();
            }
            None => {}
        }
    }
}
