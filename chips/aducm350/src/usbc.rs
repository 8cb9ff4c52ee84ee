// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Shim for the MUSBMHDRC USB 2.0 controller.
//!
//! This is the register plumbing and event dispatch for device mode
//! only: soft connect, address assignment, bus event and endpoint-zero
//! interrupt routing to a [`Client`]. Endpoint data transfer engines
//! sit above this layer.
//!
//! The endpoint control registers at 0x10 are a window: they address
//! the endpoint currently selected in INDEX. All accesses here go
//! through [`Usbc::select_endpoint`] to make the indirection explicit.

use crate::utilities::cells::OptionalCell;
use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::{ReadOnly, ReadWrite};
use tock_registers::{register_bitfields, register_structs};

register_structs! {
    UsbcRegisters {
        /// Device function address
        (0x000 => faddr: ReadWrite<u8>),
        (0x001 => power: ReadWrite<u8, POWER::Register>),
        /// TX endpoint interrupt status, cleared on read
        (0x002 => intrtx: ReadOnly<u16>),
        (0x004 => intrrx: ReadOnly<u16>),
        (0x006 => intrtxe: ReadWrite<u16>),
        (0x008 => intrrxe: ReadWrite<u16>),
        /// Common interrupt status, cleared on read
        (0x00a => irq: ReadOnly<u8, IRQ::Register>),
        (0x00b => ien: ReadWrite<u8, IRQ::Register>),
        (0x00c => frame: ReadOnly<u16>),
        /// Endpoint select for the indexed window below
        (0x00e => index: ReadWrite<u8>),
        (0x00f => testmode: ReadWrite<u8>),
        (0x010 => txmaxp: ReadWrite<u16>),
        /// CSR0 for endpoint 0, TXCSR for the others
        (0x012 => csr0_txcsr: ReadWrite<u16, CSR0::Register>),
        (0x014 => rxmaxp: ReadWrite<u16>),
        (0x016 => rxcsr: ReadWrite<u16>),
        /// COUNT0 for endpoint 0, RXCOUNT for the others
        (0x018 => count0_rxcount: ReadOnly<u16>),
        (0x01a => txtype: ReadWrite<u8>),
        (0x01b => txinterval: ReadWrite<u8>),
        (0x01c => rxtype: ReadWrite<u8>),
        (0x01d => rxinterval: ReadWrite<u8>),
        (0x01e => _reserved0),
        /// Endpoint FIFO windows
        (0x020 => fifo: [ReadWrite<u32>; 4]),
        (0x030 => _reserved1),
        (0x060 => dev_ctl: ReadWrite<u8, DEV_CTL::Register>),
        (0x061 => misc: ReadWrite<u8>),
        (0x062 => _reserved2),
        (0x078 => epinfo: ReadOnly<u8>),
        (0x079 => raminfo: ReadOnly<u8>),
        (0x07a => linkinfo: ReadWrite<u8>),
        (0x07b => _reserved3),
        (0x07d => fs_eof1: ReadWrite<u8>),
        (0x07e => _reserved4),
        (0x07f => soft_rst: ReadWrite<u8, SOFT_RST::Register>),
        (0x080 => _reserved5),
        (0x39c => phy_ctl: ReadWrite<u16>),
        (0x39e => phy_stat: ReadOnly<u16>),
        (0x3a0 => _reserved6),
        (0x3b0 => ram_addr: ReadWrite<u32>),
        (0x3b4 => ram_data: ReadWrite<u32>),
        (0x3b8 => @END),
    }
}

register_bitfields![u8,
    POWER [
        /// Allow the controller to enter suspend
        EN_SUSPM OFFSET(0) NUMBITS(1) [],
        SUSPEND_MODE OFFSET(1) NUMBITS(1) [],
        RESUME OFFSET(2) NUMBITS(1) [],
        /// Bus reset is being signaled
        RESET OFFSET(3) NUMBITS(1) [],
        /// Operating in high speed (read only in device mode)
        HS_MODE OFFSET(4) NUMBITS(1) [],
        /// Negotiate high speed at the next reset
        HS_ENAB OFFSET(5) NUMBITS(1) [],
        /// Present the pull-up to the host
        SOFT_CONN OFFSET(6) NUMBITS(1) [],
        ISO_UPDATE OFFSET(7) NUMBITS(1) []
    ],
    IRQ [
        SUSPEND OFFSET(0) NUMBITS(1) [],
        RESUME OFFSET(1) NUMBITS(1) [],
        /// Reset in device mode, babble in host mode
        RESET_BABBLE OFFSET(2) NUMBITS(1) [],
        SOF OFFSET(3) NUMBITS(1) [],
        CONN OFFSET(4) NUMBITS(1) [],
        DISCON OFFSET(5) NUMBITS(1) [],
        SESS_REQ OFFSET(6) NUMBITS(1) [],
        VBUS_ERR OFFSET(7) NUMBITS(1) []
    ],
    DEV_CTL [
        SESSION OFFSET(0) NUMBITS(1) [],
        HOST_REQ OFFSET(1) NUMBITS(1) [],
        HOST_MODE OFFSET(2) NUMBITS(1) [],
        VBUS OFFSET(3) NUMBITS(2) [],
        LS_DEV OFFSET(5) NUMBITS(1) [],
        FS_DEV OFFSET(6) NUMBITS(1) [],
        B_DEVICE OFFSET(7) NUMBITS(1) []
    ],
    SOFT_RST [
        /// Reset the controller logic
        NRST OFFSET(0) NUMBITS(1) [],
        /// Reset the XCLK domain logic
        NRSTX OFFSET(1) NUMBITS(1) []
    ]
];

register_bitfields![u16,
    CSR0 [
        RXPKTRDY OFFSET(0) NUMBITS(1) [],
        TXPKTRDY OFFSET(1) NUMBITS(1) [],
        /// A STALL handshake was transmitted, write zero to clear
        SENTSTALL OFFSET(2) NUMBITS(1) [],
        DATAEND OFFSET(3) NUMBITS(1) [],
        SETUPEND OFFSET(4) NUMBITS(1) [],
        SENDSTALL OFFSET(5) NUMBITS(1) [],
        SERVICED_RXPKTRDY OFFSET(6) NUMBITS(1) [],
        SERVICED_SETUPEND OFFSET(7) NUMBITS(1) [],
        FLUSH_FIFO OFFSET(8) NUMBITS(1) []
    ]
];

const USBC_BASE: StaticRef<UsbcRegisters> =
    unsafe { StaticRef::new(0x400a_0000 as *const UsbcRegisters) };

/// Events delivered to the layer driving the device function.
pub trait Client {
    fn bus_reset(&self);
    fn bus_suspend(&self);
    fn bus_resume(&self);
    fn start_of_frame(&self, frame: u16);
    /// A SETUP packet is waiting in the endpoint 0 FIFO.
    fn ctrl_setup(&self);
    /// The endpoint 0 IN data was collected by the host.
    fn ctrl_in_complete(&self);
    /// A control transfer ended before its data stage completed.
    fn ctrl_ended_early(&self);
    /// A STALL handshake went out on endpoint 0.
    fn ctrl_stall_sent(&self);
}

pub struct Usbc<'a> {
    registers: StaticRef<UsbcRegisters>,
    client: OptionalCell<&'a dyn Client>,
}

impl<'a> Usbc<'a> {
    pub const fn new() -> Usbc<'a> {
        Usbc {
            registers: USBC_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn Client) {
        self.client.set(client);
    }

    fn select_endpoint(&self, endpoint: u8) {
        self.registers.index.set(endpoint & 0xf);
    }

    /// Reset the controller logic in both clock domains.
    pub fn soft_reset(&self) {
        self.registers
            .soft_rst
            .write(SOFT_RST::NRST::SET + SOFT_RST::NRSTX::SET);
    }

    /// Bring the controller up as a full-speed device function. The
    /// part has no high-speed PHY, so HS negotiation stays off.
    pub fn enable_device(&self) {
        self.soft_reset();
        self.registers
            .power
            .modify(POWER::HS_ENAB::CLEAR + POWER::EN_SUSPM::SET);
        self.registers.ien.write(
            IRQ::SUSPEND::SET + IRQ::RESUME::SET + IRQ::RESET_BABBLE::SET + IRQ::SOF::SET,
        );
        // Endpoint 0 interrupts arrive on TX position 0.
        self.registers.intrtxe.set(1 << 0);
        self.registers.intrrxe.set(0);
    }

    /// Present the pull-up; the host will start enumeration.
    pub fn attach(&self) {
        self.registers.power.modify(POWER::SOFT_CONN::SET);
    }

    pub fn detach(&self) {
        self.registers.power.modify(POWER::SOFT_CONN::CLEAR);
    }

    /// Adopt the address assigned by SET_ADDRESS.
    pub fn set_address(&self, address: u8) -> Result<(), crate::ErrorCode> {
        if address > 127 {
            return Err(crate::ErrorCode::INVAL);
        }
        self.registers.faddr.set(address);
        Ok(())
    }

    pub fn frame_number(&self) -> u16 {
        self.registers.frame.get() & 0x7ff
    }

    /// Hold off or release the endpoint 0 state machine after a SETUP
    /// packet was consumed. `last` flags the end of the data stage.
    pub fn ctrl_setup_serviced(&self, last: bool) {
        self.select_endpoint(0);
        let mut fields = CSR0::SERVICED_RXPKTRDY::SET;
        if last {
            fields += CSR0::DATAEND::SET;
        }
        self.registers.csr0_txcsr.modify(fields);
    }

    pub fn ctrl_stall(&self) {
        self.select_endpoint(0);
        self.registers.csr0_txcsr.modify(CSR0::SENDSTALL::SET);
    }

    pub fn handle_interrupt(&self) {
        // Both status registers clear on read; capture them once.
        let irq = self.registers.irq.extract();
        let intrtx = self.registers.intrtx.get();
        let _ = self.registers.intrrx.get();

        if irq.is_set(IRQ::RESET_BABBLE) {
            self.client.map(|client| client.bus_reset());
        }
        if irq.is_set(IRQ::SUSPEND) {
            self.client.map(|client| client.bus_suspend());
        }
        if irq.is_set(IRQ::RESUME) {
            self.client.map(|client| client.bus_resume());
        }
        if irq.is_set(IRQ::SOF) {
            let frame = self.frame_number();
            self.client.map(|client| client.start_of_frame(frame));
        }

        if intrtx & 1 != 0 {
            self.handle_ep0();
        }
    }

    fn handle_ep0(&self) {
        self.select_endpoint(0);
        let csr0 = self.registers.csr0_txcsr.extract();

        if csr0.is_set(CSR0::SENTSTALL) {
            self.registers.csr0_txcsr.modify(CSR0::SENTSTALL::CLEAR);
            self.client.map(|client| client.ctrl_stall_sent());
        }
        if csr0.is_set(CSR0::SETUPEND) {
            self.registers
                .csr0_txcsr
                .modify(CSR0::SERVICED_SETUPEND::SET);
            self.client.map(|client| client.ctrl_ended_early());
        }
        if csr0.is_set(CSR0::RXPKTRDY) {
            self.client.map(|client| client.ctrl_setup());
        } else if !csr0.is_set(CSR0::TXPKTRDY) {
            // EP0 interrupt with no packet pending: the IN load was
            // collected by the host.
            self.client.map(|client| client.ctrl_in_complete());
        }
    }
}
