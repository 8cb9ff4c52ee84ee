// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! PL230 micro-DMA controller.
//!
//! The controller serves 16 channels with fixed peripheral assignments.
//! Each channel has a primary and an alternate transfer descriptor in a
//! RAM-resident control block; the controller reads the descriptors
//! through the primary base pointer register. On top of the stock PL230
//! control set the ADuCM350 adds per-channel byte swap and source /
//! destination address decrement.

use crate::utilities::StaticRef;
use tock_registers::interfaces::{Readable, Writeable};
use tock_registers::registers::{InMemoryRegister, ReadOnly, ReadWrite, WriteOnly};
use tock_registers::{register_bitfields, register_structs};

pub const NUM_CHANNELS: usize = 16;

register_structs! {
    DmaRegisters {
        /// Controller status
        (0x000 => status: ReadOnly<u32, STATUS::Register>),
        /// Controller configuration
        (0x004 => cfg: WriteOnly<u32, CFG::Register>),
        /// Primary control block base pointer
        (0x008 => pdbptr: ReadWrite<u32>),
        /// Alternate control block base pointer, derived from the primary
        (0x00c => adbptr: ReadOnly<u32>),
        (0x010 => _reserved0),
        /// Software transfer request, one bit per channel
        (0x014 => swreq: WriteOnly<u32>),
        (0x018 => _reserved1),
        (0x020 => rmskset: ReadWrite<u32>),
        (0x024 => rmskclr: WriteOnly<u32>),
        (0x028 => enset: ReadWrite<u32>),
        (0x02c => enclr: WriteOnly<u32>),
        (0x030 => altset: ReadWrite<u32>),
        (0x034 => altclr: WriteOnly<u32>),
        (0x038 => priset: ReadWrite<u32>),
        (0x03c => priclr: WriteOnly<u32>),
        (0x040 => _reserved2),
        /// Per-channel error clear, write-one-to-clear
        (0x048 => errchnlclr: ReadWrite<u32>),
        /// Bus error clear, write-one-to-clear
        (0x04c => errclr: ReadWrite<u32>),
        /// Per-channel invalid descriptor clear, write-one-to-clear
        (0x050 => invaliddescclr: ReadWrite<u32>),
        (0x054 => _reserved3),
        /// Byte swap enable set
        (0x800 => bsset: ReadWrite<u32>),
        (0x804 => bsclr: WriteOnly<u32>),
        (0x808 => _reserved4),
        /// Source address decrement enable set
        (0x810 => srcadsset: ReadWrite<u32>),
        (0x814 => srcadclr: WriteOnly<u32>),
        /// Destination address decrement enable set
        (0x818 => dstadset: ReadWrite<u32>),
        (0x81c => dstadclr: WriteOnly<u32>),
        (0x820 => _reserved5),
        (0xfe0 => revid: ReadOnly<u32>),
        (0xfe4 => @END),
    }
}

register_bitfields![u32,
    STATUS [
        MASTER_ENABLE OFFSET(0) NUMBITS(1) [],
        /// Current state of the control state machine
        STATE OFFSET(4) NUMBITS(4) [],
        /// Number of available channels minus one
        CHNLS_MINUS_1 OFFSET(16) NUMBITS(5) []
    ],
    CFG [
        MASTER_ENABLE OFFSET(0) NUMBITS(1) [],
        /// AHB protection control for descriptor fetches
        CHPROT OFFSET(5) NUMBITS(3) []
    ],
    DMA_CTRL [
        CYCLE_CTRL OFFSET(0) NUMBITS(3) [
            Stop = 0,
            Basic = 1,
            AutoRequest = 2,
            PingPong = 3,
            MemoryScatterGatherPrimary = 4,
            MemoryScatterGatherAlternate = 5,
            PeripheralScatterGatherPrimary = 6,
            PeripheralScatterGatherAlternate = 7
        ],
        NEXT_USEBURST OFFSET(3) NUMBITS(1) [],
        /// Total number of transfers minus one
        N_MINUS_1 OFFSET(4) NUMBITS(10) [],
        /// Arbitrate after 2^R_POWER transfers
        R_POWER OFFSET(14) NUMBITS(4) [],
        SRC_PROT OFFSET(18) NUMBITS(3) [],
        DST_PROT OFFSET(21) NUMBITS(3) [],
        SRC_SIZE OFFSET(24) NUMBITS(2) [],
        SRC_INC OFFSET(26) NUMBITS(2) [],
        DST_SIZE OFFSET(28) NUMBITS(2) [],
        DST_INC OFFSET(30) NUMBITS(2) []
    ]
];

const DMA_BASE: StaticRef<DmaRegisters> =
    unsafe { StaticRef::new(0x4001_0000 as *const DmaRegisters) };

/// Fixed peripheral assignment of each DMA channel.
#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaChannel {
    SpihTx = 0,
    SpihRx = 1,
    Spi0Tx = 2,
    Spi0Rx = 3,
    Spi1Tx = 4,
    Spi1Rx = 5,
    UartTx = 6,
    UartRx = 7,
    I2csTx = 8,
    I2csRx = 9,
    I2cm = 10,
    AfeTx = 11,
    AfeRx = 12,
    Crc = 13,
    Pdi = 14,
    I2s = 15,
}

impl DmaChannel {
    fn mask(self) -> u32 {
        1 << (self as u32)
    }
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaDataWidth {
    Width8Bit = 0,
    Width16Bit = 1,
    Width32Bit = 2,
}

#[repr(u32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DmaPtrIncrement {
    Incr8Bit = 0,
    Incr16Bit = 1,
    Incr32Bit = 2,
    NoIncr = 3,
}

/// One transfer descriptor in the RAM control block.
#[repr(C)]
pub struct DmaChannelControl {
    src_end_ptr: InMemoryRegister<u32>,
    dst_end_ptr: InMemoryRegister<u32>,
    ctrl: InMemoryRegister<u32, DMA_CTRL::Register>,
    _unused: InMemoryRegister<u32>,
}

impl DmaChannelControl {
    const fn new() -> DmaChannelControl {
        DmaChannelControl {
            src_end_ptr: InMemoryRegister::new(0),
            dst_end_ptr: InMemoryRegister::new(0),
            ctrl: InMemoryRegister::new(0),
            _unused: InMemoryRegister::new(0),
        }
    }
}

/// The channel control block the controller fetches descriptors from.
/// Primary descriptors for all 16 channels, then their alternates. The
/// hardware derives both from the primary base pointer, which must be
/// aligned accordingly.
#[repr(align(512))]
pub struct DmaConfigBlock(pub [DmaChannelControl; 2 * NUM_CHANNELS]);

impl DmaConfigBlock {
    pub const fn new() -> DmaConfigBlock {
        const EMPTY: DmaChannelControl = DmaChannelControl::new();
        DmaConfigBlock([EMPTY; 2 * NUM_CHANNELS])
    }
}

impl Default for DmaConfigBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the cycle control word for a basic transfer of `len` units.
/// `len` must fit the hardware's 1024-transfer limit.
fn basic_control_word(
    width: DmaDataWidth,
    src_incr: DmaPtrIncrement,
    dst_incr: DmaPtrIncrement,
    len: usize,
    arbitration_power: u32,
) -> Result<u32, crate::ErrorCode> {
    if len == 0 || len > 1024 {
        return Err(crate::ErrorCode::SIZE);
    }
    let reg: InMemoryRegister<u32, DMA_CTRL::Register> = InMemoryRegister::new(0);
    reg.write(
        DMA_CTRL::CYCLE_CTRL::Basic
            + DMA_CTRL::N_MINUS_1.val((len - 1) as u32)
            + DMA_CTRL::R_POWER.val(arbitration_power & 0xf)
            + DMA_CTRL::SRC_SIZE.val(width as u32)
            + DMA_CTRL::DST_SIZE.val(width as u32)
            + DMA_CTRL::SRC_INC.val(src_incr as u32)
            + DMA_CTRL::DST_INC.val(dst_incr as u32),
    );
    Ok(reg.get())
}

pub struct Dma {
    registers: StaticRef<DmaRegisters>,
}

impl Dma {
    pub const fn new() -> Dma {
        Dma {
            registers: DMA_BASE,
        }
    }

    /// Point the controller at the channel control block, then turn it
    /// on. The base pointer must be in place before the first descriptor
    /// fetch.
    pub fn enable(&self, config: &'static DmaConfigBlock) {
        self.registers
            .pdbptr
            .set(core::ptr::from_ref(config) as u32);
        self.registers.cfg.write(CFG::MASTER_ENABLE::SET);
    }

    pub fn disable(&self) {
        self.registers.cfg.write(CFG::MASTER_ENABLE::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.registers.status.is_set(STATUS::MASTER_ENABLE)
    }

    pub fn enable_channel(&self, channel: DmaChannel) {
        self.registers.enset.set(channel.mask());
    }

    pub fn disable_channel(&self, channel: DmaChannel) {
        self.registers.enclr.set(channel.mask());
    }

    pub fn is_channel_enabled(&self, channel: DmaChannel) -> bool {
        self.registers.enset.get() & channel.mask() != 0
    }

    /// Mask the peripheral request line so only software requests start
    /// transfers on this channel.
    pub fn mask_request(&self, channel: DmaChannel) {
        self.registers.rmskset.set(channel.mask());
    }

    pub fn unmask_request(&self, channel: DmaChannel) {
        self.registers.rmskclr.set(channel.mask());
    }

    pub fn software_request(&self, channel: DmaChannel) {
        self.registers.swreq.set(channel.mask());
    }

    pub fn select_alternate(&self, channel: DmaChannel) {
        self.registers.altset.set(channel.mask());
    }

    pub fn select_primary(&self, channel: DmaChannel) {
        self.registers.altclr.set(channel.mask());
    }

    pub fn set_high_priority(&self, channel: DmaChannel) {
        self.registers.priset.set(channel.mask());
    }

    pub fn set_default_priority(&self, channel: DmaChannel) {
        self.registers.priclr.set(channel.mask());
    }

    /// Byte swap of the data lanes during the transfer (ADuCM350
    /// extension).
    pub fn set_byte_swap(&self, channel: DmaChannel, enable: bool) {
        if enable {
            self.registers.bsset.set(channel.mask());
        } else {
            self.registers.bsclr.set(channel.mask());
        }
    }

    /// Decrement instead of increment the source address (ADuCM350
    /// extension).
    pub fn set_source_decrement(&self, channel: DmaChannel, enable: bool) {
        if enable {
            self.registers.srcadsset.set(channel.mask());
        } else {
            self.registers.srcadclr.set(channel.mask());
        }
    }

    pub fn set_destination_decrement(&self, channel: DmaChannel, enable: bool) {
        if enable {
            self.registers.dstadset.set(channel.mask());
        } else {
            self.registers.dstadclr.set(channel.mask());
        }
    }

    /// Fill in the primary descriptor of `channel` for a basic transfer.
    ///
    /// `src_end` and `dst_end` are the addresses of the LAST unit of each
    /// buffer, per the descriptor format. Arbitration happens every
    /// `2^arbitration_power` transfers.
    #[allow(clippy::too_many_arguments)]
    pub fn setup_basic_transfer(
        &self,
        config: &DmaConfigBlock,
        channel: DmaChannel,
        src_end: u32,
        dst_end: u32,
        width: DmaDataWidth,
        src_incr: DmaPtrIncrement,
        dst_incr: DmaPtrIncrement,
        len: usize,
        arbitration_power: u32,
    ) -> Result<(), crate::ErrorCode> {
        let ctrl = basic_control_word(width, src_incr, dst_incr, len, arbitration_power)?;
        let desc = &config.0[channel as usize];
        desc.src_end_ptr.set(src_end);
        desc.dst_end_ptr.set(dst_end);
        desc.ctrl.set(ctrl);
        Ok(())
    }

    /// Clears all pending bus error and invalid descriptor flags. Returns
    /// the channels that had an error pending.
    pub fn handle_error_interrupt(&self) -> u32 {
        let errors = self.registers.errchnlclr.get();
        self.registers.errchnlclr.set(errors);
        self.registers.errclr.set(self.registers.errclr.get());
        self.registers
            .invaliddescclr
            .set(self.registers.invaliddescclr.get());
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_control_word_fields() {
        // 8 halfword transfers, incrementing source, fixed destination,
        // arbitrating every 4 transfers.
        let w = basic_control_word(
            DmaDataWidth::Width16Bit,
            DmaPtrIncrement::Incr16Bit,
            DmaPtrIncrement::NoIncr,
            8,
            2,
        )
        .unwrap();
        assert_eq!(w & 0x7, 1); // basic cycle
        assert_eq!((w >> 4) & 0x3ff, 7); // N-1
        assert_eq!((w >> 14) & 0xf, 2); // R_POWER
        assert_eq!((w >> 24) & 0x3, 1); // SRC_SIZE halfword
        assert_eq!((w >> 26) & 0x3, 1); // SRC_INC halfword
        assert_eq!((w >> 28) & 0x3, 1); // DST_SIZE halfword
        assert_eq!((w >> 30) & 0x3, 3); // DST_INC none
    }

    #[test]
    fn transfer_length_limits() {
        let ok = |len| {
            basic_control_word(
                DmaDataWidth::Width8Bit,
                DmaPtrIncrement::Incr8Bit,
                DmaPtrIncrement::Incr8Bit,
                len,
                0,
            )
        };
        assert!(ok(1).is_ok());
        assert!(ok(1024).is_ok());
        assert_eq!(ok(0), Err(crate::ErrorCode::SIZE));
        assert_eq!(ok(1025), Err(crate::ErrorCode::SIZE));
    }

    #[test]
    fn config_block_is_descriptor_aligned() {
        assert_eq!(core::mem::align_of::<DmaConfigBlock>(), 512);
        assert_eq!(core::mem::size_of::<DmaChannelControl>(), 16);
        assert_eq!(core::mem::size_of::<DmaConfigBlock>(), 512);
    }
}
