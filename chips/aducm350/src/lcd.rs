// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! LCD segment controller.
//!
//! Drives up to 4x32 segments in static or 4-way multiplex mode from a
//! charge-pump supply. Segment state lives in two pages of eight 16-bit
//! data registers (screen 0 and screen 1); the controller scans out the
//! page selected by LCDCON.SCREENSEL, so a display can be composed
//! off-screen and flipped at a frame boundary.
//!
//! The [`DataRegisterBank`] trait is the write surface the VIM-828
//! encoder in [`crate::vim828`] renders into.

use crate::utilities::cells::OptionalCell;
use crate::utilities::StaticRef;
use tock_registers::interfaces::{ReadWriteable, Readable, Writeable};
use tock_registers::registers::ReadWrite;
use tock_registers::{register_bitfields, register_structs};

pub const NUM_DATA_REGISTERS: usize = 8;

register_structs! {
    LcdDataRegister {
        (0x00 => data: ReadWrite<u16>),
        (0x02 => _reserved0),
        (0x04 => @END),
    },
    LcdRegisters {
        (0x00 => lcdcon: ReadWrite<u16, LCDCON::Register>),
        (0x02 => _reserved0),
        (0x04 => lcdstat: ReadWrite<u16, LCDSTAT::Register>),
        (0x06 => _reserved1),
        (0x08 => lcdblink: ReadWrite<u16, LCDBLINK::Register>),
        (0x0a => _reserved2),
        (0x0c => lcdcontrast: ReadWrite<u16, LCDCONTRAST::Register>),
        (0x0e => _reserved3),
        /// Screen 0 segment data
        (0x10 => data_s0: [LcdDataRegister; NUM_DATA_REGISTERS]),
        /// Screen 1 segment data
        (0x30 => data_s1: [LcdDataRegister; NUM_DATA_REGISTERS]),
        (0x50 => @END),
    }
}

register_bitfields![u16,
    LCDCON [
        LCDEN OFFSET(0) NUMBITS(1) [],
        LCDMUX OFFSET(1) NUMBITS(1) [
            Static = 0,
            Mux4 = 1
        ],
        /// Frame rate select, 16 steps from 128 Hz down to 16 Hz
        FRAMESEL OFFSET(2) NUMBITS(4) [],
        SCREENSEL OFFSET(6) NUMBITS(1) [
            Screen0 = 0,
            Screen1 = 1
        ],
        /// Invert the backplane waveform every frame
        FRAMEINV OFFSET(7) NUMBITS(1) [],
        BLINKEN OFFSET(8) NUMBITS(1) [],
        FRAMEINT_EN OFFSET(9) NUMBITS(1) [],
        CPINT_EN OFFSET(10) NUMBITS(1) [],
        /// Reset all data registers to zero
        LCDRST OFFSET(11) NUMBITS(1) []
    ],
    LCDSTAT [
        /// Frame boundary, write-one-to-clear
        FRAMEINT OFFSET(0) NUMBITS(1) [],
        /// Charge pump good fell, write-one-to-clear
        CPINT OFFSET(1) NUMBITS(1) [],
        LCD_IDLE OFFSET(2) NUMBITS(1) [],
        VLCD_OK OFFSET(3) NUMBITS(1) [],
        CP_GD OFFSET(4) NUMBITS(1) [],
        /// Data registers may be written without tearing
        SAFE_TO_WR OFFSET(5) NUMBITS(1) []
    ],
    LCDBLINK [
        BLKMOD OFFSET(0) NUMBITS(2) [
            /// Toggled by software through BLINKEN
            Software = 0,
            /// Blink at the rate in BLKFREQ
            Hardware = 1
        ],
        /// Blink rate divider, 8 steps
        BLKFREQ OFFSET(2) NUMBITS(3) [],
        /// Alternate screens automatically at the blink rate
        AUTOSWITCH OFFSET(5) NUMBITS(1) []
    ],
    LCDCONTRAST [
        /// Charge pump bias level, sets VLCD
        BIASLVL OFFSET(0) NUMBITS(5) [],
        CP_PD OFFSET(5) NUMBITS(1) [],
        CP_EN OFFSET(6) NUMBITS(1) []
    ]
];

const LCD_BASE: StaticRef<LcdRegisters> =
    unsafe { StaticRef::new(0x4000_8000 as *const LcdRegisters) };

pub const MAX_BIAS_LEVEL: u16 = 31;
pub const MAX_FRAME_RATE: u16 = 15;
pub const MAX_BLINK_FREQUENCY: u16 = 7;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Screen0,
    Screen1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MuxType {
    Static,
    Mux4,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlinkMode {
    Disabled,
    /// Software toggles the display through the blink enable
    Software,
    /// Hardware blinks at the configured frequency
    Hardware,
}

/// Read/write access to the per-screen segment data registers.
///
/// Callers pass `index` below [`NUM_DATA_REGISTERS`]; the validated
/// driver entry points and the display encoder both uphold this.
pub trait DataRegisterBank {
    fn data_register(&self, screen: Screen, index: usize) -> u16;
    fn set_data_register(&self, screen: Screen, index: usize, value: u16);
}

pub trait LcdClient {
    /// A frame boundary passed.
    fn frame_boundary(&self);
    /// The charge pump good indication dropped.
    fn charge_pump_fell(&self);
}

pub struct Lcd<'a> {
    registers: StaticRef<LcdRegisters>,
    client: OptionalCell<&'a dyn LcdClient>,
}

impl<'a> Lcd<'a> {
    pub const fn new() -> Lcd<'a> {
        Lcd {
            registers: LCD_BASE,
            client: OptionalCell::empty(),
        }
    }

    pub fn set_client(&self, client: &'a dyn LcdClient) {
        self.client.set(client);
    }

    pub fn enable(&self) {
        self.registers.lcdcon.modify(LCDCON::LCDEN::SET);
    }

    pub fn disable(&self) {
        self.registers.lcdcon.modify(LCDCON::LCDEN::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.registers.lcdcon.is_set(LCDCON::LCDEN)
    }

    /// Zero every data register of both screens in hardware.
    pub fn reset_data(&self) {
        self.registers.lcdcon.modify(LCDCON::LCDRST::SET);
    }

    pub fn set_mux_type(&self, mux: MuxType) {
        self.registers.lcdcon.modify(match mux {
            MuxType::Static => LCDCON::LCDMUX::Static,
            MuxType::Mux4 => LCDCON::LCDMUX::Mux4,
        });
    }

    pub fn set_frame_rate(&self, rate: u16) -> Result<(), crate::ErrorCode> {
        if rate > MAX_FRAME_RATE {
            return Err(crate::ErrorCode::INVAL);
        }
        self.registers.lcdcon.modify(LCDCON::FRAMESEL.val(rate));
        Ok(())
    }

    pub fn set_frame_inversion(&self, invert: bool) {
        self.registers.lcdcon.modify(if invert {
            LCDCON::FRAMEINV::SET
        } else {
            LCDCON::FRAMEINV::CLEAR
        });
    }

    pub fn select_screen(&self, screen: Screen) {
        self.registers.lcdcon.modify(match screen {
            Screen::Screen0 => LCDCON::SCREENSEL::Screen0,
            Screen::Screen1 => LCDCON::SCREENSEL::Screen1,
        });
    }

    pub fn selected_screen(&self) -> Screen {
        if self.registers.lcdcon.is_set(LCDCON::SCREENSEL) {
            Screen::Screen1
        } else {
            Screen::Screen0
        }
    }

    pub fn set_blink_mode(&self, mode: BlinkMode) {
        match mode {
            BlinkMode::Disabled => {
                self.registers.lcdcon.modify(LCDCON::BLINKEN::CLEAR);
            }
            BlinkMode::Software => {
                self.registers.lcdblink.modify(LCDBLINK::BLKMOD::Software);
                self.registers.lcdcon.modify(LCDCON::BLINKEN::SET);
            }
            BlinkMode::Hardware => {
                self.registers.lcdblink.modify(LCDBLINK::BLKMOD::Hardware);
                self.registers.lcdcon.modify(LCDCON::BLINKEN::SET);
            }
        }
    }

    pub fn set_blink_frequency(&self, frequency: u16) -> Result<(), crate::ErrorCode> {
        if frequency > MAX_BLINK_FREQUENCY {
            return Err(crate::ErrorCode::INVAL);
        }
        self.registers
            .lcdblink
            .modify(LCDBLINK::BLKFREQ.val(frequency));
        Ok(())
    }

    /// Alternate the displayed screen automatically at the blink rate.
    pub fn set_autoswitch(&self, enable: bool) {
        self.registers.lcdblink.modify(if enable {
            LCDBLINK::AUTOSWITCH::SET
        } else {
            LCDBLINK::AUTOSWITCH::CLEAR
        });
    }

    /// Bias level sets VLCD and with it the display contrast.
    pub fn set_contrast(&self, bias_level: u16) -> Result<(), crate::ErrorCode> {
        if bias_level > MAX_BIAS_LEVEL {
            return Err(crate::ErrorCode::INVAL);
        }
        self.registers
            .lcdcontrast
            .modify(LCDCONTRAST::BIASLVL.val(bias_level));
        Ok(())
    }

    pub fn set_charge_pump(&self, enable: bool, power_down: bool) {
        self.registers.lcdcontrast.modify(
            (if enable {
                LCDCONTRAST::CP_EN::SET
            } else {
                LCDCONTRAST::CP_EN::CLEAR
            }) + (if power_down {
                LCDCONTRAST::CP_PD::SET
            } else {
                LCDCONTRAST::CP_PD::CLEAR
            }),
        );
    }

    pub fn set_data(&self, screen: Screen, index: usize, value: u16) -> Result<(), crate::ErrorCode> {
        if index >= NUM_DATA_REGISTERS {
            return Err(crate::ErrorCode::INVAL);
        }
        self.set_data_register(screen, index, value);
        Ok(())
    }

    pub fn data(&self, screen: Screen, index: usize) -> Result<u16, crate::ErrorCode> {
        if index >= NUM_DATA_REGISTERS {
            return Err(crate::ErrorCode::INVAL);
        }
        Ok(self.data_register(screen, index))
    }

    pub fn is_idle(&self) -> bool {
        self.registers.lcdstat.is_set(LCDSTAT::LCD_IDLE)
    }

    pub fn vlcd_ok(&self) -> bool {
        self.registers.lcdstat.is_set(LCDSTAT::VLCD_OK)
    }

    pub fn charge_pump_good(&self) -> bool {
        self.registers.lcdstat.is_set(LCDSTAT::CP_GD)
    }

    pub fn safe_to_write(&self) -> bool {
        self.registers.lcdstat.is_set(LCDSTAT::SAFE_TO_WR)
    }

    pub fn set_frame_interrupt(&self, enable: bool) {
        self.registers.lcdcon.modify(if enable {
            LCDCON::FRAMEINT_EN::SET
        } else {
            LCDCON::FRAMEINT_EN::CLEAR
        });
    }

    pub fn set_charge_pump_interrupt(&self, enable: bool) {
        self.registers.lcdcon.modify(if enable {
            LCDCON::CPINT_EN::SET
        } else {
            LCDCON::CPINT_EN::CLEAR
        });
    }

    pub fn handle_interrupt(&self) {
        let stat = self.registers.lcdstat.extract();
        if stat.is_set(LCDSTAT::FRAMEINT) {
            self.registers.lcdstat.write(LCDSTAT::FRAMEINT::SET);
            self.client.map(|client| client.frame_boundary());
        }
        if stat.is_set(LCDSTAT::CPINT) {
            self.registers.lcdstat.write(LCDSTAT::CPINT::SET);
            self.client.map(|client| client.charge_pump_fell());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCode;

    // Out-of-range parameters are rejected before any register access,
    // so these run without the hardware.

    #[test]
    fn contrast_bias_level_is_five_bits() {
        let lcd = Lcd::new();
        assert_eq!(lcd.set_contrast(MAX_BIAS_LEVEL + 1), Err(ErrorCode::INVAL));
    }

    #[test]
    fn frame_rate_select_is_four_bits() {
        let lcd = Lcd::new();
        assert_eq!(lcd.set_frame_rate(MAX_FRAME_RATE + 1), Err(ErrorCode::INVAL));
    }

    #[test]
    fn blink_frequency_is_three_bits() {
        let lcd = Lcd::new();
        assert_eq!(
            lcd.set_blink_frequency(MAX_BLINK_FREQUENCY + 1),
            Err(ErrorCode::INVAL)
        );
    }

    #[test]
    fn data_register_index_is_bounded() {
        let lcd = Lcd::new();
        assert_eq!(
            lcd.set_data(Screen::Screen0, NUM_DATA_REGISTERS, 0),
            Err(ErrorCode::INVAL)
        );
        assert_eq!(
            lcd.data(Screen::Screen1, NUM_DATA_REGISTERS),
            Err(ErrorCode::INVAL)
        );
    }
}

impl DataRegisterBank for Lcd<'_> {
    fn data_register(&self, screen: Screen, index: usize) -> u16 {
        match screen {
            Screen::Screen0 => self.registers.data_s0[index].data.get(),
            Screen::Screen1 => self.registers.data_s1[index].data.get(),
        }
    }

    fn set_data_register(&self, screen: Screen, index: usize, value: u16) {
        match screen {
            Screen::Screen0 => self.registers.data_s0[index].data.set(value),
            Screen::Screen1 => self.registers.data_s1[index].data.set(value),
        }
    }
}
