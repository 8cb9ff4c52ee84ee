// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Named NVIC interrupt positions for the ADuCM350.
//!
//! Positions 44 and 49 are reserved in hardware and carry no name.

pub const WUT: u32 = 0;
pub const EINT0: u32 = 1;
pub const EINT1: u32 = 2;
pub const EINT2: u32 = 3;
pub const EINT3: u32 = 4;
pub const EINT4: u32 = 5;
pub const EINT5: u32 = 6;
pub const EINT6: u32 = 7;
pub const EINT7: u32 = 8;
pub const EINT8: u32 = 9;
pub const WDT: u32 = 10;
pub const TIMER0: u32 = 11;
pub const TIMER1: u32 = 12;
pub const FLASH0: u32 = 13;
pub const UART: u32 = 14;
pub const SPI0: u32 = 15;
pub const SPIH: u32 = 16;
pub const I2CS: u32 = 17;
pub const I2CM: u32 = 18;
pub const DMA_ERR: u32 = 19;
pub const DMA_SPIH_TX: u32 = 20;
pub const DMA_SPIH_RX: u32 = 21;
pub const DMA_SPI0_TX: u32 = 22;
pub const DMA_SPI0_RX: u32 = 23;
pub const DMA_SPI1_TX: u32 = 24;
pub const DMA_SPI1_RX: u32 = 25;
pub const DMA_UART_TX: u32 = 26;
pub const DMA_UART_RX: u32 = 27;
pub const DMA_I2CS_TX: u32 = 28;
pub const DMA_I2CS_RX: u32 = 29;
pub const DMA_I2CM: u32 = 30;
pub const DMA_AFE_TX: u32 = 31;
pub const DMA_AFE_RX: u32 = 32;
pub const DMA_CRC: u32 = 33;
pub const DMA_PDI: u32 = 34;
pub const DMA_I2S: u32 = 35;
pub const USB_WAKEUP: u32 = 36;
pub const USB_CTRL: u32 = 37;
pub const USB_DMA: u32 = 38;
pub const I2S: u32 = 39;
pub const TIMER2: u32 = 40;
pub const FLASH1: u32 = 41;
pub const SPI1: u32 = 42;
pub const RTC: u32 = 43;
pub const BEEP: u32 = 45;
pub const LCD: u32 = 46;
pub const GPIOA: u32 = 47;
pub const GPIOB: u32 = 48;
pub const AFE_CAPTURE: u32 = 50;
pub const AFE_GENERATE: u32 = 51;
pub const AFE_CMD_FIFO: u32 = 52;
pub const AFE_DATA_FIFO: u32 = 53;
pub const CAPTOUCH: u32 = 54;
pub const GP_FLASH: u32 = 55;
pub const XTAL_OSC: u32 = 56;
pub const PLL: u32 = 57;
pub const RANDOM_BIT: u32 = 58;
pub const PDI: u32 = 59;
pub const PARITY: u32 = 60;

pub const NUM_IRQS: usize = 61;
