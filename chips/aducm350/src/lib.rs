// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Peripheral implementations for the Analog Devices ADuCM350 MCU.
//!
//! The ADuCM350 is a Cortex-M3 based meter-on-chip. This crate contains the
//! register maps of its digital peripherals, the fixed interrupt and DMA
//! channel assignments, and drivers for the clock gates, the PL230 uDMA,
//! GPIO, the general purpose / wakeup / watchdog timers, the UART, the
//! random bit generator, the LCD segment controller (including the VIM-828
//! display encoder) and a shim for the MUSBMHDRC USB controller.
//!
//! <https://www.analog.com/en/products/aducm350.html>

#![no_std]

pub mod dma;
pub mod errorcode;
pub mod gpio;
pub mod gpt;
pub mod interrupts;
pub mod lcd;
pub mod rng;
pub mod sysclk;
pub mod uart;
pub mod usbc;
pub mod utilities;
pub mod vim828;
pub mod wdt;
pub mod wut;

pub use crate::errorcode::ErrorCode;
