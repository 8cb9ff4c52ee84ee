// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Standard error type for driver operations.

/// Standard errors returned by peripheral drivers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    /// Generic failure condition
    FAIL,
    /// Underlying system is busy; retry
    BUSY,
    /// The state requested is already set
    ALREADY,
    /// The component is powered down
    OFF,
    /// Reservation required before use
    RESERVE,
    /// An invalid parameter was passed
    INVAL,
    /// Parameter passed was too large
    SIZE,
    /// Operation canceled by a call
    CANCEL,
    /// Memory required not available
    NOMEM,
    /// Operation is not supported
    NOSUPPORT,
    /// Device is not available
    NODEVICE,
    /// Device is not physically installed
    UNINSTALLED,
    /// Packet transmission not acknowledged
    NOACK,
}
