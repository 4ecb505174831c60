// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use thiserror::Error;

/// Errors produced by the JPEG stack types.
///
/// Every operation fails atomically: when an error is returned the stack is
/// in the state it was in immediately before the call.
#[derive(Debug, Error)]
pub enum Error {
    /// An argument failed validation or a precondition did not hold.
    /// Surfaced synchronously, before any buffer write begins.
    #[error("invalid argument: {0}")]
    Validation(String),

    /// Storage for a pixel buffer could not be obtained.
    #[error("allocation failed: {0}")]
    Allocation(String),

    /// The underlying JPEG codec rejected an encode job.
    #[error("jpeg encode failed: {0}")]
    Codec(String),
}

pub type Result<T> = std::result::Result<T, Error>;
