// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

//! # Dirty-Rectangle JPEG Stack
//!
//! This library provides persistent JPEG compositors for video pipelines
//! that deliver partial-frame updates: a background frame is established
//! once, tiles are pushed at arbitrary positions, and each encode compresses
//! only the region that changed since the last reset. JPEG compression is
//! delegated to turbojpeg with SIMD.
//!
//! ## Features
//!
//! - **Dirty-Rectangle Tracking**: [`DynamicJpegStack`] accumulates the
//!   bounding rectangle of all pushed tiles and encodes just that region,
//!   keeping encode cost proportional to the change rate.
//! - **Fixed Full-Frame Variant**: [`FixedJpegStack`] shares the same
//!   buffer and conversion logic but always encodes the whole frame.
//! - **Pixel Format Conversion**: tiles arrive as `rgb`, `bgr`, `rgba` or
//!   `bgra` and are converted to the canonical RGB frame on the way in.
//! - **Async Encoding**: encode jobs can run on the tokio blocking worker
//!   pool while the capture loop keeps going.
//!
//! ## Example
//!
//! ```no_run
//! use jpeg_stack::{DynamicJpegStack, SourceFormat};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut stack = DynamicJpegStack::new(SourceFormat::Bgra);
//! stack.set_background(&vec![0u8; 1280 * 720 * 4], 1280, 720)?;
//!
//! // Push the tiles that changed this frame, encode, reset the window.
//! stack.push(&vec![0u8; 64 * 64 * 4], 320, 200, 64, 64)?;
//! let jpeg = stack.encode_sync()?;
//! println!("changed region {} -> {} bytes", stack.dimensions(), jpeg.len());
//! stack.reset();
//! # Ok(())
//! # }
//! ```
//!
//! ## Caller Contract
//!
//! A stack expects a single logical owner: mutating calls are synchronous
//! and must not race each other. An in-flight async encode holds its own
//! reference to the frame, so pushes issued while it runs are safe but only
//! become visible to later encodes.

pub mod dynamic;
pub mod encoder;
pub mod error;
pub mod fixed;
pub mod format;

pub use dynamic::DynamicJpegStack;
pub use encoder::{encode_jpeg, Rect};
pub use error::{Error, Result};
pub use fixed::FixedJpegStack;
pub use format::SourceFormat;
