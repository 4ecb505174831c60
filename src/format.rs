// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::Error;
use core::fmt;
use std::str::FromStr;

/// Pixel layout of buffers handed to [`set_background`] and [`push`].
///
/// The stacks store pixels internally in a canonical 3-channel interleaved
/// RGB layout; the source format only governs how incoming buffers are
/// reinterpreted on the way in. The 4-channel formats carry an alpha or
/// padding byte which is dropped during conversion.
///
/// [`set_background`]: crate::DynamicJpegStack::set_background
/// [`push`]: crate::DynamicJpegStack::push
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SourceFormat {
    /// 3 bytes per pixel, canonical channel order.
    Rgb,
    /// 3 bytes per pixel, channels 0 and 2 swapped.
    Bgr,
    /// 4 bytes per pixel, canonical order plus a trailing alpha byte.
    Rgba,
    /// 4 bytes per pixel, swapped order plus a trailing alpha byte.
    Bgra,
}

impl SourceFormat {
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            SourceFormat::Rgb | SourceFormat::Bgr => 3,
            SourceFormat::Rgba | SourceFormat::Bgra => 4,
        }
    }

    /// Converts a run of pixels from this format into canonical RGB.
    ///
    /// `src` must hold a whole number of pixels at `bytes_per_pixel()` and
    /// `dst` exactly 3 bytes for each of them.
    pub fn to_canonical(self, src: &[u8], dst: &mut [u8]) {
        debug_assert_eq!(src.len() % self.bytes_per_pixel(), 0);
        debug_assert_eq!(dst.len() / 3, src.len() / self.bytes_per_pixel());

        match self {
            SourceFormat::Rgb => dst.copy_from_slice(src),
            SourceFormat::Bgr => {
                for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(3)) {
                    d[0] = s[2];
                    d[1] = s[1];
                    d[2] = s[0];
                }
            }
            SourceFormat::Rgba => {
                for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
                    d.copy_from_slice(&s[..3]);
                }
            }
            SourceFormat::Bgra => {
                for (d, s) in dst.chunks_exact_mut(3).zip(src.chunks_exact(4)) {
                    d[0] = s[2];
                    d[1] = s[1];
                    d[2] = s[0];
                }
            }
        }
    }
}

impl FromStr for SourceFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "rgb" => Ok(SourceFormat::Rgb),
            "bgr" => Ok(SourceFormat::Bgr),
            "rgba" => Ok(SourceFormat::Rgba),
            "bgra" => Ok(SourceFormat::Bgra),
            _ => Err(Error::Validation(format!(
                "source format must be 'rgb', 'bgr', 'rgba' or 'bgra', got '{s}'"
            ))),
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let tag = match self {
            SourceFormat::Rgb => "rgb",
            SourceFormat::Bgr => "bgr",
            SourceFormat::Rgba => "rgba",
            SourceFormat::Bgra => "bgra",
        };
        write!(f, "{tag}")
    }
}
