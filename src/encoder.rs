// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::error::{Error, Result};
use core::fmt;

/// Rectangle within a pixel buffer.
///
/// Used both for encode sub-regions and for the dirty-rectangle snapshot
/// returned by [`DynamicJpegStack::dimensions`], where the sentinel value
/// `{-1, -1, 0, 0}` means "nothing written since the last reset".
///
/// [`DynamicJpegStack::dimensions`]: crate::DynamicJpegStack::dimensions
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rect {
    /// X coordinate of top-left corner
    pub x: i32,
    /// Y coordinate of top-left corner
    pub y: i32,
    /// Width of the rectangle in pixels
    pub width: i32,
    /// Height of the rectangle in pixels
    pub height: i32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Encodes a canonical RGB buffer to JPEG using turbojpeg.
///
/// When `rect` is given, only that region is compressed: the geometry
/// advertised to the codec shrinks to the rectangle and the scanline start
/// moves to its top-left corner, while the pitch stays at the full buffer
/// row stride so each scanline walks the backing frame.
///
/// # Arguments
///
/// * `pixels` - Canonical RGB pixel data, `width * height * 3` bytes
/// * `width` - Buffer width in pixels
/// * `height` - Buffer height in pixels
/// * `quality` - JPEG quality, 0-100
/// * `rect` - Optional sub-rectangle restricting the encode
///
/// # Errors
///
/// Returns [`Error::Codec`] if turbojpeg rejects the job.
pub fn encode_jpeg(
    pixels: &[u8],
    width: usize,
    height: usize,
    quality: i32,
    rect: Option<Rect>,
) -> Result<Vec<u8>> {
    let pitch = width * 3;
    let image = match rect {
        Some(r) => turbojpeg::Image {
            width: r.width as usize,
            height: r.height as usize,
            format: turbojpeg::PixelFormat::RGB,
            pixels: &pixels[(r.y as usize * width + r.x as usize) * 3..],
            pitch,
        },
        None => turbojpeg::Image {
            width,
            height,
            format: turbojpeg::PixelFormat::RGB,
            pixels,
            pitch,
        },
    };

    match turbojpeg::compress(image, quality, turbojpeg::Subsamp::Sub2x2) {
        Ok(buf) => Ok(buf.to_vec()),
        Err(e) => Err(Error::Codec(e.to_string())),
    }
}
