// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    encoder::encode_jpeg,
    error::{Error, Result},
    format::SourceFormat,
};
use std::sync::Arc;

const DEFAULT_QUALITY: i32 = 60;

/// Fixed-size JPEG compositor without dirty-rectangle tracking.
///
/// The frame dimensions are fixed at construction and the buffer starts
/// zero-filled; every encode covers the entire frame. Shares the pixel
/// conversion and push semantics of [`DynamicJpegStack`], minus the dirty
/// tracking.
///
/// [`DynamicJpegStack`]: crate::DynamicJpegStack
pub struct FixedJpegStack {
    format: SourceFormat,
    quality: i32,
    data: Arc<Vec<u8>>,
    width: usize,
    height: usize,
}

impl FixedJpegStack {
    /// Allocates a zero-filled `width`x`height` frame.
    ///
    /// # Errors
    ///
    /// [`Error::Allocation`] if the frame buffer cannot be allocated.
    pub fn new(width: u32, height: u32, format: SourceFormat) -> Result<Self> {
        let (width, height) = (width as usize, height as usize);
        let len = width * height * 3;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::Allocation(format!("{len} byte frame buffer")))?;
        data.resize(len, 0);
        Ok(Self {
            format,
            quality: DEFAULT_QUALITY,
            data: Arc::new(data),
            width,
            height,
        })
    }

    /// Blits a `w`x`h` tile into the frame at `(x, y)`.
    ///
    /// Validation happens in full before any pixel is written.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the tile does not fit within the frame or
    /// `pixels` is shorter than `w * h * bpp`.
    pub fn push(&mut self, pixels: &[u8], x: u32, y: u32, w: u32, h: u32) -> Result<()> {
        let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
        if x >= self.width {
            return Err(Error::Validation(format!(
                "x {} exceeds frame width {}",
                x, self.width
            )));
        }
        if y >= self.height {
            return Err(Error::Validation(format!(
                "y {} exceeds frame height {}",
                y, self.height
            )));
        }
        if x + w > self.width {
            return Err(Error::Validation(format!(
                "pushed fragment {}+{} exceeds frame width {}",
                x, w, self.width
            )));
        }
        if y + h > self.height {
            return Err(Error::Validation(format!(
                "pushed fragment {}+{} exceeds frame height {}",
                y, h, self.height
            )));
        }
        let bpp = self.format.bytes_per_pixel();
        if pixels.len() < w * h * bpp {
            return Err(Error::Validation(format!(
                "push buffer holds {} bytes, {}x{} {} needs {}",
                pixels.len(),
                w,
                h,
                self.format,
                w * h * bpp
            )));
        }

        let data = Arc::make_mut(&mut self.data);
        for row in 0..h {
            let src = &pixels[row * w * bpp..(row + 1) * w * bpp];
            let start = ((y + row) * self.width + x) * 3;
            self.format.to_canonical(src, &mut data[start..start + w * 3]);
        }
        Ok(())
    }

    /// Sets the JPEG quality for subsequent encodes.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if `quality` is outside `0..=100`.
    pub fn set_quality(&mut self, quality: i32) -> Result<()> {
        if !(0..=100).contains(&quality) {
            return Err(Error::Validation(format!(
                "quality must be within 0..=100, got {quality}"
            )));
        }
        self.quality = quality;
        Ok(())
    }

    pub fn quality(&self) -> i32 {
        self.quality
    }

    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Encodes the whole frame to JPEG, blocking the caller.
    pub fn encode_sync(&self) -> Result<Vec<u8>> {
        encode_jpeg(&self.data, self.width, self.height, self.quality, None)
    }

    /// Encodes the whole frame on the blocking worker pool. The frame and
    /// quality are snapshotted at submission time.
    pub async fn encode(&self) -> Result<Vec<u8>> {
        let data = self.data.clone();
        let (width, height, quality) = (self.width, self.height, self.quality);
        tokio::task::spawn_blocking(move || encode_jpeg(&data, width, height, quality, None))
            .await
            .map_err(|e| Error::Codec(format!("encode worker failed: {e}")))?
    }
}
