// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use crate::{
    encoder::{encode_jpeg, Rect},
    error::{Error, Result},
    format::SourceFormat,
};
use std::sync::Arc;
use tracing::debug;

const DEFAULT_QUALITY: i32 = 60;

/// Dirty rectangle accumulated across pushes.
///
/// Sentinel state is `{-1, -1, 0, 0}`. The merge rule only ever grows the
/// rectangle: the top-left corner moves up/left via min, while the
/// right/bottom edge grows by the amount the new rectangle's extent exceeds
/// the current one measured from the current top-left corner. A push that
/// moves the corner without exceeding that extent leaves width/height
/// untouched, so the result can over- or under-shoot the true minimal union
/// in some interleavings. Callers downstream depend on this exact
/// arithmetic, so it is kept as-is.
#[derive(Copy, Clone, Debug)]
struct DirtyRect {
    x: i32,
    y: i32,
    w: i32,
    h: i32,
}

impl DirtyRect {
    const EMPTY: DirtyRect = DirtyRect {
        x: -1,
        y: -1,
        w: 0,
        h: 0,
    };

    fn merge(&mut self, x: i32, y: i32, w: i32, h: i32) {
        if self.x == -1 || x < self.x {
            self.x = x;
        }
        if self.y == -1 || y < self.y {
            self.y = y;
        }

        if self.w == 0 {
            self.w = w;
        }
        if self.h == 0 {
            self.h = h;
        }

        let ww = w - (self.w - (x - self.x));
        if ww > 0 {
            self.w += ww;
        }

        let hh = h - (self.h - (y - self.y));
        if hh > 0 {
            self.h += hh;
        }
    }

    fn snapshot(&self) -> Rect {
        Rect::new(self.x, self.y, self.w, self.h)
    }

    /// Region to encode, `None` when nothing has been pushed.
    fn region(&self) -> Option<Rect> {
        if self.w > 0 && self.h > 0 {
            Some(self.snapshot())
        } else {
            None
        }
    }
}

/// Dirty-rectangle JPEG compositor.
///
/// `DynamicJpegStack` owns a persistent canonical-RGB framebuffer that
/// accumulates partial-frame updates from a video pipeline. Each
/// [`push`](Self::push) blits a tile into the framebuffer and grows a dirty
/// rectangle; [`encode`](Self::encode) and [`encode_sync`](Self::encode_sync)
/// compress only that rectangle (or the whole frame when nothing was pushed),
/// which keeps encode cost proportional to what actually changed. Intended
/// for high-frequency partial updates such as screen mirroring or digital
/// signage.
///
/// The caller drives the change window explicitly: [`reset`](Self::reset)
/// after a successful encode starts accumulating the next one.
///
/// # Example
///
/// ```no_run
/// use jpeg_stack::{DynamicJpegStack, SourceFormat};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let mut stack = DynamicJpegStack::new(SourceFormat::Rgba);
/// stack.set_background(&vec![0u8; 720 * 400 * 4], 720, 400)?;
///
/// let tile = vec![255u8; 32 * 32 * 4];
/// stack.push(&tile, 100, 50, 32, 32)?;
///
/// let jpeg = stack.encode_sync()?;
/// stack.reset();
/// # Ok(())
/// # }
/// ```
pub struct DynamicJpegStack {
    format: SourceFormat,
    quality: i32,
    dirty: DirtyRect,
    /// Canonical RGB, `width * height * 3` bytes. The `Arc` is what keeps
    /// the frame alive across the async encode boundary; mutating paths go
    /// through `Arc::make_mut`, so an in-flight encode always sees the
    /// pixels as they were at submission time.
    data: Option<Arc<Vec<u8>>>,
    width: usize,
    height: usize,
}

impl DynamicJpegStack {
    /// Creates an empty stack for buffers in the given source format.
    ///
    /// No pixel storage is allocated until [`set_background`] establishes
    /// the frame; [`push`] and the encode operations fail until then.
    /// Quality starts at 60.
    ///
    /// [`set_background`]: Self::set_background
    /// [`push`]: Self::push
    pub fn new(format: SourceFormat) -> Self {
        Self {
            format,
            quality: DEFAULT_QUALITY,
            dirty: DirtyRect::EMPTY,
            data: None,
            width: 0,
            height: 0,
        }
    }

    /// Replaces the background frame.
    ///
    /// `pixels` is `width * height * bpp` bytes in the stack's source
    /// format; it is converted into a freshly allocated canonical RGB
    /// buffer which replaces any previous frame in full. The dirty
    /// rectangle is reset, since it tracked geometry of the discarded
    /// frame.
    ///
    /// # Errors
    ///
    /// * [`Error::Validation`] if `pixels` is shorter than
    ///   `width * height * bpp`
    /// * [`Error::Allocation`] if the canonical buffer cannot be allocated;
    ///   the previous frame is kept
    pub fn set_background(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<()> {
        let (width, height) = (width as usize, height as usize);
        let src_len = width * height * self.format.bytes_per_pixel();
        if pixels.len() < src_len {
            return Err(Error::Validation(format!(
                "background buffer holds {} bytes, {}x{} {} needs {}",
                pixels.len(),
                width,
                height,
                self.format,
                src_len
            )));
        }

        let len = width * height * 3;
        let mut data = Vec::new();
        data.try_reserve_exact(len)
            .map_err(|_| Error::Allocation(format!("{len} byte background buffer")))?;
        data.resize(len, 0);
        self.format.to_canonical(&pixels[..src_len], &mut data);

        self.data = Some(Arc::new(data));
        self.width = width;
        self.height = height;
        self.dirty = DirtyRect::EMPTY;
        debug!(width, height, "background replaced");
        Ok(())
    }

    /// Blits a `w`x`h` tile into the frame at `(x, y)` and grows the dirty
    /// rectangle to cover it.
    ///
    /// The tile is converted from the source format to canonical RGB on the
    /// way in. Validation happens in full before any pixel is written, so a
    /// failed push leaves both the frame and the dirty rectangle untouched.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if no background is set, the tile does not fit
    /// within the frame, or `pixels` is shorter than `w * h * bpp`.
    pub fn push(&mut self, pixels: &[u8], x: u32, y: u32, w: u32, h: u32) -> Result<()> {
        let Some(data) = &mut self.data else {
            return Err(Error::Validation(
                "no background has been set, use set_background first".into(),
            ));
        };
        let (x, y, w, h) = (x as usize, y as usize, w as usize, h as usize);
        if x >= self.width {
            return Err(Error::Validation(format!(
                "x {} exceeds background width {}",
                x, self.width
            )));
        }
        if y >= self.height {
            return Err(Error::Validation(format!(
                "y {} exceeds background height {}",
                y, self.height
            )));
        }
        if x + w > self.width {
            return Err(Error::Validation(format!(
                "pushed fragment {}+{} exceeds background width {}",
                x, w, self.width
            )));
        }
        if y + h > self.height {
            return Err(Error::Validation(format!(
                "pushed fragment {}+{} exceeds background height {}",
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

        let data = Arc::make_mut(data);
        for row in 0..h {
            let src = &pixels[row * w * bpp..(row + 1) * w * bpp];
            let start = ((y + row) * self.width + x) * 3;
            self.format.to_canonical(src, &mut data[start..start + w * 3]);
        }

        self.dirty.merge(x as i32, y as i32, w as i32, h as i32);
        Ok(())
    }

    /// Resets the dirty rectangle to its empty sentinel without touching
    /// pixel contents. Typically called right after a successful encode to
    /// begin accumulating the next change window.
    pub fn reset(&mut self) {
        self.dirty = DirtyRect::EMPTY;
    }

    /// Current dirty rectangle, `{-1, -1, 0, 0}` when nothing has been
    /// pushed since the last reset.
    pub fn dimensions(&self) -> Rect {
        self.dirty.snapshot()
    }

    /// Sets the JPEG quality for subsequent encodes.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if `quality` is outside `0..=100`; the stored
    /// quality is left unchanged.
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

    /// Frame dimensions, `(0, 0)` before a background is set.
    pub fn background_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn job(&self) -> Result<(Arc<Vec<u8>>, Option<Rect>)> {
        let data = self
            .data
            .clone()
            .ok_or_else(|| Error::Validation("no background has been set".into()))?;
        Ok((data, self.dirty.region()))
    }

    /// Encodes the dirty rectangle (or the whole frame when nothing was
    /// pushed) to JPEG, blocking the caller.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if no background is set, [`Error::Codec`] if
    /// the encode fails.
    pub fn encode_sync(&self) -> Result<Vec<u8>> {
        let (data, rect) = self.job()?;
        encode_jpeg(&data, self.width, self.height, self.quality, rect)
    }

    /// Encodes the dirty rectangle (or the whole frame when nothing was
    /// pushed) on the blocking worker pool.
    ///
    /// The frame, quality and dirty rectangle are snapshotted at submission
    /// time: pushes issued while the job runs do not affect its output, and
    /// the returned [`Rect`] is the snapshot, not the rectangle at
    /// completion. The job runs to completion once dispatched.
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if no background is set, [`Error::Codec`] if
    /// the encode fails or the worker task is lost.
    pub async fn encode(&self) -> Result<(Vec<u8>, Rect)> {
        let (data, rect) = self.job()?;
        let (width, height, quality) = (self.width, self.height, self.quality);
        let dims = self.dimensions();

        let jpeg =
            tokio::task::spawn_blocking(move || encode_jpeg(&data, width, height, quality, rect))
                .await
                .map_err(|e| Error::Codec(format!("encode worker failed: {e}")))??;
        Ok((jpeg, dims))
    }
}
