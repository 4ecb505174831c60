// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Au-Zone Technologies. All Rights Reserved.

use jpeg_stack::{DynamicJpegStack, Error, FixedJpegStack, Rect, SourceFormat};
use std::{error::Error as StdError, str::FromStr};

fn rgba_frame(width: u32, height: u32) -> Vec<u8> {
    // Smooth gradient, kind to lossy compression.
    let (w, h) = (width as usize, height as usize);
    let mut pixels = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let p = &mut pixels[(y * w + x) * 4..];
            p[0] = (x * 255 / w) as u8;
            p[1] = (y * 255 / h) as u8;
            p[2] = 96;
            p[3] = 255;
        }
    }
    pixels
}

#[test]
fn test_format_tags() -> Result<(), Box<dyn StdError>> {
    assert_eq!(SourceFormat::from_str("rgb")?, SourceFormat::Rgb);
    assert_eq!(SourceFormat::from_str("bgr")?, SourceFormat::Bgr);
    assert_eq!(SourceFormat::from_str("rgba")?, SourceFormat::Rgba);
    assert_eq!(SourceFormat::from_str("bgra")?, SourceFormat::Bgra);
    assert!(matches!(
        SourceFormat::from_str("yuyv"),
        Err(Error::Validation(_))
    ));
    Ok(())
}

#[test]
fn test_fresh_stack_dimensions() {
    let stack = DynamicJpegStack::new(SourceFormat::Rgb);
    assert_eq!(stack.dimensions(), Rect::new(-1, -1, 0, 0));
}

#[test]
fn test_single_push_dimensions() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    stack.set_background(&vec![0u8; 100 * 100 * 3], 100, 100)?;
    stack.push(&vec![255u8; 10 * 10 * 3], 5, 5, 10, 10)?;
    assert_eq!(stack.dimensions(), Rect::new(5, 5, 10, 10));
    Ok(())
}

/// Two-push merge must reproduce the incremental growth arithmetic, not a
/// true min/max bounding box: the second push moves the top edge up without
/// regrowing the height, so the merged rectangle ends at y=12 even though
/// the first push reached y=15.
#[test]
fn test_push_merge_arithmetic() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    stack.set_background(&vec![0u8; 100 * 100 * 3], 100, 100)?;
    stack.push(&vec![255u8; 10 * 10 * 3], 5, 5, 10, 10)?;
    stack.push(&vec![255u8; 4 * 4 * 3], 20, 2, 4, 4)?;
    assert_eq!(stack.dimensions(), Rect::new(5, 2, 19, 10));
    Ok(())
}

/// A push landing fully inside the current rectangle must not grow it.
#[test]
fn test_push_inside_does_not_grow() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    stack.set_background(&vec![0u8; 100 * 100 * 3], 100, 100)?;
    stack.push(&vec![255u8; 40 * 40 * 3], 10, 10, 40, 40)?;
    stack.push(&vec![255u8; 5 * 5 * 3], 20, 20, 5, 5)?;
    assert_eq!(stack.dimensions(), Rect::new(10, 10, 40, 40));
    Ok(())
}

#[test]
fn test_reset() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    stack.set_background(&vec![0u8; 50 * 50 * 3], 50, 50)?;
    stack.push(&vec![255u8; 10 * 10 * 3], 0, 0, 10, 10)?;
    stack.reset();
    assert_eq!(stack.dimensions(), Rect::new(-1, -1, 0, 0));
    Ok(())
}

#[test]
fn test_set_background_resets_dirty() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    stack.set_background(&vec![0u8; 100 * 100 * 3], 100, 100)?;
    stack.push(&vec![255u8; 10 * 10 * 3], 90, 90, 10, 10)?;
    // A smaller replacement frame would leave the old rect out of bounds.
    stack.set_background(&vec![0u8; 50 * 50 * 3], 50, 50)?;
    assert_eq!(stack.dimensions(), Rect::new(-1, -1, 0, 0));
    Ok(())
}

#[test]
fn test_set_background_short_buffer() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgba);
    stack.set_background(&vec![0u8; 20 * 20 * 4], 20, 20)?;
    stack.push(&vec![255u8; 4 * 4 * 4], 1, 1, 4, 4)?;

    let err = stack.set_background(&vec![0u8; 100], 20, 20);
    assert!(matches!(err, Err(Error::Validation(_))));

    // Prior frame and dirty rect untouched.
    assert_eq!(stack.background_size(), (20, 20));
    assert_eq!(stack.dimensions(), Rect::new(1, 1, 4, 4));
    Ok(())
}

#[test]
fn test_push_out_of_bounds() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    stack.set_background(&vec![7u8; 30 * 30 * 3], 30, 30)?;
    let before = stack.encode_sync()?;

    let tile = vec![255u8; 10 * 10 * 3];
    assert!(matches!(
        stack.push(&tile, 25, 0, 10, 10),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        stack.push(&tile, 0, 25, 10, 10),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        stack.push(&tile, 30, 0, 10, 10),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        stack.push(&tile, 0, 0, 10, 10 + 30),
        Err(Error::Validation(_))
    ));

    // Neither the dirty rect nor the pixels moved.
    assert_eq!(stack.dimensions(), Rect::new(-1, -1, 0, 0));
    assert_eq!(stack.encode_sync()?, before);
    Ok(())
}

#[test]
fn test_push_short_buffer() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Bgra);
    stack.set_background(&vec![0u8; 30 * 30 * 4], 30, 30)?;
    let err = stack.push(&vec![0u8; 10 * 10 * 4 - 1], 0, 0, 10, 10);
    assert!(matches!(err, Err(Error::Validation(_))));
    assert_eq!(stack.dimensions(), Rect::new(-1, -1, 0, 0));
    Ok(())
}

#[test]
fn test_push_requires_background() {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    let err = stack.push(&vec![0u8; 300], 0, 0, 10, 10);
    assert!(matches!(err, Err(Error::Validation(_))));
}

#[test]
fn test_quality_range() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgb);
    stack.set_quality(85)?;
    assert!(matches!(stack.set_quality(-1), Err(Error::Validation(_))));
    assert!(matches!(stack.set_quality(101), Err(Error::Validation(_))));
    assert_eq!(stack.quality(), 85);
    Ok(())
}

#[test]
fn test_encode_requires_background() {
    let stack = DynamicJpegStack::new(SourceFormat::Rgb);
    assert!(matches!(stack.encode_sync(), Err(Error::Validation(_))));
}

#[test]
fn test_encode_full_frame() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgba);
    stack.set_background(&rgba_frame(160, 120), 160, 120)?;
    let jpeg = stack.encode_sync()?;
    assert_eq!(&jpeg[..2], &[0xff, 0xd8]);

    let decoded = turbojpeg::decompress(&jpeg, turbojpeg::PixelFormat::RGB)?;
    assert_eq!(decoded.width, 160);
    assert_eq!(decoded.height, 120);
    Ok(())
}

/// With a dirty rectangle set, only that region is compressed: the decoded
/// geometry is the rectangle, not the frame.
#[test]
fn test_encode_dirty_region_geometry() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgba);
    stack.set_background(&rgba_frame(160, 120), 160, 120)?;
    stack.push(&vec![200u8; 48 * 32 * 4], 16, 24, 48, 32)?;

    let jpeg = stack.encode_sync()?;
    let decoded = turbojpeg::decompress(&jpeg, turbojpeg::PixelFormat::RGB)?;
    assert_eq!(decoded.width, 48);
    assert_eq!(decoded.height, 32);
    Ok(())
}

/// Lossy round-trip: decoded pixels of a smooth gradient stay within a
/// tolerance of the source at high quality.
#[test]
fn test_encode_round_trip() -> Result<(), Box<dyn StdError>> {
    let (w, h) = (160usize, 120usize);
    let frame = rgba_frame(w as u32, h as u32);

    let mut stack = DynamicJpegStack::new(SourceFormat::Rgba);
    stack.set_background(&frame, w as u32, h as u32)?;
    stack.set_quality(95)?;

    let jpeg = stack.encode_sync()?;
    let decoded = turbojpeg::decompress(&jpeg, turbojpeg::PixelFormat::RGB)?;

    let mut max_diff = 0i32;
    for i in 0..w * h {
        for c in 0..3 {
            let orig = frame[i * 4 + c] as i32;
            let got = decoded.pixels[i * 3 + c] as i32;
            max_diff = max_diff.max((orig - got).abs());
        }
    }
    assert!(max_diff <= 24, "max channel diff {max_diff} exceeds tolerance");
    Ok(())
}

/// BGR input must come out with channels 0 and 2 swapped in the encode.
#[test]
fn test_bgr_conversion() -> Result<(), Box<dyn StdError>> {
    let (w, h) = (64usize, 64usize);
    // Solid blue-ish frame in BGR order: B=200, G=40, R=10.
    let mut frame = Vec::with_capacity(w * h * 3);
    for _ in 0..w * h {
        frame.extend_from_slice(&[200, 40, 10]);
    }

    let mut stack = DynamicJpegStack::new(SourceFormat::Bgr);
    stack.set_background(&frame, w as u32, h as u32)?;
    stack.set_quality(95)?;

    let jpeg = stack.encode_sync()?;
    let decoded = turbojpeg::decompress(&jpeg, turbojpeg::PixelFormat::RGB)?;
    let p = &decoded.pixels[..3];
    assert!((p[0] as i32 - 10).abs() <= 16, "red {} off", p[0]);
    assert!((p[1] as i32 - 40).abs() <= 16, "green {} off", p[1]);
    assert!((p[2] as i32 - 200).abs() <= 16, "blue {} off", p[2]);
    Ok(())
}

#[tokio::test]
async fn test_encode_async_snapshot() -> Result<(), Box<dyn StdError>> {
    let mut stack = DynamicJpegStack::new(SourceFormat::Rgba);
    stack.set_background(&rgba_frame(160, 120), 160, 120)?;
    stack.push(&vec![200u8; 48 * 32 * 4], 16, 24, 48, 32)?;

    let (jpeg, dims) = stack.encode().await?;
    assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
    // Snapshot taken at submission time matches the dirty rect.
    assert_eq!(dims, Rect::new(16, 24, 48, 32));
    assert_eq!(dims, stack.dimensions());

    stack.reset();
    let (_, dims) = stack.encode().await?;
    assert_eq!(dims, Rect::new(-1, -1, 0, 0));
    Ok(())
}

#[test]
fn test_fixed_stack() -> Result<(), Box<dyn StdError>> {
    let mut stack = FixedJpegStack::new(80, 60, SourceFormat::Rgb)?;
    assert_eq!(stack.size(), (80, 60));

    stack.push(&vec![128u8; 20 * 20 * 3], 10, 10, 20, 20)?;
    assert!(matches!(
        stack.push(&vec![0u8; 20 * 20 * 3], 70, 0, 20, 20),
        Err(Error::Validation(_))
    ));

    let jpeg = stack.encode_sync()?;
    let decoded = turbojpeg::decompress(&jpeg, turbojpeg::PixelFormat::RGB)?;
    assert_eq!(decoded.width, 80);
    assert_eq!(decoded.height, 60);
    Ok(())
}

#[tokio::test]
async fn test_fixed_stack_async() -> Result<(), Box<dyn StdError>> {
    let mut stack = FixedJpegStack::new(80, 60, SourceFormat::Rgba)?;
    stack.push(&vec![128u8; 20 * 20 * 4], 0, 0, 20, 20)?;
    let jpeg = stack.encode().await?;
    assert_eq!(&jpeg[..2], &[0xff, 0xd8]);
    Ok(())
}
