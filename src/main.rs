use clap::Parser;
use jpeg_stack::{DynamicJpegStack, SourceFormat};
use std::{error::Error, path::PathBuf, time::Instant};
use tracing::{debug, info};

/// Pixel layout of the synthesized input buffers.
#[derive(clap::ValueEnum, Clone, Debug, PartialEq, Copy)]
enum FormatSetting {
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

/// Demo driver for the dirty-rectangle JPEG stack.
///
/// Synthesizes a background frame, pushes a moving tile for a number of
/// frames and writes the encoded dirty regions to disk, logging the dirty
/// rectangle and encode time per frame.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Frame resolution in pixels (width height)
    #[arg(
        short,
        long,
        env = "FRAME_SIZE",
        default_value = "1280 720",
        value_delimiter = ' ',
        num_args = 2
    )]
    frame_size: Vec<u32>,

    /// Source pixel format for pushed buffers
    #[arg(long, env = "FORMAT", default_value = "rgba", value_enum)]
    format: FormatSetting,

    /// JPEG quality (0-100)
    #[arg(short, long, env = "QUALITY", default_value = "60")]
    quality: i32,

    /// Number of frames to encode
    #[arg(short = 'n', long, env = "FRAMES", default_value = "30")]
    frames: u32,

    /// Edge length of the moving tile in pixels
    #[arg(long, env = "TILE_SIZE", default_value = "64")]
    tile_size: u32,

    /// Output directory for encoded frames
    #[arg(short, long, env = "OUTPUT", default_value = "frames")]
    output: PathBuf,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Horizontal gradient so encode output is visually checkable.
fn gradient(width: u32, height: u32, format: SourceFormat) -> Vec<u8> {
    let bpp = format.bytes_per_pixel();
    let mut pixels = vec![0u8; width as usize * height as usize * bpp];
    for y in 0..height as usize {
        for x in 0..width as usize {
            let p = &mut pixels[(y * width as usize + x) * bpp..];
            p[0] = (x * 255 / width as usize) as u8;
            p[1] = (y * 255 / height as usize) as u8;
            p[2] = 128;
            if bpp == 4 {
                p[3] = 255;
            }
        }
    }
    pixels
}

fn tile(size: u32, shade: u8, format: SourceFormat) -> Vec<u8> {
    let bpp = format.bytes_per_pixel();
    let mut pixels = vec![shade; size as usize * size as usize * bpp];
    if bpp == 4 {
        for p in pixels.chunks_exact_mut(4) {
            p[3] = 255;
        }
    }
    pixels
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let format = match args.format {
        FormatSetting::Rgb => SourceFormat::Rgb,
        FormatSetting::Bgr => SourceFormat::Bgr,
        FormatSetting::Rgba => SourceFormat::Rgba,
        FormatSetting::Bgra => SourceFormat::Bgra,
    };
    let (width, height) = (args.frame_size[0], args.frame_size[1]);

    let mut stack = DynamicJpegStack::new(format);
    stack.set_quality(args.quality)?;
    stack.set_background(&gradient(width, height, format), width, height)?;
    info!("background {}x{} {} quality {}", width, height, format, args.quality);

    std::fs::create_dir_all(&args.output)?;

    let step = args.tile_size / 2;
    for frame in 0..args.frames {
        let x = (frame * step) % (width - args.tile_size);
        let y = (frame * step / 2) % (height - args.tile_size);
        let shade = (frame * 8 % 256) as u8;
        stack.push(
            &tile(args.tile_size, shade, format),
            x,
            y,
            args.tile_size,
            args.tile_size,
        )?;

        let now = Instant::now();
        let (jpeg, dims) = stack.encode().await?;
        let encode_time = now.elapsed();
        debug!("frame {} dirty {} encode: {:?}", frame, dims, encode_time);

        let path = args.output.join(format!("frame-{frame:04}.jpg"));
        std::fs::write(&path, &jpeg)?;
        stack.reset();
    }

    info!("wrote {} frames to {}", args.frames, args.output.display());
    Ok(())
}
