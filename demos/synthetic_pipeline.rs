//! RuClass synthetic pipeline demo
//!
//! Drives the whole frame path without a camera:
//! 1. Generate a YUV 4:2:0 test frame (NV21 or three planes with padded strides)
//! 2. Convert to ARGB and draw it into the classifier crop
//! 3. Print the tensor handed to the classifier and the crop→frame mapping
//!
//! Usage: cargo run -p demos --bin synthetic_pipeline -- --rotation 90 --planar

use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use ndarray::Axis;
use ruclass_convert::yuv420_byte_size;
use ruclass_geometry::{choose_optimal_size, relative_rotation, RectF, ScreenRotation};
use ruclass_preprocess::{PreprocessConfig, Preprocessor, YuvFrame};

#[derive(Parser)]
struct CliArgs {
    #[arg(long, default_value = "640")]
    frame_width: u32,

    #[arg(long, default_value = "480")]
    frame_height: u32,

    #[arg(long, default_value = "224")]
    input_width: u32,

    #[arg(long, default_value = "224")]
    input_height: u32,

    /// Sensor orientation in degrees
    #[arg(long, default_value = "90")]
    rotation: i32,

    /// Screen rotation in degrees (0, 90, 180 or 270)
    #[arg(long, default_value = "0")]
    screen: u32,

    /// Deliver the frame as three planes instead of one NV21 buffer
    #[arg(long)]
    planar: bool,

    /// Stretch to the input size instead of fill-cropping
    #[arg(long)]
    stretch: bool,

    #[arg(long, default_value = "10")]
    num_frames: usize,

    /// Resolutions the simulated camera offers, e.g. "1920x1080,640x480".
    /// When set, the frame size is picked from these instead of
    /// --frame-width/--frame-height.
    #[arg(long, value_delimiter = ',', value_parser = parse_size)]
    camera_sizes: Vec<(u32, u32)>,
}

fn parse_size(s: &str) -> Result<(u32, u32)> {
    let (w, h) = s
        .split_once('x')
        .with_context(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    Ok((w.trim().parse()?, h.trim().parse()?))
}

fn screen_rotation(degrees: u32) -> Result<ScreenRotation> {
    Ok(match degrees {
        0 => ScreenRotation::Rotation0,
        90 => ScreenRotation::Rotation90,
        180 => ScreenRotation::Rotation180,
        270 => ScreenRotation::Rotation270,
        other => bail!("screen rotation must be 0, 90, 180 or 270, got {other}"),
    })
}

/// Planes for a frame with a diagonal luma ramp and blocky chroma.
struct SyntheticFrame {
    y: Vec<u8>,
    u: Vec<u8>,
    v: Vec<u8>,
    y_row_stride: usize,
    uv_row_stride: usize,
}

impl SyntheticFrame {
    fn new(w: usize, h: usize, frame_idx: usize) -> Self {
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        // pad rows the way camera HALs like to
        let y_row_stride = w.next_multiple_of(64);
        let uv_row_stride = cw.next_multiple_of(64);

        let mut y = vec![0u8; y_row_stride * h];
        for row in 0..h {
            for col in 0..w {
                y[row * y_row_stride + col] = (16 + (row + col + frame_idx) * 219 / (w + h)) as u8;
            }
        }
        let mut u = vec![128u8; uv_row_stride * ch];
        let mut v = vec![128u8; uv_row_stride * ch];
        for row in 0..ch {
            for col in 0..cw {
                u[row * uv_row_stride + col] = (64 + (col * 128 / cw)) as u8;
                v[row * uv_row_stride + col] = (64 + (row * 128 / ch)) as u8;
            }
        }
        Self {
            y,
            u,
            v,
            y_row_stride,
            uv_row_stride,
        }
    }

    /// Repack into a tight NV21 buffer (V before U).
    fn to_nv21(&self, w: usize, h: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(yuv420_byte_size(w as u32, h as u32));
        for row in 0..h {
            out.extend_from_slice(&self.y[row * self.y_row_stride..][..w]);
        }
        let (cw, ch) = (w.div_ceil(2), h.div_ceil(2));
        for row in 0..ch {
            for col in 0..cw {
                out.push(self.v[row * self.uv_row_stride + col]);
                out.push(self.u[row * self.uv_row_stride + col]);
            }
        }
        out
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let mut args = CliArgs::parse();

    println!("RuClass Synthetic Pipeline Demo");
    println!("===============================");

    if let Some((w, h)) = choose_optimal_size(&args.camera_sizes, (args.input_width, args.input_height)) {
        println!("✓ Camera preview size chosen: {w}x{h}");
        (args.frame_width, args.frame_height) = (w, h);
    }

    if !args.planar && args.frame_width % 2 != 0 {
        bail!("NV21 repacking needs an even frame width, got {}", args.frame_width);
    }

    let rotation = relative_rotation(args.rotation, screen_rotation(args.screen)?);
    println!("Frame {}x{}, classifier input {}x{}, rotation {rotation}°",
             args.frame_width, args.frame_height, args.input_width, args.input_height);

    let mut preprocessor = Preprocessor::new(PreprocessConfig {
        input_size: (args.input_width, args.input_height),
        maintain_aspect: !args.stretch,
    });

    let (w, h) = (args.frame_width as usize, args.frame_height as usize);
    let mut timings = Vec::with_capacity(args.num_frames);
    let mut last_tensor = None;

    for idx in 0..args.num_frames {
        let synthetic = SyntheticFrame::new(w, h, idx);
        let nv21;
        let frame = if args.planar {
            YuvFrame::planar(
                &synthetic.y,
                &synthetic.u,
                &synthetic.v,
                args.frame_width,
                args.frame_height,
                synthetic.y_row_stride,
                synthetic.uv_row_stride,
                1,
            )
        } else {
            nv21 = synthetic.to_nv21(w, h);
            YuvFrame::semi_planar(&nv21, args.frame_width, args.frame_height)
        };

        let start = Instant::now();
        let tensor = preprocessor
            .run(&frame, rotation)
            .with_context(|| format!("preprocessing frame {idx}"))?;
        timings.push(start.elapsed());
        last_tensor = Some(tensor);
    }

    let Some(tensor) = last_tensor else {
        println!("⚠ No frames requested, nothing to do");
        return Ok(());
    };
    println!("✓ Preprocessed {} frames to tensor shape {:?}", timings.len(), tensor.shape());

    let mean = tensor.mean_axis(Axis(0)).and_then(|a| a.mean_axis(Axis(0)));
    if let Some(mean) = mean {
        println!("  mean RGB: [{:.3}, {:.3}, {:.3}]", mean[0], mean[1], mean[2]);
    }

    let total: f64 = timings.iter().map(|d| d.as_secs_f64()).sum();
    println!("  avg processing time: {:.2}ms", total * 1000.0 / timings.len() as f64);

    let crop = RectF::from_size(args.input_width, args.input_height);
    if let Some(area) = preprocessor.crop_rect_to_frame(&crop) {
        println!("✓ Crop covers frame region [{:.1}, {:.1}] → [{:.1}, {:.1}]",
                 area.left, area.top, area.right, area.bottom);
    }
    if let Some(m) = preprocessor.frame_to_crop() {
        log::debug!("frame→crop transform: {m:?}");
    }

    println!("\nDemo completed successfully!");
    Ok(())
}
