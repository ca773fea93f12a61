//! ruclass‑preprocess – YUV camera frame → fixed-size classifier input.
//!
//! [`Preprocessor`] owns the two pixel buffers that live across frames (the
//! full-frame ARGB buffer and the classifier crop) plus the cached
//! frame→crop transform and its inverse. Geometry is rebuilt only when the
//! frame size or rotation changes; every other frame is a straight
//! convert → warp into memory that is already allocated.

use image::RgbImage;
use ndarray::Array3;
use ruclass_convert::LayoutError;
use ruclass_geometry::{build_transform, Affine2D, RectF};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod frame;
mod output;
mod warp;

pub use frame::{FrameBacking, YuvFrame};
pub use output::{argb_to_rgb_image, argb_to_tensor};
pub use warp::{warp_nearest, TRANSPARENT};
pub use ruclass_geometry::{relative_rotation, ScreenRotation};

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Invalid frame layout: {0}")]
    Layout(#[from] LayoutError),
    #[error("Sizes must be positive, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
    #[error("Frame-to-crop transform is not invertible")]
    SingularTransform,
    #[error("Pixel buffer holds {actual} pixels, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
    #[error("No frame geometry yet; call prepare() or process() first")]
    NotPrepared,
}

pub type Result<T> = std::result::Result<T, PreprocessError>;

/// Classifier-facing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessConfig {
    /// Classifier input dimensions (width, height)
    pub input_size: (u32, u32),
    /// Fill the crop with a uniform scale instead of stretching
    pub maintain_aspect: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            input_size: (224, 224),
            maintain_aspect: true,
        }
    }
}

/// Transforms cached for one frame size + rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropGeometry {
    pub frame_size: (u32, u32),
    pub rotation: i32,
    pub frame_to_crop: Affine2D,
    pub crop_to_frame: Affine2D,
}

impl CropGeometry {
    fn matches(&self, width: u32, height: u32, rotation: i32) -> bool {
        self.frame_size == (width, height) && self.rotation == rotation
    }
}

pub struct Preprocessor {
    config: PreprocessConfig,
    geometry: Option<CropGeometry>,
    frame_rgb: Vec<u32>,
    crop: Vec<u32>,
}

impl Preprocessor {
    /// Create a pre‑processor that outputs the configured crop size.
    pub fn new(config: PreprocessConfig) -> Self {
        Self {
            config,
            geometry: None,
            frame_rgb: Vec::new(),
            crop: Vec::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(PreprocessConfig::default())
    }

    pub fn config(&self) -> &PreprocessConfig {
        &self.config
    }

    /// Swap the configuration; geometry is rebuilt on the next frame.
    pub fn set_config(&mut self, config: PreprocessConfig) {
        self.config = config;
        self.geometry = None;
    }

    pub fn geometry(&self) -> Option<&CropGeometry> {
        self.geometry.as_ref()
    }

    /// (Re)build buffers and transforms for `frame_w`×`frame_h` frames
    /// rotated by `rotation` degrees.
    pub fn prepare(&mut self, frame_w: u32, frame_h: u32, rotation: i32) -> Result<&CropGeometry> {
        let (crop_w, crop_h) = self.config.input_size;
        for (width, height) in [(frame_w, frame_h), (crop_w, crop_h)] {
            if width == 0 || height == 0 {
                return Err(PreprocessError::ZeroSize { width, height });
            }
        }

        log::info!("Camera orientation relative to screen canvas: {rotation}");
        log::info!("Initializing at size {frame_w}x{frame_h}, crop {crop_w}x{crop_h}");

        let frame_to_crop = build_transform(
            frame_w,
            frame_h,
            crop_w,
            crop_h,
            rotation,
            self.config.maintain_aspect,
        );
        let crop_to_frame = frame_to_crop
            .invert()
            .ok_or(PreprocessError::SingularTransform)?;

        let frame_len = frame_w as usize * frame_h as usize;
        if self.frame_rgb.len() != frame_len {
            log::debug!("Initializing frame buffer at {frame_len} pixels");
            self.frame_rgb.resize(frame_len, 0);
        }
        let crop_len = crop_w as usize * crop_h as usize;
        if self.crop.len() != crop_len {
            log::debug!("Initializing crop buffer at {crop_len} pixels");
            self.crop.resize(crop_len, 0);
        }

        Ok(&*self.geometry.insert(CropGeometry {
            frame_size: (frame_w, frame_h),
            rotation,
            frame_to_crop,
            crop_to_frame,
        }))
    }

    /// Convert `frame` and draw it into the crop. Returns the crop pixels.
    pub fn process(&mut self, frame: &YuvFrame<'_>, rotation: i32) -> Result<&[u32]> {
        frame.validate(frame.pixel_count())?;

        let cached = self
            .geometry
            .filter(|g| g.matches(frame.width, frame.height, rotation));
        let geometry = match cached {
            Some(g) => g,
            None => *self.prepare(frame.width, frame.height, rotation)?,
        };

        frame.convert_into(&mut self.frame_rgb);
        warp::resample(
            &self.frame_rgb,
            geometry.frame_size,
            &geometry.crop_to_frame,
            &mut self.crop,
            self.config.input_size.0 as usize,
        );
        Ok(&self.crop)
    }

    /// CPU path: [`process`](Self::process) then hand back an (H, W, 3) tensor.
    pub fn run(&mut self, frame: &YuvFrame<'_>, rotation: i32) -> Result<Array3<f32>> {
        self.process(frame, rotation)?;
        self.to_tensor()
    }

    pub fn to_tensor(&self) -> Result<Array3<f32>> {
        self.geometry.ok_or(PreprocessError::NotPrepared)?;
        let (w, h) = self.config.input_size;
        argb_to_tensor(&self.crop, w, h).ok_or(PreprocessError::BufferSize {
            expected: w as usize * h as usize,
            actual: self.crop.len(),
        })
    }

    /// Last converted full frame (ARGB).
    pub fn frame_rgb(&self) -> &[u32] {
        &self.frame_rgb
    }

    /// Last classifier crop (ARGB).
    pub fn crop(&self) -> &[u32] {
        &self.crop
    }

    pub fn frame_to_crop(&self) -> Option<&Affine2D> {
        self.geometry.as_ref().map(|g| &g.frame_to_crop)
    }

    pub fn crop_to_frame(&self) -> Option<&Affine2D> {
        self.geometry.as_ref().map(|g| &g.crop_to_frame)
    }

    /// Project a box in crop coordinates (e.g. a classifier result) back
    /// onto the full frame for overlay drawing.
    pub fn crop_rect_to_frame(&self, rect: &RectF) -> Option<RectF> {
        self.crop_to_frame().map(|m| m.map_rect(rect))
    }

    pub fn crop_image(&self) -> Option<RgbImage> {
        self.geometry?;
        let (w, h) = self.config.input_size;
        argb_to_rgb_image(&self.crop, w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default() {
        let config = PreprocessConfig::default();
        assert_eq!(config.input_size, (224, 224));
        assert!(config.maintain_aspect);
    }

    #[test]
    fn prepare_rejects_zero_sizes() {
        let mut pp = Preprocessor::with_defaults();
        assert!(matches!(
            pp.prepare(0, 480, 0),
            Err(PreprocessError::ZeroSize { width: 0, height: 480 })
        ));

        pp.set_config(PreprocessConfig {
            input_size: (224, 0),
            ..Default::default()
        });
        assert!(matches!(
            pp.prepare(640, 480, 0),
            Err(PreprocessError::ZeroSize { width: 224, height: 0 })
        ));
        assert!(pp.geometry().is_none());
    }

    #[test]
    fn prepare_sizes_buffers() {
        let mut pp = Preprocessor::with_defaults();
        let g = *pp.prepare(640, 480, 90).unwrap();
        assert_eq!(g.frame_size, (640, 480));
        assert_eq!(g.rotation, 90);
        assert_eq!(pp.frame_rgb().len(), 640 * 480);
        assert_eq!(pp.crop().len(), 224 * 224);
    }

    #[test]
    fn tensor_before_frame_is_an_error() {
        let pp = Preprocessor::with_defaults();
        assert!(matches!(pp.to_tensor(), Err(PreprocessError::NotPrepared)));
        assert!(pp.crop_image().is_none());
        assert!(pp.crop_rect_to_frame(&RectF::from_size(10, 10)).is_none());
    }
}
