// ruclass-convert/src/lib.rs
// ============================================================
// YUV 4:2:0 → ARGB8888 conversion for RuClass
// Integer-only BT.601 video-range decode (10-bit fixed point),
// bit-exact with the common mobile camera preview kernels.
// ------------------------------------------------------------
// Public API:
//   * yuv_to_argb(y, u, v)       – single pixel kernel
//   * convert_semi_planar(..)    – NV21 single buffer
//   * convert_planar(..)         – Y/U/V planes with strides
//   * check_semi_planar / check_planar – up-front validation
// ============================================================

//! RuClass – pixel format conversion layer
//!
//! Camera sensors hand us YUV 4:2:0 frames in one of two shapes: a single
//! NV21 buffer (luma followed by interleaved **V,U** chroma) or three
//! separate planes with row and pixel strides. Both are converted into a
//! caller-owned `&mut [u32]` of packed `0xAARRGGBB` pixels, so the hot path
//! never allocates and the same buffer is reused frame after frame.
//!
//! Malformed buffers are a caller bug. Hosts that receive frames from
//! untrusted plumbing should run [`check_semi_planar`] / [`check_planar`]
//! first; the conversion functions run the same checks and panic on
//! failure before touching the output.

use thiserror::Error;

/// Largest intermediate channel value (8 bits scaled by 1024).
pub const MAX_CHANNEL_VALUE: i32 = 262_143;

/// Which plane a [`LayoutError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plane {
    /// Whole NV21 buffer.
    SemiPlanar,
    Luma,
    Chroma,
    U,
    V,
}

impl std::fmt::Display for Plane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Plane::SemiPlanar => "NV21",
            Plane::Luma => "Y",
            Plane::Chroma => "UV",
            Plane::U => "U",
            Plane::V => "V",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("Frame dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u32, height: u32 },
    #[error("{plane} plane too short: need {needed} bytes, got {actual}")]
    BufferTooShort {
        plane: Plane,
        needed: usize,
        actual: usize,
    },
    #[error("{plane} stride {stride} is smaller than the minimum {minimum}")]
    StrideTooSmall {
        plane: Plane,
        stride: usize,
        minimum: usize,
    },
    #[error("Output buffer holds {actual} pixels, frame needs exactly {expected}")]
    OutputSize { expected: usize, actual: usize },
    #[error("{plane} plane extent overflows usize")]
    Overflow { plane: Plane },
}

pub type Result<T> = std::result::Result<T, LayoutError>;

/// Geometry of a fully-planar frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanarLayout {
    pub width: u32,
    pub height: u32,
    pub y_row_stride: usize,
    pub uv_row_stride: usize,
    pub uv_pixel_stride: usize,
}

impl PlanarLayout {
    /// Tightly packed I420 layout (no padding, pixel stride 1).
    pub fn packed(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            y_row_stride: width as usize,
            uv_row_stride: (width as usize).div_ceil(2),
            uv_pixel_stride: 1,
        }
    }

    /// Bytes the converter reads from the luma plane, `None` on overflow.
    pub fn luma_extent(&self) -> Option<usize> {
        let (w, h) = (self.width as usize, self.height as usize);
        self.y_row_stride
            .checked_mul(h.saturating_sub(1))?
            .checked_add(w)
    }

    /// Bytes the converter reads from each chroma plane, `None` on overflow.
    pub fn chroma_extent(&self) -> Option<usize> {
        let (w, h) = (self.width as usize, self.height as usize);
        self.uv_row_stride
            .checked_mul(h.saturating_sub(1) >> 1)?
            .checked_add(self.min_chroma_row()?)
    }

    fn min_chroma_row(&self) -> Option<usize> {
        let half_w = (self.width as usize).saturating_sub(1) >> 1;
        half_w.checked_mul(self.uv_pixel_stride)?.checked_add(1)
    }
}

/// Size in bytes of a semi-planar YUV 4:2:0 frame.
pub fn yuv420_byte_size(width: u32, height: u32) -> usize {
    let (w, h) = (width as usize, height as usize);
    let y_size = w * h;
    let uv_size = w.div_ceil(2) * h.div_ceil(2) * 2;
    y_size + uv_size
}

fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(LayoutError::ZeroDimension { width, height });
    }
    Ok(())
}

fn check_output(width: u32, height: u32, out_len: usize) -> Result<()> {
    let expected = width as usize * height as usize;
    if out_len != expected {
        return Err(LayoutError::OutputSize {
            expected,
            actual: out_len,
        });
    }
    Ok(())
}

fn check_len(plane: Plane, needed: usize, actual: usize) -> Result<()> {
    if actual < needed {
        return Err(LayoutError::BufferTooShort {
            plane,
            needed,
            actual,
        });
    }
    Ok(())
}

/// Validate a semi-planar input of `input_len` bytes against its output.
pub fn check_semi_planar(input_len: usize, width: u32, height: u32, out_len: usize) -> Result<()> {
    check_dimensions(width, height)?;
    check_len(Plane::SemiPlanar, yuv420_byte_size(width, height), input_len)?;
    check_output(width, height, out_len)
}

/// Validate three planes against `layout` and the output length.
pub fn check_planar(
    layout: &PlanarLayout,
    y_len: usize,
    u_len: usize,
    v_len: usize,
    out_len: usize,
) -> Result<()> {
    check_dimensions(layout.width, layout.height)?;

    let width = layout.width as usize;
    if layout.y_row_stride < width {
        return Err(LayoutError::StrideTooSmall {
            plane: Plane::Luma,
            stride: layout.y_row_stride,
            minimum: width,
        });
    }
    if layout.uv_pixel_stride == 0 {
        return Err(LayoutError::StrideTooSmall {
            plane: Plane::Chroma,
            stride: 0,
            minimum: 1,
        });
    }
    let min_uv_row = layout.min_chroma_row().ok_or(LayoutError::Overflow {
        plane: Plane::Chroma,
    })?;
    if layout.uv_row_stride < min_uv_row {
        return Err(LayoutError::StrideTooSmall {
            plane: Plane::Chroma,
            stride: layout.uv_row_stride,
            minimum: min_uv_row,
        });
    }

    let luma = layout.luma_extent().ok_or(LayoutError::Overflow { plane: Plane::Luma })?;
    check_len(Plane::Luma, luma, y_len)?;
    let chroma = layout.chroma_extent().ok_or(LayoutError::Overflow {
        plane: Plane::Chroma,
    })?;
    check_len(Plane::U, chroma, u_len)?;
    check_len(Plane::V, chroma, v_len)?;
    check_output(layout.width, layout.height, out_len)
}

/// Convert one video-range YUV sample to opaque `0xAARRGGBB`.
///
/// Float equivalent:
/// `R = 1.164*Y + 1.596*V`, `G = 1.164*Y - 0.813*V - 0.391*U`,
/// `B = 1.164*Y + 2.018*U`, computed here in 10-bit fixed point.
#[inline(always)]
pub fn yuv_to_argb(y: u8, u: u8, v: u8) -> u32 {
    let y = (y as i32 - 16).max(0);
    let u = u as i32 - 128;
    let v = v as i32 - 128;

    let y1192 = 1192 * y;
    let r = (y1192 + 1634 * v).clamp(0, MAX_CHANNEL_VALUE);
    let g = (y1192 - 833 * v - 400 * u).clamp(0, MAX_CHANNEL_VALUE);
    let b = (y1192 + 2066 * u).clamp(0, MAX_CHANNEL_VALUE);

    0xFF00_0000
        | ((r << 6) & 0xFF_0000) as u32
        | ((g >> 2) & 0xFF00) as u32
        | ((b >> 10) & 0xFF) as u32
}

/// NV21 (luma + interleaved V,U) → ARGB8888.
///
/// `output` must hold exactly `width * height` pixels; `input` at least
/// [`yuv420_byte_size`] bytes.
///
/// # Panics
/// On any [`check_semi_planar`] failure, before writing to `output`.
pub fn convert_semi_planar(input: &[u8], width: u32, height: u32, output: &mut [u32]) {
    if let Err(e) = check_semi_planar(input.len(), width, height, output.len()) {
        panic!("convert_semi_planar: {e}");
    }

    let w = width as usize;
    let frame_size = w * height as usize;
    let (luma, chroma) = input.split_at(frame_size);

    for (j, (y_row, out_row)) in luma.chunks_exact(w).zip(output.chunks_exact_mut(w)).enumerate() {
        // rows pair up on the same chroma row
        let uv_row = &chroma[(j >> 1) * w..];
        for (i, (&y, px)) in y_row.iter().zip(out_row.iter_mut()).enumerate() {
            let uvp = (i >> 1) * 2;
            // V precedes U
            let v = uv_row[uvp];
            let u = uv_row[uvp + 1];
            *px = yuv_to_argb(y, u, v);
        }
    }
}

/// Fully-planar YUV 4:2:0 → ARGB8888.
///
/// Chroma samples sit at `uv_row_stride * (j >> 1) + (i >> 1) * uv_pixel_stride`
/// in both the U and V planes, which also covers interleaved chroma where
/// `u` and `v` are offset views into one buffer with a pixel stride of 2.
///
/// # Panics
/// On any [`check_planar`] failure, before writing to `output`.
#[allow(clippy::too_many_arguments)]
pub fn convert_planar(
    y_plane: &[u8],
    u_plane: &[u8],
    v_plane: &[u8],
    width: u32,
    height: u32,
    y_row_stride: usize,
    uv_row_stride: usize,
    uv_pixel_stride: usize,
    output: &mut [u32],
) {
    let layout = PlanarLayout {
        width,
        height,
        y_row_stride,
        uv_row_stride,
        uv_pixel_stride,
    };
    convert_planar_layout(y_plane, u_plane, v_plane, &layout, output);
}

/// [`convert_planar`] taking its geometry as a [`PlanarLayout`].
pub fn convert_planar_layout(
    y_plane: &[u8],
    u_plane: &[u8],
    v_plane: &[u8],
    layout: &PlanarLayout,
    output: &mut [u32],
) {
    if let Err(e) = check_planar(layout, y_plane.len(), u_plane.len(), v_plane.len(), output.len()) {
        panic!("convert_planar: {e}");
    }

    let w = layout.width as usize;
    for (j, out_row) in output.chunks_exact_mut(w).enumerate() {
        let p_y = layout.y_row_stride * j;
        let p_uv = layout.uv_row_stride * (j >> 1);
        let y_row = &y_plane[p_y..p_y + w];

        for (i, (&y, px)) in y_row.iter().zip(out_row.iter_mut()).enumerate() {
            let uv_offset = p_uv + (i >> 1) * layout.uv_pixel_stride;
            *px = yuv_to_argb(y, u_plane[uv_offset], v_plane[uv_offset]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(px: u32) -> (u32, u32, u32, u32) {
        (px >> 24, (px >> 16) & 0xFF, (px >> 8) & 0xFF, px & 0xFF)
    }

    #[test]
    fn black_is_zero_luma() {
        assert_eq!(yuv_to_argb(16, 128, 128), 0xFF00_0000);
        // below video range clamps to black too
        assert_eq!(yuv_to_argb(0, 128, 128), 0xFF00_0000);
    }

    #[test]
    fn white_is_near_peak() {
        let (a, r, g, b) = channels(yuv_to_argb(235, 128, 128));
        assert_eq!(a, 0xFF);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert!(r >= 250, "white came out as {r}");
    }

    #[test]
    fn mid_gray_value() {
        assert_eq!(yuv_to_argb(128, 128, 128), 0xFF82_8282);
    }

    #[test]
    fn always_opaque_and_in_range() {
        // every 3rd value per axis plus the extremes
        let samples: Vec<u8> = (0..=255u8).step_by(3).chain([254, 255]).collect();
        for &y in &samples {
            for &u in &samples {
                for &v in &samples {
                    let px = yuv_to_argb(y, u, v);
                    assert_eq!(px >> 24, 0xFF, "alpha for ({y},{u},{v})");
                }
            }
        }
    }

    #[test]
    fn saturated_chroma_clamps() {
        // strong red: V high, U low
        let (_, r, _, b) = channels(yuv_to_argb(200, 0, 255));
        assert_eq!(r, 0xFF);
        assert_eq!(b, 0);
    }

    #[test]
    fn byte_size_rounds_chroma_up() {
        assert_eq!(yuv420_byte_size(4, 4), 16 + 8);
        assert_eq!(yuv420_byte_size(3, 3), 9 + 8);
        assert_eq!(yuv420_byte_size(640, 480), 640 * 480 * 3 / 2);
    }

    #[test]
    fn semi_planar_checks() {
        assert_eq!(
            check_semi_planar(10, 0, 4, 0),
            Err(LayoutError::ZeroDimension { width: 0, height: 4 })
        );
        assert_eq!(
            check_semi_planar(23, 4, 4, 16),
            Err(LayoutError::BufferTooShort {
                plane: Plane::SemiPlanar,
                needed: 24,
                actual: 23
            })
        );
        assert_eq!(
            check_semi_planar(24, 4, 4, 15),
            Err(LayoutError::OutputSize {
                expected: 16,
                actual: 15
            })
        );
        assert!(check_semi_planar(24, 4, 4, 16).is_ok());
    }

    #[test]
    fn planar_checks() {
        let mut layout = PlanarLayout::packed(4, 4);
        assert!(check_planar(&layout, 16, 4, 4, 16).is_ok());

        layout.y_row_stride = 3;
        assert!(matches!(
            check_planar(&layout, 16, 4, 4, 16),
            Err(LayoutError::StrideTooSmall { plane: Plane::Luma, .. })
        ));

        let mut layout = PlanarLayout::packed(4, 4);
        layout.uv_pixel_stride = 0;
        assert!(matches!(
            check_planar(&layout, 16, 4, 4, 16),
            Err(LayoutError::StrideTooSmall { plane: Plane::Chroma, .. })
        ));

        let layout = PlanarLayout::packed(4, 4);
        assert_eq!(
            check_planar(&layout, 16, 4, 3, 16),
            Err(LayoutError::BufferTooShort {
                plane: Plane::V,
                needed: 4,
                actual: 3
            })
        );
    }

    #[test]
    fn unpadded_last_row_is_accepted() {
        // camera planes often stop right after the last pixel
        let layout = PlanarLayout {
            width: 4,
            height: 2,
            y_row_stride: 8,
            uv_row_stride: 8,
            uv_pixel_stride: 2,
        };
        assert_eq!(layout.luma_extent(), Some(12));
        assert_eq!(layout.chroma_extent(), Some(3));
        assert!(check_planar(&layout, 12, 3, 3, 8).is_ok());
    }

    #[test]
    #[should_panic(expected = "convert_semi_planar")]
    fn short_input_panics() {
        let input = vec![0u8; 10];
        let mut out = vec![0u32; 16];
        convert_semi_planar(&input, 4, 4, &mut out);
    }
}
