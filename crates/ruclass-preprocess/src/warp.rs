// ruclass-preprocess/src/warp.rs
//! Nearest-neighbour affine resampling of ARGB buffers.
//!
//! Equivalent to drawing the source bitmap through a matrix onto the crop
//! canvas without filtering: every destination pixel centre is mapped back
//! into the source and takes the pixel it lands in. Pixels that land outside
//! the source become fully transparent, so the whole destination is always
//! rewritten.

use ruclass_geometry::Affine2D;

use crate::{PreprocessError, Result};

/// Value written where the source does not cover the destination.
pub const TRANSPARENT: u32 = 0;

fn check_buffer(len: usize, width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(PreprocessError::ZeroSize { width, height });
    }
    let expected = width as usize * height as usize;
    if len != expected {
        return Err(PreprocessError::BufferSize {
            expected,
            actual: len,
        });
    }
    Ok(())
}

/// Draw `src` into `dst` through the source→destination `transform`.
pub fn warp_nearest(
    src: &[u32],
    src_size: (u32, u32),
    transform: &Affine2D,
    dst: &mut [u32],
    dst_size: (u32, u32),
) -> Result<()> {
    let dst_to_src = transform.invert().ok_or(PreprocessError::SingularTransform)?;
    check_buffer(src.len(), src_size.0, src_size.1)?;
    check_buffer(dst.len(), dst_size.0, dst_size.1)?;
    resample(src, src_size, &dst_to_src, dst, dst_size.0 as usize);
    Ok(())
}

/// Inner loop with an already inverted matrix; sizes are trusted.
pub(crate) fn resample(
    src: &[u32],
    (src_w, src_h): (u32, u32),
    dst_to_src: &Affine2D,
    dst: &mut [u32],
    dst_w: usize,
) {
    let (w, h) = (src_w as f32, src_h as f32);
    let stride = src_w as usize;

    for (j, row) in dst.chunks_exact_mut(dst_w).enumerate() {
        let cy = j as f32 + 0.5;
        for (i, px) in row.iter_mut().enumerate() {
            // map each centre directly; stepping would accumulate error
            let (sx, sy) = dst_to_src.map_point(i as f32 + 0.5, cy);
            let (fx, fy) = (sx.floor(), sy.floor());
            *px = if fx >= 0.0 && fy >= 0.0 && fx < w && fy < h {
                src[fy as usize * stride + fx as usize]
            } else {
                TRANSPARENT
            };
        }
    }
}
