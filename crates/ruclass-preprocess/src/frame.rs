// ruclass-preprocess/src/frame.rs
use ruclass_convert::{
    check_planar, check_semi_planar, convert_planar_layout, convert_semi_planar, LayoutError,
    PlanarLayout,
};

/// Where a frame's bytes live.
///
/// * `SemiPlanar` – one NV21 buffer (legacy camera preview callbacks)
/// * `Planar`     – three planes with strides (camera2 / image readers)
#[derive(Debug, Clone, Copy)]
pub enum FrameBacking<'a> {
    SemiPlanar(&'a [u8]),
    Planar {
        y: &'a [u8],
        u: &'a [u8],
        v: &'a [u8],
        y_row_stride: usize,
        uv_row_stride: usize,
        uv_pixel_stride: usize,
    },
}

/// Borrowed YUV 4:2:0 frame plus its logical size.
#[derive(Debug, Clone, Copy)]
pub struct YuvFrame<'a> {
    pub backing: FrameBacking<'a>,
    pub width: u32,
    pub height: u32,
}

impl<'a> YuvFrame<'a> {
    pub fn semi_planar(data: &'a [u8], width: u32, height: u32) -> Self {
        Self {
            backing: FrameBacking::SemiPlanar(data),
            width,
            height,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn planar(
        y: &'a [u8],
        u: &'a [u8],
        v: &'a [u8],
        width: u32,
        height: u32,
        y_row_stride: usize,
        uv_row_stride: usize,
        uv_pixel_stride: usize,
    ) -> Self {
        Self {
            backing: FrameBacking::Planar {
                y,
                u,
                v,
                y_row_stride,
                uv_row_stride,
                uv_pixel_stride,
            },
            width,
            height,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    fn layout(&self, y_row_stride: usize, uv_row_stride: usize, uv_pixel_stride: usize) -> PlanarLayout {
        PlanarLayout {
            width: self.width,
            height: self.height,
            y_row_stride,
            uv_row_stride,
            uv_pixel_stride,
        }
    }

    /// Check buffers and strides against an output of `out_len` pixels.
    pub fn validate(&self, out_len: usize) -> Result<(), LayoutError> {
        match self.backing {
            FrameBacking::SemiPlanar(data) => {
                check_semi_planar(data.len(), self.width, self.height, out_len)
            }
            FrameBacking::Planar {
                y,
                u,
                v,
                y_row_stride,
                uv_row_stride,
                uv_pixel_stride,
            } => {
                let layout = self.layout(y_row_stride, uv_row_stride, uv_pixel_stride);
                check_planar(&layout, y.len(), u.len(), v.len(), out_len)
            }
        }
    }

    /// Convert into `out`. Panics on a frame that fails [`validate`](Self::validate).
    pub fn convert_into(&self, out: &mut [u32]) {
        match self.backing {
            FrameBacking::SemiPlanar(data) => convert_semi_planar(data, self.width, self.height, out),
            FrameBacking::Planar {
                y,
                u,
                v,
                y_row_stride,
                uv_row_stride,
                uv_pixel_stride,
            } => {
                let layout = self.layout(y_row_stride, uv_row_stride, uv_pixel_stride);
                convert_planar_layout(y, u, v, &layout, out);
            }
        }
    }
}
