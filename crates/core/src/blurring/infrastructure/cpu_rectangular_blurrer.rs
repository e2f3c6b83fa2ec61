use ndarray::{s, ArrayViewMut3};

use crate::blurring::domain::frame_blurrer::FrameBlurrer;
use crate::shared::bounding_box::BoundingBox;
use crate::shared::constants::{BLUR_KERNEL_SIZE, BLUR_SIGMA};
use crate::shared::frame::Frame;

use super::gaussian::GaussianKernel;

/// Blurs the full rectangle of each region with a separable Gaussian.
///
/// Regions are clamped to the frame first; the parts outside are ignored.
/// Overlapping regions are blurred in order, so later ones see earlier
/// results.
pub struct CpuRectangularBlurrer {
    kernel: GaussianKernel,
}

impl CpuRectangularBlurrer {
    /// `sigma` of `None` derives it from the kernel size.
    pub fn new(kernel_size: usize, sigma: Option<f64>) -> Self {
        Self {
            kernel: GaussianKernel::new(kernel_size, sigma),
        }
    }
}

impl Default for CpuRectangularBlurrer {
    fn default() -> Self {
        Self::new(BLUR_KERNEL_SIZE, Some(BLUR_SIGMA))
    }
}

impl FrameBlurrer for CpuRectangularBlurrer {
    fn blur(
        &self,
        frame: &mut Frame,
        regions: &[BoundingBox],
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (fw, fh) = (frame.width(), frame.height());
        let shape = (fh as usize, fw as usize, frame.channels() as usize);
        let mut pixels = ArrayViewMut3::from_shape(shape, frame.data_mut())?;

        for region in regions {
            let Some(r) = region.clamp_to(fw, fh) else {
                continue;
            };
            let (x, y) = (r.x as usize, r.y as usize);
            let (w, h) = (r.width as usize, r.height as usize);
            self.kernel
                .blur(pixels.slice_mut(s![y..y + h, x..x + w, ..]));
        }

        Ok(())
    }
}
