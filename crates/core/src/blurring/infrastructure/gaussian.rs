use ndarray::{Array3, ArrayViewMut3, Axis};

/// Normalised 1D Gaussian weights, applied separably along rows then columns.
#[derive(Clone, Debug)]
pub struct GaussianKernel {
    weights: Vec<f32>,
}

impl GaussianKernel {
    /// `size` is forced odd. Without a positive `sigma` it is derived as
    /// `size / 6`.
    pub fn new(size: usize, sigma: Option<f64>) -> Self {
        let size = size.max(1) | 1;
        let sigma = sigma.filter(|s| *s > 0.0).unwrap_or(size as f64 / 6.0);
        let half = (size / 2) as f64;
        let raw: Vec<f64> = (0..size)
            .map(|i| {
                let x = i as f64 - half;
                (-x * x / (2.0 * sigma * sigma)).exp()
            })
            .collect();
        let sum: f64 = raw.iter().sum();
        Self {
            weights: raw.iter().map(|v| (v / sum) as f32).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Blurs a `rows × cols × channels` view in place. Pixels past the view
    /// edge are treated as copies of the nearest edge pixel.
    pub fn blur(&self, mut pixels: ArrayViewMut3<'_, u8>) {
        let (rows, cols, _) = pixels.dim();
        if self.weights.len() <= 1 || rows == 0 || cols == 0 {
            return;
        }
        let src = pixels.mapv(f32::from);
        let horizontal = self.convolve(&src, Axis(1));
        let blurred = self.convolve(&horizontal, Axis(0));
        pixels.zip_mut_with(&blurred, |dst, &v| *dst = v.round().clamp(0.0, 255.0) as u8);
    }

    fn convolve(&self, src: &Array3<f32>, axis: Axis) -> Array3<f32> {
        let len = src.len_of(axis) as isize;
        let radius = (self.weights.len() / 2) as isize;
        let mut out = Array3::<f32>::zeros(src.raw_dim());
        for (k, &w) in self.weights.iter().enumerate() {
            let offset = k as isize - radius;
            for i in 0..len {
                let j = (i + offset).clamp(0, len - 1);
                out.index_axis_mut(axis, i as usize)
                    .scaled_add(w, &src.index_axis(axis, j as usize));
            }
        }
        out
    }
}
