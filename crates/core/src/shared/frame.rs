use ndarray::{ArrayView3, ArrayViewMut3};
use thiserror::Error;

use super::bounding_box::BoundingBox;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame has zero size ({width}x{height})")]
    Empty { width: u32, height: u32 },
    #[error("frame data has {actual} bytes, expected {expected} for {width}x{height}x{channels}")]
    LengthMismatch {
        width: u32,
        height: u32,
        channels: u8,
        expected: usize,
        actual: usize,
    },
}

/// A decoded still image: contiguous RGB bytes in row-major order.
///
/// Format conversion happens at codec boundaries only; the pipeline
/// treats pixel data as opaque.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
        }
    }

    /// Checked constructor for buffers arriving from outside the crate.
    pub fn try_new(data: Vec<u8>, width: u32, height: u32, channels: u8) -> Result<Self, FrameError> {
        let frame = Self {
            data,
            width,
            height,
            channels,
        };
        frame.validate()?;
        Ok(frame)
    }

    /// Checks that the frame is non-empty and its buffer matches its shape.
    pub fn validate(&self) -> Result<(), FrameError> {
        let (width, height, channels) = (self.width, self.height, self.channels);
        if width == 0 || height == 0 || channels == 0 {
            return Err(FrameError::Empty { width, height });
        }
        let expected = (width as usize) * (height as usize) * (channels as usize);
        if self.data.len() != expected {
            return Err(FrameError::LengthMismatch {
                width,
                height,
                channels,
                expected,
                actual: self.data.len(),
            });
        }
        Ok(())
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Whether the buffer length still agrees with the declared shape.
    pub fn is_consistent(&self) -> bool {
        self.data.len() == (self.width as usize) * (self.height as usize) * (self.channels as usize)
    }

    /// Copies the part of `rect` that lies inside the frame.
    ///
    /// Returns the sub-image together with its origin in frame coordinates,
    /// or `None` when the rectangle misses the frame entirely.
    pub fn crop(&self, rect: &BoundingBox) -> Option<(Frame, BoundingBox)> {
        let clamped = rect.clamp_to(self.width, self.height)?;
        let channels = self.channels as usize;
        let fw = self.width as usize;
        let (cx, cy) = (clamped.x as usize, clamped.y as usize);
        let (cw, ch) = (clamped.width as usize, clamped.height as usize);

        let mut data = Vec::with_capacity(cw * ch * channels);
        for row in 0..ch {
            let start = ((cy + row) * fw + cx) * channels;
            data.extend_from_slice(self.data.get(start..start + cw * channels)?);
        }

        let sub = Frame::new(data, clamped.width as u32, clamped.height as u32, self.channels);
        Some((sub, clamped))
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    pub fn as_ndarray_mut(&mut self) -> ArrayViewMut3<'_, u8> {
        ArrayViewMut3::from_shape(self.shape(), &mut self.data)
            .expect("Frame data length must match dimensions")
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
