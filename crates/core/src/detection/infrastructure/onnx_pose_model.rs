/// YOLO-pose landmark model using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference and picking the most
/// confident person; its COCO face keypoints are mapped onto the head
/// landmark catalogue.
use std::path::Path;
use std::sync::Mutex;

use crate::detection::domain::head_landmarks::{HeadLandmark, Landmark, LandmarkSet};
use crate::detection::domain::pose_model::{PoseError, PoseModel};
use crate::shared::frame::Frame;

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default person confidence for accepting a pose.
pub const DEFAULT_POSE_CONFIDENCE: f64 = 0.5;

/// Box (4) + score (1) + 17 COCO keypoints × (x, y, conf).
const NUM_COCO_KEYPOINTS: usize = 17;
const KEYPOINT_OFFSET: usize = 5;

/// COCO keypoint index → head landmark. Eye corners have no COCO counterpart.
const HEAD_KEYPOINTS: [(usize, HeadLandmark); 5] = [
    (0, HeadLandmark::Nose),
    (1, HeadLandmark::LeftEye),
    (2, HeadLandmark::RightEye),
    (3, HeadLandmark::LeftEar),
    (4, HeadLandmark::RightEar),
];

/// Pose model backed by an ONNX Runtime session.
///
/// The session is guarded by a mutex so one loaded model can be shared
/// by concurrent pipeline runs; inference calls are serialised.
pub struct OnnxPoseModel {
    session: Mutex<ort::session::Session>,
    confidence: f64,
    input_size: u32,
}

impl OnnxPoseModel {
    /// Load a YOLO-pose ONNX model.
    ///
    /// The input resolution is read from the model's NCHW input shape,
    /// falling back to 640 when the shape is dynamic.
    pub fn new(model_path: &Path, confidence: f64) -> Result<Self, PoseError> {
        let session = ort::session::Session::builder()
            .map_err(|e| PoseError::Inference(e.to_string()))?
            .commit_from_file(model_path)
            .map_err(|e| PoseError::Inference(e.to_string()))?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        log::info!(
            "Loaded pose model {} (input {input_size}x{input_size})",
            model_path.display()
        );

        Ok(Self {
            session: Mutex::new(session),
            confidence,
            input_size,
        })
    }
}

impl PoseModel for OnnxPoseModel {
    fn estimate(&self, sub_image: &Frame) -> Result<Option<LandmarkSet>, PoseError> {
        let (input_tensor, scale, pad_x, pad_y) = letterbox(sub_image, self.input_size);
        let input_value = ort::value::Tensor::from_array(input_tensor)
            .map_err(|e| PoseError::Inference(e.to_string()))?;

        let (data, shape) = {
            let mut session = self.session.lock().map_err(|_| PoseError::Poisoned)?;
            let outputs = session
                .run(ort::inputs![input_value])
                .map_err(|e| PoseError::Inference(e.to_string()))?;
            if outputs.len() == 0 {
                return Err(PoseError::MalformedOutput("model produced no outputs".into()));
            }
            let tensor = outputs[0]
                .try_extract_array::<f32>()
                .map_err(|e| PoseError::MalformedOutput(e.to_string()))?;
            let shape = tensor.shape().to_vec();
            let data: Vec<f32> = tensor.iter().copied().collect();
            (data, shape)
        };

        let Some(row) = best_detection(&data, &shape, self.confidence)? else {
            return Ok(None);
        };

        let landmarks = HEAD_KEYPOINTS
            .iter()
            .map(|&(k, name)| {
                let base = KEYPOINT_OFFSET + k * 3;
                let x = (row[base] as f64 - pad_x as f64) / scale;
                let y = (row[base + 1] as f64 - pad_y as f64) / scale;
                let visibility = (row[base + 2] as f64).clamp(0.0, 1.0);
                (name, Landmark::new(x as i32, y as i32, visibility))
            })
            .collect();
        Ok(Some(landmarks))
    }
}

/// The highest-scoring detection row at or above `confidence`.
///
/// Output shape is `[1, features, detections]` (transposed) or
/// `[1, detections, features]`; both are handled.
fn best_detection(
    data: &[f32],
    shape: &[usize],
    confidence: f64,
) -> Result<Option<Vec<f32>>, PoseError> {
    if shape.len() != 3 {
        return Err(PoseError::MalformedOutput(format!(
            "unexpected output shape {shape:?}"
        )));
    }
    let min_feats = KEYPOINT_OFFSET + NUM_COCO_KEYPOINTS * 3;
    let transposed = shape[1] >= min_feats && (shape[2] < min_feats || shape[1] < shape[2]);
    let (num_dets, num_feats) = if transposed {
        (shape[2], shape[1])
    } else {
        (shape[1], shape[2])
    };
    if num_feats < min_feats {
        return Err(PoseError::MalformedOutput(format!(
            "expected at least {min_feats} features per detection, got {num_feats}"
        )));
    }
    if data.len() < num_dets * num_feats {
        return Err(PoseError::MalformedOutput(format!(
            "output has {} values, shape {shape:?} needs {}",
            data.len(),
            num_dets * num_feats
        )));
    }

    let row = |i: usize| -> Vec<f32> {
        if transposed {
            (0..num_feats).map(|f| data[f * num_dets + i]).collect()
        } else {
            data[i * num_feats..(i + 1) * num_feats].to_vec()
        }
    };

    let best = (0..num_dets)
        .map(|i| {
            let score = if transposed {
                data[4 * num_dets + i]
            } else {
                data[i * num_feats + 4]
            };
            (i, score as f64)
        })
        .filter(|&(_, score)| score >= confidence)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

    Ok(best.map(|(i, _)| row(i)))
}

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = ((fw * scale).round() as u32).min(target_size);
    let new_h = ((fh * scale).round() as u32).min(target_size);
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Padding gray 114/255, YOLO convention
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let channels = (frame.channels() as usize).min(3);

    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                let sc = c.min(channels - 1);
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, sc]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEATS: usize = KEYPOINT_OFFSET + NUM_COCO_KEYPOINTS * 3;

    fn detection_row(score: f32, nose: (f32, f32, f32)) -> Vec<f32> {
        let mut row = vec![0.0f32; FEATS];
        row[4] = score;
        row[5] = nose.0;
        row[6] = nose.1;
        row[7] = nose.2;
        row
    }

    #[test]
    fn test_letterbox_tall_sub_image() {
        // 100x200 → scale 3.2, new 320x640, pad_x 160
        let frame = Frame::new(vec![128u8; 100 * 200 * 3], 100, 200, 3);
        let (tensor, scale, pad_x, pad_y) = letterbox(&frame, 640);
        assert_eq!(tensor.shape(), &[1, 3, 640, 640]);
        assert!((scale - 3.2).abs() < 0.01);
        assert_eq!(pad_x, 160);
        assert_eq!(pad_y, 0);
    }

    #[test]
    fn test_letterbox_pad_value() {
        let frame = Frame::new(vec![255u8; 50 * 100 * 3], 50, 100, 3);
        let (tensor, _, pad_x, _) = letterbox(&frame, 640);
        assert!(pad_x > 0);
        assert!((tensor[[0, 0, 0, 0]] - 114.0 / 255.0).abs() < 0.01);
        assert!((tensor[[0, 0, 10, pad_x as usize + 1]] - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_best_detection_row_major() {
        let mut data = detection_row(0.6, (1.0, 2.0, 0.9));
        data.extend(detection_row(0.8, (3.0, 4.0, 0.7)));
        let row = best_detection(&data, &[1, 2, FEATS], 0.5).unwrap().unwrap();
        assert_eq!(row[5], 3.0);
    }

    #[test]
    fn test_best_detection_transposed() {
        // Three detections, feature-major layout
        let rows = [
            detection_row(0.2, (1.0, 1.0, 1.0)),
            detection_row(0.9, (7.0, 8.0, 0.5)),
            detection_row(0.4, (2.0, 2.0, 1.0)),
        ];
        let mut data = vec![0.0f32; FEATS * 3];
        for (i, r) in rows.iter().enumerate() {
            for (f, v) in r.iter().enumerate() {
                data[f * 3 + i] = *v;
            }
        }
        let row = best_detection(&data, &[1, FEATS, 3], 0.5).unwrap().unwrap();
        assert_eq!(row[5], 7.0);
        assert_eq!(row[6], 8.0);
    }

    #[test]
    fn test_best_detection_below_confidence_is_none() {
        let data = detection_row(0.3, (1.0, 2.0, 0.9));
        assert!(best_detection(&data, &[1, 1, FEATS], 0.5).unwrap().is_none());
    }

    #[test]
    fn test_best_detection_rejects_short_rows() {
        let data = vec![0.0f32; 20];
        assert!(matches!(
            best_detection(&data, &[1, 1, 20], 0.5),
            Err(PoseError::MalformedOutput(_))
        ));
    }

    #[test]
    fn test_best_detection_rejects_bad_rank() {
        assert!(best_detection(&[], &[1, 56], 0.5).is_err());
    }
}
