pub mod no_pose_model;
pub mod onnx_pose_model;
