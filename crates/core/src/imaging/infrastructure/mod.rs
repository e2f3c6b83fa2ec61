pub mod image_decoder;
pub mod jpeg_image_encoder;
