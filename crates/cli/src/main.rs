use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::Parser;

use headblur_core::blurring::infrastructure::cpu_rectangular_blurrer::CpuRectangularBlurrer;
use headblur_core::detection::domain::object_detections::DetectorOutput;
use headblur_core::detection::domain::pose_model::PoseModel;
use headblur_core::detection::infrastructure::no_pose_model::NoPoseModel;
use headblur_core::detection::infrastructure::onnx_pose_model::{
    OnnxPoseModel, DEFAULT_POSE_CONFIDENCE,
};
use headblur_core::imaging::infrastructure::image_decoder::read_image;
use headblur_core::imaging::infrastructure::jpeg_image_encoder::JpegImageEncoder;
use headblur_core::pipeline::blur_heads_use_case::BlurHeadsUseCase;
use headblur_core::pipeline::processing_config::{ProcessingConfig, ProcessingMode};
use headblur_core::pipeline::skip_policy::processing_stats;
use headblur_core::shared::constants::{
    DEFAULT_JPEG_QUALITY, IMAGE_EXTENSIONS, PERSON_MIN_CONFIDENCE,
};

/// Blur the heads of detected people in a still image.
#[derive(Parser)]
#[command(name = "headblur")]
struct Cli {
    /// Input image file.
    input: PathBuf,

    /// Output JPEG file (written only if something was blurred).
    output: PathBuf,

    /// Object detector output (JSON: class → [{coordinate, confidence}]).
    #[arg(long)]
    detections: PathBuf,

    /// Processing mode: standard or fast.
    #[arg(long)]
    mode: Option<String>,

    /// Minimum mean landmark visibility for a pose-based head box (0.0-1.0).
    #[arg(long)]
    confidence: Option<f64>,

    /// Fast mode: skip people shorter than this fraction of the image (0.0-1.0).
    #[arg(long)]
    min_relative_height: Option<f64>,

    /// Skip person boxes narrower or shorter than this many pixels.
    #[arg(long)]
    min_subframe_size: Option<i32>,

    /// YOLO-pose ONNX model. Without it every person goes to the fallback.
    #[arg(long)]
    pose_model: Option<PathBuf>,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
    quality: u8,

    /// JSON processing config; flags given on the command line override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print how many people will be processed and skipped.
    #[arg(long)]
    stats: bool,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = build_config(&cli)?;
    let detector_output = DetectorOutput::load(&cli.detections)?;
    let frame = read_image(&cli.input)?;
    let persons = detector_output.detections.person_boxes(PERSON_MIN_CONFIDENCE);
    let original_size = detector_output
        .original_size
        .unwrap_or((frame.width(), frame.height()));

    if cli.stats {
        let stats = processing_stats(&persons, original_size, &config);
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    let use_case = BlurHeadsUseCase::new(
        build_pose_model(cli.pose_model.as_deref())?,
        Box::new(CpuRectangularBlurrer::default()),
        Box::new(JpegImageEncoder::new(cli.quality)),
    );
    let output = use_case.execute(frame, &persons, original_size, &config)?;

    match output.image {
        Some(bytes) => {
            if let Some(parent) = cli.output.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&cli.output, bytes)?;
            log::info!(
                "Blurred {} of {} people; output written to {}",
                output.report.applied_count(),
                persons.len(),
                cli.output.display()
            );
        }
        None => log::info!("Nothing changed; no output written"),
    }
    Ok(())
}

fn build_config(cli: &Cli) -> Result<ProcessingConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
            serde_json::from_str(&json)?
        }
        None => ProcessingConfig::default(),
    };

    if let Some(mode) = &cli.mode {
        config.mode = mode.parse::<ProcessingMode>()?;
    }
    if let Some(confidence) = cli.confidence {
        config.confidence_threshold = confidence;
    }
    if let Some(height) = cli.min_relative_height {
        config.min_relative_height = height;
    }
    if let Some(size) = cli.min_subframe_size {
        config.min_subframe_size = size;
    }
    config.validate()?;
    Ok(config)
}

fn build_pose_model(path: Option<&Path>) -> Result<Arc<dyn PoseModel>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Arc::new(OnnxPoseModel::new(path, DEFAULT_POSE_CONFIDENCE)?)),
        None => {
            log::info!("No pose model given; using the top-of-box fallback only");
            Ok(Arc::new(NoPoseModel))
        }
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }
    if !is_image(&cli.input) {
        return Err(format!(
            "Input must be an image ({}), got {}",
            IMAGE_EXTENSIONS.join(", "),
            cli.input.display()
        )
        .into());
    }
    if !cli.detections.exists() {
        return Err(format!("Detections file not found: {}", cli.detections.display()).into());
    }
    if let Some(model) = &cli.pose_model {
        if !model.exists() {
            return Err(format!("Pose model not found: {}", model.display()).into());
        }
    }
    if !(1..=100).contains(&cli.quality) {
        return Err(format!("Quality must be between 1 and 100, got {}", cli.quality).into());
    }
    if let Some(confidence) = cli.confidence {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(format!(
                "Confidence must be between 0.0 and 1.0, got {confidence}"
            )
            .into());
        }
    }
    if let Some(size) = cli.min_subframe_size {
        if size < 0 {
            return Err(format!("Minimum sub-image size must not be negative, got {size}").into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
