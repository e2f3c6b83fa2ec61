//! Decides which person boxes are worth processing.
//!
//! The orchestrator loop and the statistics report both go through
//! [`skip_reason`], so a summary can never disagree with a real run.

use serde::Serialize;

use crate::shared::bounding_box::BoundingBox;

use super::processing_config::{ProcessingConfig, ProcessingMode};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SkipReason {
    /// Fast mode: the person is small relative to the whole image.
    FastModeTooSmall { relative_height: f64 },
    SubframeTooSmall { width: i32, height: i32 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::FastModeTooSmall { relative_height } => {
                write!(f, "fast mode, relative height {relative_height:.3}")
            }
            SkipReason::SubframeTooSmall { width, height } => {
                write!(f, "sub-image too small ({width}x{height})")
            }
        }
    }
}

/// Why `person` should be skipped, or `None` when it should be processed.
///
/// The fast-mode check runs first. `original_height` must be non-zero.
pub fn skip_reason(
    person: &BoundingBox,
    original_height: u32,
    config: &ProcessingConfig,
) -> Option<SkipReason> {
    if config.mode == ProcessingMode::Fast {
        let relative_height = person.height as f64 / original_height as f64;
        if relative_height < config.min_relative_height {
            return Some(SkipReason::FastModeTooSmall { relative_height });
        }
    }
    if person.width < config.min_subframe_size || person.height < config.min_subframe_size {
        return Some(SkipReason::SubframeTooSmall {
            width: person.width,
            height: person.height,
        });
    }
    None
}

pub fn should_process_person(
    person: &BoundingBox,
    original_height: u32,
    config: &ProcessingConfig,
) -> bool {
    skip_reason(person, original_height, config).is_none()
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessingStats {
    pub total_persons: usize,
    pub will_process: usize,
    pub will_skip: usize,
    pub mode: ProcessingMode,
}

/// Predicts how a run over `persons` will split, without running detection.
pub fn processing_stats(
    persons: &[BoundingBox],
    original_size: (u32, u32),
    config: &ProcessingConfig,
) -> ProcessingStats {
    let (_, original_height) = original_size;
    let will_process = persons
        .iter()
        .filter(|p| should_process_person(p, original_height, config))
        .count();
    ProcessingStats {
        total_persons: persons.len(),
        will_process,
        will_skip: persons.len() - will_process,
        mode: config.mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn fast() -> ProcessingConfig {
        ProcessingConfig::default().with_mode(ProcessingMode::Fast)
    }

    // ── skip_reason ──

    #[test]
    fn test_fast_mode_skips_tiny_relative_height() {
        let person = BoundingBox::new(0, 0, 40, 5);
        let reason = skip_reason(&person, 1000, &fast());
        assert!(matches!(
            reason,
            Some(SkipReason::FastModeTooSmall { relative_height }) if (relative_height - 0.005).abs() < 1e-12
        ));
    }

    #[test]
    fn test_standard_mode_ignores_relative_height() {
        let person = BoundingBox::new(0, 0, 40, 5);
        let reason = skip_reason(&person, 1000, &ProcessingConfig::default());
        // Still too small for a sub-image, but not for the fast-mode reason
        assert_eq!(
            reason,
            Some(SkipReason::SubframeTooSmall {
                width: 40,
                height: 5
            })
        );
    }

    #[rstest]
    #[case::narrow(29, 200, false)]
    #[case::short(200, 29, false)]
    #[case::at_limit(30, 30, true)]
    #[case::large(80, 250, true)]
    fn test_subframe_size_rule(#[case] w: i32, #[case] h: i32, #[case] processed: bool) {
        let person = BoundingBox::new(10, 10, w, h);
        assert_eq!(
            should_process_person(&person, 300, &ProcessingConfig::default()),
            processed
        );
    }

    #[test]
    fn test_fast_mode_relative_height_is_inclusive() {
        // 100 / 1000 == 0.10 is not below the cutoff
        let person = BoundingBox::new(0, 0, 50, 100);
        assert!(should_process_person(&person, 1000, &fast()));
        let person = BoundingBox::new(0, 0, 50, 99);
        assert!(!should_process_person(&person, 1000, &fast()));
    }

    // ── processing_stats ──

    #[test]
    fn test_stats_match_predicate() {
        let persons = [
            BoundingBox::new(0, 0, 80, 250),
            BoundingBox::new(0, 0, 40, 60),
            BoundingBox::new(0, 0, 10, 10),
        ];
        let stats = processing_stats(&persons, (1920, 1000), &fast());
        assert_eq!(
            stats,
            ProcessingStats {
                total_persons: 3,
                will_process: 1,
                will_skip: 2,
                mode: ProcessingMode::Fast,
            }
        );

        let stats = processing_stats(&persons, (1920, 1000), &ProcessingConfig::default());
        assert_eq!(stats.will_process, 2);
        assert_eq!(stats.will_skip, 1);
    }

    #[test]
    fn test_stats_for_no_persons() {
        let stats = processing_stats(&[], (640, 480), &ProcessingConfig::default());
        assert_eq!(stats.total_persons, 0);
        assert_eq!(stats.will_process, 0);
        assert_eq!(stats.will_skip, 0);
    }
}
