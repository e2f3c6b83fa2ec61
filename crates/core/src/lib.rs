//! Pose-guided head blurring for person detections in still images.

pub mod shared {
    pub mod bounding_box;
    pub mod constants;
    pub mod frame;
}

pub mod detection {
    pub mod domain {
        pub mod fallback_region;
        pub mod head_geometry;
        pub mod head_landmarks;
        pub mod head_pose_detector;
        pub mod object_detections;
        pub mod pose_model;
    }
    pub mod infrastructure;
}

pub mod blurring {
    pub mod domain {
        pub mod frame_blurrer;
        pub mod region_blur_applicator;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod image_encoder;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod blur_heads_use_case;
    pub mod blur_report;
    pub mod processing_config;
    pub mod skip_policy;
}
