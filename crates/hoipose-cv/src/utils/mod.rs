//! Utility modules

pub mod nms;

pub use nms::{class_aware_nms, class_aware_nms_preferring};
