//! Candidate extraction and pruning.
//!
//! Includes thresholded local-maximum search and spatial non-maximum
//! suppression.

pub mod nms;
pub mod peaks;
