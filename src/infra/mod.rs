// ============================================================
// Layer 6 — Infrastructure Layer
// ============================================================
//   checkpoint.rs — saves / loads the parameter directory
//                   (weights, architecture, word dictionary)
//
//   metrics.rs    — per-step and per-epoch CSV metrics

/// Parameter directory save and load
pub mod checkpoint;

/// Training metrics CSV logger
pub mod metrics;
