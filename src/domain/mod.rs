// ============================================================
// Layer 3 — Domain Layer
// ============================================================
// Plain Rust types describing what the system works with.
// No Burn types, no file I/O.

// A tokenised review and its polarity
pub mod review;

// Ragged (level-of-detail) batches of token ids
pub mod lod;

// Abstractions implemented by the data and ml layers
pub mod traits;
