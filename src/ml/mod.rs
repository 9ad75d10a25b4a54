// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All Burn-specific network code lives here.
//
//   lstm.rs       — masked peephole LSTM that can run backwards
//   model.rs      — embedding → (fc, LSTM) × stacked_num → max pool
//                   → softmax classifier
//   trainer.rs    — event-driven Adagrad training loop
//   inferencer.rs — rebuilds a saved network, scores LoD batches
//   backend.rs    — CPU / GPU place selection

/// Masked, reversible LSTM layer
pub mod lstm;

/// Stacked LSTM classifier
pub mod model;

/// Training loop with event hooks
pub mod trainer;

/// Inference from a saved parameter directory
pub mod inferencer;

pub mod backend;
