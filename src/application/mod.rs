// ============================================================
// Layer 2 — Application / Use Cases
// ============================================================
// Workflow coordination only: no model math here, and no direct
// file formats (those live in data/ and infra/).
//
//   train_use_case — load IMDB, train with the early-stop hook
//   infer_use_case — reload parameters, score a batch or a text
//   run_use_case   — train + infer on every available place

pub mod train_use_case;

pub mod infer_use_case;

pub mod run_use_case;
