// ============================================================
// Layer 4 — Data Pipeline
// ============================================================
// From an extracted aclImdb directory to tensor batches:
//
//   aclImdb/{train,test}/{pos,neg}/*.txt
//       │
//       ▼
//   ImdbLoader        → reads files, tokenises each review
//       │
//       ▼
//   WordDict          → frequency-ranked word → id map
//       │
//       ▼
//   SentimentDataset  → implements Burn's Dataset trait
//       │
//       ▼
//   SentimentBatcher  → pads ragged sequences, builds the mask
//       │
//       ▼
//   DataLoader        → shuffled batches for the training loop

/// Reads the IMDB review directories
pub mod loader;

/// Review tokenisation
pub mod preprocessor;

/// Word dictionary (vocabulary)
pub mod vocab;

/// Implements Burn's Dataset trait for encoded reviews
pub mod dataset;

/// Implements Burn's Batcher trait for padded, masked batches
pub mod batcher;
