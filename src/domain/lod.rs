// ============================================================
// Layer 3 — LoD Batch (ragged sequences)
// ============================================================
// A level-of-detail batch stores many variable-length token
// sequences back to back in one flat Vec, plus an offset table:
//
//   ids: [a a a a b b b b b b]
//   lod: [0,      4,          10]
//          └ seq 0 ┘└── seq 1 ──┘
//
// Sequence i is ids[lod[i]..lod[i + 1]].

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{SentimentError, SentimentResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LodBatch {
    ids: Vec<i64>,
    lod: Vec<usize>,
}

impl LodBatch {
    /// Build a batch from flat ids and an offset table.
    pub fn new(ids: Vec<i64>, lod: Vec<usize>) -> SentimentResult<Self> {
        let invalid = |reason: &str| SentimentError::InvalidLod {
            lod:     lod.clone(),
            num_ids: ids.len(),
            reason:  reason.to_string(),
        };

        if lod.len() < 2 {
            return Err(invalid("need at least one sequence"));
        }
        if lod[0] != 0 {
            return Err(invalid("first offset must be 0"));
        }
        if lod.windows(2).any(|w| w[1] < w[0]) {
            return Err(invalid("offsets must be non-decreasing"));
        }
        if lod[lod.len() - 1] != ids.len() {
            return Err(invalid("last offset must equal the number of ids"));
        }
        if let Some(index) = lod.windows(2).position(|w| w[1] == w[0]) {
            return Err(SentimentError::EmptySequence { index });
        }

        Ok(Self { ids, lod })
    }

    /// Build a batch from already separated sequences.
    pub fn from_sequences<S: AsRef<[i64]>>(sequences: &[S]) -> SentimentResult<Self> {
        let mut ids = Vec::new();
        let mut lod = vec![0usize];
        for seq in sequences {
            ids.extend_from_slice(seq.as_ref());
            lod.push(ids.len());
        }
        Self::new(ids, lod)
    }

    /// Uniform random ids in `low..=high` laid out by `lod`.
    pub fn random<R: Rng>(
        lod:  Vec<usize>,
        low:  i64,
        high: i64,
        rng:  &mut R,
    ) -> SentimentResult<Self> {
        let total = lod.last().copied().unwrap_or(0);
        let ids = (0..total).map(|_| rng.gen_range(low..=high)).collect();
        Self::new(ids, lod)
    }

    pub fn num_sequences(&self) -> usize {
        self.lod.len() - 1
    }

    pub fn ids(&self) -> &[i64] {
        &self.ids
    }

    pub fn lengths(&self) -> Vec<usize> {
        self.lod.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn sequences(&self) -> impl Iterator<Item = &[i64]> + '_ {
        self.lod.windows(2).map(move |w| &self.ids[w[0]..w[1]])
    }

    /// Check every id fits an embedding table of `dict_len` rows.
    pub fn check_ids(&self, dict_len: usize) -> SentimentResult<()> {
        match self.ids.iter().find(|&&id| id < 0 || id as usize >= dict_len) {
            Some(&id) => Err(SentimentError::TokenOutOfRange { id, dict_len }),
            None      => Ok(()),
        }
    }
}
