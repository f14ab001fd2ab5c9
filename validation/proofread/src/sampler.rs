//! Random sample selection.

use chrono::{DateTime, Utc};
use rand::prelude::*;
use serde::Serialize;

use ccmp_common::{GridCell, GridExtent, WindVariable};

use crate::error::ProofreadError;

/// One (bucket, variable, cell) triple to check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub bucket: usize,
    pub timestamp: DateTime<Utc>,
    pub variable: WindVariable,
    pub cell: GridCell,
}

/// Draws samples uniformly over buckets, variables and cells.
pub struct Sampler {
    rng: StdRng,
    buckets: Vec<DateTime<Utc>>,
    extent: GridExtent,
}

impl Sampler {
    /// A seeded sampler is reproducible; without a seed it draws from entropy.
    pub fn new(
        buckets: Vec<DateTime<Utc>>,
        extent: GridExtent,
        seed: Option<u64>,
    ) -> Result<Self, ProofreadError> {
        if buckets.is_empty() {
            return Err(ProofreadError::EmptyLattice);
        }
        if extent.cell_count() == 0 {
            return Err(ProofreadError::EmptyExtent);
        }

        let rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        Ok(Self {
            rng,
            buckets,
            extent,
        })
    }

    pub fn next_sample(&mut self) -> Sample {
        let bucket = self.rng.gen_range(0..self.buckets.len());
        let variable = WindVariable::ALL[self.rng.gen_range(0..WindVariable::ALL.len())];
        let cell = GridCell::new(
            self.rng.gen_range(0..self.extent.n_lat),
            self.rng.gen_range(0..self.extent.n_lon),
        );

        Sample {
            bucket,
            timestamp: self.buckets[bucket],
            variable,
            cell,
        }
    }
}
