//! Backend Selector
//!
//! Every pass runs on a `Place`. The CPU place is always available
//! (NdArray); the GPU place exists only when the crate is built with
//! `--features gpu` (wgpu). Work that must run on "whatever backend
//! the place maps to" implements `PlaceTask`.

use anyhow::Result;
use burn::backend::{
    ndarray::{NdArray, NdArrayDevice},
    Autodiff,
};
use burn::tensor::backend::AutodiffBackend;

pub type CpuBackend      = NdArray;
pub type CpuTrainBackend = Autodiff<CpuBackend>;

#[cfg(feature = "gpu")]
pub type GpuBackend = burn::backend::Wgpu;
#[cfg(feature = "gpu")]
pub type GpuTrainBackend = Autodiff<GpuBackend>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Place {
    Cpu,
    Gpu,
}

impl Place {
    /// Places in the order a full run visits them.
    pub const ALL: [Place; 2] = [Place::Cpu, Place::Gpu];

    /// Whether this binary can run on the place at all.
    pub fn is_compiled(self) -> bool {
        match self {
            Place::Cpu => true,
            Place::Gpu => cfg!(feature = "gpu"),
        }
    }
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Place::Cpu => write!(f, "CPU"),
            Place::Gpu => write!(f, "GPU"),
        }
    }
}

/// Work generic over the training backend. Inference-only tasks use
/// `B::InnerBackend`, which shares `B`'s device type.
pub trait PlaceTask {
    type Output;

    fn run<B: AutodiffBackend>(self, device: B::Device) -> Result<Self::Output>;
}

/// Run `task` on `place`; `Ok(None)` when the place is not compiled in.
pub fn dispatch<T: PlaceTask>(place: Place, task: T) -> Result<Option<T::Output>> {
    match place {
        Place::Cpu => task.run::<CpuTrainBackend>(NdArrayDevice::Cpu).map(Some),
        Place::Gpu => run_gpu(task),
    }
}

#[cfg(feature = "gpu")]
fn run_gpu<T: PlaceTask>(task: T) -> Result<Option<T::Output>> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    task.run::<GpuTrainBackend>(device).map(Some)
}

#[cfg(not(feature = "gpu"))]
fn run_gpu<T: PlaceTask>(_task: T) -> Result<Option<T::Output>> {
    tracing::warn!("Built without the `gpu` feature, skipping GPU pass");
    Ok(None)
}
