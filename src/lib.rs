//! Isochromat-based MR signal simulation.
//!
//! A [`Tissue`] is simulated by a [`MagnetizationModel`], either as a single
//! magnetization vector or as an ensemble of off-resonant isochromats whose
//! spread reproduces T2* decay. Pulse sequences are [`EventSeq`]s: time-sorted
//! pulses, samples, spoilers and repetition markers that are replayed against a
//! model, optionally until the magnetization reaches a steady state.
//!
//! ```
//! use isospin::{Axis, EventKind, EventSeq, SignalRecorder, SingleVector, SteadyStateConfig, Tissue};
//!
//! let tissue = Tissue::new(600.0, 80.0, 40.0, 1.0);
//! let mut model = SingleVector::new(tissue)?;
//! let mut seq = EventSeq::from_events([
//!     (0.0, EventKind::Pulse { angle: 0.5, axis: Axis::X }),
//!     (5.0, EventKind::Sample { tag: 0 }),
//!     (50.0, EventKind::Spoiler),
//!     (50.0, EventKind::Repeat),
//! ])?;
//!
//! let steady = seq.apply_to_steady_state(&mut model, &SteadyStateConfig::default(), &mut |_| {})?;
//! let mut recorder = SignalRecorder::new();
//! seq.apply_one_repetition(&mut model, &mut recorder.callback())?;
//! assert_eq!(recorder.signal().len(), 1);
//! assert!(steady.repetitions > 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! The FFT toolkit the spectral ensemble is built on lives in [`spectral`].

mod config;
mod error;
pub mod model;
pub mod sequence;
mod signal;
pub mod spectral;
mod tissue;
mod vector;

pub use config::{EnsembleConfig, SimulationConfig, SteadyStateConfig};
pub use error::*;
pub use model::{
    Ensemble, FrequencyGrid, IsochromatLayout, MagnetizationModel, ModelKind, SingleVector,
    SpectralEnsemble, build_model,
};
pub use sequence::{
    Event, EventId, EventKind, EventSeq, Sample, SampleFn, SteadyState, print_sample,
};
pub use signal::{Signal, SignalRecorder};
pub use tissue::Tissue;
pub use vector::{Axis, MagnetizationVector, Rotation};
