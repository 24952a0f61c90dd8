use std::collections::TryReserveError;

use thiserror::Error;

use crate::sequence::EventId;

/// Errors of the numeric toolkit in [`crate::spectral`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpectralError {
    #[error("transform input is empty")]
    Empty,
    #[error("FFT length must be a power of two (found {0})")]
    NonPowerOfTwo(usize),
    #[error("data length {len} does not match the shape {shape:?}")]
    ShapeMismatch { len: usize, shape: Vec<usize> },
    /// The scratch buffer could not be obtained. The caller may retry with a
    /// smaller transform.
    #[error("could not allocate scratch buffer of {0} samples")]
    Allocation(usize),
}

impl SpectralError {
    pub(crate) fn allocation(len: usize) -> impl FnOnce(TryReserveError) -> Self {
        move |_| SpectralError::Allocation(len)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("T2* must be strictly less than T2 (T2 = {t2}, T2* = {t2_star})")]
    T2StarNotBelowT2 { t2: f64, t2_star: f64 },
    #[error("invalid tissue: {0}")]
    InvalidTissue(&'static str),
    #[error("time {t} lies before the reference time {t0}")]
    TimeBeforeReference { t: f64, t0: f64 },
    #[error("isochromat count must be a power of two for the FFT path (found {0})")]
    NonPowerOfTwo(usize),
    #[error("rotation axis has zero length")]
    DegenerateAxis,
    #[error("isochromat frequencies are not on an evenly spaced grid")]
    NotOnGrid,
    #[error("isochromat ensemble is empty")]
    EmptyEnsemble,
    #[error("got {frequencies} frequencies but {magnitudes} magnitudes")]
    LayoutMismatch {
        frequencies: usize,
        magnitudes: usize,
    },
    #[error(transparent)]
    Spectral(#[from] SpectralError),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SequenceError {
    /// Recoverable: the sequence is left untouched.
    #[error("no event with id {0} in sequence")]
    EventNotFound(EventId),
    #[error("event time must be finite (found {0})")]
    InvalidTime(f64),
    #[error("no steady state after {repetitions} repetitions (last change {delta:e})")]
    NoConvergence { repetitions: usize, delta: f64 },
    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("reading config failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing config failed: {0}")]
    Parse(#[from] serde_json::Error),
}
