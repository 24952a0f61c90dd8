use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::Sample;

/// Recorded MR signal: the complex transverse magnetization `x + iy` at every
/// sample event, in acquisition order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub times: Vec<f64>,
    pub tags: Vec<u64>,
    pub samples: Vec<Complex64>,
}

impl Signal {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: &Sample) {
        self.times.push(sample.time);
        self.tags.push(sample.tag);
        self.samples.push(sample.magnetization.transverse());
    }

    /// Samples recorded with the given tag, e.g. one echo of a multi-echo train.
    pub fn with_tag(&self, tag: u64) -> impl Iterator<Item = Complex64> + '_ {
        self.tags
            .iter()
            .zip(&self.samples)
            .filter(move |(t, _)| **t == tag)
            .map(|(_, s)| *s)
    }
}

/// Sampling collaborator that collects a [`Signal`] while a sequence runs.
///
/// ```
/// # use isospin::{EventKind, EventSeq, SignalRecorder, SingleVector, Tissue};
/// let mut seq = EventSeq::from_events([(1.0, EventKind::Sample { tag: 3 })])?;
/// let mut model = SingleVector::new(Tissue::new(600.0, 80.0, 40.0, 1.0))?;
/// let mut recorder = SignalRecorder::new();
/// seq.apply_one_repetition(&mut model, &mut recorder.callback())?;
/// assert_eq!(recorder.into_signal().tags, [3]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Default)]
pub struct SignalRecorder {
    signal: Signal,
}

impl SignalRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callback to hand to the apply operations of [`crate::EventSeq`].
    pub fn callback(&mut self) -> impl FnMut(Sample) + '_ {
        move |sample| self.signal.push(&sample)
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn clear(&mut self) {
        self.signal = Signal::default();
    }

    pub fn into_signal(self) -> Signal {
        self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Axis, EventKind, EventSeq, MagnetizationModel, SingleVector, Tissue};

    fn multi_echo() -> EventSeq {
        EventSeq::from_events([
            (0.0, EventKind::Pulse { angle: 0.5, axis: Axis::X }),
            (2.0, EventKind::Sample { tag: 1 }),
            (4.0, EventKind::Sample { tag: 2 }),
            (6.0, EventKind::Sample { tag: 1 }),
        ])
        .unwrap()
    }

    #[test]
    fn records_samples_of_a_sequence() {
        let mut seq = multi_echo();
        let mut model = SingleVector::new(Tissue::new(600.0, 80.0, 40.0, 1.0)).unwrap();
        let mut recorder = SignalRecorder::new();
        seq.apply_one_repetition(&mut model, &mut recorder.callback())
            .unwrap();

        let signal = recorder.signal();
        assert_eq!(signal.len(), 3);
        assert_eq!(signal.times, [2.0, 4.0, 6.0]);
        let echoes: Vec<_> = signal.with_tag(1).collect();
        assert_eq!(echoes.len(), 2);
        assert!(echoes[0].norm() > echoes[1].norm());
        assert_eq!(model.time(), 6.0);
    }

    #[test]
    fn clear_drops_recorded_samples() {
        let mut seq = multi_echo();
        let mut model = SingleVector::new(Tissue::new(600.0, 80.0, 40.0, 1.0)).unwrap();
        let mut recorder = SignalRecorder::new();
        seq.apply_one_repetition(&mut model, &mut recorder.callback())
            .unwrap();
        recorder.clear();
        assert!(recorder.signal().is_empty());
        assert!(recorder.into_signal().tags.is_empty());
    }
}
