use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Axis, MagnetizationModel, MagnetizationVector, ModelError};

/// Identifier of an event, unique within the sequence that allocated it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What an event does once the model has been relaxed to its time stamp.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EventKind {
    /// Instantaneous RF pulse. The model's flip error scales `angle`.
    Pulse { angle: f64, axis: Axis },
    /// Hands the net magnetization to the sampling callback. `tag` is opaque
    /// user data passed along with it.
    Sample { tag: u64 },
    /// Ideal gradient spoiler: destroys transverse magnetization.
    Spoiler,
    /// End of one repetition: the model time is reset to 0.
    Repeat,
}

/// An [`EventKind`] stamped with time and id by [`super::EventSeq::add_event`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub time: f64,
    pub id: EventId,
    pub kind: EventKind,
}

/// Passed to the sampling callback at every [`EventKind::Sample`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub event: EventId,
    pub time: f64,
    pub tag: u64,
    pub magnetization: MagnetizationVector,
}

/// Callback receiving the net magnetization of every applied sample event.
///
/// It is not stored in the sequence but handed to every apply call, so event
/// lists stay plain data that can be cloned and serialized. Recording
/// collaborators capture their buffers in the closure:
///
/// ```
/// # use isospin::{Sample, SampleFn};
/// let mut samples = Vec::new();
/// let on_sample: &mut SampleFn<'_> = &mut |s: Sample| samples.push(s.magnetization);
/// ```
pub type SampleFn<'a> = dyn FnMut(Sample) + 'a;

/// Default sampling behaviour: print the sample to stdout.
pub fn print_sample(sample: Sample) {
    let m = sample.magnetization;
    println!(
        "sample {} (tag {}) at t = {}: [{:.6}, {:.6}, {:.6}]",
        sample.event, sample.tag, sample.time, m.x, m.y, m.z
    );
}

impl Event {
    /// Relaxes `model` to the event time, then performs the event's effect.
    pub fn apply<M: MagnetizationModel + ?Sized>(
        &self,
        model: &mut M,
        on_sample: &mut SampleFn<'_>,
    ) -> Result<(), ModelError> {
        trace!(id = %self.id, time = self.time, kind = ?self.kind, "applying event");
        model.update(self.time)?;

        match self.kind {
            EventKind::Pulse { angle, axis } => model.rotate(self.time, angle, axis)?,
            EventKind::Sample { tag } => on_sample(Sample {
                event: self.id,
                time: self.time,
                tag,
                magnetization: model.net_magnetization(),
            }),
            EventKind::Spoiler => model.zero_transverse_magnetization(self.time)?,
            EventKind::Repeat => model.set_time(0.0),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SingleVector, Tissue};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn model() -> SingleVector {
        SingleVector::new(Tissue::new(600.0, 100.0, 100.0, 1.0)).unwrap()
    }

    fn event(time: f64, kind: EventKind) -> Event {
        Event {
            time,
            id: EventId(7),
            kind,
        }
    }

    #[test]
    fn pulse_relaxes_first() {
        let mut m = model();
        m.rotate(0.0, FRAC_PI_2, Axis::X).unwrap();
        event(10.0, EventKind::Pulse { angle: FRAC_PI_2, axis: Axis::X })
            .apply(&mut m, &mut |_| {})
            .unwrap();
        // the decayed transverse part is tipped back onto -z
        let v = m.net_magnetization();
        assert_abs_diff_eq!(v.z, -(-0.1f64).exp(), epsilon = 1e-12);
        assert_eq!(m.time(), 10.0);
    }

    #[test]
    fn sample_reports_to_callback() {
        let mut m = model();
        let mut seen = Vec::new();
        event(4.0, EventKind::Sample { tag: 42 })
            .apply(&mut m, &mut |s| seen.push(s))
            .unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].tag, 42);
        assert_eq!(seen[0].event, EventId(7));
        assert_eq!(seen[0].time, 4.0);
        assert_abs_diff_eq!(seen[0].magnetization.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn spoiler_and_repeat() {
        let mut m = model();
        m.rotate(0.0, 0.5, Axis::X).unwrap();
        event(8.0, EventKind::Spoiler).apply(&mut m, &mut |_| {}).unwrap();
        assert_eq!(m.net_magnetization().y, 0.0);

        event(8.0, EventKind::Repeat).apply(&mut m, &mut |_| {}).unwrap();
        assert_eq!(m.time(), 0.0);
    }

    #[test]
    fn print_sample_as_callback() {
        let mut m = model();
        event(2.0, EventKind::Sample { tag: 0 })
            .apply(&mut m, &mut print_sample)
            .unwrap();
        assert_eq!(EventId(3).to_string(), "#3");
    }

    #[test]
    fn event_in_the_past_fails() {
        let mut m = model();
        m.update(5.0).unwrap();
        assert!(event(1.0, EventKind::Spoiler).apply(&mut m, &mut |_| {}).is_err());
    }
}
