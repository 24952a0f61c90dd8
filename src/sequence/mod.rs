//! Time-ordered event programs and their replay against a magnetization model.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::{MagnetizationModel, MagnetizationVector, SequenceError, SteadyStateConfig};

mod event;

pub use event::{Event, EventId, EventKind, Sample, SampleFn, print_sample};

/// A periodic pulse sequence: events sorted by time plus a cursor on the next
/// event to apply.
///
/// Events with equal time stamps keep their insertion order. Once the cursor
/// moves past the last event it wraps to the head, so replaying the sequence
/// repeats it. `Clone` is a deep copy, ids included.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventSeq {
    events: Vec<Event>,
    /// Always `< events.len()`, or 0 for an empty sequence
    #[serde(skip)]
    cursor: usize,
    next_id: u64,
}

/// Result of [`EventSeq::apply_to_steady_state`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SteadyState {
    /// Net magnetization at the end of the last repetition.
    pub magnetization: MagnetizationVector,
    pub repetitions: usize,
}

impl EventSeq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a sequence from `(time, kind)` pairs in any order.
    pub fn from_events(
        events: impl IntoIterator<Item = (f64, EventKind)>,
    ) -> Result<Self, SequenceError> {
        let mut seq = Self::new();
        for (time, kind) in events {
            seq.add_event(time, kind)?;
        }
        Ok(seq)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Events in time order.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Duration of one repetition: the time of the last event.
    pub fn period(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.time)
    }

    /// Id of the event the cursor points at.
    pub fn next_event_id(&self) -> Option<EventId> {
        self.events.get(self.cursor).map(|e| e.id)
    }

    /// Moves the cursor back to the first event.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Inserts `kind` at `time` behind all events with the same time stamp and
    /// returns the id allocated for it.
    pub fn add_event(&mut self, time: f64, kind: EventKind) -> Result<EventId, SequenceError> {
        if !time.is_finite() {
            return Err(SequenceError::InvalidTime(time));
        }
        let id = EventId(self.next_id);
        self.next_id += 1;

        let index = self.events.partition_point(|e| e.time <= time);
        self.events.insert(index, Event { time, id, kind });
        // Events before the cursor were already applied in this pass
        if index < self.cursor {
            self.cursor += 1;
        }
        Ok(id)
    }

    /// Removes the event with the given id. An unknown id leaves the sequence
    /// untouched and is reported as [`SequenceError::EventNotFound`].
    pub fn delete_event(&mut self, id: EventId) -> Result<Event, SequenceError> {
        let Some(index) = self.events.iter().position(|e| e.id == id) else {
            debug!(%id, "event to delete not found");
            return Err(SequenceError::EventNotFound(id));
        };
        let event = self.events.remove(index);
        if index < self.cursor {
            self.cursor -= 1;
        }
        if self.cursor >= self.events.len() {
            self.cursor = 0;
        }
        Ok(event)
    }

    /// Moves the cursor on, returns `true` if it wrapped to the head.
    fn advance(&mut self) -> bool {
        self.cursor += 1;
        if self.cursor >= self.events.len() {
            self.cursor = 0;
            true
        } else {
            false
        }
    }

    /// Applies the event under the cursor and advances. Returns `None` for an
    /// empty sequence.
    pub fn apply_next_event<M: MagnetizationModel + ?Sized>(
        &mut self,
        model: &mut M,
        on_sample: &mut SampleFn<'_>,
    ) -> Result<Option<EventId>, SequenceError> {
        let Some(event) = self.events.get(self.cursor).copied() else {
            return Ok(None);
        };
        event.apply(model, on_sample)?;
        self.advance();
        Ok(Some(event.id))
    }

    /// Applies every event due at or before `t`, then returns the model's
    /// sample at `t`.
    ///
    /// Every wrap to the head subtracts one [`period`](Self::period) from `t`,
    /// so a sequence ending with [`EventKind::Repeat`] is replayed as a
    /// periodic program.
    pub fn apply_to_time<M: MagnetizationModel + ?Sized>(
        &mut self,
        model: &mut M,
        mut t: f64,
        on_sample: &mut SampleFn<'_>,
    ) -> Result<MagnetizationVector, SequenceError> {
        let period = self.period();
        while let Some(event) = self.events.get(self.cursor).copied() {
            if event.time > t {
                break;
            }
            event.apply(model, on_sample)?;
            if self.advance() {
                if period <= 0.0 {
                    // all events at t = 0: one pass is all there is
                    break;
                }
                t -= period;
            }
        }
        Ok(model.get_time_sample(t)?)
    }

    /// Applies exactly `len()` events starting at the cursor.
    pub fn apply_one_repetition<M: MagnetizationModel + ?Sized>(
        &mut self,
        model: &mut M,
        on_sample: &mut SampleFn<'_>,
    ) -> Result<MagnetizationVector, SequenceError> {
        for _ in 0..self.events.len() {
            self.apply_next_event(model, on_sample)?;
        }
        Ok(model.net_magnetization())
    }

    /// Applies events until the cursor wraps to the head, which finishes the
    /// current pass (a full one if the cursor is at the head).
    pub fn apply_to_end_of_repetition<M: MagnetizationModel + ?Sized>(
        &mut self,
        model: &mut M,
        on_sample: &mut SampleFn<'_>,
    ) -> Result<MagnetizationVector, SequenceError> {
        while let Some(event) = self.events.get(self.cursor).copied() {
            event.apply(model, on_sample)?;
            if self.advance() {
                break;
            }
        }
        Ok(model.net_magnetization())
    }

    /// Repeats [`apply_one_repetition`](Self::apply_one_repetition) until the
    /// magnitude of the net magnetization changes by less than
    /// `config.threshold`, giving up after `config.max_repetitions`.
    pub fn apply_to_steady_state<M: MagnetizationModel + ?Sized>(
        &mut self,
        model: &mut M,
        config: &SteadyStateConfig,
        on_sample: &mut SampleFn<'_>,
    ) -> Result<SteadyState, SequenceError> {
        let mut previous = model.net_magnetization().norm();
        let mut delta = f64::INFINITY;

        for repetition in 1..=config.max_repetitions {
            let magnetization = self.apply_one_repetition(model, on_sample)?;
            let magnitude = magnetization.norm();
            delta = (magnitude - previous).abs();
            trace!(repetition, magnitude, delta, "steady state iteration");

            if delta < config.threshold {
                info!(repetitions = repetition, magnitude, "reached steady state");
                return Ok(SteadyState {
                    magnetization,
                    repetitions: repetition,
                });
            }
            previous = magnitude;
        }

        warn!(
            repetitions = config.max_repetitions,
            delta, "no steady state within the repetition limit"
        );
        Err(SequenceError::NoConvergence {
            repetitions: config.max_repetitions,
            delta,
        })
    }
}
