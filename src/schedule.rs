// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Flatten a score into the time-ordered MIDI channel events that play it.

use std::cmp::Ordering;

use midly::live::LiveEvent;
use midly::num::{u4, u7};
use midly::MidiMessage;
use snafu::Snafu;

use crate::pianoroll::Time;
use crate::score::Score;

/// MIDI channel reserved for percussion by General MIDI.
pub const PERCUSSION_CHANNEL: u8 = 9;

/// Number of melodic channels available to parts.
pub const MAX_PARTS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum ScheduleError {
    #[snafu(display(
        "The score has {} parts, but only {} MIDI channels are available",
        count,
        MAX_PARTS
    ))]
    TooManyParts { count: usize },
}

/// What happens on a channel at a scheduled time.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    NoteOff { key: u8 },
    ProgramChange { program: u8 },
    NoteOn { key: u8, velocity: u8 },
}

impl EventKind {
    /// Priority at equal times: keys are released before an instrument is selected,
    /// and the instrument is selected before new keys are pressed.
    fn rank(&self) -> u8 {
        match self {
            EventKind::NoteOff { .. } => 0,
            EventKind::ProgramChange { .. } => 1,
            EventKind::NoteOn { .. } => 2,
        }
    }
}

/// A single MIDI channel event at a point in score time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ScheduledEvent {
    /// When the event is due.
    pub time: Time,
    /// Index of the part the event belongs to.
    pub part: usize,
    /// The MIDI channel of the part.
    pub channel: u8,
    pub kind: EventKind,
}

impl ScheduledEvent {
    /// The MIDI message of the event, without its channel.
    pub fn message(&self) -> MidiMessage {
        match self.kind {
            EventKind::NoteOff { key } => MidiMessage::NoteOff {
                key: u7::from(key),
                vel: u7::from(0),
            },
            EventKind::ProgramChange { program } => MidiMessage::ProgramChange {
                program: u7::from(program),
            },
            EventKind::NoteOn { key, velocity } => MidiMessage::NoteOn {
                key: u7::from(key),
                vel: u7::from(velocity),
            },
        }
    }

    /// The event as it is sent to a MIDI device.
    pub fn to_live(&self) -> LiveEvent<'static> {
        LiveEvent::Midi {
            channel: u4::from(self.channel),
            message: self.message(),
        }
    }
}

/// Events are ordered by time, then by the priority of their kind, then by part.
impl Ord for ScheduledEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.time
            .cmp(&other.time)
            .then_with(|| self.kind.rank().cmp(&other.kind.rank()))
            .then_with(|| self.part.cmp(&other.part))
            .then_with(|| self.kind.cmp(&other.kind))
            .then_with(|| self.channel.cmp(&other.channel))
    }
}

impl PartialOrd for ScheduledEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The MIDI channel of the part with the given index, skipping the percussion channel.
///
/// ```
/// use tinyscore::schedule::channel_for;
///
/// assert_eq!(channel_for(0), Some(0));
/// assert_eq!(channel_for(9), Some(10));
/// assert_eq!(channel_for(14), Some(15));
/// assert_eq!(channel_for(15), None);
/// ```
pub fn channel_for(part: usize) -> Option<u8> {
    let channel = if part < PERCUSSION_CHANNEL as usize {
        part
    } else {
        part + 1
    };
    if channel < 16 {
        Some(channel as u8)
    } else {
        None
    }
}

/// Compute all events needed for playing the score, in the order they are due.
pub fn schedule(score: &Score) -> Result<Vec<ScheduledEvent>, ScheduleError> {
    let count = score.parts().len();
    if count > MAX_PARTS {
        return Err(ScheduleError::TooManyParts { count });
    }

    let mut events = Vec::new();
    for (index, part) in score.parts().iter().enumerate() {
        let channel = channel_for(index).ok_or(ScheduleError::TooManyParts { count })?;
        events.push(ScheduledEvent {
            time: Time::zero(),
            part: index,
            channel,
            kind: EventKind::ProgramChange {
                program: part.instrument().program(),
            },
        });
        for note in part.voice().roll().iter() {
            let key = note.note.to_midi();
            events.push(ScheduledEvent {
                time: note.start,
                part: index,
                channel,
                kind: EventKind::NoteOn {
                    key,
                    velocity: note.velocity.to_midi(),
                },
            });
            events.push(ScheduledEvent {
                time: note.end(),
                part: index,
                channel,
                kind: EventKind::NoteOff { key },
            });
        }
    }
    events.sort();
    Ok(events)
}

/// The channels used by a schedule, in ascending order.
pub fn channels(events: &[ScheduledEvent]) -> Vec<u8> {
    let mut channels: Vec<_> = events.iter().map(|event| event.channel).collect();
    channels.sort_unstable();
    channels.dedup();
    channels
}
