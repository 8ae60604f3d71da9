// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! High-level description of a score that can be played.

use std::fmt;

use snafu::Snafu;

use crate::instrument::{self, Instrument, InstrumentError};
use crate::notation::{self, ParseError};
use crate::pianoroll::{PianoRoll, Time};

/// Time signature of a voice, e.g. 3/4.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimeSignature {
    /// How many beats make up a measure.
    pub beats: u8,
    /// The length of one beat is `1 / beat_unit`.
    pub beat_unit: u8,
}

impl TimeSignature {
    pub const COMMON: TimeSignature = TimeSignature {
        beats: 4,
        beat_unit: 4,
    };

    pub fn new(beats: u8, beat_unit: u8) -> Self {
        Self { beats, beat_unit }
    }

    /// Length of a full measure.
    pub fn measure(&self) -> Time {
        Time::new(self.beats as i64, self.beat_unit as i64)
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        TimeSignature::COMMON
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.beats, self.beat_unit)
    }
}

/// A parsed voice: the notes it plays and the time signatures it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    roll: PianoRoll,
    time_signatures: Vec<(Time, TimeSignature)>,
}

impl Voice {
    pub fn new(roll: PianoRoll, time_signatures: Vec<(Time, TimeSignature)>) -> Self {
        Self {
            roll,
            time_signatures,
        }
    }

    pub fn roll(&self) -> &PianoRoll {
        &self.roll
    }

    /// Time signatures in the order they take effect, with the time they take effect at.
    pub fn time_signatures(&self) -> &[(Time, TimeSignature)] {
        &self.time_signatures
    }

    /// The time signature the voice starts with, 4/4 if none was declared.
    pub fn time_signature(&self) -> TimeSignature {
        self.time_signatures
            .first()
            .map_or(TimeSignature::COMMON, |(_, sig)| *sig)
    }

    pub fn length(&self) -> Time {
        self.roll.length()
    }
}

/// Literal source of a part: its name, notation text and instrument label.
#[derive(Debug, Clone, Copy)]
pub struct VoiceSource {
    pub name: &'static str,
    pub notation: &'static str,
    pub instrument: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum ScoreError {
    #[snafu(display("Failed to parse voice {:?}: {}", name, source))]
    Notation { name: String, source: ParseError },
    #[snafu(display("Voice {:?}: {}", name, source))]
    UnknownInstrument {
        name: String,
        source: InstrumentError,
    },
}

/// A voice played on a specific instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    name: String,
    instrument: Instrument,
    voice: Voice,
}

impl Part {
    pub fn new<S: Into<String>>(name: S, voice: Voice, instrument: Instrument) -> Self {
        Self {
            name: name.into(),
            instrument,
            voice,
        }
    }

    /// Parse the notation of a voice and tag it with its instrument.
    pub fn parse(source: &VoiceSource) -> Result<Part, ScoreError> {
        let voice = notation::parse(source.notation).map_err(|err| ScoreError::Notation {
            name: source.name.to_string(),
            source: err,
        })?;
        let instrument =
            instrument::by_name(source.instrument).map_err(|err| ScoreError::UnknownInstrument {
                name: source.name.to_string(),
                source: err,
            })?;
        Ok(Part::new(source.name, voice, instrument))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn instrument(&self) -> Instrument {
        self.instrument
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }
}

/// A description of a complete score: parts playing simultaneously.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    parts: Vec<Part>,
}

impl Score {
    /// Combine the parts, keeping their order.
    pub fn new(parts: Vec<Part>) -> Self {
        Self { parts }
    }

    /// Parse all voices and combine them in the given order.
    pub fn from_sources(sources: &[VoiceSource]) -> Result<Score, ScoreError> {
        let parts = sources
            .iter()
            .map(Part::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Score::new(parts))
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// The time the last part ends.
    pub fn length(&self) -> Time {
        self.parts
            .iter()
            .map(|part| part.voice.length())
            .max()
            .unwrap_or_else(Time::zero)
    }

    /// The time signature the score starts with, taken from the first part declaring one.
    pub fn time_signature(&self) -> TimeSignature {
        self.parts
            .iter()
            .filter_map(|part| part.voice.time_signatures().first())
            .map(|(_, sig)| *sig)
            .next()
            .unwrap_or_default()
    }
}
