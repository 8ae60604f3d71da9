// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use crate::note::{Note, Velocity};
use crate::rational::Rational;

/// Time in whole notes, can be fractional, e.g. a quarter note takes 1/4.
/// The time is relative until it is played with a specific tempo.
pub type Time = Rational;

/// A piano roll is the sequence of notes of a single voice.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PianoRoll {
    /// Nominal length of the piano roll. This determines at what time new notes are appended.
    length: Time,
    /// The notes on this piano roll in the order of their start times.
    notes: Vec<PlayedNote>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayedNote {
    /// Which key was pressed
    pub note: Note,
    /// How hard the key was pressed
    pub velocity: Velocity,
    /// Time when the key was pressed
    pub start: Time,
    /// How long the key is held
    pub duration: Time,
}

impl PlayedNote {
    /// Time when the key is released.
    pub fn end(&self) -> Time {
        self.start + self.duration
    }
}

impl PianoRoll {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a note at the end of the piano roll, extending its length.
    pub fn add_after(&mut self, note: Note, duration: Time, velocity: Velocity) {
        self.notes.push(PlayedNote {
            note,
            velocity,
            start: self.length,
            duration,
        });
        self.length += duration;
    }

    /// Add notes that all start at the end of the piano roll, extending its length once.
    pub fn add_chord(&mut self, notes: &[Note], duration: Time, velocity: Velocity) {
        let start = self.length;
        self.notes.extend(notes.iter().map(|&note| PlayedNote {
            note,
            velocity,
            start,
            duration,
        }));
        self.length += duration;
    }

    /// Extend the length of the piano roll without playing notes.
    pub fn rest(&mut self, duration: Time) {
        self.length += duration;
    }

    /// Hold the last note for `duration` longer, provided it still sounds at the end of the roll.
    /// Returns `false` if there is no such note.
    pub fn extend_last(&mut self, duration: Time) -> bool {
        let length = self.length;
        match self.notes.last_mut() {
            Some(last) if last.end() == length => {
                last.duration += duration;
                self.length += duration;
                true
            }
            _ => false,
        }
    }

    /// The note that was appended last.
    pub fn last(&self) -> Option<&PlayedNote> {
        self.notes.last()
    }

    /// Iterate all notes on this piano roll in the order they are played.
    pub fn iter(&self) -> impl Iterator<Item = &PlayedNote> {
        self.notes.iter()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn length(&self) -> Time {
        self.length
    }
}
