// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Definitions of what a note is.

use std::fmt;

/// A "note" is just a key index on a MIDI keyboard.
/// This definition follows the MIDI standard where C4 (middle C) corresponds to index 60.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Note(u8);

/// The name of a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NoteName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl NoteName {
    /// Map a note letter (either case) to its name.
    pub fn from_letter(letter: char) -> Option<NoteName> {
        Some(match letter.to_ascii_uppercase() {
            'A' => NoteName::A,
            'B' => NoteName::B,
            'C' => NoteName::C,
            'D' => NoteName::D,
            'E' => NoteName::E,
            'F' => NoteName::F,
            'G' => NoteName::G,
            _ => return None,
        })
    }

    /// Semitones above the C of the same octave.
    fn semitones(self) -> i32 {
        match self {
            NoteName::C => 0,
            NoteName::D => 2,
            NoteName::E => 4,
            NoteName::F => 5,
            NoteName::G => 7,
            NoteName::A => 9,
            NoteName::B => 11,
        }
    }
}

/// Any alteration applied to a note in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Accidental {
    DoubleFlat,
    Flat,
    Natural,
    Sharp,
    DoubleSharp,
}

impl Accidental {
    fn semitones(self) -> i32 {
        match self {
            Accidental::DoubleFlat => -2,
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
            Accidental::DoubleSharp => 2,
        }
    }
}

impl Note {
    /// Convert a note from standard notation to a MIDI note index.
    /// Different names may refer to the same note, e.g. a G♯ is the same as an A♭.
    /// Returns `None` if the note is not representable in the MIDI note system.
    ///
    /// # Examples
    ///
    /// ```
    /// use tinyscore::note::*;
    ///
    /// assert_eq!(Note::try_named(NoteName::A, Accidental::Natural, 4), Some(Note::from_midi(69)));
    /// assert_eq!(Note::try_named(NoteName::C, Accidental::Sharp, 6), Some(Note::from_midi(85)));
    /// assert_eq!(Note::try_named(NoteName::B, Accidental::Flat, 3), Some(Note::from_midi(58)));
    /// assert_eq!(Note::try_named(NoteName::C, Accidental::Flat, -1), None);
    /// ```
    pub fn try_named(name: NoteName, accidental: Accidental, octave: i32) -> Option<Note> {
        // C4 is MIDI note number 60, so C-1 is 0
        let index = (octave + 1) * 12 + name.semitones() + accidental.semitones();
        Note::try_from_midi(index as i64)
    }

    pub fn from_midi(midi_note: u8) -> Note {
        assert!(midi_note < 128, "MIDI only has notes 0 - 127");
        Note(midi_note)
    }

    pub fn try_from_midi(midi_note: i64) -> Option<Note> {
        if (0..128).contains(&midi_note) {
            Some(Note(midi_note as u8))
        } else {
            None
        }
    }

    pub fn to_midi(self) -> u8 {
        self.0
    }

    /// The octave in scientific pitch notation, where middle C starts octave 4.
    pub fn octave(self) -> i32 {
        self.0 as i32 / 12 - 1
    }
}

/// Spelled with sharps, e.g. `C#4`.
///
/// ```
/// use tinyscore::note::Note;
///
/// assert_eq!(Note::from_midi(60).to_string(), "C4");
/// assert_eq!(Note::from_midi(70).to_string(), "A#4");
/// assert_eq!(Note::from_midi(31).to_string(), "G1");
/// ```
impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [&str; 12] = [
            "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
        ];
        write!(f, "{}{}", NAMES[self.0 as usize % 12], self.octave())
    }
}

/// The velocity of a note indicates how hard the key was pressed down,
/// on the MIDI scale from 0 to 127.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Velocity(u8);

impl Velocity {
    pub const MAX: Velocity = Velocity(127);
    pub const MIN: Velocity = Velocity(0);
    /// Velocity used for notes that don't state one.
    pub const DEFAULT: Velocity = Velocity(90);

    /// # Examples
    ///
    /// ```
    /// use tinyscore::note::*;
    ///
    /// assert_eq!(Velocity::try_from_midi(127), Some(Velocity::MAX));
    /// assert_eq!(Velocity::try_from_midi(128), None);
    /// ```
    pub fn try_from_midi(velocity: u8) -> Option<Velocity> {
        if velocity < 128 {
            Some(Velocity(velocity))
        } else {
            None
        }
    }

    pub fn to_midi(self) -> u8 {
        self.0
    }
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity::DEFAULT
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn octave_boundaries() {
        let b3 = Note::try_named(NoteName::B, Accidental::Natural, 3).unwrap();
        let c_flat4 = Note::try_named(NoteName::C, Accidental::Flat, 4).unwrap();
        assert_eq!(b3, c_flat4);
        assert_eq!(b3.octave(), 3);
    }

    #[test]
    fn double_accidentals() {
        let f_double_sharp = Note::try_named(NoteName::F, Accidental::DoubleSharp, 4).unwrap();
        let g = Note::try_named(NoteName::G, Accidental::Natural, 4).unwrap();
        let a_double_flat = Note::try_named(NoteName::A, Accidental::DoubleFlat, 4).unwrap();
        assert_eq!(f_double_sharp, g);
        assert_eq!(a_double_flat, g);
    }

    #[test]
    fn highest_note() {
        assert_eq!(
            Note::try_named(NoteName::G, Accidental::Natural, 9),
            Some(Note::from_midi(127))
        );
        assert_eq!(Note::try_named(NoteName::G, Accidental::Sharp, 9), None);
    }
}
