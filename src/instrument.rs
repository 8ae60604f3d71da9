// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Registry of instrument timbres.
//!
//! The sound itself is produced by whatever synthesizer listens on the MIDI port,
//! so an instrument boils down to a General MIDI program number.

use std::fmt;

use snafu::Snafu;

/// An instrument timbre that a part is played with.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Instrument {
    name: &'static str,
    program: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum InstrumentError {
    #[snafu(display("Unknown instrument {:?}", label))]
    Unknown { label: String },
}

impl Instrument {
    /// The instrument with the given 0-based General MIDI program number.
    ///
    /// ```
    /// use tinyscore::instrument::Instrument;
    ///
    /// assert_eq!(Instrument::from_program(11).unwrap().name(), "Vibraphone");
    /// assert!(Instrument::from_program(128).is_none());
    /// ```
    pub fn from_program(program: u8) -> Option<Instrument> {
        GENERAL_MIDI
            .get(program as usize)
            .map(|name| Instrument {
                name: *name,
                program,
            })
    }

    /// The General MIDI name of the program.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The 0-based General MIDI program number.
    pub fn program(&self) -> u8 {
        self.program
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (program {})", self.name, self.program)
    }
}

/// Look up an instrument by label.
///
/// Labels are matched ignoring case, whitespace and punctuation against the General MIDI
/// program names and a few generic instrument names.
///
/// ```
/// use tinyscore::instrument;
///
/// assert_eq!(instrument::lookup("AcousticBass").unwrap().program(), 32);
/// assert_eq!(instrument::lookup("acoustic guitar (nylon)").unwrap().program(), 24);
/// assert_eq!(instrument::lookup("Lute").unwrap().program(), 24);
/// assert!(instrument::lookup("Theremin").is_none());
/// ```
pub fn lookup(label: &str) -> Option<Instrument> {
    let key = normalize(label);
    if key.is_empty() {
        return None;
    }
    let program = GENERAL_MIDI
        .iter()
        .position(|name| normalize(name) == key)
        .map(|index| index as u8)
        .or_else(|| {
            ALIASES
                .iter()
                .find(|(alias, _)| normalize(alias) == key)
                .map(|(_, program)| *program)
        })?;
    Instrument::from_program(program)
}

/// Like [`lookup`], but failing with an error naming the label.
pub fn by_name(label: &str) -> Result<Instrument, InstrumentError> {
    lookup(label).ok_or_else(|| InstrumentError::Unknown {
        label: label.to_string(),
    })
}

fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric())
        .map(|ch| ch.to_ascii_lowercase())
        .collect()
}

/// Generic instrument names and the program that stands in for them.
const ALIASES: &[(&str, u8)] = &[
    ("Piano", 0),
    ("Electric Piano", 4),
    ("Organ", 19),
    ("Pipe Organ", 19),
    ("Electric Organ", 16),
    ("Guitar", 24),
    ("Acoustic Guitar", 24),
    ("Lute", 24),
    ("Electric Guitar", 26),
    ("Bass", 32),
    ("Electric Bass", 33),
    ("Harp", 46),
    ("String Instrument", 48),
    ("Strings", 48),
    ("Choir", 52),
    ("Horn", 60),
    ("Saxophone", 65),
    ("Sax", 65),
    ("Bagpipes", 109),
];

/// The 128 General MIDI level 1 programs, indexed by program number.
const GENERAL_MIDI: [&str; 128] = [
    // Piano
    "Acoustic Grand Piano",
    "Bright Acoustic Piano",
    "Electric Grand Piano",
    "Honky-tonk Piano",
    "Electric Piano 1",
    "Electric Piano 2",
    "Harpsichord",
    "Clavinet",
    // Chromatic percussion
    "Celesta",
    "Glockenspiel",
    "Music Box",
    "Vibraphone",
    "Marimba",
    "Xylophone",
    "Tubular Bells",
    "Dulcimer",
    // Organ
    "Drawbar Organ",
    "Percussive Organ",
    "Rock Organ",
    "Church Organ",
    "Reed Organ",
    "Accordion",
    "Harmonica",
    "Tango Accordion",
    // Guitar
    "Acoustic Guitar (nylon)",
    "Acoustic Guitar (steel)",
    "Electric Guitar (jazz)",
    "Electric Guitar (clean)",
    "Electric Guitar (muted)",
    "Overdriven Guitar",
    "Distortion Guitar",
    "Guitar Harmonics",
    // Bass
    "Acoustic Bass",
    "Electric Bass (finger)",
    "Electric Bass (pick)",
    "Fretless Bass",
    "Slap Bass 1",
    "Slap Bass 2",
    "Synth Bass 1",
    "Synth Bass 2",
    // Strings
    "Violin",
    "Viola",
    "Cello",
    "Contrabass",
    "Tremolo Strings",
    "Pizzicato Strings",
    "Orchestral Harp",
    "Timpani",
    // Ensemble
    "String Ensemble 1",
    "String Ensemble 2",
    "Synth Strings 1",
    "Synth Strings 2",
    "Choir Aahs",
    "Voice Oohs",
    "Synth Voice",
    "Orchestra Hit",
    // Brass
    "Trumpet",
    "Trombone",
    "Tuba",
    "Muted Trumpet",
    "French Horn",
    "Brass Section",
    "Synth Brass 1",
    "Synth Brass 2",
    // Reed
    "Soprano Sax",
    "Alto Sax",
    "Tenor Sax",
    "Baritone Sax",
    "Oboe",
    "English Horn",
    "Bassoon",
    "Clarinet",
    // Pipe
    "Piccolo",
    "Flute",
    "Recorder",
    "Pan Flute",
    "Blown Bottle",
    "Shakuhachi",
    "Whistle",
    "Ocarina",
    // Synth lead
    "Lead 1 (square)",
    "Lead 2 (sawtooth)",
    "Lead 3 (calliope)",
    "Lead 4 (chiff)",
    "Lead 5 (charang)",
    "Lead 6 (voice)",
    "Lead 7 (fifths)",
    "Lead 8 (bass + lead)",
    // Synth pad
    "Pad 1 (new age)",
    "Pad 2 (warm)",
    "Pad 3 (polysynth)",
    "Pad 4 (choir)",
    "Pad 5 (bowed)",
    "Pad 6 (metallic)",
    "Pad 7 (halo)",
    "Pad 8 (sweep)",
    // Synth effects
    "FX 1 (rain)",
    "FX 2 (soundtrack)",
    "FX 3 (crystal)",
    "FX 4 (atmosphere)",
    "FX 5 (brightness)",
    "FX 6 (goblins)",
    "FX 7 (echoes)",
    "FX 8 (sci-fi)",
    // Ethnic
    "Sitar",
    "Banjo",
    "Shamisen",
    "Koto",
    "Kalimba",
    "Bagpipe",
    "Fiddle",
    "Shanai",
    // Percussive
    "Tinkle Bell",
    "Agogo",
    "Steel Drums",
    "Woodblock",
    "Taiko Drum",
    "Melodic Tom",
    "Synth Drum",
    "Reverse Cymbal",
    // Sound effects
    "Guitar Fret Noise",
    "Breath Noise",
    "Seashore",
    "Bird Tweet",
    "Telephone Ring",
    "Helicopter",
    "Applause",
    "Gunshot",
];

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn instruments_of_the_carols() {
        let programs: Vec<_> = ["Vibraphone", "AcousticBass", "Oboe", "Lute", "StringInstrument"]
            .iter()
            .map(|label| by_name(label).unwrap().program())
            .collect();
        assert_eq!(programs, vec![11, 32, 68, 24, 48]);
    }

    #[test]
    fn general_midi_names_take_precedence() {
        // "Bagpipe" is a program name, "Bagpipes" only an alias for it
        assert_eq!(lookup("bagpipe"), lookup("Bagpipes"));
        assert_eq!(lookup("Bass").unwrap().name(), "Acoustic Bass");
    }

    #[test]
    fn unknown_labels() {
        assert_eq!(
            by_name("Kazoo").unwrap_err().to_string(),
            "Unknown instrument \"Kazoo\""
        );
        assert!(lookup("").is_none());
        assert!(lookup("  ()").is_none());
    }

    #[test]
    fn display() {
        assert_eq!(lookup("oboe").unwrap().to_string(), "Oboe (program 68)");
    }
}
