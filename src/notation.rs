// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Parser for *tiny notation*, a compact textual format for writing a single voice.
//!
//! A voice is a sequence of whitespace separated tokens:
//!
//! - `3/4`, `12/8`: a time signature, taking effect at the current position,
//! - `c4`, `b-8.`, `F#2`, `c'16`: a note, consisting of a letter, an optional accidental
//!   (`#`, `##`, `-`, `--`, `n`), octave marks and a duration with optional dots,
//! - `r4`, `r2.`: a rest,
//! - `g4.~ g8`: a tie, merging the next note of the same pitch into this one,
//! - `trip{c8 d e}`, `quad{...}`: triplets and quadruplets,
//! - `chord{C4 e g}`: notes sounding together. The chord lasts as long as its first note
//!   and time advances once by that duration.
//!
//! Lowercase `c` is middle C, and every repetition of the letter or every `'` raises the
//! note by an octave (`cc` and `c'` are both C5). Uppercase `C` is the C below middle C,
//! and every repetition lowers it by another octave (`CC` is C2).
//!
//! Notes and rests without a duration reuse the duration (including dots) of the
//! previous note or rest. The text may start with a `tinynotation:` header.

use log::{debug, trace, warn};
use snafu::Snafu;

use crate::note::{Accidental, Note, NoteName, Velocity};
use crate::pianoroll::{PianoRoll, Time};
use crate::score::{TimeSignature, Voice};

/// Parse the notation text of a single voice.
///
/// # Examples
///
/// ```
/// use tinyscore::notation;
///
/// let voice = notation::parse("tinynotation: 3/4 c4 d e f2.").unwrap();
/// assert_eq!(voice.roll().len(), 4);
/// assert_eq!(voice.time_signature().to_string(), "3/4");
/// ```
pub fn parse(input: &str) -> Result<Voice, ParseError> {
    let mut p = Parser::new();
    for (i, token) in strip_header(input).split_whitespace().enumerate() {
        p.parse_token(i + 1, token)?;
    }
    p.finish()
}

const HEADER: &str = "tinynotation:";

fn strip_header(input: &str) -> &str {
    let input = input.trim_start();
    match input.get(..HEADER.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(HEADER) => &input[HEADER.len()..],
        _ => input,
    }
}

/// Errors that can occur while parsing notation text.
/// Token indices start at 1 and don't count the header.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum ParseError {
    #[snafu(display("token {} {:?}: unknown symbol", index, token))]
    UnknownToken { index: usize, token: String },
    #[snafu(display("token {} {:?}: a note must repeat a single letter", index, token))]
    MixedLetters { index: usize, token: String },
    #[snafu(display("token {} {:?}: invalid duration", index, token))]
    InvalidDuration { index: usize, token: String },
    #[snafu(display("token {} {:?}: too many accidentals", index, token))]
    InvalidAccidental { index: usize, token: String },
    #[snafu(display("token {} {:?}: invalid time signature", index, token))]
    InvalidTimeSignature { index: usize, token: String },
    #[snafu(display("token {} {:?}: note is outside of the MIDI range", index, token))]
    OutOfRange { index: usize, token: String },
    #[snafu(display("token {} {:?}: groups cannot be nested", index, token))]
    NestedGroup { index: usize, token: String },
    #[snafu(display("token {} {:?}: closing brace without a group", index, token))]
    UnmatchedBrace { index: usize, token: String },
    #[snafu(display("token {}: group is never closed", index))]
    UnterminatedGroup { index: usize },
    #[snafu(display("token {} {:?}: a chord cannot contain rests", index, token))]
    RestInChord { index: usize, token: String },
}

/// A duration as written, before tuplets are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Written {
    /// The undotted length, e.g. 1/4 for a quarter.
    base: Time,
    dots: u32,
}

impl Written {
    fn time(self) -> Time {
        // every dot adds half of the previous addition
        let mut time = self.base;
        let mut add = self.base;
        for _ in 0..self.dots {
            add = add / 2;
            time += add;
        }
        time
    }
}

/// A brace group that is still open.
struct Group {
    kind: GroupKind,
    /// Index of the token that opened the group.
    opened_at: usize,
}

enum GroupKind {
    /// Durations inside are scaled by the given factor.
    Tuplet(Time),
    Chord(Chord),
}

/// Keys collected for a chord, played once the closing brace is reached.
#[derive(Default)]
struct Chord {
    keys: Vec<Note>,
    /// Duration of the first note, which is the duration of the whole chord.
    duration: Option<Time>,
}

fn open_group(symbol: &str) -> Option<(&str, GroupKind)> {
    if let Some(rest) = strip_prefix(symbol, "trip{") {
        Some((rest, GroupKind::Tuplet(Time::new(2, 3))))
    } else if let Some(rest) = strip_prefix(symbol, "quad{") {
        Some((rest, GroupKind::Tuplet(Time::new(3, 4))))
    } else if let Some(rest) = strip_prefix(symbol, "chord{") {
        Some((rest, GroupKind::Chord(Chord::default())))
    } else {
        None
    }
}

struct PendingTie {
    note: Note,
    index: usize,
}

struct Parser {
    roll: PianoRoll,
    time_signatures: Vec<(Time, TimeSignature)>,
    last_duration: Written,
    group: Option<Group>,
    tie: Option<PendingTie>,
}

impl Parser {
    fn new() -> Self {
        Self {
            roll: PianoRoll::new(),
            time_signatures: Vec::new(),
            last_duration: Written {
                base: Time::nth(4),
                dots: 0,
            },
            group: None,
            tie: None,
        }
    }

    fn parse_token(&mut self, index: usize, token: &str) -> Result<(), ParseError> {
        trace!("token {}: {:?}", index, token);
        let mut symbol = token;

        if let Some((rest, kind)) = open_group(symbol) {
            if self.group.is_some() {
                return Err(ParseError::NestedGroup {
                    index,
                    token: token.into(),
                });
            }
            self.group = Some(Group {
                kind,
                opened_at: index,
            });
            symbol = rest;
        }

        let closes = symbol.ends_with('}');
        if closes {
            symbol = &symbol[..symbol.len() - 1];
            if self.group.is_none() {
                return Err(ParseError::UnmatchedBrace {
                    index,
                    token: token.into(),
                });
            }
        }

        if !symbol.is_empty() {
            self.parse_symbol(index, symbol)?;
        }

        if closes {
            self.close_group();
        }
        Ok(())
    }

    fn close_group(&mut self) {
        if let Some(Group {
            kind: GroupKind::Chord(chord),
            opened_at,
        }) = self.group.take()
        {
            match chord.duration {
                Some(duration) => self.roll.add_chord(&chord.keys, duration, Velocity::DEFAULT),
                None => warn!("token {}: empty chord", opened_at),
            }
        }
    }

    fn chord_mut(&mut self) -> Option<&mut Chord> {
        match &mut self.group {
            Some(Group {
                kind: GroupKind::Chord(chord),
                ..
            }) => Some(chord),
            _ => None,
        }
    }

    fn parse_symbol(&mut self, index: usize, symbol: &str) -> Result<(), ParseError> {
        if symbol.contains('/') {
            return self.parse_time_signature(index, symbol);
        }

        let mut stream = Scan::new(symbol);
        match stream.current() {
            Some('r') => {
                if self.chord_mut().is_some() {
                    return Err(ParseError::RestInChord {
                        index,
                        token: symbol.into(),
                    });
                }
                stream.advance();
                let duration = self.parse_duration(index, symbol, &mut stream)?;
                self.expect_end(index, symbol, &mut stream)?;
                if let Some(tie) = self.tie.take() {
                    warn!(
                        "token {}: tie from {} is followed by a rest, ignoring it",
                        tie.index, tie.note
                    );
                }
                self.roll.rest(duration);
                Ok(())
            }
            Some(ch) if NoteName::from_letter(ch).is_some() => {
                self.parse_note_symbol(index, symbol, &mut stream)
            }
            _ => Err(ParseError::UnknownToken {
                index,
                token: symbol.into(),
            }),
        }
    }

    fn parse_note_symbol(
        &mut self,
        index: usize,
        symbol: &str,
        stream: &mut Scan,
    ) -> Result<(), ParseError> {
        let note = self.parse_pitch(index, symbol, stream)?;
        let duration = self.parse_duration(index, symbol, stream)?;
        let tied = stream.eat('~');
        self.expect_end(index, symbol, stream)?;

        if self.chord_mut().is_some() {
            return self.add_to_chord(index, note, duration, tied);
        }

        let merged = match self.tie.take() {
            Some(tie) if tie.note == note => self.roll.extend_last(duration),
            Some(tie) => {
                warn!(
                    "token {}: tie from {} continues with {}, ignoring it",
                    tie.index, tie.note, note
                );
                false
            }
            None => false,
        };
        if !merged {
            self.roll.add_after(note, duration, Velocity::DEFAULT);
        }
        if tied {
            self.tie = Some(PendingTie { note, index });
        }
        Ok(())
    }

    fn add_to_chord(
        &mut self,
        index: usize,
        note: Note,
        duration: Time,
        tied: bool,
    ) -> Result<(), ParseError> {
        if let Some(tie) = self.tie.take() {
            warn!(
                "token {}: tie from {} continues with a chord, ignoring it",
                tie.index, tie.note
            );
        }
        if tied {
            warn!("token {}: ties inside a chord are ignored", index);
        }
        if let Some(chord) = self.chord_mut() {
            chord.duration.get_or_insert(duration);
            chord.keys.push(note);
        }
        Ok(())
    }

    fn parse_pitch(
        &mut self,
        index: usize,
        symbol: &str,
        stream: &mut Scan,
    ) -> Result<Note, ParseError> {
        // The caller made sure the first character is a note letter
        let letter = stream.current().unwrap_or('c');
        let name = NoteName::from_letter(letter).ok_or_else(|| ParseError::UnknownToken {
            index,
            token: symbol.into(),
        })?;
        let mut repeats = 0;
        while let Some(ch) = stream.current() {
            if ch == letter {
                repeats += 1;
                stream.advance();
            } else if NoteName::from_letter(ch).is_some() {
                return Err(ParseError::MixedLetters {
                    index,
                    token: symbol.into(),
                });
            } else {
                break;
            }
        }
        let mut octave = if letter.is_ascii_lowercase() {
            4 + (repeats - 1)
        } else {
            3 - (repeats - 1)
        };

        // accidentals and octave marks, in any order
        let mut alteration = 0;
        loop {
            match stream.current() {
                Some('#') => alteration += 1,
                Some('-') => alteration -= 1,
                Some('n') => {}
                Some('\'') => octave += 1,
                _ => break,
            }
            stream.advance();
        }
        let accidental = match alteration {
            -2 => Accidental::DoubleFlat,
            -1 => Accidental::Flat,
            0 => Accidental::Natural,
            1 => Accidental::Sharp,
            2 => Accidental::DoubleSharp,
            _ => {
                return Err(ParseError::InvalidAccidental {
                    index,
                    token: symbol.into(),
                })
            }
        };

        Note::try_named(name, accidental, octave).ok_or_else(|| ParseError::OutOfRange {
            index,
            token: symbol.into(),
        })
    }

    fn parse_duration(
        &mut self,
        index: usize,
        symbol: &str,
        stream: &mut Scan,
    ) -> Result<Time, ParseError> {
        let invalid = || ParseError::InvalidDuration {
            index,
            token: symbol.into(),
        };

        let digits = stream.take_while(|ch| ch.is_ascii_digit());
        let mut dots = 0;
        while stream.eat('.') {
            dots += 1;
        }

        let written = if digits.is_empty() {
            if dots > 0 {
                Written {
                    base: self.last_duration.base,
                    dots,
                }
            } else {
                self.last_duration
            }
        } else {
            let denominator: i64 = digits.parse().map_err(|_| invalid())?;
            if !is_power_of_two(denominator, 64) {
                return Err(invalid());
            }
            Written {
                base: Time::nth(denominator),
                dots,
            }
        };
        self.last_duration = written;

        let mut duration = written.time();
        if let Some(Group {
            kind: GroupKind::Tuplet(scale),
            ..
        }) = &self.group
        {
            duration *= *scale;
        }
        Ok(duration)
    }

    fn parse_time_signature(&mut self, index: usize, symbol: &str) -> Result<(), ParseError> {
        let invalid = || ParseError::InvalidTimeSignature {
            index,
            token: symbol.into(),
        };
        let mut parts = symbol.splitn(2, '/');
        let beats: u8 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        let beat_unit: u8 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(invalid)?;
        if beats == 0 || !is_power_of_two(beat_unit as i64, 64) {
            return Err(invalid());
        }

        let signature = TimeSignature::new(beats, beat_unit);
        let now = self.roll.length();
        match self.time_signatures.last_mut() {
            Some((time, last)) if *time == now => *last = signature,
            _ => self.time_signatures.push((now, signature)),
        }
        Ok(())
    }

    fn expect_end(
        &mut self,
        index: usize,
        symbol: &str,
        stream: &mut Scan,
    ) -> Result<(), ParseError> {
        if stream.is_eof() {
            Ok(())
        } else {
            Err(ParseError::UnknownToken {
                index,
                token: symbol.into(),
            })
        }
    }

    fn finish(self) -> Result<Voice, ParseError> {
        if let Some(group) = self.group {
            return Err(ParseError::UnterminatedGroup {
                index: group.opened_at,
            });
        }
        if let Some(tie) = self.tie {
            debug!("token {}: tie at the end of the voice", tie.index);
        }
        Ok(Voice::new(self.roll, self.time_signatures))
    }
}

fn is_power_of_two(n: i64, max: i64) -> bool {
    n >= 1 && n <= max && n & (n - 1) == 0
}

fn strip_prefix<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.starts_with(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Character cursor over a single token.
struct Scan<'a> {
    stream: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
}

impl<'a> Scan<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            stream: input.char_indices().peekable(),
            input,
        }
    }

    fn is_eof(&mut self) -> bool {
        self.current().is_none()
    }

    fn current(&mut self) -> Option<char> {
        self.stream.peek().map(|(_, ch)| *ch)
    }

    fn advance(&mut self) {
        self.stream.next();
    }

    /// Consume the next character if it is `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.current() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn take_while<P: Fn(char) -> bool>(&mut self, predicate: P) -> &'a str {
        let start = match self.stream.peek() {
            Some((pos, _)) => *pos,
            None => return "",
        };
        let mut end = start;
        while let Some((pos, ch)) = self.stream.peek().cloned() {
            if !predicate(ch) {
                break;
            }
            end = pos + ch.len_utf8();
            self.advance();
        }
        &self.input[start..end]
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use expect_test::expect;

    fn midi_notes(voice: &Voice) -> Vec<u8> {
        voice.roll().iter().map(|n| n.note.to_midi()).collect()
    }

    fn durations(voice: &Voice) -> Vec<Time> {
        voice.roll().iter().map(|n| n.duration).collect()
    }

    #[test]
    fn octaves_follow_letter_case_and_repetition() {
        let voice = parse("c cc c' c'' C CC CCC GGG BB").unwrap();
        assert_eq!(midi_notes(&voice), vec![60, 72, 72, 84, 48, 36, 24, 31, 47]);
    }

    #[test]
    fn accidentals() {
        let voice = parse("c# b- B- e-- f## bn c'#").unwrap();
        assert_eq!(midi_notes(&voice), vec![61, 70, 58, 62, 67, 71, 73]);
    }

    #[test]
    fn durations_are_inherited() {
        let voice = parse("c4 d e8 f g2. a b c'1").unwrap();
        assert_eq!(
            durations(&voice),
            vec![
                Time::nth(4),
                Time::nth(4),
                Time::nth(8),
                Time::nth(8),
                Time::new(3, 4),
                Time::new(3, 4),
                Time::new(3, 4),
                Time::one(),
            ]
        );
    }

    #[test]
    fn rests_inherit_and_advance_time() {
        let voice = parse("3/4 r4 r c8 r d").unwrap();
        let starts: Vec<_> = voice.roll().iter().map(|n| n.start).collect();
        assert_eq!(starts, vec![Time::nth(2), Time::new(3, 4)]);
        assert_eq!(voice.length(), Time::new(7, 8));
    }

    #[test]
    fn double_dots() {
        let voice = parse("c2..").unwrap();
        assert_eq!(durations(&voice), vec![Time::new(7, 8)]);
    }

    #[test]
    fn ties_merge_equal_pitches() {
        let voice = parse("12/8 e2.~ e4.~ e4 g8").unwrap();
        assert_eq!(midi_notes(&voice), vec![64, 67]);
        assert_eq!(durations(&voice), vec![Time::new(11, 8), Time::nth(8)]);
        assert_eq!(voice.length(), Time::new(3, 2));
    }

    #[test]
    fn ties_to_other_pitches_are_ignored() {
        let voice = parse("c4~ d4 e~ r f").unwrap();
        assert_eq!(midi_notes(&voice), vec![60, 62, 64, 65]);
        assert_eq!(voice.length(), Time::new(5, 4));
    }

    #[test]
    fn tuplets() {
        let voice = parse("trip{c8 d e} f4 quad{g16 a b c'}").unwrap();
        assert_eq!(voice.length(), Time::new(11, 16));
        assert_eq!(durations(&voice)[0], Time::nth(12));
        assert_eq!(durations(&voice)[3], Time::nth(4));
        assert_eq!(durations(&voice)[4], Time::new(3, 64));
    }

    #[test]
    fn tuplet_braces_may_stand_alone() {
        let voice = parse("trip{ c8 d e }").unwrap();
        assert_eq!(voice.length(), Time::nth(4));
    }

    #[test]
    fn chords_sound_together() {
        let voice = parse("tinynotation: 4/4 chord{C4 e g} c").unwrap();
        let notes: Vec<_> = voice
            .roll()
            .iter()
            .map(|n| (n.note.to_midi(), n.start, n.duration))
            .collect();
        assert_eq!(
            notes,
            vec![
                (48, Time::zero(), Time::nth(4)),
                (64, Time::zero(), Time::nth(4)),
                (67, Time::zero(), Time::nth(4)),
                (60, Time::nth(4), Time::nth(4)),
            ]
        );
        assert_eq!(voice.length(), Time::nth(2));
    }

    #[test]
    fn chord_lasts_as_long_as_its_first_note() {
        let voice = parse("chord{ c2 e8 g } d").unwrap();
        assert_eq!(
            durations(&voice),
            vec![Time::nth(2), Time::nth(2), Time::nth(2), Time::nth(8)]
        );
        assert_eq!(voice.length(), Time::new(5, 8));
    }

    #[test]
    fn ties_do_not_reach_into_chords() {
        let voice = parse("c2~ chord{c e} c").unwrap();
        assert_eq!(midi_notes(&voice), vec![60, 60, 64, 60]);
        assert_eq!(voice.length(), Time::new(3, 2));
    }

    #[test]
    fn header_and_time_signatures() {
        let voice = parse("  TinyNotation: 3/4 c2. 6/8 d4. e").unwrap();
        let sigs: Vec<_> = voice
            .time_signatures()
            .iter()
            .map(|(t, sig)| format!("{} @ {}", sig, t))
            .collect();
        assert_eq!(sigs, vec!["3/4 @ 0", "6/8 @ 3/4"]);
    }

    #[test]
    fn repeated_time_signature_replaces_previous() {
        let voice = parse("3/4 4/4 c1").unwrap();
        assert_eq!(voice.time_signatures().len(), 1);
        assert_eq!(voice.time_signature().to_string(), "4/4");
    }

    #[test]
    fn errors_name_the_token() {
        expect![[r#"token 3 "x4": unknown symbol"#]]
            .assert_eq(&parse("c d x4").unwrap_err().to_string());
        expect![[r#"token 1 "cd": a note must repeat a single letter"#]]
            .assert_eq(&parse("cd").unwrap_err().to_string());
        expect![[r#"token 2 "e3": invalid duration"#]]
            .assert_eq(&parse("c4 e3").unwrap_err().to_string());
        expect![[r#"token 1 "c###": too many accidentals"#]]
            .assert_eq(&parse("c###").unwrap_err().to_string());
        expect![[r#"token 1 "3/5": invalid time signature"#]]
            .assert_eq(&parse("3/5 c").unwrap_err().to_string());
        expect![[r#"token 1 "c''''''": note is outside of the MIDI range"#]]
            .assert_eq(&parse("c''''''").unwrap_err().to_string());
        expect![[r#"token 2: group is never closed"#]]
            .assert_eq(&parse("c trip{d8 e f").unwrap_err().to_string());
        expect![[r#"token 2 "trip{d8": groups cannot be nested"#]]
            .assert_eq(&parse("trip{c8 trip{d8 e}").unwrap_err().to_string());
        expect![[r#"token 2 "chord{e": groups cannot be nested"#]]
            .assert_eq(&parse("trip{c8 chord{e g}").unwrap_err().to_string());
        expect![[r#"token 1: group is never closed"#]]
            .assert_eq(&parse("chord{c e g").unwrap_err().to_string());
        expect![[r#"token 2 "r": a chord cannot contain rests"#]]
            .assert_eq(&parse("chord{c r}").unwrap_err().to_string());
        expect![[r#"token 2 "d}": closing brace without a group"#]]
            .assert_eq(&parse("c d}").unwrap_err().to_string());
        expect![[r#"token 1 "c4x": unknown symbol"#]]
            .assert_eq(&parse("c4x").unwrap_err().to_string());
    }

    #[test]
    fn empty_voice() {
        let voice = parse("tinynotation:").unwrap();
        assert!(voice.roll().is_empty());
        assert_eq!(voice.length(), Time::zero());
    }
}
