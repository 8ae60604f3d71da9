// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The carols played by the bundled programs.

use crate::score::{Score, ScoreError, VoiceSource};

/// "We Wish You a Merry Christmas", melody and bass in 3/4.
pub const MERRY_CHRISTMAS: [VoiceSource; 2] = [
    VoiceSource {
        name: "choir",
        instrument: "Vibraphone",
        notation: " tinynotation: 3/4 r4 r
c4 f f8 g f e d4 d8 r   d4 g g8 a g f e4 c8 r
c4 a a8 b- a g f4 d  c8 c d4 g e f2
c4 f f f e2    e4 f e d c2
g4 a g f c' c  c8 c d4 g e f2
c4 f8 r f g f e d r d r  d4 g8 r g a g f e r c r
c4 a8 r a b- a g f r d r  c c d r g r e r f2.
",
    },
    VoiceSource {
        name: "bass",
        instrument: "AcousticBass",
        notation: " tinynotation: 3/4 r4 r
r F4 F F B- B- B-  G G G c c c
A4 A A d F A  B-4 G c  F  c8 B- A G
F4 A F c G c  B G B c C E
F4 C F A F A  B- G c F C8 D E C
F4 A F B- B-8 c B- A  G4 B G c c8 d c B-
A4 c# A d B-8 c B- A  B-4 G c F f2
",
    },
];

/// "Minuit, chrétiens" (O Holy Night), melody, arpeggios and bass in 12/8.
pub const MINUIT_CHRETIENS: [VoiceSource; 3] = [
    VoiceSource {
        name: "choir",
        instrument: "Oboe",
        notation: " tinynotation: 12/8  r1.
e4. e4 e8 g4.~ g4 g8 a4 a8 f4 a8 c'2. g4 g8 e4 d8 c4. e4 f8 g4. f4 d8 c1.
e4. e4 e8 g4.~ g4 g8 a4 a8 f4 a8 c'2. g4 g8 f#4 e8 b4. g4 a8 b4. c'4 b8 e2.~ e4.~ e4
g8 g4. a d g a4 g8 c'4 e8 a4. g4 g8 g4. a d g a4 g8 c'4 e8 g2.
c'2.~ c'4. b4 a8 b2.~ b4.~ b4 b8 d'2.~ d'4 a8 a4 a8 c'2. c'4.~ c'4 c'8
e'2. d'4.~ d'4 g8 c'2.~ c'4. b4 a8 g2.~ g4 g8 a4 g8 g2.~ g4.
c'4. d'2.~ d'4. g4. e'2.~ e'4. d'4. c'2. b4. c'4 d'8 c'1.
",
    },
    VoiceSource {
        name: "piano",
        instrument: "Lute",
        notation: " tinynotation: 12/8
E8 c G e c G E c G e c G
E c G e c G  E c G e c G  F c A f c A  E c G e c G E c G e c G
E c G e c G  F B G d B G  E c G e c G  E c G e c G
E c G e c G  E c G e c G  F c A f c A  E c G e c G E B- G e B- G
E B G e B G F# B A e- B A E B G e B G  E B G e B G
F B G d B G  F B G d B G  E c G e c G  E c G e c G
F B G d B G  F B G d B G  E c G e c G  E c G e c G
E c A e c A  E c A e c A  E B G e B G  E B G e B G
F d A f d A  F d A f d A  E c A e c A  E c A e c A
E c G e c G  D B G d B G  G e c g e c  F c A f c A
E c G e c G  F B G d B G  E c G e c G  E c G e c G
D B G d B G  D B G d B G  G e c g e c  F d A f d A
E c G e c G  F B G d B G  C E G c G E  c2.
",
    },
    VoiceSource {
        name: "bass",
        instrument: "StringInstrument",
        notation: " tinynotation: 12/8
CC2.~ CC  CC CC FF CC  EE GG GGG
 CC~  CC  CC CC FF CC  CC BBB BBB EE~ EE
BB4. GG BB GG  C GG C GG
 BB  GG BB GG  C GG C~ C
AA2.~ AA EE~ EE DD~ DD AA~ AA
 GG  FF EE FF GG GG  CC4. EE GG C
G2. F E F G GG C1.
",
    },
];

pub fn merry_christmas() -> Result<Score, ScoreError> {
    Score::from_sources(&MERRY_CHRISTMAS)
}

pub fn minuit_chretiens() -> Result<Score, ScoreError> {
    Score::from_sources(&MINUIT_CHRETIENS)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::pianoroll::Time;
    use crate::score::TimeSignature;

    fn instruments(score: &Score) -> Vec<&'static str> {
        score
            .parts()
            .iter()
            .map(|part| part.instrument().name())
            .collect()
    }

    #[test]
    fn merry_christmas_parts() {
        let score = merry_christmas().unwrap();
        assert_eq!(score.parts().len(), 2);
        assert_eq!(instruments(&score), vec!["Vibraphone", "Acoustic Bass"]);
        assert_eq!(score.time_signature(), TimeSignature::new(3, 4));
    }

    #[test]
    fn minuit_chretiens_parts() {
        let score = minuit_chretiens().unwrap();
        assert_eq!(score.parts().len(), 3);
        assert_eq!(
            instruments(&score),
            vec![
                "Oboe",
                "Acoustic Guitar (nylon)",
                "String Ensemble 1"
            ]
        );
        assert_eq!(score.time_signature(), TimeSignature::new(12, 8));
    }

    #[test]
    fn score_lasts_as_long_as_longest_part() {
        for score in &[merry_christmas().unwrap(), minuit_chretiens().unwrap()] {
            let longest = score
                .parts()
                .iter()
                .map(|part| part.voice().length())
                .max()
                .unwrap();
            assert!(!longest.is_zero());
            assert_eq!(score.length(), longest);
        }
    }

    #[test]
    fn first_notes() {
        let score = minuit_chretiens().unwrap();
        let bass = &score.parts()[2];
        let first = bass.voice().roll().iter().next().unwrap();
        // CC2.~ CC: two tied dotted halves of C2
        assert_eq!(first.note.to_midi(), 36);
        assert_eq!(first.duration, Time::new(3, 2));
    }
}
