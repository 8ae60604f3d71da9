// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Export of scores as standard MIDI files.
//!
//! The file has format 1: a conductor track with tempo and time signatures,
//! followed by one track per part.

use std::path::Path;

use log::info;
use midly::num::{u15, u24, u28, u4};
use midly::{Format, Header, MetaMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};

use super::OutputError;
use crate::play::{Tempo, TICKS_PER_QUARTER};
use crate::schedule;
use crate::score::{Score, TimeSignature};

/// Write the score to a standard MIDI file.
pub fn write_smf(score: &Score, tempo: Tempo, path: &Path) -> Result<(), OutputError> {
    let smf = to_smf(score, tempo)?;
    smf.save(path).map_err(|source| OutputError::WriteFile {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        "wrote {} tracks to {}",
        smf.tracks.len(),
        path.display()
    );
    Ok(())
}

/// Build the in-memory representation of the MIDI file for a score.
pub fn to_smf(score: &Score, tempo: Tempo) -> Result<Smf<'_>, OutputError> {
    let events =
        schedule::schedule(score).map_err(|source| OutputError::Schedule { source })?;

    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::from(TICKS_PER_QUARTER as u16)),
    ));
    smf.tracks.push(conductor_track(score, tempo));

    for (index, part) in score.parts().iter().enumerate() {
        let mut track = vec![
            meta(0, MetaMessage::TrackName(part.name().as_bytes())),
            meta(0, MetaMessage::InstrumentName(part.instrument().name().as_bytes())),
        ];
        let mut last_tick = 0;
        for event in events.iter().filter(|event| event.part == index) {
            let tick = tempo.ticks(event.time);
            track.push(TrackEvent {
                delta: u28::from(tick.saturating_sub(last_tick)),
                kind: TrackEventKind::Midi {
                    channel: u4::from(event.channel),
                    message: event.message(),
                },
            });
            last_tick = tick;
        }
        track.push(meta(0, MetaMessage::EndOfTrack));
        smf.tracks.push(track);
    }
    Ok(smf)
}

fn conductor_track(score: &Score, tempo: Tempo) -> Track<'static> {
    let mut track = vec![meta(
        0,
        MetaMessage::Tempo(u24::from(tempo.micros_per_quarter())),
    )];

    let signatures = score
        .parts()
        .iter()
        .map(|part| part.voice().time_signatures())
        .find(|signatures| !signatures.is_empty())
        .unwrap_or(&[]);
    let mut last_tick = 0;
    for (time, signature) in signatures {
        let tick = tempo.ticks(*time);
        track.push(meta(tick.saturating_sub(last_tick), time_signature(*signature)));
        last_tick = tick;
    }

    track.push(meta(0, MetaMessage::EndOfTrack));
    track
}

fn time_signature(signature: TimeSignature) -> MetaMessage<'static> {
    let unit = signature.beat_unit.max(1);
    MetaMessage::TimeSignature(
        signature.beats,
        unit.trailing_zeros() as u8,
        // MIDI clocks per metronome click, 24 clocks make a quarter
        96 / unit.min(32),
        // notated 32nd notes per quarter
        8,
    )
}

fn meta(delta: u32, message: MetaMessage<'_>) -> TrackEvent<'_> {
    TrackEvent {
        delta: u28::from(delta),
        kind: TrackEventKind::Meta(message),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instrument;
    use crate::notation;
    use crate::score::Part;
    use midly::MidiMessage;

    fn score() -> Score {
        Score::new(vec![
            Part::new(
                "melody",
                notation::parse("tinynotation: 12/8 e4. e4 e8 g4.~ g4 g8").unwrap(),
                instrument::by_name("Oboe").unwrap(),
            ),
            Part::new(
                "bass",
                notation::parse("12/8 CC1.").unwrap(),
                instrument::by_name("StringInstrument").unwrap(),
            ),
        ])
    }

    #[test]
    fn file_can_be_read_back() {
        let score = score();
        let mut bytes = Vec::new();
        to_smf(&score, Tempo::DEFAULT)
            .unwrap()
            .write_std(&mut bytes)
            .unwrap();

        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.header.timing, Timing::Metrical(u15::from(480)));
        assert_eq!(smf.tracks.len(), 3);

        let note_ons = |track: &Track<'_>| {
            track
                .iter()
                .filter(|e| match e.kind {
                    TrackEventKind::Midi {
                        message: MidiMessage::NoteOn { .. },
                        ..
                    } => true,
                    _ => false,
                })
                .count()
        };
        // the tied g counts once
        assert_eq!(note_ons(&smf.tracks[1]), 5);
        assert_eq!(note_ons(&smf.tracks[2]), 1);
    }

    #[test]
    fn conductor_track_carries_tempo_and_meter() {
        let score = score();
        let smf = to_smf(&score, Tempo::new(60).unwrap()).unwrap();
        let kinds: Vec<_> = smf.tracks[0].iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TrackEventKind::Meta(MetaMessage::Tempo(u24::from(1_000_000))),
                TrackEventKind::Meta(MetaMessage::TimeSignature(12, 3, 12, 8)),
                TrackEventKind::Meta(MetaMessage::EndOfTrack),
            ]
        );
    }

    #[test]
    fn slowest_tempo_is_written_exactly() {
        let score = score();
        let tempo = Tempo::new(Tempo::MIN_QUARTERS_PER_MINUTE).unwrap();
        let smf = to_smf(&score, tempo).unwrap();
        assert_eq!(
            smf.tracks[0][0].kind,
            TrackEventKind::Meta(MetaMessage::Tempo(u24::from(15_000_000)))
        );
        assert_eq!(tempo.micros_per_quarter(), 15_000_000);
        assert!(Tempo::new(Tempo::MIN_QUARTERS_PER_MINUTE - 1).is_none());
    }

    #[test]
    fn note_deltas_are_in_ticks() {
        let score = score();
        let smf = to_smf(&score, Tempo::DEFAULT).unwrap();
        let deltas: Vec<u32> = smf.tracks[2].iter().map(|e| e.delta.as_int()).collect();
        // names, program change, note on, note off after a dotted whole, end of track
        assert_eq!(deltas, vec![0, 0, 0, 0, 2880, 0]);
    }
}
