// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

use std::sync::{Mutex, MutexGuard};

use midly::live::LiveEvent;

use tinyscore::output::dry::DryRunSink;
use tinyscore::output::{MidiSink, OutputError};
use tinyscore::play::{Pacing, PlayError, PlaybackSession, Tempo};
use tinyscore::scores;

/// Sessions are process wide, so the tests must not overlap.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct Recorder {
    events: usize,
}

impl MidiSink for Recorder {
    fn send(&mut self, _event: &LiveEvent) -> Result<(), OutputError> {
        self.events += 1;
        Ok(())
    }
}

fn open() -> Result<PlaybackSession<Recorder>, PlayError> {
    PlaybackSession::open(|| Ok(Recorder::default()), Tempo::DEFAULT, Pacing::Immediate)
}

#[test]
fn sessions_one_after_another() {
    let _serial = serial();

    let mut first = open().unwrap();
    first.play(&scores::merry_christmas().unwrap()).unwrap();
    assert!(first.player().sink().events > 0);
    drop(first);
    assert!(!PlaybackSession::<Recorder>::is_active());

    let mut second = open().unwrap();
    second.play(&scores::minuit_chretiens().unwrap()).unwrap();
    assert!(second.player().sink().events > 0);
}

#[test]
fn only_one_session_at_a_time() {
    let _serial = serial();

    let session = open().unwrap();
    assert!(PlaybackSession::<Recorder>::is_active());
    match PlaybackSession::open(|| Ok(DryRunSink::new()), Tempo::DEFAULT, Pacing::Immediate) {
        Err(PlayError::SessionActive) => {}
        other => panic!("expected an active session error, got {:?}", other.err()),
    }
    drop(session);
    assert!(open().is_ok());
}

#[test]
fn failed_connect_releases_session() {
    let _serial = serial();

    let result = PlaybackSession::<Recorder>::open(
        || Err(OutputError::NoOutputPort),
        Tempo::DEFAULT,
        Pacing::Immediate,
    );
    assert!(matches!(
        result,
        Err(PlayError::Output {
            source: OutputError::NoOutputPort
        })
    ));
    assert!(!PlaybackSession::<Recorder>::is_active());
    assert!(open().is_ok());
}
