// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Destinations for the MIDI events of a score.

pub mod dry;
pub mod port;
pub mod smf;

use std::io;
use std::path::PathBuf;

use midly::live::LiveEvent;
use snafu::Snafu;

use crate::schedule::ScheduleError;

/// Something that MIDI events can be sent to in real time.
pub trait MidiSink {
    fn send(&mut self, event: &LiveEvent) -> Result<(), OutputError>;
}

impl<S: MidiSink + ?Sized> MidiSink for Box<S> {
    fn send(&mut self, event: &LiveEvent) -> Result<(), OutputError> {
        (**self).send(event)
    }
}

#[derive(Debug, Snafu)]
pub enum OutputError {
    #[snafu(display("Failed to initialize MIDI output: {}", source))]
    Init { source: midir::InitError },
    #[snafu(display("No MIDI output port available"))]
    NoOutputPort,
    #[snafu(display("No MIDI output port matches {:?}, available: {}", selector, available))]
    PortNotFound { selector: String, available: String },
    #[snafu(display("Failed to query MIDI output port: {}", source))]
    PortInfo { source: midir::PortInfoError },
    #[snafu(display("Failed to connect to MIDI output port {:?}: {}", port, reason))]
    Connect { port: String, reason: String },
    #[snafu(display("Failed to send MIDI message: {}", source))]
    SendMessage { source: midir::SendError },
    #[snafu(display("Failed to encode MIDI message: {}", source))]
    Encode { source: io::Error },
    #[snafu(display("{}", source))]
    Schedule { source: ScheduleError },
    #[snafu(display("Failed to write {}: {}", path.display(), source))]
    WriteFile { path: PathBuf, source: io::Error },
}

/// Encode a MIDI event into `buffer`, replacing its previous contents.
pub fn encode(event: &LiveEvent, buffer: &mut Vec<u8>) -> Result<(), OutputError> {
    buffer.clear();
    event
        .write_std(&mut *buffer)
        .map_err(|source| OutputError::Encode { source })
}
