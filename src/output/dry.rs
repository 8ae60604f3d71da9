// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! A sink that only logs, for trying out scores without a MIDI device.

use log::info;
use midly::live::LiveEvent;

use super::{encode, MidiSink, OutputError};

#[derive(Debug, Default)]
pub struct DryRunSink {
    sent: usize,
    buffer: Vec<u8>,
}

impl DryRunSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events logged so far.
    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl MidiSink for DryRunSink {
    fn send(&mut self, event: &LiveEvent) -> Result<(), OutputError> {
        encode(event, &mut self.buffer)?;
        info!("{:5}: {:02x?} {:?}", self.sent, self.buffer, event);
        self.sent += 1;
        Ok(())
    }
}
