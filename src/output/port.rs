// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Sending MIDI events to a system MIDI output port using midir.

use log::{debug, info, trace};
use midir::{MidiOutput, MidiOutputConnection};
use midly::live::LiveEvent;

use super::{encode, MidiSink, OutputError};

/// An open connection to a MIDI output port. The port is closed when the sink is dropped.
pub struct PortSink {
    connection: MidiOutputConnection,
    port_name: String,
    buffer: Vec<u8>,
}

impl PortSink {
    /// Connect to the output port chosen by `selector` (see [`select_port`]).
    pub fn open(client_name: &str, selector: Option<&str>) -> Result<Self, OutputError> {
        let output = MidiOutput::new(client_name).map_err(|source| OutputError::Init { source })?;
        let ports = output.ports();
        let names = ports
            .iter()
            .map(|port| output.port_name(port))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| OutputError::PortInfo { source })?;
        debug!("available MIDI output ports: {:?}", names);

        let index = select_port(&names, selector)?;
        let port_name = names[index].clone();
        let connection = output
            .connect(&ports[index], client_name)
            .map_err(|err| OutputError::Connect {
                port: port_name.clone(),
                reason: err.to_string(),
            })?;
        info!("connected to MIDI output {:?}", port_name);

        Ok(Self {
            connection,
            port_name,
            buffer: Vec::with_capacity(3),
        })
    }

    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl MidiSink for PortSink {
    fn send(&mut self, event: &LiveEvent) -> Result<(), OutputError> {
        encode(event, &mut self.buffer)?;
        trace!("{:?} -> {:02x?}", event, self.buffer);
        self.connection
            .send(&self.buffer)
            .map_err(|source| OutputError::SendMessage { source })
    }
}

impl Drop for PortSink {
    // midir closes the port when the connection itself is dropped right after
    fn drop(&mut self) {
        debug!("closing MIDI output {:?}", self.port_name);
    }
}

/// Names of all MIDI output ports of the system.
pub fn list_ports(client_name: &str) -> Result<Vec<String>, OutputError> {
    let output = MidiOutput::new(client_name).map_err(|source| OutputError::Init { source })?;
    output
        .ports()
        .iter()
        .map(|port| output.port_name(port))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| OutputError::PortInfo { source })
}

/// Pick a port from the list of available port names.
///
/// The selector is tried as an index, an exact name and a case-insensitive part of a name,
/// in that order. Without a selector, the first port that doesn't just pass messages
/// through is chosen, falling back to the first port.
///
/// ```
/// use tinyscore::output::port::select_port;
///
/// let names = vec!["Midi Through Port-0".to_string(), "FLUID Synth".to_string()];
/// assert_eq!(select_port(&names, None).unwrap(), 1);
/// assert_eq!(select_port(&names, Some("0")).unwrap(), 0);
/// assert_eq!(select_port(&names, Some("fluid")).unwrap(), 1);
/// assert!(select_port(&names, Some("timidity")).is_err());
/// assert!(select_port(&[], None).is_err());
/// ```
pub fn select_port(names: &[String], selector: Option<&str>) -> Result<usize, OutputError> {
    if names.is_empty() {
        return Err(OutputError::NoOutputPort);
    }

    let selector = match selector {
        Some(selector) => selector,
        None => {
            let index = names
                .iter()
                .position(|name| !name.to_lowercase().contains("through"))
                .unwrap_or(0);
            return Ok(index);
        }
    };

    if let Ok(index) = selector.parse::<usize>() {
        if index < names.len() {
            return Ok(index);
        }
    }
    if let Some(index) = names.iter().position(|name| name == selector) {
        return Ok(index);
    }
    let needle = selector.to_lowercase();
    names
        .iter()
        .position(|name| name.to_lowercase().contains(&needle))
        .ok_or_else(|| OutputError::PortNotFound {
            selector: selector.to_string(),
            available: names.join(", "),
        })
}

#[cfg(test)]
mod test {
    use super::*;

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn exact_name_wins_over_substring() {
        let ports = names(&["Synth A Extended", "Synth A"]);
        assert_eq!(select_port(&ports, Some("Synth A")).unwrap(), 1);
    }

    #[test]
    fn index_out_of_range_is_tried_as_name() {
        let ports = names(&["Port 1", "Port 7"]);
        assert_eq!(select_port(&ports, Some("7")).unwrap(), 1);
    }

    #[test]
    fn only_through_ports() {
        let ports = names(&["Midi Through Port-0"]);
        assert_eq!(select_port(&ports, None).unwrap(), 0);
    }

    #[test]
    fn missing_port_lists_alternatives() {
        let ports = names(&["Port 1", "Port 2"]);
        assert_eq!(
            select_port(&ports, Some("wavetable")).unwrap_err().to_string(),
            "No MIDI output port matches \"wavetable\", available: Port 1, Port 2"
        );
        assert_eq!(
            select_port(&[], Some("0")).unwrap_err().to_string(),
            "No MIDI output port available"
        );
    }
}
