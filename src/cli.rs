// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Command line driver shared by the score programs.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use snafu::Snafu;
use structopt::StructOpt;

use crate::output::dry::DryRunSink;
use crate::output::port::{self, PortSink};
use crate::output::{smf, OutputError};
use crate::play::{Pacing, PlayError, PlaybackSession, Tempo};
use crate::score::{Score, ScoreError};

/// Name under which the programs register with the MIDI system.
pub const CLIENT_NAME: &str = "tinyscore";

#[derive(Debug, StructOpt)]
#[structopt(about = "Playing a carol on a MIDI synthesizer")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// MIDI output port, given as index, name or part of a name.
    #[structopt(short, long, env = "TINYSCORE_MIDI_PORT")]
    port: Option<String>,

    /// List the available MIDI output ports and exit.
    #[structopt(long)]
    list_ports: bool,

    /// Tempo in quarter notes per minute.
    #[structopt(long, default_value = "120")]
    bpm: u32,

    /// Write a standard MIDI file instead of playing the score.
    #[structopt(short, long, parse(from_os_str))]
    output: Option<PathBuf>,

    /// Log the MIDI events instead of sending them to a port.
    #[structopt(long)]
    dry_run: bool,

    /// Dump the description of the score assembled from the voices.
    #[structopt(long)]
    #[allow(clippy::option_option)]
    dump_description: Option<Option<PathBuf>>,
}

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Could not initialize logging: {}", source))]
    Logger { source: log::SetLoggerError },
    #[snafu(display("{}", source))]
    Compose { source: ScoreError },
    #[snafu(display("{}", source))]
    Output { source: OutputError },
    #[snafu(display("Playback failed: {}", source))]
    Play { source: PlayError },
    #[snafu(display("Could not write {}: {}", path.display(), source))]
    Dump { path: PathBuf, source: io::Error },
    #[snafu(display(
        "The tempo must be between {} and {} quarters per minute, got {}",
        Tempo::MIN_QUARTERS_PER_MINUTE,
        Tempo::MAX_QUARTERS_PER_MINUTE,
        bpm
    ))]
    InvalidTempo { bpm: u32 },
}

/// Run a score program and exit the process: with 0 when the score was played, 1 otherwise.
pub fn score_main<F>(name: &str, compose: F) -> !
where
    F: FnOnce() -> Result<Score, ScoreError>,
{
    let opt = Opt::from_clap(&Opt::clap().name(name).get_matches());
    match run(opt, compose) {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            // logging may not be up when the logger itself failed
            if log::log_enabled!(log::Level::Error) {
                error!("{}", err);
            } else {
                eprintln!("{}", err);
            }
            std::process::exit(1)
        }
    }
}

fn run<F>(opt: Opt, compose: F) -> Result<(), Error>
where
    F: FnOnce() -> Result<Score, ScoreError>,
{
    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).map_err(|source| Error::Logger { source })?;

    if opt.list_ports {
        let names = port::list_ports(CLIENT_NAME).map_err(|source| Error::Output { source })?;
        if names.is_empty() {
            info!("no MIDI output ports available");
        }
        for (index, name) in names.iter().enumerate() {
            println!("{}: {}", index, name);
        }
        return Ok(());
    }

    let score = compose().map_err(|source| Error::Compose { source })?;
    info!(
        "assembled {} parts in {}",
        score.parts().len(),
        score.time_signature()
    );
    for part in score.parts() {
        debug!(
            "part {:?}: {} notes on {}",
            part.name(),
            part.voice().roll().len(),
            part.instrument()
        );
    }

    let dump_out = opt
        .dump_description
        .map(|path| path.unwrap_or_else(|| "/dev/stdout".into()));
    if let Some(dump_out_path) = dump_out {
        dump(&score, &dump_out_path)?;
    }

    let tempo = Tempo::new(opt.bpm).ok_or(Error::InvalidTempo { bpm: opt.bpm })?;

    if let Some(path) = opt.output {
        smf::write_smf(&score, tempo, &path).map_err(|source| Error::Output { source })?;
        info!("wrote {}", path.display());
        return Ok(());
    }

    if opt.dry_run {
        let mut session = PlaybackSession::open(|| Ok(DryRunSink::new()), tempo, Pacing::Immediate)
            .map_err(|source| Error::Play { source })?;
        session
            .play(&score)
            .map_err(|source| Error::Play { source })?;
        info!("dry run logged {} events", session.player().sink().sent());
    } else {
        let port = opt.port;
        let mut session = PlaybackSession::open(
            || PortSink::open(CLIENT_NAME, port.as_deref()),
            tempo,
            Pacing::RealTime,
        )
        .map_err(|source| Error::Play { source })?;
        session
            .play(&score)
            .map_err(|source| Error::Play { source })?;
        drop(session);
    }
    info!("done");
    Ok(())
}

fn dump(score: &Score, path: &Path) -> Result<(), Error> {
    let write = || -> io::Result<()> {
        let mut f = std::fs::File::create(path)?;
        writeln!(f, "{:#?}", score)
    };
    write().map_err(|source| Error::Dump {
        path: path.to_owned(),
        source,
    })
}
