// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Play a score in real time on a MIDI sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, trace};
use midly::live::LiveEvent;
use midly::num::{u4, u7};
use midly::MidiMessage;
use snafu::Snafu;

use crate::output::{MidiSink, OutputError};
use crate::pianoroll::Time;
use crate::rational::Rational;
use crate::schedule::{self, ScheduleError, ScheduledEvent};
use crate::score::Score;

/// Resolution of score time in standard MIDI files.
pub const TICKS_PER_QUARTER: u32 = 480;

/// MIDI controller that releases all sounding notes of a channel.
const ALL_NOTES_OFF: u8 = 123;

/// Speed of the music, counted in quarter notes per minute regardless of the time signature.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tempo {
    quarters_per_minute: u32,
}

impl Tempo {
    pub const DEFAULT: Tempo = Tempo {
        quarters_per_minute: 120,
    };

    /// Slowest tempo whose quarter note length still fits the 24 bit tempo of MIDI files.
    pub const MIN_QUARTERS_PER_MINUTE: u32 = 4;
    pub const MAX_QUARTERS_PER_MINUTE: u32 = 32767;

    /// Returns `None` outside of `MIN_QUARTERS_PER_MINUTE..=MAX_QUARTERS_PER_MINUTE`.
    ///
    /// ```
    /// use tinyscore::play::Tempo;
    ///
    /// assert!(Tempo::new(3).is_none());
    /// assert_eq!(Tempo::new(4).unwrap().micros_per_quarter(), 15_000_000);
    /// ```
    pub fn new(quarters_per_minute: u32) -> Option<Tempo> {
        if (Self::MIN_QUARTERS_PER_MINUTE..=Self::MAX_QUARTERS_PER_MINUTE)
            .contains(&quarters_per_minute)
        {
            Some(Tempo {
                quarters_per_minute,
            })
        } else {
            None
        }
    }

    pub fn quarters_per_minute(&self) -> u32 {
        self.quarters_per_minute
    }

    /// Wall clock time in seconds for a score time.
    ///
    /// ```
    /// use tinyscore::play::Tempo;
    /// use tinyscore::rational::Rational;
    ///
    /// let tempo = Tempo::new(90).unwrap();
    /// assert_eq!(tempo.seconds(Rational::one()), Rational::new(8, 3));
    /// ```
    pub fn seconds(&self, time: Time) -> Rational {
        time * 4 * 60 / self.quarters_per_minute as i64
    }

    pub fn duration(&self, time: Time) -> Duration {
        let micros = (self.seconds(time) * 1_000_000).round();
        Duration::from_micros(micros.max(0) as u64)
    }

    /// Position of a score time in standard MIDI file ticks.
    ///
    /// ```
    /// use tinyscore::play::Tempo;
    /// use tinyscore::rational::Rational;
    ///
    /// assert_eq!(Tempo::DEFAULT.ticks(Rational::new(3, 8)), 720);
    /// assert_eq!(Tempo::DEFAULT.ticks(Rational::new(1, 12)), 160);
    /// ```
    pub fn ticks(&self, time: Time) -> u32 {
        (time * 4 * TICKS_PER_QUARTER as i64).round().max(0) as u32
    }

    pub fn micros_per_quarter(&self) -> u32 {
        60_000_000 / self.quarters_per_minute
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Tempo::DEFAULT
    }
}

/// Whether the player waits for events to become due.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Pacing {
    /// Sleep until each event is due.
    RealTime,
    /// Send all events right away.
    Immediate,
}

#[derive(Debug, Snafu)]
pub enum PlayError {
    #[snafu(display("{}", source))]
    Schedule { source: ScheduleError },
    #[snafu(display("{}", source))]
    Output { source: OutputError },
    #[snafu(display("Another playback session is still active"))]
    SessionActive,
}

impl From<ScheduleError> for PlayError {
    fn from(source: ScheduleError) -> Self {
        PlayError::Schedule { source }
    }
}

impl From<OutputError> for PlayError {
    fn from(source: OutputError) -> Self {
        PlayError::Output { source }
    }
}

/// Sends the events of a score to a sink at the right time.
pub struct Player<S> {
    sink: S,
    tempo: Tempo,
    pacing: Pacing,
}

impl<S: MidiSink> Player<S> {
    pub fn new(sink: S, tempo: Tempo, pacing: Pacing) -> Self {
        Self {
            sink,
            tempo,
            pacing,
        }
    }

    /// Play the whole score, blocking until the last note was released.
    pub fn play(&mut self, score: &Score) -> Result<(), PlayError> {
        let events = schedule::schedule(score)?;
        info!(
            "playing {} parts at {} quarters per minute",
            score.parts().len(),
            self.tempo.quarters_per_minute
        );
        info!(
            "total length {} ({:.2} seconds)",
            score.length(),
            self.tempo.seconds(score.length()).to_f64()
        );
        debug!("{} events scheduled", events.len());
        self.play_events(&events)
    }

    /// Play events that are already sorted by time.
    pub fn play_events(&mut self, events: &[ScheduledEvent]) -> Result<(), PlayError> {
        let start = Instant::now();
        for event in events {
            if self.pacing == Pacing::RealTime {
                let due = start + self.tempo.duration(event.time);
                let now = Instant::now();
                if due > now {
                    thread::sleep(due - now);
                }
            }
            trace!(
                "{:>8}: part {} channel {} {:?}",
                event.time,
                event.part,
                event.channel,
                event.kind
            );
            self.sink.send(&event.to_live())?;
        }
        self.silence(&schedule::channels(events))
    }

    /// Release anything still sounding on the given channels.
    fn silence(&mut self, channels: &[u8]) -> Result<(), PlayError> {
        for &channel in channels {
            let event = LiveEvent::Midi {
                channel: u4::from(channel),
                message: MidiMessage::Controller {
                    controller: u7::from(ALL_NOTES_OFF),
                    value: u7::from(0),
                },
            };
            self.sink.send(&event)?;
        }
        Ok(())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }
}

/// Set while a playback session holds the output device.
static SESSION_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Proof that the current thread owns the process wide playback session.
struct SessionToken;

impl SessionToken {
    fn acquire() -> Result<SessionToken, PlayError> {
        SESSION_ACTIVE
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| SessionToken)
            .map_err(|_| PlayError::SessionActive)
    }
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        SESSION_ACTIVE.store(false, Ordering::SeqCst);
    }
}

/// The lifetime of an output device used for playback.
///
/// Only one session can be live in a process at a time. Dropping the session
/// releases the device, after which a new session can be opened.
pub struct PlaybackSession<S: MidiSink> {
    // dropped in declaration order: the device is released before the token
    player: Player<S>,
    _token: SessionToken,
}

impl<S: MidiSink> PlaybackSession<S> {
    /// Claim the session and then acquire the device through `connect`.
    pub fn open<F>(connect: F, tempo: Tempo, pacing: Pacing) -> Result<Self, PlayError>
    where
        F: FnOnce() -> Result<S, OutputError>,
    {
        let token = SessionToken::acquire()?;
        let sink = connect()?;
        debug!("playback session opened");
        Ok(Self {
            player: Player::new(sink, tempo, pacing),
            _token: token,
        })
    }

    /// Whether a session is live anywhere in the process.
    pub fn is_active() -> bool {
        SESSION_ACTIVE.load(Ordering::SeqCst)
    }

    pub fn play(&mut self, score: &Score) -> Result<(), PlayError> {
        self.player.play(score)
    }

    pub fn player(&self) -> &Player<S> {
        &self.player
    }
}

impl<S: MidiSink> Drop for PlaybackSession<S> {
    fn drop(&mut self) {
        debug!("playback session released");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::instrument;
    use crate::notation;
    use crate::output::encode;
    use crate::score::Part;

    #[derive(Default)]
    struct Recorder {
        messages: Vec<Vec<u8>>,
    }

    impl MidiSink for Recorder {
        fn send(&mut self, event: &LiveEvent) -> Result<(), OutputError> {
            let mut bytes = Vec::new();
            encode(event, &mut bytes)?;
            self.messages.push(bytes);
            Ok(())
        }
    }

    fn score() -> Score {
        Score::new(vec![
            Part::new(
                "melody",
                notation::parse("e8 d c4").unwrap(),
                instrument::by_name("Oboe").unwrap(),
            ),
            Part::new(
                "bass",
                notation::parse("C2").unwrap(),
                instrument::by_name("Cello").unwrap(),
            ),
        ])
    }

    #[test]
    fn plays_schedule_then_silences_channels() {
        let mut player = Player::new(Recorder::default(), Tempo::DEFAULT, Pacing::Immediate);
        player.play(&score()).unwrap();
        let messages = player.into_sink().messages;
        assert_eq!(
            messages,
            vec![
                vec![0xc0, 68],
                vec![0xc1, 42],
                vec![0x90, 64, 90],
                vec![0x91, 48, 90],
                vec![0x80, 64, 0],
                vec![0x90, 62, 90],
                vec![0x80, 62, 0],
                vec![0x90, 60, 90],
                vec![0x80, 60, 0],
                vec![0x81, 48, 0],
                vec![0xb0, 123, 0],
                vec![0xb1, 123, 0],
            ]
        );
    }

    #[test]
    fn real_time_pacing_waits_for_events() {
        // a sixteenth at 960 quarters per minute lasts 1/64 of a second
        let tempo = Tempo::new(960).unwrap();
        let mut player = Player::new(Recorder::default(), tempo, Pacing::RealTime);
        let started = Instant::now();
        player
            .play(&Score::new(vec![Part::new(
                "tick",
                notation::parse("c16 d").unwrap(),
                instrument::by_name("Woodblock").unwrap(),
            )]))
            .unwrap();
        assert!(started.elapsed() >= tempo.duration(Time::nth(8)));
    }

    #[test]
    fn tempo_conversions() {
        let tempo = Tempo::DEFAULT;
        assert_eq!(tempo.duration(Time::nth(4)), Duration::from_millis(500));
        assert_eq!(tempo.duration(Time::new(3, 4)), Duration::from_millis(1500));
        assert_eq!(tempo.micros_per_quarter(), 500_000);
        assert_eq!(tempo.ticks(Time::one()), 4 * TICKS_PER_QUARTER);
        assert_eq!(Tempo::new(0), None);
        assert_eq!(Tempo::new(3), None);
        assert_eq!(Tempo::new(32768), None);
        assert!(Tempo::new(32767).is_some());
    }
}
