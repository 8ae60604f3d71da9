// tinyscore -- playing tiny notation scores over MIDI
// Copyright (C) 2020  Fabian Thorand
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Plays "Minuit, chrétiens" on oboe, lute and strings.

use tinyscore::{cli, scores};

fn main() {
    cli::score_main("minuit-chretiens", scores::minuit_chretiens)
}
