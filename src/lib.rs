pub mod instrument;
pub mod notation;
pub mod note;
pub mod pianoroll;
pub mod score;

// Playing scores
pub mod output;
pub mod play;
pub mod schedule;

// The carols and their command line
pub mod cli;
pub mod scores;

// Utility modules
pub mod rational;
