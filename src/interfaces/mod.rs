//! Terminal front-ends for a running race.

pub mod console;
pub mod track;

pub use console::{ConsoleReporter, ResultsGrid};
pub use track::{TrackReporter, render_track};
