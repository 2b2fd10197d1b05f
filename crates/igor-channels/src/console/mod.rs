//! Console channel plugin.
//!
//! Reads lines from standard input and prints responses to standard
//! output. Lines starting with the keyword are dispatched; `q` quits.

pub mod channel;

pub use channel::{ConsoleChannel, ConsoleChannelFactory, ConsoleInput, ConsoleOutput};
