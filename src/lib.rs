//! `rrbs` is a command line driver for a Reduced Representation Bisulfite
//! Sequencing (RRBS) analysis pipeline. This package is composed of both a
//! library crate, as well as a binary crate.
//!
//! The driver performs no sequence analysis itself: six external tools do
//! the real work, and the driver's job is to invoke them in a fixed order,
//! predict the filenames each one hands to the next, and keep a faithful
//! per-sample log of everything that happened.
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(rust_2021_compatibility)]

pub mod commands;
pub mod errors;
pub mod pipeline;
pub mod utils;
