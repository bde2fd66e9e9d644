//! Implementation of the `rrbs` command line surface.

pub mod run;

pub use self::run::run;
