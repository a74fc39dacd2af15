//! Active train position reporter.
//!
//! Asks Trafikverket's Trafikinfo API which trains are currently moving
//! and prints one line per train: number, speed and position.

pub mod app;
pub mod config;
pub mod domain;
pub mod projector;
pub mod trafikinfo;
