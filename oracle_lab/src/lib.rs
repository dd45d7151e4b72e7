//! Playground around the padding oracle engine: an AES-128-CBC target that
//! leaks padding validity, sample plaintexts, and a timed demonstration.

pub mod cbc;
pub mod config;
pub mod demo;
pub mod error;
pub mod samples;
pub mod target;
pub mod telemetry;

pub use config::LabConfig;
pub use demo::{attack_sample, demonstrate, DemoReport};
pub use error::LabError;
pub use samples::{encrypt_sample, random_sample, Sample};
pub use target::CbcTarget;
pub use telemetry::init_logging;
