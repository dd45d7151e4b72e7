use std::env;
use std::process;

use oracle_lab::{attack_sample, demonstrate, encrypt_sample, init_logging, random_sample};
use oracle_lab::{DemoReport, LabConfig, LabError};
use padding_oracle::TracingSink;

// oracle_lab [PLAINTEXT]
//
// With a plaintext, encrypts it under this run's fixed key and IV and attacks
// the result. Without one, picks a sample text and runs the full timed
// demonstration under a fresh key.
fn main() {
    let config = LabConfig::from_env();
    if let Err(e) = init_logging(&config.log_level) {
        eprintln!("{}", e);
    }

    match run(&config) {
        Ok(report) => {
            println!("{}", report.summary());
            if !report.succeeded() {
                process::exit(1);
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "attack could not run");
            process::exit(2);
        }
    }
}

fn run(config: &LabConfig) -> Result<DemoReport, LabError> {
    match env::args().nth(1) {
        Some(text) => {
            let plaintext = text.into_bytes();
            let sample = encrypt_sample(&plaintext)?;
            attack_sample(&plaintext, sample, config, &TracingSink)
        }
        None => {
            let plaintext = random_sample()?;
            demonstrate(&plaintext, config, &TracingSink)
        }
    }
}
