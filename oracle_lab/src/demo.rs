//! End-to-end demonstration: encrypt under a fresh key, then recover the
//! plaintext through the padding oracle alone.

use std::time::{Duration, Instant};

use padding_oracle::{AttackCoordinator, AttackOutcome, ProgressSink};

use crate::config::LabConfig;
use crate::error::LabError;
use crate::samples::{session_target, Sample};
use crate::target::CbcTarget;

#[derive(Debug, Clone)]
pub struct DemoReport {
    pub original: Vec<u8>,
    pub sample: Sample,
    pub outcome: AttackOutcome,
    pub encrypt_time: Duration,
    pub attack_time: Duration,
}

impl DemoReport {
    pub fn succeeded(&self) -> bool {
        self.outcome.plaintext() == Some(&self.original[..])
    }

    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Ciphertext (hex): {}", self.sample.ciphertext_hex()),
            format!("IV (hex): {}", self.sample.iv_hex()),
        ];
        match &self.outcome {
            AttackOutcome::Recovered(recovery) => {
                lines.push(format!(
                    "Decrypted plaintext: {}",
                    String::from_utf8_lossy(&recovery.plaintext)
                ));
                if !recovery.padding_stripped {
                    lines.push("Padding could not be removed; showing raw bytes".to_string());
                }
                lines.push(format!("Oracle queries: {}", recovery.oracle_queries));
            }
            AttackOutcome::Failed => lines.push("Attack failed - could not decrypt data".to_string()),
            AttackOutcome::Cancelled => lines.push("Attack cancelled".to_string()),
        }
        lines.push(format!(
            "Encryption took {:.3}s, attack took {:.2}s",
            self.encrypt_time.as_secs_f64(),
            self.attack_time.as_secs_f64()
        ));
        lines.push(format!(
            "Processed {} bytes in {} blocks",
            self.sample.ciphertext.len(),
            self.sample.ciphertext.len() / crate::cbc::BLOCK_SIZE
        ));
        lines.join("\n")
    }
}

/// Encrypts `plaintext` under a random key and IV and attacks it.
pub fn demonstrate(
    plaintext: &[u8],
    config: &LabConfig,
    sink: &dyn ProgressSink,
) -> Result<DemoReport, LabError> {
    let target = CbcTarget::random().with_delay(config.oracle_delay);
    tracing::info!("Setting up demonstration with random key and IV");

    let started = Instant::now();
    let ciphertext = target.encrypt(plaintext)?;
    let encrypt_time = started.elapsed();
    tracing::info!(bytes = ciphertext.len(), "Original text encrypted");

    let sample = Sample {
        ciphertext,
        iv: target.iv().to_vec(),
    };
    run_attack(plaintext, sample, encrypt_time, &target, config, sink)
}

/// Attacks a sample produced by [`crate::samples::encrypt_sample`].
pub fn attack_sample(
    plaintext: &[u8],
    sample: Sample,
    config: &LabConfig,
    sink: &dyn ProgressSink,
) -> Result<DemoReport, LabError> {
    let target = session_target().clone().with_delay(config.oracle_delay);
    run_attack(plaintext, sample, Duration::ZERO, &target, config, sink)
}

fn run_attack(
    plaintext: &[u8],
    sample: Sample,
    encrypt_time: Duration,
    target: &CbcTarget,
    config: &LabConfig,
    sink: &dyn ProgressSink,
) -> Result<DemoReport, LabError> {
    let coordinator = AttackCoordinator::new(config.attack.clone());

    let started = Instant::now();
    let outcome = coordinator.attack(&sample.ciphertext, &sample.iv, target, sink)?;
    let attack_time = started.elapsed();

    Ok(DemoReport {
        original: plaintext.to_vec(),
        sample,
        outcome,
        encrypt_time,
        attack_time,
    })
}
