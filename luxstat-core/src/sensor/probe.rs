//! Probe chain
//!
//! Candidates are tried strictly in priority order. Construction and
//! configuration form one attempt: if either fails the candidate is
//! abandoned and the next one gets a fresh bus handle. The first
//! candidate that survives both steps wins and nothing after it is
//! touched.

use heapless::Vec;

use crate::traits::SensorError;

/// Maximum number of candidates in a probe chain
pub const MAX_CANDIDATES: usize = 8;

/// One entry in the probe chain
pub struct Candidate<B, S> {
    /// Chip name for logs
    pub name: &'static str,
    /// Talk to the chip and verify it is the expected part
    pub construct: fn(B) -> Result<S, SensorError>,
    /// Write the fixed gain/integration-time registers
    pub configure: fn(&mut S) -> Result<(), SensorError>,
}

impl<B, S> Candidate<B, S> {
    /// Run construction and configuration as a single attempt
    pub fn attempt(&self, bus: B) -> Result<S, SensorError> {
        let mut sensor = (self.construct)(bus)?;
        (self.configure)(&mut sensor)?;
        Ok(sensor)
    }
}

/// An abandoned candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FailedAttempt {
    pub name: &'static str,
    pub error: SensorError,
}

/// Outcome of a successful probe
#[derive(Debug)]
pub struct ProbeReport<S> {
    /// The selected sensor
    pub sensor: S,
    /// Name of the winning candidate
    pub name: &'static str,
    /// Position of the winner in the chain
    pub index: usize,
    /// Candidates abandoned before the winner, in order
    pub failures: Vec<FailedAttempt, MAX_CANDIDATES>,
}

/// Errors that can occur while probing
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeError {
    /// No candidate constructed and configured successfully
    NoSensor {
        attempts: Vec<FailedAttempt, MAX_CANDIDATES>,
    },
}

/// Try every candidate in order and keep the first that works
///
/// `bus` is called once per attempt to hand each candidate its own
/// handle onto the shared bus.
pub fn probe<B, S, F>(candidates: &[Candidate<B, S>], mut bus: F) -> Result<ProbeReport<S>, ProbeError>
where
    F: FnMut() -> B,
{
    let mut failures = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        match candidate.attempt(bus()) {
            Ok(sensor) => {
                return Ok(ProbeReport {
                    sensor,
                    name: candidate.name,
                    index,
                    failures,
                });
            }
            Err(error) => {
                // Chains longer than MAX_CANDIDATES just lose the tail of the log
                let _ = failures.push(FailedAttempt {
                    name: candidate.name,
                    error,
                });
            }
        }
    }

    Err(ProbeError::NoSensor { attempts: failures })
}
