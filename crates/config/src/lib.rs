//! Frozen startup configuration derived from the process environment.
//!
//! Every environment variable this crate understands is parsed exactly once, by
//! [`Config::from_env`], into an immutable [`Config`] value. Nothing downstream ever re-reads
//! the environment; this mirrors the original design's explicit call to parse configuration
//! once at initialization rather than on every hot-path decision.

pub mod capacity;
pub mod error;
pub mod period;
pub mod testing_approach;

use capacity::CapacityConfig;
use error::Error;
use period::PeriodPolicy;
use std::collections::HashMap;
use std::time::Duration;
use testing_approach::{ImmediateTestingApproach, TestingApproach};

/// Which external instrumentation backend, if any, the library should emit events to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Instrument {
    /// No external instrumentation; only the crate's own structured logging is active.
    #[default]
    None,
    /// Emit events compatible with the `ovni` lightweight tracer.
    Ovni,
}

impl Instrument {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            "ovni" => Some(Self::Ovni),
            _ => None,
        }
    }
}

/// The frozen, validated configuration for one process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Initial and maximum in-flight request capacity per ticket manager.
    pub capacity: CapacityConfig,
    /// How long a saturation epoch may persist before the capacity controller doubles capacity.
    pub capacity_timeout: Duration,
    /// Wait-period policy for the request polling task.
    pub request_period: PeriodPolicy,
    /// Whether the completion polling task is enabled at all.
    pub completion_enabled: bool,
    /// Wait-period policy for the completion polling task.
    pub completion_period: PeriodPolicy,
    /// Approach used when testing the global in-flight array.
    pub testing: TestingApproach,
    /// Approach used when testing requests immediately after they are issued.
    pub immediate_testing: ImmediateTestingApproach,
    /// Whether a full pre-queue aborts the process instead of spin-waiting.
    pub queues_full_failure: bool,
    /// Selected instrumentation backend.
    pub instrument: Instrument,
}

impl Default for Config {
    fn default() -> Self {
        let testing = TestingApproach::TestSome;
        Self {
            capacity: CapacityConfig::default(),
            capacity_timeout: Duration::from_millis(10),
            request_period: PeriodPolicy::default(),
            completion_enabled: true,
            completion_period: PeriodPolicy::default(),
            testing,
            immediate_testing: ImmediateTestingApproach::from(testing),
            queues_full_failure: false,
            instrument: Instrument::default(),
        }
    }
}

impl Config {
    /// Parses configuration from the real process environment.
    pub fn from_env() -> Result<Self, Error> {
        let snapshot: HashMap<String, String> = std::env::vars().collect();
        Self::from_map(&snapshot)
    }

    /// Parses configuration from an explicit environment snapshot.
    ///
    /// Kept separate from [`Self::from_env`] so tests can exercise parsing deterministically
    /// without mutating the real process environment.
    pub fn from_map(env: &HashMap<String, String>) -> Result<Self, Error> {
        let mut cfg = Self::default();

        if let Some(value) = env.get("TAMPI_CAPACITY") {
            cfg.capacity = CapacityConfig::parse(value)?;
        }

        if let Some(value) = env.get("TAMPI_CAPACITY_TIMEOUT") {
            let ms: u64 = value
                .parse()
                .map_err(|_| Error::InvalidDuration {
                    var: "TAMPI_CAPACITY_TIMEOUT",
                    value: value.clone(),
                    reason: "expected a non-negative integer number of milliseconds".to_owned(),
                })?;
            cfg.capacity_timeout = Duration::from_millis(ms);
        }

        let legacy_period = env.get("TAMPI_POLLING_FREQUENCY");
        if let Some(value) = env.get("TAMPI_POLLING_PERIOD") {
            cfg.request_period = PeriodPolicy::parse("TAMPI_POLLING_PERIOD", value)?;
        } else if let Some(value) = legacy_period {
            cfg.request_period = PeriodPolicy::parse("TAMPI_POLLING_FREQUENCY", value)?;
        }

        if let Some(value) = env.get("TAMPI_POLLING_TASK_COMPLETION") {
            cfg.completion_enabled = parse_bool("TAMPI_POLLING_TASK_COMPLETION", value)?;
        }

        if let Some(value) = env.get("TAMPI_POLLING_TASK_COMPLETION_PERIOD") {
            cfg.completion_period =
                PeriodPolicy::parse("TAMPI_POLLING_TASK_COMPLETION_PERIOD", value)?;
        }

        if let Some(value) = env.get("TAMPI_REQUESTS_TESTING") {
            if value == "none" {
                return Err(Error::GeneralTestingCannotBeNone);
            }
            cfg.testing = TestingApproach::parse(value).ok_or_else(|| Error::InvalidTestingApproach {
                var: "TAMPI_REQUESTS_TESTING",
                value: value.clone(),
            })?;
            cfg.immediate_testing = ImmediateTestingApproach::from(cfg.testing);
        }

        if let Some(value) = env.get("TAMPI_REQUESTS_IMMEDIATE_TESTING") {
            cfg.immediate_testing =
                ImmediateTestingApproach::parse(value).ok_or_else(|| Error::InvalidTestingApproach {
                    var: "TAMPI_REQUESTS_IMMEDIATE_TESTING",
                    value: value.clone(),
                })?;
        }

        if let Some(value) = env.get("TAMPI_QUEUES_FULL_FAILURE") {
            cfg.queues_full_failure = parse_bool("TAMPI_QUEUES_FULL_FAILURE", value)?;
        }

        if let Some(value) = env.get("TAMPI_INSTRUMENT") {
            cfg.instrument = Instrument::parse(value).ok_or_else(|| Error::InvalidInstrument {
                value: value.clone(),
            })?;
        }

        Ok(cfg)
    }
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, Error> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::InvalidBoolean {
            var,
            value: value.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn default_config_matches_documented_defaults() {
        let cfg = Config::from_map(&HashMap::new()).unwrap();
        assert_eq!(cfg.capacity, CapacityConfig { min: 128, max: 32 * 1024 });
        assert_eq!(cfg.capacity_timeout, Duration::from_millis(10));
        assert_eq!(cfg.request_period, PeriodPolicy::Fixed { period_us: 100 });
        assert!(cfg.completion_enabled);
        assert_eq!(cfg.testing, TestingApproach::TestSome);
        assert_eq!(cfg.immediate_testing, ImmediateTestingApproach::TestSome);
        assert!(!cfg.queues_full_failure);
        assert_eq!(cfg.instrument, Instrument::None);
    }

    #[test]
    fn immediate_testing_defaults_to_general_testing() {
        let env = map(&[("TAMPI_REQUESTS_TESTING", "testany")]);
        let cfg = Config::from_map(&env).unwrap();
        assert_eq!(cfg.immediate_testing, ImmediateTestingApproach::TestAny);
    }

    #[test]
    fn immediate_testing_can_diverge_from_general_testing() {
        let env = map(&[
            ("TAMPI_REQUESTS_TESTING", "test"),
            ("TAMPI_REQUESTS_IMMEDIATE_TESTING", "none"),
        ]);
        let cfg = Config::from_map(&env).unwrap();
        assert_eq!(cfg.testing, TestingApproach::Test);
        assert_eq!(cfg.immediate_testing, ImmediateTestingApproach::None);
    }

    #[test]
    fn general_testing_rejects_none() {
        let env = map(&[("TAMPI_REQUESTS_TESTING", "none")]);
        assert!(matches!(
            Config::from_map(&env),
            Err(Error::GeneralTestingCannotBeNone)
        ));
    }

    #[test]
    fn legacy_polling_frequency_is_honored_when_period_absent() {
        let env = map(&[("TAMPI_POLLING_FREQUENCY", "50")]);
        let cfg = Config::from_map(&env).unwrap();
        assert_eq!(cfg.request_period, PeriodPolicy::Fixed { period_us: 50 });
    }

    #[test]
    fn polling_period_takes_precedence_over_legacy_frequency() {
        let env = map(&[
            ("TAMPI_POLLING_FREQUENCY", "50"),
            ("TAMPI_POLLING_PERIOD", "200"),
        ]);
        let cfg = Config::from_map(&env).unwrap();
        assert_eq!(cfg.request_period, PeriodPolicy::Fixed { period_us: 200 });
    }

    #[test]
    fn rejects_malformed_boolean() {
        let env = map(&[("TAMPI_QUEUES_FULL_FAILURE", "maybe")]);
        assert!(matches!(
            Config::from_map(&env),
            Err(Error::InvalidBoolean { .. })
        ));
    }
}
