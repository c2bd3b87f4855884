//! Errors produced while parsing the frozen startup configuration.

use miette::Diagnostic;

/// Errors that can occur while parsing environment-derived configuration.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum Error {
    /// A boolean-valued environment variable held something other than a recognized boolean.
    #[error("{var} has an invalid boolean value `{value}`")]
    #[diagnostic(code(tampi::config::invalid_boolean), url(docsrs))]
    InvalidBoolean {
        /// Name of the offending environment variable.
        var: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// A duration-valued environment variable could not be parsed as a non-negative integer.
    #[error("{var} has an invalid duration `{value}`: {reason}")]
    #[diagnostic(code(tampi::config::invalid_duration), url(docsrs))]
    InvalidDuration {
        /// Name of the offending environment variable.
        var: &'static str,
        /// The raw value that failed to parse.
        value: String,
        /// Human-readable explanation of why parsing failed.
        reason: String,
    },

    /// `TAMPI_POLLING_PERIOD` / `TAMPI_POLLING_TASK_COMPLETION_PERIOD` had a malformed
    /// `min[:max[:policy]]` specification.
    #[error("{var} has an invalid polling period specification `{value}`: {reason}")]
    #[diagnostic(code(tampi::config::invalid_polling_period), url(docsrs))]
    InvalidPollingPeriod {
        /// Name of the offending environment variable.
        var: &'static str,
        /// The raw value that failed to parse.
        value: String,
        /// Human-readable explanation of why parsing failed.
        reason: String,
    },

    /// `TAMPI_CAPACITY` had a malformed `min[:max]` specification.
    #[error("TAMPI_CAPACITY has an invalid specification `{value}`: {reason}")]
    #[diagnostic(code(tampi::config::invalid_capacity), url(docsrs))]
    InvalidCapacity {
        /// The raw value that failed to parse.
        value: String,
        /// Human-readable explanation of why parsing failed.
        reason: String,
    },

    /// The parsed minimum capacity exceeds the parsed maximum.
    #[error("TAMPI_CAPACITY minimum ({min}) exceeds its maximum ({max})")]
    #[diagnostic(code(tampi::config::capacity_range_inverted), url(docsrs))]
    CapacityRangeInverted {
        /// The parsed minimum.
        min: usize,
        /// The parsed maximum.
        max: usize,
    },

    /// The requested capacity exceeds the hard cap on in-flight requests.
    #[error("{var} of {value} exceeds the hard cap of {cap}")]
    #[diagnostic(code(tampi::config::capacity_exceeds_hard_cap), url(docsrs))]
    CapacityExceedsHardCap {
        /// Name of the offending environment variable.
        var: &'static str,
        /// The value that was rejected.
        value: usize,
        /// The hard cap it exceeded.
        cap: usize,
    },

    /// `TAMPI_REQUESTS_TESTING` or `TAMPI_REQUESTS_IMMEDIATE_TESTING` held an unrecognized
    /// testing approach.
    #[error("{var} has an unrecognized testing approach `{value}`")]
    #[diagnostic(code(tampi::config::invalid_testing_approach), url(docsrs))]
    InvalidTestingApproach {
        /// Name of the offending environment variable.
        var: &'static str,
        /// The raw value that failed to parse.
        value: String,
    },

    /// `TAMPI_REQUESTS_TESTING` was set to `none`, which is only valid for the immediate-testing
    /// variable.
    #[error("TAMPI_REQUESTS_TESTING cannot be `none`; that value is only valid for TAMPI_REQUESTS_IMMEDIATE_TESTING")]
    #[diagnostic(code(tampi::config::general_testing_cannot_be_none), url(docsrs))]
    GeneralTestingCannotBeNone,

    /// `TAMPI_INSTRUMENT` held an unrecognized instrumentation backend.
    #[error("TAMPI_INSTRUMENT has an unrecognized value `{value}`")]
    #[diagnostic(code(tampi::config::invalid_instrument), url(docsrs))]
    InvalidInstrument {
        /// The raw value that failed to parse.
        value: String,
    },
}
