//! The `min[:max[:policy]]` specification shared by `TAMPI_POLLING_PERIOD` and
//! `TAMPI_POLLING_TASK_COMPLETION_PERIOD`.

use crate::error::Error;

/// How a polling task's wait period evolves between polls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodPolicy {
    /// `min == max`: the period never changes.
    Fixed {
        /// The constant period, in microseconds.
        period_us: u64,
    },
    /// `min < max`: the period follows the slow-start controller between the two bounds.
    SlowStart {
        /// Lower bound, in microseconds.
        min_us: u64,
        /// Upper bound, in microseconds.
        max_us: u64,
    },
}

impl PeriodPolicy {
    /// Parses a `min[:max[:policy]]` specification such as `"100"` or `"10:1000:slowstart"`.
    ///
    /// `var` is the originating environment variable name, used only for error messages.
    pub fn parse(var: &'static str, value: &str) -> Result<Self, Error> {
        let mut parts = value.split(':');
        let min_str = parts
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::InvalidPollingPeriod {
                var,
                value: value.to_owned(),
                reason: "missing minimum period".to_owned(),
            })?;
        let min_us: u64 = min_str.parse().map_err(|_| Error::InvalidPollingPeriod {
            var,
            value: value.to_owned(),
            reason: format!("`{min_str}` is not a valid microsecond count"),
        })?;

        let max_us = match parts.next() {
            Some(max_str) if !max_str.is_empty() => {
                max_str.parse().map_err(|_| Error::InvalidPollingPeriod {
                    var,
                    value: value.to_owned(),
                    reason: format!("`{max_str}` is not a valid microsecond count"),
                })?
            }
            _ => min_us,
        };

        if let Some(policy) = parts.next() {
            if policy != "slowstart" && policy != "default" {
                return Err(Error::InvalidPollingPeriod {
                    var,
                    value: value.to_owned(),
                    reason: format!("unrecognized policy `{policy}`"),
                });
            }
        }

        if parts.next().is_some() {
            return Err(Error::InvalidPollingPeriod {
                var,
                value: value.to_owned(),
                reason: "too many `:`-separated fields".to_owned(),
            });
        }

        if min_us >= max_us {
            return Ok(Self::Fixed { period_us: min_us });
        }
        Ok(Self::SlowStart { min_us, max_us })
    }
}

impl Default for PeriodPolicy {
    fn default() -> Self {
        Self::Fixed { period_us: 100 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_is_fixed() {
        assert_eq!(
            PeriodPolicy::parse("TAMPI_POLLING_PERIOD", "100").unwrap(),
            PeriodPolicy::Fixed { period_us: 100 }
        );
    }

    #[test]
    fn equal_bounds_is_fixed() {
        assert_eq!(
            PeriodPolicy::parse("TAMPI_POLLING_PERIOD", "50:50").unwrap(),
            PeriodPolicy::Fixed { period_us: 50 }
        );
    }

    #[test]
    fn distinct_bounds_is_slow_start() {
        assert_eq!(
            PeriodPolicy::parse("TAMPI_POLLING_PERIOD", "10:1000:slowstart").unwrap(),
            PeriodPolicy::SlowStart {
                min_us: 10,
                max_us: 1000
            }
        );
    }

    #[test]
    fn rejects_garbage() {
        assert!(PeriodPolicy::parse("TAMPI_POLLING_PERIOD", "abc").is_err());
        assert!(PeriodPolicy::parse("TAMPI_POLLING_PERIOD", "10:20:bogus").is_err());
        assert!(PeriodPolicy::parse("TAMPI_POLLING_PERIOD", "10:20:slowstart:extra").is_err());
    }
}
