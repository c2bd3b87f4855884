//! The general and immediate testing approaches (`TAMPI_REQUESTS_TESTING` /
//! `TAMPI_REQUESTS_IMMEDIATE_TESTING`).

use std::fmt;

/// How the ticket manager tests a batch of in-flight requests.
///
/// Encoded as a plain enum (rather than a function-pointer table) since the set of approaches is
/// small and fixed; a `match` on the hot path is cheap and keeps the dispatch inlinable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestingApproach {
    /// Test each request individually.
    Test,
    /// Test the whole batch at once, collecting every completed index.
    TestSome,
    /// Repeatedly test the batch, taking one completion per round.
    TestAny,
}

impl TestingApproach {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "test" => Some(Self::Test),
            "testsome" => Some(Self::TestSome),
            "testany" => Some(Self::TestAny),
            _ => None,
        }
    }
}

impl fmt::Display for TestingApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Test => "test",
            Self::TestSome => "testsome",
            Self::TestAny => "testany",
        };
        f.write_str(s)
    }
}

/// How the ticket manager tests requests immediately after issuing them, before they are ever
/// inserted into the global in-flight array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmediateTestingApproach {
    /// Test each request individually.
    Test,
    /// Test the whole batch at once.
    TestSome,
    /// Repeatedly test the batch, taking one completion per round.
    TestAny,
    /// Skip the immediate test and insert every issued request into the global array.
    None,
}

impl ImmediateTestingApproach {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        match value {
            "none" => Some(Self::None),
            other => TestingApproach::parse(other).map(Self::from),
        }
    }
}

impl From<TestingApproach> for ImmediateTestingApproach {
    fn from(value: TestingApproach) -> Self {
        match value {
            TestingApproach::Test => Self::Test,
            TestingApproach::TestSome => Self::TestSome,
            TestingApproach::TestAny => Self::TestAny,
        }
    }
}

impl fmt::Display for ImmediateTestingApproach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Test => "test",
            Self::TestSome => "testsome",
            Self::TestAny => "testany",
            Self::None => "none",
        };
        f.write_str(s)
    }
}
