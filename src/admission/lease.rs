//! Lease records and the priority reserve model.

use crate::admission::config::CoordinatorConfig;
use std::time::Instant;

/// Workload category of a leased operation.
///
/// The kind is diagnostic metadata and part of the lease identity; it does
/// not enter the admission arithmetic.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum OperationKind {
    /// Parsing a fetched document into an in-memory tree.
    JsonParsing,
    /// An outbound HTTP request and its response body.
    HttpRequest,
    /// Heavy in-memory data transformation.
    DataProcessing,
    /// Rendering or framebuffer work.
    DisplayUpdate,
    /// Configuration load/store work.
    ConfigOperation,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JsonParsing => write!(f, "json-parsing"),
            Self::HttpRequest => write!(f, "http-request"),
            Self::DataProcessing => write!(f, "data-processing"),
            Self::DisplayUpdate => write!(f, "display-update"),
            Self::ConfigOperation => write!(f, "config-operation"),
        }
    }
}

/// Admission priority of a leased operation.
///
/// Priority does not grant more memory; it selects the free-heap reserve
/// that must remain *beyond* the requested bytes before the lease is
/// granted. The reserve shrinks as priority rises: critical system work
/// (configuration, connectivity) is allowed to run closer to exhaustion
/// precisely because it must not be starved by the admission policy, while
/// background work needs generous headroom since its failure is cheap.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, PartialOrd, Ord)]
pub enum Priority {
    /// Opportunistic work; largest reserve.
    Background,
    /// Regular module operations.
    Normal,
    /// User-visible operations (display, input).
    Important,
    /// System operations that must not be starved; smallest reserve.
    Critical,
}

impl Priority {
    /// Free-heap reserve required beyond the requested bytes.
    ///
    /// Monotonically decreasing across
    /// `Background > Normal > Important > Critical` as long as the
    /// configured critical threshold does not exceed the low threshold.
    pub fn required_reserve(self, config: &CoordinatorConfig) -> usize {
        match self {
            Self::Critical => config.critical_threshold / 2,
            Self::Important => config.critical_threshold,
            Self::Normal => config.low_threshold,
            Self::Background => config.low_threshold + CoordinatorConfig::BACKGROUND_MARGIN,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Background => write!(f, "background"),
            Self::Normal => write!(f, "normal"),
            Self::Important => write!(f, "important"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

/// An active lease slot in the coordinator's table.
///
/// A lease is identified by `(kind, owner)`; no handle is returned to the
/// caller. The estimated byte count is caller-supplied and never verified.
#[derive(Clone, Debug)]
pub struct Lease {
    pub kind: OperationKind,
    pub priority: Priority,
    pub estimated_bytes: usize,
    pub owner: String,
    pub started: Instant,
}

impl Lease {
    pub(crate) fn new(
        kind: OperationKind,
        priority: Priority,
        estimated_bytes: usize,
        owner: &str,
    ) -> Self {
        Self {
            kind,
            priority,
            estimated_bytes,
            owner: owner.to_string(),
            started: Instant::now(),
        }
    }

    /// True when this lease matches the given identity.
    pub(crate) fn matches(&self, kind: OperationKind, owner: &str) -> bool {
        self.kind == kind && self.owner == owner
    }
}
