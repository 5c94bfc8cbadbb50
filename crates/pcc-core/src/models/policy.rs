use serde::{Deserialize, Serialize};

use crate::config::defaults;
use crate::errors::{PccError, PccResult};

/// How the generator treats a claim whose running coverage drops below tau.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DecodingMode {
    /// Halt the claim at the first segment that would break coverage.
    #[default]
    EarlyStop,
    /// Emit the full claim and leave it to the verifier to flag or gate.
    PostHocFlag,
}

/// What the verifier does with a claim that fails its thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureAction {
    /// Block the claim.
    #[default]
    Gate,
    /// Return the claim with a warning.
    Flag,
}

/// Plain wire form of [`Policy`]; validated on conversion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolicySpec {
    pub tau: f64,
    pub min_entailment: f64,
    pub max_spans: usize,
    pub latency_budget_ms: u64,
    pub memory_budget_mb: u64,
    #[serde(default)]
    pub decoding: DecodingMode,
    #[serde(default)]
    pub on_failure: FailureAction,
}

/// Fixed, validated, immutable request policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolicySpec", into = "PolicySpec")]
pub struct Policy {
    tau: f64,
    min_entailment: f64,
    max_spans: usize,
    latency_budget_ms: u64,
    memory_budget_mb: u64,
    decoding: DecodingMode,
    on_failure: FailureAction,
}

impl Policy {
    pub fn new(
        tau: f64,
        min_entailment: f64,
        max_spans: usize,
        latency_budget_ms: u64,
        memory_budget_mb: u64,
    ) -> PccResult<Self> {
        Self::try_from(PolicySpec {
            tau,
            min_entailment,
            max_spans,
            latency_budget_ms,
            memory_budget_mb,
            decoding: DecodingMode::default(),
            on_failure: FailureAction::default(),
        })
    }

    pub fn with_decoding(mut self, decoding: DecodingMode) -> Self {
        self.decoding = decoding;
        self
    }

    pub fn with_on_failure(mut self, on_failure: FailureAction) -> Self {
        self.on_failure = on_failure;
        self
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn min_entailment(&self) -> f64 {
        self.min_entailment
    }

    pub fn max_spans(&self) -> usize {
        self.max_spans
    }

    pub fn latency_budget_ms(&self) -> u64 {
        self.latency_budget_ms
    }

    pub fn memory_budget_mb(&self) -> u64 {
        self.memory_budget_mb
    }

    pub fn decoding(&self) -> DecodingMode {
        self.decoding
    }

    pub fn on_failure(&self) -> FailureAction {
        self.on_failure
    }

    /// Inclusive threshold test used everywhere coverage meets tau.
    pub fn coverage_satisfied(&self, coverage: f64) -> bool {
        coverage >= self.tau
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            tau: defaults::DEFAULT_TAU,
            min_entailment: defaults::DEFAULT_MIN_ENTAILMENT,
            max_spans: defaults::DEFAULT_MAX_SPANS,
            latency_budget_ms: defaults::DEFAULT_LATENCY_BUDGET_MS,
            memory_budget_mb: defaults::DEFAULT_MEMORY_BUDGET_MB,
            decoding: DecodingMode::default(),
            on_failure: FailureAction::default(),
        }
    }
}

impl TryFrom<PolicySpec> for Policy {
    type Error = PccError;

    fn try_from(spec: PolicySpec) -> Result<Self, Self::Error> {
        let invalid = |reason: String| Err(PccError::InvalidPolicy { reason });

        if !(0.0..=1.0).contains(&spec.tau) {
            return invalid(format!("tau must be in [0, 1], got {}", spec.tau));
        }
        if !(0.0..=1.0).contains(&spec.min_entailment) {
            return invalid(format!(
                "min_entailment must be in [0, 1], got {}",
                spec.min_entailment
            ));
        }
        if spec.max_spans == 0 || spec.max_spans > crate::constants::MAX_CERTIFICATE_SPANS {
            return invalid(format!(
                "max_spans must be in 1..={}, got {}",
                crate::constants::MAX_CERTIFICATE_SPANS,
                spec.max_spans
            ));
        }
        if spec.latency_budget_ms == 0 {
            return invalid("latency_budget_ms must be > 0".into());
        }
        if spec.memory_budget_mb == 0 {
            return invalid("memory_budget_mb must be > 0".into());
        }

        Ok(Self {
            tau: spec.tau,
            min_entailment: spec.min_entailment,
            max_spans: spec.max_spans,
            latency_budget_ms: spec.latency_budget_ms,
            memory_budget_mb: spec.memory_budget_mb,
            decoding: spec.decoding,
            on_failure: spec.on_failure,
        })
    }
}

impl From<Policy> for PolicySpec {
    fn from(p: Policy) -> Self {
        Self {
            tau: p.tau,
            min_entailment: p.min_entailment,
            max_spans: p.max_spans,
            latency_budget_ms: p.latency_budget_ms,
            memory_budget_mb: p.memory_budget_mb,
            decoding: p.decoding,
            on_failure: p.on_failure,
        }
    }
}
