use anyhow::anyhow;
use std::fmt::Display;

/// The semantics of a step of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSemantics {
    /// At most one operator is active per step.
    Sequential,
    /// Several operators may be active in the same step, provided they do not interfere.
    Parallel,
}

impl TryFrom<&str> for StepSemantics {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "sequential" => Ok(StepSemantics::Sequential),
            "parallel" => Ok(StepSemantics::Parallel),
            _ => Err(anyhow!(r#"undefined step semantics "{}""#, value)),
        }
    }
}

impl Display for StepSemantics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepSemantics::Sequential => write!(f, "sequential"),
            StepSemantics::Parallel => write!(f, "parallel"),
        }
    }
}

/// The way the constants that may be bound to operator parameters are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilityMode {
    /// Every type-compatible constant is eligible.
    Lifted,
    /// Only the constants bound by some action proved reachable by the grounder are eligible.
    Grounded,
}

impl TryFrom<&str> for EligibilityMode {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_ascii_lowercase().as_str() {
            "lifted" => Ok(EligibilityMode::Lifted),
            "grounded" => Ok(EligibilityMode::Grounded),
            _ => Err(anyhow!(r#"undefined eligibility mode "{}""#, value)),
        }
    }
}

impl Display for EligibilityMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EligibilityMode::Lifted => write!(f, "lifted"),
            EligibilityMode::Grounded => write!(f, "grounded"),
        }
    }
}

/// The configuration of the lifted SAT encoding.
///
/// There is no default strategy: both components must be chosen explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodingStrategy {
    semantics: StepSemantics,
    eligibility: EligibilityMode,
}

impl EncodingStrategy {
    /// Builds a new strategy.
    pub fn new(semantics: StepSemantics, eligibility: EligibilityMode) -> Self {
        Self {
            semantics,
            eligibility,
        }
    }

    /// Returns the step semantics.
    pub fn semantics(&self) -> StepSemantics {
        self.semantics
    }

    /// Returns the eligibility mode.
    pub fn eligibility(&self) -> EligibilityMode {
        self.eligibility
    }
}

impl Display for EncodingStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.semantics, self.eligibility)
    }
}
