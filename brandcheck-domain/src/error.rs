use brandcheck_types::fix::UnresolvedFix;
use brandcheck_types::scene::ElementId;
use thiserror::Error;

/// A validator could not produce a verdict. Dispatch turns this into a failed result.
#[derive(Debug, Error)]
pub enum RuleEvaluationError {
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("invalid rule parameters: {0}")]
    InvalidParams(String),

    #[error("validator panicked: {0}")]
    Panicked(String),
}

/// A fix generator could not pin its target to exactly one element.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FixResolutionError {
    #[error("{rule_id}: no element found for {what}")]
    Missing { rule_id: String, what: String },

    #[error("{rule_id}: {what} is ambiguous between {} elements", candidates.len())]
    Ambiguous {
        rule_id: String,
        what: String,
        candidates: Vec<ElementId>,
    },

    #[error("{rule_id}: {reason}")]
    Unfixable { rule_id: String, reason: String },
}

impl FixResolutionError {
    pub fn rule_id(&self) -> &str {
        match self {
            FixResolutionError::Missing { rule_id, .. }
            | FixResolutionError::Ambiguous { rule_id, .. }
            | FixResolutionError::Unfixable { rule_id, .. } => rule_id,
        }
    }

    pub fn to_unresolved(&self) -> UnresolvedFix {
        let candidates = match self {
            FixResolutionError::Ambiguous { candidates, .. } => candidates.clone(),
            _ => vec![],
        };
        UnresolvedFix {
            rule_id: self.rule_id().to_string(),
            reason: self.to_string(),
            candidates,
        }
    }
}
