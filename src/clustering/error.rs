use thiserror::Error;

use crate::llm::{ProviderError, Retryable};

/// Pipeline stage that issued a model call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Scoring,
    Labeling,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scoring => write!(f, "scoring"),
            Self::Labeling => write!(f, "labeling"),
        }
    }
}

/// Clustering errors
#[derive(Error, Debug)]
pub enum ClusteringError {
    #[error("Model call failed during {stage}: {source}")]
    Provider {
        stage: Stage,
        #[source]
        source: ProviderError,
    },

    #[error("Malformed {stage} response: {detail}")]
    MalformedResponse { stage: Stage, detail: String },

    #[error("Unknown idea id: {0}")]
    UnknownIdea(i64),
}

impl ClusteringError {
    pub fn provider(stage: Stage, source: ProviderError) -> Self {
        Self::Provider { stage, source }
    }

    pub fn malformed(stage: Stage, detail: impl std::fmt::Display) -> Self {
        Self::MalformedResponse {
            stage,
            detail: detail.to_string(),
        }
    }
}

impl Retryable for ClusteringError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::Provider { source, .. } => source.is_retryable(),
            Self::MalformedResponse { .. } => true,
            Self::UnknownIdea(_) => false,
        }
    }
}
