//! Feature extraction: one scoring call per idea, parsed into a `FeatureVector`.

use std::sync::Arc;

use crate::config::ScoringFailurePolicy;
use crate::llm::{strict_response_format, LanguageModel, ResponseFormat, RetryPolicy};

use super::error::{ClusteringError, Stage};
use super::prompts::{scoring_messages, SCORING_SCHEMA_NAME};
use super::types::{Dimension, FeatureVector, Idea, IdeaScores, DIMENSIONS, MAX_SCORE};

pub struct FeatureExtractor {
    model: Arc<dyn LanguageModel>,
    retry: RetryPolicy,
    on_failure: ScoringFailurePolicy,
    format: ResponseFormat,
}

impl FeatureExtractor {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        retry: RetryPolicy,
        on_failure: ScoringFailurePolicy,
    ) -> Self {
        Self {
            model,
            retry,
            on_failure,
            format: strict_response_format::<IdeaScores>(SCORING_SCHEMA_NAME),
        }
    }

    /// Score every idea sequentially, preserving input order
    pub async fn extract(&self, ideas: &[Idea]) -> Result<Vec<FeatureVector>, ClusteringError> {
        let mut vectors = Vec::with_capacity(ideas.len());

        for idea in ideas {
            let label = format!("scoring idea {}", idea.id);
            match self.retry.run(&label, || self.score(idea)).await {
                Ok(vector) => vectors.push(vector),
                Err(e) if self.on_failure == ScoringFailurePolicy::Neutral => {
                    tracing::warn!(
                        "Scoring idea {} failed, using neutral vector: {}",
                        idea.id,
                        e
                    );
                    vectors.push(FeatureVector::neutral());
                }
                Err(e) => return Err(e),
            }
        }

        Ok(vectors)
    }

    /// Single scoring call, no retries
    pub async fn score(&self, idea: &Idea) -> Result<FeatureVector, ClusteringError> {
        tracing::debug!("Scoring idea {} with {}", idea.id, self.model.model_name());

        let response = self
            .model
            .complete(&scoring_messages(idea), Some(&self.format))
            .await
            .map_err(|e| ClusteringError::provider(Stage::Scoring, e))?;

        let scores: IdeaScores = response
            .content
            .parse()
            .map_err(|e| ClusteringError::malformed(Stage::Scoring, e))?;

        Ok(vector_from_scores(idea.id, scores))
    }
}

/// Convert raw model scores to coordinates, clamping anything outside `[0, 100]`
pub fn vector_from_scores(idea_id: i64, scores: IdeaScores) -> FeatureVector {
    let raw = scores.as_array();
    let mut coordinates = [0.0; DIMENSIONS];

    for dimension in Dimension::ALL {
        let score = raw[dimension.index()];
        if !(0..=MAX_SCORE as i64).contains(&score) {
            tracing::warn!(
                "Idea {} scored {} on {}, clamping to 0-100",
                idea_id,
                score,
                dimension.field_name()
            );
        }
        coordinates[dimension.index()] = (score as f64).clamp(0.0, MAX_SCORE);
    }

    FeatureVector(coordinates)
}
