//! Clustering engine: scoring, K-means, labeling and strength, in that order.

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AppConfig, ClusteringConfig};
use crate::llm::{LanguageModel, RetryPolicy};

use super::error::ClusteringError;
use super::features::FeatureExtractor;
use super::kmeans::{self, Partition};
use super::labeling::ClusterLabeler;
use super::strength::refresh_strength;
use super::types::{FeatureVector, Idea, IdeaCluster};

/// Groups ideas into labeled, scored clusters.
///
/// The engine is stateless between runs; every call to [`ClusterEngine::cluster_ideas`]
/// issues one scoring call per idea and one labeling call per non-empty cluster,
/// sequentially.
pub struct ClusterEngine {
    extractor: FeatureExtractor,
    labeler: ClusterLabeler,
    config: ClusteringConfig,
}

impl ClusterEngine {
    pub fn new(model: Arc<dyn LanguageModel>, config: ClusteringConfig, retry: RetryPolicy) -> Self {
        Self {
            extractor: FeatureExtractor::new(model.clone(), retry.clone(), config.on_scoring_failure),
            labeler: ClusterLabeler::new(model, retry),
            config,
        }
    }

    pub fn from_app_config(model: Arc<dyn LanguageModel>, config: &AppConfig) -> Self {
        Self::new(
            model,
            config.clustering.clone(),
            RetryPolicy::from_config(&config.retry),
        )
    }

    pub fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Cluster `ideas`, seeding centroid selection from the configured seed or
    /// from entropy.
    pub async fn cluster_ideas(
        &self,
        ideas: &[Idea],
        target_clusters: Option<usize>,
    ) -> Result<Vec<IdeaCluster>, ClusteringError> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.cluster_ideas_with_rng(ideas, target_clusters, &mut rng)
            .await
    }

    /// Cluster `ideas` using `rng` for centroid selection
    pub async fn cluster_ideas_with_rng<R: Rng + Send + ?Sized>(
        &self,
        ideas: &[Idea],
        target_clusters: Option<usize>,
        rng: &mut R,
    ) -> Result<Vec<IdeaCluster>, ClusteringError> {
        if ideas.is_empty() {
            return Ok(Vec::new());
        }

        if ideas.len() < self.config.min_ideas {
            tracing::info!("Only {} idea(s), skipping clustering", ideas.len());
            return Ok(vec![single_cluster(ideas)]);
        }

        let k = self.cluster_count(ideas.len(), target_clusters);
        let span = tracing::info_span!(
            "cluster_ideas",
            run_id = %Uuid::new_v4(),
            ideas = ideas.len(),
            k
        );

        async move {
            tracing::info!("Scoring {} ideas", ideas.len());
            let vectors = self.extractor.extract(ideas).await?;

            let partition = kmeans::partition(&vectors, k, self.config.max_iterations, rng);
            tracing::info!(
                "Partitioned into {} group(s) in {} iteration(s)",
                k,
                partition.iterations
            );

            let mut clusters = build_clusters(ideas, &vectors, &partition);
            tracing::info!("Labeling {} non-empty cluster(s)", clusters.len());
            self.labeler.label_all(&mut clusters).await?;

            for cluster in clusters.iter_mut() {
                refresh_strength(cluster);
            }

            Ok::<_, ClusteringError>(clusters)
        }
        .instrument(span)
        .await
    }

    /// Effective k: explicit non-zero target or the configured default, never above `idea_count`
    pub fn cluster_count(&self, idea_count: usize, target_clusters: Option<usize>) -> usize {
        target_clusters
            .filter(|&k| k > 0)
            .unwrap_or_else(|| self.config.default_cluster_count(idea_count))
            .min(idea_count)
    }
}

/// Everything in one group, used below the clustering threshold
pub fn single_cluster(ideas: &[Idea]) -> IdeaCluster {
    IdeaCluster {
        id: None,
        name: "مجموعة واحدة".to_string(),
        name_en: "Single Cluster".to_string(),
        description: "جميع الأفكار في مجموعة واحدة".to_string(),
        description_en: "All ideas in a single cluster".to_string(),
        strength: 100,
        member_count: ideas.len(),
        ideas: ideas.to_vec(),
        similarities: vec![100; ideas.len()],
    }
}

/// Turn a partition into placeholder-labeled clusters, dropping empty ones.
/// Strength is left at 0 until labeling is done.
pub fn build_clusters(
    ideas: &[Idea],
    vectors: &[FeatureVector],
    partition: &Partition,
) -> Vec<IdeaCluster> {
    (0..partition.k())
        .filter_map(|cluster| {
            let members: Vec<usize> = partition.members(cluster).collect();
            if members.is_empty() {
                return None;
            }

            let similarities = members
                .iter()
                .map(|&i| partition.similarity(&vectors[i], cluster))
                .collect();

            Some(IdeaCluster {
                id: None,
                name: format!("مجموعة {}", cluster + 1),
                name_en: format!("Cluster {}", cluster + 1),
                description: String::new(),
                description_en: String::new(),
                strength: 0,
                member_count: members.len(),
                ideas: members.iter().map(|&i| ideas[i].clone()).collect(),
                similarities,
            })
        })
        .collect()
}
