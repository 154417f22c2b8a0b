//! Idea clustering: LLM-scored feature vectors, K-means partitioning,
//! LLM-generated labels and a composite strength score.

pub mod engine;
pub mod error;
pub mod features;
pub mod kmeans;
pub mod labeling;
pub mod manual;
pub mod prompts;
pub mod strength;
pub mod types;

pub use engine::ClusterEngine;
pub use error::{ClusteringError, Stage};
pub use manual::{create_manual_cluster, merge_ideas_into_cluster};
pub use types::{ClusterLabel, Dimension, FeatureVector, Idea, IdeaCluster, IdeaScores};
