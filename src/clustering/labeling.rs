//! Cluster labeling: one naming call per non-empty cluster.

use std::sync::Arc;

use crate::llm::{strict_response_format, LanguageModel, ResponseFormat, RetryPolicy};

use super::error::{ClusteringError, Stage};
use super::prompts::{labeling_messages, LABELING_SCHEMA_NAME};
use super::types::{ClusterLabel, IdeaCluster};

pub struct ClusterLabeler {
    model: Arc<dyn LanguageModel>,
    retry: RetryPolicy,
    format: ResponseFormat,
}

impl ClusterLabeler {
    pub fn new(model: Arc<dyn LanguageModel>, retry: RetryPolicy) -> Self {
        Self {
            model,
            retry,
            format: strict_response_format::<ClusterLabel>(LABELING_SCHEMA_NAME),
        }
    }

    /// Replace the placeholder labels of every cluster, sequentially
    pub async fn label_all(&self, clusters: &mut [IdeaCluster]) -> Result<(), ClusteringError> {
        for (index, cluster) in clusters.iter_mut().enumerate() {
            let label = format!("labeling cluster {}", index + 1);
            let titles = cluster.title_list();
            let generated = self.retry.run(&label, || self.label(&titles)).await?;
            tracing::debug!("Cluster {} labeled as {:?}", index + 1, generated.name_en);
            cluster.apply_label(generated);
        }
        Ok(())
    }

    /// Single naming call for a dash list of titles, no retries
    pub async fn label(&self, title_list: &str) -> Result<ClusterLabel, ClusteringError> {
        let response = self
            .model
            .complete(&labeling_messages(title_list), Some(&self.format))
            .await
            .map_err(|e| ClusteringError::provider(Stage::Labeling, e))?;

        response
            .content
            .parse()
            .map_err(|e| ClusteringError::malformed(Stage::Labeling, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labeling_schema_fields() {
        let format = strict_response_format::<ClusterLabel>(LABELING_SCHEMA_NAME);
        assert_eq!(format.name, "cluster_naming");
        let properties = format.schema["properties"].as_object().unwrap();
        for field in ["name", "nameEn", "description", "descriptionEn"] {
            assert_eq!(properties[field]["type"], "string");
        }
        assert_eq!(format.schema["required"].as_array().unwrap().len(), 4);
        assert_eq!(format.schema["additionalProperties"], false);
    }

    #[test]
    fn test_label_payload_parses() {
        let json = r#"{"name":"طاقة","nameEn":"Energy","description":"أفكار طاقة","descriptionEn":"Energy ideas"}"#;
        let label: ClusterLabel = serde_json::from_str(json).unwrap();
        assert_eq!(label.name_en, "Energy");

        let extra = r#"{"name":"a","nameEn":"b","description":"c","descriptionEn":"d","x":1}"#;
        assert!(serde_json::from_str::<ClusterLabel>(extra).is_err());
    }
}
