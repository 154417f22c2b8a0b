//! NAQLA - idea clustering for the UPLINK/NAQLA innovation pipeline
//!
//! Groups submitted ideas into coherent clusters. Each idea is scored by a
//! language model on six dimensions (innovation, market, technical feasibility,
//! team, IP strength, scalability); the score vectors are partitioned with
//! K-means; each cluster gets a bilingual name from the model and a 0-100
//! strength from its size, cohesion and category diversity.
//!
//! # Main Modules
//!
//! - [`clustering`] - Clustering engine, K-means and manual cluster operations
//! - [`llm`] - Language model boundary (trait, HTTP providers, retries)
//! - [`config`] - JSON configuration with environment overrides
//! - [`logging`] - Tracing setup
//!
//! # Example
//!
//! ```rust,no_run
//! use naqla::clustering::{ClusterEngine, Idea};
//! use naqla::config::AppConfig;
//! use naqla::llm::create_provider;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = AppConfig::load(None)?;
//! let model = create_provider(config.model.clone())?;
//! let engine = ClusterEngine::from_app_config(model, &config);
//!
//! let ideas = vec![
//!     Idea::new(1, "منصة تعليمية", "تعليم عن بعد للقرى").with_category("education"),
//!     Idea::new(2, "عداد ذكي", "قياس استهلاك المياه").with_category("utilities"),
//!     Idea::new(3, "تطبيق صحي", "متابعة مرضى السكري").with_category("health"),
//! ];
//!
//! let clusters = engine.cluster_ideas(&ideas, None).await?;
//! for cluster in &clusters {
//!     println!("{} ({}): {} ideas", cluster.name_en, cluster.strength, cluster.member_count);
//! }
//! # Ok(())
//! # }
//! ```

pub mod clustering;
pub mod config;
pub mod llm;
pub mod logging;

pub use clustering::{ClusterEngine, ClusteringError, Idea, IdeaCluster};
pub use config::AppConfig;
pub use llm::{LanguageModel, ProviderError};
