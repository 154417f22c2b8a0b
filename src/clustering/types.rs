use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Number of scoring dimensions in a feature vector
pub const DIMENSIONS: usize = 6;

/// Upper bound of every score
pub const MAX_SCORE: f64 = 100.0;

/// An idea submitted to the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Idea {
    pub id: i64,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
}

impl Idea {
    pub fn new(id: i64, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            category: None,
            keywords: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Text sent to the model for scoring: title, description, comma-joined keywords
    pub fn scoring_text(&self) -> String {
        let keywords = self.keywords.as_deref().unwrap_or_default().join(", ");
        format!("{}\n{}\n{}", self.title, self.description, keywords)
    }
}

/// Scoring dimension of a feature vector, in coordinate order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Innovation,
    Market,
    Technical,
    Team,
    IntellectualProperty,
    Scalability,
}

impl Dimension {
    pub const ALL: [Dimension; DIMENSIONS] = [
        Dimension::Innovation,
        Dimension::Market,
        Dimension::Technical,
        Dimension::Team,
        Dimension::IntellectualProperty,
        Dimension::Scalability,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Field carrying this dimension in the scoring response
    pub fn field_name(self) -> &'static str {
        match self {
            Dimension::Innovation => "innovation",
            Dimension::Market => "market",
            Dimension::Technical => "technical",
            Dimension::Team => "team",
            Dimension::IntellectualProperty => "ip",
            Dimension::Scalability => "scalability",
        }
    }
}

/// Six-dimensional score vector used as clustering coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; DIMENSIONS]);

impl FeatureVector {
    pub const fn splat(value: f64) -> Self {
        Self([value; DIMENSIONS])
    }

    /// Midpoint of every dimension
    pub fn neutral() -> Self {
        Self::splat(MAX_SCORE / 2.0)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn euclidean_distance(&self, other: &FeatureVector) -> f64 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// Largest distance two vectors with coordinates in `[0, MAX_SCORE]` can have
    pub fn max_distance() -> f64 {
        (DIMENSIONS as f64 * MAX_SCORE * MAX_SCORE).sqrt()
    }
}

/// Scores returned by the model for a single idea
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct IdeaScores {
    /// Innovation score 0-100
    pub innovation: i64,
    /// Market viability score 0-100
    pub market: i64,
    /// Technical feasibility score 0-100
    pub technical: i64,
    /// Team capability score 0-100
    pub team: i64,
    /// IP strength score 0-100
    pub ip: i64,
    /// Scalability score 0-100
    pub scalability: i64,
}

impl IdeaScores {
    pub fn as_array(&self) -> [i64; DIMENSIONS] {
        [
            self.innovation,
            self.market,
            self.technical,
            self.team,
            self.ip,
            self.scalability,
        ]
    }
}

/// Bilingual name and description generated for a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ClusterLabel {
    /// اسم المجموعة بالعربية
    pub name: String,
    /// Cluster name in English
    #[serde(rename = "nameEn")]
    pub name_en: String,
    /// وصف مختصر بالعربية
    pub description: String,
    /// Brief description in English
    #[serde(rename = "descriptionEn")]
    pub description_en: String,
}

/// A group of related ideas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaCluster {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub name_en: String,
    pub description: String,
    #[serde(default)]
    pub description_en: String,
    /// Composite score 0-100
    pub strength: u8,
    pub member_count: usize,
    pub ideas: Vec<Idea>,
    /// Closeness of each member to the centroid, 0-100, parallel to `ideas`
    pub similarities: Vec<u8>,
}

impl IdeaCluster {
    pub fn apply_label(&mut self, label: ClusterLabel) {
        self.name = label.name;
        self.name_en = label.name_en;
        self.description = label.description;
        self.description_en = label.description_en;
    }

    pub fn contains(&self, idea_id: i64) -> bool {
        self.ideas.iter().any(|idea| idea.id == idea_id)
    }

    /// Member titles as a dash list, one per line
    pub fn title_list(&self) -> String {
        self.ideas
            .iter()
            .map(|idea| format!("- {}", idea.title))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
