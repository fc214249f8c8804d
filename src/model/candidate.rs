use serde::{Deserialize, Serialize};

/// One row of a model's class histogram (how often the class appears in its training data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassCount {
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

impl ClassCount {
    pub fn new(name: impl Into<String>, count: u64) -> Self {
        Self {
            name: name.into(),
            count,
        }
    }
}

/// A detection model eligible for ranking.
///
/// Produced by a [`CandidateProvider`](crate::session::CandidateProvider) and never
/// mutated afterwards. `semantic_score` and `image_similarity_score` are supplied by
/// the search backend on a `0..=100` scale; `None` means the backend had no opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelCandidate {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub class_histogram: Vec<ClassCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_similarity_score: Option<f64>,
    /// Overrides the default `{inference_url}/{id}` endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl ModelCandidate {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            class_histogram: Vec::new(),
            semantic_score: None,
            image_similarity_score: None,
            endpoint: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_histogram(mut self, histogram: Vec<ClassCount>) -> Self {
        self.class_histogram = histogram;
        self
    }

    pub fn with_semantic_score(mut self, score: f64) -> Self {
        self.semantic_score = Some(score);
        self
    }

    pub fn with_image_similarity_score(mut self, score: f64) -> Self {
        self.image_similarity_score = Some(score);
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}
