//! Content loader for the static assessment catalog.
//!
//! Catalog documents arrive as JSON, either an array of assessments or an
//! object keyed by assessment id. Question sources are tolerated in the two
//! field-name variants observed in exported question dumps (`text` vs
//! `question`, `correctAnswerIndex` vs `correctAnswer`) and with string or
//! integer ids; everything normalizes into the canonical
//! `QuestionDefinition` shape here, before the engine ever sees it.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use exam_core::model::{AssessmentDefinition, AssessmentId, QuestionDefinition, QuestionId};

use crate::error::CatalogError;

fn default_points_per_correct() -> u32 {
    4
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum IdDoc {
    Text(String),
    Number(u64),
}

impl IdDoc {
    fn into_question_id(self) -> QuestionId {
        match self {
            IdDoc::Text(s) => QuestionId::new(s),
            IdDoc::Number(n) => QuestionId::new(n.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionDoc {
    id: IdDoc,
    #[serde(alias = "question")]
    text: String,
    options: Vec<String>,
    #[serde(alias = "correctAnswer")]
    correct_answer_index: usize,
    #[serde(default)]
    explanation: Option<String>,
}

impl QuestionDoc {
    fn into_definition(self) -> Result<QuestionDefinition, CatalogError> {
        Ok(QuestionDefinition::new(
            self.id.into_question_id(),
            self.text,
            self.options,
            self.correct_answer_index,
            self.explanation,
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentDoc {
    #[serde(default)]
    id: Option<String>,
    title: String,
    #[serde(default)]
    description: Option<String>,
    time_limit_seconds: u32,
    passing_score: u32,
    #[serde(default = "default_points_per_correct")]
    points_per_correct: u32,
    questions: Vec<QuestionDoc>,
}

impl AssessmentDoc {
    /// `key` is the map key when the catalog document is id-keyed.
    fn into_definition(self, key: Option<&str>) -> Result<AssessmentDefinition, CatalogError> {
        let id = match (self.id, key) {
            (Some(id), Some(key)) if id != key => {
                return Err(CatalogError::LoadFailure(format!(
                    "assessment id {id:?} does not match catalog key {key:?}"
                )));
            }
            (Some(id), _) => id,
            (None, Some(key)) => key.to_owned(),
            (None, None) => {
                return Err(CatalogError::LoadFailure(
                    "assessment entry is missing an id".into(),
                ));
            }
        };

        let questions = self
            .questions
            .into_iter()
            .map(QuestionDoc::into_definition)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(AssessmentDefinition::new(
            AssessmentId::new(id),
            self.title,
            self.description,
            self.time_limit_seconds,
            self.passing_score,
            self.points_per_correct,
            questions,
        )?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogDoc {
    List(Vec<AssessmentDoc>),
    ById(BTreeMap<String, AssessmentDoc>),
}

/// Static, read-only catalog of validated assessment definitions.
///
/// Built once at startup; never mutated at runtime by the engine.
#[derive(Debug)]
pub struct AssessmentCatalog {
    assessments: Vec<AssessmentDefinition>,
    index: HashMap<AssessmentId, usize>,
}

impl AssessmentCatalog {
    fn from_docs(
        docs: Vec<(Option<String>, AssessmentDoc)>,
    ) -> Result<Self, CatalogError> {
        let mut assessments = Vec::with_capacity(docs.len());
        let mut index = HashMap::with_capacity(docs.len());

        for (key, doc) in docs {
            let assessment = doc.into_definition(key.as_deref())?;
            if index.contains_key(assessment.id()) {
                return Err(CatalogError::DuplicateAssessment(assessment.id().clone()));
            }
            index.insert(assessment.id().clone(), assessments.len());
            assessments.push(assessment);
        }

        Ok(Self { assessments, index })
    }

    /// Parse a catalog from raw JSON.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::LoadFailure` for malformed JSON,
    /// `CatalogError::Definition` when an entry fails validation, and
    /// `CatalogError::DuplicateAssessment` for repeated ids.
    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDoc =
            serde_json::from_str(raw).map_err(|e| CatalogError::LoadFailure(e.to_string()))?;

        match doc {
            CatalogDoc::List(list) => {
                Self::from_docs(list.into_iter().map(|doc| (None, doc)).collect())
            }
            CatalogDoc::ById(map) => {
                Self::from_docs(map.into_iter().map(|(key, doc)| (Some(key), doc)).collect())
            }
        }
    }

    /// Load a catalog from a JSON file on disk.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::LoadFailure` when the file cannot be read, plus
    /// everything `from_json_str` reports.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CatalogError::LoadFailure(format!("read {}: {e}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Look up an assessment by id.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` when the id is not in the catalog.
    pub fn get(&self, id: &AssessmentId) -> Result<&AssessmentDefinition, CatalogError> {
        self.index
            .get(id)
            .map(|&i| &self.assessments[i])
            .ok_or_else(|| CatalogError::NotFound(id.clone()))
    }

    /// All assessments in catalog order, for listing pages.
    #[must_use]
    pub fn assessments(&self) -> &[AssessmentDefinition] {
        &self.assessments
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.assessments.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
