//! Domain models: roadmap and quiz documents.
//!
//! The HTTP layer hands documents back as opaque JSON values; these typed forms
//! describe the expected shape and are used where the shape matters.

use serde::{Deserialize, Serialize};

/// A learning roadmap: ordered modules, each with subtopics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadmapDocument {
  pub skill: String,
  #[serde(default)] pub modules: Vec<Module>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
  pub title: String,
  #[serde(default)] pub subtopics: Vec<Subtopic>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Subtopic {
  pub title: String,
  pub resources: Resources,
}

/// Search queries for each learning platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resources {
  pub youtube: String,
  pub udemy: String,
  pub coursera: String,
  pub articles: String,
}

/// A single multiple-choice question.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuizDocument {
  pub question: String,
  pub options: Vec<String>,
  pub answer: String,
}

impl QuizDocument {
  pub const OPTION_COUNT: usize = 4;

  /// The generated answer should be one of the offered options. Not enforced on
  /// the serving path, only checked where callers care.
  pub fn answer_is_an_option(&self) -> bool {
    self.options.iter().any(|o| o == &self.answer)
  }

  pub fn has_expected_option_count(&self) -> bool {
    self.options.len() == Self::OPTION_COUNT
  }
}
