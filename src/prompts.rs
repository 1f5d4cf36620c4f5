//! Prompt templates for roadmap and quiz generation.
//!
//! Templates are plain strings with `{skill}` / `{topic}` placeholders; they can be
//! overridden from TOML (see `config::Prompts`). Rendering is pure.

use crate::config::Prompts;
use crate::util::fill_template;

pub const ROADMAP_PROMPT_TEMPLATE: &str = r#"
You are an expert curriculum designer. Generate a step-by-step learning roadmap for the skill: "{skill}".
Break it down into logical modules and sub-topics.
For each sub-topic, provide a resources object containing simple search queries for YouTube, Coursera, Udemy, and a relevant type of article.

Provide the output ONLY in a valid JSON format, following this structure:
{
  "skill": "{skill}",
  "modules": [
    {
      "title": "Module 1: ...",
      "subtopics": [
        {
          "title": "Sub-topic Title",
          "resources": {
            "youtube": "YouTube Search Query",
            "udemy": "Udemy Course Search Query",
            "coursera": "Coursera Course Search Query",
            "articles": "Technical Article Search Query"
          }
        }
      ]
    }
  ]
}

Do not include any text, explanation, or markdown formatting before or after the JSON object.
"#;

pub const QUIZ_PROMPT_TEMPLATE: &str = r#"
You are a quiz designer. Create a single, simple multiple-choice question to test a beginner's knowledge on the topic: "{topic}".
The question should have 4 options, with one being the correct answer.

Provide the output ONLY in a valid JSON format like this:
{
  "question": "The question text?",
  "options": [
    "Option A",
    "Option B",
    "Option C",
    "Option D"
  ],
  "answer": "The correct option text"
}

Do not include any text, explanation, or markdown formatting before or after the JSON object.
"#;

pub fn build_roadmap_prompt(prompts: &Prompts, skill: &str) -> String {
  fill_template(&prompts.roadmap_template, &[("skill", skill)])
}

pub fn build_quiz_prompt(prompts: &Prompts, topic: &str) -> String {
  fill_template(&prompts.quiz_template, &[("topic", topic)])
}
