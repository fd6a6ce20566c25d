//! Quiz questions and the built-in question bank.
//!
//! Each option of a question is tagged with the profile it votes for. The
//! bank itself holds no answers; a run's answers live in the wizard state.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::ConfigError;
use crate::profile::{ProfileLabel, ProfileResolver};

/// Placeholder replaced by the child's name in question text.
pub const CHILD_PLACEHOLDER: &str = "{child}";

/// One selectable answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub letter: String,
    pub text: String,
    pub profile: ProfileLabel,
}

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    /// Situation the question is set in, e.g. "At the park".
    pub context: String,
    /// Question text, may contain [`CHILD_PLACEHOLDER`].
    pub text: String,
    pub options: Vec<AnswerOption>,
}

impl Question {
    pub fn option(&self, letter: &str) -> Option<&AnswerOption> {
        let letter = letter.trim();
        self.options
            .iter()
            .find(|o| o.letter.eq_ignore_ascii_case(letter))
    }

    pub fn prompt(&self, child_name: &str) -> String {
        format!("{}, {}", self.context, self.text).replace(CHILD_PLACEHOLDER, child_name)
    }
}

/// Ordered list of questions asked in one quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    /// Case-insensitive option lookup on question `index`.
    pub fn option(&self, index: usize, letter: &str) -> Option<&AnswerOption> {
        self.get(index)?.option(letter)
    }

    pub fn prompt(&self, index: usize, child_name: &str) -> Option<String> {
        self.get(index).map(|q| q.prompt(child_name))
    }

    /// Every profile an answer in this bank can vote for.
    pub fn labels(&self) -> BTreeSet<&ProfileLabel> {
        self.questions
            .iter()
            .flat_map(|q| q.options.iter().map(|o| &o.profile))
            .collect()
    }

    /// Check that the bank is answerable and that the resolver can map every
    /// profile it produces.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for an empty bank, a question
    /// without options or a repeated letter, and [`ConfigError::Unmapped`]
    /// for a profile the resolver does not know.
    pub fn validate(&self, resolver: &ProfileResolver) -> Result<(), ConfigError> {
        if self.questions.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "questions".to_string(),
                message: "question bank is empty".to_string(),
            });
        }

        for question in &self.questions {
            if question.options.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: format!("questions.{}", question.id),
                    message: "question has no options".to_string(),
                });
            }

            let mut letters = BTreeSet::new();
            for option in &question.options {
                if !letters.insert(option.letter.to_ascii_uppercase()) {
                    return Err(ConfigError::InvalidValue {
                        key: format!("questions.{}", question.id),
                        message: format!("option letter '{}' is repeated", option.letter),
                    });
                }
                if !resolver.knows(&option.profile) {
                    return Err(ConfigError::Unmapped(option.profile.clone()));
                }
            }
        }

        Ok(())
    }

    /// The five questions of the kit-recommendation quiz.
    pub fn default_bank() -> Self {
        fn opt(letter: &str, text: &str, profile: &str) -> AnswerOption {
            AnswerOption {
                letter: letter.to_string(),
                text: text.to_string(),
                profile: ProfileLabel::from(profile),
            }
        }

        Self::new(vec![
            Question {
                id: 1,
                context: "When toys are lying around in a mess".to_string(),
                text: "what does {child} do?".to_string(),
                options: vec![
                    opt("A", "Sorts them by colour or size", "logical"),
                    opt("B", "Starts drawing or painting", "artistic"),
                    opt("C", "Jumps, runs or throws things", "motor"),
                    opt("D", "Looks out of the window or hunts for bugs", "explorer"),
                ],
            },
            Question {
                id: 2,
                context: "Faced with a wrapped present".to_string(),
                text: "what does {child} do?".to_string(),
                options: vec![
                    opt("A", "Asks \"what is it?\" or works out how to open it", "logical"),
                    opt("B", "Rips the paper off fast and shakes the box", "motor"),
                    opt("C", "Looks at the pictures and colours on the paper", "artistic"),
                ],
            },
            Question {
                id: 3,
                context: "When a toy breaks".to_string(),
                text: "what does {child} do?".to_string(),
                options: vec![
                    opt("A", "Tries to fix it by finding where the piece fits", "logical"),
                    opt("B", "Asks for help and explains what happened", "explorer"),
                    opt("C", "Gets physically frustrated or throws it", "motor"),
                    opt("D", "Uses the broken pieces to invent something else", "artistic"),
                ],
            },
            Question {
                id: 4,
                context: "At the park".to_string(),
                text: "where does {child} spend most time?".to_string(),
                options: vec![
                    opt("A", "In the sandpit looking for stones or bugs", "explorer"),
                    opt("B", "On the swings, slides and climbing frames", "motor"),
                    opt("C", "Playing pretend stories with other children", "artistic"),
                    opt("D", "Watching how the seesaw works", "logical"),
                ],
            },
            Question {
                id: 5,
                context: "For activities at home".to_string(),
                text: "what does {child} prefer?".to_string(),
                options: vec![
                    opt("A", "Puzzles and building blocks", "logical"),
                    opt("B", "Dancing or movement games", "motor"),
                    opt("C", "Crafts with scissors and glue", "artistic"),
                    opt("D", "Listening to stories", "explorer"),
                ],
            },
        ])
    }
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self::default_bank()
    }
}
