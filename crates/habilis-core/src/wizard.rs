//! Quiz wizard state machine.
//!
//! The wizard is a pure transition function over an owned state value. It
//! does not render anything and holds no per-run data itself; callers keep
//! the current [`WizardState`] and feed it back with the next event.
//!
//! ## State Transitions
//!
//! ```text
//! CollectingChildInfo --SubmitChildInfo--> AnsweringQuestions
//! AnsweringQuestions  --Answer (last)----> ShowingResult
//! ShowingResult       --ProceedToCheckout-> Checkout
//! any                 --Restart----------> CollectingChildInfo
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let wizard = Wizard::new(QuestionBank::default_bank(), resolver)?;
//! let state = wizard.transition(WizardState::default(), WizardEvent::SubmitChildInfo {
//!     name: "Lucia".into(),
//!     age: 5,
//! })?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, WizardError};
use crate::profile::{ProfileLabel, ProfileResolver, Resolution};
use crate::quiz::QuestionBank;

/// Youngest and oldest accepted child age.
pub const MIN_CHILD_AGE: u8 = 1;
pub const MAX_CHILD_AGE: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildInfo {
    pub name: String,
    pub age: u8,
}

impl ChildInfo {
    /// Trim and validate raw form input.
    pub fn parse(name: &str, age: u8) -> Result<Self, WizardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(WizardError::InvalidChildInfo(
                "child name must not be blank".to_string(),
            ));
        }
        if !(MIN_CHILD_AGE..=MAX_CHILD_AGE).contains(&age) {
            return Err(WizardError::InvalidChildInfo(format!(
                "age must be between {MIN_CHILD_AGE} and {MAX_CHILD_AGE}, got {age}"
            )));
        }
        Ok(Self {
            name: name.to_string(),
            age,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum WizardState {
    CollectingChildInfo,
    AnsweringQuestions {
        child: ChildInfo,
        answers: Vec<ProfileLabel>,
    },
    ShowingResult {
        child: ChildInfo,
        answers: Vec<ProfileLabel>,
        resolution: Resolution,
    },
    Checkout {
        child: ChildInfo,
        resolution: Resolution,
    },
}

impl Default for WizardState {
    fn default() -> Self {
        Self::CollectingChildInfo
    }
}

impl WizardState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::CollectingChildInfo => "collecting_child_info",
            Self::AnsweringQuestions { .. } => "answering_questions",
            Self::ShowingResult { .. } => "showing_result",
            Self::Checkout { .. } => "checkout",
        }
    }

    /// Progress-bar step, 1..=4.
    pub fn step(&self) -> u8 {
        match self {
            Self::CollectingChildInfo => 1,
            Self::AnsweringQuestions { .. } => 2,
            Self::ShowingResult { .. } => 3,
            Self::Checkout { .. } => 4,
        }
    }

    /// Index of the question awaiting an answer.
    pub fn current_question(&self) -> Option<usize> {
        match self {
            Self::AnsweringQuestions { answers, .. } => Some(answers.len()),
            _ => None,
        }
    }

    pub fn child(&self) -> Option<&ChildInfo> {
        match self {
            Self::CollectingChildInfo => None,
            Self::AnsweringQuestions { child, .. }
            | Self::ShowingResult { child, .. }
            | Self::Checkout { child, .. } => Some(child),
        }
    }

    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            Self::ShowingResult { resolution, .. } | Self::Checkout { resolution, .. } => {
                Some(resolution)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WizardEvent {
    SubmitChildInfo { name: String, age: u8 },
    Answer { letter: String },
    ProceedToCheckout,
    Restart,
}

impl WizardEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitChildInfo { .. } => "submit_child_info",
            Self::Answer { .. } => "answer",
            Self::ProceedToCheckout => "proceed_to_checkout",
            Self::Restart => "restart",
        }
    }
}

/// Question bank plus resolver; drives [`WizardState`] transitions.
#[derive(Debug, Clone)]
pub struct Wizard {
    bank: QuestionBank,
    resolver: ProfileResolver,
}

impl Wizard {
    /// Pair a bank with a resolver, checking that every answer can be mapped.
    pub fn new(bank: QuestionBank, resolver: ProfileResolver) -> Result<Self, ConfigError> {
        bank.validate(&resolver)?;
        Ok(Self { bank, resolver })
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    pub fn resolver(&self) -> &ProfileResolver {
        &self.resolver
    }

    /// Apply `event` to `state`, returning the next state.
    ///
    /// # Errors
    ///
    /// Returns [`WizardError::InvalidTransition`] when the event is not
    /// accepted in `state`, and validation errors for bad child info or an
    /// unknown option letter. The input state is consumed either way; keep a
    /// clone if a rejected event must leave it in place.
    pub fn transition(
        &self,
        state: WizardState,
        event: WizardEvent,
    ) -> Result<WizardState, WizardError> {
        let from = state.name();
        let event_name = event.name();

        let next = match (state, event) {
            (_, WizardEvent::Restart) => WizardState::CollectingChildInfo,

            (WizardState::CollectingChildInfo, WizardEvent::SubmitChildInfo { name, age }) => {
                WizardState::AnsweringQuestions {
                    child: ChildInfo::parse(&name, age)?,
                    answers: Vec::new(),
                }
            }

            (
                WizardState::AnsweringQuestions { child, mut answers },
                WizardEvent::Answer { letter },
            ) => {
                let index = answers.len();
                let option = self.bank.option(index, &letter).ok_or_else(|| {
                    WizardError::UnknownOption {
                        question: index,
                        letter: letter.clone(),
                    }
                })?;
                answers.push(option.profile.clone());

                if answers.len() < self.bank.len() {
                    WizardState::AnsweringQuestions { child, answers }
                } else {
                    let resolution = self.resolver.resolution(&answers)?;
                    WizardState::ShowingResult {
                        child,
                        answers,
                        resolution,
                    }
                }
            }

            (
                WizardState::ShowingResult { child, resolution, .. },
                WizardEvent::ProceedToCheckout,
            ) => WizardState::Checkout { child, resolution },

            _ => {
                return Err(WizardError::InvalidTransition {
                    state: from,
                    event: event_name,
                })
            }
        };

        tracing::debug!(from, event = event_name, to = next.name(), "wizard transition");
        Ok(next)
    }

    /// Fold a sequence of events over `state`, stopping at the first error.
    pub fn run(
        &self,
        state: WizardState,
        events: impl IntoIterator<Item = WizardEvent>,
    ) -> Result<WizardState, WizardError> {
        events
            .into_iter()
            .try_fold(state, |state, event| self.transition(state, event))
    }
}
