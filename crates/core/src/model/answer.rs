use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::model::test::Question;

/// Answer state for one question.
///
/// The variant is fixed when the sheet is created from the question's
/// `multiple_answer` flag and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Single(Option<usize>),
    Multi(BTreeSet<usize>),
}

impl Answer {
    /// Unanswered state matching the question's shape.
    #[must_use]
    pub fn empty_for(question: &Question) -> Self {
        if question.is_multiple_answer() {
            Self::Multi(BTreeSet::new())
        } else {
            Self::Single(None)
        }
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        match self {
            Self::Single(choice) => choice.is_some(),
            Self::Multi(choices) => !choices.is_empty(),
        }
    }

    #[must_use]
    pub fn is_multi(&self) -> bool {
        matches!(self, Self::Multi(_))
    }

    #[must_use]
    pub fn contains(&self, option: usize) -> bool {
        match self {
            Self::Single(choice) => *choice == Some(option),
            Self::Multi(choices) => choices.contains(&option),
        }
    }

    /// Whether this answer has the shape `question` expects and only
    /// references options that exist.
    #[must_use]
    pub fn fits(&self, question: &Question) -> bool {
        let count = question.option_count();
        match self {
            Self::Single(choice) => {
                !question.is_multiple_answer() && choice.is_none_or(|c| c < count)
            }
            Self::Multi(choices) => {
                question.is_multiple_answer() && choices.iter().all(|c| *c < count)
            }
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Single(choice) => *choice = None,
            Self::Multi(choices) => choices.clear(),
        }
    }
}

/// Answers kept parallel to a test's question list.
///
/// Serializes to the wire shape `Array<number | number[] | null>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(Vec<Answer>);

impl AnswerSheet {
    #[must_use]
    pub fn for_questions(questions: &[Question]) -> Self {
        Self(questions.iter().map(Answer::empty_for).collect())
    }

    /// Rebuild a sheet from previously stored answers.
    ///
    /// Returns `None` unless every answer fits the corresponding question.
    #[must_use]
    pub fn restore(questions: &[Question], answers: Vec<Answer>) -> Option<Self> {
        if answers.len() != questions.len() {
            return None;
        }
        if answers.iter().zip(questions).all(|(a, q)| a.fits(q)) {
            Some(Self(answers))
        } else {
            None
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Answer> {
        self.0.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Answer> {
        self.0.get_mut(index)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Answer] {
        &self.0
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.0.iter().filter(|a| a.is_answered()).count()
    }

    #[must_use]
    pub fn first_unanswered(&self) -> Option<usize> {
        self.0.iter().position(|a| !a.is_answered())
    }

    pub(crate) fn clear_all(&mut self) {
        self.0.iter_mut().for_each(Answer::clear);
    }
}
