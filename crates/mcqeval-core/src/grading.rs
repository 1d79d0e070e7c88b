//! Compare every response against the answer key.

use crate::error::AnalysisError;
use crate::model::{AnswerKey, Response, ResponseTable};

/// Boolean correctness per (student, item), same shape as the response table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradingMatrix {
    n_students: usize,
    n_items: usize,
    // row-major, one entry per response cell
    correct: Vec<bool>,
}

impl GradingMatrix {
    pub fn n_items(&self) -> usize {
        self.n_items
    }

    pub fn n_students(&self) -> usize {
        self.n_students
    }

    pub fn is_correct(&self, student: usize, item: usize) -> bool {
        self.correct[student * self.n_items + item]
    }

    pub fn row(&self, student: usize) -> &[bool] {
        &self.correct[student * self.n_items..(student + 1) * self.n_items]
    }

    /// Number of correct responses to `item` among the given students.
    pub fn correct_count<I>(&self, item: usize, students: I) -> usize
    where
        I: IntoIterator<Item = usize>,
    {
        students
            .into_iter()
            .filter(|&s| self.is_correct(s, item))
            .count()
    }
}

/// Grade a response table against a key.
///
/// A cell is correct iff it is an answer equal (case-sensitive, exact) to the
/// key for its item. Blanks are never correct. Every item column must have a
/// key entry; a missing one fails the whole pass.
pub fn grade(responses: &ResponseTable, key: &AnswerKey) -> Result<GradingMatrix, AnalysisError> {
    let keys: Vec<&Response> = responses
        .items()
        .iter()
        .map(|item| {
            key.get(item)
                .ok_or_else(|| AnalysisError::MissingKey { item: item.clone() })
        })
        .collect::<Result<_, _>>()?;

    let correct = (0..responses.n_students())
        .flat_map(|s| {
            responses
                .row(s)
                .iter()
                .zip(&keys)
                .map(|(response, key)| response.matches(key))
        })
        .collect();

    Ok(GradingMatrix {
        n_students: responses.n_students(),
        n_items: responses.n_items(),
        correct,
    })
}
