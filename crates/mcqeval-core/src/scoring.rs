//! Per-student scores and upper/lower quartile selection.

use serde::{Deserialize, Serialize};

use crate::grading::GradingMatrix;
use crate::model::{ResponseTable, StudentId};

/// Quartile group membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quartile {
    Upper,
    Lower,
}

/// Score breakdown for one student.
///
/// `correct + incorrect + blank` always equals the number of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentScore {
    pub student: StudentId,
    pub correct: u32,
    /// Wrong, non-blank answers.
    pub incorrect: u32,
    pub blank: u32,
    /// Quartile group, if the student belongs to one.
    #[serde(default)]
    pub quartile: Option<Quartile>,
}

/// Top and bottom `floor(n / 4)` students by score.
///
/// Students are ranked by score, highest first, with a stable sort: on equal
/// scores the student who appears earlier in the input ranks higher. `upper`
/// is the first `size` students of that ranking and `lower` the last `size`,
/// both in ranking order. Since `2 * floor(n / 4) <= n / 2` the two groups
/// never overlap. With fewer than four students both are empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuartileGroups {
    /// Row positions of the upper group in the response table.
    pub upper: Vec<usize>,
    /// Row positions of the lower group in the response table.
    pub lower: Vec<usize>,
}

impl QuartileGroups {
    pub fn size(&self) -> usize {
        self.upper.len()
    }

    pub fn is_empty(&self) -> bool {
        self.upper.is_empty()
    }

    pub fn membership(&self, student: usize) -> Option<Quartile> {
        if self.upper.contains(&student) {
            Some(Quartile::Upper)
        } else if self.lower.contains(&student) {
            Some(Quartile::Lower)
        } else {
            None
        }
    }
}

/// Summary of the score distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    pub students: usize,
    pub items: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with a single student.
    pub std_dev: Option<f64>,
    pub min: u32,
    pub max: u32,
    /// `(score, number of students)` for every score from `min` to `max`.
    pub histogram: Vec<(u32, usize)>,
}

/// Scores for every student in input order, without quartile membership.
pub fn score_students(responses: &ResponseTable, grading: &GradingMatrix) -> Vec<StudentScore> {
    let n_items = responses.n_items() as u32;
    responses
        .students()
        .iter()
        .enumerate()
        .map(|(s, student)| {
            let correct = grading.row(s).iter().filter(|&&c| c).count() as u32;
            let blank = responses.row(s).iter().filter(|r| r.is_blank()).count() as u32;
            StudentScore {
                student: student.clone(),
                correct,
                incorrect: n_items - correct - blank,
                blank,
                quartile: None,
            }
        })
        .collect()
}

/// Student positions sorted by score descending, ties in input order.
pub fn rank(scores: &[StudentScore]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    // sort_by_key is stable
    order.sort_by_key(|&s| std::cmp::Reverse(scores[s].correct));
    order
}

/// Select the upper and lower quartile groups.
pub fn partition(scores: &[StudentScore]) -> QuartileGroups {
    let ranked = rank(scores);
    let q = ranked.len() / 4;
    QuartileGroups {
        upper: ranked[..q].to_vec(),
        lower: ranked[ranked.len() - q..].to_vec(),
    }
}

/// Tag each score with its quartile group.
pub fn assign_quartiles(scores: &mut [StudentScore], groups: &QuartileGroups) {
    for (s, score) in scores.iter_mut().enumerate() {
        score.quartile = groups.membership(s);
    }
}

/// Mean, spread and histogram of the scores. `None` for an empty slice.
pub fn summarize(scores: &[StudentScore], items: usize) -> Option<ScoreSummary> {
    let min = scores.iter().map(|s| s.correct).min()?;
    let max = scores.iter().map(|s| s.correct).max()?;
    let n = scores.len() as f64;

    let mean = scores.iter().map(|s| s.correct as f64).sum::<f64>() / n;
    let std_dev = (scores.len() > 1).then(|| {
        let ss = scores
            .iter()
            .map(|s| (s.correct as f64 - mean).powi(2))
            .sum::<f64>();
        (ss / (n - 1.0)).sqrt()
    });

    let histogram = (min..=max)
        .map(|score| (score, scores.iter().filter(|s| s.correct == score).count()))
        .collect();

    Some(ScoreSummary {
        students: scores.len(),
        items,
        mean,
        std_dev,
        min,
        max,
        histogram,
    })
}
