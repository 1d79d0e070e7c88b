//! Per-item difficulty and discrimination, and the level cross-tabulation.

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::grading::GradingMatrix;
use crate::levels::{DifficultyLevel, DiscriminationLevel};
use crate::model::{AnswerKey, ItemId, Response, ResponseTable};
use crate::scoring::QuartileGroups;

/// Psychometric statistics for one item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStatistic {
    pub item: ItemId,
    pub key: Response,
    /// Students who answered correctly.
    pub correct: usize,
    /// Percent correct, full precision.
    pub difficulty: f64,
    /// Percent correct truncated toward zero, for display.
    pub difficulty_pct: u32,
    /// `None` when nobody answered correctly.
    pub difficulty_level: Option<DifficultyLevel>,
    /// Upper minus lower group correct count over the group size.
    /// `None` when the quartile groups are empty.
    pub discrimination: Option<f64>,
    /// `discrimination` rounded to two decimals (ties to even).
    pub discrimination_rounded: Option<f64>,
    /// `None` when `discrimination` is missing or exactly -1.
    pub discrimination_level: Option<DiscriminationLevel>,
}

impl ItemStatistic {
    /// Rounded discrimination with two decimals, or `"N/A"`.
    pub fn discrimination_label(&self) -> String {
        match self.discrimination_rounded {
            Some(d) => format!("{d:.2}"),
            None => "N/A".to_string(),
        }
    }

    pub fn difficulty_level_label(&self) -> String {
        self.difficulty_level
            .map_or_else(|| "N/A".to_string(), |l| l.to_string())
    }

    pub fn discrimination_level_label(&self) -> String {
        self.discrimination_level
            .map_or_else(|| "N/A".to_string(), |l| l.to_string())
    }
}

/// Compute difficulty and discrimination for every item, in column order.
///
/// Classification uses the full-precision values; only the `*_pct` and
/// `*_rounded` fields are lossy.
pub fn item_statistics(
    responses: &ResponseTable,
    key: &AnswerKey,
    grading: &GradingMatrix,
    groups: &QuartileGroups,
    config: &AnalysisConfig,
) -> Vec<ItemStatistic> {
    let n = grading.n_students();
    let q = groups.size();
    let difficulty_cuts = config.difficulty.cuts();
    let discrimination_cuts = config.discrimination.cuts();

    responses
        .items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let correct = grading.correct_count(i, 0..n);
            // (100 * c) / n keeps exact percentages exact, e.g. 1 of 5 is 20.0
            let (difficulty, difficulty_pct) = if n == 0 {
                (0.0, 0)
            } else {
                (
                    (100 * correct) as f64 / n as f64,
                    (100 * correct / n) as u32,
                )
            };

            let discrimination = (q > 0).then(|| {
                let upper = grading.correct_count(i, groups.upper.iter().copied());
                let lower = grading.correct_count(i, groups.lower.iter().copied());
                (upper as f64 - lower as f64) / q as f64
            });

            ItemStatistic {
                item: item.clone(),
                key: key.get(item).cloned().unwrap_or(Response::Blank),
                correct,
                difficulty,
                difficulty_pct,
                difficulty_level: DifficultyLevel::classify(difficulty, difficulty_cuts),
                discrimination,
                discrimination_rounded: discrimination.map(round2),
                discrimination_level: discrimination
                    .and_then(|d| DiscriminationLevel::classify(d, discrimination_cuts)),
            }
        })
        .collect()
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// One cell of the discrimination × difficulty grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTabCell {
    pub discrimination: DiscriminationLevel,
    pub difficulty: DifficultyLevel,
    pub items: Vec<ItemId>,
}

/// Items grouped by discrimination level (rows: poor, fair, good) and
/// difficulty level (columns: easy, medium, hard).
///
/// Always holds all nine cells in that order, empty or not. Items missing
/// either level are not placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossTab {
    pub cells: Vec<CrossTabCell>,
}

impl CrossTab {
    pub const PLACEHOLDER: &'static str = "-";

    pub fn build(stats: &[ItemStatistic]) -> Self {
        let cells = DiscriminationLevel::GRID_ORDER
            .iter()
            .flat_map(|&discrimination| {
                DifficultyLevel::GRID_ORDER
                    .iter()
                    .map(move |&difficulty| CrossTabCell {
                        discrimination,
                        difficulty,
                        items: stats
                            .iter()
                            .filter(|s| {
                                s.discrimination_level == Some(discrimination)
                                    && s.difficulty_level == Some(difficulty)
                            })
                            .map(|s| s.item.clone())
                            .collect(),
                    })
            })
            .collect();
        Self { cells }
    }

    pub fn cell(&self, discrimination: DiscriminationLevel, difficulty: DifficultyLevel) -> &[ItemId] {
        self.cells
            .iter()
            .find(|c| c.discrimination == discrimination && c.difficulty == difficulty)
            .map(|c| c.items.as_slice())
            .unwrap_or(&[])
    }

    /// Display text for a cell: item ids joined by `", "`, or `"-"` if empty.
    pub fn label(&self, discrimination: DiscriminationLevel, difficulty: DifficultyLevel) -> String {
        let items = self.cell(discrimination, difficulty);
        if items.is_empty() {
            Self::PLACEHOLDER.to_string()
        } else {
            items
                .iter()
                .map(ItemId::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::grade;
    use crate::model::RawTable;
    use crate::normalize::normalize;
    use crate::scoring::{partition, score_students};

    fn stats_for(rows: Vec<Vec<&str>>, config: &AnalysisConfig) -> Vec<ItemStatistic> {
        let table = normalize(&RawTable::from_cells(rows)).unwrap();
        let grading = grade(&table.responses, &table.key).unwrap();
        let scores = score_students(&table.responses, &grading);
        let groups = partition(&scores);
        item_statistics(&table.responses, &table.key, &grading, &groups, config)
    }

    #[test]
    fn difficulty_extremes() {
        let stats = stats_for(
            vec![
                vec!["A", "B"],
                vec!["A", "C"],
                vec!["A", "C"],
                vec!["A", "D"],
                vec!["A", "C"],
            ],
            &AnalysisConfig::default(),
        );
        assert_eq!(stats[0].difficulty, 100.0);
        assert_eq!(stats[0].difficulty_level, Some(DifficultyLevel::Easy));
        assert_eq!(stats[1].difficulty, 0.0);
        assert_eq!(stats[1].difficulty_pct, 0);
        assert_eq!(stats[1].difficulty_level, None);
        assert_eq!(stats[1].difficulty_level_label(), "N/A");
    }

    #[test]
    fn unclassified_items_stay_out_of_the_cross_tab() {
        // item 1: nobody correct, so difficulty 0 has no level even though DI is 0
        let stats = stats_for(
            vec![
                vec!["A", "B"],
                vec!["A", "C"],
                vec!["A", "C"],
                vec!["C", "D"],
                vec!["C", "C"],
            ],
            &AnalysisConfig::default(),
        );
        assert_eq!(stats[1].discrimination, Some(0.0));
        assert_eq!(stats[1].discrimination_level, Some(DiscriminationLevel::Poor));
        assert_eq!(stats[1].difficulty_level, None);

        let tab = CrossTab::build(&stats);
        let placed: Vec<&ItemId> = tab.cells.iter().flat_map(|c| &c.items).collect();
        assert_eq!(placed, vec![&ItemId::from("0")]);
        assert_eq!(tab.label(DiscriminationLevel::Poor, DifficultyLevel::Hard), "-");
    }

    #[test]
    fn fully_inverted_item_has_no_discrimination_level() {
        // 4 students, q = 1: the top scorer misses item 0, the bottom scorer gets it
        let stats = stats_for(
            vec![
                vec!["A", "B", "B"],
                vec!["C", "B", "B"],
                vec!["C", "B", "C"],
                vec!["C", "C", "B"],
                vec!["A", "C", "C"],
            ],
            &AnalysisConfig::default(),
        );
        assert_eq!(stats[0].discrimination, Some(-1.0));
        assert_eq!(stats[0].discrimination_level, None);
        assert_eq!(stats[0].discrimination_label(), "-1.00");
        assert_eq!(stats[0].discrimination_level_label(), "N/A");
        assert!(CrossTab::build(&stats)
            .cells
            .iter()
            .all(|c| !c.items.contains(&ItemId::from("0"))));
    }

    #[test]
    fn difficulty_at_threshold_is_the_lower_level() {
        // 1 of 5 correct = 20% = default low threshold
        let stats = stats_for(
            vec![
                vec!["A"],
                vec!["A"],
                vec!["B"],
                vec!["B"],
                vec!["B"],
                vec!["B"],
            ],
            &AnalysisConfig::default(),
        );
        assert_eq!(stats[0].difficulty, 20.0);
        assert_eq!(stats[0].difficulty_level, Some(DifficultyLevel::Hard));
    }

    #[test]
    fn difficulty_pct_truncates() {
        // 2 of 3 correct = 66.66...%
        let stats = stats_for(
            vec![vec!["A"], vec!["A"], vec!["A"], vec!["B"]],
            &AnalysisConfig::default(),
        );
        assert_eq!(stats[0].difficulty_pct, 66);
        assert!(stats[0].difficulty > 66.6);
    }

    #[test]
    fn perfect_discrimination() {
        // 4 students, q = 1. Student 1 aces both, student 4 misses both.
        let stats = stats_for(
            vec![
                vec!["A", "B"],
                vec!["A", "B"],
                vec!["A", "C"],
                vec!["C", "B"],
                vec!["C", "C"],
            ],
            &AnalysisConfig::default(),
        );
        assert_eq!(stats[0].discrimination, Some(1.0));
        assert_eq!(stats[0].discrimination_level, Some(DiscriminationLevel::Good));
        assert_eq!(stats[1].discrimination, Some(1.0));
        assert_eq!(stats[1].discrimination_label(), "1.00");
        assert_eq!(stats[1].discrimination_level_label(), "good");
    }

    #[test]
    fn discrimination_is_na_with_too_few_students() {
        let stats = stats_for(
            vec![vec!["A"], vec!["A"], vec!["B"], vec!["A"]],
            &AnalysisConfig::default(),
        );
        assert_eq!(stats[0].discrimination, None);
        assert_eq!(stats[0].discrimination_rounded, None);
        assert_eq!(stats[0].discrimination_level, None);
        assert_eq!(stats[0].discrimination_label(), "N/A");
    }

    #[test]
    fn rounding_ties_to_even() {
        assert_eq!(round2(0.125), 0.12);
        assert_eq!(round2(-0.375), -0.38);
        assert_eq!(round2(2.0 / 3.0), 0.67);
    }

    #[test]
    fn cross_tab_has_nine_cells_in_fixed_order() {
        let stats = stats_for(
            vec![
                vec!["A", "B"],
                vec!["A", "B"],
                vec!["A", "C"],
                vec!["C", "B"],
                vec!["C", "C"],
            ],
            &AnalysisConfig::default(),
        );
        let tab = CrossTab::build(&stats);
        let order: Vec<_> = tab
            .cells
            .iter()
            .map(|c| format!("{}/{}", c.discrimination, c.difficulty))
            .collect();
        assert_eq!(
            order,
            vec![
                "poor/easy", "poor/medium", "poor/hard", "fair/easy", "fair/medium", "fair/hard",
                "good/easy", "good/medium", "good/hard",
            ]
        );
        // both items: 50% correct, DI 1.0
        assert_eq!(
            tab.label(DiscriminationLevel::Good, DifficultyLevel::Medium),
            "0, 1"
        );
        assert_eq!(tab.label(DiscriminationLevel::Poor, DifficultyLevel::Easy), "-");
    }
}
