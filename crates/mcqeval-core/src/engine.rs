//! Central analysis pipeline.
//!
//! Runs normalize, grade, score, partition, item statistics and distractor
//! tabulation in order, and collects the results into one [`Analysis`].

use serde::{Deserialize, Serialize};

use crate::config::AnalysisConfig;
use crate::diagnostics::{score_diagnostics, table_diagnostics, Diagnostic};
use crate::distractors::{analyze_distractors, ItemDistractors};
use crate::error::AnalysisError;
use crate::grading::grade;
use crate::items::{item_statistics, CrossTab, ItemStatistic};
use crate::model::{AnswerKey, ItemId, RawTable, ResponseTable, StudentId};
use crate::normalize::normalize;
use crate::scoring::{assign_quartiles, partition, score_students, summarize, ScoreSummary, StudentScore};

/// A quartile group as reported: member ids with their scores, in rank order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuartileMember {
    pub student: StudentId,
    pub correct: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuartileSummary {
    /// `floor(students / 4)`.
    pub size: usize,
    pub upper: Vec<QuartileMember>,
    pub lower: Vec<QuartileMember>,
}

/// An item whose part of the analysis failed. The other items are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub item: ItemId,
    pub message: String,
}

/// Full result of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub items: Vec<ItemId>,
    pub students: Vec<StudentId>,
    /// Per-student scores in input order.
    pub scores: Vec<StudentScore>,
    pub summary: ScoreSummary,
    pub quartiles: QuartileSummary,
    /// Per-item statistics in column order.
    pub item_stats: Vec<ItemStatistic>,
    pub cross_tab: CrossTab,
    /// Frequency tables for the items whose key could be marked.
    pub distractors: Vec<ItemDistractors>,
    #[serde(default)]
    pub failures: Vec<ItemFailure>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl Analysis {
    pub fn item_distractors(&self, item: &ItemId) -> Option<&ItemDistractors> {
        self.distractors.iter().find(|d| &d.item == item)
    }
}

/// Runs analysis passes with a validated configuration.
#[derive(Debug, Clone)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze a raw table whose first row is the answer key.
    pub fn analyze(&self, raw: &RawTable) -> Result<Analysis, AnalysisError> {
        let table = normalize(raw)?;
        let mut analysis = self.analyze_table(&table.key, &table.responses)?;

        let mut diagnostics = table_diagnostics(raw);
        for d in &diagnostics {
            tracing::warn!("{d} ({})", d.hint());
        }
        diagnostics.append(&mut analysis.diagnostics);
        analysis.diagnostics = diagnostics;
        Ok(analysis)
    }

    /// Analyze an already split key and response table.
    pub fn analyze_table(
        &self,
        key: &AnswerKey,
        responses: &ResponseTable,
    ) -> Result<Analysis, AnalysisError> {
        tracing::debug!(
            students = responses.n_students(),
            items = responses.n_items(),
            "starting analysis"
        );

        let grading = grade(responses, key)?;
        let mut scores = score_students(responses, &grading);
        let summary = summarize(&scores, responses.n_items()).ok_or(AnalysisError::NoStudents)?;

        let groups = partition(&scores);
        assign_quartiles(&mut scores, &groups);
        tracing::debug!(size = groups.size(), "quartile groups selected");

        let members = |rows: &[usize]| -> Vec<QuartileMember> {
            rows.iter()
                .map(|&s| QuartileMember {
                    student: scores[s].student.clone(),
                    correct: scores[s].correct,
                })
                .collect()
        };
        let quartiles = QuartileSummary {
            size: groups.size(),
            upper: members(&groups.upper),
            lower: members(&groups.lower),
        };

        let item_stats = item_statistics(responses, key, &grading, &groups, &self.config);
        let cross_tab = CrossTab::build(&item_stats);

        let mut distractors = Vec::new();
        let mut failures = Vec::new();
        for result in analyze_distractors(responses, key, &groups) {
            match result {
                Ok(d) => distractors.push(d),
                Err(e) if e.is_item_scoped() => {
                    tracing::warn!("{e}");
                    if let Some(item) = e.item() {
                        failures.push(ItemFailure {
                            item: item.clone(),
                            message: e.to_string(),
                        });
                    }
                }
                Err(e) => return Err(e),
            }
        }

        let diagnostics = score_diagnostics(&scores);
        for d in &diagnostics {
            tracing::warn!("{d} ({})", d.hint());
        }

        tracing::debug!(
            mean = summary.mean,
            failures = failures.len(),
            "analysis complete"
        );

        Ok(Analysis {
            items: responses.items().to_vec(),
            students: responses.students().to_vec(),
            scores,
            summary,
            quartiles,
            item_stats,
            cross_tab,
            distractors,
            failures,
            diagnostics,
        })
    }
}

/// One-shot analysis of a raw table.
pub fn analyze(raw: &RawTable, config: &AnalysisConfig) -> Result<Analysis, AnalysisError> {
    Analyzer::new(*config)?.analyze(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;
    use crate::levels::{DifficultyLevel, DiscriminationLevel};
    use crate::model::Response;
    use crate::scoring::Quartile;

    /// Key plus eight students over two items.
    fn eight_students() -> RawTable {
        RawTable::from_cells(vec![
            vec!["A", "B"],
            vec!["A", "B"],
            vec!["A", "B"],
            vec!["A", "B"],
            vec!["A", "C"],
            vec!["A", "B"],
            vec!["A", "C"],
            vec!["C", "B"],
            vec!["D", "C"],
        ])
    }

    #[test]
    fn full_pipeline_on_eight_students() {
        let analysis = analyze(&eight_students(), &AnalysisConfig::default()).unwrap();

        assert_eq!(analysis.students.len(), 8);
        assert_eq!(analysis.quartiles.size, 2);

        let upper: Vec<&str> = analysis.quartiles.upper.iter().map(|m| m.student.as_str()).collect();
        let lower: Vec<&str> = analysis.quartiles.lower.iter().map(|m| m.student.as_str()).collect();
        assert_eq!(upper, vec!["1", "2"]);
        assert_eq!(lower, vec!["7", "8"]);

        let q0 = &analysis.item_stats[0];
        assert_eq!(q0.difficulty, 75.0);
        assert_eq!(q0.difficulty_level, Some(DifficultyLevel::Easy));
        // upper 2/2, lower 0/2
        assert_eq!(q0.discrimination, Some(1.0));
        assert_eq!(q0.discrimination_level, Some(DiscriminationLevel::Good));

        let q1 = &analysis.item_stats[1];
        assert_eq!(q1.difficulty, 62.5);
        assert_eq!(q1.difficulty_level, Some(DifficultyLevel::Medium));
        // upper 2/2, lower 1/2
        assert_eq!(q1.discrimination, Some(0.5));

        assert_eq!(
            analysis.cross_tab.label(DiscriminationLevel::Good, DifficultyLevel::Easy),
            "0"
        );
        assert_eq!(
            analysis.cross_tab.label(DiscriminationLevel::Good, DifficultyLevel::Medium),
            "1"
        );
        assert!(analysis.failures.is_empty());
        assert_eq!(analysis.scores[0].quartile, Some(Quartile::Upper));
        assert_eq!(analysis.scores[7].quartile, Some(Quartile::Lower));
        assert_eq!(analysis.scores[3].quartile, None);
    }

    #[test]
    fn blank_answers_count_against_difficulty() {
        let raw = RawTable::new(vec![
            vec![Some("A".into()), Some("B".into())],
            vec![Some("A".into()), Some("B".into())],
            vec![Some("A".into()), Some("B".into())],
            vec![Some("B".into()), Some("B".into())],
            vec![Some("A".into()), Some("A".into())],
            vec![Some("A".into()), Some("B".into())],
            vec![Some("B".into()), Some("B".into())],
            vec![Some("A".into()), Some("B".into())],
            vec![Some("A".into()), None],
        ]);
        let analysis = analyze(&raw, &AnalysisConfig::default()).unwrap();

        assert_eq!(analysis.item_stats[0].difficulty, 75.0);
        assert_eq!(analysis.item_stats[1].difficulty, 75.0);
        assert_eq!(analysis.quartiles.size, 2);
        assert_eq!(analysis.scores[7].blank, 1);
        assert_eq!(analysis.scores[7].incorrect, 0);

        // ranking 1,2,5,7 (score 2) then 3,4,6,8 (score 1)
        let lower: Vec<&str> = analysis.quartiles.lower.iter().map(|m| m.student.as_str()).collect();
        assert_eq!(lower, vec!["6", "8"]);
        assert_eq!(analysis.item_stats[0].discrimination, Some(0.5));
        assert_eq!(analysis.item_stats[1].discrimination, Some(0.5));
    }

    #[test]
    fn analysis_is_idempotent() {
        let config = AnalysisConfig::default();
        let a = analyze(&eight_students(), &config).unwrap();
        let b = analyze(&eight_students(), &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn invalid_config_is_rejected_before_reading_data() {
        let mut config = AnalysisConfig::default();
        config.difficulty.low = 80;
        let err = analyze(&RawTable::default(), &config).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::Config(ConfigError::InvalidDifficulty { low: 80, high: 70 })
        ));
    }

    #[test]
    fn blank_key_is_an_item_failure() {
        let raw = RawTable::new(vec![
            vec![Some("A".into()), None],
            vec![Some("A".into()), Some("B".into())],
            vec![Some("B".into()), Some("B".into())],
        ]);
        let analysis = analyze(&raw, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.distractors.len(), 1);
        assert_eq!(analysis.failures.len(), 1);
        assert_eq!(analysis.failures[0].item.as_str(), "1");
        // the blank key matches nobody
        assert_eq!(analysis.item_stats[1].correct, 0);
        assert_eq!(analysis.item_stats[1].key, Response::Blank);
    }

    #[test]
    fn unsplit_header_row_fails_every_item() {
        let raw = RawTable::from_cells(vec![
            vec!["Q1", "Q2"],
            vec!["A", "B"],
            vec!["A", "C"],
            vec!["B", "B"],
            vec!["A", "B"],
        ]);
        let analysis = analyze(&raw, &AnalysisConfig::default()).unwrap();
        assert!(analysis.distractors.is_empty());
        let failed: Vec<&str> = analysis.failures.iter().map(|f| f.item.as_str()).collect();
        assert_eq!(failed, vec!["0", "1"]);
        assert!(analysis.diagnostics.contains(&Diagnostic::FirstRowLooksLikeHeader));
        assert!(analysis.diagnostics.contains(&Diagnostic::AllScoresZero));
        // nobody matches the header cells, so no item gets a level
        assert!(analysis.item_stats.iter().all(|s| s.difficulty_level.is_none()));
    }

    #[test]
    fn small_class_gets_na_discrimination_and_a_warning() {
        let raw = RawTable::from_cells(vec![vec!["A", "B"], vec!["A", "B"], vec!["C", "B"]]);
        let analysis = analyze(&raw, &AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.quartiles.size, 0);
        assert!(analysis.item_stats.iter().all(|s| s.discrimination.is_none()));
        assert!(analysis
            .cross_tab
            .cells
            .iter()
            .all(|c| c.items.is_empty()));
        assert!(analysis
            .diagnostics
            .contains(&Diagnostic::TooFewStudents { students: 2 }));
    }

    #[test]
    fn structural_errors_abort() {
        let config = AnalysisConfig::default();
        assert_eq!(
            analyze(&RawTable::default(), &config).unwrap_err(),
            AnalysisError::EmptyTable
        );
        let key_only = RawTable::from_cells(vec![vec!["A", "B"]]);
        assert_eq!(analyze(&key_only, &config).unwrap_err(), AnalysisError::NoStudents);
    }

    #[test]
    fn analysis_round_trips_through_json() {
        let analysis = analyze(&eight_students(), &AnalysisConfig::default()).unwrap();
        let json = serde_json::to_string(&analysis).unwrap();
        let back: Analysis = serde_json::from_str(&json).unwrap();
        assert_eq!(back.scores, analysis.scores);
        assert_eq!(back.quartiles, analysis.quartiles);
        assert_eq!(back.cross_tab, analysis.cross_tab);
        assert_eq!(back.distractors, analysis.distractors);
        assert_eq!(back.diagnostics, analysis.diagnostics);
    }
}
