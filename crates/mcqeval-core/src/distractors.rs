//! Response frequency tables per item, overall and by quartile group.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::model::{AnswerKey, ItemId, Response, ResponseTable};
use crate::scoring::QuartileGroups;

/// How often one response was chosen for an item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceFrequency {
    pub response: Response,
    pub overall: usize,
    pub upper: usize,
    pub lower: usize,
    /// This row is the correct response.
    pub is_key: bool,
}

/// Frequency table for one item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDistractors {
    pub item: ItemId,
    pub key: Response,
    /// Sorted by token, blank last.
    pub choices: Vec<ChoiceFrequency>,
}

impl ItemDistractors {
    pub fn key_choice(&self) -> Option<&ChoiceFrequency> {
        self.choices.iter().find(|c| c.is_key)
    }

    /// Overall count for one response, zero if nobody chose it.
    pub fn count(&self, response: &Response) -> usize {
        self.choices
            .iter()
            .find(|c| &c.response == response)
            .map_or(0, |c| c.overall)
    }
}

/// Tabulate responses for one item.
///
/// Fails this item with [`AnalysisError::KeyNotFound`] when the key is
/// blank, missing, or chosen by no student, since it cannot be marked.
pub fn item_distractors(
    responses: &ResponseTable,
    key: &AnswerKey,
    groups: &QuartileGroups,
    item: usize,
) -> Result<ItemDistractors, AnalysisError> {
    let item_id = &responses.items()[item];
    let key_response = match key.get(item_id) {
        Some(k) if !k.is_blank() => k,
        _ => {
            return Err(AnalysisError::KeyNotFound {
                item: item_id.clone(),
            })
        }
    };

    // BTreeMap over Response gives token order with Blank last
    let mut counts: BTreeMap<&Response, [usize; 3]> = BTreeMap::new();
    for response in responses.column(item) {
        counts.entry(response).or_default()[0] += 1;
    }
    if !counts.contains_key(key_response) {
        return Err(AnalysisError::KeyNotFound {
            item: item_id.clone(),
        });
    }
    for &s in &groups.upper {
        counts.entry(responses.response(s, item)).or_default()[1] += 1;
    }
    for &s in &groups.lower {
        counts.entry(responses.response(s, item)).or_default()[2] += 1;
    }

    let choices = counts
        .into_iter()
        .map(|(response, [overall, upper, lower])| ChoiceFrequency {
            response: response.clone(),
            overall,
            upper,
            lower,
            is_key: response == key_response,
        })
        .collect();

    Ok(ItemDistractors {
        item: item_id.clone(),
        key: key_response.clone(),
        choices,
    })
}

/// Tabulate every item. Items whose key cannot be marked come back as `Err`
/// in their column position; the others are unaffected.
pub fn analyze_distractors(
    responses: &ResponseTable,
    key: &AnswerKey,
    groups: &QuartileGroups,
) -> Vec<Result<ItemDistractors, AnalysisError>> {
    (0..responses.n_items())
        .map(|i| item_distractors(responses, key, groups, i))
        .collect()
}

/// Every response seen across the given items, sorted with blank last.
/// These are the columns of a wide items × responses table.
pub fn choice_columns(items: &[ItemDistractors]) -> Vec<Response> {
    items
        .iter()
        .flat_map(|d| d.choices.iter().map(|c| c.response.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::grade;
    use crate::model::RawTable;
    use crate::normalize::{normalize, NormalizedTable};
    use crate::scoring::{partition, score_students};

    fn setup(raw: RawTable) -> (NormalizedTable, QuartileGroups) {
        let table = normalize(&raw).unwrap();
        let grading = grade(&table.responses, &table.key).unwrap();
        let groups = partition(&score_students(&table.responses, &grading));
        (table, groups)
    }

    #[test]
    fn counts_sorted_with_blank_last_and_key_flagged() {
        let raw = RawTable::new(vec![
            vec![Some("B".into())],
            vec![None],
            vec![Some("a".into())],
            vec![Some("C".into())],
            vec![Some("B".into())],
            vec![Some("B".into())],
            vec![Some("A".into())],
            vec![Some("C".into())],
            vec![Some("B".into())],
        ]);
        let (table, groups) = setup(raw);
        let d = item_distractors(&table.responses, &table.key, &groups, 0).unwrap();

        let order: Vec<String> = d.choices.iter().map(|c| c.response.to_string()).collect();
        assert_eq!(order, vec!["A", "B", "C", "a", "(blank)"]);

        let key = d.key_choice().unwrap();
        assert_eq!(key.response, Response::from("B"));
        assert_eq!(key.overall, 3);

        let total: usize = d.choices.iter().map(|c| c.overall).sum();
        assert_eq!(total, table.responses.n_students());
        let grouped: usize = d.choices.iter().map(|c| c.upper + c.lower).sum();
        assert_eq!(grouped, 2 * groups.size());
        assert_eq!(d.choices.iter().filter(|c| !c.is_key).count(), 4);
    }

    #[test]
    fn key_nobody_chose_fails_that_item() {
        let raw = RawTable::from_cells(vec![
            vec!["D", "B"],
            vec!["A", "B"],
            vec!["B", "C"],
            vec!["A", "B"],
            vec!["B", "B"],
        ]);
        let (table, groups) = setup(raw);
        let results = analyze_distractors(&table.responses, &table.key, &groups);
        assert_eq!(
            results[0].as_ref().unwrap_err(),
            &AnalysisError::KeyNotFound { item: "0".into() }
        );
        assert!(results[1].is_ok());
    }

    #[test]
    fn header_row_left_in_data_fails_every_item() {
        let raw = RawTable::from_cells(vec![
            vec!["Q1", "Q2"],
            vec!["A", "B"],
            vec!["A", "C"],
            vec!["B", "B"],
            vec!["A", "B"],
        ]);
        let (table, groups) = setup(raw);
        let results = analyze_distractors(&table.responses, &table.key, &groups);
        assert!(results
            .iter()
            .all(|r| matches!(r, Err(AnalysisError::KeyNotFound { .. }))));
    }

    #[test]
    fn blank_key_fails_only_that_item() {
        let raw = RawTable::new(vec![
            vec![Some("A".into()), None],
            vec![Some("A".into()), Some("B".into())],
            vec![Some("C".into()), Some("B".into())],
        ]);
        let (table, groups) = setup(raw);
        let results = analyze_distractors(&table.responses, &table.key, &groups);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().unwrap_err(),
            &AnalysisError::KeyNotFound { item: "1".into() }
        );
    }

    #[test]
    fn group_counts_follow_quartiles() {
        // key A; scores equal the item score so ranking is 1,2 (A) then 3,4 (B)
        let raw = RawTable::from_cells(vec![vec!["A"], vec!["A"], vec!["A"], vec!["B"], vec!["B"]]);
        let (table, groups) = setup(raw);
        let d = item_distractors(&table.responses, &table.key, &groups, 0).unwrap();
        let a = &d.choices[0];
        let b = &d.choices[1];
        assert_eq!((a.overall, a.upper, a.lower), (2, 1, 0));
        assert_eq!((b.overall, b.upper, b.lower), (2, 0, 1));
    }

    #[test]
    fn wide_columns_union_all_items() {
        let raw = RawTable::new(vec![
            vec![Some("A".into()), Some("D".into())],
            vec![Some("A".into()), None],
            vec![Some("B".into()), Some("C".into())],
            vec![Some("C".into()), Some("D".into())],
        ]);
        let (table, groups) = setup(raw);
        let all: Vec<_> = analyze_distractors(&table.responses, &table.key, &groups)
            .into_iter()
            .map(Result::unwrap)
            .collect();
        let columns: Vec<String> = choice_columns(&all).iter().map(ToString::to_string).collect();
        assert_eq!(columns, vec!["A", "B", "C", "D", "(blank)"]);
        assert_eq!(all[1].count(&Response::Blank), 1);
        assert_eq!(all[0].count(&Response::from("D")), 0);
    }
}
