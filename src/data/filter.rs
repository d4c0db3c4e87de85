use std::collections::BTreeSet;

use super::model::{sort_weight_classes, Field, TestedStatus, TidyRecord, TidyTable};

pub const MALE: &str = "Male";
pub const FEMALE: &str = "Female";

// ---------------------------------------------------------------------------
// Filter state: what the user has selected
// ---------------------------------------------------------------------------

/// Tested-division selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestedFilter {
    #[default]
    All,
    Tested,
    Untested,
}

impl TestedFilter {
    pub const ALL: [TestedFilter; 3] = [
        TestedFilter::All,
        TestedFilter::Tested,
        TestedFilter::Untested,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TestedFilter::All => "All",
            TestedFilter::Tested => "Tested",
            TestedFilter::Untested => "Untested",
        }
    }

    fn matches(self, tested: &str) -> bool {
        let wanted = match self {
            TestedFilter::All => return true,
            TestedFilter::Tested => TestedStatus::Tested,
            TestedFilter::Untested => TestedStatus::Untested,
        };
        tested.to_lowercase() == wanted.as_str().to_lowercase()
    }
}

/// Per-session selections. An empty set means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Free text; only consulted in [`FilterMode::SearchOverride`].
    pub search: String,
    pub sexes: BTreeSet<String>,
    pub age_categories: BTreeSet<String>,
    pub male_weight_classes: BTreeSet<String>,
    pub female_weight_classes: BTreeSet<String>,
    pub equipment: BTreeSet<String>,
    pub tested: TestedFilter,
}

impl FilterState {
    /// Clear every selection.
    pub fn reset(&mut self) {
        *self = FilterState::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == FilterState::default()
    }

    /// Weight-class set that applies to the current sex selection:
    /// exactly {Female} → female set, exactly {Male} → male set, anything
    /// else → union of both.
    pub fn active_weight_classes(&self) -> BTreeSet<&str> {
        let only = |sex: &str| self.sexes.len() == 1 && self.sexes.contains(sex);
        if only(FEMALE) {
            self.female_weight_classes.iter().map(String::as_str).collect()
        } else if only(MALE) {
            self.male_weight_classes.iter().map(String::as_str).collect()
        } else {
            self.all_weight_classes()
        }
    }

    fn all_weight_classes(&self) -> BTreeSet<&str> {
        self.male_weight_classes
            .iter()
            .chain(&self.female_weight_classes)
            .map(String::as_str)
            .collect()
    }
}

/// Which generation of filtering rules to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    /// Weight classes chosen per sex; search is ignored.
    #[default]
    SexPartitioned,
    /// A non-empty search overrides every other selection; otherwise a single
    /// weight-class set applies regardless of sex.
    SearchOverride,
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

fn in_set(selected: &BTreeSet<String>, value: &str) -> bool {
    selected.is_empty() || selected.contains(value)
}

fn matches_search(record: &TidyRecord, needle: &str) -> bool {
    Field::SEARCHABLE
        .iter()
        .any(|&f| record.get(f).to_lowercase().contains(needle))
}

/// Return indices of records that pass the filter, in table order.
pub fn filtered_indices(table: &TidyTable, state: &FilterState, mode: FilterMode) -> Vec<usize> {
    let weight_classes = match mode {
        FilterMode::SexPartitioned => state.active_weight_classes(),
        FilterMode::SearchOverride => {
            let needle = state.search.trim().to_lowercase();
            if !needle.is_empty() {
                return table
                    .records
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| matches_search(r, &needle))
                    .map(|(i, _)| i)
                    .collect();
            }
            state.all_weight_classes()
        }
    };

    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, r)| {
            in_set(&state.sexes, &r.sex)
                && in_set(&state.age_categories, &r.age_category)
                && (weight_classes.is_empty()
                    || weight_classes.contains(r.weight_class_kg.as_str()))
                && in_set(&state.equipment, &r.equipment)
                && state.tested.matches(&r.tested)
        })
        .map(|(i, _)| i)
        .collect()
}

/// The filtered table.
pub fn resolve(table: &TidyTable, state: &FilterState, mode: FilterMode) -> TidyTable {
    filtered_indices(table, state, mode)
        .into_iter()
        .map(|i| table.records[i].clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Option lists for the selection widgets
// ---------------------------------------------------------------------------

/// Choices offered by the filter controls, unioned across loaded tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub age_categories: Vec<String>,
    pub equipment: Vec<String>,
    pub male_weight_classes: Vec<String>,
    pub female_weight_classes: Vec<String>,
    /// Every weight class regardless of sex.
    pub weight_classes: Vec<String>,
}

impl FilterOptions {
    pub fn from_tables(tables: &[&TidyTable]) -> Self {
        let mut ages = BTreeSet::new();
        let mut equipment = BTreeSet::new();
        let mut male = BTreeSet::new();
        let mut female = BTreeSet::new();
        let mut all = BTreeSet::new();

        for table in tables {
            ages.extend(table.distinct(Field::AgeCategory));
            equipment.extend(table.distinct(Field::Equipment));
            male.extend(table.weight_classes_for(MALE));
            female.extend(table.weight_classes_for(FEMALE));
            all.extend(table.distinct(Field::WeightClassKg));
        }

        FilterOptions {
            age_categories: ages.into_iter().map(str::to_string).collect(),
            equipment: equipment.into_iter().map(str::to_string).collect(),
            male_weight_classes: sort_weight_classes(male),
            female_weight_classes: sort_weight_classes(female),
            weight_classes: sort_weight_classes(all),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::QualifyingTotal;

    fn rec(sex: &str, age: &str, tested: &str, equipment: &str, wc: &str) -> TidyRecord {
        TidyRecord {
            sex: sex.into(),
            age_category: age.into(),
            event: "SBD".into(),
            tested: tested.into(),
            equipment: equipment.into(),
            weight_class_kg: wc.into(),
            qualifying_total_kg: QualifyingTotal::Kg(400.0),
        }
    }

    fn sample() -> TidyTable {
        vec![
            rec("Male", "24-39", "Tested", "Raw", "90"),
            rec("Male", "24-39", "Untested", "Raw", "100"),
            rec("Male", "40-44", "Tested", "Single-ply", "63"),
            rec("Female", "24-39", "Tested", "Raw", "63"),
            rec("Female", "40-44", "Untested", "Single-ply", "90"),
            rec("Female", "24-39", "Untested", "Raw", "72"),
        ]
        .into_iter()
        .collect()
    }

    fn set(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_state_keeps_everything() {
        let table = sample();
        let state = FilterState::default();
        for mode in [FilterMode::SexPartitioned, FilterMode::SearchOverride] {
            assert_eq!(
                filtered_indices(&table, &state, mode),
                (0..table.len()).collect::<Vec<_>>()
            );
        }
    }

    #[test]
    fn union_policy_applies_when_no_sex_selected() {
        let table = sample();
        let state = FilterState {
            male_weight_classes: set(&["90"]),
            female_weight_classes: set(&["63"]),
            ..Default::default()
        };
        let kept = resolve(&table, &state, FilterMode::SexPartitioned);
        assert_eq!(kept.len(), 4);
        assert!(kept
            .records
            .iter()
            .all(|r| r.weight_class_kg == "90" || r.weight_class_kg == "63"));
        // both sexes appear for both labels
        assert!(kept
            .records
            .iter()
            .any(|r| r.sex == "Female" && r.weight_class_kg == "90"));
        assert!(kept
            .records
            .iter()
            .any(|r| r.sex == "Male" && r.weight_class_kg == "63"));
    }

    #[test]
    fn union_policy_applies_when_both_sexes_selected() {
        let table = sample();
        let state = FilterState {
            sexes: set(&["Male", "Female"]),
            male_weight_classes: set(&["90"]),
            female_weight_classes: set(&["63"]),
            ..Default::default()
        };
        assert_eq!(
            filtered_indices(&table, &state, FilterMode::SexPartitioned),
            vec![0, 2, 3, 4]
        );
    }

    #[test]
    fn single_sex_uses_its_own_weight_classes() {
        let table = sample();
        let mut state = FilterState {
            sexes: set(&["Female"]),
            male_weight_classes: set(&["90"]),
            female_weight_classes: set(&["63"]),
            ..Default::default()
        };
        assert_eq!(filtered_indices(&table, &state, FilterMode::SexPartitioned), vec![3]);

        state.sexes = set(&["Male"]);
        assert_eq!(filtered_indices(&table, &state, FilterMode::SexPartitioned), vec![0]);
    }

    #[test]
    fn single_sex_with_only_other_sex_classes_is_unconstrained() {
        let table = sample();
        let state = FilterState {
            sexes: set(&["Female"]),
            male_weight_classes: set(&["90"]),
            ..Default::default()
        };
        assert_eq!(
            filtered_indices(&table, &state, FilterMode::SexPartitioned),
            vec![3, 4, 5]
        );
    }

    #[test]
    fn independent_dimensions_intersect() {
        let table = sample();
        let single = |state: FilterState| -> BTreeSet<usize> {
            filtered_indices(&table, &state, FilterMode::SexPartitioned)
                .into_iter()
                .collect()
        };
        let by_age = single(FilterState {
            age_categories: set(&["24-39"]),
            ..Default::default()
        });
        let by_equipment = single(FilterState {
            equipment: set(&["Raw"]),
            ..Default::default()
        });
        let by_tested = single(FilterState {
            tested: TestedFilter::Untested,
            ..Default::default()
        });

        let combined = single(FilterState {
            age_categories: set(&["24-39"]),
            equipment: set(&["Raw"]),
            tested: TestedFilter::Untested,
            ..Default::default()
        });
        let expected: BTreeSet<usize> = by_age
            .intersection(&by_equipment)
            .copied()
            .collect::<BTreeSet<_>>()
            .intersection(&by_tested)
            .copied()
            .collect();
        assert_eq!(combined, expected);
        assert_eq!(combined, BTreeSet::from([1, 5]));
    }

    #[test]
    fn tested_filter_is_case_insensitive() {
        let table: TidyTable = vec![rec("Male", "24-39", "TESTED", "Raw", "90")]
            .into_iter()
            .collect();
        let state = FilterState {
            tested: TestedFilter::Tested,
            ..Default::default()
        };
        assert_eq!(filtered_indices(&table, &state, FilterMode::SexPartitioned), vec![0]);
    }

    #[test]
    fn unknown_sex_matches_nothing() {
        let table = sample();
        let state = FilterState {
            sexes: set(&["male"]),
            ..Default::default()
        };
        assert!(resolve(&table, &state, FilterMode::SexPartitioned).is_empty());
    }

    #[test]
    fn search_overrides_other_filters() {
        let table = sample();
        let state = FilterState {
            search: "  SINGLE ".into(),
            sexes: set(&["Female"]),
            tested: TestedFilter::Tested,
            ..Default::default()
        };
        assert_eq!(
            filtered_indices(&table, &state, FilterMode::SearchOverride),
            vec![2, 4]
        );
    }

    #[test]
    fn search_is_ignored_in_sex_partitioned_mode() {
        let table = sample();
        let state = FilterState {
            search: "single".into(),
            ..Default::default()
        };
        assert_eq!(
            filtered_indices(&table, &state, FilterMode::SexPartitioned).len(),
            table.len()
        );
    }

    #[test]
    fn search_mode_without_text_uses_unified_weight_classes() {
        let table = sample();
        let state = FilterState {
            search: "   ".into(),
            sexes: set(&["Female"]),
            male_weight_classes: set(&["90"]),
            ..Default::default()
        };
        // the male-chosen "90" still filters female rows here
        assert_eq!(filtered_indices(&table, &state, FilterMode::SearchOverride), vec![4]);
    }

    #[test]
    fn reset_is_idempotent() {
        let mut state = FilterState {
            search: "90".into(),
            sexes: set(&["Male"]),
            tested: TestedFilter::Tested,
            ..Default::default()
        };
        state.reset();
        let once = state.clone();
        state.reset();
        assert_eq!(state, once);
        assert!(state.is_empty());
    }

    #[test]
    fn options_union_tables_and_partition_by_sex() {
        let current = sample();
        let previous: TidyTable = vec![
            rec("Female", "18-23", "Tested", "Wraps", "52"),
            rec("Male", "18-23", "Tested", "Raw", "140+"),
        ]
        .into_iter()
        .collect();
        let options = FilterOptions::from_tables(&[&current, &previous]);
        assert_eq!(options.age_categories, vec!["18-23", "24-39", "40-44"]);
        assert_eq!(options.equipment, vec!["Raw", "Single-ply", "Wraps"]);
        assert_eq!(options.male_weight_classes, vec!["63", "90", "100", "140+"]);
        assert_eq!(options.female_weight_classes, vec!["52", "63", "72", "90"]);
        assert_eq!(options.weight_classes, vec!["52", "63", "72", "90", "100", "140+"]);
    }
}
