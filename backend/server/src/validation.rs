//! Range checks run before anything touches storage.
//!
//! Each check yields a [`Violations`] map from field name to the first rule it broke.
//! An empty map means the input is valid.
use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Rate, Recipe};

pub const MAX_NAME_LEN: usize = 100;
pub const MAX_ID_LEN: usize = 100;

pub const ID: &str = "id";
pub const NAME: &str = "name";
pub const PREP_TIME: &str = "prepTime";
pub const DIFFICULTY: &str = "difficulty";
pub const NOTE: &str = "note";

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Violation {
    OutOfRange,
    TooLong,
    MissingName,
    MissingId,
    IdMismatch,
}

pub type Violations = BTreeMap<&'static str, Violation>;

/// Keeps the first violation recorded for a field.
pub fn flag(violations: &mut Violations, field: &'static str, violation: Violation) {
    violations.entry(field).or_insert(violation);
}

pub fn validate_recipe(recipe: &Recipe) -> Violations {
    let mut violations = Violations::new();

    if recipe.id.is_empty() {
        flag(&mut violations, ID, Violation::MissingId);
    }
    if recipe.id.chars().count() > MAX_ID_LEN {
        flag(&mut violations, ID, Violation::TooLong);
    }
    if recipe.difficulty <= 1 || recipe.difficulty > 3 {
        flag(&mut violations, DIFFICULTY, Violation::OutOfRange);
    }
    if recipe.name.chars().count() > MAX_NAME_LEN {
        flag(&mut violations, NAME, Violation::TooLong);
    }
    if recipe.name.is_empty() {
        flag(&mut violations, NAME, Violation::MissingName);
    }
    if recipe.prep_time <= 1 || recipe.prep_time > 1000 {
        flag(&mut violations, PREP_TIME, Violation::OutOfRange);
    }

    violations
}

pub fn validate_rate(id: &str, rate: &Rate) -> Violations {
    let mut violations = Violations::new();

    if id.chars().count() > MAX_ID_LEN {
        flag(&mut violations, ID, Violation::TooLong);
    }
    if !(1..=5).contains(&rate.note) {
        flag(&mut violations, NOTE, Violation::OutOfRange);
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipe(name: &str, prep_time: i64, difficulty: i64) -> Recipe {
        Recipe {
            id: "r1".to_string(),
            name: name.to_string(),
            prep_time,
            difficulty,
            vegetarian: false,
        }
    }

    #[test]
    fn test_valid_recipe() {
        assert!(validate_recipe(&recipe("Soup", 20, 2)).is_empty());
        assert!(validate_recipe(&recipe("Soup", 2, 3)).is_empty());
        assert!(validate_recipe(&recipe(&"a".repeat(100), 1000, 3)).is_empty());
    }

    #[test]
    fn test_difficulty_bounds() {
        for difficulty in [-5, 0, 1, 4, 100] {
            let violations = validate_recipe(&recipe("Soup", 20, difficulty));
            assert_eq!(violations.len(), 1, "difficulty {difficulty}");
            assert_eq!(violations[DIFFICULTY], Violation::OutOfRange);
        }
    }

    #[test]
    fn test_prep_time_bounds() {
        for prep_time in [0, 1, 1001] {
            let violations = validate_recipe(&recipe("Soup", prep_time, 2));
            assert_eq!(violations[PREP_TIME], Violation::OutOfRange);
        }
    }

    #[test]
    fn test_name_rules() {
        let long = validate_recipe(&recipe(&"a".repeat(101), 20, 2));
        assert_eq!(long[NAME], Violation::TooLong);

        let empty = validate_recipe(&recipe("", 20, 2));
        assert_eq!(empty[NAME], Violation::MissingName);
    }

    #[test]
    fn test_name_length_counts_chars() {
        assert!(validate_recipe(&recipe(&"é".repeat(100), 20, 2)).is_empty());
    }

    #[test]
    fn test_every_field_reported() {
        let violations = validate_recipe(&recipe("", 0, 0));

        assert_eq!(violations.len(), 3);
        assert_eq!(
            serde_json::to_string(&violations).unwrap(),
            r#"{"difficulty":"out-of-range","name":"missing-name","prepTime":"out-of-range"}"#
        );
    }

    #[test]
    fn test_recipe_id_rules() {
        let mut missing = recipe("Soup", 20, 2);
        missing.id = String::new();
        assert_eq!(validate_recipe(&missing)[ID], Violation::MissingId);

        let mut long = recipe("Soup", 20, 2);
        long.id = "x".repeat(101);
        assert_eq!(validate_recipe(&long)[ID], Violation::TooLong);

        // any id a recipe can be created with must also be ratable
        long.id.pop();
        assert!(validate_recipe(&long).is_empty());
        assert!(validate_rate(&long.id, &Rate { note: 3 }).is_empty());
    }

    #[test]
    fn test_flag_keeps_first() {
        let mut violations = Violations::new();
        flag(&mut violations, ID, Violation::TooLong);
        flag(&mut violations, ID, Violation::IdMismatch);

        assert_eq!(violations[ID], Violation::TooLong);
    }

    #[test]
    fn test_rate_note_bounds() {
        assert!(validate_rate("r1", &Rate { note: 1 }).is_empty());
        assert!(validate_rate("r1", &Rate { note: 5 }).is_empty());

        for note in [0, 6, -1] {
            assert_eq!(validate_rate("r1", &Rate { note })[NOTE], Violation::OutOfRange);
        }
    }

    #[test]
    fn test_rate_id_length() {
        let id = "x".repeat(101);
        let violations = validate_rate(&id, &Rate { note: 3 });

        assert_eq!(violations[ID], Violation::TooLong);
        assert!(validate_rate(&"x".repeat(100), &Rate { note: 3 }).is_empty());
    }
}
