use serde::{Deserialize, Serialize};

/// Absent JSON fields take their zero value so validation, not the decoder, reports them.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub prep_time: i64,
    pub difficulty: i64,
    pub vegetarian: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Rate {
    pub note: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_json_names() {
        let recipe: Recipe = serde_json::from_str(
            r#"{"id":"r1","name":"Soup","prepTime":20,"difficulty":2,"vegetarian":true}"#,
        )
        .unwrap();

        assert_eq!(recipe.prep_time, 20);
        assert!(recipe.vegetarian);
    }

    #[test]
    fn test_missing_fields_default() {
        let recipe: Recipe = serde_json::from_str(r#"{"id":"r1"}"#).unwrap();

        assert_eq!(recipe.name, "");
        assert_eq!(recipe.difficulty, 0);
    }

    #[test]
    fn test_unknown_fields_rejected() {
        assert!(serde_json::from_str::<Rate>(r#"{"note":3,"stars":5}"#).is_err());
    }
}
