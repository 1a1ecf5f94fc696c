//! Structural fingerprints of a state type.
//!
//! A [`Shape`] records which fields a document must have and, recursively,
//! which of those fields are objects that must have fields of their own. It is
//! derived once from the canonical default state and then only used to verify
//! documents coming out of the backend.
//!
//! Field *presence* is all that is checked: value types are not remembered and
//! arrays are leaves, their elements are never inspected.
//!
//! ```
//! use keepsake::shape::Shape;
//! use serde_json::json;
//!
//! let shape = Shape::of_value(&json!({
//!     "rounds": [],
//!     "rules": {"coop": 2, "defect": 0, "win": 3, "lose": -1},
//! }));
//!
//! assert!(shape.check(&json!({
//!     "rounds": [[true, false]],
//!     "rules": {"coop": 5, "defect": 0, "win": 3, "lose": -1},
//!     "players": ["A", "B"],
//! })).is_ok());
//!
//! let missing = shape.check(&json!({"rules": {}})).unwrap_err();
//! assert_eq!(missing.field, "rounds");
//! ```

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Recursive field-presence descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// No further structure is required.
    Leaf,
    /// Every listed field must be present, with the given nested shape.
    Object(BTreeMap<String, Shape>),
}

/// A field the shape requires was not found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingField {
    /// Path from the document root to the missing field, e.g. `rules.coop`.
    pub path: String,
    /// Name of the missing field itself.
    pub field: String,
}

impl fmt::Display for MissingField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Missing field: {}", self.path)
    }
}

impl std::error::Error for MissingField {}

impl Shape {
    /// Derive the shape of a reference value by serializing it.
    pub fn of<T: Serialize>(reference: &T) -> Result<Shape, serde_json::Error> {
        serde_json::to_value(reference).map(|value| Shape::of_value(&value))
    }

    /// Derive the shape of an already serialized reference value.
    pub fn of_value(reference: &Value) -> Shape {
        match reference {
            Value::Object(fields) => Shape::Object(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), Shape::of_value(value)))
                    .collect(),
            ),
            _ => Shape::Leaf,
        }
    }

    /// Top-level field names required by this shape.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        let fields = match self {
            Shape::Object(fields) => Some(fields.keys().map(String::as_str)),
            Shape::Leaf => None,
        };
        fields.into_iter().flatten()
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Shape::Leaf)
    }

    /// Verify that `document` has every field this shape requires.
    ///
    /// Extra fields are ignored. The first missing field (in field name order)
    /// is reported.
    pub fn check(&self, document: &Value) -> Result<(), MissingField> {
        self.check_at(document, "")
    }

    fn check_at(&self, document: &Value, prefix: &str) -> Result<(), MissingField> {
        let Shape::Object(required) = self else {
            return Ok(());
        };
        let empty = Map::new();
        let present = document.as_object().unwrap_or(&empty);

        for (field, nested) in required {
            let path = if prefix.is_empty() {
                field.clone()
            } else {
                format!("{prefix}.{field}")
            };
            match present.get(field) {
                Some(value) => nested.check_at(value, &path)?,
                None => {
                    return Err(MissingField {
                        path,
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Rules {
        coop: i32,
        defect: i32,
        win: i32,
        lose: i32,
    }

    #[derive(Serialize)]
    struct Match {
        rounds: Vec<[bool; 2]>,
        rules: Rules,
        players: [String; 2],
    }

    fn reference() -> Match {
        Match {
            rounds: vec![[true, true]],
            rules: Rules {
                coop: 2,
                defect: 0,
                win: 3,
                lose: -1,
            },
            players: ["A".into(), "B".into()],
        }
    }

    #[test]
    fn test_shape_of_struct() {
        let shape = Shape::of(&reference()).unwrap();
        let fields: Vec<&str> = shape.fields().collect();
        assert_eq!(fields, ["players", "rounds", "rules"]);

        let Shape::Object(top) = &shape else {
            panic!("expected an object shape");
        };
        assert_eq!(top["rounds"], Shape::Leaf);
        assert_eq!(top["players"], Shape::Leaf);
        assert_eq!(top["rules"].fields().count(), 4);
    }

    #[test]
    fn test_arrays_are_leaves() {
        let shape = Shape::of_value(&json!({"rounds": [{"a": 1}]}));
        // Array elements are not inspected, so an empty array passes.
        assert!(shape.check(&json!({"rounds": []})).is_ok());
        assert!(shape.check(&json!({"rounds": "anything"})).is_ok());
    }

    #[test]
    fn test_missing_nested_field() {
        let shape = Shape::of(&reference()).unwrap();
        let doc = json!({
            "rounds": [],
            "players": ["A", "B"],
            "rules": {"coop": 2, "defect": 0, "win": 3},
        });
        let err = shape.check(&doc).unwrap_err();
        assert_eq!(err.field, "lose");
        assert_eq!(err.path, "rules.lose");
        assert_eq!(err.to_string(), "Missing field: rules.lose");
    }

    #[test]
    fn test_nested_value_not_an_object() {
        let shape = Shape::of(&reference()).unwrap();
        let doc = json!({"rounds": [], "players": [], "rules": 7});
        assert_eq!(shape.check(&doc).unwrap_err().path, "rules.coop");
    }

    #[test]
    fn test_superset_passes() {
        let shape = Shape::of(&reference()).unwrap();
        let doc = json!({
            "rounds": [],
            "players": ["A", "B"],
            "rules": {"coop": 2, "defect": 0, "win": 3, "lose": -1, "draw": 1},
            "gameRounds": 10,
        });
        assert!(shape.check(&doc).is_ok());
    }

    #[test]
    fn test_null_is_present() {
        let shape = Shape::of_value(&json!({"best": null}));
        assert!(!shape.is_leaf());
        assert!(shape.check(&json!({"best": null})).is_ok());
        assert!(shape.check(&json!({})).is_err());
    }

    #[test]
    fn test_leaf_shape_accepts_anything() {
        let shape = Shape::of(&42u32).unwrap();
        assert!(shape.is_leaf());
        assert_eq!(shape.fields().count(), 0);
        assert!(shape.check(&json!("whatever")).is_ok());
    }
}
