// src/fields/mod.rs
pub mod pattern;
pub mod spec;

pub use pattern::ValuePattern;
pub use spec::{FieldDef, FieldSpec};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical output fields. Declaration order is the CSV column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    #[serde(alias = "PL")]
    Place,
    Name,
    Year,
    Team,
    Time,
    EventDate,
}

impl Field {
    /// Canonical name, used as the record key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Place => "PLACE",
            Field::Name => "NAME",
            Field::Year => "YEAR",
            Field::Team => "TEAM",
            Field::Time => "TIME",
            Field::EventDate => "EVENT_DATE",
        }
    }

    /// Column label in the exported CSV.
    pub fn column_label(&self) -> &'static str {
        match self {
            Field::Place => "PL",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_canonical_and_label_names() {
        assert_eq!(serde_json::from_str::<Field>("\"PL\"").unwrap(), Field::Place);
        assert_eq!(serde_json::from_str::<Field>("\"PLACE\"").unwrap(), Field::Place);
        assert_eq!(serde_json::from_str::<Field>("\"EVENT_DATE\"").unwrap(), Field::EventDate);
        assert!(serde_json::from_str::<Field>("\"HEAT\"").is_err());
    }

    #[test]
    fn column_order_follows_declaration() {
        let mut shuffled = vec![Field::EventDate, Field::Time, Field::Place, Field::Team];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Field::Place, Field::Team, Field::Time, Field::EventDate]
        );
        assert_eq!(Field::Place.column_label(), "PL");
        assert_eq!(Field::Team.column_label(), "TEAM");
    }
}
