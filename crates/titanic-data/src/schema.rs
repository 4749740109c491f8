//! Passenger table schema.
//!
//! Column names follow the Kaggle `train.csv` header:
//!
//! | Column | Meaning |
//! |--------|---------|
//! | PassengerId | row id (optional in the file) |
//! | Survived | 0 = no, 1 = yes |
//! | Pclass | ticket class 1/2/3 |
//! | Name | passenger name (optional in the file) |
//! | Sex | male / female |
//! | Age | years, may be missing |
//! | SibSp | siblings / spouses aboard |
//! | Parch | parents / children aboard |
//! | Ticket | ticket number |
//! | Fare | passenger fare, may be missing |
//! | Cabin | cabin number, mostly missing |
//! | Embarked | C = Cherbourg, Q = Queenstown, S = Southampton |

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Column {
    PassengerId,
    Survived,
    Pclass,
    Name,
    Sex,
    Age,
    SibSp,
    Parch,
    Ticket,
    Fare,
    Cabin,
    Embarked,
}

impl Column {
    pub const ALL: [Column; 12] = [
        Column::PassengerId,
        Column::Survived,
        Column::Pclass,
        Column::Name,
        Column::Sex,
        Column::Age,
        Column::SibSp,
        Column::Parch,
        Column::Ticket,
        Column::Fare,
        Column::Cabin,
        Column::Embarked,
    ];

    /// Header name as it appears in the CSV.
    pub fn as_str(&self) -> &'static str {
        match self {
            Column::PassengerId => "PassengerId",
            Column::Survived    => "Survived",
            Column::Pclass      => "Pclass",
            Column::Name        => "Name",
            Column::Sex         => "Sex",
            Column::Age         => "Age",
            Column::SibSp       => "SibSp",
            Column::Parch       => "Parch",
            Column::Ticket      => "Ticket",
            Column::Fare        => "Fare",
            Column::Cabin       => "Cabin",
            Column::Embarked    => "Embarked",
        }
    }

    /// Case-insensitive lookup, with a few natural-language aliases.
    pub fn parse(name: &str) -> Option<Column> {
        let lowered = name.trim().to_lowercase();
        let alias = match lowered.as_str() {
            "class" | "passenger_class" | "ticket_class" => Some(Column::Pclass),
            "gender"                                     => Some(Column::Sex),
            "survival"                                   => Some(Column::Survived),
            "port" | "embarkation"                       => Some(Column::Embarked),
            _ => None,
        };
        alias.or_else(|| {
            Column::ALL
                .into_iter()
                .find(|c| c.as_str().eq_ignore_ascii_case(&lowered))
        })
    }

    /// pandas-style dtype name, used when describing the table to the model.
    pub fn dtype(&self) -> &'static str {
        match self {
            Column::PassengerId | Column::Survived | Column::Pclass
            | Column::SibSp | Column::Parch => "int64",
            Column::Age | Column::Fare => "float64",
            Column::Name | Column::Sex | Column::Ticket
            | Column::Cabin | Column::Embarked => "object",
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.dtype() != "object"
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One passenger record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passenger {
    #[serde(rename = "PassengerId", default)]
    pub passenger_id: Option<u32>,
    #[serde(rename = "Survived")]
    pub survived: u8,
    #[serde(rename = "Pclass")]
    pub pclass: u8,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age", default, deserialize_with = "csv::invalid_option")]
    pub age: Option<f64>,
    #[serde(rename = "SibSp")]
    pub sibsp: u8,
    #[serde(rename = "Parch")]
    pub parch: u8,
    #[serde(rename = "Ticket")]
    pub ticket: String,
    #[serde(rename = "Fare", default, deserialize_with = "csv::invalid_option")]
    pub fare: Option<f64>,
    #[serde(rename = "Cabin", default)]
    pub cabin: Option<String>,
    #[serde(rename = "Embarked", default)]
    pub embarked: Option<String>,
}

impl Passenger {
    pub fn cell(&self, column: Column) -> Cell {
        match column {
            Column::PassengerId => self.passenger_id.map_or(Cell::Missing, |v| Cell::Int(v.into())),
            Column::Survived    => Cell::Int(self.survived.into()),
            Column::Pclass      => Cell::Int(self.pclass.into()),
            Column::Name        => Cell::text(self.name.as_deref()),
            Column::Sex         => Cell::text(Some(&self.sex)),
            Column::Age         => self.age.map_or(Cell::Missing, Cell::Float),
            Column::SibSp       => Cell::Int(self.sibsp.into()),
            Column::Parch       => Cell::Int(self.parch.into()),
            Column::Ticket      => Cell::text(Some(&self.ticket)),
            Column::Fare        => self.fare.map_or(Cell::Missing, Cell::Float),
            Column::Cabin       => Cell::text(self.cabin.as_deref()),
            Column::Embarked    => Cell::text(self.embarked.as_deref()),
        }
    }
}

/// A single table value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Text(String),
    Missing,
}

impl Cell {
    fn text(value: Option<&str>) -> Cell {
        match value.map(str::trim) {
            Some(s) if !s.is_empty() => Cell::Text(s.to_string()),
            _ => Cell::Missing,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int(v)   => Some(*v as f64),
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order used for sorting group keys: numbers, then text, then missing.
    pub fn sort_cmp(&self, other: &Cell) -> Ordering {
        match (self.as_f64(), other.as_f64()) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => match (self, other) {
                (Cell::Text(a), Cell::Text(b)) => a.cmp(b),
                (Cell::Missing, Cell::Missing) => Ordering::Equal,
                (Cell::Missing, _) => Ordering::Greater,
                _ => Ordering::Less,
            },
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v)   => write!(f, "{v}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Text(s)  => f.write_str(s),
            Cell::Missing  => f.write_str("NaN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(Column::parse("pclass"), Some(Column::Pclass));
        assert_eq!(Column::parse("SIBSP"), Some(Column::SibSp));
        assert_eq!(Column::parse(" Fare "), Some(Column::Fare));
        assert_eq!(Column::parse("lifeboat"), None);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!(Column::parse("class"), Some(Column::Pclass));
        assert_eq!(Column::parse("Gender"), Some(Column::Sex));
        assert_eq!(Column::parse("survival"), Some(Column::Survived));
    }

    #[test]
    fn test_blank_text_is_missing() {
        assert_eq!(Cell::text(Some("  ")), Cell::Missing);
        assert_eq!(Cell::text(None), Cell::Missing);
        assert_eq!(Cell::text(Some("C85")), Cell::Text("C85".into()));
    }

    #[test]
    fn test_sort_order_numbers_first() {
        let mut cells = vec![Cell::Missing, Cell::Text("S".into()), Cell::Int(3), Cell::Float(1.5)];
        cells.sort_by(|a, b| a.sort_cmp(b));
        assert_eq!(cells, vec![Cell::Float(1.5), Cell::Int(3), Cell::Text("S".into()), Cell::Missing]);
    }
}
