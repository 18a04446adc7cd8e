use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;

use crate::domain::TableError;

pub type RecordId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum ColumnId {
    Name,
    Calories,
    Fat,
    Carbs,
    Protein,
}

impl ColumnId {
    pub const ALL: [ColumnId; 5] = [
        ColumnId::Name,
        ColumnId::Calories,
        ColumnId::Fat,
        ColumnId::Carbs,
        ColumnId::Protein,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnId::Name => "name",
            ColumnId::Calories => "calories",
            ColumnId::Fat => "fat",
            ColumnId::Carbs => "carbs",
            ColumnId::Protein => "protein",
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnId {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ColumnId::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| TableError::UnknownColumn(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Capabilities and header label of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub id: ColumnId,
    pub label: String,
    pub sortable: bool,
    pub filterable: bool,
}

impl ColumnSpec {
    pub fn new(id: ColumnId, label: impl Into<String>) -> Self {
        ColumnSpec {
            id,
            label: label.into(),
            sortable: true,
            filterable: true,
        }
    }

    pub fn fixed(mut self) -> Self {
        self.sortable = false;
        self.filterable = false;
        self
    }
}

pub fn default_columns() -> Vec<ColumnSpec> {
    vec![
        ColumnSpec::new(ColumnId::Name, "Dessert (100g serving)"),
        ColumnSpec::new(ColumnId::Calories, "Calories"),
        ColumnSpec::new(ColumnId::Fat, "Fat (g)"),
        ColumnSpec::new(ColumnId::Carbs, "Carbs (g)"),
        ColumnSpec::new(ColumnId::Protein, "Protein (g)").fixed(),
    ]
}

/// One row as supplied at startup, before an id is assigned.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub name: String,
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub detail: String,
}

impl RawRecord {
    pub fn new(
        name: &str,
        calories: f64,
        fat: f64,
        carbs: f64,
        protein: f64,
        detail: &str,
    ) -> Self {
        RawRecord {
            name: name.to_string(),
            calories: Some(calories),
            fat: Some(fat),
            carbs: Some(carbs),
            protein: Some(protein),
            detail: detail.to_string(),
        }
    }
}

pub fn reference_dataset() -> Vec<RawRecord> {
    vec![
        RawRecord::new("Frozen yoghurt", 159.0, 6.0, 24.0, 4.0, "..."),
        RawRecord::new("Ice cream sandwich", 237.0, 9.0, 37.0, 4.3, "..."),
        RawRecord::new("Eclair", 262.0, 16.0, 24.0, 6.0, "..."),
        RawRecord::new("Cupcake", 305.0, 3.7, 67.0, 4.3, "..."),
        RawRecord::new("Gingerbread", 356.0, 16.0, 49.0, 3.9, "..."),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub calories: Option<f64>,
    pub fat: Option<f64>,
    pub carbs: Option<f64>,
    pub protein: Option<f64>,
    pub detail: String,
    pub sort_key: String,
}

impl Record {
    pub fn from_raw(id: RecordId, raw: RawRecord) -> Self {
        let sort_key = raw.name.to_lowercase();
        Record {
            id,
            name: raw.name,
            calories: raw.calories,
            fat: raw.fat,
            carbs: raw.carbs,
            protein: raw.protein,
            detail: raw.detail,
            sort_key,
        }
    }

    pub fn field(&self, column: ColumnId) -> FieldValue<'_> {
        match column {
            ColumnId::Name => FieldValue::Text(&self.name),
            ColumnId::Calories => FieldValue::Number(self.calories),
            ColumnId::Fat => FieldValue::Number(self.fat),
            ColumnId::Carbs => FieldValue::Number(self.carbs),
            ColumnId::Protein => FieldValue::Number(self.protein),
        }
    }

    /// Every field value rendered and joined without separator, id and sort key last.
    pub fn search_text(&self) -> String {
        let mut out = String::new();
        for column in ColumnId::ALL {
            out.push_str(&self.field(column).to_string());
        }
        out.push_str(&self.detail);
        out.push_str(&self.id.to_string());
        out.push_str(&self.sort_key);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Text(&'a str),
    Number(Option<f64>),
}

impl FieldValue<'_> {
    /// Ascending order. Absent numbers sort before any defined number.
    pub fn compare(&self, other: &FieldValue<'_>) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => match (a, b) {
                (Some(a), Some(b)) => a.total_cmp(b),
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            // A column never mixes kinds; keep the order total anyway.
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(Some(n)) => write!(f, "{n}"),
            FieldValue::Number(None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_id_parses_case_insensitively() {
        assert_eq!("Calories".parse::<ColumnId>().unwrap(), ColumnId::Calories);
        assert_eq!(" fat ".parse::<ColumnId>().unwrap(), ColumnId::Fat);
        assert!(matches!(
            "sugar".parse::<ColumnId>(),
            Err(TableError::UnknownColumn(c)) if c == "sugar"
        ));
    }

    #[test]
    fn numbers_render_without_trailing_zero() {
        assert_eq!(FieldValue::Number(Some(6.0)).to_string(), "6");
        assert_eq!(FieldValue::Number(Some(4.3)).to_string(), "4.3");
        assert_eq!(FieldValue::Number(None).to_string(), "");
    }

    #[test]
    fn absent_numbers_sort_first() {
        let none = FieldValue::Number(None);
        let low = FieldValue::Number(Some(-100.0));
        assert_eq!(none.compare(&low), Ordering::Less);
        assert_eq!(low.compare(&none), Ordering::Greater);
        assert_eq!(none.compare(&none), Ordering::Equal);
    }

    #[test]
    fn text_compares_raw_bytes() {
        // Upper case sorts before lower case on the raw field.
        assert_eq!(
            FieldValue::Text("Zebra").compare(&FieldValue::Text("apple")),
            Ordering::Less
        );
    }

    #[test]
    fn search_text_joins_every_field() {
        let record = Record::from_raw(2, reference_dataset().remove(2));
        assert_eq!(record.sort_key, "eclair");
        assert_eq!(record.search_text(), "Eclair26216246...2eclair");
    }

    #[test]
    fn protein_is_fixed_by_default() {
        let columns = default_columns();
        let protein = columns.iter().find(|c| c.id == ColumnId::Protein).unwrap();
        assert!(!protein.sortable && !protein.filterable);
        assert!(columns.iter().filter(|c| c.id != ColumnId::Protein).all(|c| c.sortable));
    }
}
