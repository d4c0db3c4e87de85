use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Field – the categorical columns of a tidy record
// ---------------------------------------------------------------------------

/// Column header of the qualifying-total column in the tidy table.
pub const TOTAL_HEADER: &str = "QualifyingTotalKg";

/// The text columns of a [`TidyRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    AgeCategory,
    Sex,
    Event,
    Tested,
    Equipment,
    WeightClassKg,
}

impl Field {
    /// The five columns every wide source must provide.
    pub const FIXED: [Field; 5] = [
        Field::AgeCategory,
        Field::Sex,
        Field::Event,
        Field::Tested,
        Field::Equipment,
    ];

    /// Display sort order (and CSV column order, minus the total).
    pub const SORT_ORDER: [Field; 6] = [
        Field::Sex,
        Field::AgeCategory,
        Field::Event,
        Field::Tested,
        Field::Equipment,
        Field::WeightClassKg,
    ];

    /// Columns consulted by the free-text search.
    pub const SEARCHABLE: [Field; 6] = [
        Field::Sex,
        Field::AgeCategory,
        Field::Event,
        Field::Tested,
        Field::Equipment,
        Field::WeightClassKg,
    ];

    /// Column header as it appears in source files and exports.
    pub fn header(self) -> &'static str {
        match self {
            Field::AgeCategory => "Age Category",
            Field::Sex => "Sex",
            Field::Event => "Event",
            Field::Tested => "Tested",
            Field::Equipment => "Equipment",
            Field::WeightClassKg => "WeightClassKg",
        }
    }

    /// Match a source header (already trimmed) against the fixed columns.
    pub fn from_source_header(header: &str) -> Option<Field> {
        match header {
            "Age Category" | "AgeCategory" => Some(Field::AgeCategory),
            "Sex" => Some(Field::Sex),
            "Event" => Some(Field::Event),
            "Tested" => Some(Field::Tested),
            "Equipment" => Some(Field::Equipment),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TestedStatus – canonical drug-testing division
// ---------------------------------------------------------------------------

/// Canonical value of the `Tested` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestedStatus {
    Tested,
    Untested,
}

impl TestedStatus {
    /// Recognise the spreadsheet spellings of a testing status.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "yes" | "true" | "tested" => Some(TestedStatus::Tested),
            "no" | "false" | "untested" => Some(TestedStatus::Untested),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestedStatus::Tested => "Tested",
            TestedStatus::Untested => "Untested",
        }
    }
}

/// Map a raw `Tested` cell to "Tested"/"Untested", or keep it (trimmed) as is.
pub fn canonical_tested(raw: &str) -> String {
    match TestedStatus::parse(raw) {
        Some(status) => status.as_str().to_string(),
        None => raw.trim().to_string(),
    }
}

// ---------------------------------------------------------------------------
// QualifyingTotal – the value column
// ---------------------------------------------------------------------------

/// A qualifying total. Cells that are not numbers are kept as text.
#[derive(Debug, Clone, PartialEq)]
pub enum QualifyingTotal {
    Kg(f64),
    Text(String),
}

impl QualifyingTotal {
    /// Interpret a non-blank cell's text.
    pub fn from_text(s: &str) -> Self {
        let s = s.trim();
        match s.parse::<f64>() {
            Ok(v) => QualifyingTotal::Kg(v),
            Err(_) => QualifyingTotal::Text(s.to_string()),
        }
    }

    pub fn as_kg(&self) -> Option<f64> {
        match self {
            QualifyingTotal::Kg(v) => Some(*v),
            QualifyingTotal::Text(_) => None,
        }
    }
}

impl fmt::Display for QualifyingTotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualifyingTotal::Kg(v) => write!(f, "{}", format_number(*v)),
            QualifyingTotal::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Serialize for QualifyingTotal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// Format a number the way a spreadsheet shows it: integers without decimals.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// TidyRecord – one row of the long table
// ---------------------------------------------------------------------------

/// One (categories, weight class) → total row.
///
/// Field order matches the CSV export columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TidyRecord {
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age Category")]
    pub age_category: String,
    #[serde(rename = "Event")]
    pub event: String,
    #[serde(rename = "Tested")]
    pub tested: String,
    #[serde(rename = "Equipment")]
    pub equipment: String,
    #[serde(rename = "WeightClassKg")]
    pub weight_class_kg: String,
    #[serde(rename = "QualifyingTotalKg")]
    pub qualifying_total_kg: QualifyingTotal,
}

impl TidyRecord {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::AgeCategory => &self.age_category,
            Field::Sex => &self.sex,
            Field::Event => &self.event,
            Field::Tested => &self.tested,
            Field::Equipment => &self.equipment,
            Field::WeightClassKg => &self.weight_class_kg,
        }
    }

    /// Compare two records by [`Field::SORT_ORDER`], as plain strings.
    pub fn display_cmp(&self, other: &Self) -> Ordering {
        Field::SORT_ORDER
            .iter()
            .map(|&f| self.get(f).cmp(other.get(f)))
            .find(|o| o.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

// ---------------------------------------------------------------------------
// TidyTable – the complete normalized table
// ---------------------------------------------------------------------------

/// The normalized long-format table. Read-only once loaded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TidyTable {
    pub records: Vec<TidyRecord>,
}

impl TidyTable {
    pub fn new(records: Vec<TidyRecord>) -> Self {
        TidyTable { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Rows whose `Event` is one of `events`, in original order.
    pub fn with_events(&self, events: &[&str]) -> TidyTable {
        self.records
            .iter()
            .filter(|r| events.contains(&r.event.as_str()))
            .cloned()
            .collect()
    }

    /// Distinct values of a column, sorted as strings.
    pub fn distinct(&self, field: Field) -> BTreeSet<&str> {
        self.records.iter().map(|r| r.get(field)).collect()
    }

    /// Distinct weight classes among rows of one sex.
    pub fn weight_classes_for(&self, sex: &str) -> BTreeSet<&str> {
        self.records
            .iter()
            .filter(|r| r.sex == sex)
            .map(|r| r.weight_class_kg.as_str())
            .collect()
    }
}

impl FromIterator<TidyRecord> for TidyTable {
    fn from_iter<I: IntoIterator<Item = TidyRecord>>(iter: I) -> Self {
        TidyTable::new(iter.into_iter().collect())
    }
}

// ---------------------------------------------------------------------------
// Weight-class ordering
// ---------------------------------------------------------------------------

/// Sort key for weight-class labels: numeric value first ("110+" counts as
/// 110, unparseable labels as +∞), then the label itself.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightClassKey<'a> {
    pub value: f64,
    pub label: &'a str,
}

impl Eq for WeightClassKey<'_> {}

impl PartialOrd for WeightClassKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WeightClassKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value
            .total_cmp(&other.value)
            .then_with(|| self.label.cmp(other.label))
    }
}

pub fn weight_class_sort_key(label: &str) -> WeightClassKey<'_> {
    let number = label.strip_suffix('+').unwrap_or(label);
    let value = number.trim().parse::<f64>().unwrap_or(f64::INFINITY);
    WeightClassKey { value, label }
}

/// Order weight-class labels for display.
pub fn sort_weight_classes<'a, I>(labels: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut labels: Vec<&str> = labels.into_iter().collect();
    labels.sort_by(|a, b| weight_class_sort_key(a).cmp(&weight_class_sort_key(b)));
    labels.into_iter().map(str::to_string).collect()
}
