//! Monster Manual table: sortable, searchable, with "did you mean".

pub mod dataset;
mod suggest;

pub use dataset::{alignment_label, DatasetError, MonsterRecord};
pub use suggest::{best_suggestion, levenshtein};

use std::cmp::Ordering;

/// Table columns, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Name,
    Size,
    Type,
    Alignment,
    Ac,
    Hp,
    Speeds,
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
    Cr,
    SavingThrows,
    Skills,
    Senses,
    Languages,
    Additional,
}

impl Column {
    pub const ALL: [Column; 19] = [
        Column::Name,
        Column::Size,
        Column::Type,
        Column::Alignment,
        Column::Ac,
        Column::Hp,
        Column::Speeds,
        Column::Str,
        Column::Dex,
        Column::Con,
        Column::Int,
        Column::Wis,
        Column::Cha,
        Column::Cr,
        Column::SavingThrows,
        Column::Skills,
        Column::Senses,
        Column::Languages,
        Column::Additional,
    ];

    /// Field key used by table headers (`data-field`).
    pub fn key(&self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Size => "size",
            Column::Type => "type",
            Column::Alignment => "align_label",
            Column::Ac => "ac",
            Column::Hp => "hp",
            Column::Speeds => "speeds",
            Column::Str => "str",
            Column::Dex => "dex",
            Column::Con => "con",
            Column::Int => "int",
            Column::Wis => "wis",
            Column::Cha => "cha",
            Column::Cr => "cr",
            Column::SavingThrows => "sav_throws",
            Column::Skills => "skills",
            Column::Senses => "senses",
            Column::Languages => "languages",
            Column::Additional => "additional",
        }
    }

    pub fn from_key(key: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::Ac
                | Column::Hp
                | Column::Str
                | Column::Dex
                | Column::Con
                | Column::Int
                | Column::Wis
                | Column::Cha
                | Column::Cr
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub column: Column,
    pub direction: SortDirection,
}

impl Default for SortState {
    /// Strongest creatures first.
    fn default() -> Self {
        Self {
            column: Column::Cr,
            direction: SortDirection::Descending,
        }
    }
}

/// Which cells the search term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterScope {
    #[default]
    Name,
    AllColumns,
}

impl MonsterRecord {
    fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Ac => self.ac,
            Column::Hp => self.hp,
            Column::Str => self.strength,
            Column::Dex => self.dexterity,
            Column::Con => self.constitution,
            Column::Int => self.intelligence,
            Column::Wis => self.wisdom,
            Column::Cha => self.charisma,
            Column::Cr => self.cr,
            _ => None,
        }
    }

    /// Display text of one cell.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Name => self.name.clone(),
            Column::Size => self.size.clone(),
            Column::Type => self.kind.clone(),
            Column::Alignment => self.alignment_label(),
            Column::Speeds => self.speeds.clone(),
            Column::SavingThrows => self.sav_throws.clone(),
            Column::Skills => self.skills.clone(),
            Column::Senses => self.senses.clone(),
            Column::Languages => self.languages.clone(),
            Column::Additional => self.additional.clone(),
            Column::Cr => self.cr.map(format_cr).unwrap_or_default(),
            numeric => self.number(numeric).map(format_number).unwrap_or_default(),
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Challenge ratings below 1 are printed as the usual fractions.
fn format_cr(value: f64) -> String {
    for (fraction, label) in [(0.125, "1/8"), (0.25, "1/4"), (0.5, "1/2")] {
        if (value - fraction).abs() < 1e-9 {
            return label.to_string();
        }
    }
    format_number(value)
}

fn compare(a: &MonsterRecord, b: &MonsterRecord, column: Column) -> Ordering {
    if column.is_numeric() {
        // Missing values sort below every number.
        match (a.number(column), b.number(column)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        }
    } else {
        a.cell(column).to_lowercase().cmp(&b.cell(column).to_lowercase())
    }
}

pub struct MonsterManual {
    dataset: Vec<MonsterRecord>,
    /// Lowercase names, parallel to `dataset`.
    names: Vec<String>,
    sort: SortState,
    scope: FilterScope,
    term: String,
    /// Indices into `dataset`, filtered and sorted.
    visible: Vec<usize>,
    suggestion: Option<String>,
}

impl MonsterManual {
    pub fn new(dataset: Vec<MonsterRecord>) -> Self {
        let names = dataset.iter().map(|m| m.name.to_lowercase()).collect();
        let mut manual = Self {
            dataset,
            names,
            sort: SortState::default(),
            scope: FilterScope::default(),
            term: String::new(),
            visible: Vec::new(),
            suggestion: None,
        };
        manual.apply_filter();
        manual
    }

    pub fn with_scope(mut self, scope: FilterScope) -> Self {
        self.scope = scope;
        self.apply_filter();
        self
    }

    /// Header click: same column flips direction, a new column starts descending.
    pub fn set_sort(&mut self, column: Column) {
        if self.sort.column == column {
            self.sort.direction = self.sort.direction.toggled();
        } else {
            self.sort = SortState {
                column,
                direction: SortDirection::Descending,
            };
        }
        self.apply_sort();
    }

    /// Search box input.
    pub fn set_filter(&mut self, term: &str) {
        self.term = term.trim().to_lowercase();
        self.apply_filter();
    }

    pub fn set_scope(&mut self, scope: FilterScope) {
        self.scope = scope;
        self.apply_filter();
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn rows(&self) -> impl Iterator<Item = &MonsterRecord> + '_ {
        self.visible.iter().map(|&i| &self.dataset[i])
    }

    pub fn row_count(&self) -> usize {
        self.visible.len()
    }

    pub fn dataset(&self) -> &[MonsterRecord] {
        &self.dataset
    }

    pub fn status(&self) -> String {
        format!(
            "Showing {} of {} creatures",
            self.visible.len(),
            self.dataset.len()
        )
    }

    /// Closest name when the search found nothing.
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref()
    }

    pub fn suggestion_text(&self) -> Option<String> {
        self.suggestion
            .as_ref()
            .map(|s| format!("Did you mean \"{}\"?", s))
    }

    /// Arrow for a header, or `None` when the table is not sorted by it.
    pub fn sort_indicator(&self, column: Column) -> Option<&'static str> {
        (self.sort.column == column).then(|| self.sort.direction.indicator())
    }

    fn matches(&self, idx: usize) -> bool {
        if self.term.is_empty() {
            return true;
        }
        match self.scope {
            FilterScope::Name => self.names[idx].contains(&self.term),
            FilterScope::AllColumns => Column::ALL
                .iter()
                .any(|&c| self.dataset[idx].cell(c).to_lowercase().contains(&self.term)),
        }
    }

    fn apply_filter(&mut self) {
        self.visible = (0..self.dataset.len()).filter(|&i| self.matches(i)).collect();
        self.suggestion = if !self.term.is_empty() && self.visible.is_empty() {
            best_suggestion(&self.term, self.names.iter().map(String::as_str)).map(str::to_string)
        } else {
            None
        };
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        let SortState { column, direction } = self.sort;
        let dataset = &self.dataset;
        self.visible.sort_by(|&a, &b| {
            let ord = compare(&dataset[a], &dataset[b], column);
            match direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }
}
