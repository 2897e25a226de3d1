//! Bulk transaction editor: the grid model behind the upload review table.
//!
//! The grid keeps every row as loaded plus its edited view, the edited
//! cells in edit order and the rows selected for deletion. Saving turns
//! that into a [`ChangeSet`] holding only the delta.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono_tz::Tz;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::dates::format_date;
use crate::error::{EditorError, Result};

/// Server key of a category option. Keys come back exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CategoryKey {
    Id(i64),
    Slug(String),
}

/// Choices for the category editor, built from `[[key, label], ...]`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CategoryOptions {
    names: Vec<String>,
    keys: HashMap<String, CategoryKey>,
}

impl CategoryOptions {
    pub fn from_json(json: &str) -> Result<Self> {
        let pairs: Vec<(CategoryKey, String)> = serde_json::from_str(json)?;
        Ok(Self::from_pairs(pairs))
    }

    /// A repeated label keeps the key that came last.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (CategoryKey, String)>) -> Self {
        let mut options = Self::default();
        for (key, name) in pairs {
            options.names.push(name.clone());
            options.keys.insert(name, key);
        }
        options
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn key_for(&self, name: &str) -> Option<&CategoryKey> {
        self.keys.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.keys.contains_key(name)
    }
}

/// One transaction as served for the review table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    #[serde(deserialize_with = "lenient_i64")]
    pub idx: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub accnt: String,
    #[serde(default)]
    pub desc: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub amnt: f64,
    #[serde(default)]
    pub cat: String,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub cat_o: bool,
}

/// Table data as returned for the data request: either a list of rows or
/// an object keyed by `idx`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TableData {
    Rows(Vec<TransactionRow>),
    Keyed(BTreeMap<String, TransactionRow>),
}

impl TableData {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn into_rows(self) -> Vec<TransactionRow> {
        match self {
            TableData::Rows(rows) => rows,
            TableData::Keyed(map) => {
                let mut rows: Vec<TransactionRow> = map.into_values().collect();
                rows.sort_by_key(|row| row.idx);
                rows
            }
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<N> {
    Number(N),
    Text(String),
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    match NumberOrText::<i64>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<f64, D::Error> {
    match NumberOrText::<f64>::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n),
        NumberOrText::Text(s) => s.trim().parse().map_err(de::Error::custom),
    }
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<bool, D::Error> {
    match NumberOrText::<bool>::deserialize(deserializer)? {
        NumberOrText::Number(b) => Ok(b),
        NumberOrText::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(true),
            "false" | "0" | "no" | "off" | "" => Ok(false),
            other => Err(de::Error::custom(format!("not a boolean: {}", other))),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Date,
    Account,
    Description,
    Amount,
    Category,
    Override,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SorterKind {
    Text,
    Number,
    Boolean,
}

impl Column {
    pub const ALL: [Column; 6] = [
        Column::Date,
        Column::Account,
        Column::Description,
        Column::Amount,
        Column::Category,
        Column::Override,
    ];

    pub fn field(self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Account => "accnt",
            Column::Description => "desc",
            Column::Amount => "amnt",
            Column::Category => "cat",
            Column::Override => "cat_o",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Account => "Account",
            Column::Description => "Description",
            Column::Amount => "Amount",
            Column::Category => "Category",
            Column::Override => "Category Override",
        }
    }

    pub fn sorter(self) -> SorterKind {
        match self {
            Column::Amount => SorterKind::Number,
            Column::Override => SorterKind::Boolean,
            _ => SorterKind::Text,
        }
    }

    pub fn is_editable(self) -> bool {
        matches!(self, Column::Category | Column::Override)
    }

    /// Cell text as shown in the grid.
    pub fn display(self, row: &TransactionRow, tz: Tz) -> String {
        match self {
            Column::Date => format_date(&row.date, tz),
            Column::Account => row.accnt.clone(),
            Column::Description => row.desc.clone(),
            Column::Amount => format!("{:.2}", row.amnt),
            Column::Category => row.cat.clone(),
            Column::Override => if row.cat_o { "\u{2714}" } else { "\u{2718}" }.to_string(),
        }
    }

    fn compare(self, a: &TransactionRow, b: &TransactionRow) -> Ordering {
        match self.sorter() {
            SorterKind::Number => a.amnt.partial_cmp(&b.amnt).unwrap_or(Ordering::Equal),
            SorterKind::Boolean => a.cat_o.cmp(&b.cat_o),
            SorterKind::Text => {
                let (a, b) = match self {
                    Column::Date => (&a.date, &b.date),
                    Column::Account => (&a.accnt, &b.accnt),
                    Column::Description => (&a.desc, &b.desc),
                    _ => (&a.cat, &b.cat),
                };
                a.to_lowercase().cmp(&b.to_lowercase())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    /// Edited view of the row.
    pub current: TransactionRow,
    /// The row as loaded.
    pub initial: TransactionRow,
    pub selected: bool,
}

impl GridRow {
    pub fn idx(&self) -> i64 {
        self.current.idx
    }
}

/// Category payload for one edited row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryChange {
    pub category: CategoryKey,
    #[serde(rename = "override")]
    pub override_category: bool,
}

/// Body of the save request.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ChangeSet {
    pub changes: BTreeMap<i64, CategoryChange>,
    pub deleted: Vec<i64>,
}

/// Body of the cancel request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub cancel: bool,
}

impl Default for CancelRequest {
    fn default() -> Self {
        Self { cancel: true }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionGrid {
    rows: Vec<GridRow>,
    options: CategoryOptions,
    /// Edited cells in the order they were first edited.
    edited: Vec<(i64, Column)>,
    anchor: Option<i64>,
    sort: Option<(Column, SortDirection)>,
}

impl TransactionGrid {
    pub fn new(rows: Vec<TransactionRow>, options: CategoryOptions) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| GridRow {
                initial: row.clone(),
                current: row,
                selected: false,
            })
            .collect();
        Self {
            rows,
            options,
            ..Self::default()
        }
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn options(&self) -> &CategoryOptions {
        &self.options
    }

    pub fn row(&self, idx: i64) -> Result<&GridRow> {
        self.rows
            .iter()
            .find(|row| row.idx() == idx)
            .ok_or(EditorError::UnknownRow(idx))
    }

    pub fn is_edited(&self, idx: i64, column: Column) -> bool {
        self.edited.contains(&(idx, column))
    }

    /// Sets a row's category. An explicit category always turns the
    /// override on.
    pub fn edit_category(&mut self, idx: i64, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(EditorError::EmptyCategory);
        }
        if !self.options.contains(name) {
            return Err(EditorError::UnknownCategory(name.to_string()));
        }
        let row = self.row_mut(idx)?;
        if row.current.cat == name {
            return Ok(());
        }
        row.current.cat = name.to_string();
        row.current.cat_o = true;
        self.mark_edited(idx, Column::Category);
        Ok(())
    }

    /// Sets a row's override flag. Turning it off hands the category back
    /// to the server: the cell returns to its loaded value.
    pub fn set_override(&mut self, idx: i64, value: bool) -> Result<()> {
        let row = self.row_mut(idx)?;
        if row.current.cat_o == value {
            return Ok(());
        }
        row.current.cat_o = value;
        if !value {
            row.current.cat = row.initial.cat.clone();
            self.edited.retain(|cell| *cell != (idx, Column::Category));
        }
        self.mark_edited(idx, Column::Override);
        Ok(())
    }

    /// Row selection in click-range mode: a plain click toggles the row and
    /// becomes the anchor, a range click selects everything between the
    /// anchor and the clicked row.
    pub fn click_row(&mut self, idx: i64, range: bool) -> Result<()> {
        let target = self.position(idx)?;
        let anchor = match (range, self.anchor) {
            (true, Some(anchor)) => self.position(anchor).ok(),
            _ => None,
        };
        match anchor {
            Some(anchor) => {
                let (start, end) = if anchor <= target { (anchor, target) } else { (target, anchor) };
                for row in &mut self.rows[start..=end] {
                    row.selected = true;
                }
            }
            None => {
                let row = &mut self.rows[target];
                row.selected = !row.selected;
                self.anchor = Some(idx);
            }
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for row in &mut self.rows {
            row.selected = false;
        }
        self.anchor = None;
    }

    /// Rows marked for deletion, in display order.
    pub fn selected_indices(&self) -> Vec<i64> {
        self.rows
            .iter()
            .filter(|row| row.selected)
            .map(GridRow::idx)
            .collect()
    }

    /// Rows owning at least one edited cell, once each, in edit order.
    pub fn edited_rows(&self) -> Vec<i64> {
        let mut rows = Vec::new();
        for (idx, _) in &self.edited {
            if !rows.contains(idx) {
                rows.push(*idx);
            }
        }
        rows
    }

    /// Builds the save request. Selected rows are deleted, so their edits
    /// are left out.
    pub fn changeset(&self) -> Result<ChangeSet> {
        let deleted = self.selected_indices();
        let mut changes = BTreeMap::new();
        for idx in self.edited_rows() {
            if deleted.contains(&idx) {
                continue;
            }
            let row = &self.row(idx)?.current;
            let category = self
                .options
                .key_for(&row.cat)
                .cloned()
                .ok_or_else(|| EditorError::UnknownCategory(row.cat.clone()))?;
            changes.insert(
                idx,
                CategoryChange {
                    category,
                    override_category: row.cat_o,
                },
            );
        }
        Ok(ChangeSet { changes, deleted })
    }

    pub fn sort(&self) -> Option<(Column, SortDirection)> {
        self.sort
    }

    /// Header click: sorts ascending, or flips direction when the column is
    /// already sorted.
    pub fn sort_by(&mut self, column: Column) {
        let direction = match self.sort {
            Some((sorted, SortDirection::Ascending)) if sorted == column => SortDirection::Descending,
            _ => SortDirection::Ascending,
        };
        self.rows.sort_by(|a, b| {
            let ordering = column.compare(&a.current, &b.current);
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        self.sort = Some((column, direction));
    }

    fn position(&self, idx: i64) -> Result<usize> {
        self.rows
            .iter()
            .position(|row| row.idx() == idx)
            .ok_or(EditorError::UnknownRow(idx))
    }

    fn row_mut(&mut self, idx: i64) -> Result<&mut GridRow> {
        self.rows
            .iter_mut()
            .find(|row| row.idx() == idx)
            .ok_or(EditorError::UnknownRow(idx))
    }

    fn mark_edited(&mut self, idx: i64, column: Column) {
        if !self.edited.contains(&(idx, column)) {
            self.edited.push((idx, column));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::parse_timezone;

    const OPTIONS: &str = r#"[[11, "Groceries"], [12, "Dining"], [13, "Rent"]]"#;

    fn row(idx: i64, desc: &str, amnt: f64, cat: &str) -> TransactionRow {
        TransactionRow {
            idx,
            date: "2024-05-01T12:00:00Z".to_string(),
            accnt: "Checking".to_string(),
            desc: desc.to_string(),
            amnt,
            cat: cat.to_string(),
            cat_o: false,
        }
    }

    fn grid() -> TransactionGrid {
        TransactionGrid::new(
            vec![
                row(1, "SAFEWAY", -54.20, "Groceries"),
                row(2, "PROPERTY MGMT", -1800.0, "Rent"),
                row(3, "CHIPOTLE", -13.75, "Dining"),
                row(4, "payroll", 2500.0, "Groceries"),
            ],
            CategoryOptions::from_json(OPTIONS).unwrap(),
        )
    }

    #[test]
    fn test_options_lookup() {
        let options = CategoryOptions::from_json(OPTIONS).unwrap();
        assert_eq!(options.names(), ["Groceries", "Dining", "Rent"]);
        assert_eq!(options.key_for("Dining"), Some(&CategoryKey::Id(12)));
        assert_eq!(options.key_for("Travel"), None);

        let slugs = CategoryOptions::from_json(r#"[["gro", "Groceries"]]"#).unwrap();
        assert_eq!(slugs.key_for("Groceries"), Some(&CategoryKey::Slug("gro".to_string())));
    }

    #[test]
    fn test_rows_load_from_strings_or_numbers() {
        let json = r#"[
            {"idx": "7", "date": "2024-01-02", "accnt": "Visa", "desc": "x", "amnt": "-3.50", "cat": "Rent", "cat_o": "False"},
            {"idx": 8, "amnt": 12, "cat_o": true}
        ]"#;
        let rows = TableData::from_json(json).unwrap().into_rows();
        assert_eq!(rows[0].idx, 7);
        assert_eq!(rows[0].amnt, -3.5);
        assert!(!rows[0].cat_o);
        assert_eq!(rows[1].idx, 8);
        assert!(rows[1].cat_o);
        assert_eq!(rows[1].cat, "");
    }

    #[test]
    fn test_keyed_rows_sorted_by_idx() {
        let json = r#"{
            "10": {"idx": 10, "amnt": 1.0},
            "9": {"idx": 9, "amnt": 2.0}
        }"#;
        let rows = TableData::from_json(json).unwrap().into_rows();
        assert_eq!(rows.iter().map(|r| r.idx).collect::<Vec<_>>(), vec![9, 10]);
    }

    #[test]
    fn test_category_edit_forces_override() {
        let mut grid = grid();
        grid.edit_category(1, "Dining").unwrap();
        let row = grid.row(1).unwrap();
        assert_eq!(row.current.cat, "Dining");
        assert!(row.current.cat_o);
        assert!(grid.is_edited(1, Column::Category));
        assert_eq!(row.initial.cat, "Groceries");
    }

    #[test]
    fn test_category_edit_is_validated() {
        let mut grid = grid();
        assert!(matches!(grid.edit_category(1, ""), Err(EditorError::EmptyCategory)));
        assert!(matches!(grid.edit_category(1, "Travel"), Err(EditorError::UnknownCategory(_))));
        assert!(matches!(grid.edit_category(99, "Rent"), Err(EditorError::UnknownRow(99))));
        assert!(grid.edited_rows().is_empty());
    }

    #[test]
    fn test_unchanged_value_is_not_an_edit() {
        let mut grid = grid();
        grid.edit_category(1, "Groceries").unwrap();
        grid.set_override(1, false).unwrap();
        assert!(grid.edited_rows().is_empty());
    }

    #[test]
    fn test_override_off_restores_loaded_category() {
        let mut grid = grid();
        grid.edit_category(1, "Dining").unwrap();
        grid.set_override(1, false).unwrap();
        let row = grid.row(1).unwrap();
        assert_eq!(row.current.cat, "Groceries");
        assert!(!row.current.cat_o);
        assert!(!grid.is_edited(1, Column::Category));
        assert!(grid.is_edited(1, Column::Override));

        let changes = grid.changeset().unwrap();
        assert_eq!(
            changes.changes[&1],
            CategoryChange {
                category: CategoryKey::Id(11),
                override_category: false
            }
        );
    }

    #[test]
    fn test_override_on_keeps_category() {
        let mut grid = grid();
        grid.set_override(3, true).unwrap();
        assert_eq!(grid.row(3).unwrap().current.cat, "Dining");
        assert!(grid.changeset().unwrap().changes[&3].override_category);
    }

    #[test]
    fn test_click_selection_toggles() {
        let mut grid = grid();
        grid.click_row(2, false).unwrap();
        grid.click_row(4, false).unwrap();
        assert_eq!(grid.selected_indices(), vec![2, 4]);
        grid.click_row(2, false).unwrap();
        assert_eq!(grid.selected_indices(), vec![4]);
        grid.clear_selection();
        assert!(grid.selected_indices().is_empty());
    }

    #[test]
    fn test_range_click_selects_between_anchor_and_target() {
        let mut grid = grid();
        grid.click_row(4, false).unwrap();
        grid.click_row(2, true).unwrap();
        assert_eq!(grid.selected_indices(), vec![2, 3, 4]);

        // Without an anchor a range click behaves like a plain click.
        let mut fresh = self::grid();
        fresh.click_row(3, true).unwrap();
        assert_eq!(fresh.selected_indices(), vec![3]);
    }

    #[test]
    fn test_changeset_scenario() {
        let mut grid = TransactionGrid::new(
            vec![row(1, "SAFEWAY", -54.2, "Groceries"), row(2, "RENT", -1800.0, "Rent")],
            CategoryOptions::from_json(OPTIONS).unwrap(),
        );
        grid.edit_category(1, "Dining").unwrap();
        grid.click_row(2, false).unwrap();
        let body = serde_json::to_string(&grid.changeset().unwrap()).unwrap();
        assert_eq!(body, r#"{"changes":{"1":{"category":12,"override":true}},"deleted":[2]}"#);
    }

    #[test]
    fn test_changeset_excludes_deleted_rows() {
        let mut grid = grid();
        grid.edit_category(1, "Rent").unwrap();
        grid.edit_category(3, "Groceries").unwrap();
        grid.set_override(1, false).unwrap();
        grid.edit_category(1, "Dining").unwrap();
        grid.click_row(3, false).unwrap();

        assert_eq!(grid.edited_rows(), vec![3, 1]);
        let changes = grid.changeset().unwrap();
        assert_eq!(changes.deleted, vec![3]);
        assert_eq!(changes.changes.keys().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(changes.changes[&1].category, CategoryKey::Id(12));
    }

    #[test]
    fn test_empty_changeset_and_cancel_body() {
        let grid = grid();
        let changes = grid.changeset().unwrap();
        assert_eq!(changes, ChangeSet::default());
        assert_eq!(serde_json::to_string(&changes).unwrap(), r#"{"changes":{},"deleted":[]}"#);
        assert_eq!(serde_json::to_string(&CancelRequest::default()).unwrap(), r#"{"cancel":true}"#);
    }

    #[test]
    fn test_sort_by_toggles_direction() {
        let mut grid = grid();
        grid.sort_by(Column::Amount);
        assert_eq!(grid.rows().iter().map(GridRow::idx).collect::<Vec<_>>(), vec![2, 1, 3, 4]);
        grid.sort_by(Column::Amount);
        assert_eq!(grid.sort(), Some((Column::Amount, SortDirection::Descending)));
        assert_eq!(grid.rows()[0].idx(), 4);

        grid.sort_by(Column::Description);
        assert_eq!(grid.rows().iter().map(GridRow::idx).collect::<Vec<_>>(), vec![3, 4, 2, 1]);
    }

    #[test]
    fn test_display_values() {
        let tz = parse_timezone("America/Los_Angeles").unwrap();
        let grid = grid();
        let first = &grid.rows()[0].current;
        assert_eq!(Column::Date.display(first, tz), "2024-05-01");
        assert_eq!(Column::Amount.display(first, tz), "-54.20");
        assert_eq!(Column::Category.field(), "cat");
        assert!(Column::Override.is_editable());
        assert!(!Column::Amount.is_editable());
    }
}
