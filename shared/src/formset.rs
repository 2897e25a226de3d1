//! Client-side model of a server formset.
//!
//! A formset is a list of structurally identical sub-forms plus the
//! management fields (`TOTAL_FORMS`, `INITIAL_FORMS`, ...) the server uses to
//! parse the list back out of a single submission. Every sub-form owns a fixed
//! index in `0..total_forms()`; field names are rendered from
//! `prefix-index-field` so nothing ever has to be renumbered in place.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

pub const TOTAL_FORMS: &str = "TOTAL_FORMS";
pub const INITIAL_FORMS: &str = "INITIAL_FORMS";
pub const MIN_NUM_FORMS: &str = "MIN_NUM_FORMS";
pub const MAX_NUM_FORMS: &str = "MAX_NUM_FORMS";
pub const DELETE_FIELD: &str = "DELETE";
pub const ID_FIELD: &str = "id";

/// Default upper bound the server advertises for a formset.
pub const DEFAULT_MAX_NUM_FORMS: usize = 1000;

/// `prefix-index-field`
pub fn field_name(prefix: &str, index: usize, field: &str) -> String {
    format!("{}-{}-{}", prefix, index, field)
}

/// DOM id the server would give the input named `name`.
pub fn field_id(name: &str) -> String {
    format!("id_{}", name)
}

/// `prefix-TOTAL_FORMS` and friends.
pub fn management_name(prefix: &str, field: &str) -> String {
    format!("{}-{}", prefix, field)
}

/// Deletion state of a sub-form. Soft-deleted forms stay in the formset so
/// the submission keeps its indices; they are hidden and send `DELETE=on`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ItemState {
    #[default]
    Active,
    MarkedForDeletion,
}

impl ItemState {
    pub fn is_visible(self) -> bool {
        self == ItemState::Active
    }

    /// Value of the hidden `DELETE` input.
    pub fn delete_value(self) -> &'static str {
        match self {
            ItemState::Active => "",
            ItemState::MarkedForDeletion => "on",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormInstance<T> {
    pub index: usize,
    /// Primary key of the persisted record, `None` for unsaved forms.
    pub pk: Option<i64>,
    pub state: ItemState,
    pub data: T,
    /// Validation messages rendered by the server on a failed submission.
    pub errors: Vec<String>,
}

impl<T> FormInstance<T> {
    pub fn is_visible(&self) -> bool {
        self.state.is_visible()
    }

    pub fn is_new(&self) -> bool {
        self.pk.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Formset<T> {
    pub prefix: String,
    /// Name of the hidden field pointing at the parent record, if inline.
    pub fk_name: Option<String>,
    pub parent_pk: Option<i64>,
    /// Instances in display order.
    items: Vec<FormInstance<T>>,
    initial_forms: usize,
    pub min_num_forms: usize,
    pub max_num_forms: usize,
    pub non_form_errors: Vec<String>,
}

impl<T> Formset<T> {
    /// An empty formset with no persisted forms.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            fk_name: None,
            parent_pk: None,
            items: Vec::new(),
            initial_forms: 0,
            min_num_forms: 0,
            max_num_forms: DEFAULT_MAX_NUM_FORMS,
            non_form_errors: Vec::new(),
        }
    }

    pub fn with_parent(mut self, fk_name: impl Into<String>, parent_pk: Option<i64>) -> Self {
        self.fk_name = Some(fk_name.into());
        self.parent_pk = parent_pk;
        self
    }

    /// Loads forms rendered by the server. Indices follow load order and
    /// `INITIAL_FORMS` is taken as given, since the server counts persisted
    /// forms ahead of extra ones.
    pub fn load(
        prefix: impl Into<String>,
        initial_forms: usize,
        forms: impl IntoIterator<Item = (Option<i64>, T, Vec<String>)>,
    ) -> Self {
        let mut formset = Self::new(prefix);
        for (pk, data, errors) in forms {
            let index = formset.items.len();
            formset.items.push(FormInstance {
                index,
                pk,
                state: ItemState::Active,
                data,
                errors,
            });
        }
        formset.initial_forms = initial_forms.min(formset.items.len());
        formset
    }

    /// Number of forms present in the submission, visible or soft-deleted.
    pub fn total_forms(&self) -> usize {
        self.items.len()
    }

    pub fn initial_forms(&self) -> usize {
        self.initial_forms
    }

    pub fn visible_count(&self) -> usize {
        self.items.iter().filter(|item| item.is_visible()).count()
    }

    pub fn items(&self) -> &[FormInstance<T>] {
        &self.items
    }

    pub fn visible(&self) -> impl Iterator<Item = &FormInstance<T>> {
        self.items.iter().filter(|item| item.is_visible())
    }

    pub fn position_of(&self, index: usize) -> Result<usize> {
        self.items
            .iter()
            .position(|item| item.index == index)
            .ok_or_else(|| self.unknown(index))
    }

    pub fn get(&self, index: usize) -> Result<&FormInstance<T>> {
        let position = self.position_of(index)?;
        Ok(&self.items[position])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut FormInstance<T>> {
        let position = self.position_of(index)?;
        Ok(&mut self.items[position])
    }

    /// Appends a fresh, unsaved form and returns its index.
    pub fn push_new(&mut self, data: T) -> usize {
        let index = self.items.len();
        self.items.push(FormInstance {
            index,
            pk: None,
            state: ItemState::Active,
            data,
            errors: Vec::new(),
        });
        index
    }

    pub fn mark_for_deletion(&mut self, index: usize) -> Result<()> {
        self.get_mut(index)?.state = ItemState::MarkedForDeletion;
        Ok(())
    }

    /// Moves the instance at display position `from` to position `to`.
    /// Indices are untouched; only display order changes.
    pub fn move_item(&mut self, from: usize, to: usize) -> Result<()> {
        let len = self.items.len();
        for position in [from, to] {
            if position >= len {
                return Err(EditorError::PositionOutOfRange { position, len });
            }
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        Ok(())
    }

    /// Stable reorder of the display order by `key`. Indices are untouched.
    pub fn sort_by_key<K: Ord>(&mut self, key: impl FnMut(&FormInstance<T>) -> K) {
        self.items.sort_by_key(key);
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FormInstance<T>> {
        self.items.iter_mut()
    }

    pub fn field_name(&self, index: usize, field: &str) -> String {
        field_name(&self.prefix, index, field)
    }

    pub fn management_fields(&self) -> Vec<(String, String)> {
        vec![
            (management_name(&self.prefix, TOTAL_FORMS), self.total_forms().to_string()),
            (management_name(&self.prefix, INITIAL_FORMS), self.initial_forms.to_string()),
            (management_name(&self.prefix, MIN_NUM_FORMS), self.min_num_forms.to_string()),
            (management_name(&self.prefix, MAX_NUM_FORMS), self.max_num_forms.to_string()),
        ]
    }

    /// Hidden bookkeeping fields of one instance: `id`, the parent key when
    /// inline, and `DELETE`.
    pub fn bookkeeping_fields(&self, item: &FormInstance<T>) -> Vec<(String, String)> {
        let mut fields = vec![(
            self.field_name(item.index, ID_FIELD),
            item.pk.map(|pk| pk.to_string()).unwrap_or_default(),
        )];
        if let Some(fk_name) = &self.fk_name {
            fields.push((
                self.field_name(item.index, fk_name),
                self.parent_pk.map(|pk| pk.to_string()).unwrap_or_default(),
            ));
        }
        fields.push((
            self.field_name(item.index, DELETE_FIELD),
            item.state.delete_value().to_string(),
        ));
        fields
    }

    fn unknown(&self, index: usize) -> EditorError {
        EditorError::UnknownForm {
            prefix: self.prefix.clone(),
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Formset<&'static str> {
        Formset::load(
            "category-4",
            2,
            vec![
                (Some(10), "a", vec![]),
                (Some(11), "b", vec!["bad".to_string()]),
                (None, "", vec![]),
            ],
        )
    }

    #[test]
    fn test_field_naming() {
        assert_eq!(field_name("category-4", 2, "match_text"), "category-4-2-match_text");
        assert_eq!(field_id("category-4-2-match_text"), "id_category-4-2-match_text");
        assert_eq!(management_name("category_set", TOTAL_FORMS), "category_set-TOTAL_FORMS");
    }

    #[test]
    fn test_load_assigns_indices_in_order() {
        let formset = sample();
        let indices: Vec<usize> = formset.items().iter().map(|item| item.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(formset.total_forms(), 3);
        assert_eq!(formset.initial_forms(), 2);
    }

    #[test]
    fn test_initial_forms_never_exceeds_total() {
        let formset: Formset<()> = Formset::load("p", 5, vec![(Some(1), (), vec![])]);
        assert_eq!(formset.initial_forms(), 1);
    }

    #[test]
    fn test_push_new_takes_next_index() {
        let mut formset = sample();
        let index = formset.push_new("c");
        assert_eq!(index, 3);
        assert_eq!(formset.total_forms(), 4);
        assert_eq!(formset.initial_forms(), 2);
        let item = formset.get(3).unwrap();
        assert!(item.is_new());
        assert!(item.errors.is_empty());
    }

    #[test]
    fn test_soft_delete_keeps_total() {
        let mut formset = sample();
        formset.mark_for_deletion(1).unwrap();
        assert_eq!(formset.total_forms(), 3);
        assert_eq!(formset.visible_count(), 2);
        assert_eq!(formset.get(1).unwrap().state, ItemState::MarkedForDeletion);
    }

    #[test]
    fn test_unknown_index_is_an_error() {
        let mut formset = sample();
        assert!(matches!(
            formset.mark_for_deletion(9),
            Err(EditorError::UnknownForm { index: 9, .. })
        ));
    }

    #[test]
    fn test_move_item_keeps_indices() {
        let mut formset = sample();
        formset.move_item(2, 0).unwrap();
        let indices: Vec<usize> = formset.items().iter().map(|item| item.index).collect();
        assert_eq!(indices, vec![2, 0, 1]);
        assert_eq!(formset.position_of(1).unwrap(), 2);
        assert!(formset.move_item(0, 3).is_err());
    }

    #[test]
    fn test_management_fields() {
        let formset = sample();
        assert_eq!(
            formset.management_fields(),
            vec![
                ("category-4-TOTAL_FORMS".to_string(), "3".to_string()),
                ("category-4-INITIAL_FORMS".to_string(), "2".to_string()),
                ("category-4-MIN_NUM_FORMS".to_string(), "0".to_string()),
                ("category-4-MAX_NUM_FORMS".to_string(), "1000".to_string()),
            ]
        );
    }

    #[test]
    fn test_bookkeeping_fields_with_parent() {
        let mut formset = sample().with_parent("category", Some(4));
        formset.mark_for_deletion(0).unwrap();
        let first = formset.get(0).unwrap().clone();
        assert_eq!(
            formset.bookkeeping_fields(&first),
            vec![
                ("category-4-0-id".to_string(), "10".to_string()),
                ("category-4-0-category".to_string(), "4".to_string()),
                ("category-4-0-DELETE".to_string(), "on".to_string()),
            ]
        );
        let extra = formset.get(2).unwrap().clone();
        assert_eq!(formset.bookkeeping_fields(&extra)[0].1, "");
        assert_eq!(formset.bookkeeping_fields(&extra)[2].1, "");
    }
}
