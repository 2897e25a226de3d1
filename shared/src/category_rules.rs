//! Category + matching-rule editor.
//!
//! The page holds one outer formset of categories; every category owns an
//! inline formset of rules. All edits happen on this model and the page is
//! rendered from it, so the management counters can never drift from the
//! forms actually present.

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::formset::{field_id, FormInstance, Formset, DEFAULT_MAX_NUM_FORMS};
use crate::matching::MatchType;

pub const DEFAULT_CATEGORY_PREFIX: &str = "category_set";
pub const CATEGORY_FK: &str = "user";
pub const RULE_FK: &str = "category";

pub const NAME_FIELD: &str = "name";
pub const PRIORITY_FIELD: &str = "priority";
pub const MATCH_TEXT_FIELD: &str = "match_text";
pub const MATCH_TYPE_FIELD: &str = "match_type";

/// Tags that never start a drag, so form controls inside a card stay usable.
const NON_DRAG_TAGS: [&str; 5] = ["BUTTON", "SELECT", "INPUT", "TEXTAREA", "OPTION"];

/// True when a drag may start on an element with this tag name.
pub fn is_drag_handle(tag_name: &str) -> bool {
    !NON_DRAG_TAGS
        .iter()
        .any(|tag| tag.eq_ignore_ascii_case(tag_name))
}

/// Prefix of the rule formset of a persisted category.
pub fn rule_prefix_for_saved(category_pk: i64) -> String {
    format!("category-{}", category_pk)
}

/// Prefix of the rule formset of a category that has not been saved yet.
pub fn rule_prefix_for_new(category_prefix: &str, category_index: usize) -> String {
    format!("new-category-{}-{}", category_prefix, category_index)
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleForm {
    pub match_text: String,
    pub match_type: MatchType,
}

impl RuleForm {
    /// Client-side check run before submission.
    pub fn validate(&self) -> Option<String> {
        self.match_type.validate(&self.match_text)
    }

    pub fn matches(&self, description: &str) -> bool {
        !self.match_text.is_empty() && self.match_type.matches(&self.match_text, description)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryForm {
    pub name: String,
    pub priority: usize,
    pub rules: Formset<RuleForm>,
    /// Collapse state of the card; cosmetic only.
    pub expanded: bool,
}

// Page data embedded by the server.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRulesPayload {
    #[serde(default = "default_category_prefix")]
    pub prefix: String,
    #[serde(default = "default_category_fk")]
    pub fk_name: Option<String>,
    #[serde(default)]
    pub parent_pk: Option<i64>,
    pub initial_forms: usize,
    #[serde(default)]
    pub min_num_forms: usize,
    #[serde(default = "default_max_num_forms")]
    pub max_num_forms: usize,
    #[serde(default)]
    pub non_form_errors: Vec<String>,
    pub categories: Vec<CategoryPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPayload {
    #[serde(default)]
    pub pk: Option<i64>,
    #[serde(default)]
    pub name: String,
    /// Bound value after a failed submission; decides display order.
    #[serde(default)]
    pub priority: Option<usize>,
    #[serde(default)]
    pub errors: Vec<String>,
    pub rules: RuleFormsetPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleFormsetPayload {
    /// Overrides the derived prefix; the server sends the one it rendered.
    #[serde(default)]
    pub prefix: Option<String>,
    pub initial_forms: usize,
    #[serde(default)]
    pub rules: Vec<RulePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulePayload {
    #[serde(default)]
    pub pk: Option<i64>,
    #[serde(default)]
    pub match_text: String,
    #[serde(default)]
    pub match_type: MatchType,
    #[serde(default)]
    pub errors: Vec<String>,
}

fn default_category_prefix() -> String {
    DEFAULT_CATEGORY_PREFIX.to_string()
}

fn default_category_fk() -> Option<String> {
    Some(CATEGORY_FK.to_string())
}

fn default_max_num_forms() -> usize {
    DEFAULT_MAX_NUM_FORMS
}

/// Result of testing a description against the current rules.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewMatch {
    pub category_index: usize,
    pub category_name: String,
    pub rule_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRulesEditor {
    categories: Formset<CategoryForm>,
    /// DOM id of the field that should receive focus after the next render.
    focus: Option<String>,
}

impl CategoryRulesEditor {
    pub fn from_json(json: &str) -> Result<Self> {
        let payload: CategoryRulesPayload = serde_json::from_str(json)?;
        Ok(Self::from_payload(payload))
    }

    pub fn from_payload(payload: CategoryRulesPayload) -> Self {
        let category_prefix = payload.prefix.clone();
        let forms = payload.categories.into_iter().enumerate().map(|(index, category)| {
            let rule_prefix = category.rules.prefix.clone().unwrap_or_else(|| match category.pk {
                Some(pk) => rule_prefix_for_saved(pk),
                None => rule_prefix_for_new(&category_prefix, index),
            });
            let mut rules = Formset::load(
                rule_prefix,
                category.rules.initial_forms,
                category.rules.rules.into_iter().map(|rule| {
                    (
                        rule.pk,
                        RuleForm {
                            match_text: rule.match_text,
                            match_type: rule.match_type,
                        },
                        rule.errors,
                    )
                }),
            )
            .with_parent(RULE_FK, category.pk);
            if rules.total_forms() == 0 {
                // Every card shows at least one rule row.
                rules.push_new(RuleForm::default());
            }
            let form = CategoryForm {
                name: category.name,
                priority: category.priority.unwrap_or(index),
                rules,
                expanded: false,
            };
            (category.pk, form, category.errors)
        });

        let mut categories = Formset::load(payload.prefix, payload.initial_forms, forms);
        if let Some(fk_name) = payload.fk_name {
            categories = categories.with_parent(fk_name, payload.parent_pk);
        }
        categories.min_num_forms = payload.min_num_forms;
        categories.max_num_forms = payload.max_num_forms;
        categories.non_form_errors = payload.non_form_errors;
        // Redisplayed pages carry the priorities the user submitted.
        categories.sort_by_key(|category| category.data.priority);

        let mut editor = Self {
            categories,
            focus: None,
        };
        editor.reprioritize();
        editor
    }

    pub fn categories(&self) -> &Formset<CategoryForm> {
        &self.categories
    }

    pub fn category(&self, category: usize) -> Result<&FormInstance<CategoryForm>> {
        self.categories.get(category)
    }

    /// Takes the pending focus target, if any.
    pub fn take_focus(&mut self) -> Option<String> {
        self.focus.take()
    }

    pub fn focus(&self) -> Option<&str> {
        self.focus.as_deref()
    }

    pub fn toggle_expand(&mut self, category: usize) -> Result<()> {
        let form = &mut self.categories.get_mut(category)?.data;
        form.expanded = !form.expanded;
        Ok(())
    }

    /// Soft-deletes a rule. When it is the only visible rule of its category
    /// a blank replacement is appended first, so the card never shows zero
    /// rows and the rule count never shrinks.
    pub fn delete_rule(&mut self, category: usize, rule: usize) -> Result<()> {
        let rules = &mut self.categories.get_mut(category)?.data.rules;
        let target = rules.get(rule)?;
        if target.is_visible() && rules.visible_count() == 1 {
            rules.push_new(RuleForm::default());
        }
        rules.mark_for_deletion(rule)
    }

    /// Appends a blank rule to a category and returns the id of the field to
    /// focus. `for_new_category` seeds the first rule, index 0, of an unsaved
    /// category whose rule formset is still empty, and leaves focus alone.
    pub fn add_rule(&mut self, category: usize, for_new_category: bool) -> Result<Option<String>> {
        let instance = self.categories.get_mut(category)?;
        let rules = &mut instance.data.rules;
        if for_new_category && (instance.pk.is_some() || rules.total_forms() > 0) {
            return Err(EditorError::RulesAlreadyStarted(rules.prefix.clone()));
        }
        let index = rules.push_new(RuleForm::default());
        if for_new_category {
            return Ok(None);
        }
        let focus = field_id(&rules.field_name(index, MATCH_TEXT_FIELD));
        self.focus = Some(focus.clone());
        Ok(Some(focus))
    }

    pub fn delete_category(&mut self, category: usize) -> Result<()> {
        self.categories.mark_for_deletion(category)
    }

    /// Appends an empty category holding exactly one blank rule and returns
    /// its index. Focus moves to the new name field.
    pub fn add_category(&mut self) -> Result<usize> {
        let index = self.categories.total_forms();
        let prefix = rule_prefix_for_new(&self.categories.prefix, index);
        let pushed = self.categories.push_new(CategoryForm {
            name: String::new(),
            priority: 0,
            rules: Formset::new(prefix).with_parent(RULE_FK, None),
            expanded: true,
        });
        debug_assert_eq!(pushed, index);
        self.add_rule(index, true)?;
        self.reprioritize();
        self.focus = Some(field_id(&self.categories.field_name(index, NAME_FIELD)));
        Ok(index)
    }

    /// Drag-and-drop reorder by display position.
    pub fn move_category(&mut self, from: usize, to: usize) -> Result<()> {
        self.categories.move_item(from, to)?;
        self.reprioritize();
        Ok(())
    }

    /// Writes each card's display position into its priority, soft-deleted
    /// cards included.
    pub fn reprioritize(&mut self) {
        for (position, instance) in self.categories.iter_mut().enumerate() {
            instance.data.priority = position;
        }
    }

    pub fn set_category_name(&mut self, category: usize, name: String) -> Result<()> {
        self.categories.get_mut(category)?.data.name = name;
        Ok(())
    }

    pub fn set_rule_text(&mut self, category: usize, rule: usize, text: String) -> Result<()> {
        self.rule_mut(category, rule)?.match_text = text;
        Ok(())
    }

    pub fn set_rule_match_type(&mut self, category: usize, rule: usize, match_type: MatchType) -> Result<()> {
        self.rule_mut(category, rule)?.match_type = match_type;
        Ok(())
    }

    /// First visible category, in display order, with a visible rule that
    /// matches `description`.
    pub fn preview(&self, description: &str) -> Option<PreviewMatch> {
        self.categories.visible().find_map(|category| {
            category
                .data
                .rules
                .visible()
                .find(|rule| rule.data.matches(description))
                .map(|rule| PreviewMatch {
                    category_index: category.index,
                    category_name: category.data.name.clone(),
                    rule_index: rule.index,
                })
        })
    }

    /// Validation problems of visible rules as `(category, rule, message)`.
    pub fn validation_errors(&self) -> Vec<(usize, usize, String)> {
        self.categories
            .visible()
            .flat_map(|category| {
                category.data.rules.visible().filter_map(move |rule| {
                    rule.data
                        .validate()
                        .map(|message| (category.index, rule.index, message))
                })
            })
            .collect()
    }

    /// Every `(name, value)` pair the form submits, in document order.
    pub fn form_data(&self) -> Vec<(String, String)> {
        let categories = &self.categories;
        let mut data = categories.management_fields();
        for category in categories.items() {
            data.extend(categories.bookkeeping_fields(category));
            data.push((categories.field_name(category.index, NAME_FIELD), category.data.name.clone()));
            data.push((
                categories.field_name(category.index, PRIORITY_FIELD),
                category.data.priority.to_string(),
            ));

            let rules = &category.data.rules;
            data.extend(rules.management_fields());
            for rule in rules.items() {
                data.extend(rules.bookkeeping_fields(rule));
                data.push((rules.field_name(rule.index, MATCH_TEXT_FIELD), rule.data.match_text.clone()));
                data.push((
                    rules.field_name(rule.index, MATCH_TYPE_FIELD),
                    rule.data.match_type.as_str().to_string(),
                ));
            }
        }
        data
    }

    fn rule_mut(&mut self, category: usize, rule: usize) -> Result<&mut RuleForm> {
        Ok(&mut self.categories.get_mut(category)?.data.rules.get_mut(rule)?.data)
    }
}
