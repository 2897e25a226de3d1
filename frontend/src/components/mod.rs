pub mod category_rules;
pub mod transactions;
