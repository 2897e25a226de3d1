pub mod use_category_rules;
pub mod use_transaction_grid;

pub use use_category_rules::use_category_rules;
pub use use_transaction_grid::use_transaction_grid;
