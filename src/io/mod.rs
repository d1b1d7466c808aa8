pub mod format;
pub mod rules;
pub mod table;
