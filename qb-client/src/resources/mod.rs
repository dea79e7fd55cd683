//! Request and response models for each API resource, with the
//! [`Client`](crate::Client) methods that call them.

pub mod apps;
pub mod fields;
pub mod files;
pub mod formula;
pub mod pages;
pub mod records;
pub mod relationships;
pub mod reports;
pub mod tables;
pub mod user_tokens;
pub mod variables;

pub(crate) fn is_false(b: &bool) -> bool {
    !*b
}
