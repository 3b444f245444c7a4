//! Built-in source descriptors.
//!
//! Each module builds the descriptor of one job board's public JSON API.

mod amazon;
mod google;
mod microsoft;
mod netflix;

pub use amazon::amazon_descriptor;
pub use google::google_descriptor;
pub use microsoft::microsoft_descriptor;
pub use netflix::netflix_descriptor;

use crate::descriptor::SourceDescriptor;

/// Returns every built-in descriptor, two-phase sources first.
pub fn builtin_descriptors() -> Vec<SourceDescriptor> {
    vec![
        microsoft_descriptor(),
        google_descriptor(),
        amazon_descriptor(),
        netflix_descriptor(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_valid() {
        for desc in builtin_descriptors() {
            assert!(desc.validate().is_ok(), "{} should validate", desc.id);
        }
    }
}
