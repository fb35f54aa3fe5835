//! Resource name and URL derivation.
//!
//! A resource type declares a singular remote name (e.g. `enterprise`). Its
//! collection is addressed by the plural of that name unless the type fixes
//! its resource name.
//!
//! # Example
//!
//! ```rust
//! use rest_resource::rest::{collection_url, item_url, pluralize};
//!
//! assert_eq!(pluralize("policy"), "policies");
//! assert_eq!(collection_url("https://api.example.com/v5_0", "groups"), "https://api.example.com/v5_0/groups");
//! assert_eq!(item_url("https://api.example.com/v5_0", "groups", "42"), "https://api.example.com/v5_0/groups/42");
//! ```

/// Returns the plural of a singular remote name.
///
/// - A name ending in a consonant followed by `y` replaces the `y` with `ies`.
/// - A name ending in `s` is returned unchanged.
/// - Any other name gets an `s` appended.
///
/// Irregular plurals are not handled.
#[must_use]
pub fn pluralize(name: &str) -> String {
    if name.is_empty() {
        return String::new();
    }

    if let Some(stem) = name.strip_suffix('y') {
        let consonant_before = stem
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphabetic() && !is_vowel(c));
        if consonant_before {
            return format!("{stem}ies");
        }
        return format!("{name}s");
    }

    if name.ends_with('s') {
        return name.to_string();
    }

    format!("{name}s")
}

const fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

/// Returns the collection name for a remote name.
#[must_use]
pub fn resource_name(remote_name: &str, fixed: bool) -> String {
    if fixed {
        remote_name.to_string()
    } else {
        pluralize(remote_name)
    }
}

/// Returns the URL of a collection.
#[must_use]
pub fn collection_url(base_url: &str, resource_name: &str) -> String {
    format!("{base_url}/{resource_name}")
}

/// Returns the URL of one resource; the id is percent-encoded.
#[must_use]
pub fn item_url(base_url: &str, resource_name: &str, id: &str) -> String {
    format!("{base_url}/{resource_name}/{}", urlencoding::encode(id))
}
