//! Pulls declarations out of a feed stylesheet so a rule can inherit them.

use crate::style::owned_css::OwnedStylesheet;

/// Serializes the declarations of the first feed rule whose prelude is
/// exactly `selector_name`, one declaration per line.
///
/// Every top-level rule is a candidate, at-rules included, so `@page :first`
/// is found by `:first`. Returns an empty string when there is no feed or
/// nothing matches. Only the first match counts.
///
/// # Arguments
///
/// * `feed` - The resolved stylesheet of the feed rule, if any.
/// * `selector_name` - The raw prelude to look for, e.g. `.button`.
pub fn extend(feed: Option<&OwnedStylesheet>, selector_name: &str) -> String {
    let Some(feed) = feed else {
        return String::new();
    };

    feed.rules
        .iter()
        .find(|rule| rule.prelude == selector_name)
        .map(|rule| {
            rule.declarations
                .iter()
                .map(|decl| decl.to_string())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default()
}
