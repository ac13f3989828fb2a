//! Rewrites parsed selectors so they live under a caller-supplied parent scope.

use crate::style::owned_css::OwnedRule;

/// Marker replaced by the parent scope wherever it appears.
const PARENT_REFERENCE: char = '&';

/// Adjust one selector against the parent scope.
///
/// * `&` anywhere: every occurrence is replaced by `parent`.
/// * leading `:`: `parent` is prepended with no separator (`.btn:hover`).
/// * anything else is already a full selector and comes back trimmed.
pub fn adjust_name(selector: &str, parent: &str) -> String {
    let selector = selector.trim();

    if selector.contains(PARENT_REFERENCE) {
        selector.replace(PARENT_REFERENCE, parent)
    } else if selector.starts_with(':') {
        format!("{}{}", parent, selector)
    } else {
        selector.to_string()
    }
}

/// Rewrites a rule's selectors in place and walks into at-rule bodies.
///
/// Nested at-rules recurse; other nested rules only get their own selectors
/// adjusted.
pub fn morph_rule(rule: &mut OwnedRule, parent: &str) {
    adjust_selectors(&mut rule.selectors, parent);

    for nested in &mut rule.rules {
        if nested.is_at_rule() {
            morph_rule(nested, parent);
            continue;
        }

        adjust_selectors(&mut nested.selectors, parent);
    }
}

fn adjust_selectors(selectors: &mut [String], parent: &str) {
    for selector in selectors.iter_mut() {
        *selector = adjust_name(selector, parent);
    }
}
