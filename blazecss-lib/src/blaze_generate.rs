use crate::error::{MinifyError, RuleError};
use crate::rule::Rule;
use crate::style::blaze_css;
use crate::style::owned_css::OwnedStylesheet;
use serde::Serialize;
use std::sync::Arc;

pub mod blaze_rules {
    use super::*;

    /// Template sources for a rule, its feed, and its dependencies.
    #[derive(Debug, Default, Clone)]
    pub struct RuleSources<'a> {
        pub template: &'a str,
        pub feed: Option<&'a str>,
        pub depends: Vec<&'a str>,
        pub lenient: bool,
    }

    /// Compiles the feed and dependencies first, then the rule wired to them.
    pub fn build(sources: &RuleSources<'_>) -> Result<Rule, RuleError> {
        let strict = !sources.lenient;

        let feed = match sources.feed {
            Some(text) => Some(Arc::new(Rule::parse(text)?.with_strict(strict))),
            None => None,
        };

        let depends = sources
            .depends
            .iter()
            .map(|text| Rule::parse(text).map(|rule| Arc::new(rule.with_strict(strict))))
            .collect::<Result<Vec<_>, RuleError>>()?;

        Ok(Rule::new(sources.template, feed, depends)?.with_strict(strict))
    }

    /// Builds the rule chain and resolves it into a stylesheet.
    pub fn generate<T: Serialize>(
        sources: &RuleSources<'_>,
        binding: &T,
        parent: &str,
    ) -> Result<OwnedStylesheet, RuleError> {
        build(sources)?.stylesheet(binding, parent)
    }

    /// Serializes a stylesheet, optionally minified.
    pub fn emit(sheet: &OwnedStylesheet, minify: bool) -> Result<String, MinifyError> {
        let css = sheet.to_css();
        if minify {
            blaze_css::minify_css(&css)
        } else {
            Ok(css)
        }
    }
}
