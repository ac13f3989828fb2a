//! A single templated CSS rule, its extension feed and the rules it depends on.

use crate::error::RuleError;
use crate::helpers::register_helpers;
use crate::style::blaze_css;
use crate::style::owned_css::OwnedStylesheet;
use crate::style::scope::morph_rule;
use handlebars::{no_escape, Handlebars, Template};
use log::{debug, trace};
use serde::Serialize;
use std::sync::Arc;

const TEMPLATE_NAME: &str = "css";

/// Defines a single css rule which will be rendered with a binding, parsed,
/// and scoped to a parent selector.
///
/// A rule may pull declarations from a `feed` rule through the `extend`
/// template helper, and it may list `depends` rules whose output is placed
/// ahead of its own. The feed's rules never appear in the output.
#[derive(Debug, Clone)]
pub struct Rule {
    template: Template,
    feed: Option<Arc<Rule>>,
    depends: Vec<Arc<Rule>>,
    strict: bool,
}

impl Rule {
    /// Compiles a new rule.
    ///
    /// # Arguments
    ///
    /// * `rules` - Template text producing CSS, e.g. `& { width: {{add width 2}}px; }`.
    /// * `feed` - A rule whose resolved styles can be pulled in with `{{extend ".name"}}`.
    /// * `depends` - Rules rendered with the same binding and placed ahead of this one.
    pub fn new(
        rules: &str,
        feed: Option<Arc<Rule>>,
        depends: Vec<Arc<Rule>>,
    ) -> Result<Self, RuleError> {
        let template = Template::compile(rules)?;

        Ok(Rule {
            template,
            feed,
            depends,
            strict: true,
        })
    }

    /// A rule with no feed and no dependencies.
    pub fn parse(rules: &str) -> Result<Self, RuleError> {
        Self::new(rules, None, Vec::new())
    }

    /// In strict mode (the default) a binding field the template references
    /// but the binding lacks is a render error; otherwise it renders empty.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn feed(&self) -> Option<&Arc<Rule>> {
        self.feed.as_ref()
    }

    pub fn depends(&self) -> &[Arc<Rule>] {
        &self.depends
    }

    /// Resolves the rule into a stylesheet.
    ///
    /// The feed is resolved first so `extend` can see it, then every
    /// dependency in order, then this rule's own template. The first error
    /// anywhere aborts the whole call and is returned as is.
    ///
    /// # Arguments
    ///
    /// * `binding` - Data the templates are rendered against.
    /// * `parent` - Selector that `&` and leading `:` selectors resolve into.
    pub fn stylesheet<T: Serialize>(
        &self,
        binding: &T,
        parent: &str,
    ) -> Result<OwnedStylesheet, RuleError> {
        let feed_sheet = match &self.feed {
            Some(feed) => Some(feed.stylesheet(binding, parent)?),
            None => None,
        };

        let mut stylesheet = OwnedStylesheet::new();
        for rule in &self.depends {
            let sheet = rule.stylesheet(binding, parent)?;
            stylesheet.rules.extend(sheet.rules);
        }

        let content = self.render(binding, feed_sheet.as_ref())?;
        trace!("rendered rule template:\n{}", content);

        let mut sheet = blaze_css::parse(&content)?;
        for rule in &mut sheet.rules {
            morph_rule(rule, parent);
        }

        debug!(
            "resolved rule under {:?}: {} dependency rules, {} own rules",
            parent,
            stylesheet.len(),
            sheet.len()
        );

        stylesheet.rules.extend(sheet.rules);
        Ok(stylesheet)
    }

    /// Executes the template. The registry lives for one render so the
    /// `extend` helper can borrow this call's feed stylesheet.
    fn render<T: Serialize>(
        &self,
        binding: &T,
        feed: Option<&OwnedStylesheet>,
    ) -> Result<String, RuleError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(self.strict);
        registry.register_escape_fn(no_escape);
        register_helpers(&mut registry, feed);
        registry.register_template(TEMPLATE_NAME, self.template.clone());

        Ok(registry.render(TEMPLATE_NAME, binding)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CssErrorKind;
    use crate::style::owned_css::OwnedDeclaration;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn selectors(sheet: &OwnedStylesheet) -> Vec<String> {
        sheet
            .rules
            .iter()
            .flat_map(|rule| rule.selectors.clone())
            .collect()
    }

    #[test]
    fn test_rule_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Rule>();
    }

    #[test]
    fn test_malformed_template_fails_construction() {
        let err = Rule::parse(".a { width: {{add 1 2 }px; }").unwrap_err();
        assert!(matches!(err, RuleError::TemplateCompile(_)));

        let err = Rule::parse("{{#if ready}}.a { color: red; }{{/each}}").unwrap_err();
        assert!(matches!(err, RuleError::TemplateCompile(_)));
    }

    #[test]
    fn test_binding_and_helpers() {
        let rule = Rule::parse(
            "& { width: {{add width 10}}px; color: {{theme.color}}; }\n\
             &:hover { height: {{subtract 4 height}}px; }",
        )
        .unwrap();

        let binding = json!({ "width": 30, "height": 20, "theme": { "color": "navy" } });
        let sheet = rule.stylesheet(&binding, ".card").unwrap();

        assert_eq!(selectors(&sheet), vec![".card", ".card:hover"]);
        assert_eq!(
            sheet.rules[0].declarations,
            vec![
                OwnedDeclaration::new("width", "40px", false),
                OwnedDeclaration::new("color", "navy", false),
            ]
        );
        assert_eq!(
            sheet.rules[1].declarations,
            vec![OwnedDeclaration::new("height", "16px", false)]
        );
    }

    #[test]
    fn test_output_is_not_html_escaped() {
        let rule = Rule::parse("{{sel}} { content: \"{{text}}\"; }").unwrap();
        let sheet = rule
            .stylesheet(&json!({ "sel": "ul > li", "text": "a&b" }), ".x")
            .unwrap();

        assert_eq!(selectors(&sheet), vec!["ul > li"]);
        assert_eq!(sheet.rules[0].declarations[0].value, "\"a&b\"");
    }

    #[test]
    fn test_depends_order() {
        let b = Arc::new(Rule::parse(".b { color: blue; }").unwrap());
        let c = Arc::new(Rule::parse(".c1 { color: cyan; } .c2 { color: teal; }").unwrap());
        let a = Rule::new(".a { color: amber; }", None, vec![b, c]).unwrap();

        let sheet = a.stylesheet(&json!({}), "").unwrap();
        assert_eq!(selectors(&sheet), vec![".b", ".c1", ".c2", ".a"]);
    }

    #[test]
    fn test_feed_is_not_merged() {
        let feed = Arc::new(Rule::parse(".base { color: red; }").unwrap());
        let rule = Rule::new("", Some(feed), Vec::new()).unwrap();

        let sheet = rule.stylesheet(&json!({}), ".root").unwrap();
        assert!(sheet.is_empty());
    }

    #[test]
    fn test_extend_reads_feed() {
        let feed = Arc::new(
            Rule::parse(".base { color: red; font-weight: bold !important; } .base { color: blue; }")
                .unwrap(),
        );
        let rule = Rule::new("&:focus {\n{{extend \".base\"}}\n}", Some(feed), Vec::new()).unwrap();

        let sheet = rule.stylesheet(&json!({}), ".input").unwrap();
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.rules[0].selectors, vec![".input:focus".to_string()]);
        assert_eq!(
            sheet.rules[0].declarations,
            vec![
                OwnedDeclaration::new("color", "red", false),
                OwnedDeclaration::new("font-weight", "bold", true),
            ]
        );
    }

    #[test]
    fn test_extend_sees_feed_rendered_with_same_binding() {
        let feed = Arc::new(Rule::parse(".base { padding: {{gap}}px; }").unwrap());
        let rule = Rule::new("& { {{extend \".base\"}} }", Some(feed), Vec::new()).unwrap();

        for gap in [2, 8] {
            let sheet = rule.stylesheet(&json!({ "gap": gap }), ".box").unwrap();
            assert_eq!(sheet.rules[0].declarations[0].value, format!("{}px", gap));
        }
    }

    #[test]
    fn test_strict_and_lenient_missing_fields() {
        let strict = Rule::parse(".a { width: {{width}}px; }").unwrap();
        let err = strict.stylesheet(&json!({}), "").unwrap_err();
        assert!(matches!(err, RuleError::TemplateRender(_)));

        let lenient = Rule::parse(".a { color: red; width: {{width}}; }")
            .unwrap()
            .with_strict(false);
        let err = lenient.stylesheet(&json!({}), "").unwrap_err();
        assert!(matches!(
            err,
            RuleError::Css(ref css) if css.kind == CssErrorKind::EmptyValue("width".to_string())
        ));
    }

    #[test]
    fn test_css_error_after_render() {
        let rule = Rule::parse(".a { color: {{color}} ").unwrap();
        assert!(rule.stylesheet(&json!({ "color": "red" }), "").is_ok());

        let rule = Rule::parse("{{name}} color: red; }").unwrap();
        let err = rule.stylesheet(&json!({ "name": ".a" }), "").unwrap_err();
        assert!(matches!(err, RuleError::Css(_)));
    }

    #[test]
    fn test_first_dependency_error_short_circuits() {
        let broken = Arc::new(Rule::parse(".a { color: ; }").unwrap());
        let never = Arc::new(Rule::parse(".b { width: {{missing}}; }").unwrap());
        let rule = Rule::new(".c { color: red; }", None, vec![broken, never]).unwrap();

        match rule.stylesheet(&json!({}), "").unwrap_err() {
            RuleError::Css(css) => {
                assert_eq!(css.kind, CssErrorKind::EmptyValue("color".to_string()))
            }
            other => panic!("expected the first dependency's css error, got {:?}", other),
        }
    }

    /// Binding that counts how many templates were rendered against it.
    struct CountingBinding {
        renders: std::cell::Cell<usize>,
    }

    impl Serialize for CountingBinding {
        fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            self.renders.set(self.renders.get() + 1);
            json!({ "color": "red" }).serialize(serializer)
        }
    }

    #[test]
    fn test_dependencies_after_failure_are_not_resolved() {
        let broken = Arc::new(Rule::parse(".a { color: ; }").unwrap());
        let later = Arc::new(Rule::parse(".b { color: {{color}}; }").unwrap());
        let rule = Rule::new(".c { color: {{color}}; }", None, vec![broken, later]).unwrap();

        let binding = CountingBinding {
            renders: std::cell::Cell::new(0),
        };
        let err = rule.stylesheet(&binding, "").unwrap_err();

        assert!(matches!(err, RuleError::Css(_)));
        assert_eq!(binding.renders.get(), 1);

        let healthy = Rule::new(
            ".c { color: {{color}}; }",
            None,
            vec![Arc::new(Rule::parse(".b { color: {{color}}; }").unwrap())],
        )
        .unwrap();
        let binding = CountingBinding {
            renders: std::cell::Cell::new(0),
        };
        assert_eq!(healthy.stylesheet(&binding, "").unwrap().len(), 2);
        assert_eq!(binding.renders.get(), 2);
    }

    #[test]
    fn test_feed_error_aborts_before_depends() {
        let feed = Arc::new(Rule::parse(".f { {{missing}} }").unwrap());
        let dep = Arc::new(Rule::parse(".d { color: ; }").unwrap());
        let rule = Rule::new(".c { color: red; }", Some(feed), vec![dep]).unwrap();

        let err = rule.stylesheet(&json!({}), "").unwrap_err();
        assert!(matches!(err, RuleError::TemplateRender(_)));
    }

    #[test]
    fn test_shared_rules_render_independently() {
        let shared = Arc::new(Rule::parse("&:hover { color: {{color}}; }").unwrap());
        let first = Rule::new(".one { margin: 0; }", None, vec![Arc::clone(&shared)]).unwrap();
        let second = Rule::new(".two { margin: 1px; }", Some(Arc::clone(&shared)), vec![shared]).unwrap();

        let sheet = first.stylesheet(&json!({ "color": "red" }), ".x").unwrap();
        assert_eq!(selectors(&sheet), vec![".x:hover", ".one"]);

        let sheet = second.stylesheet(&json!({ "color": "blue" }), ".y").unwrap();
        assert_eq!(selectors(&sheet), vec![".y:hover", ".two"]);
        assert_eq!(sheet.rules[0].declarations[0].value, "blue");
    }

    #[test]
    fn test_nested_at_rules_scoped() {
        let rule = Rule::parse(
            "@media (max-width: {{bp}}px) { & { display: none; } @supports (gap: 1px) { :focus-within { gap: 1px; } } }",
        )
        .unwrap();

        let sheet = rule.stylesheet(&json!({ "bp": 600 }), ".nav").unwrap();
        let media = &sheet.rules[0];

        assert_eq!(media.prelude, "(max-width: 600px)");
        assert_eq!(media.rules[0].selectors, vec![".nav".to_string()]);
        assert_eq!(
            media.rules[1].rules[0].selectors,
            vec![".nav:focus-within".to_string()]
        );
    }
}
