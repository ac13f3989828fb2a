// src/style/owned_css.rs (fully-owned stylesheet produced by every render)
use std::fmt;

/// A fully-owned CSS stylesheet: top-level rules in source order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OwnedStylesheet {
    pub rules: Vec<OwnedRule>,
}

/// Distinguishes `selector { ... }` rules from `@name prelude ...` rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Qualified,
    At,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRule {
    pub kind: RuleKind,
    /// At-rule name including the `@`, e.g. "@media". Empty for qualified rules.
    pub name: String,
    /// Raw text before the block, exactly as written (never rewritten).
    pub prelude: String,
    /// e.g. "div", ".red", "&:hover". Only qualified rules carry selectors.
    pub selectors: Vec<String>,
    pub declarations: Vec<OwnedDeclaration>,
    /// Rules embedded in an at-rule block such as `@media` or `@supports`.
    pub rules: Vec<OwnedRule>,
    /// False for block-less at-rules like `@import url(a.css);`.
    pub has_block: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedDeclaration {
    pub property: String,
    pub value: String,
    pub important: bool,
}

impl OwnedStylesheet {
    pub fn new() -> Self {
        OwnedStylesheet { rules: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Serializes the stylesheet back into CSS text.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            rule.write_css(&mut out, 0);
        }
        out
    }
}

impl OwnedRule {
    pub fn qualified(prelude: &str, selectors: Vec<String>) -> Self {
        OwnedRule {
            kind: RuleKind::Qualified,
            name: String::new(),
            prelude: prelude.to_string(),
            selectors,
            declarations: Vec::new(),
            rules: Vec::new(),
            has_block: true,
        }
    }

    pub fn at_rule(name: &str, prelude: &str) -> Self {
        OwnedRule {
            kind: RuleKind::At,
            name: name.to_string(),
            prelude: prelude.to_string(),
            selectors: Vec::new(),
            declarations: Vec::new(),
            rules: Vec::new(),
            has_block: false,
        }
    }

    pub fn is_at_rule(&self) -> bool {
        self.kind == RuleKind::At
    }

    fn write_css(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        out.push_str(&indent);

        match self.kind {
            RuleKind::Qualified => out.push_str(&self.selectors.join(", ")),
            RuleKind::At => {
                out.push_str(&self.name);
                if !self.prelude.is_empty() {
                    out.push(' ');
                    out.push_str(&self.prelude);
                }
                if !self.has_block {
                    out.push_str(";\n");
                    return;
                }
            }
        }

        out.push_str(" {\n");
        for decl in &self.declarations {
            out.push_str(&indent);
            out.push_str("  ");
            out.push_str(&decl.to_string());
            out.push('\n');
        }
        for rule in &self.rules {
            rule.write_css(out, depth + 1);
        }
        out.push_str(&indent);
        out.push_str("}\n");
    }
}

impl OwnedDeclaration {
    pub fn new(property: &str, value: &str, important: bool) -> Self {
        OwnedDeclaration {
            property: property.to_string(),
            value: value.to_string(),
            important,
        }
    }
}

/// `color: red;` or `color: red !important;`
impl fmt::Display for OwnedDeclaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.property, self.value)?;
        if self.important {
            write!(f, " !important")?;
        }
        write!(f, ";")
    }
}

impl fmt::Display for OwnedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        self.write_css(&mut out, 0);
        f.write_str(&out)
    }
}

impl fmt::Display for OwnedStylesheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}
