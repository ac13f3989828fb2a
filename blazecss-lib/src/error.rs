//! Error types shared across the crate.

use std::fmt;

/// What went wrong while turning rendered text into a stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CssErrorKind {
    /// A qualified rule or at-rule ran into end of input before its `{}` block.
    MissingBlock(String),
    /// A qualified rule with nothing before `{`, or an empty entry in a selector list.
    EmptySelector,
    /// A declaration with a property but nothing after the colon.
    EmptyValue(String),
    /// Anything the grammar does not allow at that position.
    UnexpectedToken(String),
    /// Tokenizer-level failure reported by cssparser.
    Syntax(String),
}

impl fmt::Display for CssErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CssErrorKind::MissingBlock(prelude) => write!(f, "expected `{{` after {:?}", prelude),
            CssErrorKind::EmptySelector => write!(f, "empty selector"),
            CssErrorKind::EmptyValue(property) => {
                write!(f, "declaration {:?} has no value", property)
            }
            CssErrorKind::UnexpectedToken(token) => write!(f, "unexpected token {:?}", token),
            CssErrorKind::Syntax(message) => f.write_str(message),
        }
    }
}

/// CSS parsing error, located in the rendered template output.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("CSS parse error at line {line}, column {column}: {kind}")]
pub struct CssError {
    pub line: u32,
    pub column: u32,
    pub kind: CssErrorKind,
}

/// Failure while building or rendering a [`crate::rule::Rule`].
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("invalid rule template: {0}")]
    TemplateCompile(#[from] handlebars::TemplateError),

    #[error("failed to render rule template: {0}")]
    TemplateRender(#[from] handlebars::RenderError),

    #[error(transparent)]
    Css(#[from] CssError),
}

/// Failure reported by the lightningcss minifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to minify stylesheet: {0}")]
pub struct MinifyError(pub String);

/// Failure while packing a group of files.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("no packer provided to handle files with {0:?} extension")]
    NoPacker(String),

    #[error("failed to pack {path}: {source}")]
    Rule {
        path: String,
        #[source]
        source: RuleError,
    },

    #[error(transparent)]
    Minify(#[from] MinifyError),
}
