//! BlazeCSS: templated CSS rules rendered against a data binding.
//!
//! A [`Rule`] holds a Handlebars template producing CSS. Rendering it parses
//! the output, scopes `&` and leading `:` selectors under a parent selector,
//! prepends the rules it depends on, and lets the template pull declarations
//! from a feed rule with `{{extend ".name"}}`.

pub mod blaze_generate;
pub mod error;
pub mod helpers;
pub mod pack;
pub mod rule;

pub mod style {
    pub mod blaze_css;
    pub mod extend;
    pub mod owned_css;
    pub mod scope;
}

pub use error::{CssError, CssErrorKind, MinifyError, PackError, RuleError};
pub use pack::{Bundler, CssPacker, DirStatement, FileStatement, Packer, WriteDirective};
pub use rule::Rule;
pub use style::owned_css::{OwnedDeclaration, OwnedRule, OwnedStylesheet, RuleKind};
