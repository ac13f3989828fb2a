//! Template helpers available inside every rule.
//!
//! `add`, `multiply` and `subtract` work on 64-bit integers and wrap on
//! overflow. `subtract a b` yields `b - a`; existing templates depend on
//! that operand order.

use crate::style::extend::extend;
use crate::style::owned_css::OwnedStylesheet;
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, HelperResult, JsonRender, Output,
    RenderContext, RenderErrorReason,
};

handlebars_helper!(add: |a: i64, b: i64| a.wrapping_add(b));
handlebars_helper!(multiply: |a: i64, b: i64| a.wrapping_mul(b));
handlebars_helper!(subtract: |a: i64, b: i64| b.wrapping_sub(a));

/// Registers the arithmetic helpers plus an `extend` helper reading `feed`.
pub fn register_helpers<'reg>(registry: &mut Handlebars<'reg>, feed: Option<&'reg OwnedStylesheet>) {
    registry.register_helper("add", Box::new(add));
    registry.register_helper("multiply", Box::new(multiply));
    registry.register_helper("subtract", Box::new(subtract));
    registry.register_helper("extend", Box::new(ExtendHelper { feed }));
}

/// `{{extend ".selector"}}`, bound to the feed resolved for the current render.
pub struct ExtendHelper<'a> {
    feed: Option<&'a OwnedStylesheet>,
}

impl HelperDef for ExtendHelper<'_> {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let selector = h
            .param(0)
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("extend", 0))?
            .value()
            .render();

        out.write(&extend(self.feed, &selector))?;
        Ok(())
    }
}
