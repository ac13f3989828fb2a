//! Turns rendered rule text into an [`OwnedStylesheet`].
//!
//! Tokenization is done by `cssparser`; this module only walks the token
//! stream and keeps raw preludes, selector lists and declaration values as
//! they were written, so later stages can match preludes byte for byte.
//! `lightningcss` is used on the way out to minify serialized sheets.

use crate::error::{CssError, CssErrorKind, MinifyError};
use crate::style::owned_css::{OwnedDeclaration, OwnedRule, OwnedStylesheet};
use cssparser::{
    BasicParseErrorKind, Delimiter, ParseError, ParseErrorKind, Parser, ParserInput, ToCss, Token,
};
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet as LightningStyleSheet};

type ParseResult<'i, T> = Result<T, ParseError<'i, CssErrorKind>>;

/// At-rules whose block holds rules rather than declarations.
const RULE_BLOCK_AT_RULES: &[&str] = &[
    "@container",
    "@document",
    "@-moz-document",
    "@font-feature-values",
    "@keyframes",
    "@-webkit-keyframes",
    "@layer",
    "@media",
    "@scope",
    "@supports",
];

/// Parse a raw CSS string into a fully-owned stylesheet.
///
/// # Arguments
///
/// * `css_snippet` - The CSS text, usually the output of a rule template.
pub fn parse(css_snippet: &str) -> Result<OwnedStylesheet, CssError> {
    let mut input = ParserInput::new(css_snippet);
    let mut parser = Parser::new(&mut input);

    let rules = parse_rule_list(&mut parser).map_err(into_css_error)?;
    Ok(OwnedStylesheet { rules })
}

/// Minify serialized CSS with LightningCSS.
pub fn minify_css(css_text: &str) -> Result<String, MinifyError> {
    let mut sheet = LightningStyleSheet::parse(css_text, ParserOptions::default())
        .map_err(|e| MinifyError(e.to_string()))?;

    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| MinifyError(e.to_string()))?;

    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| MinifyError(e.to_string()))?;

    Ok(printed.code)
}

fn into_css_error(error: ParseError<'_, CssErrorKind>) -> CssError {
    let kind = match error.kind {
        ParseErrorKind::Custom(kind) => kind,
        ParseErrorKind::Basic(BasicParseErrorKind::UnexpectedToken(token)) => {
            CssErrorKind::UnexpectedToken(token.to_css_string())
        }
        ParseErrorKind::Basic(basic) => CssErrorKind::Syntax(format!("{:?}", basic)),
    };

    // cssparser lines are 0-based, columns 1-based.
    CssError {
        line: error.location.line + 1,
        column: error.location.column,
        kind,
    }
}

fn parse_rule_list<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, Vec<OwnedRule>> {
    let mut rules = Vec::new();

    loop {
        parser.skip_whitespace();
        if parser.is_exhausted() {
            break;
        }

        let state = parser.state();
        let location = parser.current_source_location();
        let token = parser.next()?.clone();

        match token {
            Token::AtKeyword(name) => rules.push(parse_at_rule(parser, &name)?),
            Token::CDO | Token::CDC => {}
            Token::CloseCurlyBracket => {
                return Err(location.new_custom_error(CssErrorKind::UnexpectedToken(
                    "}".to_string(),
                )))
            }
            _ => {
                parser.reset(&state);
                rules.push(parse_qualified_rule(parser)?);
            }
        }
    }

    Ok(rules)
}

fn parse_qualified_rule<'i>(parser: &mut Parser<'i, '_>) -> ParseResult<'i, OwnedRule> {
    let location = parser.current_source_location();
    let start = parser.position();

    let selectors = parser.parse_until_before(Delimiter::CurlyBracketBlock, |input| {
        split_selector_list(input)
    })?;
    let prelude = parser.slice_from(start).trim().to_string();

    if prelude.is_empty() || selectors.iter().any(|sel| sel.is_empty()) {
        return Err(location.new_custom_error(CssErrorKind::EmptySelector));
    }

    expect_block(parser, &prelude)?;

    let mut rule = OwnedRule::qualified(&prelude, selectors);
    rule.declarations = parser.parse_nested_block(|block| parse_declaration_list(block))?;
    Ok(rule)
}

/// Splits a prelude at its top-level commas; commas inside `:is(a, b)` stay put.
fn split_selector_list<'i>(input: &mut Parser<'i, '_>) -> ParseResult<'i, Vec<String>> {
    let mut selectors = Vec::new();
    let mut selector_start = input.position();

    loop {
        let before = input.position();
        let is_comma = match input.next() {
            Ok(token) => matches!(token, Token::Comma),
            Err(_) => break,
        };

        if is_comma {
            selectors.push(input.slice(selector_start..before).trim().to_string());
            selector_start = input.position();
        }
    }

    selectors.push(input.slice_from(selector_start).trim().to_string());
    Ok(selectors)
}

fn parse_at_rule<'i>(parser: &mut Parser<'i, '_>, name: &str) -> ParseResult<'i, OwnedRule> {
    let at_name = format!("@{}", name);
    let start = parser.position();

    parser.parse_until_before(Delimiter::CurlyBracketBlock | Delimiter::Semicolon, |input| {
        while input.next().is_ok() {}
        Ok::<_, ParseError<'i, CssErrorKind>>(())
    })?;
    let prelude = parser.slice_from(start).trim().to_string();
    let mut rule = OwnedRule::at_rule(&at_name, &prelude);

    // `;` or end of input both close a block-less at-rule.
    let opens_block = match parser.next() {
        Ok(token) => matches!(token, Token::CurlyBracketBlock),
        Err(_) => false,
    };
    if !opens_block {
        return Ok(rule);
    }

    rule.has_block = true;
    if embeds_rules(&at_name) {
        rule.rules = parser.parse_nested_block(|block| parse_rule_list(block))?;
    } else {
        rule.declarations = parser.parse_nested_block(|block| parse_declaration_list(block))?;
    }

    Ok(rule)
}

fn embeds_rules(at_name: &str) -> bool {
    RULE_BLOCK_AT_RULES
        .iter()
        .any(|known| known.eq_ignore_ascii_case(at_name))
}

fn expect_block<'i>(parser: &mut Parser<'i, '_>, prelude: &str) -> ParseResult<'i, ()> {
    let location = parser.current_source_location();
    let found_block = matches!(parser.next(), Ok(&Token::CurlyBracketBlock));

    if found_block {
        Ok(())
    } else {
        Err(location.new_custom_error(CssErrorKind::MissingBlock(prelude.to_string())))
    }
}

fn parse_declaration_list<'i>(
    input: &mut Parser<'i, '_>,
) -> ParseResult<'i, Vec<OwnedDeclaration>> {
    let mut declarations = Vec::new();

    loop {
        input.skip_whitespace();
        if input.is_exhausted() {
            break;
        }

        let location = input.current_source_location();
        let token = input.next()?.clone();

        match token {
            Token::Semicolon => {}
            Token::Ident(property) => {
                let property = property.to_string();
                let declaration = input.parse_until_after(Delimiter::Semicolon, |value| {
                    parse_declaration(value, property)
                })?;
                declarations.push(declaration);
            }
            other => {
                return Err(location.new_custom_error(CssErrorKind::UnexpectedToken(
                    other.to_css_string(),
                )))
            }
        }
    }

    Ok(declarations)
}

fn parse_declaration<'i>(
    input: &mut Parser<'i, '_>,
    property: String,
) -> ParseResult<'i, OwnedDeclaration> {
    input.expect_colon()?;

    let start = input.position();
    while input.next().is_ok() {}
    let (value, important) = split_important(input.slice_from(start));

    if value.is_empty() {
        return Err(input.new_custom_error(CssErrorKind::EmptyValue(property)));
    }

    Ok(OwnedDeclaration {
        property,
        value: value.to_string(),
        important,
    })
}

/// Separates a trailing `!important` (any case, optional inner space) from the value.
fn split_important(raw: &str) -> (&str, bool) {
    let raw = raw.trim();
    if let Some(bang) = raw.rfind('!') {
        if raw[bang + 1..].trim().eq_ignore_ascii_case("important") {
            return (raw[..bang].trim_end(), true);
        }
    }
    (raw, false)
}
