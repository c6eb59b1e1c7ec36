//! A relaxed lexer for expression bodies.

use ecow::{EcoString, eco_format};
use unicode_ident::{is_xid_continue, is_xid_start};
use unscanny::Scanner;

/// The kind of a token in an expression body.
///
/// Only `Fn`, `FnParen`, and `End` matter to fragment classification; the
/// remaining kinds exist so that keywords hidden inside other constructs
/// are not mistaken for the real thing.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum CodeKind {
    /// The `fn` keyword.
    Fn,
    /// The `fn` keyword directly followed by an opening parenthesis.
    FnParen,
    /// The `end` keyword.
    End,
    /// Any other identifier.
    Ident,
    /// An atom such as `:ok` or `:"quoted"`.
    Atom,
    /// A string literal.
    Str,
    /// A numeric or character literal.
    Number,
    /// An operator, bracket, or other punctuation.
    Punct,
}

/// Lex an expression body.
///
/// Relaxed means that brackets are treated as opaque punctuation and never
/// balanced: a fragment like `foo(fn x` is fine here even though it could
/// not stand on its own. Unterminated string literals are still errors.
pub(crate) fn lex(text: &str) -> Result<Vec<CodeKind>, EcoString> {
    let mut s = Scanner::new(text);
    let mut tokens = Vec::new();

    loop {
        s.eat_while(char::is_whitespace);
        let start = s.cursor();
        let Some(c) = s.eat() else { break };

        let kind = match c {
            '#' => {
                s.eat_until('\n');
                continue;
            }
            '"' => string(&mut s, '"')?,
            '\'' => string(&mut s, '\'')?,
            ':' => atom(&mut s)?,
            '?' => {
                // A character literal: `?a`, or escaped as in `?\n`.
                s.eat_if('\\');
                s.eat();
                CodeKind::Number
            }
            c if c.is_ascii_digit() => number(&mut s),
            c if is_id_start(c) => ident(&mut s, start),
            _ => CodeKind::Punct,
        };

        tokens.push(kind);
    }

    Ok(tokens)
}

fn string(s: &mut Scanner<'_>, quote: char) -> Result<CodeKind, EcoString> {
    let mut escaped = false;
    s.eat_until(|c| {
        let stop = c == quote && !escaped;
        escaped = c == '\\' && !escaped;
        stop
    });

    if !s.eat_if(quote) {
        return Err(eco_format!("missing terminator: {quote}"));
    }

    Ok(CodeKind::Str)
}

fn atom(s: &mut Scanner<'_>) -> Result<CodeKind, EcoString> {
    if s.eat_if('"') {
        string(s, '"')?;
    } else if s.eat_if('\'') {
        string(s, '\'')?;
    } else if s.eat_if(is_id_start) {
        s.eat_while(is_id_continue);
        s.eat_if(['?', '!']);
    } else {
        // `::` and the operator forms are plain punctuation.
        return Ok(CodeKind::Punct);
    }

    Ok(CodeKind::Atom)
}

fn number(s: &mut Scanner<'_>) -> CodeKind {
    s.eat_while(|c: char| c.is_ascii_digit() || c == '_');

    // A fractional part only if a digit directly follows the dot.
    let mut probe = *s;
    if probe.eat_if('.') && probe.at(char::is_ascii_digit) {
        probe.eat_while(|c: char| c.is_ascii_digit() || c == '_');
        *s = probe;
    }

    CodeKind::Number
}

fn ident(s: &mut Scanner<'_>, start: usize) -> CodeKind {
    s.eat_while(is_id_continue);
    s.eat_if(['?', '!']);
    let ident = s.from(start);

    // `fn` and `end` lose their keyword meaning directly after a `.` and
    // in keyword-list position before a `:`.
    let prev = s.get(0..start);
    if (prev.ends_with('.') && !prev.ends_with("..")) || (s.at(':') && !s.at("::")) {
        return CodeKind::Ident;
    }

    match ident {
        "fn" if s.at('(') => CodeKind::FnParen,
        "fn" => CodeKind::Fn,
        "end" => CodeKind::End,
        _ => CodeKind::Ident,
    }
}

/// Whether a character can start an identifier.
fn is_id_start(c: char) -> bool {
    is_xid_start(c) || c == '_'
}

/// Whether a character can continue an identifier.
pub(crate) fn is_id_continue(c: char) -> bool {
    is_xid_continue(c) || c == '_'
}
