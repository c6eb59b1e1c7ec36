//! Tokenizer for the Embex templating language.
//!
//! Embex templates interleave literal text with expression fragments
//! delimited by `<%` and `%>`:
//!
//! ```text
//! <ul>
//! <%= for user <- users do %>
//!   <li><%= user.name %></li>
//! <% end %>
//! </ul>
//! ```
//!
//! [`tokenize`] splits a template into a flat sequence of [tokens](Token),
//! classifying each fragment as a plain expression or as the start,
//! continuation, or end of a block so that a compiler can assemble a
//! control-flow tree from the flat stream. Block markers are not balanced
//! here; mismatches are left for the compiler to diagnose.
//!
//! Three pieces of surface syntax receive special treatment:
//!
//! - `<%%` escapes the opening delimiter and renders as a literal `<%`;
//! - `<%#` opens a comment that extends to the closing `%>` and produces
//!   no token at all;
//! - `<%=` carries a [marker](Marker) on the token, for fragments whose
//!   value is inserted into the rendered output.
//!
//! With [`Options::trim`] enabled, a fragment that sits alone on its line
//! does not leave a blank line behind in the surrounding text.

mod code;
mod token;
mod tokenizer;

pub use self::token::{Expr, ExprKind, Marker, Token, unparse};

use std::fmt::{self, Display, Formatter};

use ecow::EcoString;

use self::tokenizer::Tokenizer;

/// Tokenize a template.
///
/// `start_line` is the 1-based line number of the first character of
/// `text`; the lines reported on tokens and errors are offset by it.
pub fn tokenize(
    text: &str,
    start_line: usize,
    options: Options,
) -> Result<Vec<Token>, SyntaxError> {
    Tokenizer::new(text, start_line, options).run()
}

/// Options governing tokenization.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Options {
    /// Elide the blank surroundings of fragments that occupy their own
    /// line: the whitespace before the fragment and the newline after it.
    pub trim: bool,
}

/// An error encountered while tokenizing a template.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct SyntaxError {
    /// The 1-based line on which the error was observed.
    pub line: usize,
    /// The error message.
    pub message: EcoString,
}

impl SyntaxError {
    /// Create a new syntax error.
    pub fn new(line: usize, message: impl Into<EcoString>) -> Self {
        Self { line, message: message.into() }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{} on line {}", self.message, self.line)
    }
}

impl std::error::Error for SyntaxError {}
