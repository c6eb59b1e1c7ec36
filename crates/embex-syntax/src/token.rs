use ecow::EcoString;

/// A token produced by tokenizing a template.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Token {
    /// A run of literal template text.
    ///
    /// Adjacent runs are merged: no two consecutive tokens are text and
    /// text is never empty.
    Text(EcoString),
    /// An embedded `<% … %>` expression fragment.
    Expr(Expr),
}

impl Token {
    /// Render the token back into its source form.
    ///
    /// Text is emitted verbatim and fragments as `<%`, the marker, the
    /// body, and `%>`.
    pub fn write_source(&self, out: &mut String) {
        match self {
            Self::Text(text) => out.push_str(text),
            Self::Expr(expr) => {
                out.push_str("<%");
                out.push_str(expr.marker.as_str());
                out.push_str(&expr.body);
                out.push_str("%>");
            }
        }
    }
}

/// An expression fragment, classified for block pairing.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct Expr {
    /// How the fragment relates to the surrounding block structure.
    pub kind: ExprKind,
    /// The 1-based line on which the introducing `<%` appeared.
    pub line: usize,
    /// The marker that followed the `<%`, if any.
    pub marker: Marker,
    /// The fragment body, excluding the delimiters and the marker, with
    /// all interior whitespace and newlines preserved.
    pub body: EcoString,
}

/// Classification of an expression fragment.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ExprKind {
    /// A standalone expression.
    Plain,
    /// Opens a block: the fragment ends in `do` or in the head of an
    /// anonymous function that is not closed within the fragment.
    Start,
    /// Continues a block: `else`, `after`, `catch`, `rescue`, or a clause
    /// head ending in `->`.
    Middle,
    /// Closes a block with `end`.
    End,
}

impl ExprKind {
    /// A human-readable name for the kind.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plain => "expression",
            Self::Start => "start of a block",
            Self::Middle => "continuation of a block",
            Self::End => "end of a block",
        }
    }
}

/// A single-character marker following the opening `<%`.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Marker {
    /// No marker: the fragment is evaluated for effect.
    #[default]
    None,
    /// `=`: the fragment's value is inserted into the rendered output.
    Equals,
}

impl Marker {
    /// The marker as it appears in source.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Equals => "=",
        }
    }
}

/// Render a token sequence back into template source.
///
/// For tokens produced without trim mode this reproduces the input
/// exactly, except that `<%%` escapes reappear as the literal `<%` they
/// stand for.
pub fn unparse(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        token.write_source(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_source() {
        let expr = Token::Expr(Expr {
            kind: ExprKind::Plain,
            line: 1,
            marker: Marker::Equals,
            body: " user.name ".into(),
        });
        let mut out = String::new();
        expr.write_source(&mut out);
        assert_eq!(out, "<%= user.name %>");
    }

    #[test]
    fn test_unparse() {
        let tokens = vec![
            Token::Text("a".into()),
            Token::Expr(Expr {
                kind: ExprKind::Start,
                line: 1,
                marker: Marker::None,
                body: " if x do ".into(),
            }),
            Token::Text("b".into()),
        ];
        assert_eq!(unparse(&tokens), "a<% if x do %>b");
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ExprKind::Plain.name(), "expression");
        assert_eq!(ExprKind::End.name(), "end of a block");
    }
}
