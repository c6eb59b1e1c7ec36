use unscanny::Scanner;

use crate::code::{self, CodeKind};
use crate::token::{Expr, ExprKind, Marker, Token};
use crate::{Options, SyntaxError};

/// Splits a template into tokens in a single forward pass.
pub(crate) struct Tokenizer<'s> {
    /// The underlying scanner.
    s: Scanner<'s>,
    /// The 1-based line of the next character.
    line: usize,
    /// Whether trim mode is enabled.
    trim: bool,
    /// Literal text accumulated since the last flush.
    buffer: String,
    /// Finished tokens.
    tokens: Vec<Token>,
}

impl<'s> Tokenizer<'s> {
    /// Create a new tokenizer starting at the given line.
    pub fn new(text: &'s str, start_line: usize, options: Options) -> Self {
        Self {
            s: Scanner::new(text),
            line: start_line,
            trim: options.trim,
            buffer: String::new(),
            tokens: vec![],
        }
    }

    /// Consume the whole input.
    pub fn run(mut self) -> Result<Vec<Token>, SyntaxError> {
        loop {
            if self.s.eat_if("<%%") {
                self.buffer.push_str("<%");
            } else if self.s.eat_if("<%#") {
                self.comment()?;
            } else if self.s.eat_if("<%") {
                self.embedded()?;
            } else if let Some(c) = self.s.eat() {
                if c == '\n' {
                    self.line += 1;
                }
                self.buffer.push(c);
            } else {
                break;
            }
        }

        self.flush();
        Ok(self.tokens)
    }

    /// A comment fragment: consumed and discarded, but still trimmed.
    fn comment(&mut self) -> Result<(), SyntaxError> {
        self.fragment()?;
        if self.trim {
            self.trim_left();
            self.trim_right();
        }
        Ok(())
    }

    /// An expression fragment.
    fn embedded(&mut self) -> Result<(), SyntaxError> {
        let line = self.line;
        let marker = self.marker();
        let body = self.fragment()?;
        let kind = classify(body);

        if self.trim {
            self.trim_left();
            self.trim_right();
        }

        self.flush();
        self.tokens.push(Token::Expr(Expr { kind, line, marker, body: body.into() }));
        Ok(())
    }

    /// Extract the single-character marker following the opening
    /// delimiter.
    fn marker(&mut self) -> Marker {
        match self.s.peek() {
            Some('=') => {
                self.s.eat();
                Marker::Equals
            }
            _ => Marker::None,
        }
    }

    /// Read a fragment body through the closing `%>`.
    ///
    /// The body is raw: nothing inside a fragment escapes the closing
    /// delimiter, so bodies cannot themselves contain `%>`.
    fn fragment(&mut self) -> Result<&'s str, SyntaxError> {
        let start = self.s.cursor();
        while let Some(c) = self.s.eat() {
            match c {
                '%' if self.s.eat_if('>') => {
                    return Ok(self.s.get(start..self.s.cursor() - 2));
                }
                '\n' => self.line += 1,
                _ => {}
            }
        }
        Err(SyntaxError::new(self.line, "missing token '%>'"))
    }

    /// Flush accumulated text as a token.
    fn flush(&mut self) {
        if !self.buffer.is_empty() {
            self.tokens.push(Token::Text(self.buffer.as_str().into()));
            self.buffer.clear();
        }
    }

    /// Drop the blank indentation before a fragment that sits alone at
    /// the end of the buffered text. The newline before it is kept.
    fn trim_left(&mut self) {
        let trimmed = self.buffer.trim_end_matches([' ', '\t']);
        let keep = trimmed.len();
        if trimmed.is_empty() || trimmed.ends_with('\n') {
            self.buffer.truncate(keep);
        }
    }

    /// Consume whitespace up to and including a newline that directly
    /// follows a fragment, leaving anything else untouched.
    fn trim_right(&mut self) {
        let mut s = self.s;
        s.eat_while([' ', '\t']);
        if s.done() {
            self.s = s;
        } else if s.eat_if("\r\n") || s.eat_if('\n') {
            self.line += 1;
            self.s = s;
        }
    }
}

/// Classify a fragment body by its effect on block structure.
fn classify(body: &str) -> ExprKind {
    let tail = body.trim_end_matches([' ', '\t']);

    if let Some(before) = tail.strip_suffix("do") {
        if before.ends_with([' ', '\t', ')']) {
            return ExprKind::Start;
        }
    }

    if let Some(before) = tail.strip_suffix("->") {
        return arrow(before);
    }

    for keyword in ["else", "after", "catch", "rescue"] {
        if let Some(before) = tail.strip_suffix(keyword) {
            if before.chars().all(|c| c == ' ' || c == '\t') {
                return ExprKind::Middle;
            }
        }
    }

    if is_end(body) {
        return ExprKind::End;
    }

    ExprKind::Plain
}

/// Whether the fragment closes a block: it leads with the `end` keyword,
/// optionally followed by the rest of an enclosing call, as in `end)` or
/// `end.()`.
fn is_end(body: &str) -> bool {
    let Some(rest) = body.trim_start_matches([' ', '\t']).strip_prefix("end") else {
        return false;
    };

    match rest.chars().next() {
        None => true,
        // `end:` is a keyword-list key, not the keyword.
        Some(':') => rest.starts_with("::"),
        Some(c) => !code::is_id_continue(c) && c != '?' && c != '!',
    }
}

/// Decide whether a fragment ending in `->` opens a block or continues
/// one.
///
/// The text before the arrow is lexed in relaxed mode. An anonymous
/// function head whose `end` has not yet appeared means the fragment
/// leaves a function body open, so it starts a block; any other clause
/// head continues an enclosing block. A body the lexer cannot handle also
/// counts as a continuation and is left for the compiler to diagnose.
fn arrow(before: &str) -> ExprKind {
    let Ok(tokens) = code::lex(before) else {
        return ExprKind::Middle;
    };

    let first_fn = tokens
        .iter()
        .position(|&kind| matches!(kind, CodeKind::Fn | CodeKind::FnParen));

    match first_fn {
        Some(first_fn) => {
            let first_end = tokens.iter().position(|&kind| kind == CodeKind::End);
            if first_end.is_none_or(|first_end| first_end > first_fn) {
                ExprKind::Start
            } else {
                ExprKind::Middle
            }
        }
        None => ExprKind::Middle,
    }
}
