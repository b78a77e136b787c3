//! Lexer and statement splitter
//!
//! Converts raw SQL text into a sequence of top-level statements. Quoting,
//! dollar-quoted blocks, and comments are tracked so that a semicolon inside
//! a literal never produces a false statement boundary. The splitter is
//! recovery-oriented: an unterminated literal yields a single finding and
//! scanning resumes at the next semicolon, so one malformed statement never
//! prevents validation of the rest of the file.

use serde::{Deserialize, Serialize};

use crate::error::{Finding, FindingKind, Span};

/// Lexical token classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    Word,
    QuotedIdent,
    StringLit,
    DollarQuoted,
    Number,
    Symbol,
}

/// A lexical unit with its source position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    /// Raw lexeme as it appeared in the source, quotes included.
    pub text: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    /// Case-insensitive keyword match. Quoted identifiers never match a
    /// keyword, only bare words do.
    pub fn is_kw(&self, kw: &str) -> bool {
        self.kind == TokenKind::Word && self.text.eq_ignore_ascii_case(kw)
    }

    pub fn is_symbol(&self, sym: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == sym
    }

    /// Identifier value: the word itself, or the unquoted content of a
    /// double-quoted identifier (with `""` unescaped).
    pub fn ident(&self) -> Option<String> {
        match self.kind {
            TokenKind::Word => Some(self.text.clone()),
            TokenKind::QuotedIdent => {
                let inner = &self.text[1..self.text.len() - 1];
                Some(inner.replace("\"\"", "\""))
            }
            _ => None,
        }
    }

    pub fn span(&self) -> Span {
        Span::new(self.offset, self.text.len(), self.line, self.column)
    }
}

/// Classified statement kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    CreateTable,
    AlterTable,
    CreateIndex,
    CreatePolicy,
    EnableRls,
    CreateFunction,
    Other,
}

impl StatementKind {
    pub fn name(&self) -> &'static str {
        match self {
            StatementKind::CreateTable => "CREATE TABLE",
            StatementKind::AlterTable => "ALTER TABLE",
            StatementKind::CreateIndex => "CREATE INDEX",
            StatementKind::CreatePolicy => "CREATE POLICY",
            StatementKind::EnableRls => "ENABLE ROW LEVEL SECURITY",
            StatementKind::CreateFunction => "CREATE FUNCTION",
            StatementKind::Other => "other",
        }
    }
}

/// A contiguous span of tokens between two top-level statement boundaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub tokens: Vec<Token>,
    /// Raw statement text, terminator excluded.
    pub sql: String,
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Statement {
    pub fn span(&self) -> Span {
        Span::new(self.offset, self.sql.len(), self.line, self.column)
    }
}

/// Characters that may combine into multi-character operators (`>=`, `::`).
const OPERATOR_CHARS: &str = "+-*/<>=~!@#%^&|?:";

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

struct Scanner<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn starts_with(&self, prefix: &str) -> bool {
        self.src[self.pos..].starts_with(prefix)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
        self.column = mark.column;
    }

    fn token_from(&self, kind: TokenKind, mark: Mark) -> Token {
        Token {
            kind,
            text: self.src[mark.pos..self.pos].to_string(),
            offset: mark.pos,
            line: mark.line,
            column: mark.column,
        }
    }

    /// Skip whitespace and comments. Comment ranges still advance the
    /// line/column bookkeeping so later findings point at real locations.
    fn skip_trivia(&mut self) {
        loop {
            if self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            } else if self.starts_with("--") {
                while let Some(ch) = self.peek() {
                    if ch == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if self.starts_with("/*") {
                self.bump();
                self.bump();
                // Non-nesting; an unterminated block comment swallows the
                // rest of the input.
                while !self.at_end() && !self.starts_with("*/") {
                    self.bump();
                }
                self.bump();
                self.bump();
            } else {
                break;
            }
        }
    }

    /// Scan a quoted region where doubling the quote escapes it.
    /// Returns None when the closing quote is missing.
    fn scan_quoted(&mut self, quote: char, kind: TokenKind, mark: Mark) -> Option<Token> {
        self.bump();
        while let Some(ch) = self.bump() {
            if ch == quote {
                if self.peek() == Some(quote) {
                    self.bump();
                } else {
                    return Some(self.token_from(kind, mark));
                }
            }
        }
        None
    }

    /// If the cursor sits on a valid dollar-quote opening tag (`$$` or
    /// `$tag$`), return the tag without consuming it.
    fn peek_dollar_tag(&self) -> Option<String> {
        let rest = &self.src[self.pos..];
        let mut chars = rest.char_indices();
        if chars.next()?.1 != '$' {
            return None;
        }
        for (i, ch) in chars {
            if ch == '$' {
                return Some(rest[..=i].to_string());
            }
            if !ch.is_ascii_alphanumeric() && ch != '_' {
                return None;
            }
        }
        None
    }

    /// Scan a dollar-quoted block. The closing tag must match the opening
    /// tag exactly (tags are case-sensitive). Returns None when unmatched.
    fn scan_dollar_quoted(&mut self, tag: &str, mark: Mark) -> Option<Token> {
        for _ in 0..tag.len() {
            self.bump();
        }
        let rel = self.src[self.pos..].find(tag)?;
        let target = self.pos + rel + tag.len();
        while self.pos < target {
            self.bump();
        }
        Some(self.token_from(TokenKind::DollarQuoted, mark))
    }

    /// Raw resynchronization: consume everything up to and including the
    /// next semicolon, ignoring all lexical structure.
    fn skip_to_semicolon(&mut self) {
        while let Some(ch) = self.peek() {
            self.bump();
            if ch == ';' {
                break;
            }
        }
    }
}

fn is_word_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_word_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$'
}

/// Split a source buffer into classified statements.
///
/// Deterministic and restartable: identical input always yields identical
/// statements and findings. A semicolon terminates a statement only at
/// parenthesis depth zero outside of any literal.
pub fn split_statements(source: &str) -> (Vec<Statement>, Vec<Finding>) {
    let mut statements = Vec::new();
    let mut findings = Vec::new();
    let mut sc = Scanner::new(source);
    let mut tokens: Vec<Token> = Vec::new();
    let mut start: Option<Mark> = None;
    let mut depth: usize = 0;

    loop {
        sc.skip_trivia();
        let Some(ch) = sc.peek() else { break };
        let mark = sc.mark();

        if ch == ';' && depth == 0 {
            sc.bump();
            flush(&mut statements, &mut tokens, &mut start, source, mark.pos);
            continue;
        }
        if start.is_none() {
            start = Some(mark);
        }

        let token = match ch {
            '\'' => sc.scan_quoted('\'', TokenKind::StringLit, mark),
            '"' => sc.scan_quoted('"', TokenKind::QuotedIdent, mark),
            '$' => {
                if let Some(tag) = sc.peek_dollar_tag() {
                    sc.scan_dollar_quoted(&tag, mark)
                } else {
                    sc.bump();
                    Some(sc.token_from(TokenKind::Symbol, mark))
                }
            }
            '(' => {
                depth += 1;
                sc.bump();
                Some(sc.token_from(TokenKind::Symbol, mark))
            }
            ')' => {
                depth = depth.saturating_sub(1);
                sc.bump();
                Some(sc.token_from(TokenKind::Symbol, mark))
            }
            ch if ch.is_ascii_digit() => {
                while sc.peek().is_some_and(|c| c.is_ascii_digit() || c == '.') {
                    sc.bump();
                }
                Some(sc.token_from(TokenKind::Number, mark))
            }
            ch if is_word_start(ch) => {
                sc.bump();
                while sc.peek().is_some_and(is_word_continue) {
                    sc.bump();
                }
                Some(sc.token_from(TokenKind::Word, mark))
            }
            ch if OPERATOR_CHARS.contains(ch) => {
                while sc.peek().is_some_and(|c| OPERATOR_CHARS.contains(c)) {
                    sc.bump();
                }
                Some(sc.token_from(TokenKind::Symbol, mark))
            }
            _ => {
                sc.bump();
                Some(sc.token_from(TokenKind::Symbol, mark))
            }
        };

        match token {
            Some(token) => tokens.push(token),
            None => {
                // Unterminated literal: report once, drop the partial
                // statement, and resynchronize just past the opening quote.
                let what = match ch {
                    '\'' => "string literal",
                    '"' => "quoted identifier",
                    _ => "dollar-quoted literal",
                };
                findings.push(
                    Finding::new(
                        FindingKind::UnterminatedLiteral,
                        format!("unterminated {what}"),
                    )
                    .with_span(Span::new(mark.pos, 1, mark.line, mark.column)),
                );
                tokens.clear();
                start = None;
                depth = 0;
                sc.reset(mark);
                sc.bump();
                sc.skip_to_semicolon();
            }
        }
    }

    flush(&mut statements, &mut tokens, &mut start, source, sc.pos);
    tracing::debug!(
        statements = statements.len(),
        findings = findings.len(),
        "split source buffer"
    );
    (statements, findings)
}

fn flush(
    statements: &mut Vec<Statement>,
    tokens: &mut Vec<Token>,
    start: &mut Option<Mark>,
    source: &str,
    end: usize,
) {
    let Some(mark) = start.take() else {
        return;
    };
    if tokens.is_empty() {
        return;
    }
    let sql = source[mark.pos..end].trim().to_string();
    let kind = classify(tokens);
    statements.push(Statement {
        kind,
        tokens: std::mem::take(tokens),
        sql,
        offset: mark.pos,
        line: mark.line,
        column: mark.column,
    });
}

/// Tag a statement by its leading keywords. Anything unrecognized degrades
/// to Other and is stored verbatim, never inspected by rules.
fn classify(tokens: &[Token]) -> StatementKind {
    let kw = |i: usize, s: &str| tokens.get(i).is_some_and(|t| t.is_kw(s));

    if kw(0, "create") {
        let mut i = 1;
        if kw(i, "or") && kw(i + 1, "replace") {
            i += 2;
        }
        if kw(i, "table") {
            return StatementKind::CreateTable;
        }
        if kw(i, "index") || (kw(i, "unique") && kw(i + 1, "index")) {
            return StatementKind::CreateIndex;
        }
        if kw(i, "policy") {
            return StatementKind::CreatePolicy;
        }
        if kw(i, "function") {
            return StatementKind::CreateFunction;
        }
        return StatementKind::Other;
    }
    if kw(0, "alter") && kw(1, "table") {
        let enables_rls = tokens.windows(4).any(|w| {
            w[0].is_kw("enable") && w[1].is_kw("row") && w[2].is_kw("level") && w[3].is_kw("security")
        });
        if enables_rls {
            return StatementKind::EnableRls;
        }
        return StatementKind::AlterTable;
    }
    StatementKind::Other
}
