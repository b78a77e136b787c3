//! Schema model builder - folds classified statements into a SchemaModel
//!
//! Single forward pass; statements may arrive in any order, so ALTER TABLE
//! and CREATE POLICY create placeholder tables that a later CREATE TABLE
//! merges into. Parsing is lightweight keyword scanning over the token
//! stream; anything unrecognized is skipped, never fatal.

use crate::error::{Finding, FindingKind};
use crate::lexer::{Statement, StatementKind, Token};
use crate::schema::model::{
    Column, Constraint, ConstraintKind, ForeignRef, FunctionDef, IgnoredStatement, Index, Policy,
    PolicyCommand, QualifiedName, SchemaModel, Table,
};

/// Builder for constructing a SchemaModel from classified statements
pub struct ModelBuilder {
    model: SchemaModel,
    findings: Vec<Finding>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self {
            model: SchemaModel::new(),
            findings: Vec::new(),
        }
    }

    /// Fold one statement into the model.
    pub fn ingest(&mut self, stmt: &Statement) {
        match stmt.kind {
            StatementKind::CreateTable => self.create_table(stmt),
            StatementKind::AlterTable | StatementKind::EnableRls => self.alter_table(stmt),
            StatementKind::CreateIndex => self.create_index(stmt),
            StatementKind::CreatePolicy => self.create_policy(stmt),
            StatementKind::CreateFunction => self.create_function(stmt),
            StatementKind::Other => self.model.ignored.push(IgnoredStatement {
                sql: stmt.sql.clone(),
                span: stmt.span(),
            }),
        }
    }

    /// Consume the builder and return the model with any findings raised
    /// during classification.
    pub fn build(self) -> (SchemaModel, Vec<Finding>) {
        tracing::debug!(
            tables = self.model.tables.len(),
            indexes = self.model.indexes.len(),
            policies = self.model.policies.len(),
            "built schema model"
        );
        (self.model, self.findings)
    }

    fn create_table(&mut self, stmt: &Statement) {
        let mut cur = Cursor::new(&stmt.tokens);
        cur.eat_kw("create");
        cur.eat_kw("table");
        cur.eat_kws(&["if", "not", "exists"]);
        let Some(name) = cur.qualified_name() else {
            return;
        };

        let key = name.key();
        if self.model.tables.get(&key).is_some_and(|t| t.declared) {
            self.findings.push(
                Finding::new(
                    FindingKind::DuplicateTable,
                    format!("table '{name}' is defined more than once"),
                )
                .with_span(stmt.span()),
            );
            return;
        }

        // Merge into any placeholder created by an earlier out-of-order
        // ALTER TABLE or CREATE POLICY.
        let mut table = match self.model.tables.shift_remove(&key) {
            Some(placeholder) => placeholder,
            None => Table::new(name.clone(), stmt.span()),
        };
        table.name = name;
        table.declared = true;
        table.span = stmt.span();

        if let Some(body) = cur.parenthesized() {
            for item in split_top_level(body) {
                if item.is_empty() {
                    continue;
                }
                table_item(&mut table, item);
            }
        }
        self.model.tables.insert(key, table);
    }

    fn alter_table(&mut self, stmt: &Statement) {
        let mut cur = Cursor::new(&stmt.tokens);
        cur.eat_kw("alter");
        cur.eat_kw("table");
        cur.eat_kws(&["if", "exists"]);
        cur.eat_kw("only");
        let Some(name) = cur.qualified_name() else {
            return;
        };

        let key = name.key();
        let span = stmt.span();
        self.model
            .tables
            .entry(key.clone())
            .or_insert_with(|| Table::placeholder(name, span));

        let rest = cur.rest();
        for action in split_top_level(rest) {
            if action.is_empty() {
                continue;
            }
            self.alter_action(&key, action);
        }
    }

    fn alter_action(&mut self, key: &str, tokens: &[Token]) {
        let mut cur = Cursor::new(tokens);
        if cur.at_kw("rename") {
            self.rename(key, &mut cur);
            return;
        }
        let Some(table) = self.model.tables.get_mut(key) else {
            return;
        };

        if cur.eat_kw("add") {
            let mut name = None;
            if cur.eat_kw("constraint") {
                name = cur.ident();
            }
            if let Some(constraint) = parse_constraint_body(&mut cur, name) {
                table.constraints.push(constraint);
                return;
            }
            cur.eat_kw("column");
            cur.eat_kws(&["if", "not", "exists"]);
            if let Some(parsed) = parse_column_def(&mut cur) {
                table.constraints.extend(parsed.constraints);
                table.columns.insert(parsed.column.name.clone(), parsed.column);
            }
        } else if cur.eat_kw("enable") {
            if cur.eat_kws(&["row", "level", "security"]) {
                table.rls_enabled = true;
            }
        } else if cur.eat_kw("disable") {
            if cur.eat_kws(&["row", "level", "security"]) {
                table.rls_enabled = false;
            }
        } else if cur.eat_kw("alter") {
            cur.eat_kw("column");
            let Some(column) = cur.ident() else { return };
            if cur.eat_kw("set") {
                if cur.eat_kws(&["not", "null"]) {
                    if let Some(col) = table.column_mut(&column) {
                        col.nullable = false;
                    }
                } else if cur.eat_kw("default") {
                    let default = parse_default(&mut cur);
                    if let Some(col) = table.column_mut(&column) {
                        col.default = Some(default);
                    }
                }
            } else if cur.eat_kw("drop") {
                if cur.eat_kws(&["not", "null"]) {
                    if let Some(col) = table.column_mut(&column) {
                        col.nullable = true;
                    }
                } else if cur.eat_kw("default") {
                    if let Some(col) = table.column_mut(&column) {
                        col.default = None;
                    }
                }
            }
        } else if cur.eat_kw("drop") {
            if cur.eat_kw("constraint") {
                cur.eat_kws(&["if", "exists"]);
                if let Some(name) = cur.ident() {
                    table.constraints.retain(|c| c.name.as_deref() != Some(name.as_str()));
                }
            } else {
                cur.eat_kw("column");
                cur.eat_kws(&["if", "exists"]);
                if let Some(name) = cur.ident() {
                    let stored = table
                        .columns
                        .keys()
                        .find(|k| k.eq_ignore_ascii_case(&name))
                        .cloned();
                    if let Some(stored) = stored {
                        table.columns.shift_remove(&stored);
                    }
                }
            }
        }
        // Remaining actions (OWNER TO, SET SCHEMA, VALIDATE CONSTRAINT, ...)
        // are ignored.
    }

    fn rename(&mut self, key: &str, cur: &mut Cursor) {
        cur.eat_kw("rename");
        if cur.eat_kw("to") {
            let Some(new_name) = cur.ident() else { return };
            if let Some(mut table) = self.model.tables.shift_remove(key) {
                table.name = QualifiedName {
                    schema: table.name.schema.clone(),
                    name: new_name,
                };
                self.model.tables.insert(table.name.key(), table);
            }
            return;
        }
        cur.eat_kw("column");
        let Some(old) = cur.ident() else { return };
        if !cur.eat_kw("to") {
            return;
        }
        let Some(new) = cur.ident() else { return };
        let Some(table) = self.model.tables.get_mut(key) else {
            return;
        };
        let stored = table
            .columns
            .keys()
            .find(|k| k.eq_ignore_ascii_case(&old))
            .cloned();
        if let Some(stored) = stored {
            if let Some(mut column) = table.columns.shift_remove(&stored) {
                column.name = new.clone();
                table.columns.insert(new, column);
            }
        }
    }

    fn create_index(&mut self, stmt: &Statement) {
        let mut cur = Cursor::new(&stmt.tokens);
        cur.eat_kw("create");
        let unique = cur.eat_kw("unique");
        cur.eat_kw("index");
        cur.eat_kw("concurrently");
        cur.eat_kws(&["if", "not", "exists"]);
        let name = if cur.at_kw("on") { None } else { cur.ident() };
        if !cur.eat_kw("on") {
            return;
        }
        cur.eat_kw("only");
        let Some(table) = cur.qualified_name() else {
            return;
        };
        let method = if cur.eat_kw("using") {
            cur.ident().unwrap_or_else(|| "btree".to_string())
        } else {
            "btree".to_string()
        };
        let columns = cur.parenthesized().map(index_columns).unwrap_or_default();

        if !self.model.tables.contains_key(&table.key()) {
            self.findings.push(
                Finding::new(
                    FindingKind::IndexTargetUnknown,
                    format!("CREATE INDEX targets table '{table}' which was not seen in this input"),
                )
                .with_span(stmt.span()),
            );
        }
        self.model.indexes.push(Index {
            name,
            table,
            columns,
            unique,
            method,
            span: stmt.span(),
        });
    }

    fn create_policy(&mut self, stmt: &Statement) {
        let mut cur = Cursor::new(&stmt.tokens);
        cur.eat_kw("create");
        cur.eat_kw("policy");
        let Some(name) = cur.ident() else { return };
        if !cur.eat_kw("on") {
            return;
        }
        let Some(table) = cur.qualified_name() else {
            return;
        };

        let mut command = PolicyCommand::All;
        let mut roles = Vec::new();
        let mut using_expr = None;
        let mut check_expr = None;
        while !cur.at_end() {
            if cur.eat_kw("as") {
                cur.bump(); // PERMISSIVE | RESTRICTIVE
            } else if cur.eat_kw("for") {
                if let Some(word) = cur.ident() {
                    command = PolicyCommand::from_word(&word).unwrap_or(PolicyCommand::All);
                }
            } else if cur.eat_kw("to") {
                while let Some(role) = cur.ident() {
                    roles.push(role);
                    if !cur.eat_symbol(",") {
                        break;
                    }
                }
            } else if cur.eat_kw("using") {
                using_expr = cur.parenthesized().map(render_tokens);
            } else if cur.eat_kws(&["with", "check"]) {
                check_expr = cur.parenthesized().map(render_tokens);
            } else {
                cur.bump();
            }
        }

        let span = stmt.span();
        self.model
            .tables
            .entry(table.key())
            .or_insert_with(|| Table::placeholder(table.clone(), span));
        self.model.policies.push(Policy {
            name,
            table,
            command,
            roles,
            using_expr,
            check_expr,
            span,
        });
    }

    fn create_function(&mut self, stmt: &Statement) {
        let mut cur = Cursor::new(&stmt.tokens);
        cur.eat_kw("create");
        cur.eat_kws(&["or", "replace"]);
        cur.eat_kw("function");
        let Some(name) = cur.qualified_name() else {
            return;
        };
        let _args = cur.parenthesized();
        let mut language = None;
        while !cur.at_end() {
            if cur.eat_kw("language") {
                language = cur.ident().map(|l| l.to_ascii_lowercase());
            } else {
                cur.bump();
            }
        }
        self.model.functions.insert(
            name.key(),
            FunctionDef {
                name,
                language,
                span: stmt.span(),
            },
        );
    }
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Token cursor for lightweight keyword scanning
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn rest(&self) -> &'a [Token] {
        &self.tokens[self.pos.min(self.tokens.len())..]
    }

    fn at_kw(&self, kw: &str) -> bool {
        self.peek().is_some_and(|t| t.is_kw(kw))
    }

    fn eat_kw(&mut self, kw: &str) -> bool {
        if self.at_kw(kw) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume a whole keyword sequence, or nothing.
    fn eat_kws(&mut self, kws: &[&str]) -> bool {
        let matches = kws
            .iter()
            .enumerate()
            .all(|(i, kw)| self.tokens.get(self.pos + i).is_some_and(|t| t.is_kw(kw)));
        if matches {
            self.pos += kws.len();
        }
        matches
    }

    fn eat_symbol(&mut self, sym: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_symbol(sym)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Option<String> {
        let value = self.peek()?.ident()?;
        self.pos += 1;
        Some(value)
    }

    fn qualified_name(&mut self) -> Option<QualifiedName> {
        let first = self.ident()?;
        if self.eat_symbol(".") {
            let second = self.ident()?;
            Some(QualifiedName::with_schema(first, second))
        } else {
            Some(QualifiedName::new(first))
        }
    }

    /// Consume a balanced parenthesized group and return the inner tokens.
    /// Requires the cursor to sit on `(`; an unbalanced group consumes to
    /// the end of the statement.
    fn parenthesized(&mut self) -> Option<&'a [Token]> {
        if !self.peek()?.is_symbol("(") {
            return None;
        }
        let open = self.pos;
        let mut depth = 0usize;
        let mut i = self.pos;
        while let Some(token) = self.tokens.get(i) {
            if token.is_symbol("(") {
                depth += 1;
            } else if token.is_symbol(")") {
                depth -= 1;
                if depth == 0 {
                    self.pos = i + 1;
                    return Some(&self.tokens[open + 1..i]);
                }
            }
            i += 1;
        }
        self.pos = self.tokens.len();
        Some(&self.tokens[open + 1..])
    }
}

struct ParsedColumn {
    column: Column,
    constraints: Vec<Constraint>,
}

/// Option keywords that terminate a column's declared type or a DEFAULT
/// expression at parenthesis depth zero.
fn is_option_kw(token: &Token) -> bool {
    [
        "constraint",
        "not",
        "null",
        "default",
        "primary",
        "unique",
        "references",
        "check",
        "generated",
    ]
    .iter()
    .any(|kw| token.is_kw(kw))
}

fn table_item(table: &mut Table, tokens: &[Token]) {
    let mut cur = Cursor::new(tokens);
    let mut name = None;
    if cur.eat_kw("constraint") {
        name = cur.ident();
    }
    if let Some(constraint) = parse_constraint_body(&mut cur, name) {
        table.constraints.push(constraint);
        return;
    }
    if cur.at_kw("like") || cur.at_kw("exclude") {
        return;
    }
    if let Some(parsed) = parse_column_def(&mut cur) {
        table.constraints.extend(parsed.constraints);
        table.columns.insert(parsed.column.name.clone(), parsed.column);
    }
}

/// Parse a table-level constraint body (PRIMARY KEY / FOREIGN KEY / UNIQUE /
/// CHECK). Returns None when the cursor is not at a constraint, leaving it
/// unmoved for column parsing.
fn parse_constraint_body(cur: &mut Cursor, name: Option<String>) -> Option<Constraint> {
    let span = cur.peek()?.span();
    if cur.eat_kws(&["primary", "key"]) {
        let columns = cur.parenthesized().map(ident_list).unwrap_or_default();
        return Some(Constraint::primary_key(name, columns, span));
    }
    if cur.eat_kws(&["foreign", "key"]) {
        let columns = cur.parenthesized().map(ident_list).unwrap_or_default();
        let references = parse_references(cur);
        return Some(Constraint::foreign_key(name, columns, references, span));
    }
    if cur.eat_kw("unique") {
        let columns = cur.parenthesized().map(ident_list).unwrap_or_default();
        return Some(Constraint::unique(name, columns, span));
    }
    if cur.eat_kw("check") {
        let expression = cur.parenthesized().map(render_tokens).unwrap_or_default();
        return Some(Constraint::check(name, expression, span));
    }
    None
}

/// Parse a column definition: name, declared type, then options.
fn parse_column_def(cur: &mut Cursor) -> Option<ParsedColumn> {
    let span = cur.peek()?.span();
    let name = cur.ident()?;

    let mut data_type = String::new();
    while let Some(token) = cur.peek() {
        if is_option_kw(token) {
            break;
        }
        if token.is_symbol("(") {
            let inner = cur.parenthesized().map(render_tokens).unwrap_or_default();
            data_type.push('(');
            data_type.push_str(&inner);
            data_type.push(')');
            continue;
        }
        if !data_type.is_empty() && !matches!(token.text.as_str(), "[" | "]") {
            data_type.push(' ');
        }
        data_type.push_str(&token.text);
        cur.bump();
    }

    let mut column = Column {
        name: name.clone(),
        data_type,
        nullable: true,
        default: None,
        span,
    };
    let mut constraints = Vec::new();
    let mut pending_name: Option<String> = None;

    while let Some(token) = cur.peek() {
        let cspan = token.span();
        if cur.eat_kw("constraint") {
            pending_name = cur.ident();
        } else if cur.eat_kws(&["not", "null"]) {
            column.nullable = false;
        } else if cur.eat_kw("null") {
            column.nullable = true;
        } else if cur.eat_kw("default") {
            column.default = Some(parse_default(cur));
        } else if cur.eat_kws(&["primary", "key"]) {
            column.nullable = false;
            constraints.push(Constraint::primary_key(
                pending_name.take(),
                vec![name.clone()],
                cspan,
            ));
        } else if cur.eat_kw("unique") {
            constraints.push(Constraint::unique(
                pending_name.take(),
                vec![name.clone()],
                cspan,
            ));
        } else if cur.at_kw("references") {
            let references = parse_references(cur);
            constraints.push(Constraint::foreign_key(
                pending_name.take(),
                vec![name.clone()],
                references,
                cspan,
            ));
        } else if cur.eat_kw("check") {
            let expression = cur.parenthesized().map(render_tokens).unwrap_or_default();
            constraints.push(Constraint::check(pending_name.take(), expression, cspan));
        } else if cur.eat_kw("generated") {
            consume_generated(cur);
        } else {
            cur.bump();
        }
    }

    Some(ParsedColumn {
        column,
        constraints,
    })
}

/// Parse `REFERENCES table [(columns)]` plus any referential actions.
fn parse_references(cur: &mut Cursor) -> Option<ForeignRef> {
    if !cur.eat_kw("references") {
        return None;
    }
    let table = cur.qualified_name()?;
    let columns = if cur.peek().is_some_and(|t| t.is_symbol("(")) {
        cur.parenthesized().map(ident_list).unwrap_or_default()
    } else {
        Vec::new()
    };
    // ON DELETE / ON UPDATE actions are consumed without interpretation;
    // SET NULL here must not be mistaken for column nullability.
    while cur.at_kw("on") {
        cur.bump();
        cur.bump();
        if cur.eat_kw("set") {
            cur.bump();
        } else if cur.eat_kw("no") {
            cur.eat_kw("action");
        } else {
            cur.bump();
        }
    }
    Some(ForeignRef { table, columns })
}

/// Consume GENERATED [ALWAYS | BY DEFAULT] AS IDENTITY / AS (expr) STORED.
fn consume_generated(cur: &mut Cursor) {
    if cur.eat_kw("by") {
        cur.eat_kw("default");
    } else {
        cur.eat_kw("always");
    }
    cur.eat_kw("as");
    if cur.eat_kw("identity") {
        if cur.peek().is_some_and(|t| t.is_symbol("(")) {
            cur.parenthesized();
        }
    } else if cur.peek().is_some_and(|t| t.is_symbol("(")) {
        cur.parenthesized();
        cur.eat_kw("stored");
    }
}

/// Collect a DEFAULT expression up to the next option keyword at depth zero.
fn parse_default(cur: &mut Cursor) -> String {
    if cur.eat_kw("null") {
        return "null".to_string();
    }
    let start = cur.pos;
    let mut depth = 0usize;
    while let Some(token) = cur.peek() {
        if depth == 0 && is_option_kw(token) {
            break;
        }
        if token.is_symbol("(") {
            depth += 1;
        } else if token.is_symbol(")") {
            depth = depth.saturating_sub(1);
        }
        cur.bump();
    }
    render_tokens(&cur.tokens[start..cur.pos])
}

/// Split a token slice on commas at parenthesis depth zero.
fn split_top_level(tokens: &[Token]) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, token) in tokens.iter().enumerate() {
        if token.is_symbol("(") {
            depth += 1;
        } else if token.is_symbol(")") {
            depth = depth.saturating_sub(1);
        } else if token.is_symbol(",") && depth == 0 {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
    }
    parts.push(&tokens[start..]);
    parts
}

/// Identifiers from a comma-separated list, skipping anything else.
fn ident_list(tokens: &[Token]) -> Vec<String> {
    tokens.iter().filter_map(|t| t.ident()).collect()
}

fn is_ordering_kw(token: &Token) -> bool {
    ["asc", "desc", "nulls", "first", "last"]
        .iter()
        .any(|kw| token.is_kw(kw))
}

/// Index column list: plain column names stay names, expression entries
/// keep their source text.
fn index_columns(tokens: &[Token]) -> Vec<String> {
    split_top_level(tokens)
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(|item| match item[0].ident() {
            Some(name) if item[1..].iter().all(is_ordering_kw) => name,
            _ => render_tokens(item),
        })
        .collect()
}

/// Reassemble opaque expression text from tokens, close enough to source.
fn render_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        let text = token.text.as_str();
        let glue = out.is_empty()
            || matches!(text, ")" | "]" | "[" | "," | ";" | "." | "::")
            || out.ends_with(['(', '[', '.'])
            || out.ends_with("::")
            || (text == "("
                && out.ends_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '"'));
        if !glue {
            out.push(' ');
        }
        out.push_str(text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::split_statements;

    fn build(sql: &str) -> (SchemaModel, Vec<Finding>) {
        let (statements, findings) = split_statements(sql);
        assert!(findings.is_empty(), "lexer findings: {findings:?}");
        let mut builder = ModelBuilder::new();
        for stmt in &statements {
            builder.ingest(stmt);
        }
        builder.build()
    }

    #[test]
    fn test_simple_create_table() {
        let (model, findings) = build(
            r#"
            CREATE TABLE users (
                id uuid PRIMARY KEY DEFAULT gen_random_uuid(),
                email text NOT NULL UNIQUE,
                display_name varchar(100),
                created_at timestamptz NOT NULL DEFAULT now()
            );
            "#,
        );
        assert!(findings.is_empty());
        let table = model.table(&QualifiedName::new("users")).unwrap();
        assert!(table.declared);
        assert_eq!(table.columns.len(), 4);

        let id = table.column("id").unwrap();
        assert!(!id.nullable);
        assert_eq!(id.data_type, "uuid");
        assert_eq!(id.default.as_deref(), Some("gen_random_uuid()"));

        let email = table.column("email").unwrap();
        assert!(!email.nullable);

        let display = table.column("display_name").unwrap();
        assert!(display.nullable);
        assert_eq!(display.data_type, "varchar(100)");

        assert_eq!(table.primary_keys().count(), 1);
        assert_eq!(
            table
                .constraints
                .iter()
                .filter(|c| c.kind == ConstraintKind::Unique)
                .count(),
            1
        );
    }

    #[test]
    fn test_table_level_constraints() {
        let (model, _) = build(
            r#"
            CREATE TABLE orders (
                id bigint,
                user_id uuid,
                total numeric(10, 2),
                CONSTRAINT pk_orders PRIMARY KEY (id),
                CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES users (id) ON DELETE CASCADE,
                CONSTRAINT ck_orders_total CHECK (total >= 0)
            );
            "#,
        );
        let table = model.table(&QualifiedName::new("orders")).unwrap();
        assert_eq!(table.constraints.len(), 3);

        let pk = table.primary_keys().next().unwrap();
        assert_eq!(pk.name.as_deref(), Some("pk_orders"));
        assert_eq!(pk.columns, vec!["id"]);

        let fk = table.foreign_keys().next().unwrap();
        let target = fk.references.as_ref().unwrap();
        assert_eq!(target.table.name, "users");
        assert_eq!(target.columns, vec!["id"]);

        let check = table
            .constraints
            .iter()
            .find(|c| c.kind == ConstraintKind::Check)
            .unwrap();
        assert_eq!(check.expression.as_deref(), Some("total >= 0"));
    }

    #[test]
    fn test_on_delete_set_null_does_not_reset_nullability() {
        let (model, _) = build(
            "CREATE TABLE posts (author_id uuid NOT NULL REFERENCES users (id) ON DELETE SET NULL);",
        );
        let table = model.table(&QualifiedName::new("posts")).unwrap();
        assert!(!table.column("author_id").unwrap().nullable);
        assert_eq!(table.foreign_keys().count(), 1);
    }

    #[test]
    fn test_out_of_order_alter_merges_into_create() {
        let (model, findings) = build(
            r#"
            ALTER TABLE users ENABLE ROW LEVEL SECURITY;
            CREATE TABLE users (id uuid PRIMARY KEY);
            "#,
        );
        assert!(findings.is_empty());
        let table = model.table(&QualifiedName::new("users")).unwrap();
        assert!(table.declared);
        assert!(table.rls_enabled);
        assert_eq!(table.columns.len(), 1);
    }

    #[test]
    fn test_alter_add_column_and_constraint() {
        let (model, _) = build(
            r#"
            CREATE TABLE events (id bigint);
            ALTER TABLE events ADD COLUMN payload jsonb NOT NULL DEFAULT '{}'::jsonb;
            ALTER TABLE events ADD CONSTRAINT pk_events PRIMARY KEY (id);
            ALTER TABLE events ALTER COLUMN id SET NOT NULL;
            "#,
        );
        let table = model.table(&QualifiedName::new("events")).unwrap();
        assert_eq!(table.columns.len(), 2);
        assert!(!table.column("payload").unwrap().nullable);
        assert!(!table.column("id").unwrap().nullable);
        assert_eq!(table.primary_keys().count(), 1);
    }

    #[test]
    fn test_duplicate_table_is_reported_first_wins() {
        let (model, findings) = build(
            r#"
            CREATE TABLE users (id uuid PRIMARY KEY);
            CREATE TABLE users (other int);
            "#,
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::DuplicateTable);
        let table = model.table(&QualifiedName::new("users")).unwrap();
        assert!(table.has_column("id"));
        assert!(!table.has_column("other"));
    }

    #[test]
    fn test_create_index_forms() {
        let (model, findings) = build(
            r#"
            CREATE TABLE docs (id uuid PRIMARY KEY, body text, embedding vector);
            CREATE INDEX idx_docs_body ON docs USING gin (body);
            CREATE UNIQUE INDEX uidx_docs_id ON docs (id);
            CREATE INDEX ON docs (embedding);
            "#,
        );
        assert!(findings.is_empty());
        assert_eq!(model.indexes.len(), 3);
        assert_eq!(model.indexes[0].method, "gin");
        assert!(model.indexes[1].unique);
        assert_eq!(model.indexes[2].name, None);
        assert_eq!(model.indexes_on("public.docs").count(), 3);
    }

    #[test]
    fn test_index_on_unknown_table_warns_but_is_kept() {
        let (model, findings) = build("CREATE INDEX idx_m_x ON missing (x);");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::IndexTargetUnknown);
        assert_eq!(model.indexes.len(), 1);
    }

    #[test]
    fn test_create_policy_clauses() {
        let (model, _) = build(
            r#"
            CREATE TABLE notes (id uuid PRIMARY KEY, owner_id uuid);
            CREATE POLICY notes_select ON notes
                FOR SELECT TO authenticated
                USING (owner_id = auth.uid());
            CREATE POLICY notes_write ON notes
                FOR INSERT TO authenticated, service_role
                WITH CHECK (owner_id = auth.uid());
            CREATE POLICY notes_all ON notes USING (true);
            "#,
        );
        assert_eq!(model.policies.len(), 3);

        let select = &model.policies[0];
        assert_eq!(select.command, PolicyCommand::Select);
        assert_eq!(select.roles, vec!["authenticated"]);
        assert!(select.using_expr.as_deref().unwrap().contains("auth.uid()"));
        assert!(select.check_expr.is_none());

        let insert = &model.policies[1];
        assert_eq!(insert.command, PolicyCommand::Insert);
        assert_eq!(insert.roles, vec!["authenticated", "service_role"]);
        assert!(insert.check_expr.is_some());

        let all = &model.policies[2];
        assert_eq!(all.command, PolicyCommand::All);
        assert!(all.roles.is_empty());
    }

    #[test]
    fn test_policy_on_unseen_table_creates_placeholder() {
        let (model, _) = build("CREATE POLICY p ON elsewhere FOR SELECT USING (true);");
        let table = model.table(&QualifiedName::new("elsewhere")).unwrap();
        assert!(!table.declared);
        assert_eq!(model.policies_on("public.elsewhere").count(), 1);
    }

    #[test]
    fn test_create_function_language() {
        let (model, _) = build(
            r#"
            CREATE OR REPLACE FUNCTION set_updated_at() RETURNS trigger AS $$
            BEGIN
                NEW.updated_at = now();
                RETURN NEW;
            END;
            $$ LANGUAGE plpgsql;
            "#,
        );
        let function = model.functions.get("public.set_updated_at").unwrap();
        assert_eq!(function.language.as_deref(), Some("plpgsql"));
    }

    #[test]
    fn test_unrecognized_statements_are_stored_verbatim() {
        let (model, findings) = build(
            r#"
            GRANT SELECT ON users TO anon;
            CREATE TABLE users (id uuid PRIMARY KEY);
            COMMENT ON TABLE users IS 'people';
            "#,
        );
        assert!(findings.is_empty());
        assert_eq!(model.ignored.len(), 2);
        assert!(model.ignored[0].sql.starts_with("GRANT"));
    }

    #[test]
    fn test_schema_qualified_names_resolve() {
        let (model, _) = build(
            r#"
            CREATE TABLE public.users (id uuid PRIMARY KEY);
            CREATE INDEX idx_users_id ON users (id);
            "#,
        );
        assert!(model.table_exists(&QualifiedName::new("users")));
        assert_eq!(model.indexes_on("public.users").count(), 1);
    }
}
