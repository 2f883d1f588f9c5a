//! Recursive-descent parser. Consumes the token stream produced by
//! [`crate::lexer`] and produces a [`StatementList`]. Hand-written,
//! top-down, one entry point (`parse`/`parse_with_timeout`).
//!
//! The parser enforces a wall-clock deadline (default 30s, §4.2):
//! `check_deadline` is polled at the top of every loop that could otherwise
//! spin forever on pathological input (the statement loop, table-element
//! loop, table-options loop, column-modifier loop).

use std::time::{Duration, Instant};

use crate::error::{ParseError, PtahError, TimeoutError};
use crate::ir::{
    AlterTable, AlterTableOperation, Column, ColumnDefault, Comment, Constraint, CreateTable, Enum, ForeignKeyRef,
    Index, Node, StatementList,
};
use crate::lexer::{Lexer, Token, TokenKind};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Parse DDL text with the default 30s deadline.
pub fn parse(input: &str) -> Result<StatementList, PtahError> {
    parse_with_timeout(input, DEFAULT_TIMEOUT)
}

/// Parse DDL text with an explicit deadline.
pub fn parse_with_timeout(input: &str, timeout: Duration) -> Result<StatementList, PtahError> {
    let tokens = Lexer::tokenize(input)?;
    let significant: Vec<Token> = tokens
        .into_iter()
        .filter(|t| !matches!(t.kind, TokenKind::Whitespace | TokenKind::Comment))
        .collect();
    let mut parser = Parser {
        tokens: significant,
        pos: 0,
        start: Instant::now(),
        timeout,
    };
    parser.parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    start: Instant,
    timeout: Duration,
}

impl Parser {
    fn parse_program(&mut self) -> Result<StatementList, PtahError> {
        let mut out = StatementList::new();
        loop {
            self.check_deadline()?;
            if self.at_eof() {
                break;
            }
            if self.is_semicolon() {
                self.advance();
                continue;
            }
            let nodes = self.parse_statement()?;
            out.extend(nodes);
            if self.is_semicolon() {
                self.advance();
            } else if !self.at_eof() {
                let tok = self.current().clone();
                return Err(ParseError::new(tok.start, "`;` or end of input", describe(&tok)).into());
            }
        }
        Ok(out)
    }

    fn parse_statement(&mut self) -> Result<Vec<Node>, PtahError> {
        if self.peek_keyword("CREATE") {
            match self.peek_ahead_upper(1).as_deref() {
                Some("TABLE") => self.parse_create_table(),
                Some("UNIQUE") => Ok(vec![self.parse_create_index()?]),
                Some("INDEX") => Ok(vec![self.parse_create_index()?]),
                Some("TYPE") => Ok(vec![self.parse_create_type()?]),
                Some("DOMAIN") => Ok(vec![self.parse_create_domain()?]),
                _ => {
                    let tok = self.peek_token(1).cloned().unwrap_or_else(|| self.current().clone());
                    Err(ParseError::unsupported_keyword(tok.start, &tok.value).into())
                }
            }
        } else if self.peek_keyword("ALTER") {
            Ok(vec![self.parse_alter_table()?])
        } else if self.peek_keyword("COMMENT") {
            Ok(vec![self.parse_comment_on()?])
        } else {
            let tok = self.current().clone();
            Err(ParseError::unsupported_keyword(tok.start, &tok.value).into())
        }
    }

    // ---- CREATE TABLE ----------------------------------------------------

    fn parse_create_table(&mut self) -> Result<Vec<Node>, PtahError> {
        self.expect_keyword("CREATE")?;
        self.expect_keyword("TABLE")?;
        if self.peek_keyword("IF") {
            self.advance();
            self.expect_keyword("NOT")?;
            self.expect_keyword("EXISTS")?;
        }
        let name = self.expect_identifier_path()?;
        self.expect_operator("(")?;

        let mut columns = Vec::new();
        let mut constraints = Vec::new();
        let mut indexes = Vec::new();

        loop {
            self.check_deadline()?;
            if self.peek_keyword("INDEX") || self.peek_keyword("KEY") || self.peek_keyword("SPATIAL") {
                indexes.push(self.parse_inline_index(&name)?);
            } else if self.peek_constraint_start() {
                constraints.push(self.parse_table_constraint()?);
            } else {
                columns.push(self.parse_column_def()?);
            }

            if self.is_operator(",") {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_operator(")")?;

        let mut table = CreateTable::new(name, columns).with_constraints(constraints);
        self.parse_table_options(&mut table)?;

        let mut nodes = vec![Node::CreateTable(table)];
        nodes.extend(indexes.into_iter().map(Node::Index));
        Ok(nodes)
    }

    fn peek_constraint_start(&self) -> bool {
        ["CONSTRAINT", "PRIMARY", "UNIQUE", "FOREIGN", "CHECK"]
            .iter()
            .any(|kw| self.peek_keyword(kw))
    }

    fn parse_inline_index(&mut self, table: &str) -> Result<Index, PtahError> {
        let spatial = self.peek_keyword("SPATIAL");
        if spatial {
            self.advance();
        }
        if self.peek_keyword("INDEX") || self.peek_keyword("KEY") {
            self.advance();
        }
        let name = if self.current().kind == TokenKind::Identifier {
            self.advance().value
        } else {
            format!("idx_{}", table)
        };
        let cols = self.parse_column_list()?;
        let mut idx = Index::new(name, table.to_string(), cols);
        if spatial {
            idx = idx.with_type("SPATIAL");
        }
        Ok(idx)
    }

    fn parse_table_constraint(&mut self) -> Result<Constraint, PtahError> {
        let mut name = None;
        if self.peek_keyword("CONSTRAINT") {
            self.advance();
            name = Some(self.expect_identifier()?);
        }

        if self.peek_keyword("PRIMARY") {
            self.advance();
            self.expect_keyword("KEY")?;
            let cols = self.parse_column_list()?;
            let mut c = Constraint::primary_key(cols);
            c.name = name;
            Ok(c)
        } else if self.peek_keyword("UNIQUE") {
            self.advance();
            if self.peek_keyword("KEY") || self.peek_keyword("INDEX") {
                self.advance();
            }
            if self.current().kind == TokenKind::Identifier {
                name = name.or_else(|| Some(self.advance().value));
            }
            let cols = self.parse_column_list()?;
            Ok(Constraint::unique(name, cols))
        } else if self.peek_keyword("FOREIGN") {
            self.advance();
            self.expect_keyword("KEY")?;
            let cols = self.parse_column_list()?;
            self.expect_keyword("REFERENCES")?;
            let fk = self.parse_fk_ref()?;
            Ok(Constraint::foreign_key(name, cols, fk))
        } else if self.peek_keyword("CHECK") {
            self.advance();
            self.expect_operator("(")?;
            let expr = self.parse_balanced_parens()?;
            self.expect_operator(")")?;
            Ok(Constraint::check(name, expr))
        } else {
            let tok = self.current().clone();
            Err(ParseError::unsupported_keyword(tok.start, &tok.value).into())
        }
    }

    fn parse_table_options(&mut self, table: &mut CreateTable) -> Result<(), PtahError> {
        loop {
            self.check_deadline()?;
            if self.at_eof() || self.is_semicolon() {
                break;
            }
            if self.peek_keyword("DEFAULT") {
                self.advance();
                continue;
            }
            if self.peek_keyword("ENGINE") {
                self.advance();
                self.maybe_eq();
                let v = self.expect_identifier()?;
                table.options.push(("ENGINE".to_string(), v));
            } else if self.peek_keyword("CHARACTER") && self.peek_ahead_keyword_is(1, "SET") {
                self.advance();
                self.advance();
                self.maybe_eq();
                let v = self.expect_identifier()?;
                table.options.push(("CHARSET".to_string(), v));
            } else if self.peek_keyword("CHARSET") {
                self.advance();
                self.maybe_eq();
                let v = self.expect_identifier()?;
                table.options.push(("CHARSET".to_string(), v));
            } else if self.peek_keyword("COLLATE") {
                self.advance();
                self.maybe_eq();
                let v = self.expect_identifier()?;
                table.options.push(("COLLATE".to_string(), v));
            } else if self.peek_keyword("COMMENT") {
                self.advance();
                self.maybe_eq();
                let v = self.expect_string_value()?;
                table.comment = Some(v);
            } else if self.peek_keyword("AUTO_INCREMENT") {
                self.advance();
                self.maybe_eq();
                let v = self.expect_number()?;
                table.options.push(("AUTO_INCREMENT".to_string(), v));
            } else if self.peek_keyword("ROW_FORMAT") {
                self.advance();
                self.maybe_eq();
                let v = self.expect_identifier()?;
                table.options.push(("ROW_FORMAT".to_string(), v));
            } else if self.peek_keyword("TABLESPACE") {
                self.advance();
                let v = self.expect_identifier()?;
                table.options.push(("TABLESPACE".to_string(), v));
            } else if self.peek_keyword("WITH") {
                self.advance();
                self.expect_operator("(")?;
                loop {
                    self.check_deadline()?;
                    if self.is_operator(")") {
                        break;
                    }
                    let key = self.expect_identifier()?;
                    self.maybe_eq();
                    let value = match self.current().kind {
                        TokenKind::String => self.expect_string_value()?,
                        TokenKind::Number => self.expect_number()?,
                        _ => self.expect_identifier()?,
                    };
                    table.options.push((key, value));
                    if self.is_operator(",") {
                        self.advance();
                        continue;
                    }
                    break;
                }
                self.expect_operator(")")?;
            } else {
                break;
            }
        }
        Ok(())
    }

    // ---- column definitions -----------------------------------------------

    fn parse_column_def(&mut self) -> Result<Column, PtahError> {
        let name = self.expect_identifier()?;
        let sql_type = self.parse_column_type()?;
        let mut col = Column::new(name, sql_type);

        loop {
            self.check_deadline()?;
            if self.is_operator(",") || self.is_operator(")") {
                break;
            }
            if self.peek_keyword("NOT") {
                self.advance();
                self.expect_keyword("NULL")?;
                col.nullable = false;
            } else if self.peek_keyword("NULL") {
                self.advance();
                col.nullable = true;
            } else if self.peek_keyword("PRIMARY") {
                self.advance();
                self.expect_keyword("KEY")?;
                col.primary = true;
                col.nullable = false;
            } else if self.peek_keyword("UNIQUE") {
                self.advance();
                col.unique = true;
            } else if self.peek_keyword("AUTO_INCREMENT") || self.peek_keyword("AUTOINCREMENT") {
                self.advance();
                col.auto_increment = true;
            } else if self.peek_keyword("DEFAULT") {
                self.advance();
                col.default = Some(self.parse_default_value()?);
            } else if self.peek_keyword("CHECK") {
                self.advance();
                self.expect_operator("(")?;
                let expr = self.parse_balanced_parens()?;
                self.expect_operator(")")?;
                col.check = Some(expr);
            } else if self.peek_keyword("REFERENCES") {
                self.advance();
                col.foreign_key = Some(self.parse_fk_ref()?);
            } else if self.peek_keyword("GENERATED") {
                self.advance();
                self.expect_keyword("ALWAYS")?;
                self.expect_keyword("AS")?;
                self.expect_operator("(")?;
                let expr = self.parse_balanced_parens()?;
                self.expect_operator(")")?;
                if self.peek_keyword("STORED") {
                    self.advance();
                }
                col.default = Some(ColumnDefault::Expression(expr));
            } else if self.peek_keyword("AS") {
                self.advance();
                self.expect_operator("(")?;
                let expr = self.parse_balanced_parens()?;
                self.expect_operator(")")?;
                if self.peek_keyword("STORED") || self.peek_keyword("VIRTUAL") {
                    self.advance();
                }
                col.default = Some(ColumnDefault::Expression(expr));
            } else if self.peek_keyword("CHARACTER") && self.peek_ahead_keyword_is(1, "SET") {
                self.advance();
                self.advance();
                let _ = self.expect_identifier()?;
            } else if self.peek_keyword("COLLATE") {
                self.advance();
                let _ = self.expect_identifier()?;
            } else if self.peek_keyword("ON") {
                self.advance();
                self.expect_keyword("UPDATE")?;
                let _ = self.parse_default_value()?;
            } else {
                let tok = self.current().clone();
                return Err(ParseError::unsupported_keyword(tok.start, &tok.value).into());
            }
        }

        Ok(col)
    }

    fn parse_column_type(&mut self) -> Result<String, PtahError> {
        let mut parts = vec![self.expect_identifier()?];

        if parts[0].eq_ignore_ascii_case("DOUBLE") && self.peek_keyword("PRECISION") {
            parts.push(self.advance().value);
        }
        if parts[0].eq_ignore_ascii_case("CHARACTER") && self.peek_keyword("VARYING") {
            parts.push(self.advance().value);
        }
        if parts[0].eq_ignore_ascii_case("TIME") || parts[0].eq_ignore_ascii_case("TIMESTAMP") {
            if self.peek_keyword("WITH") || self.peek_keyword("WITHOUT") {
                parts.push(self.advance().value);
                parts.push(self.expect_keyword("TIME")?.value);
                parts.push(self.expect_keyword("ZONE")?.value);
            }
        }

        if self.is_operator("(") {
            parts.push(self.advance().value);
            loop {
                self.check_deadline()?;
                parts.push(self.advance().value);
                if self.is_operator(",") {
                    parts.push(self.advance().value);
                    continue;
                }
                break;
            }
            parts.push(self.expect_operator(")")?.value);
        }

        while self.is_operator("[") {
            parts.push(self.advance().value);
            parts.push(self.expect_operator("]")?.value);
        }

        while self.peek_keyword("UNSIGNED") || self.peek_keyword("SIGNED") || self.peek_keyword("ZEROFILL") {
            parts.push(self.advance().value);
        }

        Ok(join_sql_tokens(&parts))
    }

    fn parse_default_value(&mut self) -> Result<ColumnDefault, PtahError> {
        self.check_deadline()?;
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::String => {
                self.advance();
                let mut text = tok.value;
                if self.is_double_colon() {
                    self.advance();
                    self.advance();
                    let cast_type = self.parse_type_name_simple()?;
                    text = format!("{}::{}", text, cast_type);
                }
                Ok(ColumnDefault::Literal(text))
            }
            TokenKind::Number => {
                self.advance();
                Ok(ColumnDefault::Literal(tok.value))
            }
            TokenKind::Operator if tok.value == "-" || tok.value == "+" => {
                self.advance();
                let num = self.expect_number()?;
                Ok(ColumnDefault::Literal(format!("{}{}", tok.value, num)))
            }
            TokenKind::Identifier => {
                let upper = tok.value.to_ascii_uppercase();
                if matches!(
                    upper.as_str(),
                    "CURRENT_TIMESTAMP" | "NOW" | "CURRENT_DATE" | "CURRENT_TIME" | "GEN_RANDOM_UUID"
                ) {
                    self.advance();
                    if self.is_operator("(") {
                        self.advance();
                        self.expect_operator(")")?;
                    }
                    Ok(ColumnDefault::Expression(format!("{}()", tok.value)))
                } else if upper == "ARRAY" {
                    self.advance();
                    self.expect_operator("[")?;
                    let inner = self.parse_balanced_brackets()?;
                    self.expect_operator("]")?;
                    let mut expr = format!("ARRAY[{}]", inner);
                    if self.is_double_colon() {
                        self.advance();
                        self.advance();
                        let cast = self.parse_type_name_simple()?;
                        expr = format!("{}::{}", expr, cast);
                    }
                    Ok(ColumnDefault::Expression(expr))
                } else {
                    self.advance();
                    if self.is_operator("(") {
                        self.advance();
                        let args = self.parse_balanced_parens()?;
                        self.expect_operator(")")?;
                        Ok(ColumnDefault::Expression(format!("{}({})", tok.value, args)))
                    } else {
                        Ok(ColumnDefault::Literal(tok.value))
                    }
                }
            }
            _ => Err(ParseError::new(tok.start, "a default value", describe(&tok)).into()),
        }
    }

    fn parse_fk_ref(&mut self) -> Result<ForeignKeyRef, PtahError> {
        let table = self.expect_identifier_path()?;
        self.expect_operator("(")?;
        let column = self.expect_identifier()?;
        self.expect_operator(")")?;
        let mut fk = ForeignKeyRef::new(table, column);

        loop {
            self.check_deadline()?;
            if !self.peek_keyword("ON") {
                break;
            }
            self.advance();
            if self.peek_keyword("DELETE") {
                self.advance();
                fk.on_delete = Some(self.parse_fk_action()?);
            } else if self.peek_keyword("UPDATE") {
                self.advance();
                fk.on_update = Some(self.parse_fk_action()?);
            } else {
                let tok = self.current().clone();
                return Err(ParseError::unsupported_keyword(tok.start, &tok.value).into());
            }
        }
        Ok(fk)
    }

    fn parse_fk_action(&mut self) -> Result<String, PtahError> {
        if self.peek_keyword("CASCADE") {
            self.advance();
            return Ok("CASCADE".to_string());
        }
        if self.peek_keyword("RESTRICT") {
            self.advance();
            return Ok("RESTRICT".to_string());
        }
        if self.peek_keyword("NO") {
            self.advance();
            self.expect_keyword("ACTION")?;
            return Ok("NO ACTION".to_string());
        }
        if self.peek_keyword("SET") {
            self.advance();
            if self.peek_keyword("NULL") {
                self.advance();
                return Ok("SET NULL".to_string());
            }
            if self.peek_keyword("DEFAULT") {
                self.advance();
                return Ok("SET DEFAULT".to_string());
            }
        }
        let tok = self.current().clone();
        Err(ParseError::unsupported_keyword(tok.start, &tok.value).into())
    }

    fn parse_column_list(&mut self) -> Result<Vec<String>, PtahError> {
        self.expect_operator("(")?;
        let mut cols = Vec::new();
        loop {
            self.check_deadline()?;
            cols.push(self.expect_identifier()?);
            if self.is_operator(",") {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_operator(")")?;
        Ok(cols)
    }

    // ---- ALTER TABLE -------------------------------------------------------

    fn parse_alter_table(&mut self) -> Result<Node, PtahError> {
        self.expect_keyword("ALTER")?;
        self.expect_keyword("TABLE")?;
        let table = self.expect_identifier_path()?;
        let mut ops = Vec::new();

        loop {
            self.check_deadline()?;
            if self.peek_keyword("ADD") {
                self.advance();
                if self.peek_keyword("COLUMN") {
                    self.advance();
                }
                ops.push(AlterTableOperation::AddColumn(self.parse_column_def()?));
            } else if self.peek_keyword("DROP") {
                self.advance();
                if self.peek_keyword("COLUMN") {
                    self.advance();
                }
                ops.push(AlterTableOperation::DropColumn(self.expect_identifier()?));
            } else if self.peek_keyword("MODIFY") {
                self.advance();
                if self.peek_keyword("COLUMN") {
                    self.advance();
                }
                ops.push(AlterTableOperation::ModifyColumn(self.parse_column_def()?));
            } else if self.peek_keyword("ALTER") {
                self.advance();
                if self.peek_keyword("COLUMN") {
                    self.advance();
                }
                ops.push(AlterTableOperation::ModifyColumn(self.parse_column_def()?));
            } else {
                let tok = self.current().clone();
                return Err(ParseError::unsupported_keyword(tok.start, &tok.value).into());
            }

            if self.is_operator(",") {
                self.advance();
                continue;
            }
            break;
        }

        Ok(Node::AlterTable(AlterTable::new(table, ops)))
    }

    // ---- CREATE INDEX / CREATE TYPE / CREATE DOMAIN / COMMENT ON ----------

    fn parse_create_index(&mut self) -> Result<Node, PtahError> {
        self.expect_keyword("CREATE")?;
        let unique = if self.peek_keyword("UNIQUE") {
            self.advance();
            true
        } else {
            false
        };
        self.expect_keyword("INDEX")?;
        let name = self.expect_identifier()?;
        self.expect_keyword("ON")?;
        let table = self.expect_identifier_path()?;
        let cols = self.parse_column_list()?;
        Ok(Node::Index(Index::new(name, table, cols).set_unique(unique)))
    }

    fn parse_create_type(&mut self) -> Result<Node, PtahError> {
        self.expect_keyword("CREATE")?;
        self.expect_keyword("TYPE")?;
        let name = self.expect_identifier()?;
        self.expect_keyword("AS")?;
        self.expect_keyword("ENUM")?;
        self.expect_operator("(")?;
        let mut values = Vec::new();
        loop {
            self.check_deadline()?;
            values.push(self.expect_string_value()?);
            if self.is_operator(",") {
                self.advance();
                continue;
            }
            break;
        }
        self.expect_operator(")")?;
        Ok(Node::Enum(Enum::new(name, values)))
    }

    /// `CREATE DOMAIN` is lowered to a `Comment` carrying the clause
    /// verbatim; the differ/planner do not act on domains (§9, open
    /// question resolved in `DESIGN.md`).
    fn parse_create_domain(&mut self) -> Result<Node, PtahError> {
        let mut parts = Vec::new();
        loop {
            self.check_deadline()?;
            if self.is_semicolon() || self.at_eof() {
                break;
            }
            parts.push(self.advance().value);
        }
        Ok(Node::Comment(Comment::new(join_sql_tokens(&parts))))
    }

    fn parse_comment_on(&mut self) -> Result<Node, PtahError> {
        self.expect_keyword("COMMENT")?;
        self.expect_keyword("ON")?;
        let mut parts = vec!["COMMENT".to_string(), "ON".to_string()];
        loop {
            self.check_deadline()?;
            if self.peek_keyword("IS") {
                break;
            }
            parts.push(self.advance().value);
        }
        self.expect_keyword("IS")?;
        let text = self.expect_string_value()?;
        parts.push("IS".to_string());
        parts.push(format!("'{}'", text.replace('\'', "''")));
        Ok(Node::Comment(Comment::new(join_sql_tokens(&parts))))
    }

    // ---- token-stream primitives -------------------------------------------

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_token(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn advance(&mut self) -> Token {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        tok
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn is_semicolon(&self) -> bool {
        self.current().kind == TokenKind::Semicolon
    }

    fn is_operator(&self, op: &str) -> bool {
        self.current().kind == TokenKind::Operator && self.current().value == op
    }

    fn is_double_colon(&self) -> bool {
        self.is_operator(":") && self.peek_token(1).map(|t| t.kind == TokenKind::Operator && t.value == ":").unwrap_or(false)
    }

    fn peek_keyword(&self, kw: &str) -> bool {
        self.current().kind == TokenKind::Identifier && self.current().value.eq_ignore_ascii_case(kw)
    }

    fn peek_ahead_keyword_is(&self, offset: usize, kw: &str) -> bool {
        self.peek_token(offset)
            .map(|t| t.kind == TokenKind::Identifier && t.value.eq_ignore_ascii_case(kw))
            .unwrap_or(false)
    }

    fn peek_ahead_upper(&self, offset: usize) -> Option<String> {
        self.peek_token(offset)
            .filter(|t| t.kind == TokenKind::Identifier)
            .map(|t| t.value.to_ascii_uppercase())
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<Token, PtahError> {
        if self.peek_keyword(kw) {
            Ok(self.advance())
        } else {
            let tok = self.current().clone();
            Err(ParseError::new(tok.start, format!("keyword `{}`", kw), describe(&tok)).into())
        }
    }

    fn expect_operator(&mut self, op: &str) -> Result<Token, PtahError> {
        if self.is_operator(op) {
            Ok(self.advance())
        } else {
            let tok = self.current().clone();
            Err(ParseError::new(tok.start, format!("`{}`", op), describe(&tok)).into())
        }
    }

    fn expect_identifier(&mut self) -> Result<String, PtahError> {
        let tok = self.current().clone();
        match tok.kind {
            TokenKind::Identifier => {
                self.advance();
                Ok(tok.value)
            }
            TokenKind::String if tok.value.starts_with('"') => {
                self.advance();
                Ok(tok.value.trim_matches('"').to_string())
            }
            _ => Err(ParseError::new(tok.start, "an identifier", describe(&tok)).into()),
        }
    }

    fn expect_identifier_path(&mut self) -> Result<String, PtahError> {
        let mut path = self.expect_identifier()?;
        while self.is_operator(".") {
            self.advance();
            path.push('.');
            path.push_str(&self.expect_identifier()?);
        }
        Ok(path)
    }

    fn expect_string_value(&mut self) -> Result<String, PtahError> {
        let tok = self.current().clone();
        if tok.kind == TokenKind::String && tok.value.starts_with('\'') {
            self.advance();
            let inner = &tok.value[1..tok.value.len() - 1];
            Ok(inner.replace("''", "'"))
        } else {
            Err(ParseError::new(tok.start, "a string literal", describe(&tok)).into())
        }
    }

    fn expect_number(&mut self) -> Result<String, PtahError> {
        let tok = self.current().clone();
        if tok.kind == TokenKind::Number {
            self.advance();
            Ok(tok.value)
        } else {
            Err(ParseError::new(tok.start, "a number", describe(&tok)).into())
        }
    }

    fn maybe_eq(&mut self) {
        if self.is_operator("=") {
            self.advance();
        }
    }

    fn parse_type_name_simple(&mut self) -> Result<String, PtahError> {
        let mut s = self.expect_identifier()?;
        while self.is_operator("[") {
            self.advance();
            self.expect_operator("]")?;
            s.push_str("[]");
        }
        Ok(s)
    }

    /// Reads tokens until a matching top-level `)`, tracking nested-paren
    /// depth, without consuming the closing paren. Used for CHECK/EXCLUDE
    /// expressions and default-value function arguments.
    fn parse_balanced_parens(&mut self) -> Result<String, PtahError> {
        let mut depth = 0i32;
        let mut parts = Vec::new();
        loop {
            self.check_deadline()?;
            if self.at_eof() {
                let tok = self.current().clone();
                return Err(ParseError::new(tok.start, "`)`", "end of input").into());
            }
            if self.is_operator("(") {
                depth += 1;
                parts.push(self.advance().value);
                continue;
            }
            if self.is_operator(")") {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                parts.push(self.advance().value);
                continue;
            }
            parts.push(self.advance().value);
        }
        Ok(join_sql_tokens(&parts))
    }

    fn parse_balanced_brackets(&mut self) -> Result<String, PtahError> {
        let mut depth = 0i32;
        let mut parts = Vec::new();
        loop {
            self.check_deadline()?;
            if self.at_eof() {
                let tok = self.current().clone();
                return Err(ParseError::new(tok.start, "`]`", "end of input").into());
            }
            if self.is_operator("[") {
                depth += 1;
                parts.push(self.advance().value);
                continue;
            }
            if self.is_operator("]") {
                if depth == 0 {
                    break;
                }
                depth -= 1;
                parts.push(self.advance().value);
                continue;
            }
            parts.push(self.advance().value);
        }
        Ok(join_sql_tokens(&parts))
    }

    fn check_deadline(&self) -> Result<(), TimeoutError> {
        if self.start.elapsed() > self.timeout {
            Err(TimeoutError {
                offset: self.current().start,
                budget_secs: self.timeout.as_secs(),
            })
        } else {
            Ok(())
        }
    }
}

fn describe(tok: &Token) -> String {
    if tok.kind == TokenKind::Eof {
        "end of input".to_string()
    } else {
        format!("`{}`", tok.value)
    }
}

fn join_sql_tokens(parts: &[String]) -> String {
    let mut out = String::new();
    for p in parts {
        if out.is_empty() {
            out.push_str(p);
            continue;
        }
        let prev_no_space_after = out.ends_with('(') || out.ends_with('[');
        let this_no_space_before = matches!(p.as_str(), ")" | "," | "]" | "::" | "(");
        if prev_no_space_after || this_no_space_before {
            out.push_str(p);
        } else {
            out.push(' ');
            out.push_str(p);
        }
    }
    out
}
