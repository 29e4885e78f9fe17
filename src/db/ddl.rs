//! ALTER TABLE compilation.
//!
//! Turns a [`ChangeSet`] into dialect-specific DDL. Compilation is pure: it
//! never touches the database, so it can run concurrently and be tested
//! without a connection.
//!
//! # Architecture
//!
//! Compilation runs in two phases. Validation rejects change kinds the core
//! cannot express (`rename`, `change`, `name`) before anything is rendered.
//! Rendering then turns each entry into a typed [`AlterClause`] and hands the
//! clauses to [`AlterTableBuilder`], which applies the platform's
//! [`AlterStyle`].

use crate::db::platform::{AlterStyle, Platform};
use crate::error::{DbError, DbResult};
use crate::models::{ChangeKind, ChangeSet, ColumnSpec};
use crate::types::NormalizedType;

/// Change kinds this compiler can render.
const SUPPORTED_KINDS: [ChangeKind; 2] = [ChangeKind::Add, ChangeKind::Remove];

/// Result of compiling a change set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterPlan {
    /// Validation passed; no SQL was rendered
    Checked,
    /// Nothing to execute. Callers must not issue DDL.
    NoOp,
    /// Statements to execute in order
    Statements(Vec<String>),
}

impl AlterPlan {
    pub fn statements(&self) -> &[String] {
        match self {
            Self::Statements(statements) => statements,
            _ => &[],
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// One clause of an `ALTER TABLE` statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlterClause {
    /// Rendered column declaration
    AddColumn(String),
    /// Quoted column name
    DropColumn(String),
}

impl AlterClause {
    fn render(&self, platform: &Platform) -> String {
        match self {
            Self::AddColumn(declaration) => {
                format!("{} {}", platform.add_column_keyword(), declaration)
            }
            Self::DropColumn(column) => format!("DROP COLUMN {}", column),
        }
    }
}

/// Assembles clauses into `ALTER TABLE` statements.
#[derive(Debug)]
pub struct AlterTableBuilder<'a> {
    platform: &'a Platform,
    table: String,
    clauses: Vec<AlterClause>,
}

impl<'a> AlterTableBuilder<'a> {
    pub fn new(platform: &'a Platform, table: &str) -> Self {
        Self {
            platform,
            table: platform.quote_identifier(table, true),
            clauses: Vec::new(),
        }
    }

    pub fn clause(mut self, clause: AlterClause) -> Self {
        self.clauses.push(clause);
        self
    }

    pub fn clauses(mut self, clauses: impl IntoIterator<Item = AlterClause>) -> Self {
        self.clauses.extend(clauses);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Render the statements. Empty when no clause was added.
    pub fn build(&self) -> Vec<String> {
        if self.clauses.is_empty() {
            return Vec::new();
        }
        let rendered = self.clauses.iter().map(|c| c.render(self.platform));
        match self.platform.alter_style() {
            AlterStyle::Combined => vec![format!(
                "ALTER TABLE {} {}",
                self.table,
                rendered.collect::<Vec<_>>().join(", ")
            )],
            AlterStyle::PerClause => rendered
                .map(|clause| format!("ALTER TABLE {} {}", self.table, clause))
                .collect(),
        }
    }
}

/// Compiles change sets for one platform.
#[derive(Debug, Clone, Copy)]
pub struct DdlCompiler<'a> {
    platform: &'a Platform,
}

impl<'a> DdlCompiler<'a> {
    pub fn new(platform: &'a Platform) -> Self {
        Self { platform }
    }

    /// Reject change kinds that cannot be compiled.
    ///
    /// Groups are checked in the order add, remove, rename, change, name; the
    /// first present unsupported group is reported.
    pub fn validate(&self, changes: &ChangeSet) -> DbResult<()> {
        match changes
            .kinds()
            .into_iter()
            .find(|kind| !SUPPORTED_KINDS.contains(kind))
        {
            Some(kind) => Err(DbError::unsupported(kind.as_str(), self.platform.name())),
            None => Ok(()),
        }
    }

    /// Compile a change set for `table`.
    ///
    /// With `check_only` the call stops after validation and returns
    /// [`AlterPlan::Checked`].
    pub fn compile(&self, table: &str, changes: &ChangeSet, check_only: bool) -> DbResult<AlterPlan> {
        self.validate(changes)?;
        if check_only {
            return Ok(AlterPlan::Checked);
        }
        if table.trim().is_empty() {
            return Err(DbError::invalid_input("Table name cannot be empty"));
        }

        let clauses = self.clauses(changes)?;
        let builder = AlterTableBuilder::new(self.platform, table).clauses(clauses);
        if builder.is_empty() {
            return Ok(AlterPlan::NoOp);
        }
        Ok(AlterPlan::Statements(builder.build()))
    }

    /// Render every entry before any SQL is assembled, so a bad entry fails
    /// the whole compilation.
    fn clauses(&self, changes: &ChangeSet) -> DbResult<Vec<AlterClause>> {
        let mut clauses = Vec::with_capacity(changes.add.len() + changes.remove.len());
        for (name, spec) in &changes.add {
            clauses.push(AlterClause::AddColumn(self.column_declaration(name, spec)?));
        }
        for name in &changes.remove {
            if name.trim().is_empty() {
                return Err(DbError::invalid_input("Column name to remove cannot be empty"));
            }
            clauses.push(AlterClause::DropColumn(
                self.platform.quote_identifier(name, true),
            ));
        }
        Ok(clauses)
    }

    /// Render a column declaration: name, native type, default, nullability
    /// and identity fragment.
    pub fn column_declaration(&self, name: &str, spec: &ColumnSpec) -> DbResult<String> {
        if name.trim().is_empty() {
            return Err(DbError::invalid_input("Column name cannot be empty"));
        }

        let mut declaration = format!(
            "{} {}",
            self.platform.quote_identifier(name, true),
            self.platform.native_type_declaration(spec)?
        );
        if let Some(default) = &spec.default {
            declaration.push_str(" DEFAULT ");
            declaration.push_str(&self.default_literal(name, spec, default)?);
        }
        declaration.push_str(if spec.notnull { " NOT NULL" } else { " NULL" });
        if spec.autoincrement {
            declaration.push(' ');
            declaration.push_str(self.platform.identity_fragment());
        }
        Ok(declaration)
    }

    fn default_literal(&self, name: &str, spec: &ColumnSpec, default: &str) -> DbResult<String> {
        if !spec.column_type.is_numeric() {
            return Ok(self.platform.quote_literal(default));
        }
        let trimmed = default.trim();
        let literal = if spec.column_type == NormalizedType::Boolean {
            parse_boolean(trimmed).map(|b| self.platform.boolean_literal(b).to_string())
        } else if trimmed.parse::<f64>().is_ok_and(f64::is_finite) {
            Some(trimmed.to_string())
        } else {
            None
        };
        literal.ok_or_else(|| {
            DbError::invalid_input(format!(
                "Default '{}' of column '{}' is not a valid {} value",
                default, name, spec.column_type
            ))
        })
    }
}

fn parse_boolean(value: &str) -> Option<bool> {
    if value.eq_ignore_ascii_case("true") || value == "1" {
        Some(true)
    } else if value.eq_ignore_ascii_case("false") || value == "0" {
        Some(false)
    } else {
        None
    }
}
