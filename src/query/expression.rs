//! Fluent boolean predicate builder with positional argument binding.
//!
//! A [`QueryExpression`] accumulates a predicate string and its argument list
//! in lockstep: the number of `?` placeholders in [`QueryExpression::predicate`]
//! always equals the number of entries in [`QueryExpression::arguments`], in
//! the same left-to-right order. Clauses are joined by an implicit connective
//! that defaults to `AND`; [`QueryExpression::or`] switches the connective for
//! the next clause only.
//!
//! Building is sequential and stateful. An expression is a single-writer
//! object: compose it from one call site, then hand it off.
//!
//! ## Usage
//!
//! ```rust
//! use quarry::query::{Operator, QueryExpression};
//!
//! let mut expr = QueryExpression::new();
//! expr.expr("title", Operator::Like, "A%").or().expr("title", Operator::Like, "B%");
//! assert_eq!(expr.predicate(), "title LIKE ? OR title LIKE ?");
//! assert_eq!(expr.arguments(), ["A%", "B%"]);
//! ```

use crate::pool::Reusable;

/// Comparison operators accepted by the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    AtLeast,
    AtMost,
    Like,
    Is,
    IsNot,
    /// SQLite `GLOB` pattern match.
    Glob,
}

impl Operator {
    fn sql(self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "!=",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
            Operator::AtLeast => ">=",
            Operator::AtMost => "<=",
            Operator::Like => "LIKE",
            Operator::Is => "IS",
            Operator::IsNot => "IS NOT",
            Operator::Glob => "GLOB",
        }
    }
}

/// Literal keywords that may stand on the right side of a clause.
///
/// These render directly into the predicate text and bind no argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlKeyword {
    Null,
    CurrentTime,
    CurrentDate,
    CurrentTimestamp,
}

impl SqlKeyword {
    fn sql(self) -> &'static str {
        match self {
            SqlKeyword::Null => "NULL",
            SqlKeyword::CurrentTime => "CURRENT_TIME",
            SqlKeyword::CurrentDate => "CURRENT_DATE",
            SqlKeyword::CurrentTimestamp => "CURRENT_TIMESTAMP",
        }
    }
}

/// Bound-argument conversion for [`QueryExpression::expr`].
///
/// All arguments canonicalize to text before storage so the argument list
/// stays homogeneous: booleans become `"1"`/`"0"`, numbers format through
/// `to_string` (locale-independent). `is_zero` feeds
/// [`QueryExpression::optional`]: the type's zero value (`0`, `false`,
/// `None`) makes the clause vanish instead of comparing against zero.
pub trait ArgValue {
    fn render(&self) -> String;

    fn is_zero(&self) -> bool {
        false
    }
}

impl ArgValue for &str {
    fn render(&self) -> String {
        (*self).to_string()
    }
}

impl ArgValue for String {
    fn render(&self) -> String {
        self.clone()
    }
}

impl ArgValue for i32 {
    fn render(&self) -> String {
        self.to_string()
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl ArgValue for i64 {
    fn render(&self) -> String {
        self.to_string()
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }
}

impl ArgValue for f64 {
    fn render(&self) -> String {
        self.to_string()
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }
}

impl ArgValue for bool {
    fn render(&self) -> String {
        if *self { "1".to_string() } else { "0".to_string() }
    }

    fn is_zero(&self) -> bool {
        !*self
    }
}

impl<T: ArgValue> ArgValue for Option<T> {
    fn render(&self) -> String {
        match self {
            Some(value) => value.render(),
            None => String::new(),
        }
    }

    // Absent text is the None case; a wrapped value never vanishes on its own.
    fn is_zero(&self) -> bool {
        self.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Connective {
    #[default]
    And,
    Or,
}

/// Accumulating predicate builder.
///
/// See the module docs for the joining and argument-binding rules.
#[derive(Debug, Clone, Default)]
pub struct QueryExpression {
    text: String,
    args: Vec<String>,
    connective: Connective,
}

impl QueryExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `column OP ?` and binds `value`.
    pub fn expr(&mut self, column: &str, op: Operator, value: impl ArgValue) -> &mut Self {
        self.begin_clause();
        self.text.push_str(column);
        self.text.push(' ');
        self.text.push_str(op.sql());
        self.text.push_str(" ?");
        self.args.push(value.render());
        self
    }

    /// Appends `column OP KEYWORD` without binding an argument.
    pub fn expr_keyword(&mut self, column: &str, op: Operator, keyword: SqlKeyword) -> &mut Self {
        self.begin_clause();
        self.text.push_str(column);
        self.text.push(' ');
        self.text.push_str(op.sql());
        self.text.push(' ');
        self.text.push_str(keyword.sql());
        self
    }

    /// Appends the unary `column ISNULL` test.
    pub fn is_null(&mut self, column: &str) -> &mut Self {
        self.begin_clause();
        self.text.push_str(column);
        self.text.push_str(" ISNULL");
        self
    }

    /// Appends the unary `column NOTNULL` test.
    pub fn not_null(&mut self, column: &str) -> &mut Self {
        self.begin_clause();
        self.text.push_str(column);
        self.text.push_str(" NOTNULL");
        self
    }

    /// Nests a complete sub-expression in parentheses.
    ///
    /// A sub-expression without bound arguments contributes nothing at all;
    /// only argument-carrying subs are worth the parentheses.
    pub fn nested(&mut self, sub: &QueryExpression) -> &mut Self {
        if sub.args.is_empty() {
            return self;
        }
        self.begin_clause();
        self.text.push('(');
        self.text.push_str(&sub.text);
        self.text.push(')');
        self.args.extend(sub.args.iter().cloned());
        self
    }

    /// Like [`QueryExpression::expr`], but vanishes when `value` is the
    /// type's zero value (`0`, `false`, `None`).
    ///
    /// Used to build queries where absent filters disappear instead of
    /// comparing against zero. Explicit zero is indistinguishable from
    /// unset here; that conflation is part of the contract.
    pub fn optional(&mut self, column: &str, op: Operator, value: impl ArgValue) -> &mut Self {
        if value.is_zero() {
            return self;
        }
        self.expr(column, op, value)
    }

    /// Joins the next clause with `AND` (the default).
    pub fn and(&mut self) -> &mut Self {
        self.connective = Connective::And;
        self
    }

    /// Joins the next clause with `OR`.
    ///
    /// Applies to the next appended clause only, then the connective resets
    /// to `AND`. Calling with no clause appended yet is inert; consecutive
    /// calls leave the last one in effect.
    pub fn or(&mut self) -> &mut Self {
        self.connective = Connective::Or;
        self
    }

    /// Appends a pre-formed predicate fragment with its own arguments.
    ///
    /// Escape hatch for SQL the structured methods cannot express. Blank
    /// fragments are ignored.
    pub fn append_raw(&mut self, fragment: &str, args: &[&str]) -> &mut Self {
        if fragment.trim().is_empty() {
            return self;
        }
        self.begin_clause();
        self.text.push_str(fragment);
        self.args.extend(args.iter().map(|a| (*a).to_string()));
        self
    }

    /// Renders the accumulated predicate text.
    pub fn predicate(&self) -> &str {
        &self.text
    }

    /// The positional arguments, in placeholder order.
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// True when no clause has been appended.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Resets the builder to its initial state.
    pub fn clear(&mut self) {
        self.text.clear();
        self.args.clear();
        self.connective = Connective::And;
    }

    // The first clause never receives a leading connective; every append
    // resets the connective back to AND.
    fn begin_clause(&mut self) {
        if !self.text.is_empty() {
            self.text.push_str(match self.connective {
                Connective::And => " AND ",
                Connective::Or => " OR ",
            });
        }
        self.connective = Connective::And;
    }
}

impl Reusable for QueryExpression {
    fn reset(&mut self) {
        self.clear();
    }
}
