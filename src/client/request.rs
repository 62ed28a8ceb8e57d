//! Query request model and the typed builder behind the expression surface.
//!
//! A `QueryRequest` is the fully-resolved description of one API call:
//! target table or RPC, verb, filters and modifiers. The `RequestBuilder`
//! enforces the chain rules (a verb before filters, no filtering inserts,
//! one verb per chain) so the interpreter and programmatic callers share a
//! single definition of what a legal query looks like.

use crate::error::{PlayError, Result};
use serde_json::Value;

/// What the request is addressed to.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// A table or view under `/rest/v1/{name}`.
    Table(String),
    /// A stored procedure under `/rest/v1/rpc/{function}`.
    Rpc { function: String, args: Value },
}

/// The operation a chain resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Select,
    Insert,
    Upsert,
    Update,
    Delete,
    Rpc,
}

impl Verb {
    /// Returns true for verbs that send a mutation payload.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Self::Insert | Self::Upsert | Self::Update | Self::Delete)
    }
}

/// Comparison operators accepted by the filter methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    Ilike,
    Is,
    In,
}

impl FilterOp {
    /// The PostgREST operator keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Like => "like",
            Self::Ilike => "ilike",
            Self::Is => "is",
            Self::In => "in",
        }
    }

    /// Looks up an operator by its method name.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "eq" => Some(Self::Eq),
            "neq" => Some(Self::Neq),
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "like" => Some(Self::Like),
            "ilike" => Some(Self::Ilike),
            "is" => Some(Self::Is),
            "in" => Some(Self::In),
            _ => None,
        }
    }
}

/// A single column filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Renders the right-hand side of the query parameter, e.g. `eq.42`,
    /// `is.null`, or `in.("a","b")`.
    pub fn rhs(&self) -> String {
        match self.op {
            FilterOp::In => {
                let items: Vec<String> = match &self.value {
                    Value::Array(values) => values.iter().map(list_item).collect(),
                    other => vec![list_item(other)],
                };
                format!("in.({})", items.join(","))
            }
            op => format!("{}.{}", op.as_str(), scalar(&self.value)),
        }
    }
}

/// Renders a scalar literal the way PostgREST expects it on the right-hand
/// side of an operator (strings unquoted, everything else as JSON).
fn scalar(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Renders one element of an `in.(...)` list. Strings are double-quoted so
/// commas inside them survive.
fn list_item(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{s}\""),
        other => scalar(other),
    }
}

/// One `order(...)` term.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTerm {
    pub column: String,
    pub ascending: bool,
}

impl OrderTerm {
    /// Renders the term for the `order` query parameter.
    pub fn render(&self) -> String {
        let direction = if self.ascending { "asc" } else { "desc" };
        format!("{}.{}", self.column, direction)
    }
}

/// A fully-resolved query request, ready for the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub target: Target,
    pub verb: Verb,
    /// Column list for `select`, when one was requested.
    pub columns: Option<String>,
    /// Row payload for insert/upsert/update.
    pub payload: Option<Value>,
    pub filters: Vec<Filter>,
    pub order: Vec<OrderTerm>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    /// Request a single object instead of an array.
    pub single: bool,
    /// A mutation asked for its representation via a trailing `select()`.
    pub returning: bool,
}

/// Stateful builder applying chain calls in order.
#[derive(Debug)]
pub struct RequestBuilder {
    target: Target,
    verb: Option<Verb>,
    columns: Option<String>,
    payload: Option<Value>,
    filters: Vec<Filter>,
    order: Vec<OrderTerm>,
    limit: Option<u64>,
    offset: Option<u64>,
    single: bool,
    returning: bool,
}

impl RequestBuilder {
    /// Starts a chain addressed at a table, as `from(table)` does.
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            target: Target::Table(name.into()),
            verb: None,
            columns: None,
            payload: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
            single: false,
            returning: false,
        }
    }

    /// Starts a chain addressed at a stored procedure, as `rpc(fn, args)` does.
    pub fn rpc(function: impl Into<String>, args: Value) -> Self {
        let mut builder = Self::table("");
        builder.target = Target::Rpc {
            function: function.into(),
            args,
        };
        builder.verb = Some(Verb::Rpc);
        builder
    }

    /// Applies `select(columns)`.
    ///
    /// On a fresh table chain this picks the select verb; after a mutation
    /// verb it requests the mutated representation instead.
    pub fn select(&mut self, columns: Option<&str>) -> Result<()> {
        let columns = columns.unwrap_or("*").to_string();
        match self.verb {
            None => {
                self.verb = Some(Verb::Select);
                self.columns = Some(columns);
                Ok(())
            }
            Some(verb) if verb.is_mutation() => {
                self.returning = true;
                self.columns = Some(columns);
                Ok(())
            }
            Some(Verb::Rpc) => {
                self.columns = Some(columns);
                Ok(())
            }
            Some(Verb::Select) => Err(PlayError::expression("select() may only be called once")),
            Some(Verb::Insert) | Some(Verb::Upsert) | Some(Verb::Update) | Some(Verb::Delete) => {
                unreachable!("mutation verbs are handled by the is_mutation guard above")
            }
        }
    }

    /// Applies `insert(values)`.
    pub fn insert(&mut self, values: Value) -> Result<()> {
        self.set_mutation(Verb::Insert, values)
    }

    /// Applies `upsert(values)`.
    pub fn upsert(&mut self, values: Value) -> Result<()> {
        self.set_mutation(Verb::Upsert, values)
    }

    /// Applies `update(values)`.
    pub fn update(&mut self, values: Value) -> Result<()> {
        self.set_mutation(Verb::Update, values)
    }

    /// Applies `delete()`.
    pub fn delete(&mut self) -> Result<()> {
        if self.verb.is_some() {
            return Err(PlayError::expression(
                "delete() cannot follow another query verb",
            ));
        }
        self.verb = Some(Verb::Delete);
        Ok(())
    }

    fn set_mutation(&mut self, verb: Verb, values: Value) -> Result<()> {
        if self.verb.is_some() {
            return Err(PlayError::expression(format!(
                "{}() cannot follow another query verb",
                verb_name(verb)
            )));
        }
        if matches!(self.target, Target::Rpc { .. }) {
            return Err(PlayError::expression(format!(
                "{}() is not available on rpc()",
                verb_name(verb)
            )));
        }
        self.verb = Some(verb);
        self.payload = Some(values);
        Ok(())
    }

    /// Applies a filter method such as `eq(column, value)`.
    pub fn filter(&mut self, op: FilterOp, column: impl Into<String>, value: Value) -> Result<()> {
        match self.verb {
            None => Err(PlayError::expression(format!(
                "{}() must come after a query verb such as select()",
                op.as_str()
            ))),
            Some(Verb::Insert) | Some(Verb::Upsert) => Err(PlayError::expression(format!(
                "{}() cannot be applied to an insert",
                op.as_str()
            ))),
            Some(_) => {
                self.filters.push(Filter {
                    column: column.into(),
                    op,
                    value,
                });
                Ok(())
            }
        }
    }

    /// Applies `order(column, ascending)`.
    pub fn order(&mut self, column: impl Into<String>, ascending: bool) -> Result<()> {
        self.require_verb("order")?;
        self.order.push(OrderTerm {
            column: column.into(),
            ascending,
        });
        Ok(())
    }

    /// Applies `limit(count)`.
    pub fn limit(&mut self, count: u64) -> Result<()> {
        self.require_verb("limit")?;
        self.limit = Some(count);
        Ok(())
    }

    /// Applies `range(from, to)`, an inclusive row window.
    pub fn range(&mut self, from: u64, to: u64) -> Result<()> {
        self.require_verb("range")?;
        if to < from {
            return Err(PlayError::expression(
                "range() expects from <= to",
            ));
        }
        self.offset = Some(from);
        self.limit = Some(to - from + 1);
        Ok(())
    }

    /// Applies `single()`.
    pub fn single(&mut self) -> Result<()> {
        self.require_verb("single")?;
        self.single = true;
        Ok(())
    }

    fn require_verb(&self, method: &str) -> Result<()> {
        if self.verb.is_none() {
            return Err(PlayError::expression(format!(
                "{method}() must come after a query verb such as select()"
            )));
        }
        Ok(())
    }

    /// Finishes the chain, requiring that a verb was chosen.
    pub fn build(self) -> Result<QueryRequest> {
        let verb = self.verb.ok_or_else(|| {
            PlayError::expression(
                "the chain never picks an operation; add select(), insert(), upsert(), update() or delete()",
            )
        })?;

        Ok(QueryRequest {
            target: self.target,
            verb,
            columns: self.columns,
            payload: self.payload,
            filters: self.filters,
            order: self.order,
            limit: self.limit,
            offset: self.offset,
            single: self.single,
            returning: self.returning,
        })
    }
}

fn verb_name(verb: Verb) -> &'static str {
    match verb {
        Verb::Select => "select",
        Verb::Insert => "insert",
        Verb::Upsert => "upsert",
        Verb::Update => "update",
        Verb::Delete => "delete",
        Verb::Rpc => "rpc",
    }
}
