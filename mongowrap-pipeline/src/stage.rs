//! Stage descriptors.

use std::fmt;

use bson::{Bson, Document};

/// The aggregation operators the builder knows how to append.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageOperator {
    /// `$match`
    Match,
    /// `$project`
    Project,
    /// `$group`
    Group,
    /// `$sort`
    Sort,
    /// `$skip`
    Skip,
    /// `$limit`
    Limit,
    /// `$unwind`
    Unwind,
}

impl StageOperator {
    /// The operator token as the server expects it.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "$match",
            Self::Project => "$project",
            Self::Group => "$group",
            Self::Sort => "$sort",
            Self::Skip => "$skip",
            Self::Limit => "$limit",
            Self::Unwind => "$unwind",
        }
    }
}

impl fmt::Display for StageOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pipeline stage: an operator and its body.
///
/// The body is opaque to the builder and is handed to the server verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Stage {
    operator: StageOperator,
    body: Bson,
}

impl Stage {
    pub(crate) fn new(operator: StageOperator, body: impl Into<Bson>) -> Self {
        Self {
            operator,
            body: body.into(),
        }
    }

    /// The stage operator.
    pub fn operator(&self) -> StageOperator {
        self.operator
    }

    /// The stage body.
    pub fn body(&self) -> &Bson {
        &self.body
    }

    /// Render as the single-key document `{ "$op": body }`.
    pub fn to_document(&self) -> Document {
        self.clone().into()
    }
}

impl From<Stage> for Document {
    fn from(stage: Stage) -> Self {
        let mut doc = Document::new();
        doc.insert(stage.operator.as_str(), stage.body);
        doc
    }
}

/// One entry of a `$group` identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// Group on a field; rendered as `name: "$name"`.
    Field(String),
    /// Group on a computed expression; rendered as `name: expr`.
    Expr(String, Bson),
}

impl GroupKey {
    /// Group on a document field.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Group on an expression under the given output name.
    pub fn expr(name: impl Into<String>, expr: impl Into<Bson>) -> Self {
        Self::Expr(name.into(), expr.into())
    }

    /// The key name inside `_id`.
    pub fn name(&self) -> &str {
        match self {
            Self::Field(name) | Self::Expr(name, _) => name,
        }
    }

    pub(crate) fn value(&self) -> Bson {
        match self {
            Self::Field(name) => Bson::String(format!("${}", name)),
            Self::Expr(_, expr) => expr.clone(),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(name: &str) -> Self {
        Self::Field(name.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(name: String) -> Self {
        Self::Field(name)
    }
}

impl<N: Into<String>> From<(N, Document)> for GroupKey {
    fn from((name, expr): (N, Document)) -> Self {
        Self::Expr(name.into(), Bson::Document(expr))
    }
}
