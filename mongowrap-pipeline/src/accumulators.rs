//! Accumulator expressions for `$group` stages.
//!
//! ```rust
//! use bson::doc;
//! use mongowrap_pipeline::accumulators::{avg, count};
//!
//! let aggregations = doc! {
//!     "orders": count(),
//!     "avg_total": avg("$total"),
//! };
//! assert_eq!(aggregations.get_document("orders").unwrap(), &doc! { "$sum": 1 });
//! ```

use bson::{Bson, doc};

fn accumulator(operator: &str, expr: Bson) -> Bson {
    let mut body = bson::Document::new();
    body.insert(operator, expr);
    Bson::Document(body)
}

/// `$sum`
pub fn sum(expr: impl Into<Bson>) -> Bson {
    accumulator("$sum", expr.into())
}

/// `$avg`
pub fn avg(expr: impl Into<Bson>) -> Bson {
    accumulator("$avg", expr.into())
}

/// `$min`
pub fn min(expr: impl Into<Bson>) -> Bson {
    accumulator("$min", expr.into())
}

/// `$max`
pub fn max(expr: impl Into<Bson>) -> Bson {
    accumulator("$max", expr.into())
}

/// `$first`
pub fn first(expr: impl Into<Bson>) -> Bson {
    accumulator("$first", expr.into())
}

/// `$last`
pub fn last(expr: impl Into<Bson>) -> Bson {
    accumulator("$last", expr.into())
}

/// `$push`: collects every value into an array.
pub fn push(expr: impl Into<Bson>) -> Bson {
    accumulator("$push", expr.into())
}

/// `$addToSet`: collects distinct values into an array.
pub fn add_to_set(expr: impl Into<Bson>) -> Bson {
    accumulator("$addToSet", expr.into())
}

/// Document count, `{ "$sum": 1 }`.
pub fn count() -> Bson {
    Bson::Document(doc! { "$sum": 1 })
}
