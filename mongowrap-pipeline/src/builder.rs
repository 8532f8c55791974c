//! Fluent aggregation pipeline builder.

use std::collections::HashSet;

use bson::{Bson, Document, doc};
use tracing::trace;

use crate::error::{ValidationError, ValidationResult};
use crate::stage::{GroupKey, Stage, StageOperator};

/// Builder for MongoDB aggregation pipelines.
///
/// Stage methods append in call order and return the builder so calls can be
/// chained. Methods that validate their arguments return a `Result`; when
/// they fail, nothing is appended.
///
/// # Example
///
/// ```rust
/// use mongowrap_pipeline::{PipelineBuilder, accumulators};
/// use bson::doc;
///
/// # fn main() -> Result<(), mongowrap_pipeline::ValidationError> {
/// let mut builder = PipelineBuilder::new();
/// builder
///     .match_stage(doc! { "status": "active" })
///     .group(
///         ["category", "region"],
///         doc! { "total": accumulators::sum("$amount") },
///     )?
///     .sort([("total", -1)])?
///     .limit(10)?;
///
/// let pipeline = builder.build();
/// assert_eq!(pipeline.len(), 4);
/// assert!(pipeline[0].contains_key("$match"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineBuilder {
    stages: Vec<Stage>,
}

impl PipelineBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `$match` stage.
    pub fn match_stage(&mut self, criteria: Document) -> &mut Self {
        self.push(StageOperator::Match, criteria)
    }

    /// Add a `$project` stage.
    pub fn project(&mut self, fields: Document) -> &mut Self {
        self.push(StageOperator::Project, fields)
    }

    /// Add a `$group` stage.
    ///
    /// The group identifier is built from `keys` in order: plain field names
    /// become `name: "$name"`, expression keys are inserted as given. The
    /// remaining entries of the stage come from `aggregations`.
    pub fn group<I, K>(&mut self, keys: I, aggregations: Document) -> ValidationResult<&mut Self>
    where
        I: IntoIterator<Item = K>,
        K: Into<GroupKey>,
    {
        if aggregations.contains_key("_id") {
            return Err(ValidationError::ReservedGroupField);
        }

        let mut id = Document::new();
        for key in keys {
            let key = key.into();
            if key.name().is_empty() {
                return Err(ValidationError::empty_field(StageOperator::Group.as_str()));
            }
            id.insert(key.name(), key.value());
        }

        let mut body = doc! { "_id": id };
        body.extend(aggregations);
        Ok(self.push(StageOperator::Group, body))
    }

    /// Add a `$sort` stage from `(field, direction)` pairs.
    ///
    /// Field order is kept as given; the server breaks ties in that order.
    /// Directions must be `1` (ascending) or `-1` (descending).
    pub fn sort<I, F>(&mut self, pairs: I) -> ValidationResult<&mut Self>
    where
        I: IntoIterator<Item = (F, i32)>,
        F: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut keys = Document::new();

        for (field, direction) in pairs {
            let field = field.into();
            if field.is_empty() {
                return Err(ValidationError::empty_field(StageOperator::Sort.as_str()));
            }
            if direction != 1 && direction != -1 {
                return Err(ValidationError::invalid_sort_direction(field, direction));
            }
            if !seen.insert(field.clone()) {
                return Err(ValidationError::DuplicateSortField(field));
            }
            keys.insert(field, direction);
        }

        if keys.is_empty() {
            return Err(ValidationError::EmptySort);
        }

        Ok(self.push(StageOperator::Sort, keys))
    }

    /// Add a `$skip` stage.
    pub fn skip(&mut self, n: i64) -> ValidationResult<&mut Self> {
        if n < 0 {
            return Err(ValidationError::negative(StageOperator::Skip.as_str(), n));
        }
        Ok(self.push(StageOperator::Skip, n))
    }

    /// Add a `$limit` stage.
    pub fn limit(&mut self, n: i64) -> ValidationResult<&mut Self> {
        if n < 0 {
            return Err(ValidationError::negative(StageOperator::Limit.as_str(), n));
        }
        Ok(self.push(StageOperator::Limit, n))
    }

    /// Add an `$unwind` stage.
    ///
    /// `path` is usually a `"$field"` string but may also be a full options
    /// document.
    pub fn unwind(&mut self, path: impl Into<Bson>) -> &mut Self {
        self.push(StageOperator::Unwind, path)
    }

    /// Add an `$unwind` stage with options.
    pub fn unwind_with_options(
        &mut self,
        path: impl Into<String>,
        preserve_null_and_empty: bool,
        include_array_index: Option<&str>,
    ) -> &mut Self {
        let mut body = doc! {
            "path": path.into(),
            "preserveNullAndEmptyArrays": preserve_null_and_empty,
        };
        if let Some(index_field) = include_array_index {
            body.insert("includeArrayIndex", index_field);
        }
        self.push(StageOperator::Unwind, body)
    }

    /// The stages accumulated so far.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether no stages have been added.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Render the pipeline.
    ///
    /// The builder keeps its stages, so calling this again returns an equal
    /// pipeline unless more stages were added in between.
    pub fn build(&self) -> Vec<Document> {
        trace!(stages = self.stages.len(), "Building aggregation pipeline");
        self.stages.iter().map(Stage::to_document).collect()
    }

    fn push(&mut self, operator: StageOperator, body: impl Into<Bson>) -> &mut Self {
        self.stages.push(Stage::new(operator, body));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accumulators;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_preserves_call_order() {
        let mut builder = PipelineBuilder::new();
        builder
            .match_stage(doc! { "status": "active" })
            .sort([("created_at", -1)])
            .unwrap()
            .limit(5)
            .unwrap();

        assert_eq!(
            builder.build(),
            vec![
                doc! { "$match": { "status": "active" } },
                doc! { "$sort": { "created_at": -1 } },
                doc! { "$limit": 5_i64 },
            ]
        );
    }

    #[test]
    fn test_build_is_repeatable() {
        let mut builder = PipelineBuilder::new();
        builder.project(doc! { "name": 1 }).unwind("$tags");

        let first = builder.build();
        let second = builder.build();
        assert_eq!(first, second);
        assert_eq!(builder.len(), 2);

        builder.skip(3).unwrap();
        assert_eq!(builder.build().len(), 3);
    }

    #[test]
    fn test_negative_skip_and_limit_rejected() {
        let mut builder = PipelineBuilder::new();
        builder.match_stage(doc! { "a": 1 });

        assert_eq!(
            builder.skip(-1).unwrap_err(),
            ValidationError::negative("$skip", -1)
        );
        assert_eq!(
            builder.limit(-1).unwrap_err(),
            ValidationError::negative("$limit", -1)
        );
        assert_eq!(builder.build(), vec![doc! { "$match": { "a": 1 } }]);
    }

    #[test]
    fn test_zero_skip_and_limit_allowed() {
        let mut builder = PipelineBuilder::new();
        builder.skip(0).unwrap().limit(0).unwrap();
        assert_eq!(builder.len(), 2);
    }

    #[test]
    fn test_group_by_field_names() {
        let mut builder = PipelineBuilder::new();
        builder
            .group(["name"], doc! { "count": { "$sum": 1 } })
            .unwrap();

        assert_eq!(
            builder.build(),
            vec![doc! {
                "$group": {
                    "_id": { "name": "$name" },
                    "count": { "$sum": 1 },
                }
            }]
        );
    }

    #[test]
    fn test_group_with_expression_key() {
        let mut builder = PipelineBuilder::new();
        builder
            .group(
                [
                    GroupKey::field("category"),
                    GroupKey::from(("month", doc! { "$month": "$timestamp" })),
                ],
                doc! { "total": accumulators::sum("$amount") },
            )
            .unwrap();

        let group = builder.build()[0].get_document("$group").unwrap().clone();
        let keys: Vec<&String> = group.get_document("_id").unwrap().keys().collect();
        assert_eq!(keys, vec!["category", "month"]);
        assert_eq!(
            group.get_document("_id").unwrap().get_document("month").unwrap(),
            &doc! { "$month": "$timestamp" }
        );
        assert_eq!(group.get_document("total").unwrap(), &doc! { "$sum": "$amount" });
    }

    #[test]
    fn test_group_without_keys() {
        let mut builder = PipelineBuilder::new();
        builder
            .group(Vec::<&str>::new(), doc! { "n": accumulators::count() })
            .unwrap();

        let group = builder.stages()[0].body().as_document().unwrap().clone();
        assert_eq!(group, doc! { "_id": {}, "n": { "$sum": 1 } });
    }

    #[test]
    fn test_group_rejects_reserved_and_empty_keys() {
        let mut builder = PipelineBuilder::new();
        assert_eq!(
            builder.group(["name"], doc! { "_id": null }).unwrap_err(),
            ValidationError::ReservedGroupField
        );
        assert_eq!(
            builder.group([""], doc! {}).unwrap_err(),
            ValidationError::empty_field("$group")
        );
        assert!(builder.is_empty());
    }

    #[test]
    fn test_sort_keeps_declared_order() {
        let mut builder = PipelineBuilder::new();
        builder
            .sort([("total", -1), ("name", 1), ("age", -1)])
            .unwrap();

        let keys = builder.stages()[0].body().as_document().unwrap().clone();
        let fields: Vec<&String> = keys.keys().collect();
        assert_eq!(fields, vec!["total", "name", "age"]);
        assert_eq!(keys.get_i32("total").unwrap(), -1);
    }

    #[test]
    fn test_sort_validation() {
        let mut builder = PipelineBuilder::new();

        assert_eq!(
            builder.sort([("age", 2)]).unwrap_err(),
            ValidationError::invalid_sort_direction("age", 2)
        );
        assert_eq!(
            builder.sort([("age", 1), ("age", -1)]).unwrap_err(),
            ValidationError::DuplicateSortField("age".into())
        );
        assert_eq!(
            builder.sort([("", 1)]).unwrap_err(),
            ValidationError::empty_field("$sort")
        );
        assert_eq!(
            builder.sort(Vec::<(String, i32)>::new()).unwrap_err(),
            ValidationError::EmptySort
        );
        assert!(builder.build().is_empty());
    }

    #[test]
    fn test_unwind_variants() {
        let mut builder = PipelineBuilder::new();
        builder
            .unwind("$items")
            .unwind(doc! { "path": "$tags" })
            .unwind_with_options("$sizes", true, Some("idx"));

        let pipeline = builder.build();
        assert_eq!(pipeline[0], doc! { "$unwind": "$items" });
        assert_eq!(pipeline[1], doc! { "$unwind": { "path": "$tags" } });
        assert_eq!(
            pipeline[2],
            doc! {
                "$unwind": {
                    "path": "$sizes",
                    "preserveNullAndEmptyArrays": true,
                    "includeArrayIndex": "idx",
                }
            }
        );
    }

    #[test]
    fn test_stage_operators_recorded() {
        let mut builder = PipelineBuilder::new();
        builder
            .match_stage(doc! {})
            .project(doc! { "x": 1 })
            .skip(1)
            .unwrap();

        let ops: Vec<StageOperator> = builder.stages().iter().map(Stage::operator).collect();
        assert_eq!(
            ops,
            vec![StageOperator::Match, StageOperator::Project, StageOperator::Skip]
        );
    }
}
