use super::DataSource;
use crate::error::{FacetError, Result};
use crate::value::{FieldValue, RecordId};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A record held by [`MemorySource`].
///
/// Each field maps to zero or more values: scalar fields hold one, many-valued
/// relations hold one `Ref` per related record, and a missing field is null.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: RecordId,
    fields: BTreeMap<String, Vec<FieldValue>>,
}

impl Record {
    pub fn new(id: u64) -> Self {
        Self {
            id: RecordId(id),
            fields: BTreeMap::new(),
        }
    }

    /// Add a value to `field`. Calling it twice on the same field makes it many-valued.
    pub fn with(mut self, field: &str, value: impl Into<FieldValue>) -> Self {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(value.into());
        self
    }

    pub fn values(&self, field: &str) -> &[FieldValue] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Collection handle of [`MemorySource`]: positions of the records it contains.
///
/// A handle belongs to the source that produced it. Positions a source does
/// not hold are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet(Vec<usize>);

impl RowSet {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// In-memory data source.
///
/// Reference implementation of [`DataSource`] over a `Vec<Record>`, used by the
/// test suite and usable for small datasets. Related-record labels live in
/// per-model tables registered with [`MemorySource::with_label`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    records: Vec<Record>,
    labels: HashMap<String, HashMap<RecordId, String>>,
    failing_field: Option<String>,
}

impl MemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, model: &str, id: u64, label: impl Into<String>) -> Self {
        self.labels
            .entry(model.to_string())
            .or_default()
            .insert(RecordId(id), label.into());
        self
    }

    /// Make every call touching `field` fail, for exercising error handling.
    pub fn with_failure_on(mut self, field: &str) -> Self {
        self.failing_field = Some(field.to_string());
        self
    }

    /// The collection of every record.
    pub fn all(&self) -> RowSet {
        RowSet((0..self.records.len()).collect())
    }

    pub fn records<'a>(&'a self, rows: &'a RowSet) -> impl Iterator<Item = &'a Record> + 'a {
        rows.0.iter().filter_map(move |&i| self.records.get(i))
    }

    /// Ids of the records in `rows`, in storage order.
    pub fn ids(&self, rows: &RowSet) -> Vec<RecordId> {
        self.records(rows).map(|r| r.id).collect()
    }

    fn check(&self, field: &str) -> Result<()> {
        match &self.failing_field {
            Some(failing) if failing == field => Err(FacetError::DataSource(format!(
                "simulated failure reading `{field}`"
            ))),
            _ => Ok(()),
        }
    }

    fn select<F>(&self, collection: &RowSet, keep: F) -> RowSet
    where
        F: Fn(&Record) -> bool,
    {
        RowSet(
            collection
                .0
                .iter()
                .copied()
                .filter(|&i| self.records.get(i).is_some_and(&keep))
                .collect(),
        )
    }
}

impl DataSource for MemorySource {
    type Collection = RowSet;

    fn narrow(&self, collection: &RowSet, field: &str, value: &FieldValue) -> Result<RowSet> {
        self.check(field)?;
        Ok(self.select(collection, |r| r.values(field).contains(value)))
    }

    fn narrow_range(
        &self,
        collection: &RowSet,
        field: &str,
        lower: NaiveDateTime,
        upper: NaiveDateTime,
    ) -> Result<RowSet> {
        self.check(field)?;
        Ok(self.select(collection, |r| {
            r.values(field)
                .iter()
                .filter_map(FieldValue::as_datetime)
                .any(|at| lower <= at && at < upper)
        }))
    }

    fn distinct_with_counts(
        &self,
        collection: &RowSet,
        field: &str,
    ) -> Result<Vec<(FieldValue, usize)>> {
        self.check(field)?;
        let mut counts: BTreeMap<&FieldValue, usize> = BTreeMap::new();
        for record in self.records(collection) {
            let distinct: BTreeSet<&FieldValue> = record.values(field).iter().collect();
            for value in distinct {
                *counts.entry(value).or_default() += 1;
            }
        }
        Ok(counts
            .into_iter()
            .map(|(value, count)| (value.clone(), count))
            .collect())
    }

    fn related_label(&self, model: &str, id: RecordId) -> Result<Option<String>> {
        Ok(self
            .labels
            .get(model)
            .and_then(|labels| labels.get(&id))
            .cloned())
    }

    fn count(&self, collection: &RowSet) -> Result<usize> {
        Ok(self.records(collection).count())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    //! A ten-issue tracker used across the unit tests.
    //!
    //! | id | status | priority | assignee | tags | opened |
    //! |----|--------|----------|----------|------|--------|
    //! | 1 | open | 1 | alice | bug | 2010-01-15 |
    //! | 2 | open | 2 | alice | bug, feature | 2010-01-20 |
    //! | 3 | open | 1 | bob | bug | 2010-03-02 |
    //! | 4 | open | 3 | bob | feature | 2011-06-10 |
    //! | 5 | open | 2 | carol | | 2011-06-11 |
    //! | 6 | open | 1 | alice | | 2011-07-01 |
    //! | 7 | closed | 2 | bob | docs | 2010-01-15 |
    //! | 8 | closed | 3 | carol | | 2012-02-29 |
    //! | 9 | closed | 1 | | | 2012-03-01 |
    //! | 10 | closed | 2 | carol | docs | 2012-03-05 |

    use super::*;
    use crate::schema::{FieldMeta, ModelMeta, ValueType};
    use chrono::NaiveDate;

    pub const ALICE: u64 = 1;
    pub const BOB: u64 = 2;
    pub const CAROL: u64 = 3;

    pub const BUG: u64 = 1;
    pub const FEATURE: u64 = 2;
    pub const DOCS: u64 = 3;

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn issue(
        id: u64,
        status: &str,
        priority: i64,
        assignee: Option<u64>,
        tags: &[u64],
        opened: NaiveDate,
    ) -> Record {
        let mut record = Record::new(id)
            .with("status", status)
            .with("priority", priority)
            .with("opened", opened);
        if let Some(assignee) = assignee {
            record = record.with("assignee", RecordId(assignee));
        }
        for &tag in tags {
            record = record.with("tags", RecordId(tag));
        }
        record
    }

    pub fn issue_model() -> ModelMeta {
        ModelMeta::new("Issue")
            .field(FieldMeta::new("status", ValueType::Text).with_choices([
                ("open", "Open"),
                ("closed", "Closed"),
                ("wontfix", "Won't fix"),
            ]))
            .field(FieldMeta::new("priority", ValueType::Integer))
            .field(FieldMeta::foreign_key("assignee", "User"))
            .field(FieldMeta::many_to_many("tags", "Tag"))
            .field(FieldMeta::new("opened", ValueType::Date).verbose_name("date opened"))
    }

    pub fn issues() -> MemorySource {
        MemorySource::new(vec![
            issue(1, "open", 1, Some(ALICE), &[BUG], date(2010, 1, 15)),
            issue(2, "open", 2, Some(ALICE), &[BUG, FEATURE], date(2010, 1, 20)),
            issue(3, "open", 1, Some(BOB), &[BUG], date(2010, 3, 2)),
            issue(4, "open", 3, Some(BOB), &[FEATURE], date(2011, 6, 10)),
            issue(5, "open", 2, Some(CAROL), &[], date(2011, 6, 11)),
            issue(6, "open", 1, Some(ALICE), &[], date(2011, 7, 1)),
            issue(7, "closed", 2, Some(BOB), &[DOCS], date(2010, 1, 15)),
            issue(8, "closed", 3, Some(CAROL), &[], date(2012, 2, 29)),
            issue(9, "closed", 1, None, &[], date(2012, 3, 1)),
            issue(10, "closed", 2, Some(CAROL), &[DOCS], date(2012, 3, 5)),
        ])
        .with_label("User", ALICE, "Alice")
        .with_label("User", BOB, "Bob")
        .with_label("User", CAROL, "Carol")
        .with_label("Tag", BUG, "bug")
        .with_label("Tag", FEATURE, "feature")
        .with_label("Tag", DOCS, "docs")
    }
}
