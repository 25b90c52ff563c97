#![allow(dead_code)]

use chrono::NaiveDate;
use facetnav::source::memory::{MemorySource, Record};
use facetnav::{FieldFilterSpec, FieldMeta, ModelMeta, RecordId, ValueType};

pub const TAG_A: u64 = 1;
pub const TAG_B: u64 = 2;

fn article(
    id: u64,
    status: &str,
    tags: &[u64],
    author: Option<u64>,
    published: (i32, u32, u32),
    lang: &str,
) -> Record {
    let (y, m, d) = published;
    let mut record = Record::new(id)
        .with("status", status)
        .with("published", NaiveDate::from_ymd_opt(y, m, d).unwrap())
        .with("lang", lang);
    for &tag in tags {
        record = record.with("tags", RecordId(tag));
    }
    if let Some(author) = author {
        record = record.with("author", RecordId(author));
    }
    record
}

pub fn model() -> ModelMeta {
    ModelMeta::new("Article")
        .field(FieldMeta::new("status", ValueType::Text))
        .field(FieldMeta::many_to_many("tags", "Tag"))
        .field(FieldMeta::foreign_key("author", "Author"))
        .field(FieldMeta::new("published", ValueType::Date).verbose_name("publication date"))
        .field(
            FieldMeta::new("lang", ValueType::Text)
                .verbose_name("language")
                .with_choices([("en", "English"), ("fr", "French")]),
        )
}

/// Six open articles, four closed ones. Tag A on 1-3, tag B on 3-4.
pub fn source() -> MemorySource {
    MemorySource::new(vec![
        article(1, "open", &[TAG_A], Some(1), (2020, 1, 5), "en"),
        article(2, "open", &[TAG_A], Some(1), (2020, 2, 10), "en"),
        article(3, "open", &[TAG_A, TAG_B], Some(2), (2020, 2, 11), "fr"),
        article(4, "open", &[TAG_B], Some(2), (2021, 5, 1), "en"),
        article(5, "open", &[], Some(3), (2021, 5, 20), "en"),
        article(6, "open", &[], Some(1), (2021, 11, 30), "fr"),
        article(7, "closed", &[], Some(3), (2019, 12, 31), "en"),
        article(8, "closed", &[], Some(3), (2020, 1, 5), "en"),
        article(9, "closed", &[], Some(2), (2021, 5, 1), "fr"),
        article(10, "closed", &[], None, (2022, 3, 3), "en"),
    ])
    .with_label("Tag", TAG_A, "A")
    .with_label("Tag", TAG_B, "B")
    .with_label("Author", 1, "Ada")
    .with_label("Author", 2, "Brian")
    .with_label("Author", 3, "Claude")
}

pub fn specs() -> Vec<FieldFilterSpec> {
    ["status", "tags", "author", "published", "lang"]
        .into_iter()
        .map(FieldFilterSpec::from)
        .collect()
}
