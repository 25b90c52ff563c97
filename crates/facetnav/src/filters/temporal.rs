//! Drill-down filtering on dates.
//!
//! A temporal filter walks a granularity hierarchy one level at a time:
//!
//! ```text
//! (nothing) --pick year--> 2010 --pick month--> May 2010 --pick day--> 3 May 2010
//! ```
//!
//! Each level has its own parameter key, `<param>__year`, `<param>__month`,
//! `<param>__day`. Only the level just below the deepest selection (the
//! frontier) is offered as choices, and only within the selected period.
//! Selecting or removing a level always clears every finer level, and a finer
//! level stored without a valid coarser one is ignored.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::trace;

use super::{unselected_choices, Bucket, FieldFilter, FilterCore};
use crate::choice::Choice;
use crate::error::{DecodeWarning, Result};
use crate::params::Params;
use crate::source::DataSource;

/// A level of the date hierarchy, coarsest first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Year,
    Month,
    #[default]
    Day,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Year, Granularity::Month, Granularity::Day];

    pub fn suffix(self) -> &'static str {
        match self {
            Granularity::Year => "year",
            Granularity::Month => "month",
            Granularity::Day => "day",
        }
    }

    pub fn finer(self) -> Option<Granularity> {
        match self {
            Granularity::Year => Some(Granularity::Month),
            Granularity::Month => Some(Granularity::Day),
            Granularity::Day => None,
        }
    }
}

/// A calendar year, month or day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period {
    pub granularity: Granularity,
    pub start: NaiveDate,
}

impl Period {
    /// The period of `granularity` containing `date`.
    pub fn containing(date: NaiveDate, granularity: Granularity) -> Option<Period> {
        let start = match granularity {
            Granularity::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1)?,
            Granularity::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?,
            Granularity::Day => date,
        };
        Some(Period { granularity, start })
    }

    /// First day after the period.
    pub fn end(&self) -> Option<NaiveDate> {
        let (y, m) = (self.start.year(), self.start.month());
        match self.granularity {
            Granularity::Year => NaiveDate::from_ymd_opt(y + 1, 1, 1),
            Granularity::Month if m == 12 => NaiveDate::from_ymd_opt(y + 1, 1, 1),
            Granularity::Month => NaiveDate::from_ymd_opt(y, m + 1, 1),
            Granularity::Day => self.start.succ_opt(),
        }
    }

    /// `[start, end)` as datetimes.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((
            self.start.and_hms_opt(0, 0, 0)?,
            self.end()?.and_hms_opt(0, 0, 0)?,
        ))
    }

    pub fn label(&self) -> String {
        match self.granularity {
            Granularity::Year => self.start.year().to_string(),
            Granularity::Month => self.start.format("%B %Y").to_string(),
            Granularity::Day => self.start.format("%-d %B %Y").to_string(),
        }
    }

    /// Value stored under the level's parameter key.
    pub fn param_value(&self) -> String {
        match self.granularity {
            Granularity::Year => self.start.year().to_string(),
            Granularity::Month => self.start.month().to_string(),
            Granularity::Day => self.start.day().to_string(),
        }
    }

    /// Parse the next level below `parent` (or a year when there is no parent).
    fn parse(raw: &str, granularity: Granularity, parent: Option<&Period>) -> Option<Period> {
        let raw = raw.trim();
        let start = match (granularity, parent) {
            (Granularity::Year, None) => NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1)?,
            (Granularity::Month, Some(p)) => {
                NaiveDate::from_ymd_opt(p.start.year(), raw.parse().ok()?, 1)?
            }
            (Granularity::Day, Some(p)) => {
                NaiveDate::from_ymd_opt(p.start.year(), p.start.month(), raw.parse().ok()?)?
            }
            _ => return None,
        };
        let period = Period { granularity, start };
        // periods we cannot bound are unusable for narrowing
        period.bounds().map(|_| period)
    }
}

/// Filter for date and datetime fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalFilter {
    core: FilterCore,
    depth: Granularity,
}

impl TemporalFilter {
    pub fn new(core: FilterCore, depth: Granularity) -> Self {
        Self { core, depth }
    }

    pub fn depth(&self) -> Granularity {
        self.depth
    }

    /// Parameter key of one level.
    pub fn key(&self, granularity: Granularity) -> String {
        format!("{}__{}", self.core.param, granularity.suffix())
    }

    pub fn param_keys(&self) -> Vec<String> {
        Granularity::ALL
            .into_iter()
            .filter(|g| *g <= self.depth)
            .map(|g| self.key(g))
            .collect()
    }

    /// Selected periods, coarsest first. Each is inside the previous one.
    pub fn selection(&self, params: &Params) -> Vec<Period> {
        let mut chain: Vec<Period> = Vec::new();
        let mut levels = Granularity::ALL.into_iter().filter(|g| *g <= self.depth);
        for granularity in levels.by_ref() {
            let key = self.key(granularity);
            let Some(raw) = params.first(&key) else {
                break;
            };
            match Period::parse(raw, granularity, chain.last()) {
                Some(period) => chain.push(period),
                None => {
                    DecodeWarning::Unparseable {
                        param: key,
                        value: raw.to_string(),
                    }
                    .log();
                    break;
                }
            }
        }
        for granularity in levels {
            let key = self.key(granularity);
            if params.contains_key(&key) {
                DecodeWarning::Orphaned { param: key }.log();
            }
        }
        chain
    }

    /// `params` without `granularity` and every finer level.
    fn clear_from(&self, params: &Params, granularity: Granularity) -> Params {
        Granularity::ALL
            .into_iter()
            .filter(|g| *g >= granularity)
            .fold(params.clone(), |acc, g| acc.without(&self.key(g)))
    }

    /// `params` with `period` selected and every finer level cleared.
    pub fn select(&self, params: &Params, period: &Period) -> Params {
        let selected = params.with_set(&self.key(period.granularity), period.param_value());
        match period.granularity.finer() {
            Some(finer) => self.clear_from(&selected, finer),
            None => selected,
        }
    }

    fn narrow_to<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        period: &Period,
    ) -> Result<S::Collection> {
        match period.bounds() {
            Some((lower, upper)) => {
                trace!(field = %self.core.field, period = %period.label(), "narrowing on period");
                source.narrow_range(collection, &self.core.field, lower, upper)
            }
            None => Ok(collection.clone()),
        }
    }
}

impl FieldFilter for TemporalFilter {
    fn core(&self) -> &FilterCore {
        &self.core
    }

    fn apply<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<S::Collection> {
        match self.selection(params).last() {
            Some(period) => self.narrow_to(source, collection, period),
            None => Ok(collection.clone()),
        }
    }

    fn choices<S: DataSource>(
        &self,
        source: &S,
        collection: &S::Collection,
        params: &Params,
    ) -> Result<Vec<Choice>> {
        let chain = self.selection(params);
        let mut choices: Vec<Choice> = chain
            .iter()
            .map(|period| {
                Choice::remove(period.label(), self.clear_from(params, period.granularity))
            })
            .collect();

        let frontier = match chain.last() {
            None => Some(Granularity::Year),
            Some(period) => period.granularity.finer().filter(|g| *g <= self.depth),
        };
        let Some(level) = frontier else {
            return Ok(choices);
        };

        let within = match chain.last() {
            Some(period) => self.narrow_to(source, collection, period)?,
            None => collection.clone(),
        };
        let mut counts: BTreeMap<Period, usize> = BTreeMap::new();
        for (value, count) in source.distinct_with_counts(&within, &self.core.field)? {
            if let Some(period) = value.as_date().and_then(|d| Period::containing(d, level)) {
                *counts.entry(period).or_default() += count;
            }
        }

        let distinct = counts.len();
        let buckets = counts
            .into_iter()
            .map(|(period, count)| Bucket {
                key: period.start,
                label: period.label(),
                count,
                params: self.select(params, &period),
            })
            .collect();
        choices.extend(unselected_choices(buckets, distinct, self.core.order, params));
        Ok(choices)
    }
}
