use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use reportpage_core::{
    EmittedRow, Fit, OutputSink, Registry, ReportRegistration, ReportRow, ReportSource,
    SortValue, SourceError,
};

/// Rows named `A`, `B`, `C`, ... with ascending integer values.
#[allow(dead_code)]
pub fn letters(n: usize) -> Vec<ReportRow> {
    (0..n)
        .map(|i| {
            let name = ((b'A' + i as u8) as char).to_string();
            ReportRow::new(0, name, SortValue::Integer(i as i64))
        })
        .collect()
}

/// Titles of emitted rows, in order.
#[allow(dead_code)]
pub fn titles(rows: &[EmittedRow]) -> Vec<String> {
    rows.iter().map(|r| r.title.title.clone()).collect()
}

/// Report source that records how often and with what window it was fetched.
#[derive(Clone, Default)]
pub struct CountingReport {
    pub rows: Vec<ReportRow>,
    pub cached: bool,
    pub cacheable: bool,
    pub cached_at: Option<DateTime<Utc>>,
    pub timestamps: bool,
    pub permission: Option<String>,
    pub fail_with: Option<String>,
    pub fetches: Arc<AtomicUsize>,
    pub last_window: Arc<std::sync::Mutex<Option<(u64, u64)>>>,
}

#[allow(dead_code)]
impl CountingReport {
    pub fn new(rows: Vec<ReportRow>) -> Self {
        Self {
            rows,
            cacheable: true,
            ..Default::default()
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn last_window(&self) -> Option<(u64, u64)> {
        *self.last_window.lock().unwrap()
    }

    pub fn registration(&self, name: &str) -> ReportRegistration {
        let template = self.clone();
        ReportRegistration::new(name, move || Box::new(template.clone()) as Box<dyn ReportSource>)
    }
}

impl ReportSource for CountingReport {
    fn is_cached(&self) -> bool {
        self.cached
    }

    fn is_cacheable(&self) -> bool {
        self.cacheable
    }

    fn cached_timestamp(&self) -> Option<DateTime<Utc>> {
        self.cached_at
    }

    fn uses_timestamps(&self) -> bool {
        self.timestamps
    }

    fn required_permission(&self) -> Option<&str> {
        self.permission.as_deref()
    }

    fn fetch(&self, offset: u64, count: u64) -> Result<Vec<ReportRow>, SourceError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        *self.last_window.lock().unwrap() = Some((offset, count));
        if let Some(message) = &self.fail_with {
            return Err(SourceError::new(message.clone()));
        }
        Ok(self
            .rows
            .iter()
            .skip(offset as usize)
            .take(count as usize)
            .cloned()
            .collect())
    }
}

/// Sink that refuses the `refuse_at`th push (1-based) and everything after.
#[derive(Default)]
pub struct RefusingSink {
    pub refuse_at: usize,
    pub attempts: usize,
    pub accepted: Vec<EmittedRow>,
}

#[allow(dead_code)]
impl RefusingSink {
    pub fn new(refuse_at: usize) -> Self {
        Self {
            refuse_at,
            ..Default::default()
        }
    }
}

impl OutputSink for RefusingSink {
    fn push(&mut self, row: EmittedRow) -> Fit {
        self.attempts += 1;
        if self.attempts >= self.refuse_at {
            return Fit::Full;
        }
        self.accepted.push(row);
        Fit::Accepted
    }
}

/// Registry holding one report under `name`, no exclusions.
#[allow(dead_code)]
pub fn single(name: &str, report: &CountingReport) -> Registry {
    Registry::build(vec![report.registration(name)], Vec::<String>::new())
}
