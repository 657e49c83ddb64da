//! Monthly export engine: aggregate approved records for a year/month window
//! per employee, render one report each, and publish them as a single
//! archive.

pub mod archive;
pub mod report;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::error::ExportError;
use crate::model::record::AttendanceRecord;
use crate::store::RecordStore;
use report::{ReportFile, ReportRenderer};

/// Location and shape of a published monthly archive.
#[derive(Debug, Clone)]
pub struct MonthlyArchive {
    pub path: PathBuf,
    pub employees: usize,
    pub records: usize,
}

/// `Empty` is a policy outcome, not a failure: nothing is published when no
/// employee has an approved record inside the month.
#[derive(Debug)]
pub enum ExportOutcome {
    Archive(MonthlyArchive),
    Empty,
}

pub struct ExportEngine {
    store: Arc<dyn RecordStore>,
    renderer: Arc<dyn ReportRenderer>,
    out_dir: PathBuf,
}

impl ExportEngine {
    pub fn new(
        store: Arc<dyn RecordStore>,
        renderer: Arc<dyn ReportRenderer>,
        out_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            renderer,
            out_dir: out_dir.into(),
        }
    }

    /// Build and publish the archive for one calendar month.
    ///
    /// The approved set is read once up front; records approved after that
    /// snapshot are not included. All reports are rendered in memory before
    /// anything touches disk, and the archive is published with an atomic
    /// rename: a failure on any employee aborts the whole job with no
    /// partial output. Re-running for the same period replaces the previous
    /// archive.
    pub async fn generate_monthly_export(
        &self,
        year: i32,
        month: u32,
    ) -> Result<ExportOutcome, ExportError> {
        let (first_day, last_day) =
            month_bounds(year, month).ok_or(ExportError::InvalidPeriod { year, month })?;

        let snapshot = self.store.approved_in_range(first_day, last_day).await?;
        if snapshot.is_empty() {
            tracing::info!(year, month, "no approved records for period, nothing to export");
            return Ok(ExportOutcome::Empty);
        }
        let records = snapshot.len();

        let mut jobs = Vec::new();
        for (employee_id, entries) in group_by_employee(snapshot) {
            let employee = self.store.employee(&employee_id).await?.ok_or(
                ExportError::MissingEmployee {
                    employee_id: employee_id.clone(),
                },
            )?;
            jobs.push((employee, entries));
        }
        let employees = jobs.len();

        // Rendering and archive I/O stay off the async executor so they
        // never stall interactive record/decision traffic.
        let renderer = self.renderer.clone();
        let out_dir = self.out_dir.clone();
        let archive_name = format!("attendance-{year:04}-{month:02}.zip");
        let path = tokio::task::spawn_blocking(move || {
            let mut reports = Vec::with_capacity(jobs.len());
            for (employee, entries) in &jobs {
                let bytes = renderer
                    .render(employee, year, month, entries)
                    .map_err(|source| ExportError::Render {
                        employee_id: employee.id.clone(),
                        source,
                    })?;
                reports.push(ReportFile {
                    name: format!(
                        "{}-{year:04}-{month:02}.{}",
                        employee.id,
                        renderer.extension()
                    ),
                    bytes,
                });
            }
            archive::publish(&out_dir, &archive_name, &reports)
        })
        .await
        .map_err(|e| ExportError::Archive(std::io::Error::other(e)))??;

        tracing::info!(
            year,
            month,
            employees,
            records,
            archive = %path.display(),
            "monthly export published"
        );
        Ok(ExportOutcome::Archive(MonthlyArchive {
            path,
            employees,
            records,
        }))
    }
}

/// First and last calendar day of the month, or `None` for an invalid period.
fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_month.pred_opt()?))
}

/// Group a snapshot by employee id, each group sorted by date then record id
/// so same-day entries order deterministically.
fn group_by_employee(
    records: Vec<AttendanceRecord>,
) -> BTreeMap<String, Vec<AttendanceRecord>> {
    let mut groups: BTreeMap<String, Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.employee_id.clone()).or_default().push(record);
    }
    for entries in groups.values_mut() {
        entries.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
    }
    groups
}
