//! Per-employee report rendering.
//!
//! Rendering is kept behind [`ReportRenderer`] so the report layout and the
//! archive container can evolve independently. Reports carry no wall-clock
//! timestamps: rendering a fixed snapshot twice produces the same bytes.

use std::io::{BufWriter, Write};
use std::sync::Arc;

use printpdf::{BuiltinFont, Mm, PdfDocument};
use strum_macros::{Display, EnumString};

use crate::error::RenderError;
use crate::model::employee::Employee;
use crate::model::record::{AttendanceRecord, Shift};

/// A rendered report, ready to be placed into the archive.
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

pub trait ReportRenderer: Send + Sync {
    fn extension(&self) -> &'static str;

    /// Render one employee's month. `entries` is already sorted by
    /// (date, record id) and is never empty.
    fn render(
        &self,
        employee: &Employee,
        year: i32,
        month: u32,
        entries: &[AttendanceRecord],
    ) -> Result<Vec<u8>, RenderError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReportFormat {
    Pdf,
    Csv,
}

impl ReportFormat {
    pub fn renderer(self) -> Arc<dyn ReportRenderer> {
        match self {
            ReportFormat::Pdf => Arc::new(PdfRenderer),
            ReportFormat::Csv => Arc::new(CsvRenderer),
        }
    }
}

/// Per-shift tallies for the report summary. Zero counts are listed too.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ShiftCounts {
    pub day: usize,
    pub night: usize,
    pub travel: usize,
}

impl ShiftCounts {
    pub fn tally(entries: &[AttendanceRecord]) -> Self {
        let mut counts = Self::default();
        for entry in entries {
            match entry.shift {
                Shift::Day => counts.day += 1,
                Shift::Night => counts.night += 1,
                Shift::Travel => counts.travel += 1,
            }
        }
        counts
    }

    pub fn rows(&self) -> [(Shift, usize); 3] {
        [
            (Shift::Day, self.day),
            (Shift::Night, self.night),
            (Shift::Travel, self.travel),
        ]
    }
}

/// Tabular report: a `date,shift` listing followed by a `shift,count`
/// summary. Byte-deterministic for a fixed input.
pub struct CsvRenderer;

impl ReportRenderer for CsvRenderer {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn render(
        &self,
        _employee: &Employee,
        _year: i32,
        _month: u32,
        entries: &[AttendanceRecord],
    ) -> Result<Vec<u8>, RenderError> {
        let mut buf = Vec::new();

        {
            let mut listing = csv::Writer::from_writer(&mut buf);
            listing.write_record(["date", "shift"])?;
            for entry in entries {
                listing.write_record([
                    entry.date.format("%Y-%m-%d").to_string(),
                    entry.shift.to_string(),
                ])?;
            }
            listing.flush()?;
        }

        buf.push(b'\n');

        {
            let mut summary = csv::Writer::from_writer(&mut buf);
            summary.write_record(["shift", "count"])?;
            for (shift, count) in ShiftCounts::tally(entries).rows() {
                summary.write_record([shift.to_string(), count.to_string()])?;
            }
            summary.flush()?;
        }

        Ok(buf)
    }
}

/// A4 report with a Date/Shift table and a totals block, one page chain per
/// employee.
pub struct PdfRenderer;

impl ReportRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(
        &self,
        employee: &Employee,
        year: i32,
        month: u32,
        entries: &[AttendanceRecord],
    ) -> Result<Vec<u8>, RenderError> {
        let (doc, page, layer) = PdfDocument::new(
            format!("Attendance summary - {month:02}/{year:04}"),
            Mm(210.0),
            Mm(297.0),
            "report",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Pdf(e.to_string()))?;

        let mut layer_ref = doc.get_page(page).get_layer(layer);
        let mut y = 277.0;

        layer_ref.use_text(
            format!("Attendance summary - {month:02}/{year:04}"),
            16.0,
            Mm(20.0),
            Mm(y),
            &bold,
        );
        y -= 10.0;
        layer_ref.use_text(
            format!(
                "Employee: {} {} ({})",
                employee.first_name,
                employee.last_name.to_uppercase(),
                employee.id
            ),
            12.0,
            Mm(20.0),
            Mm(y),
            &font,
        );
        y -= 12.0;

        layer_ref.use_text("Date", 12.0, Mm(20.0), Mm(y), &bold);
        layer_ref.use_text("Shift", 12.0, Mm(70.0), Mm(y), &bold);
        y -= 7.0;

        for entry in entries {
            if y < 30.0 {
                let (next_page, next_layer) = doc.add_page(Mm(210.0), Mm(297.0), "report");
                layer_ref = doc.get_page(next_page).get_layer(next_layer);
                y = 277.0;
            }
            layer_ref.use_text(
                entry.date.format("%d/%m/%Y").to_string(),
                11.0,
                Mm(20.0),
                Mm(y),
                &font,
            );
            layer_ref.use_text(entry.shift.to_string(), 11.0, Mm(70.0), Mm(y), &font);
            y -= 5.5;
        }

        y -= 5.0;
        if y < 40.0 {
            let (next_page, next_layer) = doc.add_page(Mm(210.0), Mm(297.0), "report");
            layer_ref = doc.get_page(next_page).get_layer(next_layer);
            y = 277.0;
        }
        layer_ref.use_text("Totals", 12.0, Mm(20.0), Mm(y), &bold);
        y -= 7.0;
        for (shift, count) in ShiftCounts::tally(entries).rows() {
            layer_ref.use_text(format!("{shift}: {count}"), 11.0, Mm(20.0), Mm(y), &font);
            y -= 5.5;
        }

        let mut buf = Vec::new();
        {
            let mut writer = BufWriter::new(&mut buf);
            doc.save(&mut writer)
                .map_err(|e| RenderError::Pdf(e.to_string()))?;
            writer.flush()?;
        }
        Ok(buf)
    }
}
