//! Rendering of attendance rows into downloadable report files: CSV, Excel
//! workbooks and PDF documents.
//!
//! Every format shares the same five columns ([`COLUMNS`]) and row order.
//! The renderers are synchronous; handlers run the PDF renderer on the
//! blocking pool since it reads font files from disk.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use genpdf::elements::{Break, FrameCellDecorator, Paragraph, TableLayout};
use genpdf::style::{Color as PdfColor, Style};
use genpdf::{Alignment, Document, Element as _, SimplePageDecorator};
use rollcall_core::attendance::STATUS_PRESENT;
use rollcall_db::models::attendance::{AttendanceFilter, AttendanceWithStudent};
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, XlsxError};

pub const REPORT_TITLE: &str = "Attendance Report";

/// Column headers shared by every export format, in order.
pub const COLUMNS: [&str; 5] = ["Date", "Roll Number", "Name", "Class", "Status"];

/// `Period: <start> to <end>`, with `All` for an open bound.
pub fn period_label(filter: &AttendanceFilter) -> String {
    let bound = |date: Option<NaiveDate>| date.map_or_else(|| "All".to_string(), |d| d.to_string());
    format!(
        "Period: {} to {}",
        bound(filter.start_date),
        bound(filter.end_date)
    )
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

pub fn render_csv(rows: &[AttendanceWithStudent]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS)?;
    for row in rows {
        writer.write_record([
            row.date.to_string().as_str(),
            row.roll_number.as_str(),
            row.name.as_str(),
            row.class_name.as_str(),
            row.status.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

// ---------------------------------------------------------------------------
// Excel
// ---------------------------------------------------------------------------

const HEADER_ROW: u32 = 3;
const COLUMN_WIDTH: f64 = 15.0;

/// A single-sheet workbook: merged title and period rows, a colored header,
/// then one row per record with the status cell filled green or red.
pub fn render_xlsx(rows: &[AttendanceWithStudent], period: &str) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(REPORT_TITLE)?;

    let title = Format::new()
        .set_bold()
        .set_font_size(16.0)
        .set_align(FormatAlign::Center);
    let centered = Format::new().set_align(FormatAlign::Center);
    let header = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(0x4472C4));
    let present = Format::new().set_background_color(Color::RGB(0x90EE90));
    let absent = Format::new().set_background_color(Color::RGB(0xFFCCCB));

    let last_col = (COLUMNS.len() - 1) as u16;
    sheet.merge_range(0, 0, 0, last_col, REPORT_TITLE, &title)?;
    sheet.merge_range(1, 0, 1, last_col, period, &centered)?;

    for (col, name) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(HEADER_ROW, col, *name, &header)?;
        sheet.set_column_width(col, COLUMN_WIDTH)?;
    }

    for (i, row) in rows.iter().enumerate() {
        let r = HEADER_ROW + 1 + i as u32;
        sheet.write_string(r, 0, row.date.to_string())?;
        sheet.write_string(r, 1, &row.roll_number)?;
        sheet.write_string(r, 2, &row.name)?;
        sheet.write_string(r, 3, &row.class_name)?;
        let status_format = if row.status == STATUS_PRESENT {
            &present
        } else {
            &absent
        };
        sheet.write_string_with_format(r, 4, &row.status, status_format)?;
    }

    workbook.save_to_buffer()
}

// ---------------------------------------------------------------------------
// PDF
// ---------------------------------------------------------------------------

/// Where the PDF renderer loads its TrueType font family from.
///
/// `genpdf` expects `<family>-Regular.ttf`, `-Bold`, `-Italic` and
/// `-BoldItalic` files in `dir`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfFonts {
    pub dir: PathBuf,
    pub family: String,
}

impl Default for PdfFonts {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./fonts"),
            family: "LiberationSans".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfExportError {
    #[error("cannot load font family '{family}' from {dir}: {source}")]
    Fonts {
        family: String,
        dir: String,
        source: genpdf::error::Error,
    },

    #[error("PDF rendering failed: {0}")]
    Render(#[from] genpdf::error::Error),
}

/// A titled document with a framed table and a generation footer.
pub fn render_pdf(
    rows: &[AttendanceWithStudent],
    period: &str,
    generated_at: NaiveDateTime,
    fonts: &PdfFonts,
) -> Result<Vec<u8>, PdfExportError> {
    let family = genpdf::fonts::from_files(&fonts.dir, &fonts.family, None).map_err(|source| {
        PdfExportError::Fonts {
            family: fonts.family.clone(),
            dir: fonts.dir.display().to_string(),
            source,
        }
    })?;

    let mut doc = Document::new(family);
    doc.set_title(REPORT_TITLE);
    doc.set_font_size(10);
    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(15);
    doc.set_page_decorator(decorator);

    doc.push(
        Paragraph::new(REPORT_TITLE)
            .aligned(Alignment::Center)
            .styled(Style::new().bold().with_font_size(20)),
    );
    doc.push(Paragraph::new(period).aligned(Alignment::Center));
    doc.push(Break::new(1));

    let mut table = TableLayout::new(vec![2, 2, 3, 2, 2]);
    table.set_cell_decorator(FrameCellDecorator::new(false, true, false));

    let mut header = table.row();
    for name in COLUMNS {
        header = header.element(Paragraph::new(name).styled(Style::new().bold()));
    }
    header.push()?;

    for row in rows {
        let color = if row.status == STATUS_PRESENT {
            PdfColor::Rgb(0, 128, 0)
        } else {
            PdfColor::Rgb(200, 0, 0)
        };
        table
            .row()
            .element(Paragraph::new(row.date.to_string()))
            .element(Paragraph::new(row.roll_number.clone()))
            .element(Paragraph::new(row.name.clone()))
            .element(Paragraph::new(row.class_name.clone()))
            .element(Paragraph::new(row.status.clone()).styled(Style::new().with_color(color)))
            .push()?;
    }
    doc.push(table);

    doc.push(Break::new(1));
    doc.push(
        Paragraph::new(format!("Generated on {}", generated_at.format("%Y-%m-%d %H:%M")))
            .styled(Style::new().with_font_size(8)),
    );

    let mut buffer = Vec::new();
    doc.render(&mut buffer)?;
    Ok(buffer)
}
