use crate::domain::error::{AppError, Result};
use crate::domain::test_case::Session;
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const SHEET_NAME: &str = "Test Cases";

const HEADER_ROW: u32 = 4;
const BASE_HEADERS: [&str; 6] = [
    "TS ID",
    "Test Scenario",
    "TC ID",
    "Test Case (Title)",
    "Test Case Steps",
    "Expected Result",
];
const PER_RUN_HEADERS: [&str; 5] = [
    "Actual Results (AS of Latest Date)",
    "Status",
    "Test Date",
    "Bug ID",
    "Commit ID",
];

const HEADER_FILL: u32 = 0x2F75B5;
const MAX_COLUMNS: usize = 16_384;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFill {
    Pass,
    Fail,
    NotStarted,
    NotApplicable,
}

impl StatusFill {
    /// Case-insensitive, trimmed. Unknown values fall back to `NotStarted`.
    pub fn classify(status: &str) -> Self {
        match status.trim().to_uppercase().as_str() {
            "PASS" | "P" => StatusFill::Pass,
            "FAIL" | "F" => StatusFill::Fail,
            "NA" | "N/A" => StatusFill::NotApplicable,
            _ => StatusFill::NotStarted,
        }
    }

    pub fn rgb(self) -> u32 {
        match self {
            StatusFill::Pass => 0xC6EFCE,
            StatusFill::Fail => 0xFFC7CE,
            StatusFill::NotStarted => 0xFFEB9C,
            StatusFill::NotApplicable => 0xD9D9D9,
        }
    }
}

struct Styles {
    title: Format,
    header: Format,
    body: Format,
    wrapped: Format,
    plain: Format,
}

impl Styles {
    fn new() -> Self {
        Self {
            title: Format::new().set_bold().set_font_size(12),
            header: Format::new()
                .set_bold()
                .set_font_size(11)
                .set_font_color(Color::White)
                .set_background_color(Color::RGB(HEADER_FILL))
                .set_align(FormatAlign::Center)
                .set_align(FormatAlign::VerticalCenter)
                .set_text_wrap()
                .set_border(FormatBorder::Thin),
            body: Format::new()
                .set_align(FormatAlign::Left)
                .set_align(FormatAlign::Top)
                .set_text_wrap()
                .set_border(FormatBorder::Thin),
            wrapped: Format::new().set_text_wrap().set_border(FormatBorder::Thin),
            plain: Format::new().set_border(FormatBorder::Thin),
        }
    }

    fn status(fill: StatusFill) -> Format {
        Format::new()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_background_color(Color::RGB(fill.rgb()))
    }
}

pub fn export_filename(release_version: &str, now: DateTime<Local>) -> String {
    format!(
        "TestCases_{}_{}.xlsx",
        release_version,
        now.format("%Y%m%d_%H%M%S")
    )
}

fn column_width(col: u16) -> f64 {
    match col {
        0 | 2 => 12.0,
        1 | 3 => 30.0,
        4 | 5 => 40.0,
        _ => 18.0,
    }
}

/// Column count of the table; sheets are limited to 16384 columns.
fn table_width(run_count: usize) -> Result<u16> {
    PER_RUN_HEADERS
        .len()
        .checked_mul(run_count)
        .and_then(|run_cols| run_cols.checked_add(BASE_HEADERS.len()))
        .filter(|total| *total <= MAX_COLUMNS)
        .and_then(|total| u16::try_from(total).ok())
        .ok_or_else(|| {
            AppError::ValidationError(format!(
                "Too many run dates ({}) for one worksheet",
                run_count
            ))
        })
}

pub fn render_workbook(session: &Session) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let styles = Styles::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    let total_cols = table_width(session.run_dates.len())?;

    write_preamble(worksheet, session, &styles, total_cols)?;
    write_header(worksheet, &session.run_dates, &styles)?;
    write_rows(worksheet, session, &styles)?;

    for col in 0..total_cols {
        worksheet.set_column_width(col, column_width(col))?;
    }
    worksheet.set_freeze_panes(HEADER_ROW + 1, 0)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_preamble(
    worksheet: &mut Worksheet,
    session: &Session,
    styles: &Styles,
    total_cols: u16,
) -> Result<()> {
    let title = format!("UI Test Cases - {}", session.release_version);
    worksheet.merge_range(0, 0, 0, total_cols - 1, &title, &styles.title)?;

    worksheet.write_string(1, 0, format!("Feature / Description: {}", session.description))?;

    let generated_on = session
        .test_cases
        .first()
        .map(|tc| tc.date_generated.as_str())
        .unwrap_or("");
    worksheet.write_string(
        2,
        0,
        format!("Generated by: {} on {}", session.tester_name, generated_on),
    )?;
    Ok(())
}

fn write_header(worksheet: &mut Worksheet, run_dates: &[String], styles: &Styles) -> Result<()> {
    let mut col: u16 = 0;
    for header in BASE_HEADERS {
        worksheet.write_string_with_format(HEADER_ROW, col, header, &styles.header)?;
        col += 1;
    }

    for (run_index, run_date) in run_dates.iter().enumerate() {
        for sub in PER_RUN_HEADERS {
            let text = if sub == "Test Date" {
                format!("{}\n({})", sub, run_date)
            } else {
                format!("{}\nRun {}", sub, run_index + 1)
            };
            worksheet.write_string_with_format(HEADER_ROW, col, text, &styles.header)?;
            col += 1;
        }
    }
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, session: &Session, styles: &Styles) -> Result<()> {
    let mut row = HEADER_ROW + 1;
    for tc in &session.test_cases {
        let fixed = [
            &tc.ts_id,
            &tc.scenario,
            &tc.tc_id,
            &tc.scenario,
            &tc.steps,
            &tc.expected_result,
        ];
        let mut col: u16 = 0;
        for value in fixed {
            worksheet.write_string_with_format(row, col, value.as_str(), &styles.body)?;
            col += 1;
        }

        for run in &tc.runs {
            worksheet.write_string_with_format(row, col, run.actual_result.as_str(), &styles.wrapped)?;
            col += 1;

            let status = run.status.trim().to_uppercase();
            let status_format = Styles::status(StatusFill::classify(&status));
            worksheet.write_string_with_format(row, col, status, &status_format)?;
            col += 1;

            for value in [&run.test_date, &run.bug_id, &run.commit_id] {
                worksheet.write_string_with_format(row, col, value.as_str(), &styles.plain)?;
                col += 1;
            }
        }
        row += 1;
    }
    Ok(())
}
