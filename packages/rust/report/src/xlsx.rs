//! `.xlsx` rendering of a report [`Table`].

use std::path::Path;

use chrono::NaiveDateTime;
use gamescore_shared::{GameScoreError, Result};
use rust_xlsxwriter::{
    Color, Format, FormatAlign, FormatUnderline, Url, Workbook, Worksheet, XlsxError,
};
use tracing::{info, instrument};

use crate::table::{Cell, Table};

/// Sink for a finished report table.
pub trait ReportWriter {
    fn write(&self, table: &Table, path: &Path) -> Result<()>;
}

/// Writes the table as a single-sheet workbook.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxReportWriter;

impl ReportWriter for XlsxReportWriter {
    #[instrument(skip_all, fields(path = %path.display(), rows = table.rows.len()))]
    fn write(&self, table: &Table, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| GameScoreError::io(parent, e))?;
            }
        }

        let mut workbook = render(table).map_err(report_error)?;
        workbook.save(path).map_err(report_error)?;
        info!("report written");
        Ok(())
    }
}

/// `output.xlsx`, or `output_<YYMMDD_HHMM>.xlsx` when a timestamp is given.
pub fn output_file_name(timestamp: Option<NaiveDateTime>) -> String {
    match timestamp {
        Some(at) => format!("output_{}.xlsx", at.format("%y%m%d_%H%M")),
        None => "output.xlsx".to_string(),
    }
}

fn render(table: &Table) -> std::result::Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let cell_format = Format::new().set_align(FormatAlign::VerticalCenter);
    let mut link_format = Format::new()
        .set_align(FormatAlign::VerticalCenter)
        .set_font_color(Color::RGB(table.link_style.color));
    if table.link_style.underline {
        link_format = link_format.set_underline(FormatUnderline::Single);
    }

    for (col, header) in table.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *header, &cell_format)?;
    }

    for (i, row) in table.rows.iter().enumerate() {
        let r = (i + 1) as u32;
        match &row.name.link {
            Some(link) => {
                let url = Url::new(link.as_str()).set_text(row.name.text.as_str());
                worksheet.write_url_with_format(r, 0, url, &link_format)?;
            }
            None => {
                worksheet.write_string_with_format(r, 0, row.name.text.as_str(), &cell_format)?;
            }
        }
        write_cell(worksheet, r, 1, &row.critic_score, &cell_format)?;
        write_cell(worksheet, r, 2, &row.user_score, &cell_format)?;
        write_cell(worksheet, r, 3, &row.release_year, &cell_format)?;
    }

    for r in 0..=table.rows.len() {
        worksheet.set_row_height(r as u32, table.row_height)?;
    }
    for (col, width) in table.column_widths.iter().enumerate() {
        worksheet.set_column_width(col as u16, *width)?;
    }

    Ok(workbook)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: &Format,
) -> std::result::Result<(), XlsxError> {
    match cell {
        Cell::Text(text) => worksheet.write_string_with_format(row, col, text.as_str(), format)?,
        Cell::Number(n) => worksheet.write_number_with_format(row, col, *n, format)?,
        Cell::Blank => worksheet.write_blank(row, col, format)?,
    };
    Ok(())
}

fn report_error(e: XlsxError) -> GameScoreError {
    GameScoreError::Report(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{ReportBuilder, ReportOptions};
    use chrono::NaiveDate;
    use gamescore_shared::{NOT_AVAILABLE, ScoreRecord};

    #[test]
    fn file_names() {
        assert_eq!(output_file_name(None), "output.xlsx");

        let at = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        assert_eq!(output_file_name(Some(at)), "output_240307_0905.xlsx");
    }

    #[test]
    fn writes_workbook() {
        let records = vec![
            ScoreRecord {
                name: "Half-Life 2".into(),
                link: "https://games.example.com/half-life-2".into(),
                critic_score: "96".into(),
                user_score: "9.1".into(),
                release_year: "2004".into(),
            },
            ScoreRecord {
                name: "Vaporware".into(),
                link: "https://games.example.com/vaporware".into(),
                critic_score: NOT_AVAILABLE.into(),
                user_score: NOT_AVAILABLE.into(),
                release_year: NOT_AVAILABLE.into(),
            },
        ];
        let table = ReportBuilder::new(ReportOptions { link_symbol: true }).build(&records);

        let dir = std::env::temp_dir().join(format!("gs-report-test-{}", uuid::Uuid::now_v7()));
        let path = dir.join("output.xlsx");
        XlsxReportWriter.write(&table, &path).unwrap();

        let sheet = read_part(&path, "xl/worksheets/sheet1.xml");
        let rels = read_part(&path, "xl/worksheets/_rels/sheet1.xml.rels");
        let styles = read_part(&path, "xl/styles.xml");
        let strings = read_part(&path, "xl/sharedStrings.xml");

        // Name cells link to the record, the link column itself is not written.
        assert!(sheet.contains(r#"<hyperlink ref="A2""#), "{sheet}");
        assert!(sheet.contains(r#"<hyperlink ref="A3""#), "{sheet}");
        assert!(rels.contains("https://games.example.com/half-life-2"));
        assert!(rels.contains("https://games.example.com/vaporware"));
        assert!(!sheet.contains(r#"<c r="E"#));
        assert!(strings.contains("Half-Life 2 \u{1F517}"));
        assert!(styles.contains("FF0563C1"));
        assert!(styles.contains("<u/>"));

        // Scores are numeric cells, sentinels are blank.
        let critic = cell_xml(&sheet, "B2");
        assert!(critic.contains("<v>96</v>") && !critic.contains(r#"t="s""#), "{critic}");
        let user = cell_xml(&sheet, "C2");
        assert!(user.contains("<v>9.1</v>") && !user.contains(r#"t="s""#), "{user}");
        assert!(!cell_xml(&sheet, "B3").contains("<v>"));
        assert!(!cell_xml(&sheet, "C3").contains("<v>"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn read_part(path: &Path, name: &str) -> String {
        use std::io::Read;

        let file = std::fs::File::open(path).unwrap();
        let mut archive = zip::ZipArchive::new(file).unwrap();
        let mut part = archive.by_name(name).unwrap();
        let mut xml = String::new();
        part.read_to_string(&mut xml).unwrap();
        xml
    }

    /// The `<c>` element for a cell reference, e.g. `B2`.
    fn cell_xml<'a>(sheet: &'a str, cell: &str) -> &'a str {
        let start = sheet
            .find(&format!(r#"<c r="{cell}""#))
            .unwrap_or_else(|| panic!("no cell {cell} in {sheet}"));
        let rest = &sheet[start..];
        let end = [rest.find("</c>").map(|i| i + 4), rest.find("/>").map(|i| i + 2)]
            .into_iter()
            .flatten()
            .min()
            .unwrap();
        &rest[..end]
    }
}
