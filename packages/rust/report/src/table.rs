//! Normalized report table.

use std::collections::HashMap;

use gamescore_shared::{RunConfig, ScoreRecord};
use tracing::debug;

/// Visible report columns. The link is attached to the name cell instead.
pub const REPORT_HEADERS: [&str; 4] = ["Name", "Critic Score", "User Score", "Release Year"];

/// Glyph appended to name cells when link decoration is enabled.
pub const LINK_SYMBOL: &str = " \u{1F517}";

/// Hyperlink font color (RGB).
pub const LINK_COLOR: u32 = 0x0563C1;

/// Fixed height of every row, in points.
pub const ROW_HEIGHT: f64 = 18.0;

/// Added to the longest rendered value of each column.
pub const COLUMN_PADDING: usize = 2;

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Blank,
}

impl Cell {
    /// The value as it shows in the sheet, used for column sizing.
    pub fn rendered(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
            Self::Number(n) => n.to_string(),
            Self::Blank => String::new(),
        }
    }
}

/// Name column cell: display text plus the hyperlink it navigates to.
#[derive(Debug, Clone, PartialEq)]
pub struct NameCell {
    pub text: String,
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub name: NameCell,
    pub critic_score: Cell,
    pub user_score: Cell,
    pub release_year: Cell,
}

impl ReportRow {
    fn rendered(&self) -> [String; 4] {
        [
            self.name.text.clone(),
            self.critic_score.rendered(),
            self.user_score.rendered(),
            self.release_year.rendered(),
        ]
    }
}

/// Font styling applied to hyperlinked name cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkStyle {
    pub color: u32,
    pub underline: bool,
}

impl Default for LinkStyle {
    fn default() -> Self {
        Self {
            color: LINK_COLOR,
            underline: true,
        }
    }
}

/// Everything the report writer needs: values plus layout instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: [&'static str; 4],
    pub rows: Vec<ReportRow>,
    pub column_widths: [f64; 4],
    pub row_height: f64,
    pub link_style: LinkStyle,
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default)]
pub struct ReportOptions {
    /// Append [`LINK_SYMBOL`] to every displayed name.
    pub link_symbol: bool,
}

impl From<&RunConfig> for ReportOptions {
    fn from(config: &RunConfig) -> Self {
        Self {
            link_symbol: config.enable_link_symbol,
        }
    }
}

pub struct ReportBuilder {
    options: ReportOptions,
}

impl ReportBuilder {
    pub fn new(options: ReportOptions) -> Self {
        Self { options }
    }

    /// Project cached records into the report table, in cache order.
    pub fn build(&self, records: &[ScoreRecord]) -> Table {
        let links: HashMap<&str, &str> = records
            .iter()
            .map(|r| (r.name.as_str(), r.link.as_str()))
            .collect();

        let rows: Vec<ReportRow> = records
            .iter()
            .map(|record| {
                // Lookup uses the undecorated name.
                let link = links
                    .get(record.name.as_str())
                    .filter(|link| !link.is_empty())
                    .map(|link| link.to_string());

                let mut text = record.name.clone();
                if self.options.link_symbol {
                    text.push_str(LINK_SYMBOL);
                }

                ReportRow {
                    name: NameCell { text, link },
                    critic_score: coerce_score(&record.critic_score),
                    user_score: coerce_score(&record.user_score),
                    release_year: Cell::Text(record.release_year.clone()),
                }
            })
            .collect();

        let column_widths = column_widths(&rows);
        debug!(rows = rows.len(), ?column_widths, "report table built");

        Table {
            headers: REPORT_HEADERS,
            rows,
            column_widths,
            row_height: ROW_HEIGHT,
            link_style: LinkStyle::default(),
        }
    }
}

/// Numeric when the text parses as a finite number, blank otherwise.
pub fn coerce_score(raw: &str) -> Cell {
    match raw.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => Cell::Number(n),
        _ => Cell::Blank,
    }
}

fn column_widths(rows: &[ReportRow]) -> [f64; 4] {
    let mut longest = REPORT_HEADERS.map(|h| h.chars().count());
    for row in rows {
        for (max, value) in longest.iter_mut().zip(row.rendered()) {
            *max = (*max).max(value.chars().count());
        }
    }
    longest.map(|len| (len + COLUMN_PADDING) as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gamescore_shared::NOT_AVAILABLE;

    fn record(name: &str, critic: &str, user: &str, year: &str) -> ScoreRecord {
        ScoreRecord {
            name: name.into(),
            link: format!("https://games.example.com/{}", name.to_lowercase().replace(' ', "-")),
            critic_score: critic.into(),
            user_score: user.into(),
            release_year: year.into(),
        }
    }

    #[test]
    fn numeric_scores_and_linked_names() {
        let table = ReportBuilder::new(ReportOptions::default())
            .build(&[record("Example Game", "90", "8.5", "2019")]);

        assert_eq!(table.headers, REPORT_HEADERS);
        let row = &table.rows[0];
        assert_eq!(row.name.text, "Example Game");
        assert_eq!(
            row.name.link.as_deref(),
            Some("https://games.example.com/example-game")
        );
        assert_eq!(row.critic_score, Cell::Number(90.0));
        assert_eq!(row.user_score, Cell::Number(8.5));
        assert_eq!(row.release_year, Cell::Text("2019".into()));
        assert_eq!(table.link_style, LinkStyle { color: 0x0563C1, underline: true });
        assert_eq!(table.row_height, 18.0);
    }

    #[test]
    fn sentinels_render_blank_scores() {
        let table = ReportBuilder::new(ReportOptions::default()).build(&[record(
            "Vaporware",
            NOT_AVAILABLE,
            "tbd",
            NOT_AVAILABLE,
        )]);
        let row = &table.rows[0];
        assert_eq!(row.critic_score, Cell::Blank);
        assert_eq!(row.user_score, Cell::Blank);
        assert_eq!(row.release_year, Cell::Text(NOT_AVAILABLE.into()));
    }

    #[test]
    fn coerce_rejects_non_finite() {
        assert_eq!(coerce_score("87"), Cell::Number(87.0));
        assert_eq!(coerce_score(" 7.8 "), Cell::Number(7.8));
        assert_eq!(coerce_score("NaN"), Cell::Blank);
        assert_eq!(coerce_score("inf"), Cell::Blank);
        assert_eq!(coerce_score(""), Cell::Blank);
    }

    #[test]
    fn link_symbol_does_not_break_lookup() {
        let table = ReportBuilder::new(ReportOptions { link_symbol: true })
            .build(&[record("Portal", "90", "8.8", "2007")]);
        let row = &table.rows[0];
        assert_eq!(row.name.text, format!("Portal{LINK_SYMBOL}"));
        assert_eq!(row.name.link.as_deref(), Some("https://games.example.com/portal"));
    }

    #[test]
    fn widths_fit_longest_value_plus_padding() {
        let table = ReportBuilder::new(ReportOptions::default()).build(&[
            record("A Rather Long Game Name", "100", "9.25", "2004"),
            record("Short", "7", "8", "1999"),
        ]);
        // "A Rather Long Game Name" = 23 chars; headers win for the others.
        assert_eq!(table.column_widths, [25.0, 14.0, 12.0, 14.0]);
    }

    #[test]
    fn rendered_numbers() {
        assert_eq!(Cell::Number(90.0).rendered(), "90");
        assert_eq!(Cell::Number(8.5).rendered(), "8.5");
        assert_eq!(Cell::Blank.rendered(), "");
    }
}
