use crate::domain::model::{Report, ReportRow};
use crate::utils::error::Result;
use crate::utils::style::{self, OutputStyle};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportFormat {
    #[default]
    Table,
    Csv,
    Json,
}

const HEADERS: [&str; 3] = ["Subdomain", "Domain", "Resolved"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

const ALIGNMENT: [Align; 3] = [Align::Right, Align::Left, Align::Left];

#[derive(Serialize)]
struct JsonReport<'a> {
    domain: &'a str,
    generated_at: String,
    rows: Vec<JsonRow<'a>>,
}

#[derive(Serialize)]
struct JsonRow<'a> {
    subdomain: &'a str,
    host: &'a str,
    domain: &'a str,
    resolved: Option<String>,
    status: &'static str,
}

/// Turns a finished report into text. Stateless; styling is passed per call.
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    format: ReportFormat,
    style: OutputStyle,
}

impl Reporter {
    pub fn new(format: ReportFormat, style: OutputStyle) -> Self {
        Self { format, style }
    }

    pub fn no_data_message(domain: &str) -> String {
        format!("No data available for {}", domain)
    }

    pub fn render(&self, report: &Report) -> Result<String> {
        if report.is_empty() {
            return Ok(Self::no_data_message(report.domain.as_str()));
        }

        match self.format {
            ReportFormat::Table => Ok(self.render_table(&report.rows)),
            ReportFormat::Csv => render_csv(&report.rows),
            ReportFormat::Json => render_json(report),
        }
    }

    fn render_table(&self, rows: &[ReportRow]) -> String {
        let cells: Vec<[String; 3]> = rows
            .iter()
            .map(|row| {
                [
                    row.subdomain.clone(),
                    row.domain.clone(),
                    row.resolution_display(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let border = {
            let segments: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
            format!("+{}+", segments.join("+"))
        };

        let mut lines = vec![border.clone()];
        lines.push(format_line(&HEADERS.map(String::from), &widths, |_, text| {
            text.to_string()
        }));
        lines.push(border.clone());

        for (row, raw) in cells.iter().zip(rows) {
            lines.push(format_line(row, &widths, |column, text| match column {
                0 => style::bold(text, self.style),
                2 if raw.resolution.address().is_none() => style::muted(text, self.style),
                _ => text.to_string(),
            }));
        }
        lines.push(border);

        lines.join("\n")
    }
}

// 先以純文字計算對齊，再套用樣式，避免色碼影響寬度
fn format_line<F>(cells: &[String; 3], widths: &[usize; 3], decorate: F) -> String
where
    F: Fn(usize, &str) -> String,
{
    let rendered: Vec<String> = cells
        .iter()
        .enumerate()
        .map(|(column, text)| {
            let pad = " ".repeat(widths[column] - text.chars().count());
            let styled = decorate(column, text);
            match ALIGNMENT[column] {
                Align::Left => format!(" {}{} ", styled, pad),
                Align::Right => format!(" {}{} ", pad, styled),
            }
        })
        .collect();

    format!("|{}|", rendered.join("|"))
}

fn render_csv(rows: &[ReportRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(["subdomain", "domain", "resolved"])?;
    for row in rows {
        writer.write_record([
            row.subdomain.as_str(),
            row.domain.as_str(),
            row.resolution_display().as_str(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).trim_end().to_string())
}

fn render_json(report: &Report) -> Result<String> {
    let payload = JsonReport {
        domain: report.domain.as_str(),
        generated_at: report.generated_at.to_rfc3339(),
        rows: report
            .rows
            .iter()
            .map(|row| JsonRow {
                subdomain: &row.subdomain,
                host: &row.host,
                domain: &row.domain,
                resolved: row.resolution.address().map(|a| a.to_string()),
                status: row.resolution.status(),
            })
            .collect(),
    };

    Ok(serde_json::to_string_pretty(&payload)?)
}
