/*!
 * Reporting functionality for Elixir
 *
 * Renders a summary of a compile as console tables using the tabled
 * library.
 */

use std::collections::BTreeMap;
use std::time::Duration;

use tabled::{
    settings::{object::Columns, Alignment, Modify, Padding, Style},
    Table, Tabled,
};

use crate::utils::format_file_size;

/// Information about a compiled file in the report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileReportInfo {
    /// Class the file was compiled to
    pub class_name: String,
    /// Number of lines in the file
    pub lines: usize,
    /// Number of characters in the file
    pub chars: usize,
}

/// Statistics for one compile
#[derive(Debug, Clone, Default)]
pub struct CompileReport {
    /// Output file path
    pub output_file: String,
    /// Time taken to build and write the model
    pub duration: Duration,
    /// Size of the written model in bytes
    pub output_bytes: u64,
    /// Instances written, root and chunk containers included
    pub instances: u64,
    /// Folder instances, root excluded
    pub folders: usize,
    /// File instances by class
    pub classes: BTreeMap<String, usize>,
    /// Files left out by the classifier
    pub skipped: usize,
    /// Properties split into chunks
    pub chunked: usize,
    /// Warnings raised during the compile
    pub warnings: Vec<String>,
    /// Details for each compiled file
    pub file_details: BTreeMap<String, FileReportInfo>,
}

impl CompileReport {
    /// Number of instances created from files
    pub fn files_compiled(&self) -> usize {
        self.classes.values().sum()
    }
}

/// Format of the report output
pub enum ReportFormat {
    /// Console table output
    ConsoleTable,
}

/// Report generator for compile results
pub struct Reporter {
    format: ReportFormat,
}

impl Reporter {
    /// Create a new reporter
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Format a number with human-readable units
    fn format_number(&self, num: usize) -> String {
        if num >= 1_000_000 {
            format!("{:.1}M", num as f64 / 1_000_000.0)
        } else if num >= 1_000 {
            format!("{:.1}K", num as f64 / 1_000.0)
        } else {
            num.to_string()
        }
    }

    /// Generate a report string from compile statistics
    pub fn generate_report(&self, report: &CompileReport) -> String {
        match self.format {
            ReportFormat::ConsoleTable => self.generate_console_report(report),
        }
    }

    /// Print the report to stdout
    pub fn print_report(&self, report: &CompileReport) {
        println!("\n{}", self.generate_report(report));
    }

    // Keep the trailing segments of long paths
    fn format_path(&self, path: &str, max_len: usize) -> String {
        if path.chars().count() <= max_len {
            return path.to_string();
        }

        let mut segments = Vec::new();
        let mut current_len = 3; // "..."
        for part in path.split('/').rev() {
            let part_len = part.chars().count() + 1;
            if current_len + part_len > max_len {
                break;
            }
            segments.push(part);
            current_len += part_len;
        }

        if segments.is_empty() {
            let tail: String = path
                .chars()
                .rev()
                .take(max_len.saturating_sub(3))
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            return format!("...{}", tail);
        }

        let mut result = String::from("...");
        for part in segments.iter().rev() {
            result.push('/');
            result.push_str(part);
        }
        result
    }

    fn style(table: &mut Table) -> String {
        table
            .with(Style::rounded())
            .with(Padding::new(1, 1, 0, 0))
            .with(Modify::new(Columns::new(..)).with(Alignment::left()));
        table.to_string()
    }

    // Create a summary table using the tabled crate
    fn create_summary_table(&self, report: &CompileReport) -> String {
        #[derive(Tabled)]
        struct SummaryRow {
            #[tabled(rename = "Metric")]
            key: String,

            #[tabled(rename = "Value")]
            value: String,
        }

        let mut rows = vec![
            SummaryRow {
                key: "📦 Output File".to_string(),
                value: report.output_file.clone(),
            },
            SummaryRow {
                key: "⏱️ Compile Time".to_string(),
                value: format!("{:.4?}", report.duration),
            },
            SummaryRow {
                key: "💾 Model Size".to_string(),
                value: format_file_size(report.output_bytes),
            },
            SummaryRow {
                key: "🧱 Instances".to_string(),
                value: self.format_number(report.instances as usize),
            },
            SummaryRow {
                key: "📂 Folders".to_string(),
                value: self.format_number(report.folders),
            },
        ];

        for (class_name, count) in &report.classes {
            rows.push(SummaryRow {
                key: format!("📜 {}", class_name),
                value: self.format_number(*count),
            });
        }

        rows.push(SummaryRow {
            key: "⏭️ Skipped Files".to_string(),
            value: self.format_number(report.skipped),
        });

        if report.chunked > 0 {
            rows.push(SummaryRow {
                key: "✂️ Chunked Values".to_string(),
                value: self.format_number(report.chunked),
            });
        }

        rows.push(SummaryRow {
            key: "⚠️ Warnings".to_string(),
            value: self.format_number(report.warnings.len()),
        });

        Self::style(&mut Table::new(rows))
    }

    // Create a files table using the tabled crate
    fn create_files_table(&self, report: &CompileReport) -> String {
        #[derive(Tabled)]
        struct FileRow {
            #[tabled(rename = "File Path")]
            path: String,

            #[tabled(rename = "Class")]
            class_name: String,

            #[tabled(rename = "Lines")]
            lines: String,

            #[tabled(rename = "Chars")]
            chars: String,
        }

        // Largest files first
        let mut files: Vec<_> = report.file_details.iter().collect();
        files.sort_by(|(_, a), (_, b)| b.chars.cmp(&a.chars));
        files.truncate(if files.len() > 15 { 10 } else { files.len() });

        let rows: Vec<FileRow> = files
            .iter()
            .map(|(path, info)| FileRow {
                path: self.format_path(path, 60),
                class_name: info.class_name.clone(),
                lines: self.format_number(info.lines),
                chars: self.format_number(info.chars),
            })
            .collect();

        Self::style(&mut Table::new(rows))
    }

    // Generate a console table report
    fn generate_console_report(&self, report: &CompileReport) -> String {
        let files_table = self.create_files_table(report);
        let summary_table = self.create_summary_table(report);

        let files_title = if report.file_details.len() > 15 {
            "📋  TOP 10 LARGEST FILES BY CHARACTER COUNT  📋"
        } else {
            "📋  COMPILED FILES"
        };
        let summary_title = "✅  COMPILE COMPLETE";

        let mut out = format!(
            "{}\n{}\n\n{}\n{}",
            files_title, files_table, summary_title, summary_table
        );

        if !report.warnings.is_empty() {
            out.push_str("\n\n⚠️  WARNINGS\n");
            for warning in &report.warnings {
                out.push_str("  ");
                out.push_str(warning);
                out.push('\n');
            }
        }

        out
    }
}
