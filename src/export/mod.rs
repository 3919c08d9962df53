use crate::analysis::{DefectRecord, DefectReport};
use crate::cleanup::{CleanupSummary, DropReason};
use crate::error::{InventoryError, Result};
use colored::Colorize;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADERS: [&str; 7] = [
    "Host",
    "Groups",
    "Duplicated Variables",
    "Inconsistent Variables",
    "Duplicated Host",
    "Missing File in host_vars",
    "Orphaned Host Var",
];

pub fn csv_row(record: &DefectRecord) -> [String; 7] {
    [
        record.host.clone(),
        record.groups_display(),
        record.duplicated_variables_display(),
        record.inconsistent_variables_display(),
        record.duplicated_host_display(),
        record.missing_file_display().to_string(),
        record.orphaned_host_var_display().to_string(),
    ]
}

/// Quotes a field when it holds a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line<S: AsRef<str>>(fields: &[S]) -> String {
    let mut line = fields
        .iter()
        .map(|f| csv_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str("\r\n");
    line
}

pub fn render_csv(report: &DefectReport) -> String {
    let mut out = csv_line(&CSV_HEADERS);
    for record in report.iter() {
        out.push_str(&csv_line(&csv_row(record)));
    }
    out
}

pub fn write_csv(report: &DefectReport, path: &Path) -> Result<()> {
    let export_err = |source| InventoryError::Export {
        path: path.to_path_buf(),
        source,
    };
    let mut file = std::fs::File::create(path).map_err(export_err)?;
    file.write_all(render_csv(report).as_bytes())
        .map_err(export_err)
}

pub fn render_json<T: serde::Serialize>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

fn flag(label: &str, set: bool) -> String {
    if set {
        label.red().to_string()
    } else {
        label.dimmed().to_string()
    }
}

pub fn print_report(report: &DefectReport) {
    for issue in &report.load_issues {
        eprintln!(
            "{} {}: {}",
            "warning:".yellow().bold(),
            issue.file.display(),
            issue.message
        );
    }

    for record in report.iter() {
        let name = if record.has_defects() {
            record.host.yellow().bold()
        } else {
            record.host.green().bold()
        };
        println!("{} [{}]", name, record.groups_display());

        for d in &record.duplicated_variables {
            println!("  {} {}", "duplicated:".cyan(), d);
        }
        for i in &record.inconsistent_variables {
            println!("  {} {}", "inconsistent:".magenta(), i);
        }
        if record.is_duplicated_host() {
            println!(
                "  {} {}",
                "declared in:".red(),
                record.duplicated_host_display()
            );
        }
        if record.missing_file || record.orphaned_host_var {
            println!(
                "  {} {}",
                flag("missing host_vars file", record.missing_file),
                flag("orphaned host_vars file", record.orphaned_host_var)
            );
        }
    }

    println!(
        "\n{} host(s), {} with defects",
        report.len(),
        report.defect_count().to_string().bold()
    );
}

pub fn print_cleanup(summary: &CleanupSummary) {
    let verb = if summary.check_mode {
        "would remove"
    } else {
        "removed"
    };

    for line in &summary.removed_lines {
        let why = match line.reason {
            DropReason::DuplicatedHost => "duplicated host",
            DropReason::MissingFile => "missing host_vars file",
        };
        println!(
            "{} line {}: {} ({})",
            verb.red(),
            line.line,
            line.text,
            why
        );
    }
    for change in &summary.host_files {
        println!(
            "{} {} from {}",
            verb.red(),
            change.removed_keys.join(", ").bold(),
            change.path.display()
        );
    }
    for skip in &summary.skipped {
        eprintln!(
            "{} skipped {}: {}",
            "warning:".yellow().bold(),
            skip.host,
            skip.reason
        );
    }

    if summary.is_noop() {
        println!("{}", "inventory already clean".green());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::DuplicatedVariable;

    fn orphan_and_host() -> DefectReport {
        let mut web1 = DefectRecord::orphan("web1");
        web1.orphaned_host_var = false;
        web1.groups = vec!["web".into(), "app".into()];
        web1.duplicated_host = web1.groups.clone();
        web1.duplicated_variables = vec![DuplicatedVariable {
            key: "port".into(),
            group_file: "web.yml".into(),
            host: "web1".into(),
        }];
        DefectReport {
            records: vec![web1, DefectRecord::orphan("ghost")],
            ..Default::default()
        }
    }

    #[test]
    fn csv_header_order() {
        let csv = render_csv(&DefectReport::default());
        assert_eq!(
            csv,
            "Host,Groups,Duplicated Variables,Inconsistent Variables,Duplicated Host,Missing File in host_vars,Orphaned Host Var\r\n"
        );
    }

    #[test]
    fn csv_rows_use_sentinels() {
        let csv = render_csv(&orphan_and_host());
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(
            lines[1],
            "web1,\"web, app\",port (in web.yml and web1),No inconsistent variables,\"web, app\",No,No"
        );
        assert_eq!(
            lines[2],
            "ghost,No group assigned,N/A,N/A,No duplication in groups,No,Yes"
        );
    }

    #[test]
    fn csv_quotes_embedded_quotes() {
        assert_eq!(csv_field(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn write_csv_to_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("inventory_analysis.csv");
        write_csv(&orphan_and_host(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("Host,Groups,"));
        assert_eq!(written.matches("\r\n").count(), 3);
    }

    #[test]
    fn json_keeps_structure() {
        let json = render_json(&orphan_and_host()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["records"][0]["duplicated_variables"][0]["key"], "port");
        assert_eq!(value["records"][1]["orphaned_host_var"], true);
    }
}
