use crate::model::{ScanResult, Severity};
use anyhow::Result;
use std::fmt::Write;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct PackageRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Ecosystem")]
    ecosystem: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "OS Package")]
    os_package: String,
    #[tabled(rename = "Vulns")]
    vulns: usize,
}

#[derive(Tabled)]
struct LocatedPackageRow {
    #[tabled(inline)]
    package: PackageRow,
    #[tabled(rename = "Location")]
    location: String,
}

#[derive(Tabled)]
struct VulnRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Summary")]
    summary: String,
    #[tabled(rename = "Fixed In")]
    fixed_in: String,
}

#[derive(Tabled)]
struct FindingRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Target")]
    target: String,
}

pub fn print_cli_table(result: &ScanResult, show_locations: bool) -> Result<()> {
    print!("{}", render_table(result, show_locations)?);
    Ok(())
}

/// Renders the human-readable report.
pub fn render_table(result: &ScanResult, show_locations: bool) -> Result<String> {
    let mut out = String::new();

    writeln!(out)?;
    writeln!(
        out,
        "Scan completed at: {}",
        result.scan_time.format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(out)?;

    let packages = result.package_results();
    if packages.is_empty() {
        writeln!(out, "No packages found.")?;
    } else {
        writeln!(out, "Resolved {} packages:", packages.len())?;
        writeln!(out)?;

        let rows = packages.iter().map(|r| {
            let package = r.package();
            PackageRow {
                source: package.source_type().display_name().to_string(),
                ecosystem: package.ecosystem().to_string(),
                name: truncate(&package.name(), 40),
                version: format_value(&package.version()),
                os_package: format_value(package.os_package_name()),
                vulns: r.vulnerabilities().len(),
            }
        });

        let table = if show_locations {
            let rows: Vec<LocatedPackageRow> = rows
                .zip(packages)
                .map(|(row, r)| LocatedPackageRow {
                    package: row,
                    location: format_value(&truncate(r.package().location(), 50)),
                })
                .collect();
            Table::new(rows).with(Style::rounded()).to_string()
        } else {
            Table::new(rows.collect::<Vec<_>>())
                .with(Style::rounded())
                .to_string()
        };
        writeln!(out, "{}", table)?;
    }

    if result.total_vulnerabilities() > 0 {
        writeln!(out)?;
        writeln!(
            out,
            "Found {} vulnerabilities:",
            result.total_vulnerabilities()
        )?;
        writeln!(out)?;

        let mut rows: Vec<(Severity, VulnRow)> = result
            .vulnerable_packages()
            .flat_map(|r| {
                let package = format!("{}@{}", r.package().name(), r.package().version());
                r.vulnerabilities().iter().map(move |v| {
                    let severity = v.severity_level();
                    (
                        severity,
                        VulnRow {
                            severity: format_severity(&severity),
                            package: package.clone(),
                            id: v.id.clone(),
                            summary: truncate(v.summary.as_deref().unwrap_or("-"), 50),
                            fixed_in: v.fixed_version.clone().unwrap_or_else(|| "-".to_string()),
                        },
                    )
                })
            })
            .collect();
        rows.sort_by_key(|(severity, _)| *severity);

        let rows: Vec<VulnRow> = rows.into_iter().map(|(_, row)| row).collect();
        writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
    }

    let findings = result.generic_findings();
    if !findings.is_empty() {
        writeln!(out)?;
        writeln!(out, "Found {} generic findings:", findings.len())?;
        writeln!(out)?;

        let rows: Vec<FindingRow> = findings
            .iter()
            .map(|f| FindingRow {
                severity: format_severity(&f.severity),
                id: f.id.clone(),
                title: truncate(&f.title, 50),
                target: f.target.clone().unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        writeln!(out, "{}", Table::new(rows).with(Style::rounded()))?;
    }

    writeln!(out)?;
    write_summary(&mut out, result)?;

    Ok(out)
}

fn write_summary(out: &mut String, result: &ScanResult) -> std::fmt::Result {
    writeln!(out, "Summary:")?;
    writeln!(out, "  Total packages: {}", result.package_results().len())?;

    let counts = result.source_type_counts();
    if counts.len() > 1 {
        let by_source: Vec<String> = counts
            .iter()
            .map(|(source, count)| format!("{} {}", count, source))
            .collect();
        writeln!(out, "  By source: {}", by_source.join(", "))?;
    }

    if result.total_vulnerabilities() > 0 {
        writeln!(
            out,
            "  Vulnerabilities: {} across {} packages",
            result.total_vulnerabilities(),
            result.vulnerable_packages().count()
        )?;
    }

    Ok(())
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Medium => "\x1b[33mMEDIUM\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
        Severity::Unknown => "UNKNOWN".to_string(),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn format_value(value: &str) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value.to_string()
    }
}
