//! fabric-report CLI tool
//!
//! Prints the role report written by a running fabric agent as a table.
//!
//! Usage:
//!   fabric-report [report_path]

use std::path::PathBuf;

use fabric_agent::config::DEFAULT_REPORT_PATH;
use fabric_agent::read_report;
use fabric_election::RoleReport;

fn print_usage() {
    eprintln!("fabric-report - Show the fabric roles seen by the local agent");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  fabric-report [report_path]   Print roles and route reflectors");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  FABRIC_REPORT_PATH  Report file (default: {})", DEFAULT_REPORT_PATH);
}

fn report_path(args: &[String]) -> PathBuf {
    args.get(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var("FABRIC_REPORT_PATH").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_REPORT_PATH))
}

fn render(report: &RoleReport) -> String {
    let rows = report.rows();
    let ip_width = rows
        .iter()
        .map(|r| r.node.to_string().len())
        .max()
        .unwrap_or(0)
        .max("System IP".len());
    let layer_width = rows
        .iter()
        .map(|r| r.role.label().len())
        .max()
        .unwrap_or(0)
        .max("Fabric Layer".len());

    let mut out = String::new();
    let rule = format!("+-{}-+-{}-+----+\n", "-".repeat(ip_width), "-".repeat(layer_width));
    out.push_str(&rule);
    out.push_str(&format!(
        "| {:<ip$} | {:<layer$} | RR |\n",
        "System IP",
        "Fabric Layer",
        ip = ip_width,
        layer = layer_width
    ));
    out.push_str(&rule);
    for row in &rows {
        out.push_str(&format!(
            "| {:<ip$} | {:<layer$} | {:<2} |\n",
            row.node.to_string(),
            row.role.label(),
            if row.route_reflector { "*" } else { "" },
            ip = ip_width,
            layer = layer_width
        ));
    }
    out.push_str(&rule);
    out
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if matches!(args.get(1).map(String::as_str), Some("-h" | "--help" | "help")) {
        print_usage();
        std::process::exit(0);
    }
    if args.len() > 2 {
        print_usage();
        std::process::exit(1);
    }

    let path = report_path(&args);
    match read_report(&path) {
        Ok(report) if report.roles.is_empty() => {
            println!("(no roles inferred yet)");
        }
        Ok(report) => {
            print!("{}", render(&report));
        }
        Err(e) => {
            eprintln!("Failed to read {}: {}", path.display(), e);
            eprintln!("Is the fabric-agent running?");
            std::process::exit(1);
        }
    }
}
