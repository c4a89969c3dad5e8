/// Usage report command handler
use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, NaiveDate};
use procwatch_core::{usage_monitor::format_hours, MonitorConfig};
use procwatch_storage::{DayUsage, UsageLedger};
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct DayRow {
    #[tabled(rename = "Day")]
    day: String,
    #[tabled(rename = "Hours")]
    hours: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct UsageReport {
    process: String,
    date: NaiveDate,
    day_seconds: i64,
    month_seconds: i64,
    days: Vec<DayUsage>,
}

pub fn show_usage(config: &MonitorConfig, date: Option<&str>, json: bool) -> Result<()> {
    let day = parse_date(date)?;
    let ledger = UsageLedger::open(config.usage.store_file.clone())?;
    let report = build_report(&ledger, &config.monitor.process_name, day)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn parse_date(input: Option<&str>) -> Result<NaiveDate> {
    match input {
        None => Ok(Local::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD")),
    }
}

fn build_report(ledger: &UsageLedger, process: &str, day: NaiveDate) -> Result<UsageReport> {
    Ok(UsageReport {
        process: process.to_string(),
        date: day,
        day_seconds: ledger.usage_for_day(day)?.num_seconds(),
        month_seconds: ledger.usage_for_month(day)?.num_seconds(),
        days: ledger.daily_usage_for_month(day)?,
    })
}

fn print_report(report: &UsageReport) {
    println!("\nUsage of {}", report.process);
    println!(
        "  {}: {} hours",
        report.date,
        format_hours(Duration::seconds(report.day_seconds))
    );
    println!(
        "  {}-{:02}: {} hours",
        report.date.year(),
        report.date.month(),
        format_hours(Duration::seconds(report.month_seconds))
    );

    if report.days.is_empty() {
        println!("\nNo usage recorded this month.");
        return;
    }

    let rows: Vec<DayRow> = report
        .days
        .iter()
        .map(|d| DayRow {
            day: d.day.to_string(),
            hours: format_hours(d.duration()),
        })
        .collect();
    println!("\n{}", Table::new(rows));
}
