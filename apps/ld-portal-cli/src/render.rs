//! Plain-text tables and KPI cards.

use std::io::{self, Write};

use chrono::{DateTime, Utc};
use colored::Colorize;
use ld_portal_sdk::constants::NOT_SPECIFIED;
use ld_portal_sdk::{CustomerRequest, DEMO_ACTIVE, DEMO_EXPIRED, DemoAccount, Intern, Notification};
use ldp_query::Stats;

fn or_unset(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or(NOT_SPECIFIED)
}

fn date(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_owned(), |t| t.format("%Y-%m-%d").to_string())
}

fn id(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| v.to_string())
}

fn header(out: &mut dyn Write, line: &str) -> io::Result<()> {
    writeln!(out, "{}", line.bold())
}

pub fn requests(out: &mut dyn Write, rows: &[&CustomerRequest]) -> io::Result<()> {
    header(
        out,
        &format!(
            "{:>5}  {:<24} {:<22} {:<12} {:<22} {:>9} {:<10}",
            "ID", "CUSTOMER", "COMPANY", "STATUS", "INDUSTRY", "DASHBOARDS", "CREATED"
        ),
    )?;
    for r in rows {
        writeln!(
            out,
            "{:>5}  {:<24} {:<22} {:<12} {:<22} {:>4}/{:<4} {:<10}",
            r.id,
            r.full_name(),
            r.company,
            r.status,
            or_unset(r.industry_domain.as_deref()),
            r.dashboards_delivered.unwrap_or(0),
            r.dashboards_requested.unwrap_or(0),
            date(r.created_at),
        )?;
    }
    writeln!(out, "{} record(s)", rows.len())
}

pub fn demos(out: &mut dyn Write, rows: &[&DemoAccount], now: DateTime<Utc>) -> io::Result<()> {
    header(
        out,
        &format!(
            "{:>5}  {:<24} {:<22} {:<18} {:<8} {:>9} {:>7}",
            "ID", "CONTACT", "COMPANY", "USERNAME", "STATE", "DAYS LEFT", "INTERN"
        ),
    )?;
    for d in rows {
        let state = if d.is_effectively_active(now) {
            DEMO_ACTIVE
        } else {
            DEMO_EXPIRED
        };
        let days = d
            .days_remaining(now)
            .map_or_else(|| "-".to_owned(), |n| n.to_string());
        writeln!(
            out,
            "{:>5}  {:<24} {:<22} {:<18} {:<8} {:>9} {:>7}",
            d.id,
            format!("{} {}", d.first_name, d.last_name).trim(),
            d.company,
            d.username,
            state,
            days,
            id(d.assigned_intern_id),
        )?;
    }
    writeln!(out, "{} record(s)", rows.len())
}

pub fn interns(out: &mut dyn Write, rows: &[&Intern]) -> io::Result<()> {
    header(
        out,
        &format!(
            "{:>5}  {:<22} {:<22} {:<6} {:>8} {:>9} {:>7}",
            "ID", "NAME", "USERNAME", "TRACK", "ASSIGNED", "COMPLETED", "SUCCESS"
        ),
    )?;
    for i in rows {
        let success = i
            .success_rate
            .map_or_else(|| "-".to_owned(), |rate| format!("{rate:.0}%"));
        writeln!(
            out,
            "{:>5}  {:<22} {:<22} {:<6} {:>8} {:>9} {:>7}",
            i.id, i.name, i.username, i.specialization, i.assigned_count, i.completed_count, success,
        )?;
    }
    writeln!(out, "{} record(s)", rows.len())
}

/// One KPI card per line, in metric order.
pub fn stats(out: &mut dyn Write, stats: &Stats) -> io::Result<()> {
    writeln!(out)?;
    for (name, value) in stats.iter() {
        writeln!(out, "{:<28} {}", name.replace('_', " ").bold(), value)?;
    }
    Ok(())
}

pub fn notifications(out: &mut dyn Write, items: &[Notification], unread: u32) -> io::Result<()> {
    writeln!(out, "{unread} unread")?;
    for n in items {
        let marker = if n.read_status { " " } else { "*" };
        writeln!(
            out,
            "{marker} {:>5}  {:<10} {}: {}",
            n.id,
            date(n.created_at),
            n.title.bold(),
            n.message
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(f: impl FnOnce(&mut dyn Write) -> io::Result<()>) -> String {
        colored::control::set_override(false);
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn request_rows_show_missing_fields_as_placeholders() {
        let request: CustomerRequest = serde_json::from_value(json!({
            "id": 7, "first_name": "Ada", "last_name": "Lovelace",
            "company": "Analytical", "status": "in-progress", "dashboards_requested": 3
        }))
        .unwrap();

        let text = render(|out| requests(out, &[&request]));

        assert!(text.contains("Ada Lovelace"));
        assert!(text.contains("in-progress"));
        assert!(text.contains(NOT_SPECIFIED));
        assert!(text.contains("0/3"));
        assert!(text.ends_with("1 record(s)\n"));
    }

    #[test]
    fn demo_without_expiry_reads_expired() {
        let demo: DemoAccount = serde_json::from_value(json!({
            "id": 2, "company": "Acme", "username": "demo_acme", "is_active": 1
        }))
        .unwrap();

        let text = render(|out| demos(out, &[&demo], Utc::now()));

        assert!(text.contains(DEMO_EXPIRED));
        assert!(!text.contains(&format!(" {DEMO_ACTIVE} ")));
    }

    #[test]
    fn unread_notifications_are_marked() {
        let items: Vec<Notification> = serde_json::from_value(json!([
            {"id": 1, "recipient_type": "admin", "title": "New request", "message": "Acme", "read_status": 0},
            {"id": 2, "recipient_type": "admin", "title": "Old", "message": "Globex", "read_status": 1}
        ]))
        .unwrap();

        let text = render(|out| notifications(out, &items, 1));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "1 unread");
        assert!(lines[1].starts_with('*'));
        assert!(lines[2].starts_with(' '));
    }
}
