//! Terminal and JSON presentation of a search page.

use std::fmt::Write;

use crate::app::{ Narrative, Page };
use crate::insights::{ Bucket, InsightReport, JobRow, SalaryHistogram };

pub const NO_RESULTS: &str = "⚠️ No jobs found. Try a different keyword.";
pub const MISSING_KEY: &str = "⚠️ Enter an OpenAI API Key to generate AI insights.";

const BAR_WIDTH: usize = 30;

pub fn render_json(page: &Page) -> serde_json::Result<String> {
    serde_json::to_string_pretty(page)
}

pub fn render_text(page: &Page) -> String {
    let mut out = String::new();
    let insights = match (&page.insights, page.is_empty()) {
        (Some(insights), false) => insights,
        _ => {
            out.push_str(NO_RESULTS);
            out.push('\n');
            return out;
        }
    };

    let _ = writeln!(out, "📌 Top {} Jobs for '{}'\n", page.results.len(), page.query);
    out.push_str(&markdown_table(&insights.table));

    let _ = writeln!(out, "\n📊 Job Market Insights");
    out.push_str(&charts(insights));

    match &page.narrative {
        Narrative::Summary { summary } => {
            let _ = writeln!(out, "\n📢 AI-Powered Job Market Analysis\n\n{}", summary);
        }
        Narrative::MissingCredential => {
            let _ = writeln!(out, "\n{}", MISSING_KEY);
        }
        Narrative::NoResults => {}
    }
    out
}

pub fn markdown_table(rows: &[JobRow]) -> String {
    let mut out = String::from(
        "| Title | Location | Salary | Skills | Apply Link |\n|---|---|---|---|---|\n"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} |",
            cell(&row.title),
            cell(&row.location),
            cell(&row.salary),
            cell(&row.skills),
            row.apply_link.markdown()
        );
    }
    out
}

fn charts(insights: &InsightReport) -> String {
    let mut out = String::new();

    let total: usize = insights.skills
        .iter()
        .map(|b| b.count)
        .sum();
    let _ = writeln!(out, "\nTop 10 In-Demand Skills");
    for bucket in &insights.skills {
        let share = if total == 0 { 0.0 } else { ((bucket.count as f64) * 100.0) / (total as f64) };
        let _ = writeln!(
            out,
            "  {:<24} {} {:.1}%",
            bucket.label,
            bar(bucket.count, total),
            share
        );
    }

    let _ = writeln!(out, "\nSalary Distribution");
    out.push_str(&salary_chart(&insights.salary));

    let _ = writeln!(out, "\nJob Locations Breakdown");
    out.push_str(&bucket_chart(&insights.locations));

    if let Some(categories) = &insights.categories {
        let _ = writeln!(out, "\nJob Categories Breakdown");
        out.push_str(&bucket_chart(categories));
    }
    out
}

fn bucket_chart(buckets: &[Bucket]) -> String {
    let max = buckets
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for bucket in buckets {
        let _ = writeln!(out, "  {:<24} {} {}", bucket.label, bar(bucket.count, max), bucket.count);
    }
    out
}

fn salary_chart(histogram: &SalaryHistogram) -> String {
    let max = histogram.bins
        .iter()
        .map(|b| b.count)
        .max()
        .unwrap_or(0)
        .max(histogram.unparsed);
    let mut out = String::new();
    for bin in &histogram.bins {
        let label = format!("${} - ${}", amount(bin.lower), amount(bin.upper));
        let _ = writeln!(out, "  {:<24} {} {}", label, bar(bin.count, max), bin.count);
    }
    if histogram.unparsed > 0 {
        let _ = writeln!(
            out,
            "  {:<24} {} {}",
            "unknown",
            bar(histogram.unparsed, max),
            histogram.unparsed
        );
    }
    out
}

fn bar(count: usize, max: usize) -> String {
    if max == 0 {
        return String::new();
    }
    "█".repeat((count * BAR_WIDTH).div_ceil(max))
}

// Whole currency units with thousands separators.
fn amount(value: f64) -> String {
    let digits = format!("{:.0}", value.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if value < 0.0 { format!("-{}", grouped) } else { grouped }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace(['\r', '\n'], " ")
}
