//! Tables and chart data derived from one result set.
//!
//! Everything here is a pure function of the ranked records; the terminal and
//! JSON presentation lives in `render`.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::JobRecord;

pub const TOP_SKILLS: usize = 10;
pub const SALARY_BINS: usize = 20;

const SKILL_SEPARATOR: &str = ", ";
const RANGE_SEPARATORS: &[&str] = &[" to ", "–", "—", "-"];

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ApplyLink {
    pub url: String,
}

impl ApplyLink {
    pub fn markdown(&self) -> String {
        format!("[Apply Here]({})", self.url)
    }

    pub fn html(&self) -> String {
        format!("<a href=\"{}\" target=\"_blank\">Apply Here</a>", self.url)
    }
}

/// One table row, in rank order.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct JobRow {
    pub title: String,
    pub location: String,
    pub salary: String,
    pub skills: String,
    pub apply_link: ApplyLink,
}

/// A labelled count, used for every categorical chart.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct SalaryBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct SalaryHistogram {
    pub bins: Vec<SalaryBin>,
    /// Salaries that did not read as a number or a numeric range.
    pub unparsed: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct InsightReport {
    pub table: Vec<JobRow>,
    pub skills: Vec<Bucket>,
    pub salary: SalaryHistogram,
    pub locations: Vec<Bucket>,
    pub categories: Option<Vec<Bucket>>,
}

impl InsightReport {
    pub fn from_records(records: &[JobRecord]) -> Self {
        Self {
            table: job_table(records),
            skills: skill_distribution(records, TOP_SKILLS),
            salary: salary_histogram(records, SALARY_BINS),
            locations: location_breakdown(records),
            categories: category_breakdown(records),
        }
    }
}

pub fn job_table(records: &[JobRecord]) -> Vec<JobRow> {
    records
        .iter()
        .map(|record| JobRow {
            title: record.title.clone(),
            location: record.location.clone(),
            salary: record.salary.clone(),
            skills: record.skills.clone(),
            apply_link: ApplyLink { url: record.job_url.clone() },
        })
        .collect()
}

/// Most frequent skills across all records, most common first.
pub fn skill_distribution(records: &[JobRecord], limit: usize) -> Vec<Bucket> {
    let skills = records
        .iter()
        .flat_map(|record| record.skills.split(SKILL_SEPARATOR))
        .filter(|skill| !skill.is_empty());

    let mut buckets = count_buckets(skills);
    buckets.truncate(limit);
    buckets
}

pub fn location_breakdown(records: &[JobRecord]) -> Vec<Bucket> {
    count_buckets(records.iter().map(|record| record.location.as_str()))
}

/// Only available when every record carries a category.
pub fn category_breakdown(records: &[JobRecord]) -> Option<Vec<Bucket>> {
    if records.is_empty() {
        return None;
    }
    let categories: Option<Vec<&str>> = records
        .iter()
        .map(|record| record.category.as_deref())
        .collect();
    categories.map(|labels| count_buckets(labels.into_iter()))
}

pub fn salary_histogram(records: &[JobRecord], bins: usize) -> SalaryHistogram {
    let mut values = Vec::with_capacity(records.len());
    let mut unparsed = 0;
    for record in records {
        match parse_salary(&record.salary) {
            Some(value) => values.push(value),
            None => {
                unparsed += 1;
            }
        }
    }

    if values.is_empty() || bins == 0 {
        return SalaryHistogram {
            bins: Vec::new(),
            unparsed,
        };
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if max > min { (max - min) / (bins as f64) } else { 1.0 };

    let mut histogram: Vec<SalaryBin> = (0..bins)
        .map(|i| SalaryBin {
            lower: min + (i as f64) * width,
            upper: min + ((i + 1) as f64) * width,
            count: 0,
        })
        .collect();
    for value in values {
        let slot = (((value - min) / width).floor() as usize).min(bins - 1);
        histogram[slot].count += 1;
    }

    SalaryHistogram {
        bins: histogram,
        unparsed,
    }
}

/// Reads a scraped salary as a number.
///
/// Accepts `85000`, `$85,000`, `85k` and ranges such as `$80k - $90k`
/// (resolved to the midpoint). Anything else is `None`.
pub fn parse_salary(raw: &str) -> Option<f64> {
    let text = raw.trim().to_lowercase();
    if text.is_empty() {
        return None;
    }
    for separator in RANGE_SEPARATORS {
        if let Some((low, high)) = text.split_once(separator) {
            let low = parse_amount(low)?;
            let high = parse_amount(high)?;
            let midpoint = (low + high) / 2.0;
            return midpoint.is_finite().then_some(midpoint);
        }
    }
    parse_amount(&text)
}

fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '$' | '€' | '£' | ','))
        .collect();
    let (digits, scale) = match cleaned.strip_suffix('k') {
        Some(digits) => (digits, 1000.0),
        None => (cleaned.as_str(), 1.0),
    };
    let value: f64 = digits.parse().ok()?;
    let value = value * scale;
    value.is_finite().then_some(value)
}

// Counts in first-seen order, then a stable sort by count so ties keep it.
fn count_buckets<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<Bucket> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();
    for label in labels {
        match positions.get(label) {
            Some(&position) => {
                buckets[position].count += 1;
            }
            None => {
                positions.insert(label, buckets.len());
                buckets.push(Bucket {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }
    buckets.sort_by(|a, b| b.count.cmp(&a.count));
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::job;

    fn with_salary(mut record: JobRecord, salary: &str) -> JobRecord {
        record.salary = salary.to_string();
        record
    }

    fn with_category(mut record: JobRecord, category: &str) -> JobRecord {
        record.category = Some(category.to_string());
        record
    }

    #[test]
    fn test_skill_counts_with_equal_weight() {
        let records = vec![
            job("A", "Remote", "Python, SQL"),
            job("B", "Remote", "Python, AWS"),
            job("C", "Remote", "SQL, AWS")
        ];

        let skills = skill_distribution(&records, TOP_SKILLS);
        let counts: HashMap<&str, usize> = skills
            .iter()
            .map(|b| (b.label.as_str(), b.count))
            .collect();
        assert_eq!(counts, HashMap::from([("Python", 2), ("SQL", 2), ("AWS", 2)]));
        // Ties keep first-seen order.
        let labels: Vec<&str> = skills
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Python", "SQL", "AWS"]);
    }

    #[test]
    fn test_skill_distribution_is_idempotent_and_capped() {
        let records: Vec<JobRecord> = (0..15)
            .map(|i| {
                let skills = (0..=i)
                    .map(|s| format!("Skill{}", s))
                    .collect::<Vec<_>>()
                    .join(", ");
                job("Engineer", "Remote", &skills)
            })
            .collect();

        let first = skill_distribution(&records, TOP_SKILLS);
        let second = skill_distribution(&records, TOP_SKILLS);
        assert_eq!(first, second);
        assert_eq!(first.len(), TOP_SKILLS);
        assert_eq!(first[0], Bucket { label: "Skill0".to_string(), count: 15 });
        assert!(first.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn test_skills_split_on_literal_separator_only() {
        let records = vec![job("A", "Remote", "Python,SQL, ,Go"), job("B", "Remote", "")];
        let skills = skill_distribution(&records, TOP_SKILLS);
        let labels: Vec<&str> = skills
            .iter()
            .map(|b| b.label.as_str())
            .collect();
        assert_eq!(labels, vec!["Python,SQL", ",Go"]);
    }

    #[test]
    fn test_location_buckets_partition_results() {
        let records = vec![
            job("A", "New York", "Python"),
            job("B", "new york", "Python"),
            job("C", "New York", "Python"),
            job("D", "Austin", "Python")
        ];

        let locations = location_breakdown(&records);
        assert_eq!(locations.len(), 3, "Case variants are distinct buckets");
        assert_eq!(locations[0], Bucket { label: "New York".to_string(), count: 2 });
        assert_eq!(
            locations
                .iter()
                .map(|b| b.count)
                .sum::<usize>(),
            records.len()
        );
    }

    #[test]
    fn test_category_breakdown_requires_every_record() {
        let records = vec![
            with_category(job("A", "Remote", "Python"), "Data"),
            with_category(job("B", "Remote", "Python"), "Engineering"),
            with_category(job("C", "Remote", "Python"), "Data")
        ];
        let categories = category_breakdown(&records).expect("all records have a category");
        assert_eq!(
            categories
                .iter()
                .map(|b| b.count)
                .sum::<usize>(),
            3
        );
        assert_eq!(categories[0], Bucket { label: "Data".to_string(), count: 2 });

        let mut partial = records.clone();
        partial.push(job("D", "Remote", "Python"));
        assert_eq!(category_breakdown(&partial), None);
        assert_eq!(category_breakdown(&[]), None);
    }

    #[test]
    fn test_parse_salary_forms() {
        assert_eq!(parse_salary("85000"), Some(85000.0));
        assert_eq!(parse_salary(" $85,000 "), Some(85000.0));
        assert_eq!(parse_salary("120K"), Some(120000.0));
        assert_eq!(parse_salary("$80k - $90k"), Some(85000.0));
        assert_eq!(parse_salary("100000 to 120000"), Some(110000.0));
        assert_eq!(parse_salary("Competitive"), None);
        assert_eq!(parse_salary("NaN"), None);
        assert_eq!(parse_salary("1e308k"), None);
        assert_eq!(parse_salary("1e308 - 1.7e308"), None);
        assert_eq!(parse_salary(""), None);
    }

    #[test]
    fn test_salary_histogram_bins_and_unparsed() {
        let records = vec![
            with_salary(job("A", "Remote", "Python"), "100000"),
            with_salary(job("B", "Remote", "Python"), "$200,000"),
            with_salary(job("C", "Remote", "Python"), "150k"),
            with_salary(job("D", "Remote", "Python"), "Negotiable")
        ];

        let histogram = salary_histogram(&records, SALARY_BINS);
        assert_eq!(histogram.bins.len(), SALARY_BINS);
        assert_eq!(histogram.unparsed, 1);
        assert_eq!(histogram.bins[0].count, 1);
        assert_eq!(histogram.bins[10].count, 1);
        assert_eq!(histogram.bins[SALARY_BINS - 1].count, 1, "Max lands in the last bin");
        assert_eq!(
            histogram.bins
                .iter()
                .map(|b| b.count)
                .sum::<usize>() + histogram.unparsed,
            records.len()
        );
    }

    #[test]
    fn test_salary_histogram_degenerate_inputs() {
        let same = vec![
            with_salary(job("A", "Remote", "Python"), "90000"),
            with_salary(job("B", "Remote", "Python"), "90000")
        ];
        let histogram = salary_histogram(&same, SALARY_BINS);
        assert_eq!(histogram.bins[0].count, 2);

        let histogram = salary_histogram(&same, 0);
        assert!(histogram.bins.is_empty());
        assert_eq!(histogram.unparsed, 0, "Parsed salaries are not unparsed");

        let none = vec![job("A", "Remote", "Python")];
        let histogram = salary_histogram(&none, SALARY_BINS);
        assert!(histogram.bins.is_empty());
        assert_eq!(histogram.unparsed, 1);
    }

    #[test]
    fn test_table_keeps_rank_order_and_links() {
        let records = vec![job("First", "Remote", "Python"), job("Second", "Austin", "SQL")];
        let table = job_table(&records);
        assert_eq!(table[0].title, "First");
        assert_eq!(table[1].apply_link.markdown(), "[Apply Here](https://jobs.example/second)");
        assert_eq!(
            table[1].apply_link.html(),
            "<a href=\"https://jobs.example/second\" target=\"_blank\">Apply Here</a>"
        );
    }
}
