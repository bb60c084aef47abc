use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use shared_ai::Classification;

use crate::models::Detection;
use crate::services::catalog::{find_model, DEFAULT_MODEL};

pub const DEFAULT_DETECTION_CONFIDENCE: u32 = 50;
pub const DEFAULT_DETECTION_REASONING: &str = "Auto-detected based on image analysis";
pub const DEFAULT_FINDING: &str = "Medical Analysis Completed";
const DEFAULT_FINDING_SCORE: f64 = 0.65;
const PRIMARY_ONLY_SCORE: f64 = 0.75;
const UNSCORED_FINDING: f64 = 0.5;

fn compile(pattern: &str) -> Option<Regex> {
    Regex::new(pattern).ok()
}

static TYPE_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"TYPE:\s*(\w+)"));
static CONFIDENCE_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"CONFIDENCE:\s*(\d+)"));
static REASONING_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"REASONING:\s*(.+)"));

static FINDINGS_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)FINDINGS:"));
static PRIMARY_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)PRIMARY_DIAGNOSIS:"));
static PRIMARY_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)PRIMARY_DIAGNOSIS:\s*(.*)"));
static FINDING_LINE: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"- (.*?):\s*(\d+)%"));
static PERCENT: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(\d+)%"));
static PAREN_PERCENT: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"\((\d+)%\)"));
static EXPLANATION_HEADER: LazyLock<Option<Regex>> = LazyLock::new(|| compile(r"(?i)EXPLANATION:"));
static RECOMMENDATIONS_HEADER: LazyLock<Option<Regex>> =
    LazyLock::new(|| compile(r"(?i)RECOMMENDATIONS:"));

fn capture<'t>(re: &LazyLock<Option<Regex>>, text: &'t str) -> Option<&'t str> {
    re.as_ref()?.captures(text)?.get(1).map(|m| m.as_str())
}

/// Text after `start`, up to `end` when present.
fn section<'t>(
    text: &'t str,
    start: &LazyLock<Option<Regex>>,
    end: Option<&LazyLock<Option<Regex>>>,
) -> Option<&'t str> {
    let header = start.as_ref()?.find(text)?;
    let rest = &text[header.end()..];
    let stop = end
        .and_then(|re| re.as_ref())
        .and_then(|re| re.find(rest))
        .map(|m| m.start())
        .unwrap_or(rest.len());
    Some(&rest[..stop])
}

fn percent_score(digits: &str) -> f64 {
    digits.parse::<f64>().map(|n| n / 100.0).unwrap_or(0.0)
}

/// Parse the `TYPE/CONFIDENCE/REASONING` reply of the auto-detection prompt.
pub fn parse_detection(text: &str) -> Detection {
    let detected_type = capture(&TYPE_LINE, text)
        .map(str::to_lowercase)
        .and_then(|t| find_model(&t))
        .map(|m| m.key)
        .unwrap_or(DEFAULT_MODEL);

    let confidence = capture(&CONFIDENCE_LINE, text)
        .map(|digits| digits.parse::<u64>().map_or(100, |c| c.min(100) as u32))
        .unwrap_or(DEFAULT_DETECTION_CONFIDENCE);

    let reasoning = capture(&REASONING_LINE, text)
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .unwrap_or(DEFAULT_DETECTION_REASONING)
        .to_string();

    Detection {
        detected_type,
        confidence,
        reasoning,
    }
}

fn parse_finding_line(line: &str) -> Option<Classification> {
    if let Some(caps) = FINDING_LINE.as_ref().and_then(|re| re.captures(line)) {
        return Some(Classification {
            label: caps[1].trim().to_string(),
            score: percent_score(&caps[2]),
        });
    }

    let stripped = line.replacen('-', "", 1);
    let mut parts = stripped.trim().split(':');
    let label = parts.next()?.trim();
    let detail = parts.next()?;
    let score = capture(&PERCENT, detail)
        .map(percent_score)
        .unwrap_or(UNSCORED_FINDING);

    Some(Classification {
        label: label.to_string(),
        score,
    })
}

fn parse_primary_diagnosis(text: &str) -> Option<Classification> {
    let primary = capture(&PRIMARY_LINE, text)?;
    let score = capture(&PAREN_PERCENT, primary)
        .map(percent_score)
        .unwrap_or(PRIMARY_ONLY_SCORE);
    let label = match PAREN_PERCENT.as_ref() {
        Some(re) => re.replace(primary, "").trim().to_string(),
        None => primary.trim().to_string(),
    };

    if label.is_empty() {
        return None;
    }
    Some(Classification { label, score })
}

/// Parse the findings reply into scored labels, highest first.
pub fn parse_findings(text: &str) -> Vec<Classification> {
    let mut findings: Vec<Classification> = section(text, &FINDINGS_HEADER, Some(&PRIMARY_HEADER))
        .map(|block| {
            block
                .lines()
                .filter(|line| line.trim().starts_with('-'))
                .filter_map(parse_finding_line)
                .collect()
        })
        .unwrap_or_default();

    if findings.is_empty() {
        findings.extend(parse_primary_diagnosis(text));
    }

    if findings.is_empty() {
        findings.push(Classification {
            label: DEFAULT_FINDING.to_string(),
            score: DEFAULT_FINDING_SCORE,
        });
    }

    for finding in &mut findings {
        finding.score = finding.score.clamp(0.0, 1.0);
    }
    findings.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    findings
}

/// `(explanation, recommendations)` sections, each `None` when missing or blank.
pub fn parse_explanation(text: &str) -> (Option<String>, Option<String>) {
    let non_blank = |s: &str| {
        let s = s.trim();
        (!s.is_empty()).then(|| s.to_string())
    };

    let explanation = section(text, &EXPLANATION_HEADER, Some(&RECOMMENDATIONS_HEADER)).and_then(non_blank);
    let recommendations = section(text, &RECOMMENDATIONS_HEADER, None).and_then(non_blank);
    (explanation, recommendations)
}
