//! Post-processing of generated report markdown: strips injected advertising and
//! reports structural gaps. Cleaning never fails; problems surface as warnings.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::warn;

/// Advertising blocks some hosted models append, matched in order.
static AD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"---\s*\nCreate professional 3D home designs easily with Homestyler's intuitive design platform\.\s*\[Learn more\]\(https://pollinations\.ai/redirect/\d+\)",
        r"Create professional 3D home designs.*?Homestyler.*?\[Learn more\].*?\)",
        r"Homestyler.*?intuitive design platform.*?\[Learn more\].*?\)",
        r"\[.*?\]\(https://pollinations\.ai/redirect/\d+\)",
        r"https://pollinations\.ai/redirect/\d+",
        r"Wren AI.*?\[.*?\]\(http.*?\)",
        r"\[.*?Wren.*?\]\(http.*?\)",
        r"---\s*\n.*?\[Learn more\]\(http.*?\)",
        r"\n\n---\s*\n.*?http.*?\n",
        r"\n---\s*\n.*?\n",
        r"\(https?://.*?pollinations\.ai.*?\)",
    ]
    .into_iter()
    .map(|pattern| Regex::new(pattern).expect("valid ad pattern"))
    .collect()
});

static TRAILING_RULE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n-{3,}\s*\z").expect("valid trailing rule pattern"));

static NEXT_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"## [A-Za-z]").expect("valid heading pattern"));

static BENCHMARK_TIERS: Lazy<[(&'static str, Regex); 3]> = Lazy::new(|| {
    [
        ("Dabbler", case_insensitive("### Dabbler Tier")),
        ("Enabler", case_insensitive("### Enabler Tier")),
        ("Leader", case_insensitive("### Leader Tier")),
    ]
});

static RESOURCE_SUBSECTIONS: Lazy<[(&'static str, Regex); 3]> = Lazy::new(|| {
    [
        (
            "Meeting Agenda",
            case_insensitive("### Sample AI Goal-Setting Meeting Agenda"),
        ),
        ("Example Prompts", case_insensitive("### Example Prompts")),
        ("Data Audit Process", case_insensitive("### Basic AI Data Audit")),
    ]
});

const ENDING_SECTIONS: [&str; 5] = [
    "## Your Personalized AI Learning Path",
    "## Personalized AI Learning Path",
    "## Learning Path",
    "## Resources",
    "## Next Steps",
];

const REQUIRED_SECTIONS: [(&str, &[&str]); 8] = [
    ("Overall Tier", &["## Overall Tier:"]),
    ("Key Findings", &["## Key Findings"]),
    ("Strengths", &["**Strengths:**"]),
    ("Weaknesses", &["**Weaknesses:**"]),
    ("Strategic Action Plan", &["## Strategic Action Plan"]),
    ("Getting Started & Resources", &["## Getting Started & Resources"]),
    ("Illustrative Benchmarks", &["## Illustrative Benchmarks"]),
    (
        "Learning Path",
        &[
            "## Your Personalized AI Learning Path",
            "## Personalized AI Learning Path",
            "## Learning Path",
        ],
    ),
];

const MIN_ENDING_CHARS: usize = 200;
const MIN_SECTION_CHARS: usize = 100;
const TRAILING_RULE_WINDOW: usize = 100;
const STANDALONE_URL_MAX_CHARS: usize = 100;

/// Substrings that betray advertising left over after a first cleaning pass.
const RESIDUAL_AD_MARKERS: [&str; 6] = [
    "pollinations.ai",
    "homestyler",
    "wren",
    "Learn more",
    "http",
    "Create professional",
];

fn case_insensitive(literal: &str) -> Regex {
    Regex::new(&format!("(?i){}", regex::escape(literal))).expect("valid subsection pattern")
}

/// Structural problem found in a report. Logged, never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SanitizationWarning {
    MissingLearningPath,
    TruncatedLearningPath { section: &'static str },
    MissingSections(Vec<&'static str>),
    ThinSection(&'static str),
    MissingBenchmarkTiers(Vec<&'static str>),
    MissingResourceSubsections(Vec<&'static str>),
}

impl fmt::Display for SanitizationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingLearningPath => {
                write!(f, "report does not end with an expected learning path section")
            }
            Self::TruncatedLearningPath { section } => {
                write!(f, "section '{section}' may be truncated")
            }
            Self::MissingSections(names) => {
                write!(f, "required sections missing: {}", names.join(", "))
            }
            Self::ThinSection(name) => {
                write!(f, "section '{name}' may be incomplete or have insufficient content")
            }
            Self::MissingBenchmarkTiers(tiers) => {
                write!(f, "benchmarks missing tier sections: {}", tiers.join(", "))
            }
            Self::MissingResourceSubsections(names) => {
                write!(f, "resources missing subsections: {}", names.join(", "))
            }
        }
    }
}

/// Stateless cleaner for generated report markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportSanitizer;

impl ReportSanitizer {
    pub fn new() -> Self {
        Self
    }

    /// Removes advertising and stray links, logs structural warnings, and trims the result.
    ///
    /// The aggressive line filters run when `aggressive` is set or when any ad pattern fired.
    pub fn sanitize(&self, markdown: &str, aggressive: bool) -> String {
        let mut cleaned = markdown.to_string();
        for pattern in AD_PATTERNS.iter() {
            cleaned = pattern.replace_all(&cleaned, "").into_owned();
        }

        if aggressive || cleaned.len() != markdown.len() {
            cleaned = strip_promotional_lines(&cleaned);
        }

        for warning in self.inspect(&cleaned) {
            warn!(%warning, "report structure check");
        }

        TRAILING_RULE.replace_all(&cleaned, "").trim().to_string()
    }

    /// Structural checks only; the markdown is not modified.
    pub fn inspect(&self, markdown: &str) -> Vec<SanitizationWarning> {
        let mut warnings = Vec::new();

        match ENDING_SECTIONS
            .iter()
            .find_map(|section| markdown.find(*section).map(|index| (*section, index)))
        {
            Some((section, index)) if markdown[index..].chars().count() < MIN_ENDING_CHARS => {
                warnings.push(SanitizationWarning::TruncatedLearningPath { section });
            }
            Some(_) => {}
            None => warnings.push(SanitizationWarning::MissingLearningPath),
        }

        let missing: Vec<&'static str> = REQUIRED_SECTIONS
            .iter()
            .filter(|(_, markers)| section_start(markdown, markers).is_none())
            .map(|(name, _)| *name)
            .collect();

        if !missing.is_empty() {
            warnings.push(SanitizationWarning::MissingSections(missing));
            for (name, markers) in REQUIRED_SECTIONS {
                if let Some(start) = section_start(markdown, markers) {
                    if section_length(markdown, start) < MIN_SECTION_CHARS {
                        warnings.push(SanitizationWarning::ThinSection(name));
                    }
                }
            }
        }

        if markdown.contains("## Illustrative Benchmarks") {
            let absent = absent_labels(markdown, BENCHMARK_TIERS.iter());
            if !absent.is_empty() {
                warnings.push(SanitizationWarning::MissingBenchmarkTiers(absent));
            }
        }

        if markdown.contains("## Getting Started & Resources") {
            let absent = absent_labels(markdown, RESOURCE_SUBSECTIONS.iter());
            if !absent.is_empty() {
                warnings.push(SanitizationWarning::MissingResourceSubsections(absent));
            }
        }

        warnings
    }

    /// True when the text still carries something that looks like an advertisement or link.
    pub fn has_residual_ads(&self, markdown: &str) -> bool {
        RESIDUAL_AD_MARKERS
            .iter()
            .any(|marker| markdown.contains(*marker))
    }
}

fn strip_promotional_lines(markdown: &str) -> String {
    let mut text = markdown;
    if let Some(rule) = text.rfind("\n---") {
        if rule > 0
            && rule + TRAILING_RULE_WINDOW > text.len()
            && !text[rule..].contains("## ")
        {
            text = &text[..rule];
        }
    }

    text.split('\n')
        .filter(|line| !(line.contains("Learn more") && line.contains("http")))
        .filter(|line| !is_standalone_url_or_promo(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_standalone_url_or_promo(line: &str) -> bool {
    let trimmed = line.trim();
    let standalone =
        trimmed.starts_with("http") && trimmed.chars().count() < STANDALONE_URL_MAX_CHARS;
    let promotional = line.contains("http")
        && ["promotion", "discount", "special offer"]
            .iter()
            .any(|word| line.contains(*word));
    standalone || promotional
}

fn section_start(markdown: &str, markers: &[&str]) -> Option<usize> {
    markers.iter().filter_map(|marker| markdown.find(*marker)).min()
}

/// Characters from `start` up to the next level-two heading, or the end of the text.
fn section_length(markdown: &str, start: usize) -> usize {
    let body_from = start + 1;
    let end = NEXT_HEADING
        .find(&markdown[body_from..])
        .map(|found| body_from + found.start())
        .unwrap_or(markdown.len());
    markdown[start..end].chars().count()
}

fn absent_labels<'a>(
    markdown: &str,
    checks: impl Iterator<Item = &'a (&'static str, Regex)>,
) -> Vec<&'static str> {
    checks
        .filter(|(_, pattern)| !pattern.is_match(markdown))
        .map(|(label, _)| *label)
        .collect()
}
