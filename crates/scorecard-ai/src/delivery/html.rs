//! Minimal markdown-to-HTML rendering for the printable report.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold pattern"));
static ORDERED_ITEM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\s+(.*)$").expect("valid ordered item pattern"));

const DOCUMENT_TITLE: &str = "AI Efficiency Scorecard";

/// Everything the printable report shows besides the markdown body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReportDocument {
    #[serde(rename = "reportMarkdown")]
    pub report_markdown: String,
    #[serde(rename = "userAITier", default)]
    pub tier: Option<String>,
    #[serde(rename = "finalScore", default)]
    pub final_score: Option<u32>,
    #[serde(rename = "companyName", default)]
    pub company_name: Option<String>,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Paragraph,
    Bullets,
    Numbered,
}

impl Block {
    fn close_tag(self) -> &'static str {
        match self {
            Block::None => "",
            Block::Paragraph => "</p>\n",
            Block::Bullets => "</ul>\n",
            Block::Numbered => "</ol>\n",
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

fn inline(text: &str) -> String {
    BOLD.replace_all(&escape_html(text), "<strong>$1</strong>")
        .into_owned()
}

/// Converts headings, bullet and numbered lines, bold markers, and paragraphs.
/// Anything else passes through as escaped text.
pub fn markdown_to_html(markdown: &str) -> String {
    let mut html = String::new();
    let mut open = Block::None;

    let mut switch_to = |html: &mut String, next: Block| {
        if open != next {
            html.push_str(open.close_tag());
            match next {
                Block::Paragraph => html.push_str("<p>"),
                Block::Bullets => html.push_str("<ul>\n"),
                Block::Numbered => html.push_str("<ol>\n"),
                Block::None => {}
            }
            open = next;
        } else if next == Block::Paragraph {
            html.push_str("<br>\n");
        }
    };

    for line in markdown.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            switch_to(&mut html, Block::None);
            continue;
        }

        let heading_level = trimmed.chars().take_while(|ch| *ch == '#').count();
        if (1..=4).contains(&heading_level) && trimmed[heading_level..].starts_with(' ') {
            switch_to(&mut html, Block::None);
            let text = trimmed[heading_level..].trim();
            html.push_str(&format!(
                "<h{level}>{}</h{level}>\n",
                inline(text),
                level = heading_level
            ));
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            switch_to(&mut html, Block::Bullets);
            html.push_str(&format!("<li>{}</li>\n", inline(item.trim())));
        } else if let Some(captures) = ORDERED_ITEM.captures(trimmed) {
            switch_to(&mut html, Block::Numbered);
            let item = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
            html.push_str(&format!("<li>{}</li>\n", inline(item.trim())));
        } else {
            switch_to(&mut html, Block::Paragraph);
            html.push_str(&inline(trimmed));
        }
    }
    switch_to(&mut html, Block::None);
    html
}

/// Standalone HTML document handed to the PDF service.
pub fn render_report_document(document: &ReportDocument) -> String {
    let mut meta = Vec::new();
    if let Some(company) = document.company_name.as_deref().filter(|name| !name.is_empty()) {
        meta.push(format!("<p class=\"company\">{}</p>", escape_html(company)));
    }
    if let Some(user) = document.user_name.as_deref().filter(|name| !name.is_empty()) {
        meta.push(format!("<p class=\"prepared-for\">Prepared for {}</p>", escape_html(user)));
    }
    if let Some(tier) = document.tier.as_deref().filter(|tier| !tier.is_empty()) {
        meta.push(format!("<p class=\"tier\">AI Tier: {}</p>", escape_html(tier)));
    }
    if let Some(score) = document.final_score {
        meta.push(format!("<p class=\"score\">Final Score: {score}/100</p>"));
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n<style>\n{style}\n</style>\n</head>\n<body>\n<header>\n<h1>{title}</h1>\n{meta}\n</header>\n<main>\n{body}</main>\n</body>\n</html>\n",
        title = DOCUMENT_TITLE,
        style = STYLE,
        meta = meta.join("\n"),
        body = markdown_to_html(&document.report_markdown),
    )
}

const STYLE: &str = "@page { size: A4; margin: 20mm 15mm; }
body { font-family: 'Plus Jakarta Sans', Helvetica, Arial, sans-serif; color: #1f2937; line-height: 1.5; }
header { border-bottom: 2px solid #103138; margin-bottom: 16px; }
h1, h2, h3 { color: #103138; }
.tier, .score { font-weight: bold; }";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_headings_lists_and_bold() {
        let html = markdown_to_html(
            "## Key Findings\n**Strengths:**\n- Clear **goals**\n- Data access\n\n1. Audit\n2. Pilot",
        );

        assert!(html.contains("<h2>Key Findings</h2>"));
        assert!(html.contains("<p><strong>Strengths:</strong></p>"));
        assert!(html.contains("<ul>\n<li>Clear <strong>goals</strong></li>\n<li>Data access</li>\n</ul>"));
        assert!(html.contains("<ol>\n<li>Audit</li>\n<li>Pilot</li>\n</ol>"));
    }

    #[test]
    fn escapes_markup_in_text() {
        let html = markdown_to_html("Use <script> & \"quotes\"");
        assert_eq!(html, "<p>Use &lt;script&gt; &amp; &quot;quotes&quot;</p>\n");
    }

    #[test]
    fn document_carries_metadata() {
        let html = render_report_document(&ReportDocument {
            report_markdown: "## Overall Tier: Leader".to_string(),
            tier: Some("Leader".to_string()),
            final_score: Some(88),
            company_name: Some("Acme & Co".to_string()),
            user_name: None,
        });

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>AI Efficiency Scorecard</title>"));
        assert!(html.contains("Acme &amp; Co"));
        assert!(html.contains("Final Score: 88/100"));
        assert!(!html.contains("Prepared for"));
        assert!(html.trim_end().ends_with("</html>"));
    }
}
