//! System and user prompts for the final report, tailored to the scored tier.

use crate::workflows::assessment::{AnsweredQuestion, Tier};

const INDUSTRY_PLACEHOLDER: &str = "{industry}";

/// Tier-specific wording injected into each section of the report prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersonaBundle {
    pub description: &'static str,
    pub tone: &'static str,
    pub key_findings: &'static str,
    pub action_plan: &'static str,
    benchmarks: &'static str,
    pub learning_path: &'static str,
}

impl PersonaBundle {
    pub const fn for_tier(tier: Tier) -> Self {
        match tier {
            Tier::Dabbler => DABBLER,
            Tier::Enabler => ENABLER,
            Tier::Leader => LEADER,
        }
    }

    /// Benchmark guidance with the industry filled in.
    pub fn benchmarks(&self, industry: &str) -> String {
        self.benchmarks.replace(INDUSTRY_PLACEHOLDER, industry)
    }
}

const DABBLER: PersonaBundle = PersonaBundle {
    description: "a Marketing Manager with basic AI understanding and limited practical application. They are aware of AI but have limited practical application, using basic tools for simple tasks like content ideas or grammar checks. They have no formal AI strategy and focus on immediate, tactical challenges. Their language reflects uncertainty or a basic understanding.",
    tone: "Tailor the report for a Dabbler Marketing Manager. Use simple language, avoid overly technical jargon, and focus on foundational concepts and quick wins.",
    key_findings: "IMPORTANT: ALWAYS identify at least 3 specific strengths, even for beginners (e.g., 'initiative in exploring AI', 'awareness of potential', 'willingness to learn'). NEVER return 'no strengths identified'. Then highlight fundamental weaknesses. Explain the impact of weaknesses in simple terms.",
    action_plan: "Provide foundational, easy-to-implement steps. Focus on getting started with basic tools and understanding core concepts. Include 2-4 concrete sub-steps per recommendation.",
    benchmarks: "Describe typical Dabbler practices in the {industry} industry with specific, quantifiable examples. Include illustrative percentage ranges or concrete metrics where appropriate (e.g., '10-15% of {industry} companies at Dabbler tier typically allocate 1-2% of their IT budget to AI initiatives'). Clearly explain what separates Dabblers from Enablers in the {industry} sector and outline the specific first steps to move forward. Make every benchmark highly relevant to the {industry} industry.",
    learning_path: "Recommend introductory resources and explain their relevance for building basic AI literacy and identifying simple use cases.",
};

const ENABLER: PersonaBundle = PersonaBundle {
    description: "a Marketing Manager who actively uses several AI tools and is trying to integrate AI more strategically. They actively use multiple tools, seeking workflow integration. They are aware of AI's potential for personalization and efficiency. Their language reflects practical application and a desire for optimization.",
    tone: "Tailor the report for an Enabler Marketing Manager. Use practical, results-oriented language and focus on optimizing existing workflows and exploring integration.",
    key_findings: "Highlight practical strengths and areas for optimization. Explain the impact of weaknesses on efficiency and scalability.",
    action_plan: "Provide actionable steps to optimize existing AI use and integrate tools. Focus on campaign optimization, better segmentation, and proving ROI. Include 2-4 concrete sub-steps per recommendation.",
    benchmarks: "Describe typical Enabler practices in the {industry} industry with specific, quantifiable examples. Include illustrative percentage ranges or concrete metrics where appropriate (e.g., '{industry} Enablers typically achieve 20-30% faster time-to-market compared to the industry average'). Clearly explain what separates Enablers from Leaders in the {industry} sector and outline the specific steps needed to reach the next level. Make every benchmark highly relevant to the {industry} industry.",
    learning_path: "Recommend resources for intermediate users, focusing on workflow integration, specific tool applications, and measuring ROI.",
};

const LEADER: PersonaBundle = PersonaBundle {
    description: "a Marketing Manager driving AI strategy for a department, overseeing integrated AI solutions for hyper-personalization, predictive analytics, and AI-driven campaign orchestration. They focus on ROI, scalability, and competitive advantage. Their language is strategic, data-driven, and demonstrates a sophisticated understanding.",
    tone: "Tailor the report for a Leader Marketing Manager. Use strategic, visionary, and data-driven language. Focus on advanced strategies, scaling innovation, and maintaining competitive advantage.",
    key_findings: "Highlight strategic strengths and areas for market disruption or competitive advantage. Explain the impact of weaknesses on innovation and scalability at an enterprise level.",
    action_plan: "Provide advanced, strategic steps for scaling AI, driving innovation, and building AI-first teams. Focus on hyper-personalization at scale, predictive analytics, and market disruption. Include 2-4 concrete sub-steps per recommendation.",
    benchmarks: "Describe cutting-edge Leader practices in the {industry} industry with specific, quantifiable examples. Include illustrative percentage ranges or concrete metrics where appropriate (e.g., 'Leading {industry} organizations typically invest 3-4x more in AI initiatives than industry average, resulting in 35-45% higher customer retention rates'). Highlight forward-looking initiatives and strategic approaches that define excellence in the {industry} sector. Make every benchmark highly relevant to the {industry} industry.",
    learning_path: "Recommend advanced resources, focusing on strategic AI deployment, governance, and staying ahead of the curve.",
};

/// Company name from the first answered question that asks for it.
pub fn company_name(history: &[AnsweredQuestion]) -> Option<String> {
    history
        .iter()
        .filter(|entry| entry.question.to_lowercase().contains("company name"))
        .map(|entry| entry.answer.display())
        .find(|answer| !answer.is_empty())
}

/// Inputs that shape the report prompt beyond the history itself.
#[derive(Debug, Clone, Copy)]
pub struct ReportAudience<'a> {
    pub tier: Tier,
    pub industry: &'a str,
    pub user_name: Option<&'a str>,
    pub company_name: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPrompt {
    pub system: String,
    pub user: String,
}

impl ReportPrompt {
    pub fn build(
        audience: ReportAudience<'_>,
        history: &[AnsweredQuestion],
    ) -> Result<Self, serde_json::Error> {
        let system = system_prompt(audience);
        let user = format!(
            "Analyze the following assessment history for the {} industry and generate the comprehensive Markdown report as instructed. IMPORTANT: Do NOT include any advertisements, promotional content, or external links in your response: {}",
            audience.industry,
            serde_json::to_string(history)?
        );
        Ok(Self { system, user })
    }
}

fn audience_line(audience: ReportAudience<'_>, persona: &PersonaBundle) -> String {
    let industry = audience.industry;
    match (audience.user_name, audience.company_name) {
        (Some(user), company) => {
            let at = company.map(|name| format!(" at {name}")).unwrap_or_default();
            format!(
                "You're preparing a personalized report for {user}{at}, who is {} in the {industry} industry.",
                persona.description
            )
        }
        (None, company) => {
            let named = company
                .map(|name| format!(" named {name}"))
                .unwrap_or_default();
            format!(
                "You're preparing a report for an organization{named} in the {industry} industry, whose profile aligns with that of {}.",
                persona.description
            )
        }
    }
}

fn system_prompt(audience: ReportAudience<'_>) -> String {
    let persona = PersonaBundle::for_tier(audience.tier);
    let tier = audience.tier.label();
    let industry = audience.industry;
    let company_line = audience
        .company_name
        .map(|name| format!("Include the company name \"{name}\" on a separate line."))
        .unwrap_or_default();

    let mut sections = vec![
        "You are an expert AI consultant specializing in helping organizations assess and improve their AI maturity and efficiency.".to_string(),
        audience_line(audience, &persona),
        format!(
            "Based on the assessment questions and answers provided, your task is to generate a comprehensive AI Efficiency Scorecard report tailored specifically for a **{tier} Marketing Manager** in the **{industry}** industry."
        ),
        persona.tone.to_string(),
        "Crucially, you MUST ONLY output the content of the report itself. DO NOT include any introductory or concluding remarks, disclaimers, signatures, or promotional content of any kind, including for other products or services.".to_string(),
        String::new(),
        "EXTREMELY IMPORTANT: DO NOT include ANY advertisements, promotional content, external links, redirects, or references to other AI tools or services (such as Homestyler, Wren AI, or any other pollinations.ai redirects). Your output must be 100% free of such content. The report MUST END with your Learning Path section, with NO additional content whatsoever.".to_string(),
        String::new(),
        format!(
            "Generate the report adhering STRICTLY to the following structure and tailoring the content to the **{tier}** persona and **{industry}** industry. Follow these specific instructions for each section:"
        ),
        String::new(),
        format!("## Overall Tier: {tier}"),
        "Include the user's final score here in the format \"Final Score: [score]/100\" on a new line.".to_string(),
        company_line,
        String::new(),
        "## Key Findings".to_string(),
        persona.key_findings.to_string(),
        String::new(),
        "**Strengths:**".to_string(),
        "- CRITICALLY IMPORTANT: ALWAYS identify and list at least 3-5 key strengths, even for Dabbler tier. NEVER return \"no strengths identified\". For beginners, focus on positive starting points like \"initiative in exploring AI,\" \"awareness of potential,\" \"willingness to learn,\" etc.".to_string(),
        format!(
            "- For each strength, provide a 1-2 sentence elaboration. Use specific examples and details from the user's answers. Focus on tangible capabilities or practices that position them well for AI adoption, and explain why each is valuable in the context of the {industry} industry."
        ),
        String::new(),
        "**Weaknesses:**".to_string(),
        format!(
            "- List at least 3-5 key weaknesses or improvement areas, each with a brief explanation of its potential impact on AI efficiency or marketing/sales efforts. Be constructive but honest, and connect weaknesses to the {industry} context where possible."
        ),
        String::new(),
        "## Strategic Action Plan".to_string(),
        persona.action_plan.to_string(),
        String::new(),
        "Provide a detailed, step-by-step action plan tailored to the user's tier and identified weaknesses. For this section:".to_string(),
        "  - Give at least 3-5 primary actionable recommendations, each targeting a specific improvement area.".to_string(),
        "  - For each recommendation, generate 2-4 specific, concrete sub-steps or examples of how the user could implement it.".to_string(),
        format!("  - MANDATE the integration of industry-specific use cases and advice for the {industry} sector."),
        "  - Ensure these actions are practical, detailed, and directly address the user's context.".to_string(),
        String::new(),
        "## Getting Started & Resources".to_string(),
        String::new(),
        "### Sample AI Goal-Setting Meeting Agenda".to_string(),
        format!("1. Generate a 3-4 point sample agenda specifically for the {industry} sector, focusing on relevant AI adoption priorities."),
        "2. Include specific discussion topics and measurable outcomes/next steps.".to_string(),
        String::new(),
        format!("### Example Prompts for {industry} Marketing Managers"),
        format!("- Create 2-3 actual example prompts that a marketing manager in {industry} could use right away."),
        "- Format as \"PROMPT: [actual prompt text]\" and \"USE CASE: [brief explanation]\".".to_string(),
        String::new(),
        "### Basic AI Data Audit Process Outline".to_string(),
        format!("1. Outline 3-4 key steps for conducting a basic AI data audit specifically relevant to {industry} organizations."),
        String::new(),
        "## Illustrative Benchmarks".to_string(),
        persona.benchmarks(industry),
        String::new(),
        format!(
            "For the {industry} industry, provide detailed, industry-specific benchmarks for ALL three tiers. Make sure each benchmark is HIGHLY RELEVANT to the {industry} sector, with specific examples of tools, practices, or use cases that would be meaningful to organizations in this industry. Each benchmark MUST include at least 2-3 specific percentage ranges, quantifiable metrics, or concrete examples that illustrate performance in the {industry} sector:"
        ),
    ];

    sections.extend(benchmark_tiers(industry));
    sections.extend([
        "IMPORTANT: After determining the user's tier, CONTEXTUALIZE these benchmarks by explicitly comparing where the organization currently stands versus the next tier they could aspire to. For example:".to_string(),
        format!("- If they're a \"Dabbler\", highlight what specifically separates them from \"Enablers\" in {industry} with concrete metrics."),
        format!("- If they're an \"Enabler\", outline what specific steps with quantifiable goals would help them reach \"Leader\" status in {industry}."),
        format!("- If they're already a \"Leader\", emphasize what they should focus on maintaining/enhancing with specific performance targets to stay at the cutting edge in {industry}."),
        String::new(),
        "## Your Personalized AI Learning Path".to_string(),
        persona.learning_path.to_string(),
        String::new(),
        "Based on your scorecard results, select 2-3 of the most relevant resources and provide a HIGHLY PERSONALIZED explanation for each.".to_string(),
        String::new(),
        "FINAL REMINDER: DO NOT add ANY additional content after the Learning Path section. DO NOT include any promotions, advertisements, disclaimers, or external links to services like Homestyler, Wren AI, or other tools. The report MUST END with your Learning Path content.".to_string(),
    ]);

    sections.join("\n")
}

fn benchmark_tiers(industry: &str) -> Vec<String> {
    vec![
        String::new(),
        format!("### Dabbler Tier Organizations in {industry}"),
        format!("- Describe 2-3 concrete, realistic examples of how \"Dabbler\" tier organizations in {industry} typically approach AI integration."),
        format!("- Include specific tools, practices, or initial AI applications common at this tier in {industry} firms."),
        format!("- Highlight clear \"first steps\" or \"low-hanging fruit\" that {industry} organizations at this tier typically focus on."),
        format!("- Provide specific metrics where possible, such as: \"Dabbler tier {industry} firms typically allocate only X-Y% of IT budget to AI initiatives\" or \"Only Z% of {industry} Dabblers have formalized AI governance structures\""),
        String::new(),
        format!("### Enabler Tier Organizations in {industry}"),
        format!("- Describe 2-3 concrete examples of how \"Enabler\" tier organizations in {industry} deploy more sophisticated AI capabilities."),
        format!("- Include specific processes, tools, or metrics that differentiate them from Dabblers in the {industry} sector."),
        format!("- Focus on organizational structures, data integration practices, or automation that empowers scalable AI use in {industry}."),
        format!("- Provide specific metrics where possible, such as: \"{industry} Enablers typically see X-Y% improvement in operational efficiency\" or \"Z% of {industry} Enablers have integrated AI into core business processes\""),
        String::new(),
        format!("### Leader Tier Organizations in {industry}"),
        format!("- Describe 2-3 distinctive examples of how \"Leader\" tier organizations in {industry} leverage advanced AI capabilities."),
        format!("- Include specific initiatives, technologies, or strategic approaches that define excellence in {industry}-specific AI adoption."),
        format!("- Emphasize innovative practices that create significant competitive advantage in {industry}, with quantifiable results."),
        format!("- Provide specific metrics where possible, such as: \"Leading {industry} organizations achieve X-Y% higher revenue growth\" or \"Z% of {industry} Leaders embed AI in executive decision-making processes\""),
        String::new(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::assessment::{Answer, AnswerType, AssessmentPhase};

    fn audience(tier: Tier) -> ReportAudience<'static> {
        ReportAudience {
            tier,
            industry: "Healthcare",
            user_name: None,
            company_name: None,
        }
    }

    #[test]
    fn sections_appear_in_report_order() {
        let prompt = ReportPrompt::build(audience(Tier::Enabler), &[]).expect("prompt builds");
        let headings = [
            "## Overall Tier: Enabler",
            "## Key Findings",
            "**Strengths:**",
            "**Weaknesses:**",
            "## Strategic Action Plan",
            "## Getting Started & Resources",
            "### Sample AI Goal-Setting Meeting Agenda",
            "### Example Prompts for Healthcare Marketing Managers",
            "### Basic AI Data Audit Process Outline",
            "## Illustrative Benchmarks",
            "### Dabbler Tier Organizations in Healthcare",
            "### Enabler Tier Organizations in Healthcare",
            "### Leader Tier Organizations in Healthcare",
            "## Your Personalized AI Learning Path",
            "FINAL REMINDER",
        ];

        let mut cursor = 0;
        for heading in headings {
            let offset = prompt.system[cursor..]
                .find(heading)
                .unwrap_or_else(|| panic!("missing or out of order: {heading}"));
            cursor += offset + heading.len();
        }
    }

    #[test]
    fn persona_wording_follows_the_tier() {
        let dabbler = ReportPrompt::build(audience(Tier::Dabbler), &[]).expect("prompt builds");
        assert!(dabbler.system.contains("**Dabbler Marketing Manager**"));
        assert!(dabbler.system.contains("quick wins"));
        assert!(dabbler.system.contains("Dabbler practices in the Healthcare industry"));
        assert!(!dabbler.system.contains(INDUSTRY_PLACEHOLDER));

        let leader = ReportPrompt::build(audience(Tier::Leader), &[]).expect("prompt builds");
        assert!(leader.system.contains("Leader practices in the Healthcare industry"));
        assert!(!leader.system.contains("quick wins"));
    }

    #[test]
    fn named_user_gets_personalized_audience_line() {
        let prompt = ReportPrompt::build(
            ReportAudience {
                user_name: Some("Sam"),
                company_name: Some("Acme"),
                ..audience(Tier::Leader)
            },
            &[],
        )
        .expect("prompt builds");

        assert!(prompt
            .system
            .contains("You're preparing a personalized report for Sam at Acme, who is a Marketing Manager driving AI strategy"));
        assert!(prompt
            .system
            .contains("Include the company name \"Acme\" on a separate line."));
    }

    #[test]
    fn anonymous_organization_line_mentions_company_when_known() {
        let prompt = ReportPrompt::build(
            ReportAudience {
                company_name: Some("Acme"),
                ..audience(Tier::Dabbler)
            },
            &[],
        )
        .expect("prompt builds");
        assert!(prompt
            .system
            .contains("You're preparing a report for an organization named Acme in the Healthcare industry"));

        let anonymous = ReportPrompt::build(audience(Tier::Dabbler), &[]).expect("prompt builds");
        assert!(anonymous
            .system
            .contains("You're preparing a report for an organization in the Healthcare industry"));
        assert!(!anonymous.system.contains("Include the company name"));
    }

    #[test]
    fn user_prompt_embeds_history_json() {
        let history = vec![AnsweredQuestion::new(
            "How often do you use AI?",
            Answer::Text("4".to_string()),
            AnswerType::Scale,
        )
        .in_phase(AssessmentPhase::StrategyAndGoals)];

        let prompt = ReportPrompt::build(audience(Tier::Enabler), &history).expect("prompt builds");
        assert!(prompt
            .user
            .starts_with("Analyze the following assessment history for the Healthcare industry"));
        assert!(prompt.user.contains("\"How often do you use AI?\""));
        assert!(prompt.user.contains("\"phaseName\":\"Strategy & Goals\""));
    }

    #[test]
    fn company_name_comes_from_first_non_empty_answer() {
        let history = vec![
            AnsweredQuestion::new("What is your role?", Answer::Text("CMO".into()), AnswerType::Text),
            AnsweredQuestion::new(
                "What is your Company Name?",
                Answer::Text("   ".into()),
                AnswerType::Text,
            ),
            AnsweredQuestion::new(
                "Please confirm your company name",
                Answer::Text(" Acme Health ".into()),
                AnswerType::Text,
            ),
        ];

        assert_eq!(company_name(&history).as_deref(), Some("Acme Health"));
        assert_eq!(company_name(&history[..1]), None);
    }
}
