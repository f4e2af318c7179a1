use crate::infra::{load_history, TierArg};
use clap::Args;
use scorecard_ai::config::DEFAULT_MAX_QUESTIONS;
use scorecard_ai::error::AppError;
use scorecard_ai::workflows::assessment::{
    sample_history, AnsweredQuestion, KeyFindings, ScoreOutcome, ScoringEngine, Tier,
};
use scorecard_ai::workflows::report::{company_name, PersonaBundle, ReportAudience, ReportPrompt};
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// JSON file holding a history array or a full `/scorecard-ai` request body
    #[arg(long)]
    pub(crate) history: PathBuf,
    /// Question count used when normalizing partial assessments
    #[arg(long, default_value_t = DEFAULT_MAX_QUESTIONS)]
    pub(crate) max_questions: usize,
    /// Print the scoring trail as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Limit the demo to one reference tier
    #[arg(long, value_enum)]
    pub(crate) tier: Option<TierArg>,
    /// Industry used when building the report prompt
    #[arg(long, default_value = "Retail")]
    pub(crate) industry: String,
    /// Print the full report system prompt for each tier
    #[arg(long)]
    pub(crate) show_prompt: bool,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        history,
        max_questions,
        json,
    } = args;

    let history = load_history(&history)?;
    let engine = ScoringEngine::new(max_questions);
    let outcome = engine.score(&history);
    let findings = KeyFindings::from_history(&history);

    if json {
        let body = json!({
            "answered": history.len(),
            "score": outcome,
            "keyFindings": findings,
            "companyName": company_name(&history),
        });
        let rendered = serde_json::to_string_pretty(&body).map_err(std::io::Error::from)?;
        println!("{rendered}");
        return Ok(());
    }

    render_score(&engine, &history, &outcome);
    println!("\n{}", findings.to_markdown());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        tier,
        industry,
        show_prompt,
    } = args;

    let tiers: Vec<Tier> = match tier {
        Some(tier) => vec![tier.into()],
        None => Tier::ordered().to_vec(),
    };
    let engine = ScoringEngine::default();

    println!("AI Efficiency Scorecard demo ({industry})");
    for reference in tiers {
        let history = sample_history(reference);
        let outcome = engine.score(&history);
        println!("\n=== {} reference answers ===", reference.label());
        render_score(&engine, &history, &outcome);

        let persona = PersonaBundle::for_tier(outcome.tier);
        let prompt = ReportPrompt::build(
            ReportAudience {
                tier: outcome.tier,
                industry: &industry,
                user_name: None,
                company_name: None,
            },
            &history,
        )
        .map_err(std::io::Error::from)?;

        println!("Persona: {}", persona.description);
        println!(
            "Report prompt: {} chars system, {} chars user",
            prompt.system.len(),
            prompt.user.len()
        );
        if show_prompt {
            println!("\n{}", prompt.system);
        }
    }

    Ok(())
}

fn render_score(engine: &ScoringEngine, history: &[AnsweredQuestion], outcome: &ScoreOutcome) {
    println!("Answered questions: {}", history.len());
    println!("Raw points: {}", outcome.raw_total);
    if outcome.normalized {
        println!(
            "Partial assessment normalized to {} questions",
            engine.max_questions()
        );
    }
    if let Some(correction) = &outcome.correction {
        println!(
            "Beginner vocabulary in {}/{} answers lowered {} to {}",
            correction.flagged_answers,
            correction.answer_count,
            correction.original_total,
            outcome.total_score
        );
    }
    println!("Final score: {}/100", outcome.total_score);
    println!("Tier: {}", outcome.tier.label());

    for component in &outcome.components {
        let answer_type = component
            .answer_type
            .map(|kind| kind.label())
            .unwrap_or("unknown");
        println!(
            "  Q{:<2} {:<8} {} pts  {}",
            component.question_index + 1,
            answer_type,
            component.points,
            component.notes
        );
    }
}
