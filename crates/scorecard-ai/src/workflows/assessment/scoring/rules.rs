use super::super::domain::{Answer, AnswerType, AnsweredQuestion};
use super::keywords::{
    contains_any, count_containing, CHECKBOX_DABBLER, CHECKBOX_LEADER, NEGATION, RADIO_DABBLER,
    RADIO_ENABLER, RADIO_LEADER, TEXT_DABBLER, TEXT_LEADER,
};
use super::ScoreComponent;
use serde_json::Value;

pub(crate) const MAX_ANSWER_POINTS: u8 = 5;

pub(crate) fn score_history(history: &[AnsweredQuestion]) -> (Vec<ScoreComponent>, u32) {
    let components: Vec<ScoreComponent> = history
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let (points, notes) = score_entry(entry);
            ScoreComponent {
                question_index: index,
                answer_type: entry.answer_type,
                points,
                notes,
            }
        })
        .collect();

    let raw_total = components
        .iter()
        .map(|component| u32::from(component.points))
        .sum();

    (components, raw_total)
}

pub(crate) fn score_entry(entry: &AnsweredQuestion) -> (u8, String) {
    match (entry.answer_type, &entry.answer) {
        (Some(AnswerType::Scale), answer) => score_scale(answer),
        (Some(AnswerType::Radio), Answer::Text(text)) => score_radio(text),
        (Some(AnswerType::Checkbox), Answer::Choices(choices)) => score_checkbox(choices),
        (Some(AnswerType::Text), Answer::Text(text)) => score_text(text),
        (Some(kind), _) => (
            0,
            format!("{} answer has an unexpected shape", kind.label()),
        ),
        (None, _) => (0, "missing or unknown answer type".to_string()),
    }
}

fn score_scale(answer: &Answer) -> (u8, String) {
    let parsed = match answer {
        Answer::Text(text) => leading_integer(text),
        Answer::Other(Value::Number(number)) => number.as_i64(),
        _ => None,
    };

    match parsed {
        Some(value) if (1..=5).contains(&value) => {
            (value as u8, format!("scale rating {value} taken as-is"))
        }
        Some(value) => (0, format!("scale rating {value} outside 1-5")),
        None => (0, "scale answer is not a number".to_string()),
    }
}

/// Mirrors lenient integer parsing: optional sign, then digits, trailing text ignored.
fn leading_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let digits: String = rest.chars().take_while(|ch| ch.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let value = digits.parse::<i64>().ok()?;
    Some(if negative { -value } else { value })
}

fn score_radio(text: &str) -> (u8, String) {
    let lowered = text.to_lowercase();
    if contains_any(&lowered, RADIO_LEADER) {
        (5, "choice signals leader-level maturity".to_string())
    } else if contains_any(&lowered, RADIO_ENABLER) {
        (3, "choice signals enabler-level maturity".to_string())
    } else if contains_any(&lowered, RADIO_DABBLER) {
        (1, "choice signals early-stage adoption".to_string())
    } else {
        (2, "choice carries no maturity signal".to_string())
    }
}

fn score_checkbox(choices: &[String]) -> (u8, String) {
    let selected = choices.len();
    let mut score = selected.min(MAX_ANSWER_POINTS as usize) as u8;
    let mut notes = vec![format!("{selected} option(s) selected")];

    let leader_hits = count_containing(choices, CHECKBOX_LEADER);
    if leader_hits > 0 {
        score = (score + leader_hits.min(2) as u8).min(MAX_ANSWER_POINTS);
        notes.push(format!("{leader_hits} advanced option(s)"));
    }

    let dabbler_hits = count_containing(choices, CHECKBOX_DABBLER);
    if dabbler_hits > 0 && score > 1 {
        score = score.saturating_sub(dabbler_hits.min(2) as u8).max(1);
        notes.push(format!("{dabbler_hits} basic option(s)"));
    }

    (score, notes.join(", "))
}

fn score_text(text: &str) -> (u8, String) {
    let lowered = text.to_lowercase();
    let length = text.chars().count();

    let mut score: u8 = match length {
        0..=29 => 1,
        30..=79 => 2,
        80..=149 => 3,
        _ => 4,
    };
    let mut notes = vec![format!("{length} characters")];

    if contains_any(&lowered, TEXT_LEADER) {
        score = (score + 1).min(MAX_ANSWER_POINTS);
        notes.push("advanced vocabulary".to_string());
    }

    if contains_any(&lowered, TEXT_DABBLER) {
        let negations = NEGATION.find_iter(&lowered).count();
        if negations > 1 {
            score = 1;
            notes.push(format!("{negations} negations"));
        } else {
            score = score.saturating_sub(2).max(1);
            notes.push("beginner vocabulary".to_string());
        }
    }

    (score, notes.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_integer_tolerates_trailing_text() {
        assert_eq!(leading_integer(" 4 - often"), Some(4));
        assert_eq!(leading_integer("-2"), Some(-2));
        assert_eq!(leading_integer("three"), None);
        assert_eq!(leading_integer(""), None);
    }
}
