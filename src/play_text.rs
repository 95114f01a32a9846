//! Play-by-play text classification.
//!
//! [`classify`] turns a free-text play description into a snake_case
//! category and the acting player's name. Shooting plays are always `shot`;
//! explicit `foul on <player>` phrases are `foul`; anything else is split at
//! the earliest keyword from a [`PlayRules`] table.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

use crate::{config::PlayTextConfig, flatten::Record};

static FOUL_ON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)foul on\s+(.+?)(?:[.:]|$)").expect("foul-on pattern"));
static FOUL_ON_PLAYER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)foul_on_player[:\s]+(.+?)(?:[.:]|$)").expect("foul_on_player pattern")
});
static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("slug pattern"));

const SHOT_KEYWORDS: [&str; 2] = [" made ", " missed "];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlayClassification {
    pub category: String,
    pub actor: String,
}

/// Ordered keyword table. Position in the text decides which keyword splits
/// a play; table order only breaks ties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRules {
    keywords: Vec<String>,
}

impl PlayRules {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn classify(&self, text: &str, shooting: bool) -> PlayClassification {
        let text = text.trim();
        if text.is_empty() {
            return PlayClassification::default();
        }
        let lower = text.to_ascii_lowercase();

        if shooting {
            let actor = SHOT_KEYWORDS
                .iter()
                .find_map(|kw| lower.find(kw))
                .map(|idx| trim_name(&text[..idx]))
                .unwrap_or_default();
            return PlayClassification {
                category: "shot".to_string(),
                actor,
            };
        }

        for pattern in [&*FOUL_ON, &*FOUL_ON_PLAYER] {
            if let Some(player) = pattern.captures(text).and_then(|caps| caps.get(1)) {
                return PlayClassification {
                    category: "foul".to_string(),
                    actor: trim_name(player.as_str()),
                };
            }
        }

        let mut best: Option<usize> = None;
        for keyword in &self.keywords {
            if let Some(idx) = lower.find(keyword.as_str())
                && best.is_none_or(|current| idx < current)
            {
                best = Some(idx);
            }
        }
        match best {
            Some(idx) => PlayClassification {
                category: snake_case(trim_name(&text[idx..]).as_str()),
                actor: trim_name(&text[..idx]),
            },
            None => PlayClassification {
                category: snake_case(text),
                actor: String::new(),
            },
        }
    }
}

impl Default for PlayRules {
    fn default() -> Self {
        Self::new([
            " offensive rebound",
            " defensive rebound",
            " made ",
            " missed ",
            " turnover",
            " blocked ",
            " block ",
            " substitution",
            " rebound",
            " steal",
            " foul",
        ])
    }
}

/// Classifies with the default keyword table.
pub fn classify(text: &str, shooting: bool) -> PlayClassification {
    PlayRules::default().classify(text, shooting)
}

fn trim_name(value: &str) -> String {
    value.trim_matches([' ', '.']).to_string()
}

pub fn snake_case(value: &str) -> String {
    let lower = value.to_lowercase();
    NON_SLUG.replace_all(&lower, "_").trim_matches('_').to_string()
}

fn is_truthy(value: Option<&JsonValue>) -> bool {
    match value {
        Some(JsonValue::Bool(b)) => *b,
        Some(JsonValue::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(JsonValue::String(s)) => {
            matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "t" | "yes" | "y" | "1")
        }
        _ => false,
    }
}

/// Adds the category and actor fields to every record, reading the play text
/// and shooting flag named by `config`. Records without text get empty
/// values.
pub fn annotate_records(records: &mut [Record], config: &PlayTextConfig, rules: &PlayRules) {
    for record in records.iter_mut() {
        let text = match record.get(&config.text_field) {
            Some(JsonValue::String(s)) => s.clone(),
            Some(JsonValue::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let shooting = is_truthy(record.get(&config.shooting_field));
        let PlayClassification { category, actor } = rules.classify(&text, shooting);
        record.insert(config.type_column.clone(), JsonValue::String(category));
        record.insert(config.player_column.clone(), JsonValue::String(actor));
    }
}
