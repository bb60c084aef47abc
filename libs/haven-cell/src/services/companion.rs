use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::debug;

use shared_ai::{ChatContent, GeminiClient};
use shared_config::AppConfig;

pub const HAVEN_PROMPT: &str = "You are Synaptix Haven, a compassionate AI mental health assistant.\n\n\
Core principles:\n\
1) Listen empathetically and validate feelings.\n\
2) Offer gentle, practical coping steps (breathing, grounding, journaling, cognitive reframing).\n\
3) Encourage professional help when appropriate.\n\
4) Avoid definitive diagnoses or medical directives.\n\n\
Safety: If self-harm, suicidal ideation, or intent to harm others is mentioned, respond with high \
empathy, provide crisis resources and immediate steps, and advise contacting local emergency services.\n\n\
Conciseness: Reply in at most 2-3 short sentences. Prefer bullet points only when helpful.\n\n\
Emotion awareness: If the message includes a tag like [Emotion: anxious|low|angry|engaged|calm], \
adapt tone and suggestions accordingly (e.g., more grounding for anxious, gentle activation for low \
mood). Keep the tag private and do not echo it. End with one gentle next step.";

pub const FALLBACK_REPLY: &str = "I'm here with you.";

const RECENT_TURNS: usize = 2;
const MAX_SENTENCES: usize = 3;
const MAX_REPLY_CHARS: usize = 350;

static FILLERS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\b(um+|uh+|hmm+|erm+|like)\b").ok());
static WHITESPACE_RUNS: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s{2,}").ok());
static SPACE_BEFORE_PUNCT: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\s+([,.!?])").ok());

/// Strip spoken fillers and tidy spacing around punctuation.
pub fn clean_transcript(text: &str) -> String {
    let mut cleaned = text.to_string();
    if let Some(re) = FILLERS.as_ref() {
        cleaned = re.replace_all(&cleaned, "").into_owned();
    }
    if let Some(re) = WHITESPACE_RUNS.as_ref() {
        cleaned = re.replace_all(&cleaned, " ").into_owned();
    }
    if let Some(re) = SPACE_BEFORE_PUNCT.as_ref() {
        cleaned = re.replace_all(&cleaned, "$1").into_owned();
    }
    cleaned.trim().to_string()
}

/// Keep the last two turns. A trailing user turn is cleaned and tagged with the emotion.
pub fn shape_conversation(turns: &[ChatContent], emotion: Option<&str>) -> Vec<ChatContent> {
    let start = turns.len().saturating_sub(RECENT_TURNS);
    let mut recent = turns[start..].to_vec();

    if let Some(last) = recent.last_mut().filter(|t| t.is_user()) {
        let mut text = clean_transcript(&last.text());
        if let Some(emotion) = emotion.map(str::trim).filter(|e| !e.is_empty()) {
            text.push_str(&format!("\n\n[Emotion: {}]", emotion));
        }
        *last = ChatContent::user(text);
    }

    recent
}

/// First three sentences, capped at 350 characters.
pub fn shorten_reply(text: &str) -> String {
    let text = text.trim();
    if text.is_empty() {
        return FALLBACK_REPLY.to_string();
    }

    let sentences = split_sentences(text)
        .into_iter()
        .take(MAX_SENTENCES)
        .collect::<Vec<_>>()
        .join(" ");

    if sentences.chars().count() <= MAX_REPLY_CHARS {
        sentences
    } else {
        let cut: String = sentences.chars().take(MAX_REPLY_CHARS).collect();
        format!("{}…", cut)
    }
}

/// Split after `.`, `!` or `?` when followed by whitespace.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let end = i + c.len_utf8();
        let mut next = end;
        while let Some(&(j, w)) = chars.peek() {
            if !w.is_whitespace() {
                break;
            }
            next = j + w.len_utf8();
            chars.next();
        }
        if next > end {
            sentences.push(&text[start..end]);
            start = next;
        }
    }

    if start < text.len() {
        sentences.push(&text[start..]);
    }
    sentences
}

pub struct CompanionService {
    gemini: GeminiClient,
}

impl CompanionService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gemini: GeminiClient::chat(config),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.gemini.is_configured()
    }

    pub async fn reply(&self, turns: &[ChatContent], emotion: Option<&str>) -> Result<String> {
        let shaped = shape_conversation(turns, emotion);
        debug!("Haven reply for {} of {} turn(s)", shaped.len(), turns.len());

        let raw = self.gemini.generate(HAVEN_PROMPT, &shaped).await?;
        Ok(shorten_reply(&raw))
    }
}
