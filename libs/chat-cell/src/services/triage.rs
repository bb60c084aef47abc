use std::collections::BTreeSet;

use doctor_cell::infer_specialization;

use crate::models::{Severity, TriageReport};

const SYMPTOM_DICTIONARY: &[&str] = &[
    "anxiety", "stress", "depression", "insomnia", "panic", "sad", "hopeless", "worthless",
    "headache", "nausea", "fever", "cough", "fatigue", "dizzy", "pain", "chest pain",
    "shortness of breath",
];

const ESCALATING: &[&str] = &["severe", "cannot", "suicid", "self-harm", "chest pain", "faint", "blackout"];
const WORSENING: &[&str] = &["worse", "pain", "panic", "insomnia", "anxiety", "depress", "breath"];
const EASING: &[&str] = &["mild", "slight", "okay", "better"];

const SEVERE_THRESHOLD: i32 = 6;
const MODERATE_THRESHOLD: i32 = 2;

/// Dictionary symptoms mentioned in `text`, in dictionary order.
pub fn extract_symptoms(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    SYMPTOM_DICTIONARY
        .iter()
        .filter(|s| lower.contains(*s))
        .map(|s| s.to_string())
        .collect()
}

pub fn severity_delta(text: &str) -> i32 {
    let lower = text.to_lowercase();
    let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

    let mut delta = 0;
    if mentions(ESCALATING) {
        delta += 3;
    }
    if mentions(WORSENING) {
        delta += 2;
    }
    if mentions(EASING) {
        delta -= 1;
    }
    delta
}

pub fn severity_label(score: i32) -> Severity {
    if score >= SEVERE_THRESHOLD {
        Severity::Severe
    } else if score >= MODERATE_THRESHOLD {
        Severity::Moderate
    } else {
        Severity::Mild
    }
}

fn accumulate(score: i32, delta: i32) -> i32 {
    score.saturating_add(delta)
}

/// One-message triage on top of a previously accumulated score.
pub fn triage(text: &str, previous_score: i32) -> TriageReport {
    let severity_delta = severity_delta(text);
    let score = accumulate(previous_score, severity_delta);

    TriageReport {
        symptoms: extract_symptoms(text),
        severity_delta,
        score,
        severity: severity_label(score),
        specialization: infer_specialization(text),
    }
}

/// Running symptom set and severity score over a conversation.
#[derive(Debug, Default, Clone)]
pub struct TriageAccumulator {
    symptoms: BTreeSet<(usize, String)>,
    score: i32,
    messages: u32,
}

impl TriageAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a score carried over from earlier messages.
    pub fn starting_at(score: i32) -> Self {
        Self {
            score,
            ..Self::default()
        }
    }

    pub fn observe(&mut self, text: &str) {
        self.messages = self.messages.saturating_add(1);
        self.score = accumulate(self.score, severity_delta(text));

        let lower = text.to_lowercase();
        for (rank, symptom) in SYMPTOM_DICTIONARY.iter().enumerate() {
            if lower.contains(symptom) {
                self.symptoms.insert((rank, symptom.to_string()));
            }
        }
    }

    /// Collected symptoms in dictionary order.
    pub fn symptoms(&self) -> Vec<String> {
        self.symptoms.iter().map(|(_, s)| s.clone()).collect()
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn messages(&self) -> u32 {
        self.messages
    }

    pub fn severity(&self) -> Severity {
        severity_label(self.score)
    }

    pub fn summary(&self) -> String {
        let mut summary = if self.messages > 0 {
            "Synaptix AI chat summary (auto-collected)".to_string()
        } else {
            "Synaptix AI visit recorded (no messages)".to_string()
        };
        if !self.symptoms.is_empty() {
            summary.push_str("; Key symptoms: ");
            summary.push_str(&self.symptoms().join(", "));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctor_cell::Specialization;

    #[test]
    fn test_symptoms_in_dictionary_order() {
        let symptoms = extract_symptoms("Chest pain, some nausea and a lot of stress");
        assert_eq!(symptoms, vec!["stress", "nausea", "pain", "chest pain"]);
    }

    #[test]
    fn test_severity_delta_rules() {
        assert_eq!(severity_delta("I cannot breathe, chest pain"), 5);
        assert_eq!(severity_delta("slight headache"), -1);
        assert_eq!(severity_delta("the pain is better today"), 1);
        assert_eq!(severity_delta("hello"), 0);
    }

    #[test]
    fn test_labels() {
        assert_eq!(severity_label(-3), Severity::Mild);
        assert_eq!(severity_label(1), Severity::Mild);
        assert_eq!(severity_label(2), Severity::Moderate);
        assert_eq!(severity_label(5), Severity::Moderate);
        assert_eq!(severity_label(6), Severity::Severe);
    }

    #[test]
    fn test_triage_report() {
        let report = triage("Severe chest pain and shortness of breath", 1);
        assert_eq!(report.severity_delta, 5);
        assert_eq!(report.score, 6);
        assert_eq!(report.severity, Severity::Severe);
        assert_eq!(report.specialization, Some(Specialization::Cardiologist));
        assert!(report.symptoms.contains(&"shortness of breath".to_string()));
    }

    #[test]
    fn test_accumulator_agrees_with_single_message_triage() {
        let text = "Severe chest pain and shortness of breath";
        let mut acc = TriageAccumulator::starting_at(1);
        acc.observe(text);
        assert_eq!(acc.score(), triage(text, 1).score);

        let mut acc = TriageAccumulator::starting_at(i32::MAX - 1);
        acc.observe(text);
        assert_eq!(acc.score(), i32::MAX);
        assert_eq!(acc.score(), triage(text, i32::MAX - 1).score);
        assert_eq!(triage("slight headache", i32::MIN).score, i32::MIN);
    }

    #[test]
    fn test_accumulator_over_conversation() {
        let mut acc = TriageAccumulator::new();
        assert_eq!(acc.summary(), "Synaptix AI visit recorded (no messages)");

        acc.observe("I have anxiety and insomnia");
        acc.observe("The insomnia is worse, and stress too");
        assert_eq!(acc.messages(), 2);
        assert_eq!(acc.score(), 4);
        assert_eq!(acc.severity(), Severity::Moderate);
        assert_eq!(acc.symptoms(), vec!["anxiety", "stress", "insomnia"]);
        assert_eq!(
            acc.summary(),
            "Synaptix AI chat summary (auto-collected); Key symptoms: anxiety, stress, insomnia"
        );
    }
}
