use std::fmt;

use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Specialization {
    Orthopedist,
    Cardiologist,
    Dermatologist,
    Psychiatrist,
    Endocrinologist,
    Gastroenterologist,
    Ophthalmologist,
    EntSpecialist,
    GeneralPhysician,
}

impl Specialization {
    /// Tie-break order: earlier wins.
    pub const ALL: [Specialization; 9] = [
        Specialization::Orthopedist,
        Specialization::Cardiologist,
        Specialization::Dermatologist,
        Specialization::Psychiatrist,
        Specialization::Endocrinologist,
        Specialization::Gastroenterologist,
        Specialization::Ophthalmologist,
        Specialization::EntSpecialist,
        Specialization::GeneralPhysician,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::Orthopedist => "Orthopedist",
            Specialization::Cardiologist => "Cardiologist",
            Specialization::Dermatologist => "Dermatologist",
            Specialization::Psychiatrist => "Psychiatrist",
            Specialization::Endocrinologist => "Endocrinologist",
            Specialization::Gastroenterologist => "Gastroenterologist",
            Specialization::Ophthalmologist => "Ophthalmologist",
            Specialization::EntSpecialist => "ENT Specialist",
            Specialization::GeneralPhysician => "General Physician",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Specialization {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

struct KeywordRule {
    specialization: Specialization,
    keywords: &'static [&'static str],
    weight: u32,
}

const RULES: &[KeywordRule] = &[
    KeywordRule {
        specialization: Specialization::Orthopedist,
        keywords: &[
            "bone", "fracture", "broken", "break", "sprain", "dislocation", "joint", "knee",
            "shoulder", "elbow", "wrist", "ankle", "back pain", "orthopedic",
        ],
        weight: 3,
    },
    KeywordRule {
        specialization: Specialization::Orthopedist,
        keywords: &["cast", "plaster", "immobilize"],
        weight: 2,
    },
    KeywordRule {
        specialization: Specialization::Cardiologist,
        keywords: &[
            "chest pain", "shortness of breath", "heart", "palpitation", "hypertension", "bp",
            "blood pressure", "angina",
        ],
        weight: 3,
    },
    KeywordRule {
        specialization: Specialization::Dermatologist,
        keywords: &["skin", "rash", "acne", "dermatitis", "eczema", "psoriasis", "mole", "itch", "hives"],
        weight: 2,
    },
    KeywordRule {
        specialization: Specialization::Psychiatrist,
        keywords: &["anxiety", "depress", "panic", "insomnia", "mental", "mood", "stress"],
        weight: 2,
    },
    KeywordRule {
        specialization: Specialization::Endocrinologist,
        keywords: &["diabetes", "thyroid", "hormone", "pcos", "metabolism"],
        weight: 2,
    },
    KeywordRule {
        specialization: Specialization::Gastroenterologist,
        keywords: &["stomach", "abdomen", "gastric", "ulcer", "acid", "ibs", "constipation", "diarrhea"],
        weight: 2,
    },
    KeywordRule {
        specialization: Specialization::Ophthalmologist,
        keywords: &["eye", "vision", "blurry", "red eye", "conjunctivitis", "ophthalm"],
        weight: 2,
    },
    KeywordRule {
        specialization: Specialization::EntSpecialist,
        keywords: &["ear", "throat", "sinus", "tonsil", "nose", "ent"],
        weight: 2,
    },
    KeywordRule {
        specialization: Specialization::GeneralPhysician,
        keywords: &["fever", "cough", "cold", "flu", "fatigue", "general"],
        weight: 1,
    },
];

/// Orthopedic signals this strong mean skin words are about a cast or wound.
const ORTHO_DAMPENING_THRESHOLD: u32 = 3;
const DERM_DAMPENING: u32 = 2;

/// Best-scoring specialization for free-text symptoms, if any keyword hits.
pub fn infer_specialization(text: &str) -> Option<Specialization> {
    let lower = text.to_lowercase();
    let mut scores = [0u32; Specialization::ALL.len()];

    for rule in RULES {
        if contains_any(&lower, rule.keywords) {
            scores[rule.specialization.index()] += rule.weight;
        }
    }

    if scores[Specialization::Orthopedist.index()] >= ORTHO_DAMPENING_THRESHOLD {
        let derm = &mut scores[Specialization::Dermatologist.index()];
        *derm = derm.saturating_sub(DERM_DAMPENING);
    }

    let mut best: Option<(Specialization, u32)> = None;
    for spec in Specialization::ALL {
        let score = scores[spec.index()];
        if score > best.map(|(_, s)| s).unwrap_or(0) {
            best = Some((spec, score));
        }
    }

    best.map(|(spec, _)| spec)
}

/// Spellings a specialization may be stored under. Unknown names alias only to themselves.
pub fn specialization_aliases(name: &str) -> Vec<String> {
    let lower = name.to_lowercase();

    let aliases: &[&str] = if contains_any(&lower, &["orthop"]) {
        &["Orthopedist", "Orthopedic", "Orthopaedic", "Orthopedic Surgeon", "Orthopedics"]
    } else if contains_any(&lower, &["card"]) {
        &["Cardiologist", "Cardiology", "Heart Specialist"]
    } else if contains_any(&lower, &["derma", "skin"]) {
        &["Dermatologist", "Dermatology", "Skin Specialist"]
    } else if contains_any(&lower, &["psychi", "mental"]) {
        &["Psychiatrist", "Psychology", "Mental Health"]
    } else if contains_any(&lower, &["endo", "thyroid", "diabet"]) {
        &["Endocrinologist", "Endocrinology", "Diabetologist"]
    } else if contains_any(&lower, &["gastro", "stomach"]) {
        &["Gastroenterologist", "Gastroenterology"]
    } else if contains_any(&lower, &["ophthal", "eye"]) {
        &["Ophthalmologist", "Ophthalmology", "Eye Specialist"]
    } else if contains_any(&lower, &["ent", "ear", "throat", "nose"]) {
        &["ENT Specialist", "Otolaryngologist"]
    } else if contains_any(&lower, &["general", "fever", "cold", "flu"]) {
        &["General Physician", "Internal Medicine"]
    } else {
        return vec![name.to_string()];
    };

    aliases.iter().map(|a| a.to_string()).collect()
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| text.contains(n))
}
