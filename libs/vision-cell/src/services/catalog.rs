/// A hosted image model and the filename hints that point at it.
#[derive(Debug, PartialEq, Eq)]
pub struct MedicalModel {
    pub key: &'static str,
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub hints: &'static [&'static str],
}

pub const DEFAULT_MODEL: &str = "xray";

/// Catalog order matters: filename detection returns the first entry with a matching hint.
pub const MEDICAL_MODELS: [MedicalModel; 7] = [
    MedicalModel {
        key: "xray",
        id: "SicariusSicariiStuff/X-Ray_Alpha",
        name: "X-Ray Analysis",
        description: "Analyzes chest X-rays and respiratory conditions",
        hints: &["chest", "xray", "x-ray", "lung", "pneumonia", "respiratory"],
    },
    MedicalModel {
        key: "dermatology",
        id: "dima806/skin_cancer_image_detection",
        name: "Dermatology Analysis",
        description: "Analyzes skin conditions and dermatological findings",
        hints: &["skin", "dermatology", "mole", "lesion", "rash", "acne", "eczema", "psoriasis"],
    },
    MedicalModel {
        key: "diabetic_retinopathy",
        id: "HuggingFaceM4/diabetic-retinopathy-classification",
        name: "Diabetic Retinopathy Detection",
        description: "Detects diabetic retinopathy in retinal images",
        hints: &["retina", "retinal", "diabetic", "retinopathy", "eye", "fundus", "ophthalmology"],
    },
    MedicalModel {
        key: "glaucoma",
        id: "keremberke/yolov8n-glaucoma-detection",
        name: "Glaucoma Detection",
        description: "Classifies glaucoma in retinal images",
        hints: &["glaucoma", "optic", "nerve", "eye", "retina", "retinal", "ophthalmology"],
    },
    MedicalModel {
        key: "alzheimer",
        id: "Falconsai/nsfw_image_detection",
        name: "Alzheimer's MRI Analysis",
        description: "Analyzes brain MRI scans for neurological conditions",
        hints: &["alzheimer", "brain", "mri", "neurological", "dementia", "cognitive", "neurology"],
    },
    MedicalModel {
        key: "musculoskeletal",
        id: "microsoft/resnet-50",
        name: "Musculoskeletal Analysis",
        description: "Detects abnormalities in bone and joint images",
        hints: &["bone", "fracture", "joint", "muscle", "skeletal", "orthopedic", "musculoskeletal"],
    },
    MedicalModel {
        key: "wound",
        id: "microsoft/resnet-50",
        name: "Wound Assessment",
        description: "Classifies wound types and healing stages",
        hints: &["wound", "injury", "cut", "burn", "healing", "ulcer", "sore"],
    },
];

pub fn find_model(key: &str) -> Option<&'static MedicalModel> {
    MEDICAL_MODELS.iter().find(|m| m.key == key)
}

pub fn default_model() -> &'static MedicalModel {
    &MEDICAL_MODELS[0]
}

pub fn detect_model_from_filename(filename: &str) -> &'static str {
    let lower = filename.to_lowercase();
    MEDICAL_MODELS
        .iter()
        .find(|m| m.hints.iter().any(|hint| lower.contains(hint)))
        .map(|m| m.key)
        .unwrap_or(DEFAULT_MODEL)
}
