use anyhow::Result;
use tracing::{debug, info, warn};

use shared_ai::{Classification, GeminiClient, HuggingFaceClient, UpstreamStatus};
use shared_config::AppConfig;

use crate::models::{AnalysisReport, AnalysisSource, Detection, ImageUpload, VisionError};
use crate::services::catalog::{default_model, detect_model_from_filename, find_model, MedicalModel, DEFAULT_MODEL};
use crate::services::parsing::{parse_detection, parse_explanation, parse_findings};

pub const DISCLAIMER: &str = "This AI analysis is for informational purposes only and should not \
replace professional medical advice, diagnosis, or treatment. Always consult with qualified \
healthcare professionals for medical concerns.";

const AUTO: &str = "auto";

const DETECTION_CATEGORIES: &str = "Available categories:
1. xray - Chest X-rays, lung images, respiratory system
2. dermatology - Skin conditions, lesions, moles, rashes, dermatological images
3. diabetic_retinopathy - Retinal images showing diabetic retinopathy
4. glaucoma - Retinal images for glaucoma detection
5. alzheimer - Brain MRI scans for Alzheimer's detection
6. musculoskeletal - Bone, joint, fracture, orthopedic images
7. wound - Wound images, injuries, cuts, burns";

fn detection_prompt(file_name: &str) -> String {
    format!(
        "Analyze this medical image and determine what type of medical image it is with confidence reasoning.\n\n\
{DETECTION_CATEGORIES}\n\n\
Filename: {file_name}\n\n\
Respond in this exact format:\n\
TYPE: [category_name]\n\
CONFIDENCE: [0-100]\n\
REASONING: [brief explanation of why you classified it this way]\n"
    )
}

fn findings_prompt(model: &MedicalModel, detection: Option<&Detection>) -> String {
    let detection_context = detection
        .map(|d| {
            format!(
                "Auto-Detection Results:\n- Detected Image Type: {}\n- Detection Confidence: {}%\n- Reasoning: {}\n",
                d.detected_type, d.confidence, d.reasoning
            )
        })
        .unwrap_or_default();

    format!(
        "You are a medical AI assistant analyzing a {description} image for {name}.\n\n\
{detection_context}\n\
Please analyze this medical image and provide findings in simple, easy-to-understand language for \
general users (not medical professionals).\n\n\
IMPORTANT: List findings in descending order of confidence (highest first, lowest last).\n\n\
1. FINDINGS: List 3-4 specific observations in this image, each with a realistic confidence \
percentage (20%-85%). Order them from HIGHEST to LOWEST confidence.\n\n\
2. PRIMARY_DIAGNOSIS: Your most confident finding\n\n\
3. EXPLANATION: Clear, simple explanation using everyday language\n\n\
4. RECOMMENDATIONS: General health advice in simple terms\n\n\
Format your response exactly like this:\n\
FINDINGS:\n\
- [Most confident finding]: [85]%\n\
- [Second most confident]: [70]%\n\
- [Third most confident]: [55]%\n\
- [Least confident]: [35]%\n\n\
PRIMARY_DIAGNOSIS: [Your top finding] ([highest confidence]%)\n\n\
EXPLANATION: [2-3 sentences in simple, non-medical language about what you see]\n\n\
RECOMMENDATIONS: [General health advice in simple terms]\n\n\
Use simple, everyday language. Avoid complex medical terminology. Focus on what a regular person \
would understand.\n",
        description = model.description.to_lowercase(),
        name = model.name,
    )
}

fn explanation_prompt(model: &MedicalModel, top: &Classification, confidence: &str) -> String {
    format!(
        "Based on your analysis of this {description} image, provide a simple explanation for general users:\n\n\
Primary Finding: \"{label}\" with {confidence}% confidence\n\n\
Please provide:\n\
1. EXPLANATION: Explain what this means in simple, everyday language (avoid medical jargon)\n\
2. RECOMMENDATIONS: General health advice in simple terms\n\n\
Keep explanations clear and easy to understand for people without medical background.\n\n\
Format as:\n\
EXPLANATION: [simple explanation in everyday language]\n\
RECOMMENDATIONS: [general health advice in simple terms]\n",
        description = model.description.to_lowercase(),
        label = top.label,
    )
}

fn basic_findings(model: &MedicalModel) -> Vec<Classification> {
    vec![
        Classification {
            label: format!("{} Assessment Completed", model.name),
            score: 0.70,
        },
        Classification {
            label: "Further Professional Review Recommended".to_string(),
            score: 0.25,
        },
    ]
}

fn detection_fallback() -> Detection {
    Detection {
        detected_type: DEFAULT_MODEL,
        confidence: 50,
        reasoning: "Auto-detection failed, using default classification".to_string(),
    }
}

pub struct ImageAnalysisService {
    gemini: GeminiClient,
}

impl ImageAnalysisService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            gemini: GeminiClient::vision(config),
        }
    }

    /// Classify the kind of medical image. Never fails: upstream errors fall back to X-ray.
    pub async fn detect(&self, upload: &ImageUpload) -> Detection {
        match self
            .gemini
            .generate_with_image(&detection_prompt(&upload.file_name), &upload.bytes, &upload.content_type)
            .await
        {
            Ok(reply) => parse_detection(&reply),
            Err(e) => {
                warn!("Auto-detection failed: {}", e);
                detection_fallback()
            }
        }
    }

    async fn findings(
        &self,
        model: &MedicalModel,
        upload: &ImageUpload,
        detection: Option<&Detection>,
    ) -> Result<Vec<Classification>> {
        let reply = self
            .gemini
            .generate_with_image(&findings_prompt(model, detection), &upload.bytes, &upload.content_type)
            .await?;
        Ok(parse_findings(&reply))
    }

    async fn explain(
        &self,
        model: &MedicalModel,
        upload: &ImageUpload,
        top: &Classification,
        confidence: &str,
    ) -> (String, String) {
        let prompt = explanation_prompt(model, top, confidence);
        match self
            .gemini
            .generate_with_image(&prompt, &upload.bytes, &upload.content_type)
            .await
        {
            Ok(reply) => {
                let (explanation, recommendations) = parse_explanation(&reply);
                (
                    explanation.unwrap_or_else(|| format!(
                        "The AI found {} with {}% confidence. This means the system identified certain \
patterns in the image that suggest this condition. The analysis is based on comparing the image to \
similar medical cases.",
                        top.label, confidence
                    )),
                    recommendations.unwrap_or_else(|| {
                        "It's recommended to consult with a healthcare professional for proper evaluation. \
They can provide personalized advice and determine if any further tests or treatments are needed."
                            .to_string()
                    }),
                )
            }
            Err(e) => {
                warn!("Explanation request failed: {}", e);
                (
                    format!(
                        "The AI analysis identified {} with {}% confidence. This analysis is based on \
visual pattern recognition in medical imaging.",
                        top.label, confidence
                    ),
                    "Please consult with a qualified healthcare professional for proper evaluation, \
diagnosis, and treatment recommendations."
                        .to_string(),
                )
            }
        }
    }

    pub async fn analyze(&self, upload: &ImageUpload) -> Result<AnalysisReport, VisionError> {
        let requested = upload.model.as_deref().unwrap_or(AUTO);

        let detection = if requested == AUTO {
            Some(self.detect(upload).await)
        } else {
            None
        };

        let key = detection.as_ref().map(|d| d.detected_type).unwrap_or(requested);
        let model = find_model(key).ok_or(VisionError::InvalidModel)?;
        info!("Analyzing image with {}", model.name);

        let (results, source) = match self.findings(model, upload, detection.as_ref()).await {
            Ok(results) => (results, AnalysisSource::GeminiVision),
            Err(e) => {
                warn!("Gemini analysis failed, using basic assessment: {}", e);
                (basic_findings(model), AnalysisSource::Basic)
            }
        };

        let top = results.first().cloned().unwrap_or_else(|| basic_findings(model).remove(0));
        let confidence = format!("{:.1}", top.score * 100.0);
        debug!("Top finding: {} ({}%)", top.label, confidence);

        let (explanation, suggestions) = match source {
            AnalysisSource::GeminiVision => self.explain(model, upload, &top, &confidence).await,
            AnalysisSource::Basic => (
                format!(
                    "Health assessment completed using {}. The analysis shows {} with {}% confidence. \
This is based on visual patterns found in the image.",
                    source.as_str(),
                    top.label,
                    confidence
                ),
                "Consider consulting with a healthcare professional for a thorough evaluation and \
personalized advice about your health."
                    .to_string(),
            ),
        };

        Ok(AnalysisReport {
            success: true,
            results,
            model_used: model.name,
            explanation,
            suggestions,
            disclaimer: DISCLAIMER,
            source: source.as_str(),
            detected_type: detection.as_ref().map(|d| d.detected_type),
            detection_confidence: detection.as_ref().map(|d| d.confidence),
            detection_reasoning: detection.map(|d| d.reasoning),
        })
    }
}

pub struct ImageClassifier {
    huggingface: HuggingFaceClient,
}

impl ImageClassifier {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            huggingface: HuggingFaceClient::new(config),
        }
    }

    /// Resolve the requested catalog key. "auto" picks a model from the filename.
    pub fn resolve_model(upload: &ImageUpload) -> Result<&'static MedicalModel, VisionError> {
        match upload.model.as_deref() {
            None => Ok(default_model()),
            Some(AUTO) => find_model(detect_model_from_filename(&upload.file_name)).ok_or(VisionError::InvalidModel),
            Some(key) => find_model(key).ok_or(VisionError::InvalidModel),
        }
    }

    pub async fn classify(
        &self,
        upload: &ImageUpload,
    ) -> Result<(&'static MedicalModel, Vec<Classification>), VisionError> {
        let model = Self::resolve_model(upload)?;

        let results = self
            .huggingface
            .classify(model.id, &upload.bytes)
            .await
            .map_err(|e| match e.downcast_ref::<UpstreamStatus>() {
                Some(upstream) => VisionError::Upstream {
                    status: axum::http::StatusCode::from_u16(upstream.status.as_u16())
                        .unwrap_or(axum::http::StatusCode::BAD_GATEWAY),
                    message: upstream.to_string(),
                },
                None => VisionError::Analysis(e.to_string()),
            })?;

        Ok((model, results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn upload(file_name: &str, model: Option<&str>) -> ImageUpload {
        ImageUpload {
            bytes: b"img".to_vec(),
            content_type: "image/png".to_string(),
            file_name: file_name.to_string(),
            model: model.map(str::to_string),
        }
    }

    #[test]
    fn test_resolve_classifier_model() {
        assert_eq!(ImageClassifier::resolve_model(&upload("a.png", None)).unwrap().key, "xray");
        assert_eq!(
            ImageClassifier::resolve_model(&upload("burn_wound.png", Some("auto"))).unwrap().key,
            "wound"
        );
        assert_eq!(
            ImageClassifier::resolve_model(&upload("a.png", Some("glaucoma"))).unwrap().key,
            "glaucoma"
        );
        assert_matches!(
            ImageClassifier::resolve_model(&upload("a.png", Some("ct"))),
            Err(VisionError::InvalidModel)
        );
    }

    #[test]
    fn test_findings_prompt_includes_detection() {
        let model = find_model("dermatology").unwrap();
        let detection = Detection {
            detected_type: "dermatology",
            confidence: 90,
            reasoning: "Skin close-up".to_string(),
        };

        let prompt = findings_prompt(model, Some(&detection));
        assert!(prompt.contains("analyzing a analyzes skin conditions and dermatological findings image"));
        assert!(prompt.contains("- Detection Confidence: 90%"));
        assert!(!findings_prompt(model, None).contains("Auto-Detection Results"));
    }

    #[test]
    fn test_basic_findings() {
        let findings = basic_findings(find_model("wound").unwrap());
        assert_eq!(findings[0].label, "Wound Assessment Completed");
        assert_eq!(findings[1].score, 0.25);
    }
}
