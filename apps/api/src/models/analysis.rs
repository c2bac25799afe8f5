use serde::{Deserialize, Deserializer, Serialize};

/// Keyword/ATS verdict for a resume against one job description.
///
/// Wire shape matches what the analysis prompt asks the model for:
/// `{"analysis": {...}, "suggestions": [...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub analysis: KeywordAnalysis,
    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordAnalysis {
    #[serde(default)]
    pub missing_keywords: Vec<String>,
    #[serde(default)]
    pub keyword_matches: Vec<String>,
    /// 0 – 100. Any JSON number is accepted and clamped.
    #[serde(deserialize_with = "deserialize_ats_score")]
    pub ats_score: u8,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    /// summary | experience | skills | education
    pub category: String,
    /// high | medium | low
    pub priority: String,
    pub suggestion: String,
    #[serde(default)]
    pub reason: String,
}

fn deserialize_ats_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    if !raw.is_finite() {
        return Err(serde::de::Error::custom("ats_score must be a finite number"));
    }
    Ok(raw.round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_analysis_deserializes() {
        let json = r#"{
            "analysis": {
                "missing_keywords": ["kubernetes", "terraform"],
                "keyword_matches": ["rust", "postgres"],
                "ats_score": 82,
                "strengths": ["Strong systems background"],
                "weaknesses": ["No cloud certifications"]
            },
            "suggestions": [
                {
                    "category": "skills",
                    "priority": "high",
                    "suggestion": "List Kubernetes under technical skills",
                    "reason": "Mentioned four times in the posting"
                }
            ]
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.analysis.ats_score, 82);
        assert_eq!(result.analysis.missing_keywords.len(), 2);
        assert_eq!(result.suggestions[0].priority, "high");
    }

    #[test]
    fn test_fractional_and_out_of_range_scores_are_clamped() {
        let json = r#"{"analysis": {"ats_score": 87.6}}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.analysis.ats_score, 88);

        let json = r#"{"analysis": {"ats_score": 140}}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.analysis.ats_score, 100);

        let json = r#"{"analysis": {"ats_score": -3}}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.analysis.ats_score, 0);
    }

    #[test]
    fn test_missing_score_is_rejected() {
        let json = r#"{"analysis": {"missing_keywords": []}, "suggestions": []}"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());
    }

    #[test]
    fn test_flat_shape_is_rejected() {
        // The score must sit under "analysis"; a flat object is not the requested schema.
        let json = r#"{"ats_score": 70, "missing_keywords": []}"#;
        assert!(serde_json::from_str::<AnalysisResult>(json).is_err());
    }
}
