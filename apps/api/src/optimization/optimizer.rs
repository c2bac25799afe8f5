//! Resume rewrite: second model call, fed the analysis from the first.

use thiserror::Error;
use tracing::info;

use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{parse_json_reply, ChatModel, LlmError};
use crate::models::analysis::AnalysisResult;
use crate::models::resume::{OptimizedResume, PersonalInfo};
use crate::optimization::outcome::{prefix_chars, Structured};
use crate::optimization::prompts::{OPTIMIZATION_PROMPT_TEMPLATE, OPTIMIZATION_SYSTEM};

const RESUME_CHAR_LIMIT: usize = 3000;
const JOB_DESCRIPTION_CHAR_LIMIT: usize = 1500;

#[derive(Debug, Error)]
pub enum OptimizationError {
    #[error("Failed to optimize content: {0}")]
    Llm(#[from] LlmError),

    #[error("Failed to optimize content: could not serialize analysis: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Asks the model for an `OptimizedResume`. Unparseable replies fall back to
/// `fallback_resume()`; only a failed call is an error.
pub async fn optimize(
    llm: &dyn ChatModel,
    resume_text: &str,
    job_description: &str,
    analysis: &AnalysisResult,
) -> Result<Structured<OptimizedResume>, OptimizationError> {
    let analysis_json = serde_json::to_string_pretty(analysis)?;
    let system = format!("{OPTIMIZATION_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}");
    let prompt = fill_template(
        OPTIMIZATION_PROMPT_TEMPLATE,
        &[
            ("analysis_json", analysis_json.as_str()),
            ("resume_text", prefix_chars(resume_text, RESUME_CHAR_LIMIT)),
            (
                "job_description",
                prefix_chars(job_description, JOB_DESCRIPTION_CHAR_LIMIT),
            ),
        ],
    );

    let reply = llm.complete(&system, &prompt).await?;

    match parse_json_reply::<OptimizedResume>(&reply) {
        Ok(resume) => {
            info!(
                experience = resume.experience.len(),
                education = resume.education.len(),
                "Optimized resume parsed"
            );
            Ok(Structured::Parsed(resume))
        }
        Err(e) => Ok(Structured::Fallback {
            value: fallback_resume(),
            reason: e.to_string(),
        }),
    }
}

/// Placeholder resume used when the model's reply cannot be parsed.
pub fn fallback_resume() -> OptimizedResume {
    OptimizedResume {
        personal_info: PersonalInfo {
            name: Some("John Doe".to_string()),
            email: Some("john.doe@email.com".to_string()),
            phone: Some("(555) 123-4567".to_string()),
            location: Some("City, State".to_string()),
            ..PersonalInfo::default()
        },
        summary: Some(
            "Optimized professional summary incorporating relevant keywords from the job description."
                .to_string(),
        ),
        ..OptimizedResume::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::scripted::{Reply, ScriptedModel};
    use crate::optimization::analyzer::fallback_analysis;

    const JD: &str = "Senior data engineer: Spark, Airflow, dbt, strong SQL, stakeholder communication.";

    #[tokio::test]
    async fn test_valid_reply_is_parsed() {
        let model = ScriptedModel::texts([r#"{
            "personal_info": {"name": "Ada Lovelace", "email": "ada@example.com"},
            "summary": "Data engineer focused on Spark pipelines.",
            "experience": [{
                "company": "Analytical Engines Ltd",
                "position": "Data Engineer",
                "start_date": "01/2020",
                "end_date": "Present",
                "achievements": ["Cut batch runtime by 60% with Spark tuning"]
            }],
            "skills": {"technical": ["Spark", "Airflow"], "soft": []}
        }"#]);

        let outcome = optimize(&model, "resume", JD, &fallback_analysis())
            .await
            .unwrap();
        assert!(!outcome.is_degraded());
        let resume = outcome.value();
        assert_eq!(resume.personal_info.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(resume.experience[0].achievements.len(), 1);
        assert!(resume.education.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_reply_falls_back() {
        let model = ScriptedModel::texts([r#"{"personal_info": {"name": "Ada""#]);
        let outcome = optimize(&model, "resume", JD, &fallback_analysis())
            .await
            .unwrap();
        assert!(outcome.is_degraded());
        let resume = outcome.value();
        assert_eq!(resume.personal_info.name.as_deref(), Some("John Doe"));
        assert!(resume.experience.is_empty());
        assert!(resume.skills.technical.is_empty());
    }

    #[tokio::test]
    async fn test_remote_failure_is_an_error() {
        let model = ScriptedModel::new(vec![Reply::Unavailable]);
        let err = optimize(&model, "resume", JD, &fallback_analysis())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Failed to optimize content:"));
    }

    #[tokio::test]
    async fn test_prompt_carries_analysis_and_truncated_inputs() {
        let model = ScriptedModel::texts(["{}"]);
        let jd = "j".repeat(2000);
        optimize(&model, &"r".repeat(3500), &jd, &fallback_analysis())
            .await
            .unwrap();

        let prompt = &model.calls()[0].prompt;
        assert!(prompt.contains("\"ats_score\": 75"));
        assert!(prompt.contains(&"j".repeat(1500)));
        assert!(!prompt.contains(&"j".repeat(1501)));
        assert!(!prompt.contains(&"r".repeat(3001)));
    }
}
