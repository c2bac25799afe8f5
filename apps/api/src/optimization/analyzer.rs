//! Resume analysis: one model call that scores a resume against a job
//! description and lists keyword gaps and suggestions.

use thiserror::Error;
use tracing::info;

use crate::llm_client::prompts::{fill_template, JSON_ONLY_INSTRUCTION};
use crate::llm_client::{parse_json_reply, ChatModel, LlmError};
use crate::models::analysis::{AnalysisResult, KeywordAnalysis, Suggestion};
use crate::optimization::outcome::{prefix_chars, Structured};
use crate::optimization::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};

const RESUME_CHAR_LIMIT: usize = 3000;
const JOB_DESCRIPTION_CHAR_LIMIT: usize = 2000;

#[derive(Debug, Error)]
#[error("Failed to analyze resume: {0}")]
pub struct AnalysisError(#[from] pub LlmError);

/// Asks the model for an `AnalysisResult`.
///
/// Only a failed call is an error. A reply that does not parse becomes
/// `Structured::Fallback` with `fallback_analysis()`.
pub async fn analyze(
    llm: &dyn ChatModel,
    resume_text: &str,
    job_description: &str,
) -> Result<Structured<AnalysisResult>, AnalysisError> {
    let system = format!("{ANALYSIS_SYSTEM}\n\n{JSON_ONLY_INSTRUCTION}");
    let prompt = fill_template(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            (
                "job_description",
                prefix_chars(job_description, JOB_DESCRIPTION_CHAR_LIMIT),
            ),
            ("resume_text", prefix_chars(resume_text, RESUME_CHAR_LIMIT)),
        ],
    );

    let reply = llm.complete(&system, &prompt).await?;

    match parse_json_reply::<AnalysisResult>(&reply) {
        Ok(result) => {
            info!(
                ats_score = result.analysis.ats_score,
                suggestions = result.suggestions.len(),
                "Resume analysis parsed"
            );
            Ok(Structured::Parsed(result))
        }
        Err(e) => Ok(Structured::Fallback {
            value: fallback_analysis(),
            reason: e.to_string(),
        }),
    }
}

/// Fixed analysis used when the model's reply cannot be parsed.
pub fn fallback_analysis() -> AnalysisResult {
    AnalysisResult {
        analysis: KeywordAnalysis {
            missing_keywords: strings(&["communication", "leadership", "problem-solving"]),
            keyword_matches: strings(&["python", "javascript", "sql"]),
            ats_score: 75,
            strengths: strings(&["Technical skills well presented"]),
            weaknesses: strings(&["Missing relevant keywords"]),
        },
        suggestions: vec![Suggestion {
            category: "summary".to_string(),
            priority: "high".to_string(),
            suggestion: "Add more keywords from job description".to_string(),
            reason: "Improves ATS keyword matching".to_string(),
        }],
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
