use std::path::PathBuf;

use thiserror::Error;

/// Display name the server assigns to pasted-text submissions.
pub const TEXT_INPUT_NAME: &str = "text-input";

/// Raw form input, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnalysisInput {
    pub resume_file: Option<PathBuf>,
    pub resume_text: String,
    pub company_name: String,
    pub job_description: String,
    pub position: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please upload a file or paste your resume.")]
    MissingResume,
    #[error("Provide either a resume file or pasted resume text, not both.")]
    AmbiguousResume,
    #[error("Please enter the company name.")]
    MissingCompany,
    #[error("Please enter the job description.")]
    MissingJobDescription,
}

/// Exactly one resume source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResumeSource {
    File(PathBuf),
    Text(String),
}

impl ResumeSource {
    /// Name the job will be known by once created.
    pub fn display_name(&self) -> String {
        match self {
            ResumeSource::File(path) => path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
            ResumeSource::Text(_) => TEXT_INPUT_NAME.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ResumeSource::File(_) => "file",
            ResumeSource::Text(_) => "text",
        }
    }
}

/// Validated job-creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub resume: ResumeSource,
    pub company_name: String,
    pub job_description: String,
    pub position: Option<String>,
}

impl AnalysisInput {
    /// Checks required fields locally, before any network activity.
    pub fn validate(&self) -> Result<SubmissionRequest, ValidationError> {
        let text = self.resume_text.trim();
        let resume = match (&self.resume_file, text.is_empty()) {
            (Some(_), false) => return Err(ValidationError::AmbiguousResume),
            (Some(path), true) => ResumeSource::File(path.clone()),
            (None, false) => ResumeSource::Text(self.resume_text.clone()),
            (None, true) => return Err(ValidationError::MissingResume),
        };

        let company_name = self.company_name.trim();
        if company_name.is_empty() {
            return Err(ValidationError::MissingCompany);
        }
        let job_description = self.job_description.trim();
        if job_description.is_empty() {
            return Err(ValidationError::MissingJobDescription);
        }
        let position = Some(self.position.trim())
            .filter(|p| !p.is_empty())
            .map(ToOwned::to_owned);

        Ok(SubmissionRequest {
            resume,
            company_name: company_name.to_string(),
            job_description: job_description.to_string(),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> AnalysisInput {
        AnalysisInput {
            resume_text: "Rust engineer".to_string(),
            company_name: " Acme ".to_string(),
            job_description: "Build things".to_string(),
            ..AnalysisInput::default()
        }
    }

    #[test]
    fn missing_fields_are_reported_in_form_order() {
        let mut input = complete();
        input.resume_text = "   ".to_string();
        input.company_name.clear();
        assert_eq!(input.validate(), Err(ValidationError::MissingResume));

        let mut input = complete();
        input.company_name = "  ".to_string();
        assert_eq!(input.validate(), Err(ValidationError::MissingCompany));

        let mut input = complete();
        input.job_description.clear();
        assert_eq!(input.validate(), Err(ValidationError::MissingJobDescription));
    }

    #[test]
    fn file_and_text_together_are_rejected() {
        let mut input = complete();
        input.resume_file = Some(PathBuf::from("cv.pdf"));
        assert_eq!(input.validate(), Err(ValidationError::AmbiguousResume));
    }

    #[test]
    fn valid_input_trims_and_drops_blank_position() {
        let request = complete().validate().unwrap();
        assert_eq!(request.company_name, "Acme");
        assert_eq!(request.position, None);
        assert_eq!(request.resume.display_name(), TEXT_INPUT_NAME);

        let mut input = complete();
        input.resume_text.clear();
        input.resume_file = Some(PathBuf::from("/tmp/cv.pdf"));
        let request = input.validate().unwrap();
        assert_eq!(request.resume.display_name(), "cv.pdf");
    }
}
