//! Task descriptions sent to the automation worker
//!
//! The worker is driven by plain-language instructions. These builders own
//! the wording; the orchestration layer treats the result as opaque text.

/// Inputs for an auto-apply task
#[derive(Debug, Clone, Default)]
pub struct ApplicationBrief {
    pub title: String,
    pub company: String,
    pub url: Option<String>,
    /// Free-form applicant profile (resume text, contact details, answers)
    pub profile: Option<String>,
}

impl ApplicationBrief {
    pub fn describe(&self) -> String {
        let mut out = format!(
            "Apply to the \"{}\" position at {}.\n",
            self.title.trim(),
            self.company.trim()
        );
        if let Some(url) = self.url.as_deref().map(str::trim).filter(|u| !u.is_empty()) {
            out.push_str(&format!("Job posting: {}\n", url));
        } else {
            out.push_str("Find the official job posting on the company's careers page first.\n");
        }

        out.push_str(
            "\nSteps:\n\
             1. Open the job posting and locate the application form.\n\
             2. Fill out every required field using the applicant profile below.\n\
             3. Upload the resume when the form asks for one.\n\
             4. Submit the application and wait for the confirmation.\n\
             \nWhen done, report each step you took as a numbered list, any obstacle you hit \
             (login walls, captchas, closed postings), and state clearly whether the \
             application was submitted.\n",
        );

        if let Some(profile) = self.profile.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            out.push_str("\nApplicant profile:\n");
            out.push_str(profile);
            out.push('\n');
        }
        out
    }
}

/// Inputs for an HR contact search
#[derive(Debug, Clone, Default)]
pub struct ContactBrief {
    pub company: String,
    pub role: Option<String>,
    pub location: Option<String>,
}

impl ContactBrief {
    pub fn describe(&self) -> String {
        let mut out = format!(
            "Find HR, recruiting or talent acquisition contacts at {} on LinkedIn.\n",
            self.company.trim()
        );
        if let Some(role) = non_empty(&self.role) {
            out.push_str(&format!("Prefer people who hire for {} roles.\n", role));
        }
        if let Some(location) = non_empty(&self.location) {
            out.push_str(&format!("Prefer people based in {}.\n", location));
        }
        out.push_str(
            "\nList every contact on its own line as: Name - Title: profile URL\n\
             Report the profiles you reviewed and any obstacle you hit \
             (sign-in walls, captchas, private profiles).\n",
        );
        out
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
