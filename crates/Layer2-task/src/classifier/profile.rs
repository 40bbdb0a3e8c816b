//! Keyword tables and message templates per task kind
//!
//! All indicators are lowercase; matching is done against the lowercased report.

use crate::task::TaskKind;

/// Boolean sub-accomplishment tracked by a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    ResumeSubmitted,
    FormsFilled,
    ProfilesReviewed,
}

/// Indicators that set one flag
#[derive(Debug, Clone, Copy)]
pub struct FlagRule {
    pub flag: Flag,
    pub indicators: &'static [&'static str],
}

/// One-line summaries, `{title}` and `{target}` are substituted
#[derive(Debug, Clone, Copy)]
pub struct MessageTemplates {
    pub success: &'static str,
    pub partial: &'static str,
    pub failed: &'static str,
}

/// Everything the keyword classifier needs to know about a task kind
#[derive(Debug, Clone, Copy)]
pub struct ClassifierProfile {
    pub kind: TaskKind,
    pub success: &'static [&'static str],
    pub partial: &'static [&'static str],
    pub flags: &'static [FlagRule],
    pub obstacles: &'static [&'static str],
    pub templates: MessageTemplates,
    pub extract_contacts: bool,
}

impl ClassifierProfile {
    pub fn for_kind(kind: TaskKind) -> &'static ClassifierProfile {
        match kind {
            TaskKind::Application => &APPLICATION,
            TaskKind::ContactSearch => &CONTACT_SEARCH,
        }
    }
}

// ========================================================================
// 지원서 제출 (job application)
// ========================================================================

pub static APPLICATION: ClassifierProfile = ClassifierProfile {
    kind: TaskKind::Application,
    success: &[
        "successfully submitted",
        "application submitted",
        "application was submitted",
        "application has been submitted",
        "successfully applied",
        "applied successfully",
        "submission confirmed",
        "thank you for applying",
        "thank you for your application",
        "application received",
    ],
    partial: &[
        "partially",
        "incomplete",
        "not all fields",
        "some fields",
        "could not complete",
        "unable to complete",
        "requires manual",
        "saved as draft",
        "pending review",
    ],
    flags: &[
        FlagRule {
            flag: Flag::ResumeSubmitted,
            indicators: &[
                "resume uploaded",
                "uploaded resume",
                "uploaded the resume",
                "uploaded my resume",
                "resume attached",
                "attached resume",
                "attached the resume",
                "cv uploaded",
                "uploaded cv",
                "uploaded the cv",
            ],
        },
        FlagRule {
            flag: Flag::FormsFilled,
            indicators: &[
                "form filled",
                "forms filled",
                "filled out",
                "filled in",
                "filled fields",
                "fields filled",
                "filled the form",
                "completed the form",
                "entered my information",
                "entered the information",
            ],
        },
    ],
    obstacles: &[
        "login required",
        "log in required",
        "sign in required",
        "sign-in required",
        "requires login",
        "account required",
        "create an account",
        "captcha",
        "access denied",
        "blocked",
        "timed out",
        "timeout",
        "no longer available",
        "no longer accepting",
        "position closed",
        "expired",
        "page not found",
        "verification code",
    ],
    templates: MessageTemplates {
        success: "Successfully applied to {title} at {target}",
        partial: "Partially completed application for {title} at {target}",
        failed: "Could not complete application for {title} at {target}",
    },
    extract_contacts: false,
};

// ========================================================================
// 연락처 검색 (HR contact search)
// ========================================================================

pub static CONTACT_SEARCH: ClassifierProfile = ClassifierProfile {
    kind: TaskKind::ContactSearch,
    success: &[
        "found the following",
        "successfully found",
        "identified the following",
        "here are the contacts",
        "contacts identified",
        "found several",
        "found multiple",
    ],
    partial: &[
        "only found",
        "limited results",
        "limited information",
        "partially",
        "could not verify",
        "unable to verify",
        "few results",
    ],
    flags: &[FlagRule {
        flag: Flag::ProfilesReviewed,
        indicators: &[
            "reviewed profile",
            "reviewed the profile",
            "viewed profile",
            "viewed the profile",
            "visited profile",
            "visited the profile",
            "profiles reviewed",
            "checked profile",
        ],
    }],
    obstacles: &[
        "login required",
        "sign in required",
        "sign-in required",
        "authwall",
        "captcha",
        "access denied",
        "blocked",
        "rate limit",
        "too many requests",
        "private profile",
        "no results",
        "no contacts found",
        "timed out",
        "security verification",
    ],
    templates: MessageTemplates {
        success: "Found HR contacts at {target}",
        partial: "Found limited contact information at {target}",
        failed: "No HR contacts found at {target}",
    },
    extract_contacts: true,
};
