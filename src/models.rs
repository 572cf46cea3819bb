use chrono::NaiveDate;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct FacultyRef {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub department: String,
}

#[derive(Debug, Clone)]
pub struct CourseRecord {
    pub course_code: String,
    pub students_appeared: i32,
    pub pass_count: i32,
}

#[derive(Debug, Clone)]
pub struct FeedbackRecord {
    pub course_code: String,
    pub feedback_percentage: f64,
}

#[derive(Debug, Clone)]
pub struct ProctoringRecord {
    pub eligible_students: i32,
    pub passed_students: i32,
}

/// Marks in these categories arrive precomputed from the research cell's
/// system; the rubric passes them through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResearchCategory {
    Sci,
    ScopusWos,
    Proposal,
    Other,
    Workshops,
}

impl ResearchCategory {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sci" => Some(Self::Sci),
            "scopus_wos" => Some(Self::ScopusWos),
            "proposal" => Some(Self::Proposal),
            "other" => Some(Self::Other),
            "workshops" => Some(Self::Workshops),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sci => "sci",
            Self::ScopusWos => "scopus_wos",
            Self::Proposal => "proposal",
            Self::Other => "other",
            Self::Workshops => "workshops",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Outreach,
    Responsibility,
    Contribution,
    Award,
}

impl ActivityKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "outreach" => Some(Self::Outreach),
            "responsibility" => Some(Self::Responsibility),
            "contribution" => Some(Self::Contribution),
            "award" => Some(Self::Award),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Outreach => "outreach",
            Self::Responsibility => "responsibility",
            Self::Contribution => "contribution",
            Self::Award => "award",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ActivityRecord {
    pub kind: ActivityKind,
    pub title: String,
    pub recorded_on: NaiveDate,
}

/// Everything one faculty member entered for one academic year.
#[derive(Debug, Clone, Default)]
pub struct AppraisalInput {
    pub courses: Vec<CourseRecord>,
    pub feedback: Vec<FeedbackRecord>,
    pub proctoring: Vec<ProctoringRecord>,
    pub research: Vec<(ResearchCategory, u32)>,
    pub activities: Vec<ActivityRecord>,
}

#[derive(Debug, Clone)]
pub struct FacultyAppraisal {
    pub faculty: FacultyRef,
    pub input: AppraisalInput,
}
