use std::fmt;

use crate::models::{ActivityKind, AppraisalInput, FacultyAppraisal, FacultyRef, ResearchCategory};

/// Nominal maximum for the appraisal total. Sums past this (possible when
/// research marks are unusually large) are clamped for display; the raw sum
/// stays available on [`AppraisalTotal`].
pub const NOMINAL_MAX: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    NonNumeric { value: String },
    Negative { value: f64 },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonNumeric { value } => write!(f, "metric is not numeric: {value}"),
            Self::Negative { value } => write!(f, "metric must be non-negative, got {value}"),
        }
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    CoursePass,
    Feedback,
    Proctoring,
    Outreach,
    Responsibilities,
    Contribution,
    Sci,
    ScopusWos,
    Proposal,
    ResearchOther,
    Workshops,
}

impl Category {
    /// Fixed order for breakdown tables and reports.
    pub const DISPLAY_ORDER: [Category; 11] = [
        Category::CoursePass,
        Category::Feedback,
        Category::Proctoring,
        Category::Outreach,
        Category::Responsibilities,
        Category::Contribution,
        Category::Sci,
        Category::ScopusWos,
        Category::Proposal,
        Category::ResearchOther,
        Category::Workshops,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::CoursePass => "Courses avg pass %",
            Category::Feedback => "Course feedback %",
            Category::Proctoring => "Proctoring pass %",
            Category::Outreach => "Outreach activities",
            Category::Responsibilities => "Responsibilities",
            Category::Contribution => "Special contribution",
            Category::Sci => "SCI publications",
            Category::ScopusWos => "Scopus/WoS publications",
            Category::Proposal => "Funding proposals",
            Category::ResearchOther => "Other research",
            Category::Workshops => "Workshops attended",
        }
    }

    pub fn max_mark(&self) -> u32 {
        match self {
            Category::CoursePass => 20,
            Category::Feedback => 10,
            Category::Proctoring => 20,
            Category::Outreach => 10,
            Category::Responsibilities => 20,
            Category::Contribution => 10,
            Category::Sci => 20,
            Category::ScopusWos => 15,
            Category::Proposal => 10,
            Category::ResearchOther => 10,
            Category::Workshops => 10,
        }
    }
}

/// Threshold ladder: tiers ordered highest-first, floor as catch-all.
struct Ladder {
    tiers: &'static [(f64, u32)],
    floor: u32,
}

impl Ladder {
    fn mark(&self, percentage: f64) -> u32 {
        for &(threshold, mark) in self.tiers {
            if percentage >= threshold {
                return mark;
            }
        }
        self.floor
    }
}

const COURSE_PASS_LADDER: Ladder = Ladder {
    tiers: &[(95.0, 20), (85.0, 15)],
    floor: 10,
};

const FEEDBACK_LADDER: Ladder = Ladder {
    tiers: &[(90.0, 10), (80.0, 8), (70.0, 6)],
    floor: 4,
};

const PROCTORING_LADDER: Ladder = Ladder {
    tiers: &[(95.0, 20), (85.0, 15), (75.0, 10)],
    floor: 0,
};

pub fn course_pass_mark(percentage: f64) -> u32 {
    COURSE_PASS_LADDER.mark(percentage)
}

pub fn feedback_mark(percentage: f64) -> u32 {
    FEEDBACK_LADDER.mark(percentage)
}

pub fn proctoring_mark(percentage: f64) -> u32 {
    PROCTORING_LADDER.mark(percentage)
}

/// Presence categories are all-or-nothing; count magnitude beyond one does
/// not change the mark.
pub fn presence_mark(count: usize, max: u32) -> u32 {
    if count > 0 {
        max
    } else {
        0
    }
}

/// Zero denominator scores as 0.0 rather than NaN so downstream ladders
/// land on their floor tier.
pub fn pass_percentage(passed: i32, appeared: i32) -> f64 {
    if appeared <= 0 {
        return 0.0;
    }
    passed as f64 / appeared as f64 * 100.0
}

/// Metrics cross the boundary as JSON numbers or numeric strings.
pub fn coerce_metric(value: &serde_json::Value) -> Result<f64, ValidationError> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64().ok_or_else(|| ValidationError::NonNumeric {
            value: n.to_string(),
        })?,
        serde_json::Value::String(s) => {
            s.trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::NonNumeric { value: s.clone() })?
        }
        other => {
            return Err(ValidationError::NonNumeric {
                value: other.to_string(),
            })
        }
    };

    if !parsed.is_finite() {
        return Err(ValidationError::NonNumeric {
            value: parsed.to_string(),
        });
    }
    if parsed < 0.0 {
        return Err(ValidationError::Negative { value: parsed });
    }
    Ok(parsed)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryMarks {
    pub course_pass: u32,
    pub feedback: u32,
    pub proctoring: u32,
    pub outreach: u32,
    pub responsibilities: u32,
    pub contribution: u32,
    pub sci: u32,
    pub scopus_wos: u32,
    pub proposal: u32,
    pub research_other: u32,
    pub workshops: u32,
}

impl CategoryMarks {
    pub fn get(&self, category: Category) -> u32 {
        match category {
            Category::CoursePass => self.course_pass,
            Category::Feedback => self.feedback,
            Category::Proctoring => self.proctoring,
            Category::Outreach => self.outreach,
            Category::Responsibilities => self.responsibilities,
            Category::Contribution => self.contribution,
            Category::Sci => self.sci,
            Category::ScopusWos => self.scopus_wos,
            Category::Proposal => self.proposal,
            Category::ResearchOther => self.research_other,
            Category::Workshops => self.workshops,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MarkLine {
    pub category: Category,
    pub mark: u32,
    pub max: u32,
}

#[derive(Debug, Clone)]
pub struct AppraisalTotal {
    pub total: u32,
    pub raw_total: u32,
    pub breakdown: Vec<MarkLine>,
}

pub fn evaluate(input: &AppraisalInput) -> CategoryMarks {
    let course_avg = if input.courses.is_empty() {
        0.0
    } else {
        let sum: f64 = input
            .courses
            .iter()
            .map(|c| pass_percentage(c.pass_count, c.students_appeared))
            .sum();
        sum / input.courses.len() as f64
    };

    let feedback_avg = if input.feedback.is_empty() {
        0.0
    } else {
        let sum: f64 = input.feedback.iter().map(|f| f.feedback_percentage).sum();
        sum / input.feedback.len() as f64
    };

    let eligible: i32 = input.proctoring.iter().map(|p| p.eligible_students).sum();
    let passed: i32 = input.proctoring.iter().map(|p| p.passed_students).sum();
    let proctoring_pct = pass_percentage(passed, eligible);

    let count_of = |kind: ActivityKind| input.activities.iter().filter(|a| a.kind == kind).count();

    let research_mark = |category: ResearchCategory| {
        input
            .research
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, marks)| *marks)
            .unwrap_or(0)
    };

    CategoryMarks {
        course_pass: course_pass_mark(course_avg),
        feedback: feedback_mark(feedback_avg),
        proctoring: proctoring_mark(proctoring_pct),
        outreach: presence_mark(count_of(ActivityKind::Outreach), Category::Outreach.max_mark()),
        responsibilities: presence_mark(
            count_of(ActivityKind::Responsibility),
            Category::Responsibilities.max_mark(),
        ),
        contribution: presence_mark(
            count_of(ActivityKind::Contribution),
            Category::Contribution.max_mark(),
        ),
        sci: research_mark(ResearchCategory::Sci),
        scopus_wos: research_mark(ResearchCategory::ScopusWos),
        proposal: research_mark(ResearchCategory::Proposal),
        research_other: research_mark(ResearchCategory::Other),
        workshops: research_mark(ResearchCategory::Workshops),
    }
}

pub fn aggregate(marks: &CategoryMarks) -> AppraisalTotal {
    let breakdown: Vec<MarkLine> = Category::DISPLAY_ORDER
        .iter()
        .map(|&category| MarkLine {
            category,
            mark: marks.get(category),
            max: category.max_mark(),
        })
        .collect();

    let raw_total: u32 = breakdown.iter().map(|line| line.mark).sum();

    AppraisalTotal {
        total: raw_total.min(NOMINAL_MAX),
        raw_total,
        breakdown,
    }
}

#[derive(Debug, Clone)]
pub struct FacultyScore {
    pub faculty: FacultyRef,
    pub total: AppraisalTotal,
}

pub fn score_faculty(appraisals: &[FacultyAppraisal]) -> Vec<FacultyScore> {
    let mut scores: Vec<FacultyScore> = appraisals
        .iter()
        .map(|appraisal| FacultyScore {
            faculty: appraisal.faculty.clone(),
            total: aggregate(&evaluate(&appraisal.input)),
        })
        .collect();

    scores.sort_by(|a, b| b.total.total.cmp(&a.total.total));
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityRecord, CourseRecord, FeedbackRecord, ProctoringRecord};
    use chrono::NaiveDate;

    fn activity(kind: ActivityKind) -> ActivityRecord {
        ActivityRecord {
            kind,
            title: "departmental duty".to_string(),
            recorded_on: NaiveDate::from_ymd_opt(2025, 9, 10).unwrap(),
        }
    }

    #[test]
    fn course_pass_ladder_partitions_at_95_and_85() {
        assert_eq!(course_pass_mark(100.0), 20);
        assert_eq!(course_pass_mark(95.0), 20);
        assert_eq!(course_pass_mark(94.99), 15);
        assert_eq!(course_pass_mark(85.0), 15);
        assert_eq!(course_pass_mark(84.99), 10);
        assert_eq!(course_pass_mark(0.0), 10);
    }

    #[test]
    fn feedback_ladder_partitions_at_90_80_70() {
        assert_eq!(feedback_mark(95.0), 10);
        assert_eq!(feedback_mark(90.0), 10);
        assert_eq!(feedback_mark(89.9), 8);
        assert_eq!(feedback_mark(80.0), 8);
        assert_eq!(feedback_mark(79.9), 6);
        assert_eq!(feedback_mark(70.0), 6);
        assert_eq!(feedback_mark(69.9), 4);
        assert_eq!(feedback_mark(0.0), 4);
    }

    #[test]
    fn proctoring_ladder_partitions_at_95_85_75_with_zero_floor() {
        assert_eq!(proctoring_mark(95.0), 20);
        assert_eq!(proctoring_mark(94.9), 15);
        assert_eq!(proctoring_mark(85.0), 15);
        assert_eq!(proctoring_mark(84.9), 10);
        assert_eq!(proctoring_mark(75.0), 10);
        assert_eq!(proctoring_mark(74.9), 0);
        assert_eq!(proctoring_mark(0.0), 0);
    }

    #[test]
    fn percentage_marks_are_monotonic() {
        let mut previous = 0;
        for step in 0..=1000 {
            let pct = step as f64 / 10.0;
            let mark = course_pass_mark(pct);
            assert!(mark >= previous, "mark dropped at {pct}");
            previous = mark;
        }
    }

    #[test]
    fn presence_marks_are_binary() {
        assert_eq!(presence_mark(0, 10), 0);
        assert_eq!(presence_mark(1, 10), 10);
        assert_eq!(presence_mark(7, 10), 10);
        assert_eq!(presence_mark(0, 20), 0);
        assert_eq!(presence_mark(3, 20), 20);
    }

    #[test]
    fn zero_denominator_yields_zero_not_nan() {
        let pct = pass_percentage(0, 0);
        assert_eq!(pct, 0.0);
        assert!(!pct.is_nan());
        assert_eq!(pass_percentage(5, 0), 0.0);
    }

    #[test]
    fn coerce_metric_accepts_numbers_and_numeric_strings() {
        assert_eq!(coerce_metric(&serde_json::json!(82.5)).unwrap(), 82.5);
        assert_eq!(coerce_metric(&serde_json::json!(12)).unwrap(), 12.0);
        assert_eq!(coerce_metric(&serde_json::json!("90")).unwrap(), 90.0);
        assert_eq!(coerce_metric(&serde_json::json!(" 73.2 ")).unwrap(), 73.2);
    }

    #[test]
    fn coerce_metric_rejects_junk_and_negatives() {
        assert!(matches!(
            coerce_metric(&serde_json::json!("ninety")),
            Err(ValidationError::NonNumeric { .. })
        ));
        assert!(matches!(
            coerce_metric(&serde_json::json!(null)),
            Err(ValidationError::NonNumeric { .. })
        ));
        assert!(matches!(
            coerce_metric(&serde_json::json!(-3)),
            Err(ValidationError::Negative { .. })
        ));
    }

    #[test]
    fn aggregate_matches_arithmetic_sum() {
        let marks = CategoryMarks {
            course_pass: 20,
            feedback: 8,
            proctoring: 10,
            outreach: 10,
            responsibilities: 0,
            contribution: 10,
            sci: 20,
            scopus_wos: 15,
            proposal: 0,
            research_other: 10,
            workshops: 10,
        };
        let total = aggregate(&marks);
        let sum: u32 = Category::DISPLAY_ORDER.iter().map(|&c| marks.get(c)).sum();
        assert_eq!(total.total, sum);
        assert_eq!(total.breakdown.len(), 11);
    }

    #[test]
    fn aggregate_clamps_display_total_at_nominal_max() {
        let marks = CategoryMarks {
            course_pass: 20,
            feedback: 10,
            proctoring: 20,
            outreach: 10,
            responsibilities: 20,
            contribution: 10,
            sci: 60,
            scopus_wos: 40,
            proposal: 10,
            research_other: 10,
            workshops: 10,
        };
        let total = aggregate(&marks);
        assert_eq!(total.raw_total, 220);
        assert_eq!(total.total, NOMINAL_MAX);
    }

    #[test]
    fn mixed_scenario_scores_58_across_six_categories() {
        let input = AppraisalInput {
            courses: vec![CourseRecord {
                course_code: "CS301".to_string(),
                students_appeared: 100,
                pass_count: 96,
            }],
            feedback: vec![FeedbackRecord {
                course_code: "CS301".to_string(),
                feedback_percentage: 82.0,
            }],
            proctoring: vec![ProctoringRecord {
                eligible_students: 50,
                passed_students: 39,
            }],
            research: vec![],
            activities: vec![
                activity(ActivityKind::Outreach),
                activity(ActivityKind::Outreach),
                activity(ActivityKind::Contribution),
            ],
        };

        let marks = evaluate(&input);
        assert_eq!(marks.course_pass, 20);
        assert_eq!(marks.feedback, 8);
        assert_eq!(marks.proctoring, 10);
        assert_eq!(marks.outreach, 10);
        assert_eq!(marks.responsibilities, 0);
        assert_eq!(marks.contribution, 10);
        assert_eq!(aggregate(&marks).total, 58);
    }

    #[test]
    fn empty_input_lands_on_floor_tiers() {
        let marks = evaluate(&AppraisalInput::default());
        assert_eq!(marks.course_pass, 10);
        assert_eq!(marks.feedback, 4);
        assert_eq!(marks.proctoring, 0);
        assert_eq!(marks.outreach, 0);
        assert_eq!(marks.responsibilities, 0);
        assert_eq!(marks.contribution, 0);
        assert_eq!(marks.sci, 0);
        assert_eq!(aggregate(&marks).total, 14);
    }

    #[test]
    fn awards_never_contribute_to_marks() {
        let input = AppraisalInput {
            activities: vec![activity(ActivityKind::Award), activity(ActivityKind::Award)],
            ..Default::default()
        };
        let marks = evaluate(&input);
        assert_eq!(marks.outreach, 0);
        assert_eq!(marks.responsibilities, 0);
        assert_eq!(marks.contribution, 0);
    }

    #[test]
    fn research_marks_pass_through_unchanged() {
        let input = AppraisalInput {
            research: vec![
                (ResearchCategory::Sci, 20),
                (ResearchCategory::ScopusWos, 15),
                (ResearchCategory::Workshops, 10),
            ],
            ..Default::default()
        };
        let marks = evaluate(&input);
        assert_eq!(marks.sci, 20);
        assert_eq!(marks.scopus_wos, 15);
        assert_eq!(marks.workshops, 10);
        assert_eq!(marks.proposal, 0);
        assert_eq!(marks.research_other, 0);
    }
}
