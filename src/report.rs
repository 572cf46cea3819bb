use std::fmt::Write;

use crate::models::{ActivityKind, FacultyAppraisal};
use crate::rubric;

/// "2025" renders as "2025-26".
pub fn year_label(academic_year: i32) -> String {
    format!("{}-{:02}", academic_year, (academic_year + 1) % 100)
}

pub fn build_report(scope: Option<&str>, academic_year: i32, appraisals: &[FacultyAppraisal]) -> String {
    let mut output = String::new();
    let scope_label = scope.unwrap_or("all departments");

    let _ = writeln!(output, "# Faculty Self-Appraisal Report");
    let _ = writeln!(
        output,
        "Generated for {} (academic year {})",
        scope_label,
        year_label(academic_year)
    );

    if appraisals.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "No records found for this academic year.");
        return output;
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Scores");

    for score in rubric::score_faculty(appraisals) {
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "### {} ({}, {})",
            score.faculty.full_name, score.faculty.email, score.faculty.department
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "| Category | Marks | Max |");
        let _ = writeln!(output, "|---|---|---|");
        for line in &score.total.breakdown {
            let _ = writeln!(
                output,
                "| {} | {} | {} |",
                line.category.label(),
                line.mark,
                line.max
            );
        }
        let _ = writeln!(output);
        let _ = writeln!(
            output,
            "**Total: {} / {}**",
            score.total.total,
            rubric::NOMINAL_MAX
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Awards");

    let mut awards: Vec<(&FacultyAppraisal, &crate::models::ActivityRecord)> = Vec::new();
    for appraisal in appraisals {
        for activity in &appraisal.input.activities {
            if activity.kind == ActivityKind::Award {
                awards.push((appraisal, activity));
            }
        }
    }

    if awards.is_empty() {
        let _ = writeln!(output, "No awards recorded for this year.");
    } else {
        for (appraisal, award) in awards {
            let _ = writeln!(
                output,
                "- {}: {} ({})",
                appraisal.faculty.full_name, award.title, award.recorded_on
            );
        }
    }

    let mut recent: Vec<(&FacultyAppraisal, &crate::models::ActivityRecord)> = Vec::new();
    for appraisal in appraisals {
        for activity in &appraisal.input.activities {
            recent.push((appraisal, activity));
        }
    }
    recent.sort_by(|a, b| b.1.recorded_on.cmp(&a.1.recorded_on));

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Activity Notes");

    if recent.is_empty() {
        let _ = writeln!(output, "No activities recorded for this year.");
    } else {
        for (appraisal, activity) in recent.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}) on {}: {}",
                appraisal.faculty.full_name,
                activity.kind.as_str(),
                activity.recorded_on,
                activity.title
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        ActivityRecord, AppraisalInput, CourseRecord, FacultyRef, FeedbackRecord,
    };
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample_appraisal() -> FacultyAppraisal {
        FacultyAppraisal {
            faculty: FacultyRef {
                id: Uuid::new_v4(),
                full_name: "Meera Raghavan".to_string(),
                email: "meera.raghavan@college.edu".to_string(),
                department: "CSE".to_string(),
            },
            input: AppraisalInput {
                courses: vec![CourseRecord {
                    course_code: "CS301".to_string(),
                    students_appeared: 100,
                    pass_count: 96,
                }],
                feedback: vec![FeedbackRecord {
                    course_code: "CS301".to_string(),
                    feedback_percentage: 91.0,
                }],
                proctoring: vec![],
                research: vec![],
                activities: vec![ActivityRecord {
                    kind: ActivityKind::Award,
                    title: "Best faculty award".to_string(),
                    recorded_on: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
                }],
            },
        }
    }

    #[test]
    fn year_label_spans_two_calendar_years() {
        assert_eq!(year_label(2025), "2025-26");
        assert_eq!(year_label(1999), "1999-00");
    }

    #[test]
    fn empty_report_says_no_records() {
        let report = build_report(None, 2025, &[]);
        assert!(report.contains("all departments"));
        assert!(report.contains("No records found"));
    }

    #[test]
    fn report_lists_scores_awards_and_activities() {
        let report = build_report(Some("CSE"), 2025, &[sample_appraisal()]);
        assert!(report.contains("### Meera Raghavan"));
        assert!(report.contains("| Courses avg pass % | 20 | 20 |"));
        assert!(report.contains("**Total: 30 / 200**"));
        assert!(report.contains("- Meera Raghavan: Best faculty award (2026-01-12)"));
        assert!(report.contains("Recent Activity Notes"));
    }
}
