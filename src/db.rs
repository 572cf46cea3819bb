use anyhow::Context;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::models::{
    ActivityKind, ActivityRecord, AppraisalInput, CourseRecord, FacultyAppraisal, FacultyRef,
    FeedbackRecord, ProctoringRecord, ResearchCategory,
};
use crate::rubric;

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_faculty(
    pool: &PgPool,
    id: Uuid,
    full_name: &str,
    email: &str,
    department: &str,
) -> anyhow::Result<Uuid> {
    let row = sqlx::query(
        r#"
        INSERT INTO faculty_appraisal.faculty (id, full_name, email, department)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE
        SET full_name = EXCLUDED.full_name, department = EXCLUDED.department
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(full_name)
    .bind(email)
    .bind(department)
    .fetch_one(pool)
    .await?;

    Ok(row.get("id"))
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let faculty = vec![
        (
            Uuid::parse_str("7a1c9b5e-53d2-4f4e-9a41-2b6f1d8c03aa")?,
            "Meera Raghavan",
            "meera.raghavan@college.edu",
            "CSE",
        ),
        (
            Uuid::parse_str("1f42a8d0-6c3b-4b7a-8f2e-90d417c5be01")?,
            "Arjun Nair",
            "arjun.nair@college.edu",
            "CSE",
        ),
        (
            Uuid::parse_str("c8503f76-1de9-44b0-b1c7-5a2e96f0d4b3")?,
            "Latha Subramani",
            "latha.subramani@college.edu",
            "ECE",
        ),
    ];

    for (id, name, email, department) in faculty {
        upsert_faculty(pool, id, name, email, department).await?;
    }

    let courses = vec![
        ("seed-course-001", "meera.raghavan@college.edu", "CS301", 62, 60, 2025),
        ("seed-course-002", "meera.raghavan@college.edu", "CS405", 58, 51, 2025),
        ("seed-course-003", "arjun.nair@college.edu", "CS210", 70, 55, 2025),
        ("seed-course-004", "latha.subramani@college.edu", "EC302", 65, 63, 2025),
    ];

    for (source_key, email, course_code, appeared, passed, year) in courses {
        let faculty_id = faculty_id_by_email(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO faculty_appraisal.courses
            (id, faculty_id, course_code, students_appeared, pass_count, academic_year, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(faculty_id)
        .bind(course_code)
        .bind(appeared)
        .bind(passed)
        .bind(year)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let feedback = vec![
        ("seed-fb-001", "meera.raghavan@college.edu", "CS301", 91.5, 2025),
        ("seed-fb-002", "meera.raghavan@college.edu", "CS405", 86.0, 2025),
        ("seed-fb-003", "arjun.nair@college.edu", "CS210", 74.0, 2025),
        ("seed-fb-004", "latha.subramani@college.edu", "EC302", 88.5, 2025),
    ];

    for (source_key, email, course_code, percentage, year) in feedback {
        let faculty_id = faculty_id_by_email(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO faculty_appraisal.feedback
            (id, faculty_id, course_code, feedback_percentage, academic_year, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(faculty_id)
        .bind(course_code)
        .bind(percentage)
        .bind(year)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let proctoring = vec![
        ("seed-proc-001", "meera.raghavan@college.edu", 40, 39, 2025),
        ("seed-proc-002", "arjun.nair@college.edu", 45, 35, 2025),
        ("seed-proc-003", "latha.subramani@college.edu", 38, 33, 2025),
    ];

    for (source_key, email, eligible, passed, year) in proctoring {
        let faculty_id = faculty_id_by_email(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO faculty_appraisal.proctoring
            (id, faculty_id, eligible_students, passed_students, academic_year, source_key)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(faculty_id)
        .bind(eligible)
        .bind(passed)
        .bind(year)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    let research = vec![
        ("meera.raghavan@college.edu", ResearchCategory::Sci, 20, 2025),
        ("meera.raghavan@college.edu", ResearchCategory::Workshops, 10, 2025),
        ("arjun.nair@college.edu", ResearchCategory::ScopusWos, 15, 2025),
        ("latha.subramani@college.edu", ResearchCategory::Proposal, 10, 2025),
    ];

    for (email, category, marks, year) in research {
        let faculty_id = faculty_id_by_email(pool, email).await?;
        upsert_research_marks(pool, faculty_id, category, marks, year).await?;
    }

    let activities = vec![
        (
            "seed-act-001",
            "meera.raghavan@college.edu",
            ActivityKind::Responsibility,
            "NBA accreditation coordinator",
            NaiveDate::from_ymd_opt(2025, 8, 20).context("invalid date")?,
            2025,
        ),
        (
            "seed-act-002",
            "meera.raghavan@college.edu",
            ActivityKind::Award,
            "Best faculty award, college day",
            NaiveDate::from_ymd_opt(2026, 1, 12).context("invalid date")?,
            2025,
        ),
        (
            "seed-act-003",
            "arjun.nair@college.edu",
            ActivityKind::Outreach,
            "School coding camp mentor",
            NaiveDate::from_ymd_opt(2025, 11, 3).context("invalid date")?,
            2025,
        ),
        (
            "seed-act-004",
            "latha.subramani@college.edu",
            ActivityKind::Contribution,
            "Lab modernization proposal",
            NaiveDate::from_ymd_opt(2025, 12, 18).context("invalid date")?,
            2025,
        ),
    ];

    for (source_key, email, kind, title, recorded_on, year) in activities {
        let faculty_id = faculty_id_by_email(pool, email).await?;
        sqlx::query(
            r#"
            INSERT INTO faculty_appraisal.activities
            (id, faculty_id, kind, title, recorded_on, academic_year, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(faculty_id)
        .bind(kind.as_str())
        .bind(title)
        .bind(recorded_on)
        .bind(year)
        .bind(source_key)
        .execute(pool)
        .await?;
    }

    Ok(())
}

async fn faculty_id_by_email(pool: &PgPool, email: &str) -> anyhow::Result<Uuid> {
    let id = sqlx::query("SELECT id FROM faculty_appraisal.faculty WHERE email = $1")
        .bind(email)
        .fetch_one(pool)
        .await
        .with_context(|| format!("no faculty record for {email}"))?
        .get("id");
    Ok(id)
}

async fn upsert_research_marks(
    pool: &PgPool,
    faculty_id: Uuid,
    category: ResearchCategory,
    marks: i32,
    academic_year: i32,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO faculty_appraisal.research_marks
        (id, faculty_id, category, marks, academic_year)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (faculty_id, category, academic_year) DO UPDATE
        SET marks = EXCLUDED.marks
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(faculty_id)
    .bind(category.as_str())
    .bind(marks)
    .bind(academic_year)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn import_courses(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        full_name: String,
        email: String,
        department: String,
        course_code: String,
        students_appeared: i32,
        pass_count: i32,
        academic_year: i32,
        source_key: Option<String>,
    }

    let mut reader = csv::Reader::from_path(csv_path)?;
    let mut inserted = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("row {}: malformed record", index + 1))?;

        if row.students_appeared < 0 || row.pass_count < 0 {
            anyhow::bail!("row {}: counts must be non-negative", index + 1);
        }
        if row.pass_count > row.students_appeared {
            anyhow::bail!(
                "row {}: pass_count {} exceeds students_appeared {}",
                index + 1,
                row.pass_count,
                row.students_appeared
            );
        }

        let faculty_id = upsert_faculty(
            pool,
            Uuid::new_v4(),
            &row.full_name,
            &row.email,
            &row.department,
        )
        .await?;

        let source_key = row
            .source_key
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        let result = sqlx::query(
            r#"
            INSERT INTO faculty_appraisal.courses
            (id, faculty_id, course_code, students_appeared, pass_count, academic_year, source_key)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (source_key) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(faculty_id)
        .bind(&row.course_code)
        .bind(row.students_appeared)
        .bind(row.pass_count)
        .bind(row.academic_year)
        .bind(source_key)
        .execute(pool)
        .await?;

        if result.rows_affected() > 0 {
            inserted += 1;
        }
    }

    Ok(inserted)
}

pub async fn import_research(pool: &PgPool, json_path: &std::path::Path) -> anyhow::Result<usize> {
    #[derive(serde::Deserialize)]
    struct ResearchRow {
        email: String,
        academic_year: i32,
        category: String,
        marks: serde_json::Value,
    }

    let payload = std::fs::read_to_string(json_path)
        .with_context(|| format!("failed to read {}", json_path.display()))?;
    let rows: Vec<ResearchRow> =
        serde_json::from_str(&payload).context("research payload must be a JSON array")?;

    let mut upserted = 0usize;

    for (index, row) in rows.iter().enumerate() {
        let category = ResearchCategory::parse(&row.category).with_context(|| {
            format!("row {}: unknown research category '{}'", index + 1, row.category)
        })?;

        let marks = rubric::coerce_metric(&row.marks)
            .with_context(|| format!("row {}: bad marks for {}", index + 1, row.email))?;

        let faculty_id = faculty_id_by_email(pool, &row.email).await?;
        upsert_research_marks(
            pool,
            faculty_id,
            category,
            marks.round() as i32,
            row.academic_year,
        )
        .await?;
        upserted += 1;
    }

    Ok(upserted)
}

pub async fn fetch_appraisals(
    pool: &PgPool,
    academic_year: i32,
    email: Option<&str>,
    department: Option<&str>,
) -> anyhow::Result<Vec<FacultyAppraisal>> {
    let mut query = String::from(
        "SELECT id, full_name, email, department FROM faculty_appraisal.faculty",
    );

    if email.is_some() {
        query.push_str(" WHERE email = $1");
    } else if department.is_some() {
        query.push_str(" WHERE department = $1");
    }
    query.push_str(" ORDER BY full_name");

    let mut rows = sqlx::query(&query);
    if let Some(value) = email {
        rows = rows.bind(value);
    } else if let Some(value) = department {
        rows = rows.bind(value);
    }

    let mut appraisals = Vec::new();

    for row in rows.fetch_all(pool).await? {
        let faculty = FacultyRef {
            id: row.get("id"),
            full_name: row.get("full_name"),
            email: row.get("email"),
            department: row.get("department"),
        };
        let input = fetch_input(pool, faculty.id, academic_year).await?;
        appraisals.push(FacultyAppraisal { faculty, input });
    }

    Ok(appraisals)
}

async fn fetch_input(
    pool: &PgPool,
    faculty_id: Uuid,
    academic_year: i32,
) -> anyhow::Result<AppraisalInput> {
    let mut input = AppraisalInput::default();

    let rows = sqlx::query(
        "SELECT course_code, students_appeared, pass_count \
         FROM faculty_appraisal.courses \
         WHERE faculty_id = $1 AND academic_year = $2",
    )
    .bind(faculty_id)
    .bind(academic_year)
    .fetch_all(pool)
    .await?;
    for row in rows {
        input.courses.push(CourseRecord {
            course_code: row.get("course_code"),
            students_appeared: row.get("students_appeared"),
            pass_count: row.get("pass_count"),
        });
    }

    let rows = sqlx::query(
        "SELECT course_code, feedback_percentage \
         FROM faculty_appraisal.feedback \
         WHERE faculty_id = $1 AND academic_year = $2",
    )
    .bind(faculty_id)
    .bind(academic_year)
    .fetch_all(pool)
    .await?;
    for row in rows {
        input.feedback.push(FeedbackRecord {
            course_code: row.get("course_code"),
            feedback_percentage: row.get("feedback_percentage"),
        });
    }

    let rows = sqlx::query(
        "SELECT eligible_students, passed_students \
         FROM faculty_appraisal.proctoring \
         WHERE faculty_id = $1 AND academic_year = $2",
    )
    .bind(faculty_id)
    .bind(academic_year)
    .fetch_all(pool)
    .await?;
    for row in rows {
        input.proctoring.push(ProctoringRecord {
            eligible_students: row.get("eligible_students"),
            passed_students: row.get("passed_students"),
        });
    }

    let rows = sqlx::query(
        "SELECT category, marks \
         FROM faculty_appraisal.research_marks \
         WHERE faculty_id = $1 AND academic_year = $2",
    )
    .bind(faculty_id)
    .bind(academic_year)
    .fetch_all(pool)
    .await?;
    for row in rows {
        let category: String = row.get("category");
        let marks: i32 = row.get("marks");
        // Rows written before a category was retired are skipped, not fatal.
        if let Some(category) = ResearchCategory::parse(&category) {
            input.research.push((category, marks.max(0) as u32));
        }
    }

    let rows = sqlx::query(
        "SELECT kind, title, recorded_on \
         FROM faculty_appraisal.activities \
         WHERE faculty_id = $1 AND academic_year = $2",
    )
    .bind(faculty_id)
    .bind(academic_year)
    .fetch_all(pool)
    .await?;
    for row in rows {
        let kind: String = row.get("kind");
        if let Some(kind) = ActivityKind::parse(&kind) {
            input.activities.push(ActivityRecord {
                kind,
                title: row.get("title"),
                recorded_on: row.get("recorded_on"),
            });
        }
    }

    Ok(input)
}
