//! Courses, enrollments, coursework, sessions and attendance.
//!
//! Random plans are drawn synchronously up front and then inserted, so the
//! thread-local RNG never lives across an await.

use chrono::{DateTime, Duration, Utc};
use fake::Fake;
use fake::faker::company::en::CatchPhrase;
use fake::faker::lorem::en::{Paragraph, Sentence};
use lectern_models::{
    AssignmentId, AssignmentType, AttendanceStatus, ClassScheduleId, ClassType, CourseId,
    EnrollmentStatus, SubmissionStatus, UserId,
};
use rand::Rng;
use rand::seq::SliceRandom;
use sqlx::{Postgres, QueryBuilder, Transaction};

use super::models::{CourseSeed, SEED_COURSE_PREFIX};

const BATCH_SIZE: usize = 1000;

const SUBJECTS: &[&str] = &[
    "Mathematics",
    "Computer Science",
    "Physics",
    "Literature",
    "History",
    "Economics",
];

pub fn generate_courses(count: usize) -> Vec<CourseSeed> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|idx| CourseSeed {
            code: format!("{SEED_COURSE_PREFIX}{:03}", idx + 1),
            title: CatchPhrase().fake(),
            description: Paragraph(2..4).fake(),
            subject: SUBJECTS[idx % SUBJECTS.len()].to_string(),
            credit_hours: rng.gen_range(1..=4),
        })
        .collect()
}

/// Inserts courses, handing them out to tutors round-robin.
pub async fn insert_courses(
    tx: &mut Transaction<'_, Postgres>,
    seeds: &[CourseSeed],
    tutors: &[UserId],
) -> anyhow::Result<Vec<(CourseId, UserId)>> {
    if seeds.is_empty() || tutors.is_empty() {
        return Ok(Vec::new());
    }

    let owners: Vec<UserId> = (0..seeds.len()).map(|i| tutors[i % tutors.len()]).collect();

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
        "INSERT INTO courses (code, title, description, subject, credit_hours, tutor_id) ",
    );
    qb.push_values(seeds.iter().zip(&owners), |mut row, (course, tutor)| {
        row.push_bind(&course.code)
            .push_bind(&course.title)
            .push_bind(&course.description)
            .push_bind(&course.subject)
            .push_bind(course.credit_hours)
            .push_bind(*tutor);
    });
    qb.push(" RETURNING id");

    let ids: Vec<CourseId> = qb.build_query_scalar().fetch_all(&mut **tx).await?;
    Ok(ids.into_iter().zip(owners).collect())
}

pub struct EnrollmentPlan {
    pub student: UserId,
    pub course: CourseId,
    pub status: EnrollmentStatus,
    pub progress: f64,
}

pub fn plan_enrollments(
    students: &[UserId],
    courses: &[CourseId],
    per_student: usize,
) -> Vec<EnrollmentPlan> {
    let mut rng = rand::thread_rng();
    let mut plans = Vec::with_capacity(students.len() * per_student);

    for &student in students {
        for &course in courses.choose_multiple(&mut rng, per_student) {
            let roll: f64 = rng.r#gen();
            let (status, progress) = if roll < 0.75 {
                (EnrollmentStatus::Enrolled, rng.gen_range(0.0..90.0))
            } else if roll < 0.9 {
                (EnrollmentStatus::Completed, 100.0)
            } else {
                (EnrollmentStatus::Dropped, rng.gen_range(0.0..30.0))
            };
            plans.push(EnrollmentPlan {
                student,
                course,
                status,
                progress: (progress * 100.0_f64).round() / 100.0,
            });
        }
    }

    plans
}

pub async fn insert_enrollments(
    tx: &mut Transaction<'_, Postgres>,
    plans: &[EnrollmentPlan],
) -> anyhow::Result<u64> {
    let mut inserted = 0;
    for chunk in plans.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO enrollments (student_id, course_id, status, progress) ");
        qb.push_values(chunk, |mut row, plan| {
            row.push_bind(plan.student)
                .push_bind(plan.course)
                .push_bind(plan.status)
                .push_bind(plan.progress);
        });
        inserted += qb.build().execute(&mut **tx).await?.rows_affected();
    }
    Ok(inserted)
}

pub struct AssignmentRow {
    pub id: AssignmentId,
    pub course: CourseId,
    pub tutor: UserId,
    pub due_date: DateTime<Utc>,
    pub max_points: f64,
}

struct AssignmentPlan {
    course: CourseId,
    tutor: UserId,
    title: String,
    description: String,
    due_date: DateTime<Utc>,
    max_points: f64,
    assignment_type: AssignmentType,
}

const ASSIGNMENT_TYPES: [AssignmentType; 5] = [
    AssignmentType::Essay,
    AssignmentType::Quiz,
    AssignmentType::Project,
    AssignmentType::Presentation,
    AssignmentType::Homework,
];

fn plan_assignments(courses: &[(CourseId, UserId)], per_course: usize) -> Vec<AssignmentPlan> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    courses
        .iter()
        .flat_map(|&(course, tutor)| {
            (0..per_course)
                .map(|idx| {
                    let offset_days: i64 = rng.gen_range(-14..=21);
                    AssignmentPlan {
                        course,
                        tutor,
                        title: format!("Assignment {}: {}", idx + 1, Sentence(2..5).fake::<String>()),
                        description: Paragraph(1..3).fake(),
                        due_date: now + Duration::days(offset_days),
                        max_points: [10.0, 20.0, 50.0, 100.0][rng.gen_range(0..4)],
                        assignment_type: ASSIGNMENT_TYPES[idx % ASSIGNMENT_TYPES.len()],
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub async fn insert_assignments(
    tx: &mut Transaction<'_, Postgres>,
    courses: &[(CourseId, UserId)],
    per_course: usize,
) -> anyhow::Result<Vec<AssignmentRow>> {
    let plans = plan_assignments(courses, per_course);
    let mut rows = Vec::with_capacity(plans.len());

    for chunk in plans.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO assignments (course_id, tutor_id, title, description, due_date, max_points, assignment_type) ",
        );
        qb.push_values(chunk, |mut row, plan| {
            row.push_bind(plan.course)
                .push_bind(plan.tutor)
                .push_bind(&plan.title)
                .push_bind(&plan.description)
                .push_bind(plan.due_date)
                .push_bind(plan.max_points)
                .push_bind(plan.assignment_type);
        });
        qb.push(" RETURNING id");

        let ids: Vec<AssignmentId> = qb.build_query_scalar().fetch_all(&mut **tx).await?;
        rows.extend(ids.into_iter().zip(chunk).map(|(id, plan)| AssignmentRow {
            id,
            course: plan.course,
            tutor: plan.tutor,
            due_date: plan.due_date,
            max_points: plan.max_points,
        }));
    }

    Ok(rows)
}

struct SubmissionPlan {
    assignment: AssignmentId,
    student: UserId,
    content: String,
    submitted_at: DateTime<Utc>,
    status: SubmissionStatus,
    grade: Option<f64>,
    graded_by: Option<UserId>,
}

/// Students who are (or were) actively enrolled hand in most past-due work;
/// about half of that is graded.
fn plan_submissions(
    enrollments: &[EnrollmentPlan],
    assignments: &[AssignmentRow],
) -> Vec<SubmissionPlan> {
    let mut rng = rand::thread_rng();
    let now = Utc::now();
    let mut plans = Vec::new();

    for enrollment in enrollments
        .iter()
        .filter(|e| e.status != EnrollmentStatus::Dropped)
    {
        for assignment in assignments.iter().filter(|a| a.course == enrollment.course) {
            let past_due = assignment.due_date < now;
            if !rng.gen_bool(if past_due { 0.8 } else { 0.3 }) {
                continue;
            }

            let late = past_due && rng.gen_bool(0.15);
            let submitted_at = if late {
                assignment.due_date + Duration::hours(rng.gen_range(1..48))
            } else {
                assignment.due_date.min(now) - Duration::hours(rng.gen_range(1..72))
            };

            let graded = past_due && rng.gen_bool(0.5);
            let (status, grade, graded_by) = if graded {
                let grade = (rng.gen_range(0.4..=1.0) * assignment.max_points * 10.0_f64).round() / 10.0;
                (SubmissionStatus::Graded, Some(grade), Some(assignment.tutor))
            } else {
                (SubmissionStatus::on_submit(assignment.due_date, submitted_at), None, None)
            };

            plans.push(SubmissionPlan {
                assignment: assignment.id,
                student: enrollment.student,
                content: Paragraph(1..4).fake(),
                submitted_at,
                status,
                grade,
                graded_by,
            });
        }
    }

    plans
}

pub async fn insert_submissions(
    tx: &mut Transaction<'_, Postgres>,
    enrollments: &[EnrollmentPlan],
    assignments: &[AssignmentRow],
) -> anyhow::Result<u64> {
    let plans = plan_submissions(enrollments, assignments);
    let mut inserted = 0;

    for chunk in plans.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO submissions (assignment_id, student_id, submitted_content, submitted_at, status, grade, graded_by, graded_at) ",
        );
        qb.push_values(chunk, |mut row, plan| {
            row.push_bind(plan.assignment)
                .push_bind(plan.student)
                .push_bind(&plan.content)
                .push_bind(plan.submitted_at)
                .push_bind(plan.status)
                .push_bind(plan.grade)
                .push_bind(plan.graded_by)
                .push_bind(plan.grade.map(|_| plan.submitted_at + Duration::days(2)));
        });
        inserted += qb.build().execute(&mut **tx).await?.rows_affected();
    }

    Ok(inserted)
}

struct SessionPlan {
    course: CourseId,
    tutor: UserId,
    title: String,
    scheduled_date: DateTime<Utc>,
    class_type: ClassType,
}

fn plan_sessions(courses: &[(CourseId, UserId)], per_course: usize) -> Vec<SessionPlan> {
    let now = Utc::now();
    let types = [ClassType::Lecture, ClassType::Tutorial, ClassType::Lab];
    courses
        .iter()
        .flat_map(|&(course, tutor)| {
            // Weekly sessions centred on today: half behind us, half ahead
            (0..per_course).map(move |idx| {
                let week = idx as i64 - (per_course as i64 / 2);
                SessionPlan {
                    course,
                    tutor,
                    title: format!("Week {}", idx + 1),
                    scheduled_date: now + Duration::weeks(week) + Duration::hours(1),
                    class_type: types[idx % types.len()],
                }
            })
        })
        .collect()
}

/// Inserts sessions and records attendance for the ones already held.
pub async fn insert_sessions_with_attendance(
    tx: &mut Transaction<'_, Postgres>,
    courses: &[(CourseId, UserId)],
    per_course: usize,
    enrollments: &[EnrollmentPlan],
) -> anyhow::Result<(usize, u64)> {
    let plans = plan_sessions(courses, per_course);
    let mut held: Vec<(ClassScheduleId, CourseId)> = Vec::new();

    for chunk in plans.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO class_schedules (course_id, tutor_id, title, scheduled_date, class_type) ",
        );
        qb.push_values(chunk, |mut row, plan| {
            row.push_bind(plan.course)
                .push_bind(plan.tutor)
                .push_bind(&plan.title)
                .push_bind(plan.scheduled_date)
                .push_bind(plan.class_type);
        });
        qb.push(" RETURNING id");

        let ids: Vec<ClassScheduleId> = qb.build_query_scalar().fetch_all(&mut **tx).await?;
        let now = Utc::now();
        held.extend(
            ids.into_iter()
                .zip(chunk)
                .filter(|(_, plan)| plan.scheduled_date < now)
                .map(|(id, plan)| (id, plan.course)),
        );
    }

    let attendance = plan_attendance(&held, enrollments);
    let mut recorded = 0;
    for chunk in attendance.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("INSERT INTO attendance (class_schedule_id, student_id, status) ");
        qb.push_values(chunk, |mut row, (schedule, student, status)| {
            row.push_bind(*schedule).push_bind(*student).push_bind(*status);
        });
        recorded += qb.build().execute(&mut **tx).await?.rows_affected();
    }

    Ok((plans.len(), recorded))
}

fn plan_attendance(
    held: &[(ClassScheduleId, CourseId)],
    enrollments: &[EnrollmentPlan],
) -> Vec<(ClassScheduleId, UserId, AttendanceStatus)> {
    let mut rng = rand::thread_rng();
    let mut rows = Vec::new();
    for &(schedule, course) in held {
        for enrollment in enrollments
            .iter()
            .filter(|e| e.course == course && e.status != EnrollmentStatus::Dropped)
        {
            let roll: f64 = rng.r#gen();
            let status = if roll < 0.75 {
                AttendanceStatus::Present
            } else if roll < 0.85 {
                AttendanceStatus::Late
            } else if roll < 0.95 {
                AttendanceStatus::Absent
            } else {
                AttendanceStatus::Excused
            };
            rows.push((schedule, enrollment.student, status));
        }
    }
    rows
}
