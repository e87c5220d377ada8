//! Visibility predicates.
//!
//! Queries that use these fragments must alias their tables the way
//! [`Column::sql`] expects: `courses c`, `enrollments e`, `assignments a`,
//! `submissions s`, `class_schedules cs`, `attendance att`, `messages m`,
//! `notifications n`.

use lectern_models::{AssignmentId, ClassScheduleId, CourseId, UserId};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

/// Record kinds that go through scoping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Course,
    Enrollment,
    Assignment,
    Submission,
    ClassSchedule,
    Attendance,
    Message,
    Notification,
}

impl Entity {
    pub const ALL: [Entity; 8] = [
        Self::Course,
        Self::Enrollment,
        Self::Assignment,
        Self::Submission,
        Self::ClassSchedule,
        Self::Attendance,
        Self::Message,
        Self::Notification,
    ];
}

/// A column a predicate can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    CourseId,
    CourseTutor,
    CourseIsActive,
    EnrollmentStudent,
    EnrollmentCourse,
    AssignmentCourse,
    AssignmentTutor,
    SubmissionStudent,
    SubmissionAssignment,
    ScheduleCourse,
    ScheduleTutor,
    AttendanceStudent,
    AttendanceSchedule,
    MessageSender,
    MessageReceiver,
    NotificationUser,
}

impl Column {
    pub fn sql(&self) -> &'static str {
        match self {
            Self::CourseId => "c.id",
            Self::CourseTutor => "c.tutor_id",
            Self::CourseIsActive => "c.is_active",
            Self::EnrollmentStudent => "e.student_id",
            Self::EnrollmentCourse => "e.course_id",
            Self::AssignmentCourse => "a.course_id",
            Self::AssignmentTutor => "a.tutor_id",
            Self::SubmissionStudent => "s.student_id",
            Self::SubmissionAssignment => "s.assignment_id",
            Self::ScheduleCourse => "cs.course_id",
            Self::ScheduleTutor => "cs.tutor_id",
            Self::AttendanceStudent => "att.student_id",
            Self::AttendanceSchedule => "att.class_schedule_id",
            Self::MessageSender => "m.sender_id",
            Self::MessageReceiver => "m.receiver_id",
            Self::NotificationUser => "n.user_id",
        }
    }
}

/// A column value read from an in-memory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value {
    Id(Uuid),
    Flag(bool),
}

/// Exposes the scoping-relevant columns of a loaded record.
pub trait RecordView {
    /// `None` when the record has no such column or the column is null.
    fn value(&self, column: Column) -> Option<Value>;
}

/// Relations a predicate may need to follow when evaluated in memory.
pub trait Facts {
    /// True when an `enrolled` enrollment links the student to the course.
    fn is_enrolled(&self, student: UserId, course: CourseId) -> bool;
    fn course_tutor(&self, course: CourseId) -> Option<UserId>;
    fn assignment_tutor(&self, assignment: AssignmentId) -> Option<UserId>;
    fn schedule_tutor(&self, schedule: ClassScheduleId) -> Option<UserId>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    All,
    Nothing,
    /// `column = user`
    OwnedBy { column: Column, user: UserId },
    /// A boolean column that must be true.
    Flag(Column),
    /// The course referenced by `course` has an `enrolled` row for `student`.
    EnrolledIn { course: Column, student: UserId },
    /// The course referenced by `course` is taught by `tutor`.
    CourseTaughtBy { course: Column, tutor: UserId },
    /// The assignment referenced by `assignment` was set by `tutor`.
    AssignmentSetBy { assignment: Column, tutor: UserId },
    /// The session referenced by `schedule` is run by `tutor`.
    ScheduleRunBy { schedule: Column, tutor: UserId },
    /// Any of the inner predicates; empty means nothing.
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn owned_by(column: Column, user: UserId) -> Self {
        Self::OwnedBy { column, user }
    }

    /// Appends this predicate as a parenthesis-safe boolean expression.
    pub fn push_sql(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        match self {
            Self::All => {
                qb.push("TRUE");
            }
            Self::Nothing => {
                qb.push("FALSE");
            }
            Self::OwnedBy { column, user } => {
                qb.push(column.sql()).push(" = ").push_bind(*user);
            }
            Self::Flag(column) => {
                qb.push(column.sql()).push(" IS TRUE");
            }
            Self::EnrolledIn { course, student } => {
                qb.push("EXISTS (SELECT 1 FROM enrollments ee WHERE ee.course_id = ")
                    .push(course.sql())
                    .push(" AND ee.student_id = ")
                    .push_bind(*student)
                    .push(" AND ee.status = 'enrolled')");
            }
            Self::CourseTaughtBy { course, tutor } => {
                qb.push("EXISTS (SELECT 1 FROM courses cc WHERE cc.id = ")
                    .push(course.sql())
                    .push(" AND cc.tutor_id = ")
                    .push_bind(*tutor)
                    .push(")");
            }
            Self::AssignmentSetBy { assignment, tutor } => {
                qb.push("EXISTS (SELECT 1 FROM assignments aa WHERE aa.id = ")
                    .push(assignment.sql())
                    .push(" AND aa.tutor_id = ")
                    .push_bind(*tutor)
                    .push(")");
            }
            Self::ScheduleRunBy { schedule, tutor } => {
                qb.push("EXISTS (SELECT 1 FROM class_schedules css WHERE css.id = ")
                    .push(schedule.sql())
                    .push(" AND css.tutor_id = ")
                    .push_bind(*tutor)
                    .push(")");
            }
            Self::Or(inner) if inner.is_empty() => {
                qb.push("FALSE");
            }
            Self::Or(inner) => {
                qb.push("(");
                for (i, predicate) in inner.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    predicate.push_sql(qb);
                }
                qb.push(")");
            }
        }
    }

    /// Evaluates the predicate against a loaded record.
    ///
    /// Agrees with [`Predicate::push_sql`] for any database state that
    /// `facts` describes.
    pub fn matches(&self, record: &impl RecordView, facts: &impl Facts) -> bool {
        match self {
            Self::All => true,
            Self::Nothing => false,
            Self::OwnedBy { column, user } => {
                record.value(*column) == Some(Value::Id(user.into_inner()))
            }
            Self::Flag(column) => record.value(*column) == Some(Value::Flag(true)),
            Self::EnrolledIn { course, student } => match record.value(*course) {
                Some(Value::Id(id)) => facts.is_enrolled(*student, CourseId::from_uuid(id)),
                _ => false,
            },
            Self::CourseTaughtBy { course, tutor } => match record.value(*course) {
                Some(Value::Id(id)) => facts.course_tutor(CourseId::from_uuid(id)) == Some(*tutor),
                _ => false,
            },
            Self::AssignmentSetBy { assignment, tutor } => match record.value(*assignment) {
                Some(Value::Id(id)) => {
                    facts.assignment_tutor(AssignmentId::from_uuid(id)) == Some(*tutor)
                }
                _ => false,
            },
            Self::ScheduleRunBy { schedule, tutor } => match record.value(*schedule) {
                Some(Value::Id(id)) => {
                    facts.schedule_tutor(ClassScheduleId::from_uuid(id)) == Some(*tutor)
                }
                _ => false,
            },
            Self::Or(inner) => inner.iter().any(|p| p.matches(record, facts)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(predicate: &Predicate) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("WHERE ");
        predicate.push_sql(&mut qb);
        qb.into_sql()
    }

    #[test]
    fn test_constants_render() {
        assert_eq!(render(&Predicate::All), "WHERE TRUE");
        assert_eq!(render(&Predicate::Nothing), "WHERE FALSE");
        assert_eq!(render(&Predicate::Or(vec![])), "WHERE FALSE");
    }

    #[test]
    fn test_owned_by_binds_parameter() {
        let sql = render(&Predicate::owned_by(Column::AssignmentTutor, UserId::new()));
        assert_eq!(sql, "WHERE a.tutor_id = $1");
    }

    #[test]
    fn test_or_numbers_parameters_in_order() {
        let user = UserId::new();
        let sql = render(&Predicate::Or(vec![
            Predicate::owned_by(Column::MessageSender, user),
            Predicate::owned_by(Column::MessageReceiver, user),
        ]));
        assert_eq!(sql, "WHERE (m.sender_id = $1 OR m.receiver_id = $2)");
    }

    #[test]
    fn test_enrolled_in_renders_subquery() {
        let sql = render(&Predicate::Or(vec![
            Predicate::EnrolledIn {
                course: Column::CourseId,
                student: UserId::new(),
            },
            Predicate::Flag(Column::CourseIsActive),
        ]));
        assert_eq!(
            sql,
            "WHERE (EXISTS (SELECT 1 FROM enrollments ee WHERE ee.course_id = c.id \
             AND ee.student_id = $1 AND ee.status = 'enrolled') OR c.is_active IS TRUE)"
        );
    }

    #[test]
    fn test_relation_predicates_render() {
        let tutor = UserId::new();
        assert_eq!(
            render(&Predicate::CourseTaughtBy {
                course: Column::EnrollmentCourse,
                tutor
            }),
            "WHERE EXISTS (SELECT 1 FROM courses cc WHERE cc.id = e.course_id AND cc.tutor_id = $1)"
        );
        assert_eq!(
            render(&Predicate::AssignmentSetBy {
                assignment: Column::SubmissionAssignment,
                tutor
            }),
            "WHERE EXISTS (SELECT 1 FROM assignments aa WHERE aa.id = s.assignment_id AND aa.tutor_id = $1)"
        );
        assert_eq!(
            render(&Predicate::ScheduleRunBy {
                schedule: Column::AttendanceSchedule,
                tutor
            }),
            "WHERE EXISTS (SELECT 1 FROM class_schedules css WHERE css.id = att.class_schedule_id AND css.tutor_id = $1)"
        );
    }
}
