//! One scoping strategy per role.

use lectern_models::{UserId, UserRole};

use crate::caller::Caller;
use crate::predicate::{Column, Entity, Predicate};

pub trait ScopeStrategy: Send + Sync {
    fn visibility(&self, entity: Entity, caller: UserId) -> Predicate;
}

/// Messages and notifications are private to their parties for every
/// recognised role.
fn personal(entity: Entity, caller: UserId) -> Option<Predicate> {
    match entity {
        Entity::Message => Some(Predicate::Or(vec![
            Predicate::owned_by(Column::MessageSender, caller),
            Predicate::owned_by(Column::MessageReceiver, caller),
        ])),
        Entity::Notification => Some(Predicate::owned_by(Column::NotificationUser, caller)),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AdminScope;

impl ScopeStrategy for AdminScope {
    fn visibility(&self, entity: Entity, caller: UserId) -> Predicate {
        match entity {
            Entity::Notification => Predicate::owned_by(Column::NotificationUser, caller),
            _ => Predicate::All,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TutorScope;

impl ScopeStrategy for TutorScope {
    fn visibility(&self, entity: Entity, caller: UserId) -> Predicate {
        match entity {
            Entity::Course => Predicate::owned_by(Column::CourseTutor, caller),
            Entity::Enrollment => Predicate::CourseTaughtBy {
                course: Column::EnrollmentCourse,
                tutor: caller,
            },
            Entity::Assignment => Predicate::owned_by(Column::AssignmentTutor, caller),
            Entity::Submission => Predicate::AssignmentSetBy {
                assignment: Column::SubmissionAssignment,
                tutor: caller,
            },
            Entity::ClassSchedule => Predicate::owned_by(Column::ScheduleTutor, caller),
            Entity::Attendance => Predicate::ScheduleRunBy {
                schedule: Column::AttendanceSchedule,
                tutor: caller,
            },
            Entity::Message | Entity::Notification => {
                personal(entity, caller).unwrap_or(Predicate::Nothing)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StudentScope;

impl ScopeStrategy for StudentScope {
    fn visibility(&self, entity: Entity, caller: UserId) -> Predicate {
        match entity {
            Entity::Course => Predicate::Or(vec![
                Predicate::EnrolledIn {
                    course: Column::CourseId,
                    student: caller,
                },
                Predicate::Flag(Column::CourseIsActive),
            ]),
            Entity::Enrollment => Predicate::owned_by(Column::EnrollmentStudent, caller),
            Entity::Assignment => Predicate::EnrolledIn {
                course: Column::AssignmentCourse,
                student: caller,
            },
            Entity::Submission => Predicate::owned_by(Column::SubmissionStudent, caller),
            Entity::ClassSchedule => Predicate::EnrolledIn {
                course: Column::ScheduleCourse,
                student: caller,
            },
            Entity::Attendance => Predicate::owned_by(Column::AttendanceStudent, caller),
            Entity::Message | Entity::Notification => {
                personal(entity, caller).unwrap_or(Predicate::Nothing)
            }
        }
    }
}

/// Alumni keep their inbox but see no academic records.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlumniScope;

impl ScopeStrategy for AlumniScope {
    fn visibility(&self, entity: Entity, caller: UserId) -> Predicate {
        personal(entity, caller).unwrap_or(Predicate::Nothing)
    }
}

/// Used for roles this build does not recognise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAll;

impl ScopeStrategy for DenyAll {
    fn visibility(&self, _entity: Entity, _caller: UserId) -> Predicate {
        Predicate::Nothing
    }
}

static ADMIN: AdminScope = AdminScope;
static TUTOR: TutorScope = TutorScope;
static STUDENT: StudentScope = StudentScope;
static ALUMNI: AlumniScope = AlumniScope;
static DENY: DenyAll = DenyAll;

pub fn strategy_for(role: Option<UserRole>) -> &'static dyn ScopeStrategy {
    match role {
        Some(UserRole::Admin) => &ADMIN,
        Some(UserRole::Tutor) => &TUTOR,
        Some(UserRole::Student) => &STUDENT,
        Some(UserRole::Alumni) => &ALUMNI,
        None => &DENY,
    }
}

/// The predicate restricting `entity` rows to what `caller` may see.
pub fn visibility(caller: &Caller, entity: Entity) -> Predicate {
    let predicate = strategy_for(caller.role).visibility(entity, caller.id);
    tracing::trace!(?entity, role = ?caller.role, ?predicate, "Resolved visibility");
    predicate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Facts;
    use crate::records::is_visible;
    use chrono::{Duration, Utc};
    use lectern_models::{
        Assignment, AssignmentId, AssignmentType, Attendance, AttendanceId, AttendanceStatus,
        ClassSchedule, ClassScheduleId, ClassType, Course, CourseId, Enrollment, EnrollmentId,
        EnrollmentStatus, Message, MessageId, MessageType, Notification, NotificationId,
        NotificationPriority, NotificationType, Submission, SubmissionId, SubmissionStatus,
    };
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct World {
        courses: Vec<Course>,
        enrollments: Vec<Enrollment>,
        assignments: Vec<Assignment>,
        submissions: Vec<Submission>,
        schedules: Vec<ClassSchedule>,
        attendance: Vec<Attendance>,
    }

    impl World {
        fn enrolled(&self) -> HashSet<(UserId, CourseId)> {
            self.enrollments
                .iter()
                .filter(|e| e.status == EnrollmentStatus::Enrolled)
                .map(|e| (e.student_id, e.course_id))
                .collect()
        }
    }

    impl Facts for World {
        fn is_enrolled(&self, student: UserId, course: CourseId) -> bool {
            self.enrolled().contains(&(student, course))
        }

        fn course_tutor(&self, course: CourseId) -> Option<UserId> {
            self.courses.iter().find(|c| c.id == course)?.tutor_id
        }

        fn assignment_tutor(&self, assignment: AssignmentId) -> Option<UserId> {
            self.assignments
                .iter()
                .find(|a| a.id == assignment)
                .map(|a| a.tutor_id)
        }

        fn schedule_tutor(&self, schedule: ClassScheduleId) -> Option<UserId> {
            self.schedules
                .iter()
                .find(|s| s.id == schedule)
                .map(|s| s.tutor_id)
        }
    }

    struct People {
        tutor_a: UserId,
        tutor_b: UserId,
        enrolled: UserId,
        dropped: UserId,
        outsider: UserId,
    }

    fn course(tutor: UserId, is_active: bool) -> Course {
        let now = Utc::now();
        Course {
            id: CourseId::new(),
            code: format!("C{}", &CourseId::new().to_string()[..6]),
            title: "Course".to_string(),
            description: None,
            tutor_id: Some(tutor),
            credit_hours: 3,
            subject: None,
            is_active,
            max_students: 50,
            created_at: now,
            updated_at: now,
        }
    }

    fn enrollment(student: UserId, course: CourseId, status: EnrollmentStatus) -> Enrollment {
        let now = Utc::now();
        Enrollment {
            id: EnrollmentId::new(),
            student_id: student,
            course_id: course,
            status,
            grade: None,
            progress: 0.0,
            final_grade: None,
            enrolled_at: now,
            updated_at: now,
        }
    }

    fn assignment(course: &Course) -> Assignment {
        let now = Utc::now();
        Assignment {
            id: AssignmentId::new(),
            course_id: course.id,
            tutor_id: course.tutor_id.unwrap(),
            title: "Essay".to_string(),
            description: None,
            due_date: now + Duration::days(7),
            max_points: 100.0,
            assignment_type: AssignmentType::Essay,
            attachment_url: None,
            instructions: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn submission(assignment: &Assignment, student: UserId) -> Submission {
        Submission {
            id: SubmissionId::new(),
            assignment_id: assignment.id,
            student_id: student,
            submitted_content: "answer".to_string(),
            file_url: None,
            submitted_at: Utc::now(),
            grade: None,
            feedback: None,
            graded_at: None,
            graded_by: None,
            status: SubmissionStatus::Submitted,
        }
    }

    fn schedule(course: &Course) -> ClassSchedule {
        ClassSchedule {
            id: ClassScheduleId::new(),
            course_id: course.id,
            tutor_id: course.tutor_id.unwrap(),
            title: "Week 1".to_string(),
            description: String::new(),
            scheduled_date: Utc::now() + Duration::days(1),
            duration_minutes: 60,
            meeting_link: None,
            attendance_tracking: true,
            class_type: ClassType::Lecture,
            created_at: Utc::now(),
        }
    }

    fn attendance(schedule: &ClassSchedule, student: UserId) -> Attendance {
        Attendance {
            id: AttendanceId::new(),
            class_schedule_id: schedule.id,
            student_id: student,
            status: AttendanceStatus::Present,
            notes: None,
            attended_at: Utc::now(),
        }
    }

    /// Tutor A teaches an active course and an inactive one, tutor B an
    /// active one. One student is enrolled in A's active course, another
    /// dropped it.
    fn world() -> (World, People) {
        let people = People {
            tutor_a: UserId::new(),
            tutor_b: UserId::new(),
            enrolled: UserId::new(),
            dropped: UserId::new(),
            outsider: UserId::new(),
        };
        let a_active = course(people.tutor_a, true);
        let a_inactive = course(people.tutor_a, false);
        let b_active = course(people.tutor_b, true);

        let mut w = World::default();
        w.enrollments = vec![
            enrollment(people.enrolled, a_active.id, EnrollmentStatus::Enrolled),
            enrollment(people.enrolled, a_inactive.id, EnrollmentStatus::Enrolled),
            enrollment(people.dropped, a_active.id, EnrollmentStatus::Dropped),
        ];
        for c in [&a_active, &a_inactive, &b_active] {
            let a = assignment(c);
            w.submissions.push(submission(&a, people.enrolled));
            w.submissions.push(submission(&a, people.dropped));
            w.assignments.push(a);
            let s = schedule(c);
            w.attendance.push(attendance(&s, people.enrolled));
            w.attendance.push(attendance(&s, people.dropped));
            w.schedules.push(s);
        }
        w.courses = vec![a_active, a_inactive, b_active];
        (w, people)
    }

    #[test]
    fn test_admin_sees_all_academic_records() {
        let (w, _) = world();
        let admin = Caller::new(UserId::new(), UserRole::Admin);
        assert!(w.courses.iter().all(|r| is_visible(&admin, r, &w)));
        assert!(w.enrollments.iter().all(|r| is_visible(&admin, r, &w)));
        assert!(w.assignments.iter().all(|r| is_visible(&admin, r, &w)));
        assert!(w.submissions.iter().all(|r| is_visible(&admin, r, &w)));
        assert!(w.schedules.iter().all(|r| is_visible(&admin, r, &w)));
        assert!(w.attendance.iter().all(|r| is_visible(&admin, r, &w)));
    }

    #[test]
    fn test_tutor_sees_only_own_teaching() {
        let (w, p) = world();
        let tutor = Caller::new(p.tutor_a, UserRole::Tutor);

        for c in &w.courses {
            assert_eq!(is_visible(&tutor, c, &w), c.tutor_id == Some(p.tutor_a));
        }
        for e in &w.enrollments {
            assert_eq!(
                is_visible(&tutor, e, &w),
                w.course_tutor(e.course_id) == Some(p.tutor_a)
            );
        }
        for a in &w.assignments {
            assert_eq!(is_visible(&tutor, a, &w), a.tutor_id == p.tutor_a);
        }
        for s in &w.submissions {
            assert_eq!(
                is_visible(&tutor, s, &w),
                w.assignment_tutor(s.assignment_id) == Some(p.tutor_a)
            );
        }
        for s in &w.schedules {
            assert_eq!(is_visible(&tutor, s, &w), s.tutor_id == p.tutor_a);
        }
        for a in &w.attendance {
            assert_eq!(
                is_visible(&tutor, a, &w),
                w.schedule_tutor(a.class_schedule_id) == Some(p.tutor_a)
            );
        }
    }

    #[test]
    fn test_student_sees_enrolled_or_active_courses() {
        let (w, p) = world();
        let enrolled = Caller::new(p.enrolled, UserRole::Student);
        let outsider = Caller::new(p.outsider, UserRole::Student);

        for c in &w.courses {
            assert!(is_visible(&enrolled, c, &w), "enrolled student sees {}", c.code);
            assert_eq!(is_visible(&outsider, c, &w), c.is_active);
        }
    }

    #[test]
    fn test_student_assignment_visibility_follows_enrollment() {
        let (w, p) = world();
        let dropped = Caller::new(p.dropped, UserRole::Student);
        let enrolled = Caller::new(p.enrolled, UserRole::Student);

        for a in &w.assignments {
            let is_enrolled = w.is_enrolled(p.enrolled, a.course_id);
            assert_eq!(is_visible(&enrolled, a, &w), is_enrolled);
            assert!(!is_visible(&dropped, a, &w), "dropped enrollment grants nothing");
        }
        for s in &w.schedules {
            assert_eq!(
                is_visible(&enrolled, s, &w),
                w.is_enrolled(p.enrolled, s.course_id)
            );
            assert!(!is_visible(&dropped, s, &w));
        }
    }

    #[test]
    fn test_student_sees_only_own_records() {
        let (w, p) = world();
        let student = Caller::new(p.dropped, UserRole::Student);
        for e in &w.enrollments {
            assert_eq!(is_visible(&student, e, &w), e.student_id == p.dropped);
        }
        for s in &w.submissions {
            assert_eq!(is_visible(&student, s, &w), s.student_id == p.dropped);
        }
        for a in &w.attendance {
            assert_eq!(is_visible(&student, a, &w), a.student_id == p.dropped);
        }
    }

    #[test]
    fn test_alumni_and_unknown_roles_see_no_academic_records() {
        let (w, p) = world();
        for caller in [
            Caller::new(p.enrolled, UserRole::Alumni),
            Caller { id: p.enrolled, role: None },
        ] {
            assert!(!w.courses.iter().any(|r| is_visible(&caller, r, &w)));
            assert!(!w.enrollments.iter().any(|r| is_visible(&caller, r, &w)));
            assert!(!w.assignments.iter().any(|r| is_visible(&caller, r, &w)));
            assert!(!w.submissions.iter().any(|r| is_visible(&caller, r, &w)));
            assert!(!w.schedules.iter().any(|r| is_visible(&caller, r, &w)));
            assert!(!w.attendance.iter().any(|r| is_visible(&caller, r, &w)));
        }
    }

    fn message(sender: UserId, receiver: UserId) -> Message {
        Message {
            id: MessageId::new(),
            sender_id: sender,
            receiver_id: receiver,
            subject: "Hello".to_string(),
            content: "Hi".to_string(),
            message_type: MessageType::General,
            parent_message_id: None,
            course_id: None,
            assignment_id: None,
            is_read: false,
            read_at: None,
            sent_at: Utc::now(),
        }
    }

    fn notification(user: UserId) -> Notification {
        Notification {
            id: NotificationId::new(),
            user_id: user,
            sender_id: None,
            notification_type: NotificationType::System,
            title: "Welcome".to_string(),
            content: "Hello".to_string(),
            priority: NotificationPriority::Medium,
            is_read: false,
            read_at: None,
            course_id: None,
            assignment_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_messages_visible_to_parties_and_admin() {
        let (w, p) = world();
        let msg = message(p.enrolled, p.tutor_a);
        for role in [UserRole::Student, UserRole::Tutor, UserRole::Alumni] {
            assert!(is_visible(&Caller::new(p.enrolled, role), &msg, &w));
            assert!(is_visible(&Caller::new(p.tutor_a, role), &msg, &w));
            assert!(!is_visible(&Caller::new(p.outsider, role), &msg, &w));
        }
        assert!(is_visible(&Caller::new(UserId::new(), UserRole::Admin), &msg, &w));
    }

    #[test]
    fn test_notifications_are_private_even_for_admin() {
        let (w, p) = world();
        let note = notification(p.enrolled);
        for role in UserRole::ALL {
            assert!(is_visible(&Caller::new(p.enrolled, role), &note, &w));
            assert!(!is_visible(&Caller::new(p.outsider, role), &note, &w));
        }
    }

    #[test]
    fn test_unknown_role_is_fail_closed() {
        let caller = UserId::new();
        for entity in Entity::ALL {
            assert_eq!(DenyAll.visibility(entity, caller), Predicate::Nothing);
        }
        let from_table: HashMap<Entity, Predicate> = Entity::ALL
            .into_iter()
            .map(|e| (e, strategy_for(None).visibility(e, caller)))
            .collect();
        assert!(from_table.values().all(|p| *p == Predicate::Nothing));
    }
}
