//! [`RecordView`] for the scoped models, used for in-memory checks.

use lectern_models::{
    Assignment, Attendance, ClassSchedule, Course, Enrollment, Message, Notification, Submission,
};

use crate::caller::Caller;
use crate::predicate::{Column, Entity, Facts, RecordView, Value};
use crate::strategy::visibility;

/// A record type that belongs to one scoped [`Entity`].
pub trait Scoped: RecordView {
    const ENTITY: Entity;
}

/// Whether `caller` may see `record`, evaluated without the database.
pub fn is_visible<R: Scoped>(caller: &Caller, record: &R, facts: &impl Facts) -> bool {
    visibility(caller, R::ENTITY).matches(record, facts)
}

impl RecordView for Course {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::CourseId => Some(Value::Id(self.id.into_inner())),
            Column::CourseTutor => self.tutor_id.map(|t| Value::Id(t.into_inner())),
            Column::CourseIsActive => Some(Value::Flag(self.is_active)),
            _ => None,
        }
    }
}

impl Scoped for Course {
    const ENTITY: Entity = Entity::Course;
}

impl RecordView for Enrollment {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::EnrollmentStudent => Some(Value::Id(self.student_id.into_inner())),
            Column::EnrollmentCourse => Some(Value::Id(self.course_id.into_inner())),
            _ => None,
        }
    }
}

impl Scoped for Enrollment {
    const ENTITY: Entity = Entity::Enrollment;
}

impl RecordView for Assignment {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::AssignmentCourse => Some(Value::Id(self.course_id.into_inner())),
            Column::AssignmentTutor => Some(Value::Id(self.tutor_id.into_inner())),
            _ => None,
        }
    }
}

impl Scoped for Assignment {
    const ENTITY: Entity = Entity::Assignment;
}

impl RecordView for Submission {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::SubmissionStudent => Some(Value::Id(self.student_id.into_inner())),
            Column::SubmissionAssignment => Some(Value::Id(self.assignment_id.into_inner())),
            _ => None,
        }
    }
}

impl Scoped for Submission {
    const ENTITY: Entity = Entity::Submission;
}

impl RecordView for ClassSchedule {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::ScheduleCourse => Some(Value::Id(self.course_id.into_inner())),
            Column::ScheduleTutor => Some(Value::Id(self.tutor_id.into_inner())),
            _ => None,
        }
    }
}

impl Scoped for ClassSchedule {
    const ENTITY: Entity = Entity::ClassSchedule;
}

impl RecordView for Attendance {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::AttendanceStudent => Some(Value::Id(self.student_id.into_inner())),
            Column::AttendanceSchedule => Some(Value::Id(self.class_schedule_id.into_inner())),
            _ => None,
        }
    }
}

impl Scoped for Attendance {
    const ENTITY: Entity = Entity::Attendance;
}

impl RecordView for Message {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::MessageSender => Some(Value::Id(self.sender_id.into_inner())),
            Column::MessageReceiver => Some(Value::Id(self.receiver_id.into_inner())),
            _ => None,
        }
    }
}

impl Scoped for Message {
    const ENTITY: Entity = Entity::Message;
}

impl RecordView for Notification {
    fn value(&self, column: Column) -> Option<Value> {
        match column {
            Column::NotificationUser => Some(Value::Id(self.user_id.into_inner())),
            _ => None,
        }
    }
}

impl Scoped for Notification {
    const ENTITY: Entity = Entity::Notification;
}
