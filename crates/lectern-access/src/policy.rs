//! Mutation policy: admins may change anything, everyone else only records
//! that name them directly.

use lectern_core::AppError;
use lectern_models::{
    Assignment, ClassSchedule, Course, Enrollment, Message, Notification, Submission, UserId,
};

use crate::caller::Caller;

/// The identity fields of a record that confer the right to change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Ownership {
    pub tutor: Option<UserId>,
    pub student: Option<UserId>,
    pub sender: Option<UserId>,
    pub receiver: Option<UserId>,
    pub user: Option<UserId>,
}

impl Ownership {
    pub fn owners(&self) -> impl Iterator<Item = UserId> + '_ {
        [self.tutor, self.student, self.sender, self.receiver, self.user]
            .into_iter()
            .flatten()
    }
}

pub trait Owned {
    fn ownership(&self) -> Ownership;
}

pub fn can_mutate(caller: &Caller, record: &impl Owned) -> bool {
    caller.is_admin() || record.ownership().owners().any(|owner| owner == caller.id)
}

/// Fails with `PermissionDenied` unless [`can_mutate`] holds. Relations are
/// not followed: a tutor does not own a submission to their assignment.
pub fn authorize_mutation(caller: &Caller, record: &impl Owned) -> Result<(), AppError> {
    if can_mutate(caller, record) {
        Ok(())
    } else {
        tracing::debug!(caller = %caller.id, "Mutation denied");
        Err(AppError::forbidden(
            "You do not have permission to modify this record",
        ))
    }
}

impl Owned for Course {
    fn ownership(&self) -> Ownership {
        Ownership {
            tutor: self.tutor_id,
            ..Default::default()
        }
    }
}

impl Owned for Enrollment {
    fn ownership(&self) -> Ownership {
        Ownership {
            student: Some(self.student_id),
            ..Default::default()
        }
    }
}

impl Owned for Assignment {
    fn ownership(&self) -> Ownership {
        Ownership {
            tutor: Some(self.tutor_id),
            ..Default::default()
        }
    }
}

impl Owned for Submission {
    fn ownership(&self) -> Ownership {
        Ownership {
            student: Some(self.student_id),
            ..Default::default()
        }
    }
}

/// Attendance rows are changed through their session, so the session's
/// tutor is the owner.
impl Owned for ClassSchedule {
    fn ownership(&self) -> Ownership {
        Ownership {
            tutor: Some(self.tutor_id),
            ..Default::default()
        }
    }
}

impl Owned for Message {
    fn ownership(&self) -> Ownership {
        Ownership {
            sender: Some(self.sender_id),
            receiver: Some(self.receiver_id),
            ..Default::default()
        }
    }
}

impl Owned for Notification {
    fn ownership(&self) -> Ownership {
        Ownership {
            user: Some(self.user_id),
            ..Default::default()
        }
    }
}
