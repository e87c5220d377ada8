//! Attendance records.

use chrono::{DateTime, Utc};
use lectern_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::ids::{AttendanceId, ClassScheduleId, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "attendance_status", rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Late,
    Absent,
    Excused,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Late => "late",
            Self::Absent => "absent",
            Self::Excused => "excused",
        }
    }

    /// Present and late both count as attended.
    pub fn counts_as_attended(&self) -> bool {
        matches!(self, Self::Present | Self::Late)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Attendance {
    pub id: AttendanceId,
    pub class_schedule_id: ClassScheduleId,
    pub student_id: UserId,
    pub status: AttendanceStatus,
    pub notes: Option<String>,
    pub attended_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct RecordAttendanceDto {
    pub class_schedule_id: ClassScheduleId,
    pub student_id: UserId,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAttendanceDto {
    pub status: Option<AttendanceStatus>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
pub struct AttendanceFilterParams {
    pub class_schedule_id: Option<ClassScheduleId>,
    pub student_id: Option<UserId>,
    pub status: Option<AttendanceStatus>,
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: PaginationParams,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedAttendanceResponse {
    pub data: Vec<Attendance>,
    pub meta: PaginationMeta,
}
