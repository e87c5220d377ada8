//! Seeding configuration and the generated rows waiting to be inserted.

use lectern_models::UserRole;

/// Seeded accounts use this domain so `clear-seed` can find them.
pub const SEED_EMAIL_DOMAIN: &str = "seed.lectern.test";
/// Seeded course codes start with this prefix.
pub const SEED_COURSE_PREFIX: &str = "SEED-";
/// Location stamped on seeded events.
pub const SEED_EVENT_LOCATION: &str = "Seed Campus";
/// Password for every seeded account.
pub const SEED_PASSWORD: &str = "password123";

pub struct UserSeed {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub password_hash: String,
}

pub struct CourseSeed {
    pub code: String,
    pub title: String,
    pub description: String,
    pub subject: String,
    pub credit_hours: i32,
}

#[derive(Debug, Clone)]
pub struct SeedConfig {
    pub admins: usize,
    pub tutors: usize,
    pub students: usize,
    pub alumni: usize,
    pub courses: usize,
    pub enrollments_per_student: usize,
    pub assignments_per_course: usize,
    pub sessions_per_course: usize,
    /// News items, events and testimonials, each
    pub content_items: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admins: 1,
            tutors: 5,
            students: 50,
            alumni: 5,
            courses: 10,
            enrollments_per_student: 3,
            assignments_per_course: 4,
            sessions_per_course: 6,
            content_items: 6,
        }
    }
}

impl SeedConfig {
    pub fn total_users(&self) -> usize {
        self.admins + self.tutors + self.students + self.alumni
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_users() {
        let config = SeedConfig::default();
        assert_eq!(config.total_users(), 61);
    }
}
