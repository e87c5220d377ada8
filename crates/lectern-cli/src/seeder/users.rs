//! Fake accounts and their role profiles.

use fake::Fake;
use fake::faker::company::en::Buzzword;
use fake::faker::name::en::{FirstName, LastName};
use lectern_models::{UserId, UserRole};
use rayon::prelude::*;
use sqlx::{Postgres, QueryBuilder, Transaction};

use super::models::{SEED_EMAIL_DOMAIN, UserSeed};

// 6 binds per user, well under the Postgres parameter limit
const BATCH_SIZE: usize = 1000;

pub fn generate_users(role: UserRole, count: usize, password_hash: &str) -> Vec<UserSeed> {
    (0..count)
        .into_par_iter()
        .map(|idx| {
            let first_name: String = FirstName().fake();
            let last_name: String = LastName().fake();
            // Index suffix keeps usernames and emails unique across the batch
            let username = format!(
                "{}.{}.{}{}",
                first_name.to_lowercase(),
                last_name.to_lowercase(),
                role.as_str(),
                idx
            )
            .replace(|c: char| !c.is_ascii_alphanumeric() && c != '.', "");

            UserSeed {
                email: format!("{username}@{SEED_EMAIL_DOMAIN}"),
                username,
                first_name,
                last_name,
                role,
                password_hash: password_hash.to_string(),
            }
        })
        .collect()
}

pub async fn insert_users(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> anyhow::Result<Vec<UserId>> {
    let mut ids = Vec::with_capacity(users.len());

    for chunk in users.chunks(BATCH_SIZE) {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(
            "INSERT INTO users (username, email, first_name, last_name, password, role) ",
        );
        qb.push_values(chunk, |mut row, user| {
            row.push_bind(&user.username)
                .push_bind(&user.email)
                .push_bind(&user.first_name)
                .push_bind(&user.last_name)
                .push_bind(&user.password_hash)
                .push_bind(user.role);
        });
        qb.push(" RETURNING id");

        let chunk_ids: Vec<UserId> = qb.build_query_scalar().fetch_all(&mut **tx).await?;
        ids.extend(chunk_ids);
    }

    Ok(ids)
}

/// Creates the matching profile row for every user, numbering students and
/// tutors from the shared sequences.
pub async fn insert_profiles(
    tx: &mut Transaction<'_, Postgres>,
    role: UserRole,
    user_ids: &[UserId],
) -> anyhow::Result<()> {
    if user_ids.is_empty() {
        return Ok(());
    }

    match role {
        UserRole::Student => {
            sqlx::query(
                r#"INSERT INTO student_profiles (user_id, student_number, course_of_study, admission_year)
                SELECT u, 'STU' || LPAD(nextval('student_number_seq')::text, 6, '0'), $2,
                       EXTRACT(YEAR FROM NOW())::int
                FROM UNNEST($1::uuid[]) AS u"#,
            )
            .bind(user_ids)
            .bind(Buzzword().fake::<String>())
            .execute(&mut **tx)
            .await?;
        }
        UserRole::Tutor => {
            sqlx::query(
                r#"INSERT INTO tutor_profiles (user_id, staff_number, department)
                SELECT u, 'TUT' || LPAD(nextval('staff_number_seq')::text, 6, '0'), $2
                FROM UNNEST($1::uuid[]) AS u"#,
            )
            .bind(user_ids)
            .bind("Faculty of Sciences")
            .execute(&mut **tx)
            .await?;
        }
        UserRole::Admin => {
            sqlx::query(
                "INSERT INTO admin_profiles (user_id, role_title) SELECT u, 'Registrar' FROM UNNEST($1::uuid[]) AS u",
            )
            .bind(user_ids)
            .execute(&mut **tx)
            .await?;
        }
        UserRole::Alumni => {
            sqlx::query(
                r#"INSERT INTO alumni_profiles (user_id, graduation_year)
                SELECT u, EXTRACT(YEAR FROM NOW())::int - 1 FROM UNNEST($1::uuid[]) AS u"#,
            )
            .bind(user_ids)
            .execute(&mut **tx)
            .await?;
        }
    }

    Ok(())
}
