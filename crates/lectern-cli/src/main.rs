use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use lectern_cli::admin::{self, NewAdmin};
use lectern_cli::seeder::{self, SeedConfig};
use sqlx::PgPool;

#[derive(Parser)]
#[command(name = "lectern-cli")]
#[command(about = "Lectern CLI - administrative tools for Lectern", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account
    CreateAdmin {
        #[arg(short = 'u', long)]
        username: Option<String>,

        #[arg(short = 'f', long)]
        first_name: Option<String>,

        #[arg(short = 'l', long)]
        last_name: Option<String>,

        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Password (prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// Job title shown on the admin profile
        #[arg(long)]
        role_title: Option<String>,
    },
    /// Seed the database with fake users, courses, coursework and site content
    Seed {
        #[arg(long, default_value = "1")]
        admins: usize,

        #[arg(long, default_value = "5")]
        tutors: usize,

        #[arg(long, default_value = "50")]
        students: usize,

        #[arg(long, default_value = "5")]
        alumni: usize,

        #[arg(long, default_value = "10")]
        courses: usize,

        /// Courses each student enrolls in
        #[arg(long, default_value = "3")]
        enrollments: usize,

        #[arg(long, default_value = "4")]
        assignments: usize,

        /// Class sessions per course
        #[arg(long, default_value = "6")]
        sessions: usize,

        /// News items, events and testimonials each
        #[arg(long, default_value = "6")]
        content: usize,
    },
    /// Remove everything created by `seed`
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let pool = match lectern_db::init_db_pool(5).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ {e:#}");
            std::process::exit(1);
        }
    };

    let cli = Cli::parse();

    match cli.command {
        Commands::CreateAdmin {
            username,
            first_name,
            last_name,
            email,
            password,
            role_title,
        } => {
            handle_create_admin(&pool, username, first_name, last_name, email, password, role_title)
                .await
        }
        Commands::Seed {
            admins,
            tutors,
            students,
            alumni,
            courses,
            enrollments,
            assignments,
            sessions,
            content,
        } => {
            let config = SeedConfig {
                admins,
                tutors,
                students,
                alumni,
                courses,
                enrollments_per_student: enrollments,
                assignments_per_course: assignments,
                sessions_per_course: sessions,
                content_items: content,
            };
            handle_seed(&pool, config).await
        }
        Commands::ClearSeed => handle_clear_seed(&pool).await,
    }
}

fn prompt(label: &str, value: Option<String>) -> String {
    value.unwrap_or_else(|| {
        Input::new()
            .with_prompt(label)
            .interact_text()
            .unwrap_or_else(|e| {
                eprintln!("❌ Failed to read {label}: {e}");
                std::process::exit(1);
            })
    })
}

async fn handle_create_admin(
    pool: &PgPool,
    username: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
    role_title: Option<String>,
) {
    let username = prompt("Username", username);
    let first_name = prompt("First name", first_name);
    let last_name = prompt("Last name", last_name);
    let email = prompt("Email address", email);
    let password = password.unwrap_or_else(|| {
        Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| {
                eprintln!("❌ Failed to read password: {e}");
                std::process::exit(1);
            })
    });

    let new_admin = NewAdmin {
        username,
        email,
        first_name,
        last_name,
        password,
        role_title,
    };
    let summary = format!(
        "   Email: {}\n   Name: {} {}",
        new_admin.email, new_admin.first_name, new_admin.last_name
    );

    match admin::create_admin(pool, new_admin).await {
        Ok(id) => {
            println!("\n✅ Admin created successfully!");
            println!("   Id: {id}");
            println!("{summary}");
        }
        Err(e) => {
            eprintln!("\n❌ Error creating admin: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn handle_seed(pool: &PgPool, config: SeedConfig) {
    if let Err(e) = seeder::seed_all(pool, config).await {
        eprintln!("\n❌ Error seeding database: {e:#}");
        std::process::exit(1);
    }
}

async fn handle_clear_seed(pool: &PgPool) {
    match seeder::clear_seed(pool).await {
        Ok(users) => println!("✅ Cleared seeded data ({users} users removed)"),
        Err(e) => {
            eprintln!("\n❌ Error clearing seed data: {e:#}");
            std::process::exit(1);
        }
    }
}
