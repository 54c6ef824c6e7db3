// Database connection and initialization

use diesel::prelude::*;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use rocket::Rocket;
use rocket_db_pools::Database;
use rocket_db_pools::diesel::{AsyncMysqlConnection, MysqlPool};
use uuid::Uuid;

use crate::AppState;

/// Database connection pool for the challenge
#[derive(Database)]
#[database("challenge_db")]
pub struct ChallengeDb(MysqlPool);

// Embed migrations from the migrations directory
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

// MigrationHarness wants a sync connection; the wrapper drives the async
// MySQL client from inside a blocking task so the pool and the harness
// share one client implementation.
type SyncMysqlConnection = AsyncConnectionWrapper<AsyncMysqlConnection>;

fn database_url(rocket: &Rocket<rocket::Build>) -> String {
    rocket
        .state::<AppState>()
        .expect("AppState must be managed before database fairings run")
        .database_url
        .clone()
}

/// Run pending database migrations
pub async fn run_migrations(rocket: Rocket<rocket::Build>) -> Rocket<rocket::Build> {
    let url = database_url(&rocket);

    let result: Result<Vec<String>, String> = rocket::tokio::task::spawn_blocking(move || {
        let mut sync_conn = SyncMysqlConnection::establish(&url)
            .map_err(|e| format!("Failed to establish connection: {}", e))?;

        let versions = sync_conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| format!("Failed to run migrations: {}", e))?
            .into_iter()
            .map(|v| v.to_string())
            .collect::<Vec<String>>();

        Ok(versions)
    })
    .await
    .expect("Migration task panicked");

    match result {
        Ok(versions) => {
            if versions.is_empty() {
                println!("✅ Database is up to date");
            } else {
                println!("✅ Applied {} migration(s):", versions.len());
                for version in versions {
                    println!("   - {}", version);
                }
            }
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            panic!("Database migration failed");
        }
    }

    rocket
}

/// Seed the students table from the SEED_STUDENTS environment variable
/// (comma-separated names), only when the table is still empty.
pub async fn run_seeding(rocket: Rocket<rocket::Build>) -> Rocket<rocket::Build> {
    let url = database_url(&rocket);

    let result: Result<(), String> = rocket::tokio::task::spawn_blocking(move || {
        let Ok(students_env) = std::env::var("SEED_STUDENTS") else {
            return Ok(());
        };

        let mut sync_conn = SyncMysqlConnection::establish(&url)
            .map_err(|e| format!("Failed to establish connection: {}", e))?;

        use crate::schema::students::dsl::*;

        let count: i64 = students.count().get_result(&mut sync_conn).unwrap_or(0);

        if count == 0 {
            let new_students: Vec<crate::models::NewStudent> = students_env
                .split(',')
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| crate::models::NewStudent {
                    id: Uuid::new_v4().to_string(),
                    name: s.to_string(),
                    description: None,
                    photo_url: None,
                })
                .collect();

            if !new_students.is_empty() {
                diesel::insert_into(students)
                    .values(&new_students)
                    .execute(&mut sync_conn)
                    .map_err(|e| format!("Failed to seed students: {}", e))?;
                println!(
                    "🌱 Seeded {} students from environment variable",
                    new_students.len()
                );
            }
        }
        Ok(())
    })
    .await
    .expect("Seeding task panicked");

    if let Err(e) = result {
        eprintln!("❌ Seeding failed: {}", e);
    }

    rocket
}
