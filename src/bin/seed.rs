//! Seed script for development: populates a fresh database with sample
//! companies, profiles and appointments.
//!
//! Usage: `cargo run --bin seed`
//!
//! Requires `DATABASE_URL` and `JWT_SECRET` environment variables (reads .env).
//! Prints a session token per seeded profile for use as `DASHBOARD_TOKEN`.

use appointment_insights::config::AppConfig;
use appointment_insights::models::appointment::Disposition;
use appointment_insights::models::user::{Profile, UserRole};
use appointment_insights::services::auth;
use chrono::{Duration, Local, NaiveTime};
use rand::seq::SliceRandom;
use rand::Rng;
use sqlx::PgPool;

const COMPANIES: [(&str, &str); 2] = [("acme", "Acme Solar"), ("globex", "Globex Energy")];

const CLOSERS: [&str; 4] = ["Mike Chen", "Emma Williams", "Sarah Johnson", "David Kim"];
const SETTERS: [&str; 3] = ["Lisa Brown", "Tony Garcia", "Rachel Lee"];
const ROOF_TYPES: [&str; 4] = ["Shingles", "Tile", "Metal", "Flat Roof"];
const SHADING: [&str; 3] = ["None", "Partial", "Heavy"];
const APPOINTMENT_TYPES: [&str; 2] = ["In-Home", "Virtual"];

const TOKEN_EXPIRY_SECS: i64 = 7 * 24 * 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let pool = appointment_insights::db::create_pool(&config.database_url, 5).await?;

    // Run migrations first
    appointment_insights::db::migrate(&pool).await?;

    println!("=== Appointment Insights Seed Script ===");

    seed_companies(&pool).await?;
    let profiles = seed_profiles(&pool).await?;
    seed_appointments(&pool).await?;

    println!("\n=== Seed complete! ===");
    for profile in &profiles {
        let token = auth::generate_token(profile, &config.jwt_secret, TOKEN_EXPIRY_SECS)?;
        println!("{} ({}): {token}", profile.email, profile.role);
    }

    Ok(())
}

async fn seed_companies(pool: &PgPool) -> anyhow::Result<()> {
    for (code, name) in COMPANIES {
        sqlx::query(
            "INSERT INTO companies (company_id, company_name) VALUES ($1, $2)
             ON CONFLICT (company_id) DO NOTHING",
        )
        .bind(code)
        .bind(name)
        .execute(pool)
        .await?;
    }
    println!("[done] Companies ready");
    Ok(())
}

async fn seed_profiles(pool: &PgPool) -> anyhow::Result<Vec<Profile>> {
    let wanted = [
        ("admin@insights.local", UserRole::SuperAdmin, None),
        ("manager@acme.local", UserRole::User, Some("acme")),
        ("manager@globex.local", UserRole::User, Some("globex")),
    ];

    let mut profiles = Vec::with_capacity(wanted.len());
    for (email, role, company) in wanted {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (email, role, company_id)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role, company_id = EXCLUDED.company_id
            RETURNING id, email, role, company_id, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(role.as_str())
        .bind(company)
        .fetch_one(pool)
        .await?;
        profiles.push(profile);
    }
    println!("[done] {} profiles ready", profiles.len());
    Ok(profiles)
}

async fn seed_appointments(pool: &PgPool) -> anyhow::Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM appointments")
        .fetch_one(pool)
        .await?;

    if count > 0 {
        println!("[skip] Appointments already exist ({count})");
        return Ok(());
    }

    let today = Local::now().date_naive();
    let mut rng = rand::thread_rng();
    let mut inserted = 0usize;

    for day_offset in 0..60 {
        let day = today - Duration::days(day_offset);
        for (company, _) in COMPANIES {
            for _ in 0..rng.gen_range(0..6) {
                let hour = rng.gen_range(9..19);
                let booked_for = day.and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN));
                let closer = *CLOSERS.choose(&mut rng).unwrap_or(&CLOSERS[0]);
                let setter = if rng.gen_bool(0.85) {
                    SETTERS.choose(&mut rng).copied()
                } else {
                    None
                };
                let disposition = *Disposition::ALL
                    .choose(&mut rng)
                    .unwrap_or(&Disposition::Pending);
                let credit_score: i32 = rng.gen_range(580..820);

                sqlx::query(
                    r#"
                    INSERT INTO appointments (
                        company_id, name, closer_name, setter_name, booked_for,
                        confirmation_disposition, phone_number, credit_score,
                        roof_type, existing_solar, shading, appointment_type, confirmed
                    )
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
                    "#,
                )
                .bind(company)
                .bind(format!("Customer {}", inserted + 1))
                .bind(closer)
                .bind(setter)
                .bind(booked_for)
                .bind(disposition)
                .bind(format!("555-01{:02}", inserted % 100))
                .bind(credit_score)
                .bind(ROOF_TYPES.choose(&mut rng).copied())
                .bind(rng.gen_bool(0.2))
                .bind(SHADING.choose(&mut rng).copied())
                .bind(APPOINTMENT_TYPES.choose(&mut rng).copied())
                .bind(rng.gen_bool(0.7))
                .execute(pool)
                .await?;
                inserted += 1;
            }
        }
    }

    println!("[done] Created {inserted} sample appointments");
    Ok(())
}
