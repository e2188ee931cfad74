//! First-run seed data
//!
//! Each step runs only when its table is empty, so restarting the service
//! never duplicates rows.

use super::feedback::{count_feedback, insert_feedback_on};
use super::models::{NewFeedback, NewProduct, Role};
use super::now;
use super::products::{count_products, create_product};
use super::users::{count_users, create_user, list_users};
use crate::analysis::lead::LeadLabel;
use crate::analysis::sentiment::SentimentLabel;
use crate::auth::hash_password;
use crate::Result;
use chrono::Duration;
use rand::Rng;
use sqlx::SqlitePool;
use tracing::info;

/// Accounts created on an empty database: (username, password, role)
pub const DEFAULT_USERS: &[(&str, &str, Role)] = &[
    ("dev", "dev123", Role::Dev),
    ("manager", "manager123", Role::Manager),
    ("sales", "sales123", Role::Salesperson),
];

/// (name, description, details, catalogue_info)
const DEFAULT_PRODUCTS: &[(&str, &str, &str, &str)] = &[
    (
        "Enterprise AI Suite",
        "Full AI integration platform",
        "Unlimited API calls, dedicated support",
        "SKU: AI-ENT-001",
    ),
    (
        "Startup Starter Pack",
        "Essential tools for small teams",
        "Basic AI features, email support",
        "SKU: ST-BAS-101",
    ),
    (
        "Consulting Services",
        "Expert implementation help",
        "Hourly rate, onsite available",
        "SKU: SRV-CON-999",
    ),
];

const SAMPLE_LEADS: &[(&str, f64)] = &[
    ("Loved the demo, budget approved, wants to start next week.", 0.95),
    ("Very keen! Asked for a custom quote for 500 seats. Hot lead!", 0.98),
    ("Meeting went okay. They liked Feature A. Need to nurture.", 0.55),
    ("Just looking around, no immediate need. Maybe next year.", 0.20),
    ("Stuck in an existing contract for 6 months. Call back later.", 0.30),
    ("Great conversation. Decision maker needs approval from CEO.", 0.75),
    ("Standard inquiry, sent pricing sheet. Waiting to hear back.", 0.50),
    ("Had technical issues during the demo, they got frustrated.", 0.15),
    ("Impressed by the AI features. Wants a follow-up with their CTO.", 0.92),
    ("Their team is too small for the Enterprise plan, pitched Startup pack.", 0.45),
];

const SAMPLE_FEEDBACK: &[(&str, f64)] = &[
    ("I am extremely happy with the support team, solved my issue in 5 minutes!", 0.9),
    ("The new update is fantastic, everything runs so much faster.", 0.8),
    ("It's an okay product, but it's missing a few key features.", 0.1),
    ("I am so frustrated. The app crashed and I lost all my work.", -0.8),
    ("The pricing is way too high for what you get.", -0.5),
    ("The documentation is unclear and hard to follow.", -0.4),
    ("I like the product, it does exactly what it says it will do.", 0.6),
    ("The user interface is a bit clunky but it works.", 0.2),
    ("Your competitor offers the same thing for half the price.", -0.3),
    ("Just wanted to say thanks, this tool saved me hours of work.", 1.0),
];

/// Copies of each sample set inserted by the demo seed
const SAMPLE_REPEATS: usize = 2;

/// Demo rows are spread over this many days back from now
const SAMPLE_SPREAD_DAYS: i64 = 10;

/// Seed users, products and (optionally) demo submissions
pub async fn seed_defaults(pool: &SqlitePool, demo_data: bool) -> Result<()> {
    seed_users(pool).await?;
    seed_products(pool).await?;
    if demo_data {
        seed_demo_feedback(pool).await?;
    }
    Ok(())
}

async fn seed_users(pool: &SqlitePool) -> Result<()> {
    if count_users(pool).await? > 0 {
        return Ok(());
    }

    for (username, password, role) in DEFAULT_USERS {
        let hash = hash_password(password)?;
        create_user(pool, username, &hash, *role).await?;
    }
    info!("Seeded {} default users", DEFAULT_USERS.len());
    Ok(())
}

async fn seed_products(pool: &SqlitePool) -> Result<()> {
    if count_products(pool).await? > 0 {
        return Ok(());
    }

    for (name, description, details, catalogue_info) in DEFAULT_PRODUCTS {
        let product = NewProduct {
            name: name.to_string(),
            description: description.to_string(),
            details: details.to_string(),
            catalogue_info: catalogue_info.to_string(),
        };
        create_product(pool, &product).await?;
    }
    info!("Seeded {} products", DEFAULT_PRODUCTS.len());
    Ok(())
}

async fn seed_demo_feedback(pool: &SqlitePool) -> Result<()> {
    if count_feedback(pool).await? > 0 {
        return Ok(());
    }

    // Demo rows belong to the first salesperson account
    let Some(sales) = list_users(pool)
        .await?
        .into_iter()
        .find(|user| user.role == Role::Salesperson)
    else {
        return Ok(());
    };

    let rows = demo_rows(sales.id);
    let mut tx = pool.begin().await?;
    for row in &rows {
        insert_feedback_on(&mut tx, row).await?;
    }
    tx.commit().await?;

    info!("Seeded {} demo dashboard entries", rows.len());
    Ok(())
}

fn demo_rows(salesperson_id: i64) -> Vec<NewFeedback> {
    let mut rng = rand::thread_rng();
    let base = now();
    let mut rows = Vec::with_capacity((SAMPLE_LEADS.len() + SAMPLE_FEEDBACK.len()) * SAMPLE_REPEATS);

    for _ in 0..SAMPLE_REPEATS {
        for (text, p) in SAMPLE_LEADS {
            rows.push(NewFeedback {
                salesperson_id,
                text: text.to_string(),
                status: "lead".to_string(),
                lead_score: Some(*p),
                lead_label: Some(LeadLabel::from_probability(*p)),
                timestamp: Some(base - Duration::days(rng.gen_range(0..SAMPLE_SPREAD_DAYS))),
                ..Default::default()
            });
        }
    }

    for _ in 0..SAMPLE_REPEATS {
        for (text, s) in SAMPLE_FEEDBACK {
            rows.push(NewFeedback {
                salesperson_id,
                text: text.to_string(),
                status: "feedback".to_string(),
                sentiment_score: Some(*s),
                sentiment_label: Some(SentimentLabel::from_polarity(*s)),
                timestamp: Some(base - Duration::days(rng.gen_range(0..SAMPLE_SPREAD_DAYS))),
                ..Default::default()
            });
        }
    }

    rows
}
