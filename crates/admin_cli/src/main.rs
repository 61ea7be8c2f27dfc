use std::{error::Error, io::Write};

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    style::Print,
    terminal,
    terminal::ClearType,
};
use engine::{
    AssetKind, AssetNew, DriverNew, Engine, ExpenseCategory, FreightNew, FreightStatus,
    LoadExpenseNew, MoneyCents, PayRate, users,
};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};

#[derive(Parser, Debug)]
#[command(name = "haulbooks_admin")]
#[command(about = "Admin utilities for Haulbooks (bootstrap users, seed demo books)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite:./haulbooks.db?mode=rwc"
    )]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    /// Fill a user's books with a small demo data set.
    Seed(SeedArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Add(UserAddArgs),
    List,
}

#[derive(Args, Debug)]
struct UserAddArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct SeedArgs {
    #[arg(long)]
    username: String,
}

struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> Result<Self, Box<dyn Error + Send + Sync>> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn prompt_password(prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>> {
    let _raw = RawModeGuard::enter()?;

    let mut out = std::io::stderr();
    execute!(
        out,
        cursor::MoveToColumn(0),
        terminal::Clear(ClearType::CurrentLine),
        Print(prompt)
    )?;
    out.flush()?;

    let mut buf = String::new();
    loop {
        let Event::Key(KeyEvent {
            code, modifiers, ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                break;
            }
            KeyCode::Backspace => {
                if buf.pop().is_some() {
                    execute!(out, cursor::MoveLeft(1), Print(" "), cursor::MoveLeft(1))?;
                    out.flush()?;
                }
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                execute!(out, Print("\r\n"))?;
                out.flush()?;
                return Err("interrupted".into());
            }
            KeyCode::Char(ch) if !modifiers.contains(KeyModifiers::CONTROL) => {
                buf.push(ch);
                execute!(out, Print("*"))?;
                out.flush()?;
            }
            _ => {}
        }
    }

    Ok(buf)
}

fn prompt_password_twice() -> Result<String, Box<dyn Error + Send + Sync>> {
    let mut out = std::io::stderr();
    for _ in 0..3 {
        let p1 = prompt_password("Password: ")?;
        if p1.is_empty() {
            execute!(
                out,
                cursor::MoveToColumn(0),
                terminal::Clear(ClearType::CurrentLine),
                Print("Password must not be empty.\r\n")
            )?;
            continue;
        }

        let p2 = prompt_password("Confirm password: ")?;
        if p1 == p2 {
            return Ok(p1);
        }

        execute!(
            out,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine),
            Print("Passwords do not match. Try again.\r\n")
        )?;
    }

    Err("too many attempts".into())
}

async fn connect_db(
    database_url: &str,
) -> Result<DatabaseConnection, Box<dyn Error + Send + Sync>> {
    let db = Database::connect(database_url).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

async fn seed(engine: &mut Engine, username: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let driver_id = engine
        .new_driver(
            username,
            DriverNew {
                name: "Alice Carter".to_string(),
                pay: PayRate::PerMile { cents_per_mile: 55 },
                images: Vec::new(),
            },
        )
        .await?;
    let asset_id = engine
        .new_asset(
            username,
            AssetNew {
                kind: AssetKind::Truck,
                identifier: "Unit 12".to_string(),
                description: Some("2019 Cascadia".to_string()),
                images: Vec::new(),
            },
        )
        .await?;

    let freight_id = engine
        .new_freight(
            username,
            FreightNew {
                label: "L-1001".to_string(),
                origin: "Columbus, OH".to_string(),
                destination: "Nashville, TN".to_string(),
                distance_miles: 380.0,
                weight_lbs: 42_000.0,
                date: NaiveDate::from_ymd_opt(2026, 3, 2).ok_or("bad seed date")?,
                driver_id: Some(driver_id),
                asset_id: Some(asset_id),
                line_haul: MoneyCents::new(185_000),
                fuel_surcharge: MoneyCents::new(12_000),
                loading: MoneyCents::ZERO,
                unloading: MoneyCents::new(5_000),
                accessorials: MoneyCents::ZERO,
                owner_percentage: None,
                status: FreightStatus::Delivered,
                comment: Some("booked with Apex Logistics".to_string()),
                author: username.to_string(),
            },
        )
        .await?;
    engine
        .add_load_expense(
            username,
            freight_id,
            LoadExpenseNew {
                category: ExpenseCategory::from("Fuel"),
                description: "Fill-up, Louisville".to_string(),
                amount: MoneyCents::new(41_300),
                date: None,
            },
        )
        .await?;

    engine
        .new_freight(
            username,
            FreightNew {
                label: "L-1002".to_string(),
                origin: "Nashville, TN".to_string(),
                destination: "Atlanta, GA".to_string(),
                distance_miles: 250.0,
                weight_lbs: 38_500.0,
                date: NaiveDate::from_ymd_opt(2026, 3, 5).ok_or("bad seed date")?,
                driver_id: Some(driver_id),
                asset_id: Some(asset_id),
                line_haul: MoneyCents::new(120_000),
                fuel_surcharge: MoneyCents::new(8_000),
                loading: MoneyCents::ZERO,
                unloading: MoneyCents::ZERO,
                accessorials: MoneyCents::ZERO,
                owner_percentage: None,
                status: FreightStatus::InRoute,
                comment: None,
                author: username.to_string(),
            },
        )
        .await?;

    engine.add_category(username, "Scale Tickets").await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Add(args),
        }) => {
            let password = prompt_password_twice()?;

            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::User(User {
            command: UserCommand::List,
        }) => {
            for user in users::Entity::find().all(&db).await? {
                println!("{}", user.username);
            }
        }
        Command::Seed(args) => {
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_none()
            {
                eprintln!("user not found: {}", args.username);
                std::process::exit(1);
            }

            let mut engine = Engine::builder().database(db.clone()).build().await?;
            seed(&mut engine, &args.username).await?;
            println!("seeded demo books for: {}", args.username);
        }
    }

    Ok(())
}
