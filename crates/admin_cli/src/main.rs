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
use engine::{Engine, MoneyCents, NewFuelRecord, PriceInput, Volume};
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection, EntityTrait, Set};
use uuid::Uuid;

mod report;

mod users {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
    #[sea_orm(table_name = "users")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub username: String,
        pub password: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

#[derive(Parser, Debug)]
#[command(name = "fuel_admin")]
#[command(about = "Admin utilities for the fuel tracker (bootstrap users/cars, statistics)")]
struct Cli {
    /// Database connection string (also read from `DATABASE_URL`).
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite:./fuel.db?mode=rwc")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    User(User),
    Car(Car),
    Record(Record),
    /// Print fuel statistics of a user.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct User {
    #[command(subcommand)]
    command: UserCommand,
}

#[derive(Subcommand, Debug)]
enum UserCommand {
    Create(UserCreateArgs),
}

#[derive(Args, Debug)]
struct UserCreateArgs {
    #[arg(long)]
    username: String,
}

#[derive(Args, Debug)]
struct Car {
    #[command(subcommand)]
    command: CarCommand,
}

#[derive(Subcommand, Debug)]
enum CarCommand {
    Add(CarAddArgs),
    List(OwnerArgs),
}

#[derive(Args, Debug)]
struct CarAddArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    name: String,
}

#[derive(Args, Debug)]
struct OwnerArgs {
    #[arg(long)]
    owner: String,
}

#[derive(Args, Debug)]
struct Record {
    #[command(subcommand)]
    command: RecordCommand,
}

#[derive(Subcommand, Debug)]
enum RecordCommand {
    Add(RecordAddArgs),
}

#[derive(Args, Debug)]
struct RecordAddArgs {
    #[arg(long)]
    owner: String,
    #[arg(long)]
    car: Uuid,
    /// `YYYY-MM-DD`
    #[arg(long)]
    date: NaiveDate,
    #[arg(long)]
    mileage: f64,
    /// Liters, `.` or `,` as decimal separator.
    #[arg(long)]
    liters: String,
    /// Amount paid.
    #[arg(long)]
    total: Option<String>,
    /// Price per liter.
    #[arg(long)]
    per_liter: Option<String>,
}

#[derive(Args, Debug)]
struct StatsArgs {
    #[arg(long)]
    owner: String,
    /// Print the report as JSON, in the shape served by `GET /stats`.
    #[arg(long)]
    json: bool,
}

fn price_input(args: &RecordAddArgs) -> Result<PriceInput, Box<dyn Error + Send + Sync>> {
    let total = args.total.as_deref().map(str::parse::<MoneyCents>).transpose()?;
    let per_liter = args
        .per_liter
        .as_deref()
        .map(str::parse::<MoneyCents>)
        .transpose()?;

    match (total, per_liter) {
        (Some(total), Some(per_liter)) => Ok(PriceInput::Both { total, per_liter }),
        (Some(total), None) => Ok(PriceInput::Total(total)),
        (None, Some(per_liter)) => Ok(PriceInput::PerLiter(per_liter)),
        (None, None) => Err("--total or --per-liter required".into()),
    }
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

async fn require_user(
    db: &DatabaseConnection,
    username: &str,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    if users::Entity::find_by_id(username.to_string())
        .one(db)
        .await?
        .is_none()
    {
        eprintln!("user not found: {username}");
        std::process::exit(1);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();

    let db = connect_db(&cli.database_url).await?;
    let engine = Engine::builder().database(db.clone()).build().await?;

    match cli.command {
        Command::User(User {
            command: UserCommand::Create(args),
        }) => {
            if users::Entity::find_by_id(args.username.clone())
                .one(&db)
                .await?
                .is_some()
            {
                eprintln!("user already exists: {}", args.username);
                std::process::exit(1);
            }

            let password = prompt_password_twice()?;

            let user = users::ActiveModel {
                username: Set(args.username.clone()),
                password: Set(password),
            };
            users::Entity::insert(user).exec(&db).await?;

            println!("created user: {}", args.username);
        }
        Command::Car(Car {
            command: CarCommand::Add(args),
        }) => {
            require_user(&db, &args.owner).await?;
            let car_id = engine.new_car(&args.name, &args.owner).await?;
            println!("created car: {} ({car_id})", args.name.trim());
        }
        Command::Car(Car {
            command: CarCommand::List(args),
        }) => {
            require_user(&db, &args.owner).await?;
            for car in engine.cars(&args.owner).await? {
                println!("{}  {}", car.id, car.name);
            }
        }
        Command::Record(Record {
            command: RecordCommand::Add(args),
        }) => {
            require_user(&db, &args.owner).await?;
            let liters: Volume = args.liters.parse()?;
            let price = price_input(&args)?;
            let new = NewFuelRecord::new(args.car, args.date, args.mileage, liters, price);
            let record_id = engine.add_record(new, &args.owner).await?;
            println!("logged refuel: {record_id}");
        }
        Command::Stats(args) => {
            require_user(&db, &args.owner).await?;
            let report = engine.statistics(&args.owner).await?;
            if args.json {
                let view = server::statistics_view(report);
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", report::render(&report));
            }
        }
    }

    Ok(())
}
