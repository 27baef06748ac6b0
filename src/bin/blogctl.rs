use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{Level, info};

use blog_orm::models::{self, Blog, Comment, User};
use blog_orm::prelude::*;

#[derive(Parser, Debug)]
#[command(author, version, about = "Manage the blog database")]
struct Args {
    /// JSON settings replacing the built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON settings merged over the defaults
    #[arg(long = "override")]
    overrides: Option<PathBuf>,
    #[arg(long, value_enum)]
    backend: Option<DatabaseType>,
    /// Database name, or file path for SQLite
    #[arg(long)]
    database: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the blog tables
    Init,
    /// Drop the blog tables
    Drop,
    /// Add a user account
    AddUser {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        /// Stored as given; hash it before passing it in
        #[arg(long)]
        passwd: String,
        #[arg(long)]
        admin: bool,
        #[arg(long)]
        image: Option<String>,
    },
    /// List user accounts, newest first
    ListUsers {
        #[arg(long)]
        limit: Option<i64>,
        #[arg(long, requires = "limit")]
        offset: Option<i64>,
    },
    /// Publish a blog post as an existing user
    Post {
        #[arg(long)]
        author: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        summary: String,
        #[arg(long)]
        content: String,
    },
    /// Count the rows of every blog table
    Count,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let settings = match load_settings(&args) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("failed to load settings: {err}");
            return ExitCode::FAILURE;
        }
    };

    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(if settings.debug { Level::DEBUG } else { Level::INFO })
        .init();

    match run(args.command, &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn load_settings(args: &Args) -> Result<Settings, OrmError> {
    let mut settings = Settings::load(args.config.as_deref(), args.overrides.as_deref())?;
    if let Some(backend) = args.backend {
        settings.db.backend = backend;
    }
    if let Some(database) = &args.database {
        settings.db.database = Some(database.clone());
    }
    Ok(settings)
}

async fn run(command: Command, settings: &Settings) -> Result<(), OrmError> {
    models::register_all()?;
    let db = Database::create_pool(&settings.db).await?;

    match command {
        Command::Init => {
            db.execute_batch(&models::create_tables_sql()?).await?;
            info!("tables created");
        }
        Command::Drop => {
            db.execute_batch(&models::drop_tables_sql()?).await?;
            info!("tables dropped");
        }
        Command::AddUser {
            email,
            name,
            passwd,
            admin,
            image,
        } => {
            let mut user = User {
                email: Some(email),
                name: Some(name),
                passwd: Some(passwd),
                admin: Some(admin),
                image,
                ..User::default()
            };
            user.save(&db).await?;
            println!("{}", user.id.unwrap_or_default());
        }
        Command::ListUsers { limit, offset } => {
            let mut options = FindOptions::new().order_by(r#""created_at" desc"#);
            options = match (offset, limit) {
                (Some(offset), Some(limit)) => options.limit((offset, limit)),
                (None, Some(limit)) => options.limit(limit),
                _ => options,
            };
            for user in User::find_all(&db, options).await? {
                println!(
                    "{}\t{}\t{}{}",
                    user.id.unwrap_or_default(),
                    user.email.unwrap_or_default(),
                    user.name.unwrap_or_default(),
                    if user.admin == Some(true) { "\tadmin" } else { "" }
                );
            }
        }
        Command::Post {
            author,
            title,
            summary,
            content,
        } => {
            let users = User::find_all(
                &db,
                FindOptions::new()
                    .filter(r#""email"=?"#, vec![SqlValue::from(author.as_str())])
                    .limit(1),
            )
            .await?;
            let Some(user) = users.into_iter().next() else {
                return Err(OrmError::ValidationError(format!("no user with email {author}")));
            };
            let mut blog = Blog {
                user_id: user.id,
                user_name: user.name,
                user_image: user.image,
                name: Some(title),
                summary: Some(summary),
                content: Some(content),
                ..Blog::default()
            };
            blog.save(&db).await?;
            println!("{}", blog.id.unwrap_or_default());
        }
        Command::Count => {
            for (table, count) in [
                ("users", count_rows::<User>(&db).await?),
                ("blogs", count_rows::<Blog>(&db).await?),
                ("comments", count_rows::<Comment>(&db).await?),
            ] {
                println!("{table}\t{count}");
            }
        }
    }
    Ok(())
}

async fn count_rows<E: Entity>(db: &Database) -> Result<i64, OrmError> {
    let value = E::find_number(db, "count(*)", None, Vec::new()).await?;
    Ok(value.and_then(|v| v.as_int().copied()).unwrap_or(0))
}
