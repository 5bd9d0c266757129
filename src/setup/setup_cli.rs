use clap::{Parser, Subcommand};
use wilky_backend::config::Config;
use wilky_backend::helper::account_helpers::{self, SignupForm};
use wilky_backend::models::db_operations::users_db_operations;
use wilky_backend::setup::db_setup;
use wilky_backend::DbPool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{params, Connection};
use bcrypt::{hash, DEFAULT_COST};
use redb::Database;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "setup_cli", author, version, about = "A CLI for initial Wilky setup.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the .env configuration file.
    #[arg(long, required = true, value_name = "FILE")]
    env_file: PathBuf,
}

#[derive(Subcommand, Debug)]
enum Commands {
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand, Debug)]
enum DbAction {
    /// Creates the accounts database, the posts database, or both.
    Setup {
        db_type: Option<String>,
    }
}

#[derive(Subcommand, Debug)]
enum UserAction {
    Create {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        display_name: String,
    },
    List,
    ChangePassword {
        #[arg(long)]
        email: String,
        #[arg(long)]
        new_password: String,
    },
}

#[derive(Subcommand, Debug)]
enum SettingsAction {
    Show,
    Set {
        #[arg(long)]
        key: String,
        #[arg(long)]
        value: String,
    },
}

const SETTING_KEYS: [&str; 2] = ["max_file_upload_size_mb", "allowed_mime_types"];

fn main() {
    let cli = Cli::parse();

    let config = Config::from_env(&cli.env_file)
        .expect("FATAL: Failed to load or parse configuration.");

    match &cli.command {
        Commands::Db { action } => match action {
            DbAction::Setup { db_type } => {
                match db_type.as_deref() {
                    Some("users") => setup_users_database(&config),
                    Some("posts") => setup_posts_database(&config),
                    Some(other) => eprintln!("❌ Error: Unknown database type '{}'. Use 'users' or 'posts'.", other),
                    None => {
                        setup_users_database(&config);
                        setup_posts_database(&config);
                    }
                }
            }
        },
        Commands::User { action } => match action {
            UserAction::Create { email, password, display_name } => {
                create_user(&config, email, password, display_name);
            }
            UserAction::List => list_users(&config),
            UserAction::ChangePassword { email, new_password } => {
                change_password(&config, email, new_password);
            }
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => show_settings(&config),
            SettingsAction::Set { key, value } => set_setting(&config, key, value),
        },
    }
}

fn setup_users_database(config: &Config) {
    let db_path = config.users_db_path();
    if db_path.exists() {
        println!("ℹ️ Accounts database already exists at '{}'. Skipping creation.", db_path.display());
        return;
    }
    println!("\nSetting up accounts database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let mut conn = Connection::open(&db_path).expect("Could not create accounts database file.");
    match db_setup::setup_users_db(&mut conn) {
        Ok(_) => println!("✅ Accounts database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up accounts database: {}", e),
    }
}

fn setup_posts_database(config: &Config) {
    let db_path = config.posts_db_path();
    if db_path.exists() {
        println!("ℹ️ Posts database already exists at '{}'. Skipping creation.", db_path.display());
        return;
    }
    println!("\nSetting up posts database at '{}'...", db_path.display());

    if let Some(parent_dir) = db_path.parent() {
        fs::create_dir_all(parent_dir).expect("Could not create database directory.");
    }

    let db = Database::create(&db_path).expect("Failed to create posts database file.");
    match db_setup::setup_posts_db(&db) {
        Ok(_) => println!("✅ Posts database setup completed successfully."),
        Err(e) => eprintln!("❌ Error setting up posts database: {}", e),
    }
}

fn open_accounts_db(config: &Config) -> Option<Connection> {
    let db_path = config.users_db_path();
    if !db_path.exists() {
        eprintln!("❌ Error: Accounts database not found at '{}'. Please run `setup_cli db setup` first.", db_path.display());
        return None;
    }
    match Connection::open(&db_path) {
        Ok(conn) => Some(conn),
        Err(e) => {
            eprintln!("❌ Error opening accounts database: {}", e);
            None
        }
    }
}

fn create_user(config: &Config, email: &str, password: &str, display_name: &str) {
    if open_accounts_db(config).is_none() {
        return;
    }
    let pool: DbPool = match r2d2::Pool::builder()
        .max_size(1)
        .build(SqliteConnectionManager::file(config.users_db_path()))
    {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("❌ Error opening accounts database: {}", e);
            return;
        }
    };
    let form = SignupForm {
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
        display_name: display_name.to_string(),
    };
    match account_helpers::sign_up(&pool, &form) {
        Ok((user, profile)) => println!(
            "✅ User '{}' created with username '{}' (id {}).",
            user.email, profile.username, user.user_id
        ),
        Err(e) => eprintln!("❌ Error creating user: {}", e),
    }
}

fn list_users(config: &Config) {
    let conn = match open_accounts_db(config) {
        Some(c) => c,
        None => return,
    };
    let mut stmt = match conn.prepare(
        "SELECT u.email, p.username, p.display_name FROM users u
         LEFT JOIN profiles p ON p.id = u.id ORDER BY u.created_at",
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Error preparing database query: {}", e);
            return;
        }
    };
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, Option<String>>(1)?,
            row.get::<_, Option<String>>(2)?,
        ))
    });

    println!("Listing Users:");
    match rows {
        Ok(rows) => {
            for row in rows {
                match row {
                    Ok((email, Some(username), Some(display_name))) => {
                        println!("- {} (@{}, {})", email, username, display_name)
                    }
                    Ok((email, _, _)) => println!("- {} (no profile)", email),
                    Err(e) => eprintln!("❌ Error reading row: {}", e),
                }
            }
        }
        Err(e) => eprintln!("❌ Error fetching users: {}", e),
    }
}

fn change_password(config: &Config, email: &str, new_password: &str) {
    if new_password.chars().count() < account_helpers::MIN_PASSWORD_LEN {
        eprintln!("❌ Error: Password must be at least {} characters.", account_helpers::MIN_PASSWORD_LEN);
        return;
    }
    let conn = match open_accounts_db(config) {
        Some(c) => c,
        None => return,
    };
    let hashed_password = hash(new_password, DEFAULT_COST).expect("Failed to hash new password");
    match conn.execute(
        "UPDATE users SET password_hash = ?1 WHERE email = ?2",
        params![hashed_password, email.trim().to_lowercase()],
    ) {
        Ok(0) => eprintln!("❌ Error: No user with email '{}' found.", email),
        Ok(_) => println!("✅ Password for '{}' changed successfully.", email),
        Err(e) => eprintln!("❌ Error updating password: {}", e),
    }
}

fn show_settings(config: &Config) {
    let conn = match open_accounts_db(config) {
        Some(c) => c,
        None => return,
    };
    for key in SETTING_KEYS {
        let value = users_db_operations::read_setting(&conn, key).unwrap_or_else(|| "(unset)".to_string());
        println!("{} = {}", key, value);
    }
}

fn set_setting(config: &Config, key: &str, value: &str) {
    if !SETTING_KEYS.contains(&key) {
        eprintln!("❌ Error: Unknown setting '{}'. Known settings: {}.", key, SETTING_KEYS.join(", "));
        return;
    }
    if key == "max_file_upload_size_mb" && value.parse::<u64>().map_or(true, |mb| mb == 0) {
        eprintln!("❌ Error: 'max_file_upload_size_mb' must be a positive whole number.");
        return;
    }
    let conn = match open_accounts_db(config) {
        Some(c) => c,
        None => return,
    };
    match users_db_operations::update_setting(&conn, key, value) {
        Ok(_) => println!("✅ Setting '{}' updated.", key),
        Err(e) => eprintln!("❌ Error updating setting: {}", e),
    }
}
