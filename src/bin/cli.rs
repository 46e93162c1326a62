use anyhow::Context;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use todoapp::{
    config::AppConfig,
    db,
    models::Todo,
    repositories::{SqliteTodoRepository, SqliteUserRepository},
    services::{CreateUserRequest, TodoService, UserService},
};

#[derive(Parser)]
#[command(name = "todoapp-cli")]
#[command(about = "CLI tool for administering the todo application", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// User management commands
    User {
        #[command(subcommand)]
        command: UserCommands,
    },

    /// Todo inspection commands
    Todos {
        #[command(subcommand)]
        command: TodoCommands,
    },
}

#[derive(Subcommand)]
enum UserCommands {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// First name
        #[arg(short, long)]
        first_name: String,

        /// Last name
        #[arg(short, long, default_value = "")]
        last_name: String,

        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// List all users
    List {
        /// Maximum number of users to display
        #[arg(short, long, default_value_t = 100)]
        limit: i64,

        /// Offset for pagination
        #[arg(short = 'o', long, default_value_t = 0)]
        offset: i64,
    },
}

#[derive(Subcommand)]
enum TodoCommands {
    /// Show a user's todos grouped by due date
    List {
        /// Email address of the owner
        #[arg(short, long)]
        email: String,
    },
}

fn get_password(prompt: &str) -> anyhow::Result<String> {
    use std::io::{self, Write};
    print!("{}: ", prompt);
    io::stdout().flush()?;

    rpassword::read_password().context("Failed to read password")
}

fn print_section(name: &str, todos: &[Todo]) {
    println!("{} ({})", name, todos.len());
    for todo in todos {
        println!(
            "  [{}] #{:<5} {} {}",
            if todo.completed { "x" } else { " " },
            todo.id,
            todo.due_date,
            todo.title
        );
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let user_service = UserService::new(Arc::new(SqliteUserRepository::new(pool.clone())));
    let todo_service = TodoService::new(Arc::new(SqliteTodoRepository::new(pool.clone())));

    let cli = Cli::parse();

    match cli.command {
        Commands::User { command } => match command {
            UserCommands::Create {
                email,
                first_name,
                last_name,
                password,
            } => {
                let password = match password {
                    Some(pw) => pw,
                    None => {
                        let password = get_password("Password")?;
                        if password != get_password("Confirm password")? {
                            eprintln!("❌ Passwords do not match");
                            std::process::exit(1);
                        }
                        password
                    }
                };

                let request = CreateUserRequest {
                    first_name,
                    last_name,
                    email,
                    password,
                };

                match user_service.create_user(request).await {
                    Ok(user) => {
                        println!("✅ User created successfully!");
                        println!("  ID: {}", user.id);
                        println!("  Name: {}", user.display_name());
                        println!("  Email: {}", user.email);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to create user: {}", err);
                        std::process::exit(1);
                    }
                }
            }

            UserCommands::List { limit, offset } => {
                match user_service.list_users(Some(limit), Some(offset)).await {
                    Ok(users) if users.is_empty() => println!("No users found."),
                    Ok(users) => {
                        println!("{:<5} {:<30} {:<40} {:<20}", "ID", "Name", "Email", "Created");
                        println!("{}", "-".repeat(95));
                        for user in users {
                            println!(
                                "{:<5} {:<30} {:<40} {:<20}",
                                user.id,
                                user.display_name(),
                                user.email,
                                user.created_at.as_deref().unwrap_or("N/A")
                            );
                        }
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to list users: {}", err);
                        std::process::exit(1);
                    }
                }
            }
        },

        Commands::Todos { command } => match command {
            TodoCommands::List { email } => {
                let user = match user_service.find_user_by_email(&email).await {
                    Ok(Some(user)) => user,
                    Ok(None) => {
                        eprintln!("❌ User '{}' not found", email);
                        std::process::exit(1);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to find user: {}", err);
                        std::process::exit(1);
                    }
                };

                match todo_service
                    .grouped_todos(user.id, Local::now().date_naive())
                    .await
                {
                    Ok(grouped) => {
                        print_section("Overdue", &grouped.overdue);
                        print_section("Due today", &grouped.due_today);
                        print_section("Due later", &grouped.due_later);
                        print_section("Completed", &grouped.completed);
                    }
                    Err(err) => {
                        eprintln!("❌ Failed to list todos: {}", err);
                        std::process::exit(1);
                    }
                }
            }
        },
    }

    pool.close().await;

    Ok(())
}
