use clap::{Parser, Subcommand};
use dotenvy::dotenv;

use warden::cli::{AdminTools, stale_roles_warning};
use warden_cache::CacheConfig;
use warden_config::JwtConfig;
use warden_db::init_db_pool;

#[derive(Parser)]
#[command(name = "warden-cli")]
#[command(about = "Warden CLI - session and role administration", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user with no extra roles
    CreateUser {
        #[arg(short = 'e', long)]
        email: String,

        #[arg(short = 'n', long)]
        name: String,
    },
    /// Create a session for a user and print its token
    IssueSession { user_id: String },
    /// Invalidate cached roles so clients refresh
    BumpRoles { user_id: String },
    /// Grant a role
    AssignRole { user_id: String, role: String },
    /// Remove a role
    RevokeRole { user_id: String, role: String },
    /// Ban a user and end all of their sessions
    Ban { user_id: String },
    /// End all sessions of a user
    RevokeSessions { user_id: String },
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    warden_observability::basic_logging::init_basic_console_logging();

    let cli = Cli::parse();
    let pool = init_db_pool().await;

    let cache_config = CacheConfig::from_env();
    let tools = match AdminTools::connect(pool, &cache_config).await {
        Ok(tools) => tools,
        Err(e) => {
            eprintln!("Error connecting: {}", e);
            std::process::exit(1);
        }
    };

    let changes_roles = matches!(
        cli.command,
        Commands::BumpRoles { .. }
            | Commands::AssignRole { .. }
            | Commands::RevokeRole { .. }
            | Commands::Ban { .. }
    );

    let result = match cli.command {
        Commands::CreateUser { email, name } => tools
            .create_user(&email, &name)
            .await
            .map(|identity| format!("Created user {} <{}>", identity.id, identity.email)),
        Commands::IssueSession { user_id } => tools
            .issue_session(&user_id, JwtConfig::from_env())
            .await,
        Commands::BumpRoles { user_id } => tools
            .bump_roles(&user_id)
            .await
            .map(|v| format!("Roles version is now {}", v)),
        Commands::AssignRole { user_id, role } => tools
            .assign_role(&user_id, &role)
            .await
            .map(|v| format!("Assigned {}; roles version is now {}", role, v)),
        Commands::RevokeRole { user_id, role } => tools
            .revoke_role(&user_id, &role)
            .await
            .map(|v| format!("Revoked {}; roles version is now {}", role, v)),
        Commands::Ban { user_id } => tools.ban(&user_id).await.map(|summary| {
            format!(
                "Banned {}; {} session(s) deleted, roles version is now {}",
                user_id, summary.sessions_deleted, summary.roles_version
            )
        }),
        Commands::RevokeSessions { user_id } => tools
            .revoke_sessions(&user_id)
            .await
            .map(|n| format!("{} session(s) deleted", n)),
    };

    match result {
        Ok(message) => {
            println!("{}", message);
            if changes_roles {
                if let Some(warning) = stale_roles_warning(&cache_config) {
                    eprintln!("{}", warning);
                }
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
