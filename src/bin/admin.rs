//! CLI administration tool for dynlink.
//!
//! Covers the management flows that have no HTTP surface: users, API
//! tokens, custom domains, mobile apps, projects and per-link maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Register a user known to the identity provider
//! cargo run --bin admin -- user create --id user_2abc --email dev@example.com
//!
//! # Issue an API key for the Public Ingestion API
//! cargo run --bin admin -- token create --user user_2abc --name "CI"
//!
//! # Create a project on foo.<root> and bind an Android app to it
//! cargo run --bin admin -- project create --user user_2abc --name Foo --subdomain foo
//! cargo run --bin admin -- app android --user user_2abc --package com.foo.app \
//!     --fingerprint AA:BB:... --store-link https://play.google.com/store/apps/details?id=com.foo.app \
//!     --project 1
//!
//! # Point a link somewhere else and refresh its preview
//! cargo run --bin admin -- link update --user user_2abc 42 --url https://example.com/new
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`), `ROOT_DOMAIN`,
//! `TOKEN_SIGNING_SECRET` and friends. See [`dynlink::config`].

use dynlink::config::{self, Config};
use dynlink::domain::entities::{
    DnsChallenge, LinkMetadata, NewAndroidApp, NewIosApp, NewUser, ProjectIdentity,
};
use dynlink::domain::repositories::{TokenRepository, UserRepository};
use dynlink::infrastructure::metadata::NullMetadataFetcher;
use dynlink::infrastructure::persistence::{PgTokenRepository, PgUserRepository};
use dynlink::server::{connect_pool, metadata_fetcher};
use dynlink::state::AppState;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::*;
use dialoguer::{Confirm, Input};
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing dynlink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage API tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Manage custom domains
    Domain {
        #[command(subcommand)]
        action: DomainAction,
    },

    /// Register mobile apps
    App {
        #[command(subcommand)]
        action: AppAction,
    },

    /// Manage projects
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Maintain individual links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show statistics
    Stats,

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Register a user id issued by the identity provider
    Create {
        #[arg(long)]
        id: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        name: Option<String>,
    },
}

/// Token management subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Create a new API token
    Create {
        /// Owning user id
        #[arg(short, long)]
        user: String,

        /// Token name (e.g., "Production API", "CI")
        #[arg(short, long)]
        name: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List all tokens
    List,

    /// Delete a token by id
    Delete { id: i64 },
}

#[derive(Subcommand)]
enum DomainAction {
    /// Register a custom domain (Pro users only)
    Add {
        #[arg(short, long)]
        user: String,

        domain: String,
    },

    /// Record the verification state reported by the domain authority
    Verify {
        domain: String,

        /// Mark the domain as not (yet) verified
        #[arg(long)]
        unverified: bool,

        /// Outstanding challenges as a JSON array of `{type, domain, value, reason?}`
        #[arg(long)]
        challenges: Option<String>,
    },

    /// List a user's custom domains
    List {
        #[arg(short, long)]
        user: String,
    },

    /// Release a custom domain no project uses any more
    Remove {
        #[arg(short, long)]
        user: String,

        domain: String,

        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AppAction {
    /// Register an Android app
    Android {
        #[arg(short, long)]
        user: String,

        #[arg(long)]
        package: String,

        /// SHA-256 signing certificate fingerprint, repeatable
        #[arg(long = "fingerprint", required = true)]
        fingerprints: Vec<String>,

        #[arg(long)]
        store_link: String,

        /// Bind to this project
        #[arg(long)]
        project: Option<i64>,
    },

    /// Register an iOS app
    Ios {
        #[arg(short, long)]
        user: String,

        #[arg(long)]
        bundle: String,

        #[arg(long)]
        team: String,

        #[arg(long)]
        store_link: String,

        /// Bind to this project
        #[arg(long)]
        project: Option<i64>,
    },

    /// Move an app to another project, or unbind it when --project is omitted
    Bind {
        #[arg(short, long)]
        user: String,

        #[arg(long, value_enum)]
        platform: Platform,

        /// App id
        id: i64,

        #[arg(long)]
        project: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Platform {
    Android,
    Ios,
}

#[derive(Subcommand)]
enum ProjectAction {
    /// Create a project on a subdomain or a custom domain
    Create {
        #[arg(short, long)]
        user: String,

        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(long, conflicts_with = "custom_domain", required_unless_present = "custom_domain")]
        subdomain: Option<String>,

        #[arg(long)]
        custom_domain: Option<String>,
    },

    /// Delete a project and all of its links
    Delete {
        #[arg(short, long)]
        user: String,

        id: i64,

        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List a user's projects
    List {
        #[arg(short, long)]
        user: String,
    },
}

#[derive(Subcommand)]
enum LinkAction {
    /// List a user's links with click counters
    List {
        #[arg(short, long)]
        user: String,
    },

    /// Change a link's destination
    ///
    /// The new page's preview is fetched unless a title, description or
    /// image is given.
    Update {
        #[arg(short, long)]
        user: String,

        id: i64,

        #[arg(long)]
        url: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },

    /// Delete a link
    Delete {
        #[arg(short, long)]
        user: String,

        id: i64,
    },

    /// Replace a link's social preview metadata
    Meta {
        #[arg(short, long)]
        user: String,

        id: i64,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        image: Option<String>,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env()?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &pool).await?,
        Commands::Token { action } => handle_token_action(action, &pool, &config).await?,
        Commands::Domain { action } => handle_domain_action(action, &state(&pool, &config)).await?,
        Commands::App { action } => handle_app_action(action, &state(&pool, &config)).await?,
        Commands::Project { action } => {
            handle_project_action(action, &state(&pool, &config)).await?
        }
        Commands::Link { action } => {
            let state = AppState::new(Arc::new(pool.clone()), &config, metadata_fetcher(&config));
            handle_link_action(action, &state).await?
        }
        Commands::Stats => handle_stats(&pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Services wired the same way as the server, minus metadata fetching.
fn state(pool: &PgPool, config: &Config) -> AppState {
    AppState::new(
        Arc::new(pool.clone()),
        config,
        Arc::new(NullMetadataFetcher::new()),
    )
}

async fn handle_user_action(action: UserAction, pool: &PgPool) -> Result<()> {
    let repo = PgUserRepository::new(Arc::new(pool.clone()));

    match action {
        UserAction::Create { id, email, name } => {
            let user = repo
                .create(NewUser { id, email, name })
                .await
                .context("Failed to create user")?;

            println!("{}", "✅ User created".green().bold());
            println!("  ID: {}", user.id.cyan());
        }
    }

    Ok(())
}

/// Dispatches token management commands.
async fn handle_token_action(action: TokenAction, pool: &PgPool, config: &Config) -> Result<()> {
    match action {
        TokenAction::Create { user, name, yes } => create_token(pool, config, user, name, yes).await,
        TokenAction::List => {
            list_tokens(Arc::new(PgTokenRepository::new(Arc::new(pool.clone())))).await
        }
        TokenAction::Delete { id } => {
            let repo = PgTokenRepository::new(Arc::new(pool.clone()));

            let confirmed = Confirm::new()
                .with_prompt(format!("Delete token {id}?"))
                .default(false)
                .interact()?;

            if !confirmed {
                println!("{}", "❌ Cancelled".red());
                return Ok(());
            }

            if repo.delete(id).await? {
                println!("{}", "✅ Token deleted".green().bold());
            } else {
                println!("{}", "⚠️  Token not found".yellow());
            }
            Ok(())
        }
    }
}

/// Issues a new API token with interactive prompts.
///
/// # Security
///
/// - Only the keyed hash and the first four characters are stored
/// - The plaintext is displayed once and cannot be retrieved later
async fn create_token(
    pool: &PgPool,
    config: &Config,
    user_id: String,
    name: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "🔑 Create API Token".bright_blue().bold());
    println!();

    let token_name = match name {
        Some(n) => n,
        None => Input::new()
            .with_prompt("Token name")
            .with_initial_text("Production API")
            .interact_text()?,
    };

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt(format!("Create token \"{token_name}\" for {user_id}?"))
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let state = state(pool, config);
    let (token, plaintext) = state.auth_service.issue_token(&user_id, &token_name).await?;

    println!();
    println!("{}", "✅ Token created successfully!".green().bold());
    println!();
    println!("  ID:    {}", token.id.to_string().bright_black());
    println!("  Name:  {}", token.name.cyan());
    println!("  Token: {}", plaintext.bright_yellow().bold());
    println!();
    println!(
        "{}",
        "⚠️  IMPORTANT: Save this token now! You won't be able to see it again."
            .red()
            .bold()
    );
    println!();
    println!("{}", "Example:".bright_white());
    println!(
        "  curl -H \"x-api-key: {}\" \"https://api.{}/api/v1/links?domain=...&alias=...\"",
        plaintext.bright_yellow(),
        config.root_domain
    );
    println!();

    Ok(())
}

/// Lists all API tokens.
///
/// # Output Format
///
/// ```text
/// 📋 API Tokens
///
///   ID  User                 Name                     Key      Last used
///   ───────────────────────────────────────────────────────────────────────────
///   1   user_2abc            Production API           Ab3x…    2026-01-15 10:30
/// ```
async fn list_tokens(repo: Arc<PgTokenRepository>) -> Result<()> {
    println!("{}", "📋 API Tokens".bright_blue().bold());
    println!();

    let tokens = repo.list().await.context("Failed to list tokens")?;

    if tokens.is_empty() {
        println!("{}", "  No tokens found".yellow());
        println!();
        println!(
            "  Create one with: {} admin token create --user <id>",
            "cargo run --bin".bright_cyan()
        );
        return Ok(());
    }

    println!(
        "  {:<3} {:<20} {:<24} {:<8} {}",
        "ID".bright_white().bold(),
        "User".bright_white().bold(),
        "Name".bright_white().bold(),
        "Key".bright_white().bold(),
        "Last used".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for token in &tokens {
        let last_used = token
            .last_used_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "  {:<3} {:<20} {:<24} {:<8} {}",
            token.id.to_string().bright_black(),
            token.user_id,
            token.name.cyan(),
            format!("{}…", token.first_four_chars),
            last_used.bright_black()
        );
    }

    println!();
    println!(
        "  Total: {}",
        tokens.len().to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

async fn handle_domain_action(action: DomainAction, state: &AppState) -> Result<()> {
    match action {
        DomainAction::Add { user, domain } => {
            let domain = state.domain_service.add_custom_domain(&user, &domain).await?;

            println!("{}", "✅ Domain registered".green().bold());
            println!("  Domain: {}", domain.domain.cyan());
            println!();
            println!("{}", "Create this DNS record:".bright_white());
            print_challenges(&domain.challenges);
        }
        DomainAction::Verify {
            domain,
            unverified,
            challenges,
        } => {
            let challenges: Vec<DnsChallenge> = match challenges {
                Some(raw) => serde_json::from_str(&raw).context("Invalid challenges JSON")?,
                None => Vec::new(),
            };

            let domain = state
                .domain_service
                .record_verification(&domain, !unverified, challenges)
                .await?;

            if domain.verified {
                println!("{} {}", "✅ Verified:".green().bold(), domain.domain.cyan());
            } else {
                println!("{} {}", "⏳ Pending:".yellow().bold(), domain.domain.cyan());
                print_challenges(&domain.challenges);
            }
        }
        DomainAction::List { user } => {
            let domains = state.domain_service.list_domains(&user).await?;

            if domains.is_empty() {
                println!("{}", "  No custom domains".yellow());
            }
            for domain in &domains {
                let status = if domain.verified {
                    "VERIFIED".green()
                } else {
                    "PENDING".yellow()
                };
                println!("  {:<40} {}", domain.domain.cyan(), status);
            }
        }
        DomainAction::Remove { user, domain, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Remove custom domain {domain}?"))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            state.domain_service.remove_custom_domain(&user, &domain).await?;
            println!("{}", "✅ Domain removed".green().bold());
        }
    }

    Ok(())
}

fn print_challenges(challenges: &[DnsChallenge]) {
    for c in challenges {
        println!(
            "  {:<6} {:<30} {}",
            c.record_type.bright_white(),
            c.domain,
            c.value.bright_yellow()
        );
        if let Some(reason) = &c.reason {
            println!("         {}", reason.bright_black());
        }
    }
}

async fn handle_app_action(action: AppAction, state: &AppState) -> Result<()> {
    match action {
        AppAction::Android {
            user,
            package,
            fingerprints,
            store_link,
            project,
        } => {
            let app = state
                .project_service
                .register_android_app(
                    NewAndroidApp {
                        user_id: user,
                        package_name: package,
                        sha256_cert_fingerprints: fingerprints,
                        store_link,
                    },
                    project,
                )
                .await?;

            println!("{}", "✅ Android app registered".green().bold());
            println!("  ID:      {}", app.id.to_string().bright_black());
            println!("  Package: {}", app.package_name.cyan());
            print_binding(app.project_id);
        }
        AppAction::Ios {
            user,
            bundle,
            team,
            store_link,
            project,
        } => {
            let app = state
                .project_service
                .register_ios_app(
                    NewIosApp {
                        user_id: user,
                        bundle_id: bundle,
                        team_id: team,
                        store_link,
                    },
                    project,
                )
                .await?;

            println!("{}", "✅ iOS app registered".green().bold());
            println!("  ID:     {}", app.id.to_string().bright_black());
            println!("  App ID: {}", app.app_id().cyan());
            print_binding(app.project_id);
        }
        AppAction::Bind {
            user,
            platform,
            id,
            project,
        } => {
            let project_id = match platform {
                Platform::Android => {
                    state
                        .project_service
                        .bind_android_app(&user, id, project)
                        .await?
                        .project_id
                }
                Platform::Ios => {
                    state
                        .project_service
                        .bind_ios_app(&user, id, project)
                        .await?
                        .project_id
                }
            };

            println!("{}", "✅ App binding updated".green().bold());
            print_binding(project_id);
        }
    }

    Ok(())
}

fn print_binding(project_id: Option<i64>) {
    match project_id {
        Some(id) => println!("  Project: {}", id.to_string().bright_white()),
        None => println!("  Project: {}", "unbound".bright_black()),
    }
}

async fn handle_project_action(action: ProjectAction, state: &AppState) -> Result<()> {
    match action {
        ProjectAction::Create {
            user,
            name,
            description,
            subdomain,
            custom_domain,
        } => {
            let identity = match (subdomain, custom_domain) {
                (Some(label), _) => ProjectIdentity::Subdomain(label),
                (None, Some(domain)) => ProjectIdentity::CustomDomain(domain),
                (None, None) => anyhow::bail!("Either --subdomain or --custom-domain is required"),
            };

            let project = state
                .project_service
                .create_project(&user, &name, description, identity)
                .await?;

            println!("{}", "✅ Project created".green().bold());
            println!("  ID:   {}", project.id.to_string().bright_black());
            println!("  Name: {}", project.name.cyan());
        }
        ProjectAction::Delete { user, id, yes } => {
            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete project {id} and all of its links?"))
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            state.project_service.delete_project(&user, id).await?;
            println!("{}", "✅ Project deleted".green().bold());
        }
        ProjectAction::List { user } => {
            let projects = state.project_service.list_projects(&user).await?;

            if projects.is_empty() {
                println!("{}", "  No projects".yellow());
            }
            for project in &projects {
                let identity = match &project.identity {
                    ProjectIdentity::Subdomain(label) => format!("{label} (subdomain)"),
                    ProjectIdentity::CustomDomain(domain) => domain.clone(),
                };
                println!(
                    "  {:<4} {:<30} {}",
                    project.id.to_string().bright_black(),
                    project.name.cyan(),
                    identity
                );
            }
        }
    }

    Ok(())
}

async fn handle_link_action(action: LinkAction, state: &AppState) -> Result<()> {
    match action {
        LinkAction::List { user } => {
            let links = state.link_service.list_links(&user).await?;

            if links.is_empty() {
                println!("{}", "  No links".yellow());
                return Ok(());
            }

            println!(
                "  {:<6} {:<36} {:>7} {:>7} {:>7} {:>7}  {}",
                "ID".bright_white().bold(),
                "Short URL".bright_white().bold(),
                "Clicks".bright_white().bold(),
                "iOS".bright_white().bold(),
                "Android".bright_white().bold(),
                "Web".bright_white().bold(),
                "Destination".bright_white().bold()
            );
            println!("  {}", "─".repeat(100).bright_black());

            for link in &links {
                println!(
                    "  {:<6} {:<36} {:>7} {:>7} {:>7} {:>7}  {}",
                    link.id.to_string().bright_black(),
                    link.short_url().cyan(),
                    link.counters.clicks,
                    link.counters.app_store_redirects,
                    link.counters.play_store_redirects,
                    link.counters.general_redirects,
                    link.long_url
                );
            }

            println!();
            println!("  Total: {}", links.len().to_string().bright_white().bold());
        }
        LinkAction::Update {
            user,
            id,
            url,
            title,
            description,
            image,
        } => {
            let metadata = LinkMetadata {
                title,
                description,
                image,
            };
            let metadata = (!metadata.is_empty()).then_some(metadata);

            let link = state
                .link_service
                .update_link(&user, id, &url, metadata)
                .await?;

            println!("{}", "✅ Link updated".green().bold());
            println!("  Link:  {}", link.short_url().cyan());
            println!("  URL:   {}", link.long_url);
            if let Some(title) = &link.metadata.title {
                println!("  Title: {}", title.bright_white());
            }
        }
        LinkAction::Delete { user, id } => {
            state.link_service.delete_link(&user, id).await?;
            println!("{}", "✅ Link deleted".green().bold());
        }
        LinkAction::Meta {
            user,
            id,
            title,
            description,
            image,
        } => {
            let link = state
                .link_service
                .set_metadata(
                    &user,
                    id,
                    LinkMetadata {
                        title,
                        description,
                        image,
                    },
                )
                .await?;

            println!("{}", "✅ Metadata updated".green().bold());
            println!("  Link:  {}", link.short_url().cyan());
        }
    }

    Ok(())
}

/// Displays system statistics.
///
/// Shows link totals, click totals per channel and token/user counts.
async fn handle_stats(pool: &PgPool) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let (links, clicks, app_store, play_store, general): (i64, i64, i64, i64, i64) =
        sqlx::query_as(
            r#"
            SELECT COUNT(*),
                   COALESCE(SUM(clicks), 0)::BIGINT,
                   COALESCE(SUM(app_store_redirects), 0)::BIGINT,
                   COALESCE(SUM(play_store_redirects), 0)::BIGINT,
                   COALESCE(SUM(general_redirects), 0)::BIGINT
            FROM links
            "#,
        )
        .fetch_one(pool)
        .await?;

    let users_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let tokens_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_tokens")
        .fetch_one(pool)
        .await?;

    println!("  Users:         {}", users_count.to_string().bright_green().bold());
    println!("  Links:         {}", links.to_string().bright_green().bold());
    println!("  Clicks:        {}", clicks.to_string().bright_green().bold());
    println!("    App Store:   {}", app_store.to_string().bright_white());
    println!("    Play Store:  {}", play_store.to_string().bright_white());
    println!("    Web:         {}", general.to_string().bright_white());
    println!("  API tokens:    {}", tokens_count.to_string().bright_green().bold());
    println!();

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
