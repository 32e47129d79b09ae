//! Command-line surface and dispatch.
//!
//! Commands map onto the hosted client's routes: the customer upload flow
//! is public, the owner dashboard surfaces are guarded, and the login
//! surface is anonymous-only. The auth controller's startup validation
//! resolves before the guard makes its first decision.

mod render;

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use dialoguer::{Confirm, Input, Password};

use crate::api::types::{DocumentStatus, Registration, ShopRecord, UserIdentity};
use crate::api::{ApiClient, ProgressFn, UploadRequest};
use crate::auth::AuthController;
use crate::config::Config;
use crate::dashboard::{self, DocumentBoard};
use crate::preview::Preview;
use crate::routes::{self, GuardDecision, Route};
use crate::session::SessionStore;
use crate::util::{self, format_file_size, DocumentKind, MAX_UPLOAD_BYTES};

use render::Ui;

#[derive(Parser)]
#[command(
    name = "dropdesk",
    version,
    about = "Document drop-off for print shops: customers upload, owners manage the queue."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// Backend URL override for this invocation.
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in as a shop owner
    Login {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Create a shop owner account
    Register,
    /// Sign out (clears the local session)
    Logout,
    /// Show the signed-in identity
    Whoami,
    /// Look up a shop by code or pasted upload link
    Shop {
        /// Shop code, or a full upload link to extract it from
        target: String,
    },
    /// Drop off a document at a shop
    Upload {
        file: PathBuf,
        /// Shop code or upload link
        #[arg(long)]
        shop: String,
        /// Customer name (prompted when omitted)
        #[arg(long)]
        name: Option<String>,
        /// Document purpose, e.g. "Job Application" (prompted when omitted)
        #[arg(long)]
        purpose: Option<String>,
        /// Preview the document locally before uploading (PDF only)
        #[arg(long)]
        preview: bool,
    },
    /// Owner dashboard: statistics plus the incoming queue
    Dashboard,
    /// List or search incoming documents
    Documents {
        /// Keyword matched against customer and file names
        #[arg(long)]
        query: Option<String>,
        /// Restrict to one status; omit for all
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
    },
    /// Show a single document
    Show { id: String },
    /// Toggle a document between pending and printed
    Status {
        id: String,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Delete a document
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Fetch a download link for a document
    Download { id: String },
    /// Shop statistics
    Stats,
    /// Show or change the light/dark preference
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StatusFilter {
    Pending,
    Completed,
}

impl StatusFilter {
    fn to_status(self) -> DocumentStatus {
        match self {
            Self::Pending => DocumentStatus::Pending,
            Self::Completed => DocumentStatus::Completed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

pub async fn run() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "dropdesk", &mut std::io::stdout());
        return Ok(());
    }

    let dir = Config::dir()?;
    let mut config = Config::load(&dir)?;
    let ui = Ui::new(config.effective_theme());

    // Theme is purely local state; it needs neither network nor session.
    if let Some(Command::Theme { action }) = &cli.command {
        return set_theme(&ui, &mut config, &dir, *action);
    }

    let base_url = cli.api_url.clone().unwrap_or_else(|| config.api_url());
    let store = SessionStore::new(&dir);
    let api = ApiClient::new(base_url, store.clone())?;
    let auth = AuthController::new(store);

    // Must resolve before the guard's first decision.
    auth.initialize(&api).await;

    let route = route_for(cli.command.as_ref());
    match routes::evaluate(&route, auth.loading(), auth.is_authenticated()) {
        GuardDecision::Wait => {
            // Unreachable once initialize has resolved; kept as the blocking
            // indicator the guard contract requires.
            ui.note("Checking authentication...");
            return Ok(());
        }
        GuardDecision::RedirectToLogin { from } => {
            bail!(
                "You need to sign in first. Run `dropdesk login`, then retry {}",
                from.path()
            );
        }
        GuardDecision::RedirectToDashboard => {
            ui.note("Already signed in; opening the dashboard.");
            return show_dashboard(&ui, &api, &auth).await;
        }
        GuardDecision::Allow => {}
    }

    match cli.command {
        None => {
            landing(&ui, &auth);
            Ok(())
        }
        Some(Command::Login { email, password }) => login(&ui, &api, &auth, email, password).await,
        Some(Command::Register) => register(&ui, &api, &auth).await,
        Some(Command::Logout) => {
            auth.logout();
            ui.success("Signed out.");
            Ok(())
        }
        Some(Command::Whoami) => whoami(&ui, &api, &auth).await,
        Some(Command::Shop { target }) => shop(&ui, &api, &target).await,
        Some(Command::Upload {
            file,
            shop,
            name,
            purpose,
            preview,
        }) => upload(&ui, &api, &file, &shop, name, purpose, preview).await,
        Some(Command::Dashboard) => show_dashboard(&ui, &api, &auth).await,
        Some(Command::Documents { query, status }) => {
            documents(&ui, &api, &auth, query, status).await
        }
        Some(Command::Show { id }) => {
            let doc = api.document(&id).await?;
            ui.document_card(&doc);
            Ok(())
        }
        Some(Command::Status { id, notes }) => toggle_status(&ui, &api, &auth, &id, notes).await,
        Some(Command::Delete { id, yes }) => delete(&ui, &api, &id, yes).await,
        Some(Command::Download { id }) => {
            let ticket = api.download_document(&id).await?;
            ui.success("Download link ready:");
            println!("{}", ticket.download_url);
            Ok(())
        }
        Some(Command::Stats) => {
            let user = signed_in(&auth)?;
            let stats = api.dashboard_stats(&user.shop_id).await?;
            ui.stats(&stats);
            Ok(())
        }
        Some(Command::Theme { .. }) | Some(Command::Completions { .. }) => unreachable!(),
    }
}

/// Which route a command navigates to, for the guard.
fn route_for(command: Option<&Command>) -> Route {
    match command {
        None | Some(Command::Theme { .. }) | Some(Command::Completions { .. }) => Route::Landing,
        // Logout works from any state, authenticated or not.
        Some(Command::Logout) => Route::Landing,
        Some(Command::Login { .. }) | Some(Command::Register) => Route::Login,
        Some(Command::Shop { target }) | Some(Command::Upload { shop: target, .. }) => {
            match shop_code_from(target) {
                Ok(code) => Route::Shop(code),
                Err(_) => Route::Landing,
            }
        }
        Some(
            Command::Whoami
            | Command::Dashboard
            | Command::Documents { .. }
            | Command::Show { .. }
            | Command::Status { .. }
            | Command::Delete { .. }
            | Command::Download { .. }
            | Command::Stats,
        ) => Route::Dashboard,
    }
}

/// Accept a bare shop code or a pasted upload link.
fn shop_code_from(target: &str) -> Result<String> {
    if target.contains('/') {
        match Route::parse(target) {
            Route::Shop(code) => Ok(code),
            _ => bail!("'{target}' is not a shop upload link"),
        }
    } else if target.is_empty() {
        bail!("shop code is empty")
    } else {
        Ok(target.to_string())
    }
}

fn signed_in(auth: &AuthController) -> Result<UserIdentity> {
    auth.identity().context("not signed in")
}

fn landing(ui: &Ui, auth: &AuthController) {
    ui.heading("DropDesk");
    println!("Seamless document sharing between customers and print shops.");
    println!();
    println!("  dropdesk shop <code>          Find a shop and its upload link");
    println!("  dropdesk upload <file>        Drop off a document");
    println!("  dropdesk login                Shop owner sign-in");
    println!("  dropdesk dashboard            Incoming documents and stats");
    println!();
    match auth.identity() {
        Some(user) if auth.is_authenticated() => {
            ui.note(&format!("Signed in as {}.", user.email));
        }
        _ => ui.note("Not signed in."),
    }
}

// ── Auth commands ────────────────────────────────────────────────

async fn login(
    ui: &Ui,
    api: &ApiClient,
    auth: &AuthController,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let email = match email {
        Some(email) => email,
        None => {
            ui.note("Demo credentials: admin@xeroxshop.com / password");
            Input::new().with_prompt("Email").interact_text()?
        }
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };

    let mut problems: Vec<(&str, &str)> = Vec::new();
    if !util::is_valid_email(&email) {
        problems.push(("email", "Please enter a valid email address"));
    }
    if !util::is_valid_password(&password) {
        problems.push(("password", "Password must be at least 6 characters"));
    }
    if !problems.is_empty() {
        for (field, message) in &problems {
            ui.field_error(field, message);
        }
        bail!("Fix the highlighted fields and try again");
    }

    let user = auth.login(api, &email, &password).await?;
    ui.success("Login successful!");
    ui.note(&format!(
        "Signed in as {}. Run `dropdesk dashboard` to continue.",
        user.email
    ));
    Ok(())
}

async fn register(ui: &Ui, api: &ApiClient, auth: &AuthController) -> Result<()> {
    let name: String = Input::new().with_prompt("Your name").interact_text()?;
    let shop_name: String = Input::new().with_prompt("Shop name").interact_text()?;
    let email: String = Input::new().with_prompt("Email").interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let mut problems: Vec<(&str, &str)> = Vec::new();
    if name.trim().is_empty() {
        problems.push(("name", "Name is required"));
    }
    if shop_name.trim().is_empty() {
        problems.push(("shop name", "Shop name is required"));
    }
    if !util::is_valid_email(&email) {
        problems.push(("email", "Please enter a valid email address"));
    }
    if !util::is_valid_password(&password) {
        problems.push(("password", "Password must be at least 6 characters"));
    }
    if !problems.is_empty() {
        for (field, message) in &problems {
            ui.field_error(field, message);
        }
        bail!("Fix the highlighted fields and try again");
    }

    let registration = Registration {
        name,
        email,
        password,
        shop_name,
    };
    let user = auth.register(api, &registration).await?;
    ui.success("Account created!");
    ui.note(&format!(
        "Signed in as {}. Run `dropdesk dashboard` to continue.",
        user.email
    ));
    Ok(())
}

async fn whoami(ui: &Ui, api: &ApiClient, auth: &AuthController) -> Result<()> {
    let user = signed_in(auth)?;
    if let Some(name) = &user.name {
        println!("{name}");
    }
    println!("{}", user.email);
    let shop = api.shop(&user.shop_id).await?;
    ui.note(&format!("Shop: {} (code {})", shop.name, shop.shop_code));
    Ok(())
}

// ── Customer commands ────────────────────────────────────────────

async fn shop(ui: &Ui, api: &ApiClient, target: &str) -> Result<()> {
    let code = shop_code_from(target)?;
    let shop = api.shop_by_code(&code).await?;
    ui.shop_card(&shop);
    ui.note(&format!(
        "Customers drop off with: dropdesk upload <file> --shop {}",
        shop.shop_code
    ));
    Ok(())
}

async fn upload(
    ui: &Ui,
    api: &ApiClient,
    file: &Path,
    shop_target: &str,
    name: Option<String>,
    purpose: Option<String>,
    preview: bool,
) -> Result<()> {
    let code = shop_code_from(shop_target)?;
    let interactive = name.is_none() || purpose.is_none();
    let customer_name = match name {
        Some(name) => name,
        None => Input::new().with_prompt("Your name").interact_text()?,
    };
    let purpose = match purpose {
        Some(purpose) => purpose,
        None => Input::new()
            .with_prompt("Document purpose (e.g., Job Application)")
            .interact_text()?,
    };

    // Pre-flight validation; nothing reaches the backend until this passes.
    let problems = validate_upload(file, &customer_name, &purpose);
    if !problems.is_empty() {
        for (field, message) in &problems {
            ui.field_error(field, message);
        }
        bail!("Fix the highlighted fields and try again");
    }

    let shop = api.shop_by_code(&code).await?;
    send_document(ui, api, file, &customer_name, &purpose, &shop, preview).await?;

    // Interactive sessions can keep dropping off files for the same shop.
    while interactive {
        if !Confirm::new()
            .with_prompt("Upload another document?")
            .default(false)
            .interact()?
        {
            break;
        }
        let next: String = Input::new().with_prompt("File to upload").interact_text()?;
        let next = PathBuf::from(next);
        let problems = validate_upload(&next, &customer_name, &purpose);
        if !problems.is_empty() {
            for (field, message) in &problems {
                ui.field_error(field, message);
            }
            continue;
        }
        send_document(ui, api, &next, &customer_name, &purpose, &shop, preview).await?;
    }
    Ok(())
}

async fn send_document(
    ui: &Ui,
    api: &ApiClient,
    file: &Path,
    customer_name: &str,
    purpose: &str,
    shop: &ShopRecord,
    preview: bool,
) -> Result<()> {
    if preview {
        match Preview::stage(file) {
            Ok(staged) => {
                ui.note(&staged.describe());
                ui.note(&format!("Preview copy: {}", staged.path().display()));
                ui.note("Ensure document content is correct before uploading.");
                if !Confirm::new()
                    .with_prompt("Upload this document?")
                    .default(true)
                    .interact()?
                {
                    ui.note("Upload cancelled.");
                    return Ok(());
                }
                // The staged copy is released here, before the upload starts.
            }
            Err(e) => ui.note(&e.to_string()),
        }
    }

    let report: ProgressFn = Arc::new(|pct| {
        eprint!("\rUploading... {pct:>3}%");
        let _ = std::io::stderr().flush();
    });
    let outcome = api
        .upload_document(
            UploadRequest {
                file,
                customer_name,
                purpose,
                shop_id: &shop.id,
            },
            Some(report),
        )
        .await;
    // End the progress line on success and failure alike, so the terminal
    // is back in a stable state before anything else prints.
    eprintln!();
    let receipt = outcome?;

    ui.success(&format!(
        "Your documents are safely shared with {}.",
        shop.name
    ));
    if let Some(message) = receipt.message {
        ui.note(&message);
    }
    Ok(())
}

/// Per-field upload validation, mirrored from the upload form.
fn validate_upload(
    file: &Path,
    customer_name: &str,
    purpose: &str,
) -> Vec<(&'static str, String)> {
    let mut problems = Vec::new();
    if customer_name.trim().is_empty() {
        problems.push(("name", "Customer name is required".to_string()));
    }
    if purpose.trim().is_empty() {
        problems.push(("purpose", "Document purpose is required".to_string()));
    }
    match std::fs::metadata(file) {
        Err(_) => problems.push(("file", "Please select a file to upload".to_string())),
        Ok(metadata) => {
            if DocumentKind::from_path(file).is_none() {
                problems.push(("file", "Please upload only PDF or DOC files".to_string()));
            } else if metadata.len() > MAX_UPLOAD_BYTES {
                problems.push((
                    "file",
                    format!(
                        "File exceeds the {} limit",
                        format_file_size(MAX_UPLOAD_BYTES)
                    ),
                ));
            }
        }
    }
    problems
}

// ── Owner commands ───────────────────────────────────────────────

async fn show_dashboard(ui: &Ui, api: &ApiClient, auth: &AuthController) -> Result<()> {
    let user = signed_in(auth)?;
    let data = dashboard::load(api, &user.shop_id).await?;
    ui.stats(&data.stats);
    println!();
    ui.document_groups(&data.board.grouped_by_day());
    Ok(())
}

async fn documents(
    ui: &Ui,
    api: &ApiClient,
    auth: &AuthController,
    query: Option<String>,
    status: Option<StatusFilter>,
) -> Result<()> {
    let user = signed_in(auth)?;
    let mut board = DocumentBoard::new(api.documents(&user.shop_id).await?);
    if query.is_some() || status.is_some() {
        let matches = api
            .search_documents(
                &user.shop_id,
                query.as_deref(),
                status.map(StatusFilter::to_status),
            )
            .await?;
        board.replace(matches);
    }
    ui.document_groups(&board.grouped_by_day());
    Ok(())
}

async fn toggle_status(
    ui: &Ui,
    api: &ApiClient,
    auth: &AuthController,
    document_id: &str,
    notes: Option<String>,
) -> Result<()> {
    let user = signed_in(auth)?;
    let mut board = DocumentBoard::new(api.documents(&user.shop_id).await?);
    let ended = board.toggle_status(api, document_id, notes).await?;
    ui.success("Status updated successfully");
    ui.note(&format!("{document_id} is now {}", ended.label()));
    Ok(())
}

async fn delete(ui: &Ui, api: &ApiClient, document_id: &str, yes: bool) -> Result<()> {
    if !yes
        && !Confirm::new()
            .with_prompt(format!("Delete document {document_id}?"))
            .default(false)
            .interact()?
    {
        ui.note("Cancelled.");
        return Ok(());
    }
    api.delete_document(document_id).await?;
    ui.success("Document deleted");
    Ok(())
}

// ── Theme ────────────────────────────────────────────────────────

fn set_theme(
    ui: &Ui,
    config: &mut Config,
    dir: &Path,
    action: Option<ThemeAction>,
) -> Result<()> {
    match action {
        None => {
            match config.theme {
                Some(theme) => println!("{theme} (saved)"),
                None => println!("{} (system default)", config.effective_theme()),
            }
            Ok(())
        }
        Some(action) => {
            let next = match action {
                ThemeAction::Light => crate::theme::Theme::Light,
                ThemeAction::Dark => crate::theme::Theme::Dark,
                ThemeAction::Toggle => config.effective_theme().toggled(),
            };
            config.theme = Some(next);
            config.save(dir)?;
            ui.success(&format!("Theme set to {next}."));
            Ok(())
        }
    }
}
