// src/main.rs
use anyhow::{anyhow, bail, Context};
use dotenv::dotenv;
use reqwest::Url;
use std::collections::HashSet;
use std::env;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use orgportal::auth::models::{SignInRequest, SignUpRequest, VerifyOtpRequest};
use orgportal::auth::{RouteGuard, RouteKind, SignInOutcome};
use orgportal::common::{AppState, ListQuery, MemoryNavigator, Navigator, PortalConfig};
use orgportal::notifications::TracingNotifier;
use orgportal::uploads::UploadKind;
use orgportal::wallet::VerificationOutcome;

const USAGE: &str = "\
Usage: orgportal <command> [args]

Account
  signup <first> <last> <email> <password> [phone]
  login <email> <password>
  verify-otp <email> <code>
  logout
  whoami

Organisation & requests
  org
  requests [page] [search] [status]
  candidates <request-id>
  upload <logo|document> <path>

Notifications
  notifications
  watch

Wallet
  wallet
  fee <amount>
  fund <email> <amount>
  verify <return-url>";

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first().map(String::as_str) else {
        println!("{}", USAGE);
        return Ok(());
    };
    if matches!(command, "help" | "--help" | "-h") {
        println!("{}", USAGE);
        return Ok(());
    }

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let config = PortalConfig::from_env();
    tokio::fs::create_dir_all(&config.data_dir)
        .await
        .with_context(|| format!("creating data dir {}", config.data_dir.display()))?;
    info!(api = %config.api_base_url, realtime = %config.realtime_url, "Portal configuration loaded");

    let navigator = Arc::new(MemoryNavigator::parse(&format!(
        "{}/dashboard",
        config.app_url
    ))?);
    let notifier = Arc::new(TracingNotifier::new(config.desktop_notifications));
    let app = AppState::load(config, navigator.clone(), notifier).await?;

    // ========================================================================
    // COMMAND DISPATCH
    // ========================================================================

    let rest = &args[1..];
    match command {
        "signup" => signup(&app, rest).await,
        "login" => login(&app, rest).await,
        "verify-otp" => verify_otp(&app, rest).await,
        "logout" => {
            app.sign_out().await?;
            println!("Signed out.");
            Ok(())
        }
        "whoami" => whoami(&app).await,
        "org" => organisation(&app).await,
        "requests" => requests(&app, rest).await,
        "candidates" => candidates(&app, rest).await,
        "upload" => upload(&app, rest).await,
        "notifications" => notifications(&app).await,
        "watch" => watch(&app).await,
        "wallet" => wallet(&app).await,
        "fee" => fee(&app, rest),
        "fund" => fund(&app, rest).await,
        "verify" => verify(&app, &navigator, rest).await,
        other => {
            println!("{}", USAGE);
            bail!("unknown command: {}", other)
        }
    }
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing argument <{}>\n\n{}", name, USAGE))
}

fn parse_amount(raw: &str) -> anyhow::Result<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .with_context(|| format!("not a number: {}", raw))
}

// ============================================================================
// ACCOUNT
// ============================================================================

async fn signup(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let request = SignUpRequest {
        first_name: arg(args, 0, "first")?.to_string(),
        last_name: arg(args, 1, "last")?.to_string(),
        email: arg(args, 2, "email")?.to_string(),
        password: arg(args, 3, "password")?.to_string(),
        phone: args.get(4).cloned(),
    };
    let email = request.email.clone();
    let response = app.auth_service.sign_up(request).await?;
    println!(
        "{}",
        response
            .message
            .unwrap_or_else(|| "Account created. Check your email for a code.".to_string())
    );
    println!("Next: orgportal verify-otp {} <code>", email);
    Ok(())
}

async fn login(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let request = SignInRequest {
        email: arg(args, 0, "email")?.to_string(),
        password: arg(args, 1, "password")?.to_string(),
    };

    match app.auth_service.sign_in(request).await? {
        SignInOutcome::Authenticated { user, .. } => {
            println!("Signed in as {} <{}>", user.display_name(), user.email);
            if !user.has_organisation() {
                println!("No organisation yet; finish onboarding in the portal.");
            }
        }
        SignInOutcome::TwoFactorRequired { email } => {
            println!("Two-factor code sent. Run: orgportal verify-otp {} <code>", email);
        }
        SignInOutcome::EmailVerificationRequired { email } => {
            println!("Email not verified. Run: orgportal verify-otp {} <code>", email);
        }
    }
    Ok(())
}

async fn verify_otp(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let request = VerifyOtpRequest {
        email: arg(args, 0, "email")?.to_string(),
        otp: arg(args, 1, "code")?.to_string(),
    };
    match app.auth_service.verify_otp(request).await? {
        Some(user) => println!("Verified. Signed in as {}", user.display_name()),
        None => println!("Verified. You can sign in now."),
    }
    Ok(())
}

async fn whoami(app: &AppState) -> anyhow::Result<()> {
    let session = app.session.snapshot().await;
    match &session.user {
        Some(user) if session.is_authenticated() => {
            println!("{} <{}>", user.display_name(), user.email);
            println!("  id:           {}", user.id);
            println!(
                "  organisation: {}",
                user.organisation_id.as_deref().unwrap_or("(none)")
            );
            println!("  two-factor:   {}", user.two_factor_enabled);
        }
        _ => println!("Not signed in."),
    }
    let decision = RouteGuard::evaluate(&session, RouteKind::Protected);
    if let Some(path) = decision.redirect_path() {
        println!("Dashboard access would redirect to {}", path);
    }
    Ok(())
}

// ============================================================================
// ORGANISATION & REQUESTS
// ============================================================================

async fn organisation(app: &AppState) -> anyhow::Result<()> {
    let org = app.organisation_service.get_info().await?;
    println!("{} ({})", org.name, org.id);
    for (label, value) in [
        ("website", &org.website),
        ("industry", &org.industry),
        ("size", &org.size),
        ("contact", &org.contact_email),
    ] {
        if let Some(value) = value {
            println!("  {:<9} {}", label, value);
        }
    }
    Ok(())
}

async fn requests(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let mut query = ListQuery::default();
    if let Some(page) = args.first() {
        query = query.page(page.parse().with_context(|| format!("bad page: {}", page))?);
    }
    if let Some(search) = args.get(1) {
        query = query.search(search.as_str());
    }
    if let Some(status) = args.get(2) {
        query = query.status(status.as_str());
    }

    let page = app.request_service.list(&query).await?;
    if page.is_empty() {
        println!("No requests found.");
        return Ok(());
    }
    for request in &page.items {
        println!(
            "{:<26} {:<12} x{:<3} {}",
            request.id,
            request.status.as_filter(),
            request.headcount,
            request.title
        );
    }
    println!("Page {} of {} ({} total)", page.page, page.total_pages, page.total);
    Ok(())
}

async fn candidates(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let request_id = arg(args, 0, "request-id")?;
    let shortlist = app.request_service.shortlisted_candidates(request_id).await?;
    if shortlist.is_empty() {
        println!("No candidates shortlisted yet.");
    }
    for candidate in shortlist {
        let score = candidate
            .match_score
            .map(|s| format!("{:.0}%", s * 100.0))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<26} {:<12?} {:>5} {}",
            candidate.id,
            candidate.status,
            score,
            candidate.display_name()
        );
    }
    Ok(())
}

async fn upload(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let kind = match arg(args, 0, "logo|document")? {
        "logo" => UploadKind::Logo,
        "document" => UploadKind::Document,
        other => bail!("unknown upload kind: {}", other),
    };
    let path = arg(args, 1, "path")?;
    let uploaded = app.upload_service.upload_path(kind, Path::new(path)).await?;
    println!("Uploaded: {}", uploaded.url);
    Ok(())
}

// ============================================================================
// NOTIFICATIONS
// ============================================================================

async fn notifications(app: &AppState) -> anyhow::Result<()> {
    app.load_notifications().await?;

    for n in app.notifications.notifications().await {
        println!(
            "{} {} [{}] {}",
            if n.read { " " } else { "*" },
            n.created_at.format("%Y-%m-%d %H:%M"),
            n.title(),
            n.message
        );
    }
    println!("Unread: {}", app.notifications.unread_count().await);
    if let Some(stats) = app.notifications.stats().await {
        println!("Server reports {} total, {} unread", stats.total, stats.unread);
    }
    Ok(())
}

async fn watch(app: &AppState) -> anyhow::Result<()> {
    if !app.session.is_authenticated().await {
        bail!("sign in first: orgportal login <email> <password>");
    }
    if let Err(e) = app.load_notifications().await {
        warn!(error = %e, "Initial notification fetch failed");
    }
    if !app.channel.permission_request() {
        info!("Desktop notifications disabled");
    }

    let mut printed: HashSet<String> = app
        .notifications
        .notifications()
        .await
        .into_iter()
        .map(|n| n.id)
        .collect();
    let mut unread = app.notifications.subscribe_unread();

    app.start_realtime().await;
    println!("Watching for notifications (Ctrl-C to stop)...");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = unread.changed() => {
                if changed.is_err() {
                    break;
                }
                let count = *unread.borrow_and_update();
                for n in app.notifications.notifications().await.into_iter().rev() {
                    if printed.insert(n.id.clone()) {
                        println!("[{}] {}", n.title(), n.message);
                    }
                }
                println!("Unread: {}", count);
            }
        }
    }

    app.channel.close().await;
    Ok(())
}

// ============================================================================
// WALLET
// ============================================================================

async fn wallet(app: &AppState) -> anyhow::Result<()> {
    app.wallet.refresh().await?;

    if let Some(wallet) = app.wallet.wallet().await {
        println!("Balance:   {} {:.2}", wallet.currency, wallet.balance);
        println!("Available: {} {:.2}", wallet.currency, wallet.available());
    }
    if let Some(page) = app.wallet.transactions().await {
        for tx in &page.items {
            println!(
                "{} {:<8?} {:>12.2} {:?} {}",
                tx.created_at.format("%Y-%m-%d"),
                tx.transaction_type,
                tx.amount,
                tx.status,
                tx.reference.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}

fn fee(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let amount = parse_amount(arg(args, 0, "amount")?)?;
    let breakdown = app.wallet.fee_preview(amount);
    println!("Amount:   {:.2}", breakdown.amount);
    println!("Charge:   {:.2}", breakdown.charge);
    println!("Credited: {:.2}", breakdown.net);
    if !app.wallet.can_submit(amount) {
        println!("(below the minimum funding amount)");
    }
    Ok(())
}

async fn fund(app: &AppState, args: &[String]) -> anyhow::Result<()> {
    let email = arg(args, 0, "email")?;
    let amount = parse_amount(arg(args, 1, "amount")?)?;
    let url = app.wallet.initiate_funding(email, amount).await?;
    println!("Complete the payment at:\n  {}", url);
    println!("Then run: orgportal verify <the URL you are sent back to>");
    Ok(())
}

async fn verify(
    app: &AppState,
    navigator: &MemoryNavigator,
    args: &[String],
) -> anyhow::Result<()> {
    let raw = arg(args, 0, "return-url")?;
    let url = Url::parse(raw).with_context(|| format!("not a URL: {}", raw))?;
    navigator.replace_url(url);

    match app.wallet.on_location().await {
        Some(VerificationOutcome::Verified { reference }) => {
            println!("Payment {} verified.", reference);
            if let Some(wallet) = app.wallet.wallet().await {
                println!("New balance: {} {:.2}", wallet.currency, wallet.balance);
            }
        }
        Some(VerificationOutcome::Failed { reference, message }) => {
            bail!("payment {} could not be verified: {}", reference, message)
        }
        None => println!("No payment reference in that URL."),
    }
    Ok(())
}
