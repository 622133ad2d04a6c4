use std::io::{self, Write};

use anyhow::{Context, Result};
use frontdesk_core::api::resources::{HOTELS, RESERVATIONS, RESERVATION_STATUSES, ROOMS};
use frontdesk_core::auth::token;
use frontdesk_core::routes::{self, View};
use frontdesk_core::{Access, AppContext, Rendered};
use serde_json::Value;
use tracing::warn;

use crate::output;

/// Every data command is a protected view; refuse before touching the network.
fn require_session(ctx: &AppContext) -> Result<()> {
    match ctx.guard.evaluate() {
        Access::Granted => Ok(()),
        Access::Redirect(_) => Err(anyhow::anyhow!(
            "Not logged in (or the session expired). Run `frontdesk login` first."
        )),
    }
}

fn prompt_identifier(default: Option<&str>) -> Result<String> {
    match default {
        Some(last) => print!("Email [{}]: ", last),
        None => print!("Email: "),
    }
    io::stdout().flush()?;

    let mut identifier = String::new();
    io::stdin().read_line(&mut identifier)?;
    let identifier = identifier.trim();
    match (identifier.is_empty(), default) {
        (true, Some(last)) => Ok(last.to_string()),
        (true, None) => Err(anyhow::anyhow!("An email is required")),
        (false, _) => Ok(identifier.to_string()),
    }
}

pub async fn login(ctx: &mut AppContext, identifier: Option<&str>) -> Result<()> {
    let identifier = match identifier {
        Some(identifier) => identifier.to_string(),
        None => prompt_identifier(ctx.config.last_identifier.as_deref())?,
    };
    let secret = rpassword::prompt_password("Password: ")?;

    println!("\nAuthenticating...");
    let user = ctx
        .gateway
        .login(&identifier, &secret)
        .await
        .context("Login failed")?;

    ctx.config.last_identifier = Some(identifier);
    if let Err(e) = ctx.config.save() {
        warn!(error = %e, "Failed to save config");
    }

    println!("Logged in as {}", user.label());
    Ok(())
}

pub async fn logout(ctx: &AppContext) -> Result<()> {
    match ctx.gateway.logout().await {
        Ok(()) => println!("Logged out."),
        Err(e) => println!("Logged out locally; the server could not be notified ({}).", e),
    }
    Ok(())
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let valid = ctx.gateway.verify();
    let session = ctx.session.snapshot();

    if !valid {
        println!("Not logged in.");
        return Ok(());
    }

    if let Some(user) = &session.principal {
        println!("Logged in as {}", user.label());
    } else {
        println!("Logged in");
    }

    match session.bearer() {
        None => println!("Credential: none (cookie session)"),
        Some(credential) => match token::decode(credential) {
            Ok(claims) => match claims.expiry {
                Some(expiry) => println!("Credential: signed token, expires {}", expiry.to_rfc3339()),
                None => println!("Credential: signed token, no expiry"),
            },
            Err(_) => println!("Credential: opaque"),
        },
    }
    Ok(())
}

pub async fn list(ctx: &AppContext, resource: &str) -> Result<()> {
    require_session(ctx)?;
    let transport = &ctx.transport;

    match resource {
        HOTELS => output::print_hotels(&transport.hotels().list().await?),
        ROOMS => output::print_rooms(&transport.rooms().list().await?),
        RESERVATIONS => output::print_reservations(&transport.reservations().list().await?),
        RESERVATION_STATUSES => {
            output::print_statuses(&transport.reservation_statuses().list().await?)
        }
        other => {
            let items = transport.resource::<Value>(other).list().await?;
            output::print_json(&items)?;
        }
    }
    Ok(())
}

pub async fn get(ctx: &AppContext, resource: &str, id: &str) -> Result<()> {
    require_session(ctx)?;
    let item = ctx.transport.resource::<Value>(resource).get(id).await?;
    output::print_json(&item)
}

pub async fn dashboard(ctx: &AppContext) -> Result<()> {
    require_session(ctx)?;

    let (kpis, recent) = futures::join!(
        ctx.transport.kpi_values(),
        ctx.transport.last_reservations()
    );

    match kpis {
        Ok(kpis) => output::print_kpis(&kpis.data),
        Err(e) => eprintln!("Could not load KPIs: {}", e),
    }
    println!();
    output::print_reservations(&recent?);
    Ok(())
}

pub fn open(ctx: &AppContext, route: &str) -> Result<()> {
    match routes::resolve(route, &ctx.guard) {
        Rendered::View(View::Login) => println!("{} -> login view", route),
        Rendered::View(view) => println!("{} -> {}", route, view.title()),
        Rendered::Redirect(to) => println!("{} -> redirect to {}", route, to.route()),
    }
    Ok(())
}
