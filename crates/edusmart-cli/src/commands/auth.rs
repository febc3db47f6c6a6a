use anyhow::{Context, Result, bail};
use edusmart_application::{AppServices, ContextStatus};
use edusmart_core::access::login_return_target;
use edusmart_core::session::Credentials;
use std::io::{self, BufRead, Write};

const PASSWORD_ENV: &str = "EDUSMART_PASSWORD";

pub async fn login(
    services: &AppServices,
    email: &str,
    password: Option<String>,
    from: Option<&str>,
) -> Result<()> {
    let password = match password.or_else(|| std::env::var(PASSWORD_ENV).ok()) {
        Some(password) => password,
        None => prompt_password()?,
    };

    let session = services
        .sessions
        .login(&Credentials::new(email, password))
        .await?;
    println!(
        "Signed in as {} ({})",
        session.name,
        session.role.label()
    );

    // The binding resolves the new session in the background
    let mut contexts = services.resolver.subscribe();
    let snapshot = tokio::time::timeout(
        services.config.request_timeout() * 2,
        contexts.wait_for(|s| {
            !s.is_loading() && matches!(s.status, ContextStatus::Ready | ContextStatus::Failed(_))
        }),
    )
    .await
    .context("Timed out resolving the academic context")??
    .clone();
    if let (Some(campus), Some(year)) = (
        snapshot.context.active_campus(),
        snapshot.context.active_year(),
    ) {
        println!("Working in {} / {}", campus.name, year.label);
    }
    println!("Continue at {}", login_return_target(from));
    Ok(())
}

pub async fn logout(services: &AppServices) -> Result<()> {
    if services.sessions.current().is_none() {
        println!("Not signed in.");
        return Ok(());
    }
    services.sessions.logout().await;
    println!("Signed out.");
    Ok(())
}

pub fn whoami(services: &AppServices) -> Result<()> {
    let Some(session) = services.sessions.current() else {
        bail!("Not signed in. Run `edusmart login <email>` first.");
    };
    println!("{} <{}>", session.name, session.email.as_deref().unwrap_or("-"));
    println!("Role: {} ({})", session.role.label(), session.role);
    if !session.campuses.is_empty() {
        let names: Vec<&str> = session.campuses.iter().map(|c| c.name.as_str()).collect();
        println!("Campuses: {}", names.join(", "));
    }
    Ok(())
}

fn prompt_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read password")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("Password must not be empty");
    }
    Ok(password)
}
