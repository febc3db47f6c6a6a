use anyhow::Result;
use edusmart_application::AppServices;
use edusmart_core::access::{GuardDecision, Permission, has_permission};

pub fn check(services: &AppServices, location: &str) -> Result<()> {
    let decision = services.guard.check(&services.sessions.phase(), location);
    match &decision {
        GuardDecision::Allow => println!("allow {}", location),
        GuardDecision::Checking => println!("checking session"),
        GuardDecision::RedirectToLogin { from } => {
            println!("redirect /login (from {})", from)
        }
        GuardDecision::RedirectToUnauthorized | GuardDecision::Redirect(_) => {
            println!("redirect {}", decision.target().unwrap_or("/"))
        }
    }
    Ok(())
}

pub fn permissions(services: &AppServices) -> Result<()> {
    let Some(session) = services.sessions.current() else {
        println!("Not signed in; no permissions.");
        return Ok(());
    };
    println!("Permissions for {}:", session.role.label());
    for permission in Permission::ALL {
        let mark = if has_permission(&session.role, permission) { "yes" } else { "no" };
        println!("  {:<26} {}", permission.name(), mark);
    }
    Ok(())
}
