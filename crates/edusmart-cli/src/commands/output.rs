use edusmart_application::{ContextSnapshot, ContextStatus, Notification, NotificationLevel};
use tokio::sync::mpsc::UnboundedReceiver;

/// Prints notifications to stderr until every sender is gone.
pub async fn print_notifications(mut receiver: UnboundedReceiver<Notification>) {
    while let Some(notification) = receiver.recv().await {
        let marker = match notification.level {
            NotificationLevel::Success => "✓",
            NotificationLevel::Info => "•",
            NotificationLevel::Error => "✗",
        };
        eprintln!("{} {}", marker, notification.message);
    }
}

pub fn print_context(snapshot: &ContextSnapshot) {
    match &snapshot.status {
        ContextStatus::Empty => {
            println!("No academic context (not signed in).");
            return;
        }
        ContextStatus::Loading => println!("(still loading)"),
        ContextStatus::Failed(e) => println!("Context unavailable: {}", e),
        ContextStatus::Ready => {}
    }

    let context = &snapshot.context;
    let active_campus = context.active_campus().map(|c| c.id.as_str());
    let active_year = context.active_year().map(|y| y.id.as_str());

    println!("Campuses:");
    if context.available_campuses().is_empty() {
        println!("  (none)");
    }
    for campus in context.available_campuses() {
        let marker = if Some(campus.id.as_str()) == active_campus { "*" } else { " " };
        println!("  {} {:<26} {}", marker, campus.id, campus.name);
    }

    println!("Academic years:");
    if context.available_years().is_empty() {
        println!("  (none)");
    }
    for year in context.available_years() {
        let marker = if Some(year.id.as_str()) == active_year { "*" } else { " " };
        let current = if year.is_current { " (current)" } else { "" };
        println!("  {} {:<26} {}{}", marker, year.id, year.label, current);
    }
}
