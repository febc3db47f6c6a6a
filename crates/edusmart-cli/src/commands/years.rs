use super::output::print_context;
use anyhow::{Result, bail};
use chrono::NaiveDate;
use edusmart_application::AppServices;
use edusmart_core::academic::NewAcademicYear;

pub async fn create(
    services: &AppServices,
    label: String,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    current: bool,
) -> Result<()> {
    require_top_level(services)?;
    services.resolver.settled().await?;
    services
        .year_admin
        .create_year(&NewAcademicYear {
            label,
            start_date: start,
            end_date: end,
            is_current: current,
        })
        .await?;
    print_context(&services.resolver.snapshot());
    Ok(())
}

pub async fn set_current(services: &AppServices, id: &str) -> Result<()> {
    require_top_level(services)?;
    services.resolver.settled().await?;
    services.year_admin.set_current_year(id).await?;
    print_context(&services.resolver.snapshot());
    Ok(())
}

fn require_top_level(services: &AppServices) -> Result<()> {
    match services.sessions.current() {
        Some(session) if session.role.is_top_level() => Ok(()),
        Some(session) => bail!("{} cannot manage academic years", session.role.label()),
        None => bail!("Not signed in. Run `edusmart login <email>` first."),
    }
}
