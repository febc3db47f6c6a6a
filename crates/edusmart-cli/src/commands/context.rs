use super::output::print_context;
use anyhow::{Result, bail};
use edusmart_application::{AppServices, ContextStatus};

pub async fn show(services: &AppServices) -> Result<()> {
    let snapshot = services.resolver.settled().await?;
    print_context(&snapshot);
    Ok(())
}

pub async fn change_campus(services: &AppServices, id: &str) -> Result<()> {
    ensure_ready(services).await?;
    services.resolver.change_campus(id).await?;
    print_context(&services.resolver.snapshot());
    Ok(())
}

pub async fn change_year(services: &AppServices, id: &str) -> Result<()> {
    ensure_ready(services).await?;
    services.resolver.change_year(id).await?;
    print_context(&services.resolver.snapshot());
    Ok(())
}

pub async fn refresh(services: &AppServices) -> Result<()> {
    ensure_ready(services).await?;
    services.resolver.refresh().await?;
    print_context(&services.resolver.snapshot());
    Ok(())
}

async fn ensure_ready(services: &AppServices) -> Result<()> {
    let snapshot = services.resolver.settled().await?;
    match snapshot.status {
        ContextStatus::Ready => Ok(()),
        ContextStatus::Empty => bail!("Not signed in. Run `edusmart login <email>` first."),
        ContextStatus::Failed(e) => Err(e.into()),
        ContextStatus::Loading => bail!("Academic context is still loading"),
    }
}
