//! Subcommand handlers

use anyhow::{bail, Result};
use clap::Args;
use regula_core::catalog::{
    EditRequest, Package, PaymentInfo, PaymentMethod, Stars, Submission,
};
use regula_core::config::CatalogConfig;
use regula_core::identity::{Credentials, RegistrationForm, User};
use regula_core::Platform;
use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

pub async fn register(platform: &Platform, form: RegistrationForm) -> Result<()> {
    form.validate()?;
    let user = platform.identity().register(form.into_request()).await?;
    println!("Registered {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn login(platform: &Platform, email: String, password: String) -> Result<()> {
    let user = platform
        .identity()
        .login(Credentials { email, password })
        .await?;
    println!("Logged in as {} <{}>", user.name, user.email);
    Ok(())
}

pub async fn logout(platform: &Platform) -> Result<()> {
    platform.identity().logout().await?;
    println!("Logged out");
    Ok(())
}

pub async fn whoami(platform: &Platform) {
    match platform.identity().current_user().await {
        Some(user) => println!("{} <{}> (id {})", user.name, user.email, user.id),
        None => println!("Not logged in"),
    }
}

pub async fn forgot_password(platform: &Platform, email: &str) {
    let notice = platform.identity().forgot_password(email).await;
    println!("{}: {}", notice.email, notice.message);
}

pub async fn stats(platform: &Platform) -> Result<()> {
    let Some(user) = platform.identity().current_user().await else {
        bail!("Not logged in");
    };
    println!("{}", serde_json::to_string_pretty(&user.stats)?);
    Ok(())
}

pub async fn featured(platform: &Platform, json: bool) -> Result<()> {
    let packages = platform.catalog().featured_packages().await;
    if json {
        println!("{}", serde_json::to_string_pretty(&packages)?);
        return Ok(());
    }

    for p in packages {
        println!(
            "{:>3}  {:<20} {:<16} {:>8}  {:>6} dl  {:.1}★ ({})",
            p.id, p.name, p.version, p.size, p.downloads, p.rating, p.review_count
        );
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct SimulateArgs {
    #[arg(long, default_value = "Test App")]
    name: String,

    #[arg(long, default_value = "1.0")]
    version: String,

    /// Seconds until the automated review settles the package
    #[arg(long, default_value_t = 5)]
    review_delay_secs: u64,

    /// Length of one download countdown tick, in milliseconds
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,

    /// Star ratings to apply, e.g. 5,3,4
    #[arg(long, value_delimiter = ',')]
    ratings: Vec<u8>,

    /// Downloads to run once the package is submitted
    #[arg(long, default_value_t = 1)]
    downloads: u32,

    /// Spam reports to file
    #[arg(long, default_value_t = 0)]
    reports: u32,

    /// Pay this amount for an edit bumping the version
    #[arg(long)]
    edit_payment: Option<u64>,

    /// Bill the edit as a major edit
    #[arg(long)]
    major: bool,
}

impl SimulateArgs {
    /// Shorten the timings the simulation waits on
    pub fn tune(&self, catalog: &mut CatalogConfig) {
        catalog.review_delay = Duration::from_secs(self.review_delay_secs);
        catalog.download_tick = Duration::from_millis(self.tick_ms);
    }

    fn submission(&self) -> Submission {
        let slug = self.name.to_lowercase().replace(' ', "");
        Submission {
            name: self.name.clone(),
            version: self.version.clone(),
            package_name: format!("com.regula.{}", slug),
            description: format!("{} uploaded by the simulator", self.name),
            binary: Some(format!("{}.apk", slug)),
            icon: Some("icon.png".to_string()),
            screenshots: (1..=3).map(|i| format!("screen-{}.png", i)).collect(),
            ..Default::default()
        }
    }
}

#[derive(Serialize)]
struct SimulationReport {
    package: Package,
    user: Option<User>,
}

pub async fn simulate(platform: &Platform, args: SimulateArgs) -> Result<()> {
    let submission = args.submission();
    submission.validate()?;

    let catalog = platform.catalog();
    let id = catalog.submit_package(submission).await.id;

    for rating in &args.ratings {
        catalog.rate_package(id, Stars::new(*rating)?, "").await?;
    }
    for _ in 0..args.downloads {
        catalog.download_package(id).await?;
    }
    for n in 0..args.reports {
        let outcome = catalog
            .report_package(id, &format!("simulated report #{}", n + 1))
            .await?;
        if outcome.flagged {
            info!("Package flagged after {} report(s)", n + 1);
            break;
        }
    }

    if let Some(amount) = args.edit_payment {
        let edit = EditRequest {
            version: Some(format!("{}-edited", args.version)),
            major_edit: args.major,
            ..Default::default()
        };
        let currency = catalog.config().currency.clone();
        if let Err(e) = catalog
            .edit_package(id, edit, PaymentInfo::new(amount, currency, PaymentMethod::Card))
            .await
        {
            warn!("{}", e);
        }
    }

    if catalog.is_review_scheduled(id) {
        let wait = catalog.config().review_delay + Duration::from_millis(100);
        info!("Waiting up to {:?} for the review", wait);
        tokio::select! {
            _ = tokio::time::sleep(wait) => {}
            _ = platform.shutdown_coordinator().wait_for_shutdown() => {
                warn!("Interrupted before the review finished");
            }
        }
    }

    let user = platform.sync_user_stats().await?;
    let Some(package) = catalog.package(id).await else {
        bail!("Package {} disappeared", id);
    };

    println!(
        "{}",
        serde_json::to_string_pretty(&SimulationReport { package, user })?
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        sim: SimulateArgs,
    }

    #[test]
    fn test_simulate_defaults() {
        let sim = Wrapper::parse_from(["regula"]).sim;
        assert_eq!(sim.name, "Test App");
        assert_eq!(sim.version, "1.0");
        assert!(sim.ratings.is_empty());
        assert!(sim.submission().validate().is_ok());
    }

    #[test]
    fn test_simulate_tunes_timings() {
        let sim = Wrapper::parse_from([
            "regula",
            "--review-delay-secs",
            "2",
            "--tick-ms",
            "10",
            "--ratings",
            "5,3,4",
        ])
        .sim;
        assert_eq!(sim.ratings, vec![5, 3, 4]);

        let mut catalog = CatalogConfig::default();
        sim.tune(&mut catalog);
        assert_eq!(catalog.review_delay, Duration::from_secs(2));
        assert_eq!(catalog.download_tick, Duration::from_millis(10));
        assert_eq!(catalog.download_countdown_ticks, 10);
    }
}
