// src/cli.rs
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gradhire_client::{
    BookmarkStore, ClientConfig, Country, FlowError, Job, JsonFileStore, ResumeFlows,
    ResumeOptimizationResponse,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gradhire")]
#[command(about = "Match your résumé to jobs and tailor it for each one")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a résumé and list matching jobs
    Jobs {
        pdf: PathBuf,
        #[arg(long)]
        country: Option<String>,
    },
    /// Upload a résumé, then get suggestions for one of the matched jobs
    Optimize {
        pdf: PathBuf,
        /// 1-based position in the job list
        #[arg(long)]
        job: usize,
        #[arg(long)]
        country: Option<String>,
        /// Also download the rewritten résumé
        #[arg(long)]
        download: bool,
    },
    /// Manage saved jobs
    Saved {
        #[command(subcommand)]
        action: SavedCommand,
    },
}

#[derive(Subcommand)]
pub enum SavedCommand {
    /// List saved job ids
    List,
    /// Save or unsave a job
    Toggle { id: Uuid },
}

pub async fn handle_command(cli: Cli, config: &ClientConfig, flows: &ResumeFlows) -> Result<()> {
    let mut bookmarks = BookmarkStore::load(JsonFileStore::open(config.bookmarks_path()));

    match cli.command {
        Command::Jobs { pdf, country } => {
            let country = pick_country(config, country)?;
            if let Some(jobs) = upload(flows, &pdf, &country).await? {
                print_jobs(&jobs, &bookmarks);
            }
        }

        Command::Optimize {
            pdf,
            job,
            country,
            download,
        } => {
            let country = pick_country(config, country)?;
            let Some(jobs) = upload(flows, &pdf, &country).await? else {
                return Ok(());
            };
            let target = job
                .checked_sub(1)
                .and_then(|index| jobs.get(index))
                .with_context(|| format!("Job {} is out of range (1-{})", job, jobs.len()))?;

            println!("🎯 Optimizing for {} at {}", target.title, target.company);
            match flows.optimize(target).await {
                Ok(response) => print_optimization(&response),
                Err(e) if !e.is_fatal() => println!("⚠️  {}", e),
                Err(e) => return Err(e.into()),
            }

            if download {
                let path = flows.download(target).await?;
                println!("📄 Optimized résumé saved to {}", path.display());
            }
        }

        Command::Saved { action } => match action {
            SavedCommand::List => {
                if bookmarks.is_empty() {
                    println!("No saved jobs");
                }
                for id in bookmarks.saved_ids() {
                    println!("⭐ {}", id);
                }
            }
            SavedCommand::Toggle { id } => {
                let saved = bookmarks
                    .toggle(id)
                    .context("Failed to update saved jobs")?;
                info!("Bookmark {} is now {}", id, if saved { "saved" } else { "unsaved" });
                println!("{} {}", if saved { "⭐ Saved" } else { "✖ Removed" }, id);
            }
        },
    }

    Ok(())
}

fn pick_country(config: &ClientConfig, flag: Option<String>) -> Result<Country> {
    match flag {
        Some(code) => Country::parse(&code).with_context(|| format!("Invalid country: {}", code)),
        None => Ok(config.country.clone()),
    }
}

/// `None` when the upload worked but nothing matched.
async fn upload(flows: &ResumeFlows, pdf: &Path, country: &Country) -> Result<Option<Vec<Job>>> {
    println!("⬆️  Uploading {} ({})", pdf.display(), country.label());
    match flows.upload(pdf, country).await {
        Ok(jobs) => Ok(Some(jobs)),
        Err(FlowError::NoJobsFound) => {
            println!("⚠️  {}", FlowError::NoJobsFound);
            Ok(None)
        }
        Err(e) => {
            error!("Upload flow failed: {}", e);
            Err(e.into())
        }
    }
}

fn print_jobs(jobs: &[Job], bookmarks: &BookmarkStore<JsonFileStore>) {
    for (i, job) in jobs.iter().enumerate() {
        let marker = if bookmarks.is_saved(&job.id) { "⭐" } else { "  " };
        println!(
            "{} {:>2}. {} - {} ({})  {}%",
            marker,
            i + 1,
            job.title,
            job.company,
            job.location,
            job.match_score
        );
        println!("       {}", job.readiness().message());
        println!("       id: {}", job.id);
    }
}

fn print_optimization(response: &ResumeOptimizationResponse) {
    let sections = [
        ("Missing skills", &response.missing_skills),
        ("Improved bullets", &response.improved_bullets),
        ("ATS keywords", &response.ats_keywords),
    ];
    for (title, items) in sections {
        if items.is_empty() {
            continue;
        }
        println!("\n{}:", title);
        for item in items {
            println!("  • {}", item);
        }
    }
}
