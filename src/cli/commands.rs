//! CLI commands

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::config::Config;
use crate::db::{Database, DoseRecord, Severity, SideEffectKind};
use crate::schedule::{local_today, Concentration, DoseInfo};
use crate::therapy::{TakeDose, TherapyService};

#[derive(Parser)]
#[command(name = "asit-daily")]
#[command(about = "Dose schedule and adherence journal for allergen immunotherapy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (default: ~/.asit-daily/config.yml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Database path, overrides the config file
    #[arg(long, global = true)]
    database: Option<String>,

    /// Journal profile, overrides the config file
    #[arg(long, global = true)]
    profile: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start therapy, or update dose and reminder of the running therapy
    Start {
        /// First day of therapy, YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Maintenance dose in clicks (default: from config)
        #[arg(long)]
        maintenance_dose: Option<u32>,

        /// Daily reminder time, HH:MM
        #[arg(long, default_value = "09:00")]
        reminder: String,
    },

    /// Show the dose prescribed for today
    Today {
        /// Show another day instead of today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Record a taken dose
    Take {
        /// Day of the dose (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Clicks administered (default: prescribed)
        #[arg(long)]
        clicks: Option<u32>,

        /// Concentration used: low or high (default: prescribed)
        #[arg(long)]
        concentration: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Record a skipped dose
    Skip {
        /// Day of the dose (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        reason: Option<String>,
    },

    /// List recorded doses, most recent first
    History {
        #[arg(long, default_value_t = crate::therapy::DEFAULT_HISTORY_LIMIT)]
        limit: usize,
    },

    /// Log a side effect against a recorded dose
    SideEffect {
        /// Day of the dose the reaction followed (default: today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// itching, swelling, redness or other
        #[arg(long)]
        kind: String,

        /// mild, moderate or severe
        #[arg(long)]
        severity: String,

        #[arg(long)]
        description: Option<String>,
    },

    /// Print the planned doses for a range of days
    Schedule {
        /// First day to print (default: today)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Number of days to print
        #[arg(
            long,
            default_value = "14",
            value_parser = clap::value_parser!(u32).range(1..=crate::therapy::MAX_SCHEDULE_DAYS as i64)
        )]
        days: u32,
    },

    /// Export the whole journal as JSON
    Export {
        /// Output file (default: stdout)
        #[arg(long)]
        output: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command;

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(profile) = cli.profile {
        config.profile = profile;
    }

    if let Commands::Config = command {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    // Initialize database
    let db = Database::new(config.resolve_db_path()?)?;
    let service = TherapyService::new(db, &config)?;
    let today = local_today();

    // Create a multi-threaded runtime for CLI operations
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(async {
        match command {
        Commands::Start { date, maintenance_dose, reminder } => {
            let dose = maintenance_dose.unwrap_or(config.schedule.default_maintenance_dose);
            let session = service
                .start_therapy(date.unwrap_or(today), dose, &reminder)
                .await?;

            println!(
                "Therapy started {} - maintenance {} clicks, reminder at {}",
                session.start_date, session.maintenance_dose, session.reminder_time
            );
            Ok(())
        }

        Commands::Today { date } => {
            let Some(view) = service.current(date.unwrap_or(today)).await? else {
                println!("No therapy yet - run `asit-daily start` first");
                return Ok(());
            };

            match view.dose {
                None => println!(
                    "Therapy starts on {} - no dose for {}",
                    view.session.start_date, view.date
                ),
                Some(dose) => {
                    println!("{} - day {} of therapy", view.date, dose.day_of_therapy);
                    println!("{}", format_dose(&dose));
                    if view.progress.total_steps > 0 {
                        println!(
                            "{}: step {}/{} ({:.0}%)",
                            dose.phase.label(),
                            view.progress.current_step,
                            view.progress.total_steps,
                            view.progress.percentage
                        );
                    } else {
                        println!(
                            "{}: day {} of maintenance",
                            dose.phase.label(),
                            view.progress.current_step
                        );
                    }
                }
            }

            match view.record {
                Some(record) => println!("Recorded: {}", format_record(&record)),
                None => println!("Recorded: nothing yet"),
            }
            Ok(())
        }

        Commands::Take { date, clicks, concentration, notes } => {
            let concentration = concentration
                .map(|c| Concentration::from_str(&c))
                .transpose()?;

            let record = service
                .take_dose(today, TakeDose { date, clicks, concentration, notes })
                .await?;

            println!("Recorded: {}", format_record(&record));
            Ok(())
        }

        Commands::Skip { date, reason } => {
            let record = service.skip_dose(date.unwrap_or(today), reason).await?;

            println!("Recorded: {}", format_record(&record));
            Ok(())
        }

        Commands::History { limit } => {
            let records = service.history(Some(limit)).await?;

            if records.is_empty() {
                println!("No doses recorded");
            } else {
                for record in records {
                    println!("{}", format_record(&record));
                }
            }
            Ok(())
        }

        Commands::SideEffect { date, kind, severity, description } => {
            let kind = SideEffectKind::from_str(&kind)?;
            let severity = Severity::from_str(&severity)?;

            let effect = service
                .add_side_effect(date.unwrap_or(today), kind, severity, description, today)
                .await?;

            println!(
                "Side effect recorded: {} ({}) [{}]",
                effect.kind.as_str(),
                effect.severity.as_str(),
                effect.id.chars().take(8).collect::<String>()
            );
            Ok(())
        }

        Commands::Schedule { from, days } => {
            for day in service.schedule(from.unwrap_or(today), days).await? {
                match day.dose {
                    Some(dose) => println!(
                        "{}  day {:>3}  {:<11}  {}",
                        day.date,
                        dose.day_of_therapy,
                        dose.phase.as_str(),
                        format_dose(&dose)
                    ),
                    None => println!("{}  not started", day.date),
                }
            }
            Ok(())
        }

        Commands::Export { output } => {
            let json = service.export(today).await?.to_json()?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write export to {}", path))?;
                    println!("Exported journal to {}", path);
                }
                None => println!("{}", json),
            }
            Ok(())
        }

        Commands::Config => Ok(()),
        }
    })
}

fn format_dose(dose: &DoseInfo) -> String {
    format!(
        "{} clicks of {} ({} cap)",
        dose.clicks,
        dose.concentration.label(),
        dose.concentration.cap_color()
    )
}

fn format_record(record: &DoseRecord) -> String {
    let status = if record.taken {
        format!(
            "taken {} clicks of {}",
            record.dose_count.unwrap_or_default(),
            record.concentration.map(|c| c.label()).unwrap_or("-")
        )
    } else {
        "skipped".to_string()
    };

    format!(
        "[{}] {} - {}{}",
        record.id.chars().take(8).collect::<String>(),
        record.date,
        status,
        record
            .notes
            .as_deref()
            .map(|n| format!(" ({})", n))
            .unwrap_or_default()
    )
}
