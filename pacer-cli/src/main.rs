mod player;

use anyhow::{Result, anyhow};
use chrono::Local;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use std::sync::Arc;

use pacer::db::operations::{
    add_exercise, add_water, challenge_plan, complete_challenge_day, create_plan, delete_plan,
    get_all_plans, log_weight, remove_exercise, start_challenge,
};
use pacer::db::models::Patch;
use pacer::db::{self, DocumentStore};
use pacer::logging::{LogTarget, init_logger, parse_level};
use pacer::plan::Category;
use pacer::progress::achievements::{Achievement, catalogue};
use pacer::progress::body::{WeightTrend, water_progress};
use pacer::progress::challenges::CALISTHENICS_CHALLENGES;
use pacer::progress::daily_tip;
use pacer::progress::history::{HistoryStats, day_label, entries_newest_first};
use pacer::session::{Session, SessionSettings};
use pacer::timer::{CuePlayer, LogCues, SystemClock};
use player::{BellCues, PlayerExit, run_player};

#[derive(Parser, Debug)]
#[command(version, about = "Pacer - Interval Training Tracker CLI", long_about = None)]
struct Args {
    /// JSON document to use instead of PACER_DB_PATH
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
    /// Write logs here; the session player logs nowhere otherwise
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a workout in the terminal
    Session {
        /// Plan key, or challenge:<id> for today's challenge workout
        plan: String,
        #[arg(long)]
        no_warmup: bool,
        #[arg(long)]
        mute: bool,
        /// Skip and exit fire on the first press instead of a hold
        #[arg(long)]
        no_hold: bool,
    },
    /// List and edit workout plans
    Plans {
        #[command(subcommand)]
        action: Option<PlanAction>,
    },
    /// Workout history and streaks
    History {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show or add today's water
    Water { ml: Option<u32> },
    /// Show the trend or log today's weight
    Weight { kg: Option<f64> },
    Challenges {
        #[command(subcommand)]
        action: Option<ChallengeAction>,
    },
    Achievements,
    /// Print a random tip
    Tip,
    /// Show or edit the profile
    Profile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        goal: Option<String>,
        /// Daily water goal in ml
        #[arg(long)]
        water_goal: Option<u32>,
    },
    /// Replace the document with the seed data
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
enum PlanAction {
    List {
        #[arg(short, long)]
        verbose: bool,
    },
    Create {
        label: String,
    },
    /// Append an exercise (45s work / 15s rest unless given)
    Add {
        plan: String,
        name: String,
        #[arg(short, long, default_value = "cardio", value_parser = parse_category)]
        category: Category,
        #[arg(short, long)]
        work: Option<u32>,
        #[arg(short, long)]
        rest: Option<u32>,
    },
    Remove {
        plan: String,
        id: String,
    },
    Delete {
        plan: String,
    },
}

#[derive(Subcommand, Debug)]
enum ChallengeAction {
    List,
    Start { id: String },
    /// Mark today's day done without running the timer
    Complete { id: String },
    /// Show today's circuit
    Plan { id: String },
}

fn parse_category(s: &str) -> Result<Category, String> {
    Category::parse(s).map_err(|e| e.to_string())
}

fn setup_logging(args: &Args) -> Result<()> {
    let level = parse_level(&args.log_level)
        .ok_or_else(|| anyhow!("Unknown log level {}", args.log_level))?;
    let target = match (&args.log_file, &args.command) {
        (Some(path), _) => LogTarget::File(path.clone()),
        // ratatui owns the terminal
        (None, Commands::Session { .. }) => return Ok(()),
        (None, _) => LogTarget::Stderr,
    };
    init_logger(level, target)
}

fn print_unlocked(unlocked: &[&'static Achievement]) {
    for a in unlocked {
        println!("Achievement unlocked: {} {} - {}", a.emoji, a.title, a.desc);
    }
}

async fn plans(store: &DocumentStore, action: Option<PlanAction>) -> Result<()> {
    match action.unwrap_or(PlanAction::List { verbose: false }) {
        PlanAction::List { verbose } => {
            for (key, plan) in get_all_plans(store).await? {
                println!(
                    "{}, {} {} ({} exercises, ~{} min)",
                    key,
                    plan.emoji.as_deref().unwrap_or(""),
                    plan.label,
                    plan.exercises.len(),
                    plan.planned_seconds().div_ceil(60)
                );
                if verbose {
                    for ex in &plan.exercises {
                        println!(
                            "\t{} [{}] {}s work / {}s rest  ({})",
                            ex.name, ex.category, ex.work_seconds, ex.rest_seconds, ex.id
                        );
                    }
                }
            }
        }
        PlanAction::Create { label } => {
            let key = create_plan(store, &label).await?;
            println!("Created plan {}", key);
        }
        PlanAction::Add {
            plan,
            name,
            category,
            work,
            rest,
        } => {
            let ex = add_exercise(store, &plan, &name, category, work, rest).await?;
            println!("Added {} to {} ({})", ex.name, plan, ex.id);
        }
        PlanAction::Remove { plan, id } => {
            let ex = remove_exercise(store, &plan, &id).await?;
            println!("Removed {} from {}", ex.name, plan);
        }
        PlanAction::Delete { plan } => {
            let removed = delete_plan(store, &plan).await?;
            println!("Deleted plan {}", removed.label);
        }
    }
    Ok(())
}

async fn history(store: &DocumentStore, verbose: bool) -> Result<()> {
    let db = store.load().await?;
    let today = Local::now().date_naive();
    let stats = HistoryStats::compute(&db.history, today);
    println!(
        "Streak: {} days | Sessions: {} | Minutes: {} | Active this week: {}/7",
        stats.streak, stats.total_sessions, stats.total_minutes, stats.active_days_this_week
    );
    let shades = [".", "+", "*", "#"];
    let heatmap: String = stats
        .heatmap
        .iter()
        .map(|d| shades[d.level as usize])
        .collect();
    println!("Last {} days: {}", stats.heatmap.len(), heatmap);
    if verbose {
        for (day, entries) in entries_newest_first(&db.history) {
            println!("{}", day_label(day, today));
            for e in entries {
                println!("\t{}", e);
            }
        }
    }
    Ok(())
}

async fn water(store: &DocumentStore, ml: Option<u32>) -> Result<()> {
    let today = Local::now().date_naive();
    let (current, goal) = match ml {
        Some(ml) => {
            let out = add_water(store, ml, today).await?;
            print_unlocked(&out.unlocked);
            (out.current, out.goal)
        }
        None => {
            let db = store.load().await?;
            let current = if db.profile.last_water_date == Some(today) {
                db.profile.current_water
            } else {
                0
            };
            (current, db.profile.water_goal)
        }
    };
    println!(
        "Water today: {} / {} ml ({:.0}%)",
        current,
        goal,
        water_progress(current, goal) * 100.0
    );
    Ok(())
}

async fn weight(store: &DocumentStore, kg: Option<f64>) -> Result<()> {
    if let Some(kg) = kg {
        let unlocked = log_weight(store, kg, Local::now().date_naive()).await?;
        println!("Logged {:.1} kg", kg);
        print_unlocked(&unlocked);
    }
    let db = store.load().await?;
    match WeightTrend::from_history(&db.weight_history) {
        Some(trend) => {
            for (day, kg) in &trend.points {
                println!("{}  {:.1} kg", day, kg);
            }
            println!(
                "Range {:.1}-{:.1} kg, change {:+.1} kg",
                trend.min,
                trend.max,
                trend.change()
            );
        }
        None => println!("Log at least two days to see a trend"),
    }
    Ok(())
}

async fn challenges(store: &DocumentStore, action: Option<ChallengeAction>) -> Result<()> {
    match action.unwrap_or(ChallengeAction::List) {
        ChallengeAction::List => {
            let db = store.load().await?;
            for c in CALISTHENICS_CHALLENGES {
                let state = match db.active_challenges.get(c.id) {
                    Some(p) if c.is_finished(p) => "finished".to_string(),
                    Some(p) => format!("day {}/{} ({}%)", p.current_day, c.days, c.progress_pct(p)),
                    None => "not started".to_string(),
                };
                println!(
                    "{} {} - {} [{}, {} days] {}",
                    c.reward_emoji, c.id, c.title, c.difficulty, c.days, state
                );
            }
        }
        ChallengeAction::Start { id } => {
            let p = start_challenge(store, &id).await?;
            println!("Started {} on day {}", p.challenge_id, p.current_day);
        }
        ChallengeAction::Complete { id } => {
            let out = complete_challenge_day(store, &id, Local::now().date_naive()).await?;
            if out.finished {
                println!("Challenge {} finished!", id);
            } else if out.advanced {
                println!("Day done. Next up: day {}", out.progress.current_day);
            } else {
                println!("Today is already done for {}", id);
            }
            print_unlocked(&out.unlocked);
        }
        ChallengeAction::Plan { id } => {
            let plan = challenge_plan(store, &id).await?;
            println!("{}", plan.label);
            for ex in &plan.exercises {
                println!("\t{} {}s work / {}s rest", ex.name, ex.work_seconds, ex.rest_seconds);
            }
        }
    }
    Ok(())
}

async fn profile(
    store: &DocumentStore,
    name: Option<String>,
    goal: Option<String>,
    water_goal: Option<u32>,
) -> Result<()> {
    let db = store.load().await?;
    let mut profile = db.profile.clone();
    let mut patch = Patch::default();
    if name.is_some() || goal.is_some() || water_goal.is_some() {
        if let Some(name) = name {
            profile.name = name;
        }
        if let Some(goal) = goal {
            profile.goal = goal;
        }
        if let Some(ml) = water_goal {
            profile.water_goal = ml;
        }
        patch.profile = Some(profile);
    }
    let profile = if patch.is_empty() {
        db.profile
    } else {
        // Refuses if a workout was saved since the load above.
        store.apply_patch(patch, Some(db.version)).await?.profile
    };
    println!(
        "{} | goal: {} | water goal: {} ml | weight: {:.1} kg | streak: {} days",
        profile.name, profile.goal, profile.water_goal, profile.current_weight, profile.streak
    );
    Ok(())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();
    setup_logging(&args)?;

    if let Some(path) = &args.db {
        db::set_db_path(&path.to_string_lossy()).await?;
    }
    let store = Arc::new(DocumentStore::open_default().await?);

    match args.command {
        Commands::Session {
            plan,
            no_warmup,
            mute,
            no_hold,
        } => {
            // Muted cues still go to the log file.
            let cues: Arc<dyn CuePlayer> = if mute {
                Arc::new(LogCues)
            } else {
                Arc::new(BellCues)
            };
            let settings = SessionSettings {
                with_warmup: !no_warmup,
                ..SessionSettings::default()
            };
            let session = Session::new(store, cues, Arc::new(SystemClock), settings);

            let terminal = ratatui::init();
            let result = run_player(terminal, &session, &plan, !no_hold).await;
            ratatui::restore();

            match result? {
                PlayerExit::Saved => println!("Workout saved."),
                PlayerExit::Discarded => println!("Workout discarded."),
                PlayerExit::Quit => println!("Exited without finishing."),
            }
            Ok(())
        }
        Commands::Plans { action } => plans(&store, action).await,
        Commands::History { verbose } => history(&store, verbose).await,
        Commands::Water { ml } => water(&store, ml).await,
        Commands::Weight { kg } => weight(&store, kg).await,
        Commands::Challenges { action } => challenges(&store, action).await,
        Commands::Achievements => {
            let db = store.load().await?;
            for (a, unlocked) in catalogue(&db) {
                let mark = if unlocked { "x" } else { " " };
                println!("[{}] {} {} - {}", mark, a.emoji, a.title, a.desc);
            }
            Ok(())
        }
        Commands::Tip => {
            let db = store.load().await?;
            println!("{}", daily_tip(&db).unwrap_or("Keep moving."));
            Ok(())
        }
        Commands::Profile {
            name,
            goal,
            water_goal,
        } => profile(&store, name, goal, water_goal).await,
        Commands::Reset { yes } => {
            if !yes {
                return Err(anyhow!(
                    "This wipes history and plans in {}; rerun with --yes",
                    store.path().display()
                ));
            }
            store.reset().await?;
            println!("Reset {}", store.path().display());
            Ok(())
        }
    }
}
