// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use slm_command_center::format::{format_currency, format_thousands, plural};
use slm_command_center::markup::{squash_whitespace, strip_tags};
use slm_command_center::modules::guardrails::TestOutcome;
use slm_command_center::modules::infra_recommender::Field;
use slm_command_center::modules::model_lab::TrainingConfig;
use slm_command_center::pages;
use slm_command_center::{play, Config, InstantClock, Module, Session};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "slm-command-center")]
#[command(version)]
#[command(about = "Self-hosted SLM vs hosted LLM API demo: costs, guardrails, citations, arena, fine-tuning")]
struct Cli {
    /// Interactive TUI when omitted
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file
    #[arg(short, long, global = true, default_value = "slm-command-center.toml")]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write logs to this file (the TUI logs nowhere otherwise)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    /// Seed for simulated metrics and delays
    #[arg(long, global = true)]
    seed: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive TUI
    Tui,

    /// Cost projection for a daily query volume
    Cost {
        #[arg(long)]
        volume: Option<u64>,

        #[arg(long)]
        api_model: Option<String>,

        #[arg(long)]
        slm_model: Option<String>,
    },

    /// Check a prompt against an industry's guardrails
    Guardrails {
        prompt: String,

        #[arg(short, long, default_value = "general")]
        industry: String,
    },

    /// Ask the document assistant a question
    Ask { question: String },

    /// Compare models side by side on a prompt
    Arena {
        /// Defaults to the industry's first sample prompt
        prompt: Option<String>,

        #[arg(short, long, default_value = "general")]
        industry: String,

        /// Comma-separated model keys (2 to 4)
        #[arg(short, long, value_delimiter = ',')]
        models: Vec<String>,

        #[arg(short, long, default_value = "FP16")]
        quantization: String,
    },

    /// Simulate a fine-tuning job in the model lab
    Train {
        #[arg(long, default_value = "mistral-7b")]
        model: String,

        #[arg(long, default_value = "healthcare")]
        domain: String,

        #[arg(long, default_value = "lora")]
        technique: String,

        #[arg(long, default_value = "5000")]
        examples: u32,
    },

    /// Recommend a model, GPU and platform for a workload
    Recommend {
        #[arg(long)]
        industry: String,

        #[arg(long)]
        use_case: String,

        #[arg(long)]
        volume: String,

        #[arg(long)]
        latency: String,

        #[arg(long)]
        budget: String,

        /// Compliance frameworks (repeatable)
        #[arg(long)]
        compliance: Vec<String>,
    },

    /// Print a module page as HTML
    Render {
        /// Module key, e.g. cost-ticker
        module: String,

        /// Play the module's main animation to its last frame first
        #[arg(long)]
        run: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export every module's current state as JSON
    Export {
        /// Overrides the configured export directory
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// List the demo modules
    Modules,

    /// Validate configuration file
    Validate,

    /// Show example configuration
    ExampleConfig,
}

fn setup_logging(verbose: bool, log_file: Option<&PathBuf>, quiet_stdout: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact();

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            let subscriber = builder
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
        }
        // a stdout subscriber would corrupt the alternate screen
        None if quiet_stdout => {}
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let interactive = matches!(cli.command, None | Some(Commands::Tui));
    setup_logging(cli.verbose, cli.log_file.as_ref(), interactive)?;

    if let Some(Commands::ExampleConfig) = cli.command {
        println!("{}", Config::example());
        return Ok(());
    }

    let config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let mut session = match cli.seed {
        Some(seed) => Session::with_seed(config, seed),
        None => Session::new(config),
    };

    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => run_ui_mode(session),
        Commands::Cost {
            volume,
            api_model,
            slm_model,
        } => run_cost(&mut session, volume, api_model, slm_model),
        Commands::Guardrails { prompt, industry } => run_guardrails(&mut session, &prompt, &industry),
        Commands::Ask { question } => run_ask(&mut session, &question),
        Commands::Arena {
            prompt,
            industry,
            models,
            quantization,
        } => run_arena(&mut session, prompt, &industry, &models, &quantization),
        Commands::Train {
            model,
            domain,
            technique,
            examples,
        } => run_train(
            &mut session,
            TrainingConfig {
                base_model: model,
                domain,
                technique,
                examples,
            },
        ),
        Commands::Recommend {
            industry,
            use_case,
            volume,
            latency,
            budget,
            compliance,
        } => {
            let answers = [
                (Field::Industry, industry),
                (Field::UseCase, use_case),
                (Field::Volume, volume),
                (Field::Latency, latency),
                (Field::Budget, budget),
            ];
            run_recommend(&mut session, &answers, &compliance)
        }
        Commands::Render { module, run, out } => run_render(&mut session, &module, run, out),
        Commands::Export { dir } => run_export(&session, dir),
        Commands::Modules => {
            print_modules();
            Ok(())
        }
        Commands::Validate => {
            session.config.validate().context("Invalid configuration")?;
            println!("✓ Configuration is valid: {:?}", cli.config);
            Ok(())
        }
        Commands::ExampleConfig => Ok(()),
    }
}

fn banner(title: &str) {
    println!("{}", title);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

fn run_cost(
    session: &mut Session,
    volume: Option<u64>,
    api_model: Option<String>,
    slm_model: Option<String>,
) -> Result<()> {
    banner("💰 Live Cost Ticker - hosted API vs self-hosted SLM");

    let cost = &mut session.cost;
    if let Some(volume) = volume {
        cost.set_daily_volume(volume);
    }
    if let Some(key) = api_model {
        cost.select_api_model(&key)?;
    }
    if let Some(key) = slm_model {
        cost.select_slm_model(&key)?;
    }

    let run = session.cost.run_comparison("", &session.config.animation)?;
    let outcome = &run.outcome;
    let cost = &session.cost;
    let api_name = cost.pricing().require(cost.api_model())?.name;
    let slm_name = cost.pricing().require(cost.slm_model())?.name;

    println!("\n📝 {} input tokens per query", outcome.input_tokens);
    println!("   {:<28} {} per query", api_name, format_currency(outcome.api_cost, 6));
    println!("   {:<28} {} per query", slm_name, format_currency(outcome.slm_cost, 6));

    let projection = cost.projection();
    println!("\n📊 At {} queries/day", format_thousands(projection.daily_volume));
    println!("   API monthly:      {}", format_currency(projection.api_monthly, 2));
    println!("   SLM monthly:      {}", format_currency(projection.slm_monthly, 2));
    println!(
        "   Monthly savings:  {} ({}%)",
        format_currency(projection.monthly_savings, 2),
        projection.savings_percent
    );
    println!("   Annual savings:   {}", format_currency(projection.annual_savings, 2));
    Ok(())
}

fn run_guardrails(session: &mut Session, prompt: &str, industry: &str) -> Result<()> {
    banner("🛡️  Guardrails Studio - prompt check");

    session.guardrails.set_industry(industry)?;
    let run = session
        .guardrails
        .run_test(prompt, &mut session.rng, &session.config.animation)?;

    let guardrails = &session.guardrails;
    println!("\n🏭 {} ({} active rules)", guardrails.industry().name, guardrails.active_rule_count());
    match &run.outcome {
        TestOutcome::Blocked { triggered_rules } => {
            println!("🚫 BLOCKED");
            for id in triggered_rules {
                let name = guardrails.industry().rule(id).map(|r| r.name).unwrap_or(*id);
                println!("   ✗ {}", name);
            }
        }
        TestOutcome::Passed { active_rules } => {
            println!("✅ PASSED - checked against {} rules", active_rules);
        }
    }
    Ok(())
}

fn run_ask(session: &mut Session, question: &str) -> Result<()> {
    banner("📚 RAG with Citations");

    let run = session.rag.send_query(question, &session.config.animation)?;
    let answer = &run.outcome;
    println!("\n{}", squash_whitespace(&strip_tags(&answer.content)));

    if !answer.citations.is_empty() {
        println!("\n📎 Sources:");
        for (i, id) in answer.citations.iter().enumerate() {
            if let Some((doc, section)) = session.rag.section(id) {
                println!("   [{}] {} - {} (p. {})", i + 1, doc.title, section.section, section.page);
            }
        }
    }
    Ok(())
}

fn run_arena(
    session: &mut Session,
    prompt: Option<String>,
    industry: &str,
    models: &[String],
    quantization: &str,
) -> Result<()> {
    banner("⚔️  Model Arena - side by side");

    let arena = &mut session.arena;
    arena.set_industry(industry)?;
    arena.set_quantization(quantization)?;
    if !models.is_empty() {
        for key in arena.selected_models().to_vec() {
            arena.toggle_model(&key, false)?;
        }
        for key in models {
            arena.toggle_model(key, true)?;
        }
    }

    let prompt = match prompt {
        Some(p) => p,
        None => session.arena.prompt_text(0)?.to_string(),
    };
    let run = session
        .arena
        .run_comparison(&prompt, &mut session.rng, &session.config.animation)?;
    let outcome = &run.outcome;

    println!("\n💬 {}\n", outcome.prompt);
    println!(
        "   {:<26} {:>9} {:>9} {:>10} {:>8}",
        "Model", "Latency", "Tok/s", "$/1K", "Quality"
    );
    for result in &outcome.results {
        println!(
            "   {:<26} {:>7}ms {:>9} {:>10} {:>7}%",
            result.model_name,
            result.metrics.latency,
            result.metrics.tokens_per_sec,
            format_currency(result.metrics.cost_per_1k, 4),
            result.metrics.quality
        );
    }
    println!("\n🏆 Winner: {}", outcome.winner);
    Ok(())
}

fn run_train(session: &mut Session, config: TrainingConfig) -> Result<()> {
    banner("🧪 Model Lab - fine-tuning simulation");

    let run = session
        .model_lab
        .start_training(config, &mut session.rng, &session.config.animation, Utc::now())?;
    let training = &run.outcome;

    println!();
    for entry in &training.log {
        println!("   [{}] {}", entry.timestamp, entry.message);
    }

    let report = &training.report;
    println!("\n📈 {} → {}", report.base_model_name, report.finetuned_model_name);
    println!("   Query:     {}", report.query);
    println!("   Accuracy:  {}% → {}% ({})", report.before_accuracy, report.after_accuracy, report.improvement);
    println!("   Examples:  {}", report.training_examples);
    println!("   Time:      {}", report.training_time);
    println!("   Adapter:   {}", report.adapter_size);
    Ok(())
}

fn run_recommend(session: &mut Session, answers: &[(Field, String)], compliance: &[String]) -> Result<()> {
    banner("🏗️  Infrastructure Recommender");

    let infra = &mut session.infra;
    for (field, value) in answers {
        infra.select(*field, value)?;
    }
    for key in compliance {
        infra.toggle_compliance(key)?;
    }

    let run = infra.recommend(&session.config.animation)?;
    let rec = &run.outcome;
    println!("\n🤖 Model:      {} ({} params, fit {:.1})", rec.model.name, rec.model.params, rec.score);
    println!("🎮 GPU:        {} on {} ({})", rec.gpu.name, rec.gpu.instance, rec.gpu.provider);
    println!("☁️  Platform:   {} - {}", rec.platform.name, rec.platform.best_for);
    println!("📦 Instances:  {}", rec.instances);
    println!("⚡ Latency:    ~{}ms, {} queries/s", rec.estimated_latency_ms, rec.throughput);
    println!("💵 Monthly:    {}", format_currency(rec.monthly_cost, 2));
    println!("   Per query:  {}", format_currency(rec.cost_per_query, 6));
    println!("   Savings vs hosted API: {}%", rec.savings_percent);
    Ok(())
}

fn run_render(session: &mut Session, key: &str, run: bool, out: Option<PathBuf>) -> Result<()> {
    let module = Module::from_key(key)?;
    session.navigate(module);

    let mut surface = pages::page_surface(module, &session.render(module));
    if run {
        let started = session
            .run(module, None, Utc::now())
            .with_context(|| format!("Failed to run {}", module.key()))?;
        let mut clock = InstantClock::default();
        let stats = play(started.timeline, &mut surface, &mut clock);
        tracing::info!(
            "played {} frames ({} skipped) covering {:?}",
            stats.applied,
            stats.skipped,
            clock.slept
        );
    }

    let html = pages::render_page(module, &surface);
    match out {
        Some(path) => {
            std::fs::write(&path, html).with_context(|| format!("Failed to write {:?}", path))?;
            println!("✓ Wrote {} page to {:?}", module.title(), path);
        }
        None => print!("{}", html),
    }
    Ok(())
}

fn run_export(session: &Session, dir: Option<PathBuf>) -> Result<()> {
    banner("📤 Export");

    let dir = dir.unwrap_or_else(|| session.config.export.dir.clone());
    let mut written = 0;
    for (module, doc) in session.export_all(Utc::now()) {
        match doc.and_then(|doc| doc.write_to_dir(&dir)) {
            Ok(path) => {
                written += 1;
                println!("✓ {:<20} {}", module.title(), path.display());
            }
            Err(err) => println!("⚠ {:<20} skipped: {}", module.title(), err),
        }
    }
    println!("\n✅ {} export{} written to {:?}", written, plural(written), dir);
    Ok(())
}

fn print_modules() {
    for module in Module::ALL {
        println!("{} {:<18} {:<20} {}", module.icon(), module.key(), module.title(), module.description());
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(session: Session) -> Result<()> {
    println!("🖥️  Loading SLM Command Center...\n");
    println!("Starting UI... (Press 'q' to quit)\n");

    let mut app = ui::App::new(session);
    ui::run_ui(&mut app)?;

    println!("\n✅ UI closed successfully");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_session: Session) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use the web UI: cargo run --bin slm-server --features server");
    std::process::exit(1);
}
