//! skill-pool - search installed and remote skills from the command line
//!
//! # Usage
//! ```text
//! skill-pool "invoice organizer"
//! skill-pool --query pdf --local-only
//! skill-pool --get invoice-organizer
//! skill-pool --recommend "organize my receipts for taxes"
//! skill-pool --list --category productivity
//! skill-pool --list-sources
//! skill-pool --refresh
//! ```
//!
//! Results go to stdout (human-readable, or JSON with `--json`); logs go to
//! stderr and are controlled with `RUST_LOG`.

use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use skill_pool::category::Category;
use skill_pool::config::{parse_registry_spec, SearchConfig};
use skill_pool::local::LocalRegistry;
use skill_pool::search::{Recommendation, ResolvedSkill, SearchResults, Sources, DEFAULT_TOP_N};
use skill_pool::{HttpFetcher, SearchHit, SkillPoolError, SkillRecord, UnifiedSearch};
use std::path::PathBuf;
use tracing::{debug, error};

type Engine = UnifiedSearch<LocalRegistry, HttpFetcher>;

#[derive(Debug, Parser)]
#[command(
    name = "skill-pool",
    version,
    about = "Search for skills across local directories and external registries"
)]
struct Cli {
    /// Search query
    query: Option<String>,

    /// Search query (alternative to the positional argument)
    #[arg(short = 'q', long = "query")]
    query_flag: Option<String>,

    /// Get a specific skill by exact name
    #[arg(short, long, value_name = "NAME")]
    get: Option<String>,

    /// Recommend the best skill for a task
    #[arg(short, long, value_name = "TASK")]
    recommend: Option<String>,

    /// List every skill in the external index
    #[arg(long)]
    list: bool,

    /// With --list, only this registry
    #[arg(long, requires = "list")]
    source: Option<String>,

    /// With --list, only this category
    #[arg(long, requires = "list", value_parser = parse_category)]
    category: Option<Category>,

    /// List all skill sources
    #[arg(long)]
    list_sources: bool,

    /// Rebuild the external index from the registries
    #[arg(long)]
    refresh: bool,

    /// Only search local skills
    #[arg(short, long, conflicts_with = "external_only")]
    local_only: bool,

    /// Only search external skills
    #[arg(short, long)]
    external_only: bool,

    /// Maximum results per source
    #[arg(short = 'n', long = "top", default_value_t = DEFAULT_TOP_N)]
    top: usize,

    /// Show descriptions, paths and URLs
    #[arg(short, long)]
    verbose: bool,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Cache directory (default: ~/.claude/skill-cache, or $SKILL_POOL_CACHE_DIR)
    #[arg(long, value_name = "DIR")]
    cache_dir: Option<PathBuf>,

    /// Local skill directory to scan instead of the defaults (repeatable)
    #[arg(long = "local-path", value_name = "DIR")]
    local_paths: Vec<PathBuf>,

    /// Extra GitHub registry, NAME=OWNER/REPO[@BRANCH] (repeatable)
    #[arg(long = "registry", value_name = "SPEC")]
    registries: Vec<String>,

    /// Never consult external registries
    #[arg(long)]
    no_external: bool,

    /// Never fall back to the bundled index when the registries yield nothing
    #[arg(long)]
    no_bundle: bool,
}

fn parse_category(value: &str) -> Result<Category, String> {
    Category::parse(value).ok_or_else(|| {
        let names: Vec<&str> = Category::ALL.iter().map(|c| c.as_str()).collect();
        format!("unknown category, expected one of: {}", names.join(", "))
    })
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("Error: {}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_config(cli: &Cli) -> Result<SearchConfig, SkillPoolError> {
    let mut config = SearchConfig::with_cache_dir(cli.cache_dir.clone())?;
    if !cli.local_paths.is_empty() {
        config.local_paths = cli.local_paths.clone();
    }
    for spec in &cli.registries {
        config.registries.push(parse_registry_spec(spec)?);
    }
    config.include_external = !cli.no_external;
    config.use_bundle = !cli.no_bundle;
    Ok(config)
}

fn run(cli: Cli) -> Result<(), SkillPoolError> {
    let config = build_config(&cli)?;
    debug!(?config, "Starting");

    let mut engine = match Engine::from_config(config.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            // Without an HTTP client we can still search local skills.
            error!("HTTP client unavailable, external search disabled: {}", e);
            Engine::from_config(SearchConfig {
                include_external: false,
                ..config
            })?
        }
    };

    if cli.list_sources {
        let sources = engine.list_sources();
        return emit(cli.json, &sources, || print_sources(&sources));
    }

    if cli.refresh {
        let count = engine.refresh_external();
        let summary = serde_json::json!({ "refreshed": count });
        return emit(cli.json, &summary, || {
            println!("Refreshed external registry: {} skills indexed", count)
        });
    }

    if cli.list {
        let skills = engine
            .remote_mut()
            .map(|remote| remote.list_skills(cli.source.as_deref(), cli.category))
            .unwrap_or_default();
        return emit(cli.json, &skills, || print_list(&skills));
    }

    if let Some(name) = &cli.get {
        let skill = engine.get(name);
        if cli.json {
            let value = match &skill {
                Some(skill) => serde_json::to_value(skill)?,
                None => serde_json::json!({ "error": "Not found" }),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            print_skill(name, skill.as_ref());
        }
        return Ok(());
    }

    if let Some(task) = &cli.recommend {
        let rec = engine.recommend(task);
        return emit(cli.json, &rec, || print_recommendation(&rec));
    }

    match cli.query.as_ref().or(cli.query_flag.as_ref()) {
        Some(query) => {
            let results = engine.search(query, cli.top, cli.local_only, cli.external_only);
            emit(cli.json, &results, || print_results(&results, cli.verbose))
        }
        None => {
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
            Ok(())
        }
    }
}

/// Print `value` as pretty JSON, or run the human printer
fn emit<T: Serialize>(json: bool, value: &T, human: impl FnOnce()) -> Result<(), SkillPoolError> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        human();
    }
    Ok(())
}

// ============================================================================
// Human-readable output
// ============================================================================

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{}...", cut)
    }
}

fn print_hit(hit: &SearchHit, verbose: bool) {
    println!("  {:25} (score: {:.2})", hit.record.name.bold(), hit.score);
    if verbose {
        println!("    {}", truncate(&hit.record.description, 60));
        if hit.installed {
            println!("    Path: {}", hit.record.url);
        } else {
            println!("    Source: {}", hit.record.source);
            println!("    URL: {}", hit.record.url);
        }
    }
}

fn print_results(results: &SearchResults, verbose: bool) {
    if results.is_empty() {
        println!("No skills found matching '{}'", results.query);
        return;
    }

    println!("Found {} skills matching '{}':", results.total(), results.query);
    println!();

    if !results.local.is_empty() {
        println!("{}", "📁 LOCAL SKILLS (installed):".green().bold());
        println!("{}", "-".repeat(40));
        for hit in &results.local {
            print_hit(hit, verbose);
        }
        println!();
    }

    if !results.external.is_empty() {
        println!("{}", "🌐 EXTERNAL SKILLS (available to install):".blue().bold());
        println!("{}", "-".repeat(40));
        for hit in &results.external {
            print_hit(hit, verbose);
        }
        println!();
    }
}

fn print_skill(name: &str, skill: Option<&ResolvedSkill>) {
    let Some(skill) = skill else {
        println!("Skill '{}' not found", name);
        return;
    };
    let record = &skill.record;
    println!("Skill: {}", record.name.bold());
    println!("Description: {}", record.description);
    println!("Source: {}", record.source);
    println!("Category: {}", record.category);
    println!("Installed: {}", if skill.installed { "Yes".green() } else { "No".yellow() });
    if !record.url.is_empty() {
        println!("URL: {}", record.url);
    }
    if let Some(command) = &skill.install_command {
        println!("\nInstall command:\n{}", command);
    }
}

fn print_recommendation(rec: &Recommendation) {
    let Some(pick) = &rec.pick else {
        println!("{}", rec.message.as_deref().unwrap_or("No recommendation"));
        return;
    };

    println!(
        "{} {} (confidence: {:.2})",
        "✓ Recommended:".green().bold(),
        pick.skill.bold(),
        rec.confidence
    );
    println!("  {}", truncate(&pick.description, 80));
    println!("  Installed: {}", if pick.installed { "Yes" } else { "No" });
    if let Some(command) = &pick.install_command {
        println!("\n  Install:\n  {}", command);
    }
    if !pick.alternatives.is_empty() {
        println!("\n  Alternatives: {}", pick.alternatives.join(", "));
    }
}

fn print_list(skills: &[SkillRecord]) {
    if skills.is_empty() {
        println!("No skills in the external index");
        return;
    }
    for skill in skills {
        println!(
            "{:30} [{}] {}",
            skill.name,
            skill.source.cyan(),
            truncate(&skill.description, 50)
        );
    }
}

fn print_sources(sources: &Sources) {
    println!("Skill Sources:");
    println!("{}", "=".repeat(50));

    println!("\n📁 Local Paths:");
    for p in &sources.local_paths {
        if p.exists {
            println!("  {} {} ({} skills)", "✓".green(), p.path.display(), p.skill_count);
        } else {
            println!("  {} {} (not found)", "✗".red(), p.path.display());
        }
    }

    println!("\n🌐 External Registries:");
    if sources.external_registries.is_empty() {
        println!("  (disabled)");
    }
    for r in &sources.external_registries {
        println!("  • {}: {}", r.name, r.url);
    }
}
