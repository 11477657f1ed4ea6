//! Food Club CLI - analyze and generate bet sets for a round

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::{rngs::StdRng, SeedableRng};
use std::path::{Path, PathBuf};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use foodclub::arenas::ARENA_NAMES;
use foodclub::core::bits::{to_selections, ARENA_COUNT};
use foodclub::core::hash::{decode_amounts, decode_bets};
use foodclub::{
    ArenaReport, Arenas, BetGenerator, Bets, BetsReport, CombinationTable, GeneratorConfig,
    RoundData,
};

#[derive(Parser)]
#[command(name = "foodclub")]
#[command(author, version, about = "Food Club bet analysis CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show arena odds and pirate win probabilities
    Probabilities {
        /// Round JSON file
        #[arg(short, long)]
        round: PathBuf,

        /// Rescale each arena's probabilities to sum to 1
        #[arg(long)]
        renormalize: bool,
    },

    /// List the highest rows of the combination table
    Table {
        /// Round JSON file
        #[arg(short, long)]
        round: PathBuf,

        /// Number of rows to show
        #[arg(long, default_value = "20")]
        top: usize,

        /// Sort by probability instead of expected ratio
        #[arg(long)]
        by_probability: bool,
    },

    /// Analyze a bet set against a round
    Analyze {
        /// Bets hash
        bets: String,

        /// Amounts hash
        #[arg(short, long)]
        amounts: Option<String>,

        /// Round JSON file
        #[arg(short, long)]
        round: PathBuf,
    },

    /// Generate a bet set
    Generate {
        #[command(subcommand)]
        strategy: Strategy,

        /// Round JSON file
        #[arg(short, long)]
        round: PathBuf,

        /// Bet amount; overrides FOODCLUB_BET_AMOUNT
        #[arg(long)]
        bet_amount: Option<u32>,

        /// Allow 15 bets instead of 10
        #[arg(long)]
        charity_corner: bool,

        /// Seed for the random strategies
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Decode a bets hash and optional amounts hash
    Decode {
        /// Bets hash
        bets: String,

        /// Amounts hash
        #[arg(short, long)]
        amounts: Option<String>,
    },
}

#[derive(Subcommand)]
enum Strategy {
    /// Highest expected ratio (net expected with a bet amount)
    MaxTer,
    /// Subsets of one five-arena bet, by payout and probability
    Gambit {
        /// Five-arena bet binary, e.g. 0x88888
        #[arg(value_parser = parse_mask)]
        bet: u32,
    },
    /// Gambit around the most likely five-arena bet
    BestGambit,
    /// Best bets containing the given pirates
    Tenbet {
        /// Bet binary fixing 1 to 3 arenas, e.g. 0x80800
        #[arg(value_parser = parse_mask)]
        pirates: u32,
    },
    /// Most likely bets paying at least the given odds
    Units {
        units: u32,
    },
    /// Bets that always return something
    Bustproof,
    /// Random five-arena bets
    Crazy,
    /// Random bets from the whole table
    Random,
    /// Gambit around a random five-arena bet
    RandomGambit,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    match cli.command {
        Commands::Probabilities { round, renormalize } => {
            show_probabilities(&round, renormalize, cli.json)?;
        }
        Commands::Table {
            round,
            top,
            by_probability,
        } => {
            show_table(&round, top, by_probability, cli.json)?;
        }
        Commands::Analyze {
            bets,
            amounts,
            round,
        } => {
            analyze(&bets, amounts.as_deref(), &round, cli.json)?;
        }
        Commands::Generate {
            strategy,
            round,
            bet_amount,
            charity_corner,
            seed,
        } => {
            let mut config = GeneratorConfig::from_env();
            if let Some(amount) = bet_amount {
                config = config.with_bet_amount(amount);
            }
            if charity_corner {
                config = config.with_charity_corner();
            }
            generate(&strategy, config, seed, &round, cli.json)?;
        }
        Commands::Decode { bets, amounts } => {
            decode(&bets, amounts.as_deref(), cli.json)?;
        }
    }

    Ok(())
}

/// Accepts `0x`-prefixed hex or decimal bet binaries
fn parse_mask(raw: &str) -> Result<u32> {
    let mask = match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse::<u32>(),
    }
    .with_context(|| format!("Invalid bet binary {:?}", raw))?;

    to_selections(mask)?;
    Ok(mask)
}

fn load_round(path: &Path) -> Result<RoundData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read round file {:?}", path))?;
    let round: RoundData = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse round file {:?}", path))?;
    debug!("Loaded round {:?} from {:?}", round.round, path);
    Ok(round)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn round_title(round: &RoundData) -> String {
    match round.round {
        Some(id) => format!("Round {}", id),
        None => "Round".to_string(),
    }
}

fn format_selections(selections: &[u8; ARENA_COUNT]) -> String {
    selections
        .iter()
        .map(|&s| if s == 0 { "-".to_string() } else { s.to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

fn show_probabilities(path: &Path, renormalize: bool, json: bool) -> Result<()> {
    let round = load_round(path)?;
    let probabilities = if renormalize {
        round.probabilities().renormalized()
    } else {
        round.probabilities()
    };
    let arenas = Arenas::new(round.current());

    if json {
        let reports: Vec<ArenaReport> = arenas.iter().map(ArenaReport::from).collect();
        return print_json(&serde_json::json!({
            "arenas": reports,
            "probabilities": probabilities.rows(),
        }));
    }

    println!("{}", round_title(&round).cyan().bold());
    println!();
    println!(
        "{:<10} {:>7} {:>7} {:>9} {:>9} {:>9} {:>9}",
        "Arena", "Odds", "Ratio", "P1", "P2", "P3", "P4"
    );
    println!("{}", "-".repeat(68));

    for arena in arenas.iter() {
        let row = probabilities.rows()[arena.id];
        let line = format!(
            "{:<10} {:>7.3} {:>6.1}% {:>8.2}% {:>8.2}% {:>8.2}% {:>8.2}%",
            arena.name(),
            arena.odds,
            arena.ratio() * 100.0,
            row[0] * 100.0,
            row[1] * 100.0,
            row[2] * 100.0,
            row[3] * 100.0
        );
        if arena.is_positive() {
            println!("{}", line.green());
        } else {
            println!("{}", line);
        }
    }

    Ok(())
}

fn show_table(path: &Path, top: usize, by_probability: bool, json: bool) -> Result<()> {
    let round = load_round(path)?;
    let table = round.build_table();

    let mut rows: Vec<_> = table.iter().collect();
    if by_probability {
        rows.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    } else {
        rows.sort_by(|a, b| b.expected_ratio.total_cmp(&a.expected_ratio));
    }
    rows.truncate(top);

    if json {
        return print_json(&rows);
    }

    println!("{}", round_title(&round).cyan().bold());
    println!();
    println!(
        "{:>8} {:<11} {:>10} {:>8} {:>8} {:>10}",
        "Binary", "Bet", "Prob", "Odds", "ER", "Max bet"
    );
    println!("{}", "-".repeat(60));

    for entry in rows {
        println!(
            "{:>8} {:<11} {:>9.4}% {:>8} {:>8.3} {:>10}",
            format!("{:#07x}", entry.mask),
            format_selections(&entry.selections),
            entry.probability * 100.0,
            entry.odds,
            entry.expected_ratio,
            entry.max_stake
        );
    }

    Ok(())
}

fn analyze(bets_hash: &str, amounts_hash: Option<&str>, path: &Path, json: bool) -> Result<()> {
    let round = load_round(path)?;
    let table = round.build_table();
    let bets = Bets::from_hash(bets_hash, amounts_hash)
        .with_context(|| format!("Invalid bet set {:?}", bets_hash))?;

    print_bets_report(&round, &table, &bets, json)
}

fn generate(
    strategy: &Strategy,
    config: GeneratorConfig,
    seed: Option<u64>,
    path: &Path,
    json: bool,
) -> Result<()> {
    let round = load_round(path)?;
    let table = round.build_table();
    let generator = BetGenerator::new(&table, config);
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let bets = match strategy {
        Strategy::MaxTer => generator.max_ter(),
        Strategy::Gambit { bet } => generator.gambit(*bet),
        Strategy::BestGambit => generator.best_gambit(),
        Strategy::Tenbet { pirates } => generator.tenbet(*pirates),
        Strategy::Units { units } => generator.units(*units),
        Strategy::Bustproof => generator.bustproof(),
        Strategy::Crazy => generator.crazy(&mut rng),
        Strategy::Random => generator.random(&mut rng),
        Strategy::RandomGambit => generator.random_gambit(&mut rng),
    }
    .context("Failed to generate bets")?;

    print_bets_report(&round, &table, &bets, json)
}

fn print_bets_report(
    round: &RoundData,
    table: &CombinationTable,
    bets: &Bets,
    json: bool,
) -> Result<()> {
    let report = BetsReport::new(bets, table, round.winners())?;

    if json {
        return print_json(&report);
    }

    println!("{}", round_title(round).cyan().bold());
    println!();
    println!("{}: {}", "Bets hash".green(), report.bets_hash);
    if bets.amounts().is_some() {
        println!("{}: {}", "Amounts hash".green(), report.amounts_hash);
    }
    println!();

    println!(
        "{:>3} {:<11} {:>8} {:>9} {:>8} {:>10} {:>10}",
        "#", "Bet", "Odds", "Prob", "ER", "Amount", "Payout"
    );
    println!("{}", "-".repeat(65));
    for (i, bet) in report.bets.iter().enumerate() {
        let amount = bet.amount.map_or_else(|| "-".to_string(), |a| a.to_string());
        let payout = bet
            .sizing
            .as_ref()
            .map_or_else(|| "-".to_string(), |s| s.potential_winnings.to_string());
        println!(
            "{:>3} {:<11} {:>8} {:>8.3}% {:>8.3} {:>10} {:>10}",
            i + 1,
            format_selections(&bet.selections),
            bet.odds,
            bet.probability * 100.0,
            bet.expected_ratio,
            amount,
            payout
        );
    }
    println!();

    println!("{}", "Summary:".yellow().bold());
    println!("  TER:            {:.3}", report.expected_ratio);
    if bets.amounts().is_some() {
        println!("  Net expected:   {:.2}", report.net_expected);
    }
    println!("  Bust chance:    {:.3}%", report.bust_probability * 100.0);
    println!("  Best payout:    {} units", report.best_payout);
    if let Some(chance) = report.most_likely_winner {
        println!(
            "  Likely win:     {} units ({:.3}%)",
            chance.value,
            chance.probability * 100.0
        );
    }
    println!("  Partial rate:   {:.3}%", report.partial_rate * 100.0);

    let mut tags = Vec::new();
    if report.is_bustproof {
        tags.push("bustproof");
    }
    if report.is_guaranteed_win {
        tags.push("guaranteed win");
    }
    if report.is_gambit {
        tags.push("gambit");
    }
    if report.is_crazy {
        tags.push("crazy");
    }
    if !tags.is_empty() {
        println!("  Tags:           {}", tags.join(", ").magenta());
    }
    println!();

    println!("{}", "Payout chances:".yellow().bold());
    println!("{:>8} {:>10} {:>10} {:>10}", "Units", "Prob", "Cumul", "Tail");
    println!("{}", "-".repeat(42));
    for chance in &report.chances {
        println!(
            "{:>8} {:>9.3}% {:>9.3}% {:>9.3}%",
            chance.value,
            chance.probability * 100.0,
            chance.cumulative * 100.0,
            chance.tail * 100.0
        );
    }

    if let Some(result) = &report.result {
        println!();
        println!(
            "{}: {}",
            "Winners".green(),
            format_selections(&result.winners)
        );
        println!("  Units won:      {}", result.units);
        if bets.amounts().is_some() {
            println!("  NP won:         {}", result.np);
        }
    }

    Ok(())
}

fn decode(bets_hash: &str, amounts_hash: Option<&str>, json: bool) -> Result<()> {
    let selections = decode_bets(bets_hash)?;
    let amounts = amounts_hash.map(decode_amounts).transpose()?;

    if let Some(amounts) = &amounts {
        if amounts.len() < selections.len() {
            bail!(
                "Amounts hash holds {} amounts for {} bets",
                amounts.len(),
                selections.len()
            );
        }
    }

    if json {
        return print_json(&serde_json::json!({
            "bets": selections,
            "amounts": amounts,
        }));
    }

    println!("{}", "Decoded bets:".yellow().bold());
    println!(
        "{:>3} {:<10} {:<10} {:<10} {:<10} {:<10} {:>8}",
        "#", ARENA_NAMES[0], ARENA_NAMES[1], ARENA_NAMES[2], ARENA_NAMES[3], ARENA_NAMES[4], "Amount"
    );
    println!("{}", "-".repeat(70));
    for (i, bet) in selections.iter().enumerate() {
        let cells: Vec<String> = bet
            .iter()
            .map(|&s| if s == 0 { "-".to_string() } else { s.to_string() })
            .collect();
        let amount = amounts
            .as_ref()
            .and_then(|a| a[i])
            .map_or_else(|| "-".to_string(), |a| a.to_string());
        println!(
            "{:>3} {:<10} {:<10} {:<10} {:<10} {:<10} {:>8}",
            i + 1,
            cells[0],
            cells[1],
            cells[2],
            cells[3],
            cells[4],
            amount
        );
    }

    Ok(())
}
