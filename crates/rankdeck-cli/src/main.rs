use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::Rng;
use rand::seq::SliceRandom;

use rankdeck_application::PlayService;
use rankdeck_core::card::CardRef;
use rankdeck_core::config::EngineConfig;
use rankdeck_core::session::SwipeDirection;
use rankdeck_infrastructure::{MemoryCardCatalog, MemoryRatingStore, MemorySessionStore};

const TENANT: &str = "demo";

#[derive(Parser)]
#[command(name = "rankdeck")]
#[command(about = "Rankdeck - swipe-and-compare ranking engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one scripted session and print the resulting ranking
    Demo {
        /// Restrict the deck to cards carrying this tag
        #[arg(long)]
        tag: Option<String>,
    },
    /// Run many randomized sessions and print the global leaderboard
    Simulate {
        /// Number of sessions to play
        #[arg(long, default_value_t = 25)]
        sessions: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { tag } => demo(tag.as_deref()).await,
        Commands::Simulate { sessions } => simulate(sessions).await,
    }
}

fn fixture_cards() -> Vec<CardRef> {
    vec![
        CardRef::new("espresso", "Espresso").with_tag("coffee"),
        CardRef::new("cappuccino", "Cappuccino").with_tag("coffee"),
        CardRef::new("cold-brew", "Cold Brew").with_tag("coffee"),
        CardRef::new("flat-white", "Flat White").with_tag("coffee"),
        CardRef::new("moka-pot", "Moka Pot").with_tag("coffee"),
        CardRef::new("sencha", "Sencha").with_tag("tea"),
        CardRef::new("earl-grey", "Earl Grey").with_tag("tea"),
        CardRef::new("oolong", "Oolong").with_tag("tea"),
    ]
}

async fn new_service() -> PlayService {
    let catalog = Arc::new(MemoryCardCatalog::new());
    catalog.seed(TENANT, fixture_cards()).await;
    PlayService::new(
        Arc::new(MemorySessionStore::new()),
        catalog,
        Arc::new(MemoryRatingStore::new()),
        EngineConfig::default(),
    )
}

/// Plays one session to completion, deciding swipes and votes with `judge`
/// (higher score wins, negative scores are swiped left).
async fn play_session(
    service: &PlayService,
    tag: Option<&str>,
    judge: impl Fn(&str) -> i64,
    verbose: bool,
) -> Result<String> {
    let started = service.start_session(TENANT, tag, None).await?;
    let mut version = started.version;

    for card in &started.deck {
        let direction = if judge(card) >= 0 {
            SwipeDirection::Right
        } else {
            SwipeDirection::Left
        };
        if verbose {
            let arrow = match direction {
                SwipeDirection::Right => "accept".green(),
                SwipeDirection::Left => "discard".red(),
            };
            println!("  swipe {:<12} {}", card, arrow);
        }
        let outcome = service
            .submit_swipe(TENANT, &started.session_id, card, direction, version)
            .await?;
        version = outcome.version;

        let mut comparison = outcome.comparison;
        while let Some(pair) = comparison {
            let winner = if judge(&pair.card_a) >= judge(&pair.card_b) {
                pair.card_a.clone()
            } else {
                pair.card_b.clone()
            };
            if verbose {
                println!(
                    "    vote {} vs {} -> {}",
                    pair.card_a,
                    pair.card_b,
                    winner.bold()
                );
            }
            let outcome = service
                .submit_vote(TENANT, &started.session_id, &winner, version)
                .await?;
            version = outcome.version;
            comparison = outcome.next_comparison;
        }
    }

    Ok(started.session_id)
}

async fn demo(tag: Option<&str>) -> Result<()> {
    let service = new_service().await;

    println!("{}", "Playing a scripted session...".bold());
    // Fixed taste profile: the judge scores every card deterministically.
    let taste = |card: &str| -> i64 {
        match card {
            "espresso" => 90,
            "flat-white" => 80,
            "cappuccino" => 70,
            "moka-pot" => 40,
            "cold-brew" => 10,
            "sencha" => 60,
            "oolong" => 30,
            _ => -1,
        }
    };
    let session_id = play_session(&service, tag, taste, true).await?;

    let results = service.results(TENANT, &session_id).await?;
    println!();
    println!("{}", "Personal ranking".bold().underline());
    for entry in &results.ranking {
        println!("  {:>2}. {}", entry.rank, entry.card_id);
    }
    println!(
        "  ({} swipes, {} votes)",
        results.statistics.total_swipes, results.statistics.total_votes
    );

    print_leaderboard(&service).await
}

async fn simulate(sessions: usize) -> Result<()> {
    let service = new_service().await;
    println!(
        "{}",
        format!("Simulating {sessions} randomized sessions...").bold()
    );

    for i in 0..sessions {
        // Each simulated player gets their own random taste profile.
        let mut scores: Vec<i64> = Vec::new();
        {
            let mut rng = rand::thread_rng();
            for _ in 0..64 {
                scores.push(rng.gen_range(-20..100));
            }
            scores.shuffle(&mut rng);
        }
        let judge = move |card: &str| -> i64 {
            let index = card.bytes().map(u64::from).sum::<u64>() as usize % scores.len();
            scores[index]
        };
        play_session(&service, None, judge, false).await?;
        if (i + 1) % 10 == 0 {
            println!("  {} sessions played", i + 1);
        }
    }

    print_leaderboard(&service).await
}

async fn print_leaderboard(service: &PlayService) -> Result<()> {
    let board = service.leaderboard(TENANT, 10).await?;
    println!();
    println!("{}", "Global leaderboard".bold().underline());
    println!(
        "  {:<14} {:>6} {:>5} {:>7} {:>9}",
        "card", "rating", "games", "win%", "weighted"
    );
    for rating in board {
        println!(
            "  {:<14} {:>6.0} {:>5} {:>6.0}% {:>9.0}",
            rating.card_id,
            rating.rating,
            rating.total_games,
            rating.win_rate * 100.0,
            rating.weighted_score()
        );
    }
    Ok(())
}
