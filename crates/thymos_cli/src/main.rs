use clap::Parser;
use std::io::{self, Write};
use std::sync::Arc;
use thymos_core::{dialogue, KeywordClassifier, ThymosConfig};
use thymos_limbic::{ActivitySelector, ShuffleRanker};
use thymos_memory::store;
use thymos_places::GoogleMapsClient;
use thymos_reasoning::OpenAiClient;
use thymos_session::{ConversationSession, FeedbackSignal, SessionOptions};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, default_value = "thymos.toml")]
    config: String,

    /// Path to the learned model snapshot (overrides config)
    #[arg(long)]
    model_path: Option<String>,

    /// Starting location name
    #[arg(short, long, default_value = "New York")]
    location: String,

    /// Seed for category selection and ranking, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Run with mock providers; no credentials needed
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let config = ThymosConfig::load_or_default(&args.config);
    // Missing credentials are fatal here and only here, before any session.
    ThymosConfig::ensure_credentials(args.offline)?;

    let model_path = args
        .model_path
        .clone()
        .unwrap_or_else(|| config.session.model_path.clone());
    let model = store::load_or_default(&model_path);

    let mut places = GoogleMapsClient::new(config.places.max_results)?;
    let mut llm = OpenAiClient::new(&config.llm.model)?;
    if let Some(base_url) = &config.llm.base_url {
        llm = llm.with_base_url(base_url);
    }
    if args.offline {
        info!("Running offline with mock providers");
        places = places.with_api_key("mock");
        llm = llm.with_api_key("mock");
    }

    let (selector, ranker) = match args.seed {
        Some(seed) => (
            ActivitySelector::with_seed(seed),
            ShuffleRanker::with_seed(seed.wrapping_add(1)),
        ),
        None => (ActivitySelector::new(), ShuffleRanker::new()),
    };

    let mut session = ConversationSession::new(
        args.location.clone(),
        Box::new(KeywordClassifier),
        selector,
        Box::new(ranker),
        Arc::new(places),
        Arc::new(llm),
        model,
        SessionOptions::from(&config),
    );

    info!("Resolving starting location: {}", args.location);
    session.set_location(&args.location).await;

    println!("thymos: {}", dialogue::GREETING);
    println!(
        "Commands: 'good'/'bad' rate the last reply, 'recommend' asks for an activity, \
         'best' shows the learned favorite, 'location <name>', 'clear', 'quit'."
    );
    print!("> ");
    io::stdout().flush()?;

    let stdin = io::stdin();
    let mut input = String::new();

    loop {
        input.clear();
        if stdin.read_line(&mut input)? == 0 {
            break;
        }
        let trimmed = input.trim();

        if trimmed.is_empty() {
            print!("> ");
            io::stdout().flush()?;
            continue;
        }

        match trimmed {
            "quit" | "exit" => break,
            "clear" => {
                session.clear();
                println!("Conversation cleared. {}", dialogue::GREETING);
            }
            "good" | "bad" => {
                let turn_index = session.state().history.len().saturating_sub(1);
                let signal = if trimmed == "good" {
                    FeedbackSignal::positive(turn_index)
                } else {
                    FeedbackSignal::negative(turn_index)
                };
                if session.apply_feedback(signal) {
                    println!("Thanks, noted.");
                } else {
                    println!("Nothing to rate yet; chat with me first.");
                }
            }
            "recommend" => {
                let text = session.recommend_via_dialogue().await;
                println!("\nthymos: {}\n", text);
            }
            "best" => match session.best_known_category() {
                Some(category) => println!("Best-known pick for your current mood: {}", category),
                None => println!("No learned preference for this state yet."),
            },
            _ => {
                if let Some(name) = trimmed.strip_prefix("location ") {
                    session.set_location(name.trim()).await;
                    println!("Location set to {}.", name.trim());
                } else {
                    let outcome = session.handle_message(trimmed).await;
                    println!("\nthymos: {}\n", outcome.reply);
                    if outcome.new_recommendations {
                        println!("Nearby ideas for you:");
                        for place in &session.state().recommended_places {
                            if let (Some(lat), Some(lng)) = (place.lat, place.lng) {
                                println!("- {} ({}) at {:.4},{:.4}", place.name, place.address, lat, lng);
                            } else {
                                println!("- {} ({})", place.name, place.address);
                            }
                        }
                        println!();
                    }
                }
            }
        }

        print!("> ");
        io::stdout().flush()?;
    }

    if let Err(e) = store::save(session.model(), &model_path) {
        warn!("Failed to save model snapshot: {}", e);
    } else {
        info!("Model snapshot saved to {}", model_path);
    }

    Ok(())
}
