use std::env;

use tracing_subscriber::EnvFilter;

use triage_core::config::Config;
use triage_pipeline::{spawn_init, PipelineConfig};

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().collect();
    let prog = args.remove(0);
    if args.is_empty() {
        eprintln!("Usage: {prog} <analyze|recommend|add|stats|rebuild> [args...]");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;
    let (cmd, args) = parse_args();

    // All components are built here and injected into the pipeline; the
    // build runs in the background so a serving frontend could answer
    // degraded requests meanwhile. The CLI just waits for it.
    let handle = spawn_init(PipelineConfig::from_config(&config));

    match cmd.as_str() {
        "analyze" => {
            let text = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: triage analyze \"<ticket text>\"");
                std::process::exit(1)
            });
            let pipeline = handle.wait_ready().await?;
            let analysis = pipeline.analyze(&text)?;
            println!("{}", serde_json::to_string_pretty(&analysis)?);
        }
        "recommend" => {
            let query = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: triage recommend \"<query>\" [k]");
                std::process::exit(1)
            });
            let k = args
                .get(1)
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(3);
            let pipeline = handle.wait_ready().await?;
            let recommendations = pipeline.engine().recommend(&query, k)?;
            if recommendations.is_empty() {
                println!("No recommendations.");
            }
            for rec in recommendations {
                println!(
                    "{:>2}. [{:.3}] (doc {}) {}",
                    rec.rank, rec.similarity_score, rec.document_id, rec.answer
                );
            }
        }
        "add" => {
            let answer = args.first().cloned().unwrap_or_else(|| {
                eprintln!("Usage: triage add \"<answer>\" [\"<body>\"]");
                std::process::exit(1)
            });
            let body = args.get(1).cloned().unwrap_or_default();
            let pipeline = handle.wait_ready().await?;
            let id = pipeline.engine().index().add_document(&answer, &body)?;
            println!("Added document {id}");
        }
        "stats" => {
            let pipeline = handle.wait_ready().await?;
            let stats = pipeline.engine().index().stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        "rebuild" => {
            let pipeline = handle.wait_ready().await?;
            pipeline.engine().rebuild_index()?;
            let stats = pipeline.engine().index().stats();
            println!(
                "Index ready: {} vectors (dimension {}) at {}",
                stats.vector_count, stats.dimension, stats.index_path
            );
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!("Usage: triage <analyze|recommend|add|stats|rebuild> [args...]");
            std::process::exit(1);
        }
    }

    Ok(())
}
