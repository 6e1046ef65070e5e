use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "moviedex-server")]
#[command(about = "Movie discovery API backed by TMDB and OMDb", long_about = None)]
struct Args {
    #[arg(short, long, default_value = "moviedex.yaml")]
    config: String,
    /// Log at debug level, including every upstream request.
    #[arg(short, long)]
    debug: bool,
    /// Emit logs as JSON lines.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let default_filter = if args.debug {
        "moviedex=debug,tower_http=debug"
    } else {
        "moviedex=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(args.json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!args.json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    if let Err(e) = moviedex::run(&args.config, args.debug).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
