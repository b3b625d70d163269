//! Command-line client for SyncTube rooms.
//!
//! Run with:
//! ```not_rust
//! synctube <ROOM_OR_URL> queue <YOUTUBE_URL> [--random]
//! synctube <ROOM_OR_URL> clear
//! synctube <ROOM_OR_URL> top
//! ```
//!
//! Settings are read from the environment (and a `.env` file if present);
//! `YT_API_KEY` is required to queue playlists.

use std::io::{self, BufRead, Write};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use synctube_rs::{PlaylistSnapshot, SyncTubeClient, SyncTubeError, YoutubeApi, SETTINGS};

#[derive(Parser, Debug)]
#[command(name = "synctube")]
#[command(about = "Queue YouTube videos and playlists into a SyncTube room", long_about = None)]
struct Args {
    /// SyncTube room id or full room URL
    room: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Queue a YouTube video or the first 50 videos of a playlist
    Queue {
        /// YouTube watch or playlist URL
        url: String,

        /// Shuffle playlist videos before queueing
        #[arg(short, long)]
        random: bool,
    },
    /// Remove every video from the room's playlist
    Clear,
    /// Pick a video from the room's playlist and move it to the top
    Top,
}

/// Initialize the tracing subscriber; `RUST_LOG` overrides the default level.
fn setup_logger(default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "{}={},{}={}",
                    env!("CARGO_PKG_NAME").replace('-', "_"),
                    default_log_level,
                    env!("CARGO_BIN_NAME"),
                    default_log_level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Print the playlist and read a 1-based selection from stdin.
///
/// The read happens on the blocking pool so Ctrl+C is still handled while the
/// operator is at the prompt.
async fn prompt_selection(snapshot: PlaylistSnapshot) -> Result<i64, SyncTubeError> {
    println!("Current playlist:");
    for (i, video) in snapshot.iter().enumerate() {
        println!("{:>3}. {} ({})", i + 1, video.title, video.author);
    }
    print!("Video to move to the top [1-{}]: ", snapshot.len());
    io::stdout().flush()?;

    let line = tokio::task::spawn_blocking(|| {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line).map(|_| line)
    })
    .await??;

    line.trim()
        .parse::<i64>()
        .map_err(|_| SyncTubeError::InvalidSelection {
            selection: 0,
            len: snapshot.len(),
        })
}

async fn run(args: Args) -> Result<(), SyncTubeError> {
    let settings = SETTINGS.clone();
    let client = SyncTubeClient::new(&args.room, settings)?;

    match args.command {
        Command::Queue { url, random } => {
            // required for every queue command, even single videos
            let api_key = client.settings().youtube_api_key.clone().ok_or_else(|| {
                SyncTubeError::Config(
                    "YT_API_KEY is not set; see the README for how to obtain a key".to_string(),
                )
            })?;
            let youtube = YoutubeApi::new(
                client.http_client().clone(),
                &client.settings().youtube_api_url,
                &api_key,
            );
            let queued = client.queue(&youtube, &url, random).await?;
            println!("Queued {} video(s) into room {}", queued, client.room_id());
        }
        Command::Clear => {
            let removed = client.clear().await?;
            println!("Removed {} video(s) from room {}", removed, client.room_id());
        }
        Command::Top => {
            let video = client.move_to_top(prompt_selection).await?;
            println!("Moved '{}' to the top of the playlist", video.title);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    setup_logger("info");

    let args = Args::parse();

    // Dropping the unfinished command on Ctrl+C drops its room connection too
    let finished = tokio::select! {
        res = run(args) => Some(res),
        _ = tokio::signal::ctrl_c() => None,
    };

    let Some(result) = finished else {
        tracing::warn!("Interrupted");
        std::process::exit(130);
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_user_error() { 2 } else { 1 });
    }
}
