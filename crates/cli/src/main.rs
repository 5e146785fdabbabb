//! `canvas` -- edit images with generative AI from the terminal.
//!
//! Projects are stored as JSON under the data directory; AI commands
//! (`edit`, `suggest`, `coach`) call the Gemini API.
//!
//! # Environment variables
//!
//! | Variable              | Required      | Default                                     |
//! |-----------------------|---------------|---------------------------------------------|
//! | `GEMINI_API_KEY`      | AI commands   | falls back to `API_KEY`                     |
//! | `GEMINI_API_URL`      | no            | `https://generativelanguage.googleapis.com` |
//! | `GEMINI_IMAGE_MODEL`  | no            | `gemini-2.5-flash-image`                    |
//! | `GEMINI_TEXT_MODEL`   | no            | `gemini-2.5-flash`                          |
//! | `GEMINI_TIMEOUT_SECS` | no            | `120`                                       |
//! | `CANVAS_DATA_DIR`     | no            | platform data dir + `canvas-ai`             |

use std::io::Write;

use canvas_cli::commands::{self, Cli, Context};
use canvas_cli::config::CliConfig;
use canvas_db::FileStore;
use canvas_gemini::{AiGateway, GeminiConfig, GeminiGateway};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "canvas_cli=info,canvas_editor=info,canvas_gemini=info,canvas_db=info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = CliConfig::from_env();

    tracing::debug!(data_dir = %config.data_dir.display(), "Using project store");

    let ctx = Context::new(Box::new(FileStore::new(config.data_dir.clone())), build_gateway());

    let mut stdout = std::io::stdout().lock();
    commands::run(cli.command, &ctx, &mut stdout).await?;
    stdout.flush()?;
    Ok(())
}

/// Gemini gateway from the environment. Errors are kept and reported only
/// by commands that need the API.
fn build_gateway() -> anyhow::Result<Box<dyn AiGateway>> {
    let config = GeminiConfig::from_env()?;
    let gateway = GeminiGateway::from_config(&config)?;
    tracing::debug!(
        image_model = %config.image_model,
        text_model = %config.text_model,
        "Gemini gateway configured"
    );
    Ok(Box::new(gateway))
}
