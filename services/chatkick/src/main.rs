use anyhow::{Context, Result};
use chatkick_core::voice::duplicate_voice_ids;
use chatkick_core::{
    ChatController, ElevenLabsSynthesizer, GeminiGenerator, SpeechSynthesizer, TextGenerator,
};
use chatkick_service::app::{App, Flow, Shutdown, run_until_interrupted};
use chatkick_service::command;
use chatkick_service::config::Config;
use chatkick_service::player::{self, AudioPlayer, CommandPlayer};
use chatkick_service::render::{self, APP_TITLE};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::fmt::time::ChronoLocal;

/// Terminal chat with Gemini replies and ElevenLabs voices.
///
/// All settings come from the environment or a `.env` file: GEMINI_API,
/// ELEVENLABS_API, GEMINI_MODEL, AUDIO_OUTPUT_PATH, AUDIO_PLAYER,
/// HTTP_TIMEOUT_SECS and RUST_LOG.
#[derive(Parser)]
#[command(name = "chatkick", version)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start the async runtime")?;
    let result = runtime.block_on(run());
    // A pending stdin read holds a runtime thread and cannot be cancelled.
    runtime.shutdown_background();
    result
}

async fn run() -> Result<()> {
    // --- 1. Load Configuration ---
    let mut config = Config::from_env().context("Failed to load application configuration")?;

    // --- 2. Initialize Logging ---
    // Logs go to stderr so they never interleave with the rendered transcript.
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(ChronoLocal::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Configuration loaded successfully. Starting {}...", APP_TITLE);
    for (voice_id, names) in duplicate_voice_ids() {
        tracing::warn!(voice_id, "Voice catalog entries share an identifier: {}", names.join(", "));
    }
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API is not set; sending a message will fail");
    }
    if config.elevenlabs_api_key.is_none() {
        tracing::warn!("ELEVENLABS_API is not set; voice generation will fail");
    }

    // --- 3. Initialize API Clients ---
    let http = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let generator = GeminiGenerator::new(http.clone(), config.gemini_api_key.take())
        .with_model(&config.gemini_model)
        .with_base_url(&config.gemini_base_url);
    let synthesizer = ElevenLabsSynthesizer::new(http, config.elevenlabs_api_key.take())
        .with_base_url(&config.elevenlabs_base_url)
        .with_output_path(config.audio_output_path.clone());
    tracing::info!(model = generator.model(), audio = %synthesizer.output_path().display(), "Clients ready");

    let player: Box<dyn AudioPlayer> = match config.audio_player.as_deref() {
        Some(command_line) => Box::new(
            CommandPlayer::from_command_line(command_line).context("Invalid AUDIO_PLAYER")?,
        ),
        None => player::default_player(),
    };

    let mut app = App::new(ChatController::new(generator, synthesizer), player);
    tracing::debug!(voice = app.selected_voice().name, "Default voice selected");

    // --- 4. Action Loop ---
    // Ctrl-C is raced against the whole session so it also cancels in-flight requests.
    let shutdown = run_until_interrupted(run_session(&mut app), tokio::signal::ctrl_c()).await?;
    if shutdown == Shutdown::Interrupted {
        tracing::info!("Received Ctrl-C, shutting down...");
    }

    tracing::info!("Shutting down...");
    Ok(())
}

async fn run_session<G, S>(app: &mut App<G, S>) -> Result<()>
where
    G: TextGenerator,
    S: SpeechSynthesizer,
{
    let mut stdout = std::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    render::render_notice(command::HELP, &mut stdout)?;
    app.render(&mut stdout)?;

    loop {
        render::render_prompt(&mut stdout)?;
        // EOF ends the session like /quit.
        let Some(line) = lines.next_line().await.context("Failed to read from stdin")? else {
            break;
        };

        let action = match command::parse(&line) {
            Ok(action) => action,
            Err(e) => {
                render::render_error(&e, &mut stdout)?;
                continue;
            }
        };

        if app.apply(action, &mut stdout).await? == Flow::Quit {
            break;
        }
    }
    Ok(())
}
