use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use clap::Parser;
use stylish_qr::{
    Actions, Configurable, LogNotifier, Platform, QrSession, Settings, ShareOutcome, SourceLoader,
    SystemClipboard, Theme,
};

#[derive(Parser)]
#[command(name = "stylish-qr")]
#[command(about = "Render text or a URL as a QR code over a themed background", long_about = None)]
struct Cli {
    /// Text or URL to encode
    text: String,

    /// Background theme: anime or cartoon
    #[arg(long, short = 't')]
    theme: Option<Theme>,

    /// Background: 1-based position within the theme, or one of its URLs
    #[arg(long, short = 'b')]
    background: Option<String>,

    /// JSON settings file; flags override its values
    #[arg(long, short = 's')]
    settings: Option<PathBuf>,

    /// Side length of the output image in pixels
    #[arg(long)]
    size: Option<u32>,

    /// Directory the PNG is written to
    #[arg(long, short = 'o', default_value = ".")]
    out: PathBuf,

    /// Also share the image (falls back to copying the text)
    #[arg(long)]
    share: bool,

    /// Also copy the text to the clipboard
    #[arg(long)]
    copy: bool,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_settings: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            log::error!("failed to start runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn build_session(cli: &Cli) -> Result<QrSession> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    if let Some(theme) = cli.theme {
        settings = settings.with_theme(theme);
        settings.background = None;
    }
    if let Some(size) = cli.size {
        settings = settings.with_display_size(size);
    }

    let mut session = QrSession::from_settings(&settings)?;
    if let Some(background) = &cli.background {
        match background.parse::<usize>() {
            Ok(position) => select_position(&mut session, position)?,
            Err(_) => session.select_background(background)?,
        }
    }

    session.input.set_draft(cli.text.as_str());
    if !session.input.commit() {
        anyhow::bail!("nothing to encode: the text is blank");
    }
    Ok(session)
}

/// Selects a background by its 1-based position within the active theme.
fn select_position(session: &mut QrSession, position: usize) -> Result<()> {
    let selected = match position.checked_sub(1) {
        Some(index) => session.select_background_at(index).is_ok(),
        None => false,
    };
    if !selected {
        anyhow::bail!("no background #{position} in the {} theme", session.theme());
    }
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let session = build_session(&cli)?;
    if cli.print_settings {
        println!("{}", session.export_settings().to_json()?);
        return Ok(());
    }

    let platform = Platform::new(Arc::new(SystemClipboard), Arc::new(LogNotifier));
    let actions = Actions::new(Arc::new(SourceLoader::new()), platform);

    let artifact = actions.download(&session).await?;
    let path = artifact
        .save_in(&cli.out)
        .with_context(|| format!("cannot write into {}", cli.out.display()))?;
    println!("{}", path.display());

    if cli.share {
        match actions.share(&session).await? {
            ShareOutcome::Shared => log::info!("shared {}", session.share_file_name()),
            ShareOutcome::CopiedToClipboard => log::info!("no share target; text copied instead"),
        }
    }
    if cli.copy {
        actions.copy_link(&session).await?;
    }
    Ok(())
}
