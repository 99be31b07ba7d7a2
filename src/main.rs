use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use shorts_editor::feed::MemoryFeed;
use shorts_editor::state::data::{MediaSource, Quality};
use shorts_editor::state::draft::DraftStore;
use shorts_editor::state::edit::TrimEdge;
use shorts_editor::state::library::DraftLibrary;
use shorts_editor::state::overlay::{OverlayPatch, TextPatch};
use shorts_editor::upload::{self, UploadEvent};
use shorts_editor::{EditingSession, EditorConfig, Wizard};

#[derive(Parser, Debug)]
#[command(name = "shorts-editor", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Inspect or discard the saved draft.
    #[command(subcommand)]
    Draft(DraftCommand),
    /// Edit a clip and post it through the simulated upload.
    Post(PostArgs),
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Print the saved draft as JSON.
    Show,
    /// Delete the saved draft.
    Clear,
}

#[derive(Parser, Debug)]
struct PostArgs {
    /// Media reference (path or URI).
    #[arg(long)]
    media: String,

    /// MIME type of the media.
    #[arg(long, default_value = "video/mp4")]
    mime: String,

    /// Source duration in seconds.
    #[arg(long)]
    duration: f64,

    /// Caption; hashtags are picked out of it.
    #[arg(long)]
    caption: Option<String>,

    /// Output quality: SD, HD or 4K.
    #[arg(long, default_value = "HD")]
    quality: Quality,

    /// Start from the saved draft.
    #[arg(long, default_value_t = false)]
    resume: bool,

    /// Trim start in seconds.
    #[arg(long)]
    trim_start: Option<f64>,

    /// Trim end in seconds.
    #[arg(long)]
    trim_end: Option<f64>,

    /// Add a text overlay (repeatable).
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Save the draft before uploading, keeping it if the upload is cancelled.
    #[arg(long, default_value_t = false)]
    save_draft: bool,

    /// Save the draft and stop before uploading.
    #[arg(long, default_value_t = false)]
    draft_only: bool,
}

impl PostArgs {
    /// The draft slot is only written on request
    fn saves_draft(&self) -> bool {
        self.save_draft || self.draft_only
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EditorConfig::load();
    let mut library = DraftLibrary::open(&config).context("open draft database")?;

    match cli.cmd {
        Command::Draft(DraftCommand::Show) => cmd_draft_show(&library),
        Command::Draft(DraftCommand::Clear) => {
            EditingSession::clear_draft(&mut library)?;
            eprintln!("draft cleared");
            Ok(())
        }
        Command::Post(args) => cmd_post(args, config, &mut library).await,
    }
}

fn cmd_draft_show(library: &DraftLibrary) -> anyhow::Result<()> {
    let Some(draft) = library.load()? else {
        eprintln!("no saved draft in {}", library.path().display());
        return Ok(());
    };
    if let Some(saved_at) = library.saved_at()? {
        eprintln!("saved {}", saved_at.to_rfc3339());
    }
    println!("{}", serde_json::to_string_pretty(&draft)?);
    Ok(())
}

async fn cmd_post(args: PostArgs, config: EditorConfig, library: &mut DraftLibrary) -> anyhow::Result<()> {
    let media = MediaSource::from_file(&args.media, &args.mime)?;
    let mut wizard = Wizard::new(config.clone());
    wizard
        .acquire_media(media, args.duration, args.resume, &*library)
        .with_context(|| format!("open '{}'", args.media))?;

    if let Some(session) = wizard.session_mut() {
        apply_edits(session, &args);
    }
    if args.saves_draft() {
        wizard.save_draft(library)?;
    }

    if args.draft_only {
        eprintln!("draft saved to {}", library.path().display());
        return Ok(());
    }

    wizard.next()?;
    wizard.set_quality(args.quality)?;

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let (tx, mut rx) = mpsc::channel(32);
    let reporter = tokio::spawn(async move {
        while let Some(UploadEvent::Progress { percent, stage }) = rx.recv().await {
            eprintln!("{:>5.1}%  {}", percent, stage.label());
        }
    });

    let mut feed = MemoryFeed::new();
    let posted = upload::post(&mut wizard, &config, library, &mut feed, cancel, tx).await?;
    reporter.await?;

    match posted {
        Some(post) => println!("{}", serde_json::to_string_pretty(&post)?),
        None if args.saves_draft() => eprintln!("upload cancelled, draft kept"),
        None => eprintln!("upload cancelled"),
    }
    Ok(())
}

fn apply_edits(session: &mut EditingSession, args: &PostArgs) {
    if let Some(caption) = &args.caption {
        session.set_caption(caption.clone());
    }

    for (edge, time) in [(TrimEdge::Start, args.trim_start), (TrimEdge::End, args.trim_end)] {
        if let Some(time) = time {
            session.begin_trim(edge);
            if !session.set_trim(edge, time) {
                tracing::warn!(?edge, time, "trim request clamped or ignored");
            }
            session.end_trim();
        }
    }

    for text in &args.texts {
        let id = session.add_text_overlay();
        let patch = TextPatch {
            text: Some(text.clone()),
            ..TextPatch::default()
        };
        session.update_overlay(&id, OverlayPatch::Text(patch));
        session.commit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post_args(extra: &[&str]) -> PostArgs {
        let base = ["shorts-editor", "post", "--media", "clip.mp4", "--duration", "8"];
        let cli = Cli::try_parse_from(base.iter().chain(extra).copied()).unwrap();
        match cli.cmd {
            Command::Post(args) => args,
            other => panic!("expected post, got {other:?}"),
        }
    }

    #[test]
    fn test_post_leaves_draft_slot_alone_by_default() {
        assert!(!post_args(&[]).saves_draft());
        assert!(post_args(&["--save-draft"]).saves_draft());
        assert!(post_args(&["--draft-only"]).saves_draft());
    }

    #[test]
    fn test_post_flags() {
        let args = post_args(&["--quality", "4K", "--text", "a", "--text", "b", "--trim-end", "5"]);
        assert_eq!(args.quality, Quality::Uhd4k);
        assert_eq!(args.texts, vec!["a", "b"]);
        assert_eq!(args.trim_end, Some(5.0));
        assert_eq!(args.mime, "video/mp4");
    }
}
