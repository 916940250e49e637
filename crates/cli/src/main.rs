//! `framenote` command line.
//!
//! Timecode conversions plus read-only views over exported asset snapshots
//! (the JSON written by `ReviewStore::snapshot`).
//!
//! ```bash
//! framenote timecode 45000 --fps 24
//! framenote comments review.json --status active --search audio --sort priority
//! framenote comments review.json --at 45000
//! framenote diff review.json --from 0
//! ```

mod demo;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use framenote_core::comment::Comment;
use framenote_core::query::{self, CommentQuery, CommentStats, SortKey, StatusFilter};
use framenote_core::revision;
use framenote_core::timecode::{self, FrameRate};
use framenote_core::ReviewConfig;
use framenote_store::AssetSnapshot;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "framenote", version, about = "Frame-accurate media review tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a timeline position to frame index and SMPTE timecode
    Timecode {
        /// Position in milliseconds
        ms: i64,
        /// Frame rate, e.g. 24, 29.97 or 30000/1001
        #[arg(long, default_value = "24")]
        fps: FrameRate,
    },

    /// Parse an `HH:MM:SS:FF` timecode
    Parse {
        timecode: String,
        #[arg(long, default_value = "24")]
        fps: FrameRate,
    },

    /// List the comments of a snapshot as a reviewer sees them
    Comments {
        snapshot: PathBuf,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        /// Case-insensitive text to look for in comment content
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "timestamp")]
        sort: SortKey,
        /// Only comments near this playhead position (ms)
        #[arg(long, value_name = "MS")]
        at: Option<i64>,
    },

    /// Counts of comments, sessions and revisions in a snapshot
    Summary { snapshot: PathBuf },

    /// Compare two revisions of a snapshot
    Diff {
        snapshot: PathBuf,
        #[arg(long)]
        from: u32,
        /// Defaults to the latest revision
        #[arg(long)]
        to: Option<u32>,
    },

    /// Run a scripted review in memory and print its snapshot as JSON
    Demo,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output stays pipeable.
    let json_logs = std::env::var("FRAMENOTE_LOG_FORMAT").is_ok_and(|v| v == "json");
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "framenote=info".into()),
        )
        .with(json_logs.then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with((!json_logs).then(|| fmt::layer().with_writer(std::io::stderr)))
        .init();

    let cli = Cli::parse();
    let config = ReviewConfig::from_env().context("Invalid FRAMENOTE_* configuration")?;

    match cli.command {
        Command::Timecode { ms, fps } => {
            let frame = timecode::to_frame_number(ms, fps)?;
            let smpte = timecode::to_smpte(ms, fps)?;
            println!("{smpte}  frame {frame}  ({} fps)", fps);
        }
        Command::Parse { timecode: tc, fps } => {
            let ms = timecode::from_smpte(&tc, fps)?;
            println!("{ms} ms  frame {}", timecode::to_frame_number(ms, fps)?);
        }
        Command::Comments {
            snapshot,
            status,
            search,
            sort,
            at,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let view = CommentQuery {
                status,
                search,
                sort,
            }
            .apply(&snapshot.comments);
            let view = match at {
                Some(current_ms) => {
                    query::near_playhead(&view, current_ms, config.near_playhead_window_ms)
                }
                None => view,
            };
            tracing::debug!(shown = view.len(), total = snapshot.comments.len(), "Comments listed");
            for comment in &view {
                println!("{}", comment_line(comment, snapshot.asset.frame_rate)?);
            }
        }
        Command::Summary { snapshot } => {
            let snapshot = load_snapshot(&snapshot)?;
            print_summary(&snapshot);
        }
        Command::Diff { snapshot, from, to } => {
            let snapshot = load_snapshot(&snapshot)?;
            print_diff(&snapshot, from, to)?;
        }
        Command::Demo => {
            let snapshot = demo::run(config)?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
    }

    Ok(())
}

fn load_snapshot(path: &Path) -> Result<AssetSnapshot> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
    let snapshot: AssetSnapshot = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid asset snapshot", path.display()))?;
    tracing::debug!(asset_id = %snapshot.asset.id, comments = snapshot.comments.len(), "Snapshot loaded");
    Ok(snapshot)
}

/// One listing line: timecode, frame, status, priority, author and text.
fn comment_line(comment: &Comment, frame_rate: FrameRate) -> Result<String> {
    let marker = if comment.is_reply() { "  > " } else { "" };
    Ok(format!(
        "{}  f{:<6} {:<8} {:<9} {marker}{}: {}",
        comment.timecode(frame_rate)?,
        comment.frame_number(),
        comment.status().as_str(),
        comment.priority.as_str(),
        comment.author_id,
        comment.content,
    ))
}

fn print_summary(snapshot: &AssetSnapshot) {
    let asset = &snapshot.asset;
    let stats = CommentStats::compute(&snapshot.comments);
    println!(
        "{} (v{}, {}, {} fps, {}x{})",
        asset.title,
        asset.version,
        timecode::format_duration(asset.duration_ms),
        asset.frame_rate,
        asset.width,
        asset.height,
    );
    println!(
        "comments: {} total, {} active, {} resolved, {} critical, {} replies",
        stats.total, stats.active, stats.resolved, stats.critical, stats.replies
    );
    for session in &snapshot.sessions {
        println!(
            "session '{}': {} ({}/{} approvals)",
            session.title,
            session.status().as_str(),
            session.approval_count(),
            session.required_approvers(),
        );
    }
    for rev in &snapshot.revisions {
        println!(
            "revision {} by {} at {}{}",
            rev.version,
            rev.uploaded_by,
            rev.uploaded_at.format("%Y-%m-%d %H:%M"),
            rev.notes.as_deref().map(|n| format!(": {n}")).unwrap_or_default(),
        );
    }
}

fn print_diff(snapshot: &AssetSnapshot, from: u32, to: Option<u32>) -> Result<()> {
    let find = |version: u32| snapshot.revisions.iter().find(|r| r.version == version);
    let Some(a) = find(from) else {
        bail!("Revision {from} is not in the snapshot");
    };
    let b = match to {
        Some(version) => match find(version) {
            Some(rev) => rev,
            None => bail!("Revision {version} is not in the snapshot"),
        },
        None => snapshot
            .revisions
            .iter()
            .max_by_key(|r| r.version)
            .context("Snapshot has no revisions")?,
    };

    let resolved = revision::resolved_between(&snapshot.comments, a, b);
    let diff = revision::compare(a, b, resolved);
    println!("v{} -> v{}", diff.from_version, diff.to_version);
    if let Some(change) = diff.duration_ms {
        println!(
            "duration: {} -> {} ({:+} ms)",
            timecode::format_duration(change.from),
            timecode::format_duration(change.to),
            diff.duration_delta_ms(),
        );
    }
    if let Some(change) = diff.resolution {
        println!("resolution: {} -> {}", change.from, change.to);
    }
    if let Some(change) = diff.frame_rate {
        println!("frame rate: {} -> {} fps", change.from, change.to);
    }
    if !diff.has_metadata_changes() {
        println!("no metadata changes");
    }
    println!("resolved in between: {}", diff.resolved_comment_ids.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use framenote_core::comment::{add_reply, create_comment, NewComment, Priority};
    use framenote_core::media::{MediaAsset, MediaSpec, NewMediaAsset};

    fn asset() -> MediaAsset {
        MediaAsset::new(NewMediaAsset {
            owner_id: "owner".into(),
            title: "Demo".into(),
            description: None,
            media: MediaSpec {
                source: "media://demo.mp4".into(),
                duration_ms: 60_000,
                frame_rate: FrameRate::FPS_24,
                width: 1280,
                height: 720,
            },
            allow_comments: true,
            allow_downloads: false,
        })
        .unwrap()
    }

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_comment_filters() {
        let cli = Cli::try_parse_from([
            "framenote", "comments", "review.json", "--status", "active", "--sort", "priority",
            "--at", "45000",
        ])
        .unwrap();
        match cli.command {
            Command::Comments { status, sort, at, .. } => {
                assert_eq!(status, StatusFilter::Active);
                assert_eq!(sort, SortKey::Priority);
                assert_eq!(at, Some(45_000));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_sort_key() {
        assert!(Cli::try_parse_from(["framenote", "comments", "r.json", "--sort", "size"]).is_err());
    }

    #[test]
    fn comment_line_shows_timecode_and_frame() {
        let asset = asset();
        let comment = create_comment(
            &asset,
            NewComment::new("u1", 45_000, "Logo flickers").with_priority(Priority::Critical),
        )
        .unwrap();
        let line = comment_line(&comment, asset.frame_rate).unwrap();
        assert!(line.starts_with("00:00:45:00  f1080"));
        assert!(line.contains("critical"));
        assert!(line.ends_with("u1: Logo flickers"));

        let reply = add_reply(&comment, "u2", "On it").unwrap();
        assert!(comment_line(&reply, asset.frame_rate).unwrap().contains("  > u2: On it"));
    }
}
