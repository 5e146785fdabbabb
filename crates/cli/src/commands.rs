//! Subcommands and their handlers.
//!
//! Each handler loads what it needs from the project store, drives an
//! [`EditorSession`] or [`CoachConversation`], and prints a short report.
//! Output goes to a caller-supplied writer so tests can capture it.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _};
use canvas_core::actions::CreativeAction;
use canvas_core::error::CoreError;
use canvas_core::export::{render_png, validate_preset_height, HEIGHT_FULL_HD};
use canvas_core::image::{data_url_mime, ImageFile};
use canvas_db::{KeyValueStore, Project, ProjectRepo};
use canvas_editor::{CoachConversation, EditorSession};
use canvas_gemini::AiGateway;
use clap::{Parser, Subcommand};

/// Canvas AI: edit images with generative AI from the terminal.
#[derive(Parser, Debug)]
#[command(name = "canvas", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List saved projects, most recent first.
    List,

    /// Show a project and its edit history.
    Show { id: String },

    /// Upload an image and save it as a new project.
    New {
        /// Image file to upload.
        image: PathBuf,
        /// Project name (defaults to the file name without extension).
        #[arg(long)]
        name: Option<String>,
    },

    /// Run an AI action on a project and save the result.
    Edit {
        id: String,
        /// One of: edit, remix, emotion, expand.
        #[arg(long, default_value = "edit")]
        action: String,
        /// Description for `edit`, mood for `emotion`.
        #[arg(long)]
        prompt: Option<String>,
        /// History index to edit from (-1 = original). Later snapshots are
        /// discarded.
        #[arg(long, allow_hyphen_values = true)]
        from: Option<isize>,
    },

    /// Suggest edit ideas for a project's latest image.
    Suggest { id: String },

    /// Ask the prompt coach to improve a draft prompt.
    Coach { draft: String },

    /// Rename a project.
    Rename { id: String, name: String },

    /// Delete a project.
    Delete { id: String },

    /// Export a project image as PNG.
    Export {
        id: String,
        /// Output height: 720, 1080 or 2160.
        #[arg(long, default_value_t = HEIGHT_FULL_HD)]
        height: u32,
        /// History index to export (-1 = original, default latest).
        #[arg(long, allow_hyphen_values = true)]
        index: Option<isize>,
        /// Output directory.
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
}

/// Shared handles for command handlers.
pub struct Context {
    store: Box<dyn KeyValueStore>,
    /// Built lazily by `main`; missing API keys only fail AI commands.
    gateway: anyhow::Result<Box<dyn AiGateway>>,
}

impl Context {
    pub fn new(
        store: Box<dyn KeyValueStore>,
        gateway: anyhow::Result<Box<dyn AiGateway>>,
    ) -> Self {
        Self { store, gateway }
    }

    fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    fn gateway(&self) -> anyhow::Result<&dyn AiGateway> {
        match &self.gateway {
            Ok(gateway) => Ok(gateway.as_ref()),
            Err(e) => Err(anyhow!("{e:#}")),
        }
    }

    fn project(&self, id: &str) -> anyhow::Result<Project> {
        ProjectRepo::find_by_id(self.store(), id).ok_or_else(|| {
            CoreError::NotFound {
                entity: "Project",
                id: id.to_string(),
            }
            .into()
        })
    }
}

/// Dispatch one command.
pub async fn run(command: Command, ctx: &Context, out: &mut dyn Write) -> anyhow::Result<()> {
    match command {
        Command::List => list(ctx, out),
        Command::Show { id } => show(ctx, &id, out),
        Command::New { image, name } => new_project(ctx, &image, name, out).await,
        Command::Edit {
            id,
            action,
            prompt,
            from,
        } => edit(ctx, &id, &action, prompt, from, out).await,
        Command::Suggest { id } => suggest(ctx, &id, out).await,
        Command::Coach { draft } => coach(ctx, &draft, out).await,
        Command::Rename { id, name } => rename(ctx, &id, name, out),
        Command::Delete { id } => delete(ctx, &id, out),
        Command::Export {
            id,
            height,
            index,
            out: dir,
        } => export(ctx, &id, height, index, &dir, out).await,
    }
}

fn list(ctx: &Context, out: &mut dyn Write) -> anyhow::Result<()> {
    let projects = ProjectRepo::list(ctx.store());
    if projects.is_empty() {
        writeln!(out, "No saved projects.")?;
        return Ok(());
    }
    for summary in projects.iter().map(Project::summary) {
        writeln!(
            out,
            "{}  {}  {} edit(s)  {}",
            summary.id,
            summary.updated_at.format("%Y-%m-%d %H:%M"),
            summary.edit_count,
            summary.name,
        )?;
    }
    Ok(())
}

fn show(ctx: &Context, id: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let project = ctx.project(id)?;
    let original = &project.original_image;

    writeln!(out, "{} ({})", project.name, project.id)?;
    writeln!(out, "created: {}", project.created_at.to_rfc3339())?;
    writeln!(out, "updated: {}", project.updated_at.to_rfc3339())?;
    writeln!(
        out,
        "original: {} [{}, {} bytes]",
        original.name, original.mime_type, original.size
    )?;
    writeln!(out, "history:")?;
    writeln!(out, "  -1  original")?;
    for (i, snapshot) in project.history.iter().enumerate() {
        writeln!(
            out,
            "  {i:>2}  {} ({} chars)",
            data_url_mime(snapshot).unwrap_or("unknown"),
            snapshot.len()
        )?;
    }
    Ok(())
}

async fn new_project(
    ctx: &Context,
    path: &Path,
    name: Option<String>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut session = EditorSession::new();
    session.upload(ImageFile::from_bytes(file_name, &bytes)?)?;
    if let Some(name) = name {
        session.rename(name);
    }
    let project = session.save(ctx.store())?;

    tracing::info!(project_id = %project.id, name = %project.name, "Project created");
    writeln!(out, "Created project {} ({})", project.name, project.id)?;
    Ok(())
}

async fn edit(
    ctx: &Context,
    id: &str,
    action: &str,
    prompt: Option<String>,
    from: Option<isize>,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let action = CreativeAction::from_name(action, prompt)?;
    let gateway = ctx.gateway()?;

    let mut session = EditorSession::open(ctx.project(id)?);
    if let Some(index) = from {
        session.seek(index)?;
    }
    session.apply_ai_edit(gateway, action).await?;
    let project = session.save(ctx.store())?;

    writeln!(
        out,
        "Applied edit; {} now has {} snapshot(s), showing #{}",
        project.name,
        project.history.len(),
        session.history().index()
    )?;
    Ok(())
}

async fn suggest(ctx: &Context, id: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let gateway = ctx.gateway()?;
    let mut session = EditorSession::open(ctx.project(id)?);

    let suggestions = session.suggestions(gateway).await?;
    for (i, suggestion) in suggestions.iter().enumerate() {
        writeln!(out, "{}. {suggestion}", i + 1)?;
    }
    Ok(())
}

async fn coach(ctx: &Context, draft: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    let gateway = ctx.gateway()?;
    let mut conversation = CoachConversation::new();

    let Some(reply) = conversation.send(gateway, draft).await else {
        return Err(CoreError::Validation("Draft prompt is empty".to_string()).into());
    };

    match (&reply.suggestion, &reply.tip) {
        (Some(suggestion), tip) => {
            writeln!(out, "Prompt: {suggestion}")?;
            if let Some(tip) = tip {
                writeln!(out, "Tip: {tip}")?;
            }
        }
        (None, _) => writeln!(out, "{}", reply.content)?,
    }
    Ok(())
}

fn rename(ctx: &Context, id: &str, name: String, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut session = EditorSession::open(ctx.project(id)?);
    session.rename(name);
    let project = session.save(ctx.store())?;

    writeln!(out, "Renamed {} to {}", project.id, project.name)?;
    Ok(())
}

fn delete(ctx: &Context, id: &str, out: &mut dyn Write) -> anyhow::Result<()> {
    if ProjectRepo::delete(ctx.store(), id)? {
        writeln!(out, "Deleted {id}")?;
    } else {
        writeln!(out, "No project with id {id}")?;
    }
    Ok(())
}

async fn export(
    ctx: &Context,
    id: &str,
    height: u32,
    index: Option<isize>,
    dir: &Path,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    validate_preset_height(height)?;

    let mut session = EditorSession::open(ctx.project(id)?);
    if let Some(index) = index {
        session.seek(index)?;
    }
    let image = session
        .current_image()
        .ok_or_else(|| anyhow!("Project {id} has no image"))?;

    let rendered = render_png(image, session.name(), height)?;
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(&rendered.file_name);
    tokio::fs::write(&path, &rendered.png)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(project_id = %id, width = rendered.width, height = rendered.height, "Image exported");
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}
