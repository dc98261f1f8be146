// Content Spec Commands - Core use cases for the CLI

pub mod assemble;
pub mod checksum;
pub mod create;
pub mod edit;
pub mod info;
pub mod preview;
pub mod pull;
pub mod push;
pub mod status;
pub mod validate;

pub use assemble::AssembleOutcome;
pub use checksum::ChecksumOutcome;
pub use create::CreateOutcome;
pub use pull::PullOutcome;
pub use push::PushOutcome;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::application::constants::{DEFAULT_BUILD_DIR, PATH_PLACEHOLDER};
use crate::application::frame::CommandFrame;
use crate::application::reconcile::Reconciliation;
use crate::domain::{DocumentId, DocumentInfo, Phase, SpecMetadata};
use crate::error::{AppError, Result};
use crate::port::{DocumentServer, ProcessRunner, WorkspaceFs};

/// External tool configuration used by commands
#[derive(Debug, Clone)]
pub struct ToolSettings {
    /// Builder command line; `{spec}` is replaced with the spec file name
    pub build_command: String,
    /// Preview command line; `{path}` is replaced with the bundle directory
    pub preview_command: String,
    /// Editor command line; `{path}` is replaced with the spec file
    pub editor: String,
    /// Bundle directory name, relative to the spec file
    pub build_dir: String,
    /// Deadline applied to external tools (None = wait forever)
    pub process_timeout: Option<Duration>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            build_command: "publican build --formats=html --langs=en-US".to_string(),
            preview_command: "xdg-open".to_string(),
            editor: "vi".to_string(),
            build_dir: DEFAULT_BUILD_DIR.to_string(),
            process_timeout: None,
        }
    }
}

/// Collaborators shared by every command
#[derive(Clone)]
pub struct CommandContext {
    pub server: Arc<dyn DocumentServer>,
    pub fs: Arc<dyn WorkspaceFs>,
    pub runner: Arc<dyn ProcessRunner>,
    pub settings: ToolSettings,
}

/// Content Spec Service
pub struct ContentSpecService {
    ctx: CommandContext,
}

impl ContentSpecService {
    pub fn new(ctx: CommandContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &CommandContext {
        &self.ctx
    }

    /// Download a spec from the server
    pub async fn pull(
        &self,
        frame: &CommandFrame,
        id: DocumentId,
        output: Option<PathBuf>,
    ) -> Result<PullOutcome> {
        pull::execute(&self.ctx, frame, id, output).await
    }

    /// Upload local changes, refusing if the server copy has moved on
    pub async fn push(&self, frame: &CommandFrame, file: &Path) -> Result<PushOutcome> {
        push::execute(&self.ctx, frame, file).await
    }

    /// Create a new spec on the server from a local file
    pub async fn create(&self, frame: &CommandFrame, file: &Path) -> Result<CreateOutcome> {
        create::execute(&self.ctx, frame, file).await
    }

    /// Classify drift between a local file and the server copy
    pub async fn status(&self, frame: &CommandFrame, file: &Path) -> Result<Reconciliation> {
        status::execute(&self.ctx, frame, file).await
    }

    pub async fn validate(&self, frame: &CommandFrame, file: &Path) -> Result<SpecMetadata> {
        validate::execute(&self.ctx, frame, file).await
    }

    pub async fn info(&self, frame: &CommandFrame, id: DocumentId) -> Result<DocumentInfo> {
        info::execute(&self.ctx, frame, id).await
    }

    /// Lay out a bundle directory and run the external builder in it
    pub async fn assemble(
        &self,
        frame: &CommandFrame,
        file: &Path,
        build: bool,
    ) -> Result<AssembleOutcome> {
        assemble::execute(&self.ctx, frame, file, build).await
    }

    pub async fn preview(&self, frame: &CommandFrame, file: &Path) -> Result<PathBuf> {
        preview::execute(&self.ctx, frame, file).await
    }

    pub async fn edit(&self, frame: &CommandFrame, file: &Path) -> Result<SpecMetadata> {
        edit::execute(&self.ctx, frame, file).await
    }

    pub async fn checksum(
        &self,
        frame: &CommandFrame,
        file: &Path,
        write: bool,
    ) -> Result<ChecksumOutcome> {
        checksum::execute(&self.ctx, frame, file, write).await
    }
}

/// Read a local spec file; a missing file is an argument error
async fn read_local(ctx: &CommandContext, frame: &CommandFrame, file: &Path) -> Result<String> {
    frame.checkpoint(Phase::Parse)?;
    if !ctx.fs.exists(file).await {
        return Err(AppError::Argument(format!(
            "{} does not exist",
            file.display()
        )));
    }
    ctx.fs.read_to_string(file).await.map_err(AppError::from)
}

/// Directory containing `file` ("." for bare file names)
fn parent_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Bundle directory for a spec file
fn bundle_dir(settings: &ToolSettings, file: &Path) -> PathBuf {
    parent_dir(file).join(&settings.build_dir)
}

/// Quote a value for `sh -c`
fn shell_quote(value: &str) -> String {
    if !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:".contains(c))
    {
        return value.to_string();
    }
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Substitute `placeholder` in `template`, or append the value if absent
fn expand_template(template: &str, placeholder: &str, value: &str) -> String {
    let quoted = shell_quote(value);
    if template.contains(placeholder) {
        template.replace(placeholder, &quoted)
    } else {
        format!("{} {}", template, quoted)
    }
}

fn expand_path(template: &str, path: &Path) -> String {
    expand_template(template, PATH_PLACEHOLDER, &path.to_string_lossy())
}
