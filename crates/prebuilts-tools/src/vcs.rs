//! Staging and committing updates with `git`, and starting topic branches with
//! `repo` (or `pore`, in trees that use it).

use std::path::{Path, PathBuf};

use crate::error::{Result, ToolError};
use crate::process::{Invocation, Runner};

/// The tool that creates topic branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchTool {
    /// `repo start <name> .`
    Repo,
    /// `pore start <name>`, with the resolved path to `pore`.
    Pore(PathBuf),
}

impl BranchTool {
    /// Pick the branch tool for the checkout rooted at `android_top`.
    ///
    /// Trees managed by pore have a `.pore` directory at the top; pore must
    /// then be on `PATH`.
    pub fn detect(android_top: &Path) -> Result<Self> {
        if !android_top.join(".pore").exists() {
            return Ok(BranchTool::Repo);
        }
        which::which("pore")
            .map(BranchTool::Pore)
            .map_err(|_| ToolError::ToolNotFound {
                name: "pore".to_string(),
            })
    }
}

/// Runs version control operations in one project directory.
pub struct Stager<'r> {
    runner: &'r dyn Runner,
    work_dir: PathBuf,
    branch_tool: BranchTool,
}

impl<'r> Stager<'r> {
    pub fn new(runner: &'r dyn Runner, work_dir: impl Into<PathBuf>, branch_tool: BranchTool) -> Self {
        Stager {
            runner,
            work_dir: work_dir.into(),
            branch_tool,
        }
    }

    /// Start topic branch `name` for this project.
    pub fn start_branch(&self, name: &str) -> Result<()> {
        let invocation = match &self.branch_tool {
            BranchTool::Repo => Invocation::new("repo").args(["start", name, "."]),
            BranchTool::Pore(pore) => Invocation::new(pore).args(["start", name]),
        };
        self.run(invocation)
    }

    /// Remove `path` from the index and the working tree. A path that is not
    /// tracked is not an error.
    pub fn remove_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.run(
            Invocation::new("git")
                .args(["rm", "-rf", "--ignore-unmatch"])
                .arg(path.as_ref()),
        )
    }

    pub fn add_path(&self, path: impl AsRef<Path>) -> Result<()> {
        self.run(Invocation::new("git").arg("add").arg(path.as_ref()))
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(Invocation::new("git").args(["commit", "-m", message]))
    }

    fn run(&self, invocation: Invocation) -> Result<()> {
        self.runner.run(&invocation.current_dir(&self.work_dir))
    }
}
