//! Diff command - compare the local catalog with the latest release
//!
//! Prints the GitHub Actions output line `::set-output name=is_diff::<1|0>`
//! and, when `GITHUB_OUTPUT` names a file, appends `is_diff=<1|0>` to it.

use console::style;
use std::io::Write;
use std::path::Path;

use artalk_community_core::RegistryPaths;
use artalk_community_remote::{DiffOutcome, Endpoints, GitHubClient, check_diff};

use crate::display::print_line_diff;
use crate::error::Result;

pub async fn run(
    paths: &RegistryPaths,
    endpoints: &Endpoints,
    repo: &str,
    show_diff: bool,
    github_output: Option<&Path>,
) -> Result<()> {
    let github = GitHubClient::from_endpoints(endpoints)?;
    let outcome = check_diff(&github, repo, &paths.output).await?;

    println!("{}", outcome.summary());

    if show_diff {
        if let DiffOutcome::Changed {
            published, local, ..
        } = &outcome
        {
            print_line_diff(published, local);
        }
    }

    let flag = if outcome.is_diff() { 1 } else { 0 };
    println!("::set-output name=is_diff::{}", flag);

    if let Some(path) = github_output {
        append_output(path, flag)?;
    }

    if !outcome.is_diff() {
        eprintln!("{} Nothing to publish", style("✓").green());
    }
    Ok(())
}

fn append_output(path: &Path, flag: u8) -> std::io::Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "is_diff={}", flag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("github_output");
        std::fs::write(&path, "other=x\n").unwrap();

        append_output(&path, 1).unwrap();
        append_output(&path, 0).unwrap();

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "other=x\nis_diff=1\nis_diff=0\n"
        );
    }
}
