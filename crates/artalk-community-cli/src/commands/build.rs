//! Build command - resolve every entry and write the catalog

use console::style;

use artalk_community_core::RegistryPaths;
use artalk_community_remote::{
    ConsoleReporter, Endpoints, RemoteSources, SriAlgorithm, build_registry,
};

use crate::error::{CliError, Result};

pub async fn run(
    paths: &RegistryPaths,
    endpoints: &Endpoints,
    algorithm: SriAlgorithm,
    use_cache: bool,
) -> Result<()> {
    let sources = RemoteSources::new(endpoints.clone(), algorithm)?;

    if !use_cache {
        println!(
            "{} Ignoring the previous catalog at {}",
            style("→").blue(),
            paths.output.display()
        );
    }

    let data = build_registry(&sources, paths, use_cache, &ConsoleReporter)
        .await
        .map_err(|e| {
            eprintln!("{}", style("😢 Error generating registry").red());
            CliError::from(e)
        })?;

    println!();
    println!(
        "{} Wrote {} plugin(s) and {} theme(s) to {}",
        style("→").blue(),
        data.plugins.len(),
        data.themes.len(),
        paths.output.display()
    );
    println!("{}", style("🎉 Registry generated successfully!").green());
    Ok(())
}
