//! Model extraction command

use std::path::Path;
use std::time::Instant;

use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, print_done, print_step, simple_bar};
use crate::resource::{DirFetcher, ModelCollection};

use super::load_config;

/// Decode every present model into `output/model_<n>.bin`.
pub fn execute(root: &Path, subdir: &str, output: &Path, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let start = Instant::now();

    print_step(1, 3, LOOKING_GLASS, &format!("Reading {subdir}/MODELS.tab..."));
    let fetcher = DirFetcher::new(root);
    let models = ModelCollection::create(&fetcher, &config.game, subdir)?;
    let present: Vec<u32> = (0..models.len() as u32).filter(|&n| models.has_model(n)).collect();
    println!("{} of {} slots present", present.len(), models.len());

    print_step(2, 3, PACKAGE, "Decoding models...");
    std::fs::create_dir_all(output)?;
    let pb = simple_bar(present.len() as u64, "Decoding");
    let mut failed = Vec::new();
    for &n in &present {
        pb.set_message(format!("model {n}"));
        match models.model_data(n) {
            Ok(data) => std::fs::write(output.join(format!("model_{n}.bin")), data.as_slice())?,
            Err(e) => failed.push(format!("model {n}: {e}")),
        }
        pb.inc(1);
    }
    pb.finish_with_message("done");

    print_step(3, 3, DISK, &format!("Wrote {} models to {}", present.len() - failed.len(), output.display()));
    for line in &failed {
        println!("  Failed {line}");
    }
    print_done(start.elapsed());
    Ok(())
}
