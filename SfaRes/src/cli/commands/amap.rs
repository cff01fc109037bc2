//! Joint remap table command

use std::path::Path;

use crate::resource::{AmapCollection, DirFetcher};

use super::load_config;

/// Print the joint remap table of `model`.
pub fn execute(root: &Path, model: u32, config: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config)?;
    let fetcher = DirFetcher::new(root);
    let amaps = AmapCollection::create(&fetcher, &config.game)?;
    let amap = amaps.get_amap(model)?;

    println!("Model #{model}: {} remap entries", amap.len());
    for i in 0..amap.len() {
        match amap.dest_joint(i) {
            Some(joint) => println!("  anim joint {i:3} -> joint {joint}"),
            None => println!("  anim joint {i:3} -> (none, entry {})", amap.entry(i).unwrap_or_default()),
        }
    }
    Ok(())
}
