//! Animation commands

use std::path::Path;

use crate::anim::sample_anim;
use crate::cli::progress::{DISK, LOOKING_GLASS, RUNNER, print_step};
use crate::config::get_subdir;
use crate::resource::{AnimCollection, DirFetcher};

use super::load_config;

pub struct AnimArgs<'a> {
    pub root: &'a Path,
    pub subdir: Option<&'a str>,
    pub location: Option<u32>,
    pub id: u32,
    pub config: Option<&'a Path>,
    pub json: Option<&'a Path>,
    pub time: Option<f32>,
    pub object: bool,
}

/// Load one animation and report on it.
pub fn execute(args: &AnimArgs<'_>) -> anyhow::Result<()> {
    let config = load_config(args.config)?;
    let subdir = match (args.subdir, args.location) {
        (Some(subdir), _) => subdir,
        (None, Some(location)) => get_subdir(location, &config.game)?,
        (None, None) => anyhow::bail!("either --subdir or --location is required"),
    };
    let steps = if args.json.is_some() { 3 } else { 2 };

    print_step(1, steps, LOOKING_GLASS, &format!("Reading {subdir}/ANIM.TAB..."));
    let fetcher = DirFetcher::new(args.root);
    let anims = AnimCollection::create(&fetcher, &config.game, subdir)?;
    if !anims.has_anim(args.id) {
        anyhow::bail!("Animation #{} not present in {subdir} ({} slots)", args.id, anims.len());
    }

    print_step(2, steps, RUNNER, &format!("Parsing animation #{}...", args.id));
    let anim = anims.get_anim(args.id)?;
    println!("Keyframes:  {}", anim.len());
    println!("Joints:     {}", anim.joint_count());

    if let Some(time) = args.time {
        let rate = if args.object {
            config.playback.object_rate
        } else {
            config.playback.exhibit_rate
        };
        let sample = sample_anim(&anim, time, rate)?;
        println!(
            "At {time}s ({rate} kf/s): kf0 = {}, kf1 = {}, ratio = {:.4}",
            sample.kf0, sample.kf1, sample.ratio
        );
    }

    if let Some(json_path) = args.json {
        print_step(3, steps, DISK, &format!("Writing {}...", json_path.display()));
        let json = anim.to_json()?;
        std::fs::write(json_path, json)?;
    }

    Ok(())
}
