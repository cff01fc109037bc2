//! Container decode commands

use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::batch::{DecodeDepth, batch_decode, find_resource_files};
use crate::cli::progress::{DISK, LOOKING_GLASS, PACKAGE, print_done, print_step, simple_bar};
use crate::formats::container::{ContainerKind, decode_lzo_at};

fn default_output(input: &Path) -> PathBuf {
    let mut name = input.as_os_str().to_owned();
    name.push(".dec");
    PathBuf::from(name)
}

/// Decode a single file.
pub fn single(
    input: &Path,
    output: Option<&Path>,
    depth: DecodeDepth,
    lzo_offset: Option<usize>,
) -> anyhow::Result<()> {
    let data = std::fs::read(input)?;
    let output = output.map_or_else(|| default_output(input), Path::to_path_buf);

    let decoded = if let Some(offset) = lzo_offset {
        decode_lzo_at(&data, offset)?
    } else {
        match ContainerKind::identify(&data) {
            Some(kind) => println!("Container: {kind}"),
            None => println!("No container tag; writing input unchanged"),
        }
        depth.decode(&data)?
    };

    std::fs::write(&output, &decoded)?;
    println!(
        "{} -> {} ({} -> {} bytes)",
        input.display(),
        output.display(),
        data.len(),
        decoded.len()
    );
    Ok(())
}

/// Decode every file under `input` into a mirrored tree.
pub fn recursive(
    input: &Path,
    output: Option<&Path>,
    depth: DecodeDepth,
    quiet: bool,
) -> anyhow::Result<()> {
    if !input.is_dir() {
        anyhow::bail!("{} is not a directory", input.display());
    }
    let output = output.map_or_else(|| default_output(input), Path::to_path_buf);
    let start = Instant::now();

    print_step(1, 3, LOOKING_GLASS, &format!("Scanning {}...", input.display()));
    let files = find_resource_files(input);
    if files.is_empty() {
        println!("No files found");
        return Ok(());
    }

    print_step(2, 3, PACKAGE, &format!("Decoding {} files...", files.len()));
    let result = if quiet {
        batch_decode(&files, input, &output, depth, |_, _, _| {})
    } else {
        let pb = simple_bar(files.len() as u64, "Decoding");
        let result = batch_decode(&files, input, &output, depth, |_, _, name| {
            pb.inc(1);
            let short_name = Path::new(name)
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(name);
            pb.set_message(short_name.to_string());
        });
        pb.finish_with_message("done");
        result
    };

    print_step(3, 3, DISK, &format!("Wrote {}", output.display()));
    for line in result.results.iter().filter(|line| line.starts_with("Failed")) {
        println!("  {line}");
    }
    println!(
        "Decoded: {}, skipped: {}, failed: {}",
        result.decoded_count, result.skipped_count, result.fail_count
    );
    print_done(start.elapsed());
    Ok(())
}
