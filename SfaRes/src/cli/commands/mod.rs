use clap::Subcommand;
use std::path::PathBuf;

use crate::batch::DecodeDepth;
use crate::config::Config;

pub mod amap;
pub mod anim;
pub mod decode;
pub mod inspect;
pub mod models;

#[derive(Subcommand)]
pub enum Commands {
    /// Strip container layers (ZLB, DIRn, LZOn) from a file or directory
    Decode {
        /// Input file, or directory with --recursive
        input: PathBuf,

        /// Output file or directory (defaults to `<input>.dec`)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Keep decoding until no container tag remains
        #[arg(long)]
        nested: bool,

        /// Maximum layers stripped with --nested (defaults to the config's
        /// `decoder.max_nesting_depth`)
        #[arg(long, requires = "nested")]
        max_depth: Option<usize>,

        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Decode an LZOn header found at this byte offset
        #[arg(long, conflicts_with_all = ["nested", "recursive"])]
        lzo_offset: Option<usize>,

        /// Decode every file under the input directory in parallel
        #[arg(short, long)]
        recursive: bool,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },

    /// Show the container kind and header fields of a file
    Inspect {
        /// File to inspect
        input: PathBuf,
    },

    /// Load an animation from a map subdirectory's ANIM.TAB/ANIM.BIN
    Anim {
        /// Directory containing the game data
        #[arg(long)]
        root: PathBuf,

        /// Map subdirectory (e.g. `swaphol`)
        #[arg(long, conflicts_with = "location")]
        subdir: Option<String>,

        /// Location number, resolved through the config's subdirectory table
        #[arg(long)]
        location: Option<u32>,

        /// Animation id
        #[arg(long)]
        id: u32,

        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the parsed keyframes as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Print the keyframe pair sampled at this many seconds
        #[arg(long)]
        time: Option<f32>,

        /// Sample at the placed-object rate instead of the exhibit rate
        #[arg(long, requires = "time")]
        object: bool,
    },

    /// Print a model's joint remap table
    Amap {
        /// Directory containing the game data
        #[arg(long)]
        root: PathBuf,

        /// Model number
        #[arg(long)]
        model: u32,

        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decode every model of a map subdirectory's MODELS.tab/MODELS.bin
    Models {
        /// Directory containing the game data
        #[arg(long)]
        root: PathBuf,

        /// Map subdirectory (e.g. `swaphol`)
        #[arg(long)]
        subdir: String,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Decode {
                input,
                output,
                nested,
                max_depth,
                lzo_offset,
                recursive,
                quiet,
                config,
            } => {
                let config = load_config(config.as_deref())?;
                let depth = decode_depth(*nested, *max_depth, &config);
                if *recursive {
                    decode::recursive(input, output.as_deref(), depth, *quiet)
                } else {
                    decode::single(input, output.as_deref(), depth, *lzo_offset)
                }
            }
            Commands::Inspect { input } => inspect::execute(input),
            Commands::Anim {
                root,
                subdir,
                location,
                id,
                config,
                json,
                time,
                object,
            } => anim::execute(&anim::AnimArgs {
                root,
                subdir: subdir.as_deref(),
                location: *location,
                id: *id,
                config: config.as_deref(),
                json: json.as_deref(),
                time: *time,
                object: *object,
            }),
            Commands::Amap { root, model, config } => amap::execute(root, *model, config.as_deref()),
            Commands::Models {
                root,
                subdir,
                output,
                config,
            } => models::execute(root, subdir, output, config.as_deref()),
        }
    }
}

/// Load the config file if given, defaults otherwise.
pub(crate) fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    })
}

/// An explicit `--max-depth` wins over the config's nesting limit.
fn decode_depth(nested: bool, max_depth: Option<usize>, config: &Config) -> DecodeDepth {
    if nested {
        DecodeDepth::Nested {
            max_depth: max_depth.unwrap_or(config.decoder.max_nesting_depth),
        }
    } else {
        DecodeDepth::Single
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_depth_uses_config_limit() {
        let config = Config::from_toml_str("[decoder]\nmax_nesting_depth = 3\n").unwrap();
        assert_eq!(decode_depth(true, None, &config), DecodeDepth::Nested { max_depth: 3 });
        assert_eq!(decode_depth(true, Some(5), &config), DecodeDepth::Nested { max_depth: 5 });
        assert_eq!(decode_depth(false, None, &config), DecodeDepth::Single);
        assert_eq!(
            decode_depth(true, None, &Config::default()),
            DecodeDepth::Nested { max_depth: 8 }
        );
    }

    #[test]
    fn test_decode_reads_config_file() {
        use clap::Parser;

        #[derive(Parser)]
        struct Harness {
            #[command(subcommand)]
            command: Commands,
        }

        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("sfares.toml");
        std::fs::write(&config_path, "[decoder]\nmax_nesting_depth = 1\n").unwrap();

        // Three DIR layers exceed a limit of one
        let mut data = b"core".to_vec();
        for _ in 0..3 {
            data = crate::formats::wrap_dir(&data);
        }
        let input = dir.path().join("layers.bin");
        std::fs::write(&input, &data).unwrap();

        let run = |extra: &[&str]| {
            let mut args = vec!["sfares", "decode", input.to_str().unwrap(), "--nested"];
            args.extend_from_slice(extra);
            args.extend_from_slice(&["--config", config_path.to_str().unwrap()]);
            Harness::try_parse_from(args).unwrap().command.execute()
        };

        assert!(run(&[]).is_err());
        run(&["--max-depth", "4"]).unwrap();
        assert_eq!(std::fs::read(dir.path().join("layers.bin.dec")).unwrap(), b"core");
    }
}
