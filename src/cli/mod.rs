//! CLI Module
//!
//! Command-line interface for working with `.gbp` project archives.

pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::project::ZorderIndex;

/// Default directory for the local project cache.
pub const DEFAULT_CACHE_DIR: &str = ".spx-cache";

/// spx project tool - inspect, pack and edit project archives
#[derive(Parser, Debug)]
#[command(name = "spx-project")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Local cache directory
    #[arg(long, global = true, default_value = DEFAULT_CACHE_DIR)]
    pub cache_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a summary of an archive
    #[command(name = "inspect")]
    Inspect {
        /// Path to the .gbp archive
        archive: PathBuf,
    },

    /// Build an archive from a project directory
    #[command(name = "pack")]
    Pack {
        /// Project directory (holds main.spx and assets/)
        dir: PathBuf,

        /// Output archive
        #[arg(short, long)]
        output: PathBuf,

        /// Project name stored in the archive
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Extract an archive into a directory
    #[command(name = "unpack")]
    Unpack {
        /// Path to the .gbp archive
        archive: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Move a sprite in the zorder
    #[command(name = "zorder")]
    Zorder {
        /// Path to the .gbp archive (rewritten in place)
        archive: PathBuf,

        /// Sprite to move
        sprite: String,

        /// up, down, top, bottom or a target index
        #[arg(value_parser = parse_zorder_move)]
        to: ZorderMove,
    },

    /// Rename a sprite
    #[command(name = "rename-sprite")]
    RenameSprite {
        /// Path to the .gbp archive (rewritten in place)
        archive: PathBuf,

        /// Current sprite name
        from: String,

        /// New sprite name
        to: String,
    },

    /// Store an archive in the local cache
    #[command(name = "cache-store")]
    CacheStore {
        /// Path to the .gbp archive
        archive: PathBuf,

        /// Cache key
        #[arg(short, long)]
        key: String,
    },

    /// Restore a cached project into an archive
    #[command(name = "cache-restore")]
    CacheRestore {
        /// Cache key
        #[arg(short, long)]
        key: String,

        /// Output archive
        #[arg(short, long)]
        output: PathBuf,
    },

    /// List local cache keys
    #[command(name = "cache-list")]
    CacheList,
}

/// Target of the `zorder` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZorderMove {
    Up,
    Down,
    Top,
    Bottom,
    Index(usize),
}

impl From<ZorderMove> for ZorderIndex {
    fn from(target: ZorderMove) -> Self {
        match target {
            ZorderMove::Up => ZorderIndex::up(),
            ZorderMove::Down => ZorderIndex::down(),
            ZorderMove::Top => ZorderIndex::top(),
            ZorderMove::Bottom => ZorderIndex::bottom(),
            ZorderMove::Index(idx) => ZorderIndex::At(idx),
        }
    }
}

fn parse_zorder_move(s: &str) -> std::result::Result<ZorderMove, String> {
    match s.to_ascii_lowercase().as_str() {
        "up" => Ok(ZorderMove::Up),
        "down" => Ok(ZorderMove::Down),
        "top" => Ok(ZorderMove::Top),
        "bottom" => Ok(ZorderMove::Bottom),
        other => other
            .parse()
            .map(ZorderMove::Index)
            .map_err(|_| format!("expected up, down, top, bottom or an index, got {:?}", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("up", ZorderMove::Up)]
    #[test_case("TOP", ZorderMove::Top)]
    #[test_case("bottom", ZorderMove::Bottom)]
    #[test_case("3", ZorderMove::Index(3))]
    fn test_parse_zorder_move(input: &str, expected: ZorderMove) {
        assert_eq!(parse_zorder_move(input), Ok(expected));
    }

    #[test]
    fn test_parse_zorder_move_rejects_junk() {
        assert!(parse_zorder_move("sideways").is_err());
        assert!(parse_zorder_move("-1").is_err());
    }

    #[test]
    fn test_cli_parses_zorder_command() {
        let cli = Cli::try_parse_from(["spx-project", "zorder", "game.gbp", "Ball", "top"]).unwrap();
        match cli.command {
            Some(Commands::Zorder { sprite, to, .. }) => {
                assert_eq!(sprite, "Ball");
                assert_eq!(to, ZorderMove::Top);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(cli.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
    }
}
