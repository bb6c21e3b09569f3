use std::path::PathBuf;

use quire_types::{InkType, PaperType};

#[derive(clap::Parser, Debug)]
#[clap(
    name = "quire",
    version,
    about = "Publish plain-text manuscripts as web, EPUB, print PDF and paperback cover"
)]
pub struct Cli {
    /// Collection directory holding the projects and index.html
    #[clap(long, global = true)]
    pub library: Option<PathBuf>,

    /// Show debug output
    #[clap(short, long, global = true)]
    pub verbose: bool,

    /// Only show errors
    #[clap(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show what would be done without writing anything
    #[clap(long, global = true)]
    pub dry_run: bool,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render every artifact for a project and add it to the book index
    Publish {
        /// Project directory name inside the library
        project: String,
        #[clap(flatten)]
        print: PrintArgs,
        #[clap(flatten)]
        images: ImageArgs,
        /// Publish only the first N chapters as the web edition
        #[clap(long, value_parser = parse_chapter_limit)]
        sample: Option<usize>,
        /// Generate abstract cover art when the project has no cover image
        #[clap(long)]
        generate_cover: bool,
    },
    /// Remove a project from the book index, keeping its files
    Unpublish {
        /// Project directory name inside the library
        project: String,
    },
    /// Export a project to a single format
    Export {
        /// Project directory name inside the library
        project: String,
        /// Output format (html, epub, pdf)
        #[clap(long, short, default_value = "epub")]
        format: String,
        /// Output file (defaults to the book title in the current directory)
        #[clap(long, short)]
        output: Option<PathBuf>,
        /// Export only the first N chapters (html only)
        #[clap(long, value_parser = parse_chapter_limit)]
        sample: Option<usize>,
    },
    /// Show how a manuscript file is split into chapters
    Chapters {
        /// Plain-text manuscript
        file: PathBuf,
        /// Also print the first paragraph of each chapter
        #[clap(long)]
        preview: bool,
    },
    /// Show paperback cover dimensions for a page count
    Dimensions {
        /// Interior page count
        pages: u32,
        #[clap(flatten)]
        print: PrintArgs,
    },
    /// Render a cover proof with trim, spine and safe-area guides
    CoverProof {
        /// Project directory name inside the library
        project: String,
        /// Page count to size the spine for (typesets the manuscript if omitted)
        #[clap(long)]
        pages: Option<u32>,
        #[clap(flatten)]
        print: PrintArgs,
        #[clap(flatten)]
        images: ImageArgs,
        /// Generate abstract cover art when the project has no cover image
        #[clap(long)]
        generate_cover: bool,
    },
    /// List projects in the library
    List,
    /// Manage configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommands,
    },
}

fn parse_chapter_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("chapter count must be at least 1".to_string()),
        Ok(limit) => Ok(limit),
        Err(_) => Err(format!("'{}' is not a chapter count", value)),
    }
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct PrintArgs {
    /// Paper stock (white, cream)
    #[clap(long)]
    pub paper: Option<PaperType>,
    /// Interior ink (bw, standard-color, premium-color)
    #[clap(long)]
    pub ink: Option<InkType>,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct ImageArgs {
    /// Front cover image, instead of the project's cover.png/jpg
    #[clap(long)]
    pub cover: Option<PathBuf>,
    /// Author photo for the back cover, instead of the project's author_photo.*
    #[clap(long)]
    pub photo: Option<PathBuf>,
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigCommands {
    /// Set a configuration value
    Set {
        /// Configuration key (e.g. publish.paper)
        key: String,
        /// Configuration value
        value: String,
    },
    /// Get a configuration value
    Get {
        /// Configuration key
        key: String,
    },
    /// Show all configuration
    Show,
    /// Reset configuration to defaults
    Reset {
        /// Skip confirmation prompt
        #[clap(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_publish_with_print_options() {
        let cli = Cli::parse_from([
            "quire",
            "--library",
            "/books",
            "publish",
            "tides",
            "--paper",
            "cream",
            "--ink",
            "bw",
            "--sample",
            "3",
        ]);

        assert_eq!(cli.library, Some(PathBuf::from("/books")));
        match cli.command {
            Commands::Publish {
                project,
                print,
                sample,
                generate_cover,
                ..
            } => {
                assert_eq!(project, "tides");
                assert_eq!(print.paper, Some(PaperType::Cream));
                assert_eq!(print.ink, Some(InkType::Bw));
                assert_eq!(sample, Some(3));
                assert!(!generate_cover);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_invalid_paper_is_rejected() {
        let result = Cli::try_parse_from(["quire", "dimensions", "120", "--paper", "glossy"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["quire", "list", "--dry-run", "--verbose"]);
        assert!(cli.dry_run);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List));
    }

    #[test]
    fn test_zero_sample_is_rejected() {
        assert!(Cli::try_parse_from(["quire", "publish", "tides", "--sample", "0"]).is_err());
        assert!(Cli::try_parse_from(["quire", "export", "tides", "--sample", "0"]).is_err());
        assert!(Cli::try_parse_from(["quire", "export", "tides", "--sample", "2"]).is_ok());
    }
}
