use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "sprig",
    about = "sprig: a small local version control system",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty repository
    Init(InitArgs),
    /// Stage files for the next commit
    Add(AddArgs),
    /// Record the staged tree as a new commit
    Commit(CommitArgs),
    /// Show working tree status
    Status(StatusArgs),
    /// Show commit history
    Log(LogArgs),
    /// Print a stored object
    CatFile(CatFileArgs),
    /// Get and set repository options
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InitArgs {
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CommitArgs {
    #[arg(short, long)]
    pub message: String,
}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct LogArgs {
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct CatFileArgs {
    /// Full or abbreviated (at least 5 characters) object digest
    pub hash: String,
}

#[derive(Args)]
#[command(group(
    ArgGroup::new("action").args(["list", "get_all", "add", "replace_all", "unset", "unset_all"])
))]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub list: bool,
    #[arg(long)]
    pub get_all: bool,
    #[arg(long)]
    pub add: bool,
    #[arg(long)]
    pub replace_all: bool,
    #[arg(long)]
    pub unset: bool,
    #[arg(long)]
    pub unset_all: bool,
    /// `section.name`
    pub key: Option<String>,
    pub value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["sprig", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init(InitArgs { path: None })));
    }

    #[test]
    fn parse_init_path() {
        let cli = Cli::try_parse_from(["sprig", "init", "/tmp/repo"]).unwrap();
        let Command::Init(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.path, Some(PathBuf::from("/tmp/repo")));
    }

    #[test]
    fn parse_add_requires_paths() {
        assert!(Cli::try_parse_from(["sprig", "add"]).is_err());
        let cli = Cli::try_parse_from(["sprig", "add", ".", "src/lib.rs"]).unwrap();
        let Command::Add(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.paths, vec![PathBuf::from("."), PathBuf::from("src/lib.rs")]);
    }

    #[test]
    fn parse_commit() {
        let cli = Cli::try_parse_from(["sprig", "commit", "-m", "hello"]).unwrap();
        let Command::Commit(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.message, "hello");
        assert!(Cli::try_parse_from(["sprig", "commit"]).is_err());
    }

    #[test]
    fn parse_log_limit() {
        let cli = Cli::try_parse_from(["sprig", "log", "-n", "5"]).unwrap();
        let Command::Log(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn parse_cat_file() {
        let cli = Cli::try_parse_from(["sprig", "cat-file", "abcde"]).unwrap();
        let Command::CatFile(args) = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(args.hash, "abcde");
    }

    #[test]
    fn parse_config_actions() {
        let cli = Cli::try_parse_from(["sprig", "config", "--add", "user.name", "Ada"]).unwrap();
        let Command::Config(args) = cli.command else {
            panic!("wrong command");
        };
        assert!(args.add);
        assert_eq!(args.key.as_deref(), Some("user.name"));
        assert_eq!(args.value.as_deref(), Some("Ada"));

        let cli = Cli::try_parse_from(["sprig", "config", "--list"]).unwrap();
        assert!(matches!(cli.command, Command::Config(ConfigArgs { list: true, .. })));
    }

    #[test]
    fn config_actions_are_exclusive() {
        assert!(Cli::try_parse_from(["sprig", "config", "--unset", "--add", "a.b", "c"]).is_err());
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["sprig", "--verbose", "status"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["sprig", "status", "--format", "json"]).unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
    }
}
