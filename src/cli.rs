use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "pomver",
    about = "POM Version - pin Maven dependency versions to an exact value",
    version,
    author
)]
pub struct Cli {
    /// Path to the project directory containing pom.xml (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replace the declared version of matching dependencies with an exact version
    UseExactVersion {
        /// Exact version to set. It is applied as-is, no comparison rules are involved
        #[arg(short = 'e', long = "exact-version", value_name = "VERSION")]
        exact_version: String,

        /// Only process dependencies matching these patterns
        /// (groupId:artifactId:type:classifier:version, `*` wildcards)
        #[arg(long, value_name = "PATTERNS", value_delimiter = ',')]
        includes: Vec<String>,

        /// Skip dependencies matching these patterns
        #[arg(long, value_name = "PATTERNS", value_delimiter = ',')]
        excludes: Vec<String>,

        /// Do not touch <dependencyManagement> entries
        #[arg(long)]
        no_dependency_management: bool,

        /// Do not touch direct <dependencies> entries
        #[arg(long)]
        no_dependencies: bool,

        /// Also update dependencies produced by modules of this build
        #[arg(long)]
        include_reactor: bool,

        /// Only process the root pom, not its modules
        #[arg(short = 'N', long)]
        non_recursive: bool,

        /// Do not write pom.xml.versionsBackup files
        #[arg(long)]
        no_backup: bool,

        /// Commit the modified poms to a new Git branch
        #[arg(long)]
        commit: bool,
    },

    /// List dependency declarations of every project in the build
    List {
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,

        /// Mark dependencies matching these include patterns
        #[arg(long, value_name = "PATTERNS", value_delimiter = ',')]
        includes: Vec<String>,

        /// Mark dependencies matching these exclude patterns as skipped
        #[arg(long, value_name = "PATTERNS", value_delimiter = ',')]
        excludes: Vec<String>,
    },
}
