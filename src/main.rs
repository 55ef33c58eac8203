use clap::{Parser, Subcommand};
use ecpack::cli::{process_path, recover_path, show_info, ProcessOptions, RecoverOptions};
use ecpack::header::Operation;
use ecpack::pipeline::{LOOKAHEAD_SIZE, WINDOW_SIZE};
use ecpack::LogEntry;
use std::path::PathBuf;
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("ECPACK_VERSION");
const BUILD: &str = env!("ECPACK_BUILD");
const PROFILE: &str = env!("ECPACK_PROFILE");
const GIT_HASH: &str = env!("ECPACK_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| format!("{} {} build {} ({})", PROFILE, VERSION, BUILD, GIT_HASH))
}

#[derive(Parser)]
#[command(name = "ecpack")]
#[command(author, about = "LZ77 + Huffman file compressor with XOR obfuscation", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress and/or obfuscate a file or every file under a directory
    #[command(alias = "p")]
    Process {
        /// File or directory to process
        path: PathBuf,

        /// Operation: compress (.cmp), encrypt (.enc) or both (.ec)
        #[arg(long, short, default_value = "compress", value_parser = parse_operation)]
        operation: Operation,

        /// Password for encrypt and both
        #[arg(long)]
        password: Option<String>,

        /// LZ77 window in bytes (1-65535)
        #[arg(long, default_value_t = WINDOW_SIZE)]
        window: usize,

        /// LZ77 lookahead in bytes (3-65535)
        #[arg(long, default_value_t = LOOKAHEAD_SIZE)]
        lookahead: usize,

        /// Print log entries as JSON lines
        #[arg(long)]
        json: bool,

        /// Suppress progress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Restore .cmp, .enc and .ec containers into a directory
    #[command(alias = "r")]
    Recover {
        /// Container file or directory of containers
        source: PathBuf,

        /// Destination directory (created if missing)
        destination: PathBuf,

        /// Password for .enc and .ec containers
        #[arg(long)]
        password: Option<String>,

        /// Print log entries as JSON lines
        #[arg(long)]
        json: bool,

        /// Suppress progress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show information about a container
    #[command(alias = "i")]
    Info {
        /// Container to inspect
        file: PathBuf,

        /// Password to look inside .ec containers
        #[arg(long)]
        password: Option<String>,
    },
}

fn parse_operation(s: &str) -> Result<Operation, String> {
    s.parse().map_err(|e| format!("{}", e))
}

/// Progress printer that drops repeated updates
fn progress_printer(quiet: bool) -> impl FnMut(u8, &str) {
    let mut last: Option<(u8, String)> = None;
    move |pct, message| {
        if quiet {
            return;
        }
        if last.as_ref().is_some_and(|(p, m)| *p == pct && m == message) {
            return;
        }
        eprintln!("[{:>3}%] {}", pct, message);
        last = Some((pct, message.to_string()));
    }
}

/// Prints entries and remembers whether any file failed
struct EntryPrinter {
    json: bool,
    failed: bool,
}

impl EntryPrinter {
    fn new(json: bool) -> Self {
        Self {
            json,
            failed: false,
        }
    }

    fn print(&mut self, entry: LogEntry) {
        if entry.operation.is_error() {
            self.failed = true;
        }
        if self.json {
            match serde_json::to_string(&entry) {
                Ok(line) => println!("{}", line),
                Err(e) => log::error!("cannot serialize log entry: {}", e),
            }
        } else {
            println!("{}", entry);
        }
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    if cli.version {
        println!("ecpack {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Process {
            path,
            operation,
            password,
            window,
            lookahead,
            json,
            quiet,
        } => {
            let options = ProcessOptions {
                operation,
                password,
                window,
                lookahead,
            };
            let mut printer = EntryPrinter::new(json);
            let outcome = process_path(
                &path,
                &options,
                &mut progress_printer(quiet),
                &mut |entry| printer.print(entry),
            );
            outcome.map(|()| printer.failed)
        }

        Commands::Recover {
            source,
            destination,
            password,
            json,
            quiet,
        } => {
            let options = RecoverOptions { password };
            let mut printer = EntryPrinter::new(json);
            let outcome = recover_path(
                &source,
                &destination,
                &options,
                &mut progress_printer(quiet),
                &mut |entry| printer.print(entry),
            );
            outcome.map(|()| printer.failed)
        }

        Commands::Info { file, password } => match show_info(&file, password.as_deref()) {
            Ok(info) => {
                print!("{}", info);
                Ok(false)
            }
            Err(e) => Err(e),
        },
    };

    match result {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
