use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tokio::sync::watch;

use mrpack_lib::game::installer::config::default_extract_dir;
use mrpack_lib::game::installer::core::traits::InstallPrompt;
use mrpack_lib::game::installer::types::{CancelToken, ExtractOptions, InstallerConfig, ProgressReporter};
use mrpack_lib::game::installer::{extract_modpack, install_modpack};
use mrpack_lib::game::modpack::{modpack_info, ModpackManifest, Side};
use mrpack_lib::game::InstallOptions;
use mrpack_lib::ModpackError;

#[derive(Parser)]
#[command(name = "mrpack-installer", version, about = "Extract and install Modrinth .mrpack modpacks")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Install a modpack into the launcher as a new profile
    Install {
        pack: PathBuf,
        /// Skip files marked optional
        #[arg(long)]
        no_optional: bool,
        /// Game directory (defaults to the launcher's platform location)
        #[arg(long)]
        minecraft_dir: Option<PathBuf>,
        /// Lower-case, `[a-z0-9_-]`-only install directory names
        #[arg(long)]
        strict_names: bool,
        /// Where the packaged archive is written before installing
        #[arg(long)]
        staging_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Package the client or server files into a zip and a folder
    Extract {
        pack: PathBuf,
        /// Extract the server side instead of the client side
        #[arg(long)]
        server: bool,
        #[arg(long)]
        no_optional: bool,
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = 1)]
        concurrency: usize,
    },
    /// Show modpack metadata without downloading anything
    Info { pack: PathBuf },
}

struct ConsoleReporter {
    cancel: CancelToken,
}

impl ProgressReporter for ConsoleReporter {
    fn start_step(&self, name: &str, _total_steps: Option<u32>) {
        println!("==> {}", name);
    }

    fn update_bytes(&self, transferred: u64, total: Option<u64>) {
        log::debug!("[ConsoleReporter] {} / {:?} bytes", transferred, total);
    }

    fn set_message(&self, message: &str) {
        println!("    {}", message);
    }

    fn set_step_count(&self, current: u32, total: Option<u32>) {
        if let Some(t) = total {
            log::debug!("[ConsoleReporter] {}/{}", current, t);
        }
    }

    fn done(&self, success: bool, message: Option<&str>) {
        if success {
            println!("{}", message.unwrap_or("Done"));
        } else {
            eprintln!("{}", message.unwrap_or("Failed"));
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Answers installer questions on stdin
struct StdinPrompt {
    versions_dir: PathBuf,
}

fn read_line(question: &str) -> String {
    print!("{}", question);
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        return String::new();
    }
    line.trim().to_string()
}

fn installed_versions(versions_dir: &Path) -> Vec<String> {
    let mut found: Vec<String> = std::fs::read_dir(versions_dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().is_dir())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    found.sort();
    found
}

impl InstallPrompt for StdinPrompt {
    fn confirm_reinstall(&self, existing: &Path) -> bool {
        let answer = read_line(&format!(
            "{} is already installed. Install it again? [y/N] ",
            existing.display()
        ));
        matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn runtime_version(&self, manifest: &ModpackManifest) -> String {
        println!("This modpack requires:");
        for (key, version) in &manifest.dependencies {
            println!("    {} {}", ModpackManifest::dependency_display_name(key), version);
        }
        let versions = installed_versions(&self.versions_dir);
        if !versions.is_empty() {
            println!("Installed versions:");
            for v in &versions {
                println!("    {}", v);
            }
        }
        read_line("Version id to launch with (empty to cancel): ")
    }
}

/// Exit status used when a second Ctrl-C aborts the run
const INTERRUPTED_EXIT_CODE: i32 = 130;

#[derive(Debug, PartialEq, Eq)]
enum Interrupt {
    /// Stop resolving after the current file
    Cancel,
    /// Leave immediately, even from a prompt or while unpacking
    Exit,
}

fn interrupt_action(presses: u32) -> Interrupt {
    if presses <= 1 {
        Interrupt::Cancel
    } else {
        Interrupt::Exit
    }
}

fn console_reporter() -> ConsoleReporter {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        let mut presses = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            presses += 1;
            match interrupt_action(presses) {
                Interrupt::Cancel => {
                    log::warn!("Cancellation requested, stopping after the current file (Ctrl-C again to quit)");
                    let _ = tx.send(true);
                }
                Interrupt::Exit => {
                    eprintln!("Interrupted");
                    std::process::exit(INTERRUPTED_EXIT_CODE);
                }
            }
        }
    });
    ConsoleReporter {
        cancel: CancelToken::new(rx),
    }
}

async fn run(cmd: Cmd) -> Result<(), ModpackError> {
    match cmd {
        Cmd::Info { pack } => {
            println!("{}", modpack_info(&pack)?);
        }
        Cmd::Extract {
            pack,
            server,
            no_optional,
            output,
            concurrency,
        } => {
            let side = if server { Side::Server } else { Side::Client };
            let mut options =
                ExtractOptions::new(side, output.unwrap_or_else(|| default_extract_dir(side)));
            options.resolve.include_optional = !no_optional;
            options.resolve.concurrency = concurrency;

            let packaged = extract_modpack(&pack, &options, &console_reporter()).await?;
            println!("Archive:   {}", packaged.layout.archive_path.display());
            println!("Directory: {}", packaged.layout.directory.display());
        }
        Cmd::Install {
            pack,
            no_optional,
            minecraft_dir,
            strict_names,
            staging_dir,
            concurrency,
        } => {
            let mut installer = match minecraft_dir {
                Some(dir) => InstallerConfig::new(dir),
                None => InstallerConfig::platform_default().ok_or_else(|| {
                    ModpackError::InvalidInput(
                        "could not locate the game directory, pass --minecraft-dir".to_string(),
                    )
                })?,
            };
            installer.strict_names = strict_names;

            let prompt = StdinPrompt {
                versions_dir: installer.versions_dir(),
            };
            let staging = staging_dir.unwrap_or_else(|| default_extract_dir(Side::Client));
            let mut options = InstallOptions::new(installer, staging);
            options.include_optional = !no_optional;
            options.concurrency = concurrency;

            let profile = install_modpack(&pack, &options, &prompt, &console_reporter()).await?;
            println!(
                "Installed {:?} to {}",
                profile.display_name,
                profile.install_directory.display()
            );
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match run(cli.cmd).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error [{}]: {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn second_interrupt_exits() {
        assert_eq!(interrupt_action(1), Interrupt::Cancel);
        assert_eq!(interrupt_action(2), Interrupt::Exit);
        assert_eq!(interrupt_action(3), Interrupt::Exit);
    }

    #[test]
    fn extract_flags_parse() {
        let cli = Cli::try_parse_from(["mrpack-installer", "extract", "pack.mrpack", "--server", "--no-optional"]).unwrap();
        match cli.cmd {
            Cmd::Extract { server, no_optional, output, concurrency, .. } => {
                assert!(server);
                assert!(no_optional);
                assert!(output.is_none());
                assert_eq!(concurrency, 1);
            }
            _ => panic!("expected extract"),
        }
    }
}
