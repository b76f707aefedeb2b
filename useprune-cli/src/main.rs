//! useprune CLI - report target USE flags that no world package needs.
//!
//! Reads the installed-package database and the world file, then prints one
//! line per (package, flag) pair that is not pulled in by any world package:
//!
//! ```text
//! dev-python/six:0[python_targets_python3_11] is not pulled by any world packages
//! ```
//!
//! Logs go to stderr as JSON (`RUST_LOG` controls the level); stdout only
//! carries the report.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use useprune_core::{
    generate_dot, init_structured_logging, load_config, load_default_config, log_error, log_warn,
    print_json, print_plain, write_explain, UsePrune, DEFAULT_CONFIG_FILE,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Report language/ABI target USE flags not pulled in by any world package"
)]
pub struct Cli {
    /// World file listing explicitly requested packages
    #[arg(long, value_name = "PATH")]
    world: Option<PathBuf>,

    /// Installed-package database root
    #[arg(long, value_name = "PATH")]
    pkg_dir: Option<PathBuf>,

    /// Config file (default: /etc/useprune.toml when present)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Only report these flags
    #[arg(long = "flag", value_name = "FLAG")]
    flags: Vec<String>,

    /// Extra packages to treat as world entries
    #[arg(long, value_name = "SPEC")]
    extra_world: Vec<String>,

    /// Regex selecting the audited flags
    #[arg(long, value_name = "REGEX")]
    target_pattern: Option<String>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Also show which world packages justify each remaining flag
    #[arg(long)]
    explain: bool,

    /// Print Graphviz DOT for one flag's reverse-dependency graph instead of the report
    #[arg(long, value_name = "FLAG")]
    dot: Option<String>,

    /// Write DOT output to a file and keep the report on stdout
    #[arg(long, value_name = "FILE", requires = "dot")]
    dot_file: Option<String>,
}

/// Security: Validates output file paths to prevent path traversal attacks.
///
/// Rejects absolute paths, `..` components and null bytes.
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);

    if p.is_absolute() {
        return Err(anyhow!(
            "Output path must be relative, not absolute: {}",
            path
        ));
    }

    for component in p.components() {
        if matches!(component, std::path::Component::ParentDir) {
            return Err(anyhow!(
                "Path traversal (..) not allowed in output paths: {}",
                path
            ));
        }
    }

    Ok(p)
}

/// Merges built-in defaults, the config file and the command line (in that order).
fn build_audit(cli: &Cli) -> Result<UsePrune> {
    let mut audit = UsePrune::new();

    match &cli.config {
        Some(path) => {
            let cfg = load_config(path)?;
            audit = cfg.apply(audit);
        }
        None => match load_default_config() {
            Ok(Some(cfg)) => audit = cfg.apply(audit),
            Ok(None) => {}
            Err(e) => log_warn(&format!(
                "ignoring {}: {:#}",
                DEFAULT_CONFIG_FILE, e
            )),
        },
    }

    if let Some(world) = &cli.world {
        audit = audit.world_file(world);
    }
    if let Some(dir) = &cli.pkg_dir {
        audit = audit.pkg_dir(dir);
    }
    if let Some(pattern) = &cli.target_pattern {
        audit = audit.target_pattern(pattern);
    }
    Ok(audit
        .add_extra_world(cli.extra_world.iter().cloned())
        .only_flags(cli.flags.iter().cloned()))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn run(cli: &Cli) -> Result<()> {
    let audit = build_audit(cli)?;
    if let Some(flag) = &cli.dot {
        audit.audited_flags()?.require(flag)?;
    }
    let session = audit.session().with_context(|| {
        format!(
            "Failed to audit {} against {}",
            audit.pkg_dir_path().display(),
            audit.world_file_path().display()
        )
    })?;
    let report = session.run();

    // Without --dot-file the graph replaces the report on stdout
    if let Some(flag) = &cli.dot {
        let dot = generate_dot(&session, &report, flag);
        match &cli.dot_file {
            Some(file) => {
                let safe_path = validate_output_path(file)?;
                write_output(&safe_path, &dot)?;
            }
            None => {
                println!("{}", dot);
                return Ok(());
            }
        }
    }

    if cli.json {
        print_json(&report, cli.explain)?;
    } else {
        print_plain(&report)?;
        if cli.explain {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_explain(&mut out, &report)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] useprune internal error: {}", info);
    }));

    // Structured logging (JSON to stderr, respects RUST_LOG)
    init_structured_logging();

    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        log_error(&format!("{:#}", e));
        return Err(e);
    }
    Ok(())
}
