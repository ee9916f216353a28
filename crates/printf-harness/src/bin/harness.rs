//! CLI entrypoint for the printf conformance harness.

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use printf_core::Capabilities;
use printf_harness::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome};
use printf_harness::{
    ArgPack, FixtureSet, SectionRecord, TestRunner, VerificationSummary, decode_sections,
    fixtures::sha256_file,
};

/// Conformance tooling for printf-core.
#[derive(Debug, Parser)]
#[command(name = "printf-harness")]
#[command(about = "Decode printf format strings and verify fixtures")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode one format string and print its sections as JSONL.
    Decode {
        /// Format string to decode.
        #[arg(long)]
        format: String,
        /// Argument in `kind:value` form (repeatable, in order).
        #[arg(long = "arg")]
        args: Vec<String>,
        /// errno value visible to `%m`.
        #[arg(long, default_value_t = 0)]
        errno: i32,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Verify the decoder against a fixture file or directory of fixtures.
    Verify {
        /// Fixture JSON file, or a directory containing them.
        #[arg(long)]
        fixture: PathBuf,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
    },
    /// Print the capabilities this build was compiled with.
    Capabilities,
}

type FileEmitter = LogEmitter<std::io::BufWriter<std::fs::File>>;

fn open_log(path: Option<&Path>, run_id: &str) -> std::io::Result<Option<FileEmitter>> {
    let Some(path) = path else {
        return Ok(None);
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    LogEmitter::to_file(path, run_id).map(Some)
}

fn emit_log(emitter: &mut Option<FileEmitter>, entry: LogEntry) -> std::io::Result<()> {
    match emitter {
        Some(emitter) => emitter.emit_entry(entry),
        None => Ok(()),
    }
}

fn close_log(emitter: Option<FileEmitter>) -> std::io::Result<()> {
    match emitter {
        Some(mut emitter) => emitter.flush(),
        None => Ok(()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Decode {
            format,
            args,
            errno,
            log,
        } => {
            let mut emitter = open_log(log.as_deref(), "decode")?;
            let pack = ArgPack::parse(&args)?;

            printf_core::errno::set_errno(errno);
            let records = decode_sections(format.as_bytes(), &pack);

            let mut stdout = std::io::stdout().lock();
            for record in &records {
                writeln!(stdout, "{}", serde_json::to_string(record)?)?;
                emit_log(&mut emitter, section_entry(&format, record, errno))?;
            }
            close_log(emitter)?;
        }
        Command::Verify { fixture, log } => {
            let mut emitter = open_log(log.as_deref(), "verify")?;
            let paths = fixture_paths(&fixture)?;
            if paths.is_empty() {
                return Err(format!("No fixture JSON files found in {}", fixture.display()).into());
            }

            let runner = TestRunner::new("fixture-verify");
            let mut results = Vec::new();
            let mut digests = Vec::new();
            for path in &paths {
                eprintln!("Verifying against {}", path.display());
                let set = FixtureSet::from_file(path)?;
                digests.push(format!("{}#sha256={}", path.display(), sha256_file(path)?));

                for result in runner.run(&set) {
                    let (level, outcome) = if result.skipped {
                        (LogLevel::Info, Outcome::Skip)
                    } else if result.passed {
                        (LogLevel::Info, Outcome::Pass)
                    } else {
                        (LogLevel::Error, Outcome::Fail)
                    };
                    if !result.passed && !result.skipped {
                        eprintln!(
                            "FAIL {}: {}",
                            result.case_name,
                            result.diff.as_deref().unwrap_or(&result.actual)
                        );
                    }
                    emit_log(
                        &mut emitter,
                        LogEntry::new("", level, "fixture.case")
                            .with_symbol(format!("{}/{}", set.family, result.case_name))
                            .with_outcome(outcome)
                            .with_details(serde_json::json!({
                                "expected": result.expected,
                                "actual": result.actual,
                                "diff": result.diff,
                            })),
                    )?;
                    results.push(result);
                }
            }

            let summary = VerificationSummary::from_results(&results);
            let outcome = if summary.all_passed() {
                Outcome::Pass
            } else {
                Outcome::Fail
            };
            emit_log(
                &mut emitter,
                LogEntry::new("", LogLevel::Info, "fixture.summary")
                    .with_outcome(outcome)
                    .with_artifacts(digests)
                    .with_details(serde_json::to_value(summary)?),
            )?;
            close_log(emitter)?;

            eprintln!(
                "Verification complete: total={}, passed={}, failed={}, skipped={}",
                summary.total, summary.passed, summary.failed, summary.skipped
            );
            if !summary.all_passed() {
                return Err("Fixture verification failed".into());
            }
        }
        Command::Capabilities => {
            let caps = Capabilities::current();
            let conversions: String = (b'!'..=b'~')
                .filter(|&c| caps.supports_conversion(c))
                .map(char::from)
                .collect();
            let json = serde_json::json!({
                "float": caps.float,
                "fixed_point": caps.fixed_point,
                "index_mode": caps.index_mode,
                "write_int": caps.write_int,
                "strerror": caps.strerror,
                "index_arr_len": caps.index_arr_len,
                "conversions": conversions,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(())
}

fn section_entry(format: &str, record: &SectionRecord, errno: i32) -> LogEntry {
    let mut entry = LogEntry::new("", LogLevel::Debug, "printf.section")
        .with_symbol(format)
        .with_details(serde_json::to_value(record).unwrap_or_default());
    if record.conv.as_deref() == Some("m") {
        entry = entry.with_errno(errno);
    }
    entry
}

fn fixture_paths(fixture: &Path) -> std::io::Result<Vec<PathBuf>> {
    if fixture.is_file() {
        return Ok(vec![fixture.to_path_buf()]);
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(fixture)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}
