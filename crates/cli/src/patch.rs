//! `armorsmith run` and `armorsmith validate`: config-driven patch runs.

use std::path::{Path, PathBuf};

use armorsmith_recon::config::DataConfig;
use armorsmith_recon::guesses::write_guesses;
use armorsmith_recon::{load_tables, MemoryStore, PatchReport, PatcherConfig, ReconError};

use crate::exit_codes::{EXIT_APPLY_FAILED, EXIT_INVALID_CONFIG, EXIT_RUNTIME};
use crate::CliError;

fn patch_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

/// Parse the config and anchor its data paths at the config's directory.
fn load_config(config_path: &Path) -> Result<(PatcherConfig, DataConfig), CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| patch_err(EXIT_RUNTIME, format!("cannot read config: {e}")))?;
    let config = PatcherConfig::from_toml(&config_str)
        .map_err(|e| patch_err(EXIT_INVALID_CONFIG, e.to_string()))?;

    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let data = config.data.resolve(base_dir);
    Ok((config, data))
}

fn write_file(path: &Path, contents: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            patch_err(EXIT_RUNTIME, format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    std::fs::write(path, contents)
        .map_err(|e| patch_err(EXIT_RUNTIME, format!("cannot write {}: {e}", path.display())))
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    dry_run: bool,
) -> Result<(), CliError> {
    let (config, data) = load_config(&config_path)?;
    tracing::debug!(config = %config_path.display(), records = %data.records.display(), "starting run");

    let ctx = load_tables(&data.slot_data, &data.overrides_dir).into_context(config.options());
    let mut store = MemoryStore::load(&data.records).map_err(|e| {
        patch_err(EXIT_RUNTIME, e.to_string()).with_hint("data.records must point at a JSON record snapshot")
    })?;

    let report = armorsmith_recon::run(&ctx, &mut store);

    if dry_run {
        eprintln!("dry run: nothing written");
    } else {
        let patch_path = data.output_dir.join(&config.patch_file_name);
        let patch_json = serde_json::to_string_pretty(&store.to_patch())
            .map_err(|e| patch_err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;
        write_file(&patch_path, &patch_json)?;
        eprintln!("wrote {}", patch_path.display());

        // Guess report failures are logged, not fatal.
        if !report.guesses.is_empty() {
            if let Some(parent) = data.guesses.parent() {
                if let Err(err) = std::fs::create_dir_all(parent) {
                    tracing::warn!(path = %parent.display(), error = %err, "cannot create guess report directory");
                }
            }
            match write_guesses(&data.guesses, &report.guesses) {
                Ok(()) => eprintln!("wrote {}", data.guesses.display()),
                Err(err) => tracing::error!(path = %data.guesses.display(), error = %err, "failed to write guess report"),
            }
        }
    }

    let json_str = serde_json::to_string_pretty(&report)
        .map_err(|e| patch_err(EXIT_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        write_file(path, &json_str)?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    print_summary(&report);

    if report.summary.has_failures() {
        return Err(patch_err(
            EXIT_APPLY_FAILED,
            format!(
                "{} item(s) and {} recipe(s) failed to apply",
                report.summary.items_failed, report.summary.recipes_failed
            ),
        ));
    }

    Ok(())
}

/// Human summary to stderr.
fn print_summary(report: &PatchReport) {
    let s = &report.summary;
    eprintln!(
        "{}: {} items considered, {} patched, {} unchanged, {} skipped, {} ignored",
        report.meta.patch_file_name,
        s.items_considered,
        s.items_patched,
        s.items_unchanged,
        s.items_skipped,
        s.items_ignored,
    );
    eprintln!(
        "models: {} updated; recipes: {} patched; guesses: {}",
        s.models_updated, s.recipes_patched, s.guesses,
    );
    if s.items_degraded > 0 {
        eprintln!("degraded: {} item(s) patched without an object template", s.items_degraded);
    }
    if s.override_source_failures > 0 {
        eprintln!(
            "overrides: {} of {} source(s) failed to load",
            s.override_source_failures,
            s.override_sources + s.override_source_failures,
        );
    }
    for failure in &report.failures {
        eprintln!("  failed {:?} {}: {}", failure.kind, failure.record_id, failure.message);
    }
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let (config, data) = load_config(&config_path)?;
    let tables = load_tables(&data.slot_data, &data.overrides_dir);

    let taxonomy = tables.taxonomy.map_err(|e| {
        let err = patch_err(EXIT_INVALID_CONFIG, e.to_string());
        if matches!(e, ReconError::Io(_)) {
            err.with_hint("data.slot_data is resolved relative to the config file")
        } else {
            err
        }
    })?;

    for failure in tables.overrides.failures() {
        eprintln!("warning: override source '{}' ignored: {}", failure.source_file, failure.message);
    }

    eprintln!(
        "valid: '{}' with {} slot descriptor(s), {} override source(s), {} override row(s)",
        config.patch_file_name,
        taxonomy.len(),
        tables.overrides.source_count(),
        tables.overrides.len(),
    );
    Ok(())
}
