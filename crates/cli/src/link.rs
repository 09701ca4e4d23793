//! `pprl link`, `pprl validate` and `pprl normalize`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use pprl_linkage::{
    canonicalize_address, canonicalize_date_with, load_input, normalize_text, phonetic_name, run,
    DateOrder, LinkageConfig,
};

use crate::CliError;

fn load_config(path: &Path) -> Result<LinkageConfig, CliError> {
    let config_str = std::fs::read_to_string(path)
        .map_err(|e| CliError::runtime(format!("cannot read config {}: {e}", path.display())))?;
    Ok(LinkageConfig::from_toml(&config_str)?)
}

/// Data files resolve relative to the config file's directory.
fn base_dir(config_path: &Path) -> &Path {
    config_path.parent().unwrap_or_else(|| Path::new("."))
}

pub fn cmd_link(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    threshold: Option<f64>,
) -> Result<(), CliError> {
    let mut config = load_config(&config_path)?;

    if let Some(threshold) = threshold {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(CliError::usage(format!("--threshold must be between 0 and 1, got {threshold}")));
        }
        config.matching.threshold = threshold;
    }

    let base = base_dir(&config_path);
    let input = load_input(&config, base)?;
    tracing::debug!(records_a = input.a.len(), records_b = input.b.len(), "datasets loaded");

    let result = run(&config, &input)?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;

    let output_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base.join(p)));
    if let Some(ref path) = output_path {
        std::fs::write(path, &json_str)
            .map_err(|e| CliError::runtime(format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "{}: {} x {} records, {} matched, {} of A unmatched",
        result.meta.config_name, s.records_a, s.records_b, s.matched, s.unmatched_a,
    );
    if s.unparsed_dates_a + s.unparsed_dates_b > 0 {
        eprintln!(
            "  unparsed dates of birth: {} in A, {} in B (compared literally)",
            s.unparsed_dates_a, s.unparsed_dates_b,
        );
    }
    if s.prefiltered > 0 {
        eprintln!("  {} records of A ruled out by the Bloom prefilter", s.prefiltered);
    }
    eprintln!(
        "  bloom A: {:.1}% full, est. fpp {:.2e}; bloom B: {:.1}% full, est. fpp {:.2e}",
        s.bloom_a.load_factor * 100.0,
        s.bloom_a.estimated_fpp,
        s.bloom_b.load_factor * 100.0,
        s.bloom_b.estimated_fpp,
    );

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = load_config(&config_path)?;

    let base = base_dir(&config_path);
    for (label, dataset) in [("a", &config.datasets.a), ("b", &config.datasets.b)] {
        let path = base.join(&dataset.file);
        if !path.is_file() {
            return Err(CliError::runtime(format!("datasets.{label}.file not found: {}", path.display()))
                .with_hint("paths are resolved relative to the config file"));
        }
    }

    let m = &config.matching;
    eprintln!("config ok: \"{}\"", config.name);
    eprintln!("  A: {}", config.datasets.a.file);
    eprintln!("  B: {}", config.datasets.b.file);
    eprintln!("  bloom: {} bits, {} hash rounds", config.bloom.size, config.bloom.hash_count);
    eprintln!(
        "  matching: threshold {}, scorer {:?}, names {:?}, strategy {:?}",
        m.threshold, m.scorer, m.name_policy, m.strategy,
    );
    Ok(())
}

#[derive(Serialize)]
struct NormalizeOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    phonetic_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    address: Option<String>,
}

pub fn cmd_normalize(
    name: Option<String>,
    dob: Option<String>,
    address: Option<String>,
    date_order: DateOrder,
    json: bool,
) -> Result<(), CliError> {
    if name.is_none() && dob.is_none() && address.is_none() {
        return Err(CliError::usage("nothing to normalize").with_hint("pass --name, --dob or --address"));
    }

    let out = NormalizeOutput {
        name: name.as_deref().map(normalize_text),
        phonetic_name: name.as_deref().map(phonetic_name),
        date_of_birth: dob.as_deref().map(|d| canonicalize_date_with(d, date_order)),
        address: address.as_deref().map(canonicalize_address),
    };

    if json {
        let json_str = serde_json::to_string_pretty(&out)
            .map_err(|e| CliError::runtime(format!("JSON serialization error: {e}")))?;
        println!("{json_str}");
        return Ok(());
    }

    if let Some(ref v) = out.name {
        println!("name:     {v}");
    }
    if let Some(ref v) = out.phonetic_name {
        println!("phonetic: {v}");
    }
    if let Some(ref v) = out.date_of_birth {
        println!("dob:      {v}");
    }
    if let Some(ref v) = out.address {
        println!("address:  {v}");
    }
    Ok(())
}
