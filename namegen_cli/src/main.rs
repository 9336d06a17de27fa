// CLI entry point for the pattern-driven name generator.
//
// Resolves a pattern (positional, `--preset`, or the config file), seeds a
// `NameRng`, and prints one generated name per line. The pattern is compiled
// once and reused for every name; all names share one continuing RNG stream,
// so `--seed S --count N` always prints the same N names.
//
// Usage:
//   namegen [OPTIONS] [PATTERN]
//     -p, --preset <NAME>       Use a bundled preset pattern
//     -n, --count <N>           Names to generate (default: 1)
//     -s, --seed <SEED>         64-bit seed (default: random, logged at info)
//         --capacity <BYTES>    Buffer size including terminator (default: 64)
//         --retries <N>         Extra attempts while truncated (default: 0)
//         --dictionary <PATH>   Fragment dictionary JSON
//         --config <PATH>       JSON config file; flags override its values
//         --list-classes        Print the dictionary's classes and exit
//         --list-presets        Print the preset patterns and exit
//     -v, --verbose             More logging (-v info, -vv debug); RUST_LOG wins
//
// Exit status: 0 when every name was generated in full, 1 when any name was
// truncated, 2 on an invalid or too deeply nested pattern or any setup error.

mod config;
mod error;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::LevelFilter;
use namegen_lang::{
    CompiledPattern, Outcome, PRESETS, PackedDictionary, default_dictionary, generate_with_retry,
    nesting_depth, preset,
};
use namegen_prng::NameRng;

use crate::config::CliConfig;
use crate::error::CliError;

/// Deepest group nesting accepted from the command line or a config file.
/// Generation recurses once per level.
const MAX_NESTING_DEPTH: usize = 256;

#[derive(Parser, Debug)]
#[command(name = "namegen", version, about = "Generate names from compact patterns")]
struct Cli {
    /// Pattern to expand, e.g. '!<s|B>V<c|C>s'.
    #[arg(conflicts_with = "preset")]
    pattern: Option<String>,

    /// Use a bundled preset pattern (see --list-presets).
    #[arg(short, long)]
    preset: Option<String>,

    /// Number of names to generate.
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Seed for the generator.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Output buffer size in bytes, including the terminator.
    #[arg(long)]
    capacity: Option<usize>,

    /// Extra attempts per name while the result is truncated.
    #[arg(long)]
    retries: Option<u32>,

    /// Fragment dictionary JSON file.
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the dictionary's classes and exit.
    #[arg(long)]
    list_classes: bool,

    /// Print the preset patterns and exit.
    #[arg(long)]
    list_presets: bool,

    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("namegen: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn run(cli: &Cli) -> Result<ExitCode, CliError> {
    let file_config = match &cli.config {
        Some(path) => CliConfig::load(path)?,
        None => CliConfig::default(),
    };
    let config = merge(cli, file_config);

    let loaded;
    let dict: &PackedDictionary = match &config.dictionary {
        Some(path) => {
            loaded = PackedDictionary::load(path)?;
            &loaded
        }
        None => default_dictionary(),
    };

    let mut out = io::stdout().lock();
    if cli.list_presets {
        write_presets(&mut out)?;
        return Ok(ExitCode::SUCCESS);
    }
    if cli.list_classes {
        write_classes(&mut out, dict)?;
        return Ok(ExitCode::SUCCESS);
    }

    let pattern = resolve_pattern(&config)?;
    let seed = config.seed.unwrap_or_else(rand::random::<u64>);
    log::info!("seed {seed}");
    let mut rng = NameRng::from_seed_u64(seed);

    let truncated = write_names(&mut out, &pattern, &config, &mut rng, dict)?;
    log::info!("final generator state {}", rng.state());
    if truncated > 0 {
        log::warn!(
            "{truncated} of {} names truncated at {} bytes",
            config.count,
            config.capacity
        );
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

/// Apply command-line flags over values from the config file.
fn merge(cli: &Cli, mut config: CliConfig) -> CliConfig {
    // A pattern source on the command line replaces both from the file.
    if cli.pattern.is_some() || cli.preset.is_some() {
        config.pattern = cli.pattern.clone();
        config.preset = cli.preset.clone();
    }
    if let Some(count) = cli.count {
        config.count = count;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(capacity) = cli.capacity {
        config.capacity = capacity;
    }
    if let Some(retries) = cli.retries {
        config.retries = retries;
    }
    if let Some(dictionary) = &cli.dictionary {
        config.dictionary = Some(dictionary.clone());
    }
    config
}

fn resolve_pattern(config: &CliConfig) -> Result<String, CliError> {
    if let Some(pattern) = &config.pattern {
        return Ok(pattern.clone());
    }
    match &config.preset {
        Some(name) => preset(name)
            .map(|p| p.pattern.to_string())
            .ok_or_else(|| CliError::UnknownPreset(name.clone())),
        None => Err(CliError::NoPattern),
    }
}

/// Print `config.count` names. Returns how many were truncated.
fn write_names<W: Write>(
    out: &mut W,
    pattern: &str,
    config: &CliConfig,
    rng: &mut NameRng,
    dict: &PackedDictionary,
) -> Result<usize, CliError> {
    let depth = nesting_depth(pattern);
    if depth > MAX_NESTING_DEPTH {
        return Err(CliError::PatternTooDeep {
            depth,
            max: MAX_NESTING_DEPTH,
        });
    }
    let compiled = CompiledPattern::compile(pattern);
    if compiled.is_unterminated() {
        return Err(CliError::InvalidPattern(pattern.to_string()));
    }

    let mut truncated = 0;
    for _ in 0..config.count {
        let name = generate_with_retry(&compiled, config.capacity, config.retries, rng, dict);
        match name.outcome {
            Outcome::Invalid => return Err(CliError::InvalidPattern(pattern.to_string())),
            Outcome::Truncated => truncated += 1,
            Outcome::Success => {}
        }
        writeln!(out, "{}", name.text)?;
    }
    Ok(truncated)
}

fn write_presets<W: Write>(out: &mut W) -> io::Result<()> {
    for p in PRESETS {
        writeln!(out, "{:<12} {:<36} {}", p.name, p.pattern, p.description)?;
    }
    Ok(())
}

fn write_classes<W: Write>(out: &mut W, dict: &PackedDictionary) -> io::Result<()> {
    for class in dict.classes() {
        writeln!(
            out,
            "{}  {:<20} {:>4}  {}",
            class.marker, class.label, class.size, class.description
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("namegen").chain(args.iter().copied())).unwrap()
    }

    fn names(pattern: &str, config: &CliConfig, seed: u64) -> (Vec<String>, usize) {
        let mut out = Vec::new();
        let mut rng = NameRng::from_seed_u64(seed);
        let truncated = write_names(&mut out, pattern, config, &mut rng, default_dictionary()).unwrap();
        let text = String::from_utf8(out).unwrap();
        (text.lines().map(str::to_string).collect(), truncated)
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_pattern_conflicts_with_preset() {
        let args = ["namegen", "!sVs", "--preset", "town"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let cli = parse(&["-n", "4", "--seed", "9", "-vv"]);
        assert_eq!(cli.verbose, 2);
        let file = CliConfig {
            preset: Some("town".into()),
            count: 10,
            seed: Some(1),
            capacity: 16,
            ..CliConfig::default()
        };
        let merged = merge(&cli, file);
        assert_eq!(merged.preset.as_deref(), Some("town"));
        assert_eq!(merged.count, 4);
        assert_eq!(merged.seed, Some(9));
        assert_eq!(merged.capacity, 16);
    }

    #[test]
    fn test_command_line_pattern_replaces_file_preset() {
        let cli = parse(&["!Dd"]);
        let file = CliConfig {
            preset: Some("town".into()),
            ..CliConfig::default()
        };
        let merged = merge(&cli, file);
        assert_eq!(resolve_pattern(&merged).unwrap(), "!Dd");
    }

    #[test]
    fn test_resolve_pattern() {
        let config = CliConfig {
            preset: Some("dimwit".into()),
            ..CliConfig::default()
        };
        assert_eq!(resolve_pattern(&config).unwrap(), "!Dd");

        let config = CliConfig {
            preset: Some("wizard".into()),
            ..CliConfig::default()
        };
        assert!(matches!(resolve_pattern(&config), Err(CliError::UnknownPreset(n)) if n == "wizard"));
        assert!(matches!(resolve_pattern(&CliConfig::default()), Err(CliError::NoPattern)));
    }

    #[test]
    fn test_names_are_reproducible() {
        let config = CliConfig {
            count: 5,
            ..CliConfig::default()
        };
        let (first, truncated) = names("!<s|B><v|V><c|C>s", &config, 77);
        assert_eq!(truncated, 0);
        assert_eq!(first.len(), 5);
        assert!(first.iter().all(|n| n.starts_with(|c: char| c.is_ascii_uppercase())));
        let (second, _) = names("!<s|B><v|V><c|C>s", &config, 77);
        assert_eq!(first, second);
    }

    #[test]
    fn test_truncated_names_are_counted() {
        let config = CliConfig {
            count: 3,
            capacity: 2,
            ..CliConfig::default()
        };
        let (lines, truncated) = names("!sVs", &config, 5);
        assert_eq!(truncated, 3);
        assert!(lines.iter().all(|n| n.len() == 1));
    }

    #[test]
    fn test_invalid_pattern_is_an_error() {
        let config = CliConfig::default();
        let mut rng = NameRng::new(1);
        for pattern in ["<sVs", "s>", "(s>"] {
            let mut out = Vec::new();
            let result = write_names(&mut out, pattern, &config, &mut rng, default_dictionary());
            assert!(matches!(result, Err(CliError::InvalidPattern(_))), "{pattern}");
        }
    }

    #[test]
    fn test_deeply_nested_pattern_is_rejected() {
        let pattern = format!("a|{}b{}", "<".repeat(60_000), ">".repeat(60_000));
        let mut out = Vec::new();
        let mut rng = NameRng::new(1);
        let result = write_names(&mut out, &pattern, &CliConfig::default(), &mut rng, default_dictionary());
        assert!(matches!(
            result,
            Err(CliError::PatternTooDeep { depth: 60_000, max: MAX_NESTING_DEPTH })
        ));
        assert!(out.is_empty());
        assert_eq!(rng.state(), 1, "rejected before any draw");
    }

    #[test]
    fn test_nesting_at_limit_is_accepted() {
        let pattern = format!(
            "{}b{}",
            "<".repeat(MAX_NESTING_DEPTH),
            ">".repeat(MAX_NESTING_DEPTH)
        );
        let (lines, truncated) = names(&pattern, &CliConfig::default(), 3);
        assert_eq!(truncated, 0);
        assert_eq!(lines, ["b"]);
    }

    #[test]
    fn test_listings() {
        let mut out = Vec::new();
        write_presets(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), PRESETS.len());
        assert!(text.starts_with("fantasy"));

        let mut out = Vec::new();
        write_classes(&mut out, default_dictionary()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 11);
        assert!(text.lines().next().unwrap().starts_with("s  "));
    }
}
