use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::coverage::sample::SamplerConfig;
use crate::error::{AlignError, Result};
use crate::topics::inference::InferenceConfig;
use crate::topics::lda::{check_priors, FitterConfig};
use crate::topics::normalize::NormalizerConfig;

/// Default literal noise words removed on top of the stop-word sets.
pub const DEFAULT_NOISE_WORDS: &[&str] = &["students", "understanding"];

/// Default regex used to pull the difficulty code out of an item id.
pub const DEFAULT_LEVEL_PATTERN: &str = "[LMH]";

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Every
/// value has a default so a bare checkout runs against `./data/`.
#[derive(Debug, Clone)]
pub struct Config {
    pub standards_path: PathBuf,
    pub stopwords_path: PathBuf,
    pub items_path: PathBuf,
    /// Optional JSON labeling table (topic index -> name)
    pub labels_path: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Number of latent topics (K)
    pub topics: usize,
    pub seed: u64,
    pub iterations: usize,
    pub alpha: f64,
    pub beta: f64,
    pub noise_words: Vec<String>,
    pub sample_size: usize,
    pub sample_seed: u64,
    pub level_pattern: String,
}

/// Explicit per-stage configuration handed to the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub normalizer: NormalizerConfig,
    pub fitter: FitterConfig,
    pub inference: InferenceConfig,
    pub sampler: SamplerConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    ///
    /// Split out from `load` so tests can supply values without touching
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |name: &str, default: &str| {
            PathBuf::from(lookup(name).unwrap_or_else(|| default.to_string()))
        };

        let noise_words = match lookup("ALIGN_NOISE_WORDS") {
            Some(list) => list
                .split(',')
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
            None => DEFAULT_NOISE_WORDS.iter().map(|w| w.to_string()).collect(),
        };

        let config = Self {
            standards_path: path("ALIGN_STANDARDS_PATH", "./data/standards.json"),
            stopwords_path: path("ALIGN_STOPWORDS_PATH", "./data/stopwords.json"),
            items_path: path("ALIGN_ITEMS_PATH", "./data/items.json"),
            labels_path: lookup("ALIGN_LABELS_PATH").map(PathBuf::from),
            output_dir: path("ALIGN_OUTPUT_DIR", "./report"),
            topics: parse_var(&lookup, "ALIGN_TOPICS", 7)?,
            seed: parse_var(&lookup, "ALIGN_SEED", 1234)?,
            iterations: parse_var(&lookup, "ALIGN_ITERATIONS", 2000)?,
            alpha: parse_var(&lookup, "ALIGN_ALPHA", 0.1)?,
            beta: parse_var(&lookup, "ALIGN_BETA", 0.01)?,
            noise_words,
            sample_size: parse_var(&lookup, "ALIGN_SAMPLE_SIZE", 9)?,
            sample_seed: parse_var(&lookup, "ALIGN_SAMPLE_SEED", 42)?,
            level_pattern: lookup("ALIGN_LEVEL_PATTERN")
                .unwrap_or_else(|| DEFAULT_LEVEL_PATTERN.to_string()),
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject values that can never produce a usable model.
    pub fn validate(&self) -> Result<()> {
        if self.topics == 0 {
            return Err(AlignError::Config(
                "ALIGN_TOPICS must be at least 1".to_string(),
            ));
        }
        check_priors(self.alpha, self.beta)?;
        if self.iterations == 0 {
            return Err(AlignError::Config(
                "ALIGN_ITERATIONS must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Split the flat config into the explicit per-stage configs.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            normalizer: NormalizerConfig {
                noise_words: self.noise_words.clone(),
            },
            fitter: FitterConfig {
                topics: self.topics,
                alpha: self.alpha,
                beta: self.beta,
                iterations: self.iterations,
                seed: self.seed,
                show_progress: true,
            },
            inference: InferenceConfig::default(),
            sampler: SamplerConfig {
                size: self.sample_size,
                seed: self.sample_seed,
            },
        }
    }
}

fn parse_var<F, T>(lookup: &F, name: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            AlignError::Config(format!("{name} has an invalid value: '{raw}'"))
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::records::{Level, LevelParser};
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.topics, 7);
        assert_eq!(config.sample_size, 9);
        assert_eq!(config.noise_words, vec!["students", "understanding"]);
        assert_eq!(config.level_pattern, "[LMH]");
        assert!(config.labels_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("ALIGN_TOPICS", "4"),
            ("ALIGN_SEED", "99"),
            ("ALIGN_NOISE_WORDS", " Foo, bar ,,"),
        ]))
        .unwrap();
        assert_eq!(config.topics, 4);
        assert_eq!(config.seed, 99);
        assert_eq!(config.noise_words, vec!["foo", "bar"]);

        let pipeline = config.pipeline();
        assert_eq!(pipeline.fitter.topics, 4);
        assert_eq!(pipeline.fitter.seed, 99);
    }

    #[test]
    fn test_level_pattern_builds_parser() {
        let default = Config::from_lookup(lookup_from(&[])).unwrap();
        let parser = LevelParser::new(&default.level_pattern).unwrap();
        assert_eq!(parser.parse("LMH-02H").unwrap(), Level::Low);

        let config = Config::from_lookup(lookup_from(&[("ALIGN_LEVEL_PATTERN", "[LMH]$")])).unwrap();
        let parser = LevelParser::new(&config.level_pattern).unwrap();
        assert_eq!(parser.parse("LMH-02H").unwrap(), Level::High);
    }

    #[test]
    fn test_invalid_value_names_variable() {
        let err = Config::from_lookup(lookup_from(&[("ALIGN_TOPICS", "seven")])).unwrap_err();
        assert!(err.to_string().contains("ALIGN_TOPICS"), "got: {err}");
    }

    #[test]
    fn test_non_finite_priors_rejected() {
        for (name, raw) in [
            ("ALIGN_ALPHA", "NaN"),
            ("ALIGN_ALPHA", "inf"),
            ("ALIGN_BETA", "-inf"),
            ("ALIGN_BETA", "0"),
        ] {
            let err = Config::from_lookup(lookup_from(&[(name, raw)])).unwrap_err();
            assert!(
                matches!(err, AlignError::Config(_)),
                "{name}={raw} should be a configuration error, got {err:?}"
            );
        }
    }

    #[test]
    fn test_zero_topics_rejected() {
        let err = Config::from_lookup(lookup_from(&[("ALIGN_TOPICS", "0")])).unwrap_err();
        assert!(matches!(err, AlignError::Config(_)));
    }
}
