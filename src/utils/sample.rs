//! Derivation of the canonical sample name from a FASTQ filename.
//!
//! Every output filename in a run is templated from the sample name, which
//! is itself derived from the primary input filename by stripping a
//! recognized read-one suffix. The suffix set is kept configurable because
//! FASTQ naming conventions vary between sequencing cores: a grammar built
//! from custom patterns behaves exactly like the default one.

use regex::Regex;

/// Suffix patterns recognized by the default grammar, tried in order. Each
/// pattern anchors at the end of the filename; the dotted, underscored, and
/// directly-attached `R1` forms are all recognized, with `fastq`/`fq` and an
/// optional trailing `.gz` in each.
const DEFAULT_SUFFIXES: &[&str] = &[
    r"\.R1\.f(?:ast)?q(?:\.gz)?$",
    r"_R1\.f(?:ast)?q(?:\.gz)?$",
    r"R1\.f(?:ast)?q(?:\.gz)?$",
];

/// The set of read-one suffixes recognized when deriving a sample name.
pub struct SuffixGrammar {
    patterns: Vec<Regex>,
}

impl SuffixGrammar {
    /// Builds a grammar from custom suffix patterns. Patterns are tried in
    /// order and should anchor at the end of the filename.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|pattern| Regex::new(pattern.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SuffixGrammar { patterns })
    }

    /// Strips the first matching suffix from `filename`, returning the
    /// sample name, or [`None`] when no pattern matches. A match that would
    /// leave an empty sample name is ignored.
    pub fn strip(&self, filename: &str) -> Option<String> {
        for pattern in &self.patterns {
            if let Some(found) = pattern.find(filename) {
                if found.start() > 0 {
                    return Some(filename[..found.start()].to_string());
                }
            }
        }

        None
    }
}

impl Default for SuffixGrammar {
    fn default() -> Self {
        SuffixGrammar::new(DEFAULT_SUFFIXES).expect("default suffix patterns compile")
    }
}

/// Derives the sample name for `filename` using `grammar`. When no suffix
/// matches, falls back to stripping only the final extension; a filename
/// with no extension at all is used unchanged.
pub fn derive_sample_name(filename: &str, grammar: &SuffixGrammar) -> String {
    if let Some(sample) = grammar.strip(filename) {
        return sample;
    }

    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => filename.to_string(),
    }
}
