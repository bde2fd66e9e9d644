//! Filename templating helpers.
//!
//! The external tools in this pipeline communicate through filenames alone,
//! so every derivation is a small pure function that the stage registry and
//! summary emitter share.

/// Inserts `tag` as an extra dotted component immediately before the final
/// extension: `a.bam` tagged with `deduplicated` becomes
/// `a.deduplicated.bam`. A filename without an extension gets the tag
/// appended instead.
pub fn tag_before_extension(filename: &str, tag: &str) -> String {
    match filename.rsplit_once('.') {
        Some((stem, extension)) => format!("{}.{}.{}", stem, tag, extension),
        None => format!("{}.{}", filename, tag),
    }
}

/// Replaces a filename's `.bam` suffix with `suffix`. A filename without
/// the `.bam` suffix has `suffix` appended unchanged.
pub fn swap_bam_suffix(filename: &str, suffix: &str) -> String {
    match filename.strip_suffix(".bam") {
        Some(stem) => format!("{}{}", stem, suffix),
        None => format!("{}{}", filename, suffix),
    }
}
