use sha2::{Digest, Sha256};

/// Portable, deterministic report filename: `{slug(target)}--{short_hash(target)}.{extension}`.
pub fn report_filename(target: &str, extension: &str) -> String {
    let slug = slugify(strip_scheme(target));
    let hash = short_hash(target);
    format!("{slug}--{hash}.{extension}")
}

fn strip_scheme(target: &str) -> &str {
    target
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(target)
}

fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut prev_dash = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            prev_dash = false;
        } else if !prev_dash {
            slug.push('-');
            prev_dash = true;
        }
    }
    let mut slug = slug.trim_end_matches('-').to_string();
    if slug.len() > 60 {
        slug.truncate(60);
        slug = slug.trim_end_matches('-').to_string();
    }
    if slug.is_empty() {
        slug.push_str("report");
    }
    slug
}

fn short_hash(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    let mut hex = String::with_capacity(8);
    for byte in digest.iter().take(4) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
