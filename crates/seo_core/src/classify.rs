/// Banner text shown when the backend reports a missing model credential.
pub const CREDENTIAL_BANNER_MESSAGE: &str = "Missing API key: set OPENROUTER_API_KEY in the backend \
server environment and restart the analysis.";

const CREDENTIAL_MARKERS: [&str; 4] = ["openai", "openrouter", "api key", "required"];

/// Whether the backend should expand `target` into the URLs of a sitemap.
pub fn is_sitemap_target(target: &str) -> bool {
    let lower = target.to_lowercase();
    lower.contains("sitemap") || lower.ends_with(".xml") || lower.contains("/sitemap")
}

/// Whether an error message stems from missing backend credentials or configuration.
pub fn is_credential_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    CREDENTIAL_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}
