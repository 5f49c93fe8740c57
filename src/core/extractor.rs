use crate::domain::model::AvailabilityResult;
use crate::domain::ports::Extractor;
use regex::Regex;
use std::sync::LazyLock;

// "3 sites", "12 Sites Available", "3&nbsp;sites"
static SITES_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+)(?:\s|&nbsp;)+sites\b(?:\s+available\b)?").expect("sites pattern is valid")
});

/// Best-effort count of available sites in unstructured page text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SitesPatternExtractor;

impl Extractor for SitesPatternExtractor {
    fn extract(&self, document: &str) -> AvailabilityResult {
        for caps in SITES_PATTERN.captures_iter(document) {
            // 數字過大就略過，繼續找下一個
            match caps[1].parse::<u32>() {
                Ok(count) => {
                    tracing::debug!("Matched availability text: {:?}", &caps[0]);
                    return AvailabilityResult::Count(count);
                }
                Err(_) => continue,
            }
        }

        tracing::debug!("No site count found in {} bytes of text", document.len());
        AvailabilityResult::Unknown
    }
}
