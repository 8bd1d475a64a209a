//! Context augmentation — expand inline @references into labeled blocks

use docchat_client::CapabilityClient;
use docchat_core::Error;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

/// Marker that introduces an inline document reference.
pub const REFERENCE_SIGIL: char = '@';

fn reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"@([A-Za-z0-9][A-Za-z0-9._-]*)").expect("reference regex"))
}

/// Result of augmenting one utterance. Best-effort per reference: failures
/// are reported here, never raised.
#[derive(Debug)]
pub struct Augmented {
    /// Original utterance followed by one labeled block per resolved
    /// reference, in first-appearance order.
    pub message: String,
    /// References that could not be fetched, with the failure each hit.
    pub unresolved: Vec<(String, Error)>,
}

impl Augmented {
    pub fn is_partial(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

/// Distinct `@id` references in first-appearance order.
pub fn scan_references(input: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for capture in reference_pattern().captures_iter(input) {
        let id = capture[1].to_string();
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Expand every `@id` reference in `input` into a labeled content block
/// fetched from the document endpoint. Duplicates are fetched once; an
/// unresolvable reference is recorded and the rest still resolve.
pub async fn augment(client: &CapabilityClient, input: &str) -> Augmented {
    let mut message = input.to_string();
    let mut unresolved = Vec::new();

    for id in scan_references(input) {
        match client
            .read_endpoint(&format!("docs://documents/{}", id))
            .await
        {
            Ok(result) => {
                let content = result.to_content_string();
                debug!("augment: attached {} ({} bytes)", id, content.len());
                message.push_str(&format!(
                    "\n\n<document id=\"{}\">\n{}\n</document>",
                    id, content
                ));
            }
            Err(err) => {
                debug!("augment: unresolved {}: {}", id, err);
                unresolved.push((id, err));
            }
        }
    }

    Augmented {
        message,
        unresolved,
    }
}
