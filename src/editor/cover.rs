//! Deciding what to do when the embedded cover is reloaded.

/// A question to put to the user before touching the cover.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoverPrompt {
    /// The file has no embedded cover any more but one is displayed.
    Unset,
    /// The embedded cover differs from the one displayed.
    LoadEmbedded { hash: String },
}

impl CoverPrompt {
    pub fn title(&self) -> &'static str {
        "Reload Embedded Cover Art"
    }

    pub fn message(&self) -> &'static str {
        match self {
            CoverPrompt::Unset => {
                "The current track does not have an embedded cover art.\n\
                 Do you want to unset the current cover art?"
            }
            CoverPrompt::LoadEmbedded { .. } => {
                "The current cover art is different from the embedded cover art.\n\
                 Do you want to load the embedded cover art?"
            }
        }
    }
}

/// Compare the embedded cover hash with the last loaded one.
///
/// Empty strings count as "no hash". Equal hashes need no prompt.
pub fn reload_decision(embedded: Option<&str>, loaded: Option<&str>) -> Option<CoverPrompt> {
    let embedded = embedded.filter(|h| !h.is_empty());
    let loaded = loaded.filter(|h| !h.is_empty());

    match (embedded, loaded) {
        (None, Some(_)) => Some(CoverPrompt::Unset),
        (Some(new), old) if Some(new) != old => Some(CoverPrompt::LoadEmbedded {
            hash: new.to_string(),
        }),
        _ => None,
    }
}
