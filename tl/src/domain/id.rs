//! Task ID generation and resolution
//!
//! New IDs are UUIDv7 in simple (32 hex char) form: time-ordered, with a
//! random tail so rapid successive adds never collide. IDs loaded from the
//! store are kept verbatim, whatever their format.

/// Task identifier
pub type TaskId = String;

/// Number of trailing characters shown as the short form of an ID
pub const SHORT_ID_LEN: usize = 8;

/// Generate a fresh task ID
pub fn generate_task_id() -> TaskId {
    uuid::Uuid::now_v7().simple().to_string()
}

/// Short display form of an ID (its random tail)
pub fn short_id(id: &str) -> &str {
    let start = id
        .char_indices()
        .rev()
        .nth(SHORT_ID_LEN - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    &id[start..]
}

/// ID resolution for partial matches
pub struct IdResolver<'a> {
    ids: Vec<&'a str>,
}

impl<'a> IdResolver<'a> {
    pub fn new(ids: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Resolve a partial reference to a full ID
    ///
    /// Returns:
    /// - Ok(Some(id)) if exactly one match (an exact match always wins)
    /// - Ok(None) if no matches
    /// - Err with candidates if ambiguous
    pub fn resolve(&self, reference: &str) -> Result<Option<String>, Vec<String>> {
        if reference.is_empty() {
            return Ok(None);
        }

        if let Some(exact) = self.ids.iter().find(|id| **id == reference) {
            return Ok(Some((*exact).to_string()));
        }

        let matches: Vec<String> = self
            .ids
            .iter()
            .filter(|id| Self::matches(id, reference))
            .map(|id| (*id).to_string())
            .collect();

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.into_iter().next()),
            _ => Err(matches),
        }
    }

    /// Check if an ID matches a reference by prefix or by short-form suffix
    fn matches(id: &str, reference: &str) -> bool {
        id.starts_with(reference) || id.ends_with(reference)
    }
}
