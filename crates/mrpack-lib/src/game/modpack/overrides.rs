use crate::error::Result;
use crate::game::modpack::parser::ArchiveEntry;
use crate::game::modpack::types::{
    OverrideSet, Side, BASE_OVERRIDES_PREFIX, CLIENT_OVERRIDES_PREFIX, SERVER_OVERRIDES_PREFIX,
};
use crate::utils::sanitize::normalize_relative_path;

/// Where an archive entry belongs in the override layering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverrideCategory {
    Base,
    Sided(Side),
    Irrelevant,
}

impl OverrideCategory {
    /// Classify an archive entry name and return the remainder after the
    /// category prefix. Irrelevant entries return the name unchanged.
    pub fn classify(name: &str) -> (Self, &str) {
        if let Some(rest) = name.strip_prefix(BASE_OVERRIDES_PREFIX) {
            (OverrideCategory::Base, rest)
        } else if let Some(rest) = name.strip_prefix(SERVER_OVERRIDES_PREFIX) {
            (OverrideCategory::Sided(Side::Server), rest)
        } else if let Some(rest) = name.strip_prefix(CLIENT_OVERRIDES_PREFIX) {
            (OverrideCategory::Sided(Side::Client), rest)
        } else {
            (OverrideCategory::Irrelevant, name)
        }
    }
}

/// Build the merged override set for `side`.
///
/// Base overrides come first, then the overrides of the requested side replace
/// them path by path. Overrides of the other side are dropped.
pub fn collect_overrides<'a, I>(entries: I, side: Side) -> Result<OverrideSet>
where
    I: IntoIterator<Item = &'a ArchiveEntry>,
{
    let mut base = OverrideSet::new();
    let mut sided = OverrideSet::new();
    let mut discarded = 0usize;

    for entry in entries {
        let (category, rest) = OverrideCategory::classify(&entry.name);
        if category == OverrideCategory::Irrelevant || rest.is_empty() || rest.ends_with('/') {
            continue;
        }

        match category {
            OverrideCategory::Base => {
                base.insert(normalize_relative_path(rest)?, entry.data.clone());
            }
            OverrideCategory::Sided(entry_side) if entry_side == side => {
                sided.insert(normalize_relative_path(rest)?, entry.data.clone());
            }
            OverrideCategory::Sided(_) => discarded += 1,
            OverrideCategory::Irrelevant => {}
        }
    }

    log::debug!(
        "[collect_overrides] side={} base={} sided={} discarded={}",
        side,
        base.len(),
        sided.len(),
        discarded
    );

    base.overlay(sided);
    Ok(base)
}
