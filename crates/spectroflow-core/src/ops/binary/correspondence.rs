//! Channel correspondence between differently grouped workspaces.
//!
//! When the two operands group their detection elements differently (say
//! 2000 fine channels against 20 coarse groups), each left-hand channel is
//! matched to the single right-hand channel that contains its whole
//! element-ID set. A left-hand grouping that does not nest cleanly inside
//! exactly one right-hand channel is recorded as [`NO_MATCH`]; that is a
//! per-channel condition, not a failure. Only a complete absence of any
//! cross-workspace ID overlap is fatal.

use std::collections::{BTreeSet, HashMap};

use crate::container::ElementId;
use crate::error::{Result, SpectroError};

/// Sentinel entry for a left-hand channel with no unambiguous counterpart.
pub const NO_MATCH: i64 = -1;

/// Per-invocation table mapping each LHS channel index to its RHS channel
/// index, or [`NO_MATCH`]. Built fresh for every operation; never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorrespondenceTable {
    entries: Vec<i64>,
}

impl CorrespondenceTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[i64] {
        &self.entries
    }

    /// The matched RHS channel for LHS channel `index`, or `None` for
    /// [`NO_MATCH`].
    ///
    /// # Panics
    /// Panics if `index` is out of range.
    pub fn rhs_channel(&self, index: usize) -> Option<usize> {
        match self.entries[index] {
            NO_MATCH => None,
            matched => Some(matched as usize),
        }
    }

    /// Number of LHS channels with an unambiguous match.
    pub fn matched_count(&self) -> usize {
        self.entries.iter().filter(|&&entry| entry != NO_MATCH).count()
    }
}

impl std::ops::Index<usize> for CorrespondenceTable {
    type Output = i64;

    /// # Panics
    /// Panics if `index` is out of range.
    fn index(&self, index: usize) -> &Self::Output {
        &self.entries[index]
    }
}

/// Build the correspondence table from the two operands' per-channel
/// element-ID sets.
///
/// A reverse index from RHS element ID to RHS channel keeps the cost linear
/// in the total number of element IDs. For each LHS channel, every ID known
/// to the RHS must point at the same RHS channel; IDs absent from the RHS
/// are ignored. A channel whose known IDs span more than one RHS channel,
/// or whose IDs are all unknown, gets [`NO_MATCH`].
///
/// Fails with [`SpectroError::GroupingDisjoint`] only when not a single LHS
/// channel matched, which indicates unrelated instruments or data.
pub fn build_correspondence_table(
    lhs_sets: &[BTreeSet<ElementId>],
    rhs_sets: &[BTreeSet<ElementId>],
) -> Result<CorrespondenceTable> {
    let rhs_id_count: usize = rhs_sets.iter().map(BTreeSet::len).sum();
    let mut rhs_index: HashMap<ElementId, usize> = HashMap::with_capacity(rhs_id_count);
    for (channel, set) in rhs_sets.iter().enumerate() {
        for &id in set {
            rhs_index.insert(id, channel);
        }
    }

    let mut entries = Vec::with_capacity(lhs_sets.len());
    let mut matched = 0usize;
    for set in lhs_sets {
        let mut target: Option<usize> = None;
        let mut ambiguous = false;
        for id in set {
            if let Some(&channel) = rhs_index.get(id) {
                match target {
                    None => target = Some(channel),
                    Some(existing) if existing != channel => {
                        ambiguous = true;
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
        match target {
            Some(channel) if !ambiguous => {
                entries.push(channel as i64);
                matched += 1;
            }
            _ => entries.push(NO_MATCH),
        }
    }

    if matched == 0 {
        return Err(SpectroError::grouping_disjoint(
            "build_correspondence_table",
            "the two workspaces share no element ids in common",
        ));
    }

    Ok(CorrespondenceTable { entries })
}
