//! Initiative order: heroes and monsters in a user-arranged list.

use tracing::debug;

use crate::hp_expr::{ExprError, HpInput};
use crate::manual::MonsterRecord;

/// Suggestions offered while typing a monster name.
pub const DEFAULT_SUGGESTIONS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Hero,
    Monster,
}

impl Kind {
    pub fn label(&self) -> &'static str {
        match self {
            Kind::Hero => "Hero",
            Kind::Monster => "Monster",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    pub kind: Kind,
    /// May go negative for heroes.
    pub hp: i32,
    pub ac: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpChange {
    Updated { hp: i32 },
    /// A monster dropped to zero or below and left the list.
    Removed,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HpError {
    #[error("no combatant with id {0:?}")]
    UnknownEntry(EntryId),
    #[error("invalid hit points: {0}")]
    Invalid(#[from] ExprError),
}

/// Vertical extent of a rendered row, as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowGeometry {
    pub id: EntryId,
    pub top: f64,
    pub height: f64,
}

impl RowGeometry {
    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Row the dragged entry should be inserted before: the first other row
/// whose midpoint lies below the pointer.  `None` means append.
pub fn drop_target(dragged: EntryId, pointer_y: f64, rows: &[RowGeometry]) -> Option<EntryId> {
    rows.iter()
        .filter(|row| row.id != dragged)
        .find(|row| pointer_y < row.midpoint())
        .map(|row| row.id)
}

#[derive(Debug, Default)]
pub struct InitiativeTracker {
    entries: Vec<Entry>,
    next_id: u64,
}

impl InitiativeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, name: impl Into<String>, kind: Kind, hp: i32, ac: Option<i32>) -> EntryId {
        let id = EntryId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            name: name.into(),
            kind,
            hp,
            ac,
        });
        id
    }

    /// Add a monster using the reference's canonical name, HP and AC.
    pub fn add_from_reference(&mut self, index: &MonsterIndex, name: &str) -> Option<EntryId> {
        let record = index.lookup(name)?;
        let hp = record.hit_points().unwrap_or(0);
        Some(self.add(record.name.clone(), Kind::Monster, hp, record.armor_class()))
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    pub fn remove(&mut self, id: EntryId) -> Option<Entry> {
        let idx = self.position(id)?;
        Some(self.entries.remove(idx))
    }

    /// Apply a hit-point field submission.  On error nothing changes.
    pub fn adjust_hp(&mut self, id: EntryId, input: &str) -> Result<HpChange, HpError> {
        let idx = self.position(id).ok_or(HpError::UnknownEntry(id))?;
        let entry = &mut self.entries[idx];
        let hp = HpInput::parse(input)?.apply(entry.hp)?;

        if entry.kind == Kind::Monster && hp <= 0 {
            debug!("{} is down, removing from initiative", entry.name);
            self.entries.remove(idx);
            return Ok(HpChange::Removed);
        }
        entry.hp = hp;
        Ok(HpChange::Updated { hp })
    }

    /// Move `id` before `before`, or to the end when `before` is `None` or
    /// unknown.  Returns false if `id` is not in the list.
    pub fn reorder(&mut self, id: EntryId, before: Option<EntryId>) -> bool {
        if before == Some(id) {
            return self.position(id).is_some();
        }
        let Some(from) = self.position(id) else {
            return false;
        };
        let entry = self.entries.remove(from);
        match before.and_then(|b| self.position(b)) {
            Some(to) => self.entries.insert(to, entry),
            None => self.entries.push(entry),
        }
        true
    }

    /// Drop every monster, keeping heroes in order.  Returns how many left.
    pub fn clear_monsters(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.kind == Kind::Hero);
        before - self.entries.len()
    }
}

/// Name lookup over the monster reference for the "add monster" field.
#[derive(Debug, Clone, Default)]
pub struct MonsterIndex {
    records: Vec<MonsterRecord>,
    lowered: Vec<String>,
}

impl MonsterIndex {
    pub fn new(records: Vec<MonsterRecord>) -> Self {
        let lowered = records.iter().map(|r| r.name.to_lowercase()).collect();
        Self { records, lowered }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Prefix matches first, then other substring matches, each group in
    /// dataset order.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<&MonsterRecord> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let prefix = self
            .lowered
            .iter()
            .enumerate()
            .filter(|(_, name)| name.starts_with(&query));
        let inner = self
            .lowered
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.starts_with(&query) && name.contains(&query));

        prefix
            .chain(inner)
            .take(limit)
            .map(|(i, _)| &self.records[i])
            .collect()
    }

    /// Exact name match, ignoring case and surrounding whitespace.
    pub fn lookup(&self, name: &str) -> Option<&MonsterRecord> {
        let name = name.trim().to_lowercase();
        self.lowered
            .iter()
            .position(|n| *n == name)
            .map(|i| &self.records[i])
    }
}
