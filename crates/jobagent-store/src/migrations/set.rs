//! Migration units and the validated, ordered set the sequencer runs

use std::borrow::Cow;

use super::checksums::compute_checksum;
use crate::errors::{ordering_error, Result};

/// One atomic, versioned schema change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    id: Cow<'static, str>,
    sql: Cow<'static, str>,
}

impl Migration {
    /// Create a unit; `id` must look like `NNN_name`
    pub fn new(id: impl Into<Cow<'static, str>>, sql: impl Into<Cow<'static, str>>) -> Self {
        Self {
            id: id.into(),
            sql: sql.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Numeric prefix of the id, or None when the id is malformed
    pub fn version(&self) -> Option<u32> {
        let (prefix, name) = self.id.split_once('_')?;
        if prefix.is_empty() || name.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        prefix.parse().ok()
    }

    pub fn checksum(&self) -> String {
        compute_checksum(&self.sql)
    }
}

/// Migration units in a validated order
///
/// Versions start at 1 and increase by exactly one per unit, so a set can
/// neither contain duplicates nor skip a predecessor.
#[derive(Debug, Clone)]
pub struct MigrationSet {
    units: Vec<(u32, Migration)>,
}

impl MigrationSet {
    /// Validate the declared order of `units`
    ///
    /// # Errors
    /// `MigrationOrder` for a malformed id, a duplicate or out-of-order
    /// version, or a missing predecessor.
    pub fn new(units: Vec<Migration>) -> Result<Self> {
        let mut validated = Vec::with_capacity(units.len());
        let mut previous = 0u32;

        for unit in units {
            let version = unit.version().ok_or_else(|| {
                ordering_error(unit.id(), "Migration id must be '<number>_<name>'")
            })?;

            if version == 0 {
                return Err(ordering_error(unit.id(), "Migration versions start at 001"));
            }
            if version == previous {
                return Err(ordering_error(
                    unit.id(),
                    &format!("Duplicate migration version {:03}", version),
                ));
            }
            if version < previous {
                return Err(ordering_error(
                    unit.id(),
                    &format!(
                        "Migration version {:03} declared after {:03}",
                        version, previous
                    ),
                ));
            }
            if version != previous + 1 {
                return Err(ordering_error(
                    unit.id(),
                    &format!(
                        "Migration version {:03} is missing its predecessor {:03}",
                        version,
                        previous + 1
                    ),
                ));
            }

            previous = version;
            validated.push((version, unit));
        }

        Ok(Self { units: validated })
    }

    /// The units compiled into this crate
    pub fn embedded() -> Result<Self> {
        Self::new(super::embedded::get_migrations())
    }

    /// Units in ascending version order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Migration)> {
        self.units.iter().map(|(v, m)| (*v, m))
    }

    pub fn get(&self, id: &str) -> Option<(u32, &Migration)> {
        self.iter().find(|(_, m)| m.id() == id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}
