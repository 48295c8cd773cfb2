//! Priority-scoped setting resolution.
//!
//! A setting may be given globally, per object, per material, or per
//! (object, material) pair; the highest-priority applicable entry wins.
//! Precedence lives entirely in this table; callers only ever ask
//! [`Scoped::resolve`] with the scopes that apply to them.

use std::fmt;

use crate::error::{RepackError, Result};
use crate::types::{MaterialId, ObjectId};

/// Where a setting entry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Global,
    Object(ObjectId),
    Material(MaterialId),
    ObjectMaterial(ObjectId, MaterialId),
}

impl Scope {
    /// Global sits far below everything so any explicit entry overrides it;
    /// pair scope outranks single-key scopes.
    pub fn default_priority(&self) -> i32 {
        match self {
            Scope::Global => -1000,
            Scope::Object(_) | Scope::Material(_) => 0,
            Scope::ObjectMaterial(..) => 100,
        }
    }
}

/// One setting resolvable across scopes.
///
/// Entries are an explicit `(scope, priority, value)` list; `set` replaces
/// an existing entry for the same scope.
#[derive(Debug, Clone)]
pub struct Scoped<T> {
    name: &'static str,
    entries: Vec<(Scope, i32, T)>,
}

impl<T: fmt::Debug> Scoped<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: Vec::new(),
        }
    }

    /// Setting pre-seeded with a global default.
    pub fn with_global(name: &'static str, value: T) -> Self {
        let mut scoped = Self::new(name);
        scoped.set(Scope::Global, value);
        scoped
    }

    pub fn set(&mut self, scope: Scope, value: T) {
        self.set_with_priority(scope, scope.default_priority(), value);
    }

    pub fn set_with_priority(&mut self, scope: Scope, priority: i32, value: T) {
        if let Some(entry) = self.entries.iter_mut().find(|(s, _, _)| *s == scope) {
            *entry = (scope, priority, value);
        } else {
            self.entries.push((scope, priority, value));
        }
    }

    /// The unique highest-priority value among `applicable` scopes.
    ///
    /// `None` when no applicable scope has an entry. Two entries tied at
    /// the top priority are a configuration error even if the values agree.
    pub fn resolve(&self, applicable: &[Scope]) -> Result<Option<&T>> {
        let mut best: Option<(i32, &T)> = None;
        let mut tied = false;

        for (scope, priority, value) in &self.entries {
            if !applicable.contains(scope) {
                continue;
            }
            match best {
                Some((bp, _)) if *priority > bp => {
                    best = Some((*priority, value));
                    tied = false;
                }
                Some((bp, _)) if *priority == bp => tied = true,
                Some(_) => {}
                None => best = Some((*priority, value)),
            }
        }

        if tied {
            return Err(RepackError::Config(format!(
                "setting '{}' has multiple entries at the same priority for scopes {:?}",
                self.name, applicable
            )));
        }
        Ok(best.map(|(_, v)| v))
    }

    /// Like `resolve`, but an unset value is a configuration error.
    pub fn require(&self, applicable: &[Scope]) -> Result<&T> {
        self.resolve(applicable)?.ok_or_else(|| {
            RepackError::Config(format!(
                "setting '{}' is not set for scopes {:?}",
                self.name, applicable
            ))
        })
    }
}
