//! Classifies library items into component kinds by their linkage class name.
//!
//! Registrations are an ordered list; the first matching pattern wins. Patterns
//! are globs compiled once at registration.

use globset::{Glob, GlobMatcher};
use serde::{Deserialize, Serialize};

use crate::document::LibraryItem;
use crate::error::{AtlasError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Panel,
    Button,
    ScaleBitmap,
    ProgressBar,
    Scroller,
    MovieClip,
}

/// How generated code exposes an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    /// A standalone panel class.
    Panel,
    /// A reusable component referenced by panels.
    Component,
}

/// An item accepted by the registry.
#[derive(Debug, Clone, Serialize)]
pub struct RegisteredItem {
    /// Root item index in the document.
    pub index: usize,
    pub name: String,
    pub class_name: String,
    /// Ordinal within its kind, in insertion order.
    pub ordinal: usize,
}

struct Registration {
    kind: ComponentKind,
    pattern: String,
    matcher: GlobMatcher,
    export_kind: ExportKind,
}

#[derive(Default)]
pub struct ComponentRegistry {
    registrations: Vec<Registration>,
    items: Vec<(ComponentKind, RegisteredItem)>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the usual naming conventions:
    /// `*Panel`, `*Btn`/`*Button`, `*ScaleBmp`, `*Progress*`, `*Scroller`, `*MC`.
    pub fn with_defaults() -> Self {
        let mut reg = Self::new();
        let defaults = [
            (ComponentKind::Panel, "*Panel", ExportKind::Panel),
            (ComponentKind::Button, "*Btn", ExportKind::Component),
            (ComponentKind::Button, "*Button", ExportKind::Component),
            (ComponentKind::ScaleBitmap, "*ScaleBmp", ExportKind::Component),
            (ComponentKind::ProgressBar, "*Progress*", ExportKind::Component),
            (ComponentKind::Scroller, "*Scroller", ExportKind::Component),
            (ComponentKind::MovieClip, "*MC", ExportKind::Component),
        ];
        for (kind, pattern, export_kind) in defaults {
            // built-in patterns are valid globs
            if let Ok(glob) = Glob::new(pattern) {
                reg.registrations.push(Registration {
                    kind,
                    pattern: pattern.to_string(),
                    matcher: glob.compile_matcher(),
                    export_kind,
                });
            }
        }
        reg
    }

    /// Appends a pattern for `kind`; earlier registrations take precedence.
    pub fn register(
        &mut self,
        kind: ComponentKind,
        pattern: &str,
        export_kind: ExportKind,
    ) -> Result<()> {
        let glob = Glob::new(pattern)
            .map_err(|e| AtlasError::InvalidConfig(format!("pattern `{}`: {}", pattern, e)))?;
        self.registrations.push(Registration {
            kind,
            pattern: pattern.to_string(),
            matcher: glob.compile_matcher(),
            export_kind,
        });
        Ok(())
    }

    fn matching(&self, item: &LibraryItem) -> Option<&Registration> {
        let class_name = item.linkage_class_name.as_deref()?;
        self.registrations
            .iter()
            .find(|r| r.matcher.is_match(class_name))
    }

    /// First matching kind, or `None` for items without a linkage name or match.
    pub fn classify(&self, item: &LibraryItem) -> Option<ComponentKind> {
        self.matching(item).map(|r| r.kind)
    }

    /// Export kind of the registration that classifies `item`.
    pub fn export_kind(&self, item: &LibraryItem) -> Option<ExportKind> {
        self.matching(item).map(|r| r.export_kind)
    }

    /// Pattern that classified `item`; useful for diagnostics.
    pub fn pattern_for(&self, item: &LibraryItem) -> Option<&str> {
        self.matching(item).map(|r| r.pattern.as_str())
    }

    /// Stores a classified item. Returns its kind, or `None` if nothing matched.
    pub fn add(&mut self, index: usize, item: &LibraryItem) -> Option<ComponentKind> {
        let kind = self.classify(item)?;
        let ordinal = self.items.iter().filter(|(k, _)| *k == kind).count();
        self.items.push((
            kind,
            RegisteredItem {
                index,
                name: item.name.clone(),
                class_name: item.linkage_class_name.clone().unwrap_or_default(),
                ordinal,
            },
        ));
        Some(kind)
    }

    /// Visits the items of `kind` in insertion order.
    pub fn for_each<F: FnMut(&RegisteredItem)>(&self, kind: ComponentKind, mut f: F) {
        for (_, item) in self.items.iter().filter(|(k, _)| *k == kind) {
            f(item);
        }
    }

    /// Class names of `kind`, indexed by ordinal.
    pub fn class_names(&self, kind: ComponentKind) -> Vec<&str> {
        self.items
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, it)| it.class_name.as_str())
            .collect()
    }
}
