//! Document-section classification.
//!
//! Raws files declare an object header (`[OBJECT:ITEM]`) and then a run of
//! objects whose opening token names the object type (`[ITEM_WEAPON:...]`,
//! `[ITEM_AMMO:...]`). Property queries stop at the next token that opens an
//! object under the same header, so they need to know which object types
//! belong together.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::warn;

/// Maps object type values to the set of values that start a sibling object.
pub trait SectionClassifier {
    /// The header an object type lives under.
    fn header_for(&self, object: &str) -> Option<&str>;

    /// Every object type declared under `header`.
    fn objects_for(&self, header: &str) -> Option<&BTreeSet<String>>;

    /// Values that begin the next object after a token with value `value`.
    /// `None` when `value` is not a known object type.
    fn boundary_values(&self, value: &str) -> Option<BTreeSet<String>> {
        let header = self.header_for(value)?;
        self.objects_for(header).cloned()
    }
}

/// Like [`SectionClassifier::boundary_values`], falling back to `{value}`
/// for unknown object types so a property scan still stops at the next token
/// of the same kind.
pub fn boundary_or_self<C>(classifier: &C, value: &str) -> BTreeSet<String>
where
    C: SectionClassifier + ?Sized,
{
    classifier.boundary_values(value).unwrap_or_else(|| {
        warn!(value, "unknown object type, bounding properties by its own value");
        BTreeSet::from([value.to_string()])
    })
}

const BUILTIN: &[(&str, &[&str])] = &[
    ("BODY", &["BODY"]),
    ("BODY_DETAIL_PLAN", &["BODY_DETAIL_PLAN"]),
    ("BUILDING", &["BUILDING_WORKSHOP", "BUILDING_FURNACE"]),
    ("CREATURE", &["CREATURE"]),
    ("CREATURE_VARIATION", &["CREATURE_VARIATION"]),
    ("DESCRIPTOR_COLOR", &["COLOR"]),
    ("DESCRIPTOR_PATTERN", &["COLOR_PATTERN"]),
    ("DESCRIPTOR_SHAPE", &["SHAPE"]),
    ("ENTITY", &["ENTITY"]),
    ("GRAPHICS", &["TILE_PAGE", "CREATURE_GRAPHICS"]),
    ("INORGANIC", &["INORGANIC"]),
    ("INTERACTION", &["INTERACTION"]),
    (
        "ITEM",
        &[
            "ITEM_AMMO",
            "ITEM_ARMOR",
            "ITEM_FOOD",
            "ITEM_GLOVES",
            "ITEM_HELM",
            "ITEM_INSTRUMENT",
            "ITEM_PANTS",
            "ITEM_SHIELD",
            "ITEM_SHOES",
            "ITEM_SIEGEAMMO",
            "ITEM_TOOL",
            "ITEM_TOY",
            "ITEM_TRAPCOMP",
            "ITEM_WEAPON",
        ],
    ),
    ("LANGUAGE", &["WORD", "SYMBOL", "TRANSLATION"]),
    ("MATERIAL_TEMPLATE", &["MATERIAL_TEMPLATE"]),
    ("PLANT", &["PLANT"]),
    ("REACTION", &["REACTION"]),
    ("TISSUE_TEMPLATE", &["TISSUE_TEMPLATE"]),
];

/// Header/object-type table.
///
/// [`ObjectHeaders::default`] carries the Dwarf Fortress object types;
/// [`ObjectHeaders::empty`] starts blank for fully custom tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectHeaders {
    headers: BTreeMap<String, BTreeSet<String>>,
    owners: HashMap<String, String>,
}

impl Default for ObjectHeaders {
    fn default() -> Self {
        let mut table = Self::empty();
        for (header, objects) in BUILTIN {
            table.insert(*header, objects.iter().copied());
        }
        table
    }
}

impl ObjectHeaders {
    pub fn empty() -> Self {
        Self {
            headers: BTreeMap::new(),
            owners: HashMap::new(),
        }
    }

    /// Declare object types under `header`.
    ///
    /// An object type belongs to exactly one header; declaring it again moves
    /// it.
    pub fn insert<I, S>(&mut self, header: impl Into<String>, objects: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let header = header.into();
        for object in objects {
            let object = object.into();
            if let Some(previous) = self.owners.insert(object.clone(), header.clone()) {
                if previous != header {
                    if let Some(set) = self.headers.get_mut(&previous) {
                        set.remove(&object);
                        if set.is_empty() {
                            self.headers.remove(&previous);
                        }
                    }
                }
            }
            self.headers.entry(header.clone()).or_default().insert(object);
        }
    }

    pub fn headers(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.headers.iter().map(|(h, objects)| (h.as_str(), objects))
    }

    pub fn len(&self) -> usize {
        self.headers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }
}

impl SectionClassifier for ObjectHeaders {
    fn header_for(&self, object: &str) -> Option<&str> {
        self.owners.get(object).map(String::as_str)
    }

    fn objects_for(&self, header: &str) -> Option<&BTreeSet<String>> {
        self.headers.get(header)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_item_siblings() {
        let table = ObjectHeaders::default();
        assert_eq!(table.header_for("ITEM_WEAPON"), Some("ITEM"));
        let boundary = table.boundary_values("ITEM_WEAPON").unwrap();
        assert!(boundary.contains("ITEM_AMMO"));
        assert!(boundary.contains("ITEM_WEAPON"));
        assert!(!boundary.contains("CREATURE"));
    }

    #[test]
    fn unknown_object_falls_back_to_itself() {
        let table = ObjectHeaders::default();
        assert!(table.boundary_values("SYNDROME").is_none());
        assert_eq!(
            boundary_or_self(&table, "SYNDROME"),
            BTreeSet::from(["SYNDROME".to_string()])
        );
    }

    #[test]
    fn insert_moves_object_between_headers() {
        let mut table = ObjectHeaders::empty();
        table.insert("A", ["X", "Y"]);
        table.insert("B", ["Y"]);
        assert_eq!(table.header_for("Y"), Some("B"));
        assert_eq!(table.objects_for("A").unwrap().len(), 1);

        table.insert("B", ["X"]);
        assert!(table.objects_for("A").is_none());
        assert_eq!(table.len(), 1);
    }
}
