//! Ordered annotation storage with a single selection.

use crate::error::SessionError;
use crate::model::{Annotation, Geometry, Properties, normalize_properties};

/// All annotations of the current image, in insertion order (which is also
/// drawing order), plus the selected index.
///
/// Invariant: `selected` is either `None` or a valid index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationStore {
    annotations: Vec<Annotation>,
    selected: Option<usize>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an annotation and return its index. The selection is left
    /// alone.
    pub fn add(&mut self, geometry: Geometry, properties: Properties) -> usize {
        self.annotations.push(Annotation {
            properties,
            geometry,
        });
        self.annotations.len() - 1
    }

    /// Remove the annotation at `index` and shift the selection so it keeps
    /// pointing at the same record (or nothing, if that record was removed).
    pub fn remove(&mut self, index: usize) -> Result<Annotation, SessionError> {
        self.check(index)?;
        let removed = self.annotations.remove(index);
        self.selected = match self.selected {
            Some(sel) if sel == index => None,
            Some(sel) if sel > index => Some(sel - 1),
            other => other,
        };
        Ok(removed)
    }

    /// Replace the properties of an annotation as edited by a user: keys and
    /// values are trimmed and blank keys dropped.
    pub fn set_properties(&mut self, index: usize, properties: Properties) -> Result<(), SessionError> {
        self.check(index)?;
        self.annotations[index].properties = normalize_properties(
            properties
                .into_iter()
                .map(|(key, value)| (key, value.trim().to_string())),
        );
        Ok(())
    }

    /// Set or overwrite one property. The key and value are trimmed.
    pub fn set_property(&mut self, index: usize, key: &str, value: &str) -> Result<(), SessionError> {
        self.check(index)?;
        let key = key.trim();
        if key.is_empty() {
            log::debug!("Ignoring property with blank key on annotation {}", index);
            return Ok(());
        }
        self.annotations[index]
            .properties
            .insert(key.to_string(), value.trim().to_string());
        Ok(())
    }

    /// Remove one property, keeping the order of the rest. Returns the old
    /// value, if any.
    pub fn remove_property(&mut self, index: usize, key: &str) -> Result<Option<String>, SessionError> {
        self.check(index)?;
        Ok(self.annotations[index].properties.shift_remove(key.trim()))
    }

    /// Select an annotation, or clear the selection with `None`.
    pub fn select(&mut self, index: Option<usize>) -> Result<(), SessionError> {
        if let Some(index) = index {
            self.check(index)?;
        }
        self.selected = index;
        Ok(())
    }

    /// Get the selected index.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Get the selected annotation.
    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selected.and_then(|i| self.annotations.get(i))
    }

    /// Remove everything and clear the selection.
    pub fn clear(&mut self) {
        self.annotations.clear();
        self.selected = None;
    }

    /// Swap in a new set of annotations. The selection is cleared.
    pub fn replace_all(&mut self, annotations: Vec<Annotation>) {
        self.annotations = annotations;
        self.selected = None;
    }

    /// Append a batch of annotations. The selection is cleared.
    pub fn append_all(&mut self, annotations: Vec<Annotation>) {
        self.annotations.extend(annotations);
        self.selected = None;
    }

    pub fn get(&self, index: usize) -> Option<&Annotation> {
        self.annotations.get(index)
    }

    pub fn as_slice(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter()
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    fn check(&self, index: usize) -> Result<(), SessionError> {
        if index < self.annotations.len() {
            Ok(())
        } else {
            Err(SessionError::index_out_of_range(index, self.annotations.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Point;

    fn line(offset: f64) -> Geometry {
        Geometry::LineString(vec![Point::new(offset, 0.0), Point::new(offset, 10.0)])
    }

    fn store_with(n: usize) -> AnnotationStore {
        let mut store = AnnotationStore::new();
        for i in 0..n {
            store.add(line(i as f64), Properties::new());
        }
        store
    }

    #[test]
    fn test_add_returns_index_and_does_not_select() {
        let mut store = AnnotationStore::new();
        assert_eq!(store.add(line(0.0), Properties::new()), 0);
        assert_eq!(store.add(line(1.0), Properties::new()), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_remove_fixes_up_selection() {
        // For every (selected, removed) pair the selection follows the
        // three-way rule: cleared, shifted down, or untouched.
        let n = 4;
        for sel in 0..n {
            for rm in 0..n {
                let mut store = store_with(n);
                store.select(Some(sel)).unwrap();
                let kept = store.get(sel).cloned();

                store.remove(rm).unwrap();

                let expected = if sel == rm {
                    None
                } else if sel > rm {
                    Some(sel - 1)
                } else {
                    Some(sel)
                };
                assert_eq!(store.selected(), expected, "sel={sel} rm={rm}");
                if expected.is_some() {
                    assert_eq!(store.selected_annotation().cloned(), kept);
                }
            }
        }
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut store = store_with(2);
        store.select(Some(1)).unwrap();
        let err = store.remove(2).unwrap_err();
        assert!(matches!(err, SessionError::IndexOutOfRange { index: 2, len: 2 }));
        assert_eq!(store.len(), 2);
        assert_eq!(store.selected(), Some(1));
    }

    #[test]
    fn test_select_out_of_range() {
        let mut store = store_with(1);
        assert!(store.select(Some(1)).is_err());
        assert_eq!(store.selected(), None);
        store.select(Some(0)).unwrap();
        store.select(None).unwrap();
        assert_eq!(store.selected(), None);
    }

    #[test]
    fn test_set_properties_replaces_wholesale() {
        let mut store = store_with(1);
        store.set_property(0, "old", "1").unwrap();

        let mut props = Properties::new();
        props.insert("name".into(), "gate".into());
        props.insert("  ".into(), "dropped".into());
        props.insert("height".into(), "2.5".into());
        store.set_properties(0, props).unwrap();

        let ann = store.get(0).unwrap();
        assert_eq!(ann.properties.len(), 2);
        assert!(!ann.properties.contains_key("old"));
        assert_eq!(ann.properties["height"], "2.5");
    }

    #[test]
    fn test_edited_values_are_trimmed() {
        let mut store = store_with(1);
        let mut props = Properties::new();
        props.insert(" name ".into(), "  gate ".into());
        store.set_properties(0, props).unwrap();
        store.set_property(0, "height", " 2.5\t").unwrap();

        let ann = store.get(0).unwrap();
        assert_eq!(ann.properties["name"], "gate");
        assert_eq!(ann.properties["height"], "2.5");
    }

    #[test]
    fn test_single_property_edits() {
        let mut store = store_with(1);
        store.set_property(0, "a", "1").unwrap();
        store.set_property(0, "b", "2").unwrap();
        store.set_property(0, "c", "3").unwrap();
        store.set_property(0, " ", "ignored").unwrap();
        assert_eq!(store.remove_property(0, "b").unwrap(), Some("2".to_string()));
        assert_eq!(store.remove_property(0, "zzz").unwrap(), None);

        let keys: Vec<_> = store.get(0).unwrap().properties.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert!(store.set_property(5, "a", "1").is_err());
    }

    #[test]
    fn test_clear_and_bulk_loads() {
        let mut store = store_with(2);
        store.select(Some(0)).unwrap();
        store.append_all(vec![Annotation::new(line(9.0))]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.selected(), None);

        store.replace_all(vec![Annotation::new(line(5.0))]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(0).unwrap().geometry, line(5.0));

        store.select(Some(0)).unwrap();
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.selected(), None);
    }
}
