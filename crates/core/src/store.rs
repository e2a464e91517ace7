//! Annotation store
//!
//! Canonical list of annotation records, one per live shape group, and the flush of
//! their translated payloads into the host viewer's annotation storage.

use crate::error::AnnotatorResult;
use crate::host::AnnotationStorageSink;
use pdf_annotator_model::{AnnotationKind, GroupId, HostPayload, ShapeGroup};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Store entry pairing a shape group with its translated host payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub id: GroupId,
    pub page_number: u32,
    pub kind: AnnotationKind,
    /// Serialized shape group
    pub serialized: String,
    pub payload: HostPayload,
    /// Rendered content for kinds the host cannot represent natively
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rendered: Option<String>,
}

impl AnnotationRecord {
    pub fn from_group(
        group: &ShapeGroup,
        payload: HostPayload,
        rendered: Option<String>,
    ) -> AnnotatorResult<Self> {
        Ok(Self {
            id: group.id.clone(),
            page_number: group.page_number,
            kind: group.kind,
            serialized: group.to_serialized()?,
            payload,
            rendered,
        })
    }
}

/// Partial update merged into an existing record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationUpdate {
    pub serialized: Option<String>,
    pub payload: Option<HostPayload>,
    pub rendered: Option<String>,
}

/// In-memory annotation store keyed by group ID
#[derive(Debug, Default)]
pub struct AnnotationStore {
    records: HashMap<GroupId, AnnotationRecord>,
    /// IDs deleted since the last flush, still present in the host storage
    removed: HashSet<GroupId>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for the group's ID
    pub fn save(
        &mut self,
        group: &ShapeGroup,
        payload: HostPayload,
        rendered: Option<String>,
    ) -> AnnotatorResult<()> {
        let record = AnnotationRecord::from_group(group, payload, rendered)?;
        self.removed.remove(&record.id);
        self.records.insert(record.id.clone(), record);
        Ok(())
    }

    /// Insert a previously exported record as is
    pub fn restore(&mut self, record: AnnotationRecord) {
        self.removed.remove(&record.id);
        self.records.insert(record.id.clone(), record);
    }

    /// Merge fields into an existing record. Unknown IDs are ignored.
    ///
    /// Returns whether a record was updated.
    pub fn update(&mut self, id: &str, update: AnnotationUpdate) -> bool {
        let Some(record) = self.records.get_mut(id) else {
            tracing::debug!(id, "update for unknown annotation ignored");
            return false;
        };

        if let Some(serialized) = update.serialized {
            record.serialized = serialized;
        }
        if let Some(payload) = update.payload {
            record.payload = payload;
        }
        if let Some(rendered) = update.rendered {
            record.rendered = Some(rendered);
        }
        true
    }

    /// All records of a page, in no particular order
    pub fn get_by_page(&self, page_number: u32) -> Vec<&AnnotationRecord> {
        self.records
            .values()
            .filter(|record| record.page_number == page_number)
            .collect()
    }

    pub fn annotation(&self, id: &str) -> Option<&AnnotationRecord> {
        self.records.get(id)
    }

    /// Remove a record; the caller removes the visual group from its editor
    pub fn delete(&mut self, id: &str) -> Option<AnnotationRecord> {
        let record = self.records.remove(id)?;
        self.removed.insert(record.id.clone());
        Some(record)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Flush translated records into the host viewer's annotation storage
    ///
    /// Writes every live record under its ID and removes records deleted since the
    /// previous flush.
    pub fn reset_annotation_storage<S>(&mut self, sink: &mut S)
    where
        S: AnnotationStorageSink + ?Sized,
    {
        for id in self.removed.drain() {
            sink.storage_remove(&id);
        }
        for record in self.records.values() {
            sink.storage_set_value(&record.id, &record.payload);
        }
        tracing::debug!(count = self.records.len(), "flushed annotation storage");
    }

    /// Records as a JSON array, sorted by page then ID
    pub fn export_json(&self) -> AnnotatorResult<String> {
        let mut records: Vec<&AnnotationRecord> = self.records.values().collect();
        records.sort_by(|a, b| (a.page_number, &a.id).cmp(&(b.page_number, &b.id)));
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use pdf_annotator_model::{InkPayload, Rect, Shape, ShapeGeometry, ShapeStyle, Transform};

    fn group(page_number: u32) -> ShapeGroup {
        let mut group =
            ShapeGroup::new(page_number, AnnotationKind::Rectangle, Transform::default());
        group.push(Shape::new(
            ShapeGeometry::Rect {
                rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            },
            ShapeStyle::default(),
        ));
        group
    }

    fn payload(page_index: u32) -> HostPayload {
        HostPayload::Ink(InkPayload {
            annotation_type: 15,
            color: [255, 0, 0],
            thickness: 2.0,
            opacity: 1.0,
            paths: Vec::new(),
            page_index,
            rect: [0.0, 0.0, 10.0, 10.0],
            rotation: 0,
        })
    }

    #[test]
    fn save_indexes_by_page() {
        let mut store = AnnotationStore::new();
        let first = group(1);
        let second = group(2);
        store.save(&first, payload(0), None).unwrap();
        store.save(&second, payload(1), None).unwrap();

        assert_eq!(store.len(), 2);
        let page_one = store.get_by_page(1);
        assert_eq!(page_one.len(), 1);
        assert_eq!(page_one[0].id, first.id);
        assert!(store.get_by_page(3).is_empty());
    }

    #[test]
    fn save_overwrites_existing_record() {
        let mut store = AnnotationStore::new();
        let group = group(1);
        store.save(&group, payload(0), None).unwrap();
        let rendered = Some("data:image/png;base64,AA==".to_string());
        store.save(&group, payload(0), rendered).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.annotation(&group.id).unwrap().rendered.is_some());
    }

    #[test]
    fn update_merges_fields_and_ignores_unknown_ids() {
        let mut store = AnnotationStore::new();
        let group = group(1);
        store.save(&group, payload(0), None).unwrap();

        let updated = store.update(
            &group.id,
            AnnotationUpdate {
                serialized: Some("{}".into()),
                ..AnnotationUpdate::default()
            },
        );
        assert!(updated);
        let record = store.annotation(&group.id).unwrap();
        assert_eq!(record.serialized, "{}");
        assert_eq!(record.payload, payload(0));

        assert!(!store.update("missing", AnnotationUpdate::default()));
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = AnnotationStore::new();
        let group = group(1);
        store.save(&group, payload(0), None).unwrap();

        assert!(store.delete(&group.id).is_some());
        assert!(store.delete(&group.id).is_none());
        assert!(store.annotation(&group.id).is_none());
    }

    #[test]
    fn flush_writes_live_records_and_removes_deleted_ones() {
        let mut store = AnnotationStore::new();
        let mut host = MemoryHost::new();
        let kept = group(1);
        let dropped = group(1);
        store.save(&kept, payload(0), None).unwrap();
        store.save(&dropped, payload(0), None).unwrap();
        store.reset_annotation_storage(&mut host);
        assert_eq!(host.storage().len(), 2);

        store.delete(&dropped.id);
        store.reset_annotation_storage(&mut host);
        assert_eq!(host.storage().len(), 1);
        assert!(host.storage().contains_key(&kept.id));
    }

    #[test]
    fn export_lists_records_as_json() {
        let mut store = AnnotationStore::new();
        store.save(&group(2), payload(1), None).unwrap();
        store.save(&group(1), payload(0), None).unwrap();

        let exported = store.export_json().unwrap();
        let json: serde_json::Value = serde_json::from_str(&exported).unwrap();
        let records = json.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["pageNumber"], 1);
        assert_eq!(records[1]["kind"], "rectangle");
    }
}
