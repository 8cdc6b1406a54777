// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Attendance and mark records, and their stores.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, StoreResult};
use crate::identity::UserId;

/// Store-assigned record identifier.
pub type RecordId = i64;

// =============================================================================
// Records
// =============================================================================

/// Attendance status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    /// Returns the wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "present" => Ok(AttendanceStatus::Present),
            "absent" => Ok(AttendanceStatus::Absent),
            other => Err(CoreError::validation(format!(
                "status must be 'present' or 'absent', got '{}'",
                other
            ))),
        }
    }
}

/// A single attendance entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student_id: UserId,
    pub marked_by: UserId,
    pub date: DateTime<Utc>,
    pub status: AttendanceStatus,
    pub note: Option<String>,
}

/// A single mark entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkRecord {
    pub student_id: UserId,
    pub subject: String,
    pub marks: i32,
    pub uploaded_by: UserId,
    pub uploaded_at: DateTime<Utc>,
}

/// A record keyed by the student it belongs to.
pub trait StudentRecord: Clone + Send + Sync + 'static {
    /// The ownership key.
    fn student_id(&self) -> UserId;
}

impl StudentRecord for AttendanceRecord {
    fn student_id(&self) -> UserId {
        self.student_id
    }
}

impl StudentRecord for MarkRecord {
    fn student_id(&self) -> UserId {
        self.student_id
    }
}

/// A record together with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stored<R> {
    pub id: RecordId,
    #[serde(flatten)]
    pub record: R,
}

// =============================================================================
// RecordStore
// =============================================================================

/// Persistence interface for student records.
#[async_trait]
pub trait RecordStore<R: StudentRecord>: Send + Sync {
    /// Inserts a record and returns its id.
    async fn insert(&self, record: R) -> StoreResult<RecordId>;

    /// Returns every record for `student_id`, in insertion order.
    async fn query_by_student_id(&self, student_id: UserId) -> StoreResult<Vec<Stored<R>>>;
}

#[derive(Debug)]
struct RecordTable<R> {
    rows: Vec<Stored<R>>,
    next_id: RecordId,
}

impl<R> Default for RecordTable<R> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            next_id: 0,
        }
    }
}

/// In-memory record store. Ids start at 1.
#[derive(Debug)]
pub struct InMemoryRecordStore<R> {
    table: Arc<RwLock<RecordTable<R>>>,
}

impl<R> InMemoryRecordStore<R> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(RecordTable::default())),
        }
    }

    /// Returns the number of stored records.
    pub fn len(&self) -> usize {
        self.table.read().rows.len()
    }

    /// Returns `true` if no records are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<R> Clone for InMemoryRecordStore<R> {
    fn clone(&self) -> Self {
        Self {
            table: Arc::clone(&self.table),
        }
    }
}

impl<R> Default for InMemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: StudentRecord> RecordStore<R> for InMemoryRecordStore<R> {
    async fn insert(&self, record: R) -> StoreResult<RecordId> {
        let mut table = self.table.write();
        table.next_id += 1;
        let id = table.next_id;
        table.rows.push(Stored { id, record });
        Ok(id)
    }

    async fn query_by_student_id(&self, student_id: UserId) -> StoreResult<Vec<Stored<R>>> {
        Ok(self
            .table
            .read()
            .rows
            .iter()
            .filter(|row| row.record.student_id() == student_id)
            .cloned()
            .collect())
    }
}

/// Attendance store handle.
pub type AttendanceStore = Arc<dyn RecordStore<AttendanceRecord>>;

/// Marks store handle.
pub type MarkStore = Arc<dyn RecordStore<MarkRecord>>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn attendance(student_id: UserId, status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            student_id,
            marked_by: 2,
            date: Utc::now(),
            status,
            note: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_query() {
        let store = InMemoryRecordStore::new();

        let a = store.insert(attendance(1, AttendanceStatus::Present)).await.unwrap();
        let b = store.insert(attendance(3, AttendanceStatus::Absent)).await.unwrap();
        let c = store.insert(attendance(1, AttendanceStatus::Absent)).await.unwrap();
        assert_eq!((a, b, c), (1, 2, 3));

        let rows = store.query_by_student_id(1).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].record.status, AttendanceStatus::Present);
        assert_eq!(rows[1].id, 3);

        assert!(store.query_by_student_id(99).await.unwrap().is_empty());
        assert_eq!(store.len(), 3);
    }

    #[tokio::test]
    async fn test_stores_are_independent() {
        let attendance_store = InMemoryRecordStore::<AttendanceRecord>::new();
        let mark_store = InMemoryRecordStore::<MarkRecord>::new();

        attendance_store
            .insert(attendance(1, AttendanceStatus::Present))
            .await
            .unwrap();
        let id = mark_store
            .insert(MarkRecord {
                student_id: 1,
                subject: "math".to_string(),
                marks: 91,
                uploaded_by: 2,
                uploaded_at: Utc::now(),
            })
            .await
            .unwrap();

        assert_eq!(id, 1);
        assert!(mark_store.query_by_student_id(2).await.unwrap().is_empty());
    }

    #[test]
    fn test_stored_wire_format() {
        let stored = Stored {
            id: 5,
            record: attendance(1, AttendanceStatus::Present),
        };
        let value = serde_json::to_value(&stored).unwrap();

        assert_eq!(value["id"], 5);
        assert_eq!(value["student_id"], 1);
        assert_eq!(value["marked_by"], 2);
        assert_eq!(value["status"], "present");
        assert!(value["note"].is_null());
        assert!(value["date"].is_string());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("present".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Present);
        assert_eq!("absent".parse::<AttendanceStatus>().unwrap(), AttendanceStatus::Absent);
        assert!(matches!(
            "late".parse::<AttendanceStatus>(),
            Err(CoreError::Validation { .. })
        ));
    }
}
