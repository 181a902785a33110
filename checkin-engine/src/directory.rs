//! User directory collaborator seam
//!
//! Display-name lookup only. Nothing in the engine authorizes based on a
//! name; the credential's signed identifiers do that.

use async_trait::async_trait;
use credential_core::StudentId;
use dashmap::DashMap;

/// User directory collaborator
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Display name for a student, if known
    ///
    /// A miss is not an error; credentials are simply issued without a
    /// display name.
    async fn display_name(&self, student_id: &StudentId) -> Option<String>;
}

/// In-memory user directory for tests and the demo binary
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    names: DashMap<StudentId, String>,
}

impl InMemoryUserDirectory {
    /// Create an empty directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a student
    pub fn add_student(&self, student_id: StudentId, name: impl Into<String>) {
        self.names.insert(student_id, name.into());
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn display_name(&self, student_id: &StudentId) -> Option<String> {
        self.names.get(student_id).map(|n| n.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup() {
        let directory = InMemoryUserDirectory::new();
        directory.add_student(StudentId::new("STU1"), "Ravi Kumar");

        assert_eq!(
            directory.display_name(&StudentId::new("STU1")).await,
            Some("Ravi Kumar".to_string())
        );
        assert_eq!(directory.display_name(&StudentId::new("STU2")).await, None);
    }
}
