// 📚 Subject Entity - Course catalog (Materia)
//
// Subjects are referenced by schedule slots and evaluations.
// The registry holds the default catalog that a fresh database is seeded with.

use serde::{Deserialize, Serialize};

// ============================================================================
// SUBJECT ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,

    /// Display name, e.g. "Cálculo Vectorial"
    pub name: String,

    /// Semester label, e.g. "4to Semestre"
    pub semester: String,

    /// Credit units (UC), used to weight the overall average
    pub credits: u32,
}

impl Subject {
    pub fn new(id: i64, name: &str, semester: &str, credits: u32) -> Self {
        Subject {
            id,
            name: name.to_string(),
            semester: semester.to_string(),
            credits,
        }
    }

    /// Case-insensitive substring match on the subject name
    pub fn matches(&self, term: &str) -> bool {
        self.name.to_lowercase().contains(&term.to_lowercase())
    }
}

// ============================================================================
// SUBJECT REGISTRY
// ============================================================================

/// Default subject catalog.
pub struct SubjectRegistry {
    subjects: Vec<Subject>,
}

impl SubjectRegistry {
    /// Create registry with the default catalog
    pub fn new() -> Self {
        let mut registry = SubjectRegistry { subjects: Vec::new() };
        registry.register_default_subjects();
        registry
    }

    fn register_default_subjects(&mut self) {
        let semester = "4to Semestre";
        self.register(Subject::new(1, "Ingeniería de Software", semester, 5));
        self.register(Subject::new(2, "Programación Orientada a la Web", semester, 4));
        self.register(Subject::new(3, "Organización del Computador", semester, 4));
        self.register(Subject::new(4, "Interacción Humano - Computador", semester, 3));
        self.register(Subject::new(5, "Cálculo Vectorial", semester, 4));
        self.register(Subject::new(6, "Ingeniería Económica", semester, 3));
        self.register(Subject::new(7, "Ecuaciones Diferenciales Ordinarias", semester, 4));
    }

    /// Register a subject, replacing any entry with the same id
    pub fn register(&mut self, subject: Subject) {
        self.subjects.retain(|s| s.id != subject.id);
        self.subjects.push(subject);
    }

    pub fn find_by_id(&self, id: i64) -> Option<&Subject> {
        self.subjects.iter().find(|s| s.id == id)
    }

    /// Exact (case-insensitive) name lookup
    pub fn find_by_name(&self, name: &str) -> Option<&Subject> {
        let lower = name.trim().to_lowercase();
        self.subjects.iter().find(|s| s.name.to_lowercase() == lower)
    }

    pub fn all(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn count(&self) -> usize {
        self.subjects.len()
    }
}

impl Default for SubjectRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog() {
        let registry = SubjectRegistry::new();
        assert_eq!(registry.count(), 7);

        let calc = registry.find_by_id(5).unwrap();
        assert_eq!(calc.name, "Cálculo Vectorial");
        assert_eq!(calc.credits, 4);
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let registry = SubjectRegistry::new();
        let sub = registry.find_by_name("  ingeniería económica ").unwrap();
        assert_eq!(sub.id, 6);
        assert!(registry.find_by_name("Química").is_none());
    }

    #[test]
    fn test_register_replaces_same_id() {
        let mut registry = SubjectRegistry::new();
        registry.register(Subject::new(1, "Ingeniería de Software II", "5to Semestre", 5));
        assert_eq!(registry.count(), 7);
        assert_eq!(registry.find_by_id(1).unwrap().semester, "5to Semestre");
    }

    #[test]
    fn test_subject_matches() {
        let sub = Subject::new(3, "Organización del Computador", "4to Semestre", 4);
        assert!(sub.matches("computador"));
        assert!(!sub.matches("web"));
    }
}
