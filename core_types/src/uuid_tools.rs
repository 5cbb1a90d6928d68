//! UUID helpers

use uuid::Uuid;

/// Generates a random v4 UUID
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}

/// Builds a collision-resistant file name from a prefix
pub fn unique_name(prefix: &str) -> String {
    format!("{}{}", prefix, new_uuid().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_names_differ() {
        let a = unique_name(".write_test_");
        let b = unique_name(".write_test_");
        assert!(a.starts_with(".write_test_"));
        assert_ne!(a, b);
        assert_eq!(a.len(), ".write_test_".len() + 32);
    }
}
