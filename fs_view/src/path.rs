//! Relative path construction

/// Path resolver
///
/// Builds `/`-joined relative paths.
pub struct PathResolver;

impl PathResolver {
    /// Appends a leaf name to a relative path prefix
    ///
    /// # Examples
    ///
    /// ```
    /// use fs_view::PathResolver;
    ///
    /// assert_eq!(PathResolver::join("", "a.txt"), "a.txt");
    /// assert_eq!(PathResolver::join("sub", "b.txt"), "sub/b.txt");
    /// ```
    pub fn join(prefix: &str, leaf: &str) -> String {
        if prefix.is_empty() {
            leaf.to_string()
        } else {
            format!("{}/{}", prefix, leaf)
        }
    }
}
