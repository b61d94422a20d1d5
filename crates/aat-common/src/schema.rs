//! Schema versioning for output payloads.

/// Version stamped into every serialized output table.
///
/// Downstream renderers (heatmaps, box plots, reports) key on this to detect
/// column-contract changes. Bump the minor version when adding columns and
/// the major version when renaming or removing them.
pub const SCHEMA_VERSION: &str = "1.0.0";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_is_semver() {
        let parts: Vec<&str> = SCHEMA_VERSION.split('.').collect();
        assert_eq!(parts.len(), 3);
        for part in parts {
            part.parse::<u32>().expect("schema version part not numeric");
        }
    }
}
