//! Name resolution for sibling assets.

use std::collections::HashSet;

use crate::error::{ProjectError, Result};
use crate::files::validate_path;

/// Name given to a sprite added without one.
pub const DEFAULT_SPRITE_NAME: &str = "Sprite";

/// Name given to a sound added without one.
pub const DEFAULT_SOUND_NAME: &str = "Sound";

/// Sprite names whose script path would collide with the stage script.
pub const RESERVED_SPRITE_NAMES: &[&str] = &["main"];

/// Check that `name` can be used as a single bundle path segment.
pub fn validate_name(name: &str) -> Result<()> {
    if name.contains(['/', '\\']) {
        return Err(ProjectError::InvalidAssetPath {
            path: name.to_string(),
        });
    }
    validate_path(name)
}

/// Return `desired` if no sibling uses it, otherwise the first free
/// `<desired>2`, `<desired>3`, ... Path separators in `desired` become `_`;
/// a name that is still unusable falls back to `fallback`.
pub fn unique_name<'a>(
    desired: &str,
    fallback: &str,
    existing: impl IntoIterator<Item = &'a str>,
) -> String {
    let taken: HashSet<&str> = existing.into_iter().collect();
    let sanitized = desired.replace(['/', '\\'], "_");
    let base = if validate_name(&sanitized).is_ok() {
        sanitized.as_str()
    } else {
        fallback
    };
    if !taken.contains(base) {
        return base.to_string();
    }
    let mut suffix = 2usize;
    loop {
        let candidate = format!("{}{}", base, suffix);
        if !taken.contains(candidate.as_str()) {
            return candidate;
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Hero", &[], "Hero" ; "free name is kept")]
    #[test_case("Hero", &["Hero"], "Hero2" ; "collision gets suffix")]
    #[test_case("Hero", &["Hero", "Hero2", "Hero3"], "Hero4" ; "skips taken suffixes")]
    #[test_case("Hero", &["Hero2"], "Hero" ; "suffixed sibling does not block base")]
    #[test_case("", &["Sprite"], "Sprite2" ; "empty name uses fallback")]
    #[test_case("a/b", &[], "a_b" ; "separators are replaced")]
    #[test_case("..", &[], "Sprite" ; "parent segment uses fallback")]
    #[test_case("main", &["main"], "main2" ; "reserved name passed as taken")]
    fn test_unique_name(desired: &str, existing: &[&str], expected: &str) {
        let name = unique_name(desired, DEFAULT_SPRITE_NAME, existing.iter().copied());
        assert_eq!(name, expected);
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Hero").is_ok());
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            let err = validate_name(bad).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_ASSET_PATH");
        }
    }

    #[test]
    fn test_reserved_names_match_stage_script() {
        for name in RESERVED_SPRITE_NAMES {
            assert_eq!(
                format!("{}.{}", name, crate::files::CODE_EXTENSION),
                crate::files::STAGE_CODE_FILE
            );
        }
    }
}
