use std::fs;
use std::path::Path;

use crate::bundle::BundleError;
use crate::transform::{Artifact, Transform, TransformContext};

/// Catch-all transform. Copies the file through byte for byte and keeps
/// its name. Registered last so it only sees files nothing else claimed.
pub struct RawTransform;

impl Transform for RawTransform {
    fn name(&self) -> &'static str {
        "raw"
    }

    fn matches(&self, _path: &Path) -> bool {
        true
    }

    fn rename(&self, reference: &str) -> String {
        reference.to_string()
    }

    fn transform(&self, ctx: &TransformContext<'_>) -> Result<Vec<Artifact>, BundleError> {
        let contents = fs::read(ctx.resolved).map_err(|e| BundleError::io(ctx.resolved, e))?;
        Ok(vec![Artifact {
            path: ctx.resolved.to_path_buf(),
            contents,
        }])
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::transform::raw::RawTransform;
    use crate::transform::Transform;

    #[test]
    fn test_claims_everything_and_keeps_names() {
        let transform = RawTransform;
        assert!(transform.matches(Path::new("/some/file.woff2")));
        assert!(transform.matches(Path::new("/no/extension")));
        assert_eq!(transform.rename("./fonts/a.woff2"), "./fonts/a.woff2");
    }
}
