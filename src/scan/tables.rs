//! Reference-bearing attribute tables.
//!
//! Which tag/attribute pairs carry asset references is data, not behavior.
//! The built-in tables below cover the reference-bearing markup attributes
//! and the metadata key/value pairs that announce a media reference in a
//! following `content` attribute. Embedding callers can supply their own
//! tables through the run options.

use rustc_hash::{FxHashMap, FxHashSet};

/// attribute name -> tags for which that attribute carries a reference
const ATTRS: &[(&str, &[&str])] = &[
    (
        "src",
        &[
            "script", "img", "audio", "video", "source", "track", "iframe", "embed",
        ],
    ),
    ("href", &["link", "a", "use"]),
    ("srcset", &["img", "source"]),
    ("poster", &["video"]),
    ("xlink:href", &["use", "image"]),
    ("data", &["object"]),
];

/// meta key attribute -> values announcing a reference in `content`
const META: &[(&str, &[&str])] = &[
    (
        "property",
        &[
            "og:image",
            "og:image:url",
            "og:image:secure_url",
            "og:audio",
            "og:audio:secure_url",
            "og:video",
            "og:video:secure_url",
        ],
    ),
    (
        "name",
        &[
            "twitter:image",
            "msapplication-square150x150logo",
            "msapplication-square310x310logo",
            "msapplication-square70x70logo",
            "msapplication-wide310x150logo",
            "msapplication-TileImage",
            "msapplication-config",
        ],
    ),
    (
        "itemprop",
        &[
            "image",
            "logo",
            "screenshot",
            "thumbnailUrl",
            "contentUrl",
            "downloadUrl",
        ],
    ),
];

/// Lookup tables driving the reference scanner.
#[derive(Debug, Clone)]
pub struct ScanTables {
    attrs: FxHashMap<String, FxHashSet<String>>,
    meta: FxHashMap<String, FxHashSet<String>>,
}

impl Default for ScanTables {
    fn default() -> Self {
        Self::from_slices(ATTRS, META)
    }
}

impl ScanTables {
    /// Build tables from `(key, members)` slices.
    pub fn from_slices(attrs: &[(&str, &[&str])], meta: &[(&str, &[&str])]) -> Self {
        let collect = |table: &[(&str, &[&str])]| {
            table
                .iter()
                .map(|(key, members)| {
                    let set = members.iter().map(ToString::to_string).collect();
                    ((*key).to_string(), set)
                })
                .collect()
        };
        Self {
            attrs: collect(attrs),
            meta: collect(meta),
        }
    }

    /// Does `attr` carry a reference on `tag`?
    pub fn reference_attr(&self, tag: &str, attr: &str) -> bool {
        self.attrs.get(attr).is_some_and(|tags| tags.contains(tag))
    }

    /// Is `value` a recognized semantic value for meta key attribute `attr`?
    pub fn meta_value(&self, attr: &str, value: &str) -> bool {
        self.meta
            .get(attr)
            .is_some_and(|values| values.contains(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_attr_lookup() {
        let tables = ScanTables::default();
        assert!(tables.reference_attr("img", "src"));
        assert!(tables.reference_attr("link", "href"));
        assert!(tables.reference_attr("video", "poster"));
        assert!(tables.reference_attr("use", "xlink:href"));
        assert!(!tables.reference_attr("div", "src"));
        assert!(!tables.reference_attr("img", "poster"));
    }

    #[test]
    fn test_meta_value_lookup() {
        let tables = ScanTables::default();
        assert!(tables.meta_value("property", "og:image"));
        assert!(tables.meta_value("name", "twitter:image"));
        assert!(tables.meta_value("itemprop", "thumbnailUrl"));
        assert!(!tables.meta_value("property", "og:title"));
        assert!(!tables.meta_value("charset", "utf-8"));
    }

    #[test]
    fn test_custom_tables() {
        let tables = ScanTables::from_slices(&[("data-src", &["img"])], &[]);
        assert!(tables.reference_attr("img", "data-src"));
        assert!(!tables.reference_attr("img", "src"));
    }
}
