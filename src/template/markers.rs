//! Template markers and simultaneous substitution

/// Crate prefix, bound to [`CrateContext::prefix`](crate::CrateContext::prefix)
pub const CRATE_PREFIX: &str = "%crate_prefix%";
/// Snake-cased crate vendor
pub const VENDOR: &str = "%vendor%";
/// Snake-cased crate package
pub const PACKAGE: &str = "%package%";
/// Resource prefix
pub const RES_PREFIX: &str = "%res_prefix%";
/// Snake-cased resource name
pub const RES_NAME: &str = "%res_name%";
/// Type identifier of the resource (projection) type
pub const PROJECTION_TYPE: &str = "%projection_type%";
/// Type identifier of the resource's aggregate root type
pub const AGGREGATE_ROOT_TYPE: &str = "%aggregate_root_type%";

/// Markers bound without a resource
pub const CRATE_MARKERS: [&str; 3] = [CRATE_PREFIX, VENDOR, PACKAGE];

/// Markers that are only bound while expanding for a resource
pub const RESOURCE_MARKERS: [&str; 4] = [
    RES_PREFIX,
    RES_NAME,
    PROJECTION_TYPE,
    AGGREGATE_ROOT_TYPE,
];

/// An ordered set of marker bindings used for one expansion call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkerSet {
    markers: Vec<&'static str>,
    replacements: Vec<String>,
}

impl MarkerSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a marker to a value; a marker already bound is rebound in place
    pub fn bind(&mut self, marker: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.markers.iter().position(|m| *m == marker) {
            Some(idx) => self.replacements[idx] = value,
            None => {
                self.markers.push(marker);
                self.replacements.push(value);
            }
        }
    }

    /// Builder-style [`bind`](Self::bind)
    pub fn with(mut self, marker: &'static str, value: impl Into<String>) -> Self {
        self.bind(marker, value);
        self
    }

    /// Get the value bound to a marker
    pub fn value(&self, marker: &str) -> Option<&str> {
        self.markers
            .iter()
            .position(|m| *m == marker)
            .map(|idx| self.replacements[idx].as_str())
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Substitute every bound marker in `input`
    pub fn apply(&self, input: &str) -> String {
        replace_markers(&self.markers, &self.replacements, input)
    }
}

/// Replace every occurrence of every marker with its paired replacement.
///
/// The input is scanned once from left to right. At each position the first marker
/// in list order that matches wins and the scan resumes after it, so replacement
/// text is never matched again. Empty markers never match; unpaired trailing
/// entries of either slice are ignored.
pub fn replace_markers<M, R>(markers: &[M], replacements: &[R], input: &str) -> String
where
    M: AsRef<str>,
    R: AsRef<str>,
{
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    'scan: while let Some(ch) = rest.chars().next() {
        for (marker, replacement) in markers.iter().zip(replacements) {
            let marker = marker.as_ref();
            if !marker.is_empty() && rest.starts_with(marker) {
                out.push_str(replacement.as_ref());
                rest = &rest[marker.len()..];
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_all_occurrences() {
        let out = replace_markers(
            &[VENDOR, PACKAGE],
            &["acme", "shop"],
            "%vendor%-%package%-%vendor%",
        );
        assert_eq!(out, "acme-shop-acme");
    }

    #[test]
    fn test_no_markers_is_identity() {
        let inputs = ["", "plain", "100% sure", "shared.view_store", "ünïcödé %"];
        for input in inputs {
            assert_eq!(
                replace_markers(&CRATE_MARKERS, &["a", "b", "c"], input),
                input
            );
        }
    }

    #[test]
    fn test_replacement_is_not_rescanned() {
        // The first replacement produces the literal text of the second marker
        let out = replace_markers(&[CRATE_PREFIX, VENDOR], &["%vendor%", "acme"], "%crate_prefix%");
        assert_eq!(out, "%vendor%");
    }

    #[test]
    fn test_earlier_marker_wins_at_same_position() {
        let out = replace_markers(&["%a%", "%a%b%"], &["1", "2"], "%a%b%");
        assert_eq!(out, "1b%");
    }

    #[test]
    fn test_empty_marker_never_matches() {
        let out = replace_markers(&["", "%x%"], &["boom", "y"], "a%x%b");
        assert_eq!(out, "ayb");
    }

    #[test]
    fn test_unpaired_entries_are_ignored() {
        assert_eq!(replace_markers(&["%a%", "%b%"], &["1"], "%a%%b%"), "1%b%");
        assert_eq!(replace_markers(&["%a%"], &["1", "2"], "%a%%b%"), "1%b%");
    }

    #[test]
    fn test_marker_set_rebind() {
        let set = MarkerSet::new()
            .with(CRATE_PREFIX, "first")
            .with(VENDOR, "acme")
            .with(CRATE_PREFIX, "second");
        assert_eq!(set.len(), 2);
        assert_eq!(set.value(CRATE_PREFIX), Some("second"));
        assert_eq!(set.apply("%crate_prefix%.%vendor%"), "second.acme");
    }
}
