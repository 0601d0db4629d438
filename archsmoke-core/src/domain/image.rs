//! Image lookup output parsing
//!
//! The image lookup collaborator prints one line per (stream, architecture):
//!
//! ```text
//! rawhide, x86_64: Fedora-Cloud-Base-AmazonEC2.x86_64-Rawhide-20250101.n.0
//! f43, current, aarch64: Fedora-Cloud-Base-AmazonEC2.aarch64-43-20250101.0
//! ```

/// Release stream used when none is configured
pub const DEFAULT_STREAM: &str = "rawhide";

/// Finds the image identifier for `stream` and `architecture`
///
/// A line matches when the first comma-separated label equals the stream
/// (ignoring ASCII case) and the last one equals the architecture. The image
/// is whatever follows `": "`. The first matching line wins.
pub fn find_image(output: &str, stream: &str, architecture: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (labels, image) = line.split_once(": ")?;
        let mut labels = labels.split(',').map(str::trim);

        let line_stream = labels.next()?;
        let line_arch = labels.last()?;
        let image = image.trim();

        (line_stream.eq_ignore_ascii_case(stream) && line_arch == architecture && !image.is_empty())
            .then(|| image.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOOKUP_OUTPUT: &str = "\
rawhide, x86_64: Fedora-Cloud-Base-AmazonEC2.x86_64-Rawhide-20250101.n.0
rawhide, aarch64: Fedora-Cloud-Base-AmazonEC2.aarch64-Rawhide-20250101.n.0
f43, current, x86_64: Fedora-Cloud-Base-AmazonEC2.x86_64-43-20250101.0
f42, last, x86_64: Fedora-Cloud-Base-AmazonEC2.x86_64-42-20250101.0
";

    #[test]
    fn test_find_rawhide_image() {
        assert_eq!(
            find_image(LOOKUP_OUTPUT, "rawhide", "aarch64").as_deref(),
            Some("Fedora-Cloud-Base-AmazonEC2.aarch64-Rawhide-20250101.n.0")
        );
    }

    #[test]
    fn test_find_labelled_stream() {
        assert_eq!(
            find_image(LOOKUP_OUTPUT, "f43", "x86_64").as_deref(),
            Some("Fedora-Cloud-Base-AmazonEC2.x86_64-43-20250101.0")
        );
    }

    #[test]
    fn test_architecture_must_match_exactly() {
        // "x86_64" must not match a line for "x86"
        assert_eq!(find_image("rawhide, x86_64: img\n", "rawhide", "x86"), None);
        assert_eq!(find_image(LOOKUP_OUTPUT, "f43", "aarch64"), None);
    }

    #[test]
    fn test_no_match() {
        assert_eq!(find_image("", "rawhide", "x86_64"), None);
        assert_eq!(find_image("garbage line\n", "rawhide", "x86_64"), None);
        assert_eq!(find_image("rawhide, x86_64: \n", "rawhide", "x86_64"), None);
    }
}
