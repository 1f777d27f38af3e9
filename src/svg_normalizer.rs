use crate::error::Result;
use regex::Regex;

/// Strips the parts of a downloaded SVG that have no meaning in Elm
///
/// Each pass works on the output of the previous one, so the order of the
/// fields below matters.
#[derive(Debug)]
pub struct Normalizer {
    xml_declaration: Regex,
    comment: Regex,
    defs: Regex,
    clip_path: Regex,
    attributes: Vec<Regex>,
}

impl Normalizer {
    pub fn new<S: AsRef<str>>(denylist: &[S]) -> Result<Self> {
        let attributes = denylist
            .iter()
            .map(|attr| Regex::new(&format!(r#" {}="[^"]*""#, regex::escape(attr.as_ref()))))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            xml_declaration: Regex::new(r"<\?xml[^>]+>\n")?,
            // Stops at the first `>`, not at `-->`
            comment: Regex::new(r"<!--[^>]+>\n")?,
            defs: Regex::new(r"(?s)<defs.*</defs>")?,
            clip_path: Regex::new(r"(?s)<clipPath.*</clipPath>")?,
            attributes,
        })
    }

    /// Produce the canonical markup for a raw SVG document
    pub fn normalize(&self, raw: &str) -> String {
        let svg = self.xml_declaration.replace_all(raw, "");
        let svg = self.comment.replace_all(&svg, "");
        let svg = self.defs.replace_all(&svg, "");
        let svg = self.clip_path.replace_all(&svg, "");

        self.attributes
            .iter()
            .fold(svg.into_owned(), |acc, attr| attr.replace_all(&acc, " ").into_owned())
    }
}

/// Whether the content looks like an SVG document rather than an error page
pub fn has_root_element(svg: &str) -> bool {
    svg.starts_with("<svg") || svg.starts_with("<?xml")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DENYLIST: &[&str] = &[
        "class",
        "clip-path",
        "display",
        "height",
        "version",
        "width",
        "x",
        "xml:space",
        "xmlns",
        "xmlns:xlink",
        "y",
    ];

    const RAW: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<!-- Generator: Sketch -->
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="24" height="24" viewBox="0 0 24 24" version="1.1" x="0px" y="0px" xml:space="preserve"><defs><path id="a" d="M0 0h24v24H0z"/></defs><clipPath id="b"><use xlink:href="#a"/></clipPath><path class="cls" clip-path="url(#b)" d="M15.5 14h-.79"/></svg>
"##;

    fn normalizer() -> Normalizer {
        Normalizer::new(DENYLIST).unwrap()
    }

    #[test]
    fn test_strips_volatile_markup() {
        let svg = normalizer().normalize(RAW);

        assert!(svg.starts_with("<svg"));
        assert!(!svg.contains("<?xml"));
        assert!(!svg.contains("<!--"));
        assert!(!svg.contains("<defs"));
        assert!(!svg.contains("clipPath"));
        for attr in DENYLIST {
            assert!(!svg.contains(&format!(" {attr}=\"")), "{attr} survived: {svg}");
        }
        assert!(svg.contains(r#"viewBox="0 0 24 24""#));
        assert!(svg.contains(r#"d="M15.5 14h-.79""#));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let n = normalizer();
        let once = n.normalize(RAW);
        assert_eq!(n.normalize(&once), once);
    }

    #[test]
    fn test_defs_removal_is_greedy() {
        let svg = normalizer().normalize("<svg><defs>a</defs><path d=\"M0\"/><defs>b</defs></svg>");
        assert_eq!(svg, "<svg></svg>");
    }

    #[test]
    fn test_comment_removal_stops_at_first_gt() {
        let n = normalizer();

        let svg = n.normalize("<!-- a >\nb -->\n<svg></svg>");
        assert_eq!(svg, "b -->\n<svg></svg>");
        assert!(!has_root_element(&svg));

        // A `>` not followed by a newline keeps the whole comment
        let svg = n.normalize("<!-- a > b -->\n<svg></svg>");
        assert_eq!(svg, "<!-- a > b -->\n<svg></svg>");
    }

    #[test]
    fn test_denylist_without_coordinates_keeps_them() {
        let n = Normalizer::new(&["width", "height"]).unwrap();
        let svg = n.normalize(r#"<svg width="24" height="24"><rect x="1" y="2"/></svg>"#);
        assert_eq!(svg, r#"<svg  ><rect x="1" y="2"/></svg>"#);
    }

    #[test]
    fn test_has_root_element() {
        assert!(has_root_element("<svg viewBox=\"0 0 24 24\"></svg>"));
        assert!(has_root_element("<?xml version=\"1.0\"?><svg/>"));
        assert!(!has_root_element("<!DOCTYPE html><html><body>Error 404</body></html>"));
        assert!(!has_root_element(""));
    }
}
