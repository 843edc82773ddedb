//! META-INF/container.xml.

use super::package::PACKAGE_FILE;

pub const CONTAINER_FILE: &str = "META-INF/container.xml";

/// Root-file pointer to the package descriptor.
pub fn container_xml() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{PACKAGE_FILE}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_at_package() {
        let xml = container_xml();
        assert!(xml.contains("full-path=\"content.opf\""));
        assert!(xml.starts_with("<?xml"));
    }
}
