use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;

const HEADER_SCAN_LINES: usize = 400;

/// Facts read from the first lines of an ontology file without parsing it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OntologyHeader {
    pub version_iri: Option<String>,
    pub syntax: Option<String>,
    pub bucket_listing: bool,
    pub has_content: bool,
}

/// Scans the head of an artifact for the version IRI and the serialization.
pub fn scan_ontology_header(path: &Path) -> Result<OntologyHeader> {
    let reader = BufReader::new(File::open(path)?);
    let mut header = OntologyHeader::default();
    for (index, line) in reader.lines().take(HEADER_SCAN_LINES).enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        header.has_content = true;
        if index < 10 && trimmed.contains("ListBucketResult") {
            header.bucket_listing = true;
        }
        if header.syntax.is_none() {
            header.syntax = detect_syntax(trimmed);
        }
        if header.version_iri.is_none() {
            header.version_iri = extract_version_iri(trimmed);
        }
        if header.version_iri.is_some() && header.syntax.is_some() {
            break;
        }
    }
    Ok(header)
}

fn detect_syntax(line: &str) -> Option<String> {
    let syntax = if line.starts_with("<rdf:RDF") || line.contains("xmlns:rdf=") {
        "RDF/XML"
    } else if line.starts_with("<Ontology") {
        "OWL/XML"
    } else if line.starts_with("Prefix(") || line.starts_with("Ontology(") {
        "OWL Functional"
    } else if line.starts_with("@prefix") || line.starts_with("PREFIX") {
        "Turtle"
    } else if line.starts_with("format-version:") {
        "OBO"
    } else if line.starts_with('{') {
        "JSON"
    } else {
        return None;
    };
    Some(syntax.to_string())
}

fn extract_version_iri(line: &str) -> Option<String> {
    if let Some(rest) = line.split("owl:versionIRI").nth(1) {
        return quoted_after(rest, "rdf:resource=").or_else(|| angle_bracketed(rest));
    }
    if let Some(rest) = line.strip_prefix("Ontology(") {
        let mut iris = rest.split_whitespace().filter_map(angle_bracketed);
        let _ontology_iri = iris.next();
        return iris.next();
    }
    if let Some(rest) = line.strip_prefix("data-version:") {
        let version = rest.trim();
        return (!version.is_empty()).then(|| version.to_string());
    }
    None
}

fn quoted_after(text: &str, marker: &str) -> Option<String> {
    let rest = text.split(marker).nth(1)?;
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let value = rest[1..].split(quote).next()?;
    (!value.is_empty()).then(|| value.to_string())
}

fn angle_bracketed(text: &str) -> Option<String> {
    let start = text.find('<')?;
    let end = text[start + 1..].find('>')?;
    let value = &text[start + 1..start + 1 + end];
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn rdf_xml_header_yields_version_iri() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("foo.owl");
        fs::write(
            &path,
            r#"<?xml version="1.0"?>
<rdf:RDF xmlns="http://purl.obolibrary.org/obo/foo.owl#"
     xmlns:rdf="http://www.w3.org/1999/02/22-rdf-syntax-ns#">
    <owl:Ontology rdf:about="http://purl.obolibrary.org/obo/foo.owl">
        <owl:versionIRI rdf:resource="http://purl.obolibrary.org/obo/foo/2024-01-15/foo.owl"/>
    </owl:Ontology>
</rdf:RDF>
"#,
        )
        .expect("write");
        let header = scan_ontology_header(&path).expect("scan");
        assert_eq!(header.syntax.as_deref(), Some("RDF/XML"));
        assert_eq!(
            header.version_iri.as_deref(),
            Some("http://purl.obolibrary.org/obo/foo/2024-01-15/foo.owl")
        );
        assert!(!header.bucket_listing);
    }

    #[test]
    fn functional_header_yields_second_iri() {
        assert_eq!(
            extract_version_iri(
                "Ontology(<http://purl.obolibrary.org/obo/foo.owl> <http://purl.obolibrary.org/obo/foo/releases/1.2.0/foo.owl>"
            )
            .as_deref(),
            Some("http://purl.obolibrary.org/obo/foo/releases/1.2.0/foo.owl")
        );
    }

    #[test]
    fn bucket_listing_is_flagged() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("listing.owl");
        fs::write(&path, "<?xml version=\"1.0\"?>\n<ListBucketResult xmlns=\"http://s3\">\n").expect("write");
        let header = scan_ontology_header(&path).expect("scan");
        assert!(header.bucket_listing);
        assert!(header.has_content);
    }
}
