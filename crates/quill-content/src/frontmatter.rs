//! Front matter extraction and parsing.

use serde_yaml::Mapping;

/// The line that separates front matter from the page body.
pub const DELIMITER: &str = "+++";

/// Errors that can occur when splitting a content file.
#[derive(Debug, thiserror::Error)]
pub enum FrontmatterError {
    #[error("missing '+++' front matter delimiter")]
    MissingDelimiter,

    #[error("no body after the '+++' delimiter")]
    EmptyBody,

    #[error("invalid front matter: {0}")]
    InvalidMetadata(String),
}

/// Split a raw content file into its front matter mapping and body.
///
/// The file is divided on the first line containing only `+++`. The
/// head is parsed as a YAML mapping; the body is returned verbatim.
pub fn split(source: &str) -> Result<(Mapping, &str), FrontmatterError> {
    let mut offset = 0;
    let mut boundary = None;

    for line in source.split_inclusive('\n') {
        let stripped = line.trim_end_matches('\n').trim_end_matches('\r');
        if stripped == DELIMITER {
            boundary = Some((offset, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let Some((head_end, body_start)) = boundary else {
        return Err(FrontmatterError::MissingDelimiter);
    };

    let head = &source[..head_end];
    let body = &source[body_start..];

    if body.trim().is_empty() {
        return Err(FrontmatterError::EmptyBody);
    }

    let meta = if head.trim().is_empty() {
        Mapping::new()
    } else {
        serde_yaml::from_str(head)
            .map_err(|e| FrontmatterError::InvalidMetadata(e.to_string()))?
    };

    Ok((meta, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_yaml::Value;

    #[test]
    fn splits_valid_document() {
        let source = "title: Hello\ndate: 2024-01-05\ntags:\n  - rust\n+++\n# Body\n";

        let (meta, body) = split(source).unwrap();

        assert_eq!(meta.get("title"), Some(&Value::from("Hello")));
        assert!(body.starts_with("# Body"));
    }

    #[test]
    fn errors_without_delimiter() {
        let source = "title: Hello\n\n# Body without a separator\n";

        assert!(matches!(
            split(source),
            Err(FrontmatterError::MissingDelimiter)
        ));
    }

    #[test]
    fn errors_on_empty_body() {
        let source = "title: Hello\n+++\n   \n";

        assert!(matches!(split(source), Err(FrontmatterError::EmptyBody)));
    }

    #[test]
    fn errors_on_invalid_yaml() {
        let source = "title: [unclosed\n+++\nbody\n";

        assert!(matches!(
            split(source),
            Err(FrontmatterError::InvalidMetadata(_))
        ));
    }

    #[test]
    fn empty_head_yields_empty_mapping() {
        let (meta, body) = split("+++\nbody\n").unwrap();

        assert!(meta.is_empty());
        assert_eq!(body, "body\n");
    }

    #[test]
    fn delimiter_must_be_alone_on_its_line() {
        // "+++" embedded in a longer line does not count.
        let source = "title: x+++y\n\nbody\n";

        assert!(matches!(
            split(source),
            Err(FrontmatterError::MissingDelimiter)
        ));
    }
}
