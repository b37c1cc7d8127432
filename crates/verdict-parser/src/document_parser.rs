//! Decision document parser
//!
//! Parses JSON decision documents into the typed document model.

use crate::error::Result;
use verdict_core::DecisionDocument;

/// Decision document parser
pub struct DocumentParser;

impl DocumentParser {
    /// Parse a document from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<DecisionDocument> {
        let document: DecisionDocument = serde_json::from_slice(bytes)?;
        tracing::debug!(
            nodes = document.nodes.len(),
            edges = document.edges.len(),
            "parsed decision document"
        );
        Ok(document)
    }

    /// Parse a document from a JSON string
    pub fn parse_str(source: &str) -> Result<DecisionDocument> {
        Self::parse(source.as_bytes())
    }

    /// Parse a document from an already-decoded JSON value
    pub fn from_value(value: serde_json::Value) -> Result<DecisionDocument> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use verdict_core::model::NodeKind;

    #[test]
    fn test_parse_minimal_document() {
        let doc = DocumentParser::parse_str(
            r#"{
                "nodes": [
                    {"id": "in", "name": "Request", "type": "inputNode"},
                    {"id": "out", "name": "Response", "type": "outputNode"}
                ],
                "edges": [{"id": "e1", "sourceId": "in", "targetId": "out"}]
            }"#,
        )
        .unwrap();

        assert_eq!(doc.nodes.len(), 2);
        assert!(matches!(doc.nodes[0].kind, NodeKind::Input(_)));
        assert_eq!(doc.edges[0].target_node_id, "out");
    }

    #[test]
    fn test_invalid_json() {
        let err = DocumentParser::parse(b"{not json").unwrap_err();
        assert!(matches!(err, ParseError::InvalidDocument(_)));
    }

    #[test]
    fn test_unknown_node_type() {
        let err = DocumentParser::parse_str(
            r#"{"nodes": [{"id": "f", "type": "functionNode", "content": {}}], "edges": []}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("functionNode"));
    }
}
