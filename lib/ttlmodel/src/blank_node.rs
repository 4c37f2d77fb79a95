use std::fmt;

/// An RDF [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node).
///
/// The label is stored without the `_:` sigil; the default string formatter
/// adds it back:
/// ```
/// use ttlmodel::BlankNode;
///
/// assert_eq!("_:b0", BlankNode::new("b0")?.to_string());
/// # Result::<_, ttlmodel::BlankNodeLabelParseError>::Ok(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct BlankNode {
    label: String,
}

impl BlankNode {
    /// Builds a blank node from a label, checking it is usable as one.
    ///
    /// The check is shallow (non-empty, no whitespace, no `:`); the Turtle
    /// parser is the producer of fully validated labels.
    pub fn new(label: impl Into<String>) -> Result<Self, BlankNodeLabelParseError> {
        let label = label.into();
        if label.is_empty() || label.chars().any(|c| c.is_whitespace() || c == ':') {
            return Err(BlankNodeLabelParseError { label });
        }
        Ok(Self::new_unchecked(label))
    }

    /// Builds a blank node from a label without checking it.
    ///
    /// It is the caller's responsibility to provide a valid blank node label.
    #[inline]
    pub fn new_unchecked(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    /// The label without the `_:` sigil.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.label.as_str()
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.label
    }
}

impl fmt::Display for BlankNode {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.label)
    }
}

/// The given string is not usable as a blank node label.
#[derive(Debug, thiserror::Error)]
#[error("'{label}' is not a valid blank node label")]
pub struct BlankNodeLabelParseError {
    label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_adds_sigil() {
        assert_eq!(BlankNode::new_unchecked("b12").to_string(), "_:b12");
    }

    #[test]
    fn rejects_unusable_labels() {
        assert!(BlankNode::new("").is_err());
        assert!(BlankNode::new("a b").is_err());
        assert!(BlankNode::new("a:b").is_err());
        assert!(BlankNode::new("fine-label.0").is_ok());
    }
}
