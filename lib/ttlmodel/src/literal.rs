use crate::named_node::{NamedNode, NamedNodeRef};
use crate::vocab::{rdf, xsd};
use std::fmt;
use std::fmt::Write;

/// An RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal).
///
/// The default string formatter returns the N-Triples, Turtle and SPARQL compatible representation:
/// ```
/// use ttlmodel::Literal;
/// use ttlmodel::vocab::xsd;
///
/// assert_eq!("\"foo\\nbar\"", Literal::new_simple("foo\nbar").to_string());
/// assert_eq!(
///     "\"1999-01-01\"^^<http://www.w3.org/2001/XMLSchema#date>",
///     Literal::new_typed("1999-01-01", xsd::DATE).to_string()
/// );
/// assert_eq!(
///     "\"foo\"@en",
///     Literal::new_language_tagged("foo", "en").to_string()
/// );
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Literal(LiteralContent);

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
enum LiteralContent {
    Simple(String),
    LanguageTagged { value: String, language: String },
    Typed { value: String, datatype: NamedNode },
}

impl Literal {
    /// Builds an `xsd:string` literal.
    #[inline]
    pub fn new_simple(value: impl Into<String>) -> Self {
        Self(LiteralContent::Simple(value.into()))
    }

    /// Builds a literal with a datatype.
    ///
    /// An explicit `xsd:string` datatype is normalized away.
    #[inline]
    pub fn new_typed(value: impl Into<String>, datatype: impl Into<NamedNode>) -> Self {
        let datatype = datatype.into();
        if datatype == xsd::STRING {
            Self::new_simple(value)
        } else {
            Self(LiteralContent::Typed {
                value: value.into(),
                datatype,
            })
        }
    }

    /// Builds an `rdf:langString` literal.
    ///
    /// The language tag is not checked here; the parser validates tags
    /// before constructing literals.
    #[inline]
    pub fn new_language_tagged(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self(LiteralContent::LanguageTagged {
            value: value.into(),
            language: language.into(),
        })
    }

    /// The lexical form of the literal.
    #[inline]
    pub fn value(&self) -> &str {
        match &self.0 {
            LiteralContent::Simple(value)
            | LiteralContent::LanguageTagged { value, .. }
            | LiteralContent::Typed { value, .. } => value,
        }
    }

    /// The language tag, for `rdf:langString` literals.
    #[inline]
    pub fn language(&self) -> Option<&str> {
        match &self.0 {
            LiteralContent::LanguageTagged { language, .. } => Some(language),
            LiteralContent::Simple(_) | LiteralContent::Typed { .. } => None,
        }
    }

    /// The datatype IRI.
    ///
    /// Simple literals are `xsd:string`, language tagged ones `rdf:langString`.
    #[inline]
    pub fn datatype(&self) -> NamedNodeRef<'_> {
        match &self.0 {
            LiteralContent::Simple(_) => xsd::STRING,
            LiteralContent::LanguageTagged { .. } => rdf::LANG_STRING,
            LiteralContent::Typed { datatype, .. } => datatype.as_ref(),
        }
    }

    #[inline]
    pub fn into_value(self) -> String {
        match self.0 {
            LiteralContent::Simple(value)
            | LiteralContent::LanguageTagged { value, .. }
            | LiteralContent::Typed { value, .. } => value,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            LiteralContent::Simple(value) => print_quoted_str(value, f),
            LiteralContent::LanguageTagged { value, language } => {
                print_quoted_str(value, f)?;
                write!(f, "@{language}")
            }
            LiteralContent::Typed { value, datatype } => {
                print_quoted_str(value, f)?;
                write!(f, "^^{datatype}")
            }
        }
    }
}

fn print_quoted_str(string: &str, f: &mut impl Write) -> fmt::Result {
    f.write_char('"')?;
    for c in string.chars() {
        match c {
            '\u{08}' => f.write_str("\\b"),
            '\t' => f.write_str("\\t"),
            '\n' => f.write_str("\\n"),
            '\u{0C}' => f.write_str("\\f"),
            '\r' => f.write_str("\\r"),
            '"' => f.write_str("\\\""),
            '\\' => f.write_str("\\\\"),
            c => f.write_char(c),
        }?;
    }
    f.write_char('"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_in_lexical_form() {
        assert_eq!(
            Literal::new_simple("a\"b\\c\r\n").to_string(),
            "\"a\\\"b\\\\c\\r\\n\""
        );
    }

    #[test]
    fn explicit_xsd_string_is_simple() {
        let literal = Literal::new_typed("foo", xsd::STRING);
        assert_eq!(literal, Literal::new_simple("foo"));
        assert_eq!(literal.to_string(), "\"foo\"");
        assert_eq!(literal.datatype(), xsd::STRING);
    }

    #[test]
    fn language_tagged_datatype() {
        let literal = Literal::new_language_tagged("chat", "fr");
        assert_eq!(literal.datatype(), rdf::LANG_STRING);
        assert_eq!(literal.language(), Some("fr"));
        assert_eq!(literal.to_string(), "\"chat\"@fr");
    }
}
