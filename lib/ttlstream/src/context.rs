//! The namespace context accumulated while parsing.

use oxiri::Iri;
use std::collections::HashMap;

/// The prefix and base bindings of a Turtle document.
///
/// A context can be pre-seeded before parsing (see
/// [`TtlParser::with_prefix`](crate::TtlParser::with_prefix)) and is returned
/// to the caller once the parse completes, with every binding added by a
/// successful `@prefix`/`PREFIX` or `@base`/`BASE` directive.
///
/// ```
/// use ttlstream::Context;
///
/// let mut context = Context::new();
/// context.bind("ex", "http://example.com/ns#");
/// assert_eq!(
///     context.resolve("ex", "foo"),
///     Some("http://example.com/ns#foo".to_owned())
/// );
/// assert_eq!(context.resolve("unknown", "foo"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    prefixes: HashMap<String, String>,
    base: Option<Iri<String>>,
}

impl Context {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a prefix name (possibly empty, for the default prefix) to a namespace IRI.
    pub fn bind(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Expands `prefix:local` by concatenation, or `None` if the prefix is not bound.
    pub fn resolve(&self, prefix: &str, local: &str) -> Option<String> {
        let namespace = self.prefixes.get(prefix)?;
        Some(format!("{namespace}{local}"))
    }

    /// The namespace bound to a prefix, if any.
    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// The current base IRI, set by a `@base`/`BASE` directive or by the caller.
    #[inline]
    pub fn base(&self) -> Option<&Iri<String>> {
        self.base.as_ref()
    }

    pub fn set_base(&mut self, base: Iri<String>) {
        self.base = Some(base);
    }

    /// All (prefix name, namespace IRI) bindings, in no particular order.
    pub fn prefixes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(prefix, iri)| (prefix.as_str(), iri.as_str()))
    }

    /// The number of bound prefixes.
    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prefix_is_the_empty_string() {
        let mut context = Context::new();
        context.bind("", "http://example.com/");
        assert_eq!(
            context.resolve("", "s"),
            Some("http://example.com/s".to_owned())
        );
    }

    #[test]
    fn rebinding_replaces() {
        let mut context = Context::new();
        context.bind("ex", "http://one.example/");
        context.bind("ex", "http://two.example/");
        assert_eq!(context.get("ex"), Some("http://two.example/"));
        assert_eq!(context.len(), 1);
    }
}
