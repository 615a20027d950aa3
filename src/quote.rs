/// Produces engine-safe identifiers. Nothing else in the crate escapes names.
pub trait NameQuoter {
    fn quote_identifier(&self, identifier: &str) -> String;

    /// `schema` alone, or `schema.object` when an object is given.
    fn quote(&self, schema: &str, object: Option<&str>) -> String {
        match object {
            Some(object) => format!(
                "{}.{}",
                self.quote_identifier(schema),
                self.quote_identifier(object)
            ),
            None => self.quote_identifier(schema),
        }
    }
}

impl<Q: NameQuoter + ?Sized> NameQuoter for &Q {
    fn quote_identifier(&self, identifier: &str) -> String {
        (**self).quote_identifier(identifier)
    }
}

/// PostgreSQL (and Redshift) delimited identifiers: wrap in double quotes and
/// double any embedded quote.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DoubleQuote;

impl NameQuoter for DoubleQuote {
    fn quote_identifier(&self, identifier: &str) -> String {
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }
}
