use crate::error::Error;

/// Finite, explicit mapping between canonical values and one exchange's
/// native literals.
///
/// `entries` is the encoding table: each canonical value appears at most once,
/// and each native literal at most once. `aliases` are extra natives that
/// decode to a canonical value but are never produced by encoding. Anything
/// else fails with [`Error::UnknownVocabulary`]; there is no default.
#[derive(Debug)]
pub struct VocabularyTable<C: 'static, N: 'static> {
    exchange: &'static str,
    field: &'static str,
    entries: &'static [(C, N)],
    aliases: &'static [(N, C)],
}

impl<C: 'static, N: 'static> VocabularyTable<C, N> {
    pub const fn new(
        exchange: &'static str,
        field: &'static str,
        entries: &'static [(C, N)],
    ) -> Self {
        Self {
            exchange,
            field,
            entries,
            aliases: &[],
        }
    }

    pub const fn with_aliases(mut self, aliases: &'static [(N, C)]) -> Self {
        self.aliases = aliases;
        self
    }

    /// The same table, reporting errors under another venue's name.
    #[must_use]
    pub const fn named(&self, exchange: &'static str) -> Self {
        Self {
            exchange,
            field: self.field,
            entries: self.entries,
            aliases: self.aliases,
        }
    }

    /// [`Error::UnknownVocabulary`] for a value this table cannot map.
    pub fn unknown(&self, value: impl ToString) -> Error {
        Error::UnknownVocabulary {
            exchange: self.exchange,
            field: self.field,
            value: value.to_string(),
        }
    }
}

impl<C: 'static, N: 'static> VocabularyTable<C, N>
where
    C: Copy + PartialEq + std::fmt::Debug,
    N: Copy + PartialEq + std::fmt::Display,
{
    /// Native literal for a canonical value.
    pub fn encode(&self, canonical: C) -> Option<N> {
        self.entries
            .iter()
            .find(|(c, _)| *c == canonical)
            .map(|(_, n)| *n)
    }

    /// Like [`encode`](Self::encode) but failing with an error that names the
    /// unsupported canonical value.
    pub fn try_encode(&self, canonical: C) -> Result<N, Error> {
        self.encode(canonical)
            .ok_or_else(|| self.unknown(format!("{canonical:?}")))
    }

    /// Canonical value for a native literal. Accepts borrowed text for
    /// `&'static str` tables.
    pub fn decode<Q>(&self, native: Q) -> Result<C, Error>
    where
        N: PartialEq<Q>,
        Q: Copy + std::fmt::Display,
    {
        self.entries
            .iter()
            .find(|(_, n)| *n == native)
            .map(|(c, _)| *c)
            .or_else(|| {
                self.aliases
                    .iter()
                    .find(|(n, _)| *n == native)
                    .map(|(_, c)| *c)
            })
            .ok_or_else(|| self.unknown(native))
    }

    pub fn entries(&self) -> &'static [(C, N)] {
        self.entries
    }
}
