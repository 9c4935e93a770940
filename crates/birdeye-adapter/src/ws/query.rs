/*
[INPUT]:  Subscription request fields in their fixed per-kind order
[OUTPUT]: Filter expressions: `(k=v AND k=v)` groups, OR-joined for batches
[POS]:    WebSocket layer - filter expression grammar
[UPDATE]: When the feed's filter grammar changes
*/

use std::fmt::Display;

use super::subscription::Subscription;

const AND: &str = " AND ";
const OR: &str = " OR ";

/// Builder for a single parenthesized `AND` group.
///
/// Atoms are emitted in the order they are pushed, so callers control the
/// field order and the output is byte-reproducible. Values are written with
/// their `Display` form and never quoted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterExpression {
    atoms: Vec<String>,
}

impl FilterExpression {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a `key=value` atom.
    pub fn atom(mut self, key: &str, value: impl Display) -> Self {
        self.atoms.push(format!("{key}={value}"));
        self
    }

    /// Push a `key=value` atom only when the value is present.
    pub fn atom_opt<V: Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.atom(key, value),
            None => self,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Render the group. No atoms renders as `""`, not `()`.
    pub fn build(&self) -> String {
        if self.atoms.is_empty() {
            return String::new();
        }
        format!("({})", self.atoms.join(AND))
    }
}

/// Simple mode: the single group for one subscription.
pub fn simple_query<S: Subscription>(subscription: &S) -> String {
    subscription.query()
}

/// Complex mode: each subscription's group joined with ` OR `.
///
/// A subscription with no atoms still takes its slot as `""`, so a batch of
/// N always carries N - 1 separators.
pub fn complex_query<S: Subscription>(subscriptions: &[S]) -> String {
    subscriptions
        .iter()
        .map(Subscription::query)
        .collect::<Vec<_>>()
        .join(OR)
}
