use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One progressive slice of a bracket table.
///
/// Tax for a base that falls in this bracket is `base × rate − deduction`,
/// floored at zero. Field aliases accept the Portuguese keys used by the
/// published table files (`max`, `aliquota`, `deduz`/`deducao`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    #[serde(alias = "max")]
    pub upper_bound: Decimal,

    #[serde(alias = "aliquota")]
    pub rate: Decimal,

    #[serde(default, alias = "deduz", alias = "deducao")]
    pub deduction: Decimal,
}

impl Bracket {
    pub fn new(
        upper_bound: Decimal,
        rate: Decimal,
        deduction: Decimal,
    ) -> Self {
        Self {
            upper_bound,
            rate,
            deduction,
        }
    }
}

/// Ordered list of brackets, semantically ascending by upper bound.
///
/// The last entry is the open-ended top bracket. A table may be empty when
/// it is built; it only fails once it is queried.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BracketTable(Vec<Bracket>);

impl BracketTable {
    pub fn new(brackets: Vec<Bracket>) -> Self {
        Self(brackets)
    }

    pub fn brackets(&self) -> &[Bracket] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Upper bound of the last (open-ended) bracket, if any.
    pub fn top_bound(&self) -> Option<Decimal> {
        self.0.last().map(|b| b.upper_bound)
    }

    pub fn push(
        &mut self,
        bracket: Bracket,
    ) {
        self.0.push(bracket);
    }
}

impl From<Vec<Bracket>> for BracketTable {
    fn from(brackets: Vec<Bracket>) -> Self {
        Self(brackets)
    }
}
