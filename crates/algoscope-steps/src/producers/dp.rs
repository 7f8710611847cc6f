//! Table-filling dynamic programs: coin change and 0/1 knapsack.

use serde::{Deserialize, Serialize};

use crate::error::Fault;
use crate::producer::StepProducer;
use crate::step::{CellRef, CellWrite, Cost, Outcome, Patch, Step, TableStep};

#[derive(Debug, Clone, Copy)]
enum CoinPhase {
    Init,
    Amount(usize),
    Coin { amount: usize, coin: usize },
    Compare { amount: usize, coin: usize },
    Update { amount: usize, coin: usize, count: u64 },
    Close(usize),
    Conclude,
    Done,
}

/// Minimum number of coins summing to an amount, one table row wide.
pub struct CoinChange {
    coins: Vec<u64>,
    amount: usize,
    table: Vec<Cost>,
    phase: CoinPhase,
}

impl CoinChange {
    pub fn new(coins: Vec<u64>, amount: u64) -> Self {
        Self {
            coins,
            amount: amount as usize,
            table: Vec::new(),
            phase: CoinPhase::Init,
        }
    }

    fn cell(amount: usize) -> CellRef {
        CellRef::new(0, amount)
    }

    fn after(&self, amount: usize) -> CoinPhase {
        if amount < self.amount {
            CoinPhase::Amount(amount + 1)
        } else {
            CoinPhase::Conclude
        }
    }
}

impl StepProducer for CoinChange {
    fn name(&self) -> &'static str {
        "coin_change"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match self.phase {
            CoinPhase::Init => {
                self.table = std::iter::once(Cost::Finite(0))
                    .chain(std::iter::repeat(Cost::Infinite).take(self.amount))
                    .collect();
                self.phase = self.after(0);
                TableStep {
                    table: Some(vec![self.table.clone()]),
                    note: Some("dp[0] = 0, every other amount starts at ∞.".to_string()),
                    ..TableStep::default()
                }
            }
            CoinPhase::Amount(amount) => {
                self.phase = CoinPhase::Coin { amount, coin: 0 };
                TableStep {
                    current: Patch::Set(Self::cell(amount)),
                    compare: Some(Vec::new()),
                    note: Some(format!("Calculating minimum coins for amount {amount}.")),
                    ..TableStep::default()
                }
            }
            CoinPhase::Coin { amount, coin } => {
                let Some(&value) = self.coins.get(coin) else {
                    self.phase = CoinPhase::Close(amount);
                    return self.advance();
                };
                let fits = value as usize <= amount;
                self.phase = if fits {
                    CoinPhase::Compare { amount, coin }
                } else {
                    CoinPhase::Coin { amount, coin: coin + 1 }
                };
                let note = if fits {
                    format!("Trying coin {value}.")
                } else {
                    format!("Coin {value} is larger than {amount}, skipping.")
                };
                TableStep {
                    cursor: Patch::Set(coin),
                    compare: Some(Vec::new()),
                    note: Some(note),
                    ..TableStep::default()
                }
            }
            CoinPhase::Compare { amount, coin } => {
                let rest = amount - self.coins[coin] as usize;
                let prior = self.table[rest];
                let candidate = prior.plus(1);
                self.phase = match candidate {
                    Cost::Finite(count) if candidate < self.table[amount] => {
                        CoinPhase::Update { amount, coin, count }
                    }
                    _ => CoinPhase::Coin { amount, coin: coin + 1 },
                };
                TableStep {
                    compare: Some(vec![Self::cell(rest)]),
                    note: Some(format!("Checking dp[{rest}] = {prior}. Possible new total: {candidate}.")),
                    ..TableStep::default()
                }
            }
            CoinPhase::Update { amount, coin, count } => {
                self.table[amount] = Cost::Finite(count);
                self.phase = CoinPhase::Coin { amount, coin: coin + 1 };
                TableStep {
                    write: Some(CellWrite {
                        cell: Self::cell(amount),
                        value: Cost::Finite(count),
                    }),
                    note: Some(format!("Updated dp[{amount}] to {count}.")),
                    ..TableStep::default()
                }
            }
            CoinPhase::Close(amount) => {
                self.phase = self.after(amount);
                TableStep {
                    cursor: Patch::Clear,
                    compare: Some(Vec::new()),
                    note: Some(format!("dp[{amount}] = {}.", self.table[amount])),
                    ..TableStep::default()
                }
            }
            CoinPhase::Conclude => {
                self.phase = CoinPhase::Done;
                let amount = self.amount as u64;
                let outcome = match self.table.last().and_then(|c| c.finite()) {
                    Some(value) => Outcome::Value {
                        label: format!("Minimum coins for {amount}"),
                        value,
                    },
                    None => Outcome::Unreachable { amount },
                };
                return Ok(Some(Step::finished(outcome)));
            }
            CoinPhase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}

/// A knapsack item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub weight: u64,
    pub value: u64,
}

impl Item {
    pub const fn new(weight: u64, value: u64) -> Self {
        Self { weight, value }
    }
}

#[derive(Debug, Clone, Copy)]
enum KnapsackPhase {
    Init,
    Cell { item: usize, cap: usize },
    Exclude { item: usize, cap: usize },
    Include { item: usize, cap: usize },
    Write { item: usize, cap: usize, value: u64 },
    Close,
    Conclude,
    Done,
}

/// Best total value within a weight capacity, each item used at most once.
///
/// Row `i` covers the first `i` items; column `w` is the capacity.
pub struct Knapsack {
    items: Vec<Item>,
    capacity: usize,
    table: Vec<Vec<u64>>,
    phase: KnapsackPhase,
}

impl Knapsack {
    pub fn new(items: Vec<Item>, capacity: u64) -> Self {
        Self {
            items,
            capacity: capacity as usize,
            table: Vec::new(),
            phase: KnapsackPhase::Init,
        }
    }

    fn first_cell(&self) -> KnapsackPhase {
        if self.items.is_empty() || self.capacity == 0 {
            KnapsackPhase::Close
        } else {
            KnapsackPhase::Cell { item: 1, cap: 1 }
        }
    }

    fn next_cell(&self, item: usize, cap: usize) -> KnapsackPhase {
        if cap < self.capacity {
            KnapsackPhase::Cell { item, cap: cap + 1 }
        } else if item < self.items.len() {
            KnapsackPhase::Cell { item: item + 1, cap: 1 }
        } else {
            KnapsackPhase::Close
        }
    }
}

impl StepProducer for Knapsack {
    fn name(&self) -> &'static str {
        "knapsack"
    }

    fn advance(&mut self) -> Result<Option<Step>, Fault> {
        let step = match self.phase {
            KnapsackPhase::Init => {
                self.table = vec![vec![0; self.capacity + 1]; self.items.len() + 1];
                self.phase = self.first_cell();
                TableStep {
                    table: Some(vec![vec![Cost::Finite(0); self.capacity + 1]; self.items.len() + 1]),
                    note: Some("Table initialized with zeros.".to_string()),
                    ..TableStep::default()
                }
            }
            KnapsackPhase::Cell { item, cap } => {
                let Item { weight, value } = self.items[item - 1];
                self.phase = KnapsackPhase::Exclude { item, cap };
                TableStep {
                    current: Patch::Set(CellRef::new(item, cap)),
                    cursor: Patch::Set(item - 1),
                    compare: Some(Vec::new()),
                    note: Some(format!("Item {item} (v:{value}, w:{weight}), capacity {cap}.")),
                    ..TableStep::default()
                }
            }
            KnapsackPhase::Exclude { item, cap } => {
                let exclude = self.table[item - 1][cap];
                self.phase = if self.items[item - 1].weight as usize <= cap {
                    KnapsackPhase::Include { item, cap }
                } else {
                    KnapsackPhase::Write { item, cap, value: exclude }
                };
                TableStep {
                    compare: Some(vec![CellRef::new(item - 1, cap)]),
                    note: Some(format!("Option 1 (exclude): value is {exclude}.")),
                    ..TableStep::default()
                }
            }
            KnapsackPhase::Include { item, cap } => {
                let Item { weight, value } = self.items[item - 1];
                let rest = cap - weight as usize;
                let include = value.saturating_add(self.table[item - 1][rest]);
                let exclude = self.table[item - 1][cap];
                self.phase = KnapsackPhase::Write { item, cap, value: include.max(exclude) };
                TableStep {
                    compare: Some(vec![CellRef::new(item - 1, cap), CellRef::new(item - 1, rest)]),
                    note: Some(format!(
                        "Option 2 (include): value is {value} + {} = {include}.",
                        self.table[item - 1][rest]
                    )),
                    ..TableStep::default()
                }
            }
            KnapsackPhase::Write { item, cap, value } => {
                let fits = self.items[item - 1].weight as usize <= cap;
                self.table[item][cap] = value;
                self.phase = self.next_cell(item, cap);
                let note = if fits {
                    format!("Max value is {value}.")
                } else {
                    format!("Item is too heavy. Value is {value}.")
                };
                TableStep {
                    write: Some(CellWrite {
                        cell: CellRef::new(item, cap),
                        value: Cost::Finite(value),
                    }),
                    note: Some(note),
                    ..TableStep::default()
                }
            }
            KnapsackPhase::Close => {
                self.phase = KnapsackPhase::Conclude;
                TableStep {
                    current: Patch::Clear,
                    cursor: Patch::Clear,
                    compare: Some(Vec::new()),
                    ..TableStep::default()
                }
            }
            KnapsackPhase::Conclude => {
                self.phase = KnapsackPhase::Done;
                let value = self.table[self.items.len()][self.capacity];
                return Ok(Some(Step::finished(Outcome::Value {
                    label: "Maximum value".to_string(),
                    value,
                })));
            }
            KnapsackPhase::Done => return Ok(None),
        };
        Ok(Some(step.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::producer::drain;
    use crate::state::{Scene, TableState, VisualState};

    fn fold(mut producer: impl StepProducer) -> VisualState {
        let steps = drain(&mut producer).unwrap();
        VisualState::fold(VisualState::new(Scene::Table(TableState::default())), &steps).unwrap()
    }

    #[test]
    fn coin_change_eleven() {
        let state = fold(CoinChange::new(vec![1, 2, 5], 11));
        let table = state.table().unwrap();
        assert_eq!(table.get(0, 11), Some(Cost::Finite(3)));
        assert_eq!(table.get(0, 0), Some(Cost::Finite(0)));
        assert_eq!(table.get(0, 3), Some(Cost::Finite(2)));
        assert_eq!(
            state.outcome,
            Some(Outcome::Value { label: "Minimum coins for 11".to_string(), value: 3 })
        );
        assert_eq!(table.current, Some(CellRef::new(0, 11)));
        assert_eq!(table.cursor, None);
    }

    #[test]
    fn coin_change_unreachable() {
        let state = fold(CoinChange::new(vec![2], 3));
        let table = state.table().unwrap();
        assert_eq!(table.get(0, 3), Some(Cost::Infinite));
        assert_eq!(state.outcome, Some(Outcome::Unreachable { amount: 3 }));
        assert_eq!(state.message.as_deref(), Some("Cannot make amount 3 with the given coins."));
    }

    #[test]
    fn knapsack_classic() {
        let items = vec![Item::new(10, 60), Item::new(20, 100), Item::new(30, 120)];
        let state = fold(Knapsack::new(items, 50));
        let table = state.table().unwrap();
        assert_eq!(table.get(3, 50), Some(Cost::Finite(220)));
        assert_eq!(table.get(1, 10), Some(Cost::Finite(60)));
        assert_eq!(table.get(1, 9), Some(Cost::Finite(0)));
        assert_eq!(
            state.outcome,
            Some(Outcome::Value { label: "Maximum value".to_string(), value: 220 })
        );
        assert!(table.compare.is_empty());
    }

    #[test]
    fn knapsack_include_saturates() {
        let items = vec![Item::new(1, u64::MAX), Item::new(1, u64::MAX)];
        let state = fold(Knapsack::new(items, 2));
        assert_eq!(state.table().unwrap().get(2, 2), Some(Cost::Finite(u64::MAX)));
    }

    #[test]
    fn knapsack_zero_capacity() {
        let state = fold(Knapsack::new(vec![Item::new(1, 5)], 0));
        assert_eq!(
            state.outcome,
            Some(Outcome::Value { label: "Maximum value".to_string(), value: 0 })
        );
    }
}
