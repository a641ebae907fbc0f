//! Pending pool of transactions awaiting the next sealed block

use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct Mempool {
    transactions: Vec<Transaction>,
}

impl Mempool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a transaction; insertion order is the order it will be sealed in.
    pub fn add_transaction(&mut self, tx: Transaction) {
        self.transactions.push(tx);
    }

    pub fn get_all_transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Move every pending transaction out, leaving the pool empty.
    pub fn drain(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_preserves_order_and_empties() {
        let mut pool = Mempool::new();
        pool.add_transaction(Transaction::new("a", "b", 1));
        pool.add_transaction(Transaction::new("b", "c", 2));
        pool.add_transaction(Transaction::new("a", "b", 1));
        assert_eq!(pool.len(), 3);

        let drained = pool.drain();
        assert_eq!(drained.len(), 3);
        assert_eq!(drained[1], Transaction::new("b", "c", 2));
        assert_eq!(drained[0], drained[2]);
        assert!(pool.is_empty());
        assert!(pool.drain().is_empty());
    }
}
