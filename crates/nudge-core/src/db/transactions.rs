//! Transaction operations

use rusqlite::{params, OptionalExtension, TransactionBehavior};

use super::{parse_datetime, Database};
use crate::error::Result;
use crate::models::{NewTransaction, StoredTransaction, Transaction};

const SELECT_COLUMNS: &str = "SELECT id, amount, category, timestamp, created_at FROM transactions";

impl Database {
    /// Insert a transaction and return it with its assigned id
    ///
    /// Ids are sequential: the current row count plus one, rendered as a
    /// string. Counting and inserting happen under one write lock so
    /// concurrent inserts cannot be handed the same id.
    pub fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let count: i64 = db_tx.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        let mut next = count + 1;
        // Skip past ids that are already taken (e.g. rows imported out of order)
        while db_tx
            .query_row(
                "SELECT 1 FROM transactions WHERE id = ?",
                params![next.to_string()],
                |_| Ok(()),
            )
            .optional()?
            .is_some()
        {
            next += 1;
        }
        let id = next.to_string();

        db_tx.execute(
            "INSERT INTO transactions (id, amount, category, timestamp) VALUES (?, ?, ?, ?)",
            params![id, tx.amount, tx.category, tx.timestamp],
        )?;
        db_tx.commit()?;

        Ok(Transaction {
            id,
            amount: tx.amount,
            category: tx.category.clone(),
            timestamp: tx.timestamp.clone(),
        })
    }

    /// List all transactions, newest first
    pub fn list_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self
            .list_stored_transactions(None)?
            .into_iter()
            .map(|s| s.transaction)
            .collect())
    }

    /// List transactions with their insertion time, newest first
    pub fn list_stored_transactions(&self, limit: Option<usize>) -> Result<Vec<StoredTransaction>> {
        let conn = self.conn()?;
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let mut stmt = conn.prepare(&format!(
            "{} ORDER BY created_at DESC, rowid DESC LIMIT ?",
            SELECT_COLUMNS
        ))?;

        let transactions = stmt
            .query_map(params![limit], |row| Self::row_to_stored(row))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: &str) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE id = ?", SELECT_COLUMNS))?;

        let transaction = stmt
            .query_row(params![id], |row| Self::row_to_stored(row))
            .optional()?;

        Ok(transaction.map(|s| s.transaction))
    }

    /// Replace every stored transaction with `transactions`
    ///
    /// Runs in one SQLite transaction; ids are reassigned as `1..=n` in input
    /// order. Returns the number of rows written.
    pub fn replace_all_transactions(&self, transactions: &[NewTransaction]) -> Result<usize> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        db_tx.execute("DELETE FROM transactions", [])?;
        {
            let mut stmt = db_tx.prepare(
                "INSERT INTO transactions (id, amount, category, timestamp) VALUES (?, ?, ?, ?)",
            )?;
            for (i, tx) in transactions.iter().enumerate() {
                stmt.execute(params![
                    (i + 1).to_string(),
                    tx.amount,
                    tx.category,
                    tx.timestamp
                ])?;
            }
        }
        db_tx.commit()?;

        Ok(transactions.len())
    }

    /// Count total transactions
    pub fn count_transactions(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?;
        Ok(count)
    }

    fn row_to_stored(row: &rusqlite::Row) -> rusqlite::Result<StoredTransaction> {
        let category: Option<String> = row.get(2)?;
        let created_at_str: String = row.get(4)?;
        Ok(StoredTransaction {
            transaction: Transaction {
                id: row.get(0)?,
                amount: row.get(1)?,
                category: category.unwrap_or_default(),
                timestamp: row.get(3)?,
            },
            created_at: parse_datetime(&created_at_str),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_tx(amount: f64, category: &str, timestamp: &str) -> NewTransaction {
        NewTransaction {
            amount,
            category: category.to_string(),
            timestamp: timestamp.to_string(),
        }
    }

    #[test]
    fn test_create_assigns_sequential_ids() {
        let db = Database::in_memory().unwrap();

        let first = db
            .create_transaction(&new_tx(12.5, "Food", "2024-06-14T10:00:00Z"))
            .unwrap();
        let second = db
            .create_transaction(&new_tx(40.0, "Travel", "2024-06-14"))
            .unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert_eq!(second.category, "Travel");
        assert_eq!(db.count_transactions().unwrap(), 2);
    }

    #[test]
    fn test_get_transaction() {
        let db = Database::in_memory().unwrap();
        let created = db
            .create_transaction(&new_tx(-5.0, "Refund", "2024-06-14T10:00:00+02:00"))
            .unwrap();

        let fetched = db.get_transaction(&created.id).unwrap().unwrap();
        assert_eq!(fetched, created);
        assert!(db.get_transaction("999").unwrap().is_none());
    }

    #[test]
    fn test_list_newest_first() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&new_tx(1.0, "A", "2024-06-01")).unwrap();
        db.create_transaction(&new_tx(2.0, "B", "2024-06-02")).unwrap();
        db.create_transaction(&new_tx(3.0, "C", "2024-06-03")).unwrap();

        let listed = db.list_transactions().unwrap();
        let ids: Vec<&str> = listed.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["3", "2", "1"]);
    }

    #[test]
    fn test_list_with_limit() {
        let db = Database::in_memory().unwrap();
        for i in 0..5 {
            db.create_transaction(&new_tx(i as f64, "X", "2024-06-01"))
                .unwrap();
        }

        let stored = db.list_stored_transactions(Some(2)).unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].transaction.id, "5");
    }

    #[test]
    fn test_timestamp_kept_verbatim() {
        let db = Database::in_memory().unwrap();
        let created = db
            .create_transaction(&new_tx(9.99, "Books", "not-a-date"))
            .unwrap();
        let fetched = db.get_transaction(&created.id).unwrap().unwrap();
        assert_eq!(fetched.timestamp, "not-a-date");
    }

    #[test]
    fn test_null_category_reads_as_blank() {
        let db = Database::in_memory().unwrap();
        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO transactions (id, amount, category, timestamp) VALUES ('1', 3.0, NULL, '2024-06-01')",
                [],
            )
            .unwrap();

        let tx = db.get_transaction("1").unwrap().unwrap();
        assert_eq!(tx.category, "");
        assert_eq!(tx.category_or_default(), "Other");
    }

    #[test]
    fn test_replace_all() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&new_tx(1.0, "Old", "2024-01-01")).unwrap();

        let written = db
            .replace_all_transactions(&[
                new_tx(10.0, "Food", "2024-06-01"),
                new_tx(20.0, "Rent", "2024-06-02"),
            ])
            .unwrap();
        assert_eq!(written, 2);
        assert_eq!(db.count_transactions().unwrap(), 2);
        assert_eq!(db.get_transaction("1").unwrap().unwrap().category, "Food");
        assert_eq!(db.get_transaction("2").unwrap().unwrap().category, "Rent");

        // Next insert continues the sequence
        let next = db.create_transaction(&new_tx(5.0, "Fun", "2024-06-03")).unwrap();
        assert_eq!(next.id, "3");
    }

    #[test]
    fn test_replace_all_empty_clears() {
        let db = Database::in_memory().unwrap();
        db.create_transaction(&new_tx(1.0, "Old", "2024-01-01")).unwrap();
        assert_eq!(db.replace_all_transactions(&[]).unwrap(), 0);
        assert_eq!(db.count_transactions().unwrap(), 0);
    }

    #[test]
    fn test_create_skips_taken_id() {
        let db = Database::in_memory().unwrap();
        db.conn()
            .unwrap()
            .execute(
                "INSERT INTO transactions (id, amount, category, timestamp) VALUES ('1', 3.0, 'A', '2024-06-01'), ('3', 3.0, 'B', '2024-06-01')",
                [],
            )
            .unwrap();

        // count + 1 = 3 is taken
        let created = db.create_transaction(&new_tx(1.0, "C", "2024-06-02")).unwrap();
        assert_eq!(created.id, "4");
    }
}
