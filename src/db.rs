use crate::config::AppPaths;
use crate::domain::{
    Budget, Category, NewTransaction, Recurrence, SavingsStart, Transaction, TxnKind, Upsert,
    User, from_cents, to_cents,
};
use crate::error::AppError;
use crate::savings::MonthFlow;
use anyhow::{Context, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

impl ToSql for TxnKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TxnKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "expense" => Ok(TxnKind::Expense),
            "income" => Ok(TxnKind::Income),
            other => Err(FromSqlError::Other(
                format!("unknown transaction kind '{other}'").into(),
            )),
        }
    }
}

impl ToSql for Recurrence {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for Recurrence {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value.as_str().map(Recurrence::from_stored)
    }
}

fn cents(amount: Decimal) -> Result<i64> {
    Ok(to_cents(amount).ok_or(AppError::AmountOutOfRange(amount))?)
}

const CATEGORY_COLUMNS: &str = "c.id, c.user_id, c.name, c.icon";
const TRANSACTION_COLUMNS: &str =
    "t.id, t.user_id, t.category_id, t.kind, t.amount_cents, t.date, t.description";
const BUDGET_COLUMNS: &str = "b.id, b.user_id, b.category_id, b.month, b.amount_cents, b.recurrence";

fn category_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(offset)?,
        user_id: row.get(offset + 1)?,
        name: row.get(offset + 2)?,
        icon: row.get(offset + 3)?,
    })
}

fn transaction_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(offset)?,
        user_id: row.get(offset + 1)?,
        category_id: row.get(offset + 2)?,
        kind: row.get(offset + 3)?,
        amount: from_cents(row.get(offset + 4)?),
        date: row.get(offset + 5)?,
        description: row.get(offset + 6)?,
    })
}

fn budget_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: row.get(offset)?,
        user_id: row.get(offset + 1)?,
        category_id: row.get(offset + 2)?,
        month: row.get(offset + 3)?,
        amount: from_cents(row.get(offset + 4)?),
        recurrence: row.get(offset + 5)?,
    })
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(paths: &AppPaths) -> Result<(Self, PathBuf)> {
        fs::create_dir_all(&paths.data_dir)
            .with_context(|| format!("Failed to create data dir {}", paths.data_dir.display()))?;

        let db_path = paths.data_dir.join("budgetbook.sqlite3");
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open DB {}", db_path.display()))?;
        debug!(path = %db_path.display(), "opened database");

        let db = Self { conn };
        db.migrate()?;
        Ok((db, db_path))
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY,
                email TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name TEXT NOT NULL,
                icon TEXT NOT NULL DEFAULT 'tag',
                UNIQUE (user_id, name)
            );

            CREATE TABLE IF NOT EXISTS transactions (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES categories(id),
                kind TEXT NOT NULL DEFAULT 'expense' CHECK (kind IN ('expense', 'income')),
                amount_cents INTEGER NOT NULL,
                date TEXT NOT NULL,
                description TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_transactions_user_date ON transactions(user_id, date);
            CREATE INDEX IF NOT EXISTS idx_transactions_category ON transactions(category_id);

            CREATE TABLE IF NOT EXISTS budgets (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                category_id INTEGER NOT NULL REFERENCES categories(id),
                month TEXT,
                amount_cents INTEGER NOT NULL,
                recurrence TEXT NOT NULL DEFAULT 'one_time',
                UNIQUE (user_id, category_id, month)
            );

            CREATE TABLE IF NOT EXISTS savings_start (
                id INTEGER PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                month TEXT NOT NULL,
                amount_cents INTEGER NOT NULL,
                UNIQUE (user_id, month)
            );
            "#,
        )?;
        Ok(())
    }

    // ---- users ----

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = self
            .conn
            .query_row(
                "SELECT id, email FROM users WHERE email = ?1",
                params![email.to_lowercase()],
                |row| {
                    Ok(User {
                        id: row.get(0)?,
                        email: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(user)
    }

    /// Registers a user together with their default category.
    pub fn register_user(&mut self, email: &str, default_category: &str, icon: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        if self.find_user_by_email(&email)?.is_some() {
            return Err(AppError::EmailTaken(email).into());
        }

        let tx = self.conn.transaction()?;
        tx.execute("INSERT INTO users (email) VALUES (?1)", params![email])?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO categories (user_id, name, icon) VALUES (?1, ?2, ?3)",
            params![id, default_category, icon],
        )?;
        tx.commit()?;

        info!(user_id = id, "registered user");
        Ok(User { id, email })
    }

    // ---- categories ----

    pub fn insert_category(&self, user_id: i64, name: &str, icon: &str) -> Result<i64> {
        if self.category_name_taken(user_id, name, None)? {
            return Err(AppError::DuplicateCategory(name.to_string()).into());
        }
        self.conn.execute(
            "INSERT INTO categories (user_id, name, icon) VALUES (?1, ?2, ?3)",
            params![user_id, name, icon],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_categories(&self, user_id: i64) -> Result<Vec<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.user_id = ?1 ORDER BY c.name"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], |row| category_at(row, 0))?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_category(&self, user_id: i64, id: i64) -> Result<Option<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.user_id = ?1 AND c.id = ?2"
        );
        Ok(self
            .conn
            .query_row(&sql, params![user_id, id], |row| category_at(row, 0))
            .optional()?)
    }

    pub fn find_category_by_name(&self, user_id: i64, name: &str) -> Result<Option<Category>> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories c WHERE c.user_id = ?1 AND c.name = ?2"
        );
        Ok(self
            .conn
            .query_row(&sql, params![user_id, name], |row| category_at(row, 0))
            .optional()?)
    }

    fn category_name_taken(&self, user_id: i64, name: &str, except: Option<i64>) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE user_id = ?1 AND name = ?2 AND id IS NOT ?3",
            params![user_id, name, except],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn update_category(&self, category: &Category) -> Result<()> {
        if self.category_name_taken(category.user_id, &category.name, Some(category.id))? {
            return Err(AppError::DuplicateCategory(category.name.clone()).into());
        }
        let changed = self.conn.execute(
            "UPDATE categories SET name = ?1, icon = ?2 WHERE id = ?3 AND user_id = ?4",
            params![category.name, category.icon, category.id, category.user_id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound("Category").into());
        }
        Ok(())
    }

    /// Deletes a category nothing references.
    pub fn delete_category(&self, user_id: i64, id: i64) -> Result<()> {
        let txn_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?1 AND category_id = ?2",
            params![user_id, id],
            |row| row.get(0),
        )?;
        if txn_count > 0 {
            return Err(AppError::CategoryInUse("transactions in this category").into());
        }

        let budget_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM budgets WHERE user_id = ?1 AND category_id = ?2",
            params![user_id, id],
            |row| row.get(0),
        )?;
        if budget_count > 0 {
            return Err(AppError::CategoryInUse("budgets for this category").into());
        }

        let changed = self.conn.execute(
            "DELETE FROM categories WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound("Category").into());
        }
        Ok(())
    }

    // ---- transactions ----

    pub fn insert_transaction(&self, user_id: i64, txn: &NewTransaction) -> Result<i64> {
        self.conn.execute(
            r#"
            INSERT INTO transactions (user_id, category_id, kind, amount_cents, date, description)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user_id,
                txn.category_id,
                txn.kind,
                cents(txn.amount)?,
                txn.date,
                txn.description,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_transaction(&self, user_id: i64, id: i64) -> Result<Option<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions t WHERE t.user_id = ?1 AND t.id = ?2"
        );
        Ok(self
            .conn
            .query_row(&sql, params![user_id, id], |row| transaction_at(row, 0))
            .optional()?)
    }

    pub fn update_transaction(&self, txn: &Transaction) -> Result<()> {
        let changed = self.conn.execute(
            r#"
            UPDATE transactions
            SET category_id = ?1, kind = ?2, amount_cents = ?3, date = ?4, description = ?5
            WHERE id = ?6 AND user_id = ?7
            "#,
            params![
                txn.category_id,
                txn.kind,
                cents(txn.amount)?,
                txn.date,
                txn.description,
                txn.id,
                txn.user_id,
            ],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound("Transaction").into());
        }
        Ok(())
    }

    pub fn delete_transaction(&self, user_id: i64, id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM transactions WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound("Transaction").into());
        }
        Ok(())
    }

    /// Newest first (date, then id). `limit` of `None` returns everything.
    pub fn list_transactions(
        &self,
        user_id: i64,
        limit: Option<usize>,
    ) -> Result<Vec<(Transaction, Category)>> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}, {CATEGORY_COLUMNS}
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?1
            ORDER BY t.date DESC, t.id DESC
            LIMIT ?2
            "#
        );
        let limit = limit.map_or(-1, |n| n as i64);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, limit], |row| {
            Ok((transaction_at(row, 0)?, category_at(row, 7)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn list_category_transactions(
        &self,
        user_id: i64,
        category_id: i64,
        month: &str,
    ) -> Result<Vec<Transaction>> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM transactions t
            WHERE t.user_id = ?1
              AND t.category_id = ?2
              AND substr(t.date, 1, 7) = ?3
            ORDER BY t.date DESC, t.id DESC
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, category_id, month], |row| {
            transaction_at(row, 0)
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Transactions of one kind in a month, newest first.
    pub fn list_month_transactions(
        &self,
        user_id: i64,
        month: &str,
        kind: TxnKind,
    ) -> Result<Vec<(Transaction, Category)>> {
        let sql = format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}, {CATEGORY_COLUMNS}
            FROM transactions t
            JOIN categories c ON c.id = t.category_id
            WHERE t.user_id = ?1
              AND t.kind = ?2
              AND substr(t.date, 1, 7) = ?3
            ORDER BY t.date DESC, t.id DESC
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id, kind, month], |row| {
            Ok((transaction_at(row, 0)?, category_at(row, 7)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Sum of one transaction kind per category for a month.
    pub fn category_sums_for_month(
        &self,
        user_id: i64,
        month: &str,
        kind: TxnKind,
    ) -> Result<BTreeMap<i64, Decimal>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT category_id, COALESCE(SUM(amount_cents), 0)
            FROM transactions
            WHERE user_id = ?1
              AND kind = ?2
              AND substr(date, 1, 7) = ?3
            GROUP BY category_id
            "#,
        )?;
        let rows = stmt.query_map(params![user_id, kind, month], |row| {
            let id: i64 = row.get(0)?;
            let total: i64 = row.get(1)?;
            Ok((id, from_cents(total)))
        })?;
        Ok(rows.collect::<rusqlite::Result<BTreeMap<_, _>>>()?)
    }

    /// Income and expense totals for every month with at least one transaction.
    pub fn monthly_flows(&self, user_id: i64) -> Result<Vec<MonthFlow>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT substr(date, 1, 7) AS m,
                   COALESCE(SUM(CASE WHEN kind = 'income' THEN amount_cents ELSE 0 END), 0),
                   COALESCE(SUM(CASE WHEN kind = 'expense' THEN amount_cents ELSE 0 END), 0)
            FROM transactions
            WHERE user_id = ?1
            GROUP BY m
            ORDER BY m
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let income: i64 = row.get(1)?;
            let expenses: i64 = row.get(2)?;
            Ok(MonthFlow {
                month: row.get(0)?,
                income: from_cents(income),
                expenses: from_cents(expenses),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ---- budgets ----

    /// Inserts a budget or, if one exists for (user, category, month),
    /// overwrites its amount and recurrence.
    pub fn upsert_budget(
        &self,
        user_id: i64,
        category_id: i64,
        month: &str,
        amount: Decimal,
        recurrence: Recurrence,
    ) -> Result<Upsert> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM budgets WHERE user_id = ?1 AND category_id = ?2 AND month = ?3",
                params![user_id, category_id, month],
                |row| row.get(0),
            )
            .optional()?;

        let amount_cents = cents(amount)?;
        let outcome = match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE budgets SET amount_cents = ?1, recurrence = ?2 WHERE id = ?3",
                    params![amount_cents, recurrence, id],
                )?;
                Upsert::Updated(id)
            }
            None => {
                self.conn.execute(
                    r#"
                    INSERT INTO budgets (user_id, category_id, month, amount_cents, recurrence)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                    params![user_id, category_id, month, amount_cents, recurrence],
                )?;
                Upsert::Inserted(self.conn.last_insert_rowid())
            }
        };
        debug!(?outcome, category_id, month, "upserted budget");
        Ok(outcome)
    }

    pub fn get_budget(&self, user_id: i64, id: i64) -> Result<Option<Budget>> {
        let sql =
            format!("SELECT {BUDGET_COLUMNS} FROM budgets b WHERE b.user_id = ?1 AND b.id = ?2");
        Ok(self
            .conn
            .query_row(&sql, params![user_id, id], |row| budget_at(row, 0))
            .optional()?)
    }

    pub fn update_budget(&self, budget: &Budget) -> Result<()> {
        let clash: i64 = self.conn.query_row(
            r#"
            SELECT COUNT(*) FROM budgets
            WHERE user_id = ?1 AND category_id = ?2 AND month IS ?3 AND id != ?4
            "#,
            params![budget.user_id, budget.category_id, budget.month, budget.id],
            |row| row.get(0),
        )?;
        if clash > 0 {
            return Err(AppError::DuplicateBudget.into());
        }

        let changed = self.conn.execute(
            r#"
            UPDATE budgets
            SET category_id = ?1, month = ?2, amount_cents = ?3, recurrence = ?4
            WHERE id = ?5 AND user_id = ?6
            "#,
            params![
                budget.category_id,
                budget.month,
                cents(budget.amount)?,
                budget.recurrence,
                budget.id,
                budget.user_id,
            ],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound("Budget").into());
        }
        Ok(())
    }

    pub fn delete_budget(&self, user_id: i64, id: i64) -> Result<()> {
        let changed = self.conn.execute(
            "DELETE FROM budgets WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        if changed == 0 {
            return Err(AppError::NotFound("Budget").into());
        }
        Ok(())
    }

    /// Every budget of the user joined to its category, in creation order.
    pub fn list_budgets_with_category(&self, user_id: i64) -> Result<Vec<(Budget, Category)>> {
        let sql = format!(
            r#"
            SELECT {BUDGET_COLUMNS}, {CATEGORY_COLUMNS}
            FROM budgets b
            JOIN categories c ON c.id = b.category_id
            WHERE b.user_id = ?1
            ORDER BY b.id ASC
            "#
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![user_id], |row| {
            Ok((budget_at(row, 0)?, category_at(row, 6)?))
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // ---- savings starts ----

    pub fn upsert_savings_start(&self, user_id: i64, month: &str, amount: Decimal) -> Result<Upsert> {
        let existing: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM savings_start WHERE user_id = ?1 AND month = ?2",
                params![user_id, month],
                |row| row.get(0),
            )
            .optional()?;

        let amount_cents = cents(amount)?;
        let outcome = match existing {
            Some(id) => {
                self.conn.execute(
                    "UPDATE savings_start SET amount_cents = ?1 WHERE id = ?2",
                    params![amount_cents, id],
                )?;
                Upsert::Updated(id)
            }
            None => {
                self.conn.execute(
                    "INSERT INTO savings_start (user_id, month, amount_cents) VALUES (?1, ?2, ?3)",
                    params![user_id, month, amount_cents],
                )?;
                Upsert::Inserted(self.conn.last_insert_rowid())
            }
        };
        Ok(outcome)
    }

    pub fn list_savings_starts(&self, user_id: i64) -> Result<Vec<SavingsStart>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, user_id, month, amount_cents
            FROM savings_start
            WHERE user_id = ?1
            ORDER BY month ASC
            "#,
        )?;
        let rows = stmt.query_map(params![user_id], |row| {
            let amount: i64 = row.get(3)?;
            Ok(SavingsStart {
                id: row.get(0)?,
                user_id: row.get(1)?,
                month: row.get(2)?,
                amount: from_cents(amount),
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }
}
