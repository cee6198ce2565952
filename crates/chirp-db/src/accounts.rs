use anyhow::Result;
use chirp_types::models::Account;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;

impl Database {
    /// Insert `username`/`password` and hand back the account with its
    /// generated id. The caller's `account_id` is not written.
    pub fn insert_account(&self, account: &Account) -> Result<Account> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO account (username, password) VALUES (?1, ?2)",
                (&account.username, &account.password),
            )?;
            Ok(Account {
                account_id: conn.last_insert_rowid(),
                ..account.clone()
            })
        })
    }

    pub fn get_account_by_id(&self, account_id: i64) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            query_account(
                conn,
                "SELECT account_id, username, password FROM account WHERE account_id = ?1",
                [account_id],
            )
        })
    }

    pub fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            query_account(
                conn,
                "SELECT account_id, username, password FROM account WHERE username = ?1",
                [username],
            )
        })
    }

    /// Exact match on both columns. No hashing.
    pub fn authenticate_account(&self, username: &str, password: &str) -> Result<Option<Account>> {
        self.with_conn(|conn| {
            query_account(
                conn,
                "SELECT account_id, username, password FROM account
                 WHERE username = ?1 AND password = ?2",
                [username, password],
            )
        })
    }
}

fn query_account<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Option<Account>> {
    let mut stmt = conn.prepare(sql)?;
    let row = stmt.query_row(params, account_from_row).optional()?;
    Ok(row)
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get(0)?,
        username: row.get(1)?,
        password: row.get(2)?,
    })
}
