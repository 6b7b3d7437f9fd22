//! In-memory stand-in for a Postgres backend

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use datalink_core::ConnectionManager;

use crate::models::{SqlRow, SqlValue};
use crate::repositories::{DbError, DbResult, StatementExecutor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Succeed,
    FailStatements,
    Unreachable,
}

#[derive(Debug)]
struct State {
    script: Mutex<Script>,
    executed: Mutex<Vec<(String, Vec<SqlValue>)>>,
    commits: AtomicU32,
    rollbacks: AtomicU32,
    connect_attempts: AtomicU32,
}

#[derive(Debug, Clone)]
pub struct FakeSqlManager {
    state: Arc<State>,
}

impl FakeSqlManager {
    pub fn new() -> Self {
        Self {
            state: Arc::new(State {
                script: Mutex::new(Script::Succeed),
                executed: Mutex::new(Vec::new()),
                commits: AtomicU32::new(0),
                rollbacks: AtomicU32::new(0),
                connect_attempts: AtomicU32::new(0),
            }),
        }
    }

    pub fn script(&self, script: Script) {
        *self.state.script.lock().unwrap() = script;
    }

    fn current(&self) -> Script {
        *self.state.script.lock().unwrap()
    }

    /// Committed statements with their bound values
    pub fn executed(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.state.executed.lock().unwrap().clone()
    }

    pub fn commits(&self) -> u32 {
        self.state.commits.load(Ordering::SeqCst)
    }

    pub fn rollbacks(&self) -> u32 {
        self.state.rollbacks.load(Ordering::SeqCst)
    }

    pub fn connect_attempts(&self) -> u32 {
        self.state.connect_attempts.load(Ordering::SeqCst)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("connection refused")]
pub struct Refused;

#[derive(Debug)]
pub struct FakeSqlConnection {
    manager: FakeSqlManager,
}

#[async_trait]
impl ConnectionManager for FakeSqlManager {
    type Connection = FakeSqlConnection;
    type Error = Refused;

    async fn connect(&self) -> Result<FakeSqlConnection, Refused> {
        self.state.connect_attempts.fetch_add(1, Ordering::SeqCst);
        if self.current() == Script::Unreachable {
            return Err(Refused);
        }
        Ok(FakeSqlConnection {
            manager: self.clone(),
        })
    }
}

#[async_trait]
impl StatementExecutor for FakeSqlConnection {
    async fn execute_in_transaction(&mut self, sql: &str, params: &[SqlValue]) -> DbResult<u64> {
        let state = &self.manager.state;
        if params.iter().any(SqlValue::is_null) {
            return Err(DbError::UnsupportedValue("NULL"));
        }
        if self.manager.current() == Script::FailStatements {
            state.rollbacks.fetch_add(1, Ordering::SeqCst);
            return Err(DbError::Statement("column \"name\" does not exist".into()));
        }
        state
            .executed
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        state.commits.fetch_add(1, Ordering::SeqCst);
        Ok(1)
    }

    async fn fetch_all(&mut self, sql: &str) -> DbResult<Vec<SqlRow>> {
        if self.manager.current() == Script::FailStatements {
            return Err(DbError::Statement(format!("relation in {sql:?} does not exist")));
        }
        Ok(vec![vec![SqlValue::Int(1)]])
    }
}
