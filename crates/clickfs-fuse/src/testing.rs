//! In-memory remote source for unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::{json, Value};

use crate::content::record_id;
use crate::source::{Record, RemoteSource, SourceError, SourceResult};

pub(crate) fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {}", other),
    }
}

pub(crate) struct FakeSource {
    user: Mutex<Record>,
    teams: Mutex<Vec<Record>>,
    failing: AtomicBool,
    pub calls: AtomicUsize,
}

impl FakeSource {
    pub fn new() -> Self {
        Self {
            user: Mutex::new(record(json!({"user": {"id": 7, "username": "sam"}}))),
            teams: Mutex::new(vec![
                record(json!({"id": "42", "name": "Core", "members": []})),
                record(json!({"id": "7", "name": "Ops", "members": [{"id": 1}]})),
            ]),
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn set_user(&self, value: Value) {
        *self.user.lock().unwrap() = record(value);
    }

    pub fn set_teams(&self, teams: Vec<Value>) {
        *self.teams.lock().unwrap() = teams.into_iter().map(record).collect();
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn enter(&self) -> SourceResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Unavailable("fake source down".to_string()));
        }
        Ok(())
    }
}

impl RemoteSource for FakeSource {
    fn user(&self) -> SourceResult<Record> {
        self.enter()?;
        Ok(self.user.lock().unwrap().clone())
    }

    fn teams(&self) -> SourceResult<Vec<Record>> {
        self.enter()?;
        Ok(self.teams.lock().unwrap().clone())
    }

    fn team(&self, id: &str) -> SourceResult<Record> {
        self.enter()?;
        let teams = self.teams.lock().unwrap();
        teams
            .iter()
            .find(|t| record_id(t).as_deref() == Some(id))
            .map(|t| {
                let mut envelope = Record::new();
                envelope.insert("team".to_string(), Value::Object(t.clone()));
                envelope
            })
            .ok_or_else(|| SourceError::Unavailable(format!("team {} not found", id)))
    }
}
