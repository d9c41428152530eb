#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use clickfs_fuse::attr::AttrDefaults;
use clickfs_fuse::router::Router;
use clickfs_fuse::vfs::VirtualFs;
use clickfs_fuse::{Record, RemoteSource, SourceError};
use serde_json::{json, Value};
use tracing::Span;

pub const OWNER: AttrDefaults = AttrDefaults { uid: 1000, gid: 1000 };

pub fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("fixture must be an object, got {}", other),
    }
}

/// Remote source backed by fixed JSON, with a switch to simulate outages.
pub struct StaticSource {
    user: Mutex<Value>,
    teams: Mutex<Vec<Value>>,
    down: AtomicBool,
    calls: AtomicUsize,
}

impl StaticSource {
    pub fn new(user: Value, teams: Vec<Value>) -> Arc<Self> {
        Arc::new(Self {
            user: Mutex::new(user),
            teams: Mutex::new(teams),
            down: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn sample() -> Arc<Self> {
        Self::new(
            json!({"user": {"id": 7, "username": "sam", "email": "sam@example.com"}}),
            vec![
                json!({"id": "42", "name": "Core", "members": [{"user": {"id": 7}}]}),
                json!({"id": "1001", "name": "Ops", "members": []}),
            ],
        )
    }

    pub fn set_user(&self, user: Value) {
        *self.user.lock().unwrap() = user;
    }

    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.down.load(Ordering::SeqCst) {
            Err(SourceError::Unavailable("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl RemoteSource for StaticSource {
    fn user(&self) -> Result<Record, SourceError> {
        self.check()?;
        Ok(record(self.user.lock().unwrap().clone()))
    }

    fn teams(&self) -> Result<Vec<Record>, SourceError> {
        self.check()?;
        Ok(self.teams.lock().unwrap().iter().cloned().map(record).collect())
    }

    fn team(&self, id: &str) -> Result<Record, SourceError> {
        self.check()?;
        self.teams
            .lock()
            .unwrap()
            .iter()
            .find(|t| t["id"] == id)
            .map(|t| record(json!({ "team": t })))
            .ok_or_else(|| SourceError::Unavailable(format!("no team {}", id)))
    }
}

pub fn mount_vfs(source: Arc<StaticSource>) -> VirtualFs {
    let router = Router::clickup(source, OWNER).unwrap();
    VirtualFs::new(router, Span::none())
}
