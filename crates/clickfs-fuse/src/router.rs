//! Path routing.
//!
//! A [`Router`] holds an ordered list of [`Route`]s. Patterns are anchored
//! regular expressions tested top-down; the first match owns the path.

use std::sync::Arc;

use regex::Regex;
use tracing::trace;

use crate::attr::AttrDefaults;
use crate::error::{FsError, Result};
use crate::handler::{Handler, RootHandler, TeamHandler, TeamsHandler, UserHandler};
use crate::operations::FsOp;
use crate::source::RemoteSource;

pub struct Route {
    pattern: Regex,
    handler: Arc<dyn Handler>,
}

impl Route {
    /// Compile `pattern`, anchoring it at both ends if it is not already.
    pub fn new(pattern: &str, handler: Arc<dyn Handler>) -> Result<Self> {
        let mut anchored = String::with_capacity(pattern.len() + 2);
        if !pattern.starts_with('^') {
            anchored.push('^');
        }
        anchored.push_str(pattern);
        if !pattern.ends_with('$') {
            anchored.push('$');
        }

        let pattern = Regex::new(&anchored).map_err(|e| FsError::InvalidArgument {
            msg: format!("bad route pattern {}: {}", anchored, e),
        })?;

        Ok(Self { pattern, handler })
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn matches(&self, path: &str) -> bool {
        self.pattern.is_match(path)
    }
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("handler", &self.handler.name())
            .finish()
    }
}

#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    /// The ClickUp tree, in match order:
    ///
    /// 1. `/` root
    /// 2. `/user`
    /// 3. `/teams` (trailing slash allowed)
    /// 4. `/teams/<numeric id>`
    pub fn clickup(source: Arc<dyn RemoteSource>, owner: AttrDefaults) -> Result<Self> {
        let routes = vec![
            Route::new(r"^/$", Arc::new(RootHandler::new(owner)))?,
            Route::new(r"^/user$", Arc::new(UserHandler::new(source.clone(), owner)))?,
            Route::new(r"^/teams/?$", Arc::new(TeamsHandler::new(source.clone(), owner)))?,
            Route::new(r"^/teams/[0-9]+$", Arc::new(TeamHandler::new(source, owner)))?,
        ];
        Ok(Self::new(routes))
    }

    /// Handler owning `path`. `op` is only used for diagnostics.
    pub fn resolve(&self, op: FsOp, path: &str) -> Result<&Arc<dyn Handler>> {
        for route in &self.routes {
            if route.matches(path) {
                trace!(op = op.as_str(), path, handler = route.handler.name(), "route matched");
                return Ok(&route.handler);
            }
        }
        Err(FsError::NoRouteFound {
            path: path.to_string(),
        })
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
