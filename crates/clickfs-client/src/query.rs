//! Filters accepted by the team task listing endpoint.

/// Query parameters for `GET team/{id}/task`.
///
/// Unset fields are omitted from the request so the server applies its own
/// defaults. List filters are sent as repeated `name[]` parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub page: Option<u32>,
    pub order_by: Option<String>,
    pub reverse: Option<bool>,
    pub subtasks: Option<bool>,
    pub include_closed: Option<bool>,
    pub statuses: Vec<String>,
    pub assignees: Vec<String>,
    pub list_ids: Vec<String>,
    pub project_ids: Vec<String>,
    pub space_ids: Vec<String>,
}

impl TaskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn include_closed(mut self, include: bool) -> Self {
        self.include_closed = Some(include);
        self
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(page) = self.page {
            pairs.push(("page".to_string(), page.to_string()));
        }
        if let Some(ref order_by) = self.order_by {
            pairs.push(("order_by".to_string(), order_by.clone()));
        }
        for (name, flag) in [
            ("reverse", self.reverse),
            ("subtasks", self.subtasks),
            ("include_closed", self.include_closed),
        ] {
            if let Some(flag) = flag {
                pairs.push((name.to_string(), flag.to_string()));
            }
        }
        for (name, values) in [
            ("statuses[]", &self.statuses),
            ("assignees[]", &self.assignees),
            ("list_ids[]", &self.list_ids),
            ("project_ids[]", &self.project_ids),
            ("space_ids[]", &self.space_ids),
        ] {
            for value in values {
                pairs.push((name.to_string(), value.clone()));
            }
        }

        pairs
    }
}
