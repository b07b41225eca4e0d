/// System-design board and its JSON export.
///
/// The board is a small directed graph of named components. Export is
/// one-way: pretty JSON written next to the session data.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::AppError;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComponentKind {
    Client,
    LoadBalancer,
    Server,
    Cache,
    Database,
    Queue,
    Cdn,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Client, ComponentKind::LoadBalancer, ComponentKind::Server,
        ComponentKind::Cache, ComponentKind::Database, ComponentKind::Queue, ComponentKind::Cdn,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ComponentKind::Client => "Client",
            ComponentKind::LoadBalancer => "Load Balancer",
            ComponentKind::Server => "Server",
            ComponentKind::Cache => "Cache",
            ComponentKind::Database => "Database",
            ComponentKind::Queue => "Queue",
            ComponentKind::Cdn => "CDN",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Component {
    pub id: u32,
    pub kind: ComponentKind,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Connection {
    pub from: u32,
    pub to: u32,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct DesignGraph {
    pub components: Vec<Component>,
    pub connections: Vec<Connection>,
    #[serde(skip)]
    next_id: u32,
}

impl DesignGraph {
    /// Add a component; its label is numbered per kind ("Server 2").
    pub fn add(&mut self, kind: ComponentKind) -> u32 {
        self.next_id += 1;
        let n = self.components.iter().filter(|c| c.kind == kind).count() + 1;
        self.components.push(Component {
            id: self.next_id,
            kind,
            label: format!("{} {}", kind.label(), n),
        });
        self.next_id
    }

    pub fn remove(&mut self, id: u32) -> bool {
        let before = self.components.len();
        self.components.retain(|c| c.id != id);
        self.connections.retain(|c| c.from != id && c.to != id);
        self.components.len() != before
    }

    pub fn contains(&self, id: u32) -> bool {
        self.components.iter().any(|c| c.id == id)
    }

    /// Link two existing components. Self-links and duplicates are refused.
    pub fn connect(&mut self, from: u32, to: u32) -> bool {
        if from == to || !self.contains(from) || !self.contains(to) {
            return false;
        }
        let link = Connection { from, to };
        if self.connections.contains(&link) {
            return false;
        }
        self.connections.push(link);
        true
    }

    pub fn clear(&mut self) {
        *self = DesignGraph::default();
    }

    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the board to `dir/<name>` and return the full path.
    pub fn export(&self, dir: &Path, name: &str) -> Result<PathBuf, AppError> {
        let path = dir.join(name);
        std::fs::write(&path, self.to_json()?)?;
        info!(path = %path.display(), components = self.components.len(), "design exported");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DesignGraph {
        let mut g = DesignGraph::default();
        let lb = g.add(ComponentKind::LoadBalancer);
        let s1 = g.add(ComponentKind::Server);
        let s2 = g.add(ComponentKind::Server);
        let db = g.add(ComponentKind::Database);
        assert!(g.connect(lb, s1));
        assert!(g.connect(lb, s2));
        assert!(g.connect(s1, db));
        g
    }

    #[test]
    fn json_shape() {
        let g = sample();
        let v: serde_json::Value = serde_json::from_str(&g.to_json().expect("json")).expect("valid");
        assert_eq!(v["components"].as_array().map(Vec::len), Some(4));
        assert_eq!(v["components"][2]["label"], "Server 2");
        assert_eq!(v["components"][0]["kind"], "load-balancer");
        assert_eq!(v["connections"][0]["from"], 1);
        assert_eq!(v["connections"][0]["to"], 2);
        assert!(v.get("next_id").is_none());
    }

    #[test]
    fn invalid_links_are_refused() {
        let mut g = sample();
        assert!(!g.connect(1, 1));
        assert!(!g.connect(1, 2));
        assert!(!g.connect(1, 99));
        assert_eq!(g.connections.len(), 3);
    }

    #[test]
    fn removing_a_component_drops_its_links() {
        let mut g = sample();
        assert!(g.remove(2));
        assert_eq!(g.connections, vec![Connection { from: 1, to: 3 }]);
        assert!(!g.remove(2));
    }

    #[test]
    fn export_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = sample().export(dir.path(), "design.json").expect("export");
        let text = std::fs::read_to_string(path).expect("read");
        assert!(text.contains("\"connections\""));
    }

    #[test]
    fn export_into_missing_dir_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = sample().export(&dir.path().join("nope"), "d.json").unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }
}
