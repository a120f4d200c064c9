//! Reading and writing diagram files.
//!
//! A diagram file is an SVG container whose `content` attribute carries the
//! compressed diagram model. Loading and saving are the only places the
//! crate touches the file system.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use log::{debug, info, trace, warn};
use tempfile::NamedTempFile;

use drawkit_codec::{embed, extract, from_xml, to_xml};
use drawkit_core::DiagramGraph;

use crate::error::DrawkitError;

/// Vertex and edge counts of a stored diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiagramStats {
    pub node_count: usize,
    pub edge_count: usize,
}

/// Loads and saves diagram graphs as SVG containers.
pub struct DiagramStore;

impl DiagramStore {
    /// Reads a container file and decodes the diagram it embeds.
    ///
    /// # Errors
    ///
    /// Returns [`DrawkitError::Io`] when the file cannot be read and
    /// [`DrawkitError::MalformedDocument`] when it carries no diagram or the
    /// diagram cannot be decoded.
    pub fn load(path: impl AsRef<Path>) -> Result<DiagramGraph, DrawkitError> {
        let path = path.as_ref();
        debug!(path = path.display().to_string(); "Loading diagram");

        let container = fs::read_to_string(path)?;
        let xml = extract(&container)?.ok_or_else(|| {
            DrawkitError::MalformedDocument(format!(
                "no diagram content found in {}",
                path.display()
            ))
        })?;
        trace!(xml = xml.as_str(); "Extracted diagram model");

        Ok(from_xml(&xml)?)
    }

    /// Encodes the graph and writes it to `path`.
    ///
    /// Missing parent directories are created. The file is written to a
    /// temporary file next to the destination and renamed over it, so a
    /// failed save never leaves a truncated diagram behind.
    ///
    /// # Errors
    ///
    /// Returns [`DrawkitError::Io`] if a directory, the temporary file or the
    /// rename fails.
    pub fn save(graph: &DiagramGraph, path: impl AsRef<Path>) -> Result<(), DrawkitError> {
        let path = path.as_ref();
        let xml = to_xml(graph)?;
        let container = embed(&xml, graph.bounds())?;

        let directory = parent_directory(path);
        fs::create_dir_all(&directory)?;

        let mut file = NamedTempFile::new_in(&directory)?;
        file.write_all(container.as_bytes())?;
        file.flush()?;
        file.persist(path).map_err(|err| err.error)?;

        info!(
            path = path.display().to_string(),
            cells = graph.len();
            "Diagram saved"
        );
        Ok(())
    }

    /// Counts the vertices and edges of a stored diagram.
    ///
    /// Never fails: an unreadable or malformed file is logged and reported
    /// as an empty diagram.
    pub fn stats(path: impl AsRef<Path>) -> DiagramStats {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(graph) => DiagramStats {
                node_count: graph.vertex_count(),
                edge_count: graph.edge_count(),
            },
            Err(err) => {
                warn!(
                    path = path.display().to_string(),
                    err:% = err;
                    "Failed to read diagram stats"
                );
                DiagramStats::default()
            }
        }
    }
}

fn parent_directory(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use drawkit_core::{NewEdge, NewNode};

    use super::*;

    fn sample_graph() -> DiagramGraph {
        let mut graph = DiagramGraph::new();
        graph.add_node(&NewNode::new("a").at(0.0, 0.0)).unwrap();
        graph.add_node(&NewNode::new("b").at(200.0, 0.0)).unwrap();
        graph.link_nodes(&NewEdge::new("a", "b")).unwrap();
        graph
    }

    #[test]
    fn test_save_creates_directories_and_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/diagram.svg");

        let graph = sample_graph();
        DiagramStore::save(&graph, &path).unwrap();

        assert_eq!(DiagramStore::load(&path).unwrap(), graph);
        let leftovers = fs::read_dir(path.parent().unwrap()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DiagramStore::load(dir.path().join("absent.svg"));
        assert!(matches!(result, Err(DrawkitError::Io(_))));
    }

    #[test]
    fn test_load_svg_without_content_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.svg");
        fs::write(&path, r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();

        let result = DiagramStore::load(&path);
        assert!(matches!(result, Err(DrawkitError::MalformedDocument(_))));
    }

    #[test]
    fn test_stats_never_fail() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("diagram.svg");

        assert_eq!(DiagramStore::stats(&path), DiagramStats::default());

        DiagramStore::save(&sample_graph(), &path).unwrap();
        assert_eq!(
            DiagramStore::stats(&path),
            DiagramStats {
                node_count: 2,
                edge_count: 1
            }
        );
    }

    #[test]
    fn test_parent_directory_of_bare_file_name() {
        assert_eq!(parent_directory(Path::new("diagram.svg")), PathBuf::from("."));
    }
}
