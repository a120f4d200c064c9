//! Diagram editing operations on files.
//!
//! Every operation loads the diagram, applies its mutation and saves the
//! result (`get_diagram_info` and `diagram_stats` only read). Requests are
//! validated before the file is touched. Concurrent calls on the same path
//! are not coordinated; the last writer wins.

use std::fmt;

use log::{debug, info, warn};

use drawkit_codec::to_xml;
use drawkit_core::{DiagramGraph, NewEdge, NewNode, NodeEdit, RemovalPolicy};

use crate::{
    config::{AppConfig, BatchMode},
    error::DrawkitError,
    layout::{LayoutDispatcher, LayoutRequest},
    store::{DiagramStats, DiagramStore},
};

/// Human-readable result of a tool operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    message: String,
}

impl ToolOutput {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ToolOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Lines reported by a batch: one per applied item, one per skipped item.
#[derive(Debug, Default)]
struct BatchReport {
    applied: Vec<String>,
    skipped: Vec<String>,
}

impl BatchReport {
    fn into_output(self) -> ToolOutput {
        let mut lines = self.applied;
        lines.extend(self.skipped);
        ToolOutput::new(lines.join("\n"))
    }
}

/// The diagram operations exposed to callers.
///
/// # Examples
///
/// ```rust,no_run
/// use drawkit::{DiagramTools, config::AppConfig};
/// use drawkit_core::{NewEdge, NewNode};
///
/// let mut tools = DiagramTools::new(&AppConfig::default());
/// tools.new_diagram("flow.drawio.svg").expect("create");
/// tools
///     .add_nodes(
///         "flow.drawio.svg",
///         &[NewNode::new("a"), NewNode::new("b").at(200.0, 0.0)],
///         None,
///     )
///     .expect("add");
/// tools
///     .link_nodes("flow.drawio.svg", &[NewEdge::new("a", "b")])
///     .expect("link");
/// ```
pub struct DiagramTools {
    dispatcher: LayoutDispatcher,
    batch: BatchMode,
    removal: RemovalPolicy,
}

impl Default for DiagramTools {
    fn default() -> Self {
        Self::new(&AppConfig::default())
    }
}

impl DiagramTools {
    /// Create the tool set with the given configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Layout parameters and editing behavior
    pub fn new(config: &AppConfig) -> Self {
        Self {
            dispatcher: config.layout().dispatcher(),
            batch: config.editing().batch(),
            removal: config.editing().removal_policy(),
        }
    }

    /// Writes an empty diagram to `file_path`, replacing any existing file.
    pub fn new_diagram(&self, file_path: &str) -> Result<ToolOutput, DrawkitError> {
        require("file_path", file_path)?;

        DiagramStore::save(&DiagramGraph::new(), file_path)?;
        Ok(ToolOutput::new(format!("Created new diagram: {file_path}")))
    }

    /// Adds vertices, then optionally lays out the root level.
    ///
    /// The layout request is validated before any vertex is added.
    pub fn add_nodes(
        &mut self,
        file_path: &str,
        nodes: &[NewNode],
        layout: Option<&LayoutRequest>,
    ) -> Result<ToolOutput, DrawkitError> {
        require("file_path", file_path)?;
        for node in nodes {
            require("id", &node.id)?;
        }
        let plan = layout
            .map(|request| self.dispatcher.plan(request))
            .transpose()?;

        let mut graph = DiagramStore::load(file_path)?;
        let mut report = self.run_batch(nodes, |node| node.id.as_str(), |node| {
            graph.add_node(node)?;
            Ok(format!(
                "Added node: {} ({}) with shape {} to {file_path}",
                node.id,
                node.label.as_deref().unwrap_or_default(),
                node.kind
            ))
        })?;

        if let Some(plan) = plan {
            let moved = self.dispatcher.apply_plan(&mut graph, plan)?;
            report.applied.push(format!(
                "Applied {} layout to {moved} nodes",
                plan.algorithm()
            ));
        }

        DiagramStore::save(&graph, file_path)?;
        Ok(report.into_output())
    }

    /// Changes existing cells.
    pub fn edit_nodes(
        &self,
        file_path: &str,
        edits: &[NodeEdit],
    ) -> Result<ToolOutput, DrawkitError> {
        require("file_path", file_path)?;
        for edit in edits {
            require("id", &edit.id)?;
        }

        let mut graph = DiagramStore::load(file_path)?;
        let report = self.run_batch(edits, |edit| edit.id.as_str(), |edit| {
            let cell = graph.edit_node(edit)?;
            Ok(format!(
                "Edited node: {} ({}) in {file_path}",
                edit.id,
                cell.label().unwrap_or_default()
            ))
        })?;

        DiagramStore::save(&graph, file_path)?;
        Ok(report.into_output())
    }

    /// Connects pairs of cells. Linking a pair again replaces the edge.
    pub fn link_nodes(
        &self,
        file_path: &str,
        edges: &[NewEdge],
    ) -> Result<ToolOutput, DrawkitError> {
        require("file_path", file_path)?;
        for edge in edges {
            require("from", &edge.from)?;
            require("to", &edge.to)?;
        }

        let mut graph = DiagramStore::load(file_path)?;
        let report = self.run_batch(edges, |edge| edge.from.as_str(), |edge| {
            let id = graph.link_nodes(edge)?;
            let title = edge
                .label
                .as_deref()
                .filter(|label| !label.is_empty())
                .map(|label| format!(" ({label})"))
                .unwrap_or_default();
            Ok(format!(
                "Linked nodes: {} -> {} with id [{id}]{title} in {file_path}",
                edge.from, edge.to
            ))
        })?;

        DiagramStore::save(&graph, file_path)?;
        Ok(report.into_output())
    }

    /// Removes cells by id. Unknown ids are ignored.
    pub fn remove_nodes<S: AsRef<str>>(
        &self,
        file_path: &str,
        ids: &[S],
    ) -> Result<ToolOutput, DrawkitError> {
        require("file_path", file_path)?;
        for id in ids {
            require("ids", id.as_ref())?;
        }

        let mut graph = DiagramStore::load(file_path)?;
        let removed = graph.remove_nodes(ids, self.removal);
        debug!(requested = ids.len(), removed = removed.len(); "Removed cells");

        DiagramStore::save(&graph, file_path)?;
        let names: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        Ok(ToolOutput::new(format!(
            "Removed nodes: {} from {file_path}",
            names.join(", ")
        )))
    }

    /// Returns the diagram model as XML text.
    pub fn get_diagram_info(&self, file_path: &str) -> Result<ToolOutput, DrawkitError> {
        require("file_path", file_path)?;

        let graph = DiagramStore::load(file_path)?;
        let xml = to_xml(&graph)?;
        Ok(ToolOutput::new(format!("Graph xml representation: \n{xml}")))
    }

    /// Counts vertices and edges; an unreadable file counts as empty.
    pub fn diagram_stats(&self, file_path: &str) -> DiagramStats {
        DiagramStore::stats(file_path)
    }

    /// Lays out the root level of a stored diagram.
    pub fn apply_layout(
        &mut self,
        file_path: &str,
        request: &LayoutRequest,
    ) -> Result<ToolOutput, DrawkitError> {
        require("file_path", file_path)?;
        let plan = self.dispatcher.plan(request)?;

        let mut graph = DiagramStore::load(file_path)?;
        let moved = self.dispatcher.apply_plan(&mut graph, plan)?;

        DiagramStore::save(&graph, file_path)?;
        Ok(ToolOutput::new(format!(
            "Applied {} layout to {moved} nodes in {file_path}",
            plan.algorithm()
        )))
    }

    /// Applies `apply` to every item according to the batch mode.
    ///
    /// In [`BatchMode::AllOrNothing`] the first error is returned; the caller
    /// then drops the graph without saving. In [`BatchMode::BestEffort`]
    /// failing items are logged and reported as skipped.
    fn run_batch<T>(
        &self,
        items: &[T],
        name: impl Fn(&T) -> &str,
        mut apply: impl FnMut(&T) -> Result<String, DrawkitError>,
    ) -> Result<BatchReport, DrawkitError> {
        let mut report = BatchReport::default();
        for item in items {
            match apply(item) {
                Ok(line) => report.applied.push(line),
                Err(err) if self.batch == BatchMode::BestEffort => {
                    warn!(item = name(item), err:% = err; "Skipping failed item");
                    report.skipped.push(format!("Skipped {}: {err}", name(item)));
                }
                Err(err) => return Err(err),
            }
        }
        info!(
            applied = report.applied.len(),
            skipped = report.skipped.len();
            "Batch finished"
        );
        Ok(report)
    }
}

/// Rejects an empty required field.
fn require(field: &str, value: &str) -> Result<(), DrawkitError> {
    if value.trim().is_empty() {
        return Err(DrawkitError::missing_field(field));
    }
    Ok(())
}
