//! Network diagram rendering through Graphviz.
//!
//! The crate builds the complete diagram (labels, colors, critical
//! classification) and emits DOT; layout and rasterization are left to the
//! external `dot` program.

use std::fmt;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::calendar::CalendarSchedule;
use crate::config::RenderConfig;
use crate::models::Activity;
use crate::schedule::Schedule;

/// Format used when the output path has no suffix.
pub const DEFAULT_FORMAT: &str = "png";

const CRITICAL_COLOR: &str = "red";
const NORMAL_COLOR: &str = "black";

/// Errors raised while writing the diagram.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to run Graphviz program '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Graphviz exited with {status}: {stderr}")]
    Graphviz { status: String, stderr: String },
}

/// One activity box of the diagram.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagramNode {
    pub id: String,
    pub description: String,
    pub duration: f64,
    pub earliest_start: f64,
    pub earliest_finish: f64,
    pub latest_start: f64,
    pub latest_finish: f64,
    pub total_float: f64,
    pub critical: bool,
    /// Early start and finish dates, when anchored to a calendar.
    pub dates: Option<(String, String)>,
}

/// One predecessor relation of the diagram.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagramEdge {
    pub from: String,
    pub to: String,
    /// True only when both endpoints are critical.
    pub critical: bool,
}

/// Everything the renderer needs, fully computed.
#[derive(Clone, Debug)]
pub struct Diagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<DiagramEdge>,
    config: RenderConfig,
}

impl Diagram {
    /// Build the diagram of a solved schedule.
    ///
    /// Nodes follow input order; edges follow each activity's predecessor
    /// list.
    pub fn from_schedule(
        schedule: &Schedule,
        calendar: Option<&CalendarSchedule>,
        config: &RenderConfig,
    ) -> Self {
        let nodes = schedule
            .iter()
            .map(|a| DiagramNode {
                id: a.activity.id.clone(),
                description: a.activity.description.clone(),
                duration: a.activity.duration,
                earliest_start: a.timing.earliest_start,
                earliest_finish: a.timing.earliest_finish,
                latest_start: a.timing.latest_start,
                latest_finish: a.timing.latest_finish,
                total_float: a.timing.total_float,
                critical: a.critical,
                dates: calendar.and_then(|cal| cal.dates(a.id())).map(|d| {
                    (
                        d.early_start.format("%Y-%m-%d").to_string(),
                        d.early_finish.format("%Y-%m-%d").to_string(),
                    )
                }),
            })
            .collect();

        let edges = schedule
            .iter()
            .flat_map(|a| {
                let activity: &Activity = a.activity;
                activity.predecessors.iter().map(move |pred| DiagramEdge {
                    from: pred.clone(),
                    to: activity.id.clone(),
                    critical: schedule.is_critical_edge(pred, &activity.id),
                })
            })
            .collect();

        Self {
            nodes,
            edges,
            config: config.clone(),
        }
    }

    fn color(&self, critical: bool) -> &'static str {
        if self.config.highlight_critical && critical {
            CRITICAL_COLOR
        } else {
            NORMAL_COLOR
        }
    }

    /// Render as a Graphviz DOT document.
    pub fn to_dot(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Diagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "digraph CPM {{")?;
        writeln!(f, "  rankdir={};", self.config.rankdir.as_dot())?;
        writeln!(
            f,
            "  node [shape=plain, fontname=\"{}\", margin=\"{}\"];",
            escape_dot(&self.config.fontname),
            escape_dot(&self.config.node_margin)
        )?;
        writeln!(f)?;

        for node in &self.nodes {
            writeln!(
                f,
                "  \"{}\" [label={}, color={}];",
                escape_dot(&node.id),
                NodeLabel(node),
                self.color(node.critical)
            )?;
        }

        writeln!(f)?;

        for edge in &self.edges {
            writeln!(
                f,
                "  \"{}\" -> \"{}\" [color={}];",
                escape_dot(&edge.from),
                escape_dot(&edge.to),
                self.color(edge.critical)
            )?;
        }

        writeln!(f, "}}")
    }
}

/// HTML-like label: a 3x3 grid plus a total float row.
///
/// ```text
///   ES |  id + description | EF
///   LS |     Dur: d        | LF
///   ---------- TF: tf ----------
/// ```
pub fn node_label_html(node: &DiagramNode) -> String {
    NodeLabel(node).to_string()
}

struct NodeLabel<'a>(&'a DiagramNode);

impl fmt::Display for NodeLabel<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.0;
        writeln!(f, "<")?;
        writeln!(f, "<TABLE BORDER=\"1\" CELLBORDER=\"1\" CELLSPACING=\"0\">")?;
        write!(
            f,
            "  <TR>\n    <TD>{}</TD>\n    <TD><B>{}</B><BR/>{}</TD>\n    <TD>{}</TD>\n  </TR>\n",
            format_number(node.earliest_start),
            escape_html(&node.id),
            escape_html(node.description.trim()),
            format_number(node.earliest_finish)
        )?;
        write!(
            f,
            "  <TR>\n    <TD>{}</TD>\n    <TD>Dur: {}</TD>\n    <TD>{}</TD>\n  </TR>\n",
            format_number(node.latest_start),
            format_number(node.duration),
            format_number(node.latest_finish)
        )?;
        write!(
            f,
            "  <TR>\n    <TD COLSPAN=\"3\">TF: {}</TD>\n  </TR>\n",
            format_number(node.total_float)
        )?;
        if let Some((start, finish)) = &node.dates {
            write!(
                f,
                "  <TR>\n    <TD COLSPAN=\"3\">{} &rarr; {}</TD>\n  </TR>\n",
                start, finish
            )?;
        }
        write!(f, "</TABLE>>")
    }
}

/// Integral values print without decimals, others with two.
pub fn format_number(x: f64) -> String {
    let rounded = x.round();
    if (x - rounded).abs() < 1e-9 {
        // Adding zero turns -0 into 0.
        format!("{}", rounded + 0.0)
    } else {
        format!("{:.2}", x)
    }
}

/// Escape text for HTML-like labels.
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape a string for quoted DOT identifiers.
fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Where and in which format the diagram is written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub format: String,
}

impl OutputTarget {
    /// Infer the format from the file name's suffix.
    ///
    /// Without a suffix the format is [`DEFAULT_FORMAT`] and the suffix is
    /// appended to the resolved path.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if !ext.is_empty() => Self {
                path: path.to_path_buf(),
                format: ext.to_lowercase(),
            },
            _ => {
                let mut resolved = path.as_os_str().to_owned();
                resolved.push(".");
                resolved.push(DEFAULT_FORMAT);
                Self {
                    path: PathBuf::from(resolved),
                    format: DEFAULT_FORMAT.to_string(),
                }
            }
        }
    }

    /// DOT source is written directly rather than through Graphviz.
    pub fn is_dot_source(&self) -> bool {
        matches!(self.format.as_str(), "dot" | "gv")
    }
}

/// Renders a diagram to an output artifact.
pub trait Renderer {
    /// Write the artifact and return the resolved path.
    fn render(&self, diagram: &Diagram, target: &OutputTarget) -> Result<PathBuf, RenderError>;
}

/// Renderer backed by the Graphviz `dot` executable.
#[derive(Clone, Debug)]
pub struct GraphvizRenderer {
    program: String,
}

impl GraphvizRenderer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn write_source(&self, dot: &str, target: &OutputTarget) -> Result<PathBuf, RenderError> {
        std::fs::write(&target.path, dot).map_err(|source| RenderError::Write {
            path: target.path.display().to_string(),
            source,
        })?;
        Ok(target.path.clone())
    }

    fn run_graphviz(&self, dot: &str, target: &OutputTarget) -> Result<PathBuf, RenderError> {
        let spawn_error = |source: std::io::Error| RenderError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", target.format))
            .arg("-o")
            .arg(&target.path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(dot.as_bytes()).map_err(spawn_error)?;
        }

        let output = child.wait_with_output().map_err(spawn_error)?;
        if !output.status.success() {
            return Err(RenderError::Graphviz {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(target.path.clone())
    }
}

impl Default for GraphvizRenderer {
    fn default() -> Self {
        Self::new("dot")
    }
}

impl Renderer for GraphvizRenderer {
    fn render(&self, diagram: &Diagram, target: &OutputTarget) -> Result<PathBuf, RenderError> {
        let dot = diagram.to_dot();
        if target.is_dot_source() {
            self.write_source(&dot, target)
        } else {
            self.run_graphviz(&dot, target)
        }
    }
}
