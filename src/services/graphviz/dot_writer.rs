use std::io::{self, Write};

use crate::models::cwl::CwlElement;
use crate::models::workflow::Workflow;

const INPUT_FILL: &str = "#94DDF4";
const OUTPUT_FILL: &str = "#94DDF4";
const SUBWORKFLOW_FILL: &str = "#F3CEA1";

/// Writes a workflow as a Graphviz DOT digraph.
pub struct DotWriter<W: Write> {
    out: W,
}

impl<W: Write> DotWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_graph(&mut self, workflow: &Workflow) -> io::Result<()> {
        writeln!(self.out, "digraph workflow {{")?;
        writeln!(
            self.out,
            "  graph [bgcolor = \"#eeeeee\" color = \"black\" fontsize = \"10\" labeljust = \"left\" clusterrank = \"local\" ranksep = \"0.22\" nodesep = \"0.05\"];"
        )?;
        writeln!(
            self.out,
            "  node [fontname = \"Helvetica\" fontsize = \"10\" fontcolor = \"black\" shape = \"record\" height = \"0\" width = \"0\" color = \"black\" fillcolor = \"lightgoldenrodyellow\" style = \"filled\"];"
        )?;
        writeln!(
            self.out,
            "  edge [fontname = \"Helvetica\" fontsize = \"8\" fontcolor = \"black\" color = \"black\" arrowsize = \"0.7\"];"
        )?;

        if !workflow.inputs.is_empty() {
            writeln!(self.out, "  subgraph cluster_inputs {{")?;
            writeln!(self.out, "    rank = \"same\";")?;
            writeln!(self.out, "    style = \"dashed\";")?;
            writeln!(self.out, "    label = \"Workflow Inputs\";")?;
            for (id, input) in &workflow.inputs {
                self.write_port(id, input, INPUT_FILL)?;
            }
            writeln!(self.out, "  }}")?;
        }

        if !workflow.outputs.is_empty() {
            writeln!(self.out, "  subgraph cluster_outputs {{")?;
            writeln!(self.out, "    rank = \"same\";")?;
            writeln!(self.out, "    style = \"dashed\";")?;
            writeln!(self.out, "    labelloc = \"b\";")?;
            writeln!(self.out, "    label = \"Workflow Outputs\";")?;
            for (id, output) in &workflow.outputs {
                self.write_port(id, output, OUTPUT_FILL)?;
            }
            writeln!(self.out, "  }}")?;
        }

        for (id, step) in &workflow.steps {
            let label = step.label.as_deref().unwrap_or(id);
            if step.is_subworkflow() {
                writeln!(
                    self.out,
                    "  \"{}\" [label = \"{}\" fillcolor = \"{}\"];",
                    escape(id),
                    escape(label),
                    SUBWORKFLOW_FILL
                )?;
            } else {
                writeln!(
                    self.out,
                    "  \"{}\" [label = \"{}\"];",
                    escape(id),
                    escape(label)
                )?;
            }
        }

        for (step_id, step) in &workflow.steps {
            for (port_id, port) in &step.inputs {
                for source in &port.source_ids {
                    self.write_edge(source_node(source), step_id, Some(port_id))?;
                }
            }
        }

        for (output_id, output) in &workflow.outputs {
            for source in &output.source_ids {
                self.write_edge(source_node(source), output_id, None)?;
            }
        }

        writeln!(self.out, "}}")?;
        self.out.flush()
    }

    fn write_port(&mut self, id: &str, port: &CwlElement, fill: &str) -> io::Result<()> {
        let label = port.label.as_deref().unwrap_or(id);
        writeln!(
            self.out,
            "    \"{}\" [fillcolor = \"{}\" label = \"{}\"];",
            escape(id),
            fill,
            escape(label)
        )
    }

    fn write_edge(&mut self, from: &str, to: &str, label: Option<&str>) -> io::Result<()> {
        match label {
            Some(label) => writeln!(
                self.out,
                "  \"{}\" -> \"{}\" [label = \"{}\"];",
                escape(from),
                escape(to),
                escape(label)
            ),
            None => writeln!(self.out, "  \"{}\" -> \"{}\";", escape(from), escape(to)),
        }
    }
}

/// Render `workflow` to an in-memory DOT string.
pub fn render(workflow: &Workflow) -> io::Result<String> {
    let mut writer = DotWriter::new(Vec::new());
    writer.write_graph(workflow)?;
    String::from_utf8(writer.into_inner()).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

// `step/port` sources come out of the step node.
fn source_node(source: &str) -> &str {
    source.split('/').next().unwrap_or(source)
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
