//! Parser for the Steiner tree instance format of the PACE 2018 challenge.
//!
//! ```text
//! SECTION Graph
//! Nodes 3
//! Edges 2
//! E 1 2 1
//! E 2 3 2
//! END
//!
//! SECTION Terminals
//! Terminals 2
//! T 1
//! T 3
//! END
//!
//! EOF
//! ```
//!
//! The file format counts nodes from 1, the parsed graph from 0. Node payloads are the
//! numbers used in the file.

use crate::graph::{NodeIndex, Weight, WeightedGraph};
use itertools::Itertools;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{message} (line {line})")]
pub struct ParseError {
    line: usize,
    message: String,
}

impl ParseError {
    pub fn new(line: usize, message: String) -> Self {
        ParseError { line, message }
    }

    /// 1-based line number.
    pub fn line(&self) -> usize {
        self.line
    }
}

pub type ParseResult<T> = Result<T, ParseError>;

/// A host graph together with the terminals that have to be connected.
#[derive(Clone, Debug, PartialEq)]
pub struct Instance {
    pub graph: WeightedGraph<usize>,
    pub terminals: Vec<NodeIndex>,
}

impl FromStr for Instance {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_instance(s)
    }
}

/// Non-empty lines, split into whitespace separated tokens, with their 1-based line number.
struct Lines<'a> {
    inner: Box<dyn Iterator<Item = (usize, Vec<&'a str>)> + 'a>,
    last_line: usize,
}

impl<'a> Lines<'a> {
    fn new(text: &'a str) -> Self {
        let inner = text
            .lines()
            .enumerate()
            .map(|(number, line)| (number + 1, line.split_ascii_whitespace().collect_vec()))
            .filter(|(_, tokens)| !tokens.is_empty());
        Self {
            inner: Box::new(inner),
            last_line: 0,
        }
    }

    /// Next line, error at the end of the input.
    fn next_line(&mut self) -> ParseResult<(usize, Vec<&'a str>)> {
        match self.inner.next() {
            Some((number, tokens)) => {
                self.last_line = number;
                Ok((number, tokens))
            }
            None => Err(ParseError::new(
                self.last_line + 1,
                "unexpected end of input".into(),
            )),
        }
    }

    /// Next line, which has to be `keyword value`.
    fn key_value<T: FromStr>(&mut self, keyword: &str) -> ParseResult<T>
    where
        T::Err: std::fmt::Display,
    {
        let (line, tokens) = self.next_line()?;
        match tokens.as_slice() {
            [key, value] if *key == keyword => parse_number(line, value),
            _ => Err(unexpected(line, &tokens, &format!("{} <number>", keyword))),
        }
    }

    /// Next line, which has to be `END`.
    fn end(&mut self) -> ParseResult<()> {
        let (line, tokens) = self.next_line()?;
        match tokens.as_slice() {
            ["END"] => Ok(()),
            _ => Err(unexpected(line, &tokens, "END")),
        }
    }
}

fn unexpected(line: usize, tokens: &[&str], expected: &str) -> ParseError {
    ParseError::new(
        line,
        format!("expected '{}' but got '{}'", expected, tokens.join(" ")),
    )
}

fn parse_number<T: FromStr>(line: usize, token: &str) -> ParseResult<T>
where
    T::Err: std::fmt::Display,
{
    token
        .parse()
        .map_err(|err| ParseError::new(line, format!("could not parse '{}': {}", token, err)))
}

/// Parse a node number between `1` and `num_nodes` into a 0-based index.
fn parse_node(line: usize, token: &str, num_nodes: usize) -> ParseResult<NodeIndex> {
    let number: usize = parse_number(line, token)?;
    if number == 0 || number > num_nodes {
        return Err(ParseError::new(
            line,
            format!("node {} is not between 1 and {}", number, num_nodes),
        ));
    }
    Ok(number - 1)
}

fn parse_graph_section(lines: &mut Lines) -> ParseResult<WeightedGraph<usize>> {
    let num_nodes: usize = lines.key_value("Nodes")?;
    let num_edges: usize = lines.key_value("Edges")?;
    let mut graph = WeightedGraph::new(false);
    for number in 1..=num_nodes {
        graph.add_node(number);
    }
    for _ in 0..num_edges {
        let (line, tokens) = lines.next_line()?;
        match tokens.as_slice() {
            ["E", from, to, weight] => {
                let from = parse_node(line, from, num_nodes)?;
                let to = parse_node(line, to, num_nodes)?;
                let weight: Weight = parse_number(line, weight)?;
                if weight < 0.0 {
                    return Err(ParseError::new(line, "negative edge weight".into()));
                }
                graph.add_edge(from, to, weight);
            }
            _ => return Err(unexpected(line, &tokens, "E <from> <to> <weight>")),
        }
    }
    lines.end()?;
    Ok(graph)
}

fn parse_terminal_section(lines: &mut Lines, num_nodes: usize) -> ParseResult<Vec<NodeIndex>> {
    let num_terminals: usize = lines.key_value("Terminals")?;
    let mut terminals = vec![];
    for _ in 0..num_terminals {
        let (line, tokens) = lines.next_line()?;
        match tokens.as_slice() {
            ["T", terminal] => {
                let terminal = parse_node(line, terminal, num_nodes)?;
                if !terminals.contains(&terminal) {
                    terminals.push(terminal);
                }
            }
            _ => return Err(unexpected(line, &tokens, "T <node>")),
        }
    }
    lines.end()?;
    Ok(terminals)
}

/// Skip everything up to and including the next `END`.
fn skip_section(lines: &mut Lines) -> ParseResult<()> {
    loop {
        let (_, tokens) = lines.next_line()?;
        if tokens.as_slice() == ["END"] {
            return Ok(());
        }
    }
}

/// Parse a whole instance. Sections other than `Graph` and `Terminals` (comments, coordinates)
/// and the optional `33D32945 STP File` header line are skipped.
pub fn parse_instance(text: &str) -> ParseResult<Instance> {
    let mut lines = Lines::new(text);
    let mut graph = None;
    let mut terminals = None;
    loop {
        let (line, tokens) = lines.next_line()?;
        match tokens.as_slice() {
            ["EOF"] => break,
            ["SECTION", "Graph"] => graph = Some(parse_graph_section(&mut lines)?),
            ["SECTION", "Terminals"] => {
                let num_nodes = graph
                    .as_ref()
                    .map(WeightedGraph::node_count)
                    .ok_or_else(|| {
                        ParseError::new(line, "terminals given before the graph".into())
                    })?;
                terminals = Some(parse_terminal_section(&mut lines, num_nodes)?);
            }
            ["SECTION", _] => skip_section(&mut lines)?,
            [header, ..] if header.starts_with("33D32945") => {}
            _ => return Err(unexpected(line, &tokens, "SECTION or EOF")),
        }
    }
    let last_line = lines.last_line;
    match (graph, terminals) {
        (Some(graph), Some(terminals)) => Ok(Instance { graph, terminals }),
        (None, _) => Err(ParseError::new(last_line, "missing Graph section".into())),
        (_, None) => Err(ParseError::new(last_line, "missing Terminals section".into())),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::util::TestResult;

    /// ```text
    ///     1
    /// 0 ----- 1
    ///  \     /
    /// 3 \   / 2
    ///    \ /
    ///     2
    /// ```
    /// Terminals: `0, 2`
    pub(crate) fn small_test_graph() -> ParseResult<Instance> {
        "SECTION Graph\n\
        Nodes 3\n\
        Edges 3\n\
        E 1 2 1\n\
        E 2 3 2\n\
        E 3 1 3\n\
        END\n\
        \n\
        SECTION Terminals\n\
        Terminals 2\n\
        T 1\n\
        T 3\n\
        END\n\
        \n\
        EOF\n"
            .parse::<Instance>()
    }

    /// From [Wikipedia][wiki].
    ///
    /// [wiki]:
    /// https://de.wikipedia.org/wiki/Steinerbaumproblem#/media/Datei:Steinerbaum_Beispiel_Graph.svg
    pub(crate) fn steiner_example_wiki() -> ParseResult<Instance> {
        "SECTION Graph\n\
        Nodes 12\n\
        Edges 15\n\
        E 1 2 15\n\
        E 2 3 30\n\
        E 3 4 50\n\
        E 4 7 30\n\
        E 1 5 25\n\
        E 2 9 50\n\
        E 2 6 45\n\
        E 3 6 40\n\
        E 6 8 60\n\
        E 7 8 20\n\
        E 5 9 30\n\
        E 9 11 15\n\
        E 8 10 50\n\
        E 11 10 40\n\
        E 12 11 10\n\
        END\n\
        \n\
        SECTION Terminals\n\
        Terminals 5\n\
        T 1\n\
        T 9\n\
        T 12\n\
        T 7\n\
        T 8\n\
        END\n\
        \n\
        EOF\n"
            .parse::<Instance>()
    }

    #[test]
    fn test_parse_small_graph() -> TestResult {
        let instance = small_test_graph()?;
        assert_eq!(instance.terminals, vec![0, 2]);
        assert_eq!(instance.graph.node_count(), 3);
        assert_eq!(instance.graph.node(0), Some(&1));
        let edges = instance
            .graph
            .edges()
            .map(|(_, edge)| (edge.i1, edge.i2, edge.weight))
            .collect::<Vec<_>>();
        assert_eq!(edges, vec![(0, 1, 1.0), (1, 2, 2.0), (2, 0, 3.0)]);
        Ok(())
    }

    #[test]
    fn test_parse_wiki() -> TestResult {
        let instance = steiner_example_wiki()?;
        assert_eq!(instance.graph.live_edge_count(), 15);
        assert_eq!(instance.terminals, vec![0, 8, 11, 6, 7]);
        assert_eq!(instance.graph.weight(10, 11), Some(10.0));
        Ok(())
    }

    #[test]
    fn test_header_and_extra_sections() -> TestResult {
        let instance: Instance = "33D32945 STP File, STP Format Version 1.0\n\
            SECTION Comment\n\
            Name \"test\"\n\
            END\n\
            SECTION Graph\n\
            Nodes 2\n\
            Edges 2\n\
            E 1 2 4\n\
            E 2 1 7\n\
            END\n\
            SECTION Terminals\n\
            Terminals 2\n\
            T 2\n\
            T 2\n\
            END\n\
            EOF\n"
            .parse()?;
        // duplicate edge and terminal are coalesced
        assert_eq!(instance.graph.live_edge_count(), 1);
        assert_eq!(instance.graph.weight(1, 0), Some(4.0));
        assert_eq!(instance.terminals, vec![1]);
        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        let err = "SECTION Graph\nNodes 2\nEdges 1\nE 1 3 1\nEND\n"
            .parse::<Instance>()
            .unwrap_err();
        assert_eq!(err.line(), 4);

        let err = "SECTION Graph\nNodes 2\nEdges 2\nE 1 2 1\nEND\n"
            .parse::<Instance>()
            .unwrap_err();
        assert_eq!(err.line(), 5);

        let err = "SECTION Graph\nNodes x\n".parse::<Instance>().unwrap_err();
        assert_eq!(err.line(), 2);

        let err = "SECTION Terminals\nTerminals 0\nEND\nEOF\n"
            .parse::<Instance>()
            .unwrap_err();
        assert_eq!(err.line(), 1);

        let err = "SECTION Graph\nNodes 1\nEdges 0\nEND\nEOF\n"
            .parse::<Instance>()
            .unwrap_err();
        assert_eq!(err.to_string(), "missing Terminals section (line 5)");

        assert!("SECTION Graph\nNodes 1\n".parse::<Instance>().is_err());
    }
}
