//! Syntax-highlighting registration for diagram source.

/// Grammar description handed to a highlighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagramGrammar {
	pub name: &'static str,
	/// Diagram-type headers and statement keywords.
	pub keywords: &'static [&'static str],
	/// Prefix starting a line comment.
	pub line_comment: &'static str,
}

/// Grammar for Mermaid diagram source.
pub const MERMAID_GRAMMAR: DiagramGrammar = DiagramGrammar {
	name: "mermaid",
	keywords: &[
		"graph",
		"flowchart",
		"sequenceDiagram",
		"classDiagram",
		"stateDiagram",
		"stateDiagram-v2",
		"erDiagram",
		"journey",
		"gantt",
		"pie",
		"mindmap",
		"timeline",
		"gitGraph",
		"subgraph",
		"end",
		"participant",
		"actor",
		"loop",
		"alt",
		"else",
		"opt",
		"note",
		"section",
		"title",
		"class",
		"state",
		"style",
		"classDef",
		"click",
		"linkStyle",
	],
	line_comment: "%%",
};

/// Host-side syntax highlighter that can learn new languages.
pub trait HighlightRegistrar: Send + Sync {
	fn register_grammar(&self, language: &str, grammar: &DiagramGrammar);

	fn register_alias(&self, alias: &str, canonical: &str);
}

/// Registers the diagram grammar under `language` and maps every alias onto it.
pub(crate) fn register_language(registrar: &dyn HighlightRegistrar, language: &str, aliases: &[String]) {
	registrar.register_grammar(language, &MERMAID_GRAMMAR);
	for alias in aliases {
		registrar.register_alias(alias, language);
	}
	tracing::debug!(language, aliases = aliases.len(), "diagram.highlight.registered");
}
