//! Candidate detection for diagram blocks.

use regex::{Regex, RegexBuilder};

use crate::config::EngineConfig;
use crate::document::NodeView;
use crate::error::ConfigError;

/// What the scanner knows about one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSnapshot<'a> {
	pub identifier: Option<&'a str>,
	pub kind_match: bool,
	pub language_match: bool,
	/// Source text trimmed of surrounding whitespace; also the fingerprint.
	pub source: &'a str,
	/// Trailing edge of the node, where its placement goes.
	pub anchor: usize,
}

impl<'a> BlockSnapshot<'a> {
	/// Returns the identifier when the block is a diagram candidate.
	pub fn candidate_id(&self) -> Option<&'a str> {
		if !self.kind_match || !self.language_match || self.source.is_empty() {
			return None;
		}
		self.identifier.filter(|id| !id.is_empty())
	}
}

/// Decides which nodes are diagram blocks.
#[derive(Debug, Clone)]
pub(crate) struct CandidateFilter {
	target_kind: String,
	languages: Regex,
}

impl CandidateFilter {
	pub(crate) fn new(config: &EngineConfig) -> Result<Self, ConfigError> {
		let pattern = std::iter::once(&config.language)
			.chain(&config.aliases)
			.map(|tag| regex::escape(tag.trim()))
			.collect::<Vec<_>>()
			.join("|");
		let languages = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
		Ok(Self {
			target_kind: config.target_kind.clone(),
			languages,
		})
	}

	/// Returns true if a `language` attribute names the diagram language.
	///
	/// Matching is by substring, so tags like `language-mermaid` qualify.
	pub(crate) fn matches_language(&self, language: Option<&str>) -> bool {
		language.is_some_and(|tag| self.languages.is_match(tag))
	}

	pub(crate) fn snapshot<'a>(&self, node: &'a NodeView<'_>) -> BlockSnapshot<'a> {
		let kind_match = node.kind == self.target_kind;
		BlockSnapshot {
			identifier: node.identifier,
			kind_match,
			language_match: self.matches_language(node.language),
			source: node.text.trim(),
			anchor: node.trailing_edge(),
		}
	}
}

#[cfg(test)]
mod tests {
	use std::borrow::Cow;

	use super::*;

	fn filter() -> CandidateFilter {
		CandidateFilter::new(&EngineConfig::new(["m"])).unwrap()
	}

	fn view<'a>(kind: &'a str, language: Option<&'a str>, identifier: Option<&'a str>, text: &'a str) -> NodeView<'a> {
		NodeView {
			kind,
			language,
			identifier,
			text: Cow::Borrowed(text),
			offset: 4,
			size: 10,
		}
	}

	#[test]
	fn mermaid_block_is_candidate() {
		let node = view("codeBlock", Some("mermaid"), Some("test-1"), "  graph TD\nA --> B\n");
		let block = filter().snapshot(&node);
		assert_eq!(block.candidate_id(), Some("test-1"));
		assert_eq!(block.source, "graph TD\nA --> B");
		assert_eq!(block.anchor, 13);
	}

	#[test]
	fn kind_and_language_are_classified_independently() {
		let filter = filter();

		let other_kind = view("paragraph", Some("mermaid"), Some("p"), "graph TD");
		let block = filter.snapshot(&other_kind);
		assert!(!block.kind_match);
		assert!(block.language_match);
		assert_eq!(block.candidate_id(), None);

		let other_language = view("codeBlock", Some("rust"), Some("c"), "fn main() {}");
		let block = filter.snapshot(&other_language);
		assert!(block.kind_match);
		assert!(!block.language_match);
		assert_eq!(block.candidate_id(), None);
	}

	#[test]
	fn aliases_match_case_insensitively() {
		let filter = filter();
		for tag in ["mermaid", "mmd", "mindmap", "Mermaid", "MMD", "language-mermaid"] {
			assert!(filter.matches_language(Some(tag)), "{tag} should match");
		}
		for tag in ["javascript", "md", "merm"] {
			assert!(!filter.matches_language(Some(tag)), "{tag} should not match");
		}
		assert!(!filter.matches_language(None));
	}

	#[test]
	fn exclusions() {
		let filter = filter();
		let cases = [
			view("paragraph", Some("mermaid"), Some("a"), "graph TD"),
			view("codeBlock", Some("javascript"), Some("a"), "console.log(1)"),
			view("codeBlock", None, Some("a"), "graph TD"),
			view("codeBlock", Some("mermaid"), None, "graph TD"),
			view("codeBlock", Some("mermaid"), Some(""), "graph TD"),
			view("codeBlock", Some("mermaid"), Some("a"), "   \n\t"),
		];
		for node in &cases {
			assert_eq!(filter.snapshot(node).candidate_id(), None, "{node:?}");
		}
	}

	#[test]
	fn custom_aliases_and_kind() {
		let mut config = EngineConfig::new(["m"]).target_kind("diagram");
		config.language = "graphviz".to_string();
		config.aliases = vec!["dot".to_string(), "c++".to_string()];
		let filter = CandidateFilter::new(&config).unwrap();

		assert!(filter.matches_language(Some("dot")));
		assert!(filter.matches_language(Some("C++")));
		assert!(!filter.matches_language(Some("mermaid")));

		let node = view("diagram", Some("graphviz"), Some("g"), "digraph {}");
		assert_eq!(filter.snapshot(&node).candidate_id(), Some("g"));
		let code = view("codeBlock", Some("graphviz"), Some("g"), "digraph {}");
		assert_eq!(filter.snapshot(&code).candidate_id(), None);
	}
}
