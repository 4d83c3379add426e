//! Depth-first query expansion

use std::borrow::Cow;

use tracing::{debug, trace, warn};

use crate::grammar::{find_similar, Element, ElementId, ElementKind, Grammar};
use crate::overrides::{Overrides, UnresolvedPolicy};

use super::error::GenerateError;
use super::path::AncestorPath;
use super::template::{Advance, Cell, Nesting, Template};

/// Generates queries from a grammar under a fixed override configuration
///
/// # Example
///
/// ```rust
/// use querygen::{Generator, Grammar, Overrides};
///
/// let grammar = Grammar::parse("START = choice('a', 'b', 'c');").unwrap();
/// let overrides = Overrides::default();
/// let generator = Generator::new(&grammar, &overrides);
///
/// let queries = generator.generate_all("START").unwrap();
/// assert_eq!(queries, vec!["a", "b", "c"]);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Generator<'g> {
    grammar: &'g Grammar,
    overrides: &'g Overrides,
}

impl<'g> Generator<'g> {
    pub fn new(grammar: &'g Grammar, overrides: &'g Overrides) -> Self {
        Self { grammar, overrides }
    }

    /// Start a fresh traversal from the named element
    pub fn generate(&self, start: &str) -> Result<Queries<'g>, GenerateError> {
        let Some(id) = self.grammar.lookup(start) else {
            return Err(GenerateError::UnknownStart {
                name: start.to_string(),
                suggestions: find_similar(self.grammar.names().map(|(name, _)| name), start, 2),
            });
        };
        debug!(start = %start, "generating queries");

        Ok(Queries {
            grammar: self.grammar,
            overrides: self.overrides,
            stack: vec![Branch {
                template: Template::start(id),
                path: AncestorPath::new(),
            }],
        })
    }

    /// Collect every query reachable from the named element
    pub fn generate_all(&self, start: &str) -> Result<Vec<String>, GenerateError> {
        self.generate(start)?.collect()
    }
}

/// One partially expanded query and the names expanded to reach it
#[derive(Debug, Clone)]
struct Branch<'g> {
    template: Template<'g>,
    path: AncestorPath<'g>,
}

/// Lazy sequence of generated queries
///
/// Branches wait on an explicit stack; the top is always the leftmost
/// unexplored candidate, which keeps the output in depth-first order. After
/// an `Err` the sequence is exhausted.
pub struct Queries<'g> {
    grammar: &'g Grammar,
    overrides: &'g Overrides,
    stack: Vec<Branch<'g>>,
}

impl<'g> Iterator for Queries<'g> {
    type Item = Result<String, GenerateError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(branch) = self.stack.pop() {
            match self.step(branch) {
                Ok(Some(query)) => {
                    trace!(%query, "generated");
                    return Some(Ok(query));
                }
                Ok(None) => {}
                Err(err) => {
                    self.stack.clear();
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

impl<'g> Queries<'g> {
    /// Expand the first pending cell of `branch`, or finish it
    fn step(&mut self, branch: Branch<'g>) -> Result<Option<String>, GenerateError> {
        let (id, nesting, template) = match branch.template.advance() {
            Advance::Complete(query) => return Ok(Some(query)),
            Advance::Pending {
                id,
                nesting,
                template,
            } => (id, nesting, template),
        };
        let element = self.grammar.get(id);

        // Replaced elements are neither expanded nor recorded on the path
        if let Some(value) = element.name().and_then(|name| self.overrides.replacement(name)) {
            let value = value.to_string();
            let cells = if value.is_empty() {
                Vec::new()
            } else {
                vec![Cell::Fragment(Cow::Owned(value))]
            };
            self.stack.push(Branch {
                template: template.substitute(cells),
                path: branch.path,
            });
            return Ok(None);
        }

        let nesting = nesting.enter(id);
        if nesting.recursion() > self.overrides.max_depth {
            debug!(
                element = element.name().unwrap_or("<anonymous>"),
                recursion = nesting.recursion(),
                path = %branch.path,
                "recursion limit reached, pruning branch"
            );
            return Ok(None);
        }

        let path = match element.name() {
            Some(name) => branch.path.push(name),
            None => branch.path,
        };
        let candidates = self.candidates(id, element, &nesting, &path)?;

        for cells in candidates.into_iter().rev() {
            self.stack.push(Branch {
                template: template.substitute(cells),
                path: path.clone(),
            });
        }
        Ok(None)
    }

    /// Replacement cells for `element`, one vector per alternative, in order
    fn candidates(
        &self,
        id: ElementId,
        element: &'g Element,
        nesting: &Nesting,
        path: &AncestorPath<'g>,
    ) -> Result<Vec<Vec<Cell<'g>>>, GenerateError> {
        let pending = |child: &ElementId| Cell::pending(*child, nesting.clone());

        Ok(match element.payload() {
            ElementKind::Literal(text) | ElementKind::Keyword(text) => {
                vec![vec![Cell::text(text)]]
            }
            ElementKind::TokenSet(tokens) => {
                tokens.iter().map(|token| vec![Cell::text(token)]).collect()
            }
            ElementKind::Sequence(children) => vec![children.iter().map(pending).collect()],
            ElementKind::Optional(child) => vec![vec![pending(child)], vec![Cell::text("")]],
            ElementKind::Choice(alternatives) => {
                alternatives.iter().map(|alt| vec![pending(alt)]).collect()
            }
            ElementKind::NamedRule(alternatives) => alternatives
                .iter()
                .filter(|alt| !self.recurses_into(**alt, id))
                .map(|alt| vec![pending(alt)])
                .collect(),
            ElementKind::List {
                element: item,
                delimiter,
                min,
                max,
            } => {
                // The list's own name first, then the name of its element
                let count = [element.name(), self.grammar.get(*item).name()]
                    .into_iter()
                    .flatten()
                    .find_map(|name| self.overrides.list_count.get(name))
                    .copied()
                    .unwrap_or(self.overrides.default_list_count);
                occurrences(*min, *max, count)
                    .into_iter()
                    .map(|n| {
                        let mut cells = Vec::with_capacity(n.saturating_mul(2));
                        for i in 0..n {
                            if i > 0 {
                                cells.push(pending(delimiter));
                            }
                            cells.push(pending(item));
                        }
                        cells
                    })
                    .collect()
            }
            ElementKind::Repeat {
                element: item,
                min,
                max,
            } => {
                let count = element
                    .name()
                    .and_then(|name| self.overrides.repeat_count.get(name))
                    .copied()
                    .unwrap_or(self.overrides.default_repeat_count);
                occurrences(*min, *max, count)
                    .into_iter()
                    .map(|n| vec![pending(item); n])
                    .collect()
            }
            ElementKind::Regex(pattern) => {
                let resolved = element
                    .name()
                    .and_then(|name| self.overrides.resolve_terminal(name, path.iter()));
                match resolved {
                    Some(value) => vec![vec![Cell::Fragment(Cow::Owned(value.to_string()))]],
                    None => {
                        let terminal = element.name().unwrap_or(pattern.as_str());
                        self.unresolved(terminal, path)?;
                        Vec::new()
                    }
                }
            }
        })
    }

    /// Whether `alternative` is a sequence that directly contains `rule`
    fn recurses_into(&self, alternative: ElementId, rule: ElementId) -> bool {
        matches!(
            self.grammar.get(alternative).payload(),
            ElementKind::Sequence(children) if children.contains(&rule)
        )
    }

    fn unresolved(&self, terminal: &str, path: &AncestorPath<'g>) -> Result<(), GenerateError> {
        match self.overrides.unresolved {
            UnresolvedPolicy::Skip => Ok(()),
            UnresolvedPolicy::Warn => {
                warn!(terminal = %terminal, path = %path, "no value configured for terminal, pruning branch");
                Ok(())
            }
            UnresolvedPolicy::Error => Err(GenerateError::UnresolvedTerminal {
                terminal: terminal.to_string(),
                path: path.to_vec(),
            }),
        }
    }
}

/// Occurrence counts tried for a List or Repeat, in order
///
/// Zero when the construct may be empty, one when a single occurrence is
/// allowed, then `count` raised to `min` and clamped to `max` if that is
/// more than one.
pub(crate) fn occurrences(min: usize, max: Option<usize>, count: usize) -> Vec<usize> {
    let mut counts = Vec::with_capacity(3);
    if min == 0 {
        counts.push(0);
    }
    if min <= 1 && max.map_or(true, |max| max >= 1) {
        counts.push(1);
    }
    let mut n = count.max(min).max(1);
    if let Some(max) = max {
        n = n.min(max);
    }
    if n > 1 {
        counts.push(n);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::GrammarBuilder;
    use pretty_assertions::assert_eq;

    fn generate(grammar: &Grammar, overrides: &Overrides) -> Vec<String> {
        Generator::new(grammar, overrides)
            .generate_all("START")
            .expect("Should generate")
    }

    fn generate_source(source: &str, overrides: &Overrides) -> Vec<String> {
        let grammar = Grammar::parse(source).expect("Should load");
        generate(&grammar, overrides)
    }

    #[test]
    fn test_occurrences() {
        assert_eq!(occurrences(0, Some(3), 2), vec![0, 1, 2]);
        assert_eq!(occurrences(0, None, 1), vec![0, 1]);
        assert_eq!(occurrences(1, None, 2), vec![1, 2]);
        assert_eq!(occurrences(0, Some(1), 5), vec![0, 1]);
        assert_eq!(occurrences(1, Some(1), 2), vec![1]);
        assert_eq!(occurrences(3, None, 2), vec![3]);
        assert_eq!(occurrences(0, Some(2), 5), vec![0, 1, 2]);
        assert_eq!(occurrences(0, Some(0), 2), vec![0]);
    }

    #[test]
    fn test_single_literal() {
        let mut b = GrammarBuilder::new();
        b.add_named("START", ElementKind::Literal("X".into())).unwrap();
        let grammar = b.build().unwrap();

        assert_eq!(generate(&grammar, &Overrides::default()), vec!["X"]);
    }

    #[test]
    fn test_optional_present_then_absent() {
        let mut b = GrammarBuilder::new();
        let x = b.literal("X");
        b.add_named("START", ElementKind::Optional(x)).unwrap();
        let grammar = b.build().unwrap();

        assert_eq!(generate(&grammar, &Overrides::default()), vec!["X", ""]);
    }

    #[test]
    fn test_list_empty_single_and_counted() {
        let mut b = GrammarBuilder::new();
        let a = b.literal("a");
        let comma = b.literal(",");
        b.add_named(
            "START",
            ElementKind::List {
                element: a,
                delimiter: comma,
                min: 0,
                max: Some(3),
            },
        )
        .unwrap();
        let grammar = b.build().unwrap();

        let overrides = Overrides::default().with_default_list_count(2);
        assert_eq!(generate(&grammar, &overrides), vec!["", "a", "a , a"]);
    }

    #[test]
    fn test_list_count_by_name() {
        let source = "item = 'a'; START = list(item, ',', 1);";
        let overrides = Overrides::default().with_list_count("item", 3);
        assert_eq!(generate_source(source, &overrides), vec!["a", "a , a , a"]);

        let overrides = Overrides::default().with_list_count("START", 1);
        assert_eq!(generate_source(source, &overrides), vec!["a"]);
    }

    #[test]
    fn test_list_count_clamped_to_max() {
        let source = "START = list('a', ',', 0, 2);";
        let overrides = Overrides::default().with_default_list_count(9);
        assert_eq!(generate_source(source, &overrides), vec!["", "a", "a , a"]);
    }

    #[test]
    fn test_repeat_uses_repeat_count() {
        let source = "START = repeat('x', 0);";
        assert_eq!(generate_source(source, &Overrides::default()), vec!["", "x"]);

        let overrides = Overrides::default().with_repeat_count("START", 3);
        assert_eq!(generate_source(source, &overrides), vec!["", "x", "x x x"]);
    }

    #[test]
    fn test_choice_in_declaration_order() {
        let mut b = GrammarBuilder::new();
        let alternatives = vec![b.literal("a"), b.literal("b"), b.literal("c")];
        b.add_named("START", ElementKind::Choice(alternatives)).unwrap();
        let grammar = b.build().unwrap();

        assert_eq!(generate(&grammar, &Overrides::default()), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_token_set_one_query_per_token() {
        let source = "START = seq('x', tokens('+ - *'), 'y');";
        assert_eq!(
            generate_source(source, &Overrides::default()),
            vec!["x + y", "x - y", "x * y"]
        );
    }

    #[test]
    fn test_self_recursive_rule_skipped() {
        let mut b = GrammarBuilder::new();
        let rule = b.declare("START").unwrap();
        let r = b.keyword("r");
        let recursive = b.sequence(vec![r, rule]);
        let base = b.literal("base");
        b.define(rule, ElementKind::NamedRule(vec![recursive, base]))
            .unwrap();
        let grammar = b.build().unwrap();

        assert_eq!(generate(&grammar, &Overrides::default()), vec!["base"]);
    }

    #[test]
    fn test_rule_unfolds_one_level_through_other_elements() {
        let source = r#"
            r_integer = regex('[0-9]+');
            START = rule(r_integer, seq('(', this, ')'), seq(this, '+', this));
        "#;
        let overrides = Overrides::default().with_terminal_value("r_integer", "START", 7);
        assert_eq!(generate_source(source, &overrides), vec!["7"]);
    }

    #[test]
    fn test_mutual_recursion_terminates() {
        let source = r#"
            START = choice(seq('a', B), 'x');
            B = choice(seq('b', START), 'y');
        "#;
        let overrides = Overrides::default().with_max_depth(5);
        let queries = generate_source(source, &overrides);

        // START, the sequence, B and its sequence re-enter once per round;
        // the sixth re-entry (the third 'a' sequence) is pruned
        assert_eq!(
            queries,
            vec!["a b a b x", "a b a y", "a b x", "a y", "x"]
        );
    }

    #[test]
    fn test_deep_grammar_without_recursion() {
        let mut source = String::from("e0 = 'leaf';\n");
        for level in 1..=40 {
            source.push_str(&format!("e{} = seq(e{});\n", level, level - 1));
        }
        source.push_str("START = seq('select', e40);");

        let overrides = Overrides::default().with_unresolved(UnresolvedPolicy::Error);
        assert!(overrides.max_depth < 40);
        assert_eq!(generate_source(&source, &overrides), vec!["select leaf"]);
    }

    #[test]
    fn test_repeated_sibling_is_not_recursion() {
        let source = "item = 'a'; START = list(item, ',', 1);";
        let overrides = Overrides::default()
            .with_max_depth(0)
            .with_list_count("item", 4);
        assert_eq!(
            generate_source(source, &overrides),
            vec!["a", "a , a , a , a"]
        );
    }

    #[test]
    fn test_deterministic() {
        let source = r#"
            k_limit = keyword('limit');
            r_integer = regex('[0-9]+');
            START = seq(optional(seq(k_limit, r_integer)), list(tokens('a b'), ',', 0, 2));
        "#;
        let overrides = Overrides::default().with_terminal_value("r_integer", "k_limit", 10);
        let first = generate_source(source, &overrides);
        let second = generate_source(source, &overrides);
        assert_eq!(first, second);
        assert_eq!(first[0], "limit 10");
    }

    #[test]
    fn test_regex_value_from_preceding_keyword() {
        let source = r#"
            k_limit = keyword('limit');
            k_offset = keyword('offset');
            r_integer = regex('[0-9]+');
            limit = seq(k_limit, r_integer);
            offset = seq(k_offset, r_integer);
            START = seq(limit, offset);
        "#;
        let overrides = Overrides::default()
            .with_terminal_value("r_integer", "k_limit", 10)
            .with_terminal_value("r_integer", "k_offset", 5);
        assert_eq!(generate_source(source, &overrides), vec!["limit 10 offset 5"]);
    }

    #[test]
    fn test_replace_substitutes_and_omits() {
        let source = r#"
            r_comment = regex('#.*');
            k_now = keyword('now');
            START = seq('select', k_now, r_comment);
        "#;
        let overrides = Overrides::default()
            .with_replacement("k_now", 1234)
            .with_replacement("r_comment", "");
        assert_eq!(generate_source(source, &overrides), vec!["select 1234"]);
    }

    #[test]
    fn test_replaced_name_not_on_path() {
        let source = r#"
            k_limit = keyword('limit');
            r_integer = regex('[0-9]+');
            START = seq(k_limit, r_integer);
        "#;
        let overrides = Overrides::default()
            .with_replacement("k_limit", "LIMIT")
            .with_terminal_value("r_integer", "k_limit", 10)
            .with_terminal_value("r_integer", "START", 1);
        assert_eq!(generate_source(source, &overrides), vec!["LIMIT 1"]);
    }

    #[test]
    fn test_unresolved_skip_prunes_branch() {
        let source = r#"
            r_integer = regex('[0-9]+');
            START = choice(seq('limit', r_integer), 'all');
        "#;
        assert_eq!(generate_source(source, &Overrides::default()), vec!["all"]);

        let overrides = Overrides::default().with_unresolved(UnresolvedPolicy::Warn);
        assert_eq!(generate_source(source, &overrides), vec!["all"]);
    }

    #[test]
    fn test_unresolved_error_ends_sequence() {
        let grammar = Grammar::parse(
            r#"
            r_integer = regex('[0-9]+');
            START = choice('first', seq('limit', r_integer), 'last');
        "#,
        )
        .unwrap();
        let overrides = Overrides::default().with_unresolved(UnresolvedPolicy::Error);
        let results: Vec<_> = Generator::new(&grammar, &overrides)
            .generate("START")
            .unwrap()
            .collect();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], Ok("first".to_string()));
        assert_eq!(
            results[1],
            Err(GenerateError::UnresolvedTerminal {
                terminal: "r_integer".to_string(),
                path: vec!["START".to_string(), "r_integer".to_string()],
            })
        );
    }

    #[test]
    fn test_unknown_start() {
        let grammar = Grammar::parse("select_stmt = 'select';").unwrap();
        let overrides = Overrides::default();
        let err = Generator::new(&grammar, &overrides)
            .generate("select_stm")
            .err()
            .expect("Should fail");
        assert_eq!(
            err.to_string(),
            "unknown start symbol 'select_stm' (did you mean 'select_stmt'?)"
        );
    }

    #[test]
    fn test_early_drop_and_restart() {
        let grammar = Grammar::parse("START = choice('a', 'b', 'c');").unwrap();
        let overrides = Overrides::default();
        let generator = Generator::new(&grammar, &overrides);

        let first: Vec<_> = generator.generate("START").unwrap().take(1).collect();
        assert_eq!(first, vec![Ok("a".to_string())]);
        assert_eq!(generator.generate_all("START").unwrap(), vec!["a", "b", "c"]);
    }
}
