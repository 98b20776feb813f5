//! XML parser for toolchain descriptors.
//!
//! The vocabulary is small: a `<toolchain>` root carrying `<programs>`, and a
//! body of `<if>`/`<else>`, `<Path>`, `<Search>`, `<Add>` and `<Fallback>`
//! elements. Unknown elements are skipped so descriptors written for newer
//! versions still load; malformed structure rejects the whole file.

use roxmltree::{Document, Node};
use tracing::debug;

use crate::descriptor::node::{
    Descriptor, DescriptorNode, OptionKind, PathSegment, Platform, Predicate, ProgramKind,
    Programs, SearchMode, SearchSpec, SearchStrategy,
};
use crate::error::ParseError;

impl Descriptor {
    /// Parses a descriptor document.
    ///
    /// Parsing is all-or-nothing: the first structural error rejects the
    /// document and nothing partial is returned.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if !root.has_tag_name("toolchain") {
            return Err(ParseError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let id = root
            .attribute("id")
            .ok_or(ParseError::MissingAttribute {
                element: "toolchain",
                attribute: "id",
            })?
            .to_string();
        let name = root.attribute("name").unwrap_or(&id).to_string();

        let mut programs = Programs::default();
        let mut directives = Vec::new();
        for child in root.children().filter(|c| c.is_element()) {
            if child.has_tag_name("programs") {
                programs = parse_programs(child);
            } else {
                directives.push(child);
            }
        }

        let nodes = parse_nodes(&directives, None)?;
        Ok(Descriptor {
            id,
            name,
            programs,
            nodes,
        })
    }
}

fn parse_programs(element: Node) -> Programs {
    Programs {
        c: element.attribute("c").map(str::to_string),
        cxx: element.attribute("cxx").map(str::to_string),
        linker: element.attribute("linker").map(str::to_string),
        resource_compiler: element.attribute("resource").map(str::to_string),
    }
}

/// Parses a sibling list of directive elements.
///
/// `scope` is the enclosing `<Path>` mode, captured by `<Fallback>` nodes.
/// `<else>` must immediately follow the `<if>` it belongs to.
fn parse_nodes(
    elements: &[Node<'_, '_>],
    scope: Option<SearchMode>,
) -> Result<Vec<DescriptorNode>, ParseError> {
    let mut nodes = Vec::new();
    let mut i = 0;
    while i < elements.len() {
        let element = elements[i];
        if element.has_tag_name("else") {
            return Err(ParseError::DanglingElse);
        } else if element.has_tag_name("if") {
            let predicate = parse_predicate(element);
            let then_branch = parse_nodes(&element_children(element), scope)?;
            let mut else_branch = Vec::new();
            if let Some(next) = elements.get(i + 1) {
                if next.has_tag_name("else") {
                    else_branch = parse_nodes(&element_children(*next), scope)?;
                    i += 1;
                }
            }
            nodes.push(DescriptorNode::Conditional {
                predicate,
                then_branch,
                else_branch,
            });
        } else if element.has_tag_name("Path") {
            nodes.push(parse_path_scope(element)?);
        } else if element.has_tag_name("Search") {
            nodes.push(DescriptorNode::Search(parse_search(element)?));
        } else if element.has_tag_name("Add") {
            nodes.extend(parse_add(element)?);
        } else if element.has_tag_name("Fallback") {
            let value = element
                .attribute("path")
                .ok_or(ParseError::MissingAttribute {
                    element: "Fallback",
                    attribute: "path",
                })?
                .to_string();
            nodes.push(DescriptorNode::Fallback { mode: scope, value });
        } else {
            debug!(
                element = element.tag_name().name(),
                "ignoring unknown descriptor element"
            );
        }
        i += 1;
    }
    Ok(nodes)
}

fn element_children<'a, 'input>(node: Node<'a, 'input>) -> Vec<Node<'a, 'input>> {
    node.children().filter(|c| c.is_element()).collect()
}

fn parse_predicate(element: Node) -> Predicate {
    if let Some(platform) = element.attribute("platform") {
        match parse_platform(platform) {
            Some(p) => Predicate::Platform(p),
            None => Predicate::Unrecognized(format!("platform='{platform}'")),
        }
    } else if let Some(var) = element.attribute("envVar") {
        Predicate::EnvDefined(var.to_string())
    } else if let Some(name) = element.attribute("macro") {
        Predicate::MacroNonEmpty(name.to_string())
    } else {
        Predicate::Unrecognized("<if> without a recognized test attribute".to_string())
    }
}

fn parse_platform(value: &str) -> Option<Platform> {
    match value.to_ascii_lowercase().as_str() {
        "windows" | "win" => Some(Platform::Windows),
        "unix" | "linux" => Some(Platform::Unix),
        "macos" | "macosx" | "mac" => Some(Platform::MacOs),
        _ => None,
    }
}

fn parse_path_scope(element: Node) -> Result<DescriptorNode, ParseError> {
    let type_attr = element
        .attribute("type")
        .ok_or(ParseError::MissingAttribute {
            element: "Path",
            attribute: "type",
        })?;
    let mode = parse_search_mode(type_attr)
        .ok_or_else(|| ParseError::UnknownPathType(type_attr.to_string()))?;
    let body = parse_nodes(&element_children(element), Some(mode))?;
    Ok(DescriptorNode::PathScope { mode, body })
}

fn parse_search_mode(value: &str) -> Option<SearchMode> {
    match value.to_ascii_lowercase().as_str() {
        "master" => Some(SearchMode::Master),
        "extra" => Some(SearchMode::Extra),
        "include" => Some(SearchMode::Include),
        "resource" => Some(SearchMode::Resource),
        "lib" => Some(SearchMode::Lib),
        _ => None,
    }
}

fn parse_search(element: Node) -> Result<SearchSpec, ParseError> {
    let strategy = if let Some(var) = element.attribute("envVar") {
        SearchStrategy::EnvVar {
            var: var.to_string(),
        }
    } else if let Some(value) = element.attribute("macro") {
        SearchStrategy::Macro {
            value: value.to_string(),
        }
    } else if let Some(path) = element.attribute("path") {
        SearchStrategy::LiteralPath {
            path: path.to_string(),
        }
    } else if let Some(file) = element.attribute("file") {
        let pattern = element
            .attribute("regexp")
            .ok_or(ParseError::MissingAttribute {
                element: "Search",
                attribute: "regexp",
            })?;
        let group = parse_number(element, "Search", "index")?.unwrap_or(1);
        SearchStrategy::FileScan {
            file: file.to_string(),
            pattern: pattern.to_string(),
            group,
        }
    } else if let Some(key) = element.attribute("registry") {
        let value_name = element
            .attribute("value")
            .ok_or(ParseError::MissingAttribute {
                element: "Search",
                attribute: "value",
            })?;
        SearchStrategy::Registry {
            key: key.to_string(),
            value_name: value_name.to_string(),
        }
    } else {
        return Err(ParseError::MissingSearchStrategy);
    };

    let target = element
        .attribute("for")
        .map(parse_program_kind)
        .transpose()?;
    let strip_components = parse_number(element, "Search", "strip")?.unwrap_or(0);

    Ok(SearchSpec {
        strategy,
        target,
        strip_components,
    })
}

fn parse_program_kind(value: &str) -> Result<ProgramKind, ParseError> {
    match value {
        "c" => Ok(ProgramKind::C),
        "cxx" => Ok(ProgramKind::Cxx),
        "linker" => Ok(ProgramKind::Linker),
        "resource" => Ok(ProgramKind::ResourceCompiler),
        other => Err(ParseError::UnknownProgramKey(other.to_string())),
    }
}

fn parse_number(
    element: Node,
    element_name: &'static str,
    attribute: &'static str,
) -> Result<Option<usize>, ParseError> {
    match element.attribute(attribute) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Some)
            .map_err(|_| ParseError::InvalidNumber {
                element: element_name,
                attribute,
                value: raw.to_string(),
            }),
    }
}

/// Parses one `<Add>` element.
///
/// With option attributes it yields one `AddOption` per attribute, in the
/// order cFlag, lFlag, lib. Without any it is the path-composition form and
/// yields a single `AddPath` built from text and segment children.
fn parse_add(element: Node) -> Result<Vec<DescriptorNode>, ParseError> {
    let mut nodes = Vec::new();
    if let Some(flag) = element.attribute("cFlag") {
        nodes.push(DescriptorNode::AddOption {
            kind: OptionKind::CompilerFlag,
            value: flag.to_string(),
        });
    }
    if let Some(flag) = element.attribute("lFlag") {
        nodes.push(DescriptorNode::AddOption {
            kind: OptionKind::LinkerFlag,
            value: flag.to_string(),
        });
    }
    if let Some(lib) = element.attribute("lib") {
        nodes.push(DescriptorNode::AddOption {
            kind: OptionKind::LinkLib,
            value: lib.to_string(),
        });
    }
    if !nodes.is_empty() {
        return Ok(nodes);
    }

    let mut segments = Vec::new();
    for child in element.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    segments.push(PathSegment::Literal(trimmed.to_string()));
                }
            }
        } else if child.is_element() {
            if child.has_tag_name("master") {
                segments.push(PathSegment::Master);
            } else if child.has_tag_name("separator") {
                segments.push(PathSegment::Separator);
            } else if child.has_tag_name("envVar") {
                let name = child.attribute("value").ok_or(ParseError::MissingAttribute {
                    element: "envVar",
                    attribute: "value",
                })?;
                segments.push(PathSegment::Env(name.to_string()));
            } else {
                debug!(
                    element = child.tag_name().name(),
                    "ignoring unknown path segment element"
                );
            }
        }
    }
    if segments.is_empty() {
        return Err(ParseError::EmptyAdd);
    }
    Ok(vec![DescriptorNode::AddPath { segments }])
}
