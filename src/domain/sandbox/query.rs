use crate::domain::errors::RunError;
use crate::domain::sandbox::document::Element;

/// Characters that introduce selector features the sandbox does not implement.
const UNSUPPORTED: [char; 8] = ['>', '+', '~', '[', ']', ':', '(', ')'];

/// `tag#id.class1.class2`, every part optional. `*` or an empty tag matches any tag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl CompoundSelector {
    pub fn matches(&self, element: &Element) -> bool {
        if self.tag.as_ref().is_some_and(|tag| *tag != element.tag) {
            return false;
        }
        if self
            .id
            .as_ref()
            .is_some_and(|id| element.id.as_deref() != Some(id.as_str()))
        {
            return false;
        }
        self.classes.iter().all(|class| element.has_class(class))
    }
}

/// Comma-separated group of compound selectors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleQuery {
    pub groups: Vec<CompoundSelector>,
}

impl SimpleQuery {
    pub fn parse(expression: &str) -> Result<Self, RunError> {
        let groups = expression
            .split(',')
            .map(|part| parse_compound(expression, part.trim()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { groups })
    }

    pub fn is_group(&self) -> bool {
        self.groups.len() > 1
    }

    pub fn matches(&self, element: &Element) -> bool {
        self.groups.iter().any(|selector| selector.matches(element))
    }
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

fn parse_compound(expression: &str, part: &str) -> Result<CompoundSelector, RunError> {
    if part.is_empty() {
        return Err(RunError::invalid(expression, "empty selector"));
    }
    if let Some(c) = part
        .chars()
        .find(|c| c.is_whitespace() || UNSUPPORTED.contains(c))
    {
        return Err(RunError::unsupported(
            expression,
            format!("'{}' is not supported", c),
        ));
    }

    let mut selector = CompoundSelector::default();
    let tag_end = part.find(['#', '.']).unwrap_or(part.len());
    let tag = &part[..tag_end];
    if !tag.is_empty() && tag != "*" {
        if !is_ident(tag) {
            return Err(RunError::invalid(expression, format!("bad tag '{}'", tag)));
        }
        selector.tag = Some(tag.to_ascii_lowercase());
    }

    let mut rest = &part[tag_end..];
    while let Some(marker) = rest.chars().next() {
        let body = &rest[1..];
        let end = body.find(['#', '.']).unwrap_or(body.len());
        let name = &body[..end];
        if !is_ident(name) {
            return Err(RunError::invalid(
                expression,
                format!("bad name after '{}'", marker),
            ));
        }
        if marker == '#' {
            if selector.id.replace(name.to_string()).is_some() {
                return Err(RunError::invalid(expression, "more than one id"));
            }
        } else {
            selector.classes.push(name.to_string());
        }
        rest = &body[end..];
    }

    Ok(selector)
}
