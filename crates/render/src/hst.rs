//! HTML syntax tree (HST).

/// Insertion-ordered attribute map.
///
/// Documents carry only a handful of attributes per element, so a vector
/// keeps serialization order stable without hashing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Empty attribute map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(key, _)| key == name)
    }

    /// Sets `name`, replacing an existing value in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Removes `name` and returns its value.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.0.iter().position(|(key, _)| key == name)?;
        Some(self.0.remove(index).1)
    }

    /// Iterates attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-case tag name.
    pub tag: String,
    /// Attributes in serialization order.
    pub attributes: Attributes,
    /// Child nodes.
    pub children: Vec<HstNode>,
}

impl Element {
    /// Element without attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Builder: adds an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.set(name, value);
        self
    }

    /// Builder: replaces the children.
    pub fn with_children(mut self, children: Vec<HstNode>) -> Self {
        self.children = children;
        self
    }

    /// Builder: appends one child.
    pub fn child(mut self, child: HstNode) -> Self {
        self.children.push(child);
        self
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attributes
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class))
    }

    /// Appends `class` to the class list unless already present.
    pub fn add_class(&mut self, class: &str) {
        if self.has_class(class) {
            return;
        }
        let classes = match self.attributes.get("class") {
            Some(existing) if !existing.is_empty() => format!("{existing} {class}"),
            _ => class.to_string(),
        };
        self.attributes.set("class", classes);
    }

    /// Concatenated text of descendant `Text` leaves.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }
}

/// A node of the HTML syntax tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HstNode {
    /// Fragment root.
    Root(Vec<HstNode>),
    /// Element.
    Element(Element),
    /// Text, escaped on output.
    Text(String),
    /// Markup emitted verbatim.
    Raw(String),
}

impl HstNode {
    /// Shorthand for a text leaf.
    pub fn text(value: impl Into<String>) -> Self {
        HstNode::Text(value.into())
    }

    /// Child nodes of roots and elements.
    pub fn children(&self) -> Option<&[HstNode]> {
        match self {
            HstNode::Root(children) => Some(children),
            HstNode::Element(element) => Some(&element.children),
            HstNode::Text(_) | HstNode::Raw(_) => None,
        }
    }

    /// Mutable child nodes of roots and elements.
    pub fn children_mut(&mut self) -> Option<&mut Vec<HstNode>> {
        match self {
            HstNode::Root(children) => Some(children),
            HstNode::Element(element) => Some(&mut element.children),
            HstNode::Text(_) | HstNode::Raw(_) => None,
        }
    }

    /// The element, if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HstNode::Element(element) => Some(element),
            _ => None,
        }
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            HstNode::Text(text) => out.push_str(text),
            HstNode::Raw(_) => {}
            HstNode::Root(children) => children.iter().for_each(|c| c.collect_text(out)),
            HstNode::Element(element) => element.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Visits every element depth-first, parents before children.
    pub fn visit_elements_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        if let HstNode::Element(element) = self {
            f(element);
        }
        if let Some(children) = self.children_mut() {
            for child in children {
                child.visit_elements_mut(f);
            }
        }
    }

    /// Finds the first element matching `pred`, depth-first.
    pub fn find_element(&self, pred: &impl Fn(&Element) -> bool) -> Option<&Element> {
        if let HstNode::Element(element) = self
            && pred(element)
        {
            return Some(element);
        }
        self.children()?
            .iter()
            .find_map(|child| child.find_element(pred))
    }
}

impl From<Element> for HstNode {
    fn from(element: Element) -> Self {
        HstNode::Element(element)
    }
}
