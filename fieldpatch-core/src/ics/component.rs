use crate::change::ChangeKind;

/// A `BEGIN:<name>` ... `END:<name>` block with its properties and children,
/// both kept in source order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub name: String,
    pub properties: Vec<Property>,
    pub components: Vec<Component>,
}

/// One content line.
///
/// `value` is the raw text after the first unquoted `:`; escape sequences
/// such as `\,` or `\n` are left as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// vCard property group, e.g. `item1` in `item1.EMAIL`.
    pub group: Option<String>,
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: String,
}

/// A property parameter. A bare parameter (vCard 2.1 `TEL;HOME:`) has no values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub values: Vec<String>,
}

/// Whether `name` is a token the grammar can carry as a property, group,
/// or parameter name.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl Component {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            components: Vec::new(),
        }
    }

    /// Case-insensitive check of this component's name.
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// First property with the given name (case-insensitive, group ignored).
    pub fn find_prop(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.is(name))
    }

    pub fn find_prop_mut(&mut self, name: &str) -> Option<&mut Property> {
        self.properties.iter_mut().find(|p| p.is(name))
    }

    /// All properties with the given name, in source order.
    pub fn props<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Property> + 'a {
        self.properties.iter().filter(move |p| p.is(name))
    }

    /// First immediate child component with the given name.
    pub fn find_component(&self, name: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.is(name))
    }

    /// Set the value of the first property matching `key`, or append a new
    /// one if there is none.
    ///
    /// A bare key (`EMAIL`) matches by name whatever the group; a grouped
    /// key (`item1.EMAIL`) only matches a property in that group. A
    /// replaced property keeps its group and parameters. Further properties
    /// with the same name are left alone. Line breaks in `value` are stored
    /// as the `\n` escape.
    pub fn upsert_property(&mut self, key: &str, value: &str) -> ChangeKind {
        let (group, name) = match key.split_once('.') {
            Some((group, name)) => (Some(group), name),
            None => (None, key),
        };
        let value = escape_line_breaks(value);

        let existing = self
            .properties
            .iter_mut()
            .find(|p| p.is(name) && group.is_none_or(|g| p.in_group(g)));

        match existing {
            Some(prop) if prop.value == value => ChangeKind::Unchanged,
            Some(prop) => {
                prop.value = value;
                ChangeKind::Replace
            }
            None => {
                self.properties.push(Property {
                    group: group.map(str::to_string),
                    name: name.to_ascii_uppercase(),
                    params: Vec::new(),
                    value,
                });
                ChangeKind::Append
            }
        }
    }
}

/// A raw line break cannot live inside a content line, so CRLF, CR and LF
/// become the two-character `\n` escape.
fn escape_line_breaks(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                escaped.push_str("\\n");
            }
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl Property {
    /// A new ungrouped property without parameters. The name is stored
    /// uppercase and line breaks in the value are escaped.
    pub fn new(name: &str, value: impl AsRef<str>) -> Self {
        Self {
            group: None,
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            value: escape_line_breaks(value.as_ref()),
        }
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.group
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case(group))
    }

    /// First value of the named parameter, if present.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(|p| p.values.first())
            .map(String::as_str)
    }
}
