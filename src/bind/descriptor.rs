/// Which source chain a field is resolved against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceClass {
    Plain,
    Secret,
}

impl std::fmt::Display for SourceClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceClass::Plain => write!(f, "plain"),
            SourceClass::Secret => write!(f, "secret"),
        }
    }
}

/// Binding metadata of one field, parsed from its annotation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldDescriptor {
    /// Key segment appended to the parent key path.
    pub key: String,
    pub required: bool,
    pub secret: bool,
    /// Set for `-` or an empty key; the field is left untouched.
    pub skip: bool,
}

impl FieldDescriptor {
    /// Parses `<key>[,required][,secret]`. Unknown flags are ignored.
    pub fn parse(tag: &str) -> Self {
        let mut tokens = tag.split(',');
        let key = tokens.next().unwrap_or_default();

        let mut descriptor = FieldDescriptor {
            key: key.to_string(),
            skip: key.is_empty() || key == "-",
            ..Default::default()
        };

        for token in tokens {
            match token {
                "required" => descriptor.required = true,
                "secret" => descriptor.secret = true,
                _ => {}
            }
        }

        descriptor
    }

    pub fn class(&self) -> SourceClass {
        if self.secret {
            SourceClass::Secret
        } else {
            SourceClass::Plain
        }
    }
}
