/// Top-level cv-qualifier attached to a pointer declarator (`T *const`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Qualifier {
    Const,
    Volatile,
    Restrict,
}

impl Qualifier {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "const" => Some(Self::Const),
            "volatile" => Some(Self::Volatile),
            "restrict" | "__restrict" | "__restrict__" => Some(Self::Restrict),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Const => "const",
            Self::Volatile => "volatile",
            Self::Restrict => "__restrict",
        }
    }
}

/// One level of pointer indirection, parsed from a type string printed by
/// clang (the `qualType` of a declaration).
///
/// The pointee keeps clang's spelling. Qualifiers of the pointer itself are
/// recorded but are never reproduced by the rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerType {
    pointee: String,
    qualifiers: Vec<Qualifier>,
}

impl PointerType {
    /// Parse a printed type. Returns `None` unless the outermost type is a
    /// pointer: plain (`Foo *`), qualified (`const Foo *const`), or a pointer
    /// to a function or array (`int (*)(char)`, `int (*)[4]`).
    ///
    /// Member pointers (`int Foo::*`, `void (Foo::*)()`) are not pointers.
    pub fn parse(qual_type: &str) -> Option<Self> {
        let (core, qualifiers) = split_trailing_qualifiers(qual_type.trim());

        if let Some(pointee) = core.strip_suffix('*') {
            let pointee = pointee.trim_end();
            if pointee.is_empty() || pointee.ends_with("::") {
                return None;
            }
            return Some(Self {
                pointee: pointee.to_owned(),
                qualifiers,
            });
        }

        parse_declarator_group(core)
    }

    /// Parse the type of a declaration, looking through sugar when the
    /// written type is an alias of a pointer type.
    pub fn from_decl_type(
        qual_type: &str,
        desugared_qual_type: Option<&str>,
    ) -> Option<Self> {
        Self::parse(qual_type).or_else(|| desugared_qual_type.and_then(Self::parse))
    }

    pub fn pointee(&self) -> &str {
        &self.pointee
    }

    pub fn qualifiers(&self) -> &[Qualifier] {
        &self.qualifiers
    }

    /// Number of pointer levels left inside the pointee (`Foo **` has one).
    pub fn indirection_depth(&self) -> usize {
        let mut depth = 0;
        let mut current = Self::parse(&self.pointee);
        while let Some(inner) = current {
            depth += 1;
            current = Self::parse(&inner.pointee);
        }
        depth
    }

    /// Whether the pointee is a function type (`int (char)`).
    pub fn points_to_function(&self) -> bool {
        self.pointee.ends_with(')') && find_declarator_group(&self.pointee).is_none() && self.pointee.contains(" (")
    }
}

/// Strip `const`/`volatile`/`restrict` tokens that follow the last
/// declarator character.
fn split_trailing_qualifiers(text: &str) -> (&str, Vec<Qualifier>) {
    let mut core = text;
    let mut qualifiers = Vec::new();
    loop {
        let boundary = core
            .rfind(|c: char| c.is_whitespace() || matches!(c, '*' | '&' | ')' | '>'))
            .map(|idx| idx + 1)
            .unwrap_or(0);
        if boundary == 0 {
            break;
        }
        let Some(qualifier) = Qualifier::from_token(&core[boundary..]) else {
            break;
        };
        qualifiers.push(qualifier);
        core = core[..boundary].trim_end();
    }
    qualifiers.reverse();
    (core, qualifiers)
}

/// Handle `R (*quals)(Args)` and `T (*quals)[N]`.
fn parse_declarator_group(core: &str) -> Option<PointerType> {
    let open = find_declarator_group(core)?;
    let close = matching_paren(core, open)?;
    let tail = &core[close + 1..];
    if !(tail.starts_with('(') || tail.starts_with('[')) {
        return None;
    }

    let (group, qualifiers) = split_trailing_qualifiers(core[open + 1..close].trim());
    let inner = group.strip_prefix('*')?.trim();
    let head = core[..open].trim_end();

    let pointee = if inner.is_empty() {
        format!("{head} {tail}")
    } else {
        format!("{head} ({inner}){tail}")
    };
    Some(PointerType {
        pointee,
        qualifiers,
    })
}

/// Byte index of the first `(*` outside template argument lists.
fn find_declarator_group(text: &str) -> Option<usize> {
    let mut angle_depth = 0usize;
    for (idx, c) in text.char_indices() {
        match c {
            '<' => angle_depth += 1,
            '>' => angle_depth = angle_depth.saturating_sub(1),
            '(' if angle_depth == 0 && text[idx + 1..].starts_with('*') => return Some(idx),
            _ => {},
        }
    }
    None
}

fn matching_paren(
    text: &str,
    open: usize,
) -> Option<usize> {
    let mut depth = 0usize;
    for (idx, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + idx);
                }
            },
            _ => {},
        }
    }
    None
}

#[cfg(test)]
#[path = "../../tests/src/rewrite/pointer_type_tests.rs"]
mod tests;
