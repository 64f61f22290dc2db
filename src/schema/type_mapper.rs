//! Maps Rust types to schema type tags
//!
//! The input is the textual form of a type, either as written in source
//! (`Vec<String>`, `&str`, `Option<u32>`) or as reported by
//! [`std::any::type_name`] (`alloc::vec::Vec<alloc::string::String>`).

use crate::types::SchemaType;

/// Wrappers that are transparent to JSON and map to their last type argument
const TRANSPARENT: &[&str] = &["Option", "Box", "Rc", "Arc", "Cow", "RefCell", "Cell"];

/// Map a type to its schema tag, falling back to `string`
pub fn map_type(native_type: Option<&str>) -> SchemaType {
    native_type.and_then(recognize).unwrap_or_default()
}

/// Map the Rust type `T` to its schema tag
pub fn map_type_of<T: ?Sized>() -> SchemaType {
    map_type(Some(std::any::type_name::<T>()))
}

/// Map a type to its schema tag, or `None` if it is not a recognised primitive
pub fn recognize(native_type: &str) -> Option<SchemaType> {
    recognize_normalized(&normalize(native_type))
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '\''
}

/// Drop whitespace except a single space between two identifier tokens
fn normalize(ty: &str) -> String {
    let mut out = String::with_capacity(ty.len());
    let mut pending_space = false;
    for c in ty.chars() {
        if c.is_whitespace() {
            pending_space = true;
            continue;
        }
        if pending_space && is_ident_char(c) && out.chars().last().is_some_and(is_ident_char) {
            out.push(' ');
        }
        pending_space = false;
        out.push(c);
    }
    out
}

fn recognize_normalized(ty: &str) -> Option<SchemaType> {
    let ty = strip_reference(ty);
    if ty.is_empty() || ty == "()" {
        return None;
    }
    if ty.starts_with('[') || ty.starts_with('(') {
        return Some(SchemaType::Array);
    }

    let (path, args) = match ty.find('<') {
        Some(start) if ty.ends_with('>') => (&ty[..start], Some(&ty[start + 1..ty.len() - 1])),
        Some(_) => return None,
        None => (ty, None),
    };
    let ident = path.rsplit("::").next().unwrap_or(path);

    if TRANSPARENT.contains(&ident) {
        return args.and_then(|args| split_generic_args(args).pop()).and_then(recognize_normalized);
    }

    match ident {
        "String" | "str" | "char" => Some(SchemaType::String),
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" => Some(SchemaType::Integer),
        "f32" | "f64" => Some(SchemaType::Number),
        "bool" => Some(SchemaType::Boolean),
        "Vec" | "VecDeque" | "LinkedList" | "HashSet" | "BTreeSet" | "BinaryHeap"
        | "IndexSet" => Some(SchemaType::Array),
        "HashMap" | "BTreeMap" | "IndexMap" | "Map" => Some(SchemaType::Object),
        _ => None,
    }
}

fn strip_reference(mut ty: &str) -> &str {
    while let Some(rest) = ty.strip_prefix('&') {
        ty = rest.trim_start();
        if let Some(lifetime) = ty.strip_prefix('\'') {
            let end = lifetime.find(|c: char| !is_ident_char(c)).unwrap_or(lifetime.len());
            ty = lifetime[end..].trim_start();
        }
        if let Some(rest) = ty.strip_prefix("mut ") {
            ty = rest;
        }
    }
    ty
}

/// Split `A,B<C,D>,E` at top-level commas
fn split_generic_args(args: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (index, c) in args.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&args[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    let last = &args[start..];
    if !last.is_empty() {
        parts.push(last);
    }
    parts
}
