// Positional-placeholder template rendering
//
// The grammar is the subset shared by every sink: `{}`, `{2}`, and an
// optional `:` section carrying width, `.precision`, and a one-character
// type hint (`d` decimal, `x` hex, `s` string, `f` fixed float). `{{` and
// `}}` escape literal braces. Malformed or unmatched placeholders render
// verbatim; rendering never panics and never allocates beyond the growth
// of the output buffer.

use std::fmt::{self, Write};

/// Marker appended when a template ends inside an unterminated placeholder
const BAD_FMT: &str = "<bad-fmt>";

/// Type hint parsed from a placeholder's format section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeHint {
    /// `d` - decimal integer (the integer default)
    Decimal,
    /// `x` - lower-case hexadecimal integer
    Hex,
    /// `s` - string
    Str,
    /// `f` - fixed-point float
    Float,
}

/// Parsed contents of one placeholder's `:` section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatSpec {
    /// Minimum field width, space-padded
    pub width: Option<usize>,
    /// Digits after the decimal point for floats; character cap for text
    pub precision: Option<usize>,
    /// Requested rendering, if any
    pub hint: Option<TypeHint>,
}

impl FormatSpec {
    /// The spec of a bare `{}` placeholder
    pub const DEFAULT: FormatSpec = FormatSpec {
        width: None,
        precision: None,
        hint: None,
    };
}

/// A value that can be captured in a log record and rendered later.
///
/// Implemented for the integer primitives, floats, `bool`, `char`, string
/// types, and - via [`impl_loggable_display!`](crate::impl_loggable_display) -
/// any user type with a `Display` impl.
pub trait Loggable {
    /// Appends this value to `out` as directed by `spec`
    fn render(&self, out: &mut String, spec: &FormatSpec);
}

/// Object-safe view over a captured argument tuple.
///
/// The record vtable formats through this trait so the template renderer
/// needs no knowledge of the concrete tuple type.
pub trait Arguments {
    /// Number of captured arguments
    fn count(&self) -> usize;

    /// Renders argument `index` into `out`; false when `index` is out of range
    fn render_arg(&self, index: usize, out: &mut String, spec: &FormatSpec) -> bool;
}

impl Arguments for () {
    fn count(&self) -> usize {
        0
    }

    fn render_arg(&self, _index: usize, _out: &mut String, _spec: &FormatSpec) -> bool {
        false
    }
}

macro_rules! impl_arguments_for_tuple {
    ($count:expr; $($idx:tt => $name:ident),+) => {
        impl<$($name: Loggable),+> Arguments for ($($name,)+) {
            fn count(&self) -> usize {
                $count
            }

            fn render_arg(&self, index: usize, out: &mut String, spec: &FormatSpec) -> bool {
                match index {
                    $($idx => {
                        self.$idx.render(out, spec);
                        true
                    })+
                    _ => false,
                }
            }
        }
    };
}

impl_arguments_for_tuple!(1; 0 => A0);
impl_arguments_for_tuple!(2; 0 => A0, 1 => A1);
impl_arguments_for_tuple!(3; 0 => A0, 1 => A1, 2 => A2);
impl_arguments_for_tuple!(4; 0 => A0, 1 => A1, 2 => A2, 3 => A3);
impl_arguments_for_tuple!(5; 0 => A0, 1 => A1, 2 => A2, 3 => A3, 4 => A4);
impl_arguments_for_tuple!(6; 0 => A0, 1 => A1, 2 => A2, 3 => A3, 4 => A4, 5 => A5);

/// Renders `template` into `out`, substituting placeholders from `args`.
///
/// Placeholders that fail to parse or reference a missing argument are
/// copied through verbatim, braces included.
pub fn render(out: &mut String, template: &str, args: &dyn Arguments) {
    let bytes = template.as_bytes();
    let mut pos = 0;
    let mut auto_index = 0;

    while pos < bytes.len() {
        // Copy the literal run up to the next brace in one shot
        let brace = match bytes[pos..].iter().position(|&b| b == b'{' || b == b'}') {
            Some(rel) => pos + rel,
            None => {
                out.push_str(&template[pos..]);
                return;
            }
        };
        out.push_str(&template[pos..brace]);
        pos = brace;

        if bytes[pos] == b'}' {
            // `}}` is an escaped brace; a lone `}` passes through verbatim
            out.push('}');
            pos += if bytes.get(pos + 1) == Some(&b'}') { 2 } else { 1 };
            continue;
        }

        if bytes.get(pos + 1) == Some(&b'{') {
            out.push('{');
            pos += 2;
            continue;
        }

        let close = match bytes[pos + 1..].iter().position(|&b| b == b'}') {
            Some(rel) => pos + 1 + rel,
            None => {
                out.push_str(BAD_FMT);
                return;
            }
        };
        let body = &template[pos + 1..close];
        pos = close + 1;

        match parse_placeholder(body) {
            Some((explicit, spec)) => {
                let index = explicit.unwrap_or_else(|| {
                    let next = auto_index;
                    auto_index += 1;
                    next
                });
                if !args.render_arg(index, out, &spec) {
                    push_verbatim(out, body);
                }
            }
            None => push_verbatim(out, body),
        }
    }
}

fn push_verbatim(out: &mut String, body: &str) {
    out.push('{');
    out.push_str(body);
    out.push('}');
}

/// Parses a placeholder body into an optional explicit index and its spec.
/// Returns None when the body is not part of the grammar.
fn parse_placeholder(body: &str) -> Option<(Option<usize>, FormatSpec)> {
    let (index_part, spec_part) = match body.find(':') {
        Some(colon) => (&body[..colon], Some(&body[colon + 1..])),
        None => (body, None),
    };

    let index = if index_part.is_empty() {
        None
    } else {
        Some(parse_digits(index_part)?)
    };

    let spec = match spec_part {
        Some(section) => parse_spec(section)?,
        None => FormatSpec::DEFAULT,
    };

    Some((index, spec))
}

/// Parses `[width]['.' precision][hint]`, requiring the whole section to match
fn parse_spec(section: &str) -> Option<FormatSpec> {
    let mut rest = section.as_bytes();
    let mut spec = FormatSpec::DEFAULT;

    let width_len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
    if width_len > 0 {
        spec.width = Some(parse_digits(&section[..width_len])?);
        rest = &rest[width_len..];
    }

    if rest.first() == Some(&b'.') {
        rest = &rest[1..];
        let prec_len = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        if prec_len == 0 {
            return None;
        }
        let start = section.len() - rest.len();
        spec.precision = Some(parse_digits(&section[start..start + prec_len])?);
        rest = &rest[prec_len..];
    }

    match rest {
        [] => {}
        [b'd'] => spec.hint = Some(TypeHint::Decimal),
        [b'x'] => spec.hint = Some(TypeHint::Hex),
        [b's'] => spec.hint = Some(TypeHint::Str),
        [b'f'] => spec.hint = Some(TypeHint::Float),
        _ => return None,
    }

    Some(spec)
}

fn parse_digits(digits: &str) -> Option<usize> {
    digits.parse().ok()
}

macro_rules! impl_loggable_int {
    ($($ty:ty),+ $(,)?) => {$(
        impl Loggable for $ty {
            fn render(&self, out: &mut String, spec: &FormatSpec) {
                let _ = match (spec.width, spec.hint) {
                    (None, Some(TypeHint::Hex)) => write!(out, "{:x}", self),
                    (Some(w), Some(TypeHint::Hex)) => write!(out, "{:w$x}", self, w = w),
                    (None, _) => write!(out, "{}", self),
                    (Some(w), _) => write!(out, "{:w$}", self, w = w),
                };
            }
        }
    )+};
}

impl_loggable_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

macro_rules! impl_loggable_float {
    ($($ty:ty),+ $(,)?) => {$(
        impl Loggable for $ty {
            fn render(&self, out: &mut String, spec: &FormatSpec) {
                // The `f` hint without an explicit precision means 6 digits,
                // matching fixed-point conventions
                let precision = spec.precision.or(match spec.hint {
                    Some(TypeHint::Float) => Some(6),
                    _ => None,
                });
                let _ = match (spec.width, precision) {
                    (None, None) => write!(out, "{}", self),
                    (Some(w), None) => write!(out, "{:w$}", self, w = w),
                    (None, Some(p)) => write!(out, "{:.p$}", self, p = p),
                    (Some(w), Some(p)) => write!(out, "{:w$.p$}", self, w = w, p = p),
                };
            }
        }
    )+};
}

impl_loggable_float!(f32, f64);

/// Shared text path: precision caps the character count, width pads
fn render_text(out: &mut String, spec: &FormatSpec, text: &str) {
    let capped = match spec.precision {
        Some(p) => match text.char_indices().nth(p) {
            Some((end, _)) => &text[..end],
            None => text,
        },
        None => text,
    };
    match spec.width {
        None => out.push_str(capped),
        Some(w) => {
            let _ = write!(out, "{:w$}", capped, w = w);
        }
    }
}

impl Loggable for &str {
    fn render(&self, out: &mut String, spec: &FormatSpec) {
        render_text(out, spec, self);
    }
}

impl Loggable for String {
    fn render(&self, out: &mut String, spec: &FormatSpec) {
        render_text(out, spec, self);
    }
}

impl Loggable for bool {
    fn render(&self, out: &mut String, spec: &FormatSpec) {
        render_text(out, spec, if *self { "true" } else { "false" });
    }
}

impl Loggable for char {
    fn render(&self, out: &mut String, spec: &FormatSpec) {
        let mut buf = [0u8; 4];
        render_text(out, spec, self.encode_utf8(&mut buf));
    }
}

/// Renders any `Display` value under a spec; backs [`impl_loggable_display!`]
pub fn render_display(out: &mut String, spec: &FormatSpec, value: &dyn fmt::Display) {
    let _ = match (spec.width, spec.precision) {
        (None, None) => write!(out, "{}", value),
        (Some(w), None) => write!(out, "{:w$}", value, w = w),
        (None, Some(p)) => write!(out, "{:.p$}", value, p = p),
        (Some(w), Some(p)) => write!(out, "{:w$.p$}", value, w = w, p = p),
    };
}

/// Opts a `Display` type into log capture
///
/// # Examples
/// ```ignore
/// struct Endpoint { host: &'static str, port: u16 }
///
/// impl std::fmt::Display for Endpoint { /* ... */ }
///
/// hotlog::impl_loggable_display!(Endpoint);
/// ```
#[macro_export]
macro_rules! impl_loggable_display {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::format::Loggable for $ty {
            fn render(&self, out: &mut ::std::string::String, spec: &$crate::format::FormatSpec) {
                $crate::format::render_display(out, spec, self);
            }
        }
    )+};
}
