//! Line lexer for Wavefront OBJ text
//!
//! [`lex_line`] turns one line into one [`ObjLine`] record without any shared
//! state. [`ObjLexer`] applies it lazily over a whole file, one record per
//! input line, and can be cloned to restart from the same position.

use std::str::Lines;

/// One face corner as written in the file: `v`, `v/vt`, `v//vn` or `v/vt/vn`.
///
/// Indices are 1-based, negative values count back from the end of the
/// corresponding pool. An absent component is `None`. A position index that
/// is missing or not an integer is carried as `0`, which never resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceVertex {
    pub position: i64,
    pub texcoord: Option<i64>,
    pub normal: Option<i64>,
}

/// One lexed OBJ line
#[derive(Debug, Clone, PartialEq)]
pub enum ObjLine {
    Empty,
    Comment(String),
    Object(String),
    Groups(Vec<String>),
    Vertex([f32; 3]),
    Normal([f32; 3]),
    TexCoord([f32; 2]),
    Face(Vec<FaceVertex>),
    UseMaterial(String),
    MaterialLibrary(String),
}

/// Lexes a single line. Unrecognised lines (blank lines included) are [`ObjLine::Empty`].
pub fn lex_line(line: &str) -> ObjLine {
    let line = line.strip_suffix('\r').unwrap_or(line);

    let mut chars = line.chars();
    let Some(first) = chars.next() else {
        return ObjLine::Empty;
    };
    let rest = chars.as_str();

    match first {
        '#' => ObjLine::Comment(strip_one_space(rest).to_string()),
        'o' => ObjLine::Object(strip_one_space(rest).to_string()),
        'g' => ObjLine::Groups(rest.split_whitespace().map(str::to_string).collect()),
        'v' => match rest.chars().next() {
            Some('n') => ObjLine::Normal(parse_floats(&rest[1..])),
            Some('t') => ObjLine::TexCoord(parse_floats(&rest[1..])),
            _ => ObjLine::Vertex(parse_floats(rest)),
        },
        'f' => ObjLine::Face(rest.split_whitespace().map(parse_face_vertex).collect()),
        'u' => match line.strip_prefix("usemtl") {
            Some(name) => ObjLine::UseMaterial(name.trim().to_string()),
            None => ObjLine::Empty,
        },
        'm' => match line.strip_prefix("mtllib") {
            Some(file) => ObjLine::MaterialLibrary(file.trim().to_string()),
            None => ObjLine::Empty,
        },
        _ => ObjLine::Empty,
    }
}

fn strip_one_space(text: &str) -> &str {
    text.strip_prefix(' ').unwrap_or(text)
}

/// Parses up to `N` whitespace-separated floats.
///
/// Junk tokens become NaN, missing components are `0.0` and extra ones are ignored.
fn parse_floats<const N: usize>(text: &str) -> [f32; N] {
    let mut values = [0.0; N];
    for (slot, token) in values.iter_mut().zip(text.split_whitespace()) {
        *slot = token.parse().unwrap_or(f32::NAN);
    }
    values
}

fn parse_face_vertex(group: &str) -> FaceVertex {
    let mut parts = group.split('/');
    let index = |part: Option<&str>| -> Option<i64> {
        part.filter(|p| !p.is_empty())
            .map(|p| p.parse().unwrap_or(0))
    };

    FaceVertex {
        position: index(parts.next()).unwrap_or(0),
        texcoord: index(parts.next()),
        normal: index(parts.next()),
    }
}

/// Lazy, order-preserving record stream over the lines of an OBJ file.
///
/// Yields `(line_number, record)` pairs with 1-based line numbers.
#[derive(Debug, Clone)]
pub struct ObjLexer<'a> {
    lines: Lines<'a>,
    line_number: usize,
}

impl<'a> ObjLexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
            line_number: 0,
        }
    }
}

impl Iterator for ObjLexer<'_> {
    type Item = (usize, ObjLine);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        self.line_number += 1;
        Some((self.line_number, lex_line(line)))
    }
}
