//! Layout documents for generated Kotlin.
//!
//! `kotlin.rs` lowers a [`crate::FileDef`] into a [`Doc`]; [`print`] lays it
//! out. Parameter and argument lists are groups: they stay on one line when
//! they fit in `max_width` and put one entry per line otherwise.

use std::borrow::Cow;
use std::rc::Rc;

/// Page width, indentation step, and line terminator of generated files.
#[derive(Debug, Clone, Copy)]
pub struct PrintConfig {
    pub max_width: usize,
    pub indent_width: usize,
    pub newline: &'static str,
}

impl Default for PrintConfig {
    fn default() -> Self {
        Self {
            max_width: 100,
            indent_width: 4,
            newline: "\n",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Space when the group fits, newline otherwise.
    Line,
    /// Nothing when the group fits, newline otherwise.
    Soft,
    /// Newline; the enclosing group can never be flat.
    Hard,
}

#[derive(Debug)]
enum Node<'a> {
    Nil,
    Text(Cow<'a, str>),
    Concat(Vec<Doc<'a>>),
    Group(Doc<'a>),
    Indent(Doc<'a>),
    Line(LineKind),
}

/// A layout document. Clones share the tree, so lookahead is cheap.
#[derive(Clone, Debug)]
pub struct Doc<'a>(Rc<Node<'a>>);

impl<'a> Doc<'a> {
    fn new(kind: Node<'a>) -> Self {
        Self(Rc::new(kind))
    }

    fn kind(&self) -> &Node<'a> {
        self.0.as_ref()
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.kind(), Node::Nil)
    }

    pub fn nil() -> Self {
        Self::new(Node::Nil)
    }

    pub fn text<T>(text: T) -> Self
    where
        T: Into<Cow<'a, str>>,
    {
        Self::new(Node::Text(text.into()))
    }

    /// Sequence `docs`, dropping empty parts and flattening nested sequences.
    pub fn concat<I>(docs: I) -> Self
    where
        I: IntoIterator<Item = Doc<'a>>,
    {
        let mut parts = Vec::new();
        for doc in docs {
            match doc.kind() {
                Node::Nil => {}
                Node::Concat(inner) => parts.extend(inner.iter().cloned()),
                _ => parts.push(doc),
            }
        }

        match parts.len() {
            0 => Self::nil(),
            1 => parts.swap_remove(0),
            _ => Self::new(Node::Concat(parts)),
        }
    }

    pub fn group(self) -> Self {
        Self::new(Node::Group(self))
    }

    /// Line breaks inside are indented one more step.
    pub fn indent(self) -> Self {
        Self::new(Node::Indent(self))
    }

    pub fn line() -> Self {
        Self::new(Node::Line(LineKind::Line))
    }

    pub fn softline() -> Self {
        Self::new(Node::Line(LineKind::Soft))
    }

    pub fn hardline() -> Self {
        Self::new(Node::Line(LineKind::Hard))
    }

    /// `separator` between every pair of non-empty `docs`.
    pub fn join<I>(separator: Doc<'a>, docs: I) -> Self
    where
        I: IntoIterator<Item = Doc<'a>>,
    {
        let mut parts = Vec::new();
        for doc in docs.into_iter() {
            if doc.is_nil() {
                continue;
            }
            if !parts.is_empty() {
                parts.push(separator.clone());
            }
            parts.push(doc);
        }
        Self::concat(parts)
    }
}

#[derive(Clone, Debug)]
struct Frame<'a> {
    indent: usize,
    mode: Mode,
    doc: Doc<'a>,
}

/// Lay out `doc`. A group goes flat when it and the text after it, up to
/// the next line break, fit in the rest of the line.
#[must_use]
pub fn print(doc: Doc<'_>, config: PrintConfig) -> String {
    let mut out = String::new();
    let mut pos: usize = 0;

    let mut stack = vec![Frame {
        indent: 0,
        mode: Mode::Break,
        doc,
    }];

    while let Some(Frame { indent, mode, doc }) = stack.pop() {
        match doc.kind() {
            Node::Nil => {}
            Node::Text(text) => {
                out.push_str(text);
                pos = pos.saturating_add(text_width(text));
            }
            Node::Concat(parts) => {
                for part in parts.iter().rev() {
                    stack.push(Frame {
                        indent,
                        mode,
                        doc: part.clone(),
                    });
                }
            }
            Node::Group(inner) => {
                let next_mode = match mode {
                    Mode::Flat => Mode::Flat,
                    Mode::Break => {
                        let room = config.max_width as isize - pos as isize;
                        let lookahead = Frame {
                            indent,
                            mode: Mode::Flat,
                            doc: inner.clone(),
                        };
                        if fits_flat(room, &stack, lookahead, config) {
                            Mode::Flat
                        } else {
                            Mode::Break
                        }
                    }
                };
                stack.push(Frame {
                    indent,
                    mode: next_mode,
                    doc: inner.clone(),
                });
            }
            Node::Indent(inner) => stack.push(Frame {
                indent: indent.saturating_add(config.indent_width),
                mode,
                doc: inner.clone(),
            }),
            Node::Line(kind) => match (mode, kind) {
                (Mode::Flat, LineKind::Line) => {
                    out.push(' ');
                    pos = pos.saturating_add(1);
                }
                (Mode::Flat, LineKind::Soft) => {}
                (Mode::Flat, LineKind::Hard) | (Mode::Break, _) => {
                    trim_trailing_whitespace(&mut out);
                    out.push_str(config.newline);
                    push_spaces(&mut out, indent);
                    pos = indent;
                }
            },
        }
    }

    trim_trailing_whitespace(&mut out);
    out
}

fn push_spaces(out: &mut String, count: usize) {
    out.extend(std::iter::repeat_n(' ', count));
}

fn trim_trailing_whitespace(out: &mut String) {
    while matches!(out.as_bytes().last(), Some(b' ' | b'\t')) {
        out.pop();
    }
}

fn text_width(text: &str) -> usize {
    if text.is_ascii() {
        text.len()
    } else {
        text.chars().count()
    }
}

fn fits_flat<'a>(
    mut room: isize,
    rest: &[Frame<'a>],
    lookahead: Frame<'a>,
    config: PrintConfig,
) -> bool {
    // Give up and break once the lookahead gets this long.
    const LOOKAHEAD_LIMIT: usize = 32_768;
    let mut steps = 0usize;

    let mut idx = rest.len();
    let mut stack = vec![lookahead];

    while room >= 0 {
        if steps >= LOOKAHEAD_LIMIT {
            return false;
        }
        steps += 1;

        let Frame { indent, mode, doc } = if let Some(frame) = stack.pop() {
            frame
        } else if idx > 0 {
            idx -= 1;
            rest[idx].clone()
        } else {
            return true;
        };

        match doc.kind() {
            Node::Nil => {}
            Node::Text(text) => room -= text_width(text) as isize,
            Node::Concat(parts) => {
                for part in parts.iter().rev() {
                    stack.push(Frame {
                        indent,
                        mode,
                        doc: part.clone(),
                    });
                }
            }
            Node::Group(inner) => stack.push(Frame {
                indent,
                mode,
                doc: inner.clone(),
            }),
            Node::Indent(inner) => stack.push(Frame {
                indent: indent.saturating_add(config.indent_width),
                mode,
                doc: inner.clone(),
            }),
            Node::Line(kind) => match (mode, kind) {
                (Mode::Flat, LineKind::Line) => room -= 1,
                (Mode::Flat, LineKind::Soft) => {}
                (Mode::Flat, LineKind::Hard) => return false,
                (Mode::Break, _) => return true,
            },
        }
    }

    false
}
