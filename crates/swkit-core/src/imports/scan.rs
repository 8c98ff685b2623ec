//! Static import specifier scanner.
//!
//! Finds the string spans of top-level, statically analyzable module
//! specifiers without a full parse:
//!
//! - `import x from '...'`, `import { a, b as c } from '...'`, `import * as ns from '...'`
//! - side-effect imports: `import '...'`
//! - re-exports: `export * from '...'`, `export { a } from '...'`
//!
//! Dynamic `import()` calls and `import.meta` are skipped. Comments, string
//! literals, template literals and (heuristically) regular expression
//! literals are stepped over so their contents never produce matches.

/// Kind of statement a specifier was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportKind {
    /// `import ... from '...'` or `import '...'`.
    Import,
    /// `export ... from '...'`.
    ReExport,
}

/// A static specifier and its location in the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticImport {
    /// Specifier text exactly as written between the quotes.
    pub specifier: String,
    /// Byte offset of the first character inside the quotes.
    pub start: usize,
    /// Byte offset of the closing quote.
    pub end: usize,
    pub kind: ImportKind,
    /// Line number (1-indexed).
    pub line: u32,
}

/// Scan source code for static import/export specifiers, in source order.
#[must_use]
pub fn scan_static_imports(source: &str) -> Vec<StaticImport> {
    Scanner::new(source).run()
}

/// Keywords after which a `/` starts a regular expression, not a division.
const REGEX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

/// Punctuation after which a `/` starts a regular expression.
const REGEX_PRECEDERS: &[u8] = b"(,=:[!&|?{};+-*%<>~^";

/// Last significant token class, for the regex heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Punct(u8),
    /// Identifier, literal or closing token: `/` divides.
    Operand,
    /// Keyword that may be followed by an expression.
    ExprKeyword,
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    prev: Prev,
    results: Vec<StaticImport>,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            prev: Prev::Start,
            results: Vec::new(),
        }
    }

    fn run(mut self) -> Vec<StaticImport> {
        let len = self.bytes.len();
        let mut i = 0;

        while i < len {
            let b = self.bytes[i];
            match b {
                b'/' if self.peek(i + 1) == Some(b'/') => i = self.skip_line_comment(i),
                b'/' if self.peek(i + 1) == Some(b'*') => i = self.skip_block_comment(i),
                b'/' if self.regex_allowed() => {
                    i = self.skip_regex(i);
                    self.prev = Prev::Operand;
                }
                b'\'' | b'"' => {
                    i = self.read_string(i).map_or(i + 1, |(_, _, end)| end);
                    self.prev = Prev::Operand;
                }
                b'`' => {
                    i = self.skip_template(i);
                    self.prev = Prev::Operand;
                }
                _ if is_ident_start(b) => {
                    let end = self.ident_end(i);
                    let word = &self.src[i..end];
                    let after_dot = self.prev == Prev::Punct(b'.');

                    let found = match word {
                        "import" if !after_dot => self.scan_import(end),
                        "export" if !after_dot => self.scan_export(end),
                        _ => None,
                    };

                    if let Some((import, next)) = found {
                        self.results.push(import);
                        self.prev = Prev::Operand;
                        i = next;
                    } else {
                        self.prev = if REGEX_KEYWORDS.contains(&word) {
                            Prev::ExprKeyword
                        } else {
                            Prev::Operand
                        };
                        i = end;
                    }
                }
                _ if b.is_ascii_whitespace() => i += 1,
                b')' | b']' | b'}' => {
                    self.prev = Prev::Operand;
                    i += 1;
                }
                _ => {
                    self.prev = Prev::Punct(b);
                    i += 1;
                }
            }
        }

        self.results
    }

    /// After the `import` keyword.
    fn scan_import(&self, start: usize) -> Option<(StaticImport, usize)> {
        let i = self.skip_trivia(start);
        match self.peek(i)? {
            // import(...) / import.meta
            b'(' | b'.' => None,
            b'\'' | b'"' => self.specifier_at(i, ImportKind::Import),
            _ => {
                let quote = self.scan_clause(i)?;
                self.specifier_at(quote, ImportKind::Import)
            }
        }
    }

    /// After the `export` keyword. Only `export ... from` carries a specifier.
    fn scan_export(&self, start: usize) -> Option<(StaticImport, usize)> {
        let i = self.skip_trivia(start);
        let opens_clause = match self.peek(i)? {
            b'{' | b'*' => true,
            b if is_ident_start(b) => &self.src[i..self.ident_end(i)] == "type",
            _ => false,
        };
        if !opens_clause {
            return None;
        }
        let quote = self.scan_clause(i)?;
        self.specifier_at(quote, ImportKind::ReExport)
    }

    /// Walk an import/export clause up to `from`, returning the offset of the
    /// opening quote of the specifier.
    ///
    /// Accepts identifiers, `*`, `,` and `{ ... }` groups; anything else
    /// means this is not a static import with a specifier.
    fn scan_clause(&self, start: usize) -> Option<usize> {
        let mut i = start;
        let mut after_brace = false;

        loop {
            i = self.skip_trivia(i);
            let b = self.peek(i)?;

            if is_ident_start(b) {
                let end = self.ident_end(i);
                if &self.src[i..end] == "from" {
                    let next = self.skip_trivia(end);
                    if matches!(self.peek(next), Some(b'\'' | b'"')) {
                        return Some(next);
                    }
                }
                // Only `from` may follow a `{ ... }` group
                if after_brace {
                    return None;
                }
                i = end;
                continue;
            }

            if after_brace {
                return None;
            }
            match b {
                b'{' => {
                    i = self.skip_braces(i)?;
                    after_brace = true;
                }
                b'*' | b',' => i += 1,
                _ => return None,
            }
        }
    }

    fn specifier_at(&self, quote: usize, kind: ImportKind) -> Option<(StaticImport, usize)> {
        let (start, end, next) = self.read_string(quote)?;
        let line = 1 + self.bytes[..start].iter().filter(|&&b| b == b'\n').count();
        Some((
            StaticImport {
                specifier: self.src[start..end].to_string(),
                start,
                end,
                kind,
                line: u32::try_from(line).unwrap_or(u32::MAX),
            },
            next,
        ))
    }

    fn regex_allowed(&self) -> bool {
        match self.prev {
            Prev::Start | Prev::ExprKeyword => true,
            Prev::Punct(p) => REGEX_PRECEDERS.contains(&p),
            Prev::Operand => false,
        }
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    fn ident_end(&self, start: usize) -> usize {
        let mut i = start;
        while i < self.bytes.len() && is_ident_continue(self.bytes[i]) {
            i += 1;
        }
        i
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&self, start: usize) -> usize {
        let mut i = start;
        loop {
            match self.peek(i) {
                Some(b) if b.is_ascii_whitespace() => i += 1,
                Some(b'/') if self.peek(i + 1) == Some(b'/') => i = self.skip_line_comment(i),
                Some(b'/') if self.peek(i + 1) == Some(b'*') => i = self.skip_block_comment(i),
                _ => return i,
            }
        }
    }

    fn skip_line_comment(&self, start: usize) -> usize {
        self.bytes[start..]
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.bytes.len(), |p| start + p)
    }

    fn skip_block_comment(&self, start: usize) -> usize {
        self.src[start + 2..]
            .find("*/")
            .map_or(self.bytes.len(), |p| start + 2 + p + 2)
    }

    /// Read a quoted string at `start`.
    ///
    /// Returns (content start, content end, offset after the closing quote),
    /// or `None` if the literal is unterminated on its line.
    fn read_string(&self, start: usize) -> Option<(usize, usize, usize)> {
        let quote = self.bytes[start];
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => return None,
                b if b == quote => return Some((start + 1, i, i + 1)),
                _ => i += 1,
            }
        }
        None
    }

    /// Skip a template literal starting at the opening backtick.
    fn skip_template(&self, start: usize) -> usize {
        let mut i = start + 1;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'`' => return i + 1,
                b'$' if self.peek(i + 1) == Some(b'{') => {
                    i = self.skip_braces(i + 1).unwrap_or(self.bytes.len());
                }
                _ => i += 1,
            }
        }
        self.bytes.len()
    }

    /// Skip a balanced `{ ... }` group starting at the opening brace.
    fn skip_braces(&self, start: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut i = start;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'{' => {
                    depth += 1;
                    i += 1;
                }
                b'}' => {
                    depth -= 1;
                    i += 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                b'\'' | b'"' => i = self.read_string(i).map_or(i + 1, |(_, _, end)| end),
                b'`' => i = self.skip_template(i),
                b'/' if self.peek(i + 1) == Some(b'/') => i = self.skip_line_comment(i),
                b'/' if self.peek(i + 1) == Some(b'*') => i = self.skip_block_comment(i),
                _ => i += 1,
            }
        }
        None
    }

    /// Skip a regular expression literal starting at `/`.
    ///
    /// Falls back to consuming just the slash if the literal does not close
    /// on the same line.
    fn skip_regex(&self, start: usize) -> usize {
        let mut i = start + 1;
        let mut in_class = false;
        while i < self.bytes.len() {
            match self.bytes[i] {
                b'\\' => i += 2,
                b'\n' => return start + 1,
                b'[' => {
                    in_class = true;
                    i += 1;
                }
                b']' => {
                    in_class = false;
                    i += 1;
                }
                b'/' if !in_class => return self.ident_end(i + 1),
                _ => i += 1,
            }
        }
        start + 1
    }
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}
