//! Structural scanner for Swift type declarations.
//!
//! Works on the token stream from [`super::lexer`]. Delimiters are matched
//! once up front, after which any bracketed region can be skipped in O(1).
//! Only three things are recognized: type declarations at file scope,
//! type declarations nested in member blocks, and the boundaries of the
//! items inside a member block. Function bodies and initializer
//! expressions are never looked into.

use super::lexer::{tokenize, Token, TokenKind};
use super::StructureParser;
use crate::error::ParseError;
use crate::models::declaration::{
    BoundaryKind, ContainerId, Declaration, MemberKind, SyntaxTree, TypeContainer,
};

const TYPE_KEYWORDS: &[&str] = &["struct", "enum", "actor", "protocol", "class", "extension"];

/// Keywords that begin a declaration inside a member block. `class` is
/// handled separately because it doubles as a modifier.
const DECL_KEYWORDS: &[&str] = &[
    "var",
    "let",
    "func",
    "init",
    "deinit",
    "subscript",
    "typealias",
    "associatedtype",
    "struct",
    "enum",
    "actor",
    "protocol",
    "extension",
    "case",
    "import",
    "operator",
    "precedencegroup",
    "macro",
];

const MODIFIERS: &[&str] = &[
    "public",
    "private",
    "fileprivate",
    "internal",
    "open",
    "package",
    "static",
    "class",
    "final",
    "override",
    "mutating",
    "nonmutating",
    "lazy",
    "weak",
    "unowned",
    "required",
    "convenience",
    "dynamic",
    "optional",
    "indirect",
    "nonisolated",
    "prefix",
    "postfix",
    "infix",
    "consuming",
    "borrowing",
    "distributed",
];

const ACCESS_MODIFIERS: &[&str] = &["open", "public", "package", "internal", "fileprivate", "private"];

/// Attributes that only steer the compiler; they do not make a member
/// "annotated" for rule matching.
const COMPILER_HINTS: &[&str] = &[
    "available",
    "discardableResult",
    "inlinable",
    "usableFromInline",
    "inline",
    "warn_unqualified_access",
];

/// Token-level structural parser for Swift sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct SwiftParser;

impl StructureParser for SwiftParser {
    fn parse(&self, text: &str) -> Result<SyntaxTree, ParseError> {
        Scanner::new(text)?.run()
    }
}

/// One item of a member block before it is classified.
struct RawItem {
    first: usize,
    /// Last token index, including a skipped bracket's closer.
    last: usize,
    /// Depth-0 token indices in order.
    tokens: Vec<usize>,
    keyword: Option<usize>,
    /// Seen its keyword, or is a directive; a line-initial introducer now
    /// starts a new item.
    complete: bool,
    /// `#if ... #endif` region.
    region: bool,
}

impl RawItem {
    fn starting_at(k: usize, directive: bool) -> Self {
        Self {
            first: k,
            last: k,
            tokens: Vec::new(),
            keyword: None,
            complete: directive,
            region: false,
        }
    }
}

struct Scanner<'a> {
    src: &'a str,
    toks: Vec<Token>,
    /// For each opening delimiter, the index of its closer.
    matching: Vec<Option<usize>>,
    tree: SyntaxTree,
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str) -> Result<Self, ParseError> {
        let toks = tokenize(src)?;
        let matching = match_delimiters(&toks)?;
        Ok(Self {
            src,
            toks,
            matching,
            tree: SyntaxTree::default(),
        })
    }

    fn run(mut self) -> Result<SyntaxTree, ParseError> {
        let mut i = 0;
        while i < self.toks.len() {
            if self.is_type_keyword(i, true) {
                let (id, close) = self.parse_container(i, self.toks.len(), None)?;
                self.tree.roots.push(id);
                i = close + 1;
            } else {
                i = self.skip(i);
            }
        }
        Ok(self.tree)
    }

    fn text(&self, i: usize) -> &'a str {
        self.toks[i].text(self.src)
    }

    fn word(&self, i: usize) -> Option<&'a str> {
        self.toks
            .get(i)
            .filter(|t| t.kind == TokenKind::Word)
            .map(|t| t.text(self.src))
    }

    /// Index of the next depth-0 token after `i`.
    fn skip(&self, i: usize) -> usize {
        self.matching[i].unwrap_or(i) + 1
    }

    fn after_dot(&self, i: usize) -> bool {
        i > 0 && self.toks[i - 1].is_punct('.')
    }

    fn is_type_keyword(&self, i: usize, allow_extension: bool) -> bool {
        let Some(word) = self.word(i) else {
            return false;
        };
        if !TYPE_KEYWORDS.contains(&word) || (word == "extension" && !allow_extension) {
            return false;
        }
        if self.after_dot(i) || (i > 0 && self.word(i - 1) == Some("import")) {
            return false;
        }
        // `class func`, `class var`, `protocol P: class` are not type declarations.
        self.word(i + 1)
            .is_some_and(|next| !MODIFIERS.contains(&next) && !DECL_KEYWORDS.contains(&next))
    }

    fn is_decl_keyword(&self, i: usize) -> bool {
        match self.word(i) {
            Some("class") => self.is_type_keyword(i, false),
            Some(w) => DECL_KEYWORDS.contains(&w) && !self.after_dot(i),
            None => false,
        }
    }

    fn is_introducer(&self, i: usize) -> bool {
        let tok = &self.toks[i];
        match tok.kind {
            TokenKind::Pound => true,
            TokenKind::Punct('@') => true,
            TokenKind::Word => {
                let w = tok.text(self.src);
                MODIFIERS.contains(&w) || DECL_KEYWORDS.contains(&w)
            }
            _ => false,
        }
    }

    /// Parses the type declaration whose keyword is at `kw`, searching for
    /// its body no further than token `limit`. Returns the new container
    /// and the index of its closing brace.
    fn parse_container(
        &mut self,
        kw: usize,
        limit: usize,
        parent: Option<&str>,
    ) -> Result<(ContainerId, usize), ParseError> {
        let boundary = if self.text(kw) == "extension" {
            BoundaryKind::Supplementary
        } else {
            BoundaryKind::Primary
        };
        let name = self.type_name(kw, boundary);
        let qualified_name = match parent {
            Some(p) => format!("{p}.{name}"),
            None => name.clone(),
        };

        let open = self.find_body(kw, limit)?;
        let close = self.matching[open]
            .ok_or_else(|| ParseError::new(self.toks[open].line, "unclosed '{'"))?;

        let id = ContainerId(self.tree.containers.len());
        self.tree.containers.push(TypeContainer {
            name,
            qualified_name: qualified_name.clone(),
            line: self.toks[kw].line,
            boundary,
            body: self.toks[open].span.end..self.toks[close].span.start,
            members: Vec::new(),
            nested: Vec::new(),
        });

        let (members, nested) = self.parse_body(open, close, &qualified_name)?;
        let container = &mut self.tree.containers[id.0];
        container.members = members;
        container.nested = nested;
        Ok((id, close))
    }

    fn type_name(&self, kw: usize, boundary: BoundaryKind) -> String {
        let mut name = self.word(kw + 1).map(strip_backticks).unwrap_or_default();
        if boundary == BoundaryKind::Supplementary {
            let mut j = kw + 2;
            while self.toks.get(j).is_some_and(|t| t.is_punct('.')) {
                let Some(part) = self.word(j + 1) else { break };
                name.push('.');
                name.push_str(&strip_backticks(part));
                j += 2;
            }
        }
        name
    }

    fn find_body(&self, kw: usize, limit: usize) -> Result<usize, ParseError> {
        let mut j = kw + 1;
        while j < limit {
            let tok = &self.toks[j];
            if tok.is_punct('{') {
                return Ok(j);
            }
            if matches!(tok.kind, TokenKind::Punct('}' | ')' | ']')) {
                break;
            }
            j = self.skip(j);
        }
        Err(ParseError::new(
            self.toks[kw].line,
            format!("expected '{{' after {} declaration", self.text(kw)),
        ))
    }

    fn parse_body(
        &mut self,
        open: usize,
        close: usize,
        qualified_name: &str,
    ) -> Result<(Vec<Declaration>, Vec<ContainerId>), ParseError> {
        let items = self.split_items(open, close)?;
        let mut members = Vec::new();
        let mut nested = Vec::new();
        let mut prev_end = self.extend_trailing(self.toks[open].span.end);

        for item in items {
            let last_end = self.toks[item.last].span.end;
            let slice = self.toks[item.first].span.start..self.extend_trailing(last_end);
            let leading_trivia = prev_end..slice.start;
            prev_end = slice.end;

            if item.region {
                continue;
            }
            let Some(kw) = item.keyword else { continue };
            let is_static = item
                .tokens
                .iter()
                .take_while(|&&t| t != kw)
                .any(|&t| matches!(self.word(t), Some("static" | "class")));
            let Some(kind) = member_kind(self.text(kw), is_static) else {
                continue;
            };

            let nested_id = if kind == MemberKind::Subtype {
                let (id, _) = self.parse_container(kw, item.last + 1, Some(qualified_name))?;
                nested.push(id);
                Some(id)
            } else {
                None
            };

            let semicolon = item.last > item.first && self.toks[item.last].is_punct(';');
            let code = if semicolon {
                let before = &self.src[slice.start..self.toks[item.last].span.start];
                slice.start..slice.start + before.trim_end().len()
            } else {
                slice.start..last_end
            };
            let terminator = semicolon.then(|| code.end..last_end);
            let line_comment = self.src[last_end..slice.end].trim_start().starts_with("//");

            let original_index = members.len();
            members.push(Declaration {
                kind,
                visibility: self.visibility(&item.tokens, kw),
                annotated: self.annotated(&item.tokens, kw),
                name: self.member_name(kw),
                line: self.toks[item.first].line,
                ends_line: self.ends_line(slice.end),
                slice,
                code,
                terminator,
                leading_trivia,
                line_comment,
                original_index,
                nested: nested_id,
            });
        }
        Ok((members, nested))
    }

    fn split_items(&self, open: usize, close: usize) -> Result<Vec<RawItem>, ParseError> {
        let mut items = Vec::new();
        let mut cur: Option<RawItem> = None;
        let mut k = open + 1;
        while k < close {
            let tok = &self.toks[k];
            if tok.kind == TokenKind::Pound && tok.text(self.src) == "#if" {
                items.extend(cur.take());
                let endif = self.find_endif(k, close)?;
                let mut region = RawItem::starting_at(k, true);
                region.last = endif;
                region.region = true;
                items.push(region);
                k = endif + 1;
                continue;
            }

            let split = cur
                .as_ref()
                .is_some_and(|item| item.complete && tok.line_start && self.is_introducer(k));
            if split {
                items.extend(cur.take());
            }
            let item =
                cur.get_or_insert_with(|| RawItem::starting_at(k, tok.kind == TokenKind::Pound));
            item.tokens.push(k);
            if item.keyword.is_none() && self.is_decl_keyword(k) {
                item.keyword = Some(k);
                item.complete = true;
            }
            item.last = self.matching[k].unwrap_or(k);
            k = item.last + 1;
            if tok.is_punct(';') {
                items.extend(cur.take());
            }
        }
        items.extend(cur);
        Ok(items)
    }

    fn find_endif(&self, start: usize, close: usize) -> Result<usize, ParseError> {
        let mut depth = 0usize;
        let mut j = start;
        while j < close {
            if self.toks[j].kind == TokenKind::Pound {
                match self.text(j) {
                    "#if" => depth += 1,
                    "#endif" => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(j);
                        }
                    }
                    _ => {}
                }
            }
            j = self.skip(j);
        }
        Err(ParseError::new(self.toks[start].line, "'#if' without matching '#endif'"))
    }

    /// First access modifier that is not setter-only (`private(set)`).
    fn visibility(&self, tokens: &[usize], kw: usize) -> Option<String> {
        tokens.iter().take_while(|&&t| t != kw).find_map(|&t| {
            let w = self.word(t)?;
            let setter_only = self.toks.get(t + 1).is_some_and(|n| n.is_punct('('));
            (ACCESS_MODIFIERS.contains(&w) && !setter_only).then(|| w.to_string())
        })
    }

    fn annotated(&self, tokens: &[usize], kw: usize) -> bool {
        tokens
            .iter()
            .take_while(|&&t| t != kw)
            .filter(|&&t| self.toks[t].is_punct('@'))
            .filter_map(|&t| self.word(t + 1))
            .any(|attr| !COMPILER_HINTS.contains(&attr))
    }

    fn member_name(&self, kw: usize) -> String {
        match self.text(kw) {
            kw_text @ ("init" | "deinit" | "subscript") => kw_text.to_string(),
            _ => {
                if let Some(w) = self.word(kw + 1) {
                    return strip_backticks(w);
                }
                // Operator functions: `func == (lhs: ...)`.
                let mut name = String::new();
                let mut j = kw + 1;
                while let Some(t) = self.toks.get(j) {
                    match t.kind {
                        TokenKind::Punct('(' | '<' | '{') => break,
                        TokenKind::Punct(c) => name.push(c),
                        _ => break,
                    }
                    j += 1;
                }
                name
            }
        }
    }

    fn ends_line(&self, at: usize) -> bool {
        let rest = self.src[at..].trim_start_matches([' ', '\t']);
        rest.is_empty() || rest.starts_with(['\n', '\r'])
    }

    /// Extends an item end over trailing blanks and one comment that
    /// finishes on the same line.
    fn extend_trailing(&self, end: usize) -> usize {
        let bytes = self.src.as_bytes();
        let mut i = end;
        while matches!(bytes.get(i), Some(b' ' | b'\t')) {
            i += 1;
        }
        let rest = &self.src[i..];
        if rest.starts_with("//") {
            let line_end = rest.find('\n').unwrap_or(rest.len());
            i + rest[..line_end].trim_end_matches('\r').len()
        } else if rest.starts_with("/*") {
            match rest.find("*/") {
                Some(c) if !rest[..c].contains('\n') && !rest[2..c].contains("/*") => i + c + 2,
                _ => end,
            }
        } else {
            end
        }
    }
}

fn member_kind(keyword: &str, is_static: bool) -> Option<MemberKind> {
    let kind = match keyword {
        "var" | "let" if is_static => MemberKind::TypeProperty,
        "var" | "let" => MemberKind::InstanceProperty,
        "func" if is_static => MemberKind::TypeMethod,
        "func" => MemberKind::InstanceMethod,
        "init" => MemberKind::Initializer,
        "deinit" => MemberKind::Deinitializer,
        "subscript" => MemberKind::Subscript,
        "typealias" => MemberKind::TypeAlias,
        "associatedtype" => MemberKind::AssociatedType,
        "struct" | "enum" | "actor" | "protocol" | "class" => MemberKind::Subtype,
        _ => return None,
    };
    Some(kind)
}

fn strip_backticks(word: &str) -> String {
    word.trim_matches('`').to_string()
}

fn match_delimiters(toks: &[Token]) -> Result<Vec<Option<usize>>, ParseError> {
    let mut matching = vec![None; toks.len()];
    let mut stack: Vec<(usize, char)> = Vec::new();
    for (i, tok) in toks.iter().enumerate() {
        let TokenKind::Punct(c) = tok.kind else {
            continue;
        };
        let opener = match c {
            '(' | '[' | '{' => {
                stack.push((i, c));
                continue;
            }
            ')' => '(',
            ']' => '[',
            '}' => '{',
            _ => continue,
        };
        match stack.pop() {
            Some((open, oc)) if oc == opener => matching[open] = Some(i),
            _ => return Err(ParseError::new(tok.line, format!("unbalanced '{c}'"))),
        }
    }
    if let Some(&(open, c)) = stack.last() {
        return Err(ParseError::new(toks[open].line, format!("unclosed '{c}'")));
    }
    Ok(matching)
}
