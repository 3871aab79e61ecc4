//! XPath subset used by rule iterators and references
//!
//! Supported: absolute and relative location paths, `//`, `.`, `..`, `*`,
//! `@name`, `@*`, `text()`, `node()`, prefixed name tests resolved through
//! the configured namespace table, and predicates built from positions,
//! path existence, `=`/`!=` against string literals, `not()`, `and`, `or`
//! and parentheses.
//!
//! Unprefixed name tests match on local name in any namespace, so rules
//! written against un-namespaced sample records keep working on
//! namespaced ones.

use std::collections::{BTreeMap, HashSet};

use super::xml::{ElementId, XmlDocument, XmlItem};
use crate::error::{RmlError, RmlResult};

/// A compiled path expression
#[derive(Debug, Clone, PartialEq)]
pub struct XPath {
    expr: String,
    path: LocationPath,
}

#[derive(Debug, Clone, PartialEq)]
struct LocationPath {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Predicate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    DescendantOrSelf,
    SelfNode,
    Parent,
    Attribute,
}

#[derive(Debug, Clone, PartialEq)]
enum NodeTest {
    Name {
        namespace: Option<String>,
        local: String,
    },
    Wildcard,
    Text,
    Node,
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Position(usize),
    Filter(Condition),
}

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Exists(LocationPath),
    Equals(LocationPath, String),
    NotEquals(LocationPath, String),
    Not(Box<Condition>),
    And(Box<Condition>, Box<Condition>),
    Or(Box<Condition>, Box<Condition>),
}

impl XPath {
    /// Compile `expr`; prefixes are looked up in `namespaces`
    pub fn compile(expr: &str, namespaces: &BTreeMap<String, String>) -> RmlResult<Self> {
        let tokens = tokenize(expr)?;
        let mut parser = Parser {
            expr,
            tokens,
            pos: 0,
            namespaces,
        };
        let path = parser.location_path()?;
        if parser.pos != parser.tokens.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(XPath {
            expr: expr.to_string(),
            path,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expr
    }

    /// Items selected from `context`, in document order of discovery
    pub fn select(&self, doc: &XmlDocument, context: XmlItem) -> Vec<XmlItem> {
        select_path(&self.path, doc, context)
    }

    /// String values of the selected items
    pub fn strings(&self, doc: &XmlDocument, context: XmlItem) -> Vec<String> {
        self.select(doc, context)
            .into_iter()
            .map(|item| doc.string_value(item))
            .collect()
    }
}

fn select_path(path: &LocationPath, doc: &XmlDocument, context: XmlItem) -> Vec<XmlItem> {
    let mut current = if path.absolute {
        vec![XmlItem::Element(XmlDocument::DOCUMENT)]
    } else {
        vec![context]
    };

    for step in &path.steps {
        let mut next = Vec::new();
        let mut seen = HashSet::new();
        for item in &current {
            let mut candidates = axis_items(doc, *item, step.axis, &step.test);
            for predicate in &step.predicates {
                candidates = match predicate {
                    Predicate::Position(n) => candidates
                        .get(n.wrapping_sub(1))
                        .copied()
                        .into_iter()
                        .collect(),
                    Predicate::Filter(cond) => candidates
                        .into_iter()
                        .filter(|c| holds(cond, doc, *c))
                        .collect(),
                };
            }
            for candidate in candidates {
                if seen.insert(candidate) {
                    next.push(candidate);
                }
            }
        }
        current = next;
        if current.is_empty() {
            break;
        }
    }
    current
}

fn axis_items(doc: &XmlDocument, item: XmlItem, axis: Axis, test: &NodeTest) -> Vec<XmlItem> {
    let element = match item {
        XmlItem::Element(id) => Some(id),
        _ => None,
    };

    match axis {
        Axis::SelfNode => match (item, test) {
            (_, NodeTest::Node) => vec![item],
            (XmlItem::Element(id), _) if element_matches(doc, id, test) => vec![item],
            _ => Vec::new(),
        },
        Axis::Parent => {
            let parent = match item {
                XmlItem::Element(id) => doc.parent(id),
                XmlItem::Attribute(id, _) | XmlItem::Text(id) => Some(id),
            };
            parent
                .filter(|p| matches!(test, NodeTest::Node) || element_matches(doc, *p, test))
                .map(XmlItem::Element)
                .into_iter()
                .collect()
        }
        Axis::Child => {
            let Some(id) = element else {
                return Vec::new();
            };
            if matches!(test, NodeTest::Text) {
                return if doc.direct_text(id).is_empty() {
                    Vec::new()
                } else {
                    vec![XmlItem::Text(id)]
                };
            }
            doc.child_elements(id)
                .filter(|c| element_matches(doc, *c, test))
                .map(XmlItem::Element)
                .collect()
        }
        Axis::DescendantOrSelf => match element {
            Some(id) => doc
                .descendants_or_self(id)
                .into_iter()
                .filter(|c| matches!(test, NodeTest::Node) || element_matches(doc, *c, test))
                .map(XmlItem::Element)
                .collect(),
            None => vec![item],
        },
        Axis::Attribute => {
            let Some(id) = element else {
                return Vec::new();
            };
            doc.element(id)
                .attributes
                .iter()
                .enumerate()
                .filter(|(_, attr)| match test {
                    NodeTest::Wildcard | NodeTest::Node => true,
                    NodeTest::Name { namespace, local } => {
                        attr.name.local == *local
                            && (namespace.is_none() || attr.name.namespace == *namespace)
                    }
                    NodeTest::Text => false,
                })
                .map(|(n, _)| XmlItem::Attribute(id, n))
                .collect()
        }
    }
}

fn element_matches(doc: &XmlDocument, id: ElementId, test: &NodeTest) -> bool {
    if id == XmlDocument::DOCUMENT {
        return false;
    }
    let name = &doc.element(id).name;
    match test {
        NodeTest::Wildcard | NodeTest::Node => true,
        NodeTest::Text => false,
        NodeTest::Name { namespace, local } => {
            name.local == *local && (namespace.is_none() || name.namespace == *namespace)
        }
    }
}

fn holds(cond: &Condition, doc: &XmlDocument, item: XmlItem) -> bool {
    match cond {
        Condition::Exists(path) => !select_path(path, doc, item).is_empty(),
        Condition::Equals(path, literal) => select_path(path, doc, item)
            .into_iter()
            .any(|found| doc.string_value(found).trim() == literal),
        Condition::NotEquals(path, literal) => select_path(path, doc, item)
            .into_iter()
            .any(|found| doc.string_value(found).trim() != literal),
        Condition::Not(inner) => !holds(inner, doc, item),
        Condition::And(a, b) => holds(a, doc, item) && holds(b, doc, item),
        Condition::Or(a, b) => holds(a, doc, item) || holds(b, doc, item),
    }
}

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Slash,
    DoubleSlash,
    Dot,
    DotDot,
    At,
    Star,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Equals,
    NotEquals,
    Literal(String),
    Number(usize),
    Name(String),
}

fn tokenize(expr: &str) -> RmlResult<Vec<Token>> {
    let invalid = |message: &str| RmlError::InvalidPath {
        expr: expr.to_string(),
        message: message.to_string(),
    };

    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' | '\r' => i += 1,
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    tokens.push(Token::DoubleSlash);
                    i += 2;
                } else {
                    tokens.push(Token::Slash);
                    i += 1;
                }
            }
            '.' => {
                if chars.get(i + 1) == Some(&'.') {
                    tokens.push(Token::DotDot);
                    i += 2;
                } else {
                    tokens.push(Token::Dot);
                    i += 1;
                }
            }
            '@' => {
                tokens.push(Token::At);
                i += 1;
            }
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBracket);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBracket);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '=' => {
                tokens.push(Token::Equals);
                i += 1;
            }
            '!' => {
                if chars.get(i + 1) != Some(&'=') {
                    return Err(invalid("expected '=' after '!'"));
                }
                tokens.push(Token::NotEquals);
                i += 2;
            }
            '\'' | '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|ch| *ch == c)
                    .ok_or_else(|| invalid("unterminated string literal"))?;
                tokens.push(Token::Literal(chars[i + 1..i + 1 + end].iter().collect()));
                i += end + 2;
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let digits: String = chars[start..i].iter().collect();
                let n = digits
                    .parse()
                    .map_err(|_| invalid("position out of range"))?;
                tokens.push(Token::Number(n));
            }
            c if is_name_start(c) => {
                let start = i;
                while i < chars.len() && is_name_char(chars[i]) {
                    i += 1;
                }
                // prefix:local or prefix:*
                if chars.get(i) == Some(&':') {
                    match chars.get(i + 1) {
                        Some('*') => i += 2,
                        Some(next) if is_name_start(*next) => {
                            i += 1;
                            while i < chars.len() && is_name_char(chars[i]) {
                                i += 1;
                            }
                        }
                        _ => return Err(invalid("dangling ':' in name")),
                    }
                }
                tokens.push(Token::Name(chars[start..i].iter().collect()));
            }
            other => return Err(invalid(&format!("unexpected character '{other}'"))),
        }
    }
    Ok(tokens)
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.')
}

// ============================================================================
// Parser
// ============================================================================

struct Parser<'a> {
    expr: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    namespaces: &'a BTreeMap<String, String>,
}

impl<'a> Parser<'a> {
    fn error(&self, message: &str) -> RmlError {
        RmlError::InvalidPath {
            expr: self.expr.to_string(),
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, what: &str) -> RmlResult<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error(&format!("expected {what}")))
        }
    }

    fn starts_step(&self) -> bool {
        matches!(
            self.peek(),
            Some(Token::Dot | Token::DotDot | Token::At | Token::Star | Token::Name(_))
        )
    }

    fn location_path(&mut self) -> RmlResult<LocationPath> {
        let mut path = LocationPath {
            absolute: false,
            steps: Vec::new(),
        };

        if self.eat(&Token::Slash) {
            path.absolute = true;
            if !self.starts_step() {
                return Ok(path);
            }
        } else if self.eat(&Token::DoubleSlash) {
            path.absolute = true;
            path.steps.push(descendant_step());
        }

        loop {
            path.steps.push(self.step()?);
            if self.eat(&Token::Slash) {
                continue;
            }
            if self.eat(&Token::DoubleSlash) {
                path.steps.push(descendant_step());
                continue;
            }
            break;
        }
        Ok(path)
    }

    fn step(&mut self) -> RmlResult<Step> {
        let (axis, test) = match self.peek().cloned() {
            Some(Token::Dot) => {
                self.pos += 1;
                (Axis::SelfNode, NodeTest::Node)
            }
            Some(Token::DotDot) => {
                self.pos += 1;
                (Axis::Parent, NodeTest::Node)
            }
            Some(Token::At) => {
                self.pos += 1;
                let test = match self.peek().cloned() {
                    Some(Token::Star) => {
                        self.pos += 1;
                        NodeTest::Wildcard
                    }
                    Some(Token::Name(name)) => {
                        self.pos += 1;
                        self.name_test(&name)?
                    }
                    _ => return Err(self.error("expected attribute name after '@'")),
                };
                (Axis::Attribute, test)
            }
            Some(Token::Star) => {
                self.pos += 1;
                (Axis::Child, NodeTest::Wildcard)
            }
            Some(Token::Name(name)) => {
                self.pos += 1;
                if self.peek() == Some(&Token::LParen) {
                    self.pos += 1;
                    self.expect(&Token::RParen, "')'")?;
                    match name.as_str() {
                        "text" => (Axis::Child, NodeTest::Text),
                        "node" => (Axis::Child, NodeTest::Node),
                        other => {
                            return Err(self.error(&format!("unsupported node test {other}()")))
                        }
                    }
                } else {
                    (Axis::Child, self.name_test(&name)?)
                }
            }
            _ => return Err(self.error("expected a location step")),
        };

        let mut predicates = Vec::new();
        while self.eat(&Token::LBracket) {
            let predicate = match (self.peek().cloned(), self.peek_at(1)) {
                (Some(Token::Number(n)), Some(Token::RBracket)) => {
                    self.pos += 1;
                    if n == 0 {
                        return Err(self.error("positions start at 1"));
                    }
                    Predicate::Position(n)
                }
                _ => Predicate::Filter(self.or_expr()?),
            };
            self.expect(&Token::RBracket, "']'")?;
            predicates.push(predicate);
        }

        Ok(Step {
            axis,
            test,
            predicates,
        })
    }

    fn name_test(&self, name: &str) -> RmlResult<NodeTest> {
        match name.split_once(':') {
            Some((prefix, local)) => {
                let namespace = self
                    .namespaces
                    .get(prefix)
                    .ok_or_else(|| self.error(&format!("unknown namespace prefix '{prefix}'")))?;
                if local == "*" {
                    // prefix:* is a namespace wildcard; approximate with any local name
                    return Ok(NodeTest::Wildcard);
                }
                Ok(NodeTest::Name {
                    namespace: Some(namespace.clone()),
                    local: local.to_string(),
                })
            }
            None => Ok(NodeTest::Name {
                namespace: None,
                local: name.to_string(),
            }),
        }
    }

    fn or_expr(&mut self) -> RmlResult<Condition> {
        let mut left = self.and_expr()?;
        while self.peek() == Some(&Token::Name("or".to_string())) {
            self.pos += 1;
            let right = self.and_expr()?;
            left = Condition::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> RmlResult<Condition> {
        let mut left = self.unary()?;
        while self.peek() == Some(&Token::Name("and".to_string())) {
            self.pos += 1;
            let right = self.unary()?;
            left = Condition::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> RmlResult<Condition> {
        if self.peek() == Some(&Token::Name("not".to_string()))
            && self.peek_at(1) == Some(&Token::LParen)
        {
            self.pos += 2;
            let inner = self.or_expr()?;
            self.expect(&Token::RParen, "')' after not(")?;
            return Ok(Condition::Not(Box::new(inner)));
        }
        if self.eat(&Token::LParen) {
            let inner = self.or_expr()?;
            self.expect(&Token::RParen, "')'")?;
            return Ok(inner);
        }

        let path = self.location_path()?;
        if self.eat(&Token::Equals) {
            return Ok(Condition::Equals(path, self.literal()?));
        }
        if self.eat(&Token::NotEquals) {
            return Ok(Condition::NotEquals(path, self.literal()?));
        }
        Ok(Condition::Exists(path))
    }

    fn literal(&mut self) -> RmlResult<String> {
        match self.peek().cloned() {
            Some(Token::Literal(s)) => {
                self.pos += 1;
                Ok(s)
            }
            Some(Token::Number(n)) => {
                self.pos += 1;
                Ok(n.to_string())
            }
            _ => Err(self.error("expected a string literal")),
        }
    }
}

fn descendant_step() -> Step {
    Step {
        axis: Axis::DescendantOrSelf,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }
}
