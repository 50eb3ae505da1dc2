//! C# declaration parser.
//!
//! This module turns one source file into its using directives and type
//! declarations. Only declaration structure is parsed: namespaces, type
//! headers, attribute lists and field declarations. Method bodies,
//! properties, initializers and every other member are skipped by
//! balanced-bracket scanning.

use crate::error::ParseError;
use crate::lexer::{Lexeme, Token, tokenize};
use nodebind_core::{
    FieldDecl, Marker, Modifier, Segment, SourceUnit, TypeDeclaration, TypeKind, TypeReference,
    UnitId, UsingDirective, UsingKind,
};
use std::ops::Range;
use std::path::{Path, PathBuf};

/// Result of parsing one source file.
#[derive(Debug, Clone)]
pub struct ParsedSource {
    /// The unit with its using directives.
    pub unit: SourceUnit,
    /// Type declarations in source order, outer types before nested ones.
    pub declarations: Vec<TypeDeclaration>,
}

/// Parses a C# source file.
///
/// Returned declarations carry placeholder identities; a corpus assigns
/// the real ones when the unit is added.
///
/// # Arguments
/// * `path` - Path reported in errors and recorded on the unit
/// * `source` - File content
///
/// # Errors
/// Returns `ParseError` if a declaration header is malformed or a bracket
/// is left unclosed.
pub fn parse_source(path: impl Into<PathBuf>, source: &str) -> Result<ParsedSource, ParseError> {
    let path = path.into();
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let mut parser = Parser::new(&path, source);
    parser.parse_namespace_body(None, false)?;
    let Parser {
        usings,
        declarations,
        ..
    } = parser;

    let mut unit = SourceUnit::new(UnitId::default(), path);
    unit.usings = usings;
    Ok(ParsedSource { unit, declarations })
}

/// Something declared inside a type body or namespace.
enum Member {
    Field(FieldDecl),
    Types(Vec<TypeDeclaration>),
    Skipped,
}

/// How a namespace declaration introduces its scope.
enum NamespaceForm {
    Block,
    FileScoped(String),
}

struct Parser<'s> {
    path: &'s Path,
    source: &'s str,
    tokens: Vec<Lexeme>,
    pos: usize,
    usings: Vec<UsingDirective>,
    declarations: Vec<TypeDeclaration>,
}

impl<'s> Parser<'s> {
    fn new(path: &'s Path, source: &'s str) -> Self {
        Self {
            path,
            source,
            tokens: tokenize(source),
            pos: 0,
            usings: Vec::new(),
            declarations: Vec::new(),
        }
    }

    // ---- token access ------------------------------------------------

    fn peek(&self) -> Option<Token> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<Token> {
        self.tokens.get(self.pos + offset).map(|l| l.token)
    }

    fn text_at(&self, offset: usize) -> &'s str {
        let source: &'s str = self.source;
        self.tokens
            .get(self.pos + offset)
            .map(|l| &source[l.span.clone()])
            .unwrap_or_default()
    }

    fn is_ident(&self, offset: usize, word: &str) -> bool {
        self.peek_at(offset) == Some(Token::Ident) && self.text_at(offset) == word
    }

    fn line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |l| l.line)
    }

    fn bump(&mut self) -> Option<&Lexeme> {
        let lexeme = self.tokens.get(self.pos);
        if lexeme.is_some() {
            self.pos += 1;
        }
        lexeme
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, expected: &str) -> Result<Range<usize>, ParseError> {
        match self.tokens.get(self.pos) {
            Some(l) if l.token == token => {
                let span = l.span.clone();
                self.pos += 1;
                Ok(span)
            }
            Some(l) => Err(ParseError::unexpected(
                self.path,
                l.line,
                expected,
                &self.source[l.span.clone()],
            )),
            None => Err(ParseError::eof(self.path, expected)),
        }
    }

    fn expect_ident(&mut self, expected: &str) -> Result<&'s str, ParseError> {
        let source: &'s str = self.source;
        let span = self.expect(Token::Ident, expected)?;
        Ok(&source[span])
    }

    /// Byte offset where the current token starts.
    fn start_offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map_or(self.source.len(), |l| l.span.start)
    }

    /// Byte offset where the previous token ends.
    fn end_offset(&self) -> usize {
        self.pos
            .checked_sub(1)
            .and_then(|idx| self.tokens.get(idx))
            .map_or(0, |l| l.span.end)
    }

    fn slice(&self, range: Range<usize>) -> String {
        self.source[range].trim().to_string()
    }

    // ---- namespaces and usings ---------------------------------------

    /// Parses namespace members until end of file, or until the closing
    /// brace when `braced` is set.
    fn parse_namespace_body(
        &mut self,
        scope: Option<String>,
        braced: bool,
    ) -> Result<(), ParseError> {
        let mut scope = scope;
        loop {
            match self.peek() {
                None if braced => return Err(ParseError::eof(self.path, "'}'")),
                None => return Ok(()),
                Some(Token::RBrace) if braced => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(Token::RBrace) => {
                    return Err(ParseError::unexpected(
                        self.path,
                        self.line(),
                        "declaration",
                        "}",
                    ));
                }
                Some(Token::Semicolon) => {
                    self.pos += 1;
                }
                Some(Token::Using) => self.parse_using(scope.as_deref())?,
                Some(Token::Ident)
                    if self.text_at(0) == "global" && self.peek_at(1) == Some(Token::Using) =>
                {
                    self.parse_using(scope.as_deref())?
                }
                Some(Token::Ident) if self.text_at(0) == "extern" && self.is_ident(1, "alias") => {
                    self.skip_member()?
                }
                Some(Token::Namespace) => match self.parse_namespace(scope.as_deref())? {
                    NamespaceForm::Block => {}
                    NamespaceForm::FileScoped(name) => scope = Some(name),
                },
                _ => {
                    // Assembly and module attributes may precede a namespace.
                    let markers = self.parse_attribute_lists()?;
                    if matches!(
                        self.peek(),
                        None | Some(Token::Namespace | Token::Using | Token::RBrace)
                    ) {
                        continue;
                    }
                    if let Member::Types(types) =
                        self.parse_member(scope.as_deref(), &[], markers)?
                    {
                        self.declarations.extend(types);
                    }
                }
            }
        }
    }

    fn parse_namespace(&mut self, scope: Option<&str>) -> Result<NamespaceForm, ParseError> {
        self.expect(Token::Namespace, "'namespace'")?;
        let name = self.parse_dotted_name("namespace name")?;
        let full = match scope {
            Some(outer) => format!("{outer}.{name}"),
            None => name,
        };

        if self.eat(Token::Semicolon) {
            return Ok(NamespaceForm::FileScoped(full));
        }
        self.expect(Token::LBrace, "'{' or ';' after namespace name")?;
        self.parse_namespace_body(Some(full), true)?;
        Ok(NamespaceForm::Block)
    }

    fn parse_dotted_name(&mut self, expected: &str) -> Result<String, ParseError> {
        let mut name = self.expect_ident(expected)?.to_string();
        while self.peek() == Some(Token::Dot) && self.peek_at(1) == Some(Token::Ident) {
            self.pos += 1;
            name.push('.');
            name.push_str(self.expect_ident(expected)?);
        }
        Ok(name)
    }

    fn parse_using(&mut self, scope: Option<&str>) -> Result<(), ParseError> {
        let start = self.start_offset();
        let line = self.line();
        let global = self.is_ident(0, "global");
        if global {
            self.pos += 1;
        }
        self.expect(Token::Using, "'using'")?;

        let is_static = self.is_ident(0, "static");
        if is_static {
            self.pos += 1;
        }

        let kind = if !is_static
            && self.peek() == Some(Token::Ident)
            && self.peek_at(1) == Some(Token::Eq)
        {
            let alias = self.expect_ident("alias name")?.to_string();
            self.pos += 1;
            let target = self.parse_type_text("aliased name")?;
            UsingKind::Alias { alias, target }
        } else {
            let name = self.parse_type_text("namespace name")?;
            if is_static {
                UsingKind::Static(name)
            } else {
                UsingKind::Namespace(name)
            }
        };
        self.expect(Token::Semicolon, "';' after using directive")?;

        self.usings.push(UsingDirective {
            text: self.slice(start..self.end_offset()),
            kind,
            global,
            scope: scope.map(str::to_string),
            line,
        });
        Ok(())
    }

    // ---- members -----------------------------------------------------

    /// Parses one member after its attribute lists.
    ///
    /// `containing` is the path of enclosing types; it is empty at
    /// namespace level, where only type declarations are kept.
    fn parse_member(
        &mut self,
        scope: Option<&str>,
        containing: &[Segment],
        markers: Vec<Marker>,
    ) -> Result<Member, ParseError> {
        let line = self.line();
        let modifiers = self.parse_modifiers();

        if let Some(kind) = self.peek_type_keyword() {
            let types = self.parse_type_declaration(scope, containing, kind, modifiers, line)?;
            return Ok(Member::Types(types));
        }

        match self.peek() {
            Some(Token::Delegate | Token::Event) => {
                self.skip_member()?;
                return Ok(Member::Skipped);
            }
            Some(Token::RBrace) | None => return Ok(Member::Skipped),
            _ => {}
        }

        if containing.is_empty() {
            self.skip_member()?;
            return Ok(Member::Skipped);
        }

        let save = self.pos;
        if let Some(field) = self.try_parse_field(markers, modifiers, line)? {
            return Ok(Member::Field(field));
        }
        self.pos = save;
        self.skip_member()?;
        Ok(Member::Skipped)
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        while self.peek() == Some(Token::Ident) {
            // `partial void M()` and `record` are handled by their callers.
            let Some(modifier) = Modifier::parse(self.text_at(0)) else {
                break;
            };
            // `ref` only modifies a following `struct` or `readonly`.
            if modifier == Modifier::Ref && self.peek_at(1) == Some(Token::Ident) {
                let next = self.text_at(1);
                if next != "readonly" && next != "partial" && next != "unsafe" {
                    break;
                }
            }
            modifiers.push(modifier);
            self.pos += 1;
        }
        modifiers
    }

    fn peek_type_keyword(&self) -> Option<TypeKind> {
        match self.peek()? {
            Token::Class => Some(TypeKind::Class),
            Token::Struct => Some(TypeKind::Struct),
            Token::Interface => Some(TypeKind::Interface),
            Token::Enum => Some(TypeKind::Enum),
            Token::Ident if self.text_at(0) == "record" => match self.peek_at(1)? {
                Token::Struct => Some(TypeKind::RecordStruct),
                Token::Class | Token::Ident => Some(TypeKind::Record),
                _ => None,
            },
            _ => None,
        }
    }

    /// Parses a type declaration and returns it followed by its nested
    /// types.
    fn parse_type_declaration(
        &mut self,
        scope: Option<&str>,
        containing: &[Segment],
        kind: TypeKind,
        modifiers: Vec<Modifier>,
        line: usize,
    ) -> Result<Vec<TypeDeclaration>, ParseError> {
        match kind {
            TypeKind::Record => {
                self.pos += 1;
                self.eat(Token::Class);
            }
            TypeKind::RecordStruct => self.pos += 2,
            _ => self.pos += 1,
        }

        let name = self.expect_ident("type name")?;
        let mut decl = TypeDeclaration::new(name.trim_start_matches('@'), kind);
        decl.modifiers = modifiers;
        decl.namespace = scope.map(str::to_string);
        decl.containing_types = containing.to_vec();
        decl.line = line;

        if self.peek() == Some(Token::Lt) {
            decl.type_parameters = self.parse_type_parameters()?;
        }
        if self.peek() == Some(Token::LParen) {
            self.skip_balanced()?;
        }
        if self.eat(Token::Colon) {
            loop {
                let base = self.parse_type_text("base type")?;
                decl.base_types.push(TypeReference::new(base));
                if !self.eat(Token::Comma) {
                    break;
                }
            }
        }
        // Constraint clauses run up to the body.
        while !matches!(
            self.peek(),
            None | Some(Token::LBrace | Token::Semicolon)
        ) {
            if self.peek().is_some_and(|t| t.is_open()) {
                self.skip_balanced()?;
            } else {
                self.pos += 1;
            }
        }

        let mut nested = Vec::new();
        match self.peek() {
            Some(Token::LBrace) if kind == TypeKind::Enum => self.skip_balanced()?,
            Some(Token::LBrace) => {
                self.pos += 1;
                let mut inner = containing.to_vec();
                inner.push(Segment::new(decl.name.clone(), decl.arity()));
                self.parse_type_body(scope, &inner, &mut decl, &mut nested)?;
            }
            Some(Token::Semicolon) => {}
            _ => return Err(ParseError::eof(self.path, "type body")),
        }
        self.eat(Token::Semicolon);

        let mut types = vec![decl];
        types.extend(nested);
        Ok(types)
    }

    fn parse_type_parameters(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(Token::Lt, "'<'")?;
        let mut params = Vec::new();
        loop {
            self.parse_attribute_lists()?;
            if self.is_ident(0, "in") || self.is_ident(0, "out") {
                self.pos += 1;
            }
            params.push(self.expect_ident("type parameter")?.to_string());
            if !self.eat(Token::Comma) {
                break;
            }
        }
        self.expect(Token::Gt, "'>' after type parameters")?;
        Ok(params)
    }

    fn parse_type_body(
        &mut self,
        scope: Option<&str>,
        containing: &[Segment],
        decl: &mut TypeDeclaration,
        nested: &mut Vec<TypeDeclaration>,
    ) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                None => return Err(ParseError::eof(self.path, "'}' closing type body")),
                Some(Token::RBrace) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(Token::Semicolon) => self.pos += 1,
                _ => {
                    let markers = self.parse_attribute_lists()?;
                    match self.parse_member(scope, containing, markers)? {
                        Member::Field(field) => decl.fields.push(field),
                        Member::Types(types) => nested.extend(types),
                        Member::Skipped => {}
                    }
                }
            }
        }
    }

    /// Parses a field declaration if the upcoming tokens form one.
    fn try_parse_field(
        &mut self,
        markers: Vec<Marker>,
        modifiers: Vec<Modifier>,
        line: usize,
    ) -> Result<Option<FieldDecl>, ParseError> {
        let Some(type_span) = self.parse_type() else {
            return Ok(None);
        };
        if !self.at_declarator() {
            return Ok(None);
        }

        let mut names = Vec::new();
        loop {
            let name = self.expect_ident("field name")?;
            names.push(name.trim_start_matches('@').to_string());
            if self.eat(Token::Eq) {
                self.skip_initializer()?;
            }
            if self.eat(Token::Comma) {
                continue;
            }
            self.expect(Token::Semicolon, "';' after field declaration")?;
            break;
        }

        Ok(Some(FieldDecl {
            type_text: self.slice(type_span),
            names,
            markers,
            modifiers,
            line,
        }))
    }

    /// Returns true at `name ;`, `name =` or `name ,`, but not at the
    /// `name =>` of an expression-bodied property.
    fn at_declarator(&self) -> bool {
        if self.peek() != Some(Token::Ident) {
            return false;
        }
        match self.peek_at(1) {
            Some(Token::Semicolon | Token::Comma) => true,
            Some(Token::Eq) => self.peek_at(2) != Some(Token::Gt),
            _ => false,
        }
    }

    /// Skips a field initializer, stopping before the `,` that starts the
    /// next declarator or the terminating `;`.
    fn skip_initializer(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                None => return Err(ParseError::eof(self.path, "';' after field initializer")),
                Some(Token::Semicolon) => return Ok(()),
                Some(Token::Comma) => {
                    // A comma inside `new Dictionary<int, string>()` is not a
                    // declarator separator.
                    let save = self.pos;
                    self.pos += 1;
                    let next_is_declarator = self.at_declarator();
                    self.pos = save;
                    if next_is_declarator {
                        return Ok(());
                    }
                    self.pos += 1;
                }
                Some(t) if t.is_open() => self.skip_balanced()?,
                Some(Token::RBrace) => {
                    return Err(ParseError::unexpected(
                        self.path,
                        self.line(),
                        "';' after field initializer",
                        "}",
                    ));
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    // ---- attributes --------------------------------------------------

    fn parse_attribute_lists(&mut self) -> Result<Vec<Marker>, ParseError> {
        let mut markers = Vec::new();
        while self.peek() == Some(Token::LBracket) {
            self.pos += 1;
            // Attribute target, e.g. `[field: Foo]` or `[assembly: Bar]`.
            if self.peek() == Some(Token::Ident)
                && self.peek_at(1) == Some(Token::Colon)
                && self.peek_at(2) != Some(Token::Colon)
            {
                self.pos += 2;
            }
            loop {
                let name = self.parse_type_text("attribute name")?;
                let arguments = if self.peek() == Some(Token::LParen) {
                    self.parse_attribute_arguments()?
                } else {
                    Vec::new()
                };
                markers.push(Marker::new(name, arguments));
                if !self.eat(Token::Comma) || self.peek() == Some(Token::RBracket) {
                    break;
                }
            }
            self.expect(Token::RBracket, "']' closing attribute list")?;
        }
        Ok(markers)
    }

    fn parse_attribute_arguments(&mut self) -> Result<Vec<String>, ParseError> {
        let open_line = self.line();
        self.expect(Token::LParen, "'('")?;
        let mut arguments = Vec::new();
        let mut start = self.start_offset();
        let mut empty = true;
        let mut depth = 0usize;
        loop {
            match self.peek() {
                None => {
                    return Err(ParseError::Unbalanced {
                        path: self.path.to_path_buf(),
                        line: open_line,
                        delimiter: '(',
                    });
                }
                Some(t) if t.is_open() => {
                    depth += 1;
                    empty = false;
                    self.pos += 1;
                }
                Some(Token::RParen) if depth == 0 => {
                    if !empty {
                        arguments.push(self.slice(start..self.end_offset()));
                    }
                    self.pos += 1;
                    return Ok(arguments);
                }
                Some(t) if t.is_close() => {
                    depth = depth.saturating_sub(1);
                    self.pos += 1;
                }
                Some(Token::Comma) if depth == 0 => {
                    arguments.push(self.slice(start..self.end_offset()));
                    self.pos += 1;
                    start = self.start_offset();
                    empty = true;
                }
                Some(_) => {
                    empty = false;
                    self.pos += 1;
                }
            }
        }
    }

    // ---- types -------------------------------------------------------

    fn parse_type_text(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.parse_type() {
            Some(span) => Ok(self.slice(span)),
            None => Err(match self.tokens.get(self.pos) {
                Some(l) => ParseError::unexpected(
                    self.path,
                    l.line,
                    expected,
                    &self.source[l.span.clone()],
                ),
                None => ParseError::eof(self.path, expected),
            }),
        }
    }

    /// Consumes a type and returns its source range, or restores the
    /// position and returns `None` if the tokens do not form one.
    fn parse_type(&mut self) -> Option<Range<usize>> {
        let save = self.pos;
        let start = self.start_offset();
        let parsed = self.parse_type_inner();
        if parsed.is_none() {
            self.pos = save;
        }
        parsed.map(|()| start..self.end_offset())
    }

    fn parse_type_inner(&mut self) -> Option<()> {
        match self.peek()? {
            Token::LParen => self.skip_balanced().ok()?,
            Token::Ident => {
                self.pos += 1;
                // `global::Name` and other alias qualifiers.
                if self.peek() == Some(Token::Colon) && self.peek_at(1) == Some(Token::Colon) {
                    self.pos += 2;
                    if !self.eat(Token::Ident) {
                        return None;
                    }
                }
                loop {
                    if self.peek() == Some(Token::Lt) {
                        self.skip_type_arguments()?;
                    }
                    if self.peek() == Some(Token::Dot) && self.peek_at(1) == Some(Token::Ident) {
                        self.pos += 2;
                        continue;
                    }
                    break;
                }
            }
            _ => return None,
        }

        loop {
            match self.peek() {
                Some(Token::Question | Token::Star) => self.pos += 1,
                Some(Token::LBracket)
                    if matches!(self.peek_at(1), Some(Token::RBracket | Token::Comma)) =>
                {
                    self.pos += 1;
                    while self.eat(Token::Comma) {}
                    if !self.eat(Token::RBracket) {
                        return None;
                    }
                }
                _ => return Some(()),
            }
        }
    }

    /// Skips `<...>` in a type, failing on tokens that cannot appear there.
    fn skip_type_arguments(&mut self) -> Option<()> {
        let mut depth = 0usize;
        loop {
            match self.peek()? {
                Token::Lt => depth += 1,
                Token::Gt => {
                    depth -= 1;
                    if depth == 0 {
                        self.pos += 1;
                        return Some(());
                    }
                }
                Token::LParen => {
                    self.skip_balanced().ok()?;
                    continue;
                }
                Token::Ident
                | Token::Comma
                | Token::Dot
                | Token::Colon
                | Token::Question
                | Token::Star
                | Token::LBracket
                | Token::RBracket => {}
                _ => return None,
            }
            self.pos += 1;
        }
    }

    // ---- skipping ----------------------------------------------------

    /// Skips a bracketed region starting at the current opening token.
    fn skip_balanced(&mut self) -> Result<(), ParseError> {
        let Some(open) = self.tokens.get(self.pos) else {
            return Err(ParseError::eof(self.path, "bracket"));
        };
        let open_line = open.line;
        let delimiter = self.source[open.span.clone()].chars().next().unwrap_or('{');

        let mut depth = 0usize;
        while let Some(lexeme) = self.bump() {
            if lexeme.token.is_open() {
                depth += 1;
            } else if lexeme.token.is_close() {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(ParseError::Unbalanced {
            path: self.path.to_path_buf(),
            line: open_line,
            delimiter,
        })
    }

    /// Skips a member whose shape is not needed: methods, properties,
    /// constructors, events, operators, indexers and delegates.
    ///
    /// Stops after the terminating `;` or the closing `}` of a body, and
    /// before the `}` that closes the enclosing type.
    fn skip_member(&mut self) -> Result<(), ParseError> {
        let mut needs_semicolon = false;
        loop {
            match self.peek() {
                None | Some(Token::RBrace) => return Ok(()),
                Some(Token::Semicolon) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(Token::LBrace) => {
                    self.skip_balanced()?;
                    if needs_semicolon {
                        continue;
                    }
                    // Auto-property initializer: `{ get; } = value;`
                    if self.peek() == Some(Token::Eq) {
                        needs_semicolon = true;
                        continue;
                    }
                    return Ok(());
                }
                Some(Token::LParen | Token::LBracket) => self.skip_balanced()?,
                Some(Token::Eq) => {
                    needs_semicolon = true;
                    self.pos += 1;
                }
                Some(_) => self.pos += 1,
            }
        }
    }
}
