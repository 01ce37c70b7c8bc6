/*  Library for the Sono programming language.
    Copyright (C) 2018 to 2019 Charles Johnson

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License
    along with this program. If not, see <http://www.gnu.org/licenses/>.
*/

use crate::{
    errors::{
        MalformedFeatureSnafu, PhonologyDisabledSnafu, Position, SonoError, SonoResult,
        UnclosedLiteralSnafu, UnknownTokenSnafu,
    },
    interner::Interner,
    operators::Operator,
    phonology::{Feature, PhoneTable, Quality},
};
use std::fmt;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Bracket {
    Round,
    Square,
    Curly,
}

impl Bracket {
    pub fn open(self) -> char {
        match self {
            Bracket::Round => '(',
            Bracket::Square => '[',
            Bracket::Curly => '{',
        }
    }

    pub fn close(self) -> char {
        match self {
            Bracket::Round => ')',
            Bracket::Square => ']',
            Bracket::Curly => '}',
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(f64),
    Str(String),
    /// Text of a `'...'` literal, read against the phone table by the parser.
    Phone(String),
    /// Text of a `` `...` `` literal.
    Word(String),
    Feature(Feature),
    Identifier(String),
    Operator(Operator),
    Open(Bracket),
    Close(Bracket),
}

impl TokenKind {
    /// Whether an operand may end with this token.
    fn ends_operand(&self) -> bool {
        !matches!(self, TokenKind::Operator(_) | TokenKind::Open(_))
    }

    /// Whether an operand may start with this token.
    fn starts_operand(&self) -> bool {
        match self {
            TokenKind::Operator(operator) => operator.is_prefix(),
            TokenKind::Close(_) => false,
            _ => true,
        }
    }

    /// Source text that reads back as the same token.
    pub fn render(&self, interner: &Interner) -> String {
        match self {
            TokenKind::Number(number) => number.to_string(),
            TokenKind::Str(text) => quote(text, '"'),
            TokenKind::Phone(text) => quote(text, '\''),
            TokenKind::Word(text) => quote(text, '`'),
            TokenKind::Feature(feature) => format!("@{}", feature.render(interner)),
            TokenKind::Identifier(name) => name.clone(),
            TokenKind::Operator(operator) => operator.to_string(),
            TokenKind::Open(bracket) => bracket.open().to_string(),
            TokenKind::Close(bracket) => bracket.close().to_string(),
        }
    }
}

/// Escapes `text` so that it reads back as the same literal.
pub fn quote(text: &str, delimiter: char) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push(delimiter);
    for c in text.chars() {
        match c {
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            '\r' => quoted.push_str("\\r"),
            '\\' => quoted.push_str("\\\\"),
            c if c == delimiter => {
                quoted.push('\\');
                quoted.push(c);
            }
            c => quoted.push(c),
        }
    }
    quoted.push(delimiter);
    quoted
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: Position,
}

impl Token {
    fn new(kind: TokenKind, position: Position) -> Self {
        Self { kind, position }
    }

    fn null(position: Position) -> Self {
        Self::new(TokenKind::Identifier("null".to_string()), position)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?} at {}", self.kind, self.position)
    }
}

/// A raw piece of source text before operators are disambiguated.
#[derive(Clone, Debug, PartialEq)]
struct Lexeme {
    category: Category,
    position: Position,
}

#[derive(Clone, Debug, PartialEq)]
enum Category {
    Number(f64),
    Str(String),
    Phone(String),
    Word(String),
    Name(String),
    Symbol(Operator),
    Open(Bracket),
    Close(Bracket),
    At,
    Pipe,
    Tilde,
}

impl Category {
    fn text(&self) -> String {
        match self {
            Category::Number(number) => number.to_string(),
            Category::Str(text) | Category::Phone(text) | Category::Word(text) | Category::Name(text) => {
                text.clone()
            }
            Category::Symbol(operator) => operator.to_string(),
            Category::Open(bracket) => bracket.open().to_string(),
            Category::Close(bracket) => bracket.close().to_string(),
            Category::At => "@".to_string(),
            Category::Pipe => "|".to_string(),
            Category::Tilde => "~".to_string(),
        }
    }

    /// The quality a feature literal starting with this lexeme has.
    fn quality(&self) -> Option<Quality> {
        match self {
            Category::Symbol(Operator::Add) => Some(Quality::True),
            Category::Symbol(Operator::Subtract) => Some(Quality::False),
            Category::Tilde => Some(Quality::Any),
            Category::Number(number) if *number == 0.0 => Some(Quality::Unset),
            Category::Name(name) => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(symbol), None) => Quality::from_symbol(symbol).filter(|q| q.is_variable()),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// The operator this lexeme spells, keywords included.
    fn operator(&self) -> Option<Operator> {
        match self {
            Category::Symbol(operator) => Some(*operator),
            Category::Name(name) => Operator::from_spelling(name),
            _ => None,
        }
    }
}

struct Scanner {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
        }
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn peek(&self) -> Option<char> {
        self.peek_nth(0)
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.chars.get(self.index + n).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut run = String::new();
        while let Some(c) = self.peek().filter(|c| predicate(*c)) {
            run.push(c);
            self.bump();
        }
        run
    }

    fn scan(mut self) -> SonoResult<Vec<Lexeme>> {
        let mut lexemes = Vec::new();
        while let Some(c) = self.peek() {
            let position = self.here();
            let category = match c {
                c if c.is_whitespace() => {
                    self.bump();
                    continue;
                }
                '#' => {
                    self.take_while(|c| c != '\n');
                    continue;
                }
                '"' | '\'' | '`' => {
                    self.bump();
                    let text = self.quoted(c, position)?;
                    match c {
                        '"' => Category::Str(text),
                        '\'' => Category::Phone(text),
                        _ => Category::Word(text),
                    }
                }
                '(' | '[' | '{' | ')' | ']' | '}' => {
                    self.bump();
                    match c {
                        '(' => Category::Open(Bracket::Round),
                        '[' => Category::Open(Bracket::Square),
                        '{' => Category::Open(Bracket::Curly),
                        ')' => Category::Close(Bracket::Round),
                        ']' => Category::Close(Bracket::Square),
                        _ => Category::Close(Bracket::Curly),
                    }
                }
                c if c.is_alphanumeric() || c == '_' => self.name_or_number(position)?,
                _ => self.symbol(position)?,
            };
            lexemes.push(Lexeme { category, position });
        }
        Ok(lexemes)
    }

    fn quoted(&mut self, delimiter: char, start: Position) -> SonoResult<String> {
        let mut text = String::new();
        loop {
            let escape_position = self.here();
            match self.bump() {
                None => return UnclosedLiteralSnafu { delimiter, position: start }.fail(),
                Some(c) if c == delimiter => return Ok(text),
                Some('\\') => text.push(self.escape(escape_position)?),
                Some(c) => text.push(c),
            }
        }
    }

    fn escape(&mut self, position: Position) -> SonoResult<char> {
        let malformed = |escape: String| SonoError::MalformedEscape { escape, position };
        match self.bump() {
            Some('n') => Ok('\n'),
            Some('t') => Ok('\t'),
            Some('r') => Ok('\r'),
            Some(c @ ('\\' | '"' | '\'' | '`')) => Ok(c),
            Some(first) if first.is_ascii_digit() => {
                let mut digits = first.to_string();
                for _ in 0..2 {
                    match self.bump() {
                        Some(digit) if digit.is_ascii_digit() => digits.push(digit),
                        other => {
                            let rest = other.map(String::from).unwrap_or_default();
                            return Err(malformed(format!("\\{}{}", digits, rest)));
                        }
                    }
                }
                digits
                    .parse::<u32>()
                    .ok()
                    .and_then(char::from_u32)
                    .ok_or_else(|| malformed(format!("\\{}", digits)))
            }
            Some(other) => Err(malformed(format!("\\{}", other))),
            None => Err(malformed("\\".to_string())),
        }
    }

    fn name_or_number(&mut self, position: Position) -> SonoResult<Category> {
        let run = self.take_while(|c| c.is_alphanumeric() || c == '_');
        if !run.starts_with(|c: char| c.is_ascii_digit()) {
            return Ok(Category::Name(run));
        }
        let mut number = run;
        let fraction_follows = self.peek() == Some('.')
            && self.peek_nth(1).map_or(false, |c| c.is_ascii_digit());
        if fraction_follows && number.chars().all(|c| c.is_ascii_digit()) {
            self.bump();
            number.push('.');
            number.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        number
            .parse::<f64>()
            .map(Category::Number)
            .map_err(|_| SonoError::InvalidLiteral {
                reason: format!("`{}` is not a number", number),
                position,
            })
    }

    /// The longest operator spelled from here on, or one of the phonological marks.
    fn symbol(&mut self, position: Position) -> SonoResult<Category> {
        let mut run = String::new();
        let mut longest = None;
        while let Some(c) = self.peek_nth(run.chars().count()) {
            run.push(c);
            if !Operator::is_spelling_prefix(&run) {
                break;
            }
            if let Some(operator) = Operator::from_spelling(&run) {
                longest = Some((operator, run.chars().count()));
            }
        }
        if let Some((operator, length)) = longest {
            for _ in 0..length {
                self.bump();
            }
            return Ok(Category::Symbol(operator));
        }
        match self.bump() {
            Some('@') => Ok(Category::At),
            Some('|') => Ok(Category::Pipe),
            Some('~') => Ok(Category::Tilde),
            other => UnknownTokenSnafu {
                token: other.map(String::from).unwrap_or_default(),
                position,
            }
            .fail(),
        }
    }
}

/// Turns source text into tokens ready for the parser.
///
/// Scanning splits the text into literals, names, brackets and operator
/// spellings. Classification then resolves everything that depends on the
/// neighbouring tokens: unary signs, feature literals, implicit call and
/// index operators, statement ends after blocks and the rule-only meanings
/// of `/` and `_`.
pub struct Lexer<'a> {
    phones: &'a PhoneTable,
    phonology: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(phones: &'a PhoneTable, phonology: bool) -> Self {
        Self { phones, phonology }
    }

    pub fn tokenize(&self, source: &str) -> SonoResult<Vec<Token>> {
        let lexemes = Scanner::new(source).scan()?;
        let tokens = self.classify(&lexemes)?;
        Ok(insert_missing_operands(tokens))
    }

    fn classify(&self, lexemes: &[Lexeme]) -> SonoResult<Vec<Token>> {
        let mut tokens: Vec<Token> = Vec::with_capacity(lexemes.len());
        let mut depth = 0;
        let mut rule_depth: Option<usize> = None;
        let mut i = 0;
        while let Some(Lexeme { category, position }) = lexemes.get(i) {
            let position = *position;
            i += 1;
            let previous = tokens.last().map(|t| &t.kind);
            let unary = previous.map_or(true, |kind| {
                matches!(kind, TokenKind::Operator(_) | TokenKind::Open(_))
            });
            let kind = match category {
                Category::Number(number) => match category
                    .quality()
                    .and_then(|quality| self.stitch(lexemes, i, quality, true))
                {
                    Some((feature, next)) => {
                        i = next;
                        TokenKind::Feature(feature)
                    }
                    None => TokenKind::Number(*number),
                },
                Category::Str(text) => TokenKind::Str(text.clone()),
                Category::Phone(text) => {
                    self.require_phonology(position)?;
                    TokenKind::Phone(text.clone())
                }
                Category::Word(text) => {
                    self.require_phonology(position)?;
                    TokenKind::Word(text.clone())
                }
                Category::At => {
                    self.require_phonology(position)?;
                    let feature = lexemes
                        .get(i)
                        .and_then(|lexeme| lexeme.category.quality())
                        .and_then(|quality| self.stitch(lexemes, i + 1, quality, false));
                    match feature {
                        Some((feature, next)) => {
                            i = next;
                            TokenKind::Feature(feature)
                        }
                        None => {
                            let literal: String = lexemes[i..]
                                .iter()
                                .take(3)
                                .map(|lexeme| lexeme.category.text())
                                .collect();
                            return MalformedFeatureSnafu {
                                literal: format!("@{}", literal),
                                position,
                            }
                            .fail();
                        }
                    }
                }
                Category::Tilde => {
                    self.require_phonology(position)?;
                    match self.stitch(lexemes, i, Quality::Any, false) {
                        Some((feature, next)) => {
                            i = next;
                            TokenKind::Feature(feature)
                        }
                        None => {
                            return MalformedFeatureSnafu {
                                literal: "~",
                                position,
                            }
                            .fail()
                        }
                    }
                }
                Category::Pipe => {
                    return UnknownTokenSnafu {
                        token: "|",
                        position,
                    }
                    .fail()
                }
                Category::Name(name) => {
                    let variable = category.quality();
                    match variable.and_then(|quality| self.stitch(lexemes, i, quality, true)) {
                        Some((feature, next)) => {
                            i = next;
                            TokenKind::Feature(feature)
                        }
                        None if rule_depth.is_some() && name == "_" => TokenKind::Operator(Operator::Focus),
                        None => match Operator::from_spelling(name) {
                            Some(operator) => TokenKind::Operator(operator),
                            None => TokenKind::Identifier(name.clone()),
                        },
                    }
                }
                Category::Symbol(operator) => match operator {
                    Operator::Add | Operator::Subtract if unary => {
                        let quality = category.quality().unwrap_or(Quality::Unset);
                        match self.stitch(lexemes, i, quality, false) {
                            Some((feature, next)) => {
                                i = next;
                                TokenKind::Feature(feature)
                            }
                            None if *operator == Operator::Add => TokenKind::Operator(Operator::Affirm),
                            None => TokenKind::Operator(Operator::Negate),
                        }
                    }
                    Operator::Divide if rule_depth.is_some() => TokenKind::Operator(Operator::RuleContext),
                    Operator::Rule => {
                        self.require_phonology(position)?;
                        TokenKind::Operator(Operator::Rule)
                    }
                    other => TokenKind::Operator(*other),
                },
                Category::Open(bracket) => {
                    let implicit = match (bracket, previous) {
                        (
                            Bracket::Round,
                            Some(
                                TokenKind::Identifier(_)
                                | TokenKind::Close(Bracket::Round)
                                | TokenKind::Close(Bracket::Square),
                            ),
                        ) => Some(Operator::Call),
                        (
                            Bracket::Square,
                            Some(
                                TokenKind::Identifier(_)
                                | TokenKind::Close(_)
                                | TokenKind::Str(_)
                                | TokenKind::Word(_),
                            ),
                        ) => Some(Operator::Index),
                        _ => None,
                    };
                    if let Some(operator) = implicit {
                        tokens.push(Token::new(TokenKind::Operator(operator), position));
                    }
                    depth += 1;
                    TokenKind::Open(*bracket)
                }
                Category::Close(bracket) => {
                    depth = usize::saturating_sub(depth, 1);
                    if rule_depth.map_or(false, |d| depth < d) {
                        rule_depth = None;
                    }
                    tokens.push(Token::new(TokenKind::Close(*bracket), position));
                    if *bracket == Bracket::Curly && ends_statement(lexemes.get(i)) {
                        tokens.push(Token::new(TokenKind::Operator(Operator::Semicolon), position));
                        if rule_depth == Some(depth) {
                            rule_depth = None;
                        }
                    }
                    continue;
                }
            };
            match kind {
                TokenKind::Operator(Operator::Rule) => rule_depth = Some(depth),
                TokenKind::Operator(Operator::Comma | Operator::Semicolon)
                    if rule_depth == Some(depth) =>
                {
                    rule_depth = None
                }
                _ => (),
            }
            tokens.push(Token::new(kind, position));
        }
        Ok(tokens)
    }

    fn require_phonology(&self, position: Position) -> SonoResult<()> {
        if self.phonology {
            Ok(())
        } else {
            PhonologyDisabledSnafu { position }.fail()
        }
    }

    /// Reads the `[|]name` part of a feature literal whose quality came just before `i`.
    ///
    /// Returns the feature and the index of the lexeme after it.
    fn stitch(&self, lexemes: &[Lexeme], i: usize, quality: Quality, needs_pipe: bool) -> Option<(Feature, usize)> {
        if !self.phonology {
            return None;
        }
        let i = match lexemes.get(i).map(|l| &l.category) {
            Some(Category::Pipe) => i + 1,
            _ if needs_pipe => return None,
            _ => i,
        };
        match lexemes.get(i).map(|l| &l.category) {
            Some(Category::Name(name)) => self
                .phones
                .feature(name)
                .map(|feature| (Feature::new(feature, quality), i + 1)),
            _ => None,
        }
    }
}

/// Whether a `}` followed by `next` ends a statement.
fn ends_statement(next: Option<&Lexeme>) -> bool {
    let Some(next) = next else {
        return false;
    };
    match &next.category {
        Category::Open(Bracket::Square) | Category::Close(_) => false,
        category => match category.operator() {
            Some(Operator::Else | Operator::Catch) => false,
            Some(operator) if operator.is_separator() => false,
            Some(operator) => operator.is_prefix() || operator.precedence() < 0,
            None => true,
        },
    }
}

/// Fills the operands a rule or `return` may leave out with `null`.
fn insert_missing_operands(tokens: Vec<Token>) -> Vec<Token> {
    let mut output: Vec<Token> = Vec::with_capacity(tokens.len());
    let mut tokens = tokens.into_iter().peekable();
    while let Some(token) = tokens.next() {
        let next = tokens.peek().map(|t| &t.kind);
        let ends = |next: Option<&TokenKind>| match next {
            None | Some(TokenKind::Close(_)) => true,
            Some(TokenKind::Operator(operator)) => operator.is_separator(),
            _ => false,
        };
        let (before, after) = match token.kind {
            TokenKind::Operator(Operator::Focus) => (
                !output.last().map_or(false, |t| t.kind.ends_operand()),
                !next.map_or(false, TokenKind::starts_operand),
            ),
            TokenKind::Operator(Operator::Arrow) => (
                false,
                ends(next) || next == Some(&TokenKind::Operator(Operator::RuleContext)),
            ),
            TokenKind::Operator(Operator::Return) => (false, ends(next)),
            _ => (false, false),
        };
        let position = token.position;
        if before {
            output.push(Token::null(position));
        }
        output.push(token);
        if after {
            output.push(Token::null(position));
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::{Bracket, Lexer, TokenKind};
    use crate::{
        errors::{Position, SonoError},
        interner::Interner,
        operators::Operator,
        phonology::{PhoneTable, Quality},
    };
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use test_sono::BASE_PHONES;

    fn table() -> PhoneTable {
        PhoneTable::from_tsv(Arc::new(Interner::new()), BASE_PHONES).unwrap()
    }

    fn kinds(table: &PhoneTable, source: &str) -> Vec<TokenKind> {
        Lexer::new(table, true)
            .tokenize(source)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    fn op(operator: Operator) -> TokenKind {
        TokenKind::Operator(operator)
    }

    fn ident(name: &str) -> TokenKind {
        TokenKind::Identifier(name.to_string())
    }

    #[test]
    fn string_escapes_are_decoded() {
        let table = PhoneTable::empty(Arc::new(Interner::new()));
        assert_eq!(
            kinds(&table, r#""a\n\"b\\" "\065""#),
            vec![
                TokenKind::Str("a\n\"b\\".to_string()),
                TokenKind::Str("A".to_string())
            ]
        );
    }

    #[test]
    fn rendered_string_reads_back_the_same() {
        let table = PhoneTable::empty(Arc::new(Interner::new()));
        let source = r#""line\nbreak \"quoted\" back\\slash""#;
        let first = kinds(&table, source);
        let rendered = first[0].render(table.interner());
        assert_eq!(rendered, source);
        assert_eq!(kinds(&table, &rendered), first);
    }

    #[test]
    fn unknown_escape_is_malformed() {
        let table = table();
        let error = Lexer::new(&table, true).tokenize(r#""\q""#).unwrap_err();
        assert_matches!(error, SonoError::MalformedEscape { escape, .. } if escape == "\\q");
    }

    #[test]
    fn unclosed_literal_reports_its_start() {
        let table = table();
        let error = Lexer::new(&table, true).tokenize("x = \n  'a").unwrap_err();
        assert_eq!(
            error,
            SonoError::UnclosedLiteral {
                delimiter: '\'',
                position: Position::new(2, 3)
            }
        );
    }

    #[test]
    fn comments_are_skipped() {
        let table = table();
        assert_eq!(kinds(&table, "1 # two\n3"), vec![TokenKind::Number(1.0), TokenKind::Number(3.0)]);
    }

    #[test]
    fn decimals_are_merged() {
        let table = table();
        assert_eq!(kinds(&table, "1.25"), vec![TokenKind::Number(1.25)]);
        assert_eq!(
            kinds(&table, "v.length"),
            vec![ident("v"), op(Operator::Member), ident("length")]
        );
    }

    #[test]
    fn signs_after_operators_are_unary() {
        let table = table();
        assert_eq!(
            kinds(&table, "1 - -2"),
            vec![
                TokenKind::Number(1.0),
                op(Operator::Subtract),
                op(Operator::Negate),
                TokenKind::Number(2.0)
            ]
        );
        assert_eq!(kinds(&table, "+x")[0], op(Operator::Affirm));
    }

    #[test]
    fn longest_operator_spelling_wins() {
        let table = table();
        assert_eq!(
            kinds(&table, "a<=b|>"),
            vec![ident("a"), op(Operator::LessEqual), ident("b"), op(Operator::Rule)]
        );
        assert_matches!(
            Lexer::new(&table, true).tokenize("a $ b"),
            Err(SonoError::UnknownToken { token, .. }) if token == "$"
        );
    }

    #[test]
    fn feature_literals_are_stitched() {
        let table = table();
        let voice = table.feature("voice").unwrap();
        let features: Vec<(Quality, bool)> = kinds(&table, "[+voice, -voice, ~voice, @α|voice, γ|voice, 0|voice]")
            .into_iter()
            .filter_map(|kind| match kind {
                TokenKind::Feature(feature) => Some((feature.quality, feature.feature == voice)),
                _ => None,
            })
            .collect();
        assert_eq!(
            features,
            vec![
                (Quality::True, true),
                (Quality::False, true),
                (Quality::Any, true),
                (Quality::Alpha, true),
                (Quality::Gamma, true),
                (Quality::Unset, true)
            ]
        );
    }

    #[test]
    fn unknown_feature_after_at_is_malformed() {
        let table = table();
        assert_matches!(
            Lexer::new(&table, true).tokenize("@+wings"),
            Err(SonoError::MalformedFeature { literal, .. }) if literal == "@+wings"
        );
    }

    #[test]
    fn phonology_can_be_switched_off() {
        let table = table();
        assert_matches!(
            Lexer::new(&table, false).tokenize("'a'"),
            Err(SonoError::PhonologyDisabled { .. })
        );
        assert_eq!(
            Lexer::new(&table, false).tokenize("-voice").unwrap()[0].kind,
            op(Operator::Negate)
        );
    }

    #[test]
    fn calls_and_indices_are_made_explicit() {
        let table = table();
        assert_eq!(
            kinds(&table, "f(x)[0]"),
            vec![
                ident("f"),
                op(Operator::Call),
                TokenKind::Open(Bracket::Round),
                ident("x"),
                TokenKind::Close(Bracket::Round),
                op(Operator::Index),
                TokenKind::Open(Bracket::Square),
                TokenKind::Number(0.0),
                TokenKind::Close(Bracket::Square)
            ]
        );
    }

    #[test]
    fn closing_brace_ends_a_statement() {
        let table = table();
        let tokens = kinds(&table, "{x} y");
        assert_eq!(tokens[3], op(Operator::Semicolon));
        let tokens = kinds(&table, "try {x} catch {y}");
        assert!(!tokens.contains(&op(Operator::Semicolon)));
    }

    #[test]
    fn rules_read_slash_and_underscore_as_context() {
        let table = table();
        let tokens = kinds(&table, "S |> 'a' -> 'e' / _ 'i'; 4 / 2");
        assert_eq!(
            tokens,
            vec![
                ident("S"),
                op(Operator::Rule),
                TokenKind::Phone("a".to_string()),
                op(Operator::Arrow),
                TokenKind::Phone("e".to_string()),
                op(Operator::RuleContext),
                ident("null"),
                op(Operator::Focus),
                TokenKind::Phone("i".to_string()),
                op(Operator::Semicolon),
                TokenKind::Number(4.0),
                op(Operator::Divide),
                TokenKind::Number(2.0)
            ]
        );
    }

    #[test]
    fn deletion_and_bare_return_get_null() {
        let table = table();
        let tokens = kinds(&table, "S |> 'a' -> / 'i' _");
        assert_eq!(&tokens[3..6], &[op(Operator::Arrow), ident("null"), op(Operator::RuleContext)]);
        assert_eq!(tokens.last(), Some(&ident("null")));
        assert_eq!(kinds(&table, "{return}")[2], ident("null"));
    }
}
