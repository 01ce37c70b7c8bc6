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
    ast::{FunctionDef, Node, NodeKind, Parameter, ParameterMode},
    errors::{MissingOperandSnafu, Position, SonoError, SonoResult, UnmatchedBracketSnafu},
    lexer::{Bracket, Token, TokenKind},
    operators::Operator,
    phonology::{PhoneTable, RuleKind},
};
use std::sync::Arc;

/// Builds syntax trees from tokens in two passes.
///
/// The first pass reorders tokens into postfix with a shunting yard, keeping
/// brackets in the output so that the second pass can find the operands they
/// enclose. The second pass folds the postfix tokens into nodes with an
/// operand stack.
pub struct Parser<'a> {
    phones: &'a PhoneTable,
}

/// Entry on the operand stack of the second pass.
enum Item {
    Open(Position),
    Node(Node),
}

impl<'a> Parser<'a> {
    pub fn new(phones: &'a PhoneTable) -> Self {
        Self { phones }
    }

    /// Parses a whole unit into its statements.
    pub fn parse(&self, tokens: Vec<Token>) -> SonoResult<Vec<Node>> {
        let postfix = to_postfix(tokens)?;
        self.assemble(postfix)
    }

    fn assemble(&self, postfix: Vec<Token>) -> SonoResult<Vec<Node>> {
        let mut stack: Vec<Item> = Vec::new();
        for token in postfix {
            let position = token.position;
            match token.kind {
                TokenKind::Open(_) => stack.push(Item::Open(position)),
                TokenKind::Close(bracket) => {
                    let mut elements = Vec::new();
                    let start = loop {
                        match stack.pop() {
                            Some(Item::Node(node)) => elements.push(ungroup(node)),
                            Some(Item::Open(start)) => break start,
                            None => {
                                return UnmatchedBracketSnafu {
                                    bracket: bracket.close(),
                                    position,
                                }
                                .fail()
                            }
                        }
                    };
                    elements.reverse();
                    let kind = match bracket {
                        Bracket::Round => NodeKind::Group(elements),
                        Bracket::Square => NodeKind::Matrix(elements),
                        Bracket::Curly => NodeKind::Block(elements),
                    };
                    stack.push(Item::Node(Node::new(kind, start)));
                }
                TokenKind::Operator(operator) => {
                    let mut operands = Vec::with_capacity(operator.arity());
                    for _ in 0..operator.arity() {
                        match stack.pop() {
                            Some(Item::Node(node)) => operands.push(node),
                            _ => {
                                return MissingOperandSnafu {
                                    operator: operator.to_string(),
                                    position,
                                }
                                .fail()
                            }
                        }
                    }
                    let node = match (operands.pop(), operands.pop()) {
                        (Some(operand), None) => build_unary(operator, operand, position)?,
                        (Some(left), Some(right)) => self.build_binary(operator, left, right, position)?,
                        _ => continue,
                    };
                    stack.push(Item::Node(node));
                }
                kind => stack.push(Item::Node(self.operand(kind, position)?)),
            }
        }
        stack
            .into_iter()
            .map(|item| match item {
                Item::Node(node) => Ok(ungroup(node)),
                Item::Open(position) => UnmatchedBracketSnafu {
                    bracket: '(',
                    position,
                }
                .fail(),
            })
            .collect()
    }

    fn operand(&self, kind: TokenKind, position: Position) -> SonoResult<Node> {
        let kind = match kind {
            TokenKind::Number(number) => NodeKind::Number(number),
            TokenKind::Str(text) => NodeKind::Str(text),
            TokenKind::Phone(text) => NodeKind::Phone(
                self.phones
                    .interpret_phone(&text)
                    .map_err(|error| literal_error(error, position))?,
            ),
            TokenKind::Word(text) => NodeKind::Word(
                self.phones
                    .interpret_sequence(&text)
                    .map_err(|error| literal_error(error, position))?,
            ),
            TokenKind::Feature(feature) => NodeKind::Feature(feature),
            TokenKind::Identifier(name) => match name.as_str() {
                "null" => NodeKind::Null,
                "true" => NodeKind::Bool(true),
                "false" => NodeKind::Bool(false),
                "break" => NodeKind::Break,
                _ => NodeKind::Variable(self.phones.interner().intern(&name)),
            },
            TokenKind::Operator(_) | TokenKind::Open(_) | TokenKind::Close(_) => {
                return Err(malformed("unexpected token", position))
            }
        };
        Ok(Node::new(kind, position))
    }

    fn build_binary(&self, operator: Operator, left: Node, right: Node, position: Position) -> SonoResult<Node> {
        let kind = match operator {
            Operator::Member => match right.kind {
                NodeKind::Variable(name) => NodeKind::Member(Box::new(ungroup(left)), name),
                _ => return Err(malformed("`.` must be followed by a name", position)),
            },
            Operator::Index => match right.kind {
                NodeKind::Matrix(mut elements) if elements.len() == 1 => {
                    NodeKind::Index(Box::new(ungroup(left)), Box::new(elements.remove(0)))
                }
                _ => return Err(malformed("an index takes exactly one expression", position)),
            },
            Operator::Call => match right.kind {
                NodeKind::Group(arguments) => NodeKind::Call(Box::new(ungroup(left)), arguments),
                kind => NodeKind::Call(Box::new(ungroup(left)), vec![Node::new(kind, right.position)]),
            },
            Operator::Lambda => return lambda(left, right, position),
            Operator::Class => match left.kind {
                NodeKind::Unary(marker @ (Operator::Struct | Operator::Static), name) => match name.kind {
                    NodeKind::Variable(name) => NodeKind::Structure {
                        name,
                        body: Arc::new(ungroup(right)),
                        is_static: marker == Operator::Static,
                    },
                    _ => return Err(malformed("a structure needs a name", position)),
                },
                _ => return Err(malformed("`class` must follow `struct` or `static`", position)),
            },
            Operator::Then => NodeKind::If {
                condition: Box::new(ungroup(left)),
                then: Box::new(ungroup(right)),
                otherwise: None,
            },
            Operator::Else => match left.kind {
                NodeKind::If {
                    condition,
                    then,
                    otherwise: None,
                } => NodeKind::If {
                    condition,
                    then,
                    otherwise: Some(Box::new(ungroup(right))),
                },
                _ => return Err(malformed("`else` must follow `then`", position)),
            },
            Operator::Catch => match left.kind {
                NodeKind::Try { body, handler: None } => NodeKind::Try {
                    body,
                    handler: Some(Box::new(ungroup(right))),
                },
                _ => return Err(malformed("`catch` must follow `try`", position)),
            },
            Operator::Do => match ungroup(left) {
                Node {
                    kind: NodeKind::Binary(Operator::In, variable, iterable),
                    position: in_position,
                } => match variable.kind {
                    NodeKind::Variable(variable) | NodeKind::Declare(variable) => NodeKind::ForEach {
                        variable,
                        iterable,
                        body: Box::new(ungroup(right)),
                    },
                    _ => return Err(malformed("`in` must follow a name", in_position)),
                },
                condition => NodeKind::While {
                    condition: Box::new(condition),
                    body: Box::new(ungroup(right)),
                },
            },
            Operator::Rule => return self.rule(left, right, position),
            Operator::Assign
            | Operator::AddAssign
            | Operator::SubtractAssign
            | Operator::MultiplyAssign
            | Operator::DivideAssign
            | Operator::RemainderAssign => {
                let target = ungroup(left);
                match target.kind {
                    NodeKind::Variable(_) | NodeKind::Declare(_) | NodeKind::Index(..) | NodeKind::Member(..) => {
                        NodeKind::Assign(operator, Box::new(target), Box::new(ungroup(right)))
                    }
                    _ => return Err(malformed("only names, members and indices can be assigned", position)),
                }
            }
            _ => NodeKind::Binary(operator, Box::new(ungroup(left)), Box::new(ungroup(right))),
        };
        Ok(Node::new(kind, position))
    }

    /// Splits `kind |> search -> replacement / left _ right` into its parts.
    fn rule(&self, kind: Node, change: Node, position: Position) -> SonoResult<Node> {
        let kind = match kind.kind {
            NodeKind::Variable(name) => self
                .phones
                .interner()
                .resolve(name)
                .and_then(|name| RuleKind::from_name(&name)),
            _ => None,
        }
        .ok_or_else(|| malformed("a rule must start with S, Af or Ab", position))?;
        let (change, context) = match change.kind {
            NodeKind::Binary(Operator::RuleContext, change, context) => (*change, Some(*context)),
            other => (Node::new(other, change.position), None),
        };
        let (search, replacement) = match change.kind {
            NodeKind::Binary(Operator::Arrow, search, replacement) => (search, replacement),
            _ => return Err(malformed("a rule needs `search -> replacement`", position)),
        };
        let null = || Box::new(Node::new(NodeKind::Null, position));
        let (left, right) = match context {
            Some(Node {
                kind: NodeKind::Binary(Operator::Focus, left, right),
                ..
            }) => (left, right),
            Some(_) => return Err(malformed("a rule context needs `_`", position)),
            None => (null(), null()),
        };
        Ok(Node::new(
            NodeKind::Rule {
                kind,
                search,
                replacement,
                left,
                right,
            },
            position,
        ))
    }
}

/// Reorders infix tokens into postfix. Brackets are kept in the output.
fn to_postfix(tokens: Vec<Token>) -> SonoResult<Vec<Token>> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<Token> = Vec::new();
    for token in tokens {
        match token.kind {
            TokenKind::Open(_) => {
                output.push(token.clone());
                stack.push(token);
            }
            TokenKind::Close(bracket) => {
                loop {
                    match stack.pop() {
                        Some(Token {
                            kind: TokenKind::Open(open),
                            position,
                        }) => {
                            if open != bracket {
                                return UnmatchedBracketSnafu {
                                    bracket: open.open(),
                                    position,
                                }
                                .fail();
                            }
                            break;
                        }
                        Some(operator) => output.push(operator),
                        None => {
                            return UnmatchedBracketSnafu {
                                bracket: bracket.close(),
                                position: token.position,
                            }
                            .fail()
                        }
                    }
                }
                output.push(token);
            }
            TokenKind::Operator(separator) if separator.is_separator() => {
                while let Some(Token {
                    kind: TokenKind::Operator(_),
                    ..
                }) = stack.last()
                {
                    output.extend(stack.pop());
                }
            }
            TokenKind::Operator(incoming) => {
                if !incoming.is_prefix() {
                    while let Some(Token {
                        kind: TokenKind::Operator(stacked),
                        ..
                    }) = stack.last()
                    {
                        if !stacked
                            .associativity()
                            .yields_to(stacked.precedence(), incoming.precedence())
                        {
                            break;
                        }
                        output.extend(stack.pop());
                    }
                }
                stack.push(token);
            }
            _ => output.push(token),
        }
    }
    while let Some(token) = stack.pop() {
        if let TokenKind::Open(bracket) = token.kind {
            return UnmatchedBracketSnafu {
                bracket: bracket.open(),
                position: token.position,
            }
            .fail();
        }
        output.push(token);
    }
    Ok(output)
}

fn build_unary(operator: Operator, operand: Node, position: Position) -> SonoResult<Node> {
    let kind = match operator {
        Operator::New => match ungroup(operand) {
            Node {
                kind: NodeKind::Call(structure, arguments),
                ..
            } => NodeKind::New {
                structure,
                arguments,
            },
            structure => NodeKind::New {
                structure: Box::new(structure),
                arguments: Vec::new(),
            },
        },
        Operator::Var => match operand.kind {
            NodeKind::Variable(name) => NodeKind::Declare(name),
            _ => return Err(malformed("`var` must be followed by a name", position)),
        },
        Operator::Return => NodeKind::Return(Box::new(ungroup(operand))),
        Operator::Throw => NodeKind::Throw(Box::new(ungroup(operand))),
        Operator::Try => NodeKind::Try {
            body: Box::new(ungroup(operand)),
            handler: None,
        },
        _ => NodeKind::Unary(operator, Box::new(ungroup(operand))),
    };
    Ok(Node::new(kind, position))
}

/// `params => body`, or `name(params) => body` which also declares `name`.
fn lambda(head: Node, body: Node, position: Position) -> SonoResult<Node> {
    let (name, parameters) = match head.kind {
        NodeKind::Call(callee, arguments) => match *callee {
            Node {
                kind: NodeKind::Variable(name),
                position: name_position,
            } => (Some((name, name_position)), arguments),
            _ => return Err(malformed("a named lambda needs a plain name", position)),
        },
        NodeKind::Group(elements) => (None, elements),
        other => (None, vec![Node::new(other, head.position)]),
    };
    let parameters = parameters
        .into_iter()
        .map(parameter)
        .collect::<SonoResult<Vec<_>>>()?;
    let definition = FunctionDef {
        parameters,
        body: ungroup(body),
    };
    let lambda = Node::new(NodeKind::Lambda(Arc::new(definition)), position);
    Ok(match name {
        Some((name, name_position)) => Node::new(
            NodeKind::Assign(
                Operator::Assign,
                Box::new(Node::new(NodeKind::Declare(name), name_position)),
                Box::new(lambda),
            ),
            position,
        ),
        None => lambda,
    })
}

fn parameter(node: Node) -> SonoResult<Parameter> {
    let position = node.position;
    let (mode, name) = match node.kind {
        NodeKind::Unary(Operator::Ref, inner) => (ParameterMode::Reference, inner.kind),
        NodeKind::Unary(Operator::Final, inner) => (ParameterMode::Final, inner.kind),
        other => (ParameterMode::Value, other),
    };
    match name {
        NodeKind::Variable(name) => Ok(Parameter { name, mode }),
        _ => Err(malformed("lambda parameters must be names", position)),
    }
}

/// Replaces a parenthesised group by its only element or by a vector.
fn ungroup(node: Node) -> Node {
    match node.kind {
        NodeKind::Group(mut elements) if elements.len() == 1 => elements.remove(0),
        NodeKind::Group(elements) => Node::new(NodeKind::Vector(elements), node.position),
        _ => node,
    }
}

fn malformed(message: &str, position: Position) -> SonoError {
    SonoError::MalformedSyntax {
        message: message.to_string(),
        position,
    }
}

fn literal_error(error: SonoError, position: Position) -> SonoError {
    let reason = match error {
        SonoError::UnknownPhone { segment, .. } => format!("`{}` is not a recognised phone", segment),
        SonoError::InapplicableDiacritic { diacritic, base, .. } => {
            format!("diacritic `{}` cannot be applied to `{}`", diacritic, base)
        }
        SonoError::DanglingBoundary { transcription, .. } => {
            format!("`{}` ends with a boundary marker", transcription)
        }
        other => other.to_string(),
    };
    SonoError::InvalidLiteral { reason, position }
}

#[cfg(test)]
mod tests {
    use super::Parser;
    use crate::{
        ast::{Node, NodeKind, ParameterMode},
        errors::{SonoError, SonoResult},
        interner::Interner,
        lexer::Lexer,
        operators::Operator,
        phonology::{PhoneTable, RuleKind},
    };
    use assert_matches::assert_matches;
    use std::sync::Arc;
    use test_sono::BASE_PHONES;

    fn parse(source: &str) -> SonoResult<Vec<Node>> {
        let table = PhoneTable::from_tsv(Arc::new(Interner::new()), BASE_PHONES)?;
        let tokens = Lexer::new(&table, true).tokenize(source)?;
        Parser::new(&table).parse(tokens)
    }

    fn single(source: &str) -> NodeKind {
        let mut nodes = parse(source).unwrap();
        assert_eq!(nodes.len(), 1);
        nodes.remove(0).kind
    }

    fn number(node: &Node) -> f64 {
        match node.kind {
            NodeKind::Number(number) => number,
            ref other => panic!("expected a number, found {:?}", other),
        }
    }

    #[test]
    fn multiplication_is_nested_under_addition() {
        assert_matches!(
            single("2 + 3 * 4"),
            NodeKind::Binary(Operator::Add, left, right)
                if number(&left) == 2.0
                    && matches!(right.kind, NodeKind::Binary(Operator::Multiply, _, _))
        );
        assert_matches!(
            single("(2 + 3) * 4"),
            NodeKind::Binary(Operator::Multiply, left, _)
                if matches!(left.kind, NodeKind::Binary(Operator::Add, _, _))
        );
    }

    #[test]
    fn assignment_groups_to_the_right() {
        assert_matches!(
            single("a = b = 1"),
            NodeKind::Assign(Operator::Assign, _, value)
                if matches!(value.kind, NodeKind::Assign(Operator::Assign, _, _))
        );
    }

    #[test]
    fn statements_are_separated() {
        assert_eq!(parse("1; 2, 3").unwrap().len(), 3);
        assert_eq!(parse("{ 1 } 2").unwrap().len(), 2);
    }

    #[test]
    fn parentheses_of_one_element_disappear() {
        assert_eq!(single("(((7)))"), NodeKind::Number(7.0));
        assert_matches!(single("(1, 2)"), NodeKind::Vector(elements) if elements.len() == 2);
        assert_matches!(single("()"), NodeKind::Vector(elements) if elements.is_empty());
    }

    #[test]
    fn conditionals_chain() {
        assert_matches!(
            single("a then b else c then d else e"),
            NodeKind::If { otherwise: Some(otherwise), .. }
                if matches!(otherwise.kind, NodeKind::If { otherwise: Some(_), .. })
        );
    }

    #[test]
    fn for_each_binds_its_variable() {
        assert_matches!(single("x in 0 until 3 do { x }"), NodeKind::ForEach { .. });
        assert_matches!(single("x < 3 do { x += 1 }"), NodeKind::While { .. });
    }

    #[test]
    fn named_lambda_declares_its_name() {
        match single("f(a, ref b, final c) => { return a }") {
            NodeKind::Assign(Operator::Assign, target, lambda) => {
                assert_matches!(target.kind, NodeKind::Declare(_));
                match lambda.kind {
                    NodeKind::Lambda(definition) => {
                        let modes: Vec<ParameterMode> =
                            definition.parameters.iter().map(|p| p.mode).collect();
                        assert_eq!(
                            modes,
                            vec![ParameterMode::Value, ParameterMode::Reference, ParameterMode::Final]
                        );
                        assert!(definition.body.is_block());
                    }
                    other => panic!("expected a lambda, found {:?}", other),
                }
            }
            other => panic!("expected an assignment, found {:?}", other),
        }
    }

    #[test]
    fn structures_and_instances() {
        assert_matches!(
            single("struct Point class { x = 0 }"),
            NodeKind::Structure { is_static: false, .. }
        );
        assert_matches!(
            single("new Point(1, 2)"),
            NodeKind::New { arguments, .. } if arguments.len() == 2
        );
    }

    #[test]
    fn rules_are_split_into_parts() {
        match single("Af |> [+syl] -> [+long] / _ [+syl]") {
            NodeKind::Rule {
                kind,
                search,
                replacement,
                left,
                right,
            } => {
                assert_eq!(kind, RuleKind::AssimilateForward);
                assert_matches!(search.kind, NodeKind::Matrix(_));
                assert_matches!(replacement.kind, NodeKind::Matrix(_));
                assert_eq!(left.kind, NodeKind::Null);
                assert_matches!(right.kind, NodeKind::Matrix(_));
            }
            other => panic!("expected a rule, found {:?}", other),
        }
    }

    #[test]
    fn unknown_rule_kind_is_rejected() {
        assert_matches!(
            parse("Q |> 'a' -> 'e'"),
            Err(SonoError::MalformedSyntax { .. })
        );
    }

    #[test]
    fn unknown_phone_literal_is_a_compilation_error() {
        assert_matches!(parse("'ʘ'"), Err(SonoError::InvalidLiteral { .. }));
    }

    #[test]
    fn brackets_must_match() {
        assert_matches!(parse("(1 + 2"), Err(SonoError::UnmatchedBracket { bracket: '(', .. }));
        assert_matches!(parse("1 + 2)"), Err(SonoError::UnmatchedBracket { bracket: ')', .. }));
        assert_matches!(parse("(1 ]"), Err(SonoError::UnmatchedBracket { bracket: '(', .. }));
    }

    #[test]
    fn missing_operand_is_reported() {
        assert_matches!(
            parse("1 +"),
            Err(SonoError::MissingOperand { operator, .. }) if operator == "+"
        );
        assert_matches!(parse("(* 2)"), Err(SonoError::MissingOperand { .. }));
    }
}
