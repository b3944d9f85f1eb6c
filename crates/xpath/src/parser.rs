//! The XPath 1.0–3.1 symbol table: nud/led handlers for every construct,
//! layered over the generic Pratt driver in `xpath_core::parser` (spec.md
//! §4.2). [`XPathGrammar`] is the single [`Grammar<Expression>`]
//! implementation for every version; version gating happens inline at the
//! handler that would otherwise accept a later-version-only construct.

use crate::ast::*;
use crate::error::{self, XPathError};
use crate::grammar::*;
use crate::static_analysis;
use crate::static_context::StaticContext;
use xpath_core::lexer::{tokenize, Token, TokenKind};
use xpath_core::parser::{expression, Cursor, Grammar};

pub struct XPathGrammar {
    pub version: XPathVersion,
}

/// Parses and statically checks `input` against `ctx`. This is the crate's
/// main entry point (spec.md §6.1).
pub fn parse(input: &str, ctx: &StaticContext) -> Result<Expression, XPathError> {
    let tokens = tokenize(input)?;
    let grammar = XPathGrammar { version: ctx.xpath_version };
    let mut cursor = Cursor::new(&tokens);
    let expr = expression(&mut cursor, &grammar, 0)?;
    if !cursor.is_eof() {
        return Err(XPathError::parse(format!("unexpected trailing input at '{}'", cursor.peek().text))
            .with_span(cursor.peek().span));
    }
    static_analysis::check(&expr, ctx)?;
    Ok(expr)
}

fn require_version(grammar: &XPathGrammar, min: XPathVersion, construct: &str) -> Result<(), XPathError> {
    if grammar.version.at_least(min) {
        Ok(())
    } else {
        Err(XPathError::parse(format!("'{}' requires a later XPath version than the static context selects", construct)))
    }
}

impl Grammar<Expression> for XPathGrammar {
    fn lbp(&self, token: &Token) -> u8 {
        match token.text.as_str() {
            "or" => BP_OR,
            "and" => BP_AND,
            "=" | "!=" | "<" | "<=" | ">" | ">=" | "eq" | "ne" | "lt" | "le" | "gt" | "ge" | "is" | "<<" | ">>" => {
                BP_COMPARISON
            }
            "to" => BP_RANGE,
            "+" | "-" => BP_ADDITIVE,
            "*" | "div" | "idiv" | "mod" => BP_MULTIPLICATIVE,
            "|" | "union" => BP_UNION,
            "intersect" | "except" => BP_INTERSECT_EXCEPT,
            "instance" | "treat" | "castable" | "cast" => BP_INSTANCE_OF,
            "!" => BP_SIMPLE_MAP,
            "=>" => BP_ARROW,
            "/" | "//" => BP_PATH,
            "[" | "?" => BP_POSTFIX,
            "(" => BP_POSTFIX,
            _ => 0,
        }
    }

    fn nud(&self, cursor: &mut Cursor, token: &Token) -> Result<Expression, XPathError> {
        match &token.kind {
            TokenKind::IntegerLiteral(n) => Ok(Expression::Literal(Literal::Integer(*n))),
            TokenKind::DecimalLiteral(s) => Ok(Expression::Literal(Literal::Decimal(s.clone()))),
            TokenKind::DoubleLiteral(f) => Ok(Expression::Literal(Literal::Double(*f))),
            TokenKind::StringLiteral(s) => Ok(Expression::Literal(Literal::String(s.clone()))),
            TokenKind::VarName => Ok(Expression::Variable(token.text.clone())),
            TokenKind::Name => self.nud_name(cursor, token),
            TokenKind::Symbol => self.nud_symbol(cursor, token),
            TokenKind::Eof => Err(XPathError::parse("unexpected end of expression").with_span(token.span)),
        }
    }

    fn led(&self, cursor: &mut Cursor, token: &Token, left: Expression) -> Result<Expression, XPathError> {
        match token.text.as_str() {
            "or" => self.binary_led(cursor, BinaryOperator::Or, left, BP_OR),
            "and" => self.binary_led(cursor, BinaryOperator::And, left, BP_AND),
            "=" => self.binary_led(cursor, BinaryOperator::GeneralEq, left, BP_COMPARISON),
            "!=" => self.binary_led(cursor, BinaryOperator::GeneralNe, left, BP_COMPARISON),
            "<" => self.binary_led(cursor, BinaryOperator::GeneralLt, left, BP_COMPARISON),
            "<=" => self.binary_led(cursor, BinaryOperator::GeneralLe, left, BP_COMPARISON),
            ">" => self.binary_led(cursor, BinaryOperator::GeneralGt, left, BP_COMPARISON),
            ">=" => self.binary_led(cursor, BinaryOperator::GeneralGe, left, BP_COMPARISON),
            "eq" => self.binary_led(cursor, BinaryOperator::ValueEq, left, BP_COMPARISON),
            "ne" => self.binary_led(cursor, BinaryOperator::ValueNe, left, BP_COMPARISON),
            "lt" => self.binary_led(cursor, BinaryOperator::ValueLt, left, BP_COMPARISON),
            "le" => self.binary_led(cursor, BinaryOperator::ValueLe, left, BP_COMPARISON),
            "gt" => self.binary_led(cursor, BinaryOperator::ValueGt, left, BP_COMPARISON),
            "ge" => self.binary_led(cursor, BinaryOperator::ValueGe, left, BP_COMPARISON),
            "is" => self.binary_led(cursor, BinaryOperator::NodeIs, left, BP_COMPARISON),
            "<<" => self.binary_led(cursor, BinaryOperator::NodePrecedes, left, BP_COMPARISON),
            ">>" => self.binary_led(cursor, BinaryOperator::NodeFollows, left, BP_COMPARISON),
            "to" => {
                let end = expression(cursor, self, BP_RANGE)?;
                Ok(Expression::RangeExpr { start: Box::new(left), end: Box::new(end) })
            }
            "+" => self.binary_led(cursor, BinaryOperator::Plus, left, BP_ADDITIVE),
            "-" => self.binary_led(cursor, BinaryOperator::Minus, left, BP_ADDITIVE),
            "*" => self.binary_led(cursor, BinaryOperator::Multiply, left, BP_MULTIPLICATIVE),
            "div" => self.binary_led(cursor, BinaryOperator::Divide, left, BP_MULTIPLICATIVE),
            "idiv" => self.binary_led(cursor, BinaryOperator::IntegerDivide, left, BP_MULTIPLICATIVE),
            "mod" => self.binary_led(cursor, BinaryOperator::Modulo, left, BP_MULTIPLICATIVE),
            "|" | "union" => self.binary_led(cursor, BinaryOperator::Union, left, BP_UNION),
            "intersect" => self.binary_led(cursor, BinaryOperator::Intersect, left, BP_INTERSECT_EXCEPT),
            "except" => self.binary_led(cursor, BinaryOperator::Except, left, BP_INTERSECT_EXCEPT),
            "instance" => {
                cursor.expect("of")?;
                require_version(self, XPathVersion::V2_0, "instance of")?;
                let sequence_type = self.parse_sequence_type(cursor)?;
                Ok(Expression::InstanceOf { expr: Box::new(left), sequence_type })
            }
            "treat" => {
                cursor.expect("as")?;
                require_version(self, XPathVersion::V2_0, "treat as")?;
                let sequence_type = self.parse_sequence_type(cursor)?;
                Ok(Expression::TreatAs { expr: Box::new(left), sequence_type })
            }
            "castable" => {
                cursor.expect("as")?;
                require_version(self, XPathVersion::V2_0, "castable as")?;
                let single_type = self.parse_single_type(cursor)?;
                Ok(Expression::CastableAs { expr: Box::new(left), single_type })
            }
            "cast" => {
                cursor.expect("as")?;
                require_version(self, XPathVersion::V2_0, "cast as")?;
                let single_type = self.parse_single_type(cursor)?;
                Ok(Expression::CastAs { expr: Box::new(left), single_type })
            }
            "!" => {
                require_version(self, XPathVersion::V3_0, "simple map operator")?;
                let mapping = expression(cursor, self, BP_SIMPLE_MAP)?;
                Ok(Expression::SimpleMapExpr { base: Box::new(left), mapping: Box::new(mapping) })
            }
            "=>" => {
                require_version(self, XPathVersion::V3_0, "arrow operator")?;
                self.parse_arrow(cursor, left)
            }
            "/" => self.path_led(cursor, left, false),
            "//" => self.path_led(cursor, left, true),
            "[" => self.predicate_led(cursor, left),
            "?" => {
                require_version(self, XPathVersion::V3_1, "lookup operator")?;
                let key = self.parse_lookup_key(cursor)?;
                Ok(Expression::lookup(left, key))
            }
            "(" => {
                require_version(self, XPathVersion::V3_0, "dynamic function call")?;
                let args = self.parse_arg_list(cursor)?;
                Ok(Expression::DynamicFunctionCall { function_expr: Box::new(left), args })
            }
            _ => Err(XPathError::parse(format!("'{}' cannot follow an expression", token.text)).with_span(token.span)),
        }
    }
}

impl XPathGrammar {
    fn binary_led(&self, cursor: &mut Cursor, op: BinaryOperator, left: Expression, bp: u8) -> Result<Expression, XPathError> {
        let right = expression(cursor, self, bp)?;
        Ok(Expression::binary_op(left, op, right))
    }

    fn nud_name(&self, cursor: &mut Cursor, token: &Token) -> Result<Expression, XPathError> {
        match token.text.as_str() {
            "if" if cursor.at("(") => self.parse_if(cursor),
            "for" if matches!(cursor.peek().kind, TokenKind::VarName) => self.parse_for(cursor),
            "let" if matches!(cursor.peek().kind, TokenKind::VarName) => self.parse_let(cursor),
            "some" if matches!(cursor.peek().kind, TokenKind::VarName) => self.parse_quantified(cursor, Quantifier::Some),
            "every" if matches!(cursor.peek().kind, TokenKind::VarName) => self.parse_quantified(cursor, Quantifier::Every),
            "map" if cursor.at("{") => self.parse_map_constructor(cursor),
            "array" if cursor.at("{") => self.parse_array_curly(cursor),
            "function" if cursor.at("(") => self.parse_inline_function(cursor),
            _ => {
                if let Some(axis) = axis_keyword(&token.text) {
                    if cursor.eat("::") {
                        return self.nud_step(axis, None, cursor);
                    }
                }
                if is_kind_test_keyword(&token.text) && cursor.at("(") {
                    let kind = self.parse_kind_test(cursor, &token.text)?;
                    return self.nud_step(Axis::Child, Some(NodeTest::Kind(kind)), cursor);
                }
                if cursor.at("(") {
                    return self.parse_function_call_or_partial(cursor, QName::parse(&token.text));
                }
                if cursor.at("#") {
                    cursor.advance();
                    let arity_tok = cursor.advance().clone();
                    let arity = match arity_tok.kind {
                        TokenKind::IntegerLiteral(n) => n as usize,
                        _ => return Err(XPathError::parse("expected an integer arity after '#'").with_span(arity_tok.span)),
                    };
                    require_version(self, XPathVersion::V3_0, "named function reference")?;
                    return Ok(Expression::NamedFunctionRef { name: QName::parse(&token.text), arity });
                }
                self.nud_step(Axis::Child, Some(node_test_from_name(&token.text)), cursor)
            }
        }
    }

    /// Builds the single-step location path that a bare name/wildcard/axis
    /// step/kind-test starts, picking up any immediately following `[...]`
    /// predicates.
    fn nud_step(&self, axis: Axis, node_test_hint: Option<NodeTest>, cursor: &mut Cursor) -> Result<Expression, XPathError> {
        let node_test = match node_test_hint {
            Some(nt) => nt,
            None => {
                let tok = cursor.advance().clone();
                self.parse_node_test(cursor, &tok)?
            }
        };
        let predicates = self.parse_predicates(cursor)?;
        Ok(Expression::LocationPath(LocationPath {
            start_point: None,
            is_absolute: false,
            steps: vec![Step { axis, node_test, predicates }],
        }))
    }

    fn parse_predicates(&self, cursor: &mut Cursor) -> Result<Vec<Expression>, XPathError> {
        let mut predicates = Vec::new();
        while cursor.eat("[") {
            predicates.push(expression(cursor, self, 0)?);
            cursor.expect("]")?;
        }
        Ok(predicates)
    }

    fn nud_symbol(&self, cursor: &mut Cursor, token: &Token) -> Result<Expression, XPathError> {
        match token.text.as_str() {
            "(" => {
                if cursor.eat(")") {
                    return Ok(Expression::Sequence(Vec::new()));
                }
                let mut items = vec![expression(cursor, self, 0)?];
                while cursor.eat(",") {
                    items.push(expression(cursor, self, 0)?);
                }
                cursor.expect(")")?;
                if items.len() == 1 {
                    Ok(items.pop().unwrap())
                } else {
                    Ok(Expression::Sequence(items))
                }
            }
            "[" => {
                require_version(self, XPathVersion::V3_1, "array constructor")?;
                let mut items = Vec::new();
                if !cursor.at("]") {
                    items.push(expression(cursor, self, 0)?);
                    while cursor.eat(",") {
                        items.push(expression(cursor, self, 0)?);
                    }
                }
                cursor.expect("]")?;
                Ok(Expression::ArrayConstructor(ArrayConstructorKind::Square(items)))
            }
            "-" => {
                let expr = expression(cursor, self, BP_UNARY)?;
                Ok(Expression::UnaryOp { op: UnaryOperator::Minus, expr: Box::new(expr) })
            }
            "+" => {
                let expr = expression(cursor, self, BP_UNARY)?;
                Ok(Expression::UnaryOp { op: UnaryOperator::Plus, expr: Box::new(expr) })
            }
            "." => Ok(Expression::ContextItem),
            ".." => self.nud_step(Axis::Parent, Some(NodeTest::Kind(KindTest::AnyKind)), cursor),
            "@" => {
                let tok = cursor.advance().clone();
                let nt = self.parse_node_test(cursor, &tok)?;
                self.nud_step(Axis::Attribute, Some(nt), cursor)
            }
            "*" => self.nud_step(Axis::Child, Some(NodeTest::Wildcard), cursor),
            "/" => {
                if is_step_start(cursor.peek()) {
                    let step = self.parse_step(cursor)?;
                    Ok(Expression::LocationPath(LocationPath { start_point: None, is_absolute: true, steps: vec![step] }))
                } else {
                    Ok(Expression::LocationPath(LocationPath { start_point: None, is_absolute: true, steps: Vec::new() }))
                }
            }
            "//" => {
                let descendant_or_self = Step { axis: Axis::DescendantOrSelf, node_test: NodeTest::Kind(KindTest::AnyKind), predicates: Vec::new() };
                let step = self.parse_step(cursor)?;
                Ok(Expression::LocationPath(LocationPath { start_point: None, is_absolute: true, steps: vec![descendant_or_self, step] }))
            }
            "?" => {
                require_version(self, XPathVersion::V3_1, "unary lookup")?;
                let key = self.parse_lookup_key(cursor)?;
                Ok(Expression::UnaryLookup(key))
            }
            _ => Err(XPathError::parse(format!("unexpected token '{}'", token.text)).with_span(token.span)),
        }
    }

    fn parse_step(&self, cursor: &mut Cursor) -> Result<Step, XPathError> {
        let token = cursor.advance().clone();
        match token.kind {
            TokenKind::Symbol if token.text == "." => Ok(Step { axis: Axis::SelfAxis, node_test: NodeTest::Kind(KindTest::AnyKind), predicates: self.parse_predicates(cursor)? }),
            TokenKind::Symbol if token.text == ".." => Ok(Step { axis: Axis::Parent, node_test: NodeTest::Kind(KindTest::AnyKind), predicates: self.parse_predicates(cursor)? }),
            TokenKind::Symbol if token.text == "@" => {
                let nt_tok = cursor.advance().clone();
                let nt = self.parse_node_test(cursor, &nt_tok)?;
                Ok(Step { axis: Axis::Attribute, node_test: nt, predicates: self.parse_predicates(cursor)? })
            }
            TokenKind::Symbol if token.text == "*" => Ok(Step { axis: Axis::Child, node_test: NodeTest::Wildcard, predicates: self.parse_predicates(cursor)? }),
            TokenKind::Name => {
                if let Some(axis) = axis_keyword(&token.text) {
                    if cursor.eat("::") {
                        let nt_tok = cursor.advance().clone();
                        let nt = self.parse_node_test(cursor, &nt_tok)?;
                        return Ok(Step { axis, node_test: nt, predicates: self.parse_predicates(cursor)? });
                    }
                }
                if is_kind_test_keyword(&token.text) && cursor.at("(") {
                    let kind = self.parse_kind_test(cursor, &token.text)?;
                    return Ok(Step { axis: Axis::Child, node_test: NodeTest::Kind(kind), predicates: self.parse_predicates(cursor)? });
                }
                let nt = self.parse_node_test(cursor, &token)?;
                Ok(Step { axis: Axis::Child, node_test: nt, predicates: self.parse_predicates(cursor)? })
            }
            _ => Err(XPathError::parse(format!("expected a path step, found '{}'", token.text)).with_span(token.span)),
        }
    }

    fn parse_node_test(&self, cursor: &mut Cursor, token: &Token) -> Result<NodeTest, XPathError> {
        if is_kind_test_keyword(&token.text) && cursor.at("(") {
            let kind = self.parse_kind_test(cursor, &token.text)?;
            return Ok(NodeTest::Kind(kind));
        }
        Ok(node_test_from_name(&token.text))
    }

    fn parse_kind_test(&self, cursor: &mut Cursor, keyword: &str) -> Result<KindTest, XPathError> {
        cursor.expect("(")?;
        let kind = match keyword {
            "node" => KindTest::AnyKind,
            "text" => KindTest::Text,
            "comment" => KindTest::Comment,
            "namespace-node" => KindTest::NamespaceNode,
            "processing-instruction" => {
                let target = if !cursor.at(")") { Some(self.parse_name_or_string(cursor)?) } else { None };
                KindTest::ProcessingInstruction(target)
            }
            "document-node" => {
                let inner = if !cursor.at(")") {
                    let tok = cursor.advance().clone();
                    Some(Box::new(self.parse_kind_test(cursor, &tok.text)?))
                } else {
                    None
                };
                cursor.expect(")")?;
                return Ok(KindTest::Document(inner));
            }
            "element" => {
                let (name, ty) = self.parse_kind_test_args(cursor)?;
                KindTest::Element(name, ty)
            }
            "attribute" => {
                let (name, ty) = self.parse_kind_test_args(cursor)?;
                KindTest::Attribute(name, ty)
            }
            "schema-element" => KindTest::SchemaElement(self.parse_name_or_string(cursor)?),
            "schema-attribute" => KindTest::SchemaAttribute(self.parse_name_or_string(cursor)?),
            other => return Err(XPathError::parse(format!("'{}' is not a kind test", other))),
        };
        cursor.expect(")")?;
        Ok(kind)
    }

    fn parse_kind_test_args(&self, cursor: &mut Cursor) -> Result<(Option<String>, Option<String>), XPathError> {
        if cursor.at(")") {
            return Ok((None, None));
        }
        let name = if cursor.at("*") { cursor.advance(); None } else { Some(self.parse_name_or_string(cursor)?) };
        let ty = if cursor.eat(",") { Some(self.parse_name_or_string(cursor)?) } else { None };
        Ok((name, ty))
    }

    fn parse_name_or_string(&self, cursor: &mut Cursor) -> Result<String, XPathError> {
        let tok = cursor.advance().clone();
        match tok.kind {
            TokenKind::Name => Ok(tok.text),
            TokenKind::StringLiteral(s) => Ok(s),
            _ => Err(XPathError::parse("expected a name").with_span(tok.span)),
        }
    }

    fn path_led(&self, cursor: &mut Cursor, left: Expression, is_deep: bool) -> Result<Expression, XPathError> {
        let mut new_steps = Vec::new();
        if is_deep {
            new_steps.push(Step { axis: Axis::DescendantOrSelf, node_test: NodeTest::Kind(KindTest::AnyKind), predicates: Vec::new() });
        }
        new_steps.push(self.parse_step(cursor)?);
        match left {
            Expression::LocationPath(mut path) => {
                path.steps.extend(new_steps);
                Ok(Expression::LocationPath(path))
            }
            other => Ok(Expression::LocationPath(LocationPath { start_point: Some(Box::new(other)), is_absolute: false, steps: new_steps })),
        }
    }

    fn predicate_led(&self, cursor: &mut Cursor, left: Expression) -> Result<Expression, XPathError> {
        let pred = expression(cursor, self, 0)?;
        cursor.expect("]")?;
        match left {
            Expression::LocationPath(mut path) if !path.steps.is_empty() => {
                path.steps.last_mut().unwrap().predicates.push(pred);
                Ok(Expression::LocationPath(path))
            }
            Expression::FilterExpr { base, mut predicates } => {
                predicates.push(pred);
                Ok(Expression::FilterExpr { base, predicates })
            }
            other => Ok(Expression::FilterExpr { base: Box::new(other), predicates: vec![pred] }),
        }
    }

    fn parse_arg_list(&self, cursor: &mut Cursor) -> Result<Vec<Expression>, XPathError> {
        cursor.expect("(")?;
        let mut args = Vec::new();
        if !cursor.at(")") {
            args.push(expression(cursor, self, 0)?);
            while cursor.eat(",") {
                args.push(expression(cursor, self, 0)?);
            }
        }
        cursor.expect(")")?;
        Ok(args)
    }

    fn parse_function_call_or_partial(&self, cursor: &mut Cursor, name: QName) -> Result<Expression, XPathError> {
        cursor.expect("(")?;
        let mut args: Vec<Option<Expression>> = Vec::new();
        let mut has_placeholder = false;
        if !cursor.at(")") {
            args.push(self.parse_arg_or_placeholder(cursor, &mut has_placeholder)?);
            while cursor.eat(",") {
                args.push(self.parse_arg_or_placeholder(cursor, &mut has_placeholder)?);
            }
        }
        cursor.expect(")")?;
        if has_placeholder {
            require_version(self, XPathVersion::V3_0, "partial function application")?;
            Ok(Expression::PartialApply { name, args })
        } else {
            Ok(Expression::FunctionCall { name, args: args.into_iter().map(Option::unwrap).collect() })
        }
    }

    fn parse_arg_or_placeholder(&self, cursor: &mut Cursor, has_placeholder: &mut bool) -> Result<Option<Expression>, XPathError> {
        if cursor.at("?") && matches!(cursor.peek_at(1).text.as_str(), "," | ")") {
            cursor.advance();
            *has_placeholder = true;
            Ok(None)
        } else {
            Ok(Some(expression(cursor, self, 0)?))
        }
    }

    fn parse_lookup_key(&self, cursor: &mut Cursor) -> Result<LookupKey, XPathError> {
        if cursor.eat("*") {
            return Ok(LookupKey::Wildcard);
        }
        if cursor.eat("(") {
            let expr = expression(cursor, self, 0)?;
            cursor.expect(")")?;
            return Ok(LookupKey::Parenthesized(Box::new(expr)));
        }
        let tok = cursor.advance().clone();
        match tok.kind {
            TokenKind::Name => Ok(LookupKey::NCName(tok.text)),
            TokenKind::IntegerLiteral(n) => Ok(LookupKey::Integer(n)),
            _ => Err(XPathError::parse("expected a lookup key after '?'").with_span(tok.span)),
        }
    }

    fn parse_arrow(&self, cursor: &mut Cursor, base: Expression) -> Result<Expression, XPathError> {
        let mut steps = Vec::new();
        loop {
            let target = if cursor.eat("(") {
                let expr = expression(cursor, self, 0)?;
                cursor.expect(")")?;
                ArrowTarget::Dynamic(Box::new(expr))
            } else {
                let tok = cursor.advance().clone();
                ArrowTarget::Named(QName::parse(&tok.text))
            };
            let args = self.parse_arg_list(cursor)?;
            steps.push(ArrowStep { function: target, args });
            if !cursor.eat("=>") {
                break;
            }
        }
        Ok(Expression::ArrowExpr { base: Box::new(base), steps })
    }

    fn parse_if(&self, cursor: &mut Cursor) -> Result<Expression, XPathError> {
        cursor.expect("(")?;
        let condition = expression(cursor, self, 0)?;
        cursor.expect(")")?;
        cursor.expect("then")?;
        let then_expr = expression(cursor, self, 0)?;
        cursor.expect("else")?;
        let else_expr = expression(cursor, self, 0)?;
        Ok(Expression::IfExpr { condition: Box::new(condition), then_expr: Box::new(then_expr), else_expr: Box::new(else_expr) })
    }

    fn parse_for(&self, cursor: &mut Cursor) -> Result<Expression, XPathError> {
        require_version(self, XPathVersion::V2_0, "for expression")?;
        let mut bindings = Vec::new();
        loop {
            let var = cursor.advance().clone().text;
            let pos_var = if cursor.eat("at") { Some(cursor.advance().clone().text) } else { None };
            cursor.expect("in")?;
            let value = expression(cursor, self, BP_OR)?;
            bindings.push((var, pos_var, Box::new(value)));
            if !cursor.eat(",") {
                break;
            }
            cursor.expect("for")?;
        }
        cursor.expect("return")?;
        let return_expr = expression(cursor, self, 0)?;
        Ok(Expression::ForExpr { bindings, return_expr: Box::new(return_expr) })
    }

    fn parse_let(&self, cursor: &mut Cursor) -> Result<Expression, XPathError> {
        require_version(self, XPathVersion::V2_0, "let expression")?;
        let mut bindings = Vec::new();
        loop {
            let var = cursor.advance().clone().text;
            cursor.expect(":=")?;
            let value = expression(cursor, self, BP_OR)?;
            bindings.push((var, Box::new(value)));
            if !cursor.eat(",") {
                break;
            }
            cursor.expect("let")?;
        }
        cursor.expect("return")?;
        let return_expr = expression(cursor, self, 0)?;
        Ok(Expression::LetExpr { bindings, return_expr: Box::new(return_expr) })
    }

    fn parse_quantified(&self, cursor: &mut Cursor, quantifier: Quantifier) -> Result<Expression, XPathError> {
        require_version(self, XPathVersion::V2_0, "quantified expression")?;
        let mut bindings = Vec::new();
        loop {
            let var = cursor.advance().clone().text;
            cursor.expect("in")?;
            let value = expression(cursor, self, BP_OR)?;
            bindings.push((var, Box::new(value)));
            if !cursor.eat(",") {
                break;
            }
        }
        cursor.expect("satisfies")?;
        let satisfies = expression(cursor, self, 0)?;
        Ok(Expression::QuantifiedExpr { quantifier, bindings, satisfies: Box::new(satisfies) })
    }

    fn parse_map_constructor(&self, cursor: &mut Cursor) -> Result<Expression, XPathError> {
        require_version(self, XPathVersion::V3_1, "map constructor")?;
        cursor.expect("{")?;
        let mut entries = Vec::new();
        if !cursor.at("}") {
            entries.push(self.parse_map_entry(cursor)?);
            while cursor.eat(",") {
                entries.push(self.parse_map_entry(cursor)?);
            }
        }
        cursor.expect("}")?;
        Ok(Expression::MapConstructor(entries))
    }

    fn parse_map_entry(&self, cursor: &mut Cursor) -> Result<MapEntry, XPathError> {
        let key = expression(cursor, self, BP_RANGE)?;
        cursor.expect(":")?;
        let value = expression(cursor, self, BP_OR)?;
        Ok(MapEntry { key: Box::new(key), value: Box::new(value) })
    }

    fn parse_array_curly(&self, cursor: &mut Cursor) -> Result<Expression, XPathError> {
        require_version(self, XPathVersion::V3_1, "array constructor")?;
        cursor.expect("{")?;
        let body = if cursor.at("}") { Expression::Sequence(Vec::new()) } else { expression(cursor, self, 0)? };
        cursor.expect("}")?;
        Ok(Expression::ArrayConstructor(ArrayConstructorKind::Curly(Box::new(body))))
    }

    fn parse_inline_function(&self, cursor: &mut Cursor) -> Result<Expression, XPathError> {
        require_version(self, XPathVersion::V3_0, "inline function")?;
        cursor.expect("(")?;
        let mut params = Vec::new();
        if matches!(cursor.peek().kind, TokenKind::VarName) {
            params.push(self.parse_param(cursor)?);
            while cursor.eat(",") {
                params.push(self.parse_param(cursor)?);
            }
        }
        cursor.expect(")")?;
        let return_type = if cursor.eat("as") { Some(self.parse_sequence_type(cursor)?) } else { None };
        cursor.expect("{")?;
        let body = expression(cursor, self, 0)?;
        cursor.expect("}")?;
        Ok(Expression::InlineFunction { params, return_type, body: Box::new(body) })
    }

    fn parse_param(&self, cursor: &mut Cursor) -> Result<Param, XPathError> {
        let name = cursor.advance().clone().text;
        let type_decl = if cursor.eat("as") { Some(self.parse_sequence_type(cursor)?) } else { None };
        Ok(Param { name, type_decl })
    }

    pub fn parse_sequence_type(&self, cursor: &mut Cursor) -> Result<SequenceType, XPathError> {
        if cursor.at("empty-sequence") {
            cursor.advance();
            cursor.expect("(")?;
            cursor.expect(")")?;
            return Ok(SequenceType::empty_sequence());
        }
        let item_type = self.parse_item_type(cursor)?;
        let occurrence = if cursor.eat("?") {
            OccurrenceIndicator::ZeroOrOne
        } else if cursor.eat("*") {
            OccurrenceIndicator::ZeroOrMore
        } else if cursor.eat("+") {
            OccurrenceIndicator::OneOrMore
        } else {
            OccurrenceIndicator::ExactlyOne
        };
        Ok(SequenceType { item_type, occurrence })
    }

    fn parse_item_type(&self, cursor: &mut Cursor) -> Result<ItemType, XPathError> {
        if cursor.at("item") && cursor.peek_at(1).text == "(" {
            cursor.advance();
            cursor.advance();
            cursor.expect(")")?;
            return Ok(ItemType::Item);
        }
        if cursor.at("function") && cursor.peek_at(1).text == "(" {
            cursor.advance();
            cursor.advance();
            if cursor.eat("*") {
                cursor.expect(")")?;
                return Ok(ItemType::FunctionTest(None, None));
            }
            let mut params = Vec::new();
            if !cursor.at(")") {
                params.push(self.parse_sequence_type(cursor)?);
                while cursor.eat(",") {
                    params.push(self.parse_sequence_type(cursor)?);
                }
            }
            cursor.expect(")")?;
            cursor.expect("as")?;
            let ret = self.parse_sequence_type(cursor)?;
            return Ok(ItemType::FunctionTest(Some(params), Some(Box::new(ret))));
        }
        if cursor.at("map") && cursor.peek_at(1).text == "(" {
            cursor.advance();
            cursor.advance();
            if cursor.eat("*") {
                cursor.expect(")")?;
                return Ok(ItemType::MapTest(None, None));
            }
            let key_tok = cursor.advance().clone();
            let key = QName::parse(&key_tok.text);
            cursor.expect(",")?;
            let value = self.parse_sequence_type(cursor)?;
            cursor.expect(")")?;
            return Ok(ItemType::MapTest(Some(key), Some(Box::new(value))));
        }
        if cursor.at("array") && cursor.peek_at(1).text == "(" {
            cursor.advance();
            cursor.advance();
            if cursor.eat("*") {
                cursor.expect(")")?;
                return Ok(ItemType::ArrayTest(None));
            }
            let member = self.parse_sequence_type(cursor)?;
            cursor.expect(")")?;
            return Ok(ItemType::ArrayTest(Some(Box::new(member))));
        }
        let tok = cursor.advance().clone();
        if is_kind_test_keyword(&tok.text) && cursor.at("(") {
            let kind = self.parse_kind_test(cursor, &tok.text)?;
            return Ok(ItemType::KindTest(kind));
        }
        Ok(ItemType::AtomicOrUnion(QName::parse(&tok.text)))
    }

    fn parse_single_type(&self, cursor: &mut Cursor) -> Result<SingleType, XPathError> {
        let tok = cursor.advance().clone();
        let optional = cursor.eat("?");
        Ok(SingleType { type_name: QName::parse(&tok.text), optional })
    }
}

fn node_test_from_name(text: &str) -> NodeTest {
    if text == "*" {
        return NodeTest::Wildcard;
    }
    match text.split_once(':') {
        Some((p, "*")) => NodeTest::PrefixWildcard(p.to_string()),
        Some(("*", l)) => NodeTest::LocalWildcard(l.to_string()),
        Some((p, l)) => NodeTest::Name { prefix: Some(p.to_string()), local: l.to_string() },
        None => NodeTest::Name { prefix: None, local: text.to_string() },
    }
}

fn axis_keyword(text: &str) -> Option<Axis> {
    Some(match text {
        "child" => Axis::Child,
        "descendant" => Axis::Descendant,
        "descendant-or-self" => Axis::DescendantOrSelf,
        "attribute" => Axis::Attribute,
        "parent" => Axis::Parent,
        "ancestor" => Axis::Ancestor,
        "ancestor-or-self" => Axis::AncestorOrSelf,
        "self" => Axis::SelfAxis,
        "following-sibling" => Axis::FollowingSibling,
        "preceding-sibling" => Axis::PrecedingSibling,
        "following" => Axis::Following,
        "preceding" => Axis::Preceding,
        "namespace" => Axis::Namespace,
        _ => return None,
    })
}

fn is_kind_test_keyword(text: &str) -> bool {
    matches!(
        text,
        "node" | "text" | "comment" | "processing-instruction" | "document-node" | "element" | "attribute" | "schema-element" | "schema-attribute" | "namespace-node"
    )
}

/// True when `token` can legally begin a path step, used to decide whether
/// a leading `/` is the root path alone or has a following step.
fn is_step_start(token: &Token) -> bool {
    match &token.kind {
        TokenKind::Name => true,
        TokenKind::Symbol => matches!(token.text.as_str(), "." | ".." | "@" | "*"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::static_context::StaticContext;

    #[test]
    fn parses_simple_arithmetic() {
        let ctx = StaticContext::default();
        let expr = parse("1 + 2 * 3", &ctx).unwrap();
        assert_eq!(
            expr,
            Expression::binary_op(
                Expression::Literal(Literal::Integer(1)),
                BinaryOperator::Plus,
                Expression::binary_op(
                    Expression::Literal(Literal::Integer(2)),
                    BinaryOperator::Multiply,
                    Expression::Literal(Literal::Integer(3)),
                ),
            )
        );
    }

    #[test]
    fn parses_relative_path_with_predicate() {
        let ctx = StaticContext::default();
        let expr = parse("child::para[1]", &ctx).unwrap();
        match expr {
            Expression::LocationPath(path) => {
                assert_eq!(path.steps.len(), 1);
                assert_eq!(path.steps[0].axis, Axis::Child);
                assert_eq!(path.steps[0].predicates.len(), 1);
            }
            other => panic!("expected a location path, got {:?}", other),
        }
    }

    #[test]
    fn parses_absolute_descendant_path() {
        let ctx = StaticContext::default();
        let expr = parse("//para", &ctx).unwrap();
        match expr {
            Expression::LocationPath(path) => {
                assert!(path.is_absolute);
                assert_eq!(path.steps.len(), 2);
                assert_eq!(path.steps[0].axis, Axis::DescendantOrSelf);
            }
            other => panic!("expected a location path, got {:?}", other),
        }
    }

    #[test]
    fn parses_let_expression() {
        let ctx = StaticContext::default();
        let expr = parse("let $x := 1 return $x + 1", &ctx).unwrap();
        assert!(matches!(expr, Expression::LetExpr { .. }));
    }

    #[test]
    fn parses_map_constructor_and_lookup() {
        let ctx = StaticContext::default();
        let expr = parse("map{'a': 1, 'b': 2}?a", &ctx).unwrap();
        assert!(matches!(expr, Expression::LookupExpr { .. }));
    }

    #[test]
    fn rejects_flwor_in_xpath_1_0_mode() {
        let ctx = StaticContext::xpath_1_0();
        let err = parse("let $x := 1 return $x", &ctx).unwrap_err();
        assert_eq!(err.code, error::ErrorCode::XPST0003);
    }
}
