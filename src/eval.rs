// SPDX: CC0-1.0

use crate::{
    lex::{Lexer, SubStr},
    parse::{self, ParseErr},
    stdlib, viewport, Number,
};
use core::fmt;
use std::{collections::HashMap, sync::Arc};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl OperatorTyp {
    pub const fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
            Self::Pow => '^',
        }
    }

    pub const fn fun(&self) -> (&'static str, Fun) {
        match self {
            Self::Add => ("add", Fun::new(2, stdlib::add)),
            Self::Sub => ("sub", Fun::new(2, stdlib::sub)),
            Self::Mul => ("mul", Fun::new(2, stdlib::mul)),
            Self::Div => ("div", Fun::new(2, stdlib::div)),
            Self::Pow => ("pow", Fun::new(2, stdlib::pow)),
        }
    }

    pub fn apply(&self, lhs: Number, rhs: Number) -> Number {
        (self.fun().1.fun)(&[lhs, rhs])
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Fun {
    pub arity: usize,
    pub fun: fn(&[Number]) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, fun: fn(&[Number]) -> Number) -> Self {
        Self { arity, fun }
    }
}

#[derive(Debug)]
pub enum Ident {
    Var(Option<Number>),
    Const(Number),
    Fun(Fun),
}

#[derive(Clone, Debug, Eq)]
pub enum IdentKey {
    Arc(SubStr),
    Static(&'static str),
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for IdentKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

impl IdentKey {
    pub fn get(&self) -> &str {
        match self {
            Self::Arc(s) => s.get(),
            Self::Static(s) => s,
        }
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

impl From<SubStr> for IdentKey {
    fn from(s: SubStr) -> Self {
        Self::Arc(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

#[derive(Clone, Debug)]
pub enum ExprTyp {
    Val(Number),
    Ident(IdentKey),
    Neg(Box<Expr>),
    Binary {
        op: OperatorTyp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call {
        name: IdentKey,
        fun: Fun,
        args: Vec<Expr>,
    },
}

/// Node of a parsed expression, with the span of source it was parsed from.
#[derive(Clone, Debug)]
pub struct Expr {
    pub typ: ExprTyp,
    pub loc: SubStr,
    /// nodes on the longest path down to a leaf, this one included
    pub(crate) height: usize,
}

impl Expr {
    pub fn height(&self) -> usize {
        self.height
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            ExprTyp::Val(val) => write!(f, "{val}"),
            ExprTyp::Ident(name) => write!(f, "{name}"),
            ExprTyp::Neg(inner) => write!(f, "(-{inner})"),
            ExprTyp::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.symbol()),
            ExprTyp::Call { name, args, .. } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug)]
pub enum EvalErrTyp {
    UndefinedIdent { text: IdentKey },
    NullVar { text: IdentKey },
    NonFinite { value: Number },
}

#[derive(Debug)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            EvalErrTyp::UndefinedIdent { text } => write!(f, "undefined identifier '{text}'"),
            EvalErrTyp::NullVar { text } => write!(
                f,
                "variable '{text}' is declared but its value is not defined"
            ),
            EvalErrTyp::NonFinite { value } => {
                write!(f, "expression evaluates to a non-finite value ({value})")
            }
        }
    }
}

pub fn eval(expr: &Expr, idents: &Idents) -> Result<Number, EvalErr> {
    fn inner(expr: &Expr, idents: &Idents) -> Result<Number, EvalErr> {
        match &expr.typ {
            ExprTyp::Val(val) => Ok(*val),

            ExprTyp::Ident(name) => match idents.get(name) {
                Some(Ident::Var(Some(val)) | Ident::Const(val)) => Ok(*val),
                Some(Ident::Var(None)) => Err(EvalErr {
                    typ: EvalErrTyp::NullVar { text: name.clone() },
                    loc: expr.loc.clone(),
                }),
                Some(Ident::Fun(_)) | None => Err(EvalErr {
                    typ: EvalErrTyp::UndefinedIdent { text: name.clone() },
                    loc: expr.loc.clone(),
                }),
            },

            ExprTyp::Neg(arg) => Ok(stdlib::neg(&[inner(arg, idents)?])),

            ExprTyp::Binary { op, lhs, rhs } => {
                Ok(op.apply(inner(lhs, idents)?, inner(rhs, idents)?))
            }

            ExprTyp::Call { fun, args, .. } => {
                let args = args
                    .iter()
                    .map(|arg| inner(arg, idents))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((fun.fun)(&args))
            }
        }
    }

    let value = inner(expr, idents)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(EvalErr {
            typ: EvalErrTyp::NonFinite { value },
            loc: expr.loc.clone(),
        })
    }
}

/// A user-submitted function of `x`, parsed and ready to evaluate.
#[derive(Clone, Debug)]
pub struct Equation {
    src: Arc<String>,
    expr: Expr,
}

impl Equation {
    pub fn compile(src: impl Into<String>, idents: &Idents) -> Result<Self, ParseErr> {
        let src = Arc::new(src.into());
        let expr = parse::parse(Lexer::new(&src), idents)?;
        Ok(Self { src, expr })
    }

    pub fn src(&self) -> &Arc<String> {
        &self.src
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Binds the free variable to `x` and evaluates.
    pub fn eval_at(&self, idents: &mut Idents, x: Number) -> Result<Number, EvalErr> {
        idents.insert(stdlib::X.into(), Ident::Var(Some(x)));
        eval(&self.expr, idents)
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.src)
    }
}

#[derive(Debug)]
pub enum EvaluationError {
    Parse(ParseErr),
    Eval(EvalErr),
}

impl EvaluationError {
    pub fn loc(&self) -> &SubStr {
        match self {
            Self::Parse(err) => &err.loc,
            Self::Eval(err) => &err.loc,
        }
    }

    /// Whether the equation itself is fine and only this input is outside its domain.
    pub const fn is_domain_error(&self) -> bool {
        matches!(
            self,
            Self::Eval(EvalErr {
                typ: EvalErrTyp::NonFinite { .. },
                ..
            })
        )
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "parse error: {}", err.typ),
            Self::Eval(err) => write!(f, "evaluation error: {err}"),
        }
    }
}

impl std::error::Error for EvaluationError {}

impl From<ParseErr> for EvaluationError {
    fn from(err: ParseErr) -> Self {
        Self::Parse(err)
    }
}

impl From<EvalErr> for EvaluationError {
    fn from(err: EvalErr) -> Self {
        Self::Eval(err)
    }
}

/// Compiles `src` against the standard identifiers and evaluates it with `x`
/// rounded to `places` decimal places.
pub fn evaluate(src: &str, x: Number, places: u32) -> Result<Number, EvaluationError> {
    let mut idents = stdlib::standard_idents();
    let equation = Equation::compile(src, &idents)?;
    Ok(equation.eval_at(&mut idents, viewport::round_places(x, places))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn evaluates_arithmetic_with_precedence() {
        assert_relative_eq!(evaluate("1 + 2 * 3", 0.0, 2).unwrap(), 7.0);
        assert_relative_eq!(evaluate("(1 + 2) * 3", 0.0, 2).unwrap(), 9.0);
        assert_relative_eq!(evaluate("2 ^ 3 ^ 2", 0.0, 2).unwrap(), 512.0);
        assert_relative_eq!(evaluate("-x^2", 3.0, 2).unwrap(), -9.0);
        assert_relative_eq!(evaluate("10 - 4 - 3", 0.0, 2).unwrap(), 3.0);
    }

    #[test]
    fn substitutes_free_variable() {
        assert_relative_eq!(evaluate("x", 2.5, 2).unwrap(), 2.5);
        assert_relative_eq!(
            evaluate("sin(x / 30) * 100", 15.0, 2).unwrap(),
            (0.5f64).sin() * 100.0,
            epsilon = 1e-9
        );
        assert_relative_eq!(evaluate("pow(x, 2) + sqrt(4)", 3.0, 2).unwrap(), 11.0);
    }

    #[test]
    fn rounds_input_to_decimal_places() {
        assert_relative_eq!(evaluate("x", 1.23456, 2).unwrap(), 1.23);
        assert_relative_eq!(evaluate("x", 1.23456, 4).unwrap(), 1.2346);
    }

    #[test]
    fn non_finite_result_is_a_domain_error() {
        let err = evaluate("1/x", 0.0, 2).unwrap_err();
        assert!(err.is_domain_error(), "{err}");
        let err = evaluate("sqrt(x)", -1.0, 2).unwrap_err();
        assert!(err.is_domain_error(), "{err}");
    }

    #[test]
    fn intermediate_infinity_is_fine() {
        assert_relative_eq!(evaluate("1 / (1 / x)", 0.0, 2).unwrap(), 0.0);
    }

    #[test]
    fn malformed_expression_is_a_parse_error() {
        let err = evaluate("x + )", 0.0, 2).unwrap_err();
        assert!(matches!(err, EvaluationError::Parse(_)));
        assert!(!err.is_domain_error());
        assert_eq!(err.loc().start(), 4);
    }

    #[test]
    fn unbound_variable_is_reported() {
        let idents = stdlib::standard_idents();
        let equation = Equation::compile("x + 1", &idents).unwrap();
        let err = eval(equation.expr(), &idents).unwrap_err();
        assert!(matches!(err.typ, EvalErrTyp::NullVar { .. }));
        assert_eq!(err.loc.get(), "x");
    }

    #[test]
    fn display_is_fully_parenthesized() {
        let idents = stdlib::standard_idents();
        let equation = Equation::compile("-x^2 + max(1, x)", &idents).unwrap();
        assert_eq!(equation.expr().to_string(), "((-(x ^ 2)) + max(1, x))");
        assert_eq!(equation.to_string(), "-x^2 + max(1, x)");
    }
}
