// SPDX: CC0-1.0

// recursive descent, lowest precedence first:
//   sum     = product (('+' | '-') product)*
//   product = unary (('*' | '/') unary)*
//   unary   = '-' unary | power
//   power   = primary ('^' unary)?
//   primary = number | ident | ident '(' sum (',' sum)* ')' | '(' sum ')'

use crate::{
    eval::{Expr, ExprTyp, Ident, IdentKey, Idents, OperatorTyp},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, Tok, TokTyp},
    Number,
};
use core::{fmt, iter::Peekable, num::ParseFloatError};
use std::sync::Arc;

#[derive(Debug)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    Unexpected(TokTyp),
    UnexpectedEnd,
    UndefinedIdent,
    NotAFunction,
    MissingCall,
    Arity { arity: usize, found: usize },
    TooDeep,
}

/// Deepest expression tree the parser builds, and deepest nesting of
/// parentheses, calls and unary operators it descends into.
pub const MAX_DEPTH: usize = 256;

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::Unexpected(typ) => write!(f, "unexpected {typ}"),
            Self::UnexpectedEnd => write!(f, "unexpected end of expression"),
            Self::UndefinedIdent => write!(f, "undefined identifier"),
            Self::NotAFunction => write!(f, "identifier is not a function"),
            Self::MissingCall => write!(f, "function must be called with arguments"),
            Self::Arity { arity, found } => write!(
                f,
                "function requires {arity} argument{s}, but found {found}",
                s = if *arity == 1 { "" } else { "s" }
            ),
            Self::TooDeep => write!(f, "expression nests deeper than {MAX_DEPTH} levels"),
        }
    }
}

#[derive(Debug)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

struct Parser<'src, 'id> {
    src: &'src Arc<String>,
    toks: Peekable<Lexer<'src>>,
    idents: &'id Idents,
    depth: usize,
}

impl Parser<'_, '_> {
    fn peek(&mut self) -> Result<Option<&Tok>, ParseErr> {
        match self.toks.peek() {
            Some(Ok(tok)) => Ok(Some(tok)),
            Some(Err(err)) => Err(err.clone().into()),
            None => Ok(None),
        }
    }

    fn peek_typ(&mut self) -> Result<Option<TokTyp>, ParseErr> {
        Ok(self.peek()?.map(|tok| tok.typ))
    }

    fn next(&mut self) -> Result<Tok, ParseErr> {
        match self.toks.next() {
            Some(tok) => Ok(tok?),
            None => Err(ParseErr {
                typ: ParseErrTyp::UnexpectedEnd,
                loc: SubStr::end_of(Arc::clone(self.src)),
            }),
        }
    }

    fn node(typ: ExprTyp, loc: SubStr) -> Result<Expr, ParseErr> {
        let height = 1 + match &typ {
            ExprTyp::Val(_) | ExprTyp::Ident(_) => 0,
            ExprTyp::Neg(arg) => arg.height,
            ExprTyp::Binary { lhs, rhs, .. } => lhs.height.max(rhs.height),
            ExprTyp::Call { args, .. } => args.iter().map(|arg| arg.height).max().unwrap_or(0),
        };
        if height > MAX_DEPTH {
            return Err(ParseErr {
                typ: ParseErrTyp::TooDeep,
                loc,
            });
        }
        Ok(Expr { typ, loc, height })
    }

    fn binary(op: OperatorTyp, lhs: Expr, rhs: Expr) -> Result<Expr, ParseErr> {
        let loc = lhs.loc.join(&rhs.loc);
        Self::node(
            ExprTyp::Binary {
                op,
                lhs: Box::new(lhs),
                rhs: Box::new(rhs),
            },
            loc,
        )
    }

    fn sum(&mut self) -> Result<Expr, ParseErr> {
        let mut lhs = self.product()?;
        while let Some(TokTyp::Op(op @ (OperatorTyp::Add | OperatorTyp::Sub))) = self.peek_typ()? {
            self.next()?;
            let rhs = self.product()?;
            lhs = Self::binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    fn product(&mut self) -> Result<Expr, ParseErr> {
        let mut lhs = self.unary()?;
        while let Some(TokTyp::Op(op @ (OperatorTyp::Mul | OperatorTyp::Div))) = self.peek_typ()? {
            self.next()?;
            let rhs = self.unary()?;
            lhs = Self::binary(op, lhs, rhs)?;
        }
        Ok(lhs)
    }

    // every nested descent passes through here
    fn unary(&mut self) -> Result<Expr, ParseErr> {
        if self.depth >= MAX_DEPTH {
            let loc = match self.peek()? {
                Some(tok) => tok.loc.clone(),
                None => SubStr::end_of(Arc::clone(self.src)),
            };
            return Err(ParseErr {
                typ: ParseErrTyp::TooDeep,
                loc,
            });
        }
        self.depth += 1;
        let expr = self.negation();
        self.depth -= 1;
        expr
    }

    fn negation(&mut self) -> Result<Expr, ParseErr> {
        if let Some(TokTyp::Op(OperatorTyp::Sub)) = self.peek_typ()? {
            let minus = self.next()?;
            let arg = self.unary()?;
            let loc = minus.loc.join(&arg.loc);
            return Self::node(ExprTyp::Neg(Box::new(arg)), loc);
        }
        self.power()
    }

    fn power(&mut self) -> Result<Expr, ParseErr> {
        let base = self.primary()?;
        if let Some(TokTyp::Op(OperatorTyp::Pow)) = self.peek_typ()? {
            self.next()?;
            // right associative, and allows `2^-x`
            let exp = self.unary()?;
            return Self::binary(OperatorTyp::Pow, base, exp);
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr, ParseErr> {
        let tok = self.next()?;
        match tok.typ {
            TokTyp::Number => match tok.loc.get().parse::<Number>() {
                Ok(val) => Self::node(ExprTyp::Val(val), tok.loc),
                Err(err) => Err(ParseErr {
                    typ: ParseErrTyp::ParseNum(err),
                    loc: tok.loc,
                }),
            },

            TokTyp::Ident => self.ident(tok),

            TokTyp::OpenParen => {
                let inner = self.sum()?;
                self.close_paren(&tok)?;
                Ok(inner)
            }

            typ => Err(ParseErr {
                typ: ParseErrTyp::Unexpected(typ),
                loc: tok.loc,
            }),
        }
    }

    fn close_paren(&mut self, open: &Tok) -> Result<Tok, ParseErr> {
        match self.toks.next() {
            Some(Ok(tok)) if tok.typ == TokTyp::CloseParen => Ok(tok),
            Some(Ok(tok)) => Err(ParseErr {
                typ: ParseErrTyp::Unexpected(tok.typ),
                loc: tok.loc,
            }),
            Some(Err(err)) => Err(err.into()),
            None => Err(ParseErr {
                typ: ParseErrTyp::ParenMismatch,
                loc: open.loc.clone(),
            }),
        }
    }

    fn ident(&mut self, tok: Tok) -> Result<Expr, ParseErr> {
        let name = IdentKey::from(tok.loc.clone());
        let called = self.peek_typ()? == Some(TokTyp::OpenParen);
        match (self.idents.get(&name), called) {
            (None, _) => Err(ParseErr {
                typ: ParseErrTyp::UndefinedIdent,
                loc: tok.loc,
            }),

            (Some(Ident::Var(_) | Ident::Const(_)), false) => {
                Self::node(ExprTyp::Ident(name), tok.loc)
            }

            (Some(Ident::Var(_) | Ident::Const(_)), true) => Err(ParseErr {
                typ: ParseErrTyp::NotAFunction,
                loc: tok.loc,
            }),

            (Some(Ident::Fun(_)), false) => Err(ParseErr {
                typ: ParseErrTyp::MissingCall,
                loc: tok.loc,
            }),

            (Some(Ident::Fun(fun)), true) => {
                let fun = *fun;
                let open = self.next()?;
                let mut args = vec![self.sum()?];
                while self.peek_typ()? == Some(TokTyp::Comma) {
                    self.next()?;
                    args.push(self.sum()?);
                }
                let close = self.close_paren(&open)?;
                let loc = tok.loc.join(&close.loc);
                if args.len() != fun.arity {
                    return Err(ParseErr {
                        typ: ParseErrTyp::Arity {
                            arity: fun.arity,
                            found: args.len(),
                        },
                        loc,
                    });
                }
                Self::node(ExprTyp::Call { name, fun, args }, loc)
            }
        }
    }
}

pub fn parse(lex: Lexer<'_>, idents: &Idents) -> Result<Expr, ParseErr> {
    let mut parser = Parser {
        src: lex.src(),
        toks: lex.peekable(),
        idents,
        depth: 0,
    };

    let expr = parser.sum()?;

    // anything left over means the expression ended early
    if let Some(tok) = parser.peek()?.cloned() {
        let typ = if tok.typ == TokTyp::CloseParen {
            ParseErrTyp::ParenMismatch
        } else {
            ParseErrTyp::Unexpected(tok.typ)
        };
        return Err(ParseErr { typ, loc: tok.loc });
    }

    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stdlib;

    fn parse_str(src: &str) -> Result<Expr, ParseErr> {
        let src = Arc::new(String::from(src));
        parse(Lexer::new(&src), &stdlib::standard_idents())
    }

    fn err_of(src: &str) -> ParseErr {
        parse_str(src).expect_err(src)
    }

    #[test]
    fn precedence_and_associativity() {
        for (src, tree) in [
            ("1 + 2 * 3", "(1 + (2 * 3))"),
            ("1 - 2 - 3", "((1 - 2) - 3)"),
            ("8 / 4 / 2", "((8 / 4) / 2)"),
            ("2 ^ 3 ^ 2", "(2 ^ (3 ^ 2))"),
            ("-x ^ 2", "(-(x ^ 2))"),
            ("2 ^ -x", "(2 ^ (-x))"),
            ("x - -1", "(x - (-1))"),
            ("log(x, 10) * pi", "(log(x, 10) * pi)"),
        ] {
            assert_eq!(parse_str(src).unwrap().to_string(), tree, "{src}");
        }
    }

    #[test]
    fn node_spans_cover_their_source() {
        let expr = parse_str("sin(x / 30) * 100").unwrap();
        assert_eq!(expr.loc.get(), "sin(x / 30) * 100");
        let ExprTyp::Binary { lhs, .. } = &expr.typ else {
            panic!("expected binary, got {expr:?}");
        };
        assert_eq!(lhs.loc.get(), "sin(x / 30)");
    }

    #[test]
    fn stray_close_paren_is_mismatch() {
        let err = err_of("x + 1)");
        assert!(matches!(err.typ, ParseErrTyp::ParenMismatch));
        assert_eq!(err.loc.start(), 5);
    }

    #[test]
    fn unclosed_paren_points_at_open() {
        let err = err_of("(x + 1");
        assert!(matches!(err.typ, ParseErrTyp::ParenMismatch));
        assert_eq!(err.loc.start(), 0);
    }

    #[test]
    fn dangling_operator_is_unexpected() {
        assert!(matches!(err_of("x + )").typ, ParseErrTyp::Unexpected(TokTyp::CloseParen)));
        assert!(matches!(err_of("x *").typ, ParseErrTyp::UnexpectedEnd));
        assert!(matches!(err_of("").typ, ParseErrTyp::UnexpectedEnd));
    }

    #[test]
    fn implicit_multiplication_is_rejected() {
        assert!(matches!(err_of("2x").typ, ParseErrTyp::Unexpected(TokTyp::Ident)));
    }

    #[test]
    fn identifiers_are_checked() {
        let err = err_of("sine(x)");
        assert!(matches!(err.typ, ParseErrTyp::UndefinedIdent));
        assert_eq!(err.loc.get(), "sine");

        assert!(matches!(err_of("x(2)").typ, ParseErrTyp::NotAFunction));
        assert!(matches!(err_of("sin + 1").typ, ParseErrTyp::MissingCall));
        assert!(matches!(
            err_of("log(x)").typ,
            ParseErrTyp::Arity { arity: 2, found: 1 }
        ));
    }

    #[test]
    fn bad_number_literal() {
        assert!(matches!(err_of("1.2.3").typ, ParseErrTyp::ParseNum(_)));
    }

    #[test]
    fn deep_nesting_is_an_error() {
        let parens = format!("{}x{}", "(".repeat(100_000), ")".repeat(100_000));
        let err = err_of(&parens);
        assert!(matches!(err.typ, ParseErrTyp::TooDeep));
        assert_eq!(err.loc.get(), "(");

        let negs = format!("{}x", "-".repeat(MAX_DEPTH + 1));
        assert!(matches!(err_of(&negs).typ, ParseErrTyp::TooDeep));

        let powers = format!("x{}", "^x".repeat(MAX_DEPTH));
        assert!(matches!(err_of(&powers).typ, ParseErrTyp::TooDeep));
    }

    #[test]
    fn long_chains_are_limited_by_tree_height() {
        let chain = format!("x{}", " + x".repeat(100_000));
        assert!(matches!(err_of(&chain).typ, ParseErrTyp::TooDeep));

        let chain = format!("x{}", " + x".repeat(MAX_DEPTH - 1));
        assert_eq!(parse_str(&chain).unwrap().height(), MAX_DEPTH);
    }

    #[test]
    fn moderate_nesting_is_fine() {
        let src = format!("{}x{}", "(".repeat(100), ")".repeat(100));
        let expr = parse_str(&src).unwrap();
        assert_eq!(expr.height(), 1);
        assert_eq!(expr.to_string(), "x");
        assert!(parse_str("sin(cos(-(x ^ 2)))").is_ok());
    }

    #[test]
    fn lexer_errors_surface() {
        assert!(matches!(
            err_of("|x|").typ,
            ParseErrTyp::LexErr(LexErrTyp::Unsupported(TokTyp::XPipe))
        ));
    }
}
