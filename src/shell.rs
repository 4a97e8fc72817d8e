// SPDX: CC0-1.0

use crate::{
    eval::{Expr, ExprTyp, Ident, Idents},
    lex::SubStr,
};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    PrintTree,
    Plot,
    SetWin,
    Pan,
    Drag,
    ZoomIn,
    ZoomOut,
    View,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::Plot,
            Self::SetWin,
            Self::Pan,
            Self::Drag,
            Self::ZoomIn,
            Self::ZoomOut,
            Self::View,
            Self::PrintTree,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set the equation to plot",
            Self::PrintTree => "print the parsed equation (for debugging)",
            Self::Plot => "write the current frame to an svg file",
            Self::SetWin => "resize the canvas (re-centres the origin)",
            Self::Pan => "move the origin by a pixel offset",
            Self::Drag => "drag the plot from one screen point to another",
            Self::ZoomIn => "zoom in one step about a screen point",
            Self::ZoomOut => "zoom out one step about a screen point",
            Self::View => "print viewport, grid spacing and sampling summary",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::PrintTree => "tree",
            Self::Plot => "plot",
            Self::SetWin => "window",
            Self::Pan => "pan",
            Self::Drag => "drag",
            Self::ZoomIn => "in",
            Self::ZoomOut => "out",
            Self::View => "view",
        }
    }

    /// The command whose name is closest to `s`, if any is close enough.
    pub fn most_similar(s: &str) -> Option<Command> {
        Self::exhaustive()
            .iter()
            .map(|c| (strsim::normalized_damerau_levenshtein(s, c.name()), *c))
            .filter(|(sim, _)| *sim > 0.3)
            .reduce(|acc, elem| if elem.0 > acc.0 { elem } else { acc })
            .map(|(_, c)| c)
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        for c in Self::exhaustive() {
            if s == c.name() {
                return Ok(*c);
            }
        }
        Err(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.src())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.src().get(..span.start()).map_or(span.start(), |s| s.chars().count())),
        "^".repeat(span.get().chars().count().max(1))
    )?;
    Ok(())
}

/// Indented tree of the parsed expression, one node per line.
pub fn dump_tree<W: Write>(mut out: W, expr: &Expr, title: fmt::Arguments) -> io::Result<()> {
    fn node<W: Write>(out: &mut W, expr: &Expr, depth: usize) -> io::Result<()> {
        let pad = "  ".repeat(depth + 1);
        match &expr.typ {
            ExprTyp::Val(val) => writeln!(out, "{pad}push {val}"),
            ExprTyp::Ident(name) => writeln!(out, "{pad}load '{name}'"),
            ExprTyp::Neg(arg) => {
                writeln!(out, "{pad}call 'neg'")?;
                node(out, arg, depth + 1)
            }
            ExprTyp::Binary { op, lhs, rhs } => {
                writeln!(out, "{pad}call '{}'", op.fun().0)?;
                node(out, lhs, depth + 1)?;
                node(out, rhs, depth + 1)
            }
            ExprTyp::Call { name, args, .. } => {
                writeln!(out, "{pad}call '{name}'")?;
                for arg in args {
                    node(out, arg, depth + 1)?;
                }
                Ok(())
            }
        }
    }

    writeln!(out, "{title}: ")?;
    node(&mut out, expr, 0)
}

/// Note naming the identifier most similar to `text`, if one is close.
pub fn similar_ident(idents: &Idents, text: &str) -> Option<String> {
    let (sim, (key, ident)) = idents
        .iter()
        .map(|(k, v)| {
            (
                strsim::normalized_damerau_levenshtein(
                    &text.to_ascii_lowercase(),
                    &k.get().to_ascii_lowercase(),
                ),
                (k, v),
            )
        })
        .reduce(|(acc_sim, acc_kv), (elem_sim, elem_kv)| {
            // ties go to the alphabetically first name, independent of hash order
            if elem_sim > acc_sim
                || (elem_sim == acc_sim && elem_kv.0.get() < acc_kv.0.get())
            {
                (elem_sim, elem_kv)
            } else {
                (acc_sim, acc_kv)
            }
        })?;
    if sim > 0.3 {
        let ident_typ = match ident {
            Ident::Var(_) => "variable",
            Ident::Const(_) => "constant",
            Ident::Fun(_) => "function",
        };
        Some(format!("{ident_typ} '{key}' has a similar name"))
    } else {
        None
    }
}
