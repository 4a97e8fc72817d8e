// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use clap::{Parser, ValueEnum};
use core::num::NonZeroU16;
use curve_plot::{
    config::{Config, ZoomAnchor, DEFAULT_PAN_FACTOR},
    eval::{EvalErrTyp, EvaluationError},
    lex::{LexErrTyp, TokTyp},
    parse::ParseErrTyp,
    plot::{Frame, Plot},
    shell::{self, Command},
    svg::SvgSurface,
    Number, Point, Size,
};
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    path::PathBuf,
    process::ExitCode,
};

fn output_svg_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "svg"
    )
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Anchor {
    /// keep the point under the cursor fixed
    Pivot,
    /// nudge the pan by the cursor's offset from the centre
    Nudge,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Interactive plotter for functions of x
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// initial equation, e.g. "sin(x / 30) * 100"
    #[arg(short, long)]
    equation: Option<String>,

    /// canvas width in pixels
    #[arg(long)]
    width: Option<Number>,

    /// canvas height in pixels
    #[arg(long)]
    height: Option<Number>,

    /// pixels between curve samples
    #[arg(long)]
    precision: Option<NonZeroU16>,

    /// fraction one zoom step scales by
    #[arg(long)]
    zoom_percentage: Option<Number>,

    /// grid cells across the canvas before spacing grows
    #[arg(long)]
    max_grid_cells: Option<u16>,

    /// how zooming moves the origin
    #[arg(long, value_enum, default_value_t = Anchor::Pivot)]
    zoom_anchor: Anchor,

    /// pixels the origin moves per zoom step with `--zoom-anchor nudge`
    #[arg(long, default_value_t = DEFAULT_PAN_FACTOR)]
    pan_factor: Number,

    /// directory svg frames are written to
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// log level, written to stderr
    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

impl Args {
    fn config(&self) -> Config {
        let defaults = Config::default();
        Config {
            canvas: Size::new(
                self.width.unwrap_or(defaults.canvas.width),
                self.height.unwrap_or(defaults.canvas.height),
            ),
            precision: self.precision.unwrap_or(defaults.precision),
            zoom_percentage: self.zoom_percentage.unwrap_or(defaults.zoom_percentage),
            max_grid_cells: self.max_grid_cells.unwrap_or(defaults.max_grid_cells),
            zoom_anchor: match self.zoom_anchor {
                Anchor::Pivot => ZoomAnchor::Pivot,
                Anchor::Nudge => ZoomAnchor::Nudge {
                    pan_factor: self.pan_factor,
                },
            },
            label_cap: defaults.label_cap,
            equation: self.equation.clone().unwrap_or(defaults.equation),
        }
    }
}

fn main() -> ExitCode {
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    plot: Plot,
    frame: SvgSurface,
    last: Option<Frame>,
    out_dir: PathBuf,
}

impl State {
    fn repaint(&mut self) -> anyhow::Result<()> {
        let frame = self
            .plot
            .repaint(&mut self.frame)
            .context("failed to render frame")?;
        self.last = Some(frame);
        Ok(())
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::parse();

    if let Err(err) = TermLogger::init(
        args.log_level.into(),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("warning: logging is disabled: {err}");
    }

    let config = args.config();
    config.validate().context("invalid configuration")?;
    log::info!("starting with {config}");

    let canvas = config.canvas;
    let mut state = State {
        plot: Plot::new(config).context("initial equation is invalid")?,
        frame: SvgSurface::new(canvas),
        last: None,
        out_dir: args.out_dir,
    };
    state.repaint()?;

    let mut stdout = BufWriter::new(stdout());
    loop {
        writeln!(stdout, "y = {}", state.plot.equation())?;

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => set_expr(&mut stdout, &mut state)?,

                Command::Plot => write_frame(&mut stdout, &state)?,

                Command::SetWin => set_win(&mut stdout, &mut state)?,

                Command::Pan => {
                    if let Some(Point { x, y }) =
                        read_point(&mut stdout, "d", Point::new(0.0, 0.0))?
                    {
                        state.plot.pan(x, y);
                        state.repaint()?;
                    }
                }

                Command::Drag => drag(&mut stdout, &mut state)?,

                Command::ZoomIn | Command::ZoomOut => {
                    let center = state.plot.canvas().center();
                    if let Some(pivot) = read_point(&mut stdout, "pivot ", center)? {
                        let delta = if cmd == Command::ZoomIn { 1.0 } else { -1.0 };
                        state.plot.wheel(delta, pivot);
                        state.repaint()?;
                    }
                }

                Command::View => view(&mut stdout, &state)?,

                Command::PrintTree => {
                    shell::dump_tree(
                        &mut stdout,
                        state.plot.equation().expr(),
                        format_args!("y = {}", state.plot.equation()),
                    )?;
                }
            }
        } else if let Some(similar) = Command::most_similar(&try_cmd) {
            writeln!(
                stdout,
                r#"Unknown command, did you mean "{}"? Try "help" for help"#,
                similar.name()
            )?;
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

/// Prompts for the two coordinates of a point. Blank input keeps the
/// matching coordinate of `default`; `None` means the input was rejected.
fn read_point<W: Write>(
    mut out: W,
    name: &str,
    default: Point<Number>,
) -> anyhow::Result<Option<Point<Number>>> {
    let mut point = default;
    for (axis, dst) in [("x", &mut point.x), ("y", &mut point.y)] {
        match shell::read_fromstr::<_, Number>(
            &mut out,
            format_args!("?{name}{axis} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(new)) if new.is_finite() => *dst = new,
            Ok(Some(new)) => {
                writeln!(out, "error: {new} is not a finite number")?;
                return Ok(None);
            }
            Ok(None) => {}
            Err(_) => return Ok(None),
        }
    }
    Ok(Some(point))
}

fn set_win<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let canvas = state.plot.canvas();
    writeln!(out, "window = {canvas}")?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to skip")?;

    let mut new = canvas;
    for (name, dst) in [("width", &mut new.width), ("height", &mut new.height)] {
        match shell::read_fromstr::<_, Number>(
            &mut out,
            format_args!("?{name} (is {cur}) = ", cur = *dst),
            true,
        )? {
            Ok(Some(val)) => *dst = val,
            Ok(None) => {}
            Err(_) => return Ok(()),
        }
    }

    if let Err(err) = state.plot.resize(new) {
        writeln!(out, "error: {err}")?;
        return Ok(());
    }
    state.repaint()
}

fn drag<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let center = state.plot.canvas().center();
    let Some(from) = read_point(&mut out, "from ", center)? else {
        return Ok(());
    };
    let Some(to) = read_point(&mut out, "to ", from)? else {
        return Ok(());
    };

    state.plot.pointer_down(from);
    state.plot.pointer_move(to);
    state.plot.pointer_up();
    state.repaint()
}

fn view<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let vp = state.plot.viewport();
    writeln!(out, "canvas = {}", state.plot.canvas())?;
    writeln!(out, "zoom = {}", vp.zoom)?;
    writeln!(out, "origin = {}", vp.pan)?;
    writeln!(out, "sig figs = {}", vp.sig_figs())?;
    writeln!(out, "grid spacing = {}", state.plot.spacing())?;
    writeln!(out, "precision = {} px", state.plot.config().precision)?;
    if let Some(frame) = state.last {
        writeln!(
            out,
            "last frame: {samples} samples, {gaps} gaps, {lines} grid lines",
            samples = frame.samples,
            gaps = frame.gaps,
            lines = frame.grid_lines,
        )?;
    }
    Ok(())
}

fn write_frame<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let path = state.out_dir.join(output_svg_filename(Local::now()));
    let mut file = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("failed to open output svg file {}", path.display()))?,
    );
    file.write_all(state.frame.document().as_bytes())
        .context("failed to write to output svg file")?;
    file.flush()?;
    file.get_mut().sync_data()?;

    log::info!("wrote {} ({})", path.display(), state.frame.size());
    writeln!(out, "wrote {}", path.display())?;
    Ok(())
}

fn set_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let input = shell::input(&mut out, "y = ")?;
    if input.is_empty() {
        return Ok(());
    }

    match state.plot.submit(&input) {
        Ok(()) => state.repaint(),
        Err(err) => {
            writeln!(out)?;
            shell::underline(&mut out, err.loc())?;
            writeln!(out, "{err}")?;
            writeln!(out, "note: equation is unchanged")?;
            explain(&mut out, state, &err)?;
            Ok(())
        }
    }
}

fn explain<W: Write>(mut out: W, state: &State, err: &EvaluationError) -> anyhow::Result<()> {
    match err {
        EvaluationError::Parse(err) => match &err.typ {
            ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => writeln!(
                out,
                "note: available tokens are numbers, alphabetic identifiers, and symbols +-*/^,()"
            )?,

            ParseErrTyp::LexErr(LexErrTyp::Unsupported(typ)) => match typ {
                TokTyp::XGreater | TokTyp::XLess => {
                    writeln!(out, "note: expected an expression but found an inequality")?
                }
                TokTyp::XEqual => {
                    writeln!(out, "note: expected an expression but found an equation")?
                }
                TokTyp::XPipe => writeln!(
                    out,
                    "note: use the 'abs' function to compute absolute value"
                )?,
                _ => {}
            },

            ParseErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,

            ParseErrTyp::Unexpected(TokTyp::Ident | TokTyp::Number | TokTyp::OpenParen) => {
                writeln!(
                    out,
                    "note: implicit multiplication is not supported, so for example '5x' would be '5*x'"
                )?
            }

            ParseErrTyp::UndefinedIdent => {
                if let Some(note) = shell::similar_ident(state.plot.idents(), err.loc.get()) {
                    writeln!(out, "note: {note}")?;
                }
            }

            ParseErrTyp::Arity { .. }
            | ParseErrTyp::NotAFunction
            | ParseErrTyp::MissingCall
            | ParseErrTyp::ParenMismatch
            | ParseErrTyp::Unexpected(_)
            | ParseErrTyp::UnexpectedEnd => {}

            ParseErrTyp::TooDeep => {
                writeln!(out, "note: try removing redundant parentheses")?
            }
        },

        EvaluationError::Eval(err) => {
            if let EvalErrTyp::NullVar { .. } = err.typ {
                writeln!(out, "note: the only variable is 'x'")?;
            }
        }
    }
    Ok(())
}
