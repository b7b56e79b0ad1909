//! Terminal front ends for a filter session.
//!
//! [`TerminalPresenter`] prints a numbered menu and reads one command per
//! line. [`parse_intent`] turns `--intent` values into intents for a
//! scripted run, and [`PreviewWriter`] wraps any presenter to save each
//! preview to disk.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use tinct_session::{CanonicalImage, FilterSession, Intent, Outcome, Presenter, SessionView};
use tracing::{debug, warn};

/// Help text for the interactive prompt.
const COMMANDS: &str = "commands: <number> select filter, r reset, a apply, c cancel, ? menu";

/// Interactive presenter reading commands from `input` and writing the
/// menu and status lines to `output`.
///
/// End of input cancels the session.
pub struct TerminalPresenter<R, W> {
    input: R,
    output: W,
    title: String,
    names: Vec<String>,
}

impl<R: BufRead, W: Write> TerminalPresenter<R, W> {
    /// Create a presenter over the given streams.
    pub const fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            title: String::new(),
            names: Vec::new(),
        }
    }

    /// Consume the presenter, returning its output stream.
    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    fn print_menu(&mut self) {
        let _ = writeln!(self.output, "{}", self.title);
        for (i, name) in self.names.iter().enumerate() {
            let _ = writeln!(self.output, "  {}. {name}", i + 1);
        }
        let _ = writeln!(self.output, "{COMMANDS}");
    }
}

impl<R: BufRead, W: Write> Presenter for TerminalPresenter<R, W> {
    fn open(&mut self, view: SessionView<'_>) {
        self.title = view.title.to_string();
        self.names = view.filter_names.iter().map(ToString::to_string).collect();
        self.print_menu();
        let (w, h) = view.base.dimensions();
        let _ = writeln!(self.output, "preview size {w}x{h}");
    }

    fn next_intent(&mut self) -> Intent {
        loop {
            let _ = write!(self.output, "> ");
            let _ = self.output.flush();

            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    debug!("input closed, cancelling");
                    return Intent::Cancel;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(error = %e, "failed to read command, cancelling");
                    return Intent::Cancel;
                }
            }

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == "?" {
                self.print_menu();
                continue;
            }
            match parse_command(line) {
                Ok(intent) => return intent,
                Err(msg) => {
                    let _ = writeln!(self.output, "{msg}");
                }
            }
        }
    }

    fn preview_changed(&mut self, preview: &CanonicalImage) {
        let (w, h) = preview.dimensions();
        let _ = writeln!(self.output, "preview updated ({w}x{h})");
    }

    fn report_error(&mut self, message: &str) {
        let _ = writeln!(self.output, "error: {message}");
    }

    fn close(&mut self, outcome: Outcome) {
        let _ = writeln!(self.output, "session {outcome}");
    }
}

/// Parse one interactive command.
///
/// Filter numbers are 1-based, as printed in the menu.
///
/// # Errors
///
/// Returns a message for anything that is not a command.
pub fn parse_command(line: &str) -> Result<Intent, String> {
    match line.trim().to_ascii_lowercase().as_str() {
        "r" | "reset" => Ok(Intent::Reset),
        "a" | "apply" => Ok(Intent::Apply),
        "c" | "cancel" | "q" | "quit" => Ok(Intent::Cancel),
        other => parse_position(other)
            .map(Intent::Select)
            .ok_or_else(|| format!("unknown command '{line}'; {COMMANDS}")),
    }
}

/// Parse one `--intent` value against the session's menu.
///
/// Accepts `select:<number>` (1-based, as in the menu), `select:<name>`,
/// `reset`, `apply` and `cancel`.
///
/// # Errors
///
/// Returns a message for malformed values and unknown filter names.
pub fn parse_intent(spec: &str, session: &FilterSession) -> Result<Intent, String> {
    let spec = spec.trim();
    if let Some(target) = spec.strip_prefix("select:") {
        let target = target.trim();
        if let Some(index) = parse_position(target) {
            return Ok(Intent::Select(index));
        }
        return session
            .position(target)
            .map(Intent::Select)
            .ok_or_else(|| format!("--intent {spec}: no filter named '{target}'"));
    }
    match spec {
        "reset" => Ok(Intent::Reset),
        "apply" => Ok(Intent::Apply),
        "cancel" => Ok(Intent::Cancel),
        _ => Err(format!(
            "--intent {spec}: expected select:<number|name>, reset, apply or cancel"
        )),
    }
}

/// 1-based menu position to a 0-based index.
fn parse_position(s: &str) -> Option<usize> {
    s.parse::<usize>().ok()?.checked_sub(1)
}

/// Presenter wrapper that saves the initial and every updated preview to
/// `path`.
///
/// Write failures are logged and never interrupt the session.
pub struct PreviewWriter<P> {
    inner: P,
    path: PathBuf,
}

impl<P> PreviewWriter<P> {
    /// Wrap `inner`, saving previews to `path`.
    pub const fn new(inner: P, path: PathBuf) -> Self {
        Self { inner, path }
    }

    /// Unwrap the inner presenter.
    #[cfg(test)]
    pub fn into_inner(self) -> P {
        self.inner
    }

    fn save(&self, preview: &CanonicalImage) {
        match preview.save(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "preview written"),
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to write preview"),
        }
    }
}

impl<P: Presenter> Presenter for PreviewWriter<P> {
    fn open(&mut self, view: SessionView<'_>) {
        self.save(view.preview);
        self.inner.open(view);
    }

    fn next_intent(&mut self) -> Intent {
        self.inner.next_intent()
    }

    fn preview_changed(&mut self, preview: &CanonicalImage) {
        self.save(preview);
        self.inner.preview_changed(preview);
    }

    fn report_error(&mut self, message: &str) {
        self.inner.report_error(message);
    }

    fn close(&mut self, outcome: Outcome) {
        self.inner.close(outcome);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use image::Rgb;
    use tinct_session::{
        FilterDescriptor, PixelBuffer, ScriptedPresenter, SessionOptions, TransformError,
    };

    use super::*;

    fn invert(mut img: CanonicalImage) -> Result<PixelBuffer, TransformError> {
        for p in img.pixels_mut() {
            p.0 = p.0.map(|c| 255 - c);
        }
        Ok(img.into())
    }

    fn failing(_: CanonicalImage) -> Result<PixelBuffer, TransformError> {
        Err("unsupported".into())
    }

    fn session() -> FilterSession {
        FilterSession::new(
            CanonicalImage::from_pixel(4, 4, Rgb([10, 20, 30])),
            vec![
                FilterDescriptor::from(("Invert", invert)),
                FilterDescriptor::from(("Broken", failing)),
            ],
            SessionOptions {
                title: "Test Filters".to_string(),
                ..SessionOptions::default()
            },
        )
        .unwrap()
    }

    fn run_terminal(script: &str) -> (Option<CanonicalImage>, String) {
        let mut presenter = TerminalPresenter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        let result = session().run(&mut presenter);
        (result, String::from_utf8(presenter.into_output()).unwrap())
    }

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command("1"), Ok(Intent::Select(0)));
        assert_eq!(parse_command(" 12 "), Ok(Intent::Select(11)));
        assert_eq!(parse_command("R"), Ok(Intent::Reset));
        assert_eq!(parse_command("apply"), Ok(Intent::Apply));
        assert_eq!(parse_command("q"), Ok(Intent::Cancel));
        assert!(parse_command("0").is_err());
        assert!(parse_command("blur").is_err());
    }

    #[test]
    fn terminal_menu_and_apply() {
        let (result, output) = run_terminal("1\na\n");
        assert_eq!(result.unwrap().get_pixel(0, 0).0, [245, 235, 225]);
        assert!(output.contains("Test Filters"));
        assert!(output.contains("1. Invert"));
        assert!(output.contains("2. Broken"));
        assert!(output.contains("preview updated (4x4)"));
        assert!(output.contains("session applied"));
    }

    #[test]
    fn terminal_reports_errors_and_continues() {
        let (result, output) = run_terminal("2\nbogus\n\n7\n1\n1\na\n");
        assert_eq!(result.unwrap().get_pixel(0, 0).0, [10, 20, 30]);
        assert!(output.contains("error: preview of filter 'Broken' failed: unsupported"));
        assert!(output.contains("unknown command 'bogus'"));
        assert!(output.contains("error: no filter at index 6"));
    }

    #[test]
    fn terminal_eof_cancels() {
        let (result, output) = run_terminal("1\n");
        assert!(result.is_none());
        assert!(output.contains("session cancelled"));
    }

    #[test]
    fn intents_resolve_against_menu() {
        let s = session();
        assert_eq!(parse_intent("select:2", &s), Ok(Intent::Select(1)));
        assert_eq!(parse_intent("select:Invert", &s), Ok(Intent::Select(0)));
        assert_eq!(parse_intent("reset", &s), Ok(Intent::Reset));
        assert_eq!(parse_intent(" apply ", &s), Ok(Intent::Apply));
        assert_eq!(parse_intent("cancel", &s), Ok(Intent::Cancel));
        assert!(parse_intent("select:Blur", &s).unwrap_err().contains("no filter named 'Blur'"));
        assert!(parse_intent("select:0", &s).is_err());
        assert!(parse_intent("undo", &s).is_err());
    }

    #[test]
    fn preview_writer_saves_each_preview() {
        let dir = std::env::temp_dir().join(format!("tinct-preview-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("preview.png");

        let inner = ScriptedPresenter::new([Intent::Select(0), Intent::Cancel]);
        let mut presenter = PreviewWriter::new(inner, path.clone());
        let result = session().run(&mut presenter);
        assert!(result.is_none());

        let saved = image::open(&path).unwrap().to_rgb8();
        assert_eq!(saved.get_pixel(0, 0).0, [245, 235, 225]);
        assert_eq!(presenter.into_inner().previews().len(), 2);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
