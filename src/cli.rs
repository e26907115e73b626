//! Terminal front-end: argument parsing, a line-oriented renderer, and the
//! read-eval loop that feeds stdin into an [`IntakeEngine`].

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;

use crate::archive::{ArchiveError, SessionArchive};
use crate::config::Settings;
use crate::intake::catalog::FAMILY_HISTORY_CONDITIONS;
use crate::intake::messages::MessageTemplates;
use crate::intake::presentation::{MessageDeduper, Sender};
use crate::intake::{FormKind, IntakeEngine, Renderer, VitalSigns};

#[derive(Debug, Parser)]
#[command(name = "symptom-intake")]
#[command(version, about = "Guided symptom intake with condition scoring")]
pub struct Cli {
    /// Directory for history.json, profile.json and feedback.json
    #[arg(long, env = "INTAKE_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Print bot messages immediately
    #[arg(long, conflicts_with = "typing_delay_ms")]
    pub no_typing_delay: bool,

    /// Pause before each bot message, in milliseconds
    #[arg(long, value_name = "MS")]
    pub typing_delay_ms: Option<u64>,

    /// Tracing filter directive (overridden by RUST_LOG)
    #[arg(long)]
    pub log_filter: Option<String>,
}

impl Cli {
    pub fn settings(&self) -> Result<Settings, ArchiveError> {
        let delay = if self.no_typing_delay {
            Some(0)
        } else {
            self.typing_delay_ms
        };
        Settings::resolve(
            self.data_dir.as_deref(),
            delay,
            self.log_filter.as_deref(),
        )
    }
}

// ═══════════════════════════════════════════
// Renderer
// ═══════════════════════════════════════════

/// Writes the conversation as plain text lines. Quick options are numbered
/// so the user can answer with the number.
pub struct TerminalRenderer<W: Write> {
    out: W,
    dedupe: MessageDeduper,
    typing_delay: Duration,
    last_options: Vec<String>,
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, typing_delay: Duration) -> Self {
        Self {
            out,
            dedupe: MessageDeduper::new(),
            typing_delay,
            last_options: Vec::new(),
        }
    }

    /// Map `"2"` to the second quick option of the last bot message.
    pub fn resolve_quick_option(&self, input: &str) -> String {
        input
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.last_options.get(i))
            .cloned()
            .unwrap_or_else(|| input.trim().to_string())
    }

    pub fn prompt(&mut self, label: &str) {
        self.write(&format!("{label}> "));
        if let Err(e) = self.out.flush() {
            tracing::warn!(error = %e, "Failed to flush terminal output");
        }
    }

    /// Forget duplicate-suppression history, e.g. after a restart.
    pub fn clear_history(&mut self) {
        self.dedupe.clear();
        self.last_options.clear();
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write(&mut self, text: &str) {
        if let Err(e) = self.out.write_all(text.as_bytes()) {
            tracing::warn!(error = %e, "Failed to write terminal output");
        }
    }

    fn line(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn emit_bot_message(&mut self, text: &str, options: &[&str]) {
        if !self.dedupe.admit(Sender::Bot, text) {
            tracing::debug!("Duplicate bot message suppressed");
            return;
        }
        if !self.typing_delay.is_zero() {
            thread::sleep(self.typing_delay);
        }

        self.line("");
        self.line(text);
        for (i, option) in options.iter().enumerate() {
            self.line(&format!("  [{}] {}", i + 1, option));
        }
        self.last_options = options.iter().map(|o| o.to_string()).collect();
    }

    // Typed input is already on screen; only feed the deduper.
    fn emit_user_message(&mut self, text: &str) {
        self.dedupe.admit(Sender::User, text);
    }

    fn emit_emergency_banner(&mut self) {
        self.line("");
        self.line("!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!");
        self.line("!!  EMERGENCY: SEEK IMMEDIATE MEDICAL CARE    !!");
        self.line("!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!");
    }

    fn show_form(&mut self, kind: FormKind) {
        self.last_options.clear();
        self.line("");
        match kind {
            FormKind::VitalSigns => self.line(
                "Please enter your vital signs. Leave a field blank if unknown, \
                 or type 'skip' to continue without them.",
            ),
            FormKind::FamilyHistory => {
                self.line("Select any that apply (numbers or names, comma-separated):");
                for (i, condition) in FAMILY_HISTORY_CONDITIONS.iter().enumerate() {
                    self.line(&format!("  [{}] {}", i + 1, condition));
                }
            }
        }
    }
}

// ═══════════════════════════════════════════
// Session loop
// ═══════════════════════════════════════════

const QUIT: &str = "/quit";
const RESTART: &str = "/restart";
const SKIP: &str = "skip";

/// Drive one engine from line input until EOF, `/quit`, or a farewell.
pub fn run_session<I, W, A>(
    input: I,
    engine: &mut IntakeEngine<TerminalRenderer<W>, A>,
) -> io::Result<()>
where
    I: BufRead,
    W: Write,
    A: SessionArchive,
{
    let mut lines = input.lines();
    engine.start();

    loop {
        let keep_going = match engine.pending_follow_up() {
            Some(FormKind::VitalSigns) => vital_signs_form(&mut lines, engine)?,
            Some(FormKind::FamilyHistory) => family_history_form(&mut lines, engine)?,
            None => {
                engine.renderer_mut().prompt("you");
                match lines.next() {
                    Some(line) => handle_line(&line?, engine),
                    None => false,
                }
            }
        };

        if !keep_going || engine.last_bot_message() == Some(MessageTemplates::farewell()) {
            break;
        }
    }

    tracing::debug!(session_id = %engine.session_id(), "Terminal session ended");
    Ok(())
}

/// `/quit` and `/restart`, honoured at every prompt including forms.
/// `Some(keep_going)` when the line was a command.
fn session_command<W: Write, A: SessionArchive>(
    line: &str,
    engine: &mut IntakeEngine<TerminalRenderer<W>, A>,
) -> Option<bool> {
    match line.trim() {
        QUIT => Some(false),
        RESTART => {
            engine.renderer_mut().clear_history();
            engine.restart();
            Some(true)
        }
        _ => None,
    }
}

fn handle_line<W: Write, A: SessionArchive>(
    line: &str,
    engine: &mut IntakeEngine<TerminalRenderer<W>, A>,
) -> bool {
    if let Some(keep_going) = session_command(line, engine) {
        return keep_going;
    }
    let answer = engine.renderer().resolve_quick_option(line.trim());
    engine.submit_answer(&answer);
    true
}

/// Reads the five vital-sign fields. Returns false on EOF or `/quit`.
fn vital_signs_form<I, W, A>(
    lines: &mut io::Lines<I>,
    engine: &mut IntakeEngine<TerminalRenderer<W>, A>,
) -> io::Result<bool>
where
    I: BufRead,
    W: Write,
    A: SessionArchive,
{
    const FIELDS: [&str; 5] = [
        "temperature (°F)",
        "systolic BP",
        "diastolic BP",
        "pulse (bpm)",
        "blood glucose (mg/dL)",
    ];

    let mut raw = Vec::with_capacity(FIELDS.len());
    for field in FIELDS {
        engine.renderer_mut().prompt(field);
        let Some(line) = lines.next() else {
            return Ok(false);
        };
        let line = line?;
        if let Some(keep_going) = session_command(&line, engine) {
            return Ok(keep_going);
        }
        if line.trim().eq_ignore_ascii_case(SKIP) {
            engine.skip();
            return Ok(true);
        }
        raw.push(line);
    }

    engine.submit_vital_signs(VitalSigns {
        temperature: parse_field(&raw[0]),
        systolic: parse_field(&raw[1]),
        diastolic: parse_field(&raw[2]),
        pulse: parse_field(&raw[3]),
        glucose: parse_field(&raw[4]),
    });
    Ok(true)
}

fn family_history_form<I, W, A>(
    lines: &mut io::Lines<I>,
    engine: &mut IntakeEngine<TerminalRenderer<W>, A>,
) -> io::Result<bool>
where
    I: BufRead,
    W: Write,
    A: SessionArchive,
{
    engine.renderer_mut().prompt("family history");
    let Some(line) = lines.next() else {
        return Ok(false);
    };
    let line = line?;
    if let Some(keep_going) = session_command(&line, engine) {
        return Ok(keep_going);
    }
    engine.submit_family_history(parse_family_history(&line));
    Ok(true)
}

/// Blank or unparseable input leaves the field empty.
pub fn parse_field<T: std::str::FromStr>(raw: &str) -> Option<T> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::debug!(input = raw, "Unparseable vital-sign field left empty");
            None
        }
    }
}

/// Comma-separated numbers or names from the family-history checklist.
/// Unknown entries are dropped; duplicates are kept once.
pub fn parse_family_history(raw: &str) -> Vec<String> {
    let mut selected: Vec<String> = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let condition = match token.parse::<usize>() {
            Ok(n) => n
                .checked_sub(1)
                .and_then(|i| FAMILY_HISTORY_CONDITIONS.get(i))
                .copied(),
            Err(_) => FAMILY_HISTORY_CONDITIONS
                .iter()
                .find(|c| c.eq_ignore_ascii_case(token))
                .copied(),
        };
        if let Some(condition) = condition {
            if !selected.iter().any(|s| s == condition) {
                selected.push(condition.to_string());
            }
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::archive::MemoryArchive;
    use crate::intake::IntakeState;

    fn make_renderer() -> TerminalRenderer<Vec<u8>> {
        TerminalRenderer::new(Vec::new(), Duration::ZERO)
    }

    fn run(script: &str) -> (String, MemoryArchive) {
        let mut engine = IntakeEngine::new(make_renderer(), MemoryArchive::new());
        run_session(Cursor::new(script.to_string()), &mut engine).unwrap();
        let (renderer, archive) = engine.into_parts();
        (String::from_utf8(renderer.into_inner()).unwrap(), archive)
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "symptom-intake",
            "--data-dir",
            "/tmp/x",
            "--no-typing-delay",
            "--log-filter",
            "debug",
        ])
        .unwrap();
        let settings = cli.settings().unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/tmp/x"));
        assert!(settings.typing_delay.is_zero());
        assert_eq!(settings.log_filter, "debug");
    }

    #[test]
    fn cli_rejects_conflicting_delay_flags() {
        let result = Cli::try_parse_from([
            "symptom-intake",
            "--no-typing-delay",
            "--typing-delay-ms",
            "5",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn quick_option_numbers_resolve() {
        let mut r = make_renderer();
        r.emit_bot_message("Pick one", &["Fever", "Cough"]);
        assert_eq!(r.resolve_quick_option("2"), "Cough");
        assert_eq!(r.resolve_quick_option(" 1 "), "Fever");
        assert_eq!(r.resolve_quick_option("3"), "3");
        assert_eq!(r.resolve_quick_option("0"), "0");
        assert_eq!(r.resolve_quick_option("sneezing"), "sneezing");
    }

    #[test]
    fn duplicate_bot_messages_printed_once() {
        let mut r = make_renderer();
        r.emit_bot_message("Same text", &[]);
        r.emit_bot_message("Same text", &[]);
        let out = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(out.matches("Same text").count(), 1);
    }

    #[test]
    fn parse_field_blank_or_invalid_is_none() {
        assert_eq!(parse_field::<f64>("  "), None);
        assert_eq!(parse_field::<u32>("abc"), None);
        assert_eq!(parse_field::<u32>("-5"), None);
        assert_eq!(parse_field::<f64>(" 101.5 "), Some(101.5));
        assert_eq!(parse_field::<u32>("72"), Some(72));
    }

    #[test]
    fn family_history_accepts_numbers_and_names() {
        assert_eq!(
            parse_family_history("1, Diabetes, 99, gout, 2"),
            vec!["heart disease".to_string(), "diabetes".to_string()]
        );
        assert!(parse_family_history("").is_empty());
    }

    #[test]
    fn scripted_session_completes_and_archives() {
        let script = "\
fever and cough
1
2
4
1
3
3
104
120
80
80
100
2
1
4
1
1
helpful
done
";
        let (out, archive) = run(script);

        assert!(out.contains("How high is your temperature?"));
        assert!(out.contains("CRITICAL VITAL SIGNS"));
        assert!(out.contains("**Influenza**"));
        assert!(out.contains(MessageTemplates::feedback_thanks(
            crate::intake::types::FeedbackKind::Positive
        )));
        assert_eq!(archive.summaries.len(), 1);
        assert_eq!(archive.feedback.len(), 1);
        assert_eq!(
            archive.summaries[0].answers.family_history,
            Some(vec!["heart disease".to_string()])
        );
    }

    #[test]
    fn skip_and_quit() {
        let script = "Fatigue\n1\n1\n1\n1\n3\nskip\n/quit\nnever read\n";
        let mut engine = IntakeEngine::new(make_renderer(), MemoryArchive::new());
        run_session(Cursor::new(script.to_string()), &mut engine).unwrap();

        assert_eq!(
            engine.state(),
            IntakeState::AwaitingMainAnswer(crate::intake::catalog::FAMILY_HISTORY)
        );
        assert!(engine.answers().vital_signs.is_none());
    }

    #[test]
    fn quit_leaves_open_form() {
        // q5 "Elevated" opens the vital-signs form; quit at its first field.
        let script = "Fatigue\n1\n1\n1\n1\n3\n/quit\n98.6\n";
        let mut engine = IntakeEngine::new(make_renderer(), MemoryArchive::new());
        run_session(Cursor::new(script.to_string()), &mut engine).unwrap();

        assert_eq!(engine.state(), IntakeState::AwaitingVitalSignsForm);
        assert!(engine.answers().vital_signs.is_none());
    }

    #[test]
    fn restart_from_family_history_form() {
        let script = "Fatigue\n1\n1\n1\n1\n1\n1\n/restart\n/quit\n";
        let mut engine = IntakeEngine::new(make_renderer(), MemoryArchive::new());
        run_session(Cursor::new(script.to_string()), &mut engine).unwrap();

        assert_eq!(
            engine.state(),
            IntakeState::AwaitingMainAnswer(crate::intake::catalog::SYMPTOMS)
        );
        assert!(engine.answers().questions.is_empty());
        assert!(engine.answers().family_history.is_none());
    }

    #[test]
    fn eof_ends_session_quietly() {
        let (out, archive) = run("");
        assert!(out.contains("health intake assistant"));
        assert!(archive.summaries.is_empty());
    }
}
